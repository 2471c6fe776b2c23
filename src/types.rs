//! Common value types and traits for the storage room geometry.
//!
//! All spatial quantities are centimeters. Positions are box **centers**,
//! with `y` pointing up from the floor (`y = 0`).

use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};
#[allow(unused_imports)]
use serde_json::json;
use utoipa::ToSchema;

/// Tolerance used when checking that shelf heights add up to a zone height.
pub const EPSILON_HEIGHT: f64 = 1e-3;

/// Bounding box extent of a room, zone structure or item.
///
/// # Examples
/// ```
/// use storage_planner::types::Dimensions;
///
/// let dims = Dimensions::new(30.0, 20.0, 30.0);
/// assert_eq!(dims.half_height(), 10.0);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({"width": 30.0, "height": 20.0, "depth": 30.0}))]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
    pub depth: f64,
}

impl Dimensions {
    #[inline]
    pub const fn new(width: f64, height: f64, depth: f64) -> Self {
        Self {
            width,
            height,
            depth,
        }
    }

    /// Half of the height, i.e. the distance from center to bottom face.
    #[inline]
    pub fn half_height(&self) -> f64 {
        self.height / 2.0
    }
}

/// A point in room space. For zones and items this is the box center.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({"x": 0.0, "y": 70.0, "z": 0.0}))]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    #[inline]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Room origin: horizontal center at floor level.
    #[inline]
    pub const fn origin() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// Projection onto the floor plane.
    #[inline]
    pub const fn floor_point(&self) -> FloorPoint {
        FloorPoint::new(self.x, self.z)
    }

    /// Rounds every component to the nearest whole centimeter.
    #[inline]
    pub fn rounded(&self) -> Self {
        Self::new(self.x.round(), self.y.round(), self.z.round())
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl Add for Position {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Position {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

/// A point on the floor plane (x, z).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FloorPoint {
    pub x: f64,
    pub z: f64,
}

impl FloorPoint {
    #[inline]
    pub const fn new(x: f64, z: f64) -> Self {
        Self { x, z }
    }
}

/// Trait for objects with a 3D extent.
pub trait Dimensional {
    fn dimensions(&self) -> Dimensions;
}

/// Trait for objects placed in the room by their center.
pub trait Positioned {
    /// Returns the center of the bounding box.
    fn position(&self) -> Position;
}

/// Axis-aligned bounding box in room space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub min: Position,
    pub max: Position,
}

impl BoundingBox {
    /// Builds the box around a center point.
    #[inline]
    pub fn from_center_and_dims(center: Position, dims: Dimensions) -> Self {
        let half = Position::new(dims.width / 2.0, dims.height / 2.0, dims.depth / 2.0);
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Bounding box of anything that has both a center and an extent.
    #[inline]
    pub fn of<T: Dimensional + Positioned + ?Sized>(object: &T) -> Self {
        Self::from_center_and_dims(object.position(), object.dimensions())
    }

    /// Strict interior test on the floor plane. Points on an edge are outside.
    #[inline]
    pub fn footprint_contains(&self, point: FloorPoint) -> bool {
        point.x > self.min.x && point.x < self.max.x && point.z > self.min.z && point.z < self.max.z
    }

    /// Checks whether the floor footprints of two boxes share any area.
    ///
    /// Touching edges do not count as overlap.
    #[inline]
    pub fn footprints_overlap(&self, other: &Self) -> bool {
        !(self.max.x <= other.min.x
            || other.max.x <= self.min.x
            || self.max.z <= other.min.z
            || other.max.z <= self.min.z)
    }
}

/// Validation helpers shared by the model drafts and the import path.
pub mod validation {

    /// Validates a single length in centimeters.
    ///
    /// # Returns
    /// `Ok(())` for positive finite values, otherwise error text
    pub fn validate_dimension(value: f64, name: &str) -> Result<(), String> {
        if value.is_nan() {
            return Err(format!("{} must not be NaN", name));
        }
        if value.is_infinite() {
            return Err(format!("{} must not be infinite", name));
        }
        if value <= 0.0 {
            return Err(format!("{} must be positive, got: {}", name, value));
        }
        Ok(())
    }

    /// Validates a length and rounds it to whole centimeters.
    ///
    /// Lengths that round down to zero are rejected.
    pub fn whole_centimeters(value: f64, name: &str) -> Result<f64, String> {
        validate_dimension(value, name)?;
        let rounded = value.round();
        if rounded <= 0.0 {
            return Err(format!("{} must be at least 1 cm, got: {}", name, value));
        }
        Ok(rounded)
    }

    /// True for finite values without a fractional part.
    #[inline]
    pub fn is_whole(value: f64) -> bool {
        value.is_finite() && value.fract() == 0.0
    }

    /// Validates width, height and depth of a box.
    pub fn validate_dimensions(dims: &super::Dimensions) -> Result<(), String> {
        validate_dimension(dims.width, "Width")?;
        validate_dimension(dims.height, "Height")?;
        validate_dimension(dims.depth, "Depth")?;
        Ok(())
    }

    /// Validates a box and rounds every side to whole centimeters.
    pub fn whole_dimensions(dims: &super::Dimensions) -> Result<super::Dimensions, String> {
        Ok(super::Dimensions::new(
            whole_centimeters(dims.width, "Width")?,
            whole_centimeters(dims.height, "Height")?,
            whole_centimeters(dims.depth, "Depth")?,
        ))
    }

    /// Validates that a position only contains finite coordinates.
    pub fn validate_position(position: &super::Position) -> Result<(), String> {
        if !position.is_finite() {
            return Err(format!(
                "Position must be finite, got: ({}, {}, {})",
                position.x, position.y, position.z
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_operations() {
        let a = Position::new(1.0, 2.0, 3.0);
        let b = Position::new(4.0, 5.0, 6.0);

        assert_eq!(a + b, Position::new(5.0, 7.0, 9.0));
        assert_eq!(b - a, Position::new(3.0, 3.0, 3.0));
        assert_eq!(a.floor_point(), FloorPoint::new(1.0, 3.0));
    }

    #[test]
    fn test_position_rounding() {
        let p = Position::new(12.4, 69.5, -3.6);
        assert_eq!(p.rounded(), Position::new(12.0, 70.0, -4.0));
    }

    #[test]
    fn test_dimensions_validity() {
        assert!(validation::validate_dimensions(&Dimensions::new(1.0, 1.0, 1.0)).is_ok());
        assert!(validation::validate_dimensions(&Dimensions::new(0.0, 1.0, 1.0)).is_err());
        assert!(validation::validate_dimensions(&Dimensions::new(1.0, -1.0, 1.0)).is_err());
        assert!(validation::validate_dimensions(&Dimensions::new(1.0, 1.0, f64::NAN)).is_err());
        assert_eq!(Dimensions::new(10.0, 21.0, 30.0).half_height(), 10.5);
    }

    #[test]
    fn test_bounding_box_footprint_is_strict() {
        let bb = BoundingBox::from_center_and_dims(
            Position::new(0.0, 90.0, 0.0),
            Dimensions::new(100.0, 180.0, 40.0),
        );

        assert!(bb.footprint_contains(FloorPoint::new(49.99, 0.0)));
        assert!(!bb.footprint_contains(FloorPoint::new(50.0, 0.0)));
        assert!(!bb.footprint_contains(FloorPoint::new(0.0, -20.0)));
        assert_eq!(bb.min.y, 0.0);
        assert_eq!(bb.max.y, 180.0);
    }

    #[test]
    fn test_bounding_box_footprint_overlap() {
        let dims = Dimensions::new(10.0, 10.0, 10.0);
        let a = BoundingBox::from_center_and_dims(Position::new(0.0, 5.0, 0.0), dims);
        let b = BoundingBox::from_center_and_dims(Position::new(5.0, 5.0, 5.0), dims);
        let touching = BoundingBox::from_center_and_dims(Position::new(10.0, 5.0, 0.0), dims);
        let above = BoundingBox::from_center_and_dims(Position::new(0.0, 15.0, 0.0), dims);

        assert!(a.footprints_overlap(&b));
        assert!(!a.footprints_overlap(&touching));
        assert!(a.footprints_overlap(&above));
    }

    #[test]
    fn test_validation_dimension() {
        assert!(validation::validate_dimension(10.0, "Width").is_ok());
        assert!(validation::validate_dimension(0.0, "Width").is_err());
        assert!(validation::validate_dimension(-1.0, "Width").is_err());
        assert!(validation::validate_dimension(f64::NAN, "Width").is_err());
        assert!(validation::validate_dimension(f64::INFINITY, "Width").is_err());
    }

    #[test]
    fn test_validation_whole_centimeters() {
        assert_eq!(validation::whole_centimeters(60.3, "Shelf"), Ok(60.0));
        assert_eq!(validation::whole_centimeters(20.5, "Height"), Ok(21.0));
        assert_eq!(validation::whole_centimeters(0.6, "Height"), Ok(1.0));
        assert!(validation::whole_centimeters(0.4, "Height").is_err());
        assert!(validation::whole_centimeters(-3.0, "Height").is_err());
        assert!(validation::whole_centimeters(f64::NAN, "Height").is_err());

        assert!(validation::is_whole(60.0));
        assert!(validation::is_whole(-40.0));
        assert!(!validation::is_whole(60.3));
        assert!(!validation::is_whole(f64::INFINITY));

        let dims = validation::whole_dimensions(&Dimensions::new(29.6, 20.4, 30.0)).unwrap();
        assert_eq!(dims, Dimensions::new(30.0, 20.0, 30.0));
    }

    #[test]
    fn test_validation_position() {
        assert!(validation::validate_position(&Position::new(1.0, 2.0, 3.0)).is_ok());
        assert!(validation::validate_position(&Position::new(f64::NAN, 2.0, 3.0)).is_err());
    }
}
