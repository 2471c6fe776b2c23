//! Spatial queries over zones and their shelf bands.
//!
//! Everything here is pure: no logging above `trace`, no mutation, no I/O.
//! A zone's shelf bands partition `[base, base + height]` bottom to top; the
//! queries assume that invariant and [`check_zone`] verifies it.

use thiserror::Error;

use crate::model::Zone;
use crate::types::{BoundingBox, EPSILON_HEIGHT, FloorPoint, validation};

/// How far below a band's floor an item's bottom face may be and still
/// count as standing on that band, in centimeters.
pub const DEFAULT_BAND_TOLERANCE: f64 = 10.0;

/// One vertical slot of a zone, in room coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShelfBand {
    /// Position in the shelf list, 0 = lowest.
    pub index: usize,
    /// Y of the shelf floor the band starts at.
    pub bottom_y: f64,
    /// Y of the band's upper boundary.
    pub top_y: f64,
}

impl ShelfBand {
    #[inline]
    pub fn height(&self) -> f64 {
        self.top_y - self.bottom_y
    }
}

/// Malformed zone detected at the geometry boundary.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ZoneConfigError {
    #[error("zone '{zone_id}' has a non-positive {axis}: {value}")]
    InvalidDimension {
        zone_id: String,
        axis: &'static str,
        value: f64,
    },
    #[error("zone '{zone_id}' has no shelves")]
    NoShelves { zone_id: String },
    #[error("zone '{zone_id}' shelf {index} has a non-positive height: {height}")]
    InvalidShelfHeight {
        zone_id: String,
        index: usize,
        height: f64,
    },
    #[error("zone '{zone_id}' declares height {declared} but its shelves add up to {sum}")]
    HeightMismatch {
        zone_id: String,
        declared: f64,
        sum: f64,
    },
    #[error("zone '{zone_id}' has a fractional {field}: {value} (whole centimeters only)")]
    FractionalGeometry {
        zone_id: String,
        field: String,
        value: f64,
    },
    #[error("zone '{zone_id}' is not resting on the floor (y = {y}, expected {expected})")]
    NotOnFloor {
        zone_id: String,
        y: f64,
        expected: f64,
    },
}

/// Checks whether a floor point lies strictly inside a zone's footprint.
///
/// Points exactly on an edge are **not** over the zone.
///
/// # Parameters
/// * `point` - Floor-plane point (x, z)
/// * `zone` - The zone whose footprint is tested
///
/// # Examples
/// ```
/// use storage_planner::geometry::is_over_footprint;
/// use storage_planner::model::ZoneDraft;
/// use storage_planner::types::FloorPoint;
///
/// let zone = ZoneDraft::new("Shelf").footprint(100.0, 40.0).submit("z1").unwrap();
/// assert!(is_over_footprint(FloorPoint::new(49.99, 0.0), &zone));
/// assert!(!is_over_footprint(FloorPoint::new(50.0, 0.0), &zone));
/// ```
pub fn is_over_footprint(point: FloorPoint, zone: &Zone) -> bool {
    BoundingBox::of(zone).footprint_contains(point)
}

/// Iterates the shelf bands of a zone from the floor up.
pub fn shelf_bands(zone: &Zone) -> impl Iterator<Item = ShelfBand> + '_ {
    let base = zone.base_y();
    zone.shelf_heights
        .iter()
        .enumerate()
        .scan(0.0, move |accumulated, (index, height)| {
            let bottom_y = base + *accumulated;
            *accumulated += *height;
            Some(ShelfBand {
                index,
                bottom_y,
                top_y: base + *accumulated,
            })
        })
}

/// Finds the shelf band an item's bottom face is resting in.
///
/// Walks the bands bottom to top and returns the first one with
/// `band.bottom_y - tolerance < bottom_face_y < band.top_y`. A face sitting
/// exactly on a shelf floor belongs to the band above that floor.
///
/// # Parameters
/// * `zone` - The zone to search
/// * `bottom_face_y` - Y of the item's bottom face
/// * `tolerance` - Slack below a band floor, see [`DEFAULT_BAND_TOLERANCE`]
///
/// # Returns
/// The matching band, or `None` when the face is above the zone's top or
/// more than `tolerance` below its base
pub fn shelf_band_at(zone: &Zone, bottom_face_y: f64, tolerance: f64) -> Option<ShelfBand> {
    let band = shelf_bands(zone)
        .find(|band| bottom_face_y < band.top_y && bottom_face_y > band.bottom_y - tolerance);
    tracing::trace!(zone = %zone.id, bottom_face_y, ?band, "shelf band lookup");
    band
}

/// Checks whether the footprints of two zones share any floor area.
pub fn footprints_overlap(a: &Zone, b: &Zone) -> bool {
    BoundingBox::of(a).footprints_overlap(&BoundingBox::of(b))
}

/// Returns every zone in `others` (other than `zone` itself) whose footprint
/// overlaps the given zone.
pub fn overlapping_zones<'a>(zone: &Zone, others: &'a [Zone]) -> Vec<&'a Zone> {
    others
        .iter()
        .filter(|other| other.id != zone.id && footprints_overlap(zone, other))
        .collect()
}

/// Verifies the structural invariants of a zone.
///
/// * width, height and depth are positive
/// * at least one shelf, every shelf height positive
/// * the shelf heights add up to the declared height
/// * the zone rests on the floor (`position.y == height / 2`)
/// * width, depth, shelf heights and the x/z position are whole centimeters
pub fn check_zone(zone: &Zone) -> Result<(), ZoneConfigError> {
    let dims = zone.dimensions;
    for (axis, value) in [
        ("width", dims.width),
        ("height", dims.height),
        ("depth", dims.depth),
    ] {
        if !(value > 0.0 && value.is_finite()) {
            return Err(ZoneConfigError::InvalidDimension {
                zone_id: zone.id.clone(),
                axis,
                value,
            });
        }
    }

    if zone.shelf_heights.is_empty() {
        return Err(ZoneConfigError::NoShelves {
            zone_id: zone.id.clone(),
        });
    }

    if let Some((index, height)) = zone
        .shelf_heights
        .iter()
        .enumerate()
        .find(|(_, h)| !(**h > 0.0 && h.is_finite()))
    {
        return Err(ZoneConfigError::InvalidShelfHeight {
            zone_id: zone.id.clone(),
            index,
            height: *height,
        });
    }

    let sum: f64 = zone.shelf_heights.iter().sum();
    if (sum - dims.height).abs() > EPSILON_HEIGHT {
        return Err(ZoneConfigError::HeightMismatch {
            zone_id: zone.id.clone(),
            declared: dims.height,
            sum,
        });
    }

    let expected = dims.half_height();
    if (zone.position.y - expected).abs() > EPSILON_HEIGHT {
        return Err(ZoneConfigError::NotOnFloor {
            zone_id: zone.id.clone(),
            y: zone.position.y,
            expected,
        });
    }

    let whole_fields = [
        ("width".to_string(), dims.width),
        ("depth".to_string(), dims.depth),
        ("x".to_string(), zone.position.x),
        ("z".to_string(), zone.position.z),
    ];
    let shelf_fields = zone
        .shelf_heights
        .iter()
        .enumerate()
        .map(|(index, height)| (format!("shelf {} height", index), *height));
    if let Some((field, value)) = whole_fields
        .into_iter()
        .chain(shelf_fields)
        .find(|(_, value)| !validation::is_whole(*value))
    {
        return Err(ZoneConfigError::FractionalGeometry {
            zone_id: zone.id.clone(),
            field,
            value,
        });
    }

    Ok(())
}
