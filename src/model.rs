//! Data models for the storage planner.
//!
//! This module defines the records the planner works on:
//! - `Room`: the bounding context everything is placed in
//! - `Zone`: a shelving structure with an ordered stack of shelf bands
//! - `Item`: a cataloged object, optionally associated with a zone
//! - `Suggestion` / `PhotoAnalysis`: results handed back by the layout advisor
//!
//! Records are built from drafts (`ZoneDraft`, `ItemDraft`) which validate all
//! required fields once, at submit time.

use serde::{Deserialize, Serialize};
#[allow(unused_imports)]
use serde_json::json;
use thiserror::Error;
use utoipa::ToSchema;

use crate::geometry::{self, ZoneConfigError};
use crate::types::{Dimensional, Dimensions, Position, Positioned, validation};

/// Color palette offered for new zones and items.
pub const PALETTE: [&str; 8] = [
    "#ef4444", "#f59e0b", "#10b981", "#3b82f6", "#6366f1", "#8b5cf6", "#ec4899", "#94a3b8",
];

/// Validation error for drafts and imported records.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Invalid dimension: {0}")]
    InvalidDimension(String),
    #[error("Invalid position: {0}")]
    InvalidPosition(String),
    #[error("Invalid shelf layout: {0}")]
    InvalidShelfLayout(String),
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(u32),
    #[error("Invalid zone configuration: {0}")]
    ZoneConfig(#[from] ZoneConfigError),
}

/// Generates a fresh record identifier.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

fn required_name(name: Option<String>) -> Result<String, ValidationError> {
    match name {
        Some(name) if !name.trim().is_empty() => Ok(name.trim().to_string()),
        _ => Err(ValidationError::MissingField("name")),
    }
}

/// The storage room. Its origin is the horizontal center at floor level.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Room {
    pub name: String,
    pub dimensions: Dimensions,
}

impl Room {
    /// Creates a room after validating its dimensions.
    pub fn new(name: impl Into<String>, dimensions: Dimensions) -> Result<Self, ValidationError> {
        validation::validate_dimensions(&dimensions).map_err(ValidationError::InvalidDimension)?;
        Ok(Self {
            name: name.into(),
            dimensions,
        })
    }
}

impl Default for Room {
    fn default() -> Self {
        Self {
            name: "Main Storage Room".to_string(),
            dimensions: Dimensions::new(300.0, 250.0, 300.0),
        }
    }
}

impl Dimensional for Room {
    fn dimensions(&self) -> Dimensions {
        self.dimensions
    }
}

/// A shelving structure standing in the room.
///
/// `shelf_heights` lists the vertical extent of every shelf band, bottom to
/// top. The structure height is always their sum and the zone rests on the
/// floor, so `position.y == dimensions.height / 2`.
///
/// On the wire a zone also carries `shelves`, the band count. It is written
/// for older clients and ignored when reading, since `shelfHeights` is
/// authoritative.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", from = "ZoneRecord", into = "ZoneRecord")]
#[schema(example = json!({
    "id": "z1",
    "name": "Main Shelf",
    "dimensions": {"width": 100.0, "height": 180.0, "depth": 40.0},
    "position": {"x": 0.0, "y": 90.0, "z": 0.0},
    "color": "#3b82f6",
    "shelves": 3,
    "shelfHeights": [60.0, 60.0, 60.0]
}))]
pub struct Zone {
    pub id: String,
    pub name: String,
    pub dimensions: Dimensions,
    pub position: Position,
    pub color: String,
    pub shelf_heights: Vec<f64>,
}

impl Zone {
    /// Height given to a shelf appended in the settings screen.
    pub const DEFAULT_NEW_SHELF_HEIGHT: f64 = 40.0;
    /// Layout a zone falls back to when its last shelf is removed.
    pub const DEFAULT_SINGLE_SHELF_HEIGHT: f64 = 180.0;
    pub const DEFAULT_WIDTH: f64 = 100.0;
    pub const DEFAULT_DEPTH: f64 = 40.0;

    /// Number of shelf bands.
    pub fn shelf_count(&self) -> usize {
        self.shelf_heights.len()
    }

    /// Y coordinate of the zone's base.
    pub fn base_y(&self) -> f64 {
        self.position.y - self.dimensions.half_height()
    }

    /// Y coordinate of the zone's topmost surface.
    pub fn top_y(&self) -> f64 {
        self.position.y + self.dimensions.half_height()
    }

    /// Changes the height of one shelf band, rounded to whole centimeters.
    pub fn set_shelf_height(&mut self, index: usize, height: f64) -> Result<(), ValidationError> {
        let height = validation::whole_centimeters(height, "Shelf height")
            .map_err(ValidationError::InvalidShelfLayout)?;
        self.check_shelf_index(index)?;
        self.shelf_heights[index] = height;
        self.restack();
        Ok(())
    }

    fn check_shelf_index(&self, index: usize) -> Result<(), ValidationError> {
        if index >= self.shelf_count() {
            return Err(ValidationError::InvalidShelfLayout(format!(
                "Shelf index {} out of range (zone has {} shelves)",
                index,
                self.shelf_count()
            )));
        }
        Ok(())
    }

    /// Appends a shelf band on top of the structure.
    pub fn add_shelf(&mut self, height: f64) -> Result<(), ValidationError> {
        let height = validation::whole_centimeters(height, "Shelf height")
            .map_err(ValidationError::InvalidShelfLayout)?;
        self.shelf_heights.push(height);
        self.restack();
        Ok(())
    }

    /// Removes a shelf band. A zone always keeps at least one band.
    pub fn remove_shelf(&mut self, index: usize) -> Result<(), ValidationError> {
        self.check_shelf_index(index)?;
        self.shelf_heights.remove(index);
        if self.shelf_heights.is_empty() {
            self.shelf_heights.push(Self::DEFAULT_SINGLE_SHELF_HEIGHT);
        }
        self.restack();
        Ok(())
    }

    /// Re-derives height and resting height from the shelf list.
    fn restack(&mut self) {
        self.dimensions.height = self.shelf_heights.iter().sum();
        self.position.y = self.dimensions.half_height();
    }
}

/// Serialized shape of a [`Zone`].
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ZoneRecord {
    id: String,
    name: String,
    dimensions: Dimensions,
    position: Position,
    color: String,
    #[serde(default)]
    shelves: Option<usize>,
    shelf_heights: Vec<f64>,
}

impl From<ZoneRecord> for Zone {
    fn from(record: ZoneRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            dimensions: record.dimensions,
            position: record.position,
            color: record.color,
            shelf_heights: record.shelf_heights,
        }
    }
}

impl From<Zone> for ZoneRecord {
    fn from(zone: Zone) -> Self {
        Self {
            shelves: Some(zone.shelf_count()),
            id: zone.id,
            name: zone.name,
            dimensions: zone.dimensions,
            position: zone.position,
            color: zone.color,
            shelf_heights: zone.shelf_heights,
        }
    }
}

impl Dimensional for Zone {
    fn dimensions(&self) -> Dimensions {
        self.dimensions
    }
}

impl Positioned for Zone {
    fn position(&self) -> Position {
        self.position
    }
}

/// Draft of a zone as filled in by a settings form.
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ZoneDraft {
    pub name: Option<String>,
    pub width: Option<f64>,
    pub depth: Option<f64>,
    pub shelf_heights: Option<Vec<f64>>,
    /// Only `x` and `z` are used; zones always rest on the floor.
    pub position: Option<Position>,
    pub color: Option<String>,
}

impl ZoneDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn footprint(mut self, width: f64, depth: f64) -> Self {
        self.width = Some(width);
        self.depth = Some(depth);
        self
    }

    pub fn shelves(mut self, heights: Vec<f64>) -> Self {
        self.shelf_heights = Some(heights);
        self
    }

    pub fn at(mut self, x: f64, z: f64) -> Self {
        self.position = Some(Position::new(x, 0.0, z));
        self
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Seeds every field the draft leaves open from an existing zone.
    pub fn or_from(self, zone: &Zone) -> Self {
        Self {
            name: self.name.or_else(|| Some(zone.name.clone())),
            width: self.width.or(Some(zone.dimensions.width)),
            depth: self.depth.or(Some(zone.dimensions.depth)),
            shelf_heights: self.shelf_heights.or_else(|| Some(zone.shelf_heights.clone())),
            position: self.position.or(Some(zone.position)),
            color: self.color.or_else(|| Some(zone.color.clone())),
        }
    }

    /// Validates the draft and builds the zone.
    ///
    /// Width, depth, shelf heights and the x/z position are rounded to whole
    /// centimeters.
    pub fn submit(self, id: impl Into<String>) -> Result<Zone, ValidationError> {
        let name = required_name(self.name)?;
        let width = validation::whole_centimeters(self.width.unwrap_or(Zone::DEFAULT_WIDTH), "Width")
            .map_err(ValidationError::InvalidDimension)?;
        let depth = validation::whole_centimeters(self.depth.unwrap_or(Zone::DEFAULT_DEPTH), "Depth")
            .map_err(ValidationError::InvalidDimension)?;

        let shelf_heights = match self.shelf_heights {
            Some(heights) if !heights.is_empty() => heights,
            _ => vec![Zone::DEFAULT_SINGLE_SHELF_HEIGHT],
        };
        let shelf_heights = shelf_heights
            .iter()
            .enumerate()
            .map(|(idx, h)| validation::whole_centimeters(*h, &format!("Shelf {} height", idx + 1)))
            .collect::<Result<Vec<_>, _>>()
            .map_err(ValidationError::InvalidShelfLayout)?;

        let drop = self.position.unwrap_or_default();
        validation::validate_position(&drop).map_err(ValidationError::InvalidPosition)?;
        let drop = drop.rounded();

        let height: f64 = shelf_heights.iter().sum();
        let zone = Zone {
            id: id.into(),
            name,
            dimensions: Dimensions::new(width, height, depth),
            position: Position::new(drop.x, height / 2.0, drop.z),
            color: self.color.unwrap_or_else(|| PALETTE[0].to_string()),
            shelf_heights,
        };
        geometry::check_zone(&zone)?;
        Ok(zone)
    }
}

/// (De)serializes an optional zone reference as a plain string where the
/// empty string means "on the floor".
mod zone_ref {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(value.as_deref().unwrap_or(""))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.filter(|id| !id.is_empty()))
    }
}

/// A cataloged object.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    pub name: String,
    pub category: String,
    pub quantity: u32,
    pub dimensions: Dimensions,
    /// Zone id, or `None` when the item sits on the floor.
    #[serde(default, with = "zone_ref")]
    #[schema(value_type = String)]
    pub location: Option<String>,
    pub color: String,
    pub position: Position,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder_note: Option<String>,
}

impl Item {
    /// Zone id the item refers to, if any. The zone may no longer exist.
    pub fn zone_id(&self) -> Option<&str> {
        self.location.as_deref()
    }
}

impl Dimensional for Item {
    fn dimensions(&self) -> Dimensions {
        self.dimensions
    }
}

impl Positioned for Item {
    fn position(&self) -> Position {
        self.position
    }
}

/// Draft of an item as filled in by the item form.
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemDraft {
    pub name: Option<String>,
    pub category: Option<String>,
    pub quantity: Option<u32>,
    pub dimensions: Option<Dimensions>,
    pub location: Option<String>,
    pub color: Option<String>,
    pub position: Option<Position>,
    pub photo_url: Option<String>,
    pub reminder_date: Option<String>,
    pub reminder_note: Option<String>,
}

impl ItemDraft {
    pub const DEFAULT_CATEGORY: &'static str = "Other";

    pub fn new(name: impl Into<String>, dimensions: Dimensions) -> Self {
        Self {
            name: Some(name.into()),
            dimensions: Some(dimensions),
            ..Self::default()
        }
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn quantity(mut self, quantity: u32) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn located_in(mut self, zone_id: impl Into<String>) -> Self {
        self.location = Some(zone_id.into());
        self
    }

    pub fn position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    pub fn reminder(mut self, date: impl Into<String>, note: impl Into<String>) -> Self {
        self.reminder_date = Some(date.into());
        self.reminder_note = Some(note.into());
        self
    }

    /// Seeds every field the draft leaves open from an existing item.
    ///
    /// An empty `location` still clears the zone reference.
    pub fn or_from(self, item: &Item) -> Self {
        Self {
            name: self.name.or_else(|| Some(item.name.clone())),
            category: self.category.or_else(|| Some(item.category.clone())),
            quantity: self.quantity.or(Some(item.quantity)),
            dimensions: self.dimensions.or(Some(item.dimensions)),
            location: self.location.or_else(|| item.location.clone()),
            color: self.color.or_else(|| Some(item.color.clone())),
            position: self.position.or(Some(item.position)),
            photo_url: self.photo_url.or_else(|| item.photo_url.clone()),
            reminder_date: self.reminder_date.or_else(|| item.reminder_date.clone()),
            reminder_note: self.reminder_note.or_else(|| item.reminder_note.clone()),
        }
    }

    /// Validates the draft and builds the item.
    ///
    /// Dimensions are rounded to whole centimeters. Without an explicit
    /// position the item is placed on the floor at the room origin.
    pub fn submit(self, id: impl Into<String>) -> Result<Item, ValidationError> {
        let name = required_name(self.name)?;
        let dimensions = self
            .dimensions
            .ok_or(ValidationError::MissingField("dimensions"))?;
        let dimensions =
            validation::whole_dimensions(&dimensions).map_err(ValidationError::InvalidDimension)?;

        let quantity = self.quantity.unwrap_or(1);
        if quantity == 0 {
            return Err(ValidationError::InvalidQuantity(quantity));
        }

        let position = self
            .position
            .unwrap_or_else(|| Position::new(0.0, dimensions.half_height(), 0.0));
        validation::validate_position(&position).map_err(ValidationError::InvalidPosition)?;

        let category = self
            .category
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| Self::DEFAULT_CATEGORY.to_string());

        Ok(Item {
            id: id.into(),
            name,
            category,
            quantity,
            dimensions,
            location: self.location.filter(|id| !id.is_empty()),
            color: self.color.unwrap_or_else(|| PALETTE[0].to_string()),
            position,
            photo_url: self.photo_url.filter(|url| !url.is_empty()),
            reminder_date: self.reminder_date.filter(|d| !d.is_empty()),
            reminder_note: self.reminder_note.filter(|n| !n.is_empty()),
        })
    }
}

/// A placement proposed by the layout advisor. Held until accepted or discarded.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub item_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_zone_id: Option<String>,
    pub suggested_position: Position,
    pub reasoning: String,
}

/// What the advisor recognized on an item photo.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PhotoAnalysis {
    pub name: String,
    pub category: String,
    pub dimensions: Dimensions,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shelf_zone() -> Zone {
        ZoneDraft::new("Main Shelf")
            .footprint(100.0, 40.0)
            .shelves(vec![60.0, 60.0, 60.0])
            .at(10.0, -20.0)
            .submit("z1")
            .expect("valid zone")
    }

    #[test]
    fn zone_draft_derives_height_and_rests_on_floor() {
        let zone = shelf_zone();
        assert_eq!(zone.dimensions.height, 180.0);
        assert_eq!(zone.position, Position::new(10.0, 90.0, -20.0));
        assert_eq!(zone.base_y(), 0.0);
        assert_eq!(zone.top_y(), 180.0);
    }

    #[test]
    fn zone_draft_ignores_dropped_y() {
        let draft = ZoneDraft {
            position: Some(Position::new(0.0, 400.0, 0.0)),
            ..ZoneDraft::new("Floating").shelves(vec![50.0])
        };
        let zone = draft.submit("z").unwrap();
        assert_eq!(zone.position.y, 25.0);
    }

    #[test]
    fn zone_draft_defaults_to_single_shelf() {
        let zone = ZoneDraft::new("Cabinet").submit("z").unwrap();
        assert_eq!(zone.shelf_heights, vec![Zone::DEFAULT_SINGLE_SHELF_HEIGHT]);
        assert_eq!(zone.dimensions.width, Zone::DEFAULT_WIDTH);
        assert_eq!(zone.color, PALETTE[0]);
    }

    #[test]
    fn zone_draft_requires_name() {
        let err = ZoneDraft::default().submit("z").unwrap_err();
        assert_eq!(err, ValidationError::MissingField("name"));

        let err = ZoneDraft::new("   ").submit("z").unwrap_err();
        assert_eq!(err, ValidationError::MissingField("name"));
    }

    #[test]
    fn zone_draft_rejects_non_positive_shelf() {
        let err = ZoneDraft::new("Bad")
            .shelves(vec![60.0, 0.0])
            .submit("z")
            .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidShelfLayout(_)));
    }

    #[test]
    fn shelf_editing_keeps_height_invariant() {
        let mut zone = shelf_zone();

        zone.set_shelf_height(1, 80.0).unwrap();
        assert_eq!(zone.dimensions.height, 200.0);
        assert_eq!(zone.position.y, 100.0);

        zone.add_shelf(Zone::DEFAULT_NEW_SHELF_HEIGHT).unwrap();
        assert_eq!(zone.shelf_heights, vec![60.0, 80.0, 60.0, 40.0]);
        assert_eq!(zone.dimensions.height, 240.0);
        assert_eq!(zone.position.y, 120.0);

        zone.remove_shelf(0).unwrap();
        assert_eq!(zone.shelf_heights, vec![80.0, 60.0, 40.0]);
        assert_eq!(zone.dimensions.height, 180.0);
        assert_eq!(zone.position.y, 90.0);
        assert!(geometry::check_zone(&zone).is_ok());
    }

    #[test]
    fn removing_last_shelf_restores_default_band() {
        let mut zone = ZoneDraft::new("Single").shelves(vec![30.0]).submit("z").unwrap();
        zone.remove_shelf(0).unwrap();
        assert_eq!(zone.shelf_heights, vec![Zone::DEFAULT_SINGLE_SHELF_HEIGHT]);
        assert_eq!(zone.dimensions.height, Zone::DEFAULT_SINGLE_SHELF_HEIGHT);
    }

    #[test]
    fn shelf_editing_rejects_bad_input() {
        let mut zone = shelf_zone();
        assert!(zone.set_shelf_height(5, 10.0).is_err());
        assert!(zone.set_shelf_height(0, -10.0).is_err());
        assert!(zone.remove_shelf(3).is_err());
        assert!(zone.add_shelf(f64::NAN).is_err());
        assert_eq!(zone.shelf_heights, vec![60.0, 60.0, 60.0]);
    }

    #[test]
    fn item_draft_defaults() {
        let item = ItemDraft::new("Suitcase", Dimensions::new(50.0, 74.0, 30.0))
            .submit("i1")
            .unwrap();
        assert_eq!(item.quantity, 1);
        assert_eq!(item.category, ItemDraft::DEFAULT_CATEGORY);
        assert_eq!(item.position, Position::new(0.0, 37.0, 0.0));
        assert_eq!(item.location, None);
    }

    #[test]
    fn item_draft_validation() {
        assert_eq!(
            ItemDraft::default().submit("i").unwrap_err(),
            ValidationError::MissingField("name")
        );

        let missing_dims = ItemDraft {
            name: Some("Box".into()),
            ..ItemDraft::default()
        };
        assert_eq!(
            missing_dims.submit("i").unwrap_err(),
            ValidationError::MissingField("dimensions")
        );

        let flat = ItemDraft::new("Sheet", Dimensions::new(10.0, 0.0, 10.0));
        assert!(matches!(
            flat.submit("i").unwrap_err(),
            ValidationError::InvalidDimension(_)
        ));

        let none = ItemDraft::new("Box", Dimensions::new(10.0, 10.0, 10.0)).quantity(0);
        assert_eq!(none.submit("i").unwrap_err(), ValidationError::InvalidQuantity(0));
    }

    #[test]
    fn new_ids_are_unique() {
        assert_ne!(new_id(), new_id());
    }

    #[test]
    fn item_location_serializes_as_plain_string() {
        let floor = ItemDraft::new("Bike", Dimensions::new(20.0, 100.0, 180.0))
            .submit("i2")
            .unwrap();
        let json = serde_json::to_value(&floor).unwrap();
        assert_eq!(json["location"], "");
        assert!(json.get("photoUrl").is_none());
        assert!(json.get("reminderDate").is_none());

        let shelved = ItemDraft::new("Box", Dimensions::new(40.0, 40.0, 60.0))
            .located_in("z1")
            .reminder("2026-12-01", "Take out decorations")
            .submit("i1")
            .unwrap();
        let json = serde_json::to_value(&shelved).unwrap();
        assert_eq!(json["location"], "z1");
        assert_eq!(json["reminderDate"], "2026-12-01");
        assert_eq!(json["reminderNote"], "Take out decorations");
    }

    #[test]
    fn item_optional_fields_round_trip_as_absent_or_present() {
        let json = r##"{
            "id": "3",
            "name": "Travel bags",
            "category": "Travel",
            "quantity": 2,
            "dimensions": {"width": 50.0, "height": 75.0, "depth": 30.0},
            "location": "",
            "color": "#10b981",
            "position": {"x": -80.0, "y": 37.5, "z": 100.0},
            "photoUrl": "data:image/jpeg;base64,AAAA"
        }"##;
        let item: Item = serde_json::from_str(json).unwrap();
        assert_eq!(item.location, None);
        assert_eq!(item.photo_url.as_deref(), Some("data:image/jpeg;base64,AAAA"));
        assert_eq!(item.reminder_note, None);

        let back = serde_json::to_value(&item).unwrap();
        let original: serde_json::Value = serde_json::from_str(json).unwrap();
        assert_eq!(back, original);
    }

    #[test]
    fn item_location_accepts_null_and_missing() {
        let base = json!({
            "id": "1", "name": "n", "category": "c", "quantity": 1,
            "dimensions": {"width": 1.0, "height": 1.0, "depth": 1.0},
            "color": "#fff", "position": {"x": 0.0, "y": 0.5, "z": 0.0}
        });
        let missing: Item = serde_json::from_value(base.clone()).unwrap();
        assert_eq!(missing.location, None);

        let mut with_null = base;
        with_null["location"] = serde_json::Value::Null;
        let null: Item = serde_json::from_value(with_null).unwrap();
        assert_eq!(null.location, None);
    }

    #[test]
    fn zone_serializes_camel_case() {
        let json = serde_json::to_value(shelf_zone()).unwrap();
        assert_eq!(json["shelfHeights"], json!([60.0, 60.0, 60.0]));
        assert_eq!(json["shelves"], 3);
        assert_eq!(json["position"]["y"], 90.0);
    }

    #[test]
    fn zone_draft_rounds_to_whole_centimeters() {
        let zone = ZoneDraft::new("Rounded")
            .footprint(99.6, 40.4)
            .shelves(vec![60.3, 60.0, 59.5])
            .at(10.4, -20.5)
            .submit("z")
            .unwrap();
        assert_eq!(zone.shelf_heights, vec![60.0, 60.0, 60.0]);
        assert_eq!(zone.dimensions, Dimensions::new(100.0, 180.0, 40.0));
        assert_eq!(zone.position, Position::new(10.0, 90.0, -21.0));

        let err = ZoneDraft::new("Sliver").shelves(vec![60.0, 0.3]).submit("z").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidShelfLayout(_)));
    }

    #[test]
    fn shelf_edits_round_heights() {
        let mut zone = shelf_zone();
        zone.set_shelf_height(0, 60.3).unwrap();
        zone.add_shelf(39.7).unwrap();
        assert_eq!(zone.shelf_heights, vec![60.0, 60.0, 60.0, 40.0]);
        assert_eq!(zone.dimensions.height, 220.0);
        assert!(geometry::check_zone(&zone).is_ok());
    }

    #[test]
    fn item_draft_rounds_dimensions() {
        let item = ItemDraft::new("Crate", Dimensions::new(29.6, 20.6, 30.2))
            .submit("i")
            .unwrap();
        assert_eq!(item.dimensions, Dimensions::new(30.0, 21.0, 30.0));
        assert_eq!(item.position, Position::new(0.0, 10.5, 0.0));
    }

    #[test]
    fn zone_draft_or_from_keeps_unset_fields() {
        let existing = ZoneDraft::new("Tall Shelf")
            .footprint(100.0, 50.0)
            .shelves(vec![80.0, 50.0, 50.0, 40.0])
            .at(50.0, 50.0)
            .color(PALETTE[2])
            .submit("z2")
            .unwrap();

        let renamed = ZoneDraft::new("Renamed").or_from(&existing).submit("z2").unwrap();
        assert_eq!(renamed.name, "Renamed");
        assert_eq!(renamed.shelf_heights, existing.shelf_heights);
        assert_eq!(renamed.dimensions, existing.dimensions);
        assert_eq!(renamed.position, existing.position);
        assert_eq!(renamed.color, existing.color);
    }

    #[test]
    fn item_draft_or_from_keeps_unset_fields() {
        let existing = ItemDraft::new("Box", Dimensions::new(40.0, 40.0, 60.0))
            .category("Decoration")
            .quantity(3)
            .located_in("z1")
            .position(Position::new(-100.0, 20.0, -100.0))
            .reminder("2026-12-01", "Lights")
            .submit("1")
            .unwrap();

        let draft = ItemDraft {
            quantity: Some(4),
            ..ItemDraft::default()
        };
        let updated = draft.or_from(&existing).submit("1").unwrap();
        assert_eq!(updated, Item { quantity: 4, ..existing.clone() });

        let to_floor = ItemDraft {
            location: Some(String::new()),
            ..ItemDraft::default()
        };
        let updated = to_floor.or_from(&existing).submit("1").unwrap();
        assert_eq!(updated.location, None);
        assert_eq!(updated.reminder_note.as_deref(), Some("Lights"));
    }

    #[test]
    fn suggestion_target_zone_is_optional() {
        let s: Suggestion = serde_json::from_str(
            r#"{"itemId":"1","suggestedPosition":{"x":0,"y":10,"z":0},"reasoning":"floor"}"#,
        )
        .unwrap();
        assert_eq!(s.target_zone_id, None);
        let json = serde_json::to_value(&s).unwrap();
        assert!(json.get("targetZoneId").is_none());
    }

    #[test]
    fn room_requires_positive_dimensions() {
        assert!(Room::new("Garage", Dimensions::new(500.0, 250.0, 400.0)).is_ok());
        assert!(Room::new("Garage", Dimensions::new(500.0, -1.0, 400.0)).is_err());
    }
}
