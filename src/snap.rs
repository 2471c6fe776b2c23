//! Placement correction for dragged items and zones.
//!
//! When a drag ends the rendering layer hands over the raw drop position and
//! gets back the corrected resting position:
//! - over a zone footprint, the item lands on the floor of the shelf band its
//!   bottom face is in, or on top of the zone when it is above every band
//! - anywhere else it stays where it was dropped, but never below the floor
//!
//! Zones are checked in list order and the first footprint hit wins; zones
//! with overlapping footprints are not disambiguated.

use serde::Serialize;
use utoipa::ToSchema;

use crate::geometry::{self, is_over_footprint, shelf_band_at};
use crate::model::Zone;
use crate::types::{Dimensions, Position};

/// Tuning for the snap engine.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SnapConfig {
    /// Slack below a shelf floor within which an item still lands on it (cm)
    pub band_tolerance: f64,
}

impl SnapConfig {
    pub const DEFAULT_BAND_TOLERANCE: f64 = geometry::DEFAULT_BAND_TOLERANCE;

    /// Creates a builder for a custom configuration.
    pub fn builder() -> SnapConfigBuilder {
        SnapConfigBuilder::default()
    }
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            band_tolerance: Self::DEFAULT_BAND_TOLERANCE,
        }
    }
}

/// Builder for [`SnapConfig`].
#[derive(Clone, Debug, Default)]
pub struct SnapConfigBuilder {
    config: SnapConfig,
}

impl SnapConfigBuilder {
    /// Sets the shelf band tolerance.
    ///
    /// Zero, negative and non-finite values keep the current tolerance.
    pub fn band_tolerance(mut self, tolerance: f64) -> Self {
        if tolerance > 0.0 && tolerance.is_finite() {
            self.config.band_tolerance = tolerance;
        } else {
            tracing::warn!(
                tolerance,
                kept = self.config.band_tolerance,
                "⚠️ Ignoring shelf band tolerance; it must be positive and finite"
            );
        }
        self
    }

    pub fn build(self) -> SnapConfig {
        self.config
    }
}

/// Which surface an item came to rest on.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SnapOutcome {
    /// Not over any zone; resting on (or held above) the floor.
    Floor,
    /// On the floor of a shelf band.
    Shelf {
        #[serde(rename = "zoneId")]
        zone_id: String,
        #[serde(rename = "bandIndex")]
        band_index: usize,
    },
    /// On the topmost surface of a zone.
    ZoneTop {
        #[serde(rename = "zoneId")]
        zone_id: String,
    },
}

impl SnapOutcome {
    pub fn code(&self) -> &'static str {
        match self {
            SnapOutcome::Floor => "floor",
            SnapOutcome::Shelf { .. } => "shelf",
            SnapOutcome::ZoneTop { .. } => "zone_top",
        }
    }

    /// Zone the item ended up in, if any.
    pub fn zone_id(&self) -> Option<&str> {
        match self {
            SnapOutcome::Floor => None,
            SnapOutcome::Shelf { zone_id, .. } | SnapOutcome::ZoneTop { zone_id } => Some(zone_id),
        }
    }
}

impl std::fmt::Display for SnapOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SnapOutcome::Floor => write!(f, "resting on the floor"),
            SnapOutcome::Shelf {
                zone_id,
                band_index,
            } => write!(f, "on shelf {} of zone '{}'", band_index + 1, zone_id),
            SnapOutcome::ZoneTop { zone_id } => write!(f, "on top of zone '{}'", zone_id),
        }
    }
}

/// Corrected position together with the surface it rests on.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
pub struct SnapResult {
    pub position: Position,
    pub outcome: SnapOutcome,
}

/// Computes the resting position of a dropped item with the default tuning.
///
/// # Examples
/// ```
/// use storage_planner::model::ZoneDraft;
/// use storage_planner::snap::snap;
/// use storage_planner::types::{Dimensions, Position};
///
/// let zone = ZoneDraft::new("Shelf")
///     .footprint(100.0, 40.0)
///     .shelves(vec![60.0, 60.0, 60.0])
///     .submit("z1")
///     .unwrap();
/// let item = Dimensions::new(30.0, 20.0, 30.0);
///
/// let resting = snap(Position::new(0.0, 95.0, 0.0), item, &[zone]);
/// assert_eq!(resting, Position::new(0.0, 70.0, 0.0));
/// ```
pub fn snap(raw: Position, item: Dimensions, zones: &[Zone]) -> Position {
    snap_with_config(raw, item, zones, &SnapConfig::default()).position
}

/// Computes the resting position of a dropped item.
///
/// Total over its inputs: nonsensical dimensions still produce a
/// deterministic position. All coordinates of the result are rounded to
/// whole centimeters.
///
/// # Parameters
/// * `raw` - Center of the item where it was dropped
/// * `item` - Item dimensions
/// * `zones` - All zones, in priority order
/// * `config` - Snap tuning
pub fn snap_with_config(
    raw: Position,
    item: Dimensions,
    zones: &[Zone],
    config: &SnapConfig,
) -> SnapResult {
    let half_height = item.half_height();
    let floor_y = half_height.max(raw.y);
    let point = raw.floor_point();

    let (y, outcome) = match zones.iter().find(|zone| is_over_footprint(point, zone)) {
        None => (floor_y, SnapOutcome::Floor),
        Some(zone) => {
            let bottom_face_y = raw.y - half_height;
            match shelf_band_at(zone, bottom_face_y, config.band_tolerance) {
                Some(band) => (
                    band.bottom_y + half_height,
                    SnapOutcome::Shelf {
                        zone_id: zone.id.clone(),
                        band_index: band.index,
                    },
                ),
                None => (
                    zone.top_y() + half_height,
                    SnapOutcome::ZoneTop {
                        zone_id: zone.id.clone(),
                    },
                ),
            }
        }
    };

    let position = Position::new(raw.x, y, raw.z).rounded();
    tracing::debug!(?raw, ?position, outcome = outcome.code(), "snapped item");
    SnapResult { position, outcome }
}

/// Computes where a dragged zone is stored.
///
/// The horizontal drop is kept (rounded to whole centimeters); the zone
/// always rests on the floor, so the dropped `y` is ignored.
pub fn reposition_zone(zone: &Zone, drop: Position) -> Position {
    Position::new(drop.x.round(), zone.dimensions.half_height(), drop.z.round())
}
