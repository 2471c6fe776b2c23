//! Application state service.
//!
//! `Inventory` owns the in-memory snapshot and persists it through the
//! injected [`SnapshotStore`] after every successful mutation. A mutation is
//! applied to a copy first; if validation or the save fails, the previous
//! state stays in place.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};
use utoipa::ToSchema;

use crate::geometry;
use crate::model::{Item, ItemDraft, Room, Suggestion, ValidationError, Zone, ZoneDraft, new_id};
use crate::snap::{SnapConfig, SnapOutcome, reposition_zone, snap_with_config};
use crate::store::{Snapshot, SnapshotStore, StoreError};
use crate::types::{Dimensions, Position};

#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("item '{0}' not found")]
    ItemNotFound(String),
    #[error("zone '{0}' not found")]
    ZoneNotFound(String),
    #[error("category '{0}' not found")]
    CategoryNotFound(String),
    #[error("category '{0}' already exists")]
    DuplicateCategory(String),
    #[error("category name must not be empty")]
    EmptyCategory,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A single change to a zone's shelf stack.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize, ToSchema)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ShelfEdit {
    /// Change the height of the shelf at `index`.
    Resize { index: usize, height: f64 },
    /// Append a shelf on top; defaults to [`Zone::DEFAULT_NEW_SHELF_HEIGHT`].
    Add {
        #[serde(default)]
        height: Option<f64>,
    },
    /// Remove the shelf at `index`.
    Remove { index: usize },
}

/// Item after a drag ended, with the surface it came to rest on.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
pub struct MovedItem {
    pub item: Item,
    pub outcome: SnapOutcome,
}

pub struct Inventory {
    state: Snapshot,
    store: Arc<dyn SnapshotStore>,
    snap_config: SnapConfig,
}

impl Inventory {
    /// Loads the state from the store.
    ///
    /// When the store is empty the state starts from the demo seed (or an
    /// empty room) and is saved right away.
    pub fn open(
        store: Arc<dyn SnapshotStore>,
        snap_config: SnapConfig,
        seed_defaults: bool,
    ) -> Result<Self, InventoryError> {
        let state = match store.load()? {
            Some(snapshot) => snapshot,
            None => {
                let snapshot = if seed_defaults {
                    Snapshot::seed()
                } else {
                    Snapshot::empty()
                };
                store.save(&snapshot)?;
                info!(seeded = seed_defaults, "🆕 Initialized new planner state");
                snapshot
            }
        };
        Ok(Self {
            state,
            store,
            snap_config,
        })
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.state
    }

    pub fn snap_config(&self) -> SnapConfig {
        self.snap_config
    }

    pub fn items(&self) -> &[Item] {
        &self.state.items
    }

    pub fn zones(&self) -> &[Zone] {
        &self.state.zones
    }

    pub fn room(&self) -> &Room {
        &self.state.room
    }

    pub fn categories(&self) -> &[String] {
        &self.state.categories
    }

    pub fn item(&self, id: &str) -> Option<&Item> {
        self.state.items.iter().find(|item| item.id == id)
    }

    pub fn zone(&self, id: &str) -> Option<&Zone> {
        self.state.zones.iter().find(|zone| zone.id == id)
    }

    /// Zone an item is stored in. Dangling references resolve to `None`
    /// (the floor).
    pub fn location_of(&self, item: &Item) -> Option<&Zone> {
        item.zone_id().and_then(|id| self.zone(id))
    }

    /// Applies a mutation to a copy of the state, saves it and swaps it in.
    fn commit<T>(
        &mut self,
        mutate: impl FnOnce(&mut Snapshot) -> Result<T, InventoryError>,
    ) -> Result<T, InventoryError> {
        let mut next = self.state.clone();
        let out = mutate(&mut next)?;
        self.store.save(&next)?;
        self.state = next;
        Ok(out)
    }

    pub fn add_item(&mut self, draft: ItemDraft) -> Result<Item, InventoryError> {
        let item = draft.submit(new_id())?;
        self.commit(|state| {
            state.items.push(item.clone());
            Ok(())
        })?;
        info!(id = %item.id, name = %item.name, "➕ Item created");
        Ok(item)
    }

    /// Updates the fields a draft sets. Everything else keeps its old value.
    pub fn update_item(&mut self, id: &str, draft: ItemDraft) -> Result<Item, InventoryError> {
        let existing = self
            .item(id)
            .ok_or_else(|| InventoryError::ItemNotFound(id.to_string()))?;
        let updated = draft.or_from(existing).submit(id)?;
        self.commit(|state| {
            replace_item(state, updated.clone())?;
            Ok(())
        })?;
        debug!(id, "item updated");
        Ok(updated)
    }

    pub fn delete_item(&mut self, id: &str) -> Result<Item, InventoryError> {
        let removed = self.commit(|state| {
            let idx = state
                .items
                .iter()
                .position(|item| item.id == id)
                .ok_or_else(|| InventoryError::ItemNotFound(id.to_string()))?;
            Ok(state.items.remove(idx))
        })?;
        info!(id, "🗑️ Item deleted");
        Ok(removed)
    }

    /// Drag end for an item: snaps the drop position and stores the result.
    ///
    /// The item's location follows the surface it lands on; landing outside
    /// every zone puts it on the floor.
    pub fn move_item(&mut self, id: &str, drop: Position) -> Result<MovedItem, InventoryError> {
        let item = self
            .item(id)
            .ok_or_else(|| InventoryError::ItemNotFound(id.to_string()))?;
        let result = snap_with_config(drop, item.dimensions, &self.state.zones, &self.snap_config);

        let mut moved = item.clone();
        moved.position = result.position;
        moved.location = result.outcome.zone_id().map(str::to_string);

        self.commit(|state| replace_item(state, moved.clone()))?;
        debug!(id, outcome = %result.outcome, "item moved");
        Ok(MovedItem {
            item: moved,
            outcome: result.outcome,
        })
    }

    /// Computes where an item of the given size would rest, without storing
    /// anything.
    pub fn preview_snap(&self, drop: Position, dims: Dimensions) -> crate::snap::SnapResult {
        snap_with_config(drop, dims, &self.state.zones, &self.snap_config)
    }

    pub fn add_zone(&mut self, draft: ZoneDraft) -> Result<Zone, InventoryError> {
        let zone = draft.submit(new_id())?;
        self.commit(|state| {
            state.zones.push(zone.clone());
            Ok(())
        })?;
        warn_on_overlap(&zone, &self.state.zones);
        info!(id = %zone.id, name = %zone.name, shelves = zone.shelf_count(), "➕ Zone created");
        Ok(zone)
    }

    /// Updates the fields a draft sets. Everything else keeps its old value.
    pub fn update_zone(&mut self, id: &str, draft: ZoneDraft) -> Result<Zone, InventoryError> {
        let existing = self
            .zone(id)
            .ok_or_else(|| InventoryError::ZoneNotFound(id.to_string()))?;
        let updated = draft.or_from(existing).submit(id)?;
        self.commit(|state| replace_zone(state, updated.clone()))?;
        warn_on_overlap(&updated, &self.state.zones);
        Ok(updated)
    }

    /// Edits a zone's shelf stack, keeping height and resting position in sync.
    pub fn edit_shelves(&mut self, id: &str, edit: ShelfEdit) -> Result<Zone, InventoryError> {
        let mut zone = self
            .zone(id)
            .cloned()
            .ok_or_else(|| InventoryError::ZoneNotFound(id.to_string()))?;
        match edit {
            ShelfEdit::Resize { index, height } => zone.set_shelf_height(index, height)?,
            ShelfEdit::Add { height } => {
                zone.add_shelf(height.unwrap_or(Zone::DEFAULT_NEW_SHELF_HEIGHT))?
            }
            ShelfEdit::Remove { index } => zone.remove_shelf(index)?,
        }
        geometry::check_zone(&zone).map_err(ValidationError::from)?;
        self.commit(|state| replace_zone(state, zone.clone()))?;
        debug!(id, ?edit, height = zone.dimensions.height, "shelves edited");
        Ok(zone)
    }

    /// Deletes a zone. Items referring to it stay and fall back to the floor.
    pub fn delete_zone(&mut self, id: &str) -> Result<Zone, InventoryError> {
        let removed = self.commit(|state| {
            let idx = state
                .zones
                .iter()
                .position(|zone| zone.id == id)
                .ok_or_else(|| InventoryError::ZoneNotFound(id.to_string()))?;
            Ok(state.zones.remove(idx))
        })?;
        let orphaned = self
            .state
            .items
            .iter()
            .filter(|item| item.zone_id() == Some(id))
            .count();
        info!(id, orphaned, "🗑️ Zone deleted");
        Ok(removed)
    }

    /// Drag end for a zone: keeps the horizontal drop, forces floor contact.
    pub fn move_zone(&mut self, id: &str, drop: Position) -> Result<Zone, InventoryError> {
        let mut zone = self
            .zone(id)
            .cloned()
            .ok_or_else(|| InventoryError::ZoneNotFound(id.to_string()))?;
        zone.position = reposition_zone(&zone, drop);
        self.commit(|state| replace_zone(state, zone.clone()))?;
        warn_on_overlap(&zone, &self.state.zones);
        debug!(id, position = ?zone.position, "zone moved");
        Ok(zone)
    }

    pub fn set_room(&mut self, room: Room) -> Result<Room, InventoryError> {
        let room = Room::new(room.name, room.dimensions)?;
        self.commit(|state| {
            state.room = room.clone();
            Ok(())
        })?;
        Ok(room)
    }

    pub fn add_category(&mut self, name: &str) -> Result<(), InventoryError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(InventoryError::EmptyCategory);
        }
        if self.state.categories.iter().any(|c| c == name) {
            return Err(InventoryError::DuplicateCategory(name.to_string()));
        }
        self.commit(|state| {
            state.categories.push(name.to_string());
            Ok(())
        })
    }

    pub fn remove_category(&mut self, name: &str) -> Result<(), InventoryError> {
        self.commit(|state| {
            let idx = state
                .categories
                .iter()
                .position(|c| c == name)
                .ok_or_else(|| InventoryError::CategoryNotFound(name.to_string()))?;
            state.categories.remove(idx);
            Ok(())
        })
    }

    /// Replaces the whole state with an imported snapshot.
    pub fn import(&mut self, snapshot: Snapshot) -> Result<(), InventoryError> {
        snapshot.validate()?;
        let (items, zones) = (snapshot.items.len(), snapshot.zones.len());
        self.commit(|state| {
            *state = snapshot;
            Ok(())
        })?;
        info!(items, zones, "📥 Snapshot imported");
        Ok(())
    }

    /// Applies an accepted batch of advisor suggestions.
    ///
    /// Positions are taken as proposed, through the same path as a manual
    /// move but without snapping. Suggestions for unknown items are skipped.
    ///
    /// # Returns
    /// Number of items that were updated
    pub fn accept_suggestions(&mut self, suggestions: &[Suggestion]) -> Result<usize, InventoryError> {
        let applied = self.commit(|state| {
            let mut applied = 0;
            for suggestion in suggestions {
                let Some(item) = state
                    .items
                    .iter_mut()
                    .find(|item| item.id == suggestion.item_id)
                else {
                    warn!(item = %suggestion.item_id, "⚠️ Suggestion refers to unknown item, skipped");
                    continue;
                };
                item.position = suggestion.suggested_position;
                if let Some(zone_id) = &suggestion.target_zone_id {
                    item.location = Some(zone_id.clone());
                }
                applied += 1;
            }
            Ok(applied)
        })?;
        info!(applied, total = suggestions.len(), "✅ Suggestions accepted");
        Ok(applied)
    }
}

fn replace_item(state: &mut Snapshot, item: Item) -> Result<(), InventoryError> {
    let slot = state
        .items
        .iter_mut()
        .find(|existing| existing.id == item.id)
        .ok_or_else(|| InventoryError::ItemNotFound(item.id.clone()))?;
    *slot = item;
    Ok(())
}

fn replace_zone(state: &mut Snapshot, zone: Zone) -> Result<(), InventoryError> {
    let slot = state
        .zones
        .iter_mut()
        .find(|existing| existing.id == zone.id)
        .ok_or_else(|| InventoryError::ZoneNotFound(zone.id.clone()))?;
    *slot = zone;
    Ok(())
}

fn warn_on_overlap(zone: &Zone, zones: &[Zone]) {
    for other in geometry::overlapping_zones(zone, zones) {
        warn!(
            zone = %zone.id,
            other = %other.id,
            "⚠️ Zone footprints overlap; items dropped there land in the first listed zone"
        );
    }
}
