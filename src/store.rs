//! Persistence of the planner state as a single versioned snapshot.
//!
//! The snapshot schema doubles as the export/import format:
//! `{items, zones, room, categories, version}`.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};
use utoipa::ToSchema;

use crate::geometry;
use crate::model::{Item, PALETTE, Room, Zone};
use crate::types::{Dimensions, Position, validation};

/// Version tag written into every snapshot.
pub const SNAPSHOT_VERSION: &str = "2.0";

/// Categories offered on a fresh install.
pub const DEFAULT_CATEGORIES: [&str; 7] = [
    "Furniture",
    "Decoration",
    "Sports",
    "Tools",
    "Travel",
    "Clothing",
    "Other",
];

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("could not replace snapshot file: {0}")]
    Persist(#[from] tempfile::PersistError),
    #[error("invalid snapshot: {0}")]
    Invalid(String),
}

/// Complete planner state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Snapshot {
    pub items: Vec<Item>,
    pub zones: Vec<Zone>,
    pub room: Room,
    pub categories: Vec<String>,
    pub version: String,
}

impl Snapshot {
    /// An empty state in the default room.
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            zones: Vec::new(),
            room: Room::default(),
            categories: default_categories(),
            version: SNAPSHOT_VERSION.to_string(),
        }
    }

    /// Demo state used on first start.
    pub fn seed() -> Self {
        let zones = vec![
            Zone {
                id: "z1".into(),
                name: "Main Shelf".into(),
                dimensions: Dimensions::new(120.0, 180.0, 40.0),
                position: Position::new(-80.0, 90.0, -100.0),
                color: PALETTE[3].into(),
                shelf_heights: vec![60.0, 60.0, 60.0],
            },
            Zone {
                id: "z2".into(),
                name: "Tall Shelf".into(),
                dimensions: Dimensions::new(100.0, 220.0, 50.0),
                position: Position::new(50.0, 110.0, 50.0),
                color: PALETTE[2].into(),
                shelf_heights: vec![80.0, 50.0, 50.0, 40.0],
            },
        ];
        let items = vec![
            Item {
                id: "1".into(),
                name: "Christmas Box".into(),
                category: "Decoration".into(),
                quantity: 1,
                dimensions: Dimensions::new(40.0, 40.0, 60.0),
                location: Some("z1".into()),
                color: PALETTE[0].into(),
                position: Position::new(-100.0, 20.0, -100.0),
                photo_url: None,
                reminder_date: None,
                reminder_note: None,
            },
            Item {
                id: "2".into(),
                name: "Mountain Bike".into(),
                category: "Sports".into(),
                quantity: 1,
                dimensions: Dimensions::new(20.0, 100.0, 180.0),
                location: None,
                color: PALETTE[3].into(),
                position: Position::new(50.0, 50.0, 0.0),
                photo_url: None,
                reminder_date: None,
                reminder_note: None,
            },
            Item {
                id: "3".into(),
                name: "Travel Bags".into(),
                category: "Travel".into(),
                quantity: 2,
                dimensions: Dimensions::new(50.0, 75.0, 30.0),
                location: None,
                color: PALETTE[2].into(),
                position: Position::new(-80.0, 37.5, 100.0),
                photo_url: None,
                reminder_date: None,
                reminder_note: None,
            },
        ];
        Self {
            items,
            zones,
            room: Room::default(),
            categories: default_categories(),
            version: SNAPSHOT_VERSION.to_string(),
        }
    }

    /// Checks the snapshot for structural problems.
    ///
    /// Every zone must satisfy [`geometry::check_zone`], item sides must be
    /// positive whole centimeters and ids must be unique. Item locations are
    /// not checked: dangling zone references are allowed and resolve to the
    /// floor.
    pub fn validate(&self) -> Result<(), StoreError> {
        for zone in &self.zones {
            geometry::check_zone(zone).map_err(|err| StoreError::Invalid(err.to_string()))?;
        }
        for item in &self.items {
            let dims = item.dimensions;
            validation::validate_dimensions(&dims)
                .map_err(|err| StoreError::Invalid(format!("item '{}': {}", item.id, err)))?;
            if let Some(value) = [dims.width, dims.height, dims.depth]
                .into_iter()
                .find(|v| !validation::is_whole(*v))
            {
                return Err(StoreError::Invalid(format!(
                    "item '{}' has a fractional dimension: {} (whole centimeters only)",
                    item.id, value
                )));
            }
        }
        if let Some(id) = first_duplicate(self.zones.iter().map(|z| z.id.as_str())) {
            return Err(StoreError::Invalid(format!("duplicate zone id '{}'", id)));
        }
        if let Some(id) = first_duplicate(self.items.iter().map(|i| i.id.as_str())) {
            return Err(StoreError::Invalid(format!("duplicate item id '{}'", id)));
        }
        Ok(())
    }

    /// Serializes the snapshot as pretty-printed JSON for download.
    pub fn to_export_json(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn default_categories() -> Vec<String> {
    DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect()
}

fn first_duplicate<'a>(ids: impl Iterator<Item = &'a str>) -> Option<&'a str> {
    let mut seen = std::collections::HashSet::new();
    ids.into_iter().find(|id| !seen.insert(*id))
}

/// Snapshot as accepted on import. Only `items` and `zones` are required.
#[derive(Clone, Debug, Deserialize, ToSchema)]
pub struct ImportedSnapshot {
    pub items: Vec<Item>,
    pub zones: Vec<Zone>,
    #[serde(default)]
    pub room: Option<Room>,
    #[serde(default)]
    pub categories: Option<Vec<String>>,
    #[serde(default)]
    pub version: Option<String>,
}

impl ImportedSnapshot {
    /// Fills in defaults and validates the result.
    pub fn into_snapshot(self) -> Result<Snapshot, StoreError> {
        match self.version.as_deref() {
            Some(SNAPSHOT_VERSION) | None => {}
            Some(version) => debug!(version, "importing snapshot with foreign version tag"),
        }
        let snapshot = Snapshot {
            items: self.items,
            zones: self.zones,
            room: self.room.unwrap_or_default(),
            categories: self.categories.unwrap_or_else(default_categories),
            version: SNAPSHOT_VERSION.to_string(),
        };
        snapshot.validate()?;
        Ok(snapshot)
    }
}

/// Parses an exported JSON document.
pub fn parse_import(json: &str) -> Result<Snapshot, StoreError> {
    let imported: ImportedSnapshot = serde_json::from_str(json)?;
    imported.into_snapshot()
}

/// Load/save contract for the planner state.
pub trait SnapshotStore: Send + Sync {
    /// Returns the stored snapshot, or `None` if nothing was saved yet.
    fn load(&self) -> Result<Option<Snapshot>, StoreError>;

    /// Replaces the stored snapshot.
    fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError>;
}

/// Stores the snapshot as a JSON file, replaced atomically on every save.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn directory(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }
}

impl SnapshotStore for JsonFileStore {
    fn load(&self) -> Result<Option<Snapshot>, StoreError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let snapshot = parse_import(&raw)?;
        info!(
            path = %self.path.display(),
            items = snapshot.items.len(),
            zones = snapshot.zones.len(),
            "📂 Loaded snapshot"
        );
        Ok(Some(snapshot))
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        use std::io::Write;

        let json = serde_json::to_vec_pretty(snapshot)?;
        let mut file = tempfile::NamedTempFile::new_in(self.directory())?;
        file.write_all(&json)?;
        file.as_file().sync_all()?;
        file.persist(&self.path)?;
        debug!(path = %self.path.display(), bytes = json.len(), "saved snapshot");
        Ok(())
    }
}

/// Keeps the snapshot in memory. Used for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    snapshot: Mutex<Option<Snapshot>>,
    fail_saves: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            snapshot: Mutex::new(Some(snapshot)),
            fail_saves: AtomicBool::new(false),
        }
    }

    /// Makes every following save fail with an I/O error.
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Last successfully saved snapshot.
    pub fn current(&self) -> Option<Snapshot> {
        self.snapshot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self) -> Result<Option<Snapshot>, StoreError> {
        Ok(self.current())
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StoreError::Io(std::io::Error::other("memory store refuses saves")));
        }
        *self
            .snapshot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(snapshot.clone());
        Ok(())
    }
}
