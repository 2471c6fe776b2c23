//! Storage planner: a room of shelving zones, a catalog of items and the snap
//! engine that decides where a dragged item comes to rest.

pub mod advisor;
pub mod api;
pub mod config;
pub mod geometry;
pub mod inventory;
pub mod model;
pub mod snap;
pub mod store;
pub mod types;
