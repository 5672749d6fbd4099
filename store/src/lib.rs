//! Marker-set state: the in-memory model, its two JSON wire shapes, and the
//! session state file.

mod atomic_write;
mod persistence;
mod store;
mod wire;

pub use atomic_write::atomic_write;
pub use persistence::{read_markers, write_markers};
pub use store::MarkerStore;
pub use wire::{LoadReport, MarkersState, SnapshotError};
