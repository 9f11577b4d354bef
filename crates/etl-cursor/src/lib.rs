//! The Cursor Store: durable per-stream progress markers.

pub mod store;

pub use store::{CursorStore, JsonFileCursorStore};
