//! Deterministic JSON serialization and the on-disk artifact layout.

pub mod json;
pub mod writer;

pub use json::{sort_json_keys, to_sorted_pretty, WriteError};
pub use writer::NetworkWriter;
