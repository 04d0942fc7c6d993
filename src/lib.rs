//! tile-link (workspace facade crate).
//!
//! Re-exports the workspace crates as `tile_link::{core, adapter, types}` so
//! integration tests and the binary depend on one package.

pub use tile_link_adapter as adapter;
pub use tile_link_core as core;
pub use tile_link_types as types;
