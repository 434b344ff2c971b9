//! DimTree Core - Index algebra and hierarchy navigation engine
//!
//! This crate provides the foundational data structures and operations for
//! DimTree, including:
//! - Index set, container hierarchy, and entry models with dense or sparse
//!   records
//! - Set-product algebra: explicit/implicit indexing tests and set-except
//!   projection with index completion
//! - Path capture from any entity up to a declared root, replayable against
//!   structurally-mirrored hierarchies with coordinate substitution
//! - Best-effort value projection between mirrored hierarchies
//! - Selective deactivation and fixing along one distinguished set

pub mod activation;
pub mod algebra;
pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod ops;
pub mod sync;
pub mod traversal;

// Re-export commonly used types
pub use dimtree_core_types::{ContainerId, EntryId, ModelId, SetId};
pub use errors::{DimTreeError, Result};
pub use model::{Coord, Entry, EntryKind, IndexSet, IndexValue, SetProduct};
pub use ops::Model;
pub use traversal::{Path, PathStep, PathTarget, Resolved};
