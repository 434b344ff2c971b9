//! Identifier types for identity-based membership
//!
//! Ids are UUIDv7-backed and `Copy`, so they can be passed around freely and
//! used as map keys without cloning. Equality of ids is the only notion of
//! "sameness" the engine recognises for sets, containers, and entries.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for one model instance
///
/// Every set, container, and entry records the model it was built in, which
/// is what makes cross-model misuse detectable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ModelId(Uuid);

impl ModelId {
    /// Generate a new random ModelId using UUIDv7
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for ModelId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ModelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for an index set
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SetId(Uuid);

impl SetId {
    /// Generate a new random SetId using UUIDv7
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for SetId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a container instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ContainerId(Uuid);

impl ContainerId {
    /// Generate a new random ContainerId using UUIDv7
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for ContainerId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ContainerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntryId(Uuid);

impl EntryId {
    /// Generate a new random EntryId using UUIDv7
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
