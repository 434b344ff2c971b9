use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use dimtree_core_types::{ContainerId, EntryId, ModelId};

use super::set::{IndexValue, SetProduct};

/// One indexed family of child container instances under a parent
///
/// The group carries the component-level metadata (the product and whether an
/// index must be applied after name lookup), while each instance is a full
/// `Container` node in the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChildGroup {
    /// Index product shared by every instance in the group; scalar for a
    /// plain (unindexed) child
    pub product: SetProduct,
    /// Index value to container instance; scalar children hold exactly one
    /// instance at the empty index
    pub instances: HashMap<IndexValue, ContainerId>,
}

/// A named node in a hierarchy
///
/// One `Container` is one *instance*: sibling instances created for the same
/// indexed child share `name` and `product` and differ only in `index`.
/// Children and entries are name-keyed in BTreeMaps so iteration order is
/// deterministic; the store owns every node exactly once, so subtree
/// iteration needs no visited set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Container {
    pub id: ContainerId,
    pub model: ModelId,
    /// Local name of the component this instance belongs to
    pub name: String,
    /// The component's own index product; scalar for unindexed containers
    pub product: SetProduct,
    /// This instance's own index within `product`; empty for scalar
    /// containers
    pub index: IndexValue,
    /// Parent instance; None only for tree roots
    pub parent: Option<ContainerId>,
    /// Activation flag, mutable after construction
    pub active: bool,
    pub children: BTreeMap<String, ChildGroup>,
    pub entries: BTreeMap<String, EntryId>,
}

impl Container {
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn is_indexed(&self) -> bool {
        !self.product.is_scalar()
    }

    /// Whether a child or entry already uses the given local name
    pub fn has_name(&self, name: &str) -> bool {
        self.children.contains_key(name) || self.entries.contains_key(name)
    }
}
