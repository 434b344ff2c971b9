use serde::{Deserialize, Serialize};

use dimtree_core_types::{ContainerId, EntryId};

use crate::errors::Result;
use crate::model::IndexValue;
use crate::ops::Model;

/// What a path is captured for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathTarget {
    Entry(EntryId),
    Container(ContainerId),
}

/// One navigation step: a local name lookup followed by index application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathStep {
    pub name: String,
    pub index: IndexValue,
}

/// A captured route from a root container down to a target
///
/// `complete` is false when the upward walk reached the top of the tree
/// without meeting the declared root. A partial path still describes a valid
/// route from wherever the walk stopped; callers decide whether that is
/// acceptable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Path {
    pub steps: Vec<PathStep>,
    pub complete: bool,
}

impl Path {
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Capture the (name, index) steps locating `target` from `root`
///
/// Walks parent containers upward, recording each ancestor's local name and
/// own index, until the recorded ancestor *is* `root` (id identity). If the
/// top of the tree is reached first, the result is marked incomplete rather
/// than silently truncated or rejected.
///
/// With `include_target`, a final step with the target's own name and index
/// is appended; entries contribute an empty index since their records are
/// addressed separately.
///
/// # Errors
/// * `EntryNotFound` / `ContainerNotFound` - the target or an ancestor id is
///   dangling
pub fn build_path(
    model: &Model,
    target: &PathTarget,
    root: ContainerId,
    include_target: bool,
) -> Result<Path> {
    let (mut parent, own_name, own_index) = match target {
        PathTarget::Entry(id) => {
            let entry = model.entry(*id)?;
            (Some(entry.parent), entry.name.clone(), IndexValue::scalar())
        }
        PathTarget::Container(id) => {
            let node = model.container(*id)?;
            (node.parent, node.name.clone(), node.index.clone())
        }
    };

    let mut steps = Vec::new();
    let mut complete = true;
    while parent != Some(root) {
        match parent {
            Some(id) => {
                let node = model.container(id)?;
                steps.push(PathStep {
                    name: node.name.clone(),
                    index: node.index.clone(),
                });
                parent = node.parent;
            }
            None => {
                // Top of the tree reached without meeting root
                complete = false;
                break;
            }
        }
    }
    steps.reverse();

    if include_target {
        steps.push(PathStep {
            name: own_name,
            index: own_index,
        });
    }
    Ok(Path { steps, complete })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EntryKind, IndexValue};

    #[test]
    fn test_path_for_direct_child_is_empty() {
        let mut model = Model::new("fs");
        let root = model.add_root("fs");
        let entry = model
            .add_entry(root, "flow", EntryKind::Variable, &[])
            .unwrap();

        let path = build_path(&model, &PathTarget::Entry(entry), root, false).unwrap();
        assert!(path.is_empty());
        assert!(path.is_complete());
    }

    #[test]
    fn test_path_records_ancestor_names_and_indices() {
        let mut model = Model::new("fs");
        let time = model
            .add_set(
                "time",
                1,
                vec![IndexValue::single(0), IndexValue::single(1)],
            )
            .unwrap();
        let root = model.add_root("fs");
        let units = model.add_container(root, "unit", &[time]).unwrap();
        let inner = model.add_container(units[1], "inner", &[]).unwrap()[0];
        let entry = model
            .add_entry(inner, "holdup", EntryKind::Variable, &[])
            .unwrap();

        let path = build_path(&model, &PathTarget::Entry(entry), root, true).unwrap();
        assert!(path.is_complete());
        assert_eq!(path.len(), 3);
        assert_eq!(path.steps[0].name, "unit");
        assert_eq!(path.steps[0].index, IndexValue::single(1));
        assert_eq!(path.steps[1].name, "inner");
        assert!(path.steps[1].index.is_scalar());
        assert_eq!(path.steps[2].name, "holdup");
    }

    #[test]
    fn test_unreachable_root_yields_partial_path() {
        let mut model = Model::new("fs");
        let root = model.add_root("fs");
        let other_root = model.add_root("other");
        let entry = model
            .add_entry(root, "flow", EntryKind::Variable, &[])
            .unwrap();

        let path = build_path(&model, &PathTarget::Entry(entry), other_root, false).unwrap();
        assert!(!path.is_complete());
        // The walk still recorded the route from the true top
        assert_eq!(path.len(), 1);
        assert_eq!(path.steps[0].name, "fs");
    }
}
