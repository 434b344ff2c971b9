//! Mirror resolution: replaying a captured path against a second,
//! structurally-similar hierarchy
//!
//! Used to locate "the same" entity in an independently built tree — e.g. a
//! steady-state instance mirrored by a dynamic one — optionally substituting
//! the coordinate of one index dimension at every step, so trees that differ
//! only in that dimension's range can still be matched at a fixed reference
//! point.

use dimtree_core_types::{ContainerId, EntryId, SetId};

use tracing::warn;

use crate::algebra::{is_explicitly_indexed_by, locate_factor};
use crate::errors::{DimTreeError, Result};
use crate::model::Coord;
use crate::ops::Model;

use super::path::Path;

/// What a path resolved to in the target hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolved {
    Container(ContainerId),
    Entry(EntryId),
}

/// Replay a path against `root`, step by step
///
/// Each step is a name lookup (child groups first, entries as terminal
/// steps) followed by index application. With `allow_miss`, a missing name
/// or index is reported at warning severity and `None` is returned instead
/// of an error.
///
/// # Errors
/// * `NameNotFound` / `IndexNotFound` - structural mismatch, unless
///   `allow_miss`
/// * `ContainerNotFound` - the root id is dangling
pub fn resolve(
    model: &Model,
    root: ContainerId,
    path: &Path,
    allow_miss: bool,
) -> Result<Option<Resolved>> {
    resolve_inner(model, root, path, None, allow_miss)
}

/// Replay a path with one index dimension substituted
///
/// Identical walk to [`resolve`], but wherever the looked-up component's
/// product is explicitly indexed by `set`, the coordinate at that factor's
/// offset is replaced by `value` before the index is applied.
///
/// # Errors
/// In addition to the [`resolve`] errors:
/// * `CrossModel` - `set` does not belong to the target model
/// * `NotAMember` - `value` is not an element of `set`
pub fn resolve_with_substitution(
    model: &Model,
    root: ContainerId,
    path: &Path,
    set: SetId,
    value: &Coord,
    allow_miss: bool,
) -> Result<Option<Resolved>> {
    let subst_set = model
        .set(set)
        .map_err(|_| DimTreeError::CrossModel { set })?;
    if !subst_set.contains_coord(value) {
        return Err(DimTreeError::NotAMember {
            set,
            value: value.clone(),
        });
    }
    resolve_inner(model, root, path, Some((set, value)), allow_miss)
}

fn resolve_inner(
    model: &Model,
    root: ContainerId,
    path: &Path,
    substitution: Option<(SetId, &Coord)>,
    allow_miss: bool,
) -> Result<Option<Resolved>> {
    let mut current = model.container(root)?.id;
    for (pos, step) in path.steps.iter().enumerate() {
        let node = model.container(current)?;
        if let Some(group) = node.children.get(&step.name) {
            let mut index = step.index.clone();
            if let Some((set, value)) = substitution {
                if !group.product.is_scalar()
                    && is_explicitly_indexed_by(model, &group.product, &[set])?
                {
                    let loc = locate_factor(model, &group.product, set)?;
                    match index.coords_mut().get_mut(loc) {
                        Some(coord) => *coord = value.clone(),
                        None => {
                            return miss(
                                allow_miss,
                                DimTreeError::IndexNotFound {
                                    name: step.name.clone(),
                                    index,
                                },
                            )
                        }
                    }
                }
            }
            match group.instances.get(&index) {
                Some(id) => current = *id,
                None => {
                    return miss(
                        allow_miss,
                        DimTreeError::IndexNotFound {
                            name: step.name.clone(),
                            index,
                        },
                    )
                }
            }
        } else if let Some(entry) = node.entries.get(&step.name) {
            // Entries are leaves; a path that keeps going past one is a
            // mismatch
            if pos + 1 != path.steps.len() {
                return miss(
                    allow_miss,
                    DimTreeError::NameNotFound {
                        name: path.steps[pos + 1].name.clone(),
                    },
                );
            }
            return Ok(Some(Resolved::Entry(*entry)));
        } else {
            return miss(
                allow_miss,
                DimTreeError::NameNotFound {
                    name: step.name.clone(),
                },
            );
        }
    }
    Ok(Some(Resolved::Container(current)))
}

fn miss<T>(allow_miss: bool, err: DimTreeError) -> Result<Option<T>> {
    if allow_miss {
        warn!(error = %err, "mirror resolution miss");
        Ok(None)
    } else {
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EntryKind, IndexValue};
    use crate::traversal::path::{build_path, PathTarget};

    fn two_trees() -> (Model, ContainerId, EntryId, Model, ContainerId) {
        let mut src = Model::new("steady");
        let src_root = src.add_root("fs");
        let unit = src.add_container(src_root, "unit", &[]).unwrap()[0];
        let entry = src
            .add_entry(unit, "holdup", EntryKind::Variable, &[])
            .unwrap();

        let mut tgt = Model::new("dynamic");
        let tgt_root = tgt.add_root("fs");
        let t_unit = tgt.add_container(tgt_root, "unit", &[]).unwrap()[0];
        tgt.add_entry(t_unit, "holdup", EntryKind::Variable, &[])
            .unwrap();

        (src, src_root, entry, tgt, tgt_root)
    }

    #[test]
    fn test_resolve_finds_mirrored_entry() {
        let (src, src_root, entry, tgt, tgt_root) = two_trees();
        let path = build_path(&src, &PathTarget::Entry(entry), src_root, true).unwrap();
        let resolved = resolve(&tgt, tgt_root, &path, false).unwrap();
        let Some(Resolved::Entry(found)) = resolved else {
            panic!("expected an entry");
        };
        assert_eq!(tgt.entry(found).unwrap().name, "holdup");
    }

    #[test]
    fn test_resolve_missing_name_raises_or_misses() {
        let (src, src_root, entry, mut tgt, _) = two_trees();
        let bare_root = tgt.add_root("bare");
        let path = build_path(&src, &PathTarget::Entry(entry), src_root, true).unwrap();

        let strict = resolve(&tgt, bare_root, &path, false);
        assert!(matches!(strict, Err(DimTreeError::NameNotFound { .. })));

        let lenient = resolve(&tgt, bare_root, &path, true).unwrap();
        assert!(lenient.is_none());
    }

    #[test]
    fn test_substitution_replaces_one_coordinate() {
        let mut src = Model::new("steady");
        let src_root = src.add_root("fs");
        let unit = src.add_container(src_root, "unit", &[]).unwrap()[0];
        let entry = src
            .add_entry(unit, "holdup", EntryKind::Variable, &[])
            .unwrap();

        let mut tgt = Model::new("dynamic");
        let time = tgt
            .add_set(
                "time",
                1,
                vec![IndexValue::single(0), IndexValue::single(1)],
            )
            .unwrap();
        let tgt_root = tgt.add_root("fs");
        let units = tgt.add_container(tgt_root, "unit", &[time]).unwrap();
        tgt.add_entry(units[0], "holdup", EntryKind::Variable, &[])
            .unwrap();
        tgt.add_entry(units[1], "holdup", EntryKind::Variable, &[])
            .unwrap();

        // The source path carries an empty index for "unit"; substitution
        // cannot patch a coordinate that is not there, so the walk misses.
        let path = build_path(&src, &PathTarget::Entry(entry), src_root, true).unwrap();
        let lenient =
            resolve_with_substitution(&tgt, tgt_root, &path, time, &Coord::from(1), true).unwrap();
        assert!(lenient.is_none());

        // A path captured inside the target itself resolves to the
        // substituted instance.
        let own_entry = tgt.container(units[0]).unwrap().entries["holdup"];
        let own_path = build_path(&tgt, &PathTarget::Entry(own_entry), tgt_root, true).unwrap();
        let resolved =
            resolve_with_substitution(&tgt, tgt_root, &own_path, time, &Coord::from(1), false)
                .unwrap();
        let Some(Resolved::Entry(found)) = resolved else {
            panic!("expected an entry");
        };
        assert_eq!(found, tgt.container(units[1]).unwrap().entries["holdup"]);
    }

    #[test]
    fn test_substitution_preconditions() {
        let (src, src_root, entry, tgt, tgt_root) = two_trees();
        let path = build_path(&src, &PathTarget::Entry(entry), src_root, true).unwrap();

        // A set from the source model is a cross-model violation against the
        // target
        let mut src2 = src.clone();
        let foreign = src2
            .add_set("time", 1, vec![IndexValue::single(0)])
            .unwrap();
        let result =
            resolve_with_substitution(&tgt, tgt_root, &path, foreign, &Coord::from(0), true);
        assert_eq!(result, Err(DimTreeError::CrossModel { set: foreign }));
    }

    #[test]
    fn test_substitution_value_must_be_member() {
        let (src, src_root, entry, mut tgt, tgt_root) = two_trees();
        let time = tgt
            .add_set("time", 1, vec![IndexValue::single(0)])
            .unwrap();
        let path = build_path(&src, &PathTarget::Entry(entry), src_root, true).unwrap();
        let result =
            resolve_with_substitution(&tgt, tgt_root, &path, time, &Coord::from(9), true);
        assert!(matches!(result, Err(DimTreeError::NotAMember { .. })));
    }
}
