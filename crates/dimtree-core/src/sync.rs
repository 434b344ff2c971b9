//! Best-effort bulk value propagation between two structurally-mirrored
//! hierarchies
//!
//! Both operations are idempotent under stable source values and never
//! transactional: a failure to resolve one entity is reported at warning
//! severity and iteration continues. Fixed target records are skipped
//! uniformly unless `copy_fixed` is set.

use dimtree_core_types::{ContainerId, EntryId, SetId};

use tracing::warn;

use crate::algebra::{is_explicitly_indexed_by, is_implicitly_indexed_by, project_except};
use crate::errors::{DimTreeError, Result};
use crate::model::{Coord, EntryKind, IndexValue};
use crate::ops::Model;
use crate::traversal::{build_path, resolve, PathTarget, Resolved};

/// Copy values for every target variable not indexed by `dset`
///
/// Variables held directly by the target root are matched in the source by
/// plain name; a scalar source broadcasts its value into every target
/// record, an indexed source copies record-by-record at matching indices.
/// Variables inside container instances that are neither explicitly nor
/// implicitly indexed by `dset` are matched through `build_path` +
/// [`resolve`] instead, since nested entries may carry index dimensions not
/// determinable by name alone.
///
/// Missing source entities are reported at warning severity and skipped.
///
/// # Errors
/// Store lookups for dangling ids; never an error for absent source
/// entities.
pub fn copy_name_matched(
    tgt: &mut Model,
    tgt_root: ContainerId,
    src: &Model,
    src_root: ContainerId,
    dset: SetId,
    copy_fixed: bool,
) -> Result<()> {
    // Variables held directly by the root, matched by plain name
    let direct: Vec<EntryId> = tgt.container(tgt_root)?.entries.values().copied().collect();
    for entry_id in direct {
        let name = {
            let entry = tgt.entry(entry_id)?;
            if entry.kind != EntryKind::Variable {
                continue;
            }
            if entry.is_indexed() && is_explicitly_indexed_by(tgt, &entry.product, &[dset])? {
                continue;
            }
            entry.name.clone()
        };
        let Some(src_entry) = src.container(src_root)?.entries.get(&name).copied() else {
            warn!(
                entry = %name,
                source = %src.name(),
                "copy_name_matched: entry does not exist in source"
            );
            continue;
        };
        if src.entry(src_entry)?.is_indexed() {
            copy_matching_records(tgt, entry_id, src, src_entry, copy_fixed)?;
        } else {
            let value = src
                .entry(src_entry)?
                .record(&IndexValue::scalar())
                .and_then(|rec| rec.value);
            broadcast_value(tgt, entry_id, value, copy_fixed)?;
        }
    }

    // Variables inside container instances not touched by dset, matched
    // through path replay
    for instance in tgt.instances_under(tgt_root)? {
        let (product, parent) = {
            let node = tgt.container(instance)?;
            (node.product.clone(), node.parent)
        };
        if !product.is_scalar() && is_explicitly_indexed_by(tgt, &product, &[dset])? {
            continue;
        }
        if is_implicitly_indexed_by(tgt, parent, dset, None)? {
            continue;
        }

        let held: Vec<EntryId> = tgt.container(instance)?.entries.values().copied().collect();
        for entry_id in held {
            let name = {
                let entry = tgt.entry(entry_id)?;
                if entry.kind != EntryKind::Variable {
                    continue;
                }
                if entry.is_indexed() && is_explicitly_indexed_by(tgt, &entry.product, &[dset])? {
                    continue;
                }
                entry.name.clone()
            };
            let path = build_path(tgt, &PathTarget::Entry(entry_id), tgt_root, false)?;
            let src_parent = match resolve(src, src_root, &path, true)? {
                Some(Resolved::Container(id)) => id,
                _ => continue,
            };
            let Some(src_entry) = src.container(src_parent)?.entries.get(&name).copied() else {
                warn!(
                    entry = %name,
                    "copy_name_matched: entry does not exist in source container"
                );
                continue;
            };
            copy_matching_records(tgt, entry_id, src, src_entry, copy_fixed)?;
        }
    }
    Ok(())
}

/// Copy values between two points of `dset` for everything indexed by it
///
/// For every target variable explicitly indexed by `dset`, the same-named
/// source entry is located through path replay and, for each combination of
/// the remaining dimensions, the value at (combination, `t_source`) in the
/// source is copied into (combination, `t_target`) in the target. For every
/// target container group explicitly indexed by `dset`, the matching source
/// group is located the same way and each contained variable record is
/// copied between the corresponding instances.
///
/// # Errors
/// * `NotAMember` - either point is not an element of `dset`
/// * store lookups for dangling ids; absent source entities and sparse
///   records are reported at warning severity and skipped.
pub fn copy_at_points(
    tgt: &mut Model,
    tgt_root: ContainerId,
    src: &Model,
    src_root: ContainerId,
    dset: SetId,
    t_target: &Coord,
    t_source: &Coord,
    copy_fixed: bool,
) -> Result<()> {
    let ds = tgt.set(dset)?;
    for point in [t_target, t_source] {
        if !ds.contains_coord(point) {
            return Err(DimTreeError::NotAMember {
                set: dset,
                value: point.clone(),
            });
        }
    }

    // Variables explicitly indexed by dset
    for entry_id in tgt.entries_under(tgt_root)? {
        let (name, product) = {
            let entry = tgt.entry(entry_id)?;
            if entry.kind != EntryKind::Variable {
                continue;
            }
            if !entry.is_indexed() || !is_explicitly_indexed_by(tgt, &entry.product, &[dset])? {
                continue;
            }
            (entry.name.clone(), entry.product.clone())
        };
        let path = build_path(tgt, &PathTarget::Entry(entry_id), tgt_root, false)?;
        let src_parent = match resolve(src, src_root, &path, true)? {
            Some(Resolved::Container(id)) => id,
            _ => continue,
        };
        let Some(src_entry) = src.container(src_parent)?.entries.get(&name).copied() else {
            warn!(
                entry = %name,
                source = %src.name(),
                "copy_at_points: entry does not exist in source"
            );
            continue;
        };

        let (projection, completer) = project_except(tgt, &product, &[dset])?;
        for combo in tgt.product_elements(&projection)? {
            let target_index = completer.complete_one(&combo, t_target.clone())?;
            let source_index = completer.complete_one(&combo, t_source.clone())?;
            let source_value = match src.entry(src_entry)?.record(&source_index) {
                Some(rec) => rec.value,
                None => {
                    warn!(
                        entry = %name,
                        index = %source_index,
                        "copy_at_points: no source record"
                    );
                    continue;
                }
            };
            let Some(rec) = tgt.entry_mut(entry_id)?.record_mut(&target_index) else {
                warn!(
                    entry = %name,
                    index = %target_index,
                    "copy_at_points: no target record"
                );
                continue;
            };
            if rec.fixed && !copy_fixed {
                continue;
            }
            rec.value = source_value;
        }
    }

    // Container groups explicitly indexed by dset
    for (owner, group_name) in tgt.groups_under(tgt_root)? {
        let (product, instances) = {
            let Some(group) = tgt.container(owner)?.children.get(&group_name) else {
                continue;
            };
            if group.product.is_scalar()
                || !is_explicitly_indexed_by(tgt, &group.product, &[dset])?
            {
                continue;
            }
            (group.product.clone(), group.instances.clone())
        };

        let src_owner = if owner == tgt_root {
            src_root
        } else {
            let path = build_path(tgt, &PathTarget::Container(owner), tgt_root, true)?;
            match resolve(src, src_root, &path, true)? {
                Some(Resolved::Container(id)) => id,
                _ => continue,
            }
        };
        let Some(src_group) = src.container(src_owner)?.children.get(&group_name) else {
            warn!(
                group = %group_name,
                source = %src.name(),
                "copy_at_points: container does not exist in source"
            );
            continue;
        };
        let src_instances = src_group.instances.clone();

        let (projection, completer) = project_except(tgt, &product, &[dset])?;
        for combo in tgt.product_elements(&projection)? {
            let target_index = completer.complete_one(&combo, t_target.clone())?;
            let source_index = completer.complete_one(&combo, t_source.clone())?;
            let Some(tgt_instance) = instances.get(&target_index).copied() else {
                warn!(
                    group = %group_name,
                    index = %target_index,
                    "copy_at_points: no target instance"
                );
                continue;
            };
            let Some(src_instance) = src_instances.get(&source_index).copied() else {
                warn!(
                    group = %group_name,
                    index = %source_index,
                    "copy_at_points: no source instance"
                );
                continue;
            };

            // Correspondence within the instance pair is path-based, since
            // nested entries may carry further index dimensions
            for entry_id in tgt.entries_under(tgt_instance)? {
                let name = {
                    let entry = tgt.entry(entry_id)?;
                    if entry.kind != EntryKind::Variable {
                        continue;
                    }
                    entry.name.clone()
                };
                let path = build_path(tgt, &PathTarget::Entry(entry_id), tgt_instance, false)?;
                let src_parent = match resolve(src, src_instance, &path, true)? {
                    Some(Resolved::Container(id)) => id,
                    _ => continue,
                };
                let Some(src_entry) = src.container(src_parent)?.entries.get(&name).copied()
                else {
                    warn!(
                        entry = %name,
                        "copy_at_points: entry does not exist in source instance"
                    );
                    continue;
                };
                copy_matching_records(tgt, entry_id, src, src_entry, copy_fixed)?;
            }
        }
    }
    Ok(())
}

/// Copy values record-by-record at matching indices
fn copy_matching_records(
    tgt: &mut Model,
    tgt_entry: EntryId,
    src: &Model,
    src_entry: EntryId,
    copy_fixed: bool,
) -> Result<()> {
    let indices: Vec<IndexValue> = tgt.entry(tgt_entry)?.records.keys().cloned().collect();
    let src_e = src.entry(src_entry)?;
    for index in indices {
        let source_value = match src_e.record(&index) {
            Some(rec) => rec.value,
            None => {
                warn!(
                    entry = %src_e.name,
                    index = %index,
                    "copy skipped: no matching source record"
                );
                continue;
            }
        };
        let Some(rec) = tgt.entry_mut(tgt_entry)?.record_mut(&index) else {
            continue;
        };
        if rec.fixed && !copy_fixed {
            continue;
        }
        rec.value = source_value;
    }
    Ok(())
}

/// Broadcast one value into every record of a target entry
fn broadcast_value(
    tgt: &mut Model,
    tgt_entry: EntryId,
    value: Option<f64>,
    copy_fixed: bool,
) -> Result<()> {
    for rec in tgt.entry_mut(tgt_entry)?.records.values_mut() {
        if rec.fixed && !copy_fixed {
            continue;
        }
        rec.value = value;
    }
    Ok(())
}
