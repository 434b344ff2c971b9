//! Selective deactivation and fixing across a hierarchy
//!
//! These operations slice a subtree along one distinguished set: either
//! suspending everything *at* chosen points of the set, or suspending and
//! pinning everything the set never touches. Both directions are needed to
//! carve a solvable sub-problem out of a larger structure, so each
//! operation returns exactly what it changed for later restoration.

use std::collections::BTreeMap;

use dimtree_core_types::{ContainerId, EntryId, SetId};

use tracing::warn;

use crate::algebra::{is_explicitly_indexed_by, is_implicitly_indexed_by, project_except};
use crate::errors::{DimTreeError, Result};
use crate::model::{Coord, EntryKind, IndexValue};
use crate::ops::Model;

/// One thing switched off by [`deactivate_at`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deactivated {
    /// A single relation record, addressed by entry and full index
    Entry(EntryId, IndexValue),
    /// A whole container instance
    Container(ContainerId),
}

/// Activity and fixity flags captured by the snapshot operations
///
/// Keys are stable ids, so a snapshot stays valid across mutations that do
/// not remove components and can be replayed to restore prior state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub entries: BTreeMap<(EntryId, IndexValue), bool>,
    pub containers: BTreeMap<ContainerId, bool>,
}

/// Deactivate every relation record and container instance at the given
/// points of `dset`
///
/// Targets are the relation entries and child groups in the subtree that
/// are explicitly indexed by `dset` and not held inside a `dset`-indexed
/// ancestor (those are covered when their ancestor instance is switched
/// off). For each target, each combination of the remaining dimensions is
/// completed with each point and the record or instance at the full index
/// is deactivated. Already-inactive records are left alone and not
/// reported. Sparse combinations are reported at warning severity and
/// skipped.
///
/// Returns, per point, everything that went from active to inactive.
///
/// # Errors
/// * `NotAMember` - a point is not an element of `dset`
pub fn deactivate_at(
    model: &mut Model,
    root: ContainerId,
    dset: SetId,
    points: &[Coord],
) -> Result<BTreeMap<IndexValue, Vec<Deactivated>>> {
    let ds = model.set(dset)?;
    for point in points {
        if !ds.contains_coord(point) {
            return Err(DimTreeError::NotAMember {
                set: dset,
                value: point.clone(),
            });
        }
    }
    let mut deactivated: BTreeMap<IndexValue, Vec<Deactivated>> = points
        .iter()
        .map(|p| (IndexValue::single(p.clone()), Vec::new()))
        .collect();

    for entry_id in model.entries_under(root)? {
        let (name, product, parent) = {
            let entry = model.entry(entry_id)?;
            if entry.kind != EntryKind::Relation {
                continue;
            }
            if !entry.is_indexed() || !is_explicitly_indexed_by(model, &entry.product, &[dset])? {
                continue;
            }
            (entry.name.clone(), entry.product.clone(), entry.parent)
        };
        if is_implicitly_indexed_by(model, Some(parent), dset, None)? {
            continue;
        }

        let (projection, completer) = project_except(model, &product, &[dset])?;
        for combo in model.product_elements(&projection)? {
            for point in points {
                let index = completer.complete_one(&combo, point.clone())?;
                let Some(rec) = model.entry_mut(entry_id)?.record_mut(&index) else {
                    warn!(entry = %name, index = %index, "deactivate_at: no record");
                    continue;
                };
                if !rec.active {
                    continue;
                }
                rec.deactivate();
                deactivated
                    .entry(IndexValue::single(point.clone()))
                    .or_default()
                    .push(Deactivated::Entry(entry_id, index));
            }
        }
    }

    for (owner, group_name) in model.groups_under(root)? {
        let (product, instances) = {
            let Some(group) = model.container(owner)?.children.get(&group_name) else {
                continue;
            };
            if group.product.is_scalar()
                || !is_explicitly_indexed_by(model, &group.product, &[dset])?
            {
                continue;
            }
            (group.product.clone(), group.instances.clone())
        };
        if is_implicitly_indexed_by(model, Some(owner), dset, None)? {
            continue;
        }

        let (projection, completer) = project_except(model, &product, &[dset])?;
        for combo in model.product_elements(&projection)? {
            for point in points {
                let index = completer.complete_one(&combo, point.clone())?;
                let Some(instance) = instances.get(&index).copied() else {
                    warn!(group = %group_name, index = %index, "deactivate_at: no instance");
                    continue;
                };
                let node = model.container_mut(instance)?;
                if !node.active {
                    continue;
                }
                node.active = false;
                deactivated
                    .entry(IndexValue::single(point.clone()))
                    .or_default()
                    .push(Deactivated::Container(instance));
            }
        }
    }

    Ok(deactivated)
}

/// Deactivate every active relation record untouched by `dset`
///
/// A relation qualifies when it is neither explicitly indexed by `dset` nor
/// held anywhere inside a `dset`-indexed ancestor. Returns what was
/// switched off, in deterministic order.
pub fn deactivate_unindexed(
    model: &mut Model,
    root: ContainerId,
    dset: SetId,
) -> Result<Vec<(EntryId, IndexValue)>> {
    let mut deactivated = Vec::new();
    for entry_id in untouched_entries(model, root, dset, EntryKind::Relation)? {
        let mut indices: Vec<IndexValue> =
            model.entry(entry_id)?.records.keys().cloned().collect();
        indices.sort();
        for index in indices {
            let Some(rec) = model.entry_mut(entry_id)?.record_mut(&index) else {
                continue;
            };
            if rec.active {
                rec.deactivate();
                deactivated.push((entry_id, index));
            }
        }
    }
    Ok(deactivated)
}

/// Fix every variable record untouched by `dset` that carries a value
///
/// The same qualification as [`deactivate_unindexed`], applied to
/// variables. Records without a defined value stay unfixed; records
/// already fixed are left alone and not reported.
pub fn fix_unindexed(
    model: &mut Model,
    root: ContainerId,
    dset: SetId,
) -> Result<Vec<(EntryId, IndexValue)>> {
    let mut fixed = Vec::new();
    for entry_id in untouched_entries(model, root, dset, EntryKind::Variable)? {
        let mut indices: Vec<IndexValue> =
            model.entry(entry_id)?.records.keys().cloned().collect();
        indices.sort();
        for index in indices {
            let Some(rec) = model.entry_mut(entry_id)?.record_mut(&index) else {
                continue;
            };
            if !rec.fixed && rec.value.is_some() {
                rec.fix();
                fixed.push((entry_id, index));
            }
        }
    }
    Ok(fixed)
}

/// Capture the active flag of every relation record and container instance
/// under `root`
pub fn activity_snapshot(model: &Model, root: ContainerId) -> Result<Snapshot> {
    let mut snapshot = Snapshot::default();
    for entry_id in model.entries_under(root)? {
        let entry = model.entry(entry_id)?;
        if entry.kind != EntryKind::Relation {
            continue;
        }
        for (index, rec) in &entry.records {
            snapshot
                .entries
                .insert((entry_id, index.clone()), rec.active);
        }
    }
    for instance in model.instances_under(root)? {
        snapshot
            .containers
            .insert(instance, model.container(instance)?.active);
    }
    Ok(snapshot)
}

/// Capture the fixed flag of every variable record under `root`
pub fn fixity_snapshot(model: &Model, root: ContainerId) -> Result<Snapshot> {
    let mut snapshot = Snapshot::default();
    for entry_id in model.entries_under(root)? {
        let entry = model.entry(entry_id)?;
        if entry.kind != EntryKind::Variable {
            continue;
        }
        for (index, rec) in &entry.records {
            snapshot
                .entries
                .insert((entry_id, index.clone()), rec.fixed);
        }
    }
    Ok(snapshot)
}

/// Entries of one kind neither explicitly nor implicitly indexed by `dset`
fn untouched_entries(
    model: &Model,
    root: ContainerId,
    dset: SetId,
    kind: EntryKind,
) -> Result<Vec<EntryId>> {
    let mut out = Vec::new();
    for entry_id in model.entries_under(root)? {
        let parent = {
            let entry = model.entry(entry_id)?;
            if entry.kind != kind {
                continue;
            }
            if entry.is_indexed() && is_explicitly_indexed_by(model, &entry.product, &[dset])? {
                continue;
            }
            entry.parent
        };
        if is_implicitly_indexed_by(model, Some(parent), dset, None)? {
            continue;
        }
        out.push(entry_id);
    }
    Ok(out)
}
