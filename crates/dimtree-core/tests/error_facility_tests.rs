mod common;

use common::{dynamic_tree, entry_named};
use dimtree_core::algebra::{locate_factor, project_except};
use dimtree_core::traversal::{build_path, resolve};
use dimtree_core::{DimTreeError, EntryKind, PathTarget};

#[test]
fn test_projection_of_unindexed_product_is_a_precondition() {
    let f = dynamic_tree("dyn");
    let design = f
        .model
        .entry(entry_named(&f.model, f.root, "design"))
        .unwrap();

    let err = project_except(&f.model, &design.product, &[f.time]).unwrap_err();

    assert_eq!(err.code(), "ERR_NOT_INDEXED_BY");
    assert!(err.is_precondition());
    assert!(err.to_string().contains("time"));
}

#[test]
fn test_repeated_factor_is_a_precondition() {
    let mut f = dynamic_tree("dyn");
    let doubled = f
        .model
        .add_entry(f.root, "doubled", EntryKind::Relation, &[f.time, f.time])
        .unwrap();
    let product = f.model.entry(doubled).unwrap().product.clone();

    let err = locate_factor(&f.model, &product, f.time).unwrap_err();

    assert_eq!(err, DimTreeError::RepeatedFactor { set: f.time });
    assert!(err.is_precondition());
}

#[test]
fn test_structural_mismatch_classification_drives_allow_miss() {
    let f = dynamic_tree("dyn");
    let area = entry_named(&f.model, f.units[0], "area");
    let path = build_path(&f.model, &PathTarget::Entry(area), f.root, true).unwrap();

    // Same model but wrong root: the path's names do not exist there
    let err = resolve(&f.model, f.batches[0], &path, false).unwrap_err();
    assert!(err.is_structural_mismatch());
    assert!(!err.is_precondition());

    // The identical walk under allow_miss becomes an absent result
    let missed = resolve(&f.model, f.batches[0], &path, true).unwrap();
    assert_eq!(missed, None);
}

#[test]
fn test_store_lookup_errors_carry_the_dangling_id() {
    let f = dynamic_tree("dyn");
    let foreign = dynamic_tree("other");
    let stray = entry_named(&foreign.model, foreign.root, "flow");

    let err = f.model.entry(stray).unwrap_err();

    assert_eq!(err, DimTreeError::EntryNotFound { entry: stray });
    assert_eq!(err.code(), "ERR_ENTRY_NOT_FOUND");
    assert!(err.is_store_lookup());
}
