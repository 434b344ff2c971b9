use dimtree_core::{ContainerId, EntryId, EntryKind, IndexValue, Model, SetId};

/// A small dynamic hierarchy used across the integration tests
///
/// Root `fs` holds:
/// - `flow`: variable over (location, time)
/// - `scale`: scalar variable
/// - `demand`: variable over location
/// - `design`: relation over location
/// - `balance`: relation over (location, time)
/// - child group `unit` over location, each instance holding a scalar
///   `area` variable and a `holdup` variable over time
/// - child group `batch` over time, each instance holding a `charge`
///   variable over location
#[allow(dead_code)]
pub struct DynamicTree {
    pub model: Model,
    pub root: ContainerId,
    pub time: SetId,
    pub location: SetId,
    pub units: Vec<ContainerId>,
    pub batches: Vec<ContainerId>,
}

/// Build a [`DynamicTree`] named `name`, records unset
#[allow(dead_code)]
pub fn dynamic_tree(name: &str) -> DynamicTree {
    let mut model = Model::new(name);
    let time = model.add_set("time", 1, time_points()).unwrap();
    let location = model.add_set("location", 1, locations()).unwrap();
    let root = model.add_root("fs");
    model
        .add_entry(root, "flow", EntryKind::Variable, &[location, time])
        .unwrap();
    model
        .add_entry(root, "scale", EntryKind::Variable, &[])
        .unwrap();
    model
        .add_entry(root, "demand", EntryKind::Variable, &[location])
        .unwrap();
    model
        .add_entry(root, "design", EntryKind::Relation, &[location])
        .unwrap();
    model
        .add_entry(root, "balance", EntryKind::Relation, &[location, time])
        .unwrap();
    let units = model.add_container(root, "unit", &[location]).unwrap();
    for unit in &units {
        model
            .add_entry(*unit, "area", EntryKind::Variable, &[])
            .unwrap();
        model
            .add_entry(*unit, "holdup", EntryKind::Variable, &[time])
            .unwrap();
    }
    let batches = model.add_container(root, "batch", &[time]).unwrap();
    for batch in &batches {
        model
            .add_entry(*batch, "charge", EntryKind::Variable, &[location])
            .unwrap();
    }
    DynamicTree {
        model,
        root,
        time,
        location,
        units,
        batches,
    }
}

/// A steady (time-free) mirror of [`DynamicTree`]
///
/// Root `fs` holds `flow` over location, scalar `scale`, and a child group
/// `unit` over location, each instance holding a scalar `area`. Every
/// variable record is populated.
#[allow(dead_code)]
pub struct SteadyTree {
    pub model: Model,
    pub root: ContainerId,
    pub location: SetId,
    pub units: Vec<ContainerId>,
}

#[allow(dead_code)]
pub fn steady_tree(name: &str) -> SteadyTree {
    let mut model = Model::new(name);
    let location = model.add_set("location", 1, locations()).unwrap();
    let root = model.add_root("fs");
    let flow = model
        .add_entry(root, "flow", EntryKind::Variable, &[location])
        .unwrap();
    model
        .set_value(flow, &IndexValue::single("A"), 10.0)
        .unwrap();
    model
        .set_value(flow, &IndexValue::single("B"), 20.0)
        .unwrap();
    let scale = model
        .add_entry(root, "scale", EntryKind::Variable, &[])
        .unwrap();
    model.set_value(scale, &IndexValue::scalar(), 7.0).unwrap();
    let demand = model
        .add_entry(root, "demand", EntryKind::Variable, &[location])
        .unwrap();
    model
        .set_value(demand, &IndexValue::single("A"), 1.0)
        .unwrap();
    model
        .set_value(demand, &IndexValue::single("B"), 2.0)
        .unwrap();
    let units = model.add_container(root, "unit", &[location]).unwrap();
    for (i, unit) in units.iter().enumerate() {
        let area = model
            .add_entry(*unit, "area", EntryKind::Variable, &[])
            .unwrap();
        model
            .set_value(area, &IndexValue::scalar(), 100.0 + i as f64)
            .unwrap();
    }
    SteadyTree {
        model,
        root,
        location,
        units,
    }
}

/// Look up an entry held by `container` by name
#[allow(dead_code)]
pub fn entry_named(model: &Model, container: ContainerId, name: &str) -> EntryId {
    model.container(container).unwrap().entries[name]
}

#[allow(dead_code)]
pub fn value(model: &Model, entry: EntryId, index: &IndexValue) -> Option<f64> {
    model.record(entry, index).unwrap().value
}

#[allow(dead_code)]
pub fn time_points() -> Vec<IndexValue> {
    vec![
        IndexValue::single(0),
        IndexValue::single(1),
        IndexValue::single(2),
    ]
}

#[allow(dead_code)]
pub fn locations() -> Vec<IndexValue> {
    vec![IndexValue::single("A"), IndexValue::single("B")]
}
