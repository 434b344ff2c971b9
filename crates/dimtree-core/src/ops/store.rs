use std::collections::{BTreeMap, HashMap};

use dimtree_core_types::{ContainerId, EntryId, ModelId, SetId};

use crate::errors::{DimTreeError, Result};
use crate::model::{
    ChildGroup, Container, Entry, EntryKind, IndexSet, IndexValue, Record, SetProduct,
};

/// In-memory store for one model instance
///
/// All sets, container instances, and entries of a hierarchy live here,
/// keyed by id. Objects are owned exactly once and referenced by id
/// everywhere else, which is what preserves identity across all calls:
/// nothing is ever deep-copied.
///
/// Structure (tree shape, index products) is fixed once built; only record
/// data and container activation flags mutate afterwards. Not thread-safe —
/// designed for single-threaded, batch-oriented use.
#[derive(Debug, Clone)]
pub struct Model {
    id: ModelId,
    name: String,
    pub(crate) sets: HashMap<SetId, IndexSet>,
    pub(crate) containers: HashMap<ContainerId, Container>,
    pub(crate) entries: HashMap<EntryId, Entry>,
}

impl Model {
    /// Create a new empty model
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: ModelId::new(),
            name: name.into(),
            sets: HashMap::new(),
            containers: HashMap::new(),
            entries: HashMap::new(),
        }
    }

    pub fn id(&self) -> ModelId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    // ===== Construction =====

    /// Register an index set
    ///
    /// Every element must have exactly `dimen` coordinates.
    ///
    /// # Errors
    /// * `ZeroDimension` - dimen is 0
    /// * `SetElementDimension` - an element has the wrong coordinate count
    pub fn add_set(
        &mut self,
        name: &str,
        dimen: usize,
        elements: Vec<IndexValue>,
    ) -> Result<SetId> {
        if dimen == 0 {
            return Err(DimTreeError::ZeroDimension {
                name: name.to_string(),
            });
        }
        for elem in &elements {
            if elem.dim() != dimen {
                return Err(DimTreeError::SetElementDimension {
                    name: name.to_string(),
                    expected: dimen,
                    got: elem.dim(),
                });
            }
        }
        let id = SetId::new();
        self.sets.insert(
            id,
            IndexSet {
                id,
                model: self.id,
                name: name.to_string(),
                dimen,
                elements,
            },
        );
        Ok(id)
    }

    /// Create a root container with no parent
    pub fn add_root(&mut self, name: &str) -> ContainerId {
        let id = ContainerId::new();
        self.containers.insert(
            id,
            Container {
                id,
                model: self.id,
                name: name.to_string(),
                product: SetProduct::scalar(),
                index: IndexValue::scalar(),
                parent: None,
                active: true,
                children: BTreeMap::new(),
                entries: BTreeMap::new(),
            },
        );
        id
    }

    /// Create a child container under `parent`, indexed by the given factors
    ///
    /// One instance is created per element of the factor product; an empty
    /// factor list yields a single scalar instance at the empty index.
    /// Instance ids are returned in product-element order.
    ///
    /// # Errors
    /// * `ContainerNotFound` - parent does not exist
    /// * `NameInUse` - parent already has a child or entry with this name
    /// * `SetNotFound` - a factor id is unknown
    pub fn add_container(
        &mut self,
        parent: ContainerId,
        name: &str,
        factors: &[SetId],
    ) -> Result<Vec<ContainerId>> {
        let product = SetProduct::new(factors.to_vec());
        let indices = self.product_elements(&product)?;
        {
            let parent_node = self.container(parent)?;
            if parent_node.has_name(name) {
                return Err(DimTreeError::NameInUse {
                    container: parent,
                    name: name.to_string(),
                });
            }
        }

        let mut instances = HashMap::with_capacity(indices.len());
        let mut ids = Vec::with_capacity(indices.len());
        for index in indices {
            let id = ContainerId::new();
            self.containers.insert(
                id,
                Container {
                    id,
                    model: self.id,
                    name: name.to_string(),
                    product: product.clone(),
                    index: index.clone(),
                    parent: Some(parent),
                    active: true,
                    children: BTreeMap::new(),
                    entries: BTreeMap::new(),
                },
            );
            instances.insert(index, id);
            ids.push(id);
        }

        let parent_node = self.container_mut(parent)?;
        parent_node
            .children
            .insert(name.to_string(), ChildGroup { product, instances });
        Ok(ids)
    }

    /// Create an entry under `parent` with one default record per element of
    /// the factor product
    ///
    /// # Errors
    /// * `ContainerNotFound` - parent does not exist
    /// * `NameInUse` - parent already has a child or entry with this name
    /// * `SetNotFound` - a factor id is unknown
    pub fn add_entry(
        &mut self,
        parent: ContainerId,
        name: &str,
        kind: EntryKind,
        factors: &[SetId],
    ) -> Result<EntryId> {
        let product = SetProduct::new(factors.to_vec());
        let indices = self.product_elements(&product)?;
        self.insert_entry(parent, name, kind, product, indices)
    }

    /// Create an entry with records only at the given indices
    ///
    /// Used for sparse entries where some index combinations deliberately
    /// carry no record.
    ///
    /// # Errors
    /// In addition to the `add_entry` errors:
    /// * `IndexDimension` - an index has the wrong dimension for the product
    pub fn add_entry_sparse(
        &mut self,
        parent: ContainerId,
        name: &str,
        kind: EntryKind,
        factors: &[SetId],
        indices: Vec<IndexValue>,
    ) -> Result<EntryId> {
        let product = SetProduct::new(factors.to_vec());
        let expected = self.product_dim(&product)?;
        for index in &indices {
            if index.dim() != expected {
                return Err(DimTreeError::IndexDimension {
                    expected,
                    got: index.dim(),
                });
            }
        }
        self.insert_entry(parent, name, kind, product, indices)
    }

    fn insert_entry(
        &mut self,
        parent: ContainerId,
        name: &str,
        kind: EntryKind,
        product: SetProduct,
        indices: Vec<IndexValue>,
    ) -> Result<EntryId> {
        {
            let parent_node = self.container(parent)?;
            if parent_node.has_name(name) {
                return Err(DimTreeError::NameInUse {
                    container: parent,
                    name: name.to_string(),
                });
            }
        }
        let id = EntryId::new();
        let records = indices
            .into_iter()
            .map(|index| (index, Record::default()))
            .collect();
        self.entries.insert(
            id,
            Entry {
                id,
                model: self.id,
                name: name.to_string(),
                kind,
                parent,
                product,
                records,
            },
        );
        let parent_node = self.container_mut(parent)?;
        parent_node.entries.insert(name.to_string(), id);
        Ok(id)
    }

    // ===== Lookups =====

    /// Get an index set by id
    ///
    /// # Errors
    /// Returns `SetNotFound` if the set does not belong to this model.
    pub fn set(&self, id: SetId) -> Result<&IndexSet> {
        self.sets
            .get(&id)
            .ok_or(DimTreeError::SetNotFound { set: id })
    }

    /// Get a container instance by id
    ///
    /// # Errors
    /// Returns `ContainerNotFound` if the container does not exist.
    pub fn container(&self, id: ContainerId) -> Result<&Container> {
        self.containers
            .get(&id)
            .ok_or(DimTreeError::ContainerNotFound { container: id })
    }

    /// Get a mutable container instance by id
    ///
    /// # Errors
    /// Returns `ContainerNotFound` if the container does not exist.
    pub fn container_mut(&mut self, id: ContainerId) -> Result<&mut Container> {
        self.containers
            .get_mut(&id)
            .ok_or(DimTreeError::ContainerNotFound { container: id })
    }

    /// Get an entry by id
    ///
    /// # Errors
    /// Returns `EntryNotFound` if the entry does not exist.
    pub fn entry(&self, id: EntryId) -> Result<&Entry> {
        self.entries
            .get(&id)
            .ok_or(DimTreeError::EntryNotFound { entry: id })
    }

    /// Get a mutable entry by id
    ///
    /// # Errors
    /// Returns `EntryNotFound` if the entry does not exist.
    pub fn entry_mut(&mut self, id: EntryId) -> Result<&mut Entry> {
        self.entries
            .get_mut(&id)
            .ok_or(DimTreeError::EntryNotFound { entry: id })
    }

    // ===== Products =====

    /// Total dimension of a product (sum of factor dimensions)
    pub fn product_dim(&self, product: &SetProduct) -> Result<usize> {
        let mut dim = 0;
        for factor in product.factors() {
            dim += self.set(*factor)?.dimen;
        }
        Ok(dim)
    }

    /// Enumerate a product's elements in factor order
    ///
    /// The scalar product yields exactly one element, the empty index.
    pub fn product_elements(&self, product: &SetProduct) -> Result<Vec<IndexValue>> {
        let mut out = vec![IndexValue::scalar()];
        for factor in product.factors() {
            let set = self.set(*factor)?;
            let mut next = Vec::with_capacity(out.len() * set.elements.len());
            for prefix in &out {
                for elem in &set.elements {
                    next.push(prefix.concat(elem));
                }
            }
            out = next;
        }
        Ok(out)
    }

    // ===== Records =====

    /// Get a record, treating its absence as an error
    ///
    /// # Errors
    /// Returns `RecordNotFound` if the entry has no record at the index.
    pub fn record(&self, entry: EntryId, index: &IndexValue) -> Result<&Record> {
        self.entry(entry)?
            .record(index)
            .ok_or_else(|| DimTreeError::RecordNotFound {
                entry,
                index: index.clone(),
            })
    }

    /// Set a record's value
    ///
    /// # Errors
    /// Returns `RecordNotFound` if the entry has no record at the index.
    pub fn set_value(&mut self, entry: EntryId, index: &IndexValue, value: f64) -> Result<()> {
        let rec = self.entry_mut(entry)?.record_mut(index).ok_or_else(|| {
            DimTreeError::RecordNotFound {
                entry,
                index: index.clone(),
            }
        })?;
        rec.value = Some(value);
        Ok(())
    }

    /// Read a record's value
    ///
    /// # Errors
    /// Returns `RecordNotFound` if the entry has no record at the index.
    pub fn value(&self, entry: EntryId, index: &IndexValue) -> Result<Option<f64>> {
        Ok(self.record(entry, index)?.value)
    }

    /// Fix a record
    ///
    /// # Errors
    /// Returns `RecordNotFound` if the entry has no record at the index.
    pub fn fix(&mut self, entry: EntryId, index: &IndexValue) -> Result<()> {
        let rec = self.entry_mut(entry)?.record_mut(index).ok_or_else(|| {
            DimTreeError::RecordNotFound {
                entry,
                index: index.clone(),
            }
        })?;
        rec.fix();
        Ok(())
    }

    // ===== Subtree iteration =====

    /// All entries in the subtree rooted at `root`, including the root's own
    /// entries, in deterministic (name, then index) order
    pub fn entries_under(&self, root: ContainerId) -> Result<Vec<EntryId>> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let node = self.container(id)?;
            out.extend(node.entries.values().copied());
            for group in node.children.values() {
                stack.extend(self.sorted_instances(group));
            }
        }
        Ok(out)
    }

    /// All child groups in the subtree rooted at `root`, as (owner, name)
    /// pairs
    pub fn groups_under(&self, root: ContainerId) -> Result<Vec<(ContainerId, String)>> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let node = self.container(id)?;
            for (name, group) in &node.children {
                out.push((id, name.clone()));
                stack.extend(self.sorted_instances(group));
            }
        }
        Ok(out)
    }

    /// All container instances strictly below `root`
    pub fn instances_under(&self, root: ContainerId) -> Result<Vec<ContainerId>> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let node = self.container(id)?;
            for group in node.children.values() {
                let instances = self.sorted_instances(group);
                out.extend(instances.iter().copied());
                stack.extend(instances);
            }
        }
        Ok(out)
    }

    /// Group instances sorted by index for deterministic traversal
    fn sorted_instances(&self, group: &ChildGroup) -> Vec<ContainerId> {
        let mut pairs: Vec<(&IndexValue, ContainerId)> =
            group.instances.iter().map(|(k, v)| (k, *v)).collect();
        pairs.sort_by(|a, b| a.0.cmp(b.0));
        pairs.into_iter().map(|(_, v)| v).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Coord;

    #[test]
    fn test_add_set_validates_element_dimension() {
        let mut model = Model::new("flowsheet");
        let result = model.add_set(
            "grid",
            2,
            vec![IndexValue::new(vec![Coord::from(0)])],
        );
        assert!(matches!(
            result,
            Err(DimTreeError::SetElementDimension { .. })
        ));
    }

    #[test]
    fn test_add_container_creates_one_instance_per_element() {
        let mut model = Model::new("flowsheet");
        let time = model
            .add_set(
                "time",
                1,
                vec![IndexValue::single(0), IndexValue::single(1)],
            )
            .unwrap();
        let root = model.add_root("fs");
        let instances = model.add_container(root, "unit", &[time]).unwrap();
        assert_eq!(instances.len(), 2);

        let group = &model.container(root).unwrap().children["unit"];
        assert_eq!(group.instances.len(), 2);
        assert_eq!(
            group.instances[&IndexValue::single(0)],
            instances[0]
        );
    }

    #[test]
    fn test_duplicate_name_is_rejected() {
        let mut model = Model::new("flowsheet");
        let root = model.add_root("fs");
        model
            .add_entry(root, "flow", EntryKind::Variable, &[])
            .unwrap();
        let result = model.add_container(root, "flow", &[]);
        assert!(matches!(result, Err(DimTreeError::NameInUse { .. })));
    }

    #[test]
    fn test_scalar_entry_has_one_record_at_empty_index() {
        let mut model = Model::new("flowsheet");
        let root = model.add_root("fs");
        let entry = model
            .add_entry(root, "flow", EntryKind::Variable, &[])
            .unwrap();
        assert_eq!(model.entry(entry).unwrap().records.len(), 1);
        assert!(model
            .record(entry, &IndexValue::scalar())
            .unwrap()
            .value
            .is_none());
    }

    #[test]
    fn test_product_elements_cartesian_order() {
        let mut model = Model::new("flowsheet");
        let loc = model
            .add_set(
                "location",
                1,
                vec![IndexValue::single("A"), IndexValue::single("B")],
            )
            .unwrap();
        let time = model
            .add_set(
                "time",
                1,
                vec![IndexValue::single(0), IndexValue::single(1)],
            )
            .unwrap();
        let elems = model
            .product_elements(&SetProduct::new(vec![loc, time]))
            .unwrap();
        assert_eq!(elems.len(), 4);
        assert_eq!(
            elems[0],
            IndexValue::new(vec![Coord::from("A"), Coord::from(0)])
        );
        assert_eq!(
            elems[3],
            IndexValue::new(vec![Coord::from("B"), Coord::from(1)])
        );
    }

    #[test]
    fn test_entries_under_descends_into_indexed_children() {
        let mut model = Model::new("flowsheet");
        let time = model
            .add_set(
                "time",
                1,
                vec![IndexValue::single(0), IndexValue::single(1)],
            )
            .unwrap();
        let root = model.add_root("fs");
        model
            .add_entry(root, "top_flow", EntryKind::Variable, &[])
            .unwrap();
        let units = model.add_container(root, "unit", &[time]).unwrap();
        for unit in &units {
            model
                .add_entry(*unit, "holdup", EntryKind::Variable, &[])
                .unwrap();
        }
        let entries = model.entries_under(root).unwrap();
        assert_eq!(entries.len(), 3);
    }
}
