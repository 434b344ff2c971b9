use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use dimtree_core_types::{ContainerId, EntryId, ModelId};

use super::set::{IndexValue, SetProduct};

/// What kind of solver-facing component an entry stands for
///
/// Variables carry values and a fixed flag; relations carry an activation
/// flag. The distinction matters for bulk operations: activation routines
/// deactivate relations and fix variables, never the other way around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    Variable,
    Relation,
}

/// Per-index data carried by an entry
///
/// The only state that mutates after model construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub value: Option<f64>,
    pub fixed: bool,
    pub active: bool,
}

impl Default for Record {
    fn default() -> Self {
        Self {
            value: None,
            fixed: false,
            active: true,
        }
    }
}

impl Record {
    pub fn fix(&mut self) {
        self.fixed = true;
    }

    pub fn unfix(&mut self) {
        self.fixed = false;
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    pub fn activate(&mut self) {
        self.active = true;
    }
}

/// A named leaf component owned by exactly one container instance
///
/// Records may be sparse: an index combination of the product with no record
/// is expected sparseness, not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    pub model: ModelId,
    pub name: String,
    pub kind: EntryKind,
    pub parent: ContainerId,
    /// Own index product; scalar entries hold a single record at the empty
    /// index
    pub product: SetProduct,
    pub records: HashMap<IndexValue, Record>,
}

impl Entry {
    pub fn is_indexed(&self) -> bool {
        !self.product.is_scalar()
    }

    pub fn record(&self, index: &IndexValue) -> Option<&Record> {
        self.records.get(index)
    }

    pub fn record_mut(&mut self, index: &IndexValue) -> Option<&mut Record> {
        self.records.get_mut(index)
    }
}
