//! Index-set membership algebra and projection
//!
//! All membership tests here are identity-based: a set participates in a
//! product as a factor id, so two sets with equal contents never stand in for
//! each other. "Explicit" indexing means the entity's own product carries the
//! set; "implicit" indexing means some ancestor container's product does.

use dimtree_core_types::{ContainerId, EntryId, SetId};

use crate::errors::{DimTreeError, Result};
use crate::model::{Coord, IndexValue, SetProduct};
use crate::ops::Model;

/// Whether a product is directly indexed by every one of the given sets
///
/// A scalar product is never explicitly indexed. When a single set is
/// requested and its dimension equals the product's full dimension, the test
/// degenerates to an identity check: the product must be exactly that one
/// factor. Otherwise each requested set must appear (by id) among the
/// factors.
///
/// # Errors
/// * `NoSetsProvided` - the set list is empty
/// * `SetNotFound` - a set id is unknown to the model
pub fn is_explicitly_indexed_by(
    model: &Model,
    product: &SetProduct,
    sets: &[SetId],
) -> Result<bool> {
    if sets.is_empty() {
        return Err(DimTreeError::NoSetsProvided);
    }
    if product.is_scalar() {
        return Ok(false);
    }
    let mut total_requested = 0;
    for set in sets {
        total_requested += model.set(*set)?.dimen;
    }
    let product_dim = model.product_dim(product)?;
    if product_dim < total_requested {
        // Cannot be indexed as such if the dimension is too low
        return Ok(false);
    }
    if sets.len() == 1 && model.set(sets[0])?.dimen == product_dim {
        // Only a single-factor product can be the requested set itself;
        // anything else of equal dimension is a genuine product
        return Ok(product.factors().len() == 1 && product.factors()[0] == sets[0]);
    }
    Ok(sets.iter().all(|s| product.contains_factor(*s)))
}

/// Whether an entity is indexed by `set` only through an ancestor container
///
/// Climbs the parent chain starting at `parent`; returns false immediately
/// upon reaching `stop_at` (or the top of the tree), true at the first
/// ancestor whose own product explicitly carries `set`.
///
/// # Errors
/// * `ContainerNotFound` - a parent id is dangling
/// * `SetNotFound` - the set id is unknown to the model
pub fn is_implicitly_indexed_by(
    model: &Model,
    parent: Option<ContainerId>,
    set: SetId,
    stop_at: Option<ContainerId>,
) -> Result<bool> {
    let mut current = parent;
    while let Some(id) = current {
        if stop_at == Some(id) {
            return Ok(false);
        }
        let node = model.container(id)?;
        if !node.product.is_scalar() && is_explicitly_indexed_by(model, &node.product, &[set])? {
            return Ok(true);
        }
        current = node.parent;
    }
    Ok(false)
}

/// Reconstructs full indices from projected indices plus values for the
/// excluded sets
///
/// Built by [`project_except`]; positions each excluded set's value at the
/// offset it occupies in the original product, interleaved with the
/// projection's coordinates at their original offsets. When nothing remains
/// in the projection, completion reduces to pure reordering of the supplied
/// values.
#[derive(Debug, Clone)]
pub struct IndexCompleter {
    slots: Vec<Slot>,
    value_dims: Vec<usize>,
    projection_dim: usize,
}

#[derive(Debug, Clone)]
enum Slot {
    /// Coordinates taken from the projected index, in order
    Projected { dim: usize },
    /// Coordinates taken from the supplied values, by position in the
    /// original exclusion order
    Supplied { position: usize },
}

impl IndexCompleter {
    /// Build a full index from a projected index and one value per excluded
    /// set, in the order the sets were excluded
    ///
    /// # Errors
    /// * `CompletionArity` - wrong number of values
    /// * `CompletionValueDimension` - a value's dimension does not match its set
    /// * `ProjectionDimension` - the projected index has the wrong dimension
    pub fn complete(&self, projection_index: &IndexValue, values: &[IndexValue]) -> Result<IndexValue> {
        if values.len() != self.value_dims.len() {
            return Err(DimTreeError::CompletionArity {
                expected: self.value_dims.len(),
                got: values.len(),
            });
        }
        for (position, (value, expected)) in values.iter().zip(&self.value_dims).enumerate() {
            if value.dim() != *expected {
                return Err(DimTreeError::CompletionValueDimension {
                    position,
                    expected: *expected,
                    got: value.dim(),
                });
            }
        }
        if projection_index.dim() != self.projection_dim {
            return Err(DimTreeError::ProjectionDimension {
                expected: self.projection_dim,
                got: projection_index.dim(),
            });
        }

        let mut coords = Vec::with_capacity(self.projection_dim);
        let mut cursor = 0;
        for slot in &self.slots {
            match slot {
                Slot::Projected { dim } => {
                    coords.extend_from_slice(&projection_index.coords()[cursor..cursor + dim]);
                    cursor += dim;
                }
                Slot::Supplied { position } => {
                    coords.extend_from_slice(values[*position].coords());
                }
            }
        }
        Ok(IndexValue::new(coords))
    }

    /// Convenience for the common case of one excluded 1-dimensional set
    ///
    /// # Errors
    /// Same as [`IndexCompleter::complete`].
    pub fn complete_one(
        &self,
        projection_index: &IndexValue,
        value: impl Into<Coord>,
    ) -> Result<IndexValue> {
        self.complete(projection_index, &[IndexValue::single(value)])
    }
}

/// Set-except projection with index completion
///
/// Computes the remaining factors of `product` after removing `sets` (in
/// original relative order) and a completer that rebuilds full indices. The
/// remaining factors may be empty, in which case the projection is the
/// scalar product with its single empty element and the completer purely
/// reorders the supplied values.
///
/// # Errors
/// * `NotIndexedBy` - the product is not explicitly indexed by every set
/// * `RepeatedFactor` - a set occurs more than once among the factors, or
///   was requested more than once
/// * `NoSetsProvided` - the set list is empty
pub fn project_except(
    model: &Model,
    product: &SetProduct,
    sets: &[SetId],
) -> Result<(SetProduct, IndexCompleter)> {
    if !is_explicitly_indexed_by(model, product, sets)? {
        let names: Vec<&str> = sets
            .iter()
            .filter_map(|s| model.set(*s).ok().map(|s| s.name.as_str()))
            .collect();
        return Err(DimTreeError::NotIndexedBy {
            sets: names.join(", "),
        });
    }
    for (i, set) in sets.iter().enumerate() {
        if sets[..i].contains(set) || product.factor_count(*set) != 1 {
            return Err(DimTreeError::RepeatedFactor { set: *set });
        }
    }

    let mut slots = Vec::with_capacity(product.factors().len());
    let mut remaining = Vec::new();
    let mut projection_dim = 0;
    for factor in product.factors() {
        match sets.iter().position(|s| s == factor) {
            Some(position) => slots.push(Slot::Supplied { position }),
            None => {
                let dim = model.set(*factor)?.dimen;
                slots.push(Slot::Projected { dim });
                projection_dim += dim;
                remaining.push(*factor);
            }
        }
    }
    let mut value_dims = Vec::with_capacity(sets.len());
    for set in sets {
        value_dims.push(model.set(*set)?.dimen);
    }

    Ok((
        SetProduct::new(remaining),
        IndexCompleter {
            slots,
            value_dims,
            projection_dim,
        },
    ))
}

/// Coordinate offset of a 1-dimensional factor within a product
///
/// Returns the sum of dimensions of all preceding factors.
///
/// # Errors
/// * `MultiDimensionalSubset` - the subset is not 1-dimensional
/// * `RepeatedFactor` - the subset occurs more than once
/// * `FactorNotFound` - the subset does not occur at all
pub fn locate_factor(model: &Model, product: &SetProduct, subset: SetId) -> Result<usize> {
    if model.set(subset)?.dimen != 1 {
        return Err(DimTreeError::MultiDimensionalSubset { set: subset });
    }
    let mut offset = 0;
    let mut found = None;
    for factor in product.factors() {
        if *factor == subset {
            if found.is_some() {
                return Err(DimTreeError::RepeatedFactor { set: subset });
            }
            found = Some(offset);
            offset += 1;
        } else {
            offset += model.set(*factor)?.dimen;
        }
    }
    found.ok_or(DimTreeError::FactorNotFound { set: subset })
}

/// Extract the coordinate of `set` from an index into `product`
///
/// # Errors
/// * `NotIndexedBy` - the product is not explicitly indexed by the set
/// * `IndexDimension` - the index is too short for the located offset
/// * plus the [`locate_factor`] preconditions
pub fn index_of_set(
    model: &Model,
    product: &SetProduct,
    index: &IndexValue,
    set: SetId,
) -> Result<Coord> {
    if !is_explicitly_indexed_by(model, product, &[set])? {
        return Err(DimTreeError::NotIndexedBy {
            sets: model.set(set)?.name.clone(),
        });
    }
    let loc = locate_factor(model, product, set)?;
    index
        .coords()
        .get(loc)
        .cloned()
        .ok_or(DimTreeError::IndexDimension {
            expected: loc + 1,
            got: index.dim(),
        })
}

/// Coordinate of `set` for an entry record, searching the hierarchy
///
/// If the entry's own product explicitly carries `set`, the coordinate is
/// extracted from the record's index. Ancestor containers are then climbed;
/// exactly one level of the hierarchy may carry `set` explicitly. Returns
/// `None` when no level carries it — the caller decides what absence means.
///
/// # Errors
/// * `AmbiguousSetIndex` - more than one level explicitly carries the set
/// * plus the [`index_of_set`] preconditions
pub fn implicit_index_of_set(
    model: &Model,
    entry: EntryId,
    index: &IndexValue,
    set: SetId,
) -> Result<Option<Coord>> {
    let e = model.entry(entry)?;
    let mut found = None;
    if !e.product.is_scalar() && is_explicitly_indexed_by(model, &e.product, &[set])? {
        found = Some(index_of_set(model, &e.product, index, set)?);
    }

    let mut parent = Some(e.parent);
    while let Some(id) = parent {
        let node = model.container(id)?;
        if !node.product.is_scalar() && is_explicitly_indexed_by(model, &node.product, &[set])? {
            if found.is_some() {
                return Err(DimTreeError::AmbiguousSetIndex { set });
            }
            found = Some(index_of_set(model, &node.product, &node.index, set)?);
        }
        parent = node.parent;
    }
    Ok(found)
}
