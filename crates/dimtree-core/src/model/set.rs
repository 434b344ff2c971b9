use serde::{Deserialize, Serialize};

use dimtree_core_types::{ModelId, SetId};

/// One scalar coordinate of an index
///
/// Coordinates are either integers (sequential dimensions such as time
/// points) or string keys (categorical dimensions such as locations or
/// component names).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Coord {
    Int(i64),
    Key(String),
}

impl From<i64> for Coord {
    fn from(v: i64) -> Self {
        Coord::Int(v)
    }
}

impl From<&str> for Coord {
    fn from(v: &str) -> Self {
        Coord::Key(v.to_string())
    }
}

impl From<String> for Coord {
    fn from(v: String) -> Self {
        Coord::Key(v)
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Coord::Int(v) => write!(f, "{}", v),
            Coord::Key(v) => write!(f, "{}", v),
        }
    }
}

/// Ordered coordinates addressing one element of an index domain
///
/// Scalar (unindexed) entities are addressed by the empty index, so every
/// entity has a uniform record-addressing scheme regardless of dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IndexValue(Vec<Coord>);

impl IndexValue {
    /// Build an index from coordinates
    pub fn new(coords: Vec<Coord>) -> Self {
        Self(coords)
    }

    /// The empty index used for scalar entities
    pub fn scalar() -> Self {
        Self(Vec::new())
    }

    /// A one-coordinate index
    pub fn single(coord: impl Into<Coord>) -> Self {
        Self(vec![coord.into()])
    }

    /// Number of coordinates
    pub fn dim(&self) -> usize {
        self.0.len()
    }

    pub fn is_scalar(&self) -> bool {
        self.0.is_empty()
    }

    pub fn coords(&self) -> &[Coord] {
        &self.0
    }

    pub fn coords_mut(&mut self) -> &mut [Coord] {
        &mut self.0
    }

    /// Concatenate two indices, preserving coordinate order
    pub fn concat(&self, other: &IndexValue) -> IndexValue {
        let mut coords = self.0.clone();
        coords.extend(other.0.iter().cloned());
        IndexValue(coords)
    }
}

impl From<Coord> for IndexValue {
    fn from(c: Coord) -> Self {
        IndexValue(vec![c])
    }
}

impl std::fmt::Display for IndexValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(")?;
        for (i, c) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", c)?;
        }
        write!(f, ")")
    }
}

/// An identity-distinguishable ordered collection of index values
///
/// Two sets with equal contents but distinct ids are never interchangeable:
/// all membership logic in the engine compares `id`, not elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSet {
    pub id: SetId,
    pub model: ModelId,
    pub name: String,
    /// Per-element dimensionality; every element has exactly this many
    /// coordinates
    pub dimen: usize,
    pub elements: Vec<IndexValue>,
}

impl IndexSet {
    /// Membership test for a full element
    pub fn contains(&self, value: &IndexValue) -> bool {
        self.elements.contains(value)
    }

    /// Membership test for a single coordinate of a 1-dimensional set
    pub fn contains_coord(&self, coord: &Coord) -> bool {
        self.dimen == 1
            && self
                .elements
                .iter()
                .any(|e| e.coords().first() == Some(coord))
    }
}

/// An ordered composite of factor index sets
///
/// The empty product is the scalar domain: it has dimension zero and exactly
/// one element, the empty index. Factors are referenced by id, which is what
/// keeps each factor individually addressable even when two factors have
/// equal contents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetProduct {
    factors: Vec<SetId>,
}

impl SetProduct {
    pub fn new(factors: Vec<SetId>) -> Self {
        Self { factors }
    }

    /// The trivial product of no factors
    pub fn scalar() -> Self {
        Self {
            factors: Vec::new(),
        }
    }

    pub fn is_scalar(&self) -> bool {
        self.factors.is_empty()
    }

    pub fn factors(&self) -> &[SetId] {
        &self.factors
    }

    /// Identity-based factor membership
    pub fn contains_factor(&self, set: SetId) -> bool {
        self.factors.contains(&set)
    }

    /// Number of times a set occurs among the factors
    pub fn factor_count(&self, set: SetId) -> usize {
        self.factors.iter().filter(|f| **f == set).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_index_has_dimension_zero() {
        let idx = IndexValue::scalar();
        assert!(idx.is_scalar());
        assert_eq!(idx.dim(), 0);
    }

    #[test]
    fn test_concat_preserves_order() {
        let a = IndexValue::new(vec![Coord::from("A")]);
        let b = IndexValue::new(vec![Coord::from(1), Coord::from(2)]);
        let joined = a.concat(&b);
        assert_eq!(
            joined.coords(),
            &[Coord::from("A"), Coord::from(1), Coord::from(2)]
        );
    }

    #[test]
    fn test_contains_coord_requires_dimension_one() {
        let set = IndexSet {
            id: SetId::new(),
            model: ModelId::new(),
            name: "grid".to_string(),
            dimen: 2,
            elements: vec![IndexValue::new(vec![Coord::from(0), Coord::from(0)])],
        };
        assert!(!set.contains_coord(&Coord::from(0)));
    }

    #[test]
    fn test_factor_membership_is_identity_based() {
        let a = SetId::new();
        let b = SetId::new();
        let product = SetProduct::new(vec![a, b, a]);
        assert!(product.contains_factor(a));
        assert_eq!(product.factor_count(a), 2);
        assert_eq!(product.factor_count(b), 1);
        assert!(!product.contains_factor(SetId::new()));
    }

    #[test]
    fn test_index_value_display() {
        let idx = IndexValue::new(vec![Coord::from("A"), Coord::from(3)]);
        assert_eq!(idx.to_string(), "(A, 3)");
    }

    #[test]
    fn test_index_value_roundtrips_through_json() {
        let idx = IndexValue::new(vec![Coord::from("A"), Coord::from(3)]);
        let json = serde_json::to_string(&idx).unwrap();
        let back: IndexValue = serde_json::from_str(&json).unwrap();
        assert_eq!(idx, back);
    }
}
