use dimtree_core_types::{ContainerId, EntryId, SetId};
use thiserror::Error;

use crate::model::{Coord, IndexValue};

/// Result type alias using DimTreeError
pub type Result<T> = std::result::Result<T, DimTreeError>;

/// Error taxonomy for DimTree operations
///
/// Variants fall into three groups with different ownership:
/// - **Precondition violations** are caller programming errors and are always
///   raised.
/// - **Structural mismatches** arise while replaying a path against a target
///   hierarchy; callers may opt into a best-effort mode that converts them
///   into an absent result instead.
/// - **Store lookups** cover dangling ids handed to the store.
///
/// Expected sparseness (a missing record during bulk copy or activation) is
/// never an error: it is logged at warning severity and the enclosing loop
/// continues.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DimTreeError {
    // ===== Precondition Violations =====
    /// No index sets were supplied to a membership or projection query
    #[error("At least one index set must be provided")]
    NoSetsProvided,

    /// A set occurs more than once among a product's factors, or was
    /// requested more than once for exclusion
    #[error("Set {set} appears multiple times and cannot be addressed individually")]
    RepeatedFactor { set: SetId },

    /// A set does not occur among a product's factors
    #[error("Set {set} is not a factor of the product")]
    FactorNotFound { set: SetId },

    /// The entity is not explicitly indexed by every requested set
    #[error("Not explicitly indexed by at least one of: {sets}")]
    NotIndexedBy { sets: String },

    /// Factor location requires a 1-dimensional set
    #[error("Cannot locate set {set}: it is multi-dimensional")]
    MultiDimensionalSubset { set: SetId },

    /// More than one level of the hierarchy explicitly carries the set
    #[error("Set {set} appears multiple times in the hierarchy")]
    AmbiguousSetIndex { set: SetId },

    /// A supplied value is not a member of the set it must index
    #[error("{value} is not a member of set {set}")]
    NotAMember { set: SetId, value: Coord },

    /// A set from one model was used against a different model
    #[error("Set {set} does not belong to the target model")]
    CrossModel { set: SetId },

    /// Wrong number of values supplied to complete a projected index
    #[error("Wrong number of values to complete index: expected {expected}, got {got}")]
    CompletionArity { expected: usize, got: usize },

    /// A completion value has the wrong dimension for its set
    #[error("Completion value {position} has dimension {got}, expected {expected}")]
    CompletionValueDimension {
        position: usize,
        expected: usize,
        got: usize,
    },

    /// A projection index has the wrong dimension for the projection
    #[error("Projection index has dimension {got}, expected {expected}")]
    ProjectionDimension { expected: usize, got: usize },

    /// An index has the wrong dimension for the product it addresses
    #[error("Index has dimension {got}, expected {expected}")]
    IndexDimension { expected: usize, got: usize },

    /// A set element has the wrong number of coordinates
    #[error("Element of set '{name}' has dimension {got}, expected {expected}")]
    SetElementDimension {
        name: String,
        expected: usize,
        got: usize,
    },

    /// Index sets must have at least one coordinate per element
    #[error("Set '{name}' has dimension zero")]
    ZeroDimension { name: String },

    /// A child or entry name is already taken within a container
    #[error("Name '{name}' is already in use within container {container}")]
    NameInUse { container: ContainerId, name: String },

    // ===== Structural Mismatches =====
    /// Path replay found no child or entry with the required name
    #[error("No child or entry named '{name}' in the target hierarchy")]
    NameNotFound { name: String },

    /// Path replay found the name but the required index is absent
    #[error("'{name}' has no index {index}")]
    IndexNotFound { name: String, index: IndexValue },

    // ===== Store Lookups =====
    /// Index set not found in the model
    #[error("Index set not found: {set}")]
    SetNotFound { set: SetId },

    /// Container not found in the model
    #[error("Container not found: {container}")]
    ContainerNotFound { container: ContainerId },

    /// Entry not found in the model
    #[error("Entry not found: {entry}")]
    EntryNotFound { entry: EntryId },

    /// Entry exists but has no record at the given index
    #[error("Entry {entry} has no record at index {index}")]
    RecordNotFound { entry: EntryId, index: IndexValue },
}

impl DimTreeError {
    /// Get the stable error code for this error
    pub fn code(&self) -> &'static str {
        match self {
            DimTreeError::NoSetsProvided => "ERR_NO_SETS_PROVIDED",
            DimTreeError::RepeatedFactor { .. } => "ERR_REPEATED_FACTOR",
            DimTreeError::FactorNotFound { .. } => "ERR_FACTOR_NOT_FOUND",
            DimTreeError::NotIndexedBy { .. } => "ERR_NOT_INDEXED_BY",
            DimTreeError::MultiDimensionalSubset { .. } => "ERR_MULTI_DIMENSIONAL_SUBSET",
            DimTreeError::AmbiguousSetIndex { .. } => "ERR_AMBIGUOUS_SET_INDEX",
            DimTreeError::NotAMember { .. } => "ERR_NOT_A_MEMBER",
            DimTreeError::CrossModel { .. } => "ERR_CROSS_MODEL",
            DimTreeError::CompletionArity { .. } => "ERR_COMPLETION_ARITY",
            DimTreeError::CompletionValueDimension { .. } => "ERR_COMPLETION_VALUE_DIMENSION",
            DimTreeError::ProjectionDimension { .. } => "ERR_PROJECTION_DIMENSION",
            DimTreeError::IndexDimension { .. } => "ERR_INDEX_DIMENSION",
            DimTreeError::SetElementDimension { .. } => "ERR_SET_ELEMENT_DIMENSION",
            DimTreeError::ZeroDimension { .. } => "ERR_ZERO_DIMENSION",
            DimTreeError::NameInUse { .. } => "ERR_NAME_IN_USE",
            DimTreeError::NameNotFound { .. } => "ERR_NAME_NOT_FOUND",
            DimTreeError::IndexNotFound { .. } => "ERR_INDEX_NOT_FOUND",
            DimTreeError::SetNotFound { .. } => "ERR_SET_NOT_FOUND",
            DimTreeError::ContainerNotFound { .. } => "ERR_CONTAINER_NOT_FOUND",
            DimTreeError::EntryNotFound { .. } => "ERR_ENTRY_NOT_FOUND",
            DimTreeError::RecordNotFound { .. } => "ERR_RECORD_NOT_FOUND",
        }
    }

    /// True for caller programming errors that are never recovered internally
    pub fn is_precondition(&self) -> bool {
        !self.is_structural_mismatch() && !self.is_store_lookup()
    }

    /// True for mismatches that `allow_miss` converts into an absent result
    pub fn is_structural_mismatch(&self) -> bool {
        matches!(
            self,
            DimTreeError::NameNotFound { .. } | DimTreeError::IndexNotFound { .. }
        )
    }

    /// True for dangling-id lookups against the store
    pub fn is_store_lookup(&self) -> bool {
        matches!(
            self,
            DimTreeError::SetNotFound { .. }
                | DimTreeError::ContainerNotFound { .. }
                | DimTreeError::EntryNotFound { .. }
                | DimTreeError::RecordNotFound { .. }
        )
    }
}
