//! Core types shared across DimTree facilities
//!
//! This crate provides the foundational identifier types used throughout the
//! engine:
//!
//! - **Identity types**: ModelId, SetId, ContainerId, EntryId
//!
//! Every identity-bearing object in a DimTree model carries one of these ids.
//! All membership and hierarchy logic compares ids, never structural
//! equality, so two index sets with identical contents remain distinct.

pub mod ids;

pub use ids::{ContainerId, EntryId, ModelId, SetId};
