//! # carefind-contracts
//!
//! Shared types for the carefind facility directory.
//!
//! All crates in the workspace import from here. Apart from the validating
//! facility builder, no business logic lives in this crate: only data
//! definitions, vocabularies and error types.

pub mod error;
pub mod facility;
pub mod profile;
pub mod query;
pub mod taxonomy;
