//! # carefind-core
//!
//! The facility store and the collaborator traits it is wired to.
//!
//! This crate provides:
//! - The three collaborator traits (`FacilityRepository`, `LiveInfoSource`,
//!   `UrlExtractor`)
//! - `FacilityStore`, the single owner of the facility collection, which
//!   validates every change and persists a full snapshot after each one
//! - `SourceType` and the records web collaborators return
//!
//! ## Usage
//!
//! ```rust,ignore
//! use carefind_core::{FacilityStore, traits::FacilityRepository};
//!
//! let mut store = FacilityStore::open(Box::new(repo), &ScoringConfig::default())?;
//! let id = store.add(FacilityDraft::new("さくら苑", "札幌市中央区"), Utc::now())?;
//! ```

pub mod source;
pub mod store;
pub mod traits;

pub use source::{ExtractedFacility, SourceType, WebProbe};
pub use store::{FacilityStore, ImportSummary};
