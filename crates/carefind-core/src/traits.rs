//! Collaborator traits for the facility store.
//!
//! - `FacilityRepository` persists whole snapshots of the collection
//! - `LiveInfoSource` fetches live information about a facility's website
//! - `UrlExtractor` reads facility records off arbitrary web pages
//!
//! The store and the bulk runners only ever talk to these traits, so the
//! simulated web collaborators can be swapped for real ones without touching
//! the callers.

use async_trait::async_trait;

use carefind_contracts::{
    error::CarefindResult,
    facility::{Facility, RealtimeInfo},
    profile::PatientProfile,
};

use crate::source::{ExtractedFacility, SourceType, WebProbe};

/// Snapshot persistence for facilities and the patient profile.
///
/// There are no partial updates: every save replaces the stored collection
/// with the one given.
pub trait FacilityRepository: Send + Sync {
    /// Load the stored collection. An absent or unreadable snapshot is
    /// reported as an empty collection, not an error.
    fn load_facilities(&self) -> CarefindResult<Vec<Facility>>;

    /// Replace the stored collection with `facilities`.
    fn save_facilities(&self, facilities: &[Facility]) -> CarefindResult<()>;

    fn load_profile(&self) -> CarefindResult<Option<PatientProfile>>;

    fn save_profile(&self, profile: &PatientProfile) -> CarefindResult<()>;

    fn clear_profile(&self) -> CarefindResult<()>;
}

/// Source of live information about a facility.
///
/// Failures are `NetworkFailure`s; callers log them and leave the facility
/// untouched.
#[async_trait]
pub trait LiveInfoSource: Send + Sync {
    /// Fetch live info for a facility that has a website.
    async fn fetch(&self, facility: &Facility) -> CarefindResult<RealtimeInfo>;

    /// Look at a website before the facility exists, to pre-fill a new record.
    async fn probe(&self, url: &str) -> CarefindResult<WebProbe>;
}

/// Reads facility records off a web page.
#[async_trait]
pub trait UrlExtractor: Send + Sync {
    /// Extract every facility found at `url`. May return an empty list.
    async fn extract(&self, url: &str, source: SourceType) -> CarefindResult<Vec<ExtractedFacility>>;
}
