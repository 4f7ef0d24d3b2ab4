//! # carefind-storage
//!
//! Implementations of the `FacilityRepository` persistence collaborator.
//!
//! ## Overview
//!
//! The store saves a full snapshot of the facility collection after every
//! change. Two repositories are provided:
//!
//! - [`InMemoryRepository`]: state behind `Arc<Mutex<_>>`, for tests and
//!   throwaway sessions.
//! - [`JsonFileRepository`]: `facilities.json` and `profile.json` in a data
//!   directory, tolerant of missing or corrupt files.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use carefind_storage::JsonFileRepository;
//! use carefind_core::FacilityStore;
//!
//! let repo = JsonFileRepository::open("~/.local/share/carefind")?;
//! let store = FacilityStore::open(Box::new(repo), &ScoringConfig::default())?;
//! ```

pub mod json;
pub mod memory;
pub mod snapshot;

pub use json::JsonFileRepository;
pub use memory::InMemoryRepository;
pub use snapshot::FacilitySnapshot;

// ── Tests ─────────────────────────────────────────────────────────────────────
