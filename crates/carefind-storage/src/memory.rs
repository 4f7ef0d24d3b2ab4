//! In-memory implementation of `FacilityRepository`.
//!
//! `InMemoryRepository` keeps the last saved snapshot behind an
//! `Arc<Mutex<_>>`. Clones share the same state, so a test (or the CLI's
//! `--ephemeral` mode) can hand one clone to the store and inspect another.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

use carefind_contracts::{
    error::{CarefindError, CarefindResult},
    facility::Facility,
    profile::PatientProfile,
};
use carefind_core::traits::FacilityRepository;

// ── Internal mutable state ────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub(crate) struct InMemoryState {
    pub(crate) facilities: Vec<Facility>,
    pub(crate) profile: Option<PatientProfile>,
    /// Number of successful `save_facilities` calls.
    pub(crate) saves: u64,
}

// ── Public repository ─────────────────────────────────────────────────────────

/// A repository that never touches the disk.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    pub(crate) state: Arc<Mutex<InMemoryState>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing collection.
    pub fn with_facilities(facilities: Vec<Facility>) -> Self {
        let repo = Self::default();
        if let Ok(mut state) = repo.state.lock() {
            state.facilities = facilities;
        }
        repo
    }

    fn lock(&self) -> CarefindResult<MutexGuard<'_, InMemoryState>> {
        self.state.lock().map_err(|e| CarefindError::StorageFailure {
            reason: format!("repository state lock poisoned: {e}"),
        })
    }

    /// The last saved collection.
    pub fn snapshot(&self) -> CarefindResult<Vec<Facility>> {
        Ok(self.lock()?.facilities.clone())
    }

    /// How many times the collection has been saved.
    pub fn save_count(&self) -> CarefindResult<u64> {
        Ok(self.lock()?.saves)
    }
}

// ── FacilityRepository impl ───────────────────────────────────────────────────

impl FacilityRepository for InMemoryRepository {
    fn load_facilities(&self) -> CarefindResult<Vec<Facility>> {
        self.snapshot()
    }

    fn save_facilities(&self, facilities: &[Facility]) -> CarefindResult<()> {
        let mut state = self.lock()?;
        state.facilities = facilities.to_vec();
        state.saves += 1;
        debug!(count = facilities.len(), saves = state.saves, "in-memory snapshot saved");
        Ok(())
    }

    fn load_profile(&self) -> CarefindResult<Option<PatientProfile>> {
        Ok(self.lock()?.profile.clone())
    }

    fn save_profile(&self, profile: &PatientProfile) -> CarefindResult<()> {
        self.lock()?.profile = Some(profile.clone());
        Ok(())
    }

    fn clear_profile(&self) -> CarefindResult<()> {
        self.lock()?.profile = None;
        Ok(())
    }
}
