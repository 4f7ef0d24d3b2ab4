//! The on-disk snapshot format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use carefind_contracts::facility::Facility;

/// A full copy of the facility collection as written to `facilities.json`.
///
/// Every save writes a new snapshot; there is no incremental log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacilitySnapshot {
    /// Bumped when the layout changes incompatibly.
    pub format_version: u32,

    /// Wall-clock time (UTC) the snapshot was written.
    pub saved_at: DateTime<Utc>,

    pub facilities: Vec<Facility>,
}

impl FacilitySnapshot {
    pub const FORMAT_VERSION: u32 = 1;

    pub fn new(facilities: Vec<Facility>, saved_at: DateTime<Utc>) -> Self {
        Self {
            format_version: Self::FORMAT_VERSION,
            saved_at,
            facilities,
        }
    }
}

/// What a snapshot file may contain: the versioned wrapper, or a bare
/// facility array as written by hand or by older exports.
#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum SnapshotFile {
    Versioned(FacilitySnapshot),
    Bare(Vec<Facility>),
}

impl SnapshotFile {
    pub(crate) fn into_facilities(self) -> Vec<Facility> {
        match self {
            SnapshotFile::Versioned(s) => s.facilities,
            SnapshotFile::Bare(facilities) => facilities,
        }
    }
}
