//! JSON-file implementation of `FacilityRepository`.
//!
//! Layout inside the data directory:
//!
//! - `facilities.json`: a [`FacilitySnapshot`], rewritten on every save
//! - `profile.json`: the patient profile, absent when none is saved
//!
//! Writes go to a temporary sibling first and are renamed into place, so a
//! crash mid-write leaves the previous snapshot intact. A snapshot that
//! cannot be parsed is copied to `facilities.json.corrupt` and loaded as an
//! empty collection.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

use carefind_contracts::{
    error::{CarefindError, CarefindResult},
    facility::Facility,
    profile::PatientProfile,
};
use carefind_core::traits::FacilityRepository;

use crate::snapshot::{FacilitySnapshot, SnapshotFile};

pub const FACILITIES_FILE: &str = "facilities.json";
pub const PROFILE_FILE: &str = "profile.json";

fn storage_error(action: &str, path: &Path, err: impl std::fmt::Display) -> CarefindError {
    CarefindError::StorageFailure {
        reason: format!("failed to {action} {}: {err}", path.display()),
    }
}

/// A repository backed by JSON files in one directory.
#[derive(Debug, Clone)]
pub struct JsonFileRepository {
    dir: PathBuf,
}

impl JsonFileRepository {
    /// Use `dir`, creating it if needed.
    pub fn open(dir: impl Into<PathBuf>) -> CarefindResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| storage_error("create", &dir, e))?;
        debug!(dir = %dir.display(), "JSON repository opened");
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn facilities_path(&self) -> PathBuf {
        self.dir.join(FACILITIES_FILE)
    }

    fn profile_path(&self) -> PathBuf {
        self.dir.join(PROFILE_FILE)
    }

    /// Read a file, treating "not found" as `None`.
    fn read_optional(path: &Path) -> CarefindResult<Option<String>> {
        match fs::read_to_string(path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(storage_error("read", path, e)),
        }
    }

    fn write_atomic<T: Serialize>(path: &Path, value: &T) -> CarefindResult<()> {
        let json = serde_json::to_string_pretty(value).map_err(|e| storage_error("serialize", path, e))?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| storage_error("write", &tmp, e))?;
        fs::rename(&tmp, path).map_err(|e| storage_error("replace", path, e))
    }

    fn quarantine(path: &Path) {
        let backup = path.with_extension("json.corrupt");
        match fs::copy(path, &backup) {
            Ok(_) => warn!(backup = %backup.display(), "unreadable file kept as backup"),
            Err(e) => warn!(error = %e, "could not back up unreadable file"),
        }
    }
}

impl FacilityRepository for JsonFileRepository {
    fn load_facilities(&self) -> CarefindResult<Vec<Facility>> {
        let path = self.facilities_path();
        let Some(text) = Self::read_optional(&path)? else {
            debug!(path = %path.display(), "no facility snapshot yet");
            return Ok(Vec::new());
        };

        match serde_json::from_str::<SnapshotFile>(&text) {
            Ok(file) => {
                let facilities = file.into_facilities();
                info!(count = facilities.len(), "facility snapshot loaded");
                Ok(facilities)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "facility snapshot is corrupt, starting empty");
                Self::quarantine(&path);
                Ok(Vec::new())
            }
        }
    }

    fn save_facilities(&self, facilities: &[Facility]) -> CarefindResult<()> {
        let snapshot = FacilitySnapshot::new(facilities.to_vec(), Utc::now());
        Self::write_atomic(&self.facilities_path(), &snapshot)?;
        debug!(count = facilities.len(), "facility snapshot saved");
        Ok(())
    }

    fn load_profile(&self) -> CarefindResult<Option<PatientProfile>> {
        let path = self.profile_path();
        let Some(text) = Self::read_optional(&path)? else {
            return Ok(None);
        };
        match serde_json::from_str(&text) {
            Ok(profile) => Ok(Some(profile)),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "patient profile is corrupt, ignoring it");
                Self::quarantine(&path);
                Ok(None)
            }
        }
    }

    fn save_profile(&self, profile: &PatientProfile) -> CarefindResult<()> {
        Self::write_atomic(&self.profile_path(), profile)
    }

    fn clear_profile(&self) -> CarefindResult<()> {
        let path = self.profile_path();
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(storage_error("remove", &path, e)),
        }
    }
}
