//! The patient profile that personalises recommendation scores.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::{CarefindError, CarefindResult},
    taxonomy::CareLevel,
};

/// The single comparison target for recommendation scoring.
///
/// The store holds at most one profile; when none is saved (or the saved one
/// is empty) scoring falls back to the profile-independent baseline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatientProfile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub care_level: Option<CareLevel>,
    /// Free text, e.g. "月15万円まで". Recorded but not scored.
    #[serde(default)]
    pub budget: String,
    /// Free text such as "胃ろう、インスリン".
    #[serde(default)]
    pub medical_needs: String,
    /// Free text such as "個室希望、リハビリ".
    #[serde(default)]
    pub preferences: String,
    #[serde(default)]
    pub saved_at: Option<DateTime<Utc>>,
}

impl PatientProfile {
    /// True when no field carries information.
    pub fn is_empty(&self) -> bool {
        self.name.trim().is_empty()
            && self.age.is_none()
            && self.care_level.is_none()
            && self.budget.trim().is_empty()
            && self.medical_needs.trim().is_empty()
            && self.preferences.trim().is_empty()
    }

    /// Checks performed before a profile is saved: the patient name is required.
    pub fn validate(&self) -> CarefindResult<()> {
        if self.name.trim().is_empty() {
            return Err(CarefindError::validation("name", "patient name is required"));
        }
        Ok(())
    }
}
