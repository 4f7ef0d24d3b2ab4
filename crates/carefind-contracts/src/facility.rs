//! Facility records and the builder that validates them.
//!
//! A `Facility` is produced by [`FacilityDraft::build`] (manual entry),
//! [`FacilityDraft::build_imported`] (file import) or replaced wholesale by
//! [`FacilityDraft::apply_to`]; all of them check the required fields before
//! anything reaches the store.

use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::{CarefindError, CarefindResult},
    taxonomy::{Area, Availability, CareLevel, ConfirmationMethod, ReliabilityLevel},
};

/// Unique identifier of a facility within the store.
///
/// Backed by a UUIDv7: the creation timestamp plus random bits, so ids sort
/// roughly by creation time and collide only with negligible probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FacilityId(pub uuid::Uuid);

impl FacilityId {
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7())
    }
}

impl Default for FacilityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FacilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for FacilityId {
    type Err = CarefindError;

    fn from_str(s: &str) -> CarefindResult<Self> {
        uuid::Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|e| CarefindError::validation("id", format!("'{s}' is not a facility id: {e}")))
    }
}

/// Live information obtained from the facility's website or review sites.
///
/// Only the live-info collaborator produces this.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealtimeInfo {
    /// Free-text vacancy status as published (fed to the availability classifier).
    pub availability_status: String,
    pub review_summary: String,
    /// Average review rating on a 0–5 scale, when the source publishes one.
    pub average_rating: Option<f64>,
    pub review_count: u32,
    pub last_scraped_at: DateTime<Utc>,
}

/// One care facility.
///
/// Free-text fields use the empty string for "not provided".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facility {
    pub id: FacilityId,
    pub name: String,
    pub address: String,
    #[serde(default)]
    pub area: Option<Area>,
    #[serde(default)]
    pub detail_address: String,
    #[serde(default)]
    pub facility_type: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub website_url: String,
    /// Accepted care levels. Never null; empty means none recorded.
    #[serde(default)]
    pub care_levels: Vec<CareLevel>,
    #[serde(default)]
    pub services: Vec<String>,
    #[serde(default)]
    pub additional_options: Vec<String>,
    #[serde(default)]
    pub availability: Availability,
    #[serde(default)]
    pub reliability: Option<ReliabilityLevel>,
    #[serde(default)]
    pub last_confirmed: Option<NaiveDate>,
    #[serde(default)]
    pub confirmation_method: Option<ConfirmationMethod>,
    #[serde(default)]
    pub monthly_fee: String,
    #[serde(default)]
    pub medical_care: String,
    #[serde(default)]
    pub features: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub reviews: String,
    #[serde(default)]
    pub realtime_info: Option<RealtimeInfo>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    /// Soft-delete flag: hidden facilities only show in the hidden view.
    #[serde(default)]
    pub is_hidden: bool,
}

impl Facility {
    /// Average rating from live info, if any.
    pub fn average_rating(&self) -> Option<f64> {
        self.realtime_info.as_ref().and_then(|info| info.average_rating)
    }

    pub fn has_website(&self) -> bool {
        !self.website_url.trim().is_empty()
    }

    pub fn accepts(&self, level: CareLevel) -> bool {
        self.care_levels.contains(&level)
    }
}

/// User-editable facility fields, validated before they become a `Facility`.
///
/// Strings are trimmed by `build`/`apply_to`; `name` and `address` must be
/// non-empty afterwards (imports only require `name`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FacilityDraft {
    pub name: String,
    pub address: String,
    pub area: Option<Area>,
    pub detail_address: String,
    pub facility_type: String,
    pub phone: String,
    pub website_url: String,
    pub care_levels: Vec<CareLevel>,
    pub services: Vec<String>,
    pub additional_options: Vec<String>,
    pub availability: Availability,
    pub reliability: Option<ReliabilityLevel>,
    pub last_confirmed: Option<NaiveDate>,
    pub confirmation_method: Option<ConfirmationMethod>,
    pub monthly_fee: String,
    pub medical_care: String,
    pub features: String,
    pub notes: String,
    pub reviews: String,
    pub is_hidden: bool,
}

impl FacilityDraft {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            ..Self::default()
        }
    }

    /// Draft pre-filled from an existing record, for edits.
    pub fn from_facility(facility: &Facility) -> Self {
        Self {
            name: facility.name.clone(),
            address: facility.address.clone(),
            area: facility.area.clone(),
            detail_address: facility.detail_address.clone(),
            facility_type: facility.facility_type.clone(),
            phone: facility.phone.clone(),
            website_url: facility.website_url.clone(),
            care_levels: facility.care_levels.clone(),
            services: facility.services.clone(),
            additional_options: facility.additional_options.clone(),
            availability: facility.availability,
            reliability: facility.reliability,
            last_confirmed: facility.last_confirmed,
            confirmation_method: facility.confirmation_method,
            monthly_fee: facility.monthly_fee.clone(),
            medical_care: facility.medical_care.clone(),
            features: facility.features.clone(),
            notes: facility.notes.clone(),
            reviews: facility.reviews.clone(),
            is_hidden: facility.is_hidden,
        }
    }

    /// Trim every text field and check the required ones.
    fn validated(mut self, require_address: bool) -> CarefindResult<Self> {
        for field in [
            &mut self.name,
            &mut self.address,
            &mut self.detail_address,
            &mut self.facility_type,
            &mut self.phone,
            &mut self.website_url,
            &mut self.monthly_fee,
            &mut self.medical_care,
            &mut self.features,
            &mut self.notes,
            &mut self.reviews,
        ] {
            let trimmed = field.trim();
            if trimmed.len() != field.len() {
                *field = trimmed.to_string();
            }
        }

        if self.name.is_empty() {
            return Err(CarefindError::validation("name", "facility name is required"));
        }
        if require_address && self.address.is_empty() {
            return Err(CarefindError::validation("address", "address is required"));
        }
        Ok(self)
    }

    /// Validate and produce a new facility with a fresh id.
    pub fn build(self, now: DateTime<Utc>) -> CarefindResult<Facility> {
        self.validated(true).map(|d| d.into_facility(now))
    }

    /// Like [`build`](Self::build), but only the name is required: imported
    /// rows may leave the address empty.
    pub fn build_imported(self, now: DateTime<Utc>) -> CarefindResult<Facility> {
        self.validated(false).map(|d| d.into_facility(now))
    }

    fn into_facility(self, now: DateTime<Utc>) -> Facility {
        let d = self;
        Facility {
            id: FacilityId::new(),
            name: d.name,
            address: d.address,
            area: d.area,
            detail_address: d.detail_address,
            facility_type: d.facility_type,
            phone: d.phone,
            website_url: d.website_url,
            care_levels: d.care_levels,
            services: d.services,
            additional_options: d.additional_options,
            availability: d.availability,
            reliability: d.reliability,
            last_confirmed: d.last_confirmed,
            confirmation_method: d.confirmation_method,
            monthly_fee: d.monthly_fee,
            medical_care: d.medical_care,
            features: d.features,
            notes: d.notes,
            reviews: d.reviews,
            realtime_info: None,
            last_updated: None,
            created_at: now,
            is_hidden: d.is_hidden,
        }
    }

    /// Validate and produce the replacement for `existing`.
    ///
    /// Identity (`id`, `created_at`) and live info are carried over;
    /// `last_updated` becomes `now`.
    pub fn apply_to(self, existing: &Facility, now: DateTime<Utc>) -> CarefindResult<Facility> {
        let mut next = self.build(existing.created_at)?;
        next.id = existing.id;
        next.realtime_info = existing.realtime_info.clone();
        next.last_updated = Some(now);
        Ok(next)
    }
}
