//! The facility store: the single owner of the facility collection.
//!
//! Every mutation follows the same order:
//!
//!   snapshot → validate / modify the copy → save through the repository → swap
//!
//! so a validation failure or a failed save leaves both the in-memory
//! collection and the stored snapshot exactly as they were.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info, warn};

use carefind_contracts::{
    error::{CarefindError, CarefindResult},
    facility::{Facility, FacilityDraft, FacilityId, RealtimeInfo},
    profile::PatientProfile,
    query::{FacilityFilter, SortKey, Visibility},
    taxonomy::{Availability, ConfirmationMethod, ReliabilityLevel},
};
use carefind_scoring::{AvailabilityClassifier, ScoredFacility, ScoringConfig, SearchPipeline};

use crate::traits::FacilityRepository;

/// Tag on review notes appended when a user adopts web information.
pub const WEB_NOTE_TAG: &str = "WEB取得";
/// Tag on review notes appended by the bulk web update.
pub const BULK_NOTE_TAG: &str = "一括更新";

/// Outcome of merging imported records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    /// Records dropped because the name already existed (case-insensitive),
    /// in the store or earlier in the same batch.
    pub duplicates: usize,
}

/// Build `[tag yyyy/mm/dd] text`.
pub fn review_note(tag: &str, today: NaiveDate, text: &str) -> String {
    format!("[{tag} {}] {text}", today.format("%Y/%m/%d"))
}

fn append_review(reviews: &mut String, note: &str) {
    if reviews.is_empty() {
        reviews.push_str(note);
    } else {
        reviews.push_str("\n\n");
        reviews.push_str(note);
    }
}

fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Owns the facility collection and the patient profile.
pub struct FacilityStore {
    repo: Box<dyn FacilityRepository>,
    facilities: Vec<Facility>,
    profile: Option<PatientProfile>,
    pipeline: SearchPipeline,
    classifier: AvailabilityClassifier,
}

impl FacilityStore {
    /// Load facilities and profile from `repo`.
    pub fn open(repo: Box<dyn FacilityRepository>, config: &ScoringConfig) -> CarefindResult<Self> {
        let facilities = repo.load_facilities()?;
        let profile = repo.load_profile()?;
        info!(
            facilities = facilities.len(),
            has_profile = profile.is_some(),
            "facility store opened"
        );
        Ok(Self {
            repo,
            facilities,
            profile,
            pipeline: SearchPipeline::new(config),
            classifier: AvailabilityClassifier::from_config(config),
        })
    }

    // ── Reads ────────────────────────────────────────────────────────────────

    pub fn facilities(&self) -> &[Facility] {
        &self.facilities
    }

    pub fn len(&self) -> usize {
        self.facilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facilities.is_empty()
    }

    pub fn get(&self, id: FacilityId) -> CarefindResult<&Facility> {
        self.facilities
            .iter()
            .find(|f| f.id == id)
            .ok_or_else(|| CarefindError::NotFound { id: id.to_string() })
    }

    pub fn classifier(&self) -> &AvailabilityClassifier {
        &self.classifier
    }

    pub fn pipeline(&self) -> &SearchPipeline {
        &self.pipeline
    }

    pub fn profile(&self) -> Option<&PatientProfile> {
        self.profile.as_ref()
    }

    /// Filtered, scored and sorted view. Visibility comes from the filter,
    /// whose default shows visible facilities only.
    pub fn search(
        &self,
        filter: &FacilityFilter,
        sort: Option<SortKey>,
        now: DateTime<Utc>,
    ) -> Vec<ScoredFacility<'_>> {
        self.pipeline
            .run(&self.facilities, filter, self.profile.as_ref(), sort, now)
    }

    /// Hidden facilities, in store order.
    pub fn hidden(&self) -> Vec<&Facility> {
        self.facilities.iter().filter(|f| f.is_hidden).collect()
    }

    /// Hidden facilities with scores, for the hidden management view.
    pub fn hidden_view(&self, now: DateTime<Utc>) -> Vec<ScoredFacility<'_>> {
        let filter = FacilityFilter {
            visibility: Visibility::HiddenOnly,
            ..FacilityFilter::default()
        };
        self.search(&filter, None, now)
    }

    /// `DuplicateRecord` if a facility with this name exists (case-insensitive).
    pub fn check_unique_name(&self, name: &str) -> CarefindResult<()> {
        let key = name_key(name);
        if self.facilities.iter().any(|f| name_key(&f.name) == key) {
            return Err(CarefindError::DuplicateRecord {
                name: name.trim().to_string(),
            });
        }
        Ok(())
    }

    // ── Mutations ────────────────────────────────────────────────────────────

    /// Apply `change` to a copy of the collection, persist it, then swap it in.
    fn transact<T>(
        &mut self,
        change: impl FnOnce(&mut Vec<Facility>) -> CarefindResult<T>,
    ) -> CarefindResult<T> {
        let mut next = self.facilities.clone();
        let out = change(&mut next)?;
        self.repo.save_facilities(&next)?;
        self.facilities = next;
        Ok(out)
    }

    /// Run `change` on the facility with `id`.
    fn modify<T>(
        &mut self,
        id: FacilityId,
        change: impl FnOnce(&mut Facility) -> CarefindResult<T>,
    ) -> CarefindResult<T> {
        self.transact(|all| {
            let facility = all
                .iter_mut()
                .find(|f| f.id == id)
                .ok_or_else(|| CarefindError::NotFound { id: id.to_string() })?;
            change(facility)
        })
    }

    /// Validate `draft` and add it as a new facility.
    pub fn add(&mut self, draft: FacilityDraft, now: DateTime<Utc>) -> CarefindResult<FacilityId> {
        let facility = draft.build(now)?;
        let id = facility.id;
        let name = facility.name.clone();
        self.transact(|all| {
            all.push(facility);
            Ok(())
        })?;
        info!(facility_id = %id, name = %name, "facility added");
        Ok(id)
    }

    /// Replace the editable fields of `id` with `draft`.
    pub fn update(
        &mut self,
        id: FacilityId,
        draft: FacilityDraft,
        now: DateTime<Utc>,
    ) -> CarefindResult<()> {
        self.modify(id, |facility| {
            *facility = draft.apply_to(facility, now)?;
            Ok(())
        })?;
        info!(facility_id = %id, "facility updated");
        Ok(())
    }

    pub fn delete(&mut self, id: FacilityId) -> CarefindResult<Facility> {
        let removed = self.transact(|all| {
            let index = all
                .iter()
                .position(|f| f.id == id)
                .ok_or_else(|| CarefindError::NotFound { id: id.to_string() })?;
            Ok(all.remove(index))
        })?;
        info!(facility_id = %id, name = %removed.name, "facility deleted");
        Ok(removed)
    }

    /// Remove every facility. Returns how many were removed.
    pub fn delete_all(&mut self) -> CarefindResult<usize> {
        let count = self.transact(|all| {
            let count = all.len();
            all.clear();
            Ok(count)
        })?;
        warn!(count, "all facilities deleted");
        Ok(count)
    }

    pub fn set_hidden(&mut self, id: FacilityId, hidden: bool) -> CarefindResult<()> {
        self.modify(id, |facility| {
            facility.is_hidden = hidden;
            Ok(())
        })?;
        debug!(facility_id = %id, hidden, "visibility changed");
        Ok(())
    }

    /// Make every hidden facility visible again. Returns how many changed.
    pub fn unhide_all(&mut self) -> CarefindResult<usize> {
        let hidden = self.facilities.iter().filter(|f| f.is_hidden).count();
        if hidden == 0 {
            return Ok(0);
        }
        self.transact(|all| {
            all.iter_mut().for_each(|f| f.is_hidden = false);
            Ok(())
        })?;
        info!(count = hidden, "hidden facilities restored");
        Ok(hidden)
    }

    /// Unhide the first hidden facility whose name contains `fragment`.
    pub fn unhide_by_name(&mut self, fragment: &str) -> CarefindResult<Option<FacilityId>> {
        let Some(id) = self
            .facilities
            .iter()
            .find(|f| f.is_hidden && f.name.contains(fragment))
            .map(|f| f.id)
        else {
            debug!(fragment, "no hidden facility matches");
            return Ok(None);
        };
        self.set_hidden(id, false)?;
        Ok(Some(id))
    }

    /// Record a confirmation made `today` by `method`. Confirmed data is
    /// trusted: reliability becomes high.
    pub fn mark_confirmed(
        &mut self,
        id: FacilityId,
        method: ConfirmationMethod,
        today: NaiveDate,
    ) -> CarefindResult<()> {
        self.modify(id, |facility| {
            facility.last_confirmed = Some(today);
            facility.confirmation_method = Some(method);
            facility.reliability = Some(ReliabilityLevel::High);
            Ok(())
        })?;
        info!(facility_id = %id, method = %method, "facility confirmed");
        Ok(())
    }

    /// Attach freshly fetched live info.
    pub fn apply_live_info(
        &mut self,
        id: FacilityId,
        info: RealtimeInfo,
        now: DateTime<Utc>,
    ) -> CarefindResult<()> {
        self.modify(id, |facility| {
            facility.realtime_info = Some(info);
            facility.last_updated = Some(now);
            Ok(())
        })?;
        debug!(facility_id = %id, "live info applied");
        Ok(())
    }

    /// Adopt the web's reading of the stored live info as the recorded data.
    ///
    /// Availability takes the classifier result (unknown leaves it as is),
    /// reliability becomes medium, the facility counts as confirmed today via
    /// the web, and the review summary is appended as a dated note. Returns
    /// the availability now recorded.
    pub fn apply_web_availability(
        &mut self,
        id: FacilityId,
        now: DateTime<Utc>,
    ) -> CarefindResult<Availability> {
        let classifier = self.classifier.clone();
        let today = now.date_naive();
        let availability = self.modify(id, |facility| {
            let info = facility.realtime_info.clone().ok_or_else(|| {
                CarefindError::validation("realtime_info", "no live information has been fetched")
            })?;
            if let Some(web) = classifier.classify(&info.availability_status) {
                facility.availability = web;
            }
            facility.reliability = Some(ReliabilityLevel::Medium);
            facility.last_confirmed = Some(today);
            facility.confirmation_method = Some(ConfirmationMethod::Web);
            if !info.review_summary.is_empty() {
                let note = review_note(WEB_NOTE_TAG, today, &info.review_summary);
                append_review(&mut facility.reviews, &note);
            }
            Ok(facility.availability)
        })?;
        info!(facility_id = %id, availability = %availability, "web availability adopted");
        Ok(availability)
    }

    /// Bulk-update variant: attach `info` and adopt it in one step. The
    /// reliability tier is left alone.
    pub fn adopt_bulk_web_info(
        &mut self,
        id: FacilityId,
        info: RealtimeInfo,
        now: DateTime<Utc>,
    ) -> CarefindResult<Availability> {
        let web = self.classifier.classify(&info.availability_status);
        let today = now.date_naive();
        self.modify(id, |facility| {
            if let Some(web) = web {
                facility.availability = web;
            }
            if !info.review_summary.is_empty() {
                let note = review_note(BULK_NOTE_TAG, today, &info.review_summary);
                append_review(&mut facility.reviews, &note);
            }
            facility.realtime_info = Some(info);
            facility.last_updated = Some(now);
            facility.last_confirmed = Some(today);
            facility.confirmation_method = Some(ConfirmationMethod::Web);
            Ok(facility.availability)
        })
    }

    /// Merge parsed import records.
    ///
    /// Names already present, or repeated within `records`, are dropped and
    /// counted. Accepted records default to medium reliability and web
    /// confirmation when the file left those unset. Nothing is saved when no
    /// record survives.
    pub fn merge_import(&mut self, records: Vec<Facility>) -> CarefindResult<ImportSummary> {
        let mut seen: HashSet<String> = self.facilities.iter().map(|f| name_key(&f.name)).collect();
        let mut accepted = Vec::new();
        let mut summary = ImportSummary::default();

        for mut record in records {
            if !seen.insert(name_key(&record.name)) {
                let err = CarefindError::DuplicateRecord { name: record.name.clone() };
                debug!(error = %err, "import record dropped");
                summary.duplicates += 1;
                continue;
            }
            record.reliability.get_or_insert(ReliabilityLevel::Medium);
            record.confirmation_method.get_or_insert(ConfirmationMethod::Web);
            record.realtime_info = None;
            record.last_updated = None;
            accepted.push(record);
        }

        summary.imported = accepted.len();
        if !accepted.is_empty() {
            self.transact(|all| {
                all.extend(accepted);
                Ok(())
            })?;
        }
        info!(
            imported = summary.imported,
            duplicates = summary.duplicates,
            "import merged"
        );
        Ok(summary)
    }

    /// Validate and persist the patient profile, stamping `saved_at`.
    pub fn save_profile(&mut self, mut profile: PatientProfile, now: DateTime<Utc>) -> CarefindResult<()> {
        profile.validate()?;
        profile.saved_at = Some(now);
        self.repo.save_profile(&profile)?;
        info!(patient = %profile.name, "patient profile saved");
        self.profile = Some(profile);
        Ok(())
    }

    pub fn clear_profile(&mut self) -> CarefindResult<()> {
        self.repo.clear_profile()?;
        self.profile = None;
        info!("patient profile cleared");
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
