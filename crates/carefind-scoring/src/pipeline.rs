//! Filter → score → sort.
//!
//! `SearchPipeline::run` is what every list view goes through: the filter is
//! conjunctive, every surviving record is scored against the profile, and the
//! result is ordered by the chosen key. Sorting is stable and reorders
//! references only; records themselves are never touched.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use tracing::debug;

use carefind_contracts::{
    facility::Facility,
    profile::PatientProfile,
    query::{FacilityFilter, Freshness, SortKey, Visibility},
    taxonomy::reliability_rank,
};

use crate::{
    config::ScoringConfig,
    recommend::RecommendationScorer,
    reliability::days_since_date,
};

/// A facility paired with its transient recommendation score.
#[derive(Debug, Clone, Copy)]
pub struct ScoredFacility<'a> {
    pub facility: &'a Facility,
    /// `None` until scored; sorts as 0.
    pub score: Option<f64>,
}

impl<'a> ScoredFacility<'a> {
    pub fn unscored(facility: &'a Facility) -> Self {
        Self { facility, score: None }
    }
}

fn visible(visibility: Visibility, facility: &Facility) -> bool {
    match visibility {
        Visibility::VisibleOnly => !facility.is_hidden,
        Visibility::HiddenOnly => facility.is_hidden,
        Visibility::All => true,
    }
}

fn fresh(freshness: Freshness, facility: &Facility, now: DateTime<Utc>) -> bool {
    let Some(date) = facility.last_confirmed else {
        // Never confirmed counts as overdue.
        return freshness == Freshness::Overdue;
    };
    let days = days_since_date(date, now).floor();
    match freshness {
        Freshness::Within7Days => days <= 7.0,
        Freshness::Within30Days => days <= 30.0,
        Freshness::Overdue => days > 30.0,
    }
}

/// True if `facility` satisfies every criterion set in `filter`.
pub fn matches(filter: &FacilityFilter, facility: &Facility, now: DateTime<Utc>) -> bool {
    if !visible(filter.visibility, facility) {
        return false;
    }
    if let Some(area) = &filter.area {
        if facility.area.as_ref() != Some(area) {
            return false;
        }
    }
    if let Some(level) = filter.care_level {
        if !facility.accepts(level) {
            return false;
        }
    }
    if let Some(availability) = filter.availability {
        if facility.availability != availability {
            return false;
        }
    }
    if let Some(min) = filter.min_rating {
        match facility.average_rating() {
            Some(rating) if rating >= min => {}
            _ => return false,
        }
    }
    if let Some(reliability) = filter.reliability {
        if facility.reliability != Some(reliability) {
            return false;
        }
    }
    if let Some(freshness) = filter.freshness {
        if !fresh(freshness, facility, now) {
            return false;
        }
    }
    if let Some(query) = filter.name_query.as_deref().map(str::trim) {
        if !query.is_empty() && !facility.name.to_lowercase().contains(&query.to_lowercase()) {
            return false;
        }
    }
    true
}

/// Apply `filter`, preserving input order.
pub fn filter_facilities<'a>(
    facilities: &'a [Facility],
    filter: &FacilityFilter,
    now: DateTime<Utc>,
) -> Vec<&'a Facility> {
    facilities.iter().filter(|f| matches(filter, f, now)).collect()
}

/// Collation key approximating Japanese dictionary order: full-width ASCII
/// folded to half-width, katakana folded to hiragana, then lowercased.
pub fn collation_key(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '\u{FF01}'..='\u{FF5E}' => char::from_u32(c as u32 - 0xFEE0).unwrap_or(c),
            '\u{3000}' => ' ',
            '\u{30A1}'..='\u{30F6}' => char::from_u32(c as u32 - 0x60).unwrap_or(c),
            _ => c,
        })
        .flat_map(char::to_lowercase)
        .collect()
}

fn compare_names(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| a.cmp(b))
}

/// Stable sort by `key`. `None` (an unrecognized key) leaves the order as is.
pub fn sort_facilities(items: &mut [ScoredFacility<'_>], key: Option<SortKey>) {
    let Some(key) = key else {
        return;
    };
    match key {
        SortKey::Recommended => items.sort_by(|a, b| {
            b.score.unwrap_or(0.0).total_cmp(&a.score.unwrap_or(0.0))
        }),
        SortKey::Reliability => items.sort_by(|a, b| {
            reliability_rank(b.facility.reliability)
                .cmp(&reliability_rank(a.facility.reliability))
                // Unset dates sort as the earliest possible date.
                .then_with(|| b.facility.last_confirmed.cmp(&a.facility.last_confirmed))
        }),
        SortKey::Rating => items.sort_by(|a, b| {
            let ra = a.facility.average_rating().unwrap_or(0.0);
            let rb = b.facility.average_rating().unwrap_or(0.0);
            rb.total_cmp(&ra)
        }),
        SortKey::Name => items.sort_by(|a, b| compare_names(&a.facility.name, &b.facility.name)),
        SortKey::Updated => {
            items.sort_by(|a, b| b.facility.last_updated.cmp(&a.facility.last_updated))
        }
    }
}

/// The search pipeline used by every facility list view.
#[derive(Debug, Clone, Default)]
pub struct SearchPipeline {
    scorer: RecommendationScorer,
}

impl SearchPipeline {
    pub fn new(config: &ScoringConfig) -> Self {
        Self {
            scorer: RecommendationScorer::new(config),
        }
    }

    pub fn scorer(&self) -> &RecommendationScorer {
        &self.scorer
    }

    /// Filter, score and sort `facilities`.
    pub fn run<'a>(
        &self,
        facilities: &'a [Facility],
        filter: &FacilityFilter,
        profile: Option<&PatientProfile>,
        sort: Option<SortKey>,
        now: DateTime<Utc>,
    ) -> Vec<ScoredFacility<'a>> {
        let mut results: Vec<ScoredFacility<'a>> = filter_facilities(facilities, filter, now)
            .into_iter()
            .map(|facility| ScoredFacility {
                facility,
                score: Some(self.scorer.score(facility, profile, now)),
            })
            .collect();

        sort_facilities(&mut results, sort);

        debug!(
            total = facilities.len(),
            matched = results.len(),
            sort = ?sort,
            "search pipeline finished"
        );
        results
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
