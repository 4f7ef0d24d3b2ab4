//! Recommendation score: an additive heuristic clamped to [0, 100].
//!
//! Components, starting from a base of 50:
//!
//! | component        | rule                                                        |
//! |------------------|-------------------------------------------------------------|
//! | care level       | +20 if the profile's level is accepted                      |
//! | medical needs    | matched / total medical keyword groups × 15                 |
//! | preferences      | matched / total preference keyword groups × 10              |
//! | rating           | (average rating − 3.0) × 2.5                                |
//! | review volume    | +3 if more than 10 reviews                                  |
//! | availability     | available +10, scarce +5, full −15                          |
//! | update recency   | +3 if updated < 1 day ago, +1 if < 7 days                   |
//! | reliability      | see [`reliability_adjustment`]                              |
//!
//! Scoring is a pure function of (facility, profile, now).

use chrono::{DateTime, Utc};

use carefind_contracts::{facility::Facility, profile::PatientProfile, taxonomy::Availability};

use crate::{
    config::{KeywordGroup, ScoringConfig},
    reliability::{days_since, reliability_adjustment},
};

pub const BASE_SCORE: f64 = 50.0;
pub const CARE_LEVEL_MATCH: f64 = 20.0;
pub const MEDICAL_WEIGHT: f64 = 15.0;
pub const PREFERENCE_WEIGHT: f64 = 10.0;
pub const NEUTRAL_RATING: f64 = 3.0;
pub const RATING_WEIGHT: f64 = 2.5;
pub const REVIEW_VOLUME_BONUS: f64 = 3.0;
pub const REVIEW_VOLUME_THRESHOLD: u32 = 10;
pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 100.0;

/// Per-component contributions of one score.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScoreBreakdown {
    pub base: f64,
    pub care_level: f64,
    pub medical: f64,
    pub preference: f64,
    pub rating: f64,
    pub review_volume: f64,
    pub availability: f64,
    pub update_recency: f64,
    pub reliability: f64,
}

impl ScoreBreakdown {
    /// Sum of all components before clamping.
    pub fn raw_total(&self) -> f64 {
        self.base
            + self.care_level
            + self.medical
            + self.preference
            + self.rating
            + self.review_volume
            + self.availability
            + self.update_recency
            + self.reliability
    }

    /// The recommendation score, clamped to [0, 100].
    pub fn total(&self) -> f64 {
        self.raw_total().clamp(MIN_SCORE, MAX_SCORE)
    }
}

pub fn availability_adjustment(availability: Availability) -> f64 {
    match availability {
        Availability::Available => 10.0,
        Availability::Scarce => 5.0,
        Availability::Full => -15.0,
        Availability::NeedsConfirmation => 0.0,
    }
}

/// Computes recommendation scores against an optional patient profile.
#[derive(Debug, Clone)]
pub struct RecommendationScorer {
    medical_keywords: Vec<KeywordGroup>,
    preference_keywords: Vec<KeywordGroup>,
}

impl RecommendationScorer {
    pub fn new(config: &ScoringConfig) -> Self {
        Self {
            medical_keywords: config.medical_keywords.clone(),
            preference_keywords: config.preference_keywords.clone(),
        }
    }

    /// Fraction of `groups` found in both texts, times `weight`.
    fn keyword_match(groups: &[KeywordGroup], wanted: &str, offered: &str, weight: f64) -> f64 {
        if groups.is_empty() || wanted.trim().is_empty() || offered.trim().is_empty() {
            return 0.0;
        }
        let wanted = wanted.to_lowercase();
        let offered = offered.to_lowercase();
        let matched = groups
            .iter()
            .filter(|g| g.found_in(&wanted) && g.found_in(&offered))
            .count();
        matched as f64 / groups.len() as f64 * weight
    }

    /// Score every component for `facility`.
    ///
    /// An empty profile counts as no profile.
    pub fn breakdown(
        &self,
        facility: &Facility,
        profile: Option<&PatientProfile>,
        now: DateTime<Utc>,
    ) -> ScoreBreakdown {
        let mut b = ScoreBreakdown {
            base: BASE_SCORE,
            ..ScoreBreakdown::default()
        };

        if let Some(profile) = profile.filter(|p| !p.is_empty()) {
            if profile.care_level.is_some_and(|level| facility.accepts(level)) {
                b.care_level = CARE_LEVEL_MATCH;
            }
            b.medical = Self::keyword_match(
                &self.medical_keywords,
                &profile.medical_needs,
                &facility.medical_care,
                MEDICAL_WEIGHT,
            );
            b.preference = Self::keyword_match(
                &self.preference_keywords,
                &profile.preferences,
                &facility.features,
                PREFERENCE_WEIGHT,
            );
        }

        if let Some(info) = &facility.realtime_info {
            // A rating of 0.0 is a real rating and scores below neutral;
            // only `None` means unrated. Keeps the rating term monotone.
            if let Some(rating) = info.average_rating {
                b.rating = (rating - NEUTRAL_RATING) * RATING_WEIGHT;
            }
            if info.review_count > REVIEW_VOLUME_THRESHOLD {
                b.review_volume = REVIEW_VOLUME_BONUS;
            }
        }

        b.availability = availability_adjustment(facility.availability);

        if let Some(updated) = facility.last_updated {
            let days = days_since(updated, now);
            b.update_recency = if days < 1.0 {
                3.0
            } else if days < 7.0 {
                1.0
            } else {
                0.0
            };
        }

        b.reliability = reliability_adjustment(facility.reliability, facility.last_confirmed, now);
        b
    }

    /// The clamped recommendation score.
    pub fn score(
        &self,
        facility: &Facility,
        profile: Option<&PatientProfile>,
        now: DateTime<Utc>,
    ) -> f64 {
        self.breakdown(facility, profile, now).total()
    }
}

impl Default for RecommendationScorer {
    fn default() -> Self {
        Self::new(&ScoringConfig::default())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
