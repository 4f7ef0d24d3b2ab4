//! Search criteria: filters, visibility and sort keys.

use serde::{Deserialize, Serialize};

use crate::taxonomy::{Area, Availability, CareLevel, ReliabilityLevel};

/// Which records a view includes with respect to the soft-delete flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Visibility {
    /// Regular search views: hidden records are excluded.
    #[default]
    VisibleOnly,
    /// The hidden-management view.
    HiddenOnly,
    All,
}

/// Age of the last confirmation, as a filter criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Freshness {
    /// Confirmed within the last 7 days.
    Within7Days,
    /// Confirmed within the last 30 days.
    Within30Days,
    /// Confirmed more than 30 days ago, or never.
    Overdue,
}

impl Freshness {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "7" | "within-7-days" => Some(Freshness::Within7Days),
            "30" | "within-30-days" => Some(Freshness::Within30Days),
            "overdue" => Some(Freshness::Overdue),
            _ => None,
        }
    }
}

/// Conjunctive filter: a record must satisfy every criterion that is set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FacilityFilter {
    pub area: Option<Area>,
    pub care_level: Option<CareLevel>,
    pub availability: Option<Availability>,
    /// Minimum live-info average rating. Facilities without a rating never pass.
    pub min_rating: Option<f64>,
    pub reliability: Option<ReliabilityLevel>,
    pub freshness: Option<Freshness>,
    /// Case-insensitive substring of the facility name.
    pub name_query: Option<String>,
    #[serde(default)]
    pub visibility: Visibility,
}

/// Ordering applied after filtering and scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    /// Recommendation score, highest first.
    Recommended,
    /// Reliability tier, then most recent confirmation.
    Reliability,
    /// Live-info average rating, highest first.
    Rating,
    /// Facility name, collated.
    Name,
    /// Most recently updated first.
    Updated,
}

impl SortKey {
    /// Parse a sort key; unknown keys yield `None`, which sorts as identity.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "recommended" => Some(SortKey::Recommended),
            "reliability" => Some(SortKey::Reliability),
            "rating" => Some(SortKey::Rating),
            "name" => Some(SortKey::Name),
            "updated" => Some(SortKey::Updated),
            _ => None,
        }
    }
}
