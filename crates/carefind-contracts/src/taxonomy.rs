//! Closed vocabularies used by facility records.
//!
//! Every enum carries a Japanese display `label()` (what the CSV files and the
//! original data use) and a kebab-case slug (what serde writes). `parse()`
//! accepts either form, so user input and imported files can use both.

use std::fmt;

use serde::{Deserialize, Serialize};

// ── Availability ─────────────────────────────────────────────────────────────

/// Vacancy status of a facility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Availability {
    /// Vacancies open (空きあり).
    Available,
    /// Only a few vacancies left (空き僅か).
    Scarce,
    /// No vacancies (満室).
    Full,
    /// Status has to be confirmed with the facility (要確認).
    #[default]
    NeedsConfirmation,
}

impl Availability {
    pub const ALL: [Availability; 4] = [
        Availability::Available,
        Availability::Scarce,
        Availability::Full,
        Availability::NeedsConfirmation,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Availability::Available => "空きあり",
            Availability::Scarce => "空き僅か",
            Availability::Full => "満室",
            Availability::NeedsConfirmation => "要確認",
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            Availability::Available => "available",
            Availability::Scarce => "scarce",
            Availability::Full => "full",
            Availability::NeedsConfirmation => "needs-confirmation",
        }
    }

    /// Parse a label or slug. Returns `None` for anything else.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|a| a.label() == s || a.slug().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ── Reliability ──────────────────────────────────────────────────────────────

/// Confidence in a facility's recorded data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReliabilityLevel {
    /// Confirmed directly, e.g. by phone.
    High,
    /// Taken from web information.
    Medium,
    /// Unverified.
    Low,
}

impl ReliabilityLevel {
    pub const ALL: [ReliabilityLevel; 3] = [
        ReliabilityLevel::High,
        ReliabilityLevel::Medium,
        ReliabilityLevel::Low,
    ];

    /// Label written to CSV exports when no tier is set.
    pub const UNSET_LABEL: &'static str = "未設定";

    pub fn label(self) -> &'static str {
        match self {
            ReliabilityLevel::High => "高",
            ReliabilityLevel::Medium => "中",
            ReliabilityLevel::Low => "低",
        }
    }

    /// The descriptive label used in CSV exports.
    pub fn long_label(self) -> &'static str {
        match self {
            ReliabilityLevel::High => "🟢 高（電話確認済み）",
            ReliabilityLevel::Medium => "🟡 中（WEB情報）",
            ReliabilityLevel::Low => "🔴 低（要確認）",
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            ReliabilityLevel::High => "high",
            ReliabilityLevel::Medium => "medium",
            ReliabilityLevel::Low => "low",
        }
    }

    /// Sort rank: high=3, medium=2, low=1. Unset is ranked 0 by
    /// [`reliability_rank`].
    pub fn rank(self) -> u8 {
        match self {
            ReliabilityLevel::High => 3,
            ReliabilityLevel::Medium => 2,
            ReliabilityLevel::Low => 1,
        }
    }

    /// Parse a slug, short label or long export label.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL.into_iter().find(|r| {
            r.slug().eq_ignore_ascii_case(s) || r.label() == s || r.long_label() == s
        })
    }
}

/// Rank of an optional tier; unset ranks below `low`.
pub fn reliability_rank(level: Option<ReliabilityLevel>) -> u8 {
    level.map_or(0, ReliabilityLevel::rank)
}

impl fmt::Display for ReliabilityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ── Confirmation method ──────────────────────────────────────────────────────

/// How the last confirmation of a facility's data was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConfirmationMethod {
    Phone,
    Web,
    Visit,
    Email,
    Estimate,
}

impl ConfirmationMethod {
    pub const ALL: [ConfirmationMethod; 5] = [
        ConfirmationMethod::Phone,
        ConfirmationMethod::Web,
        ConfirmationMethod::Visit,
        ConfirmationMethod::Email,
        ConfirmationMethod::Estimate,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ConfirmationMethod::Phone => "電話",
            ConfirmationMethod::Web => "WEB",
            ConfirmationMethod::Visit => "訪問",
            ConfirmationMethod::Email => "メール",
            ConfirmationMethod::Estimate => "推測",
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            ConfirmationMethod::Phone => "phone",
            ConfirmationMethod::Web => "web",
            ConfirmationMethod::Visit => "visit",
            ConfirmationMethod::Email => "email",
            ConfirmationMethod::Estimate => "estimate",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|m| m.slug().eq_ignore_ascii_case(s) || m.label() == s)
    }
}

impl fmt::Display for ConfirmationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

// ── Care level ───────────────────────────────────────────────────────────────

/// Long-term care certification tier a facility accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CareLevel {
    #[serde(rename = "support-1")]
    Support1,
    #[serde(rename = "support-2")]
    Support2,
    #[serde(rename = "care-1")]
    Care1,
    #[serde(rename = "care-2")]
    Care2,
    #[serde(rename = "care-3")]
    Care3,
    #[serde(rename = "care-4")]
    Care4,
    #[serde(rename = "care-5")]
    Care5,
}

impl CareLevel {
    pub const ALL: [CareLevel; 7] = [
        CareLevel::Support1,
        CareLevel::Support2,
        CareLevel::Care1,
        CareLevel::Care2,
        CareLevel::Care3,
        CareLevel::Care4,
        CareLevel::Care5,
    ];

    pub fn label(self) -> &'static str {
        match self {
            CareLevel::Support1 => "要支援1",
            CareLevel::Support2 => "要支援2",
            CareLevel::Care1 => "要介護1",
            CareLevel::Care2 => "要介護2",
            CareLevel::Care3 => "要介護3",
            CareLevel::Care4 => "要介護4",
            CareLevel::Care5 => "要介護5",
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            CareLevel::Support1 => "support-1",
            CareLevel::Support2 => "support-2",
            CareLevel::Care1 => "care-1",
            CareLevel::Care2 => "care-2",
            CareLevel::Care3 => "care-3",
            CareLevel::Care4 => "care-4",
            CareLevel::Care5 => "care-5",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.label() == s || c.slug().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for CareLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ── Area ─────────────────────────────────────────────────────────────────────

/// The ward a facility is located in.
///
/// The ten Sapporo wards are listed explicitly; any other area name read from
/// a file is kept verbatim in `Other` so that nothing is lost on a round trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Area {
    Chuo,
    Kita,
    Higashi,
    Shiroishi,
    Toyohira,
    Minami,
    Nishi,
    Atsubetsu,
    Teine,
    Kiyota,
    Other(String),
}

impl Area {
    pub const WARDS: [Area; 10] = [
        Area::Chuo,
        Area::Kita,
        Area::Higashi,
        Area::Shiroishi,
        Area::Toyohira,
        Area::Minami,
        Area::Nishi,
        Area::Atsubetsu,
        Area::Teine,
        Area::Kiyota,
    ];

    pub fn label(&self) -> &str {
        match self {
            Area::Chuo => "中央区",
            Area::Kita => "北区",
            Area::Higashi => "東区",
            Area::Shiroishi => "白石区",
            Area::Toyohira => "豊平区",
            Area::Minami => "南区",
            Area::Nishi => "西区",
            Area::Atsubetsu => "厚別区",
            Area::Teine => "手稲区",
            Area::Kiyota => "清田区",
            Area::Other(name) => name,
        }
    }

    fn romaji(&self) -> Option<&'static str> {
        Some(match self {
            Area::Chuo => "chuo",
            Area::Kita => "kita",
            Area::Higashi => "higashi",
            Area::Shiroishi => "shiroishi",
            Area::Toyohira => "toyohira",
            Area::Minami => "minami",
            Area::Nishi => "nishi",
            Area::Atsubetsu => "atsubetsu",
            Area::Teine => "teine",
            Area::Kiyota => "kiyota",
            Area::Other(_) => return None,
        })
    }

    /// Parse an area name. Empty input yields `None`; a ward label (with or
    /// without the `札幌市` prefix) or its romaji yields that ward; anything
    /// else becomes `Other`.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }
        let bare = s.strip_prefix("札幌市").unwrap_or(s);
        let ward = Self::WARDS.into_iter().find(|w| {
            w.label() == bare || w.romaji().is_some_and(|r| r.eq_ignore_ascii_case(bare))
        });
        Some(ward.unwrap_or_else(|| Area::Other(s.to_string())))
    }
}

impl From<String> for Area {
    fn from(s: String) -> Self {
        Area::parse(&s).unwrap_or(Area::Other(s))
    }
}

impl From<Area> for String {
    fn from(area: Area) -> Self {
        area.label().to_string()
    }
}

impl fmt::Display for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
