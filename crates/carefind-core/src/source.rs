//! Website classification and the records that web collaborators return.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use carefind_contracts::{
    facility::FacilityDraft,
    taxonomy::{Area, Availability, CareLevel, ConfirmationMethod, ReliabilityLevel},
};

/// Kind of website a URL points at, derived from its hostname.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceType {
    /// LIFULL HOME'S (homes.co.jp).
    Homes,
    /// みんなの介護 (minnannokaigo.com).
    Minnano,
    /// Municipal or prefectural site.
    Government,
    /// Some other care-related portal.
    CareSite,
    /// A facility's own website.
    Individual,
}

impl SourceType {
    /// Classify by hostname. Rules are checked in order: `homes.co.jp`,
    /// `minnannokaigo.com`, government domains (`.lg.jp`, `city.`, `pref.`
    /// labels), care keywords (`kaigo`, `nursing`, `care`), then individual.
    ///
    /// Input that does not parse as a URL is matched as a bare hostname.
    pub fn classify(raw: &str) -> Self {
        let host = url::Url::parse(raw.trim())
            .ok()
            .and_then(|u| u.host_str().map(str::to_lowercase))
            .unwrap_or_else(|| raw.trim().to_lowercase());
        let dotted = format!(".{host}.");

        if dotted.contains(".homes.co.jp.") {
            SourceType::Homes
        } else if dotted.contains(".minnannokaigo.com.") {
            SourceType::Minnano
        } else if dotted.ends_with(".lg.jp.") || dotted.contains(".city.") || dotted.contains(".pref.") {
            SourceType::Government
        } else if ["kaigo", "nursing", "care"].iter().any(|k| host.contains(k)) {
            SourceType::CareSite
        } else {
            SourceType::Individual
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SourceType::Homes => "ライフルホームズ",
            SourceType::Minnano => "みんなの介護",
            SourceType::Government => "自治体サイト",
            SourceType::CareSite => "介護関連サイト",
            SourceType::Individual => "個別施設サイト",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A facility-shaped record read off a web page, not yet in the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedFacility {
    pub name: String,
    pub address: String,
    pub area: Option<Area>,
    pub phone: String,
    pub website_url: String,
    pub care_levels: Vec<CareLevel>,
    pub monthly_fee: String,
    pub medical_care: String,
    pub features: String,
    pub availability: Availability,
    pub reliability: Option<ReliabilityLevel>,
    pub last_confirmed: Option<NaiveDate>,
    pub confirmation_method: Option<ConfirmationMethod>,
    pub notes: String,
    pub reviews: String,
    pub source_url: String,
    pub source_type: SourceType,
}

impl ExtractedFacility {
    /// The draft used to save this record through the validating builder.
    pub fn to_draft(&self) -> FacilityDraft {
        FacilityDraft {
            name: self.name.clone(),
            address: self.address.clone(),
            area: self.area.clone(),
            phone: self.phone.clone(),
            website_url: self.website_url.clone(),
            care_levels: self.care_levels.clone(),
            monthly_fee: self.monthly_fee.clone(),
            medical_care: self.medical_care.clone(),
            features: self.features.clone(),
            availability: self.availability,
            reliability: self.reliability,
            last_confirmed: self.last_confirmed,
            confirmation_method: self.confirmation_method,
            notes: self.notes.clone(),
            reviews: self.reviews.clone(),
            ..FacilityDraft::default()
        }
    }
}

/// What a quick look at a facility website suggests for a new record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebProbe {
    pub availability: Availability,
    pub review_summary: String,
}

impl WebProbe {
    /// Pre-fill `draft` the way web-sourced data is recorded: medium
    /// reliability, confirmed `today` via the web.
    pub fn prefill(&self, draft: &mut FacilityDraft, today: NaiveDate) {
        draft.availability = self.availability;
        draft.reliability = Some(ReliabilityLevel::Medium);
        draft.last_confirmed = Some(today);
        draft.confirmation_method = Some(ConfirmationMethod::Web);
        draft.reviews = self.review_summary.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_by_host() {
        let cases = [
            ("https://www.homes.co.jp/kaigo/123", SourceType::Homes),
            ("https://www.minnannokaigo.com/facility/1", SourceType::Minnano),
            ("https://www.city.sapporo.jp/kaigo/", SourceType::Government),
            ("http://city.sapporo.jp", SourceType::Government),
            ("https://www.pref.hokkaido.lg.jp/", SourceType::Government),
            ("https://sapporo-kaigo.example.jp", SourceType::CareSite),
            ("https://nursinghome.example.com", SourceType::CareSite),
            ("https://sakura-en.example.jp/care/", SourceType::Individual),
            ("not a url", SourceType::Individual),
        ];
        for (url, expected) in cases {
            assert_eq!(SourceType::classify(url), expected, "{url}");
        }
    }

    #[test]
    fn homes_wins_over_care_keyword() {
        assert_eq!(
            SourceType::classify("https://kaigo.homes.co.jp/"),
            SourceType::Homes
        );
    }

    #[test]
    fn prefill_marks_web_medium() {
        let probe = WebProbe {
            availability: Availability::Scarce,
            review_summary: "[WEB取得] 清潔".into(),
        };
        let today = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        let mut draft = FacilityDraft::new("A", "x");
        probe.prefill(&mut draft, today);
        assert_eq!(draft.availability, Availability::Scarce);
        assert_eq!(draft.reliability, Some(ReliabilityLevel::Medium));
        assert_eq!(draft.confirmation_method, Some(ConfirmationMethod::Web));
        assert_eq!(draft.last_confirmed, Some(today));
    }
}
