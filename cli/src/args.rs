//! Argument groups shared by several subcommands, and the value parsers that
//! turn flag text into contract types.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Subcommand};

use carefind_contracts::{
    facility::FacilityDraft,
    profile::PatientProfile,
    query::{FacilityFilter, Freshness, SortKey, Visibility},
    taxonomy::{Area, Availability, CareLevel, ConfirmationMethod, ReliabilityLevel},
};

// ── Value parsers ────────────────────────────────────────────────────────────

fn parse_area(s: &str) -> Result<Area, String> {
    Area::parse(s).ok_or_else(|| "area must not be empty".to_string())
}

fn parse_care_level(s: &str) -> Result<CareLevel, String> {
    CareLevel::parse(s).ok_or_else(|| format!("unknown care level '{s}' (e.g. 要介護3, care-3)"))
}

fn parse_availability(s: &str) -> Result<Availability, String> {
    Availability::parse(s).ok_or_else(|| format!("unknown availability '{s}'"))
}

fn parse_reliability(s: &str) -> Result<ReliabilityLevel, String> {
    ReliabilityLevel::parse(s).ok_or_else(|| format!("unknown reliability '{s}' (high, medium, low)"))
}

pub(crate) fn parse_method(s: &str) -> Result<ConfirmationMethod, String> {
    ConfirmationMethod::parse(s).ok_or_else(|| format!("unknown confirmation method '{s}'"))
}

fn parse_freshness(s: &str) -> Result<Freshness, String> {
    Freshness::parse(s).ok_or_else(|| format!("unknown freshness '{s}' (7, 30, overdue)"))
}

pub(crate) fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s.trim(), "%Y/%m/%d"))
        .map_err(|_| format!("'{s}' is not a date (YYYY-MM-DD)"))
}

// ── Facility fields ──────────────────────────────────────────────────────────

/// Editable facility fields. Unset flags leave the draft untouched.
#[derive(Debug, Clone, Default, Args)]
pub struct FacilityFields {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
    #[arg(long, value_parser = parse_area)]
    pub area: Option<Area>,
    #[arg(long)]
    pub detail_address: Option<String>,
    #[arg(long)]
    pub facility_type: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub website: Option<String>,
    /// Repeatable; replaces the accepted care levels when given.
    #[arg(long = "care-level", value_parser = parse_care_level)]
    pub care_levels: Vec<CareLevel>,
    #[arg(long = "service")]
    pub services: Vec<String>,
    #[arg(long = "option")]
    pub additional_options: Vec<String>,
    #[arg(long, value_parser = parse_availability)]
    pub availability: Option<Availability>,
    #[arg(long, value_parser = parse_reliability)]
    pub reliability: Option<ReliabilityLevel>,
    /// Date of the last confirmation, YYYY-MM-DD.
    #[arg(long, value_parser = parse_date)]
    pub confirmed: Option<NaiveDate>,
    #[arg(long, value_parser = parse_method)]
    pub method: Option<ConfirmationMethod>,
    #[arg(long)]
    pub monthly_fee: Option<String>,
    #[arg(long)]
    pub medical_care: Option<String>,
    #[arg(long)]
    pub features: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
    #[arg(long)]
    pub reviews: Option<String>,
}

impl FacilityFields {
    pub fn apply(self, draft: &mut FacilityDraft) {
        fn set(slot: &mut String, value: Option<String>) {
            if let Some(value) = value {
                *slot = value;
            }
        }

        set(&mut draft.name, self.name);
        set(&mut draft.address, self.address);
        set(&mut draft.detail_address, self.detail_address);
        set(&mut draft.facility_type, self.facility_type);
        set(&mut draft.phone, self.phone);
        set(&mut draft.website_url, self.website);
        set(&mut draft.monthly_fee, self.monthly_fee);
        set(&mut draft.medical_care, self.medical_care);
        set(&mut draft.features, self.features);
        set(&mut draft.notes, self.notes);
        set(&mut draft.reviews, self.reviews);

        if self.area.is_some() {
            draft.area = self.area;
        }
        if !self.care_levels.is_empty() {
            draft.care_levels = self.care_levels;
        }
        if !self.services.is_empty() {
            draft.services = self.services;
        }
        if !self.additional_options.is_empty() {
            draft.additional_options = self.additional_options;
        }
        if let Some(availability) = self.availability {
            draft.availability = availability;
        }
        if self.reliability.is_some() {
            draft.reliability = self.reliability;
        }
        if self.confirmed.is_some() {
            draft.last_confirmed = self.confirmed;
        }
        if self.method.is_some() {
            draft.confirmation_method = self.method;
        }
    }
}

// ── Search ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Args)]
pub struct SearchArgs {
    #[arg(long, value_parser = parse_area)]
    pub area: Option<Area>,
    #[arg(long, value_parser = parse_care_level)]
    pub care_level: Option<CareLevel>,
    #[arg(long, value_parser = parse_availability)]
    pub availability: Option<Availability>,
    /// Minimum live-info rating (0 to 5).
    #[arg(long)]
    pub min_rating: Option<f64>,
    #[arg(long, value_parser = parse_reliability)]
    pub reliability: Option<ReliabilityLevel>,
    /// 7, 30 or overdue.
    #[arg(long, value_parser = parse_freshness)]
    pub freshness: Option<Freshness>,
    /// Case-insensitive part of the facility name.
    #[arg(long = "name")]
    pub name_query: Option<String>,
    /// recommended, reliability, rating, name or updated. Anything else
    /// keeps store order.
    #[arg(long, default_value = "recommended")]
    pub sort: String,
    /// Include hidden facilities.
    #[arg(long)]
    pub include_hidden: bool,
    #[arg(long)]
    pub limit: Option<usize>,
}

impl SearchArgs {
    pub fn filter(&self) -> FacilityFilter {
        FacilityFilter {
            area: self.area.clone(),
            care_level: self.care_level,
            availability: self.availability,
            min_rating: self.min_rating,
            reliability: self.reliability,
            freshness: self.freshness,
            name_query: self.name_query.clone(),
            visibility: if self.include_hidden {
                Visibility::All
            } else {
                Visibility::VisibleOnly
            },
        }
    }

    pub fn sort_key(&self) -> Option<SortKey> {
        SortKey::parse(&self.sort)
    }
}

// ── Profile ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Subcommand)]
pub enum ProfileCommand {
    /// Save the patient profile used for recommendation scores.
    Set(ProfileArgs),
    /// Forget the saved profile.
    Clear,
    /// Print the saved profile.
    Show,
}

#[derive(Debug, Clone, Args)]
pub struct ProfileArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub age: Option<u32>,
    #[arg(long, value_parser = parse_care_level)]
    pub care_level: Option<CareLevel>,
    #[arg(long, default_value = "")]
    pub budget: String,
    /// e.g. "胃ろう、インスリン"
    #[arg(long, default_value = "")]
    pub medical_needs: String,
    /// e.g. "個室希望、リハビリ"
    #[arg(long, default_value = "")]
    pub preferences: String,
}

impl From<ProfileArgs> for PatientProfile {
    fn from(args: ProfileArgs) -> Self {
        PatientProfile {
            name: args.name,
            age: args.age,
            care_level: args.care_level,
            budget: args.budget,
            medical_needs: args.medical_needs,
            preferences: args.preferences,
            saved_at: None,
        }
    }
}

// ── Files ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Args)]
pub struct ExportArgs {
    /// Destination; defaults to 介護施設一覧_<today>.csv in the current directory.
    pub file: Option<PathBuf>,
    /// Rows are the same filtered, sorted view `search` prints.
    #[command(flatten)]
    pub view: SearchArgs,
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn value_parsers() {
        assert_eq!(parse_care_level("要介護2"), Ok(CareLevel::Care2));
        assert!(parse_care_level("要介護9").is_err());
        assert_eq!(parse_area("北区"), Ok(Area::Kita));
        assert_eq!(
            parse_date("2026/10/17"),
            Ok(NaiveDate::from_ymd_opt(2026, 10, 17).unwrap())
        );
        assert!(parse_date("17.10.2026").is_err());
        assert_eq!(parse_freshness("overdue"), Ok(Freshness::Overdue));
    }

    #[test]
    fn unset_fields_leave_draft_alone() {
        let mut draft = FacilityDraft::new("さくら苑", "札幌市中央区");
        draft.care_levels = vec![CareLevel::Care1];
        draft.notes = "既存".into();

        FacilityFields {
            phone: Some("011-111-1111".into()),
            availability: Some(Availability::Scarce),
            ..FacilityFields::default()
        }
        .apply(&mut draft);

        assert_eq!(draft.name, "さくら苑");
        assert_eq!(draft.notes, "既存");
        assert_eq!(draft.care_levels, vec![CareLevel::Care1]);
        assert_eq!(draft.phone, "011-111-1111");
        assert_eq!(draft.availability, Availability::Scarce);
        assert!(draft.build(Utc::now()).is_ok());
    }

    #[test]
    fn search_args_build_filter() {
        let args = SearchArgs {
            area: Some(Area::Kita),
            sort: "distance".into(),
            ..SearchArgs::default()
        };
        let filter = args.filter();
        assert_eq!(filter.area, Some(Area::Kita));
        assert_eq!(filter.visibility, Visibility::VisibleOnly);
        assert_eq!(args.sort_key(), None);
    }
}
