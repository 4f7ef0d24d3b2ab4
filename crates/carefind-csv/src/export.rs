//! Writing facilities as CSV.

use chrono::NaiveDate;

use carefind_contracts::{facility::Facility, taxonomy::ReliabilityLevel};

use crate::columns::Column;

/// Suggested file name for an export made on `today`.
pub fn export_file_name(today: NaiveDate) -> String {
    format!("介護施設一覧_{}.csv", today.format("%Y-%m-%d"))
}

/// Keep a value on one physical line: backslashes are doubled and line
/// breaks become the two characters `\n`.
pub(crate) fn escape_text(value: &str) -> String {
    if !value.contains(['\\', '\n', '\r']) {
        return value.to_string();
    }
    value
        .replace('\\', "\\\\")
        .replace("\r\n", "\\n")
        .replace(['\n', '\r'], "\\n")
}

fn quote(value: &str) -> String {
    format!("\"{}\"", escape_text(value).replace('"', "\"\""))
}

fn rating_summary(facility: &Facility) -> String {
    match &facility.realtime_info {
        Some(info) => match info.average_rating {
            Some(rating) => format!("★{rating} ({}件)", info.review_count),
            None => format!("({}件)", info.review_count),
        },
        None => String::new(),
    }
}

fn cell(facility: &Facility, column: Column) -> String {
    match column {
        Column::Name => facility.name.clone(),
        Column::Area => facility
            .area
            .as_ref()
            .map(|a| a.label().to_string())
            .unwrap_or_default(),
        Column::Address => facility.address.clone(),
        Column::Phone => facility.phone.clone(),
        Column::WebsiteUrl => facility.website_url.clone(),
        Column::Availability => facility.availability.label().to_string(),
        Column::Reliability => facility
            .reliability
            .map_or(ReliabilityLevel::UNSET_LABEL, ReliabilityLevel::long_label)
            .to_string(),
        Column::MonthlyFee => facility.monthly_fee.clone(),
        Column::CareLevels => facility
            .care_levels
            .iter()
            .map(|c| c.label())
            .collect::<Vec<_>>()
            .join(", "),
        Column::MedicalCare => facility.medical_care.clone(),
        Column::Features => facility.features.clone(),
        Column::Notes => facility.notes.clone(),
        Column::Reviews => facility.reviews.clone(),
        Column::LastConfirmed => facility
            .last_confirmed
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        Column::ConfirmationMethod => facility
            .confirmation_method
            .map(|m| m.slug().to_string())
            .unwrap_or_default(),
        Column::RatingSummary => rating_summary(facility),
    }
}

/// Render `facilities` as CSV: the 16-column header, then one fully quoted
/// row per facility, each line ending in `\n`.
pub fn export_csv<'a>(facilities: impl IntoIterator<Item = &'a Facility>) -> String {
    let header: Vec<&str> = Column::EXPORT_ORDER.iter().map(|c| c.header()).collect();
    let mut out = header.join(",");
    out.push('\n');

    for facility in facilities {
        let row: Vec<String> = Column::EXPORT_ORDER
            .iter()
            .map(|&column| quote(&cell(facility, column)))
            .collect();
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    use carefind_contracts::{
        facility::{FacilityDraft, RealtimeInfo},
        taxonomy::{Area, Availability, CareLevel, ConfirmationMethod},
    };

    use super::*;

    fn sample() -> Facility {
        let mut draft = FacilityDraft::new("さくら苑", "札幌市中央区南1条西1丁目");
        draft.area = Some(Area::Chuo);
        draft.availability = Availability::Scarce;
        draft.reliability = Some(ReliabilityLevel::High);
        draft.care_levels = vec![CareLevel::Care1, CareLevel::Care3];
        draft.last_confirmed = NaiveDate::from_ymd_opt(2026, 10, 1);
        draft.confirmation_method = Some(ConfirmationMethod::Phone);
        draft.notes = "送迎あり\n\"見学\"歓迎".into();
        let now = Utc.with_ymd_and_hms(2026, 10, 17, 9, 0, 0).unwrap();
        let mut f = draft.build(now).unwrap();
        f.realtime_info = Some(RealtimeInfo {
            availability_status: "空室あり".into(),
            review_summary: String::new(),
            average_rating: Some(4.2),
            review_count: 25,
            last_scraped_at: now,
        });
        f
    }

    #[test]
    fn header_has_sixteen_columns() {
        let csv = export_csv(&[]);
        assert_eq!(
            csv,
            "施設名,エリア,住所,電話番号,ホームページURL,空き状況,信頼性レベル,月額料金,\
             受入可能要介護度,医療ケア,施設特徴,特記事項,口コミ情報,最終確認日,確認方法,口コミ評価\n"
        );
    }

    #[test]
    fn row_cells() {
        let csv = export_csv(&[sample()]);
        let row = csv.lines().nth(1).unwrap();
        assert!(row.starts_with("\"さくら苑\",\"中央区\",\"札幌市中央区南1条西1丁目\",\"\",\"\",\"空き僅か\","));
        assert!(row.contains("\"🟢 高（電話確認済み）\""));
        assert!(row.contains("\"要介護1, 要介護3\""));
        assert!(row.contains(r#""送迎あり\n""見学""歓迎""#));
        assert!(row.ends_with("\"2026-10-01\",\"phone\",\"★4.2 (25件)\""));
        assert_eq!(csv.lines().count(), 2);
    }

    #[test]
    fn unset_reliability_label() {
        let mut f = sample();
        f.reliability = None;
        f.realtime_info = None;
        let csv = export_csv(&[f]);
        assert!(csv.contains("\"未設定\""));
        assert!(csv.trim_end().ends_with(",\"\""));
    }

    #[test]
    fn file_name() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        assert_eq!(export_file_name(today), "介護施設一覧_2026-10-17.csv");
    }

    #[test]
    fn escaping() {
        assert_eq!(escape_text("a\r\nb\rc\nd"), r"a\nb\nc\nd");
        assert_eq!(escape_text(r"C:\dir"), r"C:\\dir");
    }
}
