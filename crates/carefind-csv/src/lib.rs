//! # carefind-csv
//!
//! Facility lists in and out of CSV.
//!
//! - [`export_csv`] writes the fixed 16-column Japanese layout.
//! - [`parse_csv`] reads it back (or any file with recognizable Japanese or
//!   English headers), skipping unusable rows with a diagnostic.
//! - [`import_csv_bytes`] adds encoding detection in front of the parser.
//!
//! Exported text parses back to the same facilities, apart from fresh ids,
//! `created_at` and live info, which the file does not carry.

pub mod columns;
pub mod decode;
pub mod export;
pub mod parser;
pub mod tokenizer;

use chrono::{DateTime, Utc};

use carefind_contracts::error::CarefindResult;

pub use columns::Column;
pub use decode::{decode_csv_bytes, TextEncoding};
pub use export::{export_csv, export_file_name};
pub use parser::{normalize_newlines, parse_csv, ParseReport, SkipReason, SkippedRow};
pub use tokenizer::tokenize_line;

/// Decode raw file bytes and parse them. Returns the report together with
/// the encoding that worked.
pub fn import_csv_bytes(
    bytes: &[u8],
    now: DateTime<Utc>,
) -> CarefindResult<(ParseReport, TextEncoding)> {
    let (text, encoding) = decode_csv_bytes(bytes)?;
    let report = parse_csv(&text, now)?;
    tracing::info!(
        %encoding,
        accepted = report.records.len(),
        skipped = report.skipped.len(),
        "CSV imported"
    );
    Ok((report, encoding))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone};
    use pretty_assertions::assert_eq;

    use carefind_contracts::{
        facility::{Facility, FacilityDraft},
        taxonomy::{Area, Availability, CareLevel, ConfirmationMethod, ReliabilityLevel},
    };

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 17, 9, 0, 0).unwrap()
    }

    /// Everything the file carries, with identity and live info stripped.
    fn comparable(f: &Facility) -> FacilityDraft {
        FacilityDraft::from_facility(f)
    }

    fn facilities() -> Vec<Facility> {
        let mut full = FacilityDraft::new("ひまわりの家", "札幌市北区北10条西4丁目");
        full.area = Some(Area::Kita);
        full.phone = r"011-000-0000\内線2".into();
        full.website_url = "https://example.jp/a\\b".into();
        full.availability = Availability::Available;
        full.reliability = Some(ReliabilityLevel::Medium);
        full.monthly_fee = "15万円〜".into();
        full.care_levels = vec![CareLevel::Support2, CareLevel::Care1, CareLevel::Care5];
        full.medical_care = "胃ろう, たん吸引".into();
        full.features = "個室あり\n庭園".into();
        full.notes = "駐車場 \"3台\"".into();
        full.reviews = r"C:\memo".into();
        full.last_confirmed = NaiveDate::from_ymd_opt(2026, 9, 30);
        full.confirmation_method = Some(ConfirmationMethod::Web);

        let minimal = FacilityDraft::new("最小限", "札幌市手稲区");
        let mut other_area = FacilityDraft::new("江別の里", "江別市1-1");
        other_area.area = Some(Area::Other("江別市".into()));
        other_area.availability = Availability::Full;

        [full, minimal, other_area]
            .into_iter()
            .map(|d| d.build(now()).unwrap())
            .collect()
    }

    // ── 1. export then parse keeps every carried field ────────────────────────

    #[test]
    fn test_export_parse_round_trip() {
        let original = facilities();
        let report = parse_csv(&export_csv(&original), now()).unwrap();

        assert!(report.skipped.is_empty());
        let expected: Vec<_> = original.iter().map(comparable).collect();
        let actual: Vec<_> = report.records.iter().map(comparable).collect();
        assert_eq!(actual, expected);
        assert!(report
            .records
            .iter()
            .zip(&original)
            .all(|(a, b)| a.id != b.id));
    }

    // ── 2. round trip survives CRLF conversion and a BOM ──────────────────────

    #[test]
    fn test_round_trip_with_crlf_and_bom() {
        let original = facilities();
        let text = format!("\u{FEFF}{}", export_csv(&original).replace('\n', "\r\n"));
        let report = parse_csv(&text, now()).unwrap();
        assert_eq!(report.records.len(), 3);
        assert_eq!(report.records[0].features, "個室あり\n庭園");
    }

    // ── 3. byte import picks the right encoding ───────────────────────────────

    #[test]
    fn test_import_shift_jis_bytes() {
        let text = "施設名,エリア,住所\nすずらん,豊平区,札幌市豊平区1\n";
        let (bytes, _, _) = encoding_rs::SHIFT_JIS.encode(text);

        let (report, encoding) = import_csv_bytes(&bytes, now()).unwrap();
        assert_eq!(encoding, TextEncoding::ShiftJis);
        assert_eq!(report.records[0].name, "すずらん");
        assert_eq!(report.records[0].area, Some(Area::Toyohira));
    }

    #[test]
    fn test_import_utf8_header_only_fails() {
        assert!(import_csv_bytes("施設名,住所\n".as_bytes(), now()).is_err());
    }

    // ── 4. the rating column is ignored on import ─────────────────────────────

    #[test]
    fn test_rating_column_ignored() {
        let text = "施設名,住所,口コミ評価\nA,x,★4.5 (10件)\n";
        let report = parse_csv(text, now()).unwrap();
        assert_eq!(report.records[0].realtime_info, None);
    }
}
