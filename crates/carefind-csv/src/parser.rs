//! Parsing facility CSV text into records.
//!
//! Parsing is tolerant: rows that cannot become a facility are skipped and
//! reported in [`ParseReport::skipped`] instead of failing the whole file.
//! Only a file without any data line is an error.

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, warn};

use carefind_contracts::{
    error::{CarefindError, CarefindResult},
    facility::{Facility, FacilityDraft},
    taxonomy::{Area, Availability, CareLevel, ConfirmationMethod, ReliabilityLevel},
};

use crate::{columns::Column, tokenizer::tokenize_line};

/// Rows with fewer fields than this are skipped.
pub const MIN_FIELDS: usize = 3;

/// Why a data row was not turned into a facility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    TooFewFields { found: usize },
    MissingName,
}

/// A skipped row and its 1-based line number in the normalized text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    pub line: usize,
    pub reason: SkipReason,
}

/// Outcome of parsing one CSV document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseReport {
    /// Accepted rows, in file order, each with a fresh id.
    pub records: Vec<Facility>,
    pub skipped: Vec<SkippedRow>,
}

impl ParseReport {
    /// True when no row was accepted. Callers surface this as "nothing to
    /// import" rather than as an error.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Replace CRLF and lone CR with LF.
pub fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Reverse of the exporter's escaping: `\n` becomes a newline and `\\` a
/// single backslash. Other backslash sequences are kept as written.
pub(crate) fn unescape_text(value: &str) -> String {
    if !value.contains('\\') {
        return value.to_string();
    }
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.peek() {
            Some('n') => {
                out.push('\n');
                chars.next();
            }
            Some('\\') => {
                out.push('\\');
                chars.next();
            }
            _ => out.push('\\'),
        }
    }
    out
}

/// Parse CSV text. `now` stamps `created_at` on every accepted record.
///
/// Errors with `MalformedInput` when the text has fewer than two non-blank
/// lines (a header and at least one data row).
pub fn parse_csv(text: &str, now: DateTime<Utc>) -> CarefindResult<ParseReport> {
    let text = text.strip_prefix('\u{FEFF}').unwrap_or(text);
    let normalized = normalize_newlines(text);
    let lines: Vec<(usize, &str)> = normalized
        .split('\n')
        .enumerate()
        .map(|(i, line)| (i + 1, line))
        .filter(|(_, line)| !line.trim().is_empty())
        .collect();

    if lines.len() < 2 {
        return Err(CarefindError::MalformedInput {
            reason: format!(
                "CSV needs a header and at least one data row, found {} non-blank line(s)",
                lines.len()
            ),
        });
    }

    let header: Vec<Option<Column>> = tokenize_line(lines[0].1)
        .iter()
        .map(|cell| Column::from_header(cell))
        .collect();
    debug!(columns = header.iter().flatten().count(), "CSV header mapped");

    let mut report = ParseReport::default();
    for &(line_no, line) in &lines[1..] {
        let values = tokenize_line(line);
        if values.len() < MIN_FIELDS {
            warn!(line = line_no, found = values.len(), "CSV row skipped: too few fields");
            report.skipped.push(SkippedRow {
                line: line_no,
                reason: SkipReason::TooFewFields { found: values.len() },
            });
            continue;
        }

        let draft = row_to_draft(&header, &values, line_no);
        match draft.build_imported(now) {
            Ok(facility) => report.records.push(facility),
            Err(_) => {
                warn!(line = line_no, "CSV row skipped: no facility name");
                report.skipped.push(SkippedRow {
                    line: line_no,
                    reason: SkipReason::MissingName,
                });
            }
        }
    }

    debug!(
        accepted = report.records.len(),
        skipped = report.skipped.len(),
        "CSV parsed"
    );
    Ok(report)
}

fn row_to_draft(header: &[Option<Column>], values: &[String], line_no: usize) -> FacilityDraft {
    let mut draft = FacilityDraft::default();

    for (index, column) in header.iter().enumerate() {
        let Some(column) = column else { continue };
        let value = values.get(index).map_or("", |v| v.trim());
        match column {
            Column::Name => draft.name = unescape_text(value),
            Column::Area => draft.area = Area::parse(value),
            Column::Address => draft.address = unescape_text(value),
            Column::Phone => draft.phone = unescape_text(value),
            Column::WebsiteUrl => draft.website_url = unescape_text(value),
            Column::Availability => {
                draft.availability = Availability::parse(value).unwrap_or_else(|| {
                    if !value.is_empty() {
                        warn!(line = line_no, value, "unknown availability, using needs-confirmation");
                    }
                    Availability::NeedsConfirmation
                });
            }
            Column::Reliability => draft.reliability = parse_reliability(value, line_no),
            Column::MonthlyFee => draft.monthly_fee = unescape_text(value),
            Column::CareLevels => draft.care_levels = parse_care_levels(value, line_no),
            Column::MedicalCare => draft.medical_care = unescape_text(value),
            Column::Features => draft.features = unescape_text(value),
            Column::Notes => draft.notes = unescape_text(value),
            Column::Reviews => draft.reviews = unescape_text(value),
            Column::LastConfirmed => draft.last_confirmed = parse_date(value, line_no),
            Column::ConfirmationMethod => {
                draft.confirmation_method = ConfirmationMethod::parse(value);
                if draft.confirmation_method.is_none() && !value.is_empty() {
                    warn!(line = line_no, value, "unknown confirmation method ignored");
                }
            }
            Column::RatingSummary => {}
        }
    }
    draft
}

fn parse_reliability(value: &str, line_no: usize) -> Option<ReliabilityLevel> {
    if value.is_empty() || value == ReliabilityLevel::UNSET_LABEL {
        return None;
    }
    let level = ReliabilityLevel::parse(value);
    if level.is_none() {
        warn!(line = line_no, value, "unknown reliability level ignored");
    }
    level
}

/// Care levels are comma separated (`、` is accepted too).
fn parse_care_levels(value: &str, line_no: usize) -> Vec<CareLevel> {
    let mut levels = Vec::new();
    for part in value.split([',', '、']).map(str::trim).filter(|p| !p.is_empty()) {
        match CareLevel::parse(part) {
            Some(level) if !levels.contains(&level) => levels.push(level),
            Some(_) => {}
            None => warn!(line = line_no, value = part, "unknown care level ignored"),
        }
    }
    levels
}

fn parse_date(value: &str, line_no: usize) -> Option<NaiveDate> {
    if value.is_empty() {
        return None;
    }
    let date = ["%Y-%m-%d", "%Y/%m/%d"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok());
    if date.is_none() {
        warn!(line = line_no, value, "unparseable confirmation date ignored");
    }
    date
}
