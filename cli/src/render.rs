//! Plain-text rendering of facilities and reports.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};

use carefind_contracts::{facility::Facility, profile::PatientProfile, taxonomy::ReliabilityLevel};
use carefind_live::{BulkReport, UrlBatch, UrlOutcome};
use carefind_scoring::{AvailabilityClassifier, ConfirmationAge, ScoredFacility};

fn reliability_label(level: Option<ReliabilityLevel>) -> &'static str {
    level.map_or(ReliabilityLevel::UNSET_LABEL, ReliabilityLevel::label)
}

fn confirmation(facility: &Facility, now: DateTime<Utc>) -> String {
    match facility.last_confirmed {
        None => "未確認".to_string(),
        Some(date) => {
            let marker = match ConfirmationAge::of(date, now) {
                ConfirmationAge::Recent => " ✓",
                ConfirmationAge::Normal => "",
                ConfirmationAge::Overdue => " 要再確認",
            };
            format!("{}{marker}", date.format("%Y/%m/%d"))
        }
    }
}

/// One line per facility: score, name, area, availability, reliability,
/// confirmation, rating, and a warning when the web disagrees.
pub fn facility_line(item: &ScoredFacility<'_>, classifier: &AvailabilityClassifier, now: DateTime<Utc>) -> String {
    let f = item.facility;
    let mut line = String::new();
    match item.score {
        Some(score) => {
            let _ = write!(line, "[{score:>3.0}] ");
        }
        None => line.push_str("[  -] "),
    }
    let _ = write!(
        line,
        "{}  {}  {}  {}  {}",
        f.name,
        f.area.as_ref().map_or("-", |a| a.label()),
        f.availability.label(),
        reliability_label(f.reliability),
        confirmation(f, now),
    );
    if let Some(rating) = f.average_rating() {
        let _ = write!(line, "  ★{rating:.1}");
    }
    if let Some(d) = classifier.discrepancy(f) {
        let _ = write!(line, "  ⚠ 記録:{} / WEB:{}", d.recorded.label(), d.web.label());
    }
    if f.is_hidden {
        line.push_str("  (非表示)");
    }
    line
}

pub fn facility_detail(f: &Facility, now: DateTime<Utc>) -> String {
    let join = |items: &[String]| if items.is_empty() { "-".to_string() } else { items.join(", ") };
    let care: Vec<String> = f.care_levels.iter().map(|c| c.label().to_string()).collect();
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", f.name, f.id);
    let _ = writeln!(out, "  住所: {} {}", f.address, f.detail_address);
    let _ = writeln!(out, "  エリア: {}", f.area.as_ref().map_or("-", |a| a.label()));
    let _ = writeln!(out, "  種別: {}", f.facility_type);
    let _ = writeln!(out, "  電話: {}", f.phone);
    let _ = writeln!(out, "  サイト: {}", f.website_url);
    let _ = writeln!(out, "  受入介護度: {}", join(&care));
    let _ = writeln!(out, "  サービス: {}", join(&f.services));
    let _ = writeln!(out, "  オプション: {}", join(&f.additional_options));
    let _ = writeln!(out, "  空き状況: {}", f.availability.label());
    let _ = writeln!(out, "  信頼度: {}", reliability_label(f.reliability));
    let _ = writeln!(
        out,
        "  最終確認: {} ({})",
        confirmation(f, now),
        f.confirmation_method.map_or("-", |m| m.label())
    );
    let _ = writeln!(out, "  月額費用: {}", f.monthly_fee);
    let _ = writeln!(out, "  医療対応: {}", f.medical_care);
    let _ = writeln!(out, "  特徴: {}", f.features);
    let _ = writeln!(out, "  メモ: {}", f.notes);
    let _ = writeln!(out, "  口コミ: {}", f.reviews);
    if let Some(info) = &f.realtime_info {
        let _ = writeln!(
            out,
            "  WEB情報: {} / {} / ★{} ({}件) {}",
            info.availability_status,
            info.review_summary,
            info.average_rating.map_or("-".to_string(), |r| format!("{r:.1}")),
            info.review_count,
            info.last_scraped_at.format("%Y/%m/%d %H:%M"),
        );
    }
    out
}

pub fn profile(p: &PatientProfile) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "氏名: {}", p.name);
    let _ = writeln!(out, "年齢: {}", p.age.map_or("-".to_string(), |a| a.to_string()));
    let _ = writeln!(out, "介護度: {}", p.care_level.map_or("-", |c| c.label()));
    let _ = writeln!(out, "予算: {}", p.budget);
    let _ = writeln!(out, "医療ニーズ: {}", p.medical_needs);
    let _ = writeln!(out, "希望: {}", p.preferences);
    if let Some(saved) = p.saved_at {
        let _ = writeln!(out, "保存日時: {}", saved.format("%Y/%m/%d %H:%M"));
    }
    out
}

pub fn bulk_report(what: &str, report: &BulkReport) -> String {
    let mut out = format!(
        "{what}: {} 件中 {} 件更新, {} 件失敗",
        report.attempted, report.updated, report.failed
    );
    if report.cancelled {
        out.push_str(" (中断)");
    }
    out
}

pub fn url_batch(batch: &UrlBatch) -> String {
    let mut out = String::new();
    for entry in &batch.log {
        let outcome = match &entry.outcome {
            UrlOutcome::Extracted(n) => format!("{n} 件取得"),
            UrlOutcome::Empty => "施設なし".to_string(),
            UrlOutcome::Failed(reason) => format!("失敗: {reason}"),
        };
        let _ = writeln!(out, "{} [{}] {}", entry.url, entry.source, outcome);
    }
    for record in &batch.records {
        let _ = writeln!(out, "  + {} ({})", record.name, record.address);
    }
    if batch.cancelled {
        out.push_str("(中断)\n");
    }
    out
}
