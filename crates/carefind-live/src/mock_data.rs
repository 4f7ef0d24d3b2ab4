//! Canned web content for the simulated collaborators.
//!
//! All data in this module is hardcoded and fictional. No external systems are
//! contacted; these tables stand in for what a scraper would read off real
//! facility and portal pages.

use carefind_contracts::taxonomy::{Area, Availability, CareLevel};

// ── Live info ────────────────────────────────────────────────────────────────

/// Vacancy notices as facilities publish them.
pub const AVAILABILITY_TEXTS: [&str; 5] = [
    "現在空室あり（個室2室、多床室1室）",
    "満室のため、入居をお待ちいただいております",
    "短期利用のみ受付中",
    "要介護3以上の方のみ受付中",
    "見学・相談随時受付中",
];

pub const REVIEW_SUMMARIES: [&str; 5] = [
    "スタッフの対応が丁寧で、家族も安心しています。食事も美味しく、リハビリも充実しています。",
    "清潔で明るい施設です。イベントも多く、入居者の方々が楽しそうに過ごされています。",
    "医療体制がしっかりしており、緊急時の対応も迅速です。看護師の方々が親切です。",
    "アットホームな雰囲気で、スタッフと入居者の距離が近く温かい施設だと感じました。",
    "料金は少し高めですが、サービスの質を考えると納得できます。",
];

pub const RATINGS: [f64; 7] = [3.8, 4.1, 4.5, 3.9, 4.2, 3.7, 4.3];

/// Review counts are drawn from this half-open range.
pub const REVIEW_COUNT_RANGE: std::ops::Range<u32> = 10..60;

// ── Website probe ────────────────────────────────────────────────────────────

pub const PROBE_AVAILABILITY: [Availability; 4] = Availability::ALL;

pub const PROBE_SUMMARIES: [&str; 4] = [
    "[WEB取得] スタッフの対応が丁寧で、施設も清潔感があります。リハビリ体制も充実しており、入居者の方々が楽しそうに過ごされている印象を受けました。",
    "[WEB取得] アットホームな雰囲気で、看護師の方が親切に対応してくださいます。医療体制がしっかりしており、家族も安心して預けることができます。",
    "[WEB取得] 立地が良く、面会に通いやすい環境です。レクリエーション活動も豊富で、入居者の方々が活気に満ちて生活されています。",
    "[WEB取得] 料金は相場より少し高めですが、サービスの質を考えると納得できる範囲です。個室も充実しており、プライバシーが確保されています。",
];

// ── URL extraction ───────────────────────────────────────────────────────────

pub const SAMPLE_NAMES: [&str; 8] = [
    "札幌中央介護ホーム",
    "北区やまざくらホーム",
    "手稲みどりの風",
    "豊平グループホーム",
    "白石ケアセンター",
    "厚別リハビリホーム",
    "西区つばさの家",
    "東区あおぞらホーム",
];

pub const SAMPLE_AREAS: [Area; 10] = Area::WARDS;

pub const SAMPLE_FEES: [&str; 4] = [
    "12万円〜18万円",
    "10万円〜15万円",
    "15万円〜22万円",
    "8万円〜12万円",
];

/// Care levels every extracted record claims to accept.
pub const EXTRACTED_CARE_LEVELS: [CareLevel; 5] = [
    CareLevel::Care1,
    CareLevel::Care2,
    CareLevel::Care3,
    CareLevel::Care4,
    CareLevel::Care5,
];

pub const EXTRACTED_MEDICAL_CARE: &str = "胃ろう、たん吸引、インスリン注射対応";
pub const EXTRACTED_FEATURES: &str = "24時間看護師常駐、リハビリ充実";

/// Facilities found per page are drawn from this inclusive range.
pub const EXTRACTED_PER_PAGE: std::ops::RangeInclusive<usize> = 1..=5;
