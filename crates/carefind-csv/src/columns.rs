//! The fixed column layout of facility CSV files.

/// One column of the facility CSV format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Name,
    Area,
    Address,
    Phone,
    WebsiteUrl,
    Availability,
    Reliability,
    MonthlyFee,
    CareLevels,
    MedicalCare,
    Features,
    Notes,
    Reviews,
    LastConfirmed,
    ConfirmationMethod,
    /// `★{rating} ({count}件)`. Written on export, ignored on import.
    RatingSummary,
}

impl Column {
    /// Export order. Import maps headers by name, so files may reorder or
    /// omit columns.
    pub const EXPORT_ORDER: [Column; 16] = [
        Column::Name,
        Column::Area,
        Column::Address,
        Column::Phone,
        Column::WebsiteUrl,
        Column::Availability,
        Column::Reliability,
        Column::MonthlyFee,
        Column::CareLevels,
        Column::MedicalCare,
        Column::Features,
        Column::Notes,
        Column::Reviews,
        Column::LastConfirmed,
        Column::ConfirmationMethod,
        Column::RatingSummary,
    ];

    /// The Japanese header written on export.
    pub fn header(self) -> &'static str {
        match self {
            Column::Name => "施設名",
            Column::Area => "エリア",
            Column::Address => "住所",
            Column::Phone => "電話番号",
            Column::WebsiteUrl => "ホームページURL",
            Column::Availability => "空き状況",
            Column::Reliability => "信頼性レベル",
            Column::MonthlyFee => "月額料金",
            Column::CareLevels => "受入可能要介護度",
            Column::MedicalCare => "医療ケア",
            Column::Features => "施設特徴",
            Column::Notes => "特記事項",
            Column::Reviews => "口コミ情報",
            Column::LastConfirmed => "最終確認日",
            Column::ConfirmationMethod => "確認方法",
            Column::RatingSummary => "口コミ評価",
        }
    }

    fn english_aliases(self) -> &'static [&'static str] {
        match self {
            Column::Name => &["name", "facility name"],
            Column::Area => &["area", "ward"],
            Column::Address => &["address"],
            Column::Phone => &["phone", "tel", "telephone"],
            Column::WebsiteUrl => &["website", "website url", "url", "homepage"],
            Column::Availability => &["availability", "vacancy"],
            Column::Reliability => &["reliability", "reliability level"],
            Column::MonthlyFee => &["monthly fee", "fee"],
            Column::CareLevels => &["care levels", "care level"],
            Column::MedicalCare => &["medical care"],
            Column::Features => &["features"],
            Column::Notes => &["notes", "remarks"],
            Column::Reviews => &["reviews"],
            Column::LastConfirmed => &["last confirmed", "confirmed date"],
            Column::ConfirmationMethod => &["confirmation method", "method"],
            Column::RatingSummary => &["rating"],
        }
    }

    /// Identify a header cell: the Japanese header or one of its English
    /// aliases (case-insensitive, `_`/`-` treated as spaces).
    pub fn from_header(cell: &str) -> Option<Column> {
        let cell = cell.trim();
        let normalized = cell.to_lowercase().replace(['_', '-'], " ");
        Self::EXPORT_ORDER.into_iter().find(|c| {
            c.header() == cell || c.english_aliases().iter().any(|a| *a == normalized)
        })
    }
}
