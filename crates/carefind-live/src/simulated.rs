//! Simulated web collaborators.
//!
//! Both collaborators sleep for the configured latency, then answer with
//! random picks from [`mock_data`](crate::mock_data). A configurable failure
//! rate turns some answers into `NetworkFailure`s. Seeded constructors make
//! the output reproducible.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use rand::{rngs::StdRng, Rng, SeedableRng};
use tokio::time::sleep;
use tracing::debug;

use carefind_contracts::{
    error::{CarefindError, CarefindResult},
    facility::{Facility, RealtimeInfo},
    taxonomy::{ConfirmationMethod, ReliabilityLevel},
};
use carefind_core::{
    traits::{LiveInfoSource, UrlExtractor},
    ExtractedFacility, SourceType, WebProbe,
};

use crate::{config::LiveConfig, mock_data};

fn pick<'a, T>(rng: &mut StdRng, items: &'a [T]) -> &'a T {
    &items[rng.gen_range(0..items.len())]
}

/// Shared RNG plumbing for the simulated collaborators.
struct Dice {
    rng: Mutex<StdRng>,
    failure_rate: f64,
}

impl Dice {
    fn new(rng: StdRng, failure_rate: f64) -> Self {
        let failure_rate = if failure_rate.is_finite() {
            failure_rate.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            rng: Mutex::new(rng),
            failure_rate,
        }
    }

    fn lock(&self) -> CarefindResult<MutexGuard<'_, StdRng>> {
        self.rng.lock().map_err(|e| CarefindError::NetworkFailure {
            reason: format!("simulator state poisoned: {e}"),
        })
    }

    /// Roll for a simulated failure.
    fn check(&self, rng: &mut StdRng, target: &str) -> CarefindResult<()> {
        if rng.gen_bool(self.failure_rate) {
            return Err(CarefindError::NetworkFailure {
                reason: format!("simulated request to {target} failed"),
            });
        }
        Ok(())
    }
}

// ── Live info ────────────────────────────────────────────────────────────────

/// Simulated `LiveInfoSource`.
pub struct SimulatedLiveInfo {
    config: LiveConfig,
    dice: Dice,
}

impl SimulatedLiveInfo {
    pub fn new(config: LiveConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    pub fn seeded(config: LiveConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: LiveConfig, rng: StdRng) -> Self {
        let dice = Dice::new(rng, config.failure_rate);
        Self { config, dice }
    }

    fn draw_info(&self, url: &str) -> CarefindResult<RealtimeInfo> {
        let mut rng = self.dice.lock()?;
        self.dice.check(&mut rng, url)?;
        Ok(RealtimeInfo {
            availability_status: pick(&mut rng, &mock_data::AVAILABILITY_TEXTS).to_string(),
            review_summary: pick(&mut rng, &mock_data::REVIEW_SUMMARIES).to_string(),
            average_rating: Some(*pick(&mut rng, &mock_data::RATINGS)),
            review_count: rng.gen_range(mock_data::REVIEW_COUNT_RANGE),
            last_scraped_at: Utc::now(),
        })
    }

    fn draw_probe(&self, url: &str) -> CarefindResult<WebProbe> {
        let mut rng = self.dice.lock()?;
        self.dice.check(&mut rng, url)?;
        Ok(WebProbe {
            availability: *pick(&mut rng, &mock_data::PROBE_AVAILABILITY),
            review_summary: pick(&mut rng, &mock_data::PROBE_SUMMARIES).to_string(),
        })
    }
}

#[async_trait]
impl LiveInfoSource for SimulatedLiveInfo {
    async fn fetch(&self, facility: &Facility) -> CarefindResult<RealtimeInfo> {
        if !facility.has_website() {
            return Err(CarefindError::validation(
                "website_url",
                format!("'{}' has no website to fetch live info from", facility.name),
            ));
        }
        debug!(facility_id = %facility.id, url = %facility.website_url, "fetching live info");
        sleep(self.config.fetch_delay()).await;
        self.draw_info(&facility.website_url)
    }

    async fn probe(&self, url: &str) -> CarefindResult<WebProbe> {
        let url = url.trim();
        if url.is_empty() {
            return Err(CarefindError::validation("website_url", "a website URL is required"));
        }
        debug!(url, "probing website");
        sleep(self.config.fetch_delay()).await;
        self.draw_probe(url)
    }
}

// ── URL extraction ───────────────────────────────────────────────────────────

/// Simulated `UrlExtractor`: every page yields one to five facilities.
pub struct SimulatedExtractor {
    config: LiveConfig,
    dice: Dice,
}

impl SimulatedExtractor {
    pub fn new(config: LiveConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    pub fn seeded(config: LiveConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: LiveConfig, rng: StdRng) -> Self {
        let dice = Dice::new(rng, config.failure_rate);
        Self { config, dice }
    }

    fn latency(&self) -> CarefindResult<std::time::Duration> {
        let mut rng = self.dice.lock()?;
        let ms = rng.gen_range(self.config.extract_min_delay_ms..=self.config.extract_max_delay_ms);
        Ok(std::time::Duration::from_millis(ms))
    }

    fn draw_records(&self, url: &str, source: SourceType) -> CarefindResult<Vec<ExtractedFacility>> {
        let mut rng = self.dice.lock()?;
        self.dice.check(&mut rng, url)?;

        let today = Utc::now().date_naive();
        let count = rng.gen_range(mock_data::EXTRACTED_PER_PAGE);
        let records = (0..count)
            .map(|i| {
                let base = pick(&mut rng, &mock_data::SAMPLE_NAMES);
                let name = if count > 1 {
                    format!("{base} {}", i + 1)
                } else {
                    base.to_string()
                };
                let area = pick(&mut rng, &mock_data::SAMPLE_AREAS).clone();
                let address = format!(
                    "札幌市{}○○{}丁目{}-{}",
                    area.label(),
                    rng.gen_range(1..=30),
                    rng.gen_range(1..=20),
                    rng.gen_range(1..=30)
                );
                ExtractedFacility {
                    name,
                    address,
                    area: Some(area),
                    phone: format!(
                        "011-{}-{}",
                        rng.gen_range(100..=999),
                        rng.gen_range(1000..=9999)
                    ),
                    website_url: url.to_string(),
                    care_levels: mock_data::EXTRACTED_CARE_LEVELS.to_vec(),
                    monthly_fee: pick(&mut rng, &mock_data::SAMPLE_FEES).to_string(),
                    medical_care: mock_data::EXTRACTED_MEDICAL_CARE.to_string(),
                    features: mock_data::EXTRACTED_FEATURES.to_string(),
                    availability: *pick(&mut rng, &mock_data::PROBE_AVAILABILITY),
                    reliability: Some(ReliabilityLevel::Medium),
                    last_confirmed: Some(today),
                    confirmation_method: Some(ConfirmationMethod::Web),
                    notes: format!("{}から自動取得", source.label()),
                    reviews: format!(
                        "[自動取得 {}] WEBサイトから取得した情報です。",
                        today.format("%Y/%m/%d")
                    ),
                    source_url: url.to_string(),
                    source_type: source,
                }
            })
            .collect();
        Ok(records)
    }
}

#[async_trait]
impl UrlExtractor for SimulatedExtractor {
    async fn extract(&self, url: &str, source: SourceType) -> CarefindResult<Vec<ExtractedFacility>> {
        let latency = self.latency()?;
        debug!(url, source = %source, latency_ms = latency.as_millis() as u64, "extracting facilities");
        sleep(latency).await;
        self.draw_records(url, source)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::TimeZone;

    use carefind_contracts::facility::FacilityDraft;

    use super::*;

    fn facility(url: &str) -> Facility {
        let mut draft = FacilityDraft::new("さくら苑", "札幌市中央区");
        draft.website_url = url.into();
        draft
            .build(Utc.with_ymd_and_hms(2026, 10, 17, 0, 0, 0).unwrap())
            .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_waits_and_draws_from_tables() {
        let source = SimulatedLiveInfo::seeded(LiveConfig::default(), 7);
        let start = tokio::time::Instant::now();

        let info = source.fetch(&facility("https://example.jp")).await.unwrap();

        assert!(start.elapsed() >= Duration::from_secs(2));
        assert!(mock_data::AVAILABILITY_TEXTS.contains(&info.availability_status.as_str()));
        assert!(mock_data::RATINGS.contains(&info.average_rating.unwrap()));
        assert!(mock_data::REVIEW_COUNT_RANGE.contains(&info.review_count));
    }

    #[tokio::test]
    async fn fetch_without_website_is_rejected() {
        let source = SimulatedLiveInfo::new(LiveConfig::instant());
        let err = source.fetch(&facility("")).await.unwrap_err();
        assert!(matches!(err, CarefindError::ValidationFailure { .. }));
    }

    #[tokio::test]
    async fn failure_rate_one_always_fails() {
        let config = LiveConfig { failure_rate: 1.0, ..LiveConfig::instant() };
        let source = SimulatedLiveInfo::seeded(config.clone(), 1);
        let err = source.fetch(&facility("https://example.jp")).await.unwrap_err();
        assert!(matches!(err, CarefindError::NetworkFailure { .. }));

        let extractor = SimulatedExtractor::seeded(config, 1);
        assert!(extractor.extract("https://example.jp", SourceType::Individual).await.is_err());
    }

    #[tokio::test]
    async fn probe_returns_web_summary() {
        let source = SimulatedLiveInfo::seeded(LiveConfig::instant(), 3);
        let probe = source.probe("https://example.jp").await.unwrap();
        assert!(probe.review_summary.starts_with("[WEB取得]"));
        assert!(source.probe("   ").await.is_err());
    }

    #[tokio::test]
    async fn same_seed_same_answers() {
        let a = SimulatedLiveInfo::seeded(LiveConfig::instant(), 42);
        let b = SimulatedLiveInfo::seeded(LiveConfig::instant(), 42);
        let f = facility("https://example.jp");
        let (x, y) = (a.fetch(&f).await.unwrap(), b.fetch(&f).await.unwrap());
        assert_eq!(x.availability_status, y.availability_status);
        assert_eq!(x.review_count, y.review_count);
    }

    #[tokio::test]
    async fn extracted_records_are_web_sourced() {
        let extractor = SimulatedExtractor::seeded(LiveConfig::instant(), 11);
        let url = "https://www.homes.co.jp/kaigo/1";
        let records = extractor.extract(url, SourceType::Homes).await.unwrap();

        assert!(mock_data::EXTRACTED_PER_PAGE.contains(&records.len()));
        for r in &records {
            assert_eq!(r.website_url, url);
            assert_eq!(r.reliability, Some(ReliabilityLevel::Medium));
            assert_eq!(r.notes, "ライフルホームズから自動取得");
            assert!(r.address.starts_with("札幌市"));
            assert!(r.to_draft().build(Utc::now()).is_ok());
        }
        if records.len() > 1 {
            assert!(records[0].name.ends_with(" 1"));
        }
    }
}
