//! Sequential bulk runners.
//!
//! Every runner issues one request at a time and waits the configured
//! interval between requests (not after the last one). A failed request is
//! logged, counted, and skipped; the facility it concerned keeps its prior
//! state. Cancelling the runner's token stops the batch at the next pause or
//! in-flight request, keeping whatever was already applied.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use carefind_contracts::{
    error::{CarefindError, CarefindResult},
    facility::FacilityId,
    taxonomy::ReliabilityLevel,
};
use carefind_core::{
    traits::{LiveInfoSource, UrlExtractor},
    ExtractedFacility, FacilityStore, SourceType,
};

use crate::config::LiveConfig;

/// Keep the `http://` and `https://` lines of a pasted URL list.
pub fn parse_url_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| line.starts_with("http://") || line.starts_with("https://"))
        .map(str::to_string)
        .collect()
}

/// Outcome of a facility batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkReport {
    pub attempted: usize,
    pub updated: usize,
    pub failed: usize,
    /// True when the batch stopped early on cancellation.
    pub cancelled: bool,
}

/// What one URL produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlOutcome {
    Extracted(usize),
    Empty,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlLogEntry {
    pub url: String,
    pub source: SourceType,
    pub outcome: UrlOutcome,
}

/// Records collected from a URL batch, with one log entry per processed URL.
#[derive(Debug, Clone, Default)]
pub struct UrlBatch {
    pub records: Vec<ExtractedFacility>,
    pub log: Vec<UrlLogEntry>,
    pub cancelled: bool,
}

/// Result of saving extracted records into the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveSummary {
    pub saved: usize,
    pub duplicates: usize,
    pub invalid: usize,
}

/// Drives bulk operations against a store.
#[derive(Debug, Clone)]
pub struct BulkRunner {
    config: LiveConfig,
    cancel: CancellationToken,
}

impl BulkRunner {
    pub fn new(config: LiveConfig) -> Self {
        Self::with_cancellation(config, CancellationToken::new())
    }

    pub fn with_cancellation(config: LiveConfig, cancel: CancellationToken) -> Self {
        Self { config, cancel }
    }

    /// A handle that cancels this runner's batches.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn config(&self) -> &LiveConfig {
        &self.config
    }

    async fn until_cancelled<T>(&self, fut: impl Future<Output = CarefindResult<T>>) -> CarefindResult<T> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(CarefindError::Cancelled),
            out = fut => out,
        }
    }

    async fn pause(&self, delay: Duration) -> CarefindResult<()> {
        self.until_cancelled(async {
            tokio::time::sleep(delay).await;
            Ok(())
        })
        .await
    }

    /// Fetch live info for one facility and attach it.
    pub async fn refresh_one(
        &self,
        store: &mut FacilityStore,
        source: &dyn LiveInfoSource,
        id: FacilityId,
    ) -> CarefindResult<()> {
        let facility = store.get(id)?.clone();
        let info = self.until_cancelled(source.fetch(&facility)).await?;
        store.apply_live_info(id, info, Utc::now())
    }

    /// Refresh live info for every facility with a website.
    pub async fn refresh_all(
        &self,
        store: &mut FacilityStore,
        source: &dyn LiveInfoSource,
    ) -> CarefindResult<BulkReport> {
        let targets: Vec<FacilityId> = store
            .facilities()
            .iter()
            .filter(|f| f.has_website())
            .map(|f| f.id)
            .collect();
        info!(targets = targets.len(), "refreshing live info");

        let mut report = BulkReport::default();
        for (i, id) in targets.into_iter().enumerate() {
            if i > 0 && self.pause(self.config.refresh_interval()).await.is_err() {
                report.cancelled = true;
                break;
            }
            report.attempted += 1;
            let outcome = self.refresh_one(store, source, id).await;
            if !tally(&mut report, id, outcome)? {
                break;
            }
        }
        log_report("live refresh", &report);
        Ok(report)
    }

    /// Re-read the web for medium-tier facilities and adopt what it says.
    pub async fn bulk_web_update(
        &self,
        store: &mut FacilityStore,
        source: &dyn LiveInfoSource,
    ) -> CarefindResult<BulkReport> {
        let targets: Vec<FacilityId> = store
            .facilities()
            .iter()
            .filter(|f| f.reliability == Some(ReliabilityLevel::Medium) && f.has_website())
            .map(|f| f.id)
            .collect();
        info!(targets = targets.len(), "bulk web update");

        let mut report = BulkReport::default();
        for (i, id) in targets.into_iter().enumerate() {
            if i > 0 && self.pause(self.config.bulk_update_interval()).await.is_err() {
                report.cancelled = true;
                break;
            }
            report.attempted += 1;
            let outcome = self.adopt_one(store, source, id).await;
            if !tally(&mut report, id, outcome)? {
                break;
            }
        }
        log_report("bulk web update", &report);
        Ok(report)
    }

    async fn adopt_one(
        &self,
        store: &mut FacilityStore,
        source: &dyn LiveInfoSource,
        id: FacilityId,
    ) -> CarefindResult<()> {
        let facility = store.get(id)?.clone();
        let info = self.until_cancelled(source.fetch(&facility)).await?;
        let availability = store.adopt_bulk_web_info(id, info, Utc::now())?;
        debug!(facility_id = %id, availability = %availability, "web info adopted");
        Ok(())
    }

    /// Run every URL through `extractor`, collecting what it finds.
    pub async fn process_urls(&self, extractor: &dyn UrlExtractor, urls: &[String]) -> UrlBatch {
        let mut batch = UrlBatch::default();
        for (i, url) in urls.iter().enumerate() {
            if i > 0 && self.pause(self.config.url_interval()).await.is_err() {
                batch.cancelled = true;
                break;
            }
            let source = SourceType::classify(url);
            let outcome = match self.until_cancelled(extractor.extract(url, source)).await {
                Ok(records) if records.is_empty() => UrlOutcome::Empty,
                Ok(records) => {
                    let n = records.len();
                    batch.records.extend(records);
                    UrlOutcome::Extracted(n)
                }
                Err(CarefindError::Cancelled) => {
                    batch.cancelled = true;
                    break;
                }
                Err(e) => {
                    warn!(url = %url, error = %e, "extraction failed");
                    UrlOutcome::Failed(e.to_string())
                }
            };
            debug!(url = %url, source = %source, outcome = ?outcome, "url processed");
            batch.log.push(UrlLogEntry {
                url: url.clone(),
                source,
                outcome,
            });
        }
        info!(
            urls = batch.log.len(),
            records = batch.records.len(),
            cancelled = batch.cancelled,
            "url batch finished"
        );
        batch
    }
}

/// Fold one outcome into `report`. `Ok(false)` means stop the batch.
fn tally(report: &mut BulkReport, id: FacilityId, outcome: CarefindResult<()>) -> CarefindResult<bool> {
    match outcome {
        Ok(()) => report.updated += 1,
        Err(CarefindError::Cancelled) => {
            report.cancelled = true;
            return Ok(false);
        }
        Err(e) if e.is_recoverable() || matches!(e, CarefindError::NotFound { .. }) => {
            warn!(facility_id = %id, error = %e, "facility skipped");
            report.failed += 1;
        }
        Err(e) => return Err(e),
    }
    Ok(true)
}

fn log_report(what: &str, report: &BulkReport) {
    info!(
        attempted = report.attempted,
        updated = report.updated,
        failed = report.failed,
        cancelled = report.cancelled,
        "{what} finished"
    );
}

/// Add extracted records to the store.
///
/// Names already in the store are counted as duplicates; records the
/// validating builder rejects are counted as invalid. Storage failures abort.
pub fn save_extracted(
    store: &mut FacilityStore,
    records: &[ExtractedFacility],
    now: DateTime<Utc>,
) -> CarefindResult<SaveSummary> {
    let mut summary = SaveSummary::default();
    for record in records {
        if let Err(e) = store.check_unique_name(&record.name) {
            debug!(error = %e, "extracted record dropped");
            summary.duplicates += 1;
            continue;
        }
        match store.add(record.to_draft(), now) {
            Ok(_) => summary.saved += 1,
            Err(e @ CarefindError::ValidationFailure { .. }) => {
                warn!(name = %record.name, error = %e, "extracted record rejected");
                summary.invalid += 1;
            }
            Err(e) => return Err(e),
        }
    }
    info!(
        saved = summary.saved,
        duplicates = summary.duplicates,
        invalid = summary.invalid,
        "extracted records saved"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    use carefind_contracts::facility::{Facility, FacilityDraft, RealtimeInfo};
    use carefind_core::WebProbe;
    use carefind_scoring::ScoringConfig;
    use carefind_storage::InMemoryRepository;

    use super::*;

    // ── Mocks ─────────────────────────────────────────────────────────────────

    /// Answers instantly; fails for facilities whose name is in `failing`.
    #[derive(Default)]
    struct ScriptedSource {
        failing: Vec<String>,
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl LiveInfoSource for ScriptedSource {
        async fn fetch(&self, facility: &Facility) -> CarefindResult<RealtimeInfo> {
            self.calls.lock().unwrap().push(facility.name.clone());
            if self.failing.contains(&facility.name) {
                return Err(CarefindError::NetworkFailure { reason: "timeout".into() });
            }
            Ok(RealtimeInfo {
                availability_status: "満室です".into(),
                review_summary: "丁寧".into(),
                average_rating: Some(4.0),
                review_count: 12,
                last_scraped_at: Utc::now(),
            })
        }

        async fn probe(&self, _url: &str) -> CarefindResult<WebProbe> {
            Err(CarefindError::NetworkFailure { reason: "unused".into() })
        }
    }

    /// Yields `per_url` records named after the URL; "bad" URLs fail.
    struct ScriptedExtractor {
        per_url: usize,
        seen: Arc<Mutex<Vec<SourceType>>>,
    }

    #[async_trait]
    impl UrlExtractor for ScriptedExtractor {
        async fn extract(&self, url: &str, source: SourceType) -> CarefindResult<Vec<ExtractedFacility>> {
            self.seen.lock().unwrap().push(source);
            if url.contains("bad") {
                return Err(CarefindError::NetworkFailure { reason: "404".into() });
            }
            Ok((0..self.per_url)
                .map(|i| extracted(&format!("{url}#{i}"), source))
                .collect())
        }
    }

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 17, 0, 0, 0).unwrap()
    }

    fn facility(name: &str, url: &str, reliability: Option<ReliabilityLevel>) -> Facility {
        let mut draft = FacilityDraft::new(name, "札幌市中央区");
        draft.website_url = url.into();
        draft.reliability = reliability;
        draft.build(t0()).unwrap()
    }

    fn store_with(facilities: Vec<Facility>) -> (FacilityStore, InMemoryRepository) {
        let repo = InMemoryRepository::with_facilities(facilities);
        let store = FacilityStore::open(Box::new(repo.clone()), &ScoringConfig::default()).unwrap();
        (store, repo)
    }

    fn extracted(name: &str, source: SourceType) -> ExtractedFacility {
        ExtractedFacility {
            name: name.into(),
            address: "札幌市北区".into(),
            area: None,
            phone: String::new(),
            website_url: String::new(),
            care_levels: Vec::new(),
            monthly_fee: String::new(),
            medical_care: String::new(),
            features: String::new(),
            availability: Default::default(),
            reliability: Some(ReliabilityLevel::Medium),
            last_confirmed: None,
            confirmation_method: None,
            notes: String::new(),
            reviews: String::new(),
            source_url: String::new(),
            source_type: source,
        }
    }

    fn instant_runner() -> BulkRunner {
        BulkRunner::new(LiveConfig::instant())
    }

    // ── URL list ──────────────────────────────────────────────────────────────

    #[test]
    fn url_list_keeps_http_lines() {
        let text = "  https://a.jp/1 \n\nftp://b.jp\nnot a url\nhttp://c.jp\r\n";
        assert_eq!(parse_url_list(text), vec!["https://a.jp/1", "http://c.jp"]);
    }

    // ── Refresh ───────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn refresh_all_skips_facilities_without_website() {
        let (mut store, _) = store_with(vec![
            facility("A", "https://a.jp", None),
            facility("B", "", None),
            facility("C", "https://c.jp", None),
        ]);
        let source = ScriptedSource::default();

        let report = instant_runner().refresh_all(&mut store, &source).await.unwrap();

        assert_eq!(report, BulkReport { attempted: 2, updated: 2, failed: 0, cancelled: false });
        assert_eq!(*source.calls.lock().unwrap(), vec!["A", "C"]);
        assert!(store.facilities()[1].realtime_info.is_none());
        assert!(store.facilities()[0].last_updated.is_some());
    }

    #[tokio::test]
    async fn failed_fetch_leaves_state_and_continues() {
        let (mut store, _) = store_with(vec![
            facility("A", "https://a.jp", None),
            facility("B", "https://b.jp", None),
        ]);
        let before = store.facilities()[0].clone();
        let source = ScriptedSource { failing: vec!["A".into()], ..Default::default() };

        let report = instant_runner().refresh_all(&mut store, &source).await.unwrap();

        assert_eq!(report.failed, 1);
        assert_eq!(report.updated, 1);
        assert_eq!(store.facilities()[0], before);
        assert!(store.facilities()[1].realtime_info.is_some());
    }

    /// Two facilities at a one-second interval take one second, not two.
    #[tokio::test(start_paused = true)]
    async fn interval_only_between_requests() {
        let (mut store, _) = store_with(vec![
            facility("A", "https://a.jp", None),
            facility("B", "https://b.jp", None),
        ]);
        let config = LiveConfig { refresh_interval_ms: 1000, ..LiveConfig::instant() };
        let start = tokio::time::Instant::now();

        BulkRunner::new(config)
            .refresh_all(&mut store, &ScriptedSource::default())
            .await
            .unwrap();

        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(1) && elapsed < Duration::from_secs(2), "{elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_stops_between_requests() {
        let (mut store, _) = store_with(vec![
            facility("A", "https://a.jp", None),
            facility("B", "https://b.jp", None),
            facility("C", "https://c.jp", None),
        ]);
        let config = LiveConfig { refresh_interval_ms: 10_000, ..LiveConfig::instant() };
        let runner = BulkRunner::new(config);
        let cancel = runner.cancel_token();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(5)).await;
            cancel.cancel();
        });

        let report = runner.refresh_all(&mut store, &ScriptedSource::default()).await.unwrap();

        assert_eq!(report, BulkReport { attempted: 1, updated: 1, failed: 0, cancelled: true });
        assert!(store.facilities()[1].realtime_info.is_none());
    }

    #[tokio::test]
    async fn pre_cancelled_runner_does_nothing() {
        let (mut store, repo) = store_with(vec![facility("A", "https://a.jp", None)]);
        let runner = instant_runner();
        runner.cancel_token().cancel();

        let report = runner.refresh_all(&mut store, &ScriptedSource::default()).await.unwrap();

        assert!(report.cancelled);
        assert_eq!(report.updated, 0);
        assert_eq!(repo.save_count().unwrap(), 0);
    }

    // ── Bulk web update ───────────────────────────────────────────────────────

    #[tokio::test]
    async fn bulk_update_targets_medium_tier_only() {
        let (mut store, _) = store_with(vec![
            facility("高", "https://a.jp", Some(ReliabilityLevel::High)),
            facility("中", "https://b.jp", Some(ReliabilityLevel::Medium)),
            facility("中なし", "", Some(ReliabilityLevel::Medium)),
        ]);
        let source = ScriptedSource::default();

        let report = instant_runner().bulk_web_update(&mut store, &source).await.unwrap();

        assert_eq!(report.updated, 1);
        assert_eq!(*source.calls.lock().unwrap(), vec!["中"]);
        let updated = &store.facilities()[1];
        assert_eq!(updated.availability, carefind_contracts::taxonomy::Availability::Full);
        assert_eq!(updated.reliability, Some(ReliabilityLevel::Medium));
        assert!(updated.reviews.contains("[一括更新 "));
    }

    // ── URL batches ───────────────────────────────────────────────────────────

    #[tokio::test]
    async fn process_urls_logs_every_url() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let extractor = ScriptedExtractor { per_url: 2, seen: seen.clone() };
        let urls = vec![
            "https://www.homes.co.jp/x".to_string(),
            "https://bad.example.jp".to_string(),
            "https://www.city.sapporo.jp/kaigo".to_string(),
        ];

        let batch = instant_runner().process_urls(&extractor, &urls).await;

        assert_eq!(batch.records.len(), 4);
        assert_eq!(batch.log.len(), 3);
        assert_eq!(batch.log[0].outcome, UrlOutcome::Extracted(2));
        assert!(matches!(batch.log[1].outcome, UrlOutcome::Failed(_)));
        assert_eq!(
            *seen.lock().unwrap(),
            vec![SourceType::Homes, SourceType::Individual, SourceType::Government]
        );
    }

    #[tokio::test]
    async fn empty_page_is_logged() {
        let extractor = ScriptedExtractor { per_url: 0, seen: Arc::default() };
        let batch = instant_runner()
            .process_urls(&extractor, &["https://a.jp".to_string()])
            .await;
        assert_eq!(batch.log[0].outcome, UrlOutcome::Empty);
        assert!(batch.records.is_empty());
    }

    #[test]
    fn save_extracted_counts_duplicates_and_invalid() {
        let (mut store, _) = store_with(vec![facility("既存ホーム", "", None)]);
        let mut blank_address = extracted("住所なし", SourceType::Individual);
        blank_address.address = "  ".into();
        let records = vec![
            extracted("新ホーム", SourceType::Homes),
            extracted("既存ホーム", SourceType::Homes),
            extracted("新ホーム", SourceType::Minnano),
            blank_address,
        ];

        let summary = save_extracted(&mut store, &records, t0()).unwrap();

        assert_eq!(summary, SaveSummary { saved: 1, duplicates: 2, invalid: 1 });
        assert_eq!(store.len(), 2);
    }
}
