//! # carefind-live
//!
//! Live-info collaborators and the bulk runners that drive them.
//!
//! - [`SimulatedLiveInfo`] and [`SimulatedExtractor`] stand in for a scraping
//!   backend: they sleep for a configured latency and answer from canned
//!   tables in [`mock_data`]. No network traffic is made.
//! - [`BulkRunner`] processes facilities or URLs one at a time with a pause
//!   between requests, and stops early when its `CancellationToken` fires.
//! - [`AutoRefresh`] repeats `refresh_all` on a fixed interval.
//!
//! Any `LiveInfoSource`/`UrlExtractor` implementation can be passed to the
//! runners in place of the simulated ones.

pub mod auto;
pub mod bulk;
pub mod config;
pub mod mock_data;
pub mod simulated;

pub use auto::AutoRefresh;
pub use bulk::{
    parse_url_list, save_extracted, BulkReport, BulkRunner, SaveSummary, UrlBatch, UrlLogEntry, UrlOutcome,
};
pub use config::LiveConfig;
pub use simulated::{SimulatedExtractor, SimulatedLiveInfo};

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use carefind_core::FacilityStore;
    use carefind_scoring::ScoringConfig;
    use carefind_storage::InMemoryRepository;

    use super::*;

    /// Paste a URL list, extract from every page, save what was found.
    #[tokio::test]
    async fn test_url_list_to_store() {
        let text = "https://www.homes.co.jp/kaigo/a\nメモ\nhttps://www.minnannokaigo.com/b\n";
        let urls = parse_url_list(text);
        let runner = BulkRunner::new(LiveConfig::instant());
        let extractor = SimulatedExtractor::seeded(LiveConfig::instant(), 5);

        let batch = runner.process_urls(&extractor, &urls).await;
        assert_eq!(batch.log.len(), 2);
        assert!(!batch.records.is_empty());

        let mut store = FacilityStore::open(Box::new(InMemoryRepository::new()), &ScoringConfig::default()).unwrap();
        let summary = save_extracted(&mut store, &batch.records, Utc::now()).unwrap();
        assert_eq!(summary.saved + summary.duplicates + summary.invalid, batch.records.len());
        assert_eq!(store.len(), summary.saved);
        assert_eq!(summary.invalid, 0);
    }

    /// A simulated source that always fails leaves every facility untouched.
    #[tokio::test]
    async fn test_refresh_with_failing_source() {
        let mut draft = carefind_contracts::facility::FacilityDraft::new("さくら苑", "札幌市中央区");
        draft.website_url = "https://sakura.example.jp".into();
        let repo = InMemoryRepository::with_facilities(vec![draft.build(Utc::now()).unwrap()]);
        let mut store = FacilityStore::open(Box::new(repo), &ScoringConfig::default()).unwrap();
        let before = store.facilities().to_vec();

        let source = SimulatedLiveInfo::seeded(LiveConfig { failure_rate: 1.0, ..LiveConfig::instant() }, 9);
        let report = BulkRunner::new(LiveConfig::instant())
            .refresh_all(&mut store, &source)
            .await
            .unwrap();

        assert_eq!(report.failed, 1);
        assert_eq!(store.facilities(), before.as_slice());
    }
}
