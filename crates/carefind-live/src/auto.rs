//! Periodic live-info refresh.

use std::time::Duration;

use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::info;

use carefind_contracts::error::CarefindResult;
use carefind_core::{traits::LiveInfoSource, FacilityStore};

use crate::{bulk::BulkRunner, config::LiveConfig};

/// Runs `refresh_all` every interval until cancelled.
///
/// The first cycle starts one full interval after `run` is called.
pub struct AutoRefresh {
    runner: BulkRunner,
    period: Duration,
}

impl AutoRefresh {
    pub fn new(config: LiveConfig, cancel: CancellationToken) -> Self {
        let period = config.auto_refresh_interval();
        Self {
            runner: BulkRunner::with_cancellation(config, cancel),
            period,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Refresh until the token is cancelled. Returns the number of cycles
    /// that ran, including one cut short by cancellation.
    pub async fn run(&self, store: &mut FacilityStore, source: &dyn LiveInfoSource) -> CarefindResult<usize> {
        let cancel = self.runner.cancel_token();
        let mut ticker = interval_at(Instant::now() + self.period, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(period_secs = self.period.as_secs(), "auto refresh started");

        let mut cycles = 0;
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }
            cycles += 1;
            let report = self.runner.refresh_all(store, source).await?;
            info!(cycle = cycles, updated = report.updated, failed = report.failed, "auto refresh cycle");
            if report.cancelled {
                break;
            }
        }
        info!(cycles, "auto refresh stopped");
        Ok(cycles)
    }
}
