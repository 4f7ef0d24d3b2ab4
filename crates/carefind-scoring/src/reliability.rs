//! Trust adjustment derived from reliability tier and confirmation recency.

use chrono::{DateTime, NaiveDate, Utc};

use carefind_contracts::taxonomy::ReliabilityLevel;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Fractional days from UTC midnight of `date` to `now`.
pub fn days_since_date(date: NaiveDate, now: DateTime<Utc>) -> f64 {
    let midnight = date.and_time(chrono::NaiveTime::MIN).and_utc();
    (now - midnight).num_seconds() as f64 / SECONDS_PER_DAY
}

/// Fractional days from `then` to `now`.
pub fn days_since(then: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    (now - then).num_seconds() as f64 / SECONDS_PER_DAY
}

/// How stale a confirmation is, as shown next to a facility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationAge {
    /// Confirmed within 7 whole days.
    Recent,
    Normal,
    /// More than 30 whole days ago.
    Overdue,
}

impl ConfirmationAge {
    pub fn of(date: NaiveDate, now: DateTime<Utc>) -> Self {
        let days = days_since_date(date, now).floor();
        if days > 30.0 {
            ConfirmationAge::Overdue
        } else if days <= 7.0 {
            ConfirmationAge::Recent
        } else {
            ConfirmationAge::Normal
        }
    }
}

/// Signed score adjustment for a facility's data trustworthiness.
///
/// Tier: high +10, medium +5, low/unset 0. Recency of `last_confirmed`:
/// ≤ 7 days +5, ≤ 30 days +2, older −3, no date 0.
pub fn reliability_adjustment(
    level: Option<ReliabilityLevel>,
    last_confirmed: Option<NaiveDate>,
    now: DateTime<Utc>,
) -> f64 {
    let tier = match level {
        Some(ReliabilityLevel::High) => 10.0,
        Some(ReliabilityLevel::Medium) => 5.0,
        Some(ReliabilityLevel::Low) | None => 0.0,
    };

    let recency = match last_confirmed {
        None => 0.0,
        Some(date) => {
            let days = days_since_date(date, now);
            if days <= 7.0 {
                5.0
            } else if days <= 30.0 {
                2.0
            } else {
                -3.0
            }
        }
    };

    tier + recency
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 17, 12, 0, 0).unwrap()
    }

    fn days_ago(n: i64) -> NaiveDate {
        (now() - Duration::days(n)).date_naive()
    }

    #[test]
    fn tier_only() {
        assert_eq!(reliability_adjustment(Some(ReliabilityLevel::High), None, now()), 10.0);
        assert_eq!(reliability_adjustment(Some(ReliabilityLevel::Medium), None, now()), 5.0);
        assert_eq!(reliability_adjustment(Some(ReliabilityLevel::Low), None, now()), 0.0);
        assert_eq!(reliability_adjustment(None, None, now()), 0.0);
    }

    #[test]
    fn recency_windows() {
        assert_eq!(reliability_adjustment(None, Some(days_ago(2)), now()), 5.0);
        assert_eq!(reliability_adjustment(None, Some(days_ago(20)), now()), 2.0);
        assert_eq!(reliability_adjustment(None, Some(days_ago(45)), now()), -3.0);
    }

    #[test]
    fn combined_can_be_negative() {
        assert_eq!(
            reliability_adjustment(Some(ReliabilityLevel::Low), Some(days_ago(90)), now()),
            -3.0
        );
        assert_eq!(
            reliability_adjustment(Some(ReliabilityLevel::High), Some(days_ago(1)), now()),
            15.0
        );
    }

    /// Seven calendar days ago at noon is 7.5 fractional days: past the window.
    #[test]
    fn recency_uses_fractional_days_from_midnight() {
        assert_eq!(days_since_date(days_ago(7), now()), 7.5);
        assert_eq!(reliability_adjustment(None, Some(days_ago(7)), now()), 2.0);
        assert_eq!(reliability_adjustment(None, Some(days_ago(6)), now()), 5.0);
    }

    #[test]
    fn confirmation_age_uses_whole_days() {
        assert_eq!(ConfirmationAge::of(days_ago(7), now()), ConfirmationAge::Recent);
        assert_eq!(ConfirmationAge::of(days_ago(15), now()), ConfirmationAge::Normal);
        assert_eq!(ConfirmationAge::of(days_ago(30), now()), ConfirmationAge::Normal);
        assert_eq!(ConfirmationAge::of(days_ago(31), now()), ConfirmationAge::Overdue);
    }
}
