//! Keyword classifier that reads published vacancy text.
//!
//! Evaluation algorithm:
//!
//! 1. Empty or whitespace-only text → unknown (`None`).
//! 2. Lowercase the text and test the rules in declaration order; the first
//!    rule with a phrase contained in the text wins.
//! 3. No rule matched → `NeedsConfirmation`.

use tracing::debug;

use carefind_contracts::{facility::Facility, taxonomy::Availability};

use crate::config::{ClassifierRule, ScoringConfig};

/// Ordered, first-match-wins availability classifier.
#[derive(Debug, Clone)]
pub struct AvailabilityClassifier {
    rules: Vec<ClassifierRule>,
}

/// Recorded availability disagrees with what the web says.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Discrepancy {
    /// What the facility record says.
    pub recorded: Availability,
    /// What the classifier read from live info.
    pub web: Availability,
}

impl AvailabilityClassifier {
    pub fn new(rules: Vec<ClassifierRule>) -> Self {
        Self { rules }
    }

    pub fn from_config(config: &ScoringConfig) -> Self {
        Self::new(config.availability_rules.clone())
    }

    /// Classify a free-text status. `None` means unknown (no text).
    pub fn classify(&self, text: &str) -> Option<Availability> {
        if text.trim().is_empty() {
            return None;
        }
        let lowered = text.to_lowercase();

        for rule in &self.rules {
            if rule.matches(&lowered) {
                debug!(rule_id = %rule.id, availability = %rule.availability, "classifier rule matched");
                return Some(rule.availability);
            }
        }
        Some(Availability::NeedsConfirmation)
    }

    /// Classify the facility's live-info status, if it has any.
    pub fn classify_facility(&self, facility: &Facility) -> Option<Availability> {
        facility
            .realtime_info
            .as_ref()
            .and_then(|info| self.classify(&info.availability_status))
    }

    /// Report a discrepancy when live info yields a known availability that
    /// differs from the recorded one.
    pub fn discrepancy(&self, facility: &Facility) -> Option<Discrepancy> {
        let web = self.classify_facility(facility)?;
        (web != facility.availability).then_some(Discrepancy {
            recorded: facility.availability,
            web,
        })
    }
}

impl Default for AvailabilityClassifier {
    fn default() -> Self {
        Self::from_config(&ScoringConfig::default())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
