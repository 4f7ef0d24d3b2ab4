//! # carefind-scoring
//!
//! The algorithmic core of carefind: everything that decides which
//! facilities a user sees and in what order.
//!
//! ## Overview
//!
//! - [`AvailabilityClassifier`] reads free-text vacancy status with ordered,
//!   first-match-wins keyword rules.
//! - [`reliability_adjustment`] turns reliability tier and confirmation age
//!   into a signed trust adjustment.
//! - [`RecommendationScorer`] combines profile matching, live info,
//!   availability, update recency and reliability into a score in [0, 100].
//! - [`SearchPipeline`] filters, scores and sorts a facility list.
//!
//! Keyword vocabularies and classifier rules come from a [`ScoringConfig`],
//! which can be loaded from TOML.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use carefind_scoring::{ScoringConfig, SearchPipeline};
//!
//! let config = ScoringConfig::from_file(Path::new("carefind-scoring.toml"))?;
//! let pipeline = SearchPipeline::new(&config);
//! let ranked = pipeline.run(&facilities, &filter, profile.as_ref(), Some(SortKey::Recommended), Utc::now());
//! ```

pub mod classifier;
pub mod config;
pub mod pipeline;
pub mod recommend;
pub mod reliability;

pub use classifier::{AvailabilityClassifier, Discrepancy};
pub use config::{ClassifierRule, KeywordGroup, ScoringConfig};
pub use pipeline::{filter_facilities, sort_facilities, ScoredFacility, SearchPipeline};
pub use recommend::{RecommendationScorer, ScoreBreakdown};
pub use reliability::{reliability_adjustment, ConfirmationAge};

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::io::Write;

    use carefind_contracts::{error::CarefindError, taxonomy::Availability};

    use crate::{AvailabilityClassifier, ScoringConfig};

    // ── 1. defaults ───────────────────────────────────────────────────────────

    #[test]
    fn test_default_vocabulary_sizes() {
        let config = ScoringConfig::default();
        assert_eq!(config.medical_keywords.len(), 6);
        assert_eq!(config.preference_keywords.len(), 4);
        assert_eq!(config.availability_rules.len(), 3);
        assert_eq!(config.availability_rules[0].availability, Availability::Available);
        assert_eq!(config.availability_rules[1].availability, Availability::Full);
        assert_eq!(config.availability_rules[2].availability, Availability::Scarce);
    }

    // ── 2. partial TOML keeps the other defaults ──────────────────────────────

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let toml = r#"
            [[preference_keywords]]
            id = "garden"
            aliases = ["庭", "garden"]
        "#;

        let config = ScoringConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.preference_keywords.len(), 1);
        assert_eq!(config.preference_keywords[0].id, "garden");
        assert_eq!(config.medical_keywords, ScoringConfig::default().medical_keywords);
    }

    // ── 3. custom classifier rules are applied in order ───────────────────────

    #[test]
    fn test_custom_rules_first_match_wins() {
        let toml = r#"
            [[availability_rules]]
            id = "short-stay"
            availability = "scarce"
            phrases = ["短期利用のみ"]

            [[availability_rules]]
            id = "accepting"
            availability = "available"
            phrases = ["受付中"]
        "#;

        let config = ScoringConfig::from_toml_str(toml).unwrap();
        let classifier = AvailabilityClassifier::from_config(&config);

        assert_eq!(classifier.classify("短期利用のみ受付中"), Some(Availability::Scarce));
        assert_eq!(classifier.classify("見学受付中"), Some(Availability::Available));
        assert_eq!(classifier.classify("空室あり"), Some(Availability::NeedsConfirmation));
    }

    // ── 4. file loading ───────────────────────────────────────────────────────

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[[medical_keywords]]\nid = \"oxygen\"\naliases = [\"酸素\"]").unwrap();

        let config = ScoringConfig::from_file(file.path()).unwrap();
        assert_eq!(config.medical_keywords.len(), 1);

        let missing = ScoringConfig::from_file(std::path::Path::new("/nonexistent/scoring.toml"));
        assert!(matches!(missing, Err(CarefindError::ConfigError { .. })));
    }

    // ── 5. TOML parse error ───────────────────────────────────────────────────

    #[test]
    fn test_toml_parse_error() {
        let result = ScoringConfig::from_toml_str("this is not valid toml ][[[");

        match result {
            Err(CarefindError::ConfigError { reason }) => {
                assert!(
                    reason.contains("failed to parse scoring TOML"),
                    "expected parse error message, got: {reason}"
                );
            }
            other => panic!("expected ConfigError, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_availability_in_rule_is_rejected() {
        let toml = r#"
            [[availability_rules]]
            id = "bad"
            availability = "maybe"
            phrases = ["x"]
        "#;
        assert!(ScoringConfig::from_toml_str(toml).is_err());
    }
}
