//! Scoring configuration: keyword groups and classifier rules.
//!
//! A `ScoringConfig` is deserialized from TOML. Every section is optional;
//! missing sections fall back to the built-in vocabulary, which matches the
//! Japanese phrasing used by Sapporo facility listings plus English aliases.
//!
//! Example:
//! ```toml
//! [[medical_keywords]]
//! id = "oxygen"
//! aliases = ["酸素", "oxygen"]
//!
//! [[availability_rules]]
//! id = "vacant"
//! availability = "available"
//! phrases = ["空室あり", "move-in possible"]
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use carefind_contracts::{
    error::{CarefindError, CarefindResult},
    taxonomy::Availability,
};

/// One scoring keyword with its spellings.
///
/// A group matches a pair of texts when each text contains at least one of
/// the aliases (case-insensitive). Each group counts once towards the match
/// ratio no matter how many aliases it has.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordGroup {
    pub id: String,
    pub aliases: Vec<String>,
}

impl KeywordGroup {
    fn new(id: &str, aliases: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// True if `lowered` (already lowercased) contains any alias.
    pub fn found_in(&self, lowered: &str) -> bool {
        self.aliases
            .iter()
            .any(|alias| !alias.is_empty() && lowered.contains(&alias.to_lowercase()))
    }
}

/// A classifier rule: if the status text contains any phrase, the rule's
/// availability applies. Rules are tried in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifierRule {
    pub id: String,
    pub availability: Availability,
    pub phrases: Vec<String>,
}

impl ClassifierRule {
    fn new(id: &str, availability: Availability, phrases: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            availability,
            phrases: phrases.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// True if `lowered` (already lowercased) contains any phrase. A phrase
    /// that starts or ends with an ASCII letter or digit only matches at a
    /// word boundary, so `full` does not match inside `fully`.
    pub fn matches(&self, lowered: &str) -> bool {
        self.phrases
            .iter()
            .any(|p| !p.is_empty() && contains_word(lowered, &p.to_lowercase()))
    }
}

fn contains_word(haystack: &str, phrase: &str) -> bool {
    let is_word = |c: char| c.is_ascii_alphanumeric();
    let check_start = phrase.starts_with(is_word);
    let check_end = phrase.ends_with(is_word);
    haystack.match_indices(phrase).any(|(start, _)| {
        let end = start + phrase.len();
        let open = !check_start || !haystack[..start].ends_with(is_word);
        let close = !check_end || !haystack[end..].starts_with(is_word);
        open && close
    })
}

/// The top-level scoring configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Matched between the profile's medical needs and the facility's
    /// medical care text; worth up to 15 points.
    pub medical_keywords: Vec<KeywordGroup>,
    /// Matched between the profile's preferences and the facility's features;
    /// worth up to 10 points.
    pub preference_keywords: Vec<KeywordGroup>,
    /// Ordered availability classifier rules. First match wins.
    pub availability_rules: Vec<ClassifierRule>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            medical_keywords: vec![
                KeywordGroup::new("feeding-tube", &["胃ろう", "feeding tube", "feeding-tube"]),
                KeywordGroup::new("suction", &["たん吸引", "suction"]),
                KeywordGroup::new("insulin", &["インスリン", "insulin"]),
                KeywordGroup::new("dementia-care", &["認知症", "dementia"]),
                KeywordGroup::new("rehab", &["リハビリ", "rehab"]),
                KeywordGroup::new("oxygen", &["酸素", "oxygen"]),
            ],
            preference_keywords: vec![
                KeywordGroup::new("private-room", &["個室", "private room", "private-room"]),
                KeywordGroup::new("rehab", &["リハビリ", "rehab"]),
                KeywordGroup::new("24-hour", &["24時間", "24-hour", "24 hour"]),
                KeywordGroup::new("nursing-staff", &["看護師", "nurse"]),
            ],
            availability_rules: vec![
                ClassifierRule::new(
                    "vacancy-available",
                    Availability::Available,
                    &["空室あり", "入居可能", "vacancy-available", "vacancy available", "move-in possible"],
                ),
                ClassifierRule::new(
                    "full-or-waitlist",
                    Availability::Full,
                    &["満室", "お待ち", "full", "waitlist"],
                ),
                ClassifierRule::new(
                    "few-remaining",
                    Availability::Scarce,
                    &["空き僅か", "残り僅か", "few vacancies", "few remaining"],
                ),
            ],
        }
    }
}

impl ScoringConfig {
    /// Parse `s` as TOML.
    ///
    /// Returns `CarefindError::ConfigError` if the TOML is malformed or does
    /// not match the expected schema.
    pub fn from_toml_str(s: &str) -> CarefindResult<Self> {
        toml::from_str(s).map_err(|e| CarefindError::ConfigError {
            reason: format!("failed to parse scoring TOML: {}", e),
        })
    }

    /// Read the file at `path` and parse it as TOML scoring configuration.
    pub fn from_file(path: &Path) -> CarefindResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| CarefindError::ConfigError {
            reason: format!("failed to read scoring config '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }
}
