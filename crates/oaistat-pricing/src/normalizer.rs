//! Model name normalization
//!
//! Raw model identifiers reported by the usage API (`gpt-4o-2024-08-06`,
//! `gpt-4o-mini-2024-07-18`, `tts-1-hd`, ...) are collapsed into the
//! normalized models the pricing table knows about. Classification is an
//! ordered list of rules: the first rule whose required substrings all
//! occur in the raw identifier wins, and identifiers matching nothing
//! become [`NormalizedModel::other`].
//!
//! Rules overlap on purpose, so order matters: `gpt-4o` + `mini` has to be
//! tried before the bare `gpt-4o` rule, which in turn has to precede `gpt-4`.
//!
//! # Examples
//!
//! ```
//! use oaistat_pricing::normalizer::{ModelNormalizer, NormalizationRule};
//!
//! let normalizer = ModelNormalizer::new(vec![
//!     NormalizationRule::new(["gpt-4o", "mini"], "gpt-4o-mini"),
//!     NormalizationRule::new(["gpt-4o"], "gpt-4o"),
//! ]);
//!
//! assert_eq!(normalizer.normalize("gpt-4o-mini-2024-07-18").as_str(), "gpt-4o-mini");
//! assert_eq!(normalizer.normalize("gpt-4o-2024-05-13").as_str(), "gpt-4o");
//! assert!(normalizer.normalize("babbage-002").is_other());
//! ```

use oaistat_core::types::NormalizedModel;
use serde::{Deserialize, Serialize};

/// One classification rule: all substrings present → `model`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizationRule {
    /// Substrings that must all occur in the raw identifier
    pub all_of: Vec<String>,
    /// Normalized model assigned on match
    pub model: NormalizedModel,
    /// Compare ignoring ASCII case
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub case_insensitive: bool,
}

impl NormalizationRule {
    /// Create a case-sensitive rule
    pub fn new<I, S>(all_of: I, model: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            all_of: all_of.into_iter().map(Into::into).collect(),
            model: NormalizedModel::new(model),
            case_insensitive: false,
        }
    }

    /// Make the rule ignore ASCII case
    pub fn ignore_case(mut self) -> Self {
        self.case_insensitive = true;
        self
    }

    /// Whether every required substring occurs in `raw`
    pub fn matches(&self, raw: &str) -> bool {
        if self.case_insensitive {
            let raw = raw.to_ascii_lowercase();
            self.all_of
                .iter()
                .all(|needle| raw.contains(&needle.to_ascii_lowercase()))
        } else {
            self.all_of.iter().all(|needle| raw.contains(needle.as_str()))
        }
    }
}

/// Ordered ruleset mapping raw identifiers to normalized models
#[derive(Debug, Clone, Default)]
pub struct ModelNormalizer {
    rules: Vec<NormalizationRule>,
}

impl ModelNormalizer {
    /// Create a normalizer; rules are tried in the given order
    pub fn new(rules: Vec<NormalizationRule>) -> Self {
        Self { rules }
    }

    /// Classify a raw model identifier. Never fails.
    pub fn normalize(&self, raw: &str) -> NormalizedModel {
        self.rules
            .iter()
            .find(|rule| rule.matches(raw))
            .map(|rule| rule.model.clone())
            .unwrap_or_else(NormalizedModel::other)
    }

    /// The rules in evaluation order
    pub fn rules(&self) -> &[NormalizationRule] {
        &self.rules
    }
}
