//! Run configuration and model artifact loading.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::embedding::{EmbeddingExtractor, WordCounts, WordVectors};
use crate::features::FeatureExtractor;
use crate::model::ScoringModel;
use crate::{Error, Result};

/// Tunable resolution parameters, configured once per run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorefConfig {
    /// Link-vs-abstain bias in `[0, 1]`. Values above 0.5 penalize the
    /// no-antecedent baseline additively, making linking relatively more
    /// attractive; below 0.5 favors abstaining. The bias applies only to
    /// the NA baseline, never to candidate scores.
    pub greedyness: f64,
    /// Hard candidate window, in mentions.
    pub max_mention_distance: usize,
    /// Wider window permitted on head/extent string match. Must be at
    /// least `max_mention_distance`.
    pub max_mention_distance_with_string_match: usize,
    /// Corpus count below which a word uses the unknown embedding and the
    /// rare-head feature fires.
    pub rare_word_threshold: u64,
}

impl Default for CorefConfig {
    fn default() -> Self {
        Self {
            greedyness: 0.5,
            max_mention_distance: 50,
            max_mention_distance_with_string_match: 500,
            rare_word_threshold: 10,
        }
    }
}

impl CorefConfig {
    /// Validate parameter ranges and cutoff ordering.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.greedyness) {
            return Err(Error::invalid_input(format!(
                "greedyness must be in [0, 1], got {}",
                self.greedyness
            )));
        }
        if self.max_mention_distance_with_string_match < self.max_mention_distance {
            return Err(Error::invalid_input(
                "maxMentionDistanceWithStringMatch must be >= maxMentionDistance",
            ));
        }
        Ok(())
    }
}

/// The loaded model artifacts: scoring network, feature extractor (its
/// ID maps travel inside the weight file), and embedding table. Immutable
/// after load; share across document workers via `Arc`.
#[derive(Debug, Clone)]
pub struct ModelBundle {
    /// The scoring network.
    pub model: ScoringModel,
    /// Categorical feature extractor bound to the model's ID maps.
    pub features: FeatureExtractor,
    /// Word vectors + counts.
    pub embeddings: EmbeddingExtractor,
}

impl ModelBundle {
    /// Assemble a bundle from already-loaded parts, checking that the
    /// network's projection input width matches what the extractors
    /// produce. A mismatch is a fatal configuration error.
    pub fn new(
        model: ScoringModel,
        features: FeatureExtractor,
        embeddings: EmbeddingExtractor,
    ) -> Result<Self> {
        let expected = embeddings.dim() + features.mention_dim();
        if model.projection_input_dim() != expected {
            return Err(Error::dimension(
                "projection input",
                expected,
                model.projection_input_dim(),
            ));
        }
        Ok(Self {
            model,
            features,
            embeddings,
        })
    }

    /// Load the three artifacts from disk: JSON weights, GloVe-style word
    /// vectors, and `word count` statistics.
    pub fn load(
        model_path: impl AsRef<Path>,
        vectors_path: impl AsRef<Path>,
        counts_path: impl AsRef<Path>,
        config: &CorefConfig,
    ) -> Result<Self> {
        config.validate()?;
        let (model, features) = ScoringModel::load(model_path)?;
        let vectors = WordVectors::load(vectors_path)?;
        let counts = WordCounts::load(counts_path)?;
        let embeddings = EmbeddingExtractor::new(vectors, counts, config.rare_word_threshold);
        Self::new(model, features, embeddings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_reference_settings() {
        let cfg = CorefConfig::default();
        assert_eq!(cfg.greedyness, 0.5);
        assert_eq!(cfg.max_mention_distance, 50);
        assert_eq!(cfg.max_mention_distance_with_string_match, 500);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn config_round_trips_through_json() {
        let cfg = CorefConfig {
            greedyness: 0.3,
            max_mention_distance: 20,
            max_mention_distance_with_string_match: 120,
            rare_word_threshold: 5,
        };
        let json = serde_json::to_string(&cfg).unwrap();
        let back: CorefConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.greedyness, 0.3);
        assert_eq!(back.max_mention_distance, 20);
        assert_eq!(back.max_mention_distance_with_string_match, 120);
        assert_eq!(back.rare_word_threshold, 5);
    }

    #[test]
    fn greedyness_out_of_range_rejected() {
        let cfg = CorefConfig {
            greedyness: 1.5,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn inverted_cutoffs_rejected() {
        let cfg = CorefConfig {
            max_mention_distance: 100,
            max_mention_distance_with_string_match: 50,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }
}
