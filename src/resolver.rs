//! Coreference resolution strategies and the greedy antecedent linker.
//!
//! Strategies are swappable behind the [`CorefAlgorithm`] trait without
//! touching candidate generation or the document model. The main strategy
//! is [`NeuralCoref`]; [`RuleCoref`] is a lightweight string/pronoun
//! baseline useful when no model artifacts are available.

use std::collections::HashMap;
use std::sync::Arc;

use crate::candidates::candidate_antecedents;
use crate::config::{CorefConfig, ModelBundle};
use crate::mention::{Animacy, Document, Gender, MentionId, MentionType, Number};
use crate::scorer::{DocumentScores, PairwiseScorer};
use crate::sync::CancelToken;
use crate::{Error, Result};

/// A coreference resolution strategy.
///
/// The only externally visible side effect of `run_coref` is cluster
/// merging on the document; strategies hold no per-document state between
/// calls.
pub trait CorefAlgorithm: Send + Sync {
    /// Resolve one document, mutating its cluster partition in place.
    ///
    /// # Errors
    ///
    /// `Error::Interrupted` on cooperative cancellation. Merges already
    /// committed are left as-is; the caller must treat the document's
    /// result as unusable as a whole, not partially valid.
    fn run_coref(&self, doc: &mut Document, cancel: &CancelToken) -> Result<()>;

    /// Strategy name for reporting.
    fn name(&self) -> &'static str;
}

// =============================================================================
// Greedy linking
// =============================================================================

/// Greedy antecedent selection over precomputed scores.
///
/// For each anaphor in canonical document order, the no-antecedent
/// baseline starts at `NAscore − 50·(greedyness − 0.5)`; a candidate
/// replaces the incumbent best only on a strictly greater score, so exact
/// ties keep the earlier candidate (or the NA baseline). The winning
/// antecedent's cluster absorbs the anaphor's cluster.
///
/// Runs single-threaded: merges are ordered and stateful. Returns the
/// number of merges performed.
///
/// # Errors
///
/// `Error::InvalidInput` if a required score is missing from `scores`.
pub fn greedy_link(
    doc: &mut Document,
    candidates: &HashMap<MentionId, Vec<MentionId>>,
    scores: &DocumentScores,
    greedyness: f64,
) -> Result<usize> {
    let anaphors: Vec<MentionId> = doc.mentions().iter().map(|m| m.id).collect();
    let mut links = 0;
    for anaphor in anaphors {
        let na = scores
            .anaphoricity(anaphor)
            .ok_or_else(|| Error::invalid_input(format!("no anaphoricity score for mention {anaphor}")))?;
        let mut best_score = na - 50.0 * (greedyness - 0.5);
        let mut best_antecedent: Option<MentionId> = None;
        for &candidate in candidates.get(&anaphor).map_or(&[][..], Vec::as_slice) {
            let score = scores.pair(candidate, anaphor).ok_or_else(|| {
                Error::invalid_input(format!("no score for pair ({candidate}, {anaphor})"))
            })?;
            if score > best_score {
                best_score = score;
                best_antecedent = Some(candidate);
            }
        }
        if let Some(antecedent) = best_antecedent {
            if doc.merge(antecedent, anaphor)? {
                links += 1;
            }
        }
    }
    Ok(links)
}

// =============================================================================
// NeuralCoref
// =============================================================================

/// Neural mention-pair strategy: candidate generation, cached pairwise
/// scoring, then greedy linking.
pub struct NeuralCoref {
    bundle: Arc<ModelBundle>,
    config: CorefConfig,
}

impl NeuralCoref {
    /// Create the strategy over loaded artifacts.
    ///
    /// # Errors
    ///
    /// `Error::InvalidInput` on out-of-range configuration.
    pub fn new(bundle: Arc<ModelBundle>, config: CorefConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { bundle, config })
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &CorefConfig {
        &self.config
    }
}

impl CorefAlgorithm for NeuralCoref {
    fn run_coref(&self, doc: &mut Document, cancel: &CancelToken) -> Result<()> {
        let candidates = candidate_antecedents(
            doc,
            self.config.max_mention_distance,
            self.config.max_mention_distance_with_string_match,
        );
        let scorer = PairwiseScorer::new(
            &self.bundle.model,
            &self.bundle.features,
            &self.bundle.embeddings,
        );
        let scores = scorer.score_document(doc, &candidates, cancel)?;
        let links = greedy_link(doc, &candidates, &scores, self.config.greedyness)?;
        log::debug!(
            "linked {links} of {} mentions into {} clusters",
            doc.mentions().len(),
            doc.cluster_count()
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "neural-mention-pair"
    }
}

// =============================================================================
// RuleCoref
// =============================================================================

/// Configuration for the rule-based baseline.
#[derive(Debug, Clone)]
pub struct RuleCorefConfig {
    /// Maximum sentence distance for pronoun resolution.
    pub max_pronoun_distance: usize,
    /// Also link on bare head-word match, not just full-extent match.
    pub head_match: bool,
}

impl Default for RuleCorefConfig {
    fn default() -> Self {
        Self {
            max_pronoun_distance: 3,
            head_match: true,
        }
    }
}

/// Rule-based baseline strategy.
///
/// Three passes per anaphor, first hit wins:
/// 1. exact extent match against any earlier mention;
/// 2. head-word match (when enabled);
/// 3. for pronouns, the nearest preceding non-pronoun within the sentence
///    window whose gender/number/animacy are compatible (unknown is
///    compatible with anything — no attribute is ever guessed from a
///    name).
#[derive(Debug, Clone, Default)]
pub struct RuleCoref {
    config: RuleCorefConfig,
}

impl RuleCoref {
    /// Create a baseline resolver.
    #[must_use]
    pub fn new(config: RuleCorefConfig) -> Self {
        Self { config }
    }

    fn attributes_compatible(a: &crate::mention::Mention, m: &crate::mention::Mention) -> bool {
        let gender_ok = a.gender == Gender::Unknown
            || m.gender == Gender::Unknown
            || a.gender == m.gender;
        let number_ok = a.number == Number::Unknown
            || m.number == Number::Unknown
            || a.number == m.number;
        let animacy_ok = a.animacy == Animacy::Unknown
            || m.animacy == Animacy::Unknown
            || a.animacy == m.animacy;
        gender_ok && number_ok && animacy_ok
    }

    fn find_antecedent(&self, doc: &Document, index: usize) -> Option<MentionId> {
        let mentions = doc.mentions();
        let m = &mentions[index];
        let earlier = &mentions[..index];

        if m.mention_type == MentionType::Pronominal {
            return earlier
                .iter()
                .rev()
                .filter(|a| a.mention_type != MentionType::Pronominal)
                .take_while(|a| m.sent_num - a.sent_num <= self.config.max_pronoun_distance)
                .find(|a| Self::attributes_compatible(a, m))
                .map(|a| a.id);
        }

        let span = m.span_string();
        if let Some(a) = earlier.iter().rev().find(|a| a.span_string() == span) {
            return Some(a.id);
        }
        if self.config.head_match {
            let head = m.head_string();
            if let Some(a) = earlier.iter().rev().find(|a| a.head_string() == head) {
                return Some(a.id);
            }
        }
        None
    }
}

impl CorefAlgorithm for RuleCoref {
    fn run_coref(&self, doc: &mut Document, cancel: &CancelToken) -> Result<()> {
        for index in 0..doc.mentions().len() {
            cancel.check()?;
            if let Some(antecedent) = self.find_antecedent(doc, index) {
                let anaphor = doc.mentions()[index].id;
                doc.merge(antecedent, anaphor)?;
            }
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "rule-baseline"
    }
}
