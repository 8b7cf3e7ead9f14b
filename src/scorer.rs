//! Pairwise scoring with per-mention memoization.
//!
//! Orchestrates scoring of every (antecedent, anaphor) candidate pair and
//! every anaphoricity-only query for one document. The projected mention
//! representations — the expensive part — are memoized in two role-keyed
//! caches (a mention's antecedent-space and anaphor-space projections can
//! differ), so embedding work stays linear in the mention count while only
//! the cheap final score combination is quadratic.
//!
//! Cancellation is cooperative and checked inside the scoring loops, not
//! only at document boundaries: one document can hold enough mentions for
//! per-pair scoring to dominate the cost.

use std::collections::{HashMap, HashSet};

use ndarray::Array1;

use crate::embedding::EmbeddingExtractor;
use crate::features::FeatureExtractor;
use crate::mention::{Document, Mention, MentionId};
use crate::model::ScoringModel;
use crate::sync::CancelToken;
use crate::{Error, Result};

// =============================================================================
// DocumentScores
// =============================================================================

/// All scores for one document: pair scores keyed by ordered
/// (antecedent, anaphor) ID pairs, plus the anaphoricity-only score for
/// every mention. Each score is computed once per document.
#[derive(Debug, Clone, Default)]
pub struct DocumentScores {
    pair_scores: HashMap<(MentionId, MentionId), f64>,
    anaphoricity: HashMap<MentionId, f64>,
    embedding_computations: usize,
}

impl DocumentScores {
    /// Assemble scores directly. Public so alternate scoring strategies
    /// (and tests) can drive the greedy linker with known scores.
    #[must_use]
    pub fn from_parts(
        pair_scores: HashMap<(MentionId, MentionId), f64>,
        anaphoricity: HashMap<MentionId, f64>,
    ) -> Self {
        Self {
            pair_scores,
            anaphoricity,
            embedding_computations: 0,
        }
    }

    /// Score for an ordered (antecedent, anaphor) pair.
    #[must_use]
    pub fn pair(&self, antecedent: MentionId, anaphor: MentionId) -> Option<f64> {
        self.pair_scores.get(&(antecedent, anaphor)).copied()
    }

    /// Anaphoricity-only (no-antecedent) score for a mention.
    #[must_use]
    pub fn anaphoricity(&self, mention: MentionId) -> Option<f64> {
        self.anaphoricity.get(&mention).copied()
    }

    /// Number of pair scores computed.
    #[must_use]
    pub fn pair_count(&self) -> usize {
        self.pair_scores.len()
    }

    /// Number of distinct projected-representation computations performed.
    /// Bounded by twice the mention count (one fill per role per mention).
    #[must_use]
    pub fn embedding_computations(&self) -> usize {
        self.embedding_computations
    }
}

// =============================================================================
// PairwiseScorer
// =============================================================================

/// Scores one document's candidate pairs against the shared, immutable
/// model. The scorer itself holds no per-document state; caches live and
/// die inside [`score_document`].
///
/// [`score_document`]: PairwiseScorer::score_document
pub struct PairwiseScorer<'a> {
    model: &'a ScoringModel,
    features: &'a FeatureExtractor,
    embeddings: &'a EmbeddingExtractor,
}

impl<'a> PairwiseScorer<'a> {
    /// Create a scorer over shared model components.
    #[must_use]
    pub fn new(
        model: &'a ScoringModel,
        features: &'a FeatureExtractor,
        embeddings: &'a EmbeddingExtractor,
    ) -> Self {
        Self {
            model,
            features,
            embeddings,
        }
    }

    fn raw_representation(&self, m: &Mention) -> Array1<f64> {
        let embedding = self.embeddings.mention_embedding(m);
        let categorical = self
            .features
            .mention_features(m, self.embeddings.is_rare(&m.head_word));
        crate::linalg::concatenate(&[embedding.view(), categorical.view()])
    }

    /// Compute every candidate-pair score and every anaphoricity score for
    /// the document.
    ///
    /// # Errors
    ///
    /// - `Error::Interrupted` if `cancel` is set; checked before every
    ///   score computation.
    /// - `Error::Dimension` if the model's shapes disagree with the
    ///   extractors (fatal configuration error).
    pub fn score_document(
        &self,
        doc: &Document,
        candidates: &HashMap<MentionId, Vec<MentionId>>,
        cancel: &CancelToken,
    ) -> Result<DocumentScores> {
        // Fill the two role caches, at most once per mention per role.
        // Anaphor projections are needed for every mention (each gets an
        // anaphoricity score); antecedent projections only for mentions
        // that actually appear as candidates.
        let antecedent_ids: HashSet<MentionId> = candidates
            .values()
            .flat_map(|list| list.iter().copied())
            .collect();

        let mut anaphor_cache: HashMap<MentionId, Array1<f64>> =
            HashMap::with_capacity(doc.mentions().len());
        let mut antecedent_cache: HashMap<MentionId, Array1<f64>> =
            HashMap::with_capacity(antecedent_ids.len());
        for m in doc.mentions() {
            cancel.check()?;
            let raw = self.raw_representation(m);
            anaphor_cache.insert(m.id, self.model.project_anaphor(&raw)?);
            if antecedent_ids.contains(&m.id) {
                antecedent_cache.insert(m.id, self.model.project_antecedent(&raw)?);
            }
        }
        let embedding_computations = anaphor_cache.len() + antecedent_cache.len();

        let (pair_scores, anaphoricity) =
            self.score_all(doc, candidates, &anaphor_cache, &antecedent_cache, cancel)?;

        log::debug!(
            "scored {} pairs, {} anaphoricity queries, {} projection fills for {} mentions",
            pair_scores.len(),
            anaphoricity.len(),
            embedding_computations,
            doc.mentions().len()
        );

        Ok(DocumentScores {
            pair_scores,
            anaphoricity,
            embedding_computations,
        })
    }

    #[cfg(not(feature = "parallel"))]
    fn score_all(
        &self,
        doc: &Document,
        candidates: &HashMap<MentionId, Vec<MentionId>>,
        anaphor_cache: &HashMap<MentionId, Array1<f64>>,
        antecedent_cache: &HashMap<MentionId, Array1<f64>>,
        cancel: &CancelToken,
    ) -> Result<ScoreMaps> {
        let mut pair_scores = HashMap::new();
        let mut anaphoricity = HashMap::with_capacity(doc.mentions().len());
        for m in doc.mentions() {
            cancel.check()?;
            anaphoricity.insert(m.id, self.model.anaphoricity_score(&anaphor_cache[&m.id])?);
            for &a in candidates.get(&m.id).map_or(&[][..], Vec::as_slice) {
                cancel.check()?;
                let score = self.score_pair(doc, a, m.id, anaphor_cache, antecedent_cache)?;
                pair_scores.insert((a, m.id), score);
            }
        }
        Ok((pair_scores, anaphoricity))
    }

    /// Parallel variant: the caches are read-only by now, so pair and
    /// anaphoricity scoring fan out over a worker pool. Results land in
    /// the same keyed maps, so the outcome is identical to the sequential
    /// path.
    #[cfg(feature = "parallel")]
    fn score_all(
        &self,
        doc: &Document,
        candidates: &HashMap<MentionId, Vec<MentionId>>,
        anaphor_cache: &HashMap<MentionId, Array1<f64>>,
        antecedent_cache: &HashMap<MentionId, Array1<f64>>,
        cancel: &CancelToken,
    ) -> Result<ScoreMaps> {
        use rayon::prelude::*;

        let anaphoricity = doc
            .mentions()
            .par_iter()
            .map(|m| {
                cancel.check()?;
                Ok((m.id, self.model.anaphoricity_score(&anaphor_cache[&m.id])?))
            })
            .collect::<Result<HashMap<_, _>>>()?;

        let tasks: Vec<(MentionId, MentionId)> = doc
            .mentions()
            .iter()
            .flat_map(|m| {
                candidates
                    .get(&m.id)
                    .map_or(&[][..], Vec::as_slice)
                    .iter()
                    .map(move |&a| (a, m.id))
            })
            .collect();

        let pair_scores = tasks
            .par_iter()
            .map(|&(a, m)| {
                cancel.check()?;
                Ok(((a, m), self.score_pair(doc, a, m, anaphor_cache, antecedent_cache)?))
            })
            .collect::<Result<HashMap<_, _>>>()?;

        Ok((pair_scores, anaphoricity))
    }

    fn score_pair(
        &self,
        doc: &Document,
        antecedent: MentionId,
        anaphor: MentionId,
        anaphor_cache: &HashMap<MentionId, Array1<f64>>,
        antecedent_cache: &HashMap<MentionId, Array1<f64>>,
    ) -> Result<f64> {
        let a = doc
            .mention(antecedent)
            .ok_or_else(|| Error::invalid_input(format!("unknown candidate id {antecedent}")))?;
        let m = doc
            .mention(anaphor)
            .ok_or_else(|| Error::invalid_input(format!("unknown anaphor id {anaphor}")))?;
        let pair_features = self.features.pair_features(a, m);
        self.model
            .pairwise_score(&antecedent_cache[&antecedent], &anaphor_cache[&anaphor], &pair_features)
    }
}

type ScoreMaps = (
    HashMap<(MentionId, MentionId), f64>,
    HashMap<MentionId, f64>,
);
