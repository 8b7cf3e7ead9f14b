//! Categorical feature extraction for mentions and mention pairs.
//!
//! Feature vectors are sparse by name: the extractor emits feature-name
//! strings and materializes them into a fixed-size dense vector through a
//! model-supplied name→index map. Names absent from the map are silently
//! dropped — they contribute nothing to the vector. This is the
//! degrade-gracefully policy for model/extractor version skew, not an
//! error, and is deliberately not logged per occurrence.
//!
//! Pairwise vectors follow a fixed concatenation order that is part of the
//! wire contract with the scoring network:
//! categorical pair features, then the bucketed sentence-distance encoding,
//! then the bucketed mention-distance encoding, then the overlap flag.

use std::collections::HashMap;

use ndarray::Array1;

use crate::mention::Mention;
use crate::{Error, Result};

/// Width of one bucketed distance encoding: exact buckets for distances
/// 0..=9 plus one coarse bucket for everything farther.
pub const DISTANCE_BUCKETS: usize = 11;

// =============================================================================
// FeatureMap
// =============================================================================

/// Immutable feature-name → vector-index map supplied at model-load time.
#[derive(Debug, Clone)]
pub struct FeatureMap {
    ids: HashMap<String, usize>,
    size: usize,
}

impl FeatureMap {
    /// Build a map from explicit name→index entries. The vector size is
    /// one past the largest index, so maps may be sparse.
    ///
    /// # Errors
    ///
    /// `Error::InvalidInput` if two names share an index.
    pub fn new(ids: HashMap<String, usize>) -> Result<Self> {
        let size = ids.values().map(|&i| i + 1).max().unwrap_or(0);
        let mut seen = vec![false; size];
        for (name, &idx) in &ids {
            if seen[idx] {
                return Err(Error::invalid_input(format!(
                    "feature index {idx} assigned twice (at \"{name}\")"
                )));
            }
            seen[idx] = true;
        }
        Ok(Self { ids, size })
    }

    /// Build a map assigning consecutive indices in the given name order.
    /// Convenient for tests and synthetic models.
    #[must_use]
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ids: HashMap<String, usize> = names
            .into_iter()
            .enumerate()
            .map(|(i, n)| (n.into(), i))
            .collect();
        let size = ids.len();
        Self { ids, size }
    }

    /// Dense vector length this map materializes into.
    #[must_use]
    pub fn len(&self) -> usize {
        self.size
    }

    /// True if the map is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Materialize named features into a dense one-hot vector. Unknown
    /// names are dropped silently.
    #[must_use]
    pub fn materialize<S: AsRef<str>>(&self, names: &[S]) -> Array1<f64> {
        let mut v = Array1::zeros(self.size);
        for name in names {
            if let Some(&idx) = self.ids.get(name.as_ref()) {
                v[idx] = 1.0;
            }
        }
        v
    }
}

// =============================================================================
// Distance bucketing
// =============================================================================

/// Monotonic bucketed encoding of a non-negative distance.
///
/// Distances 0..=9 map to their own bucket; anything ≥10 collapses into
/// the final coarse bucket.
#[must_use]
pub fn encode_distance(d: usize) -> Array1<f64> {
    let mut v = Array1::zeros(DISTANCE_BUCKETS);
    v[d.min(DISTANCE_BUCKETS - 1)] = 1.0;
    v
}

// =============================================================================
// FeatureExtractor
// =============================================================================

/// Extracts categorical feature vectors for single mentions and ordered
/// (antecedent, anaphor) pairs.
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    mention_ids: FeatureMap,
    pair_ids: FeatureMap,
}

impl FeatureExtractor {
    /// Create an extractor over the model's two feature-ID maps.
    #[must_use]
    pub fn new(mention_ids: FeatureMap, pair_ids: FeatureMap) -> Self {
        Self {
            mention_ids,
            pair_ids,
        }
    }

    /// Width of a single-mention feature vector.
    #[must_use]
    pub fn mention_dim(&self) -> usize {
        self.mention_ids.len()
    }

    /// Width of a full pairwise feature vector: categorical pair features
    /// plus two distance encodings plus the overlap flag.
    #[must_use]
    pub fn pair_dim(&self) -> usize {
        self.pair_ids.len() + 2 * DISTANCE_BUCKETS + 1
    }

    /// Intrinsic features of one mention. `rare_head` marks a head word
    /// below the configured corpus-frequency threshold.
    #[must_use]
    pub fn mention_features(&self, m: &Mention, rare_head: bool) -> Array1<f64> {
        let mut names = vec![
            format!("mention-type={}", m.mention_type.as_label()),
            format!("gender={}", m.gender.as_label()),
            format!("number={}", m.number.as_label()),
            format!("animacy={}", m.animacy.as_label()),
        ];
        if !m.head_pos.is_empty() {
            names.push(format!("head-pos={}", m.head_pos.to_lowercase()));
        }
        if let Some(ner) = &m.ner_type {
            names.push(format!("ner={}", ner.to_lowercase()));
        }
        if rare_head {
            names.push("rare-head".to_string());
        }
        self.mention_ids.materialize(&names)
    }

    /// Relational features of an ordered (antecedent, anaphor) pair,
    /// concatenated with the two distance encodings and the
    /// within-sentence overlap flag. The antecedent must precede the
    /// anaphor in canonical order.
    #[must_use]
    pub fn pair_features(&self, antecedent: &Mention, anaphor: &Mention) -> Array1<f64> {
        let categorical = self.pair_ids.materialize(&pair_feature_names(antecedent, anaphor));

        let sent_dist = anaphor.sent_num.saturating_sub(antecedent.sent_num);
        let mention_dist = anaphor
            .mention_num
            .saturating_sub(antecedent.mention_num + 1);

        let overlap = f64::from(
            antecedent.sent_num == anaphor.sent_num
                && antecedent.end_index > anaphor.start_index,
        );

        crate::linalg::concatenate(&[
            categorical.view(),
            encode_distance(sent_dist).view(),
            encode_distance(mention_dist).view(),
            Array1::from_elem(1, overlap).view(),
        ])
    }
}

fn agreement(a: &str, b: &str, either_unknown: bool) -> &'static str {
    if either_unknown {
        "unknown"
    } else if a == b {
        "agree"
    } else {
        "disagree"
    }
}

fn pair_feature_names(antecedent: &Mention, anaphor: &Mention) -> Vec<String> {
    let mut names = Vec::with_capacity(12);

    let a_span = antecedent.span_string();
    let m_span = anaphor.span_string();
    if a_span == m_span {
        names.push("exact-string-match".to_string());
    } else if a_span.contains(&m_span) || m_span.contains(&a_span) {
        names.push("relaxed-string-match".to_string());
    }
    if antecedent.head_string() == anaphor.head_string() {
        names.push("head-match".to_string());
    }

    if let (Some(s1), Some(s2)) = (&antecedent.speaker, &anaphor.speaker) {
        if s1 == s2 {
            names.push("same-speaker".to_string());
        }
    }

    names.push(format!(
        "gender-{}",
        agreement(
            antecedent.gender.as_label(),
            anaphor.gender.as_label(),
            antecedent.gender == crate::mention::Gender::Unknown
                || anaphor.gender == crate::mention::Gender::Unknown,
        )
    ));
    names.push(format!(
        "number-{}",
        agreement(
            antecedent.number.as_label(),
            anaphor.number.as_label(),
            antecedent.number == crate::mention::Number::Unknown
                || anaphor.number == crate::mention::Number::Unknown,
        )
    ));
    names.push(format!(
        "animacy-{}",
        agreement(
            antecedent.animacy.as_label(),
            anaphor.animacy.as_label(),
            antecedent.animacy == crate::mention::Animacy::Unknown
                || anaphor.animacy == crate::mention::Animacy::Unknown,
        )
    ));

    names.push(format!(
        "type-pair={}-{}",
        antecedent.mention_type.as_label(),
        anaphor.mention_type.as_label()
    ));

    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mention::{Gender, MentionType, Number};

    fn maps() -> FeatureExtractor {
        let mention_ids = FeatureMap::from_names([
            "mention-type=pronominal",
            "gender=male",
            "number=singular",
            "rare-head",
        ]);
        let pair_ids = FeatureMap::from_names([
            "exact-string-match",
            "head-match",
            "gender-agree",
            "number-agree",
            "type-pair=proper-pronominal",
        ]);
        FeatureExtractor::new(mention_ids, pair_ids)
    }

    #[test]
    fn unknown_names_are_dropped_silently() {
        let map = FeatureMap::from_names(["a", "b"]);
        let v = map.materialize(&["a", "nonexistent", "also-missing"]);
        assert_eq!(v.to_vec(), vec![1.0, 0.0]);
    }

    #[test]
    fn sparse_map_sizes_past_max_index() {
        let mut ids = HashMap::new();
        ids.insert("x".to_string(), 5);
        let map = FeatureMap::new(ids).unwrap();
        assert_eq!(map.len(), 6);
        assert_eq!(map.materialize(&["x"])[5], 1.0);
    }

    #[test]
    fn duplicate_indices_rejected() {
        let mut ids = HashMap::new();
        ids.insert("x".to_string(), 0);
        ids.insert("y".to_string(), 0);
        assert!(FeatureMap::new(ids).is_err());
    }

    #[test]
    fn distance_buckets_exact_then_coarse() {
        for d in 0..10 {
            let v = encode_distance(d);
            assert_eq!(v[d], 1.0);
            assert_eq!(v.sum(), 1.0);
        }
        assert_eq!(encode_distance(10)[10], 1.0);
        assert_eq!(encode_distance(500)[10], 1.0);
    }

    #[test]
    fn mention_features_one_hot() {
        let fx = maps();
        let m = Mention::new(0, 0, 0, 1, "he")
            .with_type(MentionType::Pronominal)
            .with_attributes(Gender::Male, Number::Singular, crate::mention::Animacy::Animate);
        let v = fx.mention_features(&m, true);
        assert_eq!(v.to_vec(), vec![1.0, 1.0, 1.0, 1.0]);
        let v = fx.mention_features(&m, false);
        assert_eq!(v.to_vec(), vec![1.0, 1.0, 1.0, 0.0]);
    }

    #[test]
    fn pair_dim_accounts_for_distances_and_overlap() {
        let fx = maps();
        assert_eq!(fx.pair_dim(), 5 + 2 * DISTANCE_BUCKETS + 1);
    }

    #[test]
    fn pair_features_layout_is_fixed() {
        let fx = maps();
        let mut a = Mention::new(0, 0, 0, 2, "Obama").with_type(MentionType::Proper);
        a.mention_num = 0;
        let mut m = Mention::new(1, 2, 1, 2, "he").with_type(MentionType::Pronominal);
        m.mention_num = 3;

        let v = fx.pair_features(&a, &m);
        assert_eq!(v.len(), fx.pair_dim());
        // type-pair=proper-pronominal fires at categorical index 4.
        assert_eq!(v[4], 1.0);
        // Sentence distance 2 → bucket 2 of the first encoding.
        assert_eq!(v[5 + 2], 1.0);
        // Mention distance 3-0-1 = 2 → bucket 2 of the second encoding.
        assert_eq!(v[5 + DISTANCE_BUCKETS + 2], 1.0);
        // Different sentences → overlap flag clear.
        assert_eq!(v[v.len() - 1], 0.0);
    }

    #[test]
    fn overlap_flag_set_for_nested_same_sentence() {
        let fx = maps();
        let mut a = Mention::new(0, 1, 0, 5, "the president of France");
        a.mention_num = 0;
        let mut m = Mention::new(1, 1, 3, 4, "France");
        m.mention_num = 1;
        let v = fx.pair_features(&a, &m);
        assert_eq!(v[v.len() - 1], 1.0);
    }

    #[test]
    fn exact_match_beats_relaxed() {
        let names = pair_feature_names(
            &Mention::new(0, 0, 0, 1, "bank").with_span(vec!["the".into(), "bank".into()]),
            &Mention::new(1, 1, 0, 1, "bank").with_span(vec!["the".into(), "bank".into()]),
        );
        assert!(names.contains(&"exact-string-match".to_string()));
        assert!(!names.contains(&"relaxed-string-match".to_string()));
    }
}
