//! Pretrained word vectors, corpus word counts, and the raw mention
//! embedding they induce.
//!
//! The raw embedding is a distinct artifact from the categorical feature
//! vector: it is the dense lexical representation the scoring network
//! projects into antecedent/anaphor space. Construction is deterministic —
//! head vector, first-word vector, last-word vector, then the span
//! average, concatenated in that order.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use ndarray::Array1;

use crate::mention::Mention;
use crate::{Error, Result};

/// Token that, when present in a vector file, supplies the unknown-word
/// vector. Absent that, unknown words map to the zero vector.
pub const UNKNOWN_TOKEN: &str = "<unk>";

/// Lowercase and collapse digits so "1984" and "2010" share a form.
fn normalize(word: &str) -> String {
    word.chars()
        .map(|c| if c.is_ascii_digit() { '0' } else { c })
        .collect::<String>()
        .to_lowercase()
}

// =============================================================================
// WordVectors
// =============================================================================

/// A fixed-dimension pretrained word-vector table.
#[derive(Debug, Clone)]
pub struct WordVectors {
    dim: usize,
    vectors: HashMap<String, Array1<f64>>,
    unknown: Array1<f64>,
}

impl WordVectors {
    /// Build a table from in-memory vectors. All vectors must share one
    /// dimension.
    pub fn new(vectors: HashMap<String, Vec<f64>>) -> Result<Self> {
        let dim = vectors
            .values()
            .next()
            .map(Vec::len)
            .ok_or_else(|| Error::model_load("empty word-vector table"))?;
        let mut table = HashMap::with_capacity(vectors.len());
        for (word, values) in vectors {
            if values.len() != dim {
                return Err(Error::dimension(
                    format!("vector for \"{word}\""),
                    dim,
                    values.len(),
                ));
            }
            table.insert(normalize(&word), Array1::from_vec(values));
        }
        let unknown = table
            .get(UNKNOWN_TOKEN)
            .cloned()
            .unwrap_or_else(|| Array1::zeros(dim));
        Ok(Self {
            dim,
            vectors: table,
            unknown,
        })
    }

    /// Load a GloVe-style text file: one `word v1 v2 .. vd` line per word.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(&path)?;
        let mut vectors = HashMap::new();
        for (lineno, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let mut parts = line.split_whitespace();
            let word = parts
                .next()
                .ok_or_else(|| Error::parse(format!("line {}: empty", lineno + 1)))?;
            let values = parts
                .map(|tok| {
                    tok.parse::<f64>().map_err(|_| {
                        Error::parse(format!("line {}: bad float \"{tok}\"", lineno + 1))
                    })
                })
                .collect::<Result<Vec<f64>>>()?;
            if values.is_empty() {
                return Err(Error::parse(format!("line {}: no values", lineno + 1)));
            }
            vectors.insert(word.to_string(), values);
        }
        Self::new(vectors)
    }

    /// Vector dimension.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Vector for a word; the unknown vector if absent.
    #[must_use]
    pub fn get(&self, word: &str) -> &Array1<f64> {
        self.vectors.get(&normalize(word)).unwrap_or(&self.unknown)
    }

    /// The unknown-word vector.
    #[must_use]
    pub fn unknown(&self) -> &Array1<f64> {
        &self.unknown
    }

    /// True if the table has a vector for this word.
    #[must_use]
    pub fn contains(&self, word: &str) -> bool {
        self.vectors.contains_key(&normalize(word))
    }
}

// =============================================================================
// WordCounts
// =============================================================================

/// Corpus frequency statistics used for the rare-word fallback.
#[derive(Debug, Clone, Default)]
pub struct WordCounts {
    counts: HashMap<String, u64>,
}

impl WordCounts {
    /// Build from in-memory counts.
    #[must_use]
    pub fn new(counts: HashMap<String, u64>) -> Self {
        let counts = counts
            .into_iter()
            .map(|(w, c)| (normalize(&w), c))
            .collect();
        Self { counts }
    }

    /// Load a text file of `word count` lines.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(&path)?;
        let mut counts = HashMap::new();
        for (lineno, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let mut parts = line.split_whitespace();
            let (Some(word), Some(count)) = (parts.next(), parts.next()) else {
                return Err(Error::parse(format!("line {}: expected `word count`", lineno + 1)));
            };
            let count = count
                .parse::<u64>()
                .map_err(|_| Error::parse(format!("line {}: bad count \"{count}\"", lineno + 1)))?;
            counts.insert(normalize(word), count);
        }
        Ok(Self { counts })
    }

    /// Corpus count for a word (0 if unseen).
    #[must_use]
    pub fn count(&self, word: &str) -> u64 {
        self.counts.get(&normalize(word)).copied().unwrap_or(0)
    }
}

// =============================================================================
// EmbeddingExtractor
// =============================================================================

/// Computes the raw dense representation of a mention from pretrained word
/// vectors, with rare heads falling back to the unknown vector.
#[derive(Debug, Clone)]
pub struct EmbeddingExtractor {
    vectors: WordVectors,
    counts: WordCounts,
    rare_threshold: u64,
}

impl EmbeddingExtractor {
    /// Create an extractor. Words with corpus count below `rare_threshold`
    /// use the unknown vector.
    #[must_use]
    pub fn new(vectors: WordVectors, counts: WordCounts, rare_threshold: u64) -> Self {
        Self {
            vectors,
            counts,
            rare_threshold,
        }
    }

    /// Width of a raw mention embedding: head, first, last, span average.
    #[must_use]
    pub fn dim(&self) -> usize {
        4 * self.vectors.dim()
    }

    /// True if the word's corpus count is below the rare threshold.
    #[must_use]
    pub fn is_rare(&self, word: &str) -> bool {
        self.counts.count(word) < self.rare_threshold
    }

    fn lookup(&self, word: &str) -> &Array1<f64> {
        if self.is_rare(word) {
            self.vectors.unknown()
        } else {
            self.vectors.get(word)
        }
    }

    /// Raw embedding of one mention.
    #[must_use]
    pub fn mention_embedding(&self, m: &Mention) -> Array1<f64> {
        let head = self.lookup(&m.head_word);
        let first = m.span.first().map_or(head, |w| self.lookup(w));
        let last = m.span.last().map_or(head, |w| self.lookup(w));

        let mut avg = Array1::zeros(self.vectors.dim());
        if m.span.is_empty() {
            avg += head;
        } else {
            for word in &m.span {
                avg += self.lookup(word);
            }
            avg /= m.span.len() as f64;
        }

        crate::linalg::concatenate(&[head.view(), first.view(), last.view(), avg.view()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vectors() -> WordVectors {
        let mut map = HashMap::new();
        map.insert("obama".to_string(), vec![1.0, 0.0]);
        map.insert("president".to_string(), vec![0.0, 1.0]);
        map.insert("the".to_string(), vec![0.5, 0.5]);
        map.insert(UNKNOWN_TOKEN.to_string(), vec![-1.0, -1.0]);
        WordVectors::new(map).unwrap()
    }

    fn counts() -> WordCounts {
        let mut map = HashMap::new();
        map.insert("obama".to_string(), 100);
        map.insert("president".to_string(), 100);
        map.insert("the".to_string(), 1000);
        WordCounts::new(map)
    }

    #[test]
    fn lookup_is_case_insensitive_and_digit_collapsed() {
        let v = vectors();
        assert_eq!(v.get("Obama"), v.get("obama"));
        let mut map = HashMap::new();
        map.insert("0000".to_string(), vec![2.0]);
        let v = WordVectors::new(map).unwrap();
        assert_eq!(v.get("1984")[0], 2.0);
    }

    #[test]
    fn unknown_words_get_unknown_vector() {
        let v = vectors();
        assert_eq!(v.get("zyzzyva"), v.unknown());
        assert_eq!(v.unknown().to_vec(), vec![-1.0, -1.0]);
    }

    #[test]
    fn mixed_dimensions_rejected() {
        let mut map = HashMap::new();
        map.insert("a".to_string(), vec![1.0, 2.0]);
        map.insert("b".to_string(), vec![1.0]);
        assert!(WordVectors::new(map).is_err());
    }

    #[test]
    fn rare_heads_use_unknown_vector() {
        let ex = EmbeddingExtractor::new(vectors(), counts(), 10);
        assert!(ex.is_rare("zyzzyva"));
        assert!(!ex.is_rare("obama"));
        let m = crate::mention::Mention::new(0, 0, 0, 1, "zyzzyva");
        let emb = ex.mention_embedding(&m);
        // Head slot holds the unknown vector.
        assert_eq!(emb.slice(ndarray::s![0..2]).to_vec(), vec![-1.0, -1.0]);
    }

    #[test]
    fn embedding_layout_head_first_last_avg() {
        let ex = EmbeddingExtractor::new(vectors(), counts(), 10);
        let m = crate::mention::Mention::new(0, 0, 0, 2, "president")
            .with_span(vec!["the".to_string(), "president".to_string()]);
        let emb = ex.mention_embedding(&m);
        assert_eq!(emb.len(), ex.dim());
        // head = president
        assert_eq!(emb.slice(ndarray::s![0..2]).to_vec(), vec![0.0, 1.0]);
        // first = the
        assert_eq!(emb.slice(ndarray::s![2..4]).to_vec(), vec![0.5, 0.5]);
        // last = president
        assert_eq!(emb.slice(ndarray::s![4..6]).to_vec(), vec![0.0, 1.0]);
        // avg of {the, president}
        assert_eq!(emb.slice(ndarray::s![6..8]).to_vec(), vec![0.25, 0.75]);
    }

    #[test]
    fn load_glove_text_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vectors.txt");
        fs::write(&path, "obama 1.0 0.0\n<unk> -1 -1\n").unwrap();
        let v = WordVectors::load(&path).unwrap();
        assert_eq!(v.dim(), 2);
        assert_eq!(v.get("Obama").to_vec(), vec![1.0, 0.0]);
        assert_eq!(v.unknown().to_vec(), vec![-1.0, -1.0]);
    }

    #[test]
    fn load_counts_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("counts.txt");
        fs::write(&path, "the notanumber\n").unwrap();
        assert!(WordCounts::load(&path).is_err());
    }
}
