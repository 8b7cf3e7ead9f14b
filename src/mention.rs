//! Coreference data model: mentions, documents, and clusters.
//!
//! # Terminology
//!
//! - **Mention**: a noun-phrase span potentially referring to an entity
//! - **Anaphor**: the mention being resolved
//! - **Antecedent**: an earlier candidate mention the anaphor may refer to
//! - **Cluster/chain**: a set of mentions judged coreferent
//!
//! Mentions are immutable once handed to the core by the upstream pipeline;
//! the only mutable state here is the document's cluster partition, changed
//! exclusively through [`Document::merge`].

use std::cmp::Reverse;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Document-scoped mention identifier.
pub type MentionId = i32;

/// Cluster identifier. Initially every mention `m` forms the singleton
/// cluster with id `m.id`.
pub type ClusterId = i32;

// =============================================================================
// Categorical attributes
// =============================================================================

/// Type of referring expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MentionType {
    /// Proper name ("Barack Obama", "Microsoft")
    Proper,
    /// Common noun phrase ("the company", "a dog")
    Nominal,
    /// Pronoun ("he", "it", "they")
    Pronominal,
    /// Coordinated list ("John and Mary")
    List,
}

/// Grammatical/semantic gender of a mention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    /// Masculine.
    Male,
    /// Feminine.
    Female,
    /// Neuter/neutral.
    Neutral,
    /// Undetermined.
    Unknown,
}

/// Grammatical number of a mention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Number {
    /// Singular.
    Singular,
    /// Plural.
    Plural,
    /// Undetermined.
    Unknown,
}

/// Animacy of a mention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Animacy {
    /// Animate referent.
    Animate,
    /// Inanimate referent.
    Inanimate,
    /// Undetermined.
    Unknown,
}

impl MentionType {
    /// Stable label used in feature names.
    #[must_use]
    pub fn as_label(&self) -> &'static str {
        match self {
            MentionType::Proper => "proper",
            MentionType::Nominal => "nominal",
            MentionType::Pronominal => "pronominal",
            MentionType::List => "list",
        }
    }
}

impl Gender {
    /// Stable label used in feature names.
    #[must_use]
    pub fn as_label(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Neutral => "neutral",
            Gender::Unknown => "unknown",
        }
    }
}

impl Number {
    /// Stable label used in feature names.
    #[must_use]
    pub fn as_label(&self) -> &'static str {
        match self {
            Number::Singular => "singular",
            Number::Plural => "plural",
            Number::Unknown => "unknown",
        }
    }
}

impl Animacy {
    /// Stable label used in feature names.
    #[must_use]
    pub fn as_label(&self) -> &'static str {
        match self {
            Animacy::Animate => "animate",
            Animacy::Inanimate => "inanimate",
            Animacy::Unknown => "unknown",
        }
    }
}

// =============================================================================
// Mention
// =============================================================================

/// A single noun-phrase mention extracted from a sentence.
///
/// Produced by the upstream pipeline with head word, span tokens, and
/// dependency-derived categorical attributes precomputed. `mention_num` is
/// the ordinal in the document's canonical order and is (re)assigned by
/// [`Document::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mention {
    /// Unique document-scoped ID.
    pub id: MentionId,
    /// Sentence index within the document.
    pub sent_num: usize,
    /// Start token offset within the sentence (inclusive).
    pub start_index: usize,
    /// End token offset within the sentence (exclusive).
    pub end_index: usize,
    /// Ordinal within the document's canonical mention order.
    pub mention_num: usize,
    /// Head word surface form.
    pub head_word: String,
    /// Head word part-of-speech tag.
    pub head_pos: String,
    /// Span tokens (surface forms).
    pub span: Vec<String>,
    /// Referring-expression type.
    pub mention_type: MentionType,
    /// Gender attribute.
    pub gender: Gender,
    /// Number attribute.
    pub number: Number,
    /// Animacy attribute.
    pub animacy: Animacy,
    /// NER type if the span is a named entity ("PERSON", "ORG", ...).
    pub ner_type: Option<String>,
    /// Speaker attribution, when dialogue structure is known.
    pub speaker: Option<String>,
}

impl Mention {
    /// Create a mention with the given identity and head word. Categorical
    /// attributes default to unknown; fill them with the `with_*` methods.
    #[must_use]
    pub fn new(
        id: MentionId,
        sent_num: usize,
        start_index: usize,
        end_index: usize,
        head_word: impl Into<String>,
    ) -> Self {
        let head_word = head_word.into();
        Self {
            id,
            sent_num,
            start_index,
            end_index,
            mention_num: 0,
            span: vec![head_word.clone()],
            head_word,
            head_pos: String::new(),
            mention_type: MentionType::Nominal,
            gender: Gender::Unknown,
            number: Number::Unknown,
            animacy: Animacy::Unknown,
            ner_type: None,
            speaker: None,
        }
    }

    /// Set the span tokens.
    #[must_use]
    pub fn with_span(mut self, span: Vec<String>) -> Self {
        self.span = span;
        self
    }

    /// Set the head POS tag.
    #[must_use]
    pub fn with_head_pos(mut self, pos: impl Into<String>) -> Self {
        self.head_pos = pos.into();
        self
    }

    /// Set the mention type.
    #[must_use]
    pub fn with_type(mut self, mention_type: MentionType) -> Self {
        self.mention_type = mention_type;
        self
    }

    /// Set gender, number, and animacy together.
    #[must_use]
    pub fn with_attributes(mut self, gender: Gender, number: Number, animacy: Animacy) -> Self {
        self.gender = gender;
        self.number = number;
        self.animacy = animacy;
        self
    }

    /// Set the NER type.
    #[must_use]
    pub fn with_ner(mut self, ner: impl Into<String>) -> Self {
        self.ner_type = Some(ner.into());
        self
    }

    /// Set the speaker.
    #[must_use]
    pub fn with_speaker(mut self, speaker: impl Into<String>) -> Self {
        self.speaker = Some(speaker.into());
        self
    }

    /// Lowercased full-extent string, used for exact string matching.
    #[must_use]
    pub fn span_string(&self) -> String {
        self.span.join(" ").to_lowercase()
    }

    /// Lowercased head word, used for head matching.
    #[must_use]
    pub fn head_string(&self) -> String {
        self.head_word.to_lowercase()
    }
}

impl std::fmt::Display for Mention {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "#{} \"{}\" s{}[{}-{})",
            self.id,
            self.span.join(" "),
            self.sent_num,
            self.start_index,
            self.end_index
        )
    }
}

// =============================================================================
// CorefCluster
// =============================================================================

/// A set of mentions believed to co-refer.
///
/// # Invariants
///
/// - Non-empty.
/// - Mention IDs are listed in canonical document order.
/// - Across a [`Document`], clusters partition the mention set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorefCluster {
    /// Representative cluster ID.
    pub cluster_id: ClusterId,
    /// Member mention IDs in canonical document order.
    pub mention_ids: Vec<MentionId>,
}

impl CorefCluster {
    /// Create a singleton cluster for one mention.
    #[must_use]
    pub fn singleton(mention_id: MentionId) -> Self {
        Self {
            cluster_id: mention_id,
            mention_ids: vec![mention_id],
        }
    }

    /// Number of mentions in this cluster.
    #[must_use]
    pub fn len(&self) -> usize {
        self.mention_ids.len()
    }

    /// Clusters are never empty, but the conventional pair is provided.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mention_ids.is_empty()
    }

    /// True if this cluster contains a single mention.
    #[must_use]
    pub fn is_singleton(&self) -> bool {
        self.mention_ids.len() == 1
    }
}

// =============================================================================
// Document
// =============================================================================

/// Per-document container: canonical mention order plus the current cluster
/// partition. The core mutates only the partition, through [`merge`].
///
/// [`merge`]: Document::merge
#[derive(Debug, Clone)]
pub struct Document {
    mentions: Vec<Mention>,
    index_of: HashMap<MentionId, usize>,
    clusters: HashMap<ClusterId, CorefCluster>,
    mention_to_cluster: HashMap<MentionId, ClusterId>,
}

impl Document {
    /// Build a document from upstream mentions.
    ///
    /// Mentions are sorted into canonical order — by sentence, then start
    /// token, then wider span first (so an outer mention precedes the
    /// mentions nested inside it), then ID — and `mention_num` is assigned
    /// from that order. Every mention starts as its own singleton cluster.
    ///
    /// # Errors
    ///
    /// `Error::InvalidInput` on duplicate mention IDs.
    pub fn new(mut mentions: Vec<Mention>) -> Result<Self> {
        mentions.sort_by_key(|m| (m.sent_num, m.start_index, Reverse(m.end_index), m.id));
        let mut index_of = HashMap::with_capacity(mentions.len());
        for (num, m) in mentions.iter_mut().enumerate() {
            m.mention_num = num;
            if index_of.insert(m.id, num).is_some() {
                return Err(Error::invalid_input(format!("duplicate mention id {}", m.id)));
            }
        }
        let clusters = mentions
            .iter()
            .map(|m| (m.id, CorefCluster::singleton(m.id)))
            .collect();
        let mention_to_cluster = mentions.iter().map(|m| (m.id, m.id)).collect();
        Ok(Self {
            mentions,
            index_of,
            clusters,
            mention_to_cluster,
        })
    }

    /// Mentions in canonical document order.
    #[must_use]
    pub fn mentions(&self) -> &[Mention] {
        &self.mentions
    }

    /// Look up a mention by ID.
    #[must_use]
    pub fn mention(&self, id: MentionId) -> Option<&Mention> {
        self.index_of.get(&id).map(|&i| &self.mentions[i])
    }

    /// Cluster ID for a mention, O(1).
    #[must_use]
    pub fn cluster_of(&self, id: MentionId) -> Option<ClusterId> {
        self.mention_to_cluster.get(&id).copied()
    }

    /// Look up a cluster by ID.
    #[must_use]
    pub fn cluster(&self, id: ClusterId) -> Option<&CorefCluster> {
        self.clusters.get(&id)
    }

    /// Iterate over the current clusters (arbitrary order).
    pub fn clusters(&self) -> impl Iterator<Item = &CorefCluster> {
        self.clusters.values()
    }

    /// Number of clusters in the current partition.
    #[must_use]
    pub fn cluster_count(&self) -> usize {
        self.clusters.len()
    }

    /// Merge the anaphor's cluster into the antecedent's cluster.
    ///
    /// Returns `Ok(true)` if a merge occurred, `Ok(false)` if the two
    /// mentions were already in the same cluster (no-op). The surviving
    /// cluster keeps the antecedent's cluster ID; members stay in canonical
    /// order. The partition invariant is preserved.
    ///
    /// # Errors
    ///
    /// `Error::InvalidInput` if either mention ID is unknown.
    pub fn merge(&mut self, antecedent: MentionId, anaphor: MentionId) -> Result<bool> {
        let into = self
            .cluster_of(antecedent)
            .ok_or_else(|| Error::invalid_input(format!("unknown mention id {antecedent}")))?;
        let from = self
            .cluster_of(anaphor)
            .ok_or_else(|| Error::invalid_input(format!("unknown mention id {anaphor}")))?;
        if into == from {
            return Ok(false);
        }
        let absorbed = self.clusters.remove(&from).expect("cluster_of is in sync");
        for &mid in &absorbed.mention_ids {
            self.mention_to_cluster.insert(mid, into);
        }
        let target = self.clusters.get_mut(&into).expect("cluster_of is in sync");
        target.mention_ids.extend(absorbed.mention_ids);
        let index_of = &self.index_of;
        target.mention_ids.sort_by_key(|id| index_of[id]);
        Ok(true)
    }

    /// The final partition as chains of mention IDs, each chain in
    /// canonical order, chains sorted by their first mention. Suitable for
    /// downstream reporting and for determinism checks.
    #[must_use]
    pub fn chains(&self) -> Vec<Vec<MentionId>> {
        let mut chains: Vec<Vec<MentionId>> = self
            .clusters
            .values()
            .map(|c| c.mention_ids.clone())
            .collect();
        chains.sort_by_key(|c| self.index_of[&c[0]]);
        chains
    }
}
