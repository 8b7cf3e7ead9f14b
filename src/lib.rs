//! # anaphora
//!
//! Neural mention-pair coreference resolution.
//!
//! Given a document of pre-extracted noun-phrase mentions, `anaphora`
//! links them into coreference chains: for each mention it scores every
//! plausible earlier antecedent with a small feed-forward network over
//! dense embeddings and categorical features, then greedily picks the
//! best-scoring antecedent (or none) and merges clusters.
//!
//! - **Candidate generation**: bounded antecedent windows with a
//!   string-match long-distance extension
//! - **Scoring**: feed-forward network over (antecedent, anaphor, pair)
//!   projections with a learned no-antecedent representation
//! - **Linking**: greedy antecedent selection with a tunable
//!   `greedyness` bias
//!
//! Upstream concerns — tokenization, parsing, mention detection — are the
//! caller's; this crate consumes ready-made [`Mention`]s and mutates only
//! the document's cluster partition.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use anaphora::{
//!     CancelToken, CorefAlgorithm, CorefConfig, Document, Mention, ModelBundle, NeuralCoref,
//! };
//!
//! # fn main() -> anaphora::Result<()> {
//! let config = CorefConfig::default();
//! let bundle = ModelBundle::load("model.json", "vectors.txt", "counts.txt", &config)?;
//! let resolver = NeuralCoref::new(Arc::new(bundle), config)?;
//!
//! let mut doc = Document::new(vec![
//!     Mention::new(0, 0, 0, 1, "Obama"),
//!     Mention::new(1, 0, 4, 5, "he"),
//! ])?;
//! resolver.run_coref(&mut doc, &CancelToken::new())?;
//! for chain in doc.chains() {
//!     println!("{chain:?}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Strategy seam
//!
//! Resolution strategies implement [`CorefAlgorithm`] and are injected by
//! construction, so the candidate generator and document model stay
//! untouched when strategies are swapped. [`RuleCoref`] is a model-free
//! baseline; the neural strategy is the default choice.
//!
//! ## Concurrency
//!
//! Resolution is single-threaded per document (greedy linking is ordered
//! and stateful), but independent documents may run concurrently against
//! one shared [`ModelBundle`] — all model state is immutable after load.
//! The `parallel` feature additionally fans pair scoring within one
//! document out over a rayon pool. Cancellation is cooperative through
//! [`CancelToken`], checked at every scoring step.

#![warn(missing_docs)]

pub mod candidates;
pub mod config;
pub mod embedding;
mod error;
pub mod features;
pub mod linalg;
mod mention;
pub mod model;
mod resolver;
pub mod scorer;
pub mod sync;

pub use config::{CorefConfig, ModelBundle};
pub use error::{Error, Result};
pub use mention::{
    Animacy, ClusterId, CorefCluster, Document, Gender, Mention, MentionId, MentionType, Number,
};
pub use resolver::{greedy_link, CorefAlgorithm, NeuralCoref, RuleCoref, RuleCorefConfig};
pub use scorer::{DocumentScores, PairwiseScorer};
pub use sync::CancelToken;

pub mod prelude {
    //! Commonly used items, re-exported for convenience.
    //!
    //! ```rust
    //! use anaphora::prelude::*;
    //!
    //! let doc = Document::new(vec![Mention::new(0, 0, 0, 1, "Obama")]).unwrap();
    //! assert_eq!(doc.cluster_count(), 1);
    //! ```
    pub use crate::config::{CorefConfig, ModelBundle};
    pub use crate::error::{Error, Result};
    pub use crate::mention::{
        Animacy, CorefCluster, Document, Gender, Mention, MentionId, MentionType, Number,
    };
    pub use crate::resolver::{CorefAlgorithm, NeuralCoref, RuleCoref};
    pub use crate::sync::CancelToken;
}
