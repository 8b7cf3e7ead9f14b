//! The fixed-topology feed-forward scoring network.
//!
//! Five weight groups: anaphor projection, antecedent projection,
//! pairwise-feature projection (each kernel+bias), a learned
//! no-antecedent (NA) representation standing in for the antecedent
//! projection on anaphoricity-only queries, and an ordered list of hidden
//! (kernel, bias) layers terminating in a scalar output layer.
//!
//! Weights deserialize from a self-describing JSON file that also carries
//! the two feature-ID maps, so one artifact pins the entire wire contract
//! with the feature extractor. Shape mismatches are fatal configuration
//! errors surfaced at load.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::features::{FeatureExtractor, FeatureMap};
use crate::linalg;
use crate::{Error, Result};

// =============================================================================
// Serialized form
// =============================================================================

/// One kernel+bias group as serialized (row-major kernel).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerWeights {
    /// Kernel rows; `kernel[i][j]` multiplies input entry `j` into output
    /// entry `i`.
    pub kernel: Vec<Vec<f64>>,
    /// Bias, one entry per kernel row.
    pub bias: Vec<f64>,
}

/// Serialized model artifact: the five weight groups plus the feature-ID
/// maps agreed with the feature extractor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelWeights {
    /// Antecedent projection.
    pub antecedent: LayerWeights,
    /// Anaphor projection.
    pub anaphor: LayerWeights,
    /// Pairwise-feature projection.
    pub pair: LayerWeights,
    /// Learned no-antecedent representation.
    pub na_representation: Vec<f64>,
    /// Hidden layers in application order; the last must have one row.
    pub hidden: Vec<LayerWeights>,
    /// Feature-name → index map for single-mention features.
    pub mention_feature_ids: HashMap<String, usize>,
    /// Feature-name → index map for pairwise features.
    pub pair_feature_ids: HashMap<String, usize>,
}

fn to_matrix(layer: &LayerWeights, context: &str) -> Result<(Array2<f64>, Array1<f64>)> {
    let rows = layer.kernel.len();
    let cols = layer.kernel.first().map_or(0, Vec::len);
    let mut kernel = Array2::zeros((rows, cols));
    for (i, row) in layer.kernel.iter().enumerate() {
        if row.len() != cols {
            return Err(Error::dimension(format!("{context} kernel row {i}"), cols, row.len()));
        }
        for (j, &v) in row.iter().enumerate() {
            kernel[[i, j]] = v;
        }
    }
    if layer.bias.len() != rows {
        return Err(Error::dimension(format!("{context} bias"), rows, layer.bias.len()));
    }
    Ok((kernel, Array1::from_vec(layer.bias.clone())))
}

// =============================================================================
// ScoringModel
// =============================================================================

/// Immutable, load-once scoring network. Safe for concurrent read-only
/// access from multiple document workers; share via `Arc`.
#[derive(Debug, Clone)]
pub struct ScoringModel {
    antecedent_kernel: Array2<f64>,
    antecedent_bias: Array1<f64>,
    anaphor_kernel: Array2<f64>,
    anaphor_bias: Array1<f64>,
    pair_kernel: Array2<f64>,
    pair_bias: Array1<f64>,
    na_representation: Array1<f64>,
    hidden: Vec<(Array2<f64>, Array1<f64>)>,
}

impl ScoringModel {
    /// Build the network and its feature extractor from deserialized
    /// weights, validating every shape relation that does not depend on
    /// the embedding table.
    pub fn from_weights(weights: &ModelWeights) -> Result<(Self, FeatureExtractor)> {
        let extractor = FeatureExtractor::new(
            FeatureMap::new(weights.mention_feature_ids.clone())?,
            FeatureMap::new(weights.pair_feature_ids.clone())?,
        );

        let (antecedent_kernel, antecedent_bias) = to_matrix(&weights.antecedent, "antecedent projection")?;
        let (anaphor_kernel, anaphor_bias) = to_matrix(&weights.anaphor, "anaphor projection")?;
        let (pair_kernel, pair_bias) = to_matrix(&weights.pair, "pair projection")?;
        let na_representation = Array1::from_vec(weights.na_representation.clone());

        let hidden = weights
            .hidden
            .iter()
            .enumerate()
            .map(|(i, layer)| to_matrix(layer, &format!("hidden layer {i}")))
            .collect::<Result<Vec<_>>>()?;

        let model = Self {
            antecedent_kernel,
            antecedent_bias,
            anaphor_kernel,
            anaphor_bias,
            pair_kernel,
            pair_bias,
            na_representation,
            hidden,
        };
        model.validate(&extractor)?;
        Ok((model, extractor))
    }

    /// Load a JSON weight file.
    pub fn load(path: impl AsRef<Path>) -> Result<(Self, FeatureExtractor)> {
        let text = fs::read_to_string(&path)?;
        let weights: ModelWeights = serde_json::from_str(&text)
            .map_err(|e| Error::model_load(format!("{}: {e}", path.as_ref().display())))?;
        Self::from_weights(&weights)
    }

    fn validate(&self, extractor: &FeatureExtractor) -> Result<()> {
        let hidden_in = self.antecedent_kernel.nrows();
        if self.anaphor_kernel.nrows() != hidden_in {
            return Err(Error::dimension("anaphor projection output", hidden_in, self.anaphor_kernel.nrows()));
        }
        if self.pair_kernel.nrows() != hidden_in {
            return Err(Error::dimension("pair projection output", hidden_in, self.pair_kernel.nrows()));
        }
        if self.na_representation.len() != hidden_in {
            return Err(Error::dimension("NA representation", hidden_in, self.na_representation.len()));
        }
        if self.anaphor_kernel.ncols() != self.antecedent_kernel.ncols() {
            return Err(Error::dimension(
                "anaphor projection input",
                self.antecedent_kernel.ncols(),
                self.anaphor_kernel.ncols(),
            ));
        }
        if self.pair_kernel.ncols() != extractor.pair_dim() {
            return Err(Error::dimension("pair projection input", extractor.pair_dim(), self.pair_kernel.ncols()));
        }

        let mut width = hidden_in;
        for (i, (kernel, bias)) in self.hidden.iter().enumerate() {
            if kernel.ncols() != width {
                return Err(Error::dimension(format!("hidden layer {i} input"), width, kernel.ncols()));
            }
            if bias.len() != kernel.nrows() {
                return Err(Error::dimension(format!("hidden layer {i} bias"), kernel.nrows(), bias.len()));
            }
            width = kernel.nrows();
        }
        if width != 1 {
            return Err(Error::dimension("final layer output", 1, width));
        }
        Ok(())
    }

    /// Expected width of a projection input: raw mention embedding
    /// concatenated with the mention's categorical feature vector.
    #[must_use]
    pub fn projection_input_dim(&self) -> usize {
        self.antecedent_kernel.ncols()
    }

    /// Hidden-layer input width (the shared projection output dimension).
    #[must_use]
    pub fn projection_output_dim(&self) -> usize {
        self.antecedent_kernel.nrows()
    }

    /// Project a mention representation into antecedent space.
    pub fn project_antecedent(&self, input: &Array1<f64>) -> Result<Array1<f64>> {
        linalg::affine(&self.antecedent_kernel, &self.antecedent_bias, input, "antecedent projection")
    }

    /// Project a mention representation into anaphor space.
    pub fn project_anaphor(&self, input: &Array1<f64>) -> Result<Array1<f64>> {
        linalg::affine(&self.anaphor_kernel, &self.anaphor_bias, input, "anaphor projection")
    }

    /// Score an (antecedent, anaphor) candidate pair from the two
    /// projected representations and the pairwise feature vector.
    pub fn pairwise_score(
        &self,
        antecedent_projection: &Array1<f64>,
        anaphor_projection: &Array1<f64>,
        pair_features: &Array1<f64>,
    ) -> Result<f64> {
        self.score(antecedent_projection, anaphor_projection, Some(pair_features))
    }

    /// Anaphoricity-only score: the NA representation substitutes for the
    /// antecedent projection and the pairwise features are a zero vector.
    pub fn anaphoricity_score(&self, anaphor_projection: &Array1<f64>) -> Result<f64> {
        self.score(&self.na_representation, anaphor_projection, None)
    }

    fn score(
        &self,
        antecedent_projection: &Array1<f64>,
        anaphor_projection: &Array1<f64>,
        pair_features: Option<&Array1<f64>>,
    ) -> Result<f64> {
        let zeros;
        let pair_input = match pair_features {
            Some(v) => v,
            None => {
                zeros = Array1::zeros(self.pair_kernel.ncols());
                &zeros
            }
        };
        let pair_projection = linalg::affine(&self.pair_kernel, &self.pair_bias, pair_input, "pair projection")?;

        if antecedent_projection.len() != self.projection_output_dim() {
            return Err(Error::dimension(
                "antecedent projection output",
                self.projection_output_dim(),
                antecedent_projection.len(),
            ));
        }
        if anaphor_projection.len() != self.projection_output_dim() {
            return Err(Error::dimension(
                "anaphor projection output",
                self.projection_output_dim(),
                anaphor_projection.len(),
            ));
        }

        let mut v = antecedent_projection + anaphor_projection + pair_projection;
        for (i, (kernel, bias)) in self.hidden.iter().enumerate() {
            v = linalg::affine(kernel, bias, &v, &format!("hidden layer {i}"))?;
            // The scalar output layer stays unactivated: the score must be
            // a raw logit, not clipped at zero.
            if kernel.nrows() != 1 {
                v = linalg::relu(&v);
            }
        }
        Ok(linalg::element_sum(&v))
    }
}
