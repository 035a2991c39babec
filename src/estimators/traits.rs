// Estimator traits — the swap-ready abstraction over the learning backends.
//
// The ethnicity model, the pairwise distance model and the clustering
// algorithm are opaque to the core. The pipeline only depends on these
// traits, so a deterministic implementation can stand in for tests or
// for environments without a trained model.

use std::path::Path;

use anyhow::Result;

use crate::entities::models::{InputCluster, Signature};
use crate::sampling::SampledPair;

/// Predicts ethnicity probabilities from author names.
pub trait EthnicityEstimator {
    /// Load labelled training data (CSV of RACE,NAMELAST,NAMEFRST rows).
    fn load_data(&mut self, path: &Path) -> Result<()>;

    fn fit(&mut self) -> Result<()>;

    /// One probability vector per name, in input order.
    fn predict(&self, names: &[String]) -> Result<Vec<Vec<f64>>>;

    fn save_model(&self, path: &Path) -> Result<()>;

    fn load_model(&mut self, path: &Path) -> Result<()>;
}

/// Learns a distance between two signatures from labelled pairs.
pub trait DistanceEstimator {
    /// Load the curated signatures and the sampled training pairs.
    /// The ethnicity estimator is passed along for name-origin features.
    fn load_data(
        &mut self,
        ethnicity: &dyn EthnicityEstimator,
        signatures: &[Signature],
        pairs: &[SampledPair<'_>],
    ) -> Result<()>;

    fn fit(&mut self) -> Result<()>;

    /// Distance in `[0, 1]`; 0 means certainly the same author.
    fn distance(&self, a: &Signature, b: &Signature) -> Result<f64>;

    fn save_model(&self, path: &Path) -> Result<()>;

    fn load_model(&mut self, path: &Path) -> Result<()>;
}

/// Groups signatures into clusters, one integer label per signature.
pub trait Clusterer {
    fn load_data(&mut self, signatures: Vec<Signature>, input_clusters: Vec<InputCluster>) -> Result<()>;

    /// Run the clustering. `n_jobs` is a parallelism hint.
    fn fit(&mut self, n_jobs: usize) -> Result<()>;

    /// Labels aligned with [`Clusterer::signatures`]. Fails before `fit`.
    fn labels(&self) -> Result<&[i64]>;

    /// The signatures passed to `load_data`, in the same order.
    fn signatures(&self) -> &[Signature];

    fn save_model(&self, path: &Path) -> Result<()>;

    fn load_model(&mut self, path: &Path) -> Result<()>;
}
