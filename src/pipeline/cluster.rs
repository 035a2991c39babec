// Clustering pipeline — run the clusterer and reconcile its labels.

use anyhow::Result;

use crate::entities::models::{InputCluster, Signature};
use crate::estimators::traits::Clusterer;
use crate::reconcile::{reconcile, ClusteringOutput};

/// Cluster one batch of signatures and map the labels back to author ids.
pub fn cluster(
    clusterer: &mut dyn Clusterer,
    signatures: Vec<Signature>,
    input_clusters: Vec<InputCluster>,
    n_jobs: usize,
) -> Result<ClusteringOutput> {
    clusterer.load_data(signatures, input_clusters)?;
    clusterer.fit(n_jobs)?;
    reconcile(clusterer.labels()?, clusterer.signatures())
}
