// Training pipelines — ethnicity and distance models.
//
// Distance training follows the data flow of the whole core: curated
// signatures -> input clusters -> balanced pair sample -> distance model.

use anyhow::Result;
use tracing::{info, warn};

use crate::clusters::build_input_clusters;
use crate::config::Config;
use crate::estimators::traits::{DistanceEstimator, EthnicityEstimator};
use crate::index::readers::get_signatures;
use crate::index::traits::LiteratureIndex;
use crate::sampling::{sample_pairs, SampledPair, SamplingOptions, SamplingReport};

/// Train the ethnicity estimator on the configured CSV file and save it
/// to the configured model path.
pub fn train_ethnicity_model(estimator: &mut dyn EthnicityEstimator, config: &Config) -> Result<()> {
    info!(data = %config.ethnicity_data_path.display(), "Training ethnicity model");
    estimator.load_data(&config.ethnicity_data_path)?;
    estimator.fit()?;
    estimator.save_model(&config.ethnicity_model_path)?;
    info!(model = %config.ethnicity_model_path.display(), "Ethnicity model saved");
    Ok(())
}

/// Train the distance estimator on sampled pairs of curated signatures and save it.
///
/// Returns the sampling report so callers can surface a shortfall.
pub async fn train_distance_model(
    index: &dyn LiteratureIndex,
    ethnicity: &mut dyn EthnicityEstimator,
    distance: &mut dyn DistanceEstimator,
    config: &Config,
) -> Result<SamplingReport> {
    config.require_pairs_size()?;

    let curated = get_signatures(index, None, true, config.max_query_size).await?;
    let input_clusters = build_input_clusters(&curated);
    info!(
        signatures = curated.len(),
        clusters = input_clusters.len(),
        "Loaded curated signatures"
    );

    let options = SamplingOptions {
        seed: config.sampling_seed,
        max_attempts: config.sampling_max_attempts,
    };
    let mut sampler = sample_pairs(&curated, &input_clusters, config.sampled_pairs_size, options)?;
    let pairs: Vec<SampledPair<'_>> = sampler.by_ref().collect();
    let report = sampler.report();
    if report.shortfall() > 0 {
        warn!(
            requested = report.requested,
            produced = report.produced,
            "Sampled fewer pairs than requested"
        );
    }

    ethnicity.load_model(&config.ethnicity_model_path)?;
    distance.load_data(ethnicity, &curated, &pairs)?;
    distance.fit()?;
    distance.save_model(&config.distance_model_path)?;
    info!(
        model = %config.distance_model_path.display(),
        pairs = pairs.len(),
        "Distance model saved"
    );

    Ok(report)
}
