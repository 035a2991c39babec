// Batch reclustering: drain the work queue one signature block at a time.
//
// Each block popped from the queue is fetched from the index, seeded with
// input clusters, clustered and reconciled; the output goes to the caller's
// sink. The run ends when the queue stays empty for the configured timeout.
// A failing block is logged and skipped so one bad block cannot stall the
// rest of the queue.

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use super::cluster::cluster;
use crate::clusters::build_input_clusters;
use crate::config::Config;
use crate::estimators::traits::Clusterer;
use crate::index::readers::get_signatures;
use crate::index::traits::LiteratureIndex;
use crate::queue::{next_block, QueuePoll, WorkQueue};
use crate::reconcile::ClusteringOutput;

/// Totals for one reclustering run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReclusterSummary {
    pub blocks_clustered: usize,
    pub blocks_failed: usize,
    pub signatures: usize,
}

async fn recluster_block(
    block: &str,
    index: &dyn LiteratureIndex,
    clusterer: &mut dyn Clusterer,
    config: &Config,
) -> Result<ClusteringOutput> {
    let signatures = get_signatures(index, Some(block), false, config.max_query_size).await?;
    let input_clusters = build_input_clusters(&signatures);
    cluster(clusterer, signatures, input_clusters, config.clustering_n_jobs)
}

/// Consume blocks until the queue is drained.
pub async fn run<F>(
    queue: &dyn WorkQueue,
    index: &dyn LiteratureIndex,
    clusterer: &mut dyn Clusterer,
    config: &Config,
    mut sink: F,
) -> Result<ReclusterSummary>
where
    F: FnMut(&str, &ClusteringOutput) -> Result<()>,
{
    let spinner = if config.display_progress {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("  {spinner} {msg}") {
            pb.set_style(style);
        }
        pb
    } else {
        ProgressBar::hidden()
    };

    let mut summary = ReclusterSummary::default();
    loop {
        let block = match next_block(queue, config.queue_timeout).await? {
            QueuePoll::GotBlock(block) => block,
            QueuePoll::Drained => break,
        };
        spinner.set_message(format!("Clustering block {block}"));

        match recluster_block(&block, index, clusterer, config).await {
            Ok(output) => {
                info!(block = %block, signatures = output.len(), "Block reclustered");
                summary.blocks_clustered += 1;
                summary.signatures += output.len();
                sink(&block, &output)?;
            }
            Err(e) => {
                warn!(block = %block, error = %e, "Failed to recluster block, skipping");
                summary.blocks_failed += 1;
            }
        }
        spinner.tick();
    }
    spinner.finish_and_clear();

    info!(
        blocks = summary.blocks_clustered,
        failed = summary.blocks_failed,
        "Work queue drained"
    );
    Ok(summary)
}
