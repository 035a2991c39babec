use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use serde::Serialize;
use tracing::info;

use disambig::clusters::build_input_clusters;
use disambig::config::Config;
use disambig::estimators::name_match::{MatchKey, NameMatchClusterer};
use disambig::estimators::traits::Clusterer;
use disambig::features::extractors::FeatureRow;
use disambig::index::jsonl::JsonlIndex;
use disambig::index::readers::get_signatures;
use disambig::output::terminal;
use disambig::pipeline;
use disambig::queue::InMemoryQueue;
use disambig::reconcile::to_entries;
use disambig::sampling::{sample_pairs, NameCategory, SamplingOptions};

/// Disambig: decide which author signatures belong to the same person.
///
/// Reads literature records from a JSON-lines export (DISAMBIGUATION_RECORDS_PATH
/// or --records) and runs the disambiguation stages on them.
#[derive(Parser)]
#[command(name = "disambig", version, about)]
struct Cli {
    /// JSON-lines file of literature records (overrides DISAMBIGUATION_RECORDS_PATH)
    #[arg(long, global = true)]
    records: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build input clusters from curated author links
    InputClusters {
        /// Restrict to one signature block
        #[arg(long)]
        block: Option<String>,

        /// Only use curated signatures
        #[arg(long)]
        curated: bool,

        /// Write clusters as JSON lines to this file instead of a summary
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Sample balanced signature pairs for distance-model training
    SamplePairs {
        /// Number of pairs (multiple of 12; defaults to DISAMBIGUATION_SAMPLED_PAIRS_SIZE)
        #[arg(long)]
        size: Option<usize>,

        /// Seed for reproducible sampling
        #[arg(long)]
        seed: Option<u64>,

        /// Write pairs as JSON lines to this file (default: stdout)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Export ML feature rows for the signatures of a block
    Features {
        #[arg(long)]
        block: String,

        /// Write rows as JSON lines to this file (default: stdout)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Cluster one signature block and show candidate authors
    Cluster {
        #[arg(long)]
        block: String,

        /// Name key used to match unclaimed signatures
        #[arg(long, value_enum, default_value = "full-name")]
        match_key: MatchKeyArg,

        /// Print the output as JSON lines instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Recluster a list of signature blocks through the work queue
    Recluster {
        /// Blocks to enqueue, highest priority first
        #[arg(required = true)]
        blocks: Vec<String>,

        #[arg(long, value_enum, default_value = "full-name")]
        match_key: MatchKeyArg,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum MatchKeyArg {
    FullName,
    SurnameInitial,
}

impl From<MatchKeyArg> for MatchKey {
    fn from(arg: MatchKeyArg) -> Self {
        match arg {
            MatchKeyArg::FullName => MatchKey::FullName,
            MatchKeyArg::SurnameInitial => MatchKey::SurnameInitial,
        }
    }
}

/// One sampled pair as written to disk.
#[derive(Serialize)]
struct PairRow<'a> {
    signature_a: &'a str,
    signature_b: &'a str,
    same_author: bool,
    category: NameCategory,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let mut config = Config::load()?;
    if let Some(records) = cli.records {
        config.records_path = records;
    }

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(format!("disambig={}", config.log_level))
            }),
        )
        .init();

    let index = JsonlIndex::new(&config.records_path);

    match cli.command {
        Commands::InputClusters {
            block,
            curated,
            output,
        } => {
            let signatures =
                get_signatures(&index, block.as_deref(), curated, config.max_query_size).await?;
            let clusters = build_input_clusters(&signatures);
            match output {
                Some(path) => {
                    write_jsonl(Some(&path), &clusters)?;
                    println!("Wrote {} input clusters to {}", clusters.len(), path.display());
                }
                None => terminal::display_input_clusters(&clusters),
            }
        }

        Commands::SamplePairs { size, seed, output } => {
            if let Some(size) = size {
                config.sampled_pairs_size = size;
            }
            if seed.is_some() {
                config.sampling_seed = seed;
            }
            config.require_pairs_size()?;

            let curated = get_signatures(&index, None, true, config.max_query_size).await?;
            let clusters = build_input_clusters(&curated);
            let options = SamplingOptions {
                seed: config.sampling_seed,
                max_attempts: config.sampling_max_attempts,
            };
            let mut sampler = sample_pairs(&curated, &clusters, config.sampled_pairs_size, options)?;
            let rows: Vec<PairRow<'_>> = sampler
                .by_ref()
                .map(|pair| PairRow {
                    signature_a: &pair.signature_a.signature_uuid,
                    signature_b: &pair.signature_b.signature_uuid,
                    same_author: pair.same_author,
                    category: pair.category,
                })
                .collect();
            write_jsonl(output.as_deref(), &rows)?;

            // Keep stdout clean for the pairs when they go there.
            if output.is_some() {
                terminal::display_sampling_report(&sampler.report());
            } else {
                info!(produced = rows.len(), "Pairs written to stdout");
            }
        }

        Commands::Features { block, output } => {
            let signatures =
                get_signatures(&index, Some(&block), false, config.max_query_size).await?;
            let rows: Vec<FeatureRow> = signatures
                .iter()
                .map(|s| FeatureRow::from_signature(s, config.coauthor_radius))
                .collect();
            write_jsonl(output.as_deref(), &rows)?;
        }

        Commands::Cluster {
            block,
            match_key,
            json,
        } => {
            let mut clusterer = create_clusterer(&config, match_key.into())?;
            let signatures =
                get_signatures(&index, Some(&block), false, config.max_query_size).await?;
            let input_clusters = build_input_clusters(&signatures);
            let output = pipeline::cluster::cluster(
                &mut clusterer,
                signatures,
                input_clusters,
                config.clustering_n_jobs,
            )?;

            if json {
                write_jsonl(None, &to_entries(&output))?;
            } else {
                terminal::display_clustering_output(&block, &output);
            }
        }

        Commands::Recluster { blocks, match_key } => {
            let mut clusterer = create_clusterer(&config, match_key.into())?;
            let queue = InMemoryQueue::new();
            for (priority, block) in blocks.iter().enumerate() {
                queue.push(block.clone(), priority as i64).await;
            }

            println!("Reclustering {} blocks...", blocks.len());
            let summary = pipeline::recluster::run(&queue, &index, &mut clusterer, &config, |block, output| {
                terminal::display_clustering_output(block, output);
                Ok(())
            })
            .await?;

            println!("\n{}", "Reclustering complete.".bold());
            println!("  Blocks clustered: {}", summary.blocks_clustered);
            println!("  Signatures: {}", summary.signatures);
            if summary.blocks_failed > 0 {
                println!("  {} {} blocks failed", "Warning:".yellow(), summary.blocks_failed);
            }
        }
    }

    Ok(())
}

/// Build the clusterer, restoring saved settings when a model file exists.
fn create_clusterer(config: &Config, match_key: MatchKey) -> Result<NameMatchClusterer> {
    let mut clusterer = NameMatchClusterer::new(match_key);
    if config.clustering_model_path.exists() {
        clusterer.load_model(&config.clustering_model_path)?;
        info!(
            model = %config.clustering_model_path.display(),
            "Loaded clustering model"
        );
    }
    Ok(clusterer)
}

/// Write rows as JSON lines to a file, or stdout when no path is given.
fn write_jsonl<T: Serialize>(path: Option<&Path>, rows: &[T]) -> Result<()> {
    let mut writer: Box<dyn Write> = match path {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    for row in rows {
        serde_json::to_writer(&mut writer, row)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}
