// Composition tests — verifying that the pipeline stages chain together.
//
// These tests exercise the data flow between modules:
//   JSON-lines index -> Signatures -> Input clusters -> Clusterer -> Reconcile
//   JSON-lines index -> Curated signatures -> Pair sampler -> Distance model
// against the fixture corpus in tests/data/records.jsonl. Estimators are
// in-test stubs; filesystem side effects go to temp directories.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use disambig::clusters::build_input_clusters;
use disambig::config::Config;
use disambig::entities::models::Signature;
use disambig::entities::raw::LiteratureRecord;
use disambig::estimators::name_match::{MatchKey, NameMatchClusterer};
use disambig::estimators::traits::{Clusterer, DistanceEstimator, EthnicityEstimator};
use disambig::features::extractors::FeatureRow;
use disambig::index::jsonl::JsonlIndex;
use disambig::index::readers::get_signatures;
use disambig::index::traits::{LiteratureIndex, LiteratureQuery};
use disambig::pipeline;
use disambig::queue::InMemoryQueue;
use disambig::reconcile::ClusteringOutput;
use disambig::sampling::SampledPair;

fn records_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/data/records.jsonl")
}

fn fixture_index() -> JsonlIndex {
    JsonlIndex::new(records_path())
}

fn key(publication_id: i64, uuid: &str) -> (i64, String) {
    (publication_id, uuid.to_string())
}

// ============================================================
// Index -> Signatures
// ============================================================

#[tokio::test]
async fn block_query_returns_only_block_signatures() {
    let signatures = get_signatures(&fixture_index(), Some("Sm"), false, None)
        .await
        .unwrap();
    let uuids: Vec<&str> = signatures.iter().map(|s| s.signature_uuid.as_str()).collect();
    assert_eq!(uuids, vec!["s1", "s2", "s3", "s4", "s5"]);
}

#[tokio::test]
async fn curated_query_requires_relation_and_author_id() {
    let signatures = get_signatures(&fixture_index(), None, true, None).await.unwrap();
    let uuids: Vec<&str> = signatures.iter().map(|s| s.signature_uuid.as_str()).collect();

    assert_eq!(signatures.len(), 11);
    assert!(!uuids.contains(&"s3"));
    assert!(!uuids.contains(&"d6"));
    assert!(!uuids.contains(&"r1"));
    assert!(signatures.iter().all(|s| s.author_id.is_some()));
}

#[tokio::test]
async fn max_size_caps_fetched_records() {
    let signatures = get_signatures(&fixture_index(), Some("Dj"), false, Some(2))
        .await
        .unwrap();
    let uuids: Vec<&str> = signatures.iter().map(|s| s.signature_uuid.as_str()).collect();
    assert_eq!(uuids, vec!["d1", "d2"]);
}

#[tokio::test]
async fn feature_rows_for_a_block() {
    let signatures = get_signatures(&fixture_index(), Some("Dj"), false, None)
        .await
        .unwrap();
    let rows: Vec<FeatureRow> = signatures
        .iter()
        .map(|s| FeatureRow::from_signature(s, 10))
        .collect();

    assert_eq!(rows[0].full_name, "doe john");
    assert_eq!(rows[0].affiliation, "cern");
    assert_eq!(rows[0].coauthors, "Smith, Anna");
    assert_eq!(rows[0].collaborations, "ATLAS");
    assert_eq!(rows[0].title, "Paper 101");
}

// ============================================================
// Signatures -> Input clusters -> Clusterer -> Reconcile
// ============================================================

#[tokio::test]
async fn cluster_block_resolves_unclaimed_signature() {
    let signatures = get_signatures(&fixture_index(), Some("Sm"), false, None)
        .await
        .unwrap();
    let input_clusters = build_input_clusters(&signatures);
    assert_eq!(input_clusters.len(), 3);

    let mut clusterer = NameMatchClusterer::new(MatchKey::FullName);
    let output = pipeline::cluster::cluster(&mut clusterer, signatures, input_clusters, 1).unwrap();

    let mut expected = ClusteringOutput::new();
    expected.insert(key(101, "s1"), vec![(2001, true)]);
    expected.insert(key(102, "s2"), vec![(2002, true)]);
    expected.insert(key(103, "s3"), vec![(2001, false)]);
    expected.insert(key(104, "s4"), vec![(2001, true)]);
    expected.insert(key(106, "s5"), vec![(2002, true)]);
    assert_eq!(output, expected);
}

#[tokio::test]
async fn unmatched_signature_stays_unresolved() {
    let signatures = get_signatures(&fixture_index(), Some("Rr"), false, None)
        .await
        .unwrap();
    let input_clusters = build_input_clusters(&signatures);

    let mut clusterer = NameMatchClusterer::new(MatchKey::SurnameInitial);
    let output = pipeline::cluster::cluster(&mut clusterer, signatures, input_clusters, 1).unwrap();

    assert_eq!(output.len(), 1);
    assert!(output[&key(107, "r1")].is_empty());
}

#[test]
fn clusterer_model_round_trips_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clustering.json");

    NameMatchClusterer::new(MatchKey::SurnameInitial)
        .save_model(&path)
        .unwrap();
    let mut restored = NameMatchClusterer::default();
    restored.load_model(&path).unwrap();
    assert_eq!(restored.model.match_key, MatchKey::SurnameInitial);
}

// ============================================================
// Work queue -> Recluster
// ============================================================

/// Fails every query for the "bad" block, delegating the rest.
struct FlakyIndex(JsonlIndex);

#[async_trait]
impl LiteratureIndex for FlakyIndex {
    async fn search(&self, query: &LiteratureQuery) -> Result<Vec<LiteratureRecord>> {
        if query.signature_block.as_deref() == Some("bad") {
            anyhow::bail!("index unavailable");
        }
        self.0.search(query).await
    }
}

fn test_config() -> Config {
    let mut config = Config::with_base_path(PathBuf::from("unused"));
    config.records_path = records_path();
    config.queue_timeout = Duration::from_millis(50);
    config.clustering_n_jobs = 1;
    config
}

#[tokio::test]
async fn recluster_drains_queue_and_skips_failed_blocks() {
    let queue = InMemoryQueue::new();
    queue.push("Sm", 0).await;
    queue.push("bad", 1).await;
    queue.push("Dj", 2).await;

    let index = FlakyIndex(fixture_index());
    let mut clusterer = NameMatchClusterer::new(MatchKey::FullName);
    let mut seen: Vec<(String, usize)> = Vec::new();

    let summary = pipeline::recluster::run(&queue, &index, &mut clusterer, &test_config(), |block, output| {
        seen.push((block.to_string(), output.len()));
        Ok(())
    })
    .await
    .unwrap();

    assert_eq!(seen, vec![("Sm".to_string(), 5), ("Dj".to_string(), 8)]);
    assert_eq!(summary.blocks_clustered, 2);
    assert_eq!(summary.blocks_failed, 1);
    assert_eq!(summary.signatures, 13);
    assert!(queue.is_empty().await);
}

#[tokio::test]
async fn recluster_on_empty_queue_does_nothing() {
    let queue = InMemoryQueue::new();
    let mut clusterer = NameMatchClusterer::default();
    let summary = pipeline::recluster::run(&queue, &fixture_index(), &mut clusterer, &test_config(), |_, _| {
        panic!("sink must not be called");
    })
    .await
    .unwrap();
    assert_eq!(summary.blocks_clustered, 0);
}

// ============================================================
// Curated signatures -> Pair sampler -> Distance model
// ============================================================

#[derive(Default)]
struct StubEthnicity {
    calls: Vec<String>,
}

impl EthnicityEstimator for StubEthnicity {
    fn load_data(&mut self, path: &Path) -> Result<()> {
        self.calls.push(format!("load_data {}", path.display()));
        Ok(())
    }

    fn fit(&mut self) -> Result<()> {
        self.calls.push("fit".to_string());
        Ok(())
    }

    fn predict(&self, names: &[String]) -> Result<Vec<Vec<f64>>> {
        Ok(names.iter().map(|_| vec![1.0]).collect())
    }

    fn save_model(&self, path: &Path) -> Result<()> {
        std::fs::write(path, "ethnicity")?;
        Ok(())
    }

    fn load_model(&mut self, path: &Path) -> Result<()> {
        self.calls.push(format!("load_model {}", path.display()));
        Ok(())
    }
}

#[derive(Default)]
struct StubDistance {
    signatures: usize,
    pairs: usize,
    same_author_pairs: usize,
    fitted: bool,
}

impl DistanceEstimator for StubDistance {
    fn load_data(
        &mut self,
        ethnicity: &dyn EthnicityEstimator,
        signatures: &[Signature],
        pairs: &[SampledPair<'_>],
    ) -> Result<()> {
        let names: Vec<String> = signatures.iter().map(|s| s.author_name.clone()).collect();
        assert_eq!(ethnicity.predict(&names)?.len(), signatures.len());
        self.signatures = signatures.len();
        self.pairs = pairs.len();
        self.same_author_pairs = pairs.iter().filter(|p| p.same_author).count();
        Ok(())
    }

    fn fit(&mut self) -> Result<()> {
        self.fitted = true;
        Ok(())
    }

    fn distance(&self, a: &Signature, b: &Signature) -> Result<f64> {
        Ok(if a.author_id == b.author_id { 0.0 } else { 1.0 })
    }

    fn save_model(&self, path: &Path) -> Result<()> {
        std::fs::write(path, format!("{} pairs", self.pairs))?;
        Ok(())
    }

    fn load_model(&mut self, _path: &Path) -> Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn train_distance_model_on_fixture_corpus() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::with_base_path(dir.path().to_path_buf());
    config.records_path = records_path();
    config.sampled_pairs_size = 12;
    config.sampling_seed = Some(99);

    let mut ethnicity = StubEthnicity::default();
    let mut distance = StubDistance::default();
    let report = pipeline::train::train_distance_model(
        &fixture_index(),
        &mut ethnicity,
        &mut distance,
        &config,
    )
    .await
    .unwrap();

    assert_eq!(report.produced, 10);
    assert_eq!(report.shortfall(), 2);
    assert_eq!(distance.signatures, 11);
    assert_eq!(distance.pairs, 10);
    assert_eq!(distance.same_author_pairs, 4);
    assert!(distance.fitted);
    assert_eq!(
        ethnicity.calls,
        vec![format!("load_model {}", config.ethnicity_model_path.display())]
    );
    let saved = std::fs::read_to_string(&config.distance_model_path).unwrap();
    assert_eq!(saved, "10 pairs");
}

#[tokio::test]
async fn train_distance_model_rejects_bad_pairs_size() {
    let mut config = test_config();
    config.sampled_pairs_size = 13;

    let mut ethnicity = StubEthnicity::default();
    let mut distance = StubDistance::default();
    let result = pipeline::train::train_distance_model(
        &fixture_index(),
        &mut ethnicity,
        &mut distance,
        &config,
    )
    .await;

    assert!(result.is_err());
    assert!(ethnicity.calls.is_empty());
    assert!(!distance.fitted);
}

#[test]
fn train_ethnicity_model_uses_configured_paths() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::with_base_path(dir.path().to_path_buf());

    let mut ethnicity = StubEthnicity::default();
    pipeline::train::train_ethnicity_model(&mut ethnicity, &config).unwrap();

    assert_eq!(
        ethnicity.calls,
        vec![
            format!("load_data {}", config.ethnicity_data_path.display()),
            "fit".to_string()
        ]
    );
    assert_eq!(
        std::fs::read_to_string(&config.ethnicity_model_path).unwrap(),
        "ethnicity"
    );
}
