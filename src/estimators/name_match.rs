// NameMatchClusterer — a deterministic clusterer with no learned weights.
//
// Claimed signatures keep their curated grouping. An unclaimed signature
// joins the first claimed cluster that has a member with the same match
// key; otherwise it groups with other unclaimed signatures sharing its key.
// Useful as a baseline and as a reproducible stand-in for the learned
// clusterer.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::traits::Clusterer;
use crate::entities::models::{InputCluster, Signature};
use crate::features::extractors::{author_full_name, first_initial};
use crate::features::names::normalized_surname;

/// Which part of a name two signatures must share to be matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKey {
    /// Normalized full name ("seiberg nana")
    #[default]
    FullName,
    /// Normalized surname plus first initial ("seiberg n")
    SurnameInitial,
}

impl MatchKey {
    fn key_for(&self, signature: &Signature) -> String {
        match self {
            MatchKey::FullName => author_full_name(signature),
            MatchKey::SurnameInitial => format!(
                "{} {}",
                normalized_surname(&signature.author_name),
                first_initial(signature)
            ),
        }
    }
}

/// Persisted settings of the clusterer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameMatchModel {
    pub match_key: MatchKey,
}

#[derive(Debug, Default)]
pub struct NameMatchClusterer {
    pub model: NameMatchModel,
    signatures: Vec<Signature>,
    input_clusters: Vec<InputCluster>,
    labels: Option<Vec<i64>>,
}

impl NameMatchClusterer {
    pub fn new(match_key: MatchKey) -> Self {
        Self {
            model: NameMatchModel { match_key },
            ..Default::default()
        }
    }
}

impl Clusterer for NameMatchClusterer {
    fn load_data(&mut self, signatures: Vec<Signature>, input_clusters: Vec<InputCluster>) -> Result<()> {
        self.signatures = signatures;
        self.input_clusters = input_clusters;
        self.labels = None;
        Ok(())
    }

    fn fit(&mut self, n_jobs: usize) -> Result<()> {
        debug!(n_jobs, "NameMatchClusterer runs single-threaded");

        // Claimed input clusters own their label; remember which keys they cover.
        let mut label_by_uuid: HashMap<&str, i64> = HashMap::new();
        let mut label_by_key: HashMap<String, i64> = HashMap::new();
        let mut next_label: i64 = 0;

        let by_uuid: HashMap<&str, &Signature> = self
            .signatures
            .iter()
            .map(|s| (s.signature_uuid.as_str(), s))
            .collect();

        for cluster in self.input_clusters.iter().filter(|c| c.author_id.is_some()) {
            let label = next_label;
            next_label += 1;
            for uuid in &cluster.signature_uuids {
                label_by_uuid.insert(uuid.as_str(), label);
                if let Some(signature) = by_uuid.get(uuid.as_str()) {
                    label_by_key
                        .entry(self.model.match_key.key_for(signature))
                        .or_insert(label);
                }
            }
        }

        let mut labels = Vec::with_capacity(self.signatures.len());
        for signature in &self.signatures {
            let label = match label_by_uuid.get(signature.signature_uuid.as_str()) {
                Some(&label) => label,
                None => *label_by_key
                    .entry(self.model.match_key.key_for(signature))
                    .or_insert_with(|| {
                        next_label += 1;
                        next_label - 1
                    }),
            };
            labels.push(label);
        }

        info!(
            signatures = labels.len(),
            clusters = next_label,
            "Name-match clustering finished"
        );
        self.labels = Some(labels);
        Ok(())
    }

    fn labels(&self) -> Result<&[i64]> {
        self.labels
            .as_deref()
            .context("Clusterer has not been fitted yet")
    }

    fn signatures(&self) -> &[Signature] {
        &self.signatures
    }

    fn save_model(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.model)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write clustering model to {}", path.display()))
    }

    fn load_model(&mut self, path: &Path) -> Result<()> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read clustering model from {}", path.display()))?;
        self.model = serde_json::from_str(&json)
            .with_context(|| format!("Malformed clustering model in {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_before_fit_fail() {
        let clusterer = NameMatchClusterer::default();
        assert!(clusterer.labels().is_err());
    }
}
