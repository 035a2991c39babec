// Clustering output reconciliation — flat labels back into author identities.
//
// The clusterer only hands back one opaque label per signature. Every
// signature sharing a label is given the list of curated author ids found
// anywhere in that label group, each paired with whether the signature
// itself was already claimed by a curator.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::entities::models::Signature;

/// Output key: the publication and the author occurrence on it.
pub type SignatureKey = (i64, String);

/// Candidate author id with the claim flag of the keyed signature.
pub type CandidateAuthor = (i64, bool);

/// Final mapping handed to the host system.
pub type ClusteringOutput = BTreeMap<SignatureKey, Vec<CandidateAuthor>>;

/// Reconcile clusterer labels with the signatures they were computed for.
///
/// `labels[i]` belongs to `signatures[i]`. Candidate lists are in the order
/// the author ids were first seen inside each label group.
pub fn reconcile<L>(labels: &[L], signatures: &[Signature]) -> Result<ClusteringOutput>
where
    L: Eq + Hash,
{
    if labels.len() != signatures.len() {
        anyhow::bail!(
            "Got {} cluster labels for {} signatures",
            labels.len(),
            signatures.len()
        );
    }

    let mut groups: Vec<Vec<&Signature>> = Vec::new();
    let mut group_by_label: HashMap<&L, usize> = HashMap::new();
    for (label, signature) in labels.iter().zip(signatures) {
        let group = *group_by_label.entry(label).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[group].push(signature);
    }

    let mut output = ClusteringOutput::new();
    for members in &groups {
        let mut candidates: Vec<i64> = Vec::new();
        for author_id in members.iter().filter_map(|s| s.author_id) {
            if !candidates.contains(&author_id) {
                candidates.push(author_id);
            }
        }

        for signature in members {
            let has_claims = signature.author_id.is_some();
            output.insert(
                (
                    signature.publication.publication_id,
                    signature.signature_uuid.clone(),
                ),
                candidates.iter().map(|&id| (id, has_claims)).collect(),
            );
        }
    }

    debug!(
        clusters = groups.len(),
        signatures = output.len(),
        "Reconciled clustering output"
    );

    Ok(output)
}

/// One entry of the clustering output in a serializable shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputEntry {
    pub publication_id: i64,
    pub signature_uuid: String,
    pub authors: Vec<OutputAuthor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputAuthor {
    pub author_id: i64,
    pub has_claims: bool,
}

/// Flatten the output into entries (JSON maps cannot use tuple keys).
pub fn to_entries(output: &ClusteringOutput) -> Vec<OutputEntry> {
    output
        .iter()
        .map(|((publication_id, signature_uuid), authors)| OutputEntry {
            publication_id: *publication_id,
            signature_uuid: signature_uuid.clone(),
            authors: authors
                .iter()
                .map(|&(author_id, has_claims)| OutputAuthor {
                    author_id,
                    has_claims,
                })
                .collect(),
        })
        .collect()
}
