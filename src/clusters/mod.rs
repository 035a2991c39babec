// Input clusters — seed groupings derived from curated author links.
//
// Signatures with an author id are grouped by that id (first-seen order);
// every signature without one becomes its own singleton cluster. Cluster ids
// are assigned 0, 1, 2, ... across both groups with no gaps.

use std::collections::HashMap;

use tracing::debug;

use crate::entities::models::{InputCluster, Signature};

/// Build the input clusters for a collection of signatures.
pub fn build_input_clusters(signatures: &[Signature]) -> Vec<InputCluster> {
    let mut claimed: Vec<(i64, Vec<String>)> = Vec::new();
    let mut position_by_author: HashMap<i64, usize> = HashMap::new();
    let mut unclaimed: Vec<String> = Vec::new();

    for signature in signatures {
        match signature.author_id {
            Some(author_id) => {
                let position = *position_by_author.entry(author_id).or_insert_with(|| {
                    claimed.push((author_id, Vec::new()));
                    claimed.len() - 1
                });
                claimed[position].1.push(signature.signature_uuid.clone());
            }
            None => unclaimed.push(signature.signature_uuid.clone()),
        }
    }

    debug!(
        authors = claimed.len(),
        unclaimed = unclaimed.len(),
        "Building input clusters"
    );

    let claimed_clusters = claimed
        .into_iter()
        .map(|(author_id, uuids)| (Some(author_id), uuids));
    let singleton_clusters = unclaimed.into_iter().map(|uuid| (None, vec![uuid]));

    claimed_clusters
        .chain(singleton_clusters)
        .enumerate()
        .map(|(cluster_id, (author_id, signature_uuids))| InputCluster {
            author_id,
            cluster_id,
            signature_uuids,
        })
        .collect()
}
