// Readers — turn index results into signatures.

use anyhow::Result;
use tracing::debug;

use super::traits::{LiteratureIndex, LiteratureQuery};
use crate::entities::builder::build_signatures;
use crate::entities::models::Signature;
use crate::entities::raw::LiteratureRecord;

/// Signatures from already-fetched records, filtered per author.
///
/// With a block, only authors in that block are kept. In curated-only mode
/// an author must have a curated relation *and* a resolvable author id.
pub fn signatures_from_records(
    records: &[LiteratureRecord],
    signature_block: Option<&str>,
    only_curated: bool,
) -> Vec<Signature> {
    let mut signatures = Vec::new();
    for record in records {
        for (author, signature) in record.authors.iter().zip(build_signatures(record)) {
            if only_curated && !author.curated_relation {
                continue;
            }
            if let Some(block) = signature_block {
                if author.signature_block.as_deref() != Some(block) {
                    continue;
                }
            }
            if only_curated && signature.author_id.is_none() {
                continue;
            }
            signatures.push(signature);
        }
    }
    signatures
}

/// Fetch records from the index and build the matching signatures.
pub async fn get_signatures(
    index: &dyn LiteratureIndex,
    signature_block: Option<&str>,
    only_curated: bool,
    max_size: Option<usize>,
) -> Result<Vec<Signature>> {
    let query = LiteratureQuery {
        signature_block: signature_block.map(str::to_string),
        only_curated,
        max_size,
    };
    let records = index.search(&query).await?;
    let signatures = signatures_from_records(&records, signature_block, only_curated);
    debug!(
        records = records.len(),
        signatures = signatures.len(),
        "Built signatures from index records"
    );
    Ok(signatures)
}
