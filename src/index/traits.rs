// LiteratureIndex trait — backend-agnostic async access to literature records.
//
// Implementations may be a search cluster or a local file. Methods are async
// because real backends are network services.

use anyhow::Result;
use async_trait::async_trait;

use crate::entities::raw::LiteratureRecord;

/// What to fetch from the index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LiteratureQuery {
    /// Only records with at least one author in this block
    pub signature_block: Option<String>,
    /// Only records with at least one curated author
    pub only_curated: bool,
    /// Upper bound on the number of records returned, if any
    pub max_size: Option<usize>,
}

impl LiteratureQuery {
    pub fn for_block(signature_block: impl Into<String>) -> Self {
        Self {
            signature_block: Some(signature_block.into()),
            ..Default::default()
        }
    }

    pub fn curated() -> Self {
        Self {
            only_curated: true,
            ..Default::default()
        }
    }

    /// Whether a record satisfies the query's author-level filters.
    ///
    /// Both filters must hold for the same author, mirroring a nested query.
    pub fn matches(&self, record: &LiteratureRecord) -> bool {
        record.authors.iter().any(|author| {
            let block_ok = match &self.signature_block {
                Some(block) => author.signature_block.as_deref() == Some(block.as_str()),
                None => true,
            };
            block_ok && (!self.only_curated || author.curated_relation)
        })
    }
}

#[async_trait]
pub trait LiteratureIndex: Send + Sync {
    /// Fetch every record matching the query.
    async fn search(&self, query: &LiteratureQuery) -> Result<Vec<LiteratureRecord>>;
}
