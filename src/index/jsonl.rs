// JsonlIndex — literature records served from a JSON-lines export.
//
// One record per line. Blank lines are skipped; a malformed line is an
// error naming the line number, since a partial corpus would silently
// skew training.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::info;

use super::traits::{LiteratureIndex, LiteratureQuery};
use crate::entities::raw::LiteratureRecord;

pub struct JsonlIndex {
    path: PathBuf,
}

impl JsonlIndex {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

/// Parse JSON-lines text into records.
pub fn parse_records(text: &str) -> Result<Vec<LiteratureRecord>> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line)
                .with_context(|| format!("Malformed literature record on line {}", i + 1))
        })
        .collect()
}

#[async_trait]
impl LiteratureIndex for JsonlIndex {
    async fn search(&self, query: &LiteratureQuery) -> Result<Vec<LiteratureRecord>> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read records from {}", self.path.display()))?;

        let mut records: Vec<LiteratureRecord> = parse_records(&text)?
            .into_iter()
            .filter(|record| query.matches(record))
            .collect();
        if let Some(max_size) = query.max_size {
            records.truncate(max_size);
        }

        info!(
            path = %self.path.display(),
            records = records.len(),
            block = query.signature_block.as_deref().unwrap_or("*"),
            only_curated = query.only_curated,
            "Loaded literature records"
        );
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_skips_blank_lines() {
        let text = "{\"control_number\": 1}\n\n{\"control_number\": 2}\n";
        let records = parse_records(text).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].control_number, 2);
    }

    #[test]
    fn test_parse_reports_line_number() {
        let text = "{\"control_number\": 1}\nnot json\n";
        let err = parse_records(text).unwrap_err();
        assert!(err.to_string().contains("line 2"), "got: {err}");
    }
}
