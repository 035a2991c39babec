// Data models — the canonical entities that flow through the pipeline.
//
// These are separate from the raw record types so the rest of the crate
// never has to know how the document index shapes its JSON.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// One document, shared by all signatures that appear on it.
#[derive(Debug, Clone, Default, Eq, Serialize, Deserialize)]
pub struct Publication {
    pub publication_id: i64,
    pub title: String,
    pub abstract_text: String,
    /// Author names as printed, duplicates included
    pub authors: Vec<String>,
    /// Collaboration names in input order (order is ignored by equality)
    pub collaborations: Vec<String>,
    pub keywords: Vec<String>,
    pub topics: Vec<String>,
}

impl PartialEq for Publication {
    fn eq(&self, other: &Self) -> bool {
        let mut ours: Vec<&String> = self.collaborations.iter().collect();
        let mut theirs: Vec<&String> = other.collaborations.iter().collect();
        ours.sort();
        theirs.sort();

        self.publication_id == other.publication_id
            && self.title == other.title
            && self.abstract_text == other.abstract_text
            && self.authors == other.authors
            && ours == theirs
            && self.keywords == other.keywords
            && self.topics == other.topics
    }
}

/// One author appearing on one publication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    /// "Last, First Middle"
    pub author_name: String,
    /// First listed affiliation, or empty
    pub author_affiliation: String,
    /// Set only when a curator confirmed the identity
    pub author_id: Option<i64>,
    pub signature_block: String,
    pub signature_uuid: String,
    /// Index of this author in `publication.authors`, when built from a record
    #[serde(default)]
    pub author_position: Option<usize>,
    pub publication: Arc<Publication>,
}

impl Signature {
    /// A curated signature carries a human-confirmed author id.
    pub fn is_curated(&self) -> bool {
        self.author_id.is_some()
    }
}

/// A seed grouping of signatures, one per known author plus one singleton
/// per unclaimed signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputCluster {
    pub author_id: Option<i64>,
    pub cluster_id: usize,
    pub signature_uuids: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publication_equality_ignores_collaboration_order() {
        let a = Publication {
            publication_id: 1,
            collaborations: vec!["ATLAS".to_string(), "CMS".to_string()],
            ..Default::default()
        };
        let b = Publication {
            publication_id: 1,
            collaborations: vec!["CMS".to_string(), "ATLAS".to_string()],
            ..Default::default()
        };
        assert_eq!(a, b);
    }

    #[test]
    fn publication_equality_checks_collaboration_multiset() {
        let a = Publication {
            collaborations: vec!["ATLAS".to_string(), "ATLAS".to_string()],
            ..Default::default()
        };
        let b = Publication {
            collaborations: vec!["ATLAS".to_string(), "CMS".to_string()],
            ..Default::default()
        };
        assert_ne!(a, b);
    }
}
