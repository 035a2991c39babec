// Feature extractors — pure functions from a Signature to ML input columns.
//
// The exact normalization here is a compatibility contract: models trained
// on one version of these rules are only valid against the same rules.
// Absent data always maps to an empty string, never an error.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::names::{normalize_name, split_name};
use crate::entities::models::Signature;

/// Default number of co-authors taken on each side of the signature's own
/// position when building the co-author neighborhood.
pub const DEFAULT_COAUTHOR_RADIUS: usize = 10;

/// Normalized full name, surname first ("seiberg nana").
pub fn author_full_name(signature: &Signature) -> String {
    normalize_name(&signature.author_name)
}

/// Given-name token at `position`. A name without a comma has none.
fn given_name(signature: &Signature, position: usize) -> &str {
    if !signature.author_name.contains(',') {
        return "";
    }
    split_name(&signature.author_name)
        .given
        .get(position)
        .copied()
        .unwrap_or("")
}

fn initial(signature: &Signature, position: usize) -> String {
    given_name(signature, position)
        .chars()
        .next()
        .map(|c| c.to_lowercase().collect())
        .unwrap_or_default()
}

pub fn first_initial(signature: &Signature) -> String {
    initial(signature, 0)
}

pub fn second_initial(signature: &Signature) -> String {
    initial(signature, 1)
}

/// First given name exactly as written.
pub fn first_given_name(signature: &Signature) -> String {
    given_name(signature, 0).to_string()
}

/// Second given name exactly as written.
pub fn second_given_name(signature: &Signature) -> String {
    given_name(signature, 1).to_string()
}

/// Normalized given-name part of a "Last, First Middle" name.
///
/// Empty when the name has no comma.
pub fn author_other_names(signature: &Signature) -> String {
    match signature.author_name.split_once(',') {
        Some((_, other)) => normalize_name(other),
        None => String::new(),
    }
}

/// Affiliation comparison key ("Rutgers U., Piscataway" -> "rutgersu piscataway").
pub fn author_affiliation(signature: &Signature) -> String {
    normalize_name(&signature.author_affiliation)
}

/// Co-authors around the signature's own position in the author list.
///
/// The position recorded at build time is used when it still points at the
/// signature's name; otherwise the first occurrence of the name is. The
/// signature's own occurrence is excluded; other duplicates are kept.
/// If the name is not found in the list, every listed author is returned.
pub fn coauthors(signature: &Signature, radius: usize) -> Vec<String> {
    let authors = &signature.publication.authors;
    let recorded = signature
        .author_position
        .filter(|&p| authors.get(p) == Some(&signature.author_name));
    let center = recorded.or_else(|| authors.iter().position(|a| *a == signature.author_name));
    match center {
        Some(center) => {
            let start = center.saturating_sub(radius);
            let end = (center + radius + 1).min(authors.len());
            (start..end)
                .filter(|&i| i != center)
                .map(|i| authors[i].clone())
                .collect()
        }
        None => authors.clone(),
    }
}

/// Space-joined co-author neighborhood with the default radius.
pub fn coauthors_neighborhood(signature: &Signature) -> String {
    coauthors(signature, DEFAULT_COAUTHOR_RADIUS).join(" ")
}

pub fn abstract_text(signature: &Signature) -> String {
    signature.publication.abstract_text.clone()
}

pub fn title(signature: &Signature) -> String {
    signature.publication.title.clone()
}

pub fn keywords(signature: &Signature) -> String {
    signature.publication.keywords.join(" ")
}

pub fn collaborations(signature: &Signature) -> String {
    signature.publication.collaborations.join(" ")
}

pub fn topics(signature: &Signature) -> String {
    signature.publication.topics.join(" ")
}

/// Grouping key for a block of signatures: the uuid of the first one.
pub fn group_by_signature(signatures: &[Signature]) -> Option<&str> {
    signatures.first().map(|s| s.signature_uuid.as_str())
}

/// Index signatures by uuid. A repeated uuid keeps the last signature seen.
pub fn load_signatures<I>(signatures: I) -> HashMap<String, Signature>
where
    I: IntoIterator<Item = Signature>,
{
    signatures
        .into_iter()
        .map(|s| (s.signature_uuid.clone(), s))
        .collect()
}

/// Every feature column for one signature, ready to be written out as a row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub signature_uuid: String,
    pub publication_id: i64,
    pub full_name: String,
    pub first_initial: String,
    pub second_initial: String,
    pub first_given_name: String,
    pub second_given_name: String,
    pub other_names: String,
    pub affiliation: String,
    pub coauthors: String,
    pub abstract_text: String,
    pub title: String,
    pub keywords: String,
    pub collaborations: String,
    pub topics: String,
}

impl FeatureRow {
    pub fn from_signature(signature: &Signature, coauthor_radius: usize) -> Self {
        Self {
            signature_uuid: signature.signature_uuid.clone(),
            publication_id: signature.publication.publication_id,
            full_name: author_full_name(signature),
            first_initial: first_initial(signature),
            second_initial: second_initial(signature),
            first_given_name: first_given_name(signature),
            second_given_name: second_given_name(signature),
            other_names: author_other_names(signature),
            affiliation: author_affiliation(signature),
            coauthors: coauthors(signature, coauthor_radius).join(" "),
            abstract_text: abstract_text(signature),
            title: title(signature),
            keywords: keywords(signature),
            collaborations: collaborations(signature),
            topics: topics(signature),
        }
    }
}
