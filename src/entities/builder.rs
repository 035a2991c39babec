// Entity builder — raw author/record pairs into Signatures and Publications.
//
// Missing or malformed optional data never fails construction: affiliation
// falls back to an empty string and an unparseable author reference simply
// means the signature is not curated.

use std::sync::Arc;

use serde_json::Value;

use super::models::{Publication, Signature};
use super::raw::{LiteratureRecord, RawAuthor};

/// Build the publication a record describes.
pub fn build_publication(record: &LiteratureRecord) -> Publication {
    Publication {
        publication_id: record.control_number,
        title: record
            .titles
            .first()
            .map(|t| t.title.clone())
            .unwrap_or_default(),
        abstract_text: record
            .abstracts
            .first()
            .map(|a| a.value.clone())
            .unwrap_or_default(),
        authors: record.author_names(),
        collaborations: record.collaborations.iter().map(|c| c.value.clone()).collect(),
        keywords: record.keywords.iter().map(|k| k.value.clone()).collect(),
        topics: record.inspire_categories.iter().map(|t| t.term.clone()).collect(),
    }
}

/// Build the signature for one author of a publication.
///
/// The publication is shared, so callers building every author of a record
/// should build the publication once and pass clones of the `Arc`.
pub fn build_signature(author: &RawAuthor, publication: Arc<Publication>) -> Signature {
    Signature {
        author_name: author.full_name.clone(),
        author_affiliation: author_affiliation(author),
        author_id: author_id(author),
        signature_block: author.signature_block.clone().unwrap_or_default(),
        signature_uuid: author.uuid.clone(),
        author_position: None,
        publication,
    }
}

/// Build signatures for every author on a record, in author order.
///
/// Each signature remembers its position in the author list, so repeated
/// printed names still get their own co-author window.
pub fn build_signatures(record: &LiteratureRecord) -> Vec<Signature> {
    let publication = Arc::new(build_publication(record));
    record
        .authors
        .iter()
        .enumerate()
        .map(|(position, author)| Signature {
            author_position: Some(position),
            ..build_signature(author, Arc::clone(&publication))
        })
        .collect()
}

/// First listed affiliation of an author, or an empty string.
pub fn author_affiliation(author: &RawAuthor) -> String {
    author
        .affiliations
        .first()
        .map(|a| a.value.clone())
        .unwrap_or_default()
}

/// Curated author id behind an author's record reference, if any.
pub fn author_id(author: &RawAuthor) -> Option<i64> {
    get_recid_from_ref(author.record.as_ref())
}

/// Extract the record id from a `{"$ref": "http://host/api/authors/<id>"}`
/// reference object.
///
/// Returns `None` for anything that is not an object, lacks `$ref`, or whose
/// trailing path segment is not an integer.
pub fn get_recid_from_ref(ref_obj: Option<&Value>) -> Option<i64> {
    let url = ref_obj?.as_object()?.get("$ref")?.as_str()?;
    url.rsplit('/').next()?.trim().parse().ok()
}
