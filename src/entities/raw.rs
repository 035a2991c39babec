// Raw literature records as returned by the document index.
//
// Only the fields the disambiguation core needs are modelled. Every field
// except the control number is optional in the source data, so a missing
// field and an explicit `null` both default to empty rather than failing
// deserialization.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Deserialize `null` as the type's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One literature record (a document) with its nested author entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LiteratureRecord {
    /// Primary numeric identifier of the record
    pub control_number: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub titles: Vec<TitleEntry>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub abstracts: Vec<ValueEntry>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub authors: Vec<RawAuthor>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub collaborations: Vec<ValueEntry>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub keywords: Vec<ValueEntry>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub inspire_categories: Vec<TermEntry>,
}

/// One author entry nested inside a literature record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawAuthor {
    #[serde(default, deserialize_with = "null_as_default")]
    pub full_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub affiliations: Vec<ValueEntry>,
    /// Whether a curator confirmed the link in `record`
    #[serde(default, deserialize_with = "null_as_default")]
    pub curated_relation: bool,
    /// Record-linking reference, normally `{"$ref": ".../authors/<id>"}`.
    /// Kept as raw JSON because malformed references are common.
    #[serde(default)]
    pub record: Option<Value>,
    #[serde(default)]
    pub signature_block: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub uuid: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValueEntry {
    #[serde(default, deserialize_with = "null_as_default")]
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TitleEntry {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TermEntry {
    #[serde(default, deserialize_with = "null_as_default")]
    pub term: String,
}

impl LiteratureRecord {
    /// Full names of all authors, in record order.
    pub fn author_names(&self) -> Vec<String> {
        self.authors.iter().map(|a| a.full_name.clone()).collect()
    }
}
