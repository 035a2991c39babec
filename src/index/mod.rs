// Document index — where literature records come from.
//
// The search backend itself is an external collaborator. The core only
// describes what it needs (LiteratureQuery) and how records become
// signatures (readers). JsonlIndex serves records from a local export.

pub mod jsonl;
pub mod readers;
pub mod traits;
