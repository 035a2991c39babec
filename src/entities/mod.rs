// Entities — signatures, publications and the raw records they come from.
//
// A raw literature record carries a list of authors. Every author on every
// record becomes one Signature pointing at the shared Publication.

pub mod builder;
pub mod models;
pub mod raw;
