// Disambig: author disambiguation for bibliographic records
//
// This is the library root. Each module corresponds to a stage of the
// disambiguation pipeline or to one of the collaborators it talks to.

pub mod clusters;
pub mod config;
pub mod entities;
pub mod estimators;
pub mod features;
pub mod index;
pub mod output;
pub mod pipeline;
pub mod queue;
pub mod reconcile;
pub mod sampling;
