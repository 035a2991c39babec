// Pipelines — the core stages wired to their collaborators.

pub mod cluster;
pub mod recluster;
pub mod train;
