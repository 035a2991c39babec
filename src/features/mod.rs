// Feature extraction — normalized text columns for the distance model.

pub mod extractors;
pub mod names;
