// Estimators — trait-based abstraction over the learning backends.
//
// The traits describe what the pipeline needs from the ethnicity model,
// the distance model and the clusterer. NameMatchClusterer is the one
// implementation shipped here.

pub mod name_match;
pub mod traits;
