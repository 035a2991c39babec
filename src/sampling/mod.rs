// Pair sampling — a class-balanced training set for the distance model.
//
// Training on every pair of curated signatures is quadratic and heavily
// skewed towards easy negatives (different people with different names).
// Instead pairs are drawn in rounds of 12: six same-author and six
// different-author pairs, each half split evenly across three name
// categories (identical name, same surname, different surname).

pub mod pairs;

pub use pairs::{sample_pairs, NameCategory, PairSampler, SampledPair, SamplingOptions, SamplingReport};

/// Number of pairs drawn per balanced sampling round.
pub const PAIRS_PER_ROUND: usize = 12;
