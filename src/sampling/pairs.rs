// PairSampler — lazy, bounded, class-balanced pair drawing.
//
// Six buckets (same/different author x three name categories) each receive
// an equal quota of target_count / 6. The sampler cycles through the buckets
// so any prefix of the output is as balanced as possible.
//
// Same-author pairs come from one multi-member cluster. Different-author
// pairs first pick two distinct clusters (inside one signature block for the
// same-name and same-surname buckets) and then one member of each, so a
// prolific author cannot crowd out the negatives. Random drawing is capped
// at `max_attempts` per pair. When the cap is hit the bucket is scanned
// exhaustively for its remaining unseen pairs, and it is marked exhausted
// only when that scan comes up short.

use std::collections::{BTreeMap, HashMap, HashSet};

use anyhow::Result;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::PAIRS_PER_ROUND;
use crate::entities::models::{InputCluster, Signature};
use crate::features::names::{normalize_name, normalized_surname};

/// Structural relationship between the two names of a pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NameCategory {
    /// Identical normalized full names
    SameName,
    /// Same normalized surname, different given names
    SameSurname,
    DifferentSurname,
}

impl NameCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            NameCategory::SameName => "same name",
            NameCategory::SameSurname => "same surname",
            NameCategory::DifferentSurname => "different surname",
        }
    }
}

impl std::fmt::Display for NameCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Bucket {
    same_author: bool,
    category: NameCategory,
}

const BUCKETS: [Bucket; 6] = [
    Bucket { same_author: true, category: NameCategory::SameName },
    Bucket { same_author: false, category: NameCategory::SameName },
    Bucket { same_author: true, category: NameCategory::SameSurname },
    Bucket { same_author: false, category: NameCategory::SameSurname },
    Bucket { same_author: true, category: NameCategory::DifferentSurname },
    Bucket { same_author: false, category: NameCategory::DifferentSurname },
];

/// Tuning knobs for the sampler.
#[derive(Debug, Clone)]
pub struct SamplingOptions {
    /// Seed for reproducible sampling; `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Random draws allowed per pair before the bucket falls back to an
    /// exhaustive scan of its remaining pairs.
    pub max_attempts: usize,
}

impl Default for SamplingOptions {
    fn default() -> Self {
        Self {
            seed: None,
            max_attempts: 1000,
        }
    }
}

/// A training example for the distance model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampledPair<'a> {
    pub signature_a: &'a Signature,
    pub signature_b: &'a Signature,
    /// True iff both signatures carry the same non-null author id
    pub same_author: bool,
    pub category: NameCategory,
}

/// Per-bucket outcome of a sampling run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketReport {
    pub same_author: bool,
    pub category: NameCategory,
    pub quota: usize,
    pub drawn: usize,
    pub exhausted: bool,
}

/// Summary of what the sampler produced against what was asked for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SamplingReport {
    pub requested: usize,
    pub produced: usize,
    pub buckets: Vec<BucketReport>,
}

impl SamplingReport {
    /// How many pairs short of the requested count the run ended.
    pub fn shortfall(&self) -> usize {
        self.requested.saturating_sub(self.produced)
    }
}

struct NameKey {
    full: String,
    surname: String,
}

/// Lazy iterator over balanced signature pairs.
pub struct PairSampler<'a> {
    signatures: Vec<&'a Signature>,
    names: Vec<NameKey>,
    /// Member indices of every input cluster with at least one signature
    clusters: Vec<Vec<usize>>,
    /// Positions in `clusters` of those with at least two members
    multi_member_clusters: Vec<usize>,
    /// Signature blocks spanning at least two clusters, members grouped by cluster
    mixed_blocks: Vec<Vec<Vec<usize>>>,
    rng: StdRng,
    max_attempts: usize,
    requested: usize,
    quota: usize,
    drawn: [usize; BUCKETS.len()],
    exhausted: [bool; BUCKETS.len()],
    /// Remaining pairs of a bucket once random drawing gave up on it
    reserve: [Option<Vec<(usize, usize)>>; BUCKETS.len()],
    cursor: usize,
    seen: HashSet<(usize, usize)>,
}

/// Start sampling `target_count` balanced pairs from curated signatures.
///
/// `target_count` must be a multiple of 12. Pairs are drawn lazily as the
/// returned iterator is consumed; it may end early when the corpus cannot
/// supply enough distinct pairs for some bucket (see [`PairSampler::report`]).
pub fn sample_pairs<'a>(
    curated_signatures: &'a [Signature],
    input_clusters: &[InputCluster],
    target_count: usize,
    options: SamplingOptions,
) -> Result<PairSampler<'a>> {
    PairSampler::new(curated_signatures, input_clusters, target_count, options)
}

impl<'a> PairSampler<'a> {
    pub fn new(
        curated_signatures: &'a [Signature],
        input_clusters: &[InputCluster],
        target_count: usize,
        options: SamplingOptions,
    ) -> Result<Self> {
        if target_count % PAIRS_PER_ROUND != 0 {
            anyhow::bail!(
                "Sampled pairs size must be a multiple of {PAIRS_PER_ROUND}, got {target_count}"
            );
        }

        let by_uuid: HashMap<&str, &'a Signature> = curated_signatures
            .iter()
            .map(|s| (s.signature_uuid.as_str(), s))
            .collect();

        let mut signatures = Vec::new();
        let mut cluster_of = Vec::new();
        let mut clusters: Vec<Vec<usize>> = Vec::new();
        let mut multi_member_clusters = Vec::new();

        for cluster in input_clusters {
            let position = clusters.len();
            let mut members = Vec::with_capacity(cluster.signature_uuids.len());
            for uuid in &cluster.signature_uuids {
                if let Some(signature) = by_uuid.get(uuid.as_str()) {
                    members.push(signatures.len());
                    signatures.push(*signature);
                    cluster_of.push(position);
                }
            }
            if members.is_empty() {
                continue;
            }
            if members.len() >= 2 {
                multi_member_clusters.push(position);
            }
            clusters.push(members);
        }

        // BTreeMaps keep block and cluster order stable so a fixed seed replays exactly.
        let mut blocks: BTreeMap<&str, BTreeMap<usize, Vec<usize>>> = BTreeMap::new();
        for (index, signature) in signatures.iter().enumerate() {
            blocks
                .entry(signature.signature_block.as_str())
                .or_default()
                .entry(cluster_of[index])
                .or_default()
                .push(index);
        }
        let mixed_blocks: Vec<Vec<Vec<usize>>> = blocks
            .into_values()
            .filter(|by_cluster| by_cluster.len() >= 2)
            .map(|by_cluster| by_cluster.into_values().collect())
            .collect();

        let names = signatures
            .iter()
            .map(|s| NameKey {
                full: normalize_name(&s.author_name),
                surname: normalized_surname(&s.author_name),
            })
            .collect();

        let rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::seed_from_u64(rand::rng().random()),
        };

        info!(
            signatures = signatures.len(),
            clusters = input_clusters.len(),
            multi_member_clusters = multi_member_clusters.len(),
            mixed_blocks = mixed_blocks.len(),
            target_count,
            "Sampling signature pairs"
        );

        Ok(Self {
            signatures,
            names,
            clusters,
            multi_member_clusters,
            mixed_blocks,
            rng,
            max_attempts: options.max_attempts,
            requested: target_count,
            quota: target_count / BUCKETS.len(),
            drawn: [0; BUCKETS.len()],
            exhausted: [false; BUCKETS.len()],
            reserve: Default::default(),
            cursor: 0,
            seen: HashSet::new(),
        })
    }

    /// Outcome so far. After the iterator is exhausted this is final.
    pub fn report(&self) -> SamplingReport {
        let buckets = BUCKETS
            .iter()
            .enumerate()
            .map(|(slot, bucket)| BucketReport {
                same_author: bucket.same_author,
                category: bucket.category,
                quota: self.quota,
                drawn: self.drawn[slot],
                exhausted: self.exhausted[slot],
            })
            .collect();
        SamplingReport {
            requested: self.requested,
            produced: self.drawn.iter().sum(),
            buckets,
        }
    }

    fn is_finished(&self) -> bool {
        (0..BUCKETS.len()).all(|slot| self.exhausted[slot] || self.drawn[slot] >= self.quota)
    }

    fn same_author(&self, a: usize, b: usize) -> bool {
        let author_a = self.signatures[a].author_id;
        author_a.is_some() && author_a == self.signatures[b].author_id
    }

    fn category(&self, a: usize, b: usize) -> NameCategory {
        let (name_a, name_b) = (&self.names[a], &self.names[b]);
        if !name_a.full.is_empty() && name_a.full == name_b.full {
            NameCategory::SameName
        } else if !name_a.surname.is_empty() && name_a.surname == name_b.surname {
            NameCategory::SameSurname
        } else {
            NameCategory::DifferentSurname
        }
    }

    fn matches(&self, bucket: Bucket, a: usize, b: usize) -> bool {
        self.same_author(a, b) == bucket.same_author && self.category(a, b) == bucket.category
    }

    fn draw_same_cluster(&mut self) -> Option<(usize, usize)> {
        if self.multi_member_clusters.is_empty() {
            return None;
        }
        let pick = self.rng.random_range(0..self.multi_member_clusters.len());
        let members = &self.clusters[self.multi_member_clusters[pick]];
        let (a, b) = pick_two(&mut self.rng, members.len());
        Some((members[a], members[b]))
    }

    /// One member from each of two distinct clusters, restricted to a single
    /// mixed block when `within_block` is set.
    fn draw_across_clusters(&mut self, within_block: bool) -> Option<(usize, usize)> {
        let groups: &[Vec<usize>] = if within_block {
            if self.mixed_blocks.is_empty() {
                return None;
            }
            &self.mixed_blocks[self.rng.random_range(0..self.mixed_blocks.len())]
        } else {
            &self.clusters
        };
        if groups.len() < 2 {
            return None;
        }
        let (x, y) = pick_two(&mut self.rng, groups.len());
        let a = groups[x][self.rng.random_range(0..groups[x].len())];
        let b = groups[y][self.rng.random_range(0..groups[y].len())];
        Some((a, b))
    }

    /// Every unseen pair belonging to `bucket`.
    fn eligible_pairs(&self, bucket: Bucket) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        let mut consider = |a: usize, b: usize| {
            let key = (a.min(b), a.max(b));
            if !self.seen.contains(&key) && self.matches(bucket, a, b) {
                pairs.push(key);
            }
        };

        if bucket.same_author {
            for &position in &self.multi_member_clusters {
                let members = &self.clusters[position];
                for (i, &a) in members.iter().enumerate() {
                    for &b in &members[i + 1..] {
                        consider(a, b);
                    }
                }
            }
        } else if bucket.category == NameCategory::DifferentSurname {
            cross_cluster_pairs(&self.clusters, &mut consider);
        } else {
            for block in &self.mixed_blocks {
                cross_cluster_pairs(block, &mut consider);
            }
        }
        pairs
    }

    fn draw(&mut self, slot: usize) -> Option<(usize, usize)> {
        let bucket = BUCKETS[slot];
        if self.reserve[slot].is_none() {
            for _ in 0..self.max_attempts {
                let candidate = if bucket.same_author {
                    self.draw_same_cluster()
                } else {
                    self.draw_across_clusters(bucket.category != NameCategory::DifferentSurname)
                };
                let Some((a, b)) = candidate else {
                    break;
                };

                let key = (a.min(b), a.max(b));
                if self.seen.contains(&key) || !self.matches(bucket, a, b) {
                    continue;
                }
                self.seen.insert(key);
                return Some(key);
            }

            let mut pairs = self.eligible_pairs(bucket);
            pairs.shuffle(&mut self.rng);
            pairs.truncate(self.quota - self.drawn[slot]);
            debug!(
                same_author = bucket.same_author,
                category = %bucket.category,
                remaining = pairs.len(),
                "Random draws missed, scanned bucket for remaining pairs"
            );
            self.reserve[slot] = Some(pairs);
        }

        let key = self.reserve[slot].as_mut()?.pop()?;
        self.seen.insert(key);
        Some(key)
    }
}

/// Two distinct indices below `len`. `len` must be at least 2.
fn pick_two(rng: &mut StdRng, len: usize) -> (usize, usize) {
    let a = rng.random_range(0..len);
    let mut b = rng.random_range(0..len - 1);
    if b >= a {
        b += 1;
    }
    (a, b)
}

/// Visit every pair whose members sit in two different groups.
fn cross_cluster_pairs(groups: &[Vec<usize>], visit: &mut impl FnMut(usize, usize)) {
    for (x, first) in groups.iter().enumerate() {
        for second in &groups[x + 1..] {
            for &a in first {
                for &b in second {
                    visit(a, b);
                }
            }
        }
    }
}

impl<'a> Iterator for PairSampler<'a> {
    type Item = SampledPair<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.is_finished() {
            let slot = self.cursor % BUCKETS.len();
            self.cursor += 1;
            if self.exhausted[slot] || self.drawn[slot] >= self.quota {
                continue;
            }

            let bucket = BUCKETS[slot];
            match self.draw(slot) {
                Some((a, b)) => {
                    self.drawn[slot] += 1;
                    return Some(SampledPair {
                        signature_a: self.signatures[a],
                        signature_b: self.signatures[b],
                        same_author: bucket.same_author,
                        category: bucket.category,
                    });
                }
                None => {
                    self.exhausted[slot] = true;
                    warn!(
                        same_author = bucket.same_author,
                        category = %bucket.category,
                        drawn = self.drawn[slot],
                        quota = self.quota,
                        "No distinct pairs left for bucket, sampling will fall short"
                    );
                }
            }
        }
        None
    }
}
