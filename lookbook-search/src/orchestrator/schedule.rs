//! Bucketing and quota scheduling.
//!
//! Filtered candidates are split into four buckets by (Indian, mainstream),
//! each bucket is shuffled, and a validation queue is built that leads with
//! the configured India and niche mix before spilling over into everything
//! else. The shares are targets, not guarantees: a thin bucket simply
//! contributes fewer entries.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::catalog::Catalog;
use crate::types::{Candidate, PreferTier};

/// Niche share floor for users who prefer niche retailers.
const NICHE_TIER_FLOOR: f64 = 0.6;
/// Niche share cap for users who prefer mainstream retailers.
const MAINSTREAM_TIER_CAP: f64 = 0.3;

/// One of the four (Indian, mainstream) buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    InMain,
    InNiche,
    OutMain,
    OutNiche,
}

impl Bucket {
    pub fn of(indian: bool, mainstream: bool) -> Self {
        match (indian, mainstream) {
            (true, true) => Self::InMain,
            (true, false) => Self::InNiche,
            (false, true) => Self::OutMain,
            (false, false) => Self::OutNiche,
        }
    }

    pub fn is_niche(&self) -> bool {
        matches!(self, Self::InNiche | Self::OutNiche)
    }

    fn index(self) -> usize {
        match self {
            Self::InMain => 0,
            Self::InNiche => 1,
            Self::OutMain => 2,
            Self::OutNiche => 3,
        }
    }
}

/// Order in which leftover candidates spill into the queue.
const OVERFLOW_ORDER: [Bucket; 4] = [
    Bucket::InMain,
    Bucket::OutMain,
    Bucket::InNiche,
    Bucket::OutNiche,
];

/// Per-bucket entry counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BucketCounts {
    pub in_main: usize,
    pub in_niche: usize,
    pub out_main: usize,
    pub out_niche: usize,
}

impl BucketCounts {
    pub fn niche(&self) -> usize {
        self.in_niche + self.out_niche
    }

    fn bump(&mut self, bucket: Bucket) {
        match bucket {
            Bucket::InMain => self.in_main += 1,
            Bucket::InNiche => self.in_niche += 1,
            Bucket::OutMain => self.out_main += 1,
            Bucket::OutNiche => self.out_niche += 1,
        }
    }
}

/// Integer India and niche targets for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Targets {
    pub india: usize,
    pub niche: usize,
}

impl Targets {
    /// Compute targets from configured shares, adjusted for the user's tier.
    ///
    /// Each target is `round(total_k * share)` (ties to even) and at least 1.
    pub fn compute(total_k: usize, indian_share: f64, niche_share: f64, tier: PreferTier) -> Self {
        let niche_share = match tier {
            PreferTier::Niche => niche_share.max(NICHE_TIER_FLOOR),
            PreferTier::Mainstream => niche_share.min(MAINSTREAM_TIER_CAP),
            PreferTier::Balanced => niche_share,
        };
        Self {
            india: share_of(total_k, indian_share),
            niche: share_of(total_k, niche_share),
        }
    }
}

fn share_of(total_k: usize, share: f64) -> usize {
    let raw = (total_k as f64 * share).round_ties_even();
    (raw.max(0.0) as usize).max(1)
}

/// A queued candidate with the bucket it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Queued {
    pub bucket: Bucket,
    pub candidate: Candidate,
}

/// The validation queue in priority order.
#[derive(Debug, Clone, Default)]
pub struct QueuePlan {
    pub entries: Vec<Queued>,
}

impl QueuePlan {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bucket counts over the first `prefix` entries.
    pub fn counts(&self, prefix: usize) -> BucketCounts {
        let mut counts = BucketCounts::default();
        for entry in self.entries.iter().take(prefix) {
            counts.bump(entry.bucket);
        }
        counts
    }

    /// The first `n` candidates, in queue order.
    pub fn head(&self, n: usize) -> Vec<Candidate> {
        self.entries
            .iter()
            .take(n)
            .map(|e| e.candidate.clone())
            .collect()
    }
}

/// Shuffled buckets with a read cursor each, so every candidate is queued
/// at most once across the quota, top-up and overflow phases.
struct Pools {
    buckets: [Vec<Candidate>; 4],
    cursors: [usize; 4],
    queued_urls: HashSet<String>,
    entries: Vec<Queued>,
    limit: usize,
}

impl Pools {
    /// Queue up to `n` unconsumed entries from `bucket`, returning how many
    /// were added.
    fn take(&mut self, bucket: Bucket, n: usize) -> usize {
        let idx = bucket.index();
        let mut added = 0;
        while added < n && self.entries.len() < self.limit {
            let Some(candidate) = self.buckets[idx].get(self.cursors[idx]) else {
                break;
            };
            self.cursors[idx] += 1;
            if self.queued_urls.insert(candidate.url.clone()) {
                self.entries.push(Queued {
                    bucket,
                    candidate: candidate.clone(),
                });
                added += 1;
            }
        }
        added
    }

    fn niche_queued(&self) -> usize {
        self.entries.iter().filter(|e| e.bucket.is_niche()).count()
    }
}

/// Build the validation queue for `candidates`.
///
/// The queue leads with `india / 2` Indian-niche and the rest of the India
/// target from Indian-mainstream, tops up niche entries to the niche target,
/// then appends the remaining candidates in [`OVERFLOW_ORDER`] until the
/// queue holds `3 * total_k` entries.
pub fn build_queue<R: Rng + ?Sized>(
    catalog: &Catalog,
    candidates: Vec<Candidate>,
    total_k: usize,
    targets: Targets,
    rng: &mut R,
) -> QueuePlan {
    let mut buckets: [Vec<Candidate>; 4] = Default::default();
    for candidate in candidates {
        let bucket = Bucket::of(
            catalog.is_indian(&candidate.domain),
            catalog.is_mainstream(&candidate.domain),
        );
        buckets[bucket.index()].push(candidate);
    }
    for bucket in &mut buckets {
        bucket.shuffle(rng);
    }

    let mut pools = Pools {
        buckets,
        cursors: [0; 4],
        queued_urls: HashSet::new(),
        entries: Vec::new(),
        limit: total_k.saturating_mul(3),
    };

    let india_niche = targets.india / 2;
    pools.take(Bucket::InNiche, india_niche);
    pools.take(Bucket::InMain, targets.india - india_niche);

    let have_niche = pools.niche_queued();
    if have_niche < targets.niche {
        let mut need = targets.niche - have_niche;
        need -= pools.take(Bucket::InNiche, need);
        pools.take(Bucket::OutNiche, need);
    }

    for bucket in OVERFLOW_ORDER {
        pools.take(bucket, usize::MAX);
    }

    let plan = QueuePlan {
        entries: pools.entries,
    };
    let counts = plan.counts(plan.len());
    tracing::debug!(
        queue = plan.len(),
        in_main = counts.in_main,
        in_niche = counts.in_niche,
        out_main = counts.out_main,
        out_niche = counts.out_niche,
        niche = counts.niche(),
        india_target = targets.india,
        niche_target = targets.niche,
        "validation queue built"
    );
    plan
}
