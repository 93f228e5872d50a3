//! Candidate deduplication by domain.
//!
//! The pipeline never shows two cards for the same retailer, so both the
//! aggregated candidate list and the validated list are reduced to one
//! entry per domain. The first occurrence wins and order is preserved.

use std::collections::HashSet;

use crate::types::Candidate;

/// Keep the first candidate per domain, preserving order.
pub fn dedup_by_domain(candidates: Vec<Candidate>) -> Vec<Candidate> {
    let mut seen: HashSet<String> = HashSet::with_capacity(candidates.len());
    candidates
        .into_iter()
        .filter(|c| seen.insert(c.domain.clone()))
        .collect()
}
