//! Candidate ranking.
//!
//! Both rankers are pure functions of their inputs. Sorting is stable and
//! descending, so candidates tied on the full key keep their retrieval
//! order.

use std::collections::HashSet;

use lelesk_types::{ScoredCandidate, WsdCandidate};

/// Rank candidates by lexical overlap with the context bag, descending on
/// `(overlap, corpus frequency)`.
///
/// Frequency only breaks ties between equal overlaps; it never overrides a
/// better lexical match.
pub fn lelesk_rank(candidates: &[WsdCandidate], context: &HashSet<String>) -> Vec<ScoredCandidate> {
    let mut scored: Vec<ScoredCandidate> = candidates
        .iter()
        .map(|candidate| {
            let overlap = candidate
                .tokens
                .iter()
                .filter(|token| context.contains(token.as_str()))
                .count() as u32;
            ScoredCandidate {
                score: overlap,
                freq: candidate.sense.tag_freq,
                candidate: candidate.clone(),
            }
        })
        .collect();
    scored.sort_by(|a, b| (b.score, b.freq).cmp(&(a.score, a.freq)));
    scored
}

/// Rank candidates by corpus frequency alone: the most-frequent-sense
/// baseline. The score of each candidate is its frequency; the context plays
/// no part.
pub fn mfs_rank(candidates: &[WsdCandidate]) -> Vec<ScoredCandidate> {
    let mut scored: Vec<ScoredCandidate> = candidates
        .iter()
        .map(|candidate| ScoredCandidate {
            score: candidate.sense.tag_freq,
            freq: candidate.sense.tag_freq,
            candidate: candidate.clone(),
        })
        .collect();
    scored.sort_by(|a, b| b.freq.cmp(&a.freq));
    scored
}
