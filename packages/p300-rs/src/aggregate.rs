//! Batch aggregation by majority vote.
//!
//! Consecutive detection entries are grouped into batches of `batch_size`,
//! one batch per full presentation cycle. A trailing partial batch is
//! dropped, mirroring the epocher's incomplete-window policy. Within a
//! batch only positively detected entries vote; the winner is the most
//! frequent label, ties broken by first encounter in batch order.

use crate::error::{PipelineError, Result};

/// Aggregate `(label, detected)` entries into one decision per complete batch.
pub fn aggregate(entries: &[(String, bool)], batch_size: usize) -> Result<Vec<Option<String>>> {
    if batch_size == 0 {
        return Err(PipelineError::InvalidParameter(
            "batch size must be at least 1".to_string(),
        ));
    }

    let decisions = entries
        .chunks_exact(batch_size)
        .map(majority_vote)
        .collect();
    Ok(decisions)
}

/// Most frequent label among detected entries, ties to the first seen.
///
/// Counting keeps labels in first-encounter order so the result never
/// depends on hash or container iteration order.
fn majority_vote(batch: &[(String, bool)]) -> Option<String> {
    let mut counts: Vec<(&str, usize)> = Vec::new();

    for (label, detected) in batch {
        if !detected {
            continue;
        }
        match counts.iter_mut().find(|(l, _)| l == label) {
            Some((_, count)) => *count += 1,
            None => counts.push((label, 1)),
        }
    }

    let mut winner: Option<(&str, usize)> = None;
    for &(label, count) in &counts {
        match winner {
            Some((_, best)) if count <= best => {}
            _ => winner = Some((label, count)),
        }
    }

    winner.map(|(label, _)| label.to_string())
}

/// Count the detected entries that voted in one batch.
pub fn positive_count(batch: &[(String, bool)]) -> usize {
    batch.iter().filter(|(_, detected)| *detected).count()
}
