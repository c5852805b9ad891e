//! Marker-to-sample alignment.
//!
//! Each marker is assigned to the sample whose timestamp is closest to the
//! marker's timestamp. Ties break toward the earlier sample. Markers outside
//! the recorded time range are clamped to the boundary sample rather than
//! dropped; callers that want strict bounds must pre-filter their markers.

use crate::error::{PipelineError, Result};
use crate::types::{Marker, Recording};

/// Index of the sample nearest to `timestamp`.
///
/// Timestamps are non-decreasing (a `Recording` invariant), so a binary
/// search narrows the candidates to the two neighbors of the insertion
/// point.
pub fn nearest_sample(recording: &Recording, timestamp: f64) -> usize {
    let n = recording.len();
    debug_assert!(n > 0);

    let idx = recording
        .samples()
        .partition_point(|s| s.timestamp < timestamp);

    if idx == 0 {
        return 0;
    }
    if idx == n {
        return n - 1;
    }

    let before = timestamp - recording.timestamp(idx - 1);
    let after = recording.timestamp(idx) - timestamp;
    if before <= after {
        idx - 1
    } else {
        idx
    }
}

/// Annotate the recording with every marker, in presentation order.
///
/// When two markers land on the same sample the later one overwrites the
/// earlier label (last-write-wins): display jitter can legitimately collapse
/// two close events onto one sample at typical window sizes.
pub fn annotate(recording: &mut Recording, markers: &[Marker]) -> Result<()> {
    if recording.is_empty() {
        return Err(PipelineError::EmptyRecording(
            "cannot align markers onto a recording with zero samples".to_string(),
        ));
    }

    for marker in markers {
        let index = nearest_sample(recording, marker.timestamp);
        recording.annotate(index, marker.label.clone());
    }

    log::debug!(
        "Aligned {} markers onto {} stimulus samples",
        markers.len(),
        recording.stimulus_indices().len()
    );

    Ok(())
}
