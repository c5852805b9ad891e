//! Epoch extraction around stimulus samples.
//!
//! For every stimulus sample `i` the window `[i - pre, i + post)` is cut out
//! of the recording and transposed to channel-major order. Windows that
//! would run past either end of the recording are silently dropped, so
//! recordings with stimuli near the edges systematically lose epochs and
//! batches can legitimately run short.

use crate::error::{PipelineError, Result};
use crate::types::{Epoch, Recording};

/// Extract all complete epochs, ascending by anchor index.
pub fn extract(recording: &Recording, pre_samples: usize, post_samples: usize) -> Result<Vec<Epoch>> {
    if recording.is_empty() {
        return Err(PipelineError::EmptyRecording(
            "cannot extract epochs from a recording with zero samples".to_string(),
        ));
    }
    if pre_samples + post_samples == 0 {
        return Err(PipelineError::InvalidParameter(
            "epoch window is empty: pre and post offsets are both zero samples".to_string(),
        ));
    }

    let len = recording.len();
    let samples = recording.samples();
    let mut epochs = Vec::new();
    let mut dropped = 0usize;

    for anchor in recording.stimulus_indices() {
        if anchor < pre_samples || anchor + post_samples >= len {
            dropped += 1;
            continue;
        }

        let start = anchor - pre_samples;
        let end = anchor + post_samples;
        let data: Vec<Vec<f64>> = (0..recording.n_channels())
            .map(|c| samples[start..end].iter().map(|s| s.channels[c]).collect())
            .collect();

        epochs.push(Epoch {
            data,
            label: recording.label_at(anchor).unwrap_or_default().to_string(),
            anchor_index: anchor,
        });
    }

    if dropped > 0 {
        log::debug!("Dropped {} incomplete epoch(s) at the recording edges", dropped);
    }

    Ok(epochs)
}
