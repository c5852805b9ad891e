//! Pipeline orchestration.
//!
//! Chains the five stages over an already-finalized recording and marker
//! list: band-pass filter, marker alignment, epoch extraction, per-epoch
//! detection, and batch aggregation. The run is pure and deterministic for
//! fixed inputs; configuration and shape errors fail fast at stage entry
//! while data-quality conditions (dropped edge epochs, empty batches,
//! zero-dispersion epochs) are absorbed as documented outcomes.

use crate::error::{PipelineError, Result};
use crate::types::{BatchPrediction, EpochDetection, Marker, PipelineConfig, Recording, SpellingResult};
use crate::{aggregate, align, detect, epoch, filter};

#[derive(Debug)]
pub struct SpellerPipeline {
    config: PipelineConfig,
}

impl SpellerPipeline {
    /// Create a pipeline, validating the configuration eagerly.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        filter::validate_band(
            config.low_hz,
            config.high_hz,
            config.sample_rate,
            config.filter_order,
        )?;

        if config.batch_size == 0 {
            return Err(PipelineError::InvalidParameter(
                "batch size must be at least 1".to_string(),
            ));
        }
        if config.pre_offset_seconds < 0.0 || config.post_offset_seconds < 0.0 {
            return Err(PipelineError::InvalidParameter(
                "epoch offsets must be non-negative".to_string(),
            ));
        }
        if config.pre_offset_samples() + config.post_offset_samples() == 0 {
            return Err(PipelineError::InvalidParameter(
                "epoch window is empty at this sample rate".to_string(),
            ));
        }
        if !(config.threshold_factor > 0.0) || !config.threshold_factor.is_finite() {
            return Err(PipelineError::InvalidParameter(format!(
                "threshold factor must be positive and finite, got {}",
                config.threshold_factor
            )));
        }
        if config.alphabet.is_empty() {
            return Err(PipelineError::InvalidParameter(
                "symbol alphabet must not be empty".to_string(),
            ));
        }

        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the full pipeline over a closed-off recording.
    ///
    /// When `markers` is empty the recording's own annotation track is used
    /// as-is, which covers recordings whose stimulus labels were already
    /// written by the acquisition side.
    pub fn run(&self, recording: &Recording, markers: &[Marker]) -> Result<SpellingResult> {
        if recording.is_empty() {
            return Err(PipelineError::EmptyRecording(
                "pipeline input has zero samples".to_string(),
            ));
        }

        log::info!(
            "Pipeline start: {} samples × {} channels, {} markers",
            recording.len(),
            recording.n_channels(),
            markers.len()
        );

        let mut filtered = filter::filter_recording(recording, &self.config)?;
        if filtered.n_channels() != recording.n_channels() {
            return Err(PipelineError::ChannelCountMismatch {
                expected: recording.n_channels(),
                found: filtered.n_channels(),
            });
        }

        if markers.is_empty() {
            log::info!("No markers given; using the recording's annotation track");
        } else {
            align::annotate(&mut filtered, markers)?;
        }

        let pre = self.config.pre_offset_samples();
        let post = self.config.post_offset_samples();
        let epochs = epoch::extract(&filtered, pre, post)?;
        log::info!(
            "Extracted {} epoch(s) of {} samples ({} stimulus samples annotated)",
            epochs.len(),
            pre + post,
            filtered.stimulus_indices().len()
        );

        let detected = detect::detect_all(&epochs, self.config.threshold_factor);
        let detections: Vec<EpochDetection> = epochs
            .iter()
            .zip(&detected)
            .map(|(e, &d)| EpochDetection {
                anchor_index: e.anchor_index,
                label: e.label.clone(),
                detected: d,
            })
            .collect();

        let entries: Vec<(String, bool)> = detections
            .iter()
            .map(|d| (d.label.clone(), d.detected))
            .collect();
        let labels = aggregate::aggregate(&entries, self.config.batch_size)?;

        let predictions: Vec<BatchPrediction> = labels
            .into_iter()
            .enumerate()
            .map(|(batch_index, label)| {
                let start = batch_index * self.config.batch_size;
                let batch = &entries[start..start + self.config.batch_size];
                BatchPrediction {
                    batch_index,
                    label,
                    positive_epochs: aggregate::positive_count(batch),
                }
            })
            .collect();

        log::info!(
            "Pipeline done: {} batch decision(s) from {} epoch(s)",
            predictions.len(),
            detections.len()
        );

        Ok(SpellingResult::new(
            recording.len(),
            recording.n_channels(),
            markers.len(),
            detections,
            predictions,
            self.config.clone(),
        ))
    }
}
