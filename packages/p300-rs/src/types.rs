use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

/// Speller alphabet used by the reference presentation protocol:
/// 22 symbols, one full presentation cycle per batch.
pub const DEFAULT_ALPHABET: &[&str] = &[
    "A", "B", "C", "D", "E", "F", "G", "H", "I", "J", "K", "L", "M", "N", "O", "P", "R", "S", "T",
    "U", "V", "Z",
];

/// One timestamped multi-channel reading. Immutable once recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sample {
    pub timestamp: f64,
    pub channels: Vec<f64>,
}

impl Sample {
    pub fn new(timestamp: f64, channels: Vec<f64>) -> Self {
        Self {
            timestamp,
            channels,
        }
    }
}

/// One stimulus presentation event supplied by the presentation layer.
///
/// Markers arrive in presentation order; their timestamps need not coincide
/// with any sample timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Marker {
    pub timestamp: f64,
    pub label: String,
}

impl Marker {
    pub fn new(timestamp: f64, label: impl Into<String>) -> Self {
        Self {
            timestamp,
            label: label.into(),
        }
    }
}

/// An ordered multi-channel recording plus a parallel annotation track.
///
/// Invariants enforced at construction: timestamps are non-decreasing and
/// every sample has the same channel width. The annotation track always has
/// the same length as the sample sequence.
#[derive(Debug, Clone)]
pub struct Recording {
    samples: Vec<Sample>,
    labels: Vec<Option<String>>,
    stimulus: Vec<bool>,
    n_channels: usize,
}

impl Recording {
    /// Build a recording from raw samples, validating shape and ordering.
    pub fn from_samples(samples: Vec<Sample>) -> Result<Self> {
        let n_channels = samples.first().map(|s| s.channels.len()).unwrap_or(0);

        for sample in &samples {
            if sample.channels.len() != n_channels {
                return Err(PipelineError::ChannelCountMismatch {
                    expected: n_channels,
                    found: sample.channels.len(),
                });
            }
        }

        for pair in samples.windows(2) {
            if pair[1].timestamp < pair[0].timestamp {
                return Err(PipelineError::InvalidParameter(format!(
                    "sample timestamps must be non-decreasing ({} followed by {})",
                    pair[0].timestamp, pair[1].timestamp
                )));
            }
        }

        let len = samples.len();
        Ok(Self {
            samples,
            labels: vec![None; len],
            stimulus: vec![false; len],
            n_channels,
        })
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn n_channels(&self) -> usize {
        self.n_channels
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn timestamp(&self, index: usize) -> f64 {
        self.samples[index].timestamp
    }

    /// Copy out one channel as a contiguous time series.
    pub fn channel(&self, channel: usize) -> Vec<f64> {
        self.samples.iter().map(|s| s.channels[channel]).collect()
    }

    /// Rebuild the recording with new channel values ([channels × time]),
    /// keeping timestamps and annotations.
    pub fn with_channel_data(&self, channels: Vec<Vec<f64>>) -> Result<Self> {
        if channels.len() != self.n_channels {
            return Err(PipelineError::ChannelCountMismatch {
                expected: self.n_channels,
                found: channels.len(),
            });
        }
        for series in &channels {
            if series.len() != self.samples.len() {
                return Err(PipelineError::InvalidParameter(format!(
                    "channel series length {} does not match recording length {}",
                    series.len(),
                    self.samples.len()
                )));
            }
        }

        let samples = self
            .samples
            .iter()
            .enumerate()
            .map(|(t, s)| Sample {
                timestamp: s.timestamp,
                channels: channels.iter().map(|series| series[t]).collect(),
            })
            .collect();

        Ok(Self {
            samples,
            labels: self.labels.clone(),
            stimulus: self.stimulus.clone(),
            n_channels: self.n_channels,
        })
    }

    /// Mark a sample as a stimulus onset. A later call for the same index
    /// overwrites the previous label (last-write-wins).
    pub fn annotate(&mut self, index: usize, label: impl Into<String>) {
        self.labels[index] = Some(label.into());
        self.stimulus[index] = true;
    }

    pub fn label_at(&self, index: usize) -> Option<&str> {
        self.labels[index].as_deref()
    }

    pub fn is_stimulus(&self, index: usize) -> bool {
        self.stimulus[index]
    }

    /// Indices of all stimulus samples, in ascending order.
    pub fn stimulus_indices(&self) -> Vec<usize> {
        self.stimulus
            .iter()
            .enumerate()
            .filter(|(_, &s)| s)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn labels(&self) -> &[Option<String>] {
        &self.labels
    }

    pub fn stimulus_mask(&self) -> &[bool] {
        &self.stimulus
    }
}

/// A fixed-shape window of the recording around one stimulus sample.
///
/// `data` is channel-major: `data[c][t]` is channel `c` at window offset `t`.
#[derive(Debug, Clone)]
pub struct Epoch {
    pub data: Vec<Vec<f64>>,
    pub label: String,
    pub anchor_index: usize,
}

impl Epoch {
    pub fn n_channels(&self) -> usize {
        self.data.len()
    }

    pub fn n_times(&self) -> usize {
        self.data.first().map(|c| c.len()).unwrap_or(0)
    }

    /// Iterate all values, channels and time points pooled.
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.data.iter().flatten().copied()
    }
}

/// Complete pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Band-pass low cutoff in Hz
    #[serde(default = "default_low_hz")]
    pub low_hz: f64,

    /// Band-pass high cutoff in Hz
    #[serde(default = "default_high_hz")]
    pub high_hz: f64,

    /// Sampling rate of the recording in Hz
    #[serde(default = "default_sample_rate")]
    pub sample_rate: f64,

    /// Butterworth filter order (2-8, higher = sharper cutoff)
    #[serde(default = "default_filter_order")]
    pub filter_order: usize,

    /// Subtract each channel's mean before filtering
    #[serde(default = "default_remove_mean")]
    pub remove_mean: bool,

    /// Epoch extent before the stimulus sample, in seconds
    #[serde(default = "default_pre_offset")]
    pub pre_offset_seconds: f64,

    /// Epoch extent after the stimulus sample, in seconds
    #[serde(default = "default_post_offset")]
    pub post_offset_seconds: f64,

    /// Detection threshold as a multiple of the epoch standard deviation
    #[serde(default = "default_threshold_factor")]
    pub threshold_factor: f64,

    /// Epochs per aggregation batch; must match the presentation cycle length
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Ordered symbol alphabet shown by the presentation layer
    #[serde(default = "default_alphabet")]
    pub alphabet: Vec<String>,
}

fn default_low_hz() -> f64 {
    1.0
}
fn default_high_hz() -> f64 {
    30.0
}
fn default_sample_rate() -> f64 {
    512.0
}
fn default_filter_order() -> usize {
    4
}
fn default_remove_mean() -> bool {
    true
}
fn default_pre_offset() -> f64 {
    0.2
}
fn default_post_offset() -> f64 {
    0.8
}
fn default_threshold_factor() -> f64 {
    3.5
}
fn default_batch_size() -> usize {
    22
}
fn default_alphabet() -> Vec<String> {
    DEFAULT_ALPHABET.iter().map(|s| s.to_string()).collect()
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            low_hz: default_low_hz(),
            high_hz: default_high_hz(),
            sample_rate: default_sample_rate(),
            filter_order: default_filter_order(),
            remove_mean: default_remove_mean(),
            pre_offset_seconds: default_pre_offset(),
            post_offset_seconds: default_post_offset(),
            threshold_factor: default_threshold_factor(),
            batch_size: default_batch_size(),
            alphabet: default_alphabet(),
        }
    }
}

impl PipelineConfig {
    /// Epoch extent before the anchor, in samples.
    pub fn pre_offset_samples(&self) -> usize {
        (self.pre_offset_seconds * self.sample_rate).round() as usize
    }

    /// Epoch extent after the anchor, in samples.
    pub fn post_offset_samples(&self) -> usize {
        (self.post_offset_seconds * self.sample_rate).round() as usize
    }
}

/// Per-epoch detection outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochDetection {
    pub anchor_index: usize,
    pub label: String,
    pub detected: bool,
}

/// One aggregated decision for a complete presentation cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchPrediction {
    pub batch_index: usize,
    /// Winning label, or None when no epoch in the batch was detected
    pub label: Option<String>,
    /// Number of positively detected epochs that voted
    pub positive_epochs: usize,
}

/// Full result of one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpellingResult {
    pub id: String,
    pub n_samples: usize,
    pub n_channels: usize,
    pub n_markers: usize,
    pub n_epochs: usize,
    pub detections: Vec<EpochDetection>,
    pub predictions: Vec<BatchPrediction>,
    pub config: PipelineConfig,
    pub created_at: String,
}

impl SpellingResult {
    pub fn new(
        n_samples: usize,
        n_channels: usize,
        n_markers: usize,
        detections: Vec<EpochDetection>,
        predictions: Vec<BatchPrediction>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            n_samples,
            n_channels,
            n_markers,
            n_epochs: detections.len(),
            detections,
            predictions,
            config,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}
