//! Zero-phase Butterworth band-pass filtering.
//!
//! The band-pass is realized as cascaded second-order sections (biquads,
//! Direct Form II Transposed) for numerical stability, applied forward and
//! backward over the whole channel so the net result has no phase shift.
//! Edge transients are absorbed by odd-reflection padding at both ends and
//! by priming every pass with its steady-state response to the first padded
//! sample; running the pass pair in both orders and averaging makes the
//! result exactly symmetric under time reversal.

use std::f64::consts::PI;

use rayon::prelude::*;

use crate::error::{PipelineError, Result};
use crate::types::{PipelineConfig, Recording};

/// Biquad transfer function coefficients:
/// H(z) = (b0 + b1*z^-1 + b2*z^-2) / (1 + a1*z^-1 + a2*z^-2)
#[derive(Debug, Clone, Copy)]
pub struct BiquadCoeffs {
    pub b0: f64,
    pub b1: f64,
    pub b2: f64,
    pub a1: f64,
    pub a2: f64,
}

/// One biquad section with its filter state.
#[derive(Debug, Clone)]
pub struct Biquad {
    coeffs: BiquadCoeffs,
    z1: f64,
    z2: f64,
}

impl Biquad {
    pub fn new(coeffs: BiquadCoeffs) -> Self {
        Self {
            coeffs,
            z1: 0.0,
            z2: 0.0,
        }
    }

    /// Process a single sample (Direct Form II Transposed).
    #[inline]
    pub fn process(&mut self, input: f64) -> f64 {
        let output = self.coeffs.b0 * input + self.z1;
        self.z1 = self.coeffs.b1 * input - self.coeffs.a1 * output + self.z2;
        self.z2 = self.coeffs.b2 * input - self.coeffs.a2 * output;
        output
    }

    pub fn reset(&mut self) {
        self.z1 = 0.0;
        self.z2 = 0.0;
    }

    /// Settle the section on a constant `input` and return the settled
    /// output, as if the input had been applied forever.
    pub fn prime(&mut self, input: f64) -> f64 {
        let c = self.coeffs;
        let gain = (c.b0 + c.b1 + c.b2) / (1.0 + c.a1 + c.a2);
        let output = gain * input;
        self.z2 = c.b2 * input - c.a2 * output;
        self.z1 = c.b1 * input - c.a1 * output + self.z2;
        output
    }
}

/// Cascaded second-order sections.
#[derive(Debug, Clone)]
pub struct SosFilter {
    sections: Vec<Biquad>,
}

impl SosFilter {
    pub fn new(sections: Vec<BiquadCoeffs>) -> Self {
        Self {
            sections: sections.into_iter().map(Biquad::new).collect(),
        }
    }

    #[inline]
    pub fn process(&mut self, input: f64) -> f64 {
        let mut output = input;
        for section in &mut self.sections {
            output = section.process(output);
        }
        output
    }

    pub fn process_signal(&mut self, signal: &mut [f64]) {
        for sample in signal.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    pub fn reset(&mut self) {
        for section in &mut self.sections {
            section.reset();
        }
    }

    /// Settle the whole cascade on a constant `input`; each section is
    /// primed with the settled output of the one before it.
    pub fn prime(&mut self, input: f64) -> f64 {
        let mut level = input;
        for section in &mut self.sections {
            level = section.prime(level);
        }
        level
    }

    pub fn n_sections(&self) -> usize {
        self.sections.len()
    }
}

/// Band-pass Butterworth designer.
///
/// The band-pass is a cascade of a highpass at the low cutoff and a lowpass
/// at the high cutoff, each of the requested order.
pub struct BandPassFilter;

impl BandPassFilter {
    pub fn design(low_hz: f64, high_hz: f64, sample_rate: f64, order: usize) -> Result<SosFilter> {
        validate_band(low_hz, high_hz, sample_rate, order)?;

        let wn_low = prewarp(low_hz, sample_rate);
        let wn_high = prewarp(high_hz, sample_rate);

        let mut sections = highpass_sections(wn_low, order);
        sections.extend(lowpass_sections(wn_high, order));
        Ok(SosFilter::new(sections))
    }
}

/// Validate a band-pass configuration against the sampling rate.
pub fn validate_band(low_hz: f64, high_hz: f64, sample_rate: f64, order: usize) -> Result<()> {
    if !(sample_rate > 0.0) {
        return Err(PipelineError::InvalidFilterBand(format!(
            "sample rate must be positive, got {} Hz",
            sample_rate
        )));
    }
    if order == 0 {
        return Err(PipelineError::InvalidFilterBand(
            "filter order must be at least 1".to_string(),
        ));
    }
    if !(low_hz > 0.0) || !low_hz.is_finite() || !high_hz.is_finite() {
        return Err(PipelineError::InvalidFilterBand(format!(
            "cutoffs must be positive finite frequencies, got {} / {} Hz",
            low_hz, high_hz
        )));
    }
    if low_hz >= high_hz {
        return Err(PipelineError::InvalidFilterBand(format!(
            "low cutoff ({} Hz) must be below high cutoff ({} Hz)",
            low_hz, high_hz
        )));
    }
    let nyquist = sample_rate / 2.0;
    if high_hz >= nyquist {
        return Err(PipelineError::InvalidFilterBand(format!(
            "high cutoff ({} Hz) must be below Nyquist ({} Hz)",
            high_hz, nyquist
        )));
    }
    Ok(())
}

/// Prewarp an analog cutoff for the bilinear transform.
fn prewarp(freq_hz: f64, sample_rate: f64) -> f64 {
    (PI * freq_hz / sample_rate).tan()
}

fn lowpass_sections(wn: f64, order: usize) -> Vec<BiquadCoeffs> {
    let num_sections = (order + 1) / 2;
    let mut sections = Vec::with_capacity(num_sections);

    for k in 0..num_sections {
        if order % 2 == 1 && k == num_sections - 1 {
            // first-order remainder: H(s) = wn / (s + wn)
            let gain = wn / (1.0 + wn);
            sections.push(BiquadCoeffs {
                b0: gain,
                b1: gain,
                b2: 0.0,
                a1: (wn - 1.0) / (wn + 1.0),
                a2: 0.0,
            });
        } else {
            let theta = PI * (2.0 * k as f64 + 1.0) / (2.0 * order as f64);
            let alpha = 2.0 * theta.cos();
            let wn2 = wn * wn;
            let denom = 1.0 + alpha * wn + wn2;

            sections.push(BiquadCoeffs {
                b0: wn2 / denom,
                b1: 2.0 * wn2 / denom,
                b2: wn2 / denom,
                a1: 2.0 * (wn2 - 1.0) / denom,
                a2: (1.0 - alpha * wn + wn2) / denom,
            });
        }
    }

    sections
}

fn highpass_sections(wn: f64, order: usize) -> Vec<BiquadCoeffs> {
    let num_sections = (order + 1) / 2;
    let mut sections = Vec::with_capacity(num_sections);

    for k in 0..num_sections {
        if order % 2 == 1 && k == num_sections - 1 {
            let gain = 1.0 / (1.0 + wn);
            sections.push(BiquadCoeffs {
                b0: gain,
                b1: -gain,
                b2: 0.0,
                a1: (wn - 1.0) / (wn + 1.0),
                a2: 0.0,
            });
        } else {
            let theta = PI * (2.0 * k as f64 + 1.0) / (2.0 * order as f64);
            let alpha = 2.0 * theta.cos();
            let wn2 = wn * wn;
            let denom = 1.0 + alpha * wn + wn2;

            sections.push(BiquadCoeffs {
                b0: 1.0 / denom,
                b1: -2.0 / denom,
                b2: 1.0 / denom,
                a1: 2.0 * (wn2 - 1.0) / denom,
                a2: (1.0 - alpha * wn + wn2) / denom,
            });
        }
    }

    sections
}

/// Padding length required for a stable zero-phase pass.
pub fn pad_len(order: usize) -> usize {
    3 * (2 * order + 1)
}

/// Apply a filter forward and backward over one channel (zero net phase).
///
/// The signal is extended at both ends by odd reflection before filtering;
/// the extensions are trimmed from the result. The signal must be longer
/// than the padding or the transient cannot be absorbed.
///
/// The forward-backward pass pair runs in both orders and the results are
/// averaged. The two orders are mirror images of each other, so reversing
/// the input reverses the output exactly, not just up to edge transients.
pub fn filtfilt(filter: &SosFilter, signal: &[f64], order: usize) -> Result<Vec<f64>> {
    let n = signal.len();
    let pad = pad_len(order);
    if n <= pad {
        return Err(PipelineError::InvalidFilterBand(format!(
            "recording too short for zero-phase filtering: {} samples, need more than {}",
            n, pad
        )));
    }

    // Odd reflection around both endpoints.
    let mut extended = Vec::with_capacity(n + 2 * pad);
    for i in 0..pad {
        extended.push(2.0 * signal[0] - signal[pad - i]);
    }
    extended.extend_from_slice(signal);
    for i in 0..pad {
        extended.push(2.0 * signal[n - 1] - signal[n - 2 - i]);
    }

    let mut reversed = extended.clone();
    reversed.reverse();

    let fwd_bwd = pass_pair(filter, extended);
    let mut bwd_fwd = pass_pair(filter, reversed);
    bwd_fwd.reverse();

    Ok((pad..pad + n)
        .map(|i| 0.5 * (fwd_bwd[i] + bwd_fwd[i]))
        .collect())
}

/// One causal pass in each direction, each primed with the steady-state
/// response to its first sample.
fn pass_pair(filter: &SosFilter, mut signal: Vec<f64>) -> Vec<f64> {
    let mut forward = filter.clone();
    forward.prime(signal[0]);
    forward.process_signal(&mut signal);

    signal.reverse();
    let mut backward = filter.clone();
    backward.prime(signal[0]);
    backward.process_signal(&mut signal);
    signal.reverse();

    signal
}

/// Filter every channel of a recording with a zero-phase band-pass.
///
/// Timestamps, annotations and shape are preserved. When
/// `config.remove_mean` is set, each channel's mean is subtracted before
/// filtering.
pub fn filter_recording(recording: &Recording, config: &PipelineConfig) -> Result<Recording> {
    if recording.is_empty() {
        return Err(PipelineError::EmptyRecording(
            "cannot filter a recording with zero samples".to_string(),
        ));
    }

    let filter = BandPassFilter::design(
        config.low_hz,
        config.high_hz,
        config.sample_rate,
        config.filter_order,
    )?;

    let pad = pad_len(config.filter_order);
    if recording.len() <= pad {
        return Err(PipelineError::InvalidFilterBand(format!(
            "recording too short for zero-phase filtering: {} samples, need more than {}",
            recording.len(),
            pad
        )));
    }

    log::debug!(
        "Band-pass {}-{} Hz (order {}, {} sections) over {} channels × {} samples",
        config.low_hz,
        config.high_hz,
        config.filter_order,
        filter.n_sections(),
        recording.n_channels(),
        recording.len()
    );

    let filtered: Result<Vec<Vec<f64>>> = (0..recording.n_channels())
        .into_par_iter()
        .map(|c| {
            let mut series = recording.channel(c);
            if config.remove_mean {
                let mean = series.iter().sum::<f64>() / series.len() as f64;
                for v in series.iter_mut() {
                    *v -= mean;
                }
            }
            filtfilt(&filter, &series, config.filter_order)
        })
        .collect();

    recording.with_channel_data(filtered?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Sample;
    use approx::assert_abs_diff_eq;

    fn sine(freq: f64, sample_rate: f64, n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| (2.0 * PI * freq * i as f64 / sample_rate).sin())
            .collect()
    }

    fn rms(signal: &[f64]) -> f64 {
        (signal.iter().map(|x| x * x).sum::<f64>() / signal.len() as f64).sqrt()
    }

    #[test]
    fn test_band_validation() {
        assert!(validate_band(1.0, 30.0, 512.0, 4).is_ok());
        assert!(validate_band(30.0, 1.0, 512.0, 4).is_err());
        assert!(validate_band(10.0, 10.0, 512.0, 4).is_err());
        assert!(validate_band(1.0, 300.0, 512.0, 4).is_err()); // above Nyquist
        assert!(validate_band(0.0, 30.0, 512.0, 4).is_err());
        assert!(validate_band(1.0, 30.0, 0.0, 4).is_err());
        assert!(validate_band(1.0, 30.0, 512.0, 0).is_err());
    }

    #[test]
    fn test_causal_pass_is_stable() {
        // A stable cascade keeps a unit sine bounded; a right-half-plane
        // pole would blow up to non-finite values within a few hundred
        // samples.
        let mut filter = BandPassFilter::design(1.0, 30.0, 512.0, 4).unwrap();
        let mut signal = sine(10.0, 512.0, 2048);
        filter.process_signal(&mut signal);

        assert!(signal.iter().all(|v| v.is_finite()));
        let peak = signal.iter().fold(0.0_f64, |m, &v| m.max(v.abs()));
        assert!(peak < 10.0, "filter response diverged, peak {}", peak);
    }

    #[test]
    fn test_prime_settles_on_constant_input() {
        let mut filter = BandPassFilter::design(1.0, 30.0, 512.0, 4).unwrap();
        // a band-pass blocks DC entirely
        let settled = filter.prime(3.0);
        assert_abs_diff_eq!(settled, 0.0, epsilon = 1e-9);
        for _ in 0..32 {
            assert_abs_diff_eq!(filter.process(3.0), settled, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut filter = BandPassFilter::design(1.0, 30.0, 512.0, 4).unwrap();
        let input = sine(10.0, 512.0, 64);

        let mut first = input.clone();
        filter.process_signal(&mut first);
        filter.reset();
        let mut second = input.clone();
        filter.process_signal(&mut second);

        assert_eq!(first, second);
    }

    #[test]
    fn test_passband_preserved_stopband_attenuated() {
        let sample_rate = 512.0;
        let filter = BandPassFilter::design(1.0, 30.0, sample_rate, 4).unwrap();

        let in_band = sine(10.0, sample_rate, 4096);
        let out_band = sine(100.0, sample_rate, 4096);

        let kept = filtfilt(&filter, &in_band, 4).unwrap();
        let removed = filtfilt(&filter, &out_band, 4).unwrap();

        // Compare away from the edges.
        assert!(rms(&kept[512..3584]) > 0.9 * rms(&in_band[512..3584]));
        assert!(rms(&removed[512..3584]) < 0.05 * rms(&out_band[512..3584]));
    }

    #[test]
    fn test_zero_phase_time_reversal() {
        let sample_rate = 512.0;
        let filter = BandPassFilter::design(1.0, 30.0, sample_rate, 4).unwrap();

        let signal: Vec<f64> = (0..2048)
            .map(|i| {
                let t = i as f64 / sample_rate;
                (2.0 * PI * 7.0 * t).sin() + 0.5 * (2.0 * PI * 19.0 * t).cos()
            })
            .collect();
        let mut reversed = signal.clone();
        reversed.reverse();

        let filtered = filtfilt(&filter, &signal, 4).unwrap();
        let filtered_reversed = filtfilt(&filter, &reversed, 4).unwrap();

        for (i, &v) in filtered.iter().enumerate() {
            assert_abs_diff_eq!(v, filtered_reversed[2048 - 1 - i], epsilon = 1e-6);
        }
    }

    #[test]
    fn test_short_recording_rejected() {
        let filter = BandPassFilter::design(1.0, 30.0, 512.0, 4).unwrap();
        let short = vec![0.0; pad_len(4)];
        assert!(filtfilt(&filter, &short, 4).is_err());
    }

    #[test]
    fn test_filter_recording_preserves_shape_and_timestamps() {
        let sample_rate = 256.0;
        let samples: Vec<Sample> = (0..1024)
            .map(|i| {
                let t = i as f64 / sample_rate;
                Sample::new(t, vec![(2.0 * PI * 5.0 * t).sin(), 0.0])
            })
            .collect();
        let recording = Recording::from_samples(samples).unwrap();

        let config = PipelineConfig {
            sample_rate,
            ..Default::default()
        };
        let filtered = filter_recording(&recording, &config).unwrap();

        assert_eq!(filtered.len(), recording.len());
        assert_eq!(filtered.n_channels(), 2);
        assert_eq!(filtered.timestamp(100), recording.timestamp(100));
    }

    #[test]
    fn test_remove_mean_strips_dc() {
        let sample_rate = 256.0;
        let samples: Vec<Sample> = (0..1024)
            .map(|i| Sample::new(i as f64 / sample_rate, vec![5.0]))
            .collect();
        let recording = Recording::from_samples(samples).unwrap();

        let config = PipelineConfig {
            sample_rate,
            remove_mean: true,
            ..Default::default()
        };
        let filtered = filter_recording(&recording, &config).unwrap();
        // Constant input with mean removed is all zeros, and stays so.
        for s in filtered.samples() {
            assert_abs_diff_eq!(s.channels[0], 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_empty_recording_rejected() {
        let recording = Recording::from_samples(Vec::new()).unwrap();
        let err = filter_recording(&recording, &PipelineConfig::default()).unwrap_err();
        assert!(matches!(err, PipelineError::EmptyRecording(_)));
    }
}
