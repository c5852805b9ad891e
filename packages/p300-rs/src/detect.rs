//! Per-epoch P300-style response detection.
//!
//! The rule is deliberately parameter-light: pool every value of the epoch
//! (all channels, all time points), take the population standard deviation
//! as a dispersion estimate, and call the epoch positive when its largest
//! absolute value exceeds `threshold_factor` times that dispersion. A
//! constant epoch has zero dispersion and is treated as "absent" by
//! convention.

use rayon::prelude::*;

use crate::types::Epoch;

/// Pooled population standard deviation over all values of the epoch.
pub fn dispersion(epoch: &Epoch) -> f64 {
    let n = (epoch.n_channels() * epoch.n_times()) as f64;
    if n == 0.0 {
        return 0.0;
    }

    let mean = epoch.values().sum::<f64>() / n;
    let var = epoch.values().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    var.sqrt()
}

/// Decide whether a target response is present in the epoch.
///
/// Pure and independent per epoch; safe to evaluate concurrently.
pub fn detect(epoch: &Epoch, threshold_factor: f64) -> bool {
    let std = dispersion(epoch);
    if std == 0.0 {
        return false;
    }

    let peak = epoch.values().map(f64::abs).fold(0.0, f64::max);
    peak > threshold_factor * std
}

/// Detect over a slice of epochs in parallel.
pub fn detect_all(epochs: &[Epoch], threshold_factor: f64) -> Vec<bool> {
    epochs
        .par_iter()
        .map(|epoch| detect(epoch, threshold_factor))
        .collect()
}
