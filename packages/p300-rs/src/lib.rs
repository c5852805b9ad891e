//! Pure Rust P300 speller pipeline.
//!
//! Batch processing of a finalized multi-channel recording plus stimulus
//! markers: zero-phase band-pass filtering, marker-to-sample alignment,
//! epoch extraction, dispersion-relative response detection, and per-cycle
//! majority vote over the detected symbols.

pub mod aggregate;
pub mod align;
pub mod detect;
pub mod epoch;
pub mod error;
pub mod filter;
pub mod parser;
pub mod pipeline;
pub mod presentation;
pub mod types;

pub use error::{PipelineError, Result};
pub use pipeline::SpellerPipeline;
pub use types::*;
