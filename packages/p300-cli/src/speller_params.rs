//! Argument validation and pipeline construction shared by run and batch.

use std::path::Path;

use p300_rs::{PipelineConfig, SpellerPipeline};

use crate::cli::PipelineArgs;

/// Check that a recording path exists, is a regular file, and looks like CSV.
pub fn validate_file(path: &str) -> Result<(), String> {
    let p = Path::new(path);
    if !p.exists() {
        return Err(format!("File not found: {}", path));
    }
    if !p.is_file() {
        return Err(format!("Not a regular file: {}", path));
    }
    let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
    if !ext.eq_ignore_ascii_case("csv") && !ext.eq_ignore_ascii_case("txt") {
        return Err(format!(
            "Unsupported file extension '{}'. Supported: csv, txt",
            ext
        ));
    }
    Ok(())
}

/// Build a `PipelineConfig` from the shared CLI flags.
pub fn build_config(args: &PipelineArgs) -> Result<PipelineConfig, String> {
    let alphabet = match &args.alphabet {
        Some(s) => parse_alphabet(s)?,
        None => PipelineConfig::default().alphabet,
    };

    Ok(PipelineConfig {
        low_hz: args.low_hz,
        high_hz: args.high_hz,
        sample_rate: args.sr,
        filter_order: args.order,
        remove_mean: args.remove_mean,
        pre_offset_seconds: args.pre,
        post_offset_seconds: args.post,
        threshold_factor: args.threshold,
        batch_size: args.batch_size,
        alphabet,
    })
}

/// Build and eagerly validate the pipeline from CLI flags.
pub fn build_pipeline(args: &PipelineArgs) -> Result<SpellerPipeline, String> {
    let config = build_config(args)?;
    SpellerPipeline::new(config).map_err(|e| e.to_string())
}

/// Parse an alphabet string: one symbol per character, duplicates rejected.
pub fn parse_alphabet(s: &str) -> Result<Vec<String>, String> {
    let symbols: Vec<String> = s.chars().map(|c| c.to_string()).collect();
    if symbols.is_empty() {
        return Err("Alphabet must contain at least one symbol".to_string());
    }
    for (i, sym) in symbols.iter().enumerate() {
        if symbols[..i].contains(sym) {
            return Err(format!("Alphabet contains duplicate symbol '{}'", sym));
        }
    }
    Ok(symbols)
}
