//! CSV readers for the two artifacts the acquisition side produces.
//!
//! The recording log is `Timestamp,Channel1..ChannelN[,Stimulus,Letter]`:
//! one row per sample, with optional trailing annotation columns written by
//! a preprocessing pass. The marker log is `First Timestamp,Letter`: one
//! row per presented symbol, in time order.

use std::path::Path;

use crate::error::{PipelineError, Result};
use crate::types::{Marker, Recording, Sample};

const NO_LABEL: &str = "NoLetter";

/// Parse a recording CSV. Annotation columns, when present, are carried
/// into the recording's annotation track.
pub fn parse_recording_csv(content: &str) -> Result<Recording> {
    let mut lines = content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'));

    let header = lines
        .next()
        .ok_or_else(|| PipelineError::ParseError("recording file is empty".to_string()))?;
    let columns: Vec<&str> = header.split(',').map(str::trim).collect();

    if !columns
        .first()
        .map(|c| c.eq_ignore_ascii_case("timestamp"))
        .unwrap_or(false)
    {
        return Err(PipelineError::ParseError(format!(
            "expected a Timestamp header column, found '{}'",
            columns.first().unwrap_or(&"")
        )));
    }

    let stimulus_col = columns.iter().position(|c| c.eq_ignore_ascii_case("stimulus"));
    let letter_col = columns.iter().position(|c| c.eq_ignore_ascii_case("letter"));
    let channel_cols: Vec<usize> = (1..columns.len())
        .filter(|i| Some(*i) != stimulus_col && Some(*i) != letter_col)
        .collect();

    if channel_cols.is_empty() {
        return Err(PipelineError::ParseError(
            "recording header declares no channel columns".to_string(),
        ));
    }

    let mut samples = Vec::new();
    let mut annotations: Vec<(usize, String)> = Vec::new();

    for (row, line) in lines.enumerate() {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() != columns.len() {
            return Err(PipelineError::ParseError(format!(
                "row {} has {} fields, header declares {}",
                row + 1,
                fields.len(),
                columns.len()
            )));
        }

        let timestamp = parse_field(fields[0], row, "Timestamp")?;
        let channels = channel_cols
            .iter()
            .map(|&c| parse_field(fields[c], row, columns[c]))
            .collect::<Result<Vec<f64>>>()?;

        if let Some(sc) = stimulus_col {
            let stimulus = parse_field(fields[sc], row, "Stimulus")?;
            if stimulus != 0.0 {
                let label = letter_col
                    .map(|lc| fields[lc])
                    .filter(|l| !l.is_empty() && *l != NO_LABEL)
                    .unwrap_or_default();
                annotations.push((samples.len(), label.to_string()));
            }
        }

        samples.push(Sample::new(timestamp, channels));
    }

    if samples.is_empty() {
        return Err(PipelineError::ParseError(
            "no data rows in recording file".to_string(),
        ));
    }

    let mut recording = Recording::from_samples(samples)?;
    for (index, label) in annotations {
        recording.annotate(index, label);
    }

    log::debug!(
        "Parsed recording: {} samples × {} channels, {} annotated",
        recording.len(),
        recording.n_channels(),
        recording.stimulus_indices().len()
    );

    Ok(recording)
}

/// Parse a marker CSV. A non-numeric first row is treated as the header.
pub fn parse_markers_csv(content: &str) -> Result<Vec<Marker>> {
    let mut markers = Vec::new();

    for (row, line) in content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .enumerate()
    {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();

        // header row
        if row == 0 && fields[0].parse::<f64>().is_err() {
            continue;
        }

        if fields.len() < 2 {
            return Err(PipelineError::ParseError(format!(
                "marker row {} needs a timestamp and a label",
                row + 1
            )));
        }

        let timestamp = parse_field(fields[0], row, "timestamp")?;
        if fields[1].is_empty() {
            return Err(PipelineError::ParseError(format!(
                "marker row {} has an empty label",
                row + 1
            )));
        }
        markers.push(Marker::new(timestamp, fields[1]));
    }

    Ok(markers)
}

/// Read and parse a recording CSV from disk.
pub fn load_recording<P: AsRef<Path>>(path: P) -> Result<Recording> {
    let content = std::fs::read_to_string(path)?;
    parse_recording_csv(&content)
}

/// Read and parse a marker CSV from disk.
pub fn load_markers<P: AsRef<Path>>(path: P) -> Result<Vec<Marker>> {
    let content = std::fs::read_to_string(path)?;
    parse_markers_csv(&content)
}

fn parse_field(field: &str, row: usize, column: &str) -> Result<f64> {
    let value = field.parse::<f64>().map_err(|_| {
        PipelineError::ParseError(format!(
            "row {}: '{}' is not a number in column {}",
            row + 1,
            field,
            column
        ))
    })?;
    if !value.is_finite() {
        return Err(PipelineError::ParseError(format!(
            "row {}: non-finite value in column {}",
            row + 1,
            column
        )));
    }
    Ok(value)
}
