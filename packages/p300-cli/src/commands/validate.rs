use std::path::Path;

use serde::Serialize;

use crate::cli::ValidateArgs;
use crate::exit_codes;
use crate::output;

use p300_rs::parser;

#[derive(Serialize)]
struct ValidateOutput {
    file: String,
    exists: bool,
    readable: bool,
    parses: bool,
    n_samples: Option<usize>,
    n_channels: Option<usize>,
    n_annotated: Option<usize>,
    error: Option<String>,
}

pub fn execute(args: ValidateArgs) -> i32 {
    let path = Path::new(&args.recording);

    let exists = path.exists();
    let readable = path.is_file() && std::fs::File::open(path).is_ok();

    let parsed = if readable {
        Some(parser::load_recording(path))
    } else {
        None
    };

    let (parses, n_samples, n_channels, n_annotated, parse_error) = match &parsed {
        Some(Ok(rec)) => (
            true,
            Some(rec.len()),
            Some(rec.n_channels()),
            Some(rec.stimulus_indices().len()),
            None,
        ),
        Some(Err(e)) => (false, None, None, None, Some(e.to_string())),
        None => (false, None, None, None, None),
    };

    let error = if !exists {
        Some(format!("File not found: {}", args.recording))
    } else if !readable {
        Some(format!("File is not readable: {}", args.recording))
    } else {
        parse_error
    };

    let result = ValidateOutput {
        file: args.recording.clone(),
        exists,
        readable,
        parses,
        n_samples,
        n_channels,
        n_annotated,
        error: error.clone(),
    };

    if args.json {
        match output::to_json(&result, false) {
            Ok(json) => {
                if let Err(e) = output::write_output(&json, None) {
                    eprintln!("Error: {}", e);
                    return exit_codes::EXECUTION_ERROR;
                }
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                return exit_codes::EXECUTION_ERROR;
            }
        }
    } else if let Some(ref err) = error {
        eprintln!("Error: {}", err);
    } else {
        println!(
            "Recording '{}' is valid ({} samples, {} channels, {} annotated)",
            args.recording,
            n_samples.unwrap_or(0),
            n_channels.unwrap_or(0),
            n_annotated.unwrap_or(0)
        );
    }

    if error.is_some() {
        exit_codes::INPUT_ERROR
    } else {
        exit_codes::SUCCESS
    }
}
