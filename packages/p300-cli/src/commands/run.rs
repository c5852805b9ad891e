use crate::cli::RunArgs;
use crate::exit_codes;
use crate::output;
use crate::speller_params;

use p300_rs::parser;

pub fn execute(args: RunArgs) -> i32 {
    // Validate input files
    if let Err(msg) = speller_params::validate_file(&args.recording) {
        eprintln!("Error: {}", msg);
        return exit_codes::INPUT_ERROR;
    }
    if let Some(ref markers) = args.markers {
        if let Err(msg) = speller_params::validate_file(markers) {
            eprintln!("Error: {}", msg);
            return exit_codes::INPUT_ERROR;
        }
    }

    // Build pipeline (validates band, offsets, threshold, batch size)
    let pipeline = match speller_params::build_pipeline(&args.pipeline) {
        Ok(p) => p,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            return exit_codes::INPUT_ERROR;
        }
    };

    // Load inputs
    let recording = match parser::load_recording(&args.recording) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error reading recording '{}': {}", args.recording, e);
            return exit_codes::INPUT_ERROR;
        }
    };
    let markers = match &args.markers {
        Some(path) => match parser::load_markers(path) {
            Ok(m) => m,
            Err(e) => {
                eprintln!("Error reading markers '{}': {}", path, e);
                return exit_codes::INPUT_ERROR;
            }
        },
        None => Vec::new(),
    };

    if !args.quiet {
        eprintln!("Running speller pipeline on {}...", args.recording);
        eprintln!(
            "  Band: {}-{} Hz (order {}), sr {} Hz",
            args.pipeline.low_hz, args.pipeline.high_hz, args.pipeline.order, args.pipeline.sr
        );
        eprintln!(
            "  Epoch: -{}s..+{}s, threshold {}x, batch {}",
            args.pipeline.pre, args.pipeline.post, args.pipeline.threshold, args.pipeline.batch_size
        );
    }

    match pipeline.run(&recording, &markers) {
        Ok(result) => match output::to_json(&result, args.compact) {
            Ok(json) => {
                if let Err(e) = output::write_output(&json, args.output.as_deref()) {
                    eprintln!("Error: {}", e);
                    return exit_codes::EXECUTION_ERROR;
                }
                if !args.quiet {
                    let spelled: String = result
                        .predictions
                        .iter()
                        .map(|p| p.label.as_deref().unwrap_or("_"))
                        .collect();
                    eprintln!("Spelled: {}", spelled);
                    if let Some(ref path) = args.output {
                        eprintln!("Results written to {}", path);
                    }
                }
                exit_codes::SUCCESS
            }
            Err(e) => {
                eprintln!("Error serializing result: {}", e);
                exit_codes::EXECUTION_ERROR
            }
        },
        Err(e) => {
            eprintln!("Pipeline execution failed: {}", e);
            exit_codes::EXECUTION_ERROR
        }
    }
}
