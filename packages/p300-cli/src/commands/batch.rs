use std::path::Path;
use std::time::Instant;

use crate::cli::BatchArgs;
use crate::exit_codes;
use crate::output;
use crate::speller_params;

use p300_rs::parser;

pub fn execute(args: BatchArgs) -> i32 {
    // Resolve file list
    let files = match resolve_files(&args) {
        Ok(f) => f,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            return exit_codes::INPUT_ERROR;
        }
    };

    if files.is_empty() {
        eprintln!("Error: No matching files found");
        return exit_codes::INPUT_ERROR;
    }

    // Dry-run mode: print file list and exit
    if args.dry_run {
        for f in &files {
            println!("{}", f);
        }
        if !args.quiet {
            eprintln!("Found {} file(s)", files.len());
        }
        return exit_codes::SUCCESS;
    }

    let pipeline = match speller_params::build_pipeline(&args.pipeline) {
        Ok(p) => p,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            return exit_codes::INPUT_ERROR;
        }
    };

    // Create output directory if specified
    if let Some(ref dir) = args.output_dir {
        if let Err(e) = std::fs::create_dir_all(dir) {
            eprintln!("Error: Failed to create output directory '{}': {}", dir, e);
            return exit_codes::EXECUTION_ERROR;
        }
    }

    let total = files.len();
    let mut succeeded = 0usize;
    let mut failed = 0usize;
    let start_time = Instant::now();

    for (i, file_path) in files.iter().enumerate() {
        if !args.quiet {
            eprintln!("[{}/{}] {}...", i + 1, total, file_path);
        }

        if let Err(msg) = speller_params::validate_file(file_path) {
            eprintln!("  Error: {}", msg);
            failed += 1;
            if !args.continue_on_error {
                break;
            }
            continue;
        }

        let recording = match parser::load_recording(file_path) {
            Ok(r) => r,
            Err(e) => {
                eprintln!("  Error reading recording: {}", e);
                failed += 1;
                if !args.continue_on_error {
                    break;
                }
                continue;
            }
        };

        // A sibling "<stem>_markers.csv" is picked up when present;
        // otherwise the recording's own annotation track drives epoching.
        let markers = match sibling_markers(file_path) {
            Some(marker_path) => match parser::load_markers(&marker_path) {
                Ok(m) => m,
                Err(e) => {
                    eprintln!("  Error reading markers '{}': {}", marker_path, e);
                    failed += 1;
                    if !args.continue_on_error {
                        break;
                    }
                    continue;
                }
            },
            None => Vec::new(),
        };

        match pipeline.run(&recording, &markers) {
            Ok(result) => {
                if let Some(ref dir) = args.output_dir {
                    let stem = Path::new(file_path)
                        .file_stem()
                        .and_then(|s| s.to_str())
                        .unwrap_or("output");
                    let out_path = Path::new(dir).join(format!("{}_p300.json", stem));
                    let json = match output::to_json(&result, args.compact) {
                        Ok(j) => j,
                        Err(e) => {
                            eprintln!("  Error serializing result: {}", e);
                            failed += 1;
                            if !args.continue_on_error {
                                break;
                            }
                            continue;
                        }
                    };
                    if let Err(e) = output::write_output(&json, out_path.to_str()) {
                        eprintln!("  Error writing output: {}", e);
                        failed += 1;
                        if !args.continue_on_error {
                            break;
                        }
                        continue;
                    }
                } else {
                    // JSONL to stdout
                    let json = match output::to_json(&result, true) {
                        Ok(j) => j,
                        Err(e) => {
                            eprintln!("  Error serializing result: {}", e);
                            failed += 1;
                            if !args.continue_on_error {
                                break;
                            }
                            continue;
                        }
                    };
                    if let Err(e) = output::write_output(&json, None) {
                        eprintln!("  Error writing to stdout: {}", e);
                        failed += 1;
                        if !args.continue_on_error {
                            break;
                        }
                        continue;
                    }
                }
                succeeded += 1;
            }
            Err(e) => {
                eprintln!("  Pipeline execution failed: {}", e);
                failed += 1;
                if !args.continue_on_error {
                    break;
                }
            }
        }
    }

    let elapsed = start_time.elapsed();

    if !args.quiet {
        eprintln!(
            "Batch complete: {}/{} succeeded, {}/{} failed, {:.1}s",
            succeeded,
            total,
            failed,
            total,
            elapsed.as_secs_f64()
        );
    }

    if failed == 0 {
        exit_codes::SUCCESS
    } else if succeeded > 0 {
        exit_codes::PARTIAL_FAILURE
    } else {
        exit_codes::EXECUTION_ERROR
    }
}

fn resolve_files(args: &BatchArgs) -> Result<Vec<String>, String> {
    if let Some(ref pattern) = args.glob {
        resolve_glob(pattern)
    } else if let Some(ref files) = args.files {
        Ok(files.clone())
    } else {
        Err("One of --glob or --files must be specified".to_string())
    }
}

fn resolve_glob(pattern: &str) -> Result<Vec<String>, String> {
    let paths =
        glob::glob(pattern).map_err(|e| format!("Invalid glob pattern '{}': {}", pattern, e))?;

    let mut files: Vec<String> = Vec::new();
    for entry in paths {
        match entry {
            Ok(path) => {
                // Marker files match "*.csv" globs but are not recordings.
                if path.is_file() && sibling_markers_name(&path).is_none() {
                    if let Some(s) = path.to_str() {
                        files.push(s.to_string());
                    }
                }
            }
            Err(e) => {
                eprintln!("Warning: glob error: {}", e);
            }
        }
    }
    files.sort();
    Ok(files)
}

/// Path of the marker file paired with `recording_path`, if it exists on disk.
fn sibling_markers(recording_path: &str) -> Option<String> {
    let path = Path::new(recording_path);
    let stem = path.file_stem()?.to_str()?;
    let marker_path = path.with_file_name(format!("{}_markers.csv", stem));
    if marker_path.is_file() {
        marker_path.to_str().map(str::to_string)
    } else {
        None
    }
}

/// Some(stem) when the path itself follows the "<stem>_markers.csv" convention.
fn sibling_markers_name(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    stem.strip_suffix("_markers").map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::fs;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        batch: BatchArgs,
    }

    fn make_batch_args() -> BatchArgs {
        Wrapper::parse_from(["test"]).batch
    }

    #[test]
    fn test_resolve_files_no_input() {
        let args = make_batch_args();
        let result = resolve_files(&args);
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("must be specified"));
    }

    #[test]
    fn test_resolve_files_explicit_list() {
        let mut args = make_batch_args();
        args.files = Some(vec!["/tmp/a.csv".to_string(), "/tmp/b.csv".to_string()]);
        let result = resolve_files(&args).unwrap();
        assert_eq!(result, vec!["/tmp/a.csv", "/tmp/b.csv"]);
    }

    #[test]
    fn test_resolve_glob_no_matches() {
        let result = resolve_glob("/nonexistent_dir_12345/*.csv").unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_resolve_glob_skips_marker_files() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("session1.csv"), "").unwrap();
        fs::write(tmp.path().join("session1_markers.csv"), "").unwrap();
        fs::write(tmp.path().join("session2.csv"), "").unwrap();

        let pattern = format!("{}/*.csv", tmp.path().to_str().unwrap());
        let result = resolve_glob(&pattern).unwrap();
        assert_eq!(result.len(), 2);
        assert!(result.iter().all(|f| !f.contains("_markers")));
    }

    #[test]
    fn test_sibling_markers_found() {
        let tmp = tempfile::tempdir().unwrap();
        let rec = tmp.path().join("session1.csv");
        fs::write(&rec, "").unwrap();
        fs::write(tmp.path().join("session1_markers.csv"), "").unwrap();

        let found = sibling_markers(rec.to_str().unwrap()).unwrap();
        assert!(found.ends_with("session1_markers.csv"));
    }

    #[test]
    fn test_sibling_markers_absent() {
        let tmp = tempfile::tempdir().unwrap();
        let rec = tmp.path().join("session1.csv");
        fs::write(&rec, "").unwrap();
        assert!(sibling_markers(rec.to_str().unwrap()).is_none());
    }
}
