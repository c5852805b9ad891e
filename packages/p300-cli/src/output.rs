//! JSON result writing shared by the `p300` subcommands.

use std::io::Write;
use std::path::Path;

/// Write a serialized result to a file, or to stdout with a trailing
/// newline (so batch mode emits valid JSONL).
pub fn write_output(json: &str, output_path: Option<&str>) -> Result<(), String> {
    match output_path {
        Some(path) => std::fs::write(Path::new(path), json)
            .map_err(|e| format!("Could not write results to '{}': {}", path, e)),
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(json.as_bytes())
                .and_then(|_| handle.write_all(b"\n"))
                .map_err(|e| format!("Could not write results to stdout: {}", e))
        }
    }
}

/// Serialize a result value: pretty by default, one line when `compact`.
pub fn to_json<T: serde::Serialize>(value: &T, compact: bool) -> Result<String, String> {
    let rendered = if compact {
        serde_json::to_string(value)
    } else {
        serde_json::to_string_pretty(value)
    };
    rendered.map_err(|e| format!("Could not serialize results: {}", e))
}
