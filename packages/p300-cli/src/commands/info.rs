use serde::Serialize;

use crate::cli::InfoArgs;
use crate::exit_codes;
use crate::output;

use p300_rs::PipelineConfig;

#[derive(Serialize)]
struct InfoOutput {
    cli_version: String,
    platform: String,
    arch: String,
    defaults: PipelineConfig,
}

pub fn execute(args: InfoArgs) -> i32 {
    let defaults = PipelineConfig::default();
    let info = InfoOutput {
        cli_version: env!("CARGO_PKG_VERSION").to_string(),
        platform: std::env::consts::OS.to_string(),
        arch: std::env::consts::ARCH.to_string(),
        defaults,
    };

    if args.json {
        match output::to_json(&info, false) {
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
    } else {
        println!("p300 CLI v{}", info.cli_version);
        println!("Platform: {} ({})", info.platform, info.arch);
        println!();
        println!(
            "Default band: {}-{} Hz (order {}), sr {} Hz",
            info.defaults.low_hz,
            info.defaults.high_hz,
            info.defaults.filter_order,
            info.defaults.sample_rate
        );
        println!(
            "Default epoch: -{}s..+{}s, threshold {}x, batch {}",
            info.defaults.pre_offset_seconds,
            info.defaults.post_offset_seconds,
            info.defaults.threshold_factor,
            info.defaults.batch_size
        );
        println!("Alphabet: {}", info.defaults.alphabet.join(""));
    }

    exit_codes::SUCCESS
}
