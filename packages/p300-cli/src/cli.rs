use clap::{ArgAction, Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "p300",
    version,
    about = "P300 speller batch pipeline command-line tool",
    long_about = "Run the P300 speller pipeline on recorded EEG sessions (CSV).\n\
                  Filters the recording, extracts stimulus-locked epochs, detects\n\
                  evoked responses, and spells one letter per presentation cycle."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the speller pipeline on one recorded session
    Run(RunArgs),
    /// Run the speller pipeline over many recordings
    Batch(BatchArgs),
    /// Validate a recording file
    Validate(ValidateArgs),
    /// Show CLI version and pipeline defaults
    Info(InfoArgs),
}

#[derive(Args, Clone)]
pub struct PipelineArgs {
    /// Band-pass lower cutoff in Hz
    #[arg(long, default_value_t = 1.0)]
    pub low_hz: f64,

    /// Band-pass upper cutoff in Hz
    #[arg(long, default_value_t = 30.0)]
    pub high_hz: f64,

    /// Sampling rate in Hz
    #[arg(long, default_value_t = 512.0)]
    pub sr: f64,

    /// Butterworth filter order
    #[arg(long, default_value_t = 4)]
    pub order: usize,

    /// Subtract the per-channel mean before filtering
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub remove_mean: bool,

    /// Epoch window start before the stimulus, in seconds
    #[arg(long, default_value_t = 0.2)]
    pub pre: f64,

    /// Epoch window end after the stimulus, in seconds
    #[arg(long, default_value_t = 0.8)]
    pub post: f64,

    /// Detection threshold as a multiple of the population dispersion
    #[arg(long, default_value_t = 3.5)]
    pub threshold: f64,

    /// Epochs per presentation cycle (one vote batch)
    #[arg(long, default_value_t = 22)]
    pub batch_size: usize,

    /// Symbol alphabet as a single string (default: A-P, R-V, Z)
    #[arg(long)]
    pub alphabet: Option<String>,
}

#[derive(Args)]
pub struct RunArgs {
    /// Recording CSV path (Timestamp,Channel1..[,Stimulus,Letter])
    #[arg(long)]
    pub recording: String,

    /// Marker CSV path (First Timestamp,Letter); omit for pre-annotated recordings
    #[arg(long)]
    pub markers: Option<String>,

    #[command(flatten)]
    pub pipeline: PipelineArgs,

    /// Output file (default: stdout)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Compact JSON output (no indentation)
    #[arg(long, default_value_t = false)]
    pub compact: bool,

    /// Suppress progress messages on stderr
    #[arg(long, default_value_t = false)]
    pub quiet: bool,
}

#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern for recording CSVs (e.g. "sessions/*.csv")
    #[arg(long)]
    pub glob: Option<String>,

    /// Explicit recording file list
    #[arg(long, num_args = 1..)]
    pub files: Option<Vec<String>>,

    #[command(flatten)]
    pub pipeline: PipelineArgs,

    /// Directory for per-recording JSON results (default: JSONL to stdout)
    #[arg(long)]
    pub output_dir: Option<String>,

    /// Keep going when a recording fails
    #[arg(long, default_value_t = false)]
    pub continue_on_error: bool,

    /// Print the resolved file list and exit
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    /// Compact JSON output (no indentation)
    #[arg(long, default_value_t = false)]
    pub compact: bool,

    /// Suppress progress messages on stderr
    #[arg(long, default_value_t = false)]
    pub quiet: bool,
}

#[derive(Args)]
pub struct ValidateArgs {
    /// Recording CSV path
    #[arg(long)]
    pub recording: String,

    /// Output as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args)]
pub struct InfoArgs {
    /// Output as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}
