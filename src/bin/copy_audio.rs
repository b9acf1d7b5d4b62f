//! Copies a WAV file byte for byte after checking that it declares a WAVE container.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use wave_ops::{cli, ensure_wav_extension, Pipeline};

/// Copy a PCM WAV file, validating its header first.
#[derive(Parser, Debug)]
#[command(name = "copy-audio")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// WAV file to read.
    input: PathBuf,

    /// Destination file; must end in `.wav`.
    output: PathBuf,

    /// Log level (error, warn, info, debug, trace).
    #[arg(short, long, default_value = "warn", env = "WAVE_OPS_LOG_LEVEL")]
    log_level: log::LevelFilter,
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => return cli::parse_failure(err),
    };
    cli::init_logging(args.log_level);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => cli::run_failure(err),
    }
}

fn run(args: &Args) -> Result<()> {
    ensure_wav_extension(&args.output)?;

    let report = Pipeline::copy()
        .run_files(&args.input, &args.output)
        .with_context(|| {
            format!(
                "unable to copy {} to {}",
                args.input.display(),
                args.output.display()
            )
        })?;

    log::info!(
        "Copied {} channel(s) at {} Hz, {} payload bytes",
        report.header.num_channels,
        report.header.sample_rate,
        report.payload_bytes
    );
    Ok(())
}
