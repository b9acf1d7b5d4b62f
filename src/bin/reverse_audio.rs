//! Writes a copy of a 16-bit PCM WAV file with its samples in reverse order.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use wave_ops::{cli, Pipeline};

/// Reverse the samples of a 16-bit PCM WAV file.
#[derive(Parser, Debug)]
#[command(name = "reverse-audio")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// WAV file to read.
    #[arg(
        default_value = "./nativeSoundClips/Dixie.wav",
        env = "WAVE_OPS_REVERSE_INPUT"
    )]
    input: PathBuf,

    /// File to write the reversed audio to.
    #[arg(
        default_value = "./output/reversedAudio.wav",
        env = "WAVE_OPS_REVERSE_OUTPUT"
    )]
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
        Ok(()) => {
            println!("WAV file reversed successfully");
            ExitCode::SUCCESS
        }
        Err(err) => cli::run_failure(err),
    }
}

fn run(args: &Args) -> Result<()> {
    let report = Pipeline::reverse()
        .run_files(&args.input, &args.output)
        .with_context(|| format!("unable to reverse {}", args.input.display()))?;

    log::info!(
        "Reversed {} samples into {}",
        report.payload_bytes / wave_ops::SAMPLE_WIDTH as u64,
        args.output.display()
    );
    Ok(())
}
