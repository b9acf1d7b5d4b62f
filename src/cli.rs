//! Helpers shared by the `copy-audio` and `reverse-audio` binaries.

use std::process::ExitCode;

use clap::error::ErrorKind;

/// Installs the `env_logger` backend at `level`.
pub fn init_logging(level: log::LevelFilter) {
    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp_millis()
        .init();
}

/// Prints a clap parse failure and maps it to an exit code.
///
/// Help and version requests succeed; every other parse failure exits with 1.
pub fn parse_failure(err: clap::Error) -> ExitCode {
    let _ = err.print();
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    }
}

/// Prints the diagnostic for a failed run and returns the failure exit code.
pub fn run_failure(err: anyhow::Error) -> ExitCode {
    log::debug!("Run failed: {err:?}");
    eprintln!("Error: {err:#}");
    ExitCode::FAILURE
}
