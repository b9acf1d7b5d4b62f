//! Copy and reverse canonical 44-byte PCM WAV files.
//!
//! The crate decodes the fixed RIFF/WAVE header with [`WavHeader::decode`], runs one of
//! the [`Pipeline`] transforms over the payload and writes the result with
//! [`WavHeader::encode`].

use std::io;

pub mod cli;
mod copier;
mod header;
mod pipeline;
mod reverser;
mod stream;

pub use copier::{CopyStats, SampleCopier};
pub use header::{WavHeader, HEADER_LEN};
pub use pipeline::{ensure_wav_extension, Pipeline, Report, Transform};
pub use reverser::{SampleBuffer, SampleReverser, SAMPLE_WIDTH};
pub use stream::{Blocks, DeferredFile};

pub use fallible_streaming_iterator::FallibleStreamingIterator;

/// Specialized Result type for this crate's operations.
pub type Result<T> = std::result::Result<T, Error>;

/// General errors for this crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid usage: {0}")]
    Usage(String),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Invalid WAV file: {0}")]
    Format(&'static str),
    #[error("Unsupported container: expected \"WAVE\", found {:?}", String::from_utf8_lossy(.0))]
    UnsupportedFormat([u8; 4]),
    #[error("Memory allocation failed for {0} bytes")]
    Allocation(usize),
}
