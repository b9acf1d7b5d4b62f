use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::Path;

use enum_dispatch::enum_dispatch;

use crate::stream::DeferredFile;
use crate::{Error, Result, SampleCopier, SampleReverser, WavHeader, SAMPLE_WIDTH};

/// Outcome of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Report {
    /// Header as written to the output.
    pub header: WavHeader,
    /// Payload bytes written after the header.
    pub payload_bytes: u64,
    /// Input bytes that were read but did not fit a whole block or sample.
    pub dropped_bytes: u64,
}

/// A payload transform that sits between header decode and encode.
#[enum_dispatch]
pub trait Transform {
    fn name(&self) -> &'static str;

    /// Writes `header`, adjusted as the transform requires, followed by the transformed
    /// payload read from `input`. `input` is positioned right after the header.
    fn apply(&self, header: WavHeader, input: &mut dyn Read, output: &mut dyn Write)
        -> Result<Report>;
}

impl Transform for SampleCopier {
    fn name(&self) -> &'static str {
        "copy"
    }

    fn apply(
        &self,
        header: WavHeader,
        input: &mut dyn Read,
        output: &mut dyn Write,
    ) -> Result<Report> {
        let block_size = self.block_size(&header);
        log::debug!("Copying payload in {block_size}-byte blocks");

        header.encode(&mut *output)?;
        let stats = self.stream(input, output, block_size)?;

        Ok(Report {
            header,
            payload_bytes: stats.bytes,
            dropped_bytes: stats.dropped_bytes,
        })
    }
}

impl Transform for SampleReverser {
    fn name(&self) -> &'static str {
        "reverse"
    }

    fn apply(
        &self,
        mut header: WavHeader,
        input: &mut dyn Read,
        output: &mut dyn Write,
    ) -> Result<Report> {
        let sample_count = header.sample_count();
        let dropped_bytes = header.subchunk2_size as u64 % SAMPLE_WIDTH as u64;
        if dropped_bytes > 0 {
            log::warn!(
                "Data size {} is not a whole number of samples; ignoring the trailing byte",
                header.subchunk2_size
            );
        }

        let samples = self.load_samples(input, sample_count)?;
        let reversed = self.reverse(&samples)?;
        drop(samples);

        header.update_chunk_size();
        header.encode(&mut *output)?;
        self.write_samples(output, reversed)?;

        Ok(Report {
            header,
            payload_bytes: (sample_count * SAMPLE_WIDTH) as u64,
            dropped_bytes,
        })
    }
}

/// The transforms available to the command-line tools.
#[enum_dispatch(Transform)]
#[derive(Debug, Clone, Copy)]
pub enum Pipeline {
    SampleCopier,
    SampleReverser,
}

impl Pipeline {
    pub fn copy() -> Self {
        SampleCopier::new().into()
    }

    pub fn reverse() -> Self {
        SampleReverser::new().into()
    }

    /// Decodes the header from `input` and applies the transform, writing to `output`.
    ///
    /// Nothing is written to `output` when the header fails to decode.
    pub fn run<R, W>(&self, input: &mut R, output: &mut W) -> Result<Report>
    where
        R: Read,
        W: Write,
    {
        let header = WavHeader::decode(&mut *input)?;
        let report = self.apply(header, input, output)?;
        output.flush()?;
        Ok(report)
    }

    /// Runs the pipeline from the file at `input` to the file at `output`.
    ///
    /// The output file is only created once the transform writes its first byte, so a
    /// rejected input leaves no output behind.
    pub fn run_files(&self, input: &Path, output: &Path) -> Result<Report> {
        let file = File::open(input).map_err(|e| {
            io::Error::new(e.kind(), format!("unable to open {}: {e}", input.display()))
        })?;
        let mut reader = BufReader::new(file);
        let mut writer = DeferredFile::new(output);

        let report = self.run(&mut reader, &mut writer)?;
        log::info!(
            "{}: {} -> {} ({} payload bytes, {} dropped, {:.2}s of audio)",
            self.name(),
            input.display(),
            writer.path().display(),
            report.payload_bytes,
            report.dropped_bytes,
            report.header.duration_seconds()
        );
        Ok(report)
    }
}

/// Rejects output paths that do not end in `.wav`.
pub fn ensure_wav_extension(path: &Path) -> Result<()> {
    if path.as_os_str().to_string_lossy().ends_with(".wav") {
        Ok(())
    } else {
        Err(Error::Usage(format!(
            "output file {} must have a .wav extension",
            path.display()
        )))
    }
}
