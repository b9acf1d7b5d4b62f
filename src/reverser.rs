use std::io::{Read, Write};

use crate::{Error, Result};

/// Width in bytes of one sample handled by the reverser (16-bit signed PCM).
pub const SAMPLE_WIDTH: usize = std::mem::size_of::<i16>();

/// An owned run of 16-bit samples in native byte order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampleBuffer {
    samples: Vec<i16>,
}

impl SampleBuffer {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn as_slice(&self) -> &[i16] {
        &self.samples
    }

    pub fn into_vec(self) -> Vec<i16> {
        self.samples
    }
}

impl From<Vec<i16>> for SampleBuffer {
    fn from(samples: Vec<i16>) -> Self {
        Self { samples }
    }
}

/// Loads the whole payload as 16-bit samples and writes it back in reverse order.
#[derive(Debug, Clone, Copy, Default)]
pub struct SampleReverser;

impl SampleReverser {
    pub fn new() -> Self {
        Self
    }

    /// Reads `sample_count` little-endian 16-bit samples from `input`.
    ///
    /// Buffers are only reserved up front; memory is touched as payload bytes arrive, so a
    /// header that overstates its data size fails on the short read.
    ///
    /// # Errors
    /// `Error::Allocation` if a buffer cannot be reserved, `Error::Format` if the
    /// stream ends before `sample_count` samples were read.
    pub fn load_samples<R: Read + ?Sized>(
        &self,
        input: &mut R,
        sample_count: usize,
    ) -> Result<SampleBuffer> {
        let byte_len = sample_count.saturating_mul(SAMPLE_WIDTH);
        let mut bytes = Vec::new();
        bytes
            .try_reserve_exact(byte_len)
            .map_err(|_| Error::Allocation(byte_len))?;

        let read = input.take(byte_len as u64).read_to_end(&mut bytes)?;
        if read < byte_len {
            log::debug!("Payload ended after {read} of {byte_len} declared bytes");
            return Err(Error::Format("sample payload shorter than declared data size"));
        }

        let mut samples = Vec::new();
        samples
            .try_reserve_exact(sample_count)
            .map_err(|_| Error::Allocation(byte_len))?;
        samples.extend(
            bytes
                .chunks_exact(SAMPLE_WIDTH)
                .map(|pair| i16::from_le_bytes([pair[0], pair[1]])),
        );
        Ok(SampleBuffer::from(samples))
    }

    /// Returns a new buffer holding the samples of `buffer` in reverse order.
    pub fn reverse(&self, buffer: &SampleBuffer) -> Result<SampleBuffer> {
        let mut reversed = Vec::new();
        reversed
            .try_reserve_exact(buffer.len())
            .map_err(|_| Error::Allocation(buffer.len().saturating_mul(SAMPLE_WIDTH)))?;
        reversed.extend(buffer.samples.iter().rev());
        Ok(SampleBuffer::from(reversed))
    }

    /// Writes `buffer` as little-endian 16-bit samples, consuming it.
    pub fn write_samples<W: Write + ?Sized>(
        &self,
        output: &mut W,
        buffer: SampleBuffer,
    ) -> Result<()> {
        let mut samples = buffer.into_vec();
        for sample in samples.iter_mut() {
            *sample = sample.to_le();
        }
        output.write_all(bytemuck::cast_slice(samples.as_slice()))?;
        Ok(())
    }
}
