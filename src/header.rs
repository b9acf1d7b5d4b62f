use std::io::{Read, Write};

use crate::stream::FieldReader;
use crate::{Error, Result};

/// Size in bytes of the canonical RIFF/WAVE header this crate reads and writes.
pub const HEADER_LEN: usize = 44;

/// Bytes of the header counted before `chunk_size` starts covering the file.
const RIFF_PREAMBLE_LEN: u32 = 8;

/// The fixed 44-byte header of a canonical PCM WAV file.
///
/// Fields are kept exactly as found on disk so that an untouched header encodes back
/// to the same bytes. Only the `format` tag is validated on decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavHeader {
    pub chunk_id: [u8; 4],
    /// File length minus the 8 bytes of `chunk_id` and this field.
    pub chunk_size: u32,
    pub format: [u8; 4],
    pub subchunk1_id: [u8; 4],
    pub subchunk1_size: u32,
    /// 1 for linear PCM.
    pub audio_format: u16,
    pub num_channels: u16,
    pub sample_rate: u32,
    pub byte_rate: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
    pub subchunk2_id: [u8; 4],
    /// Length of the sample payload following the header.
    pub subchunk2_size: u32,
}

impl WavHeader {
    pub const RIFF_ID: [u8; 4] = *b"RIFF";
    pub const WAVE_ID: [u8; 4] = *b"WAVE";
    pub const FMT_ID: [u8; 4] = *b"fmt ";
    pub const DATA_ID: [u8; 4] = *b"data";

    /// Builds a PCM header describing `data_size` bytes of payload.
    pub fn pcm(sample_rate: u32, num_channels: u16, bits_per_sample: u16, data_size: u32) -> Self {
        let block_align = num_channels.wrapping_mul(bits_per_sample / 8);
        let mut header = Self {
            chunk_id: Self::RIFF_ID,
            chunk_size: 0,
            format: Self::WAVE_ID,
            subchunk1_id: Self::FMT_ID,
            subchunk1_size: 16,
            audio_format: 1,
            num_channels,
            sample_rate,
            byte_rate: sample_rate.wrapping_mul(block_align as u32),
            block_align,
            bits_per_sample,
            subchunk2_id: Self::DATA_ID,
            subchunk2_size: data_size,
        };
        header.update_chunk_size();
        header
    }

    /// Reads a header from the start of `reader` and checks that it declares a WAVE container.
    ///
    /// # Errors
    /// `Error::Format` if fewer than [`HEADER_LEN`] bytes are available,
    /// `Error::UnsupportedFormat` if the format tag is not `WAVE`.
    pub fn decode<R: Read + ?Sized>(reader: &mut R) -> Result<Self> {
        let mut fields = FieldReader::new(reader);

        let header = Self {
            chunk_id: fields.read_exact::<4>()?,
            chunk_size: fields.read_u32_le()?,
            format: fields.read_exact::<4>()?,
            subchunk1_id: fields.read_exact::<4>()?,
            subchunk1_size: fields.read_u32_le()?,
            audio_format: fields.read_u16_le()?,
            num_channels: fields.read_u16_le()?,
            sample_rate: fields.read_u32_le()?,
            byte_rate: fields.read_u32_le()?,
            block_align: fields.read_u16_le()?,
            bits_per_sample: fields.read_u16_le()?,
            subchunk2_id: fields.read_exact::<4>()?,
            subchunk2_size: fields.read_u32_le()?,
        };
        debug_assert_eq!(fields.position(), HEADER_LEN as u64);

        if !header.is_wave() {
            return Err(Error::UnsupportedFormat(header.format));
        }

        log::debug!(
            "Decoded header: format={}, channels={}, rate={} Hz, bits={}, data={} bytes",
            header.audio_format,
            header.num_channels,
            header.sample_rate,
            header.bits_per_sample,
            header.subchunk2_size
        );
        if header.bits_per_sample % 8 != 0 {
            log::warn!(
                "bits_per_sample {} is not a multiple of 8; sizes derived from it are truncated",
                header.bits_per_sample
            );
        }

        Ok(header)
    }

    /// Writes the header verbatim. No validation is performed.
    pub fn encode<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&self.to_bytes())?;
        Ok(())
    }

    /// Serializes the header into its little-endian on-disk layout.
    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];
        out[0..4].copy_from_slice(&self.chunk_id);
        out[4..8].copy_from_slice(&self.chunk_size.to_le_bytes());
        out[8..12].copy_from_slice(&self.format);
        out[12..16].copy_from_slice(&self.subchunk1_id);
        out[16..20].copy_from_slice(&self.subchunk1_size.to_le_bytes());
        out[20..22].copy_from_slice(&self.audio_format.to_le_bytes());
        out[22..24].copy_from_slice(&self.num_channels.to_le_bytes());
        out[24..28].copy_from_slice(&self.sample_rate.to_le_bytes());
        out[28..32].copy_from_slice(&self.byte_rate.to_le_bytes());
        out[32..34].copy_from_slice(&self.block_align.to_le_bytes());
        out[34..36].copy_from_slice(&self.bits_per_sample.to_le_bytes());
        out[36..40].copy_from_slice(&self.subchunk2_id);
        out[40..44].copy_from_slice(&self.subchunk2_size.to_le_bytes());
        out
    }

    pub fn is_wave(&self) -> bool {
        self.format == Self::WAVE_ID
    }

    /// Bytes per frame as derived from the channel count and bit depth.
    ///
    /// Bit depths that are not a multiple of 8 are truncated by the integer division.
    pub fn block_size(&self) -> usize {
        self.num_channels as usize * (self.bits_per_sample / 8) as usize
    }

    /// Recomputes `chunk_size` from `subchunk2_size` for a header-plus-payload file.
    pub fn update_chunk_size(&mut self) {
        self.chunk_size = (HEADER_LEN as u32 - RIFF_PREAMBLE_LEN).wrapping_add(self.subchunk2_size);
    }

    /// Number of whole 16-bit samples in the payload. A trailing odd byte is not counted.
    pub fn sample_count(&self) -> usize {
        self.subchunk2_size as usize / crate::SAMPLE_WIDTH
    }

    /// Number of whole frames in the payload, or 0 when the block size is degenerate.
    pub fn frame_count(&self) -> u64 {
        match self.block_size() {
            0 => 0,
            size => self.subchunk2_size as u64 / size as u64,
        }
    }

    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate > 0 {
            self.frame_count() as f64 / self.sample_rate as f64
        } else {
            0.0
        }
    }
}
