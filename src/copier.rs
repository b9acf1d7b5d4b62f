use std::io::{Read, Write};

use fallible_streaming_iterator::FallibleStreamingIterator;

use crate::stream::Blocks;
use crate::{Result, WavHeader};

/// Totals from one [`SampleCopier::stream`] run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyStats {
    pub blocks: u64,
    pub bytes: u64,
    /// Bytes of an incomplete final block that were read but not written.
    pub dropped_bytes: u64,
}

/// Forwards the payload after the header unchanged, one frame-sized block at a time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SampleCopier;

impl SampleCopier {
    pub fn new() -> Self {
        Self
    }

    /// Block granularity used for `header`.
    pub fn block_size(&self, header: &WavHeader) -> usize {
        header.block_size()
    }

    /// Copies complete blocks of `block_size` bytes from `input` to `output` until the
    /// input runs out. A final partial block is silently dropped.
    pub fn stream<R, W>(
        &self,
        input: &mut R,
        output: &mut W,
        block_size: usize,
    ) -> Result<CopyStats>
    where
        R: Read + ?Sized,
        W: Write + ?Sized,
    {
        if block_size == 0 {
            log::warn!("Block size is 0; no payload will be copied");
        }

        let mut blocks = Blocks::new(input, block_size);
        while let Some(block) = blocks.next()? {
            output.write_all(block)?;
        }

        let stats = CopyStats {
            blocks: blocks.blocks_read(),
            bytes: blocks.blocks_read() * block_size as u64,
            dropped_bytes: blocks.dropped_bytes() as u64,
        };
        if stats.dropped_bytes > 0 {
            log::warn!(
                "Dropped {} trailing bytes that do not fill a {}-byte block",
                stats.dropped_bytes,
                block_size
            );
        }
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Cursor};

    #[test]
    fn copies_complete_blocks_verbatim() {
        let payload: Vec<u8> = (0u8..16).collect();
        let mut out = Vec::new();
        let stats = SampleCopier::new()
            .stream(&mut Cursor::new(payload.clone()), &mut out, 4)
            .unwrap();

        assert_eq!(out, payload);
        assert_eq!(stats.blocks, 4);
        assert_eq!(stats.bytes, 16);
        assert_eq!(stats.dropped_bytes, 0);
    }

    #[test]
    fn partial_trailing_block_is_dropped() {
        let payload: Vec<u8> = (0u8..11).collect();
        let mut out = Vec::new();
        let stats = SampleCopier::new()
            .stream(&mut Cursor::new(payload.clone()), &mut out, 4)
            .unwrap();

        assert_eq!(out, &payload[..8]);
        assert_eq!(stats.blocks, 2);
        assert_eq!(stats.dropped_bytes, 3);
    }

    #[test]
    fn empty_input_copies_nothing() {
        let mut out = Vec::new();
        let stats = SampleCopier::new()
            .stream(&mut io::empty(), &mut out, 4)
            .unwrap();
        assert!(out.is_empty());
        assert_eq!(stats, CopyStats::default());
    }

    #[test]
    fn zero_block_size_copies_nothing() {
        let mut out = Vec::new();
        let stats = SampleCopier::new()
            .stream(&mut Cursor::new(vec![1u8; 32]), &mut out, 0)
            .unwrap();
        assert!(out.is_empty());
        assert_eq!(stats.blocks, 0);
    }

    #[test]
    fn block_size_comes_from_header() {
        let copier = SampleCopier::new();
        assert_eq!(copier.block_size(&WavHeader::pcm(44100, 2, 16, 0)), 4);
        assert_eq!(copier.block_size(&WavHeader::pcm(44100, 1, 24, 0)), 3);
    }

    /// Reader that hands out at most one byte per call.
    struct Trickle(Cursor<Vec<u8>>);

    impl Read for Trickle {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let len = buf.len().min(1);
            self.0.read(&mut buf[..len])
        }
    }

    #[test]
    fn short_reads_still_fill_blocks() {
        let payload: Vec<u8> = (0u8..12).collect();
        let mut out = Vec::new();
        let stats = SampleCopier::new()
            .stream(&mut Trickle(Cursor::new(payload.clone())), &mut out, 6)
            .unwrap();
        assert_eq!(out, payload);
        assert_eq!(stats.blocks, 2);
    }
}
