use std::fs::File;
use std::io::{self, BufWriter, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use aligned_vec::{AVec, CACHELINE_ALIGN};
use fallible_streaming_iterator::FallibleStreamingIterator;

use crate::{Error, Result};

/// Reads little-endian header fields from a stream, tracking how many bytes were consumed.
pub(crate) struct FieldReader<'a, R: Read + ?Sized> {
    reader: &'a mut R,
    abs_pos: u64,
}

impl<'a, R: Read + ?Sized> FieldReader<'a, R> {
    pub fn new(reader: &'a mut R) -> Self {
        Self { reader, abs_pos: 0 }
    }

    /// Reads exactly `N` bytes. A short stream is reported as a truncated header.
    pub fn read_exact<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut result = [0u8; N];
        match self.reader.read_exact(&mut result) {
            Ok(()) => {
                self.abs_pos += N as u64;
                Ok(result)
            }
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                log::debug!("Header ended after {} bytes", self.abs_pos);
                Err(Error::Format("truncated header"))
            }
            Err(e) => Err(e.into()),
        }
    }

    #[inline]
    pub fn read_u16_le(&mut self) -> Result<u16> {
        let bytes = self.read_exact::<2>()?;
        Ok(u16::from_le_bytes(bytes))
    }

    #[inline]
    pub fn read_u32_le(&mut self) -> Result<u32> {
        let bytes = self.read_exact::<4>()?;
        Ok(u32::from_le_bytes(bytes))
    }

    pub fn position(&self) -> u64 {
        self.abs_pos
    }
}

/// Fills `buf` from `reader`, stopping early only at end of stream.
/// Returns the number of bytes placed in `buf`.
pub(crate) fn fill_buf<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Yields consecutive fixed-size blocks from a reader.
///
/// Iteration ends at the first block that cannot be filled completely; the bytes of
/// that partial block are counted in [`Blocks::dropped_bytes`] but never yielded.
/// A block size of zero yields nothing.
pub struct Blocks<'a, R: Read + ?Sized> {
    reader: &'a mut R,
    block: AVec<u8>,
    has_block: bool,
    finished: bool,
    blocks_read: u64,
    dropped_bytes: usize,
}

impl<'a, R: Read + ?Sized> Blocks<'a, R> {
    pub fn new(reader: &'a mut R, block_size: usize) -> Self {
        let block = AVec::from_iter(CACHELINE_ALIGN, std::iter::repeat(0u8).take(block_size));
        Self {
            reader,
            block,
            has_block: false,
            finished: block_size == 0,
            blocks_read: 0,
            dropped_bytes: 0,
        }
    }

    /// Number of complete blocks yielded so far.
    pub fn blocks_read(&self) -> u64 {
        self.blocks_read
    }

    /// Size of the incomplete trailing block, once iteration has finished.
    pub fn dropped_bytes(&self) -> usize {
        self.dropped_bytes
    }
}

impl<'a, R: Read + ?Sized> FallibleStreamingIterator for Blocks<'a, R> {
    type Item = [u8];
    type Error = Error;

    fn advance(&mut self) -> std::result::Result<(), Self::Error> {
        if self.finished {
            self.has_block = false;
            return Ok(());
        }

        let n = fill_buf(&mut *self.reader, &mut self.block)?;
        if n == self.block.len() {
            self.has_block = true;
            self.blocks_read += 1;
        } else {
            self.has_block = false;
            self.finished = true;
            self.dropped_bytes = n;
        }
        Ok(())
    }

    fn get(&self) -> Option<&Self::Item> {
        if self.has_block {
            Some(&self.block[..])
        } else {
            None
        }
    }
}

/// A buffered output file that is only created on the first write.
///
/// Pipelines that fail before producing output therefore leave no file behind.
#[derive(Debug)]
pub struct DeferredFile {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
}

impl DeferredFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            writer: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the underlying file has been created yet.
    pub fn is_created(&self) -> bool {
        self.writer.is_some()
    }

    fn writer(&mut self) -> io::Result<&mut BufWriter<File>> {
        let writer = match self.writer.take() {
            Some(writer) => writer,
            None => {
                let file = File::create(&self.path).map_err(|e| {
                    io::Error::new(
                        e.kind(),
                        format!("unable to create {}: {e}", self.path.display()),
                    )
                })?;
                log::debug!("Created output file {}", self.path.display());
                BufWriter::new(file)
            }
        };
        Ok(self.writer.insert(writer))
    }
}

impl Write for DeferredFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writer()?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.writer.as_mut() {
            Some(writer) => writer.flush(),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn field_reader_reads_little_endian() {
        let mut cursor = Cursor::new(vec![0x34, 0x12, 0x78, 0x56, 0x34, 0x12]);
        let mut fields = FieldReader::new(&mut cursor);
        assert_eq!(fields.read_u16_le().unwrap(), 0x1234);
        assert_eq!(fields.read_u32_le().unwrap(), 0x1234_5678);
        assert_eq!(fields.position(), 6);
    }

    #[test]
    fn field_reader_short_stream_is_format_error() {
        let mut cursor = Cursor::new(vec![1u8, 2, 3]);
        let mut fields = FieldReader::new(&mut cursor);
        match fields.read_u32_le() {
            Err(Error::Format(msg)) => assert_eq!(msg, "truncated header"),
            other => panic!("Expected Format error, got {:?}", other),
        }
    }

    #[test]
    fn blocks_stop_at_partial_block() {
        let mut cursor = Cursor::new((0u8..10).collect::<Vec<_>>());
        let mut blocks = Blocks::new(&mut cursor, 4);

        assert_eq!(blocks.next().unwrap(), Some(&[0u8, 1, 2, 3][..]));
        assert_eq!(blocks.next().unwrap(), Some(&[4u8, 5, 6, 7][..]));
        assert_eq!(blocks.next().unwrap(), None);
        assert_eq!(blocks.next().unwrap(), None);
        assert_eq!(blocks.blocks_read(), 2);
        assert_eq!(blocks.dropped_bytes(), 2);
    }

    #[test]
    fn blocks_exact_multiple_drops_nothing() {
        let mut cursor = Cursor::new(vec![9u8; 8]);
        let mut blocks = Blocks::new(&mut cursor, 2);
        let mut count = 0;
        while let Some(block) = blocks.next().unwrap() {
            assert_eq!(block, &[9, 9]);
            count += 1;
        }
        assert_eq!(count, 4);
        assert_eq!(blocks.dropped_bytes(), 0);
    }

    #[test]
    fn zero_block_size_yields_nothing() {
        let mut cursor = Cursor::new(vec![1u8; 16]);
        let mut blocks = Blocks::new(&mut cursor, 0);
        assert!(blocks.next().unwrap().is_none());
        assert_eq!(blocks.blocks_read(), 0);
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn deferred_file_is_created_on_first_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");
        let mut file = DeferredFile::new(&path);

        file.flush().unwrap();
        assert!(!path.exists());
        assert!(!file.is_created());

        file.write_all(b"RIFF").unwrap();
        file.flush().unwrap();
        assert!(file.is_created());
        assert_eq!(std::fs::read(&path).unwrap(), b"RIFF");
    }

    #[test]
    fn deferred_file_reports_create_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.wav");
        let mut file = DeferredFile::new(&path);
        let err = file.write_all(b"RIFF").unwrap_err();
        assert!(err.to_string().contains("unable to create"));
    }
}
