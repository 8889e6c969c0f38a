use std::iter::FusedIterator;

use crate::memops::find_byte;

/// A line-aligned window into the input buffer.
#[derive(Debug, Clone, Copy)]
pub struct Chunk<'a> {
    start: usize,
    bytes: &'a [u8],
}

impl<'a> Chunk<'a> {
    /// Offset of the first byte within the whole buffer.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Offset one past the last byte within the whole buffer.
    pub fn end(&self) -> usize {
        self.start + self.bytes.len()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }
}

/// Splits a buffer into chunks of roughly `target_size` bytes.
///
/// Every chunk but the last ends just past a `\n`; a chunk only grows past
/// `target_size` far enough to reach that terminator. Chunks are produced
/// lazily, in order, and together cover the buffer exactly.
pub struct ChunkScanner<'a> {
    buffer: &'a [u8],
    target_size: usize,
    cursor: usize,
}

impl<'a> ChunkScanner<'a> {
    pub fn new(buffer: &'a [u8], target_size: usize) -> Self {
        ChunkScanner {
            buffer,
            target_size: target_size.max(1),
            cursor: 0,
        }
    }
}

impl<'a> Iterator for ChunkScanner<'a> {
    type Item = Chunk<'a>;

    #[cfg_attr(feature = "profiled", inline(never))]
    fn next(&mut self) -> Option<Chunk<'a>> {
        let len = self.buffer.len();
        if self.cursor >= len {
            return None;
        }

        let start = self.cursor;
        let probe = start.saturating_add(self.target_size).min(len);
        let end = if probe == len {
            len
        } else {
            // The byte at probe - 1 would be the chunk's last at exactly
            // target_size; extend from there to the next terminator.
            match find_byte::<b'\n'>(&self.buffer[probe - 1..]) {
                Some(idx) => probe + idx,
                None => len,
            }
        };

        self.cursor = end;
        Some(Chunk {
            start,
            bytes: &self.buffer[start..end],
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.buffer.len() - self.cursor.min(self.buffer.len());
        let lower = usize::from(remaining > 0);
        (lower, Some(remaining.div_ceil(self.target_size)))
    }
}

impl FusedIterator for ChunkScanner<'_> {}

#[cfg(test)]
mod test {
    use crate::chunk::{Chunk, ChunkScanner};

    const SAMPLE: &[u8] = b"Abha;5.3\nZurich;-12.0\nAbha;0.1\nLas Palmas de Gran Canaria;22.4\nX;1.0\n";

    fn check_cover(buffer: &[u8], chunks: &[Chunk<'_>]) {
        let mut expected_start = 0;
        let mut joined = Vec::new();
        for (i, chunk) in chunks.iter().enumerate() {
            assert!(!chunk.is_empty());
            assert_eq!(chunk.start(), expected_start);
            if i + 1 < chunks.len() {
                assert_eq!(chunk.bytes().last(), Some(&b'\n'));
            }
            joined.extend_from_slice(chunk.bytes());
            expected_start = chunk.end();
        }
        assert_eq!(expected_start, buffer.len());
        assert_eq!(joined, buffer);
    }

    #[test]
    fn test_every_target_size() {
        for target_size in 1..=SAMPLE.len() + 2 {
            let chunks: Vec<_> = ChunkScanner::new(SAMPLE, target_size).collect();
            check_cover(SAMPLE, &chunks);
        }
    }

    #[test]
    fn test_without_trailing_newline() {
        let buffer = &SAMPLE[..SAMPLE.len() - 1];
        for target_size in 1..=buffer.len() + 2 {
            let chunks: Vec<_> = ChunkScanner::new(buffer, target_size).collect();
            check_cover(buffer, &chunks);
            assert_eq!(chunks.last().unwrap().bytes(), b"X;1.0");
        }
    }

    #[test]
    fn test_exact_boundary_is_kept() {
        // "Abha;5.3\n" is nine bytes, so a nine byte target needs no growth.
        let chunks: Vec<_> = ChunkScanner::new(SAMPLE, 9).collect();
        assert_eq!(chunks[0].bytes(), b"Abha;5.3\n");
        assert_eq!(chunks[1].bytes(), b"Zurich;-12.0\n");
    }

    #[test]
    fn test_single_chunk_when_target_exceeds_buffer() {
        let chunks: Vec<_> = ChunkScanner::new(SAMPLE, 1 << 30).collect();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].bytes(), SAMPLE);
    }

    #[test]
    fn test_empty_buffer() {
        assert_eq!(ChunkScanner::new(b"", 16).count(), 0);
        assert_eq!(ChunkScanner::new(b"", 16).size_hint(), (0, Some(0)));
    }

    #[test]
    fn test_zero_target_is_clamped() {
        let chunks: Vec<_> = ChunkScanner::new(SAMPLE, 0).collect();
        check_cover(SAMPLE, &chunks);
        assert_eq!(chunks.len(), 5);
    }
}
