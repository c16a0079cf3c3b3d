//! Pull-based byte sources for the scanner
//!
//! A source hands out chunks in order until it is exhausted. It is finite
//! and cannot be restarted. The consumer calls [`ChunkSource::cancel`] once
//! it has reached a decision, after which the source must release its
//! resources and yield nothing more.

use std::io::{self, Read};

/// Default number of bytes handed out per pull.
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

pub trait ChunkSource {
    /// Next chunk in stream order, or `None` once the stream has ended.
    ///
    /// Empty chunks are allowed and carry no meaning.
    fn next_chunk(&mut self) -> io::Result<Option<&[u8]>>;

    /// Stop producing chunks and release whatever backs the source.
    fn cancel(&mut self);
}

impl<S: ChunkSource + ?Sized> ChunkSource for &mut S {
    fn next_chunk(&mut self) -> io::Result<Option<&[u8]>> {
        (**self).next_chunk()
    }

    fn cancel(&mut self) {
        (**self).cancel()
    }
}

/// Chunks read from any [`Read`] implementation, e.g. a file or request body.
pub struct ReaderSource<R> {
    reader: Option<R>,
    buf: Vec<u8>,
}

impl<R: Read> ReaderSource<R> {
    pub fn new(reader: R) -> Self {
        Self::with_chunk_size(reader, DEFAULT_CHUNK_SIZE)
    }

    pub fn with_chunk_size(reader: R, chunk_size: usize) -> Self {
        ReaderSource {
            reader: Some(reader),
            buf: vec![0u8; chunk_size.max(1)],
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.reader.is_none()
    }
}

impl<R: Read> ChunkSource for ReaderSource<R> {
    fn next_chunk(&mut self) -> io::Result<Option<&[u8]>> {
        let Some(reader) = self.reader.as_mut() else {
            return Ok(None);
        };

        loop {
            match reader.read(&mut self.buf) {
                Ok(0) => {
                    self.reader = None;
                    return Ok(None);
                }
                Ok(n) => return Ok(Some(&self.buf[..n])),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    fn cancel(&mut self) {
        // Dropping the reader closes files and sockets.
        self.reader = None;
    }
}

/// Fixed-size chunks over an in-memory document.
pub struct SliceSource<'a> {
    data: &'a [u8],
    chunk_size: usize,
    pos: usize,
    cancelled: bool,
}

impl<'a> SliceSource<'a> {
    pub fn new(data: &'a [u8], chunk_size: usize) -> Self {
        SliceSource {
            data,
            chunk_size: chunk_size.max(1),
            pos: 0,
            cancelled: false,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Bytes handed out so far.
    #[cfg(test)]
    fn position(&self) -> usize {
        self.pos
    }
}

impl ChunkSource for SliceSource<'_> {
    fn next_chunk(&mut self) -> io::Result<Option<&[u8]>> {
        if self.cancelled || self.pos >= self.data.len() {
            return Ok(None);
        }

        let end = (self.pos + self.chunk_size).min(self.data.len());
        let chunk = &self.data[self.pos..end];
        self.pos = end;
        Ok(Some(chunk))
    }

    fn cancel(&mut self) {
        self.cancelled = true;
    }
}
