// SPDX-License-Identifier: Apache-2.0

//! A buffered, random-access window over a seekable byte source (§4.A).
//!
//! `ByteStream` keeps a forward-scanning buffer so that lexing a multi-
//! megabyte STEP file does not issue a syscall per byte, while still
//! allowing out-of-band random reads (`read_at`) for re-lexing a literal
//! whose offset was captured earlier. `read_at` restores the forward cursor
//! afterwards rather than disturbing the scan in progress.

use std::fs::File;
use std::io::{self, Cursor, Read, Seek, SeekFrom};
use std::path::Path;

/// Anything the stream can be built on: a seekable byte source.
pub trait RandomAccessRead: Read + Seek {}
impl<T: Read + Seek> RandomAccessRead for T {}

const BUF_CHUNK: usize = 64 * 1024;

/// A byte-addressable, buffered window over a file-like source.
///
/// Invariant: while not at end of file, `buf[pos]` is the byte under the
/// cursor; `tell()` always equals `buf_start + pos`.
pub struct ByteStream<R> {
    reader: R,
    buf: Vec<u8>,
    buf_start: u64,
    pos: usize,
    eof: bool,
}

impl ByteStream<File> {
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = File::open(path)?;
        Self::new(file)
    }
}

impl ByteStream<Cursor<Vec<u8>>> {
    pub fn from_bytes(bytes: Vec<u8>) -> io::Result<Self> { Self::new(Cursor::new(bytes)) }
}

impl<R: RandomAccessRead> ByteStream<R> {
    pub fn new(reader: R) -> io::Result<Self> {
        let mut stream = ByteStream { reader, buf: Vec::new(), buf_start: 0, pos: 0, eof: false };
        stream.refill()?;
        Ok(stream)
    }

    /// Current absolute offset of the cursor.
    pub fn tell(&self) -> u64 { self.buf_start + self.pos as u64 }

    /// True once the cursor has passed the last byte of the source.
    pub fn is_eof(&self) -> bool { self.eof && self.pos >= self.buf.len() }

    /// Byte under the cursor, without moving it.
    pub fn peek(&mut self) -> io::Result<Option<u8>> {
        if self.pos >= self.buf.len() && !self.eof {
            self.refill()?;
        }
        Ok(self.buf.get(self.pos).copied())
    }

    /// Move the cursor forward by one byte.
    pub fn advance(&mut self) -> io::Result<()> {
        if self.pos < self.buf.len() {
            self.pos += 1;
        }
        if self.pos >= self.buf.len() && !self.eof {
            self.refill()?;
        }
        Ok(())
    }

    /// Reposition the forward cursor to an absolute offset.
    pub fn seek(&mut self, offset: u64) -> io::Result<()> {
        if offset >= self.buf_start && offset <= self.buf_start + self.buf.len() as u64 {
            self.pos = (offset - self.buf_start) as usize;
            if self.pos >= self.buf.len() && !self.eof {
                self.refill()?;
            }
            return Ok(());
        }
        self.reader.seek(SeekFrom::Start(offset))?;
        self.buf_start = offset;
        self.pos = 0;
        self.buf.clear();
        self.eof = false;
        self.refill()?;
        Ok(())
    }

    /// Read a single byte at `offset` without disturbing the forward
    /// cursor. Idempotent: repeated calls observe the same byte and leave
    /// `tell()` unchanged.
    pub fn read_at(&mut self, offset: u64) -> io::Result<Option<u8>> {
        let saved_tell = self.tell();
        self.seek(offset)?;
        let byte = self.peek()?;
        self.seek(saved_tell)?;
        Ok(byte)
    }

    fn refill(&mut self) -> io::Result<()> {
        if self.pos < self.buf.len() {
            return Ok(());
        }
        // Drop bytes already consumed so the buffer doesn't grow unbounded
        // across a full forward scan.
        self.buf_start += self.pos as u64;
        self.buf.clear();
        self.pos = 0;

        let mut chunk = vec![0u8; BUF_CHUNK];
        let n = self.reader.read(&mut chunk)?;
        chunk.truncate(n);
        self.buf = chunk;
        if n == 0 {
            self.eof = true;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peek_and_advance_track_offset() {
        let mut s = ByteStream::from_bytes(b"abc".to_vec()).unwrap();
        assert_eq!(s.tell(), 0);
        assert_eq!(s.peek().unwrap(), Some(b'a'));
        s.advance().unwrap();
        assert_eq!(s.tell(), 1);
        assert_eq!(s.peek().unwrap(), Some(b'b'));
    }

    #[test]
    fn read_at_does_not_disturb_forward_cursor() {
        let mut s = ByteStream::from_bytes(b"hello world".to_vec()).unwrap();
        s.advance().unwrap();
        s.advance().unwrap();
        let before = s.tell();
        assert_eq!(s.read_at(6).unwrap(), Some(b'w'));
        assert_eq!(s.tell(), before);
        assert_eq!(s.peek().unwrap(), Some(b'l'));
    }

    #[test]
    fn eof_is_observable_not_an_error() {
        let mut s = ByteStream::from_bytes(b"x".to_vec()).unwrap();
        s.advance().unwrap();
        assert!(s.is_eof());
        assert_eq!(s.peek().unwrap(), None);
    }

    #[test]
    fn seek_across_buffer_boundary_refills() {
        let data = vec![b'A'; BUF_CHUNK + 10];
        let mut s = ByteStream::from_bytes(data).unwrap();
        s.seek(BUF_CHUNK as u64 + 5).unwrap();
        assert_eq!(s.peek().unwrap(), Some(b'A'));
        assert_eq!(s.tell(), BUF_CHUNK as u64 + 5);
    }
}
