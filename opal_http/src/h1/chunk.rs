// Copyright (c) 2023 Huawei Device Co., Ltd.
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Chunked [`Transfer-Encoding`] framing.
//!
//! [`ChunkedReader`] decodes a chunk stream from any `Read`: a lowercase
//! hex size line terminated by CRLF, that many payload bytes, then CRLF,
//! repeated until a zero-size chunk. Trailer lines after the zero chunk
//! are left in the stream for the caller to consume as header lines.
//! Framing deviations are fatal.
//!
//! [`encode_chunk`] and [`encode_last_chunk`] produce the same framing for
//! the write side.
//!
//! [`Transfer-Encoding`]: https://httpwg.org/specs/rfc9112.html#chunked.encoding

use core::fmt;
use std::error::Error;
use std::io::{self, Read};

/// Reader for a chunked message body.
///
/// # Examples
///
/// ```
/// use opal_http::h1::ChunkedReader;
///
/// let wire = b"3\r\nabc\r\n1\r\nd\r\n0\r\n\r\n";
/// let mut reader = ChunkedReader::new(&wire[..]);
///
/// let mut body = Vec::new();
/// while reader.has_more_chunks().unwrap() {
///     body.extend_from_slice(&reader.read_chunk().unwrap());
/// }
/// assert_eq!(body, b"abcd");
/// ```
pub struct ChunkedReader<R: Read> {
    reader: R,
    remaining: u64,
    beginning: bool,
    end: bool,
}

impl<R: Read> ChunkedReader<R> {
    /// Creates a new `ChunkedReader` over a stream positioned at the first
    /// size line.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            remaining: 0,
            beginning: true,
            end: false,
        }
    }

    /// Returns the number of unread bytes in the current chunk.
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    /// Checks whether more chunks are available, entering the next chunk
    /// if the current one is exhausted.
    ///
    /// Returns `false` once the zero-size chunk has been consumed. Trailer
    /// lines, if the server sent any, are left unread in the stream.
    pub fn has_more_chunks(&mut self) -> Result<bool, ChunkError> {
        if self.end {
            return Ok(false);
        }
        if self.remaining == 0 {
            self.enter_chunk()?;
        }
        Ok(!self.end)
    }

    /// Reads the rest of the current chunk.
    pub fn read_chunk(&mut self) -> Result<Vec<u8>, ChunkError> {
        let mut chunk = vec![0u8; self.remaining as usize];
        let mut off = 0;
        while off < chunk.len() {
            let read = self.reader.read(&mut chunk[off..])?;
            if read == 0 {
                return Err(ChunkError::InvalidFrame);
            }
            off += read;
        }
        self.remaining = 0;
        Ok(chunk)
    }

    // Consumes the CRLF terminating the previous chunk (except at the very
    // beginning of the stream), then the size line of the next chunk.
    fn enter_chunk(&mut self) -> Result<(), ChunkError> {
        if !self.beginning {
            self.expect_crlf()?;
        }
        self.beginning = false;

        let mut size: u64 = 0;
        let mut digits = 0;
        loop {
            let byte = self.read_byte()?;
            match byte {
                b'\r' => {
                    let next = self.read_byte()?;
                    if next != b'\n' || digits == 0 {
                        return Err(ChunkError::InvalidFrame);
                    }
                    break;
                }
                b'0'..=b'9' => size = size << 4 | u64::from(byte - b'0'),
                b'a'..=b'f' => size = size << 4 | u64::from(byte - b'a' + 10),
                b'A'..=b'F' => size = size << 4 | u64::from(byte - b'A' + 10),
                _ => return Err(ChunkError::InvalidFrame),
            }
            digits += 1;
            if digits > 16 {
                return Err(ChunkError::InvalidFrame);
            }
        }

        if size == 0 {
            self.end = true;
        } else {
            self.remaining = size;
        }
        Ok(())
    }

    fn expect_crlf(&mut self) -> Result<(), ChunkError> {
        if self.read_byte()? != b'\r' || self.read_byte()? != b'\n' {
            return Err(ChunkError::InvalidFrame);
        }
        Ok(())
    }

    fn read_byte(&mut self) -> Result<u8, ChunkError> {
        let mut byte = [0u8; 1];
        if self.reader.read(&mut byte)? == 0 {
            // EOF in the middle of the framing.
            return Err(ChunkError::InvalidFrame);
        }
        Ok(byte[0])
    }
}

/// Frames one chunk: lowercase hex payload length, CRLF, the payload,
/// CRLF.
///
/// # Examples
///
/// ```
/// use opal_http::h1::encode_chunk;
///
/// assert_eq!(encode_chunk(b"A"), b"1\r\nA\r\n");
/// ```
pub fn encode_chunk(payload: &[u8]) -> Vec<u8> {
    let mut frame = format!("{:x}\r\n", payload.len()).into_bytes();
    frame.extend_from_slice(payload);
    frame.extend_from_slice(b"\r\n");
    frame
}

/// Frames the terminating zero-size chunk.
pub fn encode_last_chunk() -> Vec<u8> {
    b"0\r\n\r\n".to_vec()
}

/// Errors that may occur while reading a chunked body.
#[derive(Debug)]
pub enum ChunkError {
    /// The underlying stream failed.
    Io(io::Error),
    /// The chunk framing deviates from the spec.
    InvalidFrame,
}

impl From<io::Error> for ChunkError {
    fn from(err: io::Error) -> Self {
        ChunkError::Io(err)
    }
}

impl fmt::Display for ChunkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChunkError::Io(err) => write!(f, "chunk io error: {err}"),
            ChunkError::InvalidFrame => f.write_str("ill-formed chunk framing"),
        }
    }
}

impl Error for ChunkError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ChunkError::Io(err) => Some(err),
            ChunkError::InvalidFrame => None,
        }
    }
}

#[cfg(test)]
mod ut_chunk {
    use super::{encode_chunk, encode_last_chunk, ChunkError, ChunkedReader};

    fn read_all(wire: &[u8]) -> Result<Vec<u8>, ChunkError> {
        let mut reader = ChunkedReader::new(wire);
        let mut body = Vec::new();
        while reader.has_more_chunks()? {
            body.extend_from_slice(&reader.read_chunk()?);
        }
        Ok(body)
    }

    /// UT test cases for `ChunkedReader` over a well-framed stream.
    ///
    /// # Brief
    /// 1. Decodes a multi-chunk stream.
    /// 2. Checks the concatenated body.
    #[test]
    fn ut_chunked_reader_decode() {
        let body = read_all(b"3\r\nabc\r\n4\r\ndefg\r\n0\r\n\r\n").unwrap();
        assert_eq!(body, b"abcdefg");

        // Hex sizes above 9 and uppercase digits.
        let wire = b"a\r\n0123456789\r\nA\r\n0123456789\r\n0\r\n\r\n";
        assert_eq!(read_all(wire).unwrap().len(), 20);

        // Empty body.
        assert_eq!(read_all(b"0\r\n\r\n").unwrap(), b"");
    }

    /// UT test cases for `ChunkedReader` framing violations.
    ///
    /// # Brief
    /// 1. Decodes streams with broken framing.
    /// 2. Checks that each fails.
    #[test]
    fn ut_chunked_reader_invalid() {
        // LF only after the size.
        assert!(read_all(b"3\nabc\r\n0\r\n\r\n").is_err());
        // Missing CRLF after the payload.
        assert!(read_all(b"3\r\nabc0\r\n\r\n").is_err());
        // Not a hex size.
        assert!(read_all(b"zz\r\nabc\r\n0\r\n\r\n").is_err());
        // Truncated mid-payload.
        assert!(read_all(b"5\r\nab").is_err());
        // Empty size line.
        assert!(read_all(b"\r\nabc\r\n0\r\n\r\n").is_err());
    }

    /// UT test cases for `ChunkedReader` leaving trailers unread.
    ///
    /// # Brief
    /// 1. Decodes a stream carrying a trailer line after the zero chunk.
    /// 2. Checks that the trailer bytes remain in the reader.
    #[test]
    fn ut_chunked_reader_trailers_left() {
        let wire: &[u8] = b"1\r\nx\r\n0\r\nExpires: never\r\n\r\n";
        let mut reader = ChunkedReader::new(wire);
        let mut body = Vec::new();
        while reader.has_more_chunks().unwrap() {
            body.extend_from_slice(&reader.read_chunk().unwrap());
        }
        assert_eq!(body, b"x");
        let mut rest = Vec::new();
        std::io::Read::read_to_end(&mut reader.reader, &mut rest).unwrap();
        assert_eq!(rest, b"Expires: never\r\n\r\n");
    }

    /// UT test cases for `encode_chunk` and `encode_last_chunk`.
    ///
    /// # Brief
    /// 1. Frames two one-byte chunks and the terminator.
    /// 2. Checks the exact wire bytes.
    /// 3. Decodes the produced stream back.
    #[test]
    fn ut_encode_chunk_round_trip() {
        let mut wire = Vec::new();
        wire.extend_from_slice(&encode_chunk(b"A"));
        wire.extend_from_slice(&encode_chunk(b"B"));
        wire.extend_from_slice(&encode_last_chunk());
        assert_eq!(wire, b"1\r\nA\r\n1\r\nB\r\n0\r\n\r\n");
        assert_eq!(read_all(&wire).unwrap(), b"AB");

        assert_eq!(encode_chunk(&[0u8; 16])[..4], *b"10\r\n");
    }
}
