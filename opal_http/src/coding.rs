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

//! Content codings declared by `Content-Encoding`.
//!
//! Only `gzip`, `deflate` and `identity` are supported; `deflate` is the
//! zlib-wrapped format. Unrecognized tokens are reported as `None` by
//! [`Coding::from_token`] so that callers can warn and pass the bytes
//! through verbatim.

use std::io::{self, Read, Write};

use flate2::read::{GzDecoder, ZlibDecoder};
use flate2::write::{GzEncoder, ZlibEncoder};
use flate2::Compression;

/// A content coding.
///
/// # Examples
///
/// ```
/// use opal_http::coding::Coding;
///
/// let coding = Coding::from_token("gzip").unwrap();
/// let compressed = coding.compress(b"hello").unwrap();
/// assert_eq!(coding.decompress(&compressed).unwrap(), b"hello");
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Coding {
    /// The `gzip` coding.
    Gzip,
    /// The `deflate` coding (zlib format).
    Deflate,
    /// No transformation.
    Identity,
}

impl Coding {
    /// Looks up a coding by its `Content-Encoding` token. An absent header
    /// maps to `Identity`; an unrecognized token returns `None`.
    ///
    /// # Examples
    ///
    /// ```
    /// use opal_http::coding::Coding;
    ///
    /// assert_eq!(Coding::from_token("deflate"), Some(Coding::Deflate));
    /// assert_eq!(Coding::from_token("br"), None);
    /// ```
    pub fn from_token(token: &str) -> Option<Coding> {
        match token {
            "gzip" => Some(Coding::Gzip),
            "deflate" => Some(Coding::Deflate),
            "identity" => Some(Coding::Identity),
            _ => None,
        }
    }

    /// Returns the `Content-Encoding` token of this coding.
    pub fn as_str(&self) -> &str {
        match self {
            Coding::Gzip => "gzip",
            Coding::Deflate => "deflate",
            Coding::Identity => "identity",
        }
    }

    /// Compresses `data` with this coding. Identity returns the input
    /// unchanged.
    pub fn compress(&self, data: &[u8]) -> io::Result<Vec<u8>> {
        match self {
            Coding::Identity => Ok(data.to_vec()),
            Coding::Gzip => {
                let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
                encoder.write_all(data)?;
                encoder.finish()
            }
            Coding::Deflate => {
                let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
                encoder.write_all(data)?;
                encoder.finish()
            }
        }
    }

    /// Decompresses `data` with this coding. Identity returns the input
    /// unchanged.
    pub fn decompress(&self, data: &[u8]) -> io::Result<Vec<u8>> {
        let mut out = Vec::new();
        match self {
            Coding::Identity => out.extend_from_slice(data),
            Coding::Gzip => {
                GzDecoder::new(data).read_to_end(&mut out)?;
            }
            Coding::Deflate => {
                ZlibDecoder::new(data).read_to_end(&mut out)?;
            }
        }
        Ok(out)
    }
}
