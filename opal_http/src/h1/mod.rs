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

//! `HTTP/1.1` message framing: request head serialisation and the chunked
//! transfer-coding.

pub mod chunk;
pub mod encoder;

pub use chunk::{encode_chunk, encode_last_chunk, ChunkError, ChunkedReader};
pub use encoder::RequestEncoder;

use core::fmt;

/// Errors related to `HTTP/1` framing.
#[derive(Debug, Eq, PartialEq)]
pub enum H1Error {
    /// The response status line is malformed.
    InvalidStatusLine,
    /// The chunked transfer-coding framing is broken.
    InvalidChunk,
}

impl fmt::Display for H1Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl std::error::Error for H1Error {}
