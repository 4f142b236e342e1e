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

use opal_http::coding::Coding;
use opal_http::h1::{encode_chunk, encode_last_chunk, ChunkedReader};

/// SDV test cases for chunk framing combined with content coding.
///
/// # Brief
/// 1. Compresses two payloads independently and frames each as a chunk,
///    the way the chunk sender does.
/// 2. Decodes the stream chunk by chunk, decompressing each one, the way
///    the streamed response path does.
/// 3. Checks the reassembled payloads.
#[test]
fn sdv_chunked_gzip_stream() {
    let parts: [&[u8]; 3] = [b"first part", b"second, longer part of the body", b"tail"];

    let mut wire = Vec::new();
    for part in parts {
        let compressed = Coding::Gzip.compress(part).unwrap();
        wire.extend_from_slice(&encode_chunk(&compressed));
    }
    wire.extend_from_slice(&encode_last_chunk());

    let mut reader = ChunkedReader::new(wire.as_slice());
    let mut decoded = Vec::new();
    while reader.has_more_chunks().unwrap() {
        let chunk = reader.read_chunk().unwrap();
        decoded.push(Coding::Gzip.decompress(&chunk).unwrap());
    }

    assert_eq!(decoded.len(), parts.len());
    for (got, want) in decoded.iter().zip(parts.iter()) {
        assert_eq!(got.as_slice(), *want);
    }
}

/// SDV test cases for the exact wire form of an identity chunk stream.
///
/// # Brief
/// 1. Frames the chunks "A" and "B" with the terminator.
/// 2. Checks the exact bytes of the framing.
#[test]
fn sdv_chunked_identity_wire_form() {
    let mut wire = Vec::new();
    wire.extend_from_slice(&encode_chunk(b"A"));
    wire.extend_from_slice(&encode_chunk(b"B"));
    wire.extend_from_slice(&encode_last_chunk());
    assert_eq!(wire, b"1\r\nA\r\n1\r\nB\r\n0\r\n\r\n");
}
