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

use crate::request::Request;

/// `HTTP/1` request head encoder. Serialises the request line and headers
/// of a [`Request`] into wire bytes; the body, if any, is written by the
/// caller afterwards.
///
/// [`Request`]: crate::request::Request
///
/// # Examples
///
/// ```
/// use opal_http::h1::RequestEncoder;
/// use opal_http::request::method::Method;
/// use opal_http::request::Request;
///
/// let request = Request::builder()
///     .method(Method::GET)
///     .target("http://example.org/index")
///     .build()
///     .unwrap();
///
/// let head = RequestEncoder::new(&request).encode();
/// assert!(head.starts_with(b"GET /index HTTP/1.1\r\n"));
/// assert!(head.ends_with(b"\r\n\r\n"));
/// ```
pub struct RequestEncoder<'a> {
    request: &'a Request,
}

impl<'a> RequestEncoder<'a> {
    /// Creates a new `RequestEncoder` over a request.
    pub fn new(request: &'a Request) -> Self {
        Self { request }
    }

    /// Encodes the request head: `METHOD SP target SP VERSION CRLF`, one
    /// `name: value CRLF` line per header, then the empty line. The target
    /// is `*` when the any-target flag is set, otherwise the path and
    /// query of the target URI.
    pub fn encode(&self) -> Vec<u8> {
        let request = self.request;
        let target = if request.target_any() {
            String::from("*")
        } else {
            request.target().path_and_query()
        };
        let mut head = Vec::with_capacity(64 + request.headers().len() * 32);
        head.extend_from_slice(request.method().as_str().as_bytes());
        head.push(b' ');
        head.extend_from_slice(target.as_bytes());
        head.push(b' ');
        head.extend_from_slice(request.version().as_str().as_bytes());
        head.extend_from_slice(b"\r\n");
        for (name, value) in request.headers().iter() {
            head.extend_from_slice(name.as_bytes());
            head.extend_from_slice(b": ");
            head.extend_from_slice(&value.to_vec());
            head.extend_from_slice(b"\r\n");
        }
        head.extend_from_slice(b"\r\n");
        head
    }
}

#[cfg(test)]
mod ut_encoder {
    use super::RequestEncoder;
    use crate::request::method::Method;
    use crate::request::Request;

    /// UT test cases for `RequestEncoder::encode`.
    ///
    /// # Brief
    /// 1. Builds a request with one header.
    /// 2. Encodes the head and checks the request line, the header line
    ///    and the terminating empty line.
    #[test]
    fn ut_encoder_encode() {
        let request = Request::builder()
            .method(Method::PUT)
            .target("http://example.org/item?rev=2")
            .header("Host", "example.org")
            .build()
            .unwrap();
        let head = RequestEncoder::new(&request).encode();
        let text = String::from_utf8(head).unwrap();
        assert!(text.starts_with("PUT /item?rev=2 HTTP/1.1\r\n"));
        assert!(text.contains("host: example.org\r\n"));
        assert!(text.ends_with("\r\n\r\n"));
    }

    /// UT test cases for encoding an any-target request.
    ///
    /// # Brief
    /// 1. Builds an `OPTIONS` request with the any-target flag.
    /// 2. Checks that the request line carries `*`.
    #[test]
    fn ut_encoder_encode_target_any() {
        let request = Request::builder()
            .method(Method::OPTIONS)
            .target("http://example.org/whatever")
            .target_any(true)
            .build()
            .unwrap();
        let head = RequestEncoder::new(&request).encode();
        assert!(head.starts_with(b"OPTIONS * HTTP/1.1\r\n"));
    }

    /// UT test cases for encoding a request without a path.
    ///
    /// # Brief
    /// 1. Builds a request whose target has no path.
    /// 2. Checks that the request line carries `/`.
    #[test]
    fn ut_encoder_encode_no_path() {
        let request = Request::builder()
            .method(Method::GET)
            .target("http://example.org")
            .build()
            .unwrap();
        let head = RequestEncoder::new(&request).encode();
        assert!(head.starts_with(b"GET / HTTP/1.1\r\n"));
    }
}
