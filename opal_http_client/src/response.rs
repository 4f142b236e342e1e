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

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use opal_http::coding::Coding;
use opal_http::headers::Headers;
use opal_http::request::Request;
use opal_http::response::StatusLine;

use crate::cache::{CachedBody, SharedCache};
use crate::error::{ErrorKind, HttpClientError};
use crate::policy::CachingPolicy;
use crate::socket::{ChunkCallbacks, HttpSocket};

const FILE_BUF_SIZE: usize = 51_200;

/// A HTTP response: either **live**, bound to the socket its request was
/// sent on and parsed lazily, or **wrapped**, carrying already
/// materialised parts served from the cache.
///
/// Parsing the status line and headers and reading the body are separate
/// steps; body reading is one-shot.
///
/// # Examples
///
/// ```no_run
/// use opal_http::request::method::Method;
/// use opal_http_client::HttpClient;
///
/// let client = HttpClient::new();
/// let mut transaction = client.new_transaction();
/// let mut response = transaction
///     .make_request(Method::GET, "http://example.org/data")
///     .unwrap();
///
/// let status = response.status().unwrap().code();
/// let body = response.body_string().unwrap();
/// transaction.close().unwrap();
/// ```
pub struct HttpResponse {
    socket: Option<Arc<HttpSocket>>,
    request: Option<Request>,
    cache: Option<SharedCache>,
    policy: Option<Arc<dyn CachingPolicy>>,
    status: Option<StatusLine>,
    headers: Headers,
    body: Option<CachedBody>,
    parsed: bool,
    max_informative: usize,
    strict_informative: bool,
    strict_version: bool,
}

impl std::fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpResponse")
            .field("request", &self.request)
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("parsed", &self.parsed)
            .finish_non_exhaustive()
    }
}

impl HttpResponse {
    /// Creates a new live response reading from the given socket. The
    /// response should be the result of the passed request, previously
    /// sent over the same socket.
    pub(crate) fn from_socket(socket: Arc<HttpSocket>, request: Request) -> HttpResponse {
        HttpResponse {
            socket: Some(socket),
            request: Some(request),
            cache: None,
            policy: None,
            status: None,
            headers: Headers::new(),
            body: None,
            parsed: false,
            max_informative: 5,
            strict_informative: false,
            strict_version: false,
        }
    }

    /// Wraps already materialised response parts; reading from the
    /// network is disabled. Fields that were never stored stay unset.
    pub(crate) fn wrap(
        status: Option<StatusLine>,
        headers: Option<Headers>,
        body: Option<CachedBody>,
    ) -> HttpResponse {
        HttpResponse {
            socket: None,
            request: None,
            cache: None,
            policy: None,
            status,
            headers: headers.unwrap_or_default(),
            body,
            parsed: true,
            max_informative: 5,
            strict_informative: false,
            strict_version: false,
        }
    }

    pub(crate) fn set_cache(&mut self, cache: SharedCache) -> &mut Self {
        self.cache = Some(cache);
        self
    }

    pub(crate) fn set_policy(&mut self, policy: Arc<dyn CachingPolicy>) -> &mut Self {
        self.policy = Some(policy);
        self
    }

    /// Sets how many informative (1xx) responses are discarded before
    /// parsing gives up. Defaults to 5.
    pub fn set_max_informative_responses(&mut self, max: usize) -> &mut Self {
        self.max_informative = max;
        self
    }

    /// Sets whether exceeding the informative-response budget fails with
    /// `InvalidResponse` instead of returning the interim response.
    pub fn set_strict_informative(&mut self, strict: bool) -> &mut Self {
        self.strict_informative = strict;
        self
    }

    /// Sets whether a mismatch between the request HTTP version and the
    /// response HTTP version fails with `InvalidResponse`. By default a
    /// mismatch only draws a warning.
    pub fn set_strict_version(&mut self, strict: bool) -> &mut Self {
        self.strict_version = strict;
        self
    }

    /// Parses the status line and headers, discarding interim informative
    /// responses up to the configured budget. Parsing more than once is a
    /// no-op.
    pub fn parse(&mut self) -> Result<(), HttpClientError> {
        if self.parsed {
            return Ok(());
        }
        let socket = self.live_socket()?;
        let mut informative = 0usize;
        loop {
            let line = socket.read_line()?;
            let status = StatusLine::from_line(&line)
                .map_err(|e| HttpClientError::from_error(ErrorKind::InvalidResponse, e))?;

            if let Some(request) = &self.request {
                if status.version() != request.version().as_str() {
                    if self.strict_version {
                        return err_from_msg!(
                            InvalidResponse,
                            "server answered with a different HTTP version"
                        );
                    }
                    tracing::warn!(
                        "server answered {} to a {} request",
                        status.version(),
                        request.version().as_str()
                    );
                }
            }
            if status.phrase().is_empty() {
                tracing::warn!("status line missing reason phrase");
            }

            let mut headers = Headers::new();
            loop {
                let line = socket.read_line()?;
                if line.is_empty() {
                    break;
                }
                let (name, value) = line.split_once(':').ok_or(HttpClientError::from_str(
                    ErrorKind::InvalidResponse,
                    "malformed header line",
                ))?;
                headers
                    .append(name.trim(), value.trim())
                    .map_err(|e| HttpClientError::from_error(ErrorKind::InvalidResponse, e))?;
            }

            let informational = status.code().is_informational();
            self.status = Some(status);
            self.headers = headers;
            if !informational {
                break;
            }
            informative += 1;
            if informative > self.max_informative {
                if self.strict_informative {
                    return err_from_msg!(InvalidResponse, "too many informative responses");
                }
                tracing::warn!("giving up after {informative} informative responses");
                break;
            }
        }
        self.parsed = true;
        Ok(())
    }

    /// Gets the parsed status line, or `None` before parsing.
    pub fn status(&self) -> Option<&StatusLine> {
        self.status.as_ref()
    }

    /// Gets the response headers. After a chunked body has been consumed,
    /// trailer lines appear here as well.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Gets the `Location` header, used for redirects among other things.
    pub fn location(&self) -> Option<String> {
        self.headers.get_string("location")
    }

    /// Gets the `Retry-After` header.
    pub fn retry_after(&self) -> Option<String> {
        self.headers.get_string("retry-after")
    }

    /// Parses the `Date` response header per RFC 1123.
    pub fn date(&self) -> Option<DateTime<FixedOffset>> {
        self.headers
            .get_string("date")
            .and_then(|date| DateTime::parse_from_rfc2822(&date).ok())
    }

    /// Gets the length of the body: 0 when the status code indicates
    /// there is no body or the `Content-Length` header is absent or
    /// empty, its value otherwise.
    pub fn content_length(&self) -> Result<u64, HttpClientError> {
        let Some(status) = &self.status else {
            return Ok(0);
        };
        if !status.code().has_body() {
            return Ok(0);
        }
        match self.headers.get_string("content-length") {
            None => Ok(0),
            Some(len) if len.is_empty() => Ok(0),
            Some(len) => len.parse::<u64>().map_err(|_| {
                HttpClientError::from_str(ErrorKind::InvalidResponse, "bad Content-Length value")
            }),
        }
    }

    /// Reads the body and returns it as a string, decoding
    /// `Content-Encoding` appropriately and storing the body in the cache
    /// when the policy says so. Assumes UTF-8 text.
    ///
    /// For a wrapped response whose stored body is a file, this fails
    /// with `InvalidResponse`.
    pub fn body_string(&mut self) -> Result<String, HttpClientError> {
        if let Some(body) = &self.body {
            return match body {
                CachedBody::Text(text) => Ok(text.clone()),
                CachedBody::File(_) => {
                    err_from_msg!(InvalidResponse, "cached body is a file, not a string")
                }
            };
        }
        if self.is_chunked() {
            tracing::warn!(
                "expecting a chunked response, but reading as a string; use read_chunks instead"
            );
        }
        let len = self.content_length()? as usize;
        if len == 0 {
            self.store_string(String::new());
            return Ok(String::new());
        }

        let socket = self.live_socket()?;
        let mut data = vec![0u8; len];
        let mut off = 0;
        while off < len {
            let read = socket.read(&mut data[off..])?;
            if read == 0 {
                return err_from_msg!(InvalidResponse, "response body incomplete");
            }
            off += read;
        }
        let decoded = self.decode_body(data)?;
        let body = String::from_utf8_lossy(&decoded).into_owned();
        self.store_string(body.clone());
        Ok(body)
    }

    /// Writes the body to a file, ignoring `Content-Encoding` and storing
    /// the bytes as received; a warning is drawn when an encoding is
    /// present. The written path is stored in the cache when the policy
    /// says so.
    pub fn write_body_to_file(&mut self, to: &Path) -> Result<PathBuf, HttpClientError> {
        if let Some(body) = &self.body {
            return match body {
                CachedBody::File(path) => Ok(path.clone()),
                CachedBody::Text(_) => {
                    err_from_msg!(InvalidResponse, "cached body is a string, not a file")
                }
            };
        }
        if self.is_chunked() {
            tracing::warn!(
                "expecting a chunked response, but writing to a file; use read_chunks instead"
            );
        }
        if let Some(encoding) = self.headers.get_string("content-encoding") {
            if Coding::from_token(&encoding) != Some(Coding::Identity) {
                tracing::warn!("writing {encoding}-encoded body to file as-received");
            }
        }
        let mut len = self.content_length()? as usize;
        if len == 0 {
            return Ok(to.to_path_buf());
        }

        let socket = self.live_socket()?;
        let mut file = match File::create(to) {
            Ok(file) => file,
            Err(e) => return err_from_io!(Io, e),
        };
        let mut buffer = vec![0u8; FILE_BUF_SIZE];
        while len > 0 {
            let want = len.min(FILE_BUF_SIZE);
            let read = socket.read(&mut buffer[..want])?;
            if read == 0 {
                return err_from_msg!(InvalidResponse, "response body incomplete");
            }
            file.write_all(&buffer[..read])
                .map_err(|e| HttpClientError::from_io_error(ErrorKind::Io, e))?;
            len -= read;
        }
        if let (Some(cache), Some(request), Some(policy), Some(status)) =
            (&self.cache, &self.request, &self.policy, &self.status)
        {
            if policy.should_store(request, status) {
                cache.lock().unwrap().put_file(request, to.to_path_buf());
            }
        }
        Ok(to.to_path_buf())
    }

    /// Initiates reading of a chunked response. `Transfer-Encoding` is
    /// expected to be `chunked`; `Content-Encoding` decides whether the
    /// chunks are compressed, and each chunk is decoded independently
    /// before being handed to the callbacks. Trailer lines are appended
    /// to this response's header set before `on_end` runs.
    ///
    /// Chunked responses are not cached; an existing cache entry for the
    /// request is evicted instead.
    pub fn read_chunks(&mut self, callbacks: &mut dyn ChunkCallbacks) {
        let socket = match self.live_socket() {
            Ok(socket) => socket,
            Err(e) => {
                callbacks.on_exception(e);
                return;
            }
        };
        if let (Some(cache), Some(request)) = (&self.cache, &self.request) {
            let mut cache = cache.lock().unwrap();
            if cache.exists(request) {
                cache.evict(request);
            }
        }

        let coding = self.body_coding();
        let result = socket.chunked_transfer(|chunk| {
            let decoded = coding
                .decompress(&chunk)
                .map_err(|e| HttpClientError::from_io_error(ErrorKind::InvalidResponse, e))?;
            callbacks.on_chunk(decoded);
            Ok(())
        });
        match result {
            Ok(trailers) => {
                for (name, value) in trailers.iter() {
                    let _ = self
                        .headers
                        .append(name.as_bytes(), value.to_vec().as_slice());
                }
                callbacks.on_end(trailers);
            }
            Err(e) => callbacks.on_exception(e),
        }
    }

    /// Returns whether the response declares `Transfer-Encoding:
    /// chunked`; the chunk reader is used regardless of any
    /// `Content-Length` then.
    pub fn is_chunked(&self) -> bool {
        self.headers
            .get_string("transfer-encoding")
            .map(|encoding| encoding.contains("chunked"))
            .unwrap_or(false)
    }

    fn live_socket(&self) -> Result<Arc<HttpSocket>, HttpClientError> {
        self.socket.clone().ok_or(HttpClientError::from_str(
            ErrorKind::InvalidRequest,
            "wrapped response is not bound to a socket",
        ))
    }

    // Resolves the content coding, warning on unsupported tokens and
    // falling back to identity (bytes returned verbatim).
    fn body_coding(&self) -> Coding {
        match self.headers.get_string("content-encoding") {
            None => Coding::Identity,
            Some(token) => match Coding::from_token(&token) {
                Some(coding) => coding,
                None => {
                    tracing::warn!("ignoring unknown content coding {token}");
                    Coding::Identity
                }
            },
        }
    }

    fn decode_body(&self, data: Vec<u8>) -> Result<Vec<u8>, HttpClientError> {
        let coding = self.body_coding();
        coding
            .decompress(&data)
            .map_err(|e| HttpClientError::from_io_error(ErrorKind::InvalidResponse, e))
    }

    fn store_string(&mut self, body: String) {
        if let (Some(cache), Some(request), Some(policy), Some(status)) =
            (&self.cache, &self.request, &self.policy, &self.status)
        {
            if policy.should_store(request, status) {
                cache.lock().unwrap().put_string(request, body);
            }
        }
    }
}

#[cfg(test)]
mod ut_response {
    use std::io::Write;
    use std::net::TcpListener;
    use std::sync::{Arc, Mutex};
    use std::thread;

    use opal_http::coding::Coding;
    use opal_http::headers::Headers;
    use opal_http::request::method::Method;
    use opal_http::request::Request;
    use opal_http::response::status::StatusCode;

    use crate::cache::{CachedBody, FifoCache, HttpCache};
    use crate::endpoint::Endpoint;
    use crate::error::ErrorKind;
    use crate::policy::SimpleCachingPolicy;
    use crate::response::HttpResponse;
    use crate::socket::{ChunkCallbacks, HttpSocket};

    fn live_response(wire: &'static [u8]) -> HttpResponse {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        thread::spawn(move || {
            let (mut peer, _) = listener.accept().unwrap();
            peer.write_all(wire).unwrap();
        });
        let endpoint = Endpoint::new("127.0.0.1", port, false).unwrap();
        let socket = Arc::new(HttpSocket::connect(&endpoint).unwrap());
        assert!(socket.acquire_if_idle());
        let request = Request::builder()
            .method(Method::GET)
            .target("http://127.0.0.1/x")
            .build()
            .unwrap();
        HttpResponse::from_socket(socket, request)
    }

    /// UT test cases for `HttpResponse::parse` and `body_string`.
    ///
    /// # Brief
    /// 1. Serves a plain response with a content length.
    /// 2. Parses it and reads the body.
    /// 3. Checks status, headers and body.
    #[test]
    fn ut_response_parse_and_body() {
        let mut response =
            live_response(b"HTTP/1.1 200 OK\r\nContent-Length: 5\r\nServer: opal\r\n\r\nhello");
        response.parse().unwrap();
        let status = response.status().unwrap();
        assert_eq!(status.code(), StatusCode::OK);
        assert_eq!(status.phrase(), "OK");
        assert_eq!(response.headers().get_string("server").unwrap(), "opal");
        assert_eq!(response.content_length().unwrap(), 5);
        assert_eq!(response.body_string().unwrap(), "hello");
    }

    /// UT test cases for skipping informative responses.
    ///
    /// # Brief
    /// 1. Serves a `100 Continue` before the final response.
    /// 2. Parses and checks the interim response was discarded.
    #[test]
    fn ut_response_skips_informative() {
        let mut response = live_response(
            b"HTTP/1.1 100 Continue\r\n\r\nHTTP/1.1 204 No Content\r\nServer: opal\r\n\r\n",
        );
        response.parse().unwrap();
        assert_eq!(response.status().unwrap().code(), StatusCode::NO_CONTENT);
        assert_eq!(response.content_length().unwrap(), 0);
    }

    /// UT test cases for the strict HTTP version check.
    ///
    /// # Brief
    /// 1. Serves an `HTTP/1.0` response to an `HTTP/1.1` request.
    /// 2. Checks lenient parsing succeeds.
    /// 3. Checks strict parsing fails with `InvalidResponse`.
    #[test]
    fn ut_response_version_mismatch() {
        let mut response = live_response(b"HTTP/1.0 200 OK\r\nContent-Length: 0\r\n\r\n");
        response.parse().unwrap();
        assert_eq!(response.status().unwrap().version(), "HTTP/1.0");

        let mut response = live_response(b"HTTP/1.0 200 OK\r\nContent-Length: 0\r\n\r\n");
        response.set_strict_version(true);
        assert_eq!(
            response.parse().unwrap_err().error_kind(),
            ErrorKind::InvalidResponse
        );
    }

    /// UT test cases for gzip-coded bodies.
    ///
    /// # Brief
    /// 1. Serves a gzip-encoded body with the matching headers.
    /// 2. Checks `body_string` returns the decoded text.
    #[test]
    fn ut_response_gzip_body() {
        let compressed = Coding::Gzip.compress(b"compressed payload").unwrap();
        let mut wire = format!(
            "HTTP/1.1 200 OK\r\nContent-Encoding: gzip\r\nContent-Length: {}\r\n\r\n",
            compressed.len()
        )
        .into_bytes();
        wire.extend_from_slice(&compressed);
        let wire: &'static [u8] = Box::leak(wire.into_boxed_slice());

        let mut response = live_response(wire);
        response.parse().unwrap();
        assert_eq!(response.body_string().unwrap(), "compressed payload");
    }

    /// UT test cases for wrapped responses.
    ///
    /// # Brief
    /// 1. Wraps a cached string body.
    /// 2. Checks `body_string` serves it and `write_body_to_file` fails.
    #[test]
    fn ut_response_wrapped_body() {
        let mut response = HttpResponse::wrap(
            None,
            None,
            Some(CachedBody::Text(String::from("cached body"))),
        );
        assert_eq!(response.body_string().unwrap(), "cached body");
        assert_eq!(
            response
                .write_body_to_file(std::path::Path::new("/tmp/unused"))
                .unwrap_err()
                .error_kind(),
            ErrorKind::InvalidResponse
        );
    }

    struct Collect {
        chunks: Vec<Vec<u8>>,
        ended: bool,
    }

    impl ChunkCallbacks for Collect {
        fn on_chunk(&mut self, chunk: Vec<u8>) {
            self.chunks.push(chunk);
        }

        fn on_end(&mut self, _trailers: Headers) {
            self.ended = true;
        }

        fn on_exception(&mut self, error: crate::HttpClientError) {
            panic!("unexpected chunk error: {error}");
        }
    }

    /// UT test cases for `HttpResponse::read_chunks`.
    ///
    /// # Brief
    /// 1. Serves a chunked response with a trailer.
    /// 2. Reads the chunks through callbacks.
    /// 3. Checks the chunks and that the trailer joined the headers.
    #[test]
    fn ut_response_read_chunks() {
        let mut response = live_response(
            b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n3\r\nabc\r\n2\r\nde\r\n0\r\nExpires: never\r\n\r\n",
        );
        response.parse().unwrap();
        assert!(response.is_chunked());

        let mut collect = Collect {
            chunks: Vec::new(),
            ended: false,
        };
        response.read_chunks(&mut collect);
        assert!(collect.ended);
        assert_eq!(collect.chunks, vec![b"abc".to_vec(), b"de".to_vec()]);
        assert_eq!(response.headers().get_string("expires").unwrap(), "never");
    }

    /// UT test cases for the body write-through to the cache.
    ///
    /// # Brief
    /// 1. Attaches a cache and policy to a live cacheable response.
    /// 2. Reads the body.
    /// 3. Checks the body was stored for the request fingerprint.
    #[test]
    fn ut_response_body_cached() {
        let mut response = live_response(b"HTTP/1.1 200 OK\r\nContent-Length: 4\r\n\r\nbody");
        let cache: crate::SharedCache = Arc::new(Mutex::new(FifoCache::new(4)));
        response.set_cache(cache.clone());
        response.set_policy(Arc::new(SimpleCachingPolicy));
        response.parse().unwrap();
        assert_eq!(response.body_string().unwrap(), "body");

        let request = Request::builder()
            .method(Method::GET)
            .target("http://127.0.0.1/x")
            .build()
            .unwrap();
        assert_eq!(
            cache.lock().unwrap().get_body(&request),
            Some(CachedBody::Text(String::from("body")))
        );
    }
}
