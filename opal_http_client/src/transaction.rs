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

use std::fs;
use std::path::PathBuf;
use std::sync::{mpsc, Arc, Mutex};
use std::thread;

use opal_http::coding::Coding;
use opal_http::h1::RequestEncoder;
use opal_http::headers::Headers;
use opal_http::request::method::Method;
use opal_http::request::uri::Uri;
use opal_http::request::Request;
use opal_http::response::status::StatusCode;
use opal_http::response::StatusLine;
use opal_http::version::Version;

use crate::cache::{FifoCache, SharedCache};
use crate::chunk::ChunkSender;
use crate::endpoint::Endpoint;
use crate::error::{ErrorKind, HttpClientError};
use crate::headers::{default_headers, HeaderPolicy};
use crate::policy::{CachingPolicy, SimpleCachingPolicy};
use crate::pool::{ConnectionPool, PoolCallbacks};
use crate::response::HttpResponse;
use crate::socket::HttpSocket;

/// A single transaction over the network, over a socket obtained from a
/// [`ConnectionPool`]. One transaction may make multiple requests if
/// needed (e.g. when the server indicates a redirect), but it is illegal
/// to use one `HttpTransaction` for more than one terminal operation.
///
/// The lifecycle is: configure, then exactly one of
/// [`HttpTransaction::make_request`],
/// [`HttpTransaction::make_request_later`] or
/// [`HttpTransaction::send_chunks`], then [`HttpTransaction::close`].
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
/// let body = response.body_string().unwrap();
/// transaction.close().unwrap();
/// ```
pub struct HttpTransaction {
    pool: Arc<dyn ConnectionPool>,
    cache: SharedCache,
    policy: Arc<dyn CachingPolicy>,
    pub(crate) headers: Headers,
    header_policy: HeaderPolicy,
    version: Version,
    body_str: Option<String>,
    body_file: Option<PathBuf>,
    max_redirects: usize,
    max_repeats: usize,
    throw_if_max_repeats: bool,
    repeat_on_not_modified: bool,
    curr_redirects: usize,
    curr_repeats: usize,
    pub(crate) socket: Option<Arc<HttpSocket>>,
    disconnect_on_close: bool,
    async_acquire: bool,
    used: bool,
    closed: bool,
}

/// Callbacks used to manage asynchronous transactions.
///
/// The callbacks run on the transaction's driver thread; they carry their
/// own execution context, so there is no separate executor parameter.
pub trait TransactionCallbacks: Send {
    /// The request finished. The transaction is handed back so that the
    /// response body can be read and the transaction closed.
    fn on_response(&mut self, transaction: HttpTransaction, response: HttpResponse);

    /// A timeout occurred while waiting for a connection from the pool.
    fn on_timeout(&mut self);

    /// An error was raised. The request will not proceed.
    fn on_exception(&mut self, error: HttpClientError);
}

impl HttpTransaction {
    /// Creates a new transaction which obtains its socket from the given
    /// connection pool.
    pub fn new(pool: Arc<dyn ConnectionPool>) -> HttpTransaction {
        HttpTransaction {
            pool,
            cache: Arc::new(Mutex::new(FifoCache::default())),
            policy: Arc::new(SimpleCachingPolicy),
            headers: default_headers(),
            header_policy: HeaderPolicy::default(),
            version: Version::HTTP1_1,
            body_str: None,
            body_file: None,
            max_redirects: 8,
            max_repeats: 3,
            throw_if_max_repeats: false,
            repeat_on_not_modified: true,
            curr_redirects: 0,
            curr_repeats: 0,
            socket: None,
            disconnect_on_close: false,
            async_acquire: false,
            used: false,
            closed: false,
        }
    }

    /// Replaces the headers used with this request. By default a
    /// transaction uses [`default_headers`].
    ///
    /// [`default_headers`]: crate::headers::default_headers
    pub fn set_headers(&mut self, headers: Headers) -> &mut Self {
        self.headers = headers;
        self
    }

    /// Gets the headers sent with this request. Modifying them impacts
    /// the request.
    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    /// Replaces the header policy applied to outgoing headers.
    pub fn set_header_policy(&mut self, policy: HeaderPolicy) -> &mut Self {
        self.header_policy = policy;
        self
    }

    /// Sets the HTTP version used for the request line.
    pub fn set_http_version(&mut self, version: Version) -> &mut Self {
        self.version = version;
        self
    }

    /// Replaces the cache consulted and filled by this transaction.
    pub fn use_cache(&mut self, cache: SharedCache) -> &mut Self {
        self.cache = cache;
        self
    }

    /// Replaces the caching policy of this transaction.
    pub fn use_caching_policy(&mut self, policy: Arc<dyn CachingPolicy>) -> &mut Self {
        self.policy = policy;
        self
    }

    /// Sends a string as the request body. This does not open the
    /// connection nor write anything yet. The string is compressed
    /// according to the `Content-Encoding` header when the body is
    /// prepared.
    pub fn send_string(&mut self, body: &str) -> &mut Self {
        self.body_str = Some(body.to_string());
        self
    }

    /// Sends the contents of a file as the request body. This does not
    /// open the connection nor write anything yet.
    pub fn send_file(&mut self, body: PathBuf) -> &mut Self {
        self.body_file = Some(body);
        self
    }

    /// Sets the maximum number of redirects this transaction follows
    /// before failing with `InvalidResponse`. Defaults to 8.
    pub fn set_max_redirects(&mut self, max_redirects: usize) -> &mut Self {
        self.max_redirects = max_redirects;
        self
    }

    /// Sets the maximum number of times the request is repeated, e.g.
    /// when the server returns `304` and the cache has no entry.
    /// Defaults to 3.
    pub fn set_max_repeats(&mut self, max_repeats: usize) -> &mut Self {
        self.max_repeats = max_repeats;
        self
    }

    /// Sets whether exhausting the repeat budget fails with
    /// `InvalidResponse` instead of returning the last response.
    pub fn set_throw_if_max_repeats(&mut self, throw_if_max_repeats: bool) -> &mut Self {
        self.throw_if_max_repeats = throw_if_max_repeats;
        self
    }

    /// Sets whether the request is repeated when the server answers `304`
    /// and the data is not in the cache. When unset, the `304` response
    /// is returned to the caller. Defaults to `true`.
    pub fn set_repeat_on_not_modified(&mut self, repeat_on_not_modified: bool) -> &mut Self {
        self.repeat_on_not_modified = repeat_on_not_modified;
        self
    }

    /// Makes the request on this thread. Waiting for a connection from
    /// the pool blocks the calling thread. The returned response is used
    /// to obtain the response body.
    pub fn make_request(
        &mut self,
        method: Method,
        target: &str,
    ) -> Result<HttpResponse, HttpClientError> {
        self.ensure_open()?;
        self.used = true;
        self.async_acquire = false;
        self.drive(method, target)
    }

    /// Makes the request on a background thread, waiting for a connection
    /// through the pool's asynchronous acquisition. Returns immediately;
    /// exactly one callback reports the outcome, with the transaction
    /// handed back through `on_response` for body reading and closing.
    pub fn make_request_later<C>(mut self, method: Method, target: &str, mut callbacks: C)
    where
        C: TransactionCallbacks + 'static,
    {
        if let Err(e) = self.ensure_open() {
            callbacks.on_exception(e);
            return;
        }
        self.used = true;
        self.async_acquire = true;
        let target = target.to_string();
        thread::spawn(move || match self.drive(method, &target) {
            Ok(response) => callbacks.on_response(self, response),
            Err(e) if e.error_kind() == ErrorKind::Timeout => callbacks.on_timeout(),
            Err(e) => callbacks.on_exception(e),
        });
    }

    /// Makes a request whose body is sent in chunks, per the chunked
    /// transfer coding. Use the returned [`ChunkSender`] to begin the
    /// transfer, send data and end the transfer. All headers are sent
    /// before the data; sending trailers is not supported.
    pub fn send_chunks(
        &mut self,
        method: Method,
        target: &str,
    ) -> Result<ChunkSender<'_>, HttpClientError> {
        self.ensure_open()?;
        self.used = true;
        self.async_acquire = false;
        Ok(ChunkSender::new(self, method, target.to_string()))
    }

    /// Closes the transaction, signalling it is over. The underlying
    /// socket is released back to the pool, or closed when the response
    /// carried `Connection: close`. After closing the transaction, the
    /// socket can serve other transactions.
    pub fn close(&mut self) -> Result<(), HttpClientError> {
        self.closed = true;
        match self.socket.take() {
            Some(socket) => {
                if self.disconnect_on_close {
                    socket.close();
                } else {
                    socket.release();
                }
            }
            None => tracing::warn!("closing transaction over nonexistent socket"),
        }
        Ok(())
    }

    // The request loop: send, parse, then handle redirects and `304`
    // revalidation until a response can be returned to the caller.
    fn drive(&mut self, method: Method, target: &str) -> Result<HttpResponse, HttpClientError> {
        self.verify_body_sources()?;
        self.curr_redirects = 0;
        self.curr_repeats = 0;
        let mut target = Uri::from_bytes(target.as_bytes())
            .map_err(|e| HttpClientError::from_error(ErrorKind::InvalidRequest, e))?;
        let auto_host = !self.headers.contains("host");
        let mut reuse_socket = false;

        loop {
            let body = self.make_body(&method)?;
            let request = self.build_request(&method, &target, auto_host)?;

            let socket = match self.socket.clone() {
                Some(socket) if reuse_socket => socket,
                current => {
                    if let Some(old) = current {
                        old.release();
                    }
                    self.socket = None;
                    self.acquire(&Endpoint::from_uri(&target)?)?
                }
            };
            self.socket = Some(socket.clone());
            reuse_socket = false;

            let head = RequestEncoder::new(&request).encode();
            socket.print(&String::from_utf8_lossy(&head))?;
            socket.flush()?;
            if let Some(body) = &body {
                socket.write(body)?;
            }

            let mut response = match self.policy.should_look(&request) {
                true => match self.cached_response(&request) {
                    Some(cached) => cached,
                    None => self.parse_live(socket.clone(), request.clone())?,
                },
                false => self.parse_live(socket.clone(), request.clone())?,
            };
            let status = match response.status() {
                Some(status) => status.clone(),
                None => return err_from_msg!(InvalidResponse, "response carries no status"),
            };

            if status.code().is_redirect() {
                self.curr_redirects += 1;
                if self.curr_redirects >= self.max_redirects {
                    return err_from_msg!(InvalidResponse, "too many redirects");
                }
                let location = response.location().ok_or(HttpClientError::from_str(
                    ErrorKind::InvalidResponse,
                    "redirect carries no Location header",
                ))?;
                // Drain the redirect body so the socket is clean for the
                // next exchange.
                let _ = response.body_string();
                let reference = match Uri::from_bytes(location.as_bytes()) {
                    Ok(reference) => reference,
                    Err(e) => return err_from_other!(InvalidResponse, e),
                };
                // An absolute-path Location stays on the current origin,
                // so the current socket is kept; anything else re-acquires
                // for the (possibly new) host.
                reuse_socket =
                    reference.scheme().is_none() && reference.authority().is_none();
                target = target.resolve(&reference);
                continue;
            }

            if status.code() == StatusCode::NOT_MODIFIED
                && self.policy.should_look_with(&request, &status)
            {
                if let Some(cached) = self.cached_response(&request) {
                    self.latch_disconnect(&response);
                    return Ok(cached);
                }
                if self.repeat_on_not_modified {
                    self.curr_repeats += 1;
                    if self.curr_repeats >= self.max_repeats {
                        if self.throw_if_max_repeats {
                            return err_from_msg!(InvalidResponse, "too many repeated requests");
                        }
                        self.latch_disconnect(&response);
                        return Ok(response);
                    }
                    for name in ["if-modified-since", "if-none-match", "if-unmodified-since"] {
                        self.headers.remove(name);
                    }
                    // The server may have closed this connection after the
                    // 304; the repeat goes out on a fresh socket.
                    continue;
                }
            }

            self.latch_disconnect(&response);
            self.store_parts(&request, &status, &response);
            return Ok(response);
        }
    }

    pub(crate) fn verify_body_sources(&self) -> Result<(), HttpClientError> {
        if self.body_str.is_some() && self.body_file.is_some() {
            return err_from_msg!(InvalidRequest, "cannot send both a string and a file");
        }
        if let Some(file) = &self.body_file {
            if !file.exists() {
                return err_from_msg!(InvalidRequest, "body file does not exist");
            }
        }
        Ok(())
    }

    // Prepares the body bytes and the Content-Length header: a string
    // body is compressed per the Content-Encoding header, a file body is
    // read whole and sent as-is.
    fn make_body(&mut self, _method: &Method) -> Result<Option<Vec<u8>>, HttpClientError> {
        let body = if let Some(text) = &self.body_str {
            Some(self.encode_request_body(text.as_bytes())?)
        } else if let Some(file) = &self.body_file {
            match fs::read(file) {
                Ok(bytes) => Some(bytes),
                Err(e) => return err_from_io!(Io, e),
            }
        } else {
            None
        };
        if let Some(body) = &body {
            self.headers
                .insert("Content-Length", body.len().to_string().as_str())
                .map_err(|e| HttpClientError::from_error(ErrorKind::InvalidRequest, e))?;
        }
        Ok(body)
    }

    pub(crate) fn encode_request_body(&self, data: &[u8]) -> Result<Vec<u8>, HttpClientError> {
        let coding = match self.headers.get_string("content-encoding") {
            None => Coding::Identity,
            Some(token) => match Coding::from_token(&token) {
                Some(coding) => coding,
                None => {
                    tracing::warn!("ignoring unknown content coding {token}");
                    Coding::Identity
                }
            },
        };
        coding
            .compress(data)
            .map_err(|e| HttpClientError::from_io_error(ErrorKind::Io, e))
    }

    // Builds and validates the request for the current target: inserts
    // the Host header when missing, checks the header policy and the
    // method's body requirements, and warns on unsupported methods and
    // versions.
    pub(crate) fn build_request(
        &mut self,
        method: &Method,
        target: &Uri,
        auto_host: bool,
    ) -> Result<Request, HttpClientError> {
        // An auto-set Host is refreshed on every hop, since a redirect may
        // change the origin. A caller-provided Host is left alone.
        if auto_host {
            if let Some(host) = target.host() {
                self.headers
                    .insert("Host", host)
                    .map_err(|e| HttpClientError::from_error(ErrorKind::InvalidRequest, e))?;
            }
        }
        self.header_policy.check(&self.headers)?;

        let chunked = self
            .headers
            .get_string("transfer-encoding")
            .map(|encoding| encoding.contains("chunked"))
            .unwrap_or(false);
        let has_length = self.headers.contains("content-length");
        let has_type = self.headers.contains("content-type");
        if method.must_provide_body() && !chunked && (!has_length || !has_type) {
            return err_from_msg!(
                InvalidRequest,
                "method requires a body, but content length or type is not set"
            );
        }
        if !method.can_provide_body() && (has_length || has_type) {
            return err_from_msg!(
                InvalidRequest,
                "method cannot take a body, but content length or type is set"
            );
        }
        if !method.is_supported() {
            tracing::warn!("using unsupported method {} (might fail)", method.as_str());
        }
        if !self.version.is_supported() {
            tracing::warn!(
                "using unsupported HTTP version {} (might fail)",
                self.version.as_str()
            );
        }

        Request::builder()
            .method(method.clone())
            .uri(target.clone())
            .version(self.version.clone())
            .headers(self.headers.clone())
            .build()
            .map_err(|e| HttpClientError::from_error(ErrorKind::InvalidRequest, e))
    }

    // Obtains a socket: directly for blocking transactions, or bridged
    // through the pool's asynchronous acquisition callbacks for
    // transactions driven by `make_request_later`.
    pub(crate) fn acquire(
        &self,
        endpoint: &Endpoint,
    ) -> Result<Arc<HttpSocket>, HttpClientError> {
        if !self.async_acquire {
            return self.pool.acquire_blocking(endpoint);
        }
        let (tx, rx) = mpsc::channel();
        self.pool
            .acquire_async(endpoint.clone(), Box::new(AcquireBridge { tx }));
        match rx.recv() {
            Ok(result) => result,
            Err(_) => err_from_msg!(Timeout, "pool dropped the acquisition"),
        }
    }

    pub(crate) fn parse_live(
        &self,
        socket: Arc<HttpSocket>,
        request: Request,
    ) -> Result<HttpResponse, HttpClientError> {
        let mut response = HttpResponse::from_socket(socket, request);
        response.set_cache(self.cache.clone());
        response.set_policy(self.policy.clone());
        response.parse()?;
        Ok(response)
    }

    fn cached_response(&self, request: &Request) -> Option<HttpResponse> {
        let mut cache = self.cache.lock().unwrap();
        if !cache.exists(request) {
            return None;
        }
        Some(HttpResponse::wrap(
            cache.get_status(request),
            cache.get_headers(request),
            cache.get_body(request),
        ))
    }

    // Latches the Connection header of the response: the socket is closed
    // on transaction close when the server asked for it, kept alive
    // otherwise (the HTTP/1.1 default).
    pub(crate) fn latch_disconnect(&mut self, response: &HttpResponse) {
        if let Some(connection) = response.headers().get_string("connection") {
            self.disconnect_on_close = connection.eq_ignore_ascii_case("close");
        }
    }

    fn store_parts(&self, request: &Request, status: &StatusLine, response: &HttpResponse) {
        if self.policy.should_store(request, status) {
            let mut cache = self.cache.lock().unwrap();
            cache.put_status(request, status.clone());
            cache.put_headers(request, response.headers().clone());
        }
    }

    fn ensure_open(&self) -> Result<(), HttpClientError> {
        if self.closed {
            return err_from_msg!(InvalidRequest, "cannot use a closed transaction");
        }
        if self.used {
            return err_from_msg!(InvalidRequest, "transaction has already been finished");
        }
        Ok(())
    }
}

struct AcquireBridge {
    tx: mpsc::Sender<Result<Arc<HttpSocket>, HttpClientError>>,
}

impl PoolCallbacks for AcquireBridge {
    fn on_obtained(&mut self, socket: Arc<HttpSocket>) {
        let _ = self.tx.send(Ok(socket));
    }

    fn on_timeout(&mut self) {
        let _ = self.tx.send(Err(HttpClientError::from_str(
            ErrorKind::Timeout,
            "cannot obtain connection; try again later",
        )));
    }

    fn on_exception(&mut self, error: HttpClientError) {
        let _ = self.tx.send(Err(error));
    }
}

impl Drop for HttpTransaction {
    // A transaction dropped without close() still hands its socket back,
    // best-effort.
    fn drop(&mut self) {
        if let Some(socket) = self.socket.take() {
            if self.disconnect_on_close {
                socket.close();
            } else {
                socket.release();
            }
        }
    }
}

#[cfg(test)]
mod ut_transaction {
    use std::sync::Arc;

    use opal_http::request::method::Method;

    use crate::error::ErrorKind;
    use crate::pool::ConfigurablePool;
    use crate::transaction::HttpTransaction;

    fn transaction() -> HttpTransaction {
        HttpTransaction::new(Arc::new(ConfigurablePool::new()))
    }

    /// UT test cases for body source validation.
    ///
    /// # Brief
    /// 1. Sets both a string and a file body.
    /// 2. Checks the request fails with `InvalidRequest`.
    /// 3. Sets a missing file and checks the same.
    #[test]
    fn ut_transaction_body_sources() {
        let mut transaction = transaction();
        transaction.send_string("body");
        transaction.send_file(std::path::PathBuf::from("/nonexistent/body.bin"));
        let error = transaction
            .make_request(Method::PUT, "http://127.0.0.1:1/x")
            .unwrap_err();
        assert_eq!(error.error_kind(), ErrorKind::InvalidRequest);

        let mut transaction = super::HttpTransaction::new(Arc::new(ConfigurablePool::new()));
        transaction.send_file(std::path::PathBuf::from("/nonexistent/body.bin"));
        let error = transaction
            .make_request(Method::PUT, "http://127.0.0.1:1/x")
            .unwrap_err();
        assert_eq!(error.error_kind(), ErrorKind::InvalidRequest);
    }

    /// UT test cases for single-use enforcement.
    ///
    /// # Brief
    /// 1. Performs a terminal call (which fails on the unreachable
    ///    target).
    /// 2. Checks a second terminal call is rejected.
    /// 3. Closes the transaction and checks further use is rejected.
    #[test]
    fn ut_transaction_single_use() {
        let mut transaction = transaction();
        // Fails while connecting; the transaction still counts as used.
        let _ = transaction.make_request(Method::GET, "http://127.0.0.1:1/x");
        let error = transaction
            .make_request(Method::GET, "http://127.0.0.1:1/x")
            .unwrap_err();
        assert_eq!(error.error_kind(), ErrorKind::InvalidRequest);

        let mut transaction = super::HttpTransaction::new(Arc::new(ConfigurablePool::new()));
        transaction.close().unwrap();
        let error = transaction
            .make_request(Method::GET, "http://127.0.0.1:1/x")
            .unwrap_err();
        assert_eq!(error.error_kind(), ErrorKind::InvalidRequest);
    }

    /// UT test cases for body-requirement validation.
    ///
    /// # Brief
    /// 1. Makes a PUT request without a `Content-Type`.
    /// 2. Checks the request fails with `InvalidRequest` before any
    ///    connection is opened.
    #[test]
    fn ut_transaction_body_headers_required() {
        let mut transaction = transaction();
        transaction.send_string("data");
        let error = transaction
            .make_request(Method::PUT, "http://127.0.0.1:1/x")
            .unwrap_err();
        assert_eq!(error.error_kind(), ErrorKind::InvalidRequest);
    }

    /// UT test cases for bodies on body-less methods.
    ///
    /// # Brief
    /// 1. Sets a `Content-Type` on a TRACE request.
    /// 2. Checks the request fails with `InvalidRequest`.
    #[test]
    fn ut_transaction_forbidden_body() {
        let mut transaction = transaction();
        transaction
            .headers_mut()
            .insert("Content-Type", "text/plain")
            .unwrap();
        let error = transaction
            .make_request(Method::TRACE, "http://127.0.0.1:1/x")
            .unwrap_err();
        assert_eq!(error.error_kind(), ErrorKind::InvalidRequest);
    }
}
