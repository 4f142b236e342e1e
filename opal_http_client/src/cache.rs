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

//! Response cache used by transactions for `304` revalidation.
//!
//! [`HttpCache`] maps request fingerprints to previously received
//! response parts. Status, headers and body have separate setters, so
//! partial entries are legal and implementations must tolerate entries
//! with some fields unset.
//!
//! Implementations are deliberately not required to be internally
//! synchronized; callers that share one cache across threads wrap it (the
//! client uses an `Arc<Mutex<_>>`) or choose a concurrent implementation.

use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use opal_http::headers::Headers;
use opal_http::request::Request;
use opal_http::response::StatusLine;

/// How a transaction and its response share a cache.
pub type SharedCache = Arc<Mutex<dyn HttpCache + Send>>;

/// The kind of body stored for a cache entry.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BodyKind {
    /// The body was delivered as a string.
    Text,
    /// The body was written to a caller-provided file.
    File,
    /// No body has been stored.
    None,
}

/// A stored response body.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CachedBody {
    /// Body bytes, decoded to a string.
    Text(String),
    /// Path of the file the body was written to.
    File(PathBuf),
}

impl CachedBody {
    /// Returns the kind of this body.
    pub fn kind(&self) -> BodyKind {
        match self {
            CachedBody::Text(_) => BodyKind::Text,
            CachedBody::File(_) => BodyKind::File,
        }
    }
}

/// Common interface for the cache used by transactions.
pub trait HttpCache {
    /// Cleans the cache up and checks whether the given request exists in
    /// it. When this returns `true`, the entry is guaranteed not to become
    /// stale for at least a short period afterwards.
    fn exists(&mut self, request: &Request) -> bool;

    /// Removes the given request from the cache, if it exists.
    fn evict(&mut self, request: &Request);

    /// Puts a response status in the cache, creating the entry if needed.
    /// When filling a new entry, also put the headers and a body, or evict
    /// the request again.
    fn put_status(&mut self, request: &Request, status: StatusLine);

    /// Puts response headers in the cache, creating the entry if needed.
    fn put_headers(&mut self, request: &Request, headers: Headers);

    /// Puts a string body in the cache, creating the entry if needed.
    fn put_string(&mut self, request: &Request, body: String);

    /// Puts a reference to the file holding the response body in the
    /// cache, creating the entry if needed.
    fn put_file(&mut self, request: &Request, body: PathBuf);

    /// Gets the stored status, or `None`.
    fn get_status(&mut self, request: &Request) -> Option<StatusLine>;

    /// Gets the stored headers, or `None`.
    fn get_headers(&mut self, request: &Request) -> Option<Headers>;

    /// Gets the stored body, or `None`. Use together with
    /// [`HttpCache::get_type`] when the kind is unknown.
    fn get_body(&mut self, request: &Request) -> Option<CachedBody>;

    /// Gets the kind of the stored body.
    fn get_type(&mut self, request: &Request) -> BodyKind;

    /// Gets for how long the entry has been in the cache so far, or
    /// `None` when it does not exist.
    fn get_age(&mut self, request: &Request) -> Option<Duration>;
}

/// An empty cache. It stores nothing, returns `None` from all getters and
/// `exists` always returns `false`.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmptyCache;

impl HttpCache for EmptyCache {
    fn exists(&mut self, _request: &Request) -> bool {
        false
    }

    fn evict(&mut self, _request: &Request) {}

    fn put_status(&mut self, _request: &Request, _status: StatusLine) {}

    fn put_headers(&mut self, _request: &Request, _headers: Headers) {}

    fn put_string(&mut self, _request: &Request, _body: String) {}

    fn put_file(&mut self, _request: &Request, _body: PathBuf) {}

    fn get_status(&mut self, _request: &Request) -> Option<StatusLine> {
        None
    }

    fn get_headers(&mut self, _request: &Request) -> Option<Headers> {
        None
    }

    fn get_body(&mut self, _request: &Request) -> Option<CachedBody> {
        None
    }

    fn get_type(&mut self, _request: &Request) -> BodyKind {
        BodyKind::None
    }

    fn get_age(&mut self, _request: &Request) -> Option<Duration> {
        None
    }
}

/// Simple FIFO cache for HTTP requests and responses, with a bounded size
/// and a single TTL for all entries.
///
/// On insertion the request is appended to an eviction queue; when the
/// size bound is exceeded, entries are dropped from the queue front. The
/// queue may reference requests that were already evicted explicitly;
/// such stale queue entries are skipped. Entries older than the TTL are
/// lazily dropped from the queue front on each read.
///
/// # Examples
///
/// ```
/// use opal_http::request::method::Method;
/// use opal_http::request::Request;
/// use opal_http_client::{FifoCache, HttpCache};
///
/// let mut cache = FifoCache::new(4);
/// let request = Request::builder()
///     .method(Method::GET)
///     .target("http://example.org/x")
///     .build()
///     .unwrap();
/// cache.put_string(&request, String::from("body"));
/// assert!(cache.exists(&request));
/// ```
pub struct FifoCache {
    size: usize,
    max_age: Duration,
    cache: HashMap<Request, ResponseData>,
    eviction_queue: VecDeque<Request>,
}

impl FifoCache {
    /// Creates a cache with the given size bound and the default TTL of
    /// ten minutes.
    pub fn new(size: usize) -> FifoCache {
        Self::with_max_age(size, Duration::from_secs(10 * 60))
    }

    /// Creates a cache with the given size bound and TTL.
    pub fn with_max_age(size: usize, max_age: Duration) -> FifoCache {
        FifoCache {
            size,
            max_age,
            cache: HashMap::new(),
            eviction_queue: VecDeque::new(),
        }
    }

    fn put(&mut self, request: &Request, data: ResponseData) {
        self.cache.insert(request.clone(), data);
        self.eviction_queue.push_back(request.clone());
        while self.cache.len() > self.size {
            // The cache may no longer contain a queued request if it was
            // evicted explicitly; keep polling.
            match self.eviction_queue.pop_front() {
                Some(victim) => {
                    self.cache.remove(&victim);
                }
                None => break,
            }
        }
    }

    // Drops entries older than the TTL from the queue front. `slack`
    // widens the check so that an entry reported alive by `exists` does
    // not expire the very next moment.
    fn clean_up(&mut self, slack: Duration) {
        loop {
            let victim = match self.eviction_queue.front() {
                None => break,
                Some(front) => match self.cache.get(front) {
                    // Stale queue entry: the request was already evicted.
                    None => None,
                    Some(data) if data.age() + slack >= self.max_age => Some(front.clone()),
                    Some(_) => break,
                },
            };
            self.eviction_queue.pop_front();
            if let Some(victim) = victim {
                self.cache.remove(&victim);
            }
        }
    }

    fn entry(&mut self, request: &Request) -> Option<&mut ResponseData> {
        self.clean_up(Duration::ZERO);
        self.cache.get_mut(request)
    }
}

impl Default for FifoCache {
    fn default() -> Self {
        Self::new(32)
    }
}

impl HttpCache for FifoCache {
    fn exists(&mut self, request: &Request) -> bool {
        self.clean_up(Duration::from_millis(50));
        self.cache.contains_key(request)
    }

    fn evict(&mut self, request: &Request) {
        self.cache.remove(request);
    }

    fn put_status(&mut self, request: &Request, status: StatusLine) {
        if self.exists(request) {
            if let Some(data) = self.cache.get_mut(request) {
                data.status = Some(status);
                return;
            }
        }
        self.put(request, ResponseData::with_status(status));
    }

    fn put_headers(&mut self, request: &Request, headers: Headers) {
        if self.exists(request) {
            if let Some(data) = self.cache.get_mut(request) {
                data.headers = Some(headers);
                return;
            }
        }
        self.put(request, ResponseData::with_headers(headers));
    }

    fn put_string(&mut self, request: &Request, body: String) {
        if self.exists(request) {
            if let Some(data) = self.cache.get_mut(request) {
                data.body = Some(CachedBody::Text(body));
                return;
            }
        }
        self.put(request, ResponseData::with_body(CachedBody::Text(body)));
    }

    fn put_file(&mut self, request: &Request, body: PathBuf) {
        if self.exists(request) {
            if let Some(data) = self.cache.get_mut(request) {
                data.body = Some(CachedBody::File(body));
                return;
            }
        }
        self.put(request, ResponseData::with_body(CachedBody::File(body)));
    }

    fn get_status(&mut self, request: &Request) -> Option<StatusLine> {
        self.entry(request).and_then(|data| data.status.clone())
    }

    fn get_headers(&mut self, request: &Request) -> Option<Headers> {
        self.entry(request).and_then(|data| data.headers.clone())
    }

    fn get_body(&mut self, request: &Request) -> Option<CachedBody> {
        self.entry(request).and_then(|data| data.body.clone())
    }

    fn get_type(&mut self, request: &Request) -> BodyKind {
        self.entry(request)
            .and_then(|data| data.body.as_ref().map(CachedBody::kind))
            .unwrap_or(BodyKind::None)
    }

    fn get_age(&mut self, request: &Request) -> Option<Duration> {
        self.entry(request).map(|data| data.age())
    }
}

// One cache entry. Any field may still be unset.
struct ResponseData {
    status: Option<StatusLine>,
    headers: Option<Headers>,
    body: Option<CachedBody>,
    inserted_at: Instant,
}

impl ResponseData {
    fn new() -> Self {
        Self {
            status: None,
            headers: None,
            body: None,
            inserted_at: Instant::now(),
        }
    }

    fn with_status(status: StatusLine) -> Self {
        let mut data = Self::new();
        data.status = Some(status);
        data
    }

    fn with_headers(headers: Headers) -> Self {
        let mut data = Self::new();
        data.headers = Some(headers);
        data
    }

    fn with_body(body: CachedBody) -> Self {
        let mut data = Self::new();
        data.body = Some(body);
        data
    }

    fn age(&self) -> Duration {
        self.inserted_at.elapsed()
    }
}

#[cfg(test)]
mod ut_cache {
    use std::time::Duration;

    use opal_http::request::method::Method;
    use opal_http::request::Request;
    use opal_http::response::status::StatusCode;
    use opal_http::response::StatusLine;

    use crate::cache::{BodyKind, CachedBody, EmptyCache, FifoCache, HttpCache};

    fn request(path: &str) -> Request {
        Request::builder()
            .method(Method::GET)
            .target(&format!("http://example.org{path}"))
            .build()
            .unwrap()
    }

    fn status() -> StatusLine {
        StatusLine::from_raw_parts(String::from("HTTP/1.1"), StatusCode::OK, String::from("OK"))
    }

    /// UT test cases for partial entries in `FifoCache`.
    ///
    /// # Brief
    /// 1. Puts only a status for a request.
    /// 2. Checks the entry exists with the other fields unset.
    /// 3. Fills in headers and a body and checks each getter.
    #[test]
    fn ut_fifo_cache_partial_entries() {
        let mut cache = FifoCache::new(4);
        let request = request("/a");

        cache.put_status(&request, status());
        assert!(cache.exists(&request));
        assert!(cache.get_headers(&request).is_none());
        assert!(cache.get_body(&request).is_none());
        assert_eq!(cache.get_type(&request), BodyKind::None);

        let mut headers = opal_http::headers::Headers::new();
        headers.insert("etag", "\"abc\"").unwrap();
        cache.put_headers(&request, headers);
        cache.put_string(&request, String::from("body"));

        assert_eq!(cache.get_status(&request).unwrap().code(), StatusCode::OK);
        assert_eq!(
            cache.get_headers(&request).unwrap().get_string("etag").unwrap(),
            "\"abc\""
        );
        assert_eq!(
            cache.get_body(&request).unwrap(),
            CachedBody::Text(String::from("body"))
        );
        assert_eq!(cache.get_type(&request), BodyKind::Text);
        assert!(cache.get_age(&request).unwrap() < Duration::from_secs(1));
    }

    /// UT test cases for FIFO eviction.
    ///
    /// # Brief
    /// 1. Fills a two-entry cache with three requests.
    /// 2. Checks the oldest entry was evicted.
    /// 3. Evicts an entry explicitly and checks the stale queue entry is
    ///    tolerated.
    #[test]
    fn ut_fifo_cache_eviction() {
        let mut cache = FifoCache::new(2);
        let first = request("/1");
        let second = request("/2");
        let third = request("/3");

        cache.put_status(&first, status());
        cache.put_status(&second, status());
        cache.put_status(&third, status());

        assert!(!cache.exists(&first));
        assert!(cache.exists(&second));
        assert!(cache.exists(&third));

        // Explicit evict leaves a dangling eviction-queue entry behind.
        cache.evict(&second);
        assert!(!cache.exists(&second));
        let fourth = request("/4");
        cache.put_status(&fourth, status());
        assert!(cache.exists(&third));
        assert!(cache.exists(&fourth));
    }

    /// UT test cases for TTL expiry.
    ///
    /// # Brief
    /// 1. Creates a cache with a very short TTL.
    /// 2. Waits past the TTL.
    /// 3. Checks the entry is gone.
    #[test]
    fn ut_fifo_cache_ttl() {
        let mut cache = FifoCache::with_max_age(4, Duration::from_millis(30));
        let request = request("/ttl");
        cache.put_string(&request, String::from("body"));
        assert!(cache.exists(&request));

        std::thread::sleep(Duration::from_millis(100));
        assert!(!cache.exists(&request));
        assert!(cache.get_body(&request).is_none());
    }

    /// UT test cases for `EmptyCache`.
    ///
    /// # Brief
    /// 1. Puts data into the empty cache.
    /// 2. Checks nothing is ever stored.
    #[test]
    fn ut_empty_cache() {
        let mut cache = EmptyCache;
        let request = request("/e");
        cache.put_status(&request, status());
        cache.put_string(&request, String::from("body"));
        assert!(!cache.exists(&request));
        assert!(cache.get_status(&request).is_none());
        assert_eq!(cache.get_type(&request), BodyKind::None);
    }
}
