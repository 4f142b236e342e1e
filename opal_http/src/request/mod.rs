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

//! HTTP [`Request`].
//!
//! A request message consists of a method, a target URI, a protocol
//! version and headers; it is up to the user of this crate to write the
//! request body, if desirable.
//!
//! [`Request`]: https://httpwg.org/specs/rfc9110.html#request

pub mod method;
pub mod uri;

use core::hash::{Hash, Hasher};

use crate::headers::Headers;
use crate::request::method::Method;
use crate::request::uri::Uri;
use crate::version::Version;

/// HTTP `Request` implementation.
///
/// Two requests are equal when they use the same version, method, headers
/// and target; when the any-target flag is set, the path component of the
/// target is ignored in the comparison. This equality is what the response
/// cache fingerprints on.
///
/// # Examples
///
/// ```
/// use opal_http::request::method::Method;
/// use opal_http::request::Request;
///
/// let request = Request::builder()
///     .method(Method::GET)
///     .target("http://example.org/index")
///     .build()
///     .unwrap();
///
/// assert_eq!(request.method().as_str(), "GET");
/// assert_eq!(request.target().host().unwrap(), "example.org");
/// ```
#[derive(Clone, Debug)]
pub struct Request {
    version: Version,
    method: Method,
    target: Uri,
    headers: Headers,
    target_any: bool,
    set_host_header: bool,
}

impl Request {
    /// Creates a new `RequestBuilder`.
    pub fn builder() -> RequestBuilder {
        RequestBuilder::new()
    }

    /// Gets the HTTP version of this request.
    pub fn version(&self) -> &Version {
        &self.version
    }

    /// Gets the method of this request.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Gets the target URI of this request.
    pub fn target(&self) -> &Uri {
        &self.target
    }

    /// Gets the headers of this request.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Gets a mutable reference to the headers of this request.
    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    /// Returns `true` when the request line carries `*` instead of the
    /// target path, as used by e.g. server-wide `OPTIONS` requests.
    pub fn target_any(&self) -> bool {
        self.target_any
    }

    /// Returns `true` when a `Host` header should be inserted from the
    /// target before sending.
    pub fn set_host_header(&self) -> bool {
        self.set_host_header
    }

    /// Returns whether responses to this request may be cached. This is
    /// quite primitive; the caching policy refines it.
    pub fn is_cacheable(&self) -> bool {
        self.method.is_response_cacheable()
    }
}

impl PartialEq for Request {
    fn eq(&self, other: &Self) -> bool {
        if self.version != other.version
            || self.method != other.method
            || self.headers != other.headers
            || self.target_any != other.target_any
        {
            return false;
        }
        if !self.target_any {
            self.target == other.target
        } else {
            // The path portion of the target does not matter for
            // any-target requests.
            self.target.scheme() == other.target.scheme()
                && self.target.authority() == other.target.authority()
        }
    }
}

impl Eq for Request {}

impl Hash for Request {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.version.hash(state);
        self.method.hash(state);
        self.target.scheme().hash(state);
        self.target.authority().hash(state);
        if !self.target_any {
            self.target.path().hash(state);
            self.target.query().hash(state);
        }
        // Order-independent header hash: XOR of per-entry hashes.
        let mut acc: u64 = 0;
        for (name, value) in self.headers.iter() {
            let mut hasher = std::collections::hash_map::DefaultHasher::new();
            name.hash(&mut hasher);
            value.hash(&mut hasher);
            acc ^= hasher.finish();
        }
        acc.hash(state);
    }
}

/// A builder which is used to construct `Request`.
///
/// # Examples
///
/// ```
/// use opal_http::request::method::Method;
/// use opal_http::request::RequestBuilder;
///
/// let request = RequestBuilder::new()
///     .method(Method::PUT)
///     .target("http://example.org/item")
///     .header("Content-Length", "2")
///     .build()
///     .unwrap();
/// ```
pub struct RequestBuilder {
    inner: Result<Request, crate::error::HttpError>,
}

impl RequestBuilder {
    /// Creates a new, default `RequestBuilder`.
    pub fn new() -> Self {
        Self {
            inner: Ok(Request {
                version: Version::HTTP1_1,
                method: Method::GET,
                target: Uri::from_raw_parts(None, None, None, None),
                headers: Headers::new(),
                target_any: false,
                set_host_header: true,
            }),
        }
    }

    /// Sets the method of this request.
    pub fn method(mut self, method: Method) -> Self {
        if let Ok(request) = self.inner.as_mut() {
            request.method = method;
        }
        self
    }

    /// Sets the target of this request from a URI string.
    pub fn target(mut self, target: &str) -> Self {
        self.inner = self.inner.and_then(|mut request| {
            request.target = Uri::from_bytes(target.as_bytes())?;
            Ok(request)
        });
        self
    }

    /// Sets the target of this request from an already parsed `Uri`.
    pub fn uri(mut self, target: Uri) -> Self {
        if let Ok(request) = self.inner.as_mut() {
            request.target = target;
        }
        self
    }

    /// Sets the HTTP version of this request.
    pub fn version(mut self, version: Version) -> Self {
        if let Ok(request) = self.inner.as_mut() {
            request.version = version;
        }
        self
    }

    /// Replaces the headers of this request.
    pub fn headers(mut self, headers: Headers) -> Self {
        if let Ok(request) = self.inner.as_mut() {
            request.headers = headers;
        }
        self
    }

    /// Adds a single header to this request.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.inner = self.inner.and_then(|mut request| {
            request.headers.insert(name, value)?;
            Ok(request)
        });
        self
    }

    /// Sets whether the request line should carry `*` instead of the
    /// target path.
    pub fn target_any(mut self, target_any: bool) -> Self {
        if let Ok(request) = self.inner.as_mut() {
            request.target_any = target_any;
        }
        self
    }

    /// Sets whether a `Host` header should be inserted before sending.
    pub fn set_host_header(mut self, set_host_header: bool) -> Self {
        if let Ok(request) = self.inner.as_mut() {
            request.set_host_header = set_host_header;
        }
        self
    }

    /// Consumes the builder and constructs the `Request`.
    pub fn build(self) -> Result<Request, crate::error::HttpError> {
        self.inner
    }
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod ut_request {
    use super::Request;
    use crate::request::method::Method;

    /// UT test cases for `RequestBuilder`.
    ///
    /// # Brief
    /// 1. Builds a request with a method, target and header.
    /// 2. Checks each component.
    #[test]
    fn ut_request_builder() {
        let request = Request::builder()
            .method(Method::PUT)
            .target("http://example.org/item?rev=2")
            .header("Content-Length", "5")
            .build()
            .unwrap();
        assert_eq!(request.method(), &Method::PUT);
        assert_eq!(request.target().path_and_query(), "/item?rev=2");
        assert_eq!(
            request.headers().get_string("content-length").unwrap(),
            "5"
        );
        assert!(request.set_host_header());
        assert!(!request.target_any());
    }

    /// UT test cases for `Request` equality.
    ///
    /// # Brief
    /// 1. Builds requests differing only in path.
    /// 2. Checks equality with and without the any-target flag.
    #[test]
    fn ut_request_eq() {
        let a = Request::builder()
            .method(Method::GET)
            .target("http://example.org/a")
            .build()
            .unwrap();
        let b = Request::builder()
            .method(Method::GET)
            .target("http://example.org/b")
            .build()
            .unwrap();
        assert_ne!(a, b);

        let a = Request::builder()
            .method(Method::OPTIONS)
            .target("http://example.org/a")
            .target_any(true)
            .build()
            .unwrap();
        let b = Request::builder()
            .method(Method::OPTIONS)
            .target("http://example.org/b")
            .target_any(true)
            .build()
            .unwrap();
        assert_eq!(a, b);
    }

    /// UT test cases for `Request::is_cacheable`.
    ///
    /// # Brief
    /// 1. Builds requests with different methods.
    /// 2. Checks cacheability.
    #[test]
    fn ut_request_is_cacheable() {
        let get = Request::builder()
            .method(Method::GET)
            .target("http://example.org/")
            .build()
            .unwrap();
        assert!(get.is_cacheable());

        let put = Request::builder()
            .method(Method::PUT)
            .target("http://example.org/")
            .build()
            .unwrap();
        assert!(!put.is_cacheable());
    }
}
