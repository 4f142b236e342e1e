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

//! HTTP [`Method`].
//!
//! The request method token is the primary source of request semantics;
//! it indicates the purpose for which the client has made this request and
//! what is expected by the client as a successful result.
//!
//! [`Method`]: https://httpwg.org/specs/rfc9110.html#methods
//!
//! # Examples
//!
//! ```
//! use opal_http::request::method::Method;
//!
//! assert_eq!(Method::GET.as_str(), "GET");
//! ```

use core::convert::TryFrom;

use crate::error::{ErrorKind, HttpError};

// Per-method property flags.
const REQ_BODY_MUST: u32 = 1;
const REQ_BODY_MUSTNT: u32 = 1 << 1;
const RESP_BODY: u32 = 1 << 2;
const SAFE: u32 = 1 << 3;
const IDEMPOTENT: u32 = 1 << 4;
const CACHEABLE: u32 = 1 << 5;

/// HTTP `Method` implementation.
///
/// Besides the token itself, a method carries the properties the
/// transaction layer validates against: whether a request body is
/// mandatory or forbidden, whether a response body is expected, and
/// whether responses are cacheable.
///
/// # Examples
///
/// ```
/// use opal_http::request::method::Method;
///
/// assert_eq!(Method::GET.as_str(), "GET");
/// assert!(Method::POST.must_provide_body());
/// assert!(!Method::TRACE.can_provide_body());
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Method(Inner);

impl Method {
    /// Transfer a current representation of the target resource.
    ///
    /// See [`RFC9110 9.3.1`] for more details.
    ///
    /// [`RFC9110 9.3.1`]: https://httpwg.org/specs/rfc9110.html#GET
    pub const GET: Self = Self(Inner::Get);

    /// Same as `GET`, but do not transfer the response content.
    ///
    /// See [`RFC9110 9.3.2`] for more details.
    ///
    /// [`RFC9110 9.3.2`]: https://httpwg.org/specs/rfc9110.html#HEAD
    pub const HEAD: Self = Self(Inner::Head);

    /// Perform resource-specific processing on the request content.
    ///
    /// See [`RFC9110 9.3.3`] for more details.
    ///
    /// [`RFC9110 9.3.3`]: https://httpwg.org/specs/rfc9110.html#POST
    pub const POST: Self = Self(Inner::Post);

    /// Replace all current representations of the target resource with the
    /// request content.
    ///
    /// See [`RFC9110 9.3.4`] for more details.
    ///
    /// [`RFC9110 9.3.4`]: https://httpwg.org/specs/rfc9110.html#PUT
    pub const PUT: Self = Self(Inner::Put);

    /// Remove all current representations of the target resource.
    ///
    /// See [`RFC9110 9.3.5`] for more details.
    ///
    /// [`RFC9110 9.3.5`]: https://httpwg.org/specs/rfc9110.html#DELETE
    pub const DELETE: Self = Self(Inner::Delete);

    /// Establish a tunnel to the server identified by the target resource.
    ///
    /// See [`RFC9110 9.3.6`] for more details.
    ///
    /// [`RFC9110 9.3.6`]: https://httpwg.org/specs/rfc9110.html#CONNECT
    pub const CONNECT: Self = Self(Inner::Connect);

    /// Describe the communication options for the target resource.
    ///
    /// See [`RFC9110 9.3.7`] for more details.
    ///
    /// [`RFC9110 9.3.7`]: https://httpwg.org/specs/rfc9110.html#OPTIONS
    pub const OPTIONS: Self = Self(Inner::Options);

    /// Perform a message loop-back test along the path to the target
    /// resource.
    ///
    /// See [`RFC9110 9.3.8`] for more details.
    ///
    /// [`RFC9110 9.3.8`]: https://httpwg.org/specs/rfc9110.html#TRACE
    pub const TRACE: Self = Self(Inner::Trace);

    /// Apply partial modifications to a resource.
    pub const PATCH: Self = Self(Inner::Patch);

    /// Tries converting `&[u8]` to `Method`. Only uppercase letters are
    /// supported.
    ///
    /// # Examples
    ///
    /// ```
    /// use opal_http::request::method::Method;
    ///
    /// let method = Method::from_bytes(b"GET").unwrap();
    /// assert_eq!(method.as_str(), "GET");
    /// ```
    pub fn from_bytes(bytes: &[u8]) -> Result<Method, HttpError> {
        if bytes.len() < 3 || bytes.len() > 7 {
            return Err(ErrorKind::InvalidInput.into());
        }
        match bytes[0] {
            b'G' if b"ET" == &bytes[1..] => Ok(Method::GET),
            b'P' => match bytes[1] {
                b'U' if b"T" == &bytes[2..] => Ok(Method::PUT),
                b'O' if b"ST" == &bytes[2..] => Ok(Method::POST),
                b'A' if b"TCH" == &bytes[2..] => Ok(Method::PATCH),
                _ => Err(ErrorKind::InvalidInput.into()),
            },
            b'H' if b"EAD" == &bytes[1..] => Ok(Method::HEAD),
            b'T' if b"RACE" == &bytes[1..] => Ok(Method::TRACE),
            b'D' if b"ELETE" == &bytes[1..] => Ok(Method::DELETE),
            b'O' if b"PTIONS" == &bytes[1..] => Ok(Method::OPTIONS),
            b'C' if b"ONNECT" == &bytes[1..] => Ok(Method::CONNECT),
            _ => Err(ErrorKind::InvalidInput.into()),
        }
    }

    /// Converts `Method` to `&str` in uppercase.
    ///
    /// # Examples
    /// ```
    /// use opal_http::request::method::Method;
    ///
    /// assert_eq!(Method::GET.as_str(), "GET");
    /// ```
    pub fn as_str(&self) -> &str {
        match self.0 {
            Inner::Get => "GET",
            Inner::Head => "HEAD",
            Inner::Post => "POST",
            Inner::Put => "PUT",
            Inner::Delete => "DELETE",
            Inner::Options => "OPTIONS",
            Inner::Trace => "TRACE",
            Inner::Connect => "CONNECT",
            Inner::Patch => "PATCH",
        }
    }

    /// Returns `true` if the method is officially supported by this client.
    /// Other methods may still work, but it is up to the caller to ensure
    /// everything is in its place, e.g. appropriate headers.
    pub fn is_supported(&self) -> bool {
        matches!(
            self.0,
            Inner::Get | Inner::Post | Inner::Put | Inner::Delete
        )
    }

    /// Denotes whether a request body is mandatory. If it is, then a body
    /// must be provided along with appropriate headers, even if empty.
    pub fn must_provide_body(&self) -> bool {
        self.properties() & REQ_BODY_MUST != 0
    }

    /// Denotes whether a request body is allowed at all.
    pub fn can_provide_body(&self) -> bool {
        self.properties() & REQ_BODY_MUSTNT == 0
    }

    /// Denotes whether a response to this method carries a body.
    pub fn response_has_body(&self) -> bool {
        self.properties() & RESP_BODY != 0
    }

    /// If a method is safe, requests should not change the resource
    /// representation.
    pub fn is_safe(&self) -> bool {
        self.properties() & SAFE != 0
    }

    /// If a method is idempotent, the request can be made multiple times
    /// with the same outcome.
    pub fn is_idempotent(&self) -> bool {
        self.properties() & IDEMPOTENT != 0
    }

    /// Denotes whether responses to this method can be cached. This is
    /// further refined by response headers.
    pub fn is_response_cacheable(&self) -> bool {
        self.properties() & CACHEABLE != 0
    }

    fn properties(&self) -> u32 {
        match self.0 {
            Inner::Get => RESP_BODY | SAFE | IDEMPOTENT | CACHEABLE,
            Inner::Head => SAFE | IDEMPOTENT | CACHEABLE,
            Inner::Post => REQ_BODY_MUST | RESP_BODY,
            Inner::Put => REQ_BODY_MUST | RESP_BODY | IDEMPOTENT,
            Inner::Delete => RESP_BODY | IDEMPOTENT,
            Inner::Connect => RESP_BODY,
            Inner::Options => RESP_BODY | IDEMPOTENT | SAFE,
            Inner::Trace => REQ_BODY_MUSTNT | RESP_BODY | SAFE | IDEMPOTENT,
            Inner::Patch => REQ_BODY_MUST | RESP_BODY,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
enum Inner {
    Get,
    Head,
    Post,
    Put,
    Delete,
    Connect,
    Options,
    Trace,
    Patch,
}

impl<'a> TryFrom<&'a [u8]> for Method {
    type Error = HttpError;

    fn try_from(t: &'a [u8]) -> Result<Self, Self::Error> {
        Self::from_bytes(t)
    }
}

impl<'a> TryFrom<&'a str> for Method {
    type Error = HttpError;

    fn try_from(t: &'a str) -> Result<Self, Self::Error> {
        Self::from_bytes(t.as_bytes())
    }
}
