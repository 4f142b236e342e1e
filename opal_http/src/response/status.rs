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

//! HTTP [`Status Code`].
//!
//! The status code of a response is a three-digit integer code that
//! describes the result of the request and the semantics of the response.
//!
//! [`Status Code`]: https://httpwg.org/specs/rfc9110.html#status.codes

use core::convert::TryFrom;

use crate::error::{ErrorKind, HttpError};

/// HTTP response `Status Code` implementation.
///
/// # Examples
///
/// ```
/// use opal_http::response::status::StatusCode;
///
/// assert_eq!(StatusCode::OK.as_u16(), 200);
/// assert!(!StatusCode::NOT_MODIFIED.has_body());
/// assert!(StatusCode::FOUND.is_redirect());
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct StatusCode(u16);

impl StatusCode {
    /// 100 Continue
    pub const CONTINUE: Self = Self(100);
    /// 101 Switching Protocols
    pub const SWITCHING_PROTOCOLS: Self = Self(101);
    /// 200 OK
    pub const OK: Self = Self(200);
    /// 201 Created
    pub const CREATED: Self = Self(201);
    /// 202 Accepted
    pub const ACCEPTED: Self = Self(202);
    /// 204 No Content
    pub const NO_CONTENT: Self = Self(204);
    /// 205 Reset Content
    pub const RESET_CONTENT: Self = Self(205);
    /// 300 Multiple Choices
    pub const MULTIPLE_CHOICES: Self = Self(300);
    /// 301 Moved Permanently
    pub const MOVED_PERMANENTLY: Self = Self(301);
    /// 302 Found
    pub const FOUND: Self = Self(302);
    /// 303 See Other
    pub const SEE_OTHER: Self = Self(303);
    /// 304 Not Modified
    pub const NOT_MODIFIED: Self = Self(304);
    /// 307 Temporary Redirect
    pub const TEMPORARY_REDIRECT: Self = Self(307);
    /// 400 Bad Request
    pub const BAD_REQUEST: Self = Self(400);
    /// 401 Unauthorized
    pub const UNAUTHORIZED: Self = Self(401);
    /// 403 Forbidden
    pub const FORBIDDEN: Self = Self(403);
    /// 404 Not Found
    pub const NOT_FOUND: Self = Self(404);
    /// 405 Method Not Allowed
    pub const METHOD_NOT_ALLOWED: Self = Self(405);
    /// 408 Request Timeout
    pub const REQUEST_TIMEOUT: Self = Self(408);
    /// 409 Conflict
    pub const CONFLICT: Self = Self(409);
    /// 410 Gone
    pub const GONE: Self = Self(410);
    /// 411 Length Required
    pub const LENGTH_REQUIRED: Self = Self(411);
    /// 412 Precondition Failed
    pub const PRECONDITION_FAILED: Self = Self(412);
    /// 429 Too Many Requests
    pub const TOO_MANY_REQUESTS: Self = Self(429);
    /// 500 Internal Server Error
    pub const INTERNAL_SERVER_ERROR: Self = Self(500);
    /// 502 Bad Gateway
    pub const BAD_GATEWAY: Self = Self(502);
    /// 503 Service Unavailable
    pub const SERVICE_UNAVAILABLE: Self = Self(503);
    /// 504 Gateway Timeout
    pub const GATEWAY_TIMEOUT: Self = Self(504);
    /// 505 HTTP Version Not Supported
    pub const HTTP_VERSION_NOT_SUPPORTED: Self = Self(505);

    /// Tries converting `&[u8]` to a `StatusCode`. Only three-digit codes
    /// are accepted.
    ///
    /// # Examples
    ///
    /// ```
    /// use opal_http::response::status::StatusCode;
    ///
    /// let status = StatusCode::from_bytes(b"200").unwrap();
    /// assert_eq!(status, StatusCode::OK);
    /// ```
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, HttpError> {
        if bytes.len() != 3 {
            return Err(ErrorKind::InvalidInput.into());
        }
        let mut code = 0u16;
        for b in bytes {
            if !b.is_ascii_digit() {
                return Err(ErrorKind::InvalidInput.into());
            }
            code = code * 10 + u16::from(b - b'0');
        }
        if code < 100 {
            return Err(ErrorKind::InvalidInput.into());
        }
        Ok(Self(code))
    }

    /// Returns the `u16` corresponding to this `StatusCode`.
    pub fn as_u16(&self) -> u16 {
        self.0
    }

    /// Returns the class of this code, e.g. `2` for all `2xx` codes.
    pub fn class(&self) -> u16 {
        self.0 / 100
    }

    /// Returns `true` for `1xx` interim responses, which precede the final
    /// response and are discarded by the codec.
    pub fn is_informational(&self) -> bool {
        self.class() == 1
    }

    /// Determines whether a response with this code carries a body.
    /// Interim responses, `204 No Content` and `304 Not Modified` do not.
    pub fn has_body(&self) -> bool {
        !self.is_informational() && self.0 != 204 && self.0 != 304
    }

    /// Returns `true` for the redirect codes this client follows
    /// automatically.
    pub fn is_redirect(&self) -> bool {
        matches!(self.0, 301 | 302 | 303 | 307)
    }

    /// Determines whether a response with this code is an error. If it is,
    /// the response body represents an error message.
    pub fn is_error(&self) -> bool {
        self.class() >= 4
    }

    /// Determines whether this code signals a client error. Client errors
    /// can be corrected by e.g. changing the request body or setting
    /// appropriate headers.
    pub fn is_client_error(&self) -> bool {
        self.class() == 4
    }

    /// Determines whether this code signals a server error. Server errors
    /// usually cannot be corrected by the client.
    pub fn is_server_error(&self) -> bool {
        self.class() == 5
    }

    /// Returns the standard reason phrase for this code, or `None` for
    /// codes this client does not enumerate.
    pub fn phrase(&self) -> Option<&'static str> {
        match self.0 {
            100 => Some("Continue"),
            101 => Some("Switching Protocols"),
            200 => Some("OK"),
            201 => Some("Created"),
            202 => Some("Accepted"),
            204 => Some("No Content"),
            205 => Some("Reset Content"),
            300 => Some("Multiple Choices"),
            301 => Some("Moved Permanently"),
            302 => Some("Found"),
            303 => Some("See Other"),
            304 => Some("Not Modified"),
            307 => Some("Temporary Redirect"),
            400 => Some("Bad Request"),
            401 => Some("Unauthorized"),
            403 => Some("Forbidden"),
            404 => Some("Not Found"),
            405 => Some("Method Not Allowed"),
            408 => Some("Request Timeout"),
            409 => Some("Conflict"),
            410 => Some("Gone"),
            411 => Some("Length Required"),
            412 => Some("Precondition Failed"),
            429 => Some("Too Many Requests"),
            500 => Some("Internal Server Error"),
            502 => Some("Bad Gateway"),
            503 => Some("Service Unavailable"),
            504 => Some("Gateway Timeout"),
            505 => Some("HTTP Version Not Supported"),
            _ => None,
        }
    }
}

impl<'a> TryFrom<&'a [u8]> for StatusCode {
    type Error = HttpError;

    fn try_from(bytes: &'a [u8]) -> Result<Self, Self::Error> {
        Self::from_bytes(bytes)
    }
}

#[cfg(test)]
mod ut_status {
    use super::StatusCode;

    /// UT test cases for `StatusCode::from_bytes`.
    ///
    /// # Brief
    /// 1. Parses valid and invalid status codes.
    /// 2. Checks the results.
    #[test]
    fn ut_status_code_from_bytes() {
        assert_eq!(StatusCode::from_bytes(b"200").unwrap(), StatusCode::OK);
        assert_eq!(StatusCode::from_bytes(b"304").unwrap().as_u16(), 304);
        assert!(StatusCode::from_bytes(b"20").is_err());
        assert!(StatusCode::from_bytes(b"2000").is_err());
        assert!(StatusCode::from_bytes(b"2x0").is_err());
        assert!(StatusCode::from_bytes(b"099").is_err());
    }

    /// UT test cases for `StatusCode::has_body`.
    ///
    /// # Brief
    /// 1. Checks codes with and without bodies.
    #[test]
    fn ut_status_code_has_body() {
        assert!(StatusCode::OK.has_body());
        assert!(StatusCode::NOT_FOUND.has_body());
        assert!(!StatusCode::CONTINUE.has_body());
        assert!(!StatusCode::NO_CONTENT.has_body());
        assert!(!StatusCode::NOT_MODIFIED.has_body());
    }

    /// UT test cases for class predicates of `StatusCode`.
    ///
    /// # Brief
    /// 1. Checks redirect, error and informational classification.
    #[test]
    fn ut_status_code_classes() {
        assert!(StatusCode::FOUND.is_redirect());
        assert!(StatusCode::TEMPORARY_REDIRECT.is_redirect());
        assert!(!StatusCode::NOT_MODIFIED.is_redirect());

        assert!(StatusCode::CONTINUE.is_informational());
        assert!(StatusCode::BAD_REQUEST.is_client_error());
        assert!(StatusCode::INTERNAL_SERVER_ERROR.is_server_error());
        assert!(StatusCode::BAD_REQUEST.is_error());
        assert!(!StatusCode::OK.is_error());
    }

    /// UT test cases for `StatusCode::phrase`.
    ///
    /// # Brief
    /// 1. Checks phrases of known and unknown codes.
    #[test]
    fn ut_status_code_phrase() {
        assert_eq!(StatusCode::OK.phrase(), Some("OK"));
        assert_eq!(StatusCode::NOT_MODIFIED.phrase(), Some("Not Modified"));
        assert_eq!(StatusCode::from_bytes(b"599").unwrap().phrase(), None);
    }
}
