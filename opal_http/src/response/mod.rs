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

//! HTTP [`Response`] components.
//!
//! This module provides [`StatusLine`], the parsed form of a response
//! status line. Body handling lives in the client crate, where the byte
//! channel is.
//!
//! [`Response`]: https://httpwg.org/specs/rfc9110.html#responses

pub mod status;

use core::fmt;

use crate::error::HttpError;
use crate::h1::H1Error;
use crate::response::status::StatusCode;

/// Data contained in the `Status-Line` of a response: the HTTP version,
/// the status code and the reason phrase.
///
/// The version is kept as the raw token the server sent, so that a
/// mismatch against the request version can be reported even for versions
/// this client does not model.
///
/// # Examples
///
/// ```
/// use opal_http::response::StatusLine;
///
/// let status = StatusLine::from_line("HTTP/1.1 200 OK").unwrap();
/// assert_eq!(status.version(), "HTTP/1.1");
/// assert_eq!(status.code().as_u16(), 200);
/// assert_eq!(status.phrase(), "OK");
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StatusLine {
    version: String,
    code: StatusCode,
    phrase: String,
}

impl StatusLine {
    /// Parses a `StatusLine` from one line of the response, with the line
    /// terminator already stripped.
    ///
    /// A missing reason phrase is tolerated and parses as an empty phrase;
    /// anything else malformed is an error.
    ///
    /// # Examples
    ///
    /// ```
    /// use opal_http::response::StatusLine;
    ///
    /// let status = StatusLine::from_line("HTTP/1.1 304").unwrap();
    /// assert_eq!(status.phrase(), "");
    ///
    /// assert!(StatusLine::from_line("garbage").is_err());
    /// ```
    pub fn from_line(line: &str) -> Result<StatusLine, HttpError> {
        let mut tokens = line.splitn(3, ' ');
        let version = tokens
            .next()
            .filter(|v| v.starts_with("HTTP/"))
            .ok_or(HttpError::from(H1Error::InvalidStatusLine))?;
        let code = tokens
            .next()
            .ok_or(HttpError::from(H1Error::InvalidStatusLine))?;
        let code = StatusCode::from_bytes(code.as_bytes())
            .map_err(|_| HttpError::from(H1Error::InvalidStatusLine))?;
        let phrase = tokens.next().unwrap_or("");
        Ok(StatusLine {
            version: version.to_string(),
            code,
            phrase: phrase.to_string(),
        })
    }

    /// Creates a `StatusLine` from its parts.
    pub fn from_raw_parts(version: String, code: StatusCode, phrase: String) -> StatusLine {
        StatusLine {
            version,
            code,
            phrase,
        }
    }

    /// Gets the raw HTTP version token of this status line.
    pub fn version(&self) -> &str {
        self.version.as_str()
    }

    /// Gets the status code.
    pub fn code(&self) -> StatusCode {
        self.code
    }

    /// Gets the reason phrase, which may be empty.
    pub fn phrase(&self) -> &str {
        self.phrase.as_str()
    }
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.version, self.code.as_u16(), self.phrase)
    }
}
