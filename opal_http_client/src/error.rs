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

//! Definition of `HttpClientError` which includes errors that may occur in
//! this crate.

use core::fmt::{Debug, Display, Formatter};
use std::{error, io};

/// The structure encapsulates errors that can be encountered when working
/// with the HTTP client.
///
/// # Examples
///
/// ```
/// use opal_http_client::{ErrorKind, HttpClientError};
///
/// let error = HttpClientError::from_str(ErrorKind::Timeout, "pool exhausted");
/// assert_eq!(error.error_kind(), ErrorKind::Timeout);
/// ```
pub struct HttpClientError {
    kind: ErrorKind,
    cause: Cause,
}

impl HttpClientError {
    /// Creates an error carrying a static message.
    pub fn from_str(kind: ErrorKind, msg: &'static str) -> Self {
        Self {
            kind,
            cause: Cause::Msg(msg),
        }
    }

    /// Creates an error from an underlying `io::Error`.
    pub fn from_io_error(kind: ErrorKind, err: io::Error) -> Self {
        Self {
            kind,
            cause: Cause::Io(err),
        }
    }

    /// Creates an error from any other underlying error.
    pub fn from_error<T>(kind: ErrorKind, err: T) -> Self
    where
        T: Into<Box<dyn error::Error + Send + Sync>>,
    {
        Self {
            kind,
            cause: Cause::Other(err.into()),
        }
    }

    /// Gets the `ErrorKind` of this `HttpClientError`.
    ///
    /// # Examples
    ///
    /// ```
    /// use opal_http_client::{ErrorKind, HttpClientError};
    ///
    /// let error = HttpClientError::from_str(ErrorKind::InvalidRequest, "no body");
    /// assert_eq!(error.error_kind(), ErrorKind::InvalidRequest);
    /// ```
    pub fn error_kind(&self) -> ErrorKind {
        self.kind
    }

    /// Gets the `io::Error` if this `HttpClientError` comes from one.
    ///
    /// Returns `None` otherwise.
    pub fn io_error(&self) -> Option<&io::Error> {
        match self.cause {
            Cause::Io(ref io) => Some(io),
            _ => None,
        }
    }
}

impl Debug for HttpClientError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        let mut builder = f.debug_struct("HttpClientError");
        builder.field("ErrorKind", &self.kind);
        builder.field("Cause", &self.cause);
        builder.finish()
    }
}

impl Display for HttpClientError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.kind.as_str())?;
        write!(f, ": {}", self.cause)?;
        Ok(())
    }
}

impl error::Error for HttpClientError {}

/// Error kinds which indicate the type of an `HttpClientError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Non-positive pool capacity, zero or negative duration.
    InvalidConfig,

    /// A header rejected by the active header policy.
    InvalidHeader,

    /// Both body sources set, a missing body file, missing
    /// `Content-Length`/`Content-Type` when required, or a terminal
    /// operation used in an illegal state.
    InvalidRequest,

    /// Malformed status line, ill-framed chunk, HTTP version mismatch in
    /// strict mode, or a redirect/repeat loop beyond its cap.
    InvalidResponse,

    /// Pool acquisition exceeded its waiting budget.
    Timeout,

    /// Underlying socket failure, including TLS failures.
    Io,
}

impl ErrorKind {
    /// Gets the string info of this `ErrorKind`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use opal_http_client::ErrorKind;
    ///
    /// assert_eq!(ErrorKind::Timeout.as_str(), "Timeout Error");
    /// ```
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidConfig => "Invalid Config Error",
            Self::InvalidHeader => "Invalid Header Error",
            Self::InvalidRequest => "Invalid Request Error",
            Self::InvalidResponse => "Invalid Response Error",
            Self::Timeout => "Timeout Error",
            Self::Io => "I/O Error",
        }
    }
}

pub(crate) enum Cause {
    Io(io::Error),
    Msg(&'static str),
    Other(Box<dyn error::Error + Send + Sync>),
}

impl Debug for Cause {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => Debug::fmt(err, f),
            Self::Msg(msg) => write!(f, "{}", msg),
            Self::Other(err) => Debug::fmt(err, f),
        }
    }
}

impl Display for Cause {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => Display::fmt(err, f),
            Self::Msg(msg) => write!(f, "{}", msg),
            Self::Other(err) => Display::fmt(err, f),
        }
    }
}

macro_rules! err_from_other {
    ($kind: ident, $err: expr) => {{
        use crate::error::{ErrorKind, HttpClientError};

        Err(HttpClientError::from_error(ErrorKind::$kind, $err))
    }};
}

macro_rules! err_from_io {
    ($kind: ident, $err: expr) => {{
        use crate::error::{ErrorKind, HttpClientError};

        Err(HttpClientError::from_io_error(ErrorKind::$kind, $err))
    }};
}

macro_rules! err_from_msg {
    ($kind: ident, $msg: literal) => {{
        use crate::error::{ErrorKind, HttpClientError};

        Err(HttpClientError::from_str(ErrorKind::$kind, $msg))
    }};
}

#[cfg(test)]
mod ut_util_error {
    use std::io;

    use crate::{ErrorKind, HttpClientError};

    /// UT test cases for `ErrorKind::as_str`.
    ///
    /// # Brief
    /// 1. Transfers each `ErrorKind` to a str by calling
    ///    `ErrorKind::as_str`.
    /// 2. Checks if the results are correct.
    #[test]
    fn ut_err_as_str() {
        assert_eq!(ErrorKind::InvalidConfig.as_str(), "Invalid Config Error");
        assert_eq!(ErrorKind::InvalidHeader.as_str(), "Invalid Header Error");
        assert_eq!(ErrorKind::InvalidRequest.as_str(), "Invalid Request Error");
        assert_eq!(
            ErrorKind::InvalidResponse.as_str(),
            "Invalid Response Error"
        );
        assert_eq!(ErrorKind::Timeout.as_str(), "Timeout Error");
        assert_eq!(ErrorKind::Io.as_str(), "I/O Error");
    }

    /// UT test cases for `HttpClientError::from_io_error`.
    ///
    /// # Brief
    /// 1. Calls `HttpClientError::from_io_error`.
    /// 2. Checks if the results are correct.
    #[test]
    fn ut_err_from_io_error() {
        let error = HttpClientError::from_io_error(
            ErrorKind::Io,
            io::Error::from(io::ErrorKind::BrokenPipe),
        );
        assert_eq!(error.error_kind(), ErrorKind::Io);
        assert!(error.io_error().is_some());

        let error = HttpClientError::from_str(ErrorKind::Io, "error");
        assert!(error.io_error().is_none());
    }

    /// UT test cases for `HttpClientError::from_error`.
    ///
    /// # Brief
    /// 1. Calls `HttpClientError::from_error`.
    /// 2. Checks if the results are correct.
    #[test]
    fn ut_err_from_error() {
        let error = HttpClientError::from_error(
            ErrorKind::InvalidResponse,
            HttpClientError::from_str(ErrorKind::Io, "inner"),
        );
        assert_eq!(error.error_kind(), ErrorKind::InvalidResponse);
    }

    /// UT test cases for `Debug` and `Display` of `HttpClientError`.
    ///
    /// # Brief
    /// 1. Formats errors of each cause.
    /// 2. Checks if the results are correct.
    #[test]
    fn ut_err_fmt() {
        let error = HttpClientError::from_str(ErrorKind::Timeout, "error");
        assert_eq!(
            format!("{:?}", error),
            "HttpClientError { ErrorKind: Timeout, Cause: error }"
        );
        assert_eq!(format!("{error}"), "Timeout Error: error");

        let error = HttpClientError::from_io_error(
            ErrorKind::Io,
            io::Error::from(io::ErrorKind::BrokenPipe),
        );
        assert_eq!(format!("{}", error), "I/O Error: broken pipe");
    }
}
