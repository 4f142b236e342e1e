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

//! [`URI`] implementation for requests and redirect targets.
//!
//! A URI names the target resource of a request. Besides absolute URIs,
//! this module admits the reference forms a `Location` header may carry
//! (scheme-relative, absolute-path and relative references) and resolves
//! them against a base URI per [`RFC3986 5`].
//!
//! [`URI`]: https://httpwg.org/specs/rfc9110.html#uri
//! [`RFC3986 5`]: https://www.rfc-editor.org/rfc/rfc3986#section-5

use core::convert::TryFrom;
use core::fmt;

use crate::error::HttpError;

/// URI scheme. Only `http` and `https` are meaningful to this client.
///
/// # Examples
///
/// ```
/// use opal_http::request::uri::Scheme;
///
/// assert_eq!(Scheme::HTTP.default_port(), 80);
/// assert_eq!(Scheme::HTTPS.default_port(), 443);
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum Scheme {
    /// `http` scheme.
    HTTP,
    /// `https` scheme.
    HTTPS,
}

impl Scheme {
    /// Returns a `&str` representation of the scheme.
    pub fn as_str(&self) -> &str {
        match self {
            Scheme::HTTP => "http",
            Scheme::HTTPS => "https",
        }
    }

    /// Returns the default port of the scheme, used when the authority
    /// carries no explicit port.
    pub fn default_port(&self) -> u16 {
        match self {
            Scheme::HTTP => 80,
            Scheme::HTTPS => 443,
        }
    }
}

/// Authority component: host and optional port.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Authority {
    host: String,
    port: Option<u16>,
}

impl Authority {
    /// Returns the host part.
    pub fn host(&self) -> &str {
        self.host.as_str()
    }

    /// Returns the explicit port, if one was given.
    pub fn port(&self) -> Option<u16> {
        self.port
    }

    fn from_str(s: &str) -> Result<Authority, InvalidUri> {
        if s.is_empty() {
            return Err(InvalidUri::MissingHost);
        }
        let (host, port) = match s.rsplit_once(':') {
            Some((host, port)) => {
                let port = port.parse::<u16>().map_err(|_| InvalidUri::InvalidPort)?;
                (host, Some(port))
            }
            None => (s, None),
        };
        if host.is_empty() {
            return Err(InvalidUri::MissingHost);
        }
        if !host
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'.' || b == b'_')
        {
            return Err(InvalidUri::InvalidAuthority);
        }
        Ok(Authority {
            host: host.to_string(),
            port,
        })
    }
}

impl fmt::Display for Authority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.port {
            Some(port) => write!(f, "{}:{}", self.host, port),
            None => f.write_str(self.host.as_str()),
        }
    }
}

/// HTTP URI, either absolute or one of the reference forms.
///
/// # Examples
///
/// ```
/// use opal_http::request::uri::Uri;
///
/// let uri = Uri::from_bytes(b"http://example.org:8080/path?a=1").unwrap();
/// assert_eq!(uri.host().unwrap(), "example.org");
/// assert_eq!(uri.port_or_default(), Some(8080));
/// assert_eq!(uri.path_and_query(), "/path?a=1");
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Uri {
    scheme: Option<Scheme>,
    authority: Option<Authority>,
    path: Option<String>,
    query: Option<String>,
}

impl Uri {
    /// Parses a `Uri` from bytes.
    ///
    /// Absolute URIs (`http://h/p`), scheme-relative references (`//h/p`),
    /// absolute-path references (`/p`) and relative references (`p`) are
    /// accepted. Schemes other than `http` and `https` are rejected.
    ///
    /// # Examples
    ///
    /// ```
    /// use opal_http::request::uri::Uri;
    ///
    /// let uri = Uri::from_bytes(b"https://example.org").unwrap();
    /// assert!(uri.path().is_none());
    ///
    /// assert!(Uri::from_bytes(b"ftp://example.org").is_err());
    /// ```
    pub fn from_bytes(bytes: &[u8]) -> Result<Uri, HttpError> {
        let s = core::str::from_utf8(bytes).map_err(|_| InvalidUri::InvalidFormat)?;
        if s.is_empty() || s.bytes().any(|b| b <= 0x20 || b == 0x7f) {
            return Err(InvalidUri::InvalidFormat.into());
        }

        if let Some(rest) = s.strip_prefix("http://") {
            return Self::with_authority(Some(Scheme::HTTP), rest);
        }
        if let Some(rest) = s.strip_prefix("https://") {
            return Self::with_authority(Some(Scheme::HTTPS), rest);
        }
        if let Some(rest) = s.strip_prefix("//") {
            return Self::with_authority(None, rest);
        }
        if s.contains("://") {
            return Err(InvalidUri::InvalidScheme.into());
        }

        let (path, query) = split_query(s);
        Ok(Uri {
            scheme: None,
            authority: None,
            path: (!path.is_empty()).then(|| path.to_string()),
            query: query.map(str::to_string),
        })
    }

    fn with_authority(scheme: Option<Scheme>, rest: &str) -> Result<Uri, HttpError> {
        let end = rest
            .find(|c| c == '/' || c == '?')
            .unwrap_or(rest.len());
        let authority = Authority::from_str(&rest[..end])?;
        let (path, query) = split_query(&rest[end..]);
        Ok(Uri {
            scheme,
            authority: Some(authority),
            path: (!path.is_empty()).then(|| path.to_string()),
            query: query.map(str::to_string),
        })
    }

    /// Creates a `Uri` from its parts without re-parsing.
    pub fn from_raw_parts(
        scheme: Option<Scheme>,
        authority: Option<Authority>,
        path: Option<String>,
        query: Option<String>,
    ) -> Uri {
        Uri {
            scheme,
            authority,
            path,
            query,
        }
    }

    /// Consumes this `Uri` and gets its parts.
    pub fn into_parts(
        self,
    ) -> (
        Option<Scheme>,
        Option<Authority>,
        Option<String>,
        Option<String>,
    ) {
        (self.scheme, self.authority, self.path, self.query)
    }

    /// Gets the `Scheme` component.
    pub fn scheme(&self) -> Option<&Scheme> {
        self.scheme.as_ref()
    }

    /// Gets the `Authority` component.
    pub fn authority(&self) -> Option<&Authority> {
        self.authority.as_ref()
    }

    /// Gets the host part of the authority.
    pub fn host(&self) -> Option<&str> {
        self.authority.as_ref().map(|a| a.host())
    }

    /// Gets the explicit port, or the scheme default when absent. Returns
    /// `None` when the URI has neither a port nor a scheme.
    pub fn port_or_default(&self) -> Option<u16> {
        self.authority
            .as_ref()
            .and_then(|a| a.port())
            .or_else(|| self.scheme.as_ref().map(|s| s.default_port()))
    }

    /// Gets the path component.
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Gets the query component.
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Returns the request target as it appears on the request line: path
    /// (`/` when absent) plus the query, if any.
    ///
    /// # Examples
    ///
    /// ```
    /// use opal_http::request::uri::Uri;
    ///
    /// let uri = Uri::from_bytes(b"http://example.org").unwrap();
    /// assert_eq!(uri.path_and_query(), "/");
    /// ```
    pub fn path_and_query(&self) -> String {
        let mut target = self.path.clone().unwrap_or_else(|| String::from("/"));
        if let Some(query) = &self.query {
            target.push('?');
            target.push_str(query);
        }
        target
    }

    /// Resolves a reference against this base URI, per [`RFC3986 5.2`].
    ///
    /// The base must be absolute. The reference may be absolute, scheme-
    /// relative, absolute-path or relative; dot segments are removed and
    /// relative paths are merged onto the base path.
    ///
    /// [`RFC3986 5.2`]: https://www.rfc-editor.org/rfc/rfc3986#section-5.2
    ///
    /// # Examples
    ///
    /// ```
    /// use opal_http::request::uri::Uri;
    ///
    /// let base = Uri::from_bytes(b"http://example.org/a/b?q=1").unwrap();
    ///
    /// let abs = base.resolve(&Uri::from_bytes(b"/c").unwrap());
    /// assert_eq!(abs.to_string(), "http://example.org/c");
    ///
    /// let rel = base.resolve(&Uri::from_bytes(b"../x").unwrap());
    /// assert_eq!(rel.to_string(), "http://example.org/x");
    /// ```
    pub fn resolve(&self, reference: &Uri) -> Uri {
        if reference.scheme.is_some() {
            return Uri {
                scheme: reference.scheme.clone(),
                authority: reference.authority.clone(),
                path: reference
                    .path
                    .as_deref()
                    .map(remove_dot_segments),
                query: reference.query.clone(),
            };
        }
        if reference.authority.is_some() {
            return Uri {
                scheme: self.scheme.clone(),
                authority: reference.authority.clone(),
                path: reference
                    .path
                    .as_deref()
                    .map(remove_dot_segments),
                query: reference.query.clone(),
            };
        }
        match reference.path.as_deref() {
            None | Some("") => Uri {
                scheme: self.scheme.clone(),
                authority: self.authority.clone(),
                path: self.path.clone(),
                query: reference.query.clone().or_else(|| self.query.clone()),
            },
            Some(path) if path.starts_with('/') => Uri {
                scheme: self.scheme.clone(),
                authority: self.authority.clone(),
                path: Some(remove_dot_segments(path)),
                query: reference.query.clone(),
            },
            Some(path) => {
                let merged = merge_paths(self, path);
                Uri {
                    scheme: self.scheme.clone(),
                    authority: self.authority.clone(),
                    path: Some(remove_dot_segments(&merged)),
                    query: reference.query.clone(),
                }
            }
        }
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(scheme) = &self.scheme {
            write!(f, "{}:", scheme.as_str())?;
        }
        if let Some(authority) = &self.authority {
            write!(f, "//{authority}")?;
        }
        if let Some(path) = &self.path {
            f.write_str(path)?;
        } else if self.authority.is_some() {
            f.write_str("/")?;
        }
        if let Some(query) = &self.query {
            write!(f, "?{query}")?;
        }
        Ok(())
    }
}

impl TryFrom<&[u8]> for Uri {
    type Error = HttpError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Self::from_bytes(bytes)
    }
}

impl TryFrom<&str> for Uri {
    type Error = HttpError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::from_bytes(s.as_bytes())
    }
}

// RFC3986 5.3 merge: a reference path is appended to all but the last
// segment of the base path.
fn merge_paths(base: &Uri, reference: &str) -> String {
    match base.path.as_deref() {
        None | Some("") => {
            if base.authority.is_some() {
                format!("/{reference}")
            } else {
                reference.to_string()
            }
        }
        Some(path) => match path.rfind('/') {
            Some(idx) => format!("{}{}", &path[..=idx], reference),
            None => reference.to_string(),
        },
    }
}

// RFC3986 5.2.4 remove_dot_segments.
fn remove_dot_segments(path: &str) -> String {
    let mut output: Vec<&str> = Vec::new();
    let absolute = path.starts_with('/');
    let trailing_slash = path.ends_with('/') || path.ends_with("/.") || path.ends_with("/..");
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                output.pop();
            }
            other => output.push(other),
        }
    }
    let mut result = String::new();
    if absolute {
        result.push('/');
    }
    result.push_str(&output.join("/"));
    if trailing_slash && !result.ends_with('/') {
        result.push('/');
    }
    result
}

/// Errors that may occur while parsing a URI.
#[derive(Debug, Eq, PartialEq)]
pub enum InvalidUri {
    /// The scheme is neither `http` nor `https`.
    InvalidScheme,
    /// The authority contains illegal characters.
    InvalidAuthority,
    /// The port is not a valid `u16`.
    InvalidPort,
    /// The host part is empty.
    MissingHost,
    /// The input is empty or contains illegal characters.
    InvalidFormat,
}

impl fmt::Display for InvalidUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl std::error::Error for InvalidUri {}

fn split_query(s: &str) -> (&str, Option<&str>) {
    match s.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (s, None),
    }
}
