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

//! HTTP [`Header`][header], which is called `Field` in [`RFC9110`].
//!
//! The module provides [`HeaderName`], [`HeaderValue`], [`Headers`] and the
//! known-header registry used by request validation.
//!
//! [header]: https://httpwg.org/specs/rfc9110.html#fields
//! [`RFC9110`]: https://httpwg.org/specs/rfc9110.html
//!
//! # Examples
//!
//! ```
//! use opal_http::headers::Headers;
//!
//! let mut headers = Headers::new();
//! headers.insert("Accept", "text/html").unwrap();
//! headers.insert("Content-Length", "3495").unwrap();
//!
//! assert_eq!(
//!     headers.get("accept").unwrap().to_string().unwrap(),
//!     "text/html"
//! );
//! assert_eq!(
//!     headers.get("content-length").unwrap().to_string().unwrap(),
//!     "3495"
//! );
//! ```

use core::convert::TryFrom;
use core::{fmt, slice};
use std::collections::hash_map::Entry;
use std::collections::{hash_map, HashMap};

use crate::error::{ErrorKind, HttpError};

/// HTTP `Header Name`, which is called [`Field Name`] in RFC9110.
///
/// Since header names are case-insensitive, characters of the input are
/// checked against the field-name grammar and converted to lowercase.
///
/// [`Field Name`]: https://httpwg.org/specs/rfc9110.html#fields.names
///
/// # Examples
///
/// ```
/// use opal_http::headers::HeaderName;
///
/// let name = HeaderName::from_bytes(b"Example-Field").unwrap();
/// assert_eq!(name.as_bytes(), b"example-field");
/// ```
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct HeaderName {
    name: String,
}

/// Classification of a header name against the known-header registry.
///
/// # Examples
///
/// ```
/// use opal_http::headers::{HeaderName, HeaderStatus};
///
/// let name = HeaderName::from_bytes(b"Content-MD5").unwrap();
/// assert_eq!(name.status(), HeaderStatus::Obsolete);
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum HeaderStatus {
    /// A permanent addition to the standard.
    Permanent,
    /// Used to be standard, now it is not.
    Obsolete,
    /// Frequently used, but not part of the standard.
    Nonstandard,
    /// Unrecognized header.
    Unknown,
}

impl HeaderName {
    /// Converts a slice of bytes to a `HeaderName`.
    ///
    /// # Examples
    ///
    /// ```
    /// use opal_http::headers::HeaderName;
    ///
    /// let name = HeaderName::from_bytes(b"Example-Field").unwrap();
    /// ```
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, HttpError> {
        Ok(Self {
            name: Self::normalize(bytes)?,
        })
    }

    /// Returns a bytes representation of the `HeaderName`.
    ///
    /// # Examples
    ///
    /// ```
    /// use opal_http::headers::HeaderName;
    ///
    /// let name = HeaderName::from_bytes(b"Example-Field").unwrap();
    /// assert_eq!(name.as_bytes(), b"example-field");
    /// ```
    pub fn as_bytes(&self) -> &[u8] {
        self.name.as_bytes()
    }

    /// Returns a `&str` representation of the `HeaderName`.
    pub fn as_str(&self) -> &str {
        self.name.as_str()
    }

    /// Classifies this name against the known-header registry.
    ///
    /// # Examples
    ///
    /// ```
    /// use opal_http::headers::{HeaderName, HeaderStatus};
    ///
    /// let name = HeaderName::from_bytes(b"Accept").unwrap();
    /// assert_eq!(name.status(), HeaderStatus::Permanent);
    ///
    /// let name = HeaderName::from_bytes(b"X-Grille").unwrap();
    /// assert_eq!(name.status(), HeaderStatus::Unknown);
    /// ```
    pub fn status(&self) -> HeaderStatus {
        registry_status(self.name.as_str())
    }

    /// Normalizes the input bytes.
    fn normalize(input: &[u8]) -> Result<String, HttpError> {
        let mut dst = Vec::new();
        for b in input.iter() {
            // HEADER_CHARS maps all bytes to valid single-byte UTF-8.
            let b = HEADER_CHARS[*b as usize];
            if b == 0 {
                return Err(ErrorKind::InvalidInput.into());
            }
            dst.push(b);
        }
        if dst.is_empty() {
            return Err(ErrorKind::InvalidInput.into());
        }
        Ok(unsafe { String::from_utf8_unchecked(dst) })
    }
}

impl fmt::Display for HeaderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name.as_str())
    }
}

impl TryFrom<&str> for HeaderName {
    type Error = HttpError;

    fn try_from(name: &str) -> Result<Self, Self::Error> {
        Self::from_bytes(name.as_bytes())
    }
}

impl TryFrom<&[u8]> for HeaderName {
    type Error = HttpError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Self::from_bytes(bytes)
    }
}

/// HTTP `Header Value`, which is called [`Field Value`] in RFC9110.
///
/// A value may carry several comma-joined elements when the same field is
/// repeated.
///
/// [`Field Value`]: https://httpwg.org/specs/rfc9110.html#fields.values
///
/// # Examples
///
/// ```
/// use opal_http::headers::HeaderValue;
///
/// let mut value = HeaderValue::from_bytes(b"text/html").unwrap();
/// value.append_bytes(b"application/xml").unwrap();
///
/// assert_eq!(value.to_string().unwrap(), "text/html, application/xml");
/// ```
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct HeaderValue {
    inner: Vec<Vec<u8>>,
}

impl HeaderValue {
    /// Attempts to convert a byte slice to a `HeaderValue`.
    ///
    /// `HeaderValue` is case-sensitive. Legal characters remain unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use opal_http::headers::HeaderValue;
    ///
    /// let value = HeaderValue::from_bytes(b"text/html").unwrap();
    /// assert_eq!(value.to_string().unwrap(), "text/html");
    /// ```
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, HttpError> {
        if !bytes.iter().all(|b| Self::is_valid(*b)) {
            return Err(ErrorKind::InvalidInput.into());
        }

        Ok(HeaderValue {
            inner: vec![bytes.to_vec()],
        })
    }

    /// Consumes another `HeaderValue`, and then appends it to this
    /// `HeaderValue`.
    pub fn append(&mut self, mut other: Self) {
        self.inner.append(&mut other.inner)
    }

    /// Appends new bytes to this `HeaderValue`.
    ///
    /// # Examples
    ///
    /// ```
    /// use opal_http::headers::HeaderValue;
    ///
    /// let mut value = HeaderValue::from_bytes(b"text/html").unwrap();
    /// value.append_bytes(b"application/xml").unwrap();
    ///
    /// assert_eq!(value.to_string().unwrap(), "text/html, application/xml");
    /// ```
    pub fn append_bytes(&mut self, bytes: &[u8]) -> Result<(), HttpError> {
        if !bytes.iter().all(|b| Self::is_valid(*b)) {
            return Err(ErrorKind::InvalidInput.into());
        }
        self.inner.push(bytes.to_vec());
        Ok(())
    }

    /// Outputs the content of the value as a string. Extra comma and
    /// whitespace (`", "`) is added between the elements of the value.
    ///
    /// Returns `Err` if the value contains bytes that do not form UTF-8.
    pub fn to_string(&self) -> Result<String, HttpError> {
        String::from_utf8(self.to_vec()).map_err(|_| ErrorKind::InvalidInput.into())
    }

    /// Outputs the content of the value as a `Vec<u8>`, comma-joined.
    pub fn to_vec(&self) -> Vec<u8> {
        let mut content = Vec::new();
        for (n, i) in self.inner.iter().enumerate() {
            if n != 0 {
                content.extend_from_slice(b", ");
            }
            content.extend_from_slice(i.as_slice());
        }
        content
    }

    /// Returns an iterator over the elements of the `HeaderValue`.
    pub fn iter(&self) -> HeaderValueIter<'_> {
        self.inner.iter()
    }

    /// Returns `true` if the character matches the rules of `HeaderValue`.
    fn is_valid(b: u8) -> bool {
        b >= 32 && b != 127 || b == b'\t'
    }
}

impl TryFrom<&str> for HeaderValue {
    type Error = HttpError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::from_bytes(value.as_bytes())
    }
}

impl TryFrom<&[u8]> for HeaderValue {
    type Error = HttpError;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        Self::from_bytes(value)
    }
}

/// Immutable `HeaderValue` iterator.
///
/// This struct is created by [`HeaderValue::iter`].
///
/// [`HeaderValue::iter`]: HeaderValue::iter
pub type HeaderValueIter<'a> = slice::Iter<'a, Vec<u8>>;

/// HTTP `Headers`, which is called [`Fields`] in RFC9110.
///
/// [`Fields`]: https://httpwg.org/specs/rfc9110.html#fields
///
/// # Examples
///
/// ```
/// use opal_http::headers::Headers;
///
/// let mut headers = Headers::new();
/// headers.insert("Accept", "text/html").unwrap();
/// headers.append("Accept", "text/plain").unwrap();
///
/// assert_eq!(
///     headers.get("ACCEPT").unwrap().to_string().unwrap(),
///     "text/html, text/plain"
/// );
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Headers {
    map: HashMap<HeaderName, HeaderValue>,
}

impl fmt::Display for Headers {
    /// Formats headers the way they appear on the wire, one
    /// `name: value\r\n` line per entry.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (k, v) in self.iter() {
            write!(
                f,
                "{}: {}\r\n",
                k,
                v.to_string()
                    .unwrap_or_else(|_| "<non-visible header value>".to_string())
            )?;
        }
        Ok(())
    }
}

impl Headers {
    /// Creates a new, empty `Headers`.
    ///
    /// # Examples
    ///
    /// ```
    /// use opal_http::headers::Headers;
    ///
    /// let headers = Headers::new();
    /// assert!(headers.is_empty());
    /// ```
    pub fn new() -> Self {
        Headers {
            map: HashMap::new(),
        }
    }

    /// Returns the number of headers in the `Headers`.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if the `Headers` contains no headers.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns an immutable reference to the `HeaderValue` corresponding to
    /// the `HeaderName`.
    ///
    /// This method returns `None` if the input argument could not be
    /// converted to a `HeaderName` or the `HeaderName` is not present.
    ///
    /// # Examples
    ///
    /// ```
    /// use opal_http::headers::Headers;
    ///
    /// let mut headers = Headers::new();
    /// headers.append("accept", "text/html").unwrap();
    ///
    /// let value = headers.get("accept");
    /// assert_eq!(value.unwrap().to_string().unwrap(), "text/html");
    /// ```
    pub fn get<T>(&self, name: T) -> Option<&HeaderValue>
    where
        HeaderName: TryFrom<T>,
    {
        HeaderName::try_from(name)
            .ok()
            .and_then(|name| self.map.get(&name))
    }

    /// Returns the value as a `String`, or `None` when the header is absent
    /// or not valid UTF-8. Convenience over [`Headers::get`].
    pub fn get_string<T>(&self, name: T) -> Option<String>
    where
        HeaderName: TryFrom<T>,
    {
        self.get(name).and_then(|v| v.to_string().ok())
    }

    /// Returns `true` if the header is present.
    pub fn contains<T>(&self, name: T) -> bool
    where
        HeaderName: TryFrom<T>,
    {
        self.get(name).is_some()
    }

    /// Inserts a header into the `Headers`, replacing any previous value.
    ///
    /// If the input arguments could not be converted, `Err` is returned.
    /// Otherwise the old `HeaderValue` is returned if one was present.
    ///
    /// # Examples
    ///
    /// ```
    /// use opal_http::headers::Headers;
    ///
    /// let mut headers = Headers::new();
    /// assert!(headers.insert("\0", "illegal header").is_err());
    ///
    /// assert_eq!(headers.insert("accept", "text/html"), Ok(None));
    ///
    /// let old_value = headers.insert("accept", "text/plain").unwrap();
    /// assert_eq!(old_value.unwrap().to_string().unwrap(), "text/html");
    /// ```
    pub fn insert<N, V>(&mut self, name: N, value: V) -> Result<Option<HeaderValue>, HttpError>
    where
        HeaderName: TryFrom<N>,
        <HeaderName as TryFrom<N>>::Error: Into<HttpError>,
        HeaderValue: TryFrom<V>,
        <HeaderValue as TryFrom<V>>::Error: Into<HttpError>,
    {
        let name = HeaderName::try_from(name).map_err(Into::into)?;
        let value = HeaderValue::try_from(value).map_err(Into::into)?;
        Ok(self.map.insert(name, value))
    }

    /// Appends a header to the `Headers`. If the `HeaderName` is already
    /// present, the new `HeaderValue` is appended to the old one.
    ///
    /// # Examples
    ///
    /// ```
    /// use opal_http::headers::Headers;
    ///
    /// let mut headers = Headers::new();
    /// headers.append("accept", "text/html").unwrap();
    /// headers.append("accept", "text/plain").unwrap();
    ///
    /// let value = headers.get("accept");
    /// assert_eq!(value.unwrap().to_string().unwrap(), "text/html, text/plain");
    /// ```
    pub fn append<N, V>(&mut self, name: N, value: V) -> Result<(), HttpError>
    where
        HeaderName: TryFrom<N>,
        <HeaderName as TryFrom<N>>::Error: Into<HttpError>,
        HeaderValue: TryFrom<V>,
        <HeaderValue as TryFrom<V>>::Error: Into<HttpError>,
    {
        let name = HeaderName::try_from(name).map_err(Into::into)?;
        let value = HeaderValue::try_from(value).map_err(Into::into)?;

        match self.map.entry(name) {
            Entry::Occupied(o) => {
                o.into_mut().append(value);
            }
            Entry::Vacant(v) => {
                let _ = v.insert(value);
            }
        };
        Ok(())
    }

    /// Inserts a header from a raw `name: value` line, replacing any
    /// previous value.
    ///
    /// # Examples
    ///
    /// ```
    /// use opal_http::headers::Headers;
    ///
    /// let mut headers = Headers::new();
    /// headers.insert_line("Content-Length: 42").unwrap();
    /// assert_eq!(
    ///     headers.get("content-length").unwrap().to_string().unwrap(),
    ///     "42"
    /// );
    /// ```
    pub fn insert_line(&mut self, line: &str) -> Result<(), HttpError> {
        let (name, value) = line
            .split_once(':')
            .ok_or(HttpError::from(ErrorKind::InvalidInput))?;
        self.insert(name.trim(), value.trim())?;
        Ok(())
    }

    /// Removes a header from `Headers` by `HeaderName`, returning the
    /// `HeaderValue` if the `HeaderName` was previously present.
    pub fn remove<T>(&mut self, name: T) -> Option<HeaderValue>
    where
        HeaderName: TryFrom<T>,
    {
        HeaderName::try_from(name)
            .ok()
            .and_then(|name| self.map.remove(&name))
    }

    /// Returns an iterator over the `Headers`. The iterator element type is
    /// `(&'a HeaderName, &'a HeaderValue)`.
    pub fn iter(&self) -> HeadersIter<'_> {
        self.map.iter()
    }
}

impl IntoIterator for Headers {
    type Item = (HeaderName, HeaderValue);
    type IntoIter = HeadersIntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.map.into_iter()
    }
}

impl<'a> IntoIterator for &'a Headers {
    type Item = (&'a HeaderName, &'a HeaderValue);
    type IntoIter = HeadersIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Immutable `Headers` iterator.
///
/// This struct is created by [`Headers::iter`].
///
/// [`Headers::iter`]: Headers::iter
pub type HeadersIter<'a> = hash_map::Iter<'a, HeaderName, HeaderValue>;

/// An owning iterator over the entries of a `Headers`.
///
/// This struct is created by [`Headers::into_iter`].
///
/// [`Headers::into_iter`]: crate::headers::Headers::into_iter
pub type HeadersIntoIter = hash_map::IntoIter<HeaderName, HeaderValue>;

// Registry of known header names. The table mixes request and response
// headers since several "response" fields work in requests in the wild.
fn registry_status(name: &str) -> HeaderStatus {
    use HeaderStatus::*;
    match name {
        "a-im" | "accept" | "accept-charset" | "accept-datetime" | "accept-encoding"
        | "accept-language" | "access-control-request-method" | "access-control-request-headers"
        | "authorization" | "cache-control" | "connection" | "content-length" | "content-type"
        | "cookie" | "date" | "expect" | "forwarded" | "from" | "host" | "http2-settings"
        | "if-match" | "if-modified-since" | "if-none-match" | "if-range"
        | "if-unmodified-since" | "max-forwards" | "origin" | "pragma" | "proxy-authorization"
        | "range" | "referer" | "te" | "user-agent" | "upgrade" | "via" | "warning" => Permanent,
        "content-md5" => Obsolete,
        "upgrade-insecure-requests" | "x-requested-with" | "dnt" | "x-forwarded-for"
        | "x-forwarded-host" | "x-forwarded-proto" | "front-end-ttps" | "x-http-method-override"
        | "x-att-deviceid" | "x-wap-profile" | "proxy-connection" | "x-uidh" | "x-csrf-token"
        | "x-request-id" | "x-correlation-id" | "save-data" | "transfer-encoding"
        | "content-encoding" => Nonstandard,
        _ => Unknown,
    }
}

// HEADER_CHARS is used to check whether a char is correct and transfer it to
// lowercase.
#[rustfmt::skip]
const HEADER_CHARS: [u8; 256] = [
//  0       1       2       3       4       5       6       7       8       9
    0,      0,      0,      0,      0,      0,      0,      0,      0,      0,      // 0x
    0,      0,      0,      0,      0,      0,      0,      0,      0,      0,      // 1x
    0,      0,      0,      0,      0,      0,      0,      0,      0,      0,      // 2x
    0,      0,      b' ',   b'!',   b'"',   b'#',   b'$',   b'%',   b'&',   b'\'',  // 3x
    0,      0,      b'*',   b'+',   b',',   b'-',   b'.',   b'/',   b'0',   b'1',   // 4x
    b'2',   b'3',   b'4',   b'5',   b'6',   b'7',   b'8',   b'9',   0,      0,      // 5x
    0,      0,      0,      0,      0,      b'a',   b'b',   b'c',   b'd',   b'e',   // 6x
    b'f',   b'g',   b'h',   b'i',   b'j',   b'k',   b'l',   b'm',   b'n',   b'o',   // 7x
    b'p',   b'q',   b'r',   b's',   b't',   b'u',   b'v',   b'w',   b'x',   b'y',   // 8x
    b'z',   0,      0,      0,      b'^',   b'_',   b'`',   b'a',   b'b',   b'c',   // 9x
    b'd',   b'e',   b'f',   b'g',   b'h',   b'i',   b'j',   b'k',   b'l',   b'm',   // 10x
    b'n',   b'o',   b'p',   b'q',   b'r',   b's',   b't',   b'u',   b'v',   b'w',   // 11x
    b'x',   b'y',   b'z',   0,      b'|',   0,      b'~',   0,      0,      0,      // 12x
    0,      0,      0,      0,      0,      0,      0,      0,      0,      0,      // 13x
    0,      0,      0,      0,      0,      0,      0,      0,      0,      0,      // 14x
    0,      0,      0,      0,      0,      0,      0,      0,      0,      0,      // 15x
    0,      0,      0,      0,      0,      0,      0,      0,      0,      0,      // 16x
    0,      0,      0,      0,      0,      0,      0,      0,      0,      0,      // 17x
    0,      0,      0,      0,      0,      0,      0,      0,      0,      0,      // 18x
    0,      0,      0,      0,      0,      0,      0,      0,      0,      0,      // 19x
    0,      0,      0,      0,      0,      0,      0,      0,      0,      0,      // 20x
    0,      0,      0,      0,      0,      0,      0,      0,      0,      0,      // 21x
    0,      0,      0,      0,      0,      0,      0,      0,      0,      0,      // 22x
    0,      0,      0,      0,      0,      0,      0,      0,      0,      0,      // 23x
    0,      0,      0,      0,      0,      0,      0,      0,      0,      0,      // 24x
    0,      0,      0,      0,      0,      0,                                      // 25x
];

#[cfg(test)]
mod ut_headers {
    use crate::headers::{HeaderName, HeaderStatus, HeaderValue, Headers};

    /// UT test cases for `HeaderName::from_bytes`.
    ///
    /// # Brief
    /// 1. Creates a `HeaderName` by calling `HeaderName::from_bytes`.
    /// 2. Checks if the test results are correct.
    #[test]
    fn ut_header_name_from_bytes() {
        let name = HeaderName::from_bytes(b"ACCEPT").unwrap();
        assert_eq!(name.as_bytes(), b"accept");
        let name = HeaderName::from_bytes(b"accept").unwrap();
        assert_eq!(name.as_bytes(), b"accept");
        assert!(HeaderName::from_bytes(b"").is_err());
        assert!(HeaderName::from_bytes(b"bad\0name").is_err());
    }

    /// UT test cases for `HeaderName::status`.
    ///
    /// # Brief
    /// 1. Creates several `HeaderName`s.
    /// 2. Checks the registry classification of each.
    #[test]
    fn ut_header_name_status() {
        let cases = [
            ("Host", HeaderStatus::Permanent),
            ("If-Modified-Since", HeaderStatus::Permanent),
            ("Content-MD5", HeaderStatus::Obsolete),
            ("X-Requested-With", HeaderStatus::Nonstandard),
            ("Transfer-Encoding", HeaderStatus::Nonstandard),
            ("X-Grille", HeaderStatus::Unknown),
        ];
        for (name, status) in cases {
            let name = HeaderName::from_bytes(name.as_bytes()).unwrap();
            assert_eq!(name.status(), status);
        }
    }

    /// UT test cases for `HeaderValue::append_bytes` and
    /// `HeaderValue::to_string`.
    ///
    /// # Brief
    /// 1. Creates a `HeaderValue`.
    /// 2. Adds new value content by calling `HeaderValue::append_bytes`.
    /// 3. Checks if the comma-joined output is correct.
    #[test]
    fn ut_header_value_append_bytes() {
        let mut value = HeaderValue::from_bytes(b"text/html").unwrap();
        assert!(value.append_bytes(b"text/plain").is_ok());
        assert!(value.append_bytes(b"application/xml").is_ok());
        assert_eq!(
            value.to_string().unwrap(),
            "text/html, text/plain, application/xml"
        );
        assert!(value.append_bytes(b"bad\0value").is_err());
    }

    /// UT test cases for `Headers::insert`, `Headers::get` and
    /// `Headers::remove`.
    ///
    /// # Brief
    /// 1. Creates a `Headers`.
    /// 2. Inserts, replaces, fetches and removes a header.
    /// 3. Checks if the test results are correct.
    #[test]
    fn ut_change_headers_info() {
        let mut headers = Headers::new();
        assert!(headers.is_empty());
        headers.append("ACCEPT", "text/html").unwrap();
        assert_eq!(headers.len(), 1);

        let old = headers.insert("accept", "application/xml").unwrap();
        assert_eq!(old.unwrap().to_string().unwrap(), "text/html");

        let value = headers.get("Accept").unwrap();
        assert_eq!(value.to_string().unwrap(), "application/xml");

        let removed = headers.remove("accept").unwrap();
        assert_eq!(removed.to_string().unwrap(), "application/xml");
        assert!(headers.is_empty());
    }

    /// UT test cases for case-insensitive lookup.
    ///
    /// # Brief
    /// 1. Sets a header with a lowercase name.
    /// 2. Fetches it with an uppercase name.
    /// 3. Checks if the same value is returned.
    #[test]
    fn ut_headers_case_insensitive_get() {
        let mut headers = Headers::new();
        headers.insert("x-request-id", "42").unwrap();
        assert_eq!(headers.get_string("X-REQUEST-ID").unwrap(), "42");
    }

    /// UT test cases for `Headers::insert_line`.
    ///
    /// # Brief
    /// 1. Inserts headers from raw header lines.
    /// 2. Checks values and whitespace trimming.
    /// 3. Checks that a line without a colon is rejected.
    #[test]
    fn ut_headers_insert_line() {
        let mut headers = Headers::new();
        headers.insert_line("Content-Type:  text/html ").unwrap();
        assert_eq!(headers.get_string("content-type").unwrap(), "text/html");
        assert!(headers.insert_line("no colon here").is_err());
    }

    /// UT test cases for `Display` of `Headers`.
    ///
    /// # Brief
    /// 1. Creates a `Headers` with one entry.
    /// 2. Checks the wire format of the output.
    #[test]
    fn ut_headers_display() {
        let mut headers = Headers::new();
        headers.insert("Host", "example.org").unwrap();
        assert_eq!(headers.to_string(), "host: example.org\r\n");
    }
}
