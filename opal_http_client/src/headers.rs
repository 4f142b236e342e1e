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

//! Request header helpers: the default header set transactions start
//! from, and the policy checking outgoing headers against the
//! known-header registry.

use chrono::Utc;
use opal_http::headers::{HeaderStatus, Headers};

use crate::error::HttpClientError;

/// Returns the default request headers: `Accept-Charset: utf-8`,
/// `Accept-Encoding: gzip,deflate`, a `Date` header in RFC 1123 form and
/// a `User-Agent`.
///
/// # Examples
///
/// ```
/// use opal_http_client::default_headers;
///
/// let headers = default_headers();
/// assert_eq!(
///     headers.get_string("accept-encoding").unwrap(),
///     "gzip,deflate"
/// );
/// ```
pub fn default_headers() -> Headers {
    let mut headers = Headers::new();
    // These inserts only ever receive valid names and values.
    let _ = headers.insert("Accept-Charset", "utf-8");
    let _ = headers.insert("Accept-Encoding", "gzip,deflate");
    let _ = headers.insert(
        "Date",
        Utc::now()
            .format("%a, %d %b %Y %H:%M:%S GMT")
            .to_string()
            .as_str(),
    );
    let _ = headers.insert(
        "User-Agent",
        concat!("opal-http/", env!("CARGO_PKG_VERSION")),
    );
    headers
}

/// Policy deciding what to do with headers per registry class: whether
/// unknown, nonstandard and obsolete names are allowed, and whether their
/// use draws a warning.
///
/// The defaults allow everything and warn on unknown and obsolete names.
///
/// # Examples
///
/// ```
/// use opal_http::headers::Headers;
/// use opal_http_client::HeaderPolicy;
///
/// let policy = HeaderPolicy {
///     allow_unknown: false,
///     ..HeaderPolicy::default()
/// };
///
/// let mut headers = Headers::new();
/// headers.insert("X-Grille", "1").unwrap();
/// assert!(policy.check(&headers).is_err());
/// ```
#[derive(Clone, Copy, Debug)]
pub struct HeaderPolicy {
    /// Whether headers missing from the registry may be sent.
    pub allow_unknown: bool,
    /// Whether using an unknown header draws a warning.
    pub warn_unknown: bool,
    /// Whether nonstandard headers may be sent.
    pub allow_nonstandard: bool,
    /// Whether using a nonstandard header draws a warning.
    pub warn_nonstandard: bool,
    /// Whether obsolete headers may be sent.
    pub allow_obsolete: bool,
    /// Whether using an obsolete header draws a warning.
    pub warn_obsolete: bool,
}

impl Default for HeaderPolicy {
    fn default() -> Self {
        Self {
            allow_unknown: true,
            warn_unknown: true,
            allow_nonstandard: true,
            warn_nonstandard: false,
            allow_obsolete: true,
            warn_obsolete: true,
        }
    }
}

impl HeaderPolicy {
    /// Checks every header in the set against the registry. Disallowed
    /// classes fail with an `InvalidHeader` error kind; allowed classes
    /// flagged for warning are logged.
    pub fn check(&self, headers: &Headers) -> Result<(), HttpClientError> {
        for (name, _value) in headers.iter() {
            match name.status() {
                HeaderStatus::Permanent => {}
                HeaderStatus::Unknown => {
                    if !self.allow_unknown {
                        return err_from_msg!(InvalidHeader, "unknown header disallowed by policy");
                    }
                    if self.warn_unknown {
                        tracing::warn!("using unknown header {name}");
                    }
                }
                HeaderStatus::Nonstandard => {
                    if !self.allow_nonstandard {
                        return err_from_msg!(
                            InvalidHeader,
                            "nonstandard header disallowed by policy"
                        );
                    }
                    if self.warn_nonstandard {
                        tracing::warn!("using nonstandard header {name}");
                    }
                }
                HeaderStatus::Obsolete => {
                    if !self.allow_obsolete {
                        return err_from_msg!(
                            InvalidHeader,
                            "obsolete header disallowed by policy"
                        );
                    }
                    if self.warn_obsolete {
                        tracing::warn!("using obsolete header {name}");
                    }
                }
            }
        }
        Ok(())
    }
}
