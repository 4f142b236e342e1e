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

use core::hash::{Hash, Hasher};
use std::io;
use std::net::{IpAddr, SocketAddr, ToSocketAddrs};

use opal_http::request::uri::{Scheme, Uri};

use crate::error::{ErrorKind, HttpClientError};

/// Endpoint to which connections are connected: the resolved address and
/// port of a remote origin, plus the TLS flag.
///
/// Equality and hashing use the resolved address and port only, so
/// `localhost` and `127.0.0.1` share one entry in the connection pool.
///
/// # Examples
///
/// ```
/// use opal_http_client::Endpoint;
///
/// let endpoint = Endpoint::new("localhost", 8080, false).unwrap();
/// assert_eq!(endpoint.port(), 8080);
/// assert!(!endpoint.is_tls());
/// ```
#[derive(Clone, Debug)]
pub struct Endpoint {
    host: String,
    address: IpAddr,
    port: u16,
    tls: bool,
}

impl Endpoint {
    /// Creates a new endpoint, resolving the host name.
    ///
    /// # Errors
    ///
    /// Fails with an I/O error kind when the host cannot be resolved.
    pub fn new(host: &str, port: u16, tls: bool) -> Result<Endpoint, HttpClientError> {
        let address = (host, port)
            .to_socket_addrs()
            .map_err(|e| HttpClientError::from_io_error(ErrorKind::Io, e))?
            .next()
            .map(|addr| addr.ip())
            .ok_or(HttpClientError::from_io_error(
                ErrorKind::Io,
                io::Error::new(io::ErrorKind::NotFound, "host resolved to no address"),
            ))?;
        Ok(Endpoint {
            host: host.to_string(),
            address,
            port,
            tls,
        })
    }

    /// Creates an endpoint from a URI. The port is inferred from the
    /// scheme when absent (80 for `http`, 443 for `https`).
    ///
    /// # Examples
    ///
    /// ```
    /// use opal_http::request::uri::Uri;
    /// use opal_http_client::Endpoint;
    ///
    /// let uri = Uri::from_bytes(b"http://localhost/x").unwrap();
    /// let endpoint = Endpoint::from_uri(&uri).unwrap();
    /// assert_eq!(endpoint.port(), 80);
    /// ```
    pub fn from_uri(uri: &Uri) -> Result<Endpoint, HttpClientError> {
        let scheme = uri.scheme().ok_or(HttpClientError::from_str(
            ErrorKind::InvalidRequest,
            "request target has no scheme",
        ))?;
        let host = uri.host().ok_or(HttpClientError::from_str(
            ErrorKind::InvalidRequest,
            "request target has no host",
        ))?;
        let port = uri.port_or_default().unwrap_or_else(|| scheme.default_port());
        Self::new(host, port, *scheme == Scheme::HTTPS)
    }

    /// Gets the host name this endpoint was created from.
    pub fn host(&self) -> &str {
        self.host.as_str()
    }

    /// Gets the resolved address.
    pub fn address(&self) -> IpAddr {
        self.address
    }

    /// Gets the port.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns whether connections to this endpoint use TLS.
    pub fn is_tls(&self) -> bool {
        self.tls
    }

    /// Returns the socket address to connect to.
    pub(crate) fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.address, self.port)
    }
}

impl PartialEq for Endpoint {
    fn eq(&self, other: &Self) -> bool {
        self.address == other.address && self.port == other.port
    }
}

impl Eq for Endpoint {}

impl Hash for Endpoint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.address.hash(state);
        self.port.hash(state);
    }
}
