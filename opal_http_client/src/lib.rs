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

//! `opal_http_client` is a blocking `HTTP/1.1` user agent built on
//! [`opal_http`]. It speaks the wire protocol directly over TCP or TLS
//! byte streams and provides:
//!
//! - a bounded [`ConnectionPool`] of long-lived connections keyed by
//!   origin [`Endpoint`],
//! - a pluggable response [`cache`] with a revalidation-oriented default
//!   [`CachingPolicy`],
//! - single-use [`HttpTransaction`]s driving one logical exchange,
//!   including redirects, `304` revalidation and the `Connection`
//!   lifecycle,
//! - a [`ChunkSender`] for streaming chunked request bodies.
//!
//! # Examples
//!
//! ```no_run
//! use opal_http::request::method::Method;
//! use opal_http_client::HttpClient;
//!
//! let client = HttpClient::new();
//! let mut transaction = client.new_transaction();
//! let mut response = transaction
//!     .make_request(Method::GET, "http://example.org/index")
//!     .unwrap();
//! let body = response.body_string().unwrap();
//! transaction.close().unwrap();
//! ```

#[macro_use]
mod error;

mod cache;
mod chunk;
mod client;
mod endpoint;
mod headers;
mod policy;
mod pool;
mod response;
mod socket;
mod transaction;

pub use cache::{BodyKind, CachedBody, EmptyCache, FifoCache, HttpCache, SharedCache};
pub use chunk::ChunkSender;
pub use client::HttpClient;
pub use endpoint::Endpoint;
pub use error::{ErrorKind, HttpClientError};
pub use headers::{default_headers, HeaderPolicy};
pub use policy::{CachingPolicy, SimpleCachingPolicy};
pub use pool::{ConfigurablePool, ConnectionPool, PoolCallbacks, PoolConfig};
pub use response::HttpResponse;
pub use socket::{ChunkCallbacks, HttpSocket};
pub use transaction::{HttpTransaction, TransactionCallbacks};
