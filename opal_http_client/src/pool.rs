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

//! Connection pool implementation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use crate::endpoint::Endpoint;
use crate::error::{ErrorKind, HttpClientError};
use crate::socket::HttpSocket;

/// Provides connections to the client.
///
/// Acquiring a connection does *not* have to be on a first-come
/// first-serve basis: when several callers wait for the same endpoint,
/// they may be served in arbitrary order.
pub trait ConnectionPool: Send + Sync {
    /// Gets a connection to the given endpoint, blocking the calling
    /// thread while waiting. Fails with a `Timeout` error kind once the
    /// pool's waiting budget is exhausted.
    fn acquire_blocking(&self, endpoint: &Endpoint) -> Result<Arc<HttpSocket>, HttpClientError>;

    /// Gets a connection to the given endpoint, waiting on a helper
    /// thread if none is available. Exactly one of the callbacks is
    /// invoked: `on_obtained` with the acquired socket, `on_timeout` once
    /// the waiting budget is exhausted (never followed by `on_obtained`),
    /// or `on_exception` if opening a connection failed.
    fn acquire_async(&self, endpoint: Endpoint, callbacks: Box<dyn PoolCallbacks>);

    /// Returns the number of live connections currently pooled.
    fn pool_size(&self) -> usize;
}

/// Callbacks used when obtaining connections asynchronously.
pub trait PoolCallbacks: Send {
    /// The connection was obtained. Use it to send your data and release
    /// or close it when you are done.
    fn on_obtained(&mut self, socket: Arc<HttpSocket>);

    /// The waiting budget was exhausted without obtaining a connection.
    fn on_timeout(&mut self);

    /// An error occurred while opening a connection.
    fn on_exception(&mut self, error: HttpClientError);
}

/// Configuration of a [`ConfigurablePool`]. All knobs validate on
/// construction: capacities must be positive and durations non-zero.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use opal_http_client::PoolConfig;
///
/// let config = PoolConfig::new()
///     .max_total(4)
///     .max_per_endpoint(1)
///     .max_wait(Duration::from_millis(500))
///     .build()
///     .unwrap();
/// ```
#[derive(Clone, Debug)]
pub struct PoolConfig {
    pub(crate) max_total: usize,
    pub(crate) max_per_endpoint: usize,
    pub(crate) idle_alive_time: Duration,
    pub(crate) max_age: Duration,
    pub(crate) max_wait: Duration,
    pub(crate) poll_interval: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_total: 32,
            max_per_endpoint: 8,
            idle_alive_time: Duration::from_secs(60),
            max_age: Duration::from_secs(2 * 60 * 60),
            max_wait: Duration::from_secs(2),
            poll_interval: Duration::from_millis(100),
        }
    }
}

impl PoolConfig {
    /// Starts building a config from the defaults: 32 connections total,
    /// 8 per endpoint, 60 s idle keep-alive, 2 h maximum age, 2 s maximum
    /// wait, 100 ms poll interval.
    pub fn new() -> PoolConfigBuilder {
        PoolConfigBuilder {
            config: PoolConfig::default(),
            error: None,
        }
    }
}

/// A builder which is used to construct a validated [`PoolConfig`].
pub struct PoolConfigBuilder {
    config: PoolConfig,
    error: Option<&'static str>,
}

impl PoolConfigBuilder {
    /// Sets the maximum number of connections the pool can contain. Once
    /// the maximum is reached, a caller has to wait for a connection to be
    /// freed.
    pub fn max_total(mut self, max_total: usize) -> Self {
        if max_total < 1 {
            self.error = Some("max_total must be positive");
        } else {
            self.config.max_total = max_total;
        }
        self
    }

    /// Sets the maximum number of connections kept open to a single
    /// endpoint.
    pub fn max_per_endpoint(mut self, max_per_endpoint: usize) -> Self {
        if max_per_endpoint < 1 {
            self.error = Some("max_per_endpoint must be positive");
        } else {
            self.config.max_per_endpoint = max_per_endpoint;
        }
        self
    }

    /// Sets the maximum time a connection may idle before cleanup closes
    /// it.
    pub fn idle_alive_time(mut self, idle_alive_time: Duration) -> Self {
        if idle_alive_time.is_zero() {
            self.error = Some("idle_alive_time must be positive");
        } else {
            self.config.idle_alive_time = idle_alive_time;
        }
        self
    }

    /// Sets the maximum connection age. Connections which are in use are
    /// never closed by cleanup, regardless of age.
    pub fn max_age(mut self, max_age: Duration) -> Self {
        if max_age.is_zero() {
            self.error = Some("max_age must be positive");
        } else {
            self.config.max_age = max_age;
        }
        self
    }

    /// Sets the maximum duration a caller waits for a connection before
    /// acquisition fails with `Timeout`.
    pub fn max_wait(mut self, max_wait: Duration) -> Self {
        if max_wait.is_zero() {
            self.error = Some("max_wait must be positive");
        } else {
            self.config.max_wait = max_wait;
        }
        self
    }

    /// Sets how long a waiting caller sleeps between acquisition retries.
    /// The sleep happens outside the pool lock so that multiple waiters
    /// make progress independently.
    pub fn poll_interval(mut self, poll_interval: Duration) -> Self {
        if poll_interval.is_zero() {
            self.error = Some("poll_interval must be positive");
        } else {
            self.config.poll_interval = poll_interval;
        }
        self
    }

    /// Consumes the builder and constructs the config.
    pub fn build(self) -> Result<PoolConfig, HttpClientError> {
        match self.error {
            Some(msg) => Err(HttpClientError::from_str(ErrorKind::InvalidConfig, msg)),
            None => Ok(self.config),
        }
    }
}

/// Connection pool which can be configured using values in [`PoolConfig`]:
/// a bounded map from [`Endpoint`] to a list of [`HttpSocket`]s with
/// per-endpoint and global caps.
///
/// Cloning the pool produces another handle to the same pooled state.
///
/// There is no release callback: a released socket is detected lazily at
/// the next acquisition attempt, and dead or aged sockets are cleaned up
/// at the same point.
///
/// # Examples
///
/// ```no_run
/// use opal_http_client::{ConfigurablePool, ConnectionPool, Endpoint};
///
/// let pool = ConfigurablePool::new();
/// let endpoint = Endpoint::new("localhost", 8080, false).unwrap();
/// let socket = pool.acquire_blocking(&endpoint).unwrap();
/// // Use the socket, then hand it back.
/// socket.release();
/// ```
#[derive(Clone)]
pub struct ConfigurablePool {
    inner: Arc<Inner>,
}

struct Inner {
    connections: Mutex<HashMap<Endpoint, Vec<Arc<HttpSocket>>>>,
    config: Mutex<PoolConfig>,
}

impl ConfigurablePool {
    /// Creates a pool with the default configuration.
    pub fn new() -> ConfigurablePool {
        Self::with_config(PoolConfig::default())
    }

    /// Creates a pool with the given configuration.
    pub fn with_config(config: PoolConfig) -> ConfigurablePool {
        ConfigurablePool {
            inner: Arc::new(Inner {
                connections: Mutex::new(HashMap::new()),
                config: Mutex::new(config),
            }),
        }
    }

    /// Replaces the pool configuration. No guarantees are given on when
    /// ongoing acquisitions observe the change.
    pub fn set_config(&self, config: PoolConfig) {
        *self.inner.config.lock().unwrap() = config;
    }

    /// Returns a copy of the current configuration.
    pub fn config(&self) -> PoolConfig {
        self.inner.config.lock().unwrap().clone()
    }
}

impl Default for ConfigurablePool {
    fn default() -> Self {
        Self::new()
    }
}

impl Inner {
    // One acquisition attempt under the pool lock: cleanup, then scan the
    // endpoint list for an idle socket, then open a new one if the caps
    // allow it.
    fn try_acquire(
        &self,
        endpoint: &Endpoint,
        config: &PoolConfig,
    ) -> Result<Option<Arc<HttpSocket>>, HttpClientError> {
        let mut connections = self.connections.lock().unwrap();
        Self::cleanup(&mut connections, config);

        let total: usize = connections.values().map(Vec::len).sum();
        let list = connections.entry(endpoint.clone()).or_default();
        for socket in list.iter() {
            if socket.acquire_if_idle() {
                return Ok(Some(socket.clone()));
            }
        }
        if list.len() < config.max_per_endpoint && total < config.max_total {
            let socket = Arc::new(HttpSocket::connect(endpoint)?);
            socket.acquire_if_idle();
            list.push(socket.clone());
            return Ok(Some(socket));
        }
        Ok(None)
    }

    // Removes closed sockets, and closes then removes sockets that idled
    // past idle_alive_time or outlived max_age. In-use sockets are kept
    // regardless of age; close() on an in-use socket would cut a live
    // transaction.
    fn cleanup(connections: &mut HashMap<Endpoint, Vec<Arc<HttpSocket>>>, config: &PoolConfig) {
        for list in connections.values_mut() {
            list.retain(|socket| {
                if socket.is_closed() {
                    return false;
                }
                let idling = socket.idling_time();
                if idling.is_zero() {
                    return true;
                }
                if idling > config.idle_alive_time || socket.age() > config.max_age {
                    socket.close();
                    return false;
                }
                true
            });
        }
        connections.retain(|_, list| !list.is_empty());
    }

    fn wait_loop(
        &self,
        endpoint: &Endpoint,
    ) -> Result<Option<Arc<HttpSocket>>, HttpClientError> {
        // Wallclock start, so that the time a caller spends blocked on the
        // pool lock counts against the waiting budget.
        let start = Instant::now();
        loop {
            let config = self.config.lock().unwrap().clone();
            if let Some(socket) = self.try_acquire(endpoint, &config)? {
                return Ok(Some(socket));
            }
            thread::sleep(config.poll_interval);
            if start.elapsed() >= config.max_wait {
                return Ok(None);
            }
        }
    }
}

impl ConnectionPool for ConfigurablePool {
    fn acquire_blocking(&self, endpoint: &Endpoint) -> Result<Arc<HttpSocket>, HttpClientError> {
        match self.inner.wait_loop(endpoint)? {
            Some(socket) => Ok(socket),
            None => err_from_msg!(Timeout, "cannot obtain connection; try again later"),
        }
    }

    fn acquire_async(&self, endpoint: Endpoint, mut callbacks: Box<dyn PoolCallbacks>) {
        let inner = self.inner.clone();
        thread::spawn(move || match inner.wait_loop(&endpoint) {
            Ok(Some(socket)) => callbacks.on_obtained(socket),
            Ok(None) => callbacks.on_timeout(),
            Err(e) => callbacks.on_exception(e),
        });
    }

    fn pool_size(&self) -> usize {
        let config = self.config();
        let mut connections = self.inner.connections.lock().unwrap();
        Inner::cleanup(&mut connections, &config);
        connections.values().map(Vec::len).sum()
    }
}
