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

use std::sync::{Arc, Mutex};

use opal_http::version::Version;

use crate::cache::{FifoCache, SharedCache};
use crate::policy::{CachingPolicy, SimpleCachingPolicy};
use crate::pool::{ConfigurablePool, ConnectionPool, PoolConfig};
use crate::transaction::HttpTransaction;

/// Top-level entry point for making HTTP requests. Used to open
/// [`HttpTransaction`]s which drive the communication with servers.
/// There is one [`ConnectionPool`] and one cache per client, which can be
/// adjusted on the fly.
///
/// # Examples
///
/// ```
/// use opal_http_client::HttpClient;
///
/// // Defaults all the way.
/// let transaction = HttpClient::new().new_transaction();
/// ```
///
/// A more customized client:
///
/// ```
/// use std::sync::{Arc, Mutex};
///
/// use opal_http_client::{FifoCache, HttpClient, PoolConfig};
///
/// let config = PoolConfig::new().max_total(4).build().unwrap();
/// let client = HttpClient::new()
///     .with_pool_config(config)
///     .with_cache(Arc::new(Mutex::new(FifoCache::new(64))));
/// let transaction = client.new_transaction();
/// ```
pub struct HttpClient {
    pool: Arc<dyn ConnectionPool>,
    cache: SharedCache,
    policy: Arc<dyn CachingPolicy>,
    version: Version,
}

impl HttpClient {
    /// Creates an `HttpClient` with default parameters: a default-sized
    /// [`ConfigurablePool`], a [`FifoCache`], the
    /// [`SimpleCachingPolicy`] and `HTTP/1.1`.
    pub fn new() -> HttpClient {
        HttpClient {
            pool: Arc::new(ConfigurablePool::new()),
            cache: Arc::new(Mutex::new(FifoCache::default())),
            policy: Arc::new(SimpleCachingPolicy),
            version: Version::HTTP1_1,
        }
    }

    /// Sets the [`ConnectionPool`] used for obtaining sockets. New
    /// transactions will use sockets from that pool; ongoing ones
    /// continue using the old pool. Take care to close the outstanding
    /// sockets of the old pool before calling this.
    pub fn with_pool(mut self, pool: Arc<dyn ConnectionPool>) -> Self {
        self.pool = pool;
        self
    }

    /// Creates a new [`ConfigurablePool`] from the given configuration
    /// and uses it for new transactions.
    pub fn with_pool_config(mut self, config: PoolConfig) -> Self {
        self.pool = Arc::new(ConfigurablePool::with_config(config));
        self
    }

    /// Sets the cache used by transactions of this client, according to
    /// the [`CachingPolicy`].
    pub fn with_cache(mut self, cache: SharedCache) -> Self {
        self.cache = cache;
        self
    }

    /// Sets the [`CachingPolicy`] describing which requests are cached
    /// and when the cache is consulted.
    pub fn with_caching_policy(mut self, policy: Arc<dyn CachingPolicy>) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the HTTP version used by new transactions.
    pub fn with_http_version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }

    /// Gets the connection pool of this client. Changing parameters of
    /// the pool impacts future and, possibly, ongoing work of the client.
    pub fn pool(&self) -> &Arc<dyn ConnectionPool> {
        &self.pool
    }

    /// Gets the cache of this client.
    pub fn cache(&self) -> &SharedCache {
        &self.cache
    }

    /// Creates a new transaction with the parameters of this client. The
    /// returned transaction can be customized further. This step does not
    /// open a connection yet.
    pub fn new_transaction(&self) -> HttpTransaction {
        let mut transaction = HttpTransaction::new(self.pool.clone());
        transaction.use_cache(self.cache.clone());
        transaction.use_caching_policy(self.policy.clone());
        transaction.set_http_version(self.version.clone());
        transaction
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}
