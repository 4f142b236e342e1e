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

use opal_http::request::Request;
use opal_http::response::status::StatusCode;
use opal_http::response::StatusLine;

/// Defines a caching policy for requests. Transactions use it to figure
/// out whether something is worth looking for in the cache and whether it
/// should be stored there.
///
/// The interface is the contract: implementations honouring
/// `Cache-Control` or `ETag` freshness can be swapped in without touching
/// the transaction.
pub trait CachingPolicy: Send + Sync {
    /// Should the request and response be stored in the cache. When this
    /// returns `true`, the caller makes sure the response actually
    /// reaches the cache.
    fn should_store(&self, request: &Request, status: &StatusLine) -> bool;

    /// Should the caller check the cache before making the request. When
    /// this returns `true`, the caller retrieves the response data from
    /// the cache instead of asking the network.
    fn should_look(&self, request: &Request) -> bool;

    /// Should the caller replace an already obtained response with the
    /// one from the cache. This is the `304 Not Modified` path, where the
    /// client is expected to pull the resource from its own cache instead
    /// of the server resending it.
    fn should_look_with(&self, request: &Request, status: &StatusLine) -> bool;
}

/// The simplest non-trivial caching policy: store every request that is
/// potentially cacheable, look in the cache only when the server returns
/// `304`.
///
/// The cache is deliberately a revalidation fallback here, not a primary
/// lookup path.
#[derive(Clone, Copy, Debug, Default)]
pub struct SimpleCachingPolicy;

impl CachingPolicy for SimpleCachingPolicy {
    fn should_store(&self, request: &Request, _status: &StatusLine) -> bool {
        request.is_cacheable()
    }

    fn should_look(&self, _request: &Request) -> bool {
        false
    }

    fn should_look_with(&self, _request: &Request, status: &StatusLine) -> bool {
        status.code() == StatusCode::NOT_MODIFIED
    }
}

#[cfg(test)]
mod ut_policy {
    use opal_http::request::method::Method;
    use opal_http::request::Request;
    use opal_http::response::status::StatusCode;
    use opal_http::response::StatusLine;

    use crate::policy::{CachingPolicy, SimpleCachingPolicy};

    fn status(code: StatusCode) -> StatusLine {
        StatusLine::from_raw_parts(String::from("HTTP/1.1"), code, String::new())
    }

    fn request(method: Method) -> Request {
        Request::builder()
            .method(method)
            .target("http://example.org/x")
            .build()
            .unwrap()
    }

    /// UT test cases for `SimpleCachingPolicy`.
    ///
    /// # Brief
    /// 1. Checks `should_store` per request method.
    /// 2. Checks `should_look` is always false.
    /// 3. Checks `should_look_with` only on `304`.
    #[test]
    fn ut_simple_caching_policy() {
        let policy = SimpleCachingPolicy;

        assert!(policy.should_store(&request(Method::GET), &status(StatusCode::OK)));
        assert!(!policy.should_store(&request(Method::PUT), &status(StatusCode::OK)));

        assert!(!policy.should_look(&request(Method::GET)));

        assert!(policy.should_look_with(&request(Method::GET), &status(StatusCode::NOT_MODIFIED)));
        assert!(!policy.should_look_with(&request(Method::GET), &status(StatusCode::OK)));
    }
}
