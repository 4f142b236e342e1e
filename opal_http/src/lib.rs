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

//! `opal_http` provides the basic components an `HTTP/1.1` user agent needs:
//! headers, methods, status codes, URIs, request head serialisation, chunked
//! transfer-coding and content codings.
//!
//! The crate contains no I/O beyond generic `Read`/`Write` adapters; the
//! networking layer lives in `opal_http_client`.

pub mod coding;
pub mod error;
pub mod h1;
pub mod headers;
pub mod request;
pub mod response;
pub mod version;
