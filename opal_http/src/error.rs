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

//! Errors that may occur in this crate.
//!
//! [`HttpError`] encapsulates error information related to the protocol
//! components, including `InvalidUri` and `H1Error`.
//!
//! [`HttpError`]: HttpError

use core::fmt::{Debug, Display, Formatter};
use std::convert::Infallible;
use std::error::Error;

use crate::h1::H1Error;
use crate::request::uri::InvalidUri;

/// Errors that may occur when using this crate.
#[derive(Debug, Eq, PartialEq)]
pub struct HttpError {
    kind: ErrorKind,
}

impl From<ErrorKind> for HttpError {
    fn from(kind: ErrorKind) -> Self {
        HttpError { kind }
    }
}

impl From<InvalidUri> for HttpError {
    fn from(err: InvalidUri) -> Self {
        ErrorKind::Uri(err).into()
    }
}

impl From<H1Error> for HttpError {
    fn from(err: H1Error) -> Self {
        ErrorKind::H1(err).into()
    }
}

impl From<Infallible> for HttpError {
    fn from(_value: Infallible) -> Self {
        unreachable!()
    }
}

impl Display for HttpError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        Debug::fmt(self, f)
    }
}

impl Error for HttpError {}

#[derive(Debug, Eq, PartialEq)]
pub(crate) enum ErrorKind {
    /// An invalid input parameter was passed to a method of this crate.
    InvalidInput,

    /// Errors related to URIs.
    Uri(InvalidUri),

    /// Errors related to `HTTP/1` framing.
    H1(H1Error),
}
