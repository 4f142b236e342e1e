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

use std::sync::Arc;

use opal_http::h1::{encode_chunk, encode_last_chunk, RequestEncoder};
use opal_http::request::method::Method;
use opal_http::request::uri::Uri;
use opal_http::request::Request;

use crate::endpoint::Endpoint;
use crate::error::{ErrorKind, HttpClientError};
use crate::response::HttpResponse;
use crate::socket::HttpSocket;
use crate::transaction::HttpTransaction;

/// Streaming write surface for requests with `Transfer-Encoding:
/// chunked`. The caller sends raw data which is compressed according to
/// the `Content-Encoding` header and framed per the chunked coding.
///
/// The three operations are strictly ordered: [`ChunkSender::begin`]
/// opens the socket and sends the head, [`ChunkSender::send_chunk`] sends
/// one non-empty chunk, and [`ChunkSender::end`] terminates the body,
/// parses the response and closes the transaction. Calls out of order
/// fail with an `InvalidRequest` error kind.
///
/// # Examples
///
/// ```no_run
/// use opal_http::request::method::Method;
/// use opal_http_client::HttpClient;
///
/// let client = HttpClient::new();
/// let mut transaction = client.new_transaction();
/// let mut sender = transaction
///     .send_chunks(Method::PUT, "http://example.org/upload")
///     .unwrap();
/// sender.begin().unwrap();
/// sender.send_chunk(b"part one").unwrap();
/// sender.send_chunk(b"part two").unwrap();
/// let response = sender.end().unwrap();
/// assert_eq!(response.status().unwrap().code().as_u16(), 200);
/// ```
pub struct ChunkSender<'a> {
    transaction: &'a mut HttpTransaction,
    method: Method,
    target: String,
    state: State,
    socket: Option<Arc<HttpSocket>>,
    request: Option<Request>,
}

#[derive(Eq, PartialEq)]
enum State {
    Created,
    Begun,
    Finished,
}

impl<'a> ChunkSender<'a> {
    pub(crate) fn new(
        transaction: &'a mut HttpTransaction,
        method: Method,
        target: String,
    ) -> ChunkSender<'a> {
        ChunkSender {
            transaction,
            method,
            target,
            state: State::Created,
            socket: None,
            request: None,
        }
    }

    /// Signals the beginning of the transfer: acquires a connection and
    /// sends the request head with `Transfer-Encoding: chunked`.
    pub fn begin(&mut self) -> Result<(), HttpClientError> {
        if self.state != State::Created {
            return err_from_msg!(InvalidRequest, "begin() called out of order");
        }
        self.transaction.verify_body_sources()?;
        self.transaction
            .headers
            .insert("Transfer-Encoding", "chunked")
            .map_err(|e| HttpClientError::from_error(ErrorKind::InvalidRequest, e))?;

        let target = Uri::from_bytes(self.target.as_bytes())
            .map_err(|e| HttpClientError::from_error(ErrorKind::InvalidRequest, e))?;
        let auto_host = !self.transaction.headers.contains("host");
        let request = self
            .transaction
            .build_request(&self.method, &target, auto_host)?;
        let socket = self.transaction.acquire(&Endpoint::from_uri(&target)?)?;
        self.transaction.socket = Some(socket.clone());

        let head = RequestEncoder::new(&request).encode();
        socket.print(&String::from_utf8_lossy(&head))?;
        socket.flush()?;

        self.socket = Some(socket);
        self.request = Some(request);
        self.state = State::Begun;
        Ok(())
    }

    /// Sends one chunk of data. Only raw data goes in: it is compressed
    /// according to the `Content-Encoding` header and framed per the
    /// chunked coding here. Zero-length chunks are rejected, because the
    /// empty chunk terminates the body.
    pub fn send_chunk(&mut self, chunk: &[u8]) -> Result<(), HttpClientError> {
        if self.state != State::Begun {
            return err_from_msg!(InvalidRequest, "send_chunk() called out of order");
        }
        if chunk.is_empty() {
            return err_from_msg!(InvalidRequest, "chunks must be non-empty");
        }
        let socket = self.socket.as_ref().ok_or(HttpClientError::from_str(
            ErrorKind::InvalidRequest,
            "chunk sender has no socket",
        ))?;
        let encoded = self.transaction.encode_request_body(chunk)?;
        socket.write(&encode_chunk(&encoded))
    }

    /// Signals the end of the transfer: sends the zero-length chunk,
    /// parses the response, latches the `Connection` header and closes
    /// the transaction. The returned response carries the status and
    /// headers; its body can no longer be read once the transaction is
    /// closed.
    pub fn end(mut self) -> Result<HttpResponse, HttpClientError> {
        if self.state != State::Begun {
            return err_from_msg!(InvalidRequest, "end() called out of order");
        }
        let socket = self.socket.take().ok_or(HttpClientError::from_str(
            ErrorKind::InvalidRequest,
            "chunk sender has no socket",
        ))?;
        let request = self.request.take().ok_or(HttpClientError::from_str(
            ErrorKind::InvalidRequest,
            "chunk sender has no request",
        ))?;
        socket.write(&encode_last_chunk())?;

        let response = self.transaction.parse_live(socket, request)?;
        self.transaction.latch_disconnect(&response);
        self.transaction.close()?;
        self.state = State::Finished;
        Ok(response)
    }
}
