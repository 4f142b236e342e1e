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

use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::{Duration, Instant};

use opal_http::h1::{ChunkError, ChunkedReader};
use opal_http::headers::Headers;
use rustls::pki_types::ServerName;
use rustls::{ClientConfig, ClientConnection, RootCertStore, StreamOwned};

use crate::endpoint::Endpoint;
use crate::error::{ErrorKind, HttpClientError};

const READ_BUF_SIZE: usize = 8 * 1024;

/// A socket used for communicating with the network. Supports plain and
/// TLS [`Endpoint`]s. Socket and connection are used interchangeably.
///
/// A socket is a leased resource: it must be acquired through
/// [`HttpSocket::acquire_if_idle`] (usually by the connection pool) before
/// any reading or writing, and released or closed afterwards. At most one
/// lease exists at a time.
///
/// [`Endpoint`]: crate::endpoint::Endpoint
pub struct HttpSocket {
    endpoint: Endpoint,
    opened_at: Instant,
    state: Mutex<State>,
    stream: Mutex<Stream>,
}

impl std::fmt::Debug for HttpSocket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpSocket")
            .field("endpoint", &self.endpoint)
            .field("opened_at", &self.opened_at)
            .finish_non_exhaustive()
    }
}

struct State {
    in_use: bool,
    reading_chunks: bool,
    closed: bool,
    last_used_at: Instant,
}

/// Callbacks used to inform a caller about chunk reading progress.
pub trait ChunkCallbacks {
    /// Called every time a whole chunk is received.
    fn on_chunk(&mut self, chunk: Vec<u8>);

    /// Called after the last chunk has been read, with any trailer lines
    /// the server appended.
    fn on_end(&mut self, trailers: Headers);

    /// Called if an error occurred. No further callbacks follow.
    fn on_exception(&mut self, error: HttpClientError);
}

impl HttpSocket {
    /// Opens a new socket to the given endpoint. For TLS endpoints the
    /// handshake completes before this returns, so application bytes are
    /// never the first thing on the wire.
    pub(crate) fn connect(endpoint: &Endpoint) -> Result<HttpSocket, HttpClientError> {
        let tcp = TcpStream::connect(endpoint.socket_addr())
            .map_err(|e| HttpClientError::from_io_error(ErrorKind::Io, e))?;
        let io = if endpoint.is_tls() {
            let server_name = ServerName::try_from(endpoint.host().to_string())
                .map_err(|e| HttpClientError::from_error(ErrorKind::Io, e))?;
            let mut conn = ClientConnection::new(tls_config(), server_name)
                .map_err(|e| HttpClientError::from_error(ErrorKind::Io, e))?;
            let mut tcp = tcp;
            while conn.is_handshaking() {
                conn.complete_io(&mut tcp)
                    .map_err(|e| HttpClientError::from_io_error(ErrorKind::Io, e))?;
            }
            MixStream::Https(Box::new(StreamOwned::new(conn, tcp)))
        } else {
            MixStream::Http(tcp)
        };
        let now = Instant::now();
        Ok(HttpSocket {
            endpoint: endpoint.clone(),
            opened_at: now,
            state: Mutex::new(State {
                in_use: false,
                reading_chunks: false,
                closed: false,
                last_used_at: now,
            }),
            stream: Mutex::new(Stream::new(io)),
        })
    }

    /// Gets the endpoint this socket is connected to.
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Acquires this connection if it is idle and not closed and returns
    /// `true`. Otherwise returns `false`. The connection must be acquired
    /// before writing to or reading from it.
    pub fn acquire_if_idle(&self) -> bool {
        let mut state = self.state.lock().unwrap();
        if state.in_use || state.closed {
            return false;
        }
        state.in_use = true;
        true
    }

    /// Releases the socket, allowing it to be used for other transactions.
    /// Whatever is left unread in the stream is drained without blocking.
    /// Releasing the socket does not close the underlying connection.
    pub fn release(&self) {
        let mut state = self.state.lock().unwrap();
        self.stream.lock().unwrap().drain();
        state.in_use = false;
        state.last_used_at = Instant::now();
    }

    /// Gets how long this connection has been idling. Idle time is the
    /// duration since it was last released; while the connection is in
    /// use, the idling time is zero.
    pub fn idling_time(&self) -> Duration {
        let state = self.state.lock().unwrap();
        if state.in_use {
            return Duration::ZERO;
        }
        state.last_used_at.elapsed()
    }

    /// Gets how old this socket is: the duration since it was opened.
    pub fn age(&self) -> Duration {
        self.opened_at.elapsed()
    }

    /// Returns whether this socket is closed. Closed sockets cannot be
    /// re-acquired, written to or read from.
    pub fn is_closed(&self) -> bool {
        self.state.lock().unwrap().closed
    }

    /// Closes the connection to the server. After closing, the socket
    /// cannot be re-acquired and no more data can pass through it.
    pub fn close(&self) {
        {
            let mut state = self.state.lock().unwrap();
            if state.closed {
                return;
            }
            self.stream.lock().unwrap().drain();
            state.in_use = false;
            state.closed = true;
            state.last_used_at = Instant::now();
        }
        let stream = self.stream.lock().unwrap();
        let _ = stream.io.tcp().shutdown(Shutdown::Both);
    }

    /// Prints a string to the socket; this call is buffered, so the bytes
    /// are not guaranteed to be sent until the next [`HttpSocket::flush`].
    pub fn print(&self, s: &str) -> Result<(), HttpClientError> {
        self.ensure_acquired()?;
        self.stream.lock().unwrap().wbuf.extend_from_slice(s.as_bytes());
        self.touch();
        Ok(())
    }

    /// Writes raw bytes to the socket; this flushes anything buffered,
    /// sends the bytes and flushes the connection.
    pub fn write(&self, bytes: &[u8]) -> Result<(), HttpClientError> {
        self.ensure_acquired()?;
        {
            let mut stream = self.stream.lock().unwrap();
            let result = (|| -> io::Result<()> {
                stream.flush_write_buffer()?;
                stream.io.write_all(bytes)?;
                stream.io.flush()
            })();
            result.map_err(|e| HttpClientError::from_io_error(ErrorKind::Io, e))?;
        }
        self.touch();
        Ok(())
    }

    /// Flushes the connection, sending any buffered bytes to the server.
    pub fn flush(&self) -> Result<(), HttpClientError> {
        self.ensure_acquired()?;
        {
            let mut stream = self.stream.lock().unwrap();
            let result = (|| -> io::Result<()> {
                stream.flush_write_buffer()?;
                stream.io.flush()
            })();
            result.map_err(|e| HttpClientError::from_io_error(ErrorKind::Io, e))?;
        }
        self.touch();
        Ok(())
    }

    /// Reads a single byte from the server, blocking until one arrives.
    /// Returns `None` at end of stream, or while chunk reading is in
    /// progress.
    pub fn read_byte(&self) -> Result<Option<u8>, HttpClientError> {
        self.ensure_acquired()?;
        if self.is_reading_chunks() || self.is_closed() {
            return Ok(None);
        }
        let byte = self
            .stream
            .lock()
            .unwrap()
            .read_byte()
            .map_err(|e| HttpClientError::from_io_error(ErrorKind::Io, e))?;
        self.touch();
        Ok(byte)
    }

    /// Reads at most `buf.len()` bytes into the buffer and returns the
    /// number of bytes read. Returns 0 on a closed socket or while chunk
    /// reading is in progress.
    pub fn read(&self, buf: &mut [u8]) -> Result<usize, HttpClientError> {
        self.ensure_acquired()?;
        if self.is_reading_chunks() || self.is_closed() {
            return Ok(0);
        }
        let read = self
            .stream
            .lock()
            .unwrap()
            .read(buf)
            .map_err(|e| HttpClientError::from_io_error(ErrorKind::Io, e))?;
        self.touch();
        Ok(read)
    }

    /// Reads a line from the server, blocking until a full line or end of
    /// stream. Lines are terminated with either CRLF or a bare LF; the
    /// terminator is not included. This method should not be used for
    /// reading the body of a response.
    // We are skirting the spec here, because it specifies only CRLF as the
    // line terminator.
    pub fn read_line(&self) -> Result<String, HttpClientError> {
        self.ensure_acquired()?;
        if self.is_reading_chunks() || self.is_closed() {
            return Ok(String::new());
        }
        let line = self
            .stream
            .lock()
            .unwrap()
            .read_line()
            .map_err(|e| HttpClientError::from_io_error(ErrorKind::Io, e))?;
        self.touch();
        Ok(line)
    }

    /// Returns whether there is more input waiting to be read and chunk
    /// reading is not in progress. Input not being ready does *not* imply
    /// there will be no more data on this socket.
    pub fn input_ready(&self) -> Result<bool, HttpClientError> {
        self.ensure_acquired()?;
        if self.is_reading_chunks() || self.is_closed() {
            return Ok(false);
        }
        self.stream
            .lock()
            .unwrap()
            .has_input()
            .map_err(|e| HttpClientError::from_io_error(ErrorKind::Io, e))
    }

    /// Assumes a chunked response and reads all chunks at once, stalling
    /// until the final chunk is received. Returns the concatenated chunk
    /// payloads and any trailer lines the server appended.
    pub fn read_all_chunks(&self) -> Result<(Vec<u8>, Headers), HttpClientError> {
        let mut body = Vec::with_capacity(1024);
        let trailers = self.chunked_transfer(|chunk| {
            body.extend_from_slice(&chunk);
            Ok(())
        })?;
        Ok((body, trailers))
    }

    /// Reads chunks one by one, informing the caller about the progress
    /// through callbacks on the calling thread as each chunk completes.
    pub fn read_chunks(&self, callbacks: &mut dyn ChunkCallbacks) {
        let result = self.chunked_transfer(|chunk| {
            callbacks.on_chunk(chunk);
            Ok(())
        });
        match result {
            Ok(trailers) => callbacks.on_end(trailers),
            Err(e) => callbacks.on_exception(e),
        }
    }

    /// Runs one chunked body transfer, handing each raw chunk to
    /// `on_chunk` as it completes, then consumes trailer lines up to the
    /// empty line and returns them.
    pub(crate) fn chunked_transfer<F>(&self, mut on_chunk: F) -> Result<Headers, HttpClientError>
    where
        F: FnMut(Vec<u8>) -> Result<(), HttpClientError>,
    {
        self.ensure_acquired()?;
        self.set_reading_chunks(true);
        let result = (|| {
            let mut stream = self.stream.lock().unwrap();
            let mut reader = ChunkedReader::new(&mut *stream);
            while reader.has_more_chunks().map_err(chunk_error)? {
                let chunk = reader.read_chunk().map_err(chunk_error)?;
                on_chunk(chunk)?;
            }
            drop(reader);
            let mut trailers = Headers::new();
            loop {
                let line = stream
                    .read_line()
                    .map_err(|e| HttpClientError::from_io_error(ErrorKind::Io, e))?;
                if line.is_empty() {
                    break;
                }
                if trailers.insert_line(&line).is_err() {
                    tracing::warn!("ignoring malformed trailer line: {line}");
                }
            }
            Ok(trailers)
        })();
        self.set_reading_chunks(false);
        self.touch();
        result
    }

    fn ensure_acquired(&self) -> Result<(), HttpClientError> {
        let state = self.state.lock().unwrap();
        if !state.in_use {
            return err_from_msg!(InvalidRequest, "cannot use an idling connection");
        }
        Ok(())
    }

    fn is_reading_chunks(&self) -> bool {
        self.state.lock().unwrap().reading_chunks
    }

    fn set_reading_chunks(&self, reading: bool) {
        self.state.lock().unwrap().reading_chunks = reading;
    }

    fn touch(&self) {
        self.state.lock().unwrap().last_used_at = Instant::now();
    }
}

fn chunk_error(err: ChunkError) -> HttpClientError {
    match err {
        ChunkError::Io(e) => HttpClientError::from_io_error(ErrorKind::Io, e),
        ChunkError::InvalidFrame => {
            HttpClientError::from_str(ErrorKind::InvalidResponse, "ill-formed chunk framing")
        }
    }
}

// One buffered byte stream per socket: a small read buffer for line and
// byte reads, and a write buffer backing `print`.
struct Stream {
    io: MixStream,
    rbuf: Vec<u8>,
    rpos: usize,
    wbuf: Vec<u8>,
}

impl Stream {
    fn new(io: MixStream) -> Self {
        Self {
            io,
            rbuf: Vec::new(),
            rpos: 0,
            wbuf: Vec::new(),
        }
    }

    fn buffered(&self) -> usize {
        self.rbuf.len() - self.rpos
    }

    fn fill(&mut self) -> io::Result<usize> {
        let mut tmp = [0u8; READ_BUF_SIZE];
        let read = self.io.read(&mut tmp)?;
        self.rbuf = tmp[..read].to_vec();
        self.rpos = 0;
        Ok(read)
    }

    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        if self.buffered() == 0 && self.fill()? == 0 {
            return Ok(None);
        }
        let byte = self.rbuf[self.rpos];
        self.rpos += 1;
        Ok(Some(byte))
    }

    fn read_line(&mut self) -> io::Result<String> {
        let mut line: Vec<u8> = Vec::new();
        loop {
            match self.read_byte()? {
                None => break,
                Some(b'\n') => break,
                Some(byte) => line.push(byte),
            }
        }
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        Ok(String::from_utf8_lossy(&line).into_owned())
    }

    fn flush_write_buffer(&mut self) -> io::Result<()> {
        if !self.wbuf.is_empty() {
            let out = std::mem::take(&mut self.wbuf);
            self.io.write_all(&out)?;
        }
        Ok(())
    }

    // Discards whatever is immediately readable. Used on release so that
    // leftover body bytes of an abandoned response cannot corrupt the next
    // transaction on this socket. Errors are ignored.
    fn drain(&mut self) {
        self.rbuf.clear();
        self.rpos = 0;
        if self.io.tcp().set_nonblocking(true).is_err() {
            return;
        }
        let mut scratch = [0u8; READ_BUF_SIZE];
        loop {
            match self.io.read(&mut scratch) {
                Ok(0) => break,
                Ok(_) => {}
                Err(_) => break,
            }
        }
        let _ = self.io.tcp().set_nonblocking(false);
    }

    fn has_input(&mut self) -> io::Result<bool> {
        if self.buffered() > 0 {
            return Ok(true);
        }
        self.io.tcp().set_nonblocking(true)?;
        let mut tmp = [0u8; READ_BUF_SIZE];
        let result = self.io.read(&mut tmp);
        self.io.tcp().set_nonblocking(false)?;
        match result {
            Ok(0) => Ok(false),
            Ok(read) => {
                self.rbuf = tmp[..read].to_vec();
                self.rpos = 0;
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(false),
            Err(e) => Err(e),
        }
    }
}

impl Read for Stream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.buffered() > 0 {
            let take = self.buffered().min(buf.len());
            buf[..take].copy_from_slice(&self.rbuf[self.rpos..self.rpos + take]);
            self.rpos += take;
            return Ok(take);
        }
        self.io.read(buf)
    }
}

// Plain or TLS byte stream to the server.
enum MixStream {
    Http(TcpStream),
    Https(Box<StreamOwned<ClientConnection, TcpStream>>),
}

impl MixStream {
    fn tcp(&self) -> &TcpStream {
        match self {
            MixStream::Http(tcp) => tcp,
            MixStream::Https(tls) => &tls.sock,
        }
    }
}

impl Read for MixStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            MixStream::Http(tcp) => tcp.read(buf),
            MixStream::Https(tls) => tls.read(buf),
        }
    }
}

impl Write for MixStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            MixStream::Http(tcp) => tcp.write(buf),
            MixStream::Https(tls) => tls.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            MixStream::Http(tcp) => tcp.flush(),
            MixStream::Https(tls) => tls.flush(),
        }
    }
}

// TLS configuration shared by all sockets: platform-shipped web roots, no
// pinning, no client auth. rustls enforces TLS 1.2 as the minimum.
fn tls_config() -> Arc<ClientConfig> {
    static CONFIG: OnceLock<Arc<ClientConfig>> = OnceLock::new();
    CONFIG
        .get_or_init(|| {
            let _ = rustls::crypto::ring::default_provider().install_default();
            let mut roots = RootCertStore::empty();
            roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
            Arc::new(
                ClientConfig::builder()
                    .with_root_certificates(roots)
                    .with_no_client_auth(),
            )
        })
        .clone()
}
