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

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use opal_http::headers::Headers;
use opal_http::request::method::Method;
use opal_http_client::{
    ConfigurablePool, ConnectionPool, ErrorKind, HttpClient,
};

// A scripted origin serving one connection: for each scripted response it
// reads one request head, then answers. Returns the request heads it saw.
fn run_origin(script: Vec<&'static str>) -> (u16, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        stream
            .set_read_timeout(Some(Duration::from_secs(5)))
            .unwrap();
        let mut heads = Vec::new();
        let mut pending: Vec<u8> = Vec::new();
        for response in script {
            heads.push(read_head(&mut stream, &mut pending));
            stream.write_all(response.as_bytes()).unwrap();
        }
        heads
    });
    (port, handle)
}

fn read_head(stream: &mut std::net::TcpStream, pending: &mut Vec<u8>) -> String {
    let mut buf = [0u8; 1024];
    loop {
        if let Some(pos) = pending
            .windows(4)
            .position(|window| window == b"\r\n\r\n")
        {
            let head = String::from_utf8_lossy(&pending[..pos]).into_owned();
            *pending = pending.split_off(pos + 4);
            return head;
        }
        let read = stream.read(&mut buf).unwrap();
        assert!(read > 0, "client closed the connection early");
        pending.extend_from_slice(&buf[..read]);
    }
}

/// SDV test cases for connection reuse across transactions.
///
/// # Brief
/// 1. Runs two sequential transactions through one client against one
///    origin.
/// 2. Checks both return 200 and arrive on a single connection.
/// 3. Checks the pool holds exactly one connection afterwards.
#[test]
fn sdv_sequential_transactions_reuse_connection() {
    let (port, origin) = run_origin(vec![
        "HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\nok",
        "HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\nok",
    ]);
    let pool = ConfigurablePool::new();
    let client = HttpClient::new().with_pool(Arc::new(pool.clone()));
    let target = format!("http://127.0.0.1:{port}/data");

    for _ in 0..2 {
        let mut transaction = client.new_transaction();
        let mut response = transaction.make_request(Method::GET, &target).unwrap();
        assert_eq!(response.status().unwrap().code().as_u16(), 200);
        assert_eq!(response.body_string().unwrap(), "ok");
        transaction.close().unwrap();
    }

    assert_eq!(pool.pool_size(), 1);
    assert_eq!(origin.join().unwrap().len(), 2);
}

/// SDV test cases for the `Connection: close` lifecycle.
///
/// # Brief
/// 1. Serves a response carrying `Connection: close`.
/// 2. Closes the transaction.
/// 3. Checks the socket was closed rather than pooled.
#[test]
fn sdv_connection_close_shuts_socket() {
    let (port, origin) = run_origin(vec![
        "HTTP/1.1 200 OK\r\nConnection: close\r\nContent-Length: 2\r\n\r\nok",
    ]);
    let pool = ConfigurablePool::new();
    let client = HttpClient::new().with_pool(Arc::new(pool.clone()));

    let mut transaction = client.new_transaction();
    let mut response = transaction
        .make_request(Method::GET, &format!("http://127.0.0.1:{port}/data"))
        .unwrap();
    assert_eq!(response.status().unwrap().code().as_u16(), 200);
    assert_eq!(
        response.headers().get_string("connection").unwrap(),
        "close"
    );
    assert_eq!(response.body_string().unwrap(), "ok");
    transaction.close().unwrap();

    assert_eq!(pool.pool_size(), 0);
    origin.join().unwrap();
}

/// SDV test cases for following a redirect chain.
///
/// # Brief
/// 1. Serves two absolute-path redirects before the final response.
/// 2. Checks each hop was requested on the same connection and the final
///    response is returned.
#[test]
fn sdv_redirect_chain_followed() {
    let (port, origin) = run_origin(vec![
        "HTTP/1.1 302 Found\r\nLocation: /redirect/1\r\nContent-Length: 0\r\n\r\n",
        "HTTP/1.1 302 Found\r\nLocation: /final\r\nContent-Length: 0\r\n\r\n",
        "HTTP/1.1 200 OK\r\nContent-Length: 4\r\n\r\ndone",
    ]);
    let client = HttpClient::new();

    let mut transaction = client.new_transaction();
    let mut response = transaction
        .make_request(Method::GET, &format!("http://127.0.0.1:{port}/redirect/2"))
        .unwrap();
    assert_eq!(response.status().unwrap().code().as_u16(), 200);
    assert_eq!(response.body_string().unwrap(), "done");
    transaction.close().unwrap();

    let heads = origin.join().unwrap();
    assert!(heads[0].starts_with("GET /redirect/2 HTTP/1.1"));
    assert!(heads[1].starts_with("GET /redirect/1 HTTP/1.1"));
    assert!(heads[2].starts_with("GET /final HTTP/1.1"));
}

/// SDV test cases for the redirect budget.
///
/// # Brief
/// 1. Limits the transaction to one redirect.
/// 2. Serves a redirect.
/// 3. Checks the transaction fails with `InvalidResponse`.
#[test]
fn sdv_redirect_budget_exceeded() {
    let (port, origin) = run_origin(vec![
        "HTTP/1.1 302 Found\r\nLocation: /elsewhere\r\nContent-Length: 0\r\n\r\n",
    ]);
    let client = HttpClient::new();

    let mut transaction = client.new_transaction();
    transaction.set_max_redirects(1);
    let error = transaction
        .make_request(Method::GET, &format!("http://127.0.0.1:{port}/loop"))
        .unwrap_err();
    assert_eq!(error.error_kind(), ErrorKind::InvalidResponse);
    transaction.close().unwrap();
    origin.join().unwrap();
}

/// SDV test cases for `304` revalidation served from the cache.
///
/// # Brief
/// 1. Primes the cache with a conditional GET answered by 200.
/// 2. Repeats the same conditional GET, answered by 304.
/// 3. Checks the response is served from the cache with the original
///    status and body.
#[test]
fn sdv_not_modified_served_from_cache() {
    let (port, origin) = run_origin(vec![
        "HTTP/1.1 200 OK\r\nETag: \"v1\"\r\nContent-Length: 5\r\n\r\nfresh",
        "HTTP/1.1 304 Not Modified\r\n\r\n",
    ]);
    let client = HttpClient::new();
    let target = format!("http://127.0.0.1:{port}/resource");

    // Identical headers on both transactions keep the cache fingerprint
    // stable.
    let mut conditional = Headers::new();
    conditional
        .insert("If-Modified-Since", "Sat, 29 Oct 1994 19:43:31 GMT")
        .unwrap();

    let mut first = client.new_transaction();
    first.set_headers(conditional.clone());
    let mut response = first.make_request(Method::GET, &target).unwrap();
    assert_eq!(response.status().unwrap().code().as_u16(), 200);
    assert_eq!(response.body_string().unwrap(), "fresh");
    first.close().unwrap();

    let mut second = client.new_transaction();
    second.set_headers(conditional);
    let mut response = second.make_request(Method::GET, &target).unwrap();
    assert_eq!(response.status().unwrap().code().as_u16(), 200);
    assert_eq!(response.body_string().unwrap(), "fresh");
    assert_eq!(
        response.headers().get_string("etag").unwrap(),
        "\"v1\""
    );
    second.close().unwrap();
    origin.join().unwrap();
}

/// SDV test cases for `304` without a cache entry: conditional headers
/// are stripped and the request repeated.
///
/// # Brief
/// 1. Sends a conditional GET with an empty cache; the origin answers
///    304, then 200 for the repeat.
/// 2. Checks the repeated request lost its conditional headers.
/// 3. Checks the fresh 200 is returned.
#[test]
fn sdv_not_modified_repeats_without_conditionals() {
    let (port, origin) = run_origin(vec![
        "HTTP/1.1 304 Not Modified\r\n\r\n",
        "HTTP/1.1 200 OK\r\nContent-Length: 7\r\n\r\nrenewed",
    ]);
    let client = HttpClient::new();

    let mut transaction = client.new_transaction();
    transaction
        .headers_mut()
        .insert("If-None-Match", "\"v1\"")
        .unwrap();
    let mut response = transaction
        .make_request(Method::GET, &format!("http://127.0.0.1:{port}/resource"))
        .unwrap();
    assert_eq!(response.status().unwrap().code().as_u16(), 200);
    assert_eq!(response.body_string().unwrap(), "renewed");
    transaction.close().unwrap();

    let heads = origin.join().unwrap();
    assert!(heads[0].to_lowercase().contains("if-none-match"));
    assert!(!heads[1].to_lowercase().contains("if-none-match"));
}

/// SDV test cases for the repeat budget on endless `304`s.
///
/// # Brief
/// 1. Serves only `304` responses to a conditional GET.
/// 2. Limits the repeats and asks for an error on exhaustion.
/// 3. Checks the transaction fails with `InvalidResponse`.
#[test]
fn sdv_not_modified_repeat_budget() {
    let (port, origin) = run_origin(vec![
        "HTTP/1.1 304 Not Modified\r\n\r\n",
        "HTTP/1.1 304 Not Modified\r\n\r\n",
    ]);
    let client = HttpClient::new();

    let mut transaction = client.new_transaction();
    transaction.set_max_repeats(2).set_throw_if_max_repeats(true);
    transaction
        .headers_mut()
        .insert("If-None-Match", "\"v1\"")
        .unwrap();
    let error = transaction
        .make_request(Method::GET, &format!("http://127.0.0.1:{port}/resource"))
        .unwrap_err();
    assert_eq!(error.error_kind(), ErrorKind::InvalidResponse);
    transaction.close().unwrap();
    origin.join().unwrap();
}
