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

use opal_http::headers::Headers;

/// SDV test cases for `Headers`.
///
/// # Brief
/// 1. Builds a header set the way the transaction layer does.
/// 2. Checks case-insensitive access, appending and wire output.
#[test]
fn sdv_headers_build_and_emit() {
    let mut headers = Headers::new();
    headers.insert("Accept-Charset", "utf-8").unwrap();
    headers.insert("Accept-Encoding", "gzip,deflate").unwrap();
    headers.append("Accept", "text/html").unwrap();
    headers.append("Accept", "text/plain").unwrap();

    assert_eq!(
        headers.get_string("ACCEPT").unwrap(),
        "text/html, text/plain"
    );
    assert_eq!(headers.get_string("accept-charset").unwrap(), "utf-8");

    let wire = headers.to_string();
    assert!(wire.contains("accept-encoding: gzip,deflate\r\n"));
    assert!(wire.lines().all(|line| line.ends_with('\r')));

    // Round trip through raw header lines, as trailer handling does.
    let mut parsed = Headers::new();
    for line in wire.split("\r\n").filter(|l| !l.is_empty()) {
        parsed.insert_line(line).unwrap();
    }
    assert_eq!(parsed.len(), headers.len());
    assert_eq!(
        parsed.get_string("accept").unwrap(),
        "text/html, text/plain"
    );
}
