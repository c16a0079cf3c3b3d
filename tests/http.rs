mod common;

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use common::{FrameParams, StreamBuilder};
use framecount::config::{Config, LoggerConfig};
use framecount::server::UploadServer;

const BOUNDARY: &str = "framecount-e2e-boundary";

fn start() -> (Arc<UploadServer>, SocketAddr, thread::JoinHandle<()>) {
    let config = Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        logger: LoggerConfig {
            enabled: false,
            ..LoggerConfig::default()
        },
        ..Config::default()
    };

    let server = Arc::new(UploadServer::bind(config).expect("bind to an ephemeral port"));
    let addr = server.local_addr().expect("ip listener");
    let runner = Arc::clone(&server);
    let handle = thread::spawn(move || runner.run());
    (server, addr, handle)
}

fn send(addr: SocketAddr, head: &str, body: &[u8]) -> (u16, String, String) {
    let mut stream = TcpStream::connect(addr).expect("connect");
    stream
        .set_read_timeout(Some(Duration::from_secs(10)))
        .expect("read timeout");
    stream.write_all(head.as_bytes()).expect("write head");
    stream.write_all(body).expect("write body");

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).expect("read response");
    let raw = String::from_utf8_lossy(&raw).into_owned();

    let (headers, body) = raw.split_once("\r\n\r\n").expect("complete response");
    let status = headers
        .split_whitespace()
        .nth(1)
        .and_then(|code| code.parse().ok())
        .expect("status code");
    (status, headers.to_string(), body.to_string())
}

fn upload(addr: SocketAddr, mime: &str, document: &[u8]) -> (u16, String, String) {
    let mut body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"document\"; filename=\"song.mp3\"\r\nContent-Type: {m}\r\n\r\n",
        b = BOUNDARY,
        m = mime
    )
    .into_bytes();
    body.extend_from_slice(document);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    let head = format!(
        "POST /file-upload HTTP/1.1\r\nHost: {}\r\nContent-Type: multipart/form-data; boundary={}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        addr,
        BOUNDARY,
        body.len()
    );
    send(addr, &head, &body)
}

#[test]
fn test_upload_over_tcp() {
    let (server, addr, handle) = start();

    let spec = FrameParams::default();
    let document = StreamBuilder::new()
        .id3(128)
        .marker(spec, b"Xing")
        .frames(spec, 210)
        .build();

    let (status, headers, body) = upload(addr, "audio/mpeg", &document);
    assert_eq!(status, 200);
    assert!(headers.to_ascii_lowercase().contains("x-request-id:"));
    let json: serde_json::Value = serde_json::from_str(&body).expect("JSON body");
    assert_eq!(json, serde_json::json!({"frameCount": 210}));

    let mut invalid = StreamBuilder::new().frames(spec, 3).build();
    invalid[1] = 0xF3;
    let (status, _, body) = upload(addr, "audio/mpeg", &invalid);
    assert_eq!(status, 400);
    let json: serde_json::Value = serde_json::from_str(&body).expect("JSON body");
    assert_eq!(json["code"], "invalid_request");
    assert_eq!(
        json["message"],
        "The document is not a valid MPEG Version 1 Layer III file."
    );
    assert_eq!(json["parameter"], "document");

    let (status, _, body) = send(
        addr,
        "GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
        b"",
    );
    assert_eq!(status, 200);
    assert!(body.contains("\"ok\""));

    server.unblock();
    handle.join().expect("server thread");
}
