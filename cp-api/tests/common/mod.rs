//! Shared test utilities for integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use cp_api::{PreparedRequest, RawResponse, RestClient, Transport, TransportFailure};
use cp_core::config::ClientConfig;

pub const DEVICE_ID: &str = "dev-012345678901234567890123";
pub const OTHER_ID: &str = "dev-abcdefabcdefabcdefabcdef";
pub const MODEL_ID: &str = "mod-012345678901234567890123";
pub const OBJECT_ID: &str = "0123456789abcdef01234567";

/// Transport that records every request and answers with a canned reply.
#[derive(Clone)]
pub struct SpyTransport {
    pub requests: Arc<Mutex<Vec<PreparedRequest>>>,
    reply: Arc<Mutex<Result<RawResponse, TransportFailure>>>,
    pub releases: Arc<Mutex<usize>>,
}

impl SpyTransport {
    pub fn replying(status: u16, body: &str) -> Self {
        Self {
            requests: Arc::new(Mutex::new(Vec::new())),
            reply: Arc::new(Mutex::new(Ok(RawResponse {
                status,
                body: body.to_string(),
            }))),
            releases: Arc::new(Mutex::new(0)),
        }
    }

    pub fn failing(message: &str) -> Self {
        let spy = Self::replying(0, "");
        *spy.reply.lock().unwrap() = Err(TransportFailure {
            message: message.to_string(),
            status: 0,
        });
        spy
    }

    /// Change the reply for subsequent requests.
    pub fn set_reply(&self, status: u16, body: &str) {
        *self.reply.lock().unwrap() = Ok(RawResponse {
            status,
            body: body.to_string(),
        });
    }

    pub fn count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last(&self) -> PreparedRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no request was sent")
    }

    pub fn releases(&self) -> usize {
        *self.releases.lock().unwrap()
    }
}

#[async_trait]
impl Transport for SpyTransport {
    async fn execute(&self, request: PreparedRequest) -> Result<RawResponse, TransportFailure> {
        self.requests.lock().unwrap().push(request);
        self.reply.lock().unwrap().clone()
    }

    fn release(&mut self) {
        *self.releases.lock().unwrap() += 1;
    }
}

/// Header value by case-insensitive name.
pub fn header<'a>(request: &'a PreparedRequest, name: &str) -> Option<&'a str> {
    request
        .headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

pub fn body_json(request: &PreparedRequest) -> serde_json::Value {
    serde_json::from_str(request.body.as_deref().expect("request has no body"))
        .expect("body is not JSON")
}

pub fn test_config() -> ClientConfig {
    ClientConfig {
        base_url: "http://test.local/iot/".into(),
        ..ClientConfig::default()
    }
}

/// Client without credentials on a spy transport.
pub fn anonymous_client(spy: &SpyTransport) -> RestClient<SpyTransport> {
    RestClient::with_transport(&test_config(), spy.clone()).expect("failed to build client")
}

/// Client authenticated as `DEVICE_ID`.
pub fn device_client(spy: &SpyTransport) -> RestClient<SpyTransport> {
    let mut client = anonymous_client(spy);
    client
        .set_auth(DEVICE_ID, "devpass", false)
        .expect("failed to set auth");
    client
}

/// Client authenticated with a master account email.
pub fn master_client(spy: &SpyTransport) -> RestClient<SpyTransport> {
    let mut client = anonymous_client(spy);
    client
        .set_auth("owner@example.com", "master-secret", true)
        .expect("failed to set auth");
    client
}

/// Serve exactly one HTTP exchange on a local port, answering with
/// `status` and `body`. Returns the base URL and a handle yielding the raw
/// request text received.
pub async fn one_shot_server(
    status: u16,
    body: &'static str,
) -> (String, tokio::task::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind listener");
    let addr = listener.local_addr().expect("no local address");

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept failed");
        let request = read_request(&mut socket).await;
        let reply = format!(
            "HTTP/1.1 {status} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket
            .write_all(reply.as_bytes())
            .await
            .expect("write failed");
        socket.shutdown().await.ok();
        request
    });

    (format!("http://{addr}/iot/"), handle)
}

/// Accept connections and never answer them.
pub async fn silent_server() -> (String, tokio::task::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind listener");
    let addr = listener.local_addr().expect("no local address");

    let handle = tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    (format!("http://{addr}/iot/"), handle)
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await.expect("read failed");
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&buf);
        if let Some(end) = text.find("\r\n\r\n") {
            let content_length = text[..end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if buf.len() >= end + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}
