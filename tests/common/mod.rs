//! Common test utilities and helpers
//!
//! Fixtures shared by the integration tests: log file helpers, an emitter
//! that records submissions, and a stub issue tracker on a local socket.

#![allow(dead_code)]

use async_trait::async_trait;
use osprey::emitter::{FindingEmitter, IssueRequest, SubmitError, TicketRef};
use osprey::registry::Source;
use osprey::scanner::Finding;
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

pub fn write_log(path: &Path, contents: &str) {
    std::fs::write(path, contents).unwrap();
}

pub fn append_log(path: &Path, contents: &str) {
    let mut file = std::fs::OpenOptions::new()
        .append(true)
        .open(path)
        .unwrap();
    file.write_all(contents.as_bytes()).unwrap();
}

pub fn read_record(dir: &Path, source: &str) -> String {
    std::fs::read_to_string(dir.join(format!("{}.igu", source))).unwrap()
}

/// Emitter that keeps every issue it was asked to file
#[derive(Default)]
pub struct RecordingEmitter {
    issues: Mutex<Vec<(String, IssueRequest)>>,
}

impl RecordingEmitter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Bodies filed for one source, in submission order
    pub fn bodies_for(&self, source: &str) -> Vec<String> {
        self.issues
            .lock()
            .unwrap()
            .iter()
            .filter(|(name, _)| name == source)
            .map(|(_, issue)| issue.body.clone())
            .collect()
    }

    pub fn count(&self) -> usize {
        self.issues.lock().unwrap().len()
    }
}

#[async_trait]
impl FindingEmitter for RecordingEmitter {
    async fn submit(&self, source: &Source, finding: &Finding) -> Result<TicketRef, SubmitError> {
        let mut issues = self.issues.lock().unwrap();
        issues.push((source.name().to_string(), IssueRequest::from_finding(finding)));
        let number = issues.len() as u64;
        Ok(TicketRef {
            number,
            url: format!("https://github.test/{}/issues/{}", source.repo_slug(), number),
        })
    }
}

/// Canned reply from the stub tracker
#[derive(Debug, Clone)]
pub struct StubResponse {
    pub status: u16,
    pub body: String,
}

impl StubResponse {
    pub fn new(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
        }
    }
}

/// A request as seen by the stub tracker; header names are lowercase
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Minimal HTTP/1.1 server answering each connection with the next canned
/// response. Every reply closes the connection.
pub struct StubTracker {
    base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    task: JoinHandle<()>,
}

impl StubTracker {
    pub async fn start(responses: Vec<StubResponse>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));

        let recorded = requests.clone();
        let task = tokio::spawn(async move {
            let mut responses = responses.into_iter();
            while let Ok((mut stream, _)) = listener.accept().await {
                let Some(request) = read_request(&mut stream).await else {
                    continue;
                };
                recorded.lock().unwrap().push(request);

                let response = responses
                    .next()
                    .unwrap_or_else(|| StubResponse::new(500, r#"{"message":"no canned response left"}"#));
                let reply = format!(
                    "HTTP/1.1 {} Stub\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    response.status,
                    response.body.len(),
                    response.body
                );
                let _ = stream.write_all(reply.as_bytes()).await;
                let _ = stream.shutdown().await;
            }
        });

        Self {
            base_url,
            requests,
            task,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Drop for StubTracker {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn read_request(stream: &mut TcpStream) -> Option<RecordedRequest> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 1024];

    let header_end = loop {
        let read = stream.read(&mut chunk).await.ok()?;
        if read == 0 {
            return None;
        }
        buffer.extend_from_slice(&chunk[..read]);
        if let Some(pos) = buffer.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buffer[..header_end]).into_owned();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(key, value)| (key.trim().to_ascii_lowercase(), value.trim().to_string()))
        .collect();

    let length = headers
        .iter()
        .find(|(key, _)| key == "content-length")
        .and_then(|(_, value)| value.parse::<usize>().ok())
        .unwrap_or(0);
    while buffer.len() < header_end + length {
        let read = stream.read(&mut chunk).await.ok()?;
        if read == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..read]);
    }
    let body_end = buffer.len().min(header_end + length);
    let body = String::from_utf8_lossy(&buffer[header_end..body_end]).into_owned();

    Some(RecordedRequest {
        method,
        path,
        headers,
        body,
    })
}
