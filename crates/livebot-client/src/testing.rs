//! In-memory [`Transport`] for tests.
//!
//! Enabled for this crate's own tests and, through the `test-util` feature,
//! for dependent crates' tests.

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::endpoints::Endpoint;
use crate::error::TransportError;
use crate::transport::{OutboundRequest, Transport, TransportResponse};

/// A request captured by [`RecordingTransport`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// Full URL including query string.
    pub url: String,
    /// Headers as sent.
    pub headers: Vec<(&'static str, String)>,
    /// Body as sent.
    pub body: Option<Vec<u8>>,
}

impl RecordedRequest {
    /// URL without the query string.
    pub fn path(&self) -> &str {
        self.url.split('?').next().unwrap_or(&self.url)
    }

    /// Whether this request targeted `endpoint`.
    pub fn is(&self, endpoint: Endpoint) -> bool {
        match endpoint.api_path() {
            Some(api_path) => self.path().ends_with(api_path),
            None => self.path().ends_with("/token"),
        }
    }

    /// Value of a header, if present.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Body parsed as JSON, `Value::Null` when absent.
    pub fn json_body(&self) -> Value {
        self.body
            .as_deref()
            .map(|b| serde_json::from_slice(b).unwrap_or(Value::Null))
            .unwrap_or(Value::Null)
    }
}

#[derive(Debug, Clone)]
enum Reply {
    Response(TransportResponse),
    Error(TransportError),
}

#[derive(Debug)]
struct Rule {
    suffix: String,
    reply: Reply,
    once: bool,
}

/// Transport that records every request and replies from scripted rules.
///
/// Rules match on the URL path suffix; the most recently added matching rule
/// wins, and `once` rules are removed after first use. Unmatched requests get
/// `200 {}`.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    requests: Mutex<Vec<RecordedRequest>>,
    rules: Mutex<Vec<Rule>>,
}

impl RecordingTransport {
    /// Creates a transport answering `200 {}` to everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers requests whose path ends with `suffix`.
    pub fn respond(&self, suffix: &str, status: u16, body: &str) {
        self.push(suffix, Reply::Response(TransportResponse::new(status, body)), false);
    }

    /// Answers the next matching request only.
    pub fn respond_once(&self, suffix: &str, status: u16, body: &str) {
        self.push(suffix, Reply::Response(TransportResponse::new(status, body)), true);
    }

    /// Fails requests whose path ends with `suffix`.
    pub fn fail(&self, suffix: &str, error: TransportError) {
        self.push(suffix, Reply::Error(error), false);
    }

    /// All requests seen so far, in order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Requests made to `endpoint`, in order.
    pub fn requests_to(&self, endpoint: Endpoint) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.is(endpoint))
            .collect()
    }

    /// Endpoint names of all requests, in order.
    pub fn call_sequence(&self) -> Vec<&'static str> {
        const ALL: [Endpoint; 5] = [
            Endpoint::Token,
            Endpoint::SendEvent,
            Endpoint::SetRoutingStatus,
            Endpoint::TransferChat,
            Endpoint::CreateBot,
        ];
        self.requests()
            .iter()
            .filter_map(|r| ALL.iter().find(|e| r.is(**e)).map(|e| e.name()))
            .collect()
    }

    /// `(chat_id, event)` pairs of every `send_event` request.
    pub fn sent_events(&self) -> Vec<(String, Value)> {
        self.requests_to(Endpoint::SendEvent)
            .iter()
            .map(|r| {
                let body = r.json_body();
                let chat_id = body["chat_id"].as_str().unwrap_or_default().to_string();
                (chat_id, body["event"].clone())
            })
            .collect()
    }

    fn push(&self, suffix: &str, reply: Reply, once: bool) {
        self.rules.lock().unwrap().push(Rule {
            suffix: suffix.to_string(),
            reply,
            once,
        });
    }

    fn next_reply(&self, path: &str) -> Reply {
        let mut rules = self.rules.lock().unwrap();
        let Some(index) = rules.iter().rposition(|r| path.ends_with(&r.suffix)) else {
            return Reply::Response(TransportResponse::new(200, "{}"));
        };
        if rules[index].once {
            rules.remove(index).reply
        } else {
            rules[index].reply.clone()
        }
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn post(&self, request: OutboundRequest) -> Result<TransportResponse, TransportError> {
        let recorded = RecordedRequest {
            url: request.url,
            headers: request.headers,
            body: request.body,
        };
        let reply = self.next_reply(recorded.path());
        self.requests.lock().unwrap().push(recorded);
        match reply {
            Reply::Response(response) => Ok(response),
            Reply::Error(error) => Err(error),
        }
    }
}
