#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use serde_json::json;

use search_agent::data_models::SearchResult;
use search_agent::persistence::{Ack, PersistenceError, PersistenceGateway};
use search_agent::session::Session;
use search_agent::transport::{Transport, TransportError};

/// Everything the session did to the outside world, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Wire {
    Sent(String),
    Stored { query: String, link: String },
    Closed,
}

pub type WireLog = Arc<Mutex<Vec<Wire>>>;

pub struct RecordingTransport {
    log: WireLog,
    closed: bool,
}

impl RecordingTransport {
    pub fn new(log: WireLog) -> Self {
        Self { log, closed: false }
    }
}

impl Transport for RecordingTransport {
    fn send(&mut self, frame: String) -> Result<(), TransportError> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        self.log.lock().unwrap().push(Wire::Sent(frame));
        Ok(())
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.log.lock().unwrap().push(Wire::Closed);
        }
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

pub struct RecordingGateway {
    log: WireLog,
    failing_links: HashSet<String>,
}

impl RecordingGateway {
    pub fn new(log: WireLog) -> Self {
        Self {
            log,
            failing_links: HashSet::new(),
        }
    }

    pub fn failing_on(mut self, link: &str) -> Self {
        self.failing_links.insert(link.to_string());
        self
    }
}

impl PersistenceGateway for RecordingGateway {
    async fn store_result(
        &self,
        query: &str,
        result: &SearchResult,
    ) -> Result<Ack, PersistenceError> {
        self.log.lock().unwrap().push(Wire::Stored {
            query: query.to_string(),
            link: result.link.clone(),
        });
        if self.failing_links.contains(&result.link) {
            return Err(PersistenceError::Rejected(result.link.clone()));
        }
        Ok(json!({ "status": "ok" }))
    }
}

pub type TestSession = Session<RecordingTransport, RecordingGateway>;

pub fn new_session() -> (TestSession, WireLog) {
    let log: WireLog = Arc::new(Mutex::new(Vec::new()));
    let session = Session::new(
        RecordingTransport::new(log.clone()),
        RecordingGateway::new(log.clone()),
    );
    (session, log)
}

pub fn result(n: usize) -> SearchResult {
    SearchResult::new(
        format!("r{n}"),
        format!("Result {n}"),
        format!("Summary of result {n}."),
        format!("https://example.com/{n}"),
    )
}

pub fn results(range: std::ops::Range<usize>) -> Vec<SearchResult> {
    range.map(result).collect()
}

pub fn results_frame(range: std::ops::Range<usize>) -> String {
    json!({ "results": results(range) }).to_string()
}

pub fn links(page: &[SearchResult]) -> Vec<String> {
    page.iter().map(|r| r.link.clone()).collect()
}

pub fn sent_frames(log: &WireLog) -> Vec<String> {
    log.lock()
        .unwrap()
        .iter()
        .filter_map(|w| match w {
            Wire::Sent(frame) => Some(frame.clone()),
            _ => None,
        })
        .collect()
}
