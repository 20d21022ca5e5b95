use serde::Deserialize;
use serde_json::{Value, json};

use crate::data_models::SearchResult;

/// Control string asking the backend for the next batch of candidates.
pub const MORE_SIGNAL: &str = "more";
/// Control string telling the backend the shown results were accepted.
pub const ACCEPT_SIGNAL: &str = "yes";

const INBOUND_KEYS: [&str; 3] = ["results", "suggestions", "info"];

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("frame is not valid JSON for its shape: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("unrecognized frame shape: {0}")]
    Unrecognized(String),
}

/// Messages the client sends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    Query(String),
    Suggest(String),
    More,
    Feedback,
}

impl Outbound {
    /// Render the message as a single text frame.
    pub fn encode(&self) -> String {
        match self {
            Outbound::Query(text) => json!({ "query": text }).to_string(),
            Outbound::Suggest(text) => json!({ "suggest": text }).to_string(),
            Outbound::More => MORE_SIGNAL.to_string(),
            Outbound::Feedback => ACCEPT_SIGNAL.to_string(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Outbound::Query(_) => "query",
            Outbound::Suggest(_) => "suggest",
            Outbound::More => "more",
            Outbound::Feedback => "feedback",
        }
    }
}

/// Messages the backend sends, keyed by their single top-level field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Inbound {
    Results(Vec<SearchResult>),
    Suggestions(Vec<String>),
    Info(String),
}

/// Decode one inbound text frame.
///
/// The frame must be a JSON object with exactly one recognized key. A frame
/// with a recognized key but the wrong payload type is `Malformed`; anything
/// else (arrays, bare strings, unknown or extra keys) is `Unrecognized`.
pub fn decode(frame: &str) -> Result<Inbound, DecodeError> {
    let value: Value = serde_json::from_str(frame)?;

    let key = match &value {
        Value::Object(map) if map.len() == 1 => map.keys().next().cloned(),
        _ => None,
    };

    match key {
        Some(key) if INBOUND_KEYS.contains(&key.as_str()) => Ok(serde_json::from_value(value)?),
        _ => Err(DecodeError::Unrecognized(describe_shape(&value))),
    }
}

fn describe_shape(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            let keys: Vec<&str> = map.keys().map(String::as_str).collect();
            format!("object with keys [{}]", keys.join(", "))
        }
        Value::Array(_) => "array".to_string(),
        Value::String(_) => "string".to_string(),
        Value::Number(_) => "number".to_string(),
        Value::Bool(_) => "bool".to_string(),
        Value::Null => "null".to_string(),
    }
}

#[test]
fn test_encode_query_escapes_text() {
    let frame = Outbound::Query("say \"hi\"".to_string()).encode();
    let value: Value = serde_json::from_str(&frame).unwrap();
    assert_eq!(value, json!({ "query": "say \"hi\"" }));
}
