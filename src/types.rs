use serde::{Deserialize, Serialize};

/// Body of `POST /api/echo`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct EchoRequest {
    pub user_text: String,
}

impl EchoRequest {
    pub fn new(user_text: impl Into<String>) -> Self {
        Self {
            user_text: user_text.into(),
        }
    }
}

/// Success body of `POST /api/echo`. Only `formatted_message` is required;
/// the backend also reports what it stored alongside it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EchoReply {
    pub formatted_message: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub user_text: Option<String>,
    #[serde(default)]
    pub gpt_reply: Option<String>,
}

/// Failure body. Any JSON object is accepted; `error` is used when it is a
/// non-empty string or a truthy scalar.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

impl ErrorBody {
    /// Lenient parse of a failure body: malformed or empty bodies yield `None`.
    /// Scalars are stringified; empty strings, `0`, `false`, `null` and
    /// nested objects or arrays carry no message.
    pub fn message_from(body: &str) -> Option<String> {
        let parsed: ErrorBody = serde_json::from_str(body).ok()?;
        match parsed.error? {
            serde_json::Value::String(msg) if !msg.is_empty() => Some(msg),
            serde_json::Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
            serde_json::Value::Bool(true) => Some("true".to_string()),
            _ => None,
        }
    }
}

/// What the handler rendered for one invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Message(String),
    Failure(String),
}

impl Outcome {
    /// Text written to the output sink. Failures carry a single leading space.
    pub fn display_text(&self) -> String {
        match self {
            Outcome::Message(msg) => msg.clone(),
            Outcome::Failure(msg) => format!(" {msg}"),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failure(_))
    }
}
