//! Processing reporter — structured fire-and-forget messages
//!
//! Steps and the rule engine report degraded-data conditions and rule
//! results here. The core never reads messages back; implementations must
//! accept concurrent appends because the pairwise rule pass runs on worker
//! threads.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Mutex;

// ─── Message Taxonomy ───────────────────────────────────────────────

/// Closed set of structured message categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    MissingSources,
    MissingLicenseInformation,
    UnknownLicense,
    MissingCoordinates,
    ProcessingFailure,
    UnnecessaryConfig,
    RuleEngine,
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Self::MissingSources => "missing-sources",
            Self::MissingLicenseInformation => "missing-license-information",
            Self::UnknownLicense => "unknown-license",
            Self::MissingCoordinates => "missing-coordinates",
            Self::ProcessingFailure => "processing-failure",
            Self::UnnecessaryConfig => "unnecessary-config",
            Self::RuleEngine => "rule-engine",
        };
        write!(f, "{}", tag)
    }
}

/// One reported message: optional subject identifier, category, text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    pub message_type: MessageType,
    pub message: String,
}

// ─── Reporter Contract ──────────────────────────────────────────────

/// Accepts `(identifier?, type, message)` tuples from any stage.
/// Implementations must tolerate concurrent calls.
pub trait ProcessingReporter: Send + Sync {
    fn report(&self, identifier: Option<&str>, message_type: MessageType, message: &str);
}

// ─── In-Memory Collector ────────────────────────────────────────────

/// Default reporter: appends into a mutex-guarded list for inspection
/// after the run.
#[derive(Debug, Default)]
pub struct MessageCollector {
    messages: Mutex<Vec<ProcessingMessage>>,
}

impl MessageCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything reported so far
    pub fn messages(&self) -> Vec<ProcessingMessage> {
        self.messages.lock().expect("reporter lock poisoned").clone()
    }

    pub fn messages_of_type(&self, message_type: MessageType) -> Vec<ProcessingMessage> {
        self.messages()
            .into_iter()
            .filter(|m| m.message_type == message_type)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.lock().expect("reporter lock poisoned").is_empty()
    }
}

impl ProcessingReporter for MessageCollector {
    fn report(&self, identifier: Option<&str>, message_type: MessageType, message: &str) {
        tracing::debug!("[{}] {}: {}", message_type, identifier.unwrap_or("-"), message);
        self.messages
            .lock()
            .expect("reporter lock poisoned")
            .push(ProcessingMessage {
                identifier: identifier.map(|s| s.to_string()),
                message_type,
                message: message.to_string(),
            });
    }
}
