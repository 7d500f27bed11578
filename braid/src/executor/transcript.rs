//! Per-invocation transcript (the agent scratchpad).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::message::{value_to_text, Message, ToolCall};

/// One transcript entry: a dispatched request or the observation answering it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TranscriptEntry {
    /// A dispatched tool call; `id` is always set.
    Request(ToolCall),
    /// Result of the request whose id is `call_id`.
    Observation {
        call_id: String,
        tool: String,
        content: Value,
    },
}

impl TranscriptEntry {
    pub fn call_id(&self) -> Option<&str> {
        match self {
            Self::Request(call) => call.id.as_deref(),
            Self::Observation { call_id, .. } => Some(call_id),
        }
    }
}

/// Append-only record of one executor invocation, in dispatch order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_request(&mut self, call: ToolCall) {
        self.entries.push(TranscriptEntry::Request(call));
    }

    pub fn push_observation(
        &mut self,
        call_id: impl Into<String>,
        tool: impl Into<String>,
        content: Value,
    ) {
        self.entries.push(TranscriptEntry::Observation {
            call_id: call_id.into(),
            tool: tool.into(),
            content,
        });
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Dispatched requests, in order.
    pub fn requests(&self) -> impl Iterator<Item = &ToolCall> {
        self.entries.iter().filter_map(|e| match e {
            TranscriptEntry::Request(call) => Some(call),
            TranscriptEntry::Observation { .. } => None,
        })
    }

    /// Number of dispatched requests.
    pub fn dispatches(&self) -> usize {
        self.requests().count()
    }

    /// Content of the most recent observation.
    pub fn last_observation(&self) -> Option<&Value> {
        self.entries.iter().rev().find_map(|e| match e {
            TranscriptEntry::Observation { content, .. } => Some(content),
            TranscriptEntry::Request(_) => None,
        })
    }

    /// Content of the observation answering `call_id`.
    pub fn observation_for(&self, call_id: &str) -> Option<&Value> {
        self.entries.iter().find_map(|e| match e {
            TranscriptEntry::Observation {
                call_id: id,
                content,
                ..
            } if id == call_id => Some(content),
            _ => None,
        })
    }

    /// Names of the tools dispatched so far, in order, without repeats.
    pub fn tools_used(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for call in self.requests() {
            if !names.contains(&call.name) {
                names.push(call.name.clone());
            }
        }
        names
    }

    /// Scratchpad messages for a chat model: each request as an assistant
    /// tool-call turn, each observation as a tool message with the same call id.
    pub fn to_messages(&self) -> Vec<Message> {
        self.entries
            .iter()
            .map(|e| match e {
                TranscriptEntry::Request(call) => Message::ToolRequest(call.clone()),
                TranscriptEntry::Observation {
                    call_id, content, ..
                } => Message::tool(call_id.clone(), value_to_text(content)),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    /// **Scenario**: an observation read back carries the call id of its request.
    #[test]
    fn observation_round_trips_call_id() {
        let mut t = Transcript::new();
        t.push_request(ToolCall::new("double", json!(5)).with_id("call_0"));
        t.push_observation("call_0", "double", json!(10));
        assert_eq!(t.observation_for("call_0"), Some(&json!(10)));
        assert_eq!(t.entries()[1].call_id(), Some("call_0"));
        assert_eq!(t.entries()[0].call_id(), t.entries()[1].call_id());
        assert!(t.observation_for("call_9").is_none());
    }

    /// **Scenario**: scratchpad messages pair requests and tool results by id.
    #[test]
    fn to_messages_pairs_requests_and_results() {
        let mut t = Transcript::new();
        t.push_request(ToolCall::new("get_stock_price", json!({"symbol": "GOOGL"})).with_id("a"));
        t.push_observation("a", "get_stock_price", json!("140.2"));
        let msgs = t.to_messages();
        assert_eq!(msgs.len(), 2);
        assert!(matches!(&msgs[0], Message::ToolRequest(c) if c.id.as_deref() == Some("a")));
        assert_eq!(msgs[1], Message::tool("a", "140.2"));
    }

    #[test]
    fn tools_used_and_last_observation() {
        let mut t = Transcript::new();
        assert!(t.last_observation().is_none());
        for (i, name) in ["a", "b", "a"].iter().enumerate() {
            let id = format!("call_{}", i);
            t.push_request(ToolCall::new(*name, json!({})).with_id(id.clone()));
            t.push_observation(id, *name, json!(i));
        }
        assert_eq!(t.tools_used(), vec!["a", "b"]);
        assert_eq!(t.dispatches(), 3);
        assert_eq!(t.last_observation(), Some(&json!(2)));
    }
}
