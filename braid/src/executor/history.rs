//! Conversation histories keyed by session id.

use dashmap::DashMap;

use crate::message::Message;

/// Concurrent per-session history store. Sessions never see each other's messages.
#[derive(Debug, Default)]
pub struct SessionHistories {
    sessions: DashMap<String, Vec<Message>>,
}

impl SessionHistories {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the session's history; empty for an unknown session.
    pub fn get(&self, session_id: &str) -> Vec<Message> {
        self.sessions
            .get(session_id)
            .map(|h| h.value().clone())
            .unwrap_or_default()
    }

    /// Appends messages to the session's history, creating it if needed.
    pub fn append(&self, session_id: &str, messages: impl IntoIterator<Item = Message>) {
        self.sessions
            .entry(session_id.to_string())
            .or_default()
            .extend(messages);
    }

    /// Removes the session; returns its history if it existed.
    pub fn clear(&self, session_id: &str) -> Option<Vec<Message>> {
        self.sessions.remove(session_id).map(|(_, h)| h)
    }

    /// Known session ids, sorted.
    pub fn sessions(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.sessions.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: two sessions keep separate histories.
    #[test]
    fn sessions_are_isolated() {
        let h = SessionHistories::new();
        h.append("a", [Message::user("q1"), Message::assistant("r1")]);
        h.append("b", [Message::user("other")]);
        h.append("a", [Message::user("q2")]);
        assert_eq!(h.get("a").len(), 3);
        assert_eq!(h.get("b"), vec![Message::user("other")]);
        assert!(h.get("missing").is_empty());
        assert_eq!(h.sessions(), vec!["a", "b"]);
    }

    #[test]
    fn clear_removes_session() {
        let h = SessionHistories::new();
        h.append("a", [Message::user("q")]);
        assert_eq!(h.clear("a").map(|m| m.len()), Some(1));
        assert!(h.is_empty());
        assert!(h.clear("a").is_none());
    }
}
