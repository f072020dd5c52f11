use crate::domain::types::ChatMessage;
use std::collections::VecDeque;
use tracing::info;

/// One user turn and everything the model and tools added in answer to it.
///
/// Tool-call messages and their results always stay inside the same
/// exchange, so eviction never separates a call from its result.
#[derive(Debug, Clone, PartialEq)]
pub struct Exchange {
    pub messages: Vec<ChatMessage>,
}

/// Per-conversation memory. System instructions are never stored here.
#[derive(Debug, Clone, Default)]
pub struct ConversationState {
    summary: Option<ChatMessage>,
    exchanges: VecDeque<Exchange>,
    turn_count: usize,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages to send after the system instructions.
    pub fn history(&self) -> Vec<ChatMessage> {
        self.summary
            .iter()
            .cloned()
            .chain(
                self.exchanges
                    .iter()
                    .flat_map(|exchange| exchange.messages.iter().cloned()),
            )
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.summary.is_none() && self.exchanges.is_empty()
    }

    /// User turns since the conversation started or was last cleared.
    pub fn turn_count(&self) -> usize {
        self.turn_count
    }

    pub fn exchange_count(&self) -> usize {
        self.exchanges.len()
    }

    pub fn exchanges(&self) -> impl Iterator<Item = &Exchange> {
        self.exchanges.iter()
    }

    pub fn summary(&self) -> Option<&ChatMessage> {
        self.summary.as_ref()
    }

    /// Append a finished exchange and evict the oldest ones beyond
    /// `max_turns`. Returns how many were evicted. A summary seed is not an
    /// exchange and is never evicted.
    pub fn commit(&mut self, exchange: Exchange, max_turns: usize) -> usize {
        self.exchanges.push_back(exchange);
        self.turn_count += 1;

        let mut evicted = 0;
        while self.exchanges.len() > max_turns.max(1) {
            self.exchanges.pop_front();
            evicted += 1;
        }
        if evicted > 0 {
            info!(evicted, retained = self.exchanges.len(), "Evicted oldest exchanges");
        }
        evicted
    }

    /// Drop all history and start again from a single seeded assistant turn.
    pub fn reset_with_summary(&mut self, seed: ChatMessage) {
        self.exchanges.clear();
        self.summary = Some(seed);
        self.turn_count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exchange(label: &str) -> Exchange {
        Exchange {
            messages: vec![ChatMessage::user(label), ChatMessage::assistant(format!("re: {label}"))],
        }
    }

    #[test]
    fn eviction_is_oldest_first() {
        let mut state = ConversationState::new();
        let mut evicted = 0;
        for i in 0..5 {
            evicted += state.commit(exchange(&format!("q{i}")), 3);
        }
        assert_eq!(evicted, 2);
        assert_eq!(state.exchange_count(), 3);
        assert_eq!(state.turn_count(), 5);
        assert_eq!(state.history()[0].content, "q2");
    }

    #[test]
    fn summary_survives_eviction() {
        let mut state = ConversationState::new();
        state.reset_with_summary(ChatMessage::assistant("Previous session context: x"));
        for i in 0..4 {
            state.commit(exchange(&format!("q{i}")), 2);
        }
        let history = state.history();
        assert_eq!(history[0].content, "Previous session context: x");
        assert_eq!(history[1].content, "q2");
    }

    #[test]
    fn reset_clears_turns() {
        let mut state = ConversationState::new();
        state.commit(exchange("q"), 30);
        state.reset_with_summary(ChatMessage::assistant("seed"));
        assert_eq!(state.turn_count(), 0);
        assert_eq!(state.exchange_count(), 0);
        assert!(!state.is_empty());
    }
}
