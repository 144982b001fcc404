//! Search query bookkeeping and debounce staleness checks
//!
//! Timers are never cancelled. Each keystroke that changes the query arms a
//! fresh ticket; when a timer fires, only the most recently armed ticket is
//! allowed through, and a settled query identical to the last one sent is
//! dropped.

use std::time::Duration;

/// Default quiet period before a changed query is sent
pub const DEBOUNCE_DELAY: Duration = Duration::from_millis(500);

/// Identity of one armed debounce timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DebounceTicket(pub u64);

#[derive(Debug, Default, Clone)]
pub struct SearchController {
    /// Raw text as typed
    query: String,
    /// Trimmed query that produced the results on screen
    last_sent: String,
    /// Latest armed ticket, if its timer has not fired yet
    pending: Option<DebounceTicket>,
    next_ticket: u64,
}

impl SearchController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn last_sent(&self) -> &str {
        &self.last_sent
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Record the new raw query. Returns the ticket to arm when the text
    /// actually changed.
    pub fn on_query_changed(&mut self, new_query: &str) -> Option<DebounceTicket> {
        if new_query == self.query {
            return None;
        }
        self.query = new_query.to_string();

        self.next_ticket += 1;
        let ticket = DebounceTicket(self.next_ticket);
        self.pending = Some(ticket);
        Some(ticket)
    }

    /// A debounce timer fired. Returns the settled query to fetch, if any.
    pub fn on_debounce_fired(&mut self, ticket: DebounceTicket) -> Option<String> {
        if self.pending != Some(ticket) {
            // Superseded by a later keystroke, or already handled
            return None;
        }
        self.pending = None;

        let query = self.query.trim();
        if query == self.last_sent {
            return None;
        }
        self.last_sent = query.to_string();
        Some(self.last_sent.clone())
    }

    /// Forget the query, the last sent query and any armed ticket
    pub fn clear(&mut self) {
        self.query.clear();
        self.last_sent.clear();
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unchanged_query_arms_nothing() {
        let mut search = SearchController::new();
        assert!(search.on_query_changed("").is_none());
        assert!(search.on_query_changed("a").is_some());
        assert!(search.on_query_changed("a").is_none());
    }

    #[test]
    fn test_rapid_typing_coalesces_to_latest_ticket() {
        let mut search = SearchController::new();
        let t1 = search.on_query_changed("a").unwrap();
        let t2 = search.on_query_changed("ab").unwrap();
        let t3 = search.on_query_changed("abc").unwrap();

        assert_eq!(search.on_debounce_fired(t1), None);
        assert_eq!(search.on_debounce_fired(t2), None);
        assert_eq!(search.on_debounce_fired(t3), Some("abc".to_string()));
        assert_eq!(search.last_sent(), "abc");
        assert!(!search.is_pending());
    }

    #[test]
    fn test_firing_twice_sends_once() {
        let mut search = SearchController::new();
        let ticket = search.on_query_changed("acme").unwrap();
        assert_eq!(search.on_debounce_fired(ticket), Some("acme".to_string()));
        assert_eq!(search.on_debounce_fired(ticket), None);
    }

    #[test]
    fn test_settled_query_equal_to_last_sent_is_dropped() {
        let mut search = SearchController::new();
        let ticket = search.on_query_changed("acme").unwrap();
        search.on_debounce_fired(ticket);

        // Trailing whitespace settles to the same query
        let ticket = search.on_query_changed("acme ").unwrap();
        assert_eq!(search.on_debounce_fired(ticket), None);

        // Typing and deleting back to the empty query before the timer fires
        let mut search = SearchController::new();
        search.on_query_changed("a");
        let ticket = search.on_query_changed("").unwrap();
        assert_eq!(search.on_debounce_fired(ticket), None);
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut search = SearchController::new();
        let ticket = search.on_query_changed("acme").unwrap();
        search.on_debounce_fired(ticket);
        let stale = search.on_query_changed("acme shop").unwrap();

        search.clear();
        assert_eq!(search.query(), "");
        assert_eq!(search.last_sent(), "");
        assert!(!search.is_pending());
        assert_eq!(search.on_debounce_fired(stale), None);
    }
}
