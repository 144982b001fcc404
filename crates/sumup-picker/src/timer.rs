//! Fire-once debounce timers polled by the event loop

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::search::DebounceTicket;

/// Armed timers in deadline order. Timers are never cancelled; the engine
/// decides at fire time whether a ticket is still relevant.
#[derive(Debug, Default)]
pub struct DebounceTimers {
    queue: VecDeque<(Instant, DebounceTicket)>,
}

impl DebounceTimers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arm(&mut self, ticket: DebounceTicket, delay: Duration) {
        self.arm_at(ticket, Instant::now() + delay);
    }

    pub fn arm_at(&mut self, ticket: DebounceTicket, deadline: Instant) {
        // Delays are fixed, so deadlines almost always arrive in order
        let pos = self
            .queue
            .iter()
            .rposition(|(at, _)| *at <= deadline)
            .map(|i| i + 1)
            .unwrap_or(0);
        self.queue.insert(pos, (deadline, ticket));
    }

    /// Remove and return every ticket whose deadline has passed
    pub fn due(&mut self, now: Instant) -> Vec<DebounceTicket> {
        let mut fired = Vec::new();
        while let Some((deadline, ticket)) = self.queue.front().copied() {
            if deadline > now {
                break;
            }
            self.queue.pop_front();
            fired.push(ticket);
        }
        fired
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
