//! Bounded history of recent lifecycle events, newest first.

use std::collections::VecDeque;
use std::fmt;

/// What kind of thing happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A child was born.
    Birth,
    /// An agent died.
    Death,
    /// A random agent immigrated.
    Immigration,
    /// A predator drained a victim.
    Predation,
    /// A healer restored a plant.
    Healing,
}

/// One entry in the [`EventLog`].
#[derive(Debug, Clone, PartialEq)]
pub struct LoggedEvent {
    /// Tick the event happened in.
    pub tick: u64,
    /// Category.
    pub kind: EventKind,
    /// Human-readable text.
    pub description: String,
}

impl fmt::Display for LoggedEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.tick, self.description)
    }
}

/// Ring of the most recent events. Older entries fall off once `capacity`
/// is reached.
#[derive(Debug, Clone)]
pub struct EventLog {
    entries: VecDeque<LoggedEvent>,
    capacity: usize,
}

impl EventLog {
    /// Creates a log holding at most `capacity` events.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Records an event.
    pub fn log(&mut self, tick: u64, description: String, kind: EventKind) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_back();
        }
        self.entries.push_front(LoggedEvent {
            tick,
            kind,
            description,
        });
    }

    /// The `n` most recent events, newest first.
    pub fn latest(&self, n: usize) -> impl Iterator<Item = &LoggedEvent> {
        self.entries.iter().take(n)
    }

    /// All held events, newest first.
    pub fn events(&self) -> &VecDeque<LoggedEvent> {
        &self.entries
    }

    /// Number of held events of `kind`.
    pub fn count(&self, kind: EventKind) -> usize {
        self.entries.iter().filter(|e| e.kind == kind).count()
    }

    /// Drops every held event.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
