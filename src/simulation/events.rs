//! Buffered lifecycle events.
//!
//! Reproduction and death are decided while iterating the population but
//! applied only after the iteration finishes, so the collection is never
//! mutated while it is being walked.

/// Structural changes requested during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// The agent at `parent` has enough health to reproduce.
    Reproduce {
        /// Index of the parent in the pre-tick population.
        parent: usize,
    },
    /// The agent at `index` fell below the death threshold.
    Died {
        /// Index of the agent in the pre-tick population.
        index: usize,
    },
}

/// Queue for collecting lifecycle events during a tick.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: Vec<LifecycleEvent>,
}

impl EventQueue {
    /// Creates an empty event queue.
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Adds an event to the queue.
    pub fn push(&mut self, event: LifecycleEvent) {
        self.events.push(event);
    }

    /// Number of queued events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether no events are queued.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Drains all events from the queue.
    pub fn drain(&mut self) -> std::vec::Drain<'_, LifecycleEvent> {
        self.events.drain(..)
    }
}
