use crate::domain::series::Ticker;
use crate::domain::viewport::{Direction, VisibleRange};
use std::fmt::Debug;

/// Base trait for all domain events
pub trait DomainEvent: Debug + Clone {
    fn event_type(&self) -> &'static str;
}

/// Observable changes of a chart session
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    RangeChanged {
        old_range: VisibleRange,
        new_range: VisibleRange,
    },
    LoadStarted {
        direction: Direction,
    },
    LoadFinished {
        direction: Direction,
        added: usize,
        len: usize,
    },
    LoadFailed {
        direction: Direction,
        reason: String,
    },
    /// A load resolved after the session moved on; its result was dropped
    LoadDiscarded {
        direction: Direction,
    },
    TickerSwitched {
        ticker: Ticker,
        len: usize,
    },
    Closed,
}

impl DomainEvent for SessionEvent {
    fn event_type(&self) -> &'static str {
        match self {
            SessionEvent::RangeChanged { .. } => "RangeChanged",
            SessionEvent::LoadStarted { .. } => "LoadStarted",
            SessionEvent::LoadFinished { .. } => "LoadFinished",
            SessionEvent::LoadFailed { .. } => "LoadFailed",
            SessionEvent::LoadDiscarded { .. } => "LoadDiscarded",
            SessionEvent::TickerSwitched { .. } => "TickerSwitched",
            SessionEvent::Closed => "Closed",
        }
    }
}

/// Event dispatcher for publishing events
pub trait EventDispatcher {
    fn publish(&self, event: SessionEvent);
}

/// Simple in-memory event dispatcher
#[derive(Default)]
pub struct InMemoryEventDispatcher {
    handlers: Vec<Box<dyn Fn(&SessionEvent)>>,
}

impl InMemoryEventDispatcher {
    pub fn new() -> Self {
        Self { handlers: Vec::new() }
    }

    pub fn subscribe<F>(&mut self, handler: F)
    where
        F: Fn(&SessionEvent) + 'static,
    {
        self.handlers.push(Box::new(handler));
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }
}

impl EventDispatcher for InMemoryEventDispatcher {
    fn publish(&self, event: SessionEvent) {
        for handler in &self.handlers {
            handler(&event);
        }
    }
}
