use crate::application::{ChartCommand, ChartSession, ChartSnapshot, CommandOutcome};
use crate::domain::{
    events::DomainEvent,
    logging::LogComponent,
    series::{Point, Ticker},
    viewport::VisibleRange,
};
use crate::event_utils::{EventOptions, WindowEventListenerHandle, window_event_listener_with_options};
use crate::infrastructure::DebounceTimer;
use crate::{log_debug, log_warn};
use leptos::*;
use std::rc::{Rc, Weak};

const COMPONENT: LogComponent = LogComponent::Presentation("ChartSignals");

/// Reactive view of one chart session for Leptos components
#[derive(Clone, Copy)]
pub struct ChartSignals {
    pub ticker: RwSignal<Ticker>,
    pub range: RwSignal<VisibleRange>,
    pub point_count: RwSignal<usize>,
    pub visible: RwSignal<Vec<Point>>,
    pub is_loading: RwSignal<bool>,
    pub can_scroll_left: RwSignal<bool>,
    pub can_scroll_right: RwSignal<bool>,
    pub is_at_end: RwSignal<bool>,
    pub last_error: RwSignal<Option<String>>,
    pub position_label: RwSignal<String>,
}

impl ChartSignals {
    pub fn new(snapshot: &ChartSnapshot) -> Self {
        Self {
            ticker: create_rw_signal(snapshot.ticker),
            range: create_rw_signal(snapshot.range),
            point_count: create_rw_signal(snapshot.len),
            visible: create_rw_signal(snapshot.visible.clone()),
            is_loading: create_rw_signal(snapshot.is_loading()),
            can_scroll_left: create_rw_signal(snapshot.can_scroll_left),
            can_scroll_right: create_rw_signal(snapshot.can_scroll_right),
            is_at_end: create_rw_signal(snapshot.is_at_end),
            last_error: create_rw_signal(snapshot.last_error.clone()),
            position_label: create_rw_signal(snapshot.position_label()),
        }
    }

    /// Signals that follow `session`: every session event re-syncs them
    pub fn attach(session: &Rc<ChartSession>) -> Self {
        let signals = Self::new(&session.snapshot());
        let weak: Weak<ChartSession> = Rc::downgrade(session);
        session.subscribe(move |event| {
            if let Some(session) = weak.upgrade() {
                log_debug!(COMPONENT, "sync on {}", event.event_type());
                signals.sync(&session.snapshot());
            }
        });
        signals
    }

    pub fn sync(&self, snapshot: &ChartSnapshot) {
        self.ticker.set(snapshot.ticker);
        self.range.set(snapshot.range);
        self.point_count.set(snapshot.len);
        self.visible.set(snapshot.visible.clone());
        self.is_loading.set(snapshot.is_loading());
        self.can_scroll_left.set(snapshot.can_scroll_left);
        self.can_scroll_right.set(snapshot.can_scroll_right);
        self.is_at_end.set(snapshot.is_at_end);
        self.last_error.set(snapshot.last_error.clone());
        self.position_label.set(snapshot.position_label());
    }
}

/// Run `command` and push the resulting state into `signals`.
/// A failed command is logged; its error also reaches `signals.last_error`
/// when the session recorded it.
pub async fn run_and_sync(session: &ChartSession, signals: ChartSignals, command: ChartCommand) -> Option<CommandOutcome> {
    let outcome = match session.execute(command).await {
        Ok(outcome) => Some(outcome),
        Err(e) => {
            log_warn!(COMPONENT, "{} failed: {}", command, e);
            None
        }
    };
    signals.sync(&session.snapshot());
    outcome
}

/// Route window keydown events to `session`. Drop the listener with
/// [`WindowEventListenerHandle::remove`].
pub fn bind_keyboard(
    session: Rc<ChartSession>,
    signals: ChartSignals,
    timer: Option<Rc<DebounceTimer>>,
) -> WindowEventListenerHandle {
    window_event_listener_with_options(ev::keydown, &EventOptions::active(), move |event| {
        let Some(command) = ChartCommand::from_key(&event.key()) else {
            return;
        };
        event.prevent_default();
        let session = Rc::clone(&session);
        let timer = timer.clone();
        spawn_local(async move {
            run_and_sync(&session, signals, command).await;
            if let Some(timer) = &timer {
                timer.arm();
            }
        });
    })
}
