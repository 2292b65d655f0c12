use crate::application::commands::{ChartCommand, CommandOutcome};
use crate::config::SessionConfig;
use crate::domain::{
    errors::{AppError, AppResult},
    events::{EventDispatcher, InMemoryEventDispatcher, SessionEvent},
    loading::{EdgeLoads, FetchRequest, LoadState, PointFetcher},
    logging::{LogComponent, LogLevel, get_logger, get_time_provider},
    persistence::{PersistenceBridge, PersistenceConfig},
    series::{Point, PointSequence, PriceSeries, SeriesStats, Ticker, Timestamp},
    viewport::{Direction, VisibleRange, ViewportConfig},
};
use crate::{log_debug, log_info, log_warn};
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;

const COMPONENT: LogComponent = LogComponent::Application("ChartSession");

/// Mutable state of one session. Sequence, range and load flags always
/// change together under one borrow.
struct SessionState {
    ticker: Ticker,
    sequence: PointSequence,
    range: VisibleRange,
    loads: EdgeLoads,
    /// Bumped on ticker switch and close; in-flight loads from an older
    /// generation are discarded when they resolve.
    generation: u64,
    closed: bool,
    last_error: Option<AppError>,
}

/// Resets the edge to idle when a load ends, including when the load
/// future is dropped before resolving.
struct LoadGuard {
    state: Rc<RefCell<SessionState>>,
    direction: Direction,
    generation: u64,
}

impl Drop for LoadGuard {
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.try_borrow_mut() {
            if state.generation == self.generation {
                state.loads.finish(self.direction);
            }
        }
    }
}

/// View-model of a session for rendering layers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSnapshot {
    pub ticker: Ticker,
    pub range: VisibleRange,
    pub len: usize,
    pub visible: Vec<Point>,
    pub stats: SeriesStats,
    pub can_scroll_left: bool,
    pub can_scroll_right: bool,
    pub is_at_end: bool,
    pub loading_left: LoadState,
    pub loading_right: LoadState,
    pub last_error: Option<String>,
}

impl ChartSnapshot {
    pub fn is_loading(&self) -> bool {
        self.loading_left == LoadState::Loading || self.loading_right == LoadState::Loading
    }

    /// 1-based `"start - end of len"`, e.g. `"85 - 120 of 120"`
    pub fn position_label(&self) -> String {
        let cap = self.len.max(1);
        let shown_start = (self.range.start + 1).min(cap);
        let shown_end = (self.range.end + 1).min(cap);
        format!("{} - {} of {}", shown_start, shown_end, self.len)
    }
}

/// One chart session: the point store, the visible window over it and the
/// per-edge boundary loaders, plus optional persistence of the window.
///
/// Single-threaded. Commands that may load are `async`; everything else
/// runs to completion synchronously.
pub struct ChartSession {
    state: Rc<RefCell<SessionState>>,
    fetcher: Option<Rc<dyn PointFetcher>>,
    persistence: Option<Rc<RefCell<PersistenceBridge>>>,
    events: RefCell<InMemoryEventDispatcher>,
    config: SessionConfig,
}

impl ChartSession {
    /// Seed a session from an initial batch; the window starts at the latest points
    pub fn new(series: PriceSeries, config: SessionConfig) -> Self {
        let sequence = PointSequence::from_points(&series.points);
        let range = VisibleRange::latest(config.viewport.initial_width, sequence.len());
        log_info!(
            COMPONENT,
            "session for {} seeded with {} points, window {:?}",
            series.ticker,
            sequence.len(),
            range
        );
        let state = SessionState {
            ticker: series.ticker,
            sequence,
            range,
            loads: EdgeLoads::default(),
            generation: 0,
            closed: false,
            last_error: None,
        };
        Self {
            state: Rc::new(RefCell::new(state)),
            fetcher: None,
            persistence: None,
            events: RefCell::new(InMemoryEventDispatcher::new()),
            config,
        }
    }

    /// Enable boundary loads. Without a fetcher, reaching an edge is a no-op.
    pub fn with_fetcher(mut self, fetcher: Rc<dyn PointFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Persist the window through `bridge`, restoring a previously stored one.
    /// A stored `[0, 0]` or an undecodable value keeps the latest-points window.
    pub fn with_persistence(mut self, bridge: PersistenceBridge) -> Self {
        let stored: VisibleRange = bridge.read(&self.config.persistence.range_key, VisibleRange::default());
        if stored != VisibleRange::default() {
            let mut state = self.state.borrow_mut();
            state.range = stored.clamped(state.sequence.len());
            log_debug!(COMPONENT, "restored window {:?} from {:?}", state.range, stored);
        }
        self.persistence = Some(Rc::new(RefCell::new(bridge)));
        self
    }

    /// Ticker selection stored by a previous session, or `fallback`
    pub fn persisted_ticker(bridge: &PersistenceBridge, config: &PersistenceConfig, fallback: Ticker) -> Ticker {
        bridge.read(&config.ticker_key, fallback)
    }

    pub fn subscribe<F>(&self, handler: F)
    where
        F: Fn(&SessionEvent) + 'static,
    {
        self.events.borrow_mut().subscribe(handler);
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn has_fetcher(&self) -> bool {
        self.fetcher.is_some()
    }

    pub fn persistence(&self) -> Option<Rc<RefCell<PersistenceBridge>>> {
        self.persistence.clone()
    }

    pub fn ticker(&self) -> Ticker {
        self.state.borrow().ticker
    }

    pub fn range(&self) -> VisibleRange {
        self.state.borrow().range
    }

    pub fn len(&self) -> usize {
        self.state.borrow().sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.borrow().sequence.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.state.borrow().closed
    }

    pub fn load_state(&self, direction: Direction) -> LoadState {
        self.state.borrow().loads.get(direction)
    }

    pub fn last_error(&self) -> Option<AppError> {
        self.state.borrow().last_error.clone()
    }

    /// Copy of the whole known sequence
    pub fn points(&self) -> Vec<Point> {
        self.state.borrow().sequence.points().to_vec()
    }

    /// Copy of the points inside the window
    pub fn visible_points(&self) -> Vec<Point> {
        let state = self.state.borrow();
        state.sequence.slice(state.range).to_vec()
    }

    pub fn snapshot(&self) -> ChartSnapshot {
        let state = self.state.borrow();
        let len = state.sequence.len();
        let visible = state.sequence.slice(state.range).to_vec();
        ChartSnapshot {
            ticker: state.ticker,
            range: state.range,
            len,
            stats: SeriesStats::from_points(&visible),
            visible,
            can_scroll_left: !state.range.is_at_start() || self.fetcher.is_some(),
            can_scroll_right: !state.range.is_at_end(len) || self.fetcher.is_some(),
            is_at_end: state.range.is_at_end(len),
            loading_left: state.loads.get(Direction::Left),
            loading_right: state.loads.get(Direction::Right),
            last_error: state.last_error.as_ref().map(|e| e.to_string()),
        }
    }

    /// Run one logical command
    pub async fn execute(&self, command: ChartCommand) -> AppResult<CommandOutcome> {
        log_debug!(COMPONENT, "command {}", command);
        match command {
            ChartCommand::PanLeft => self.pan_left().await,
            ChartCommand::PanRight => self.pan_right().await,
            ChartCommand::ZoomIn => self.zoom_in().map(CommandOutcome::Moved),
            ChartCommand::ZoomOut => self.zoom_out().map(CommandOutcome::Moved),
            ChartCommand::ResetToLatest => self.reset_to_latest().map(CommandOutcome::Moved),
        }
    }

    /// Pan back `pan_step` points, or load older points when already at the start
    pub async fn pan_left(&self) -> AppResult<CommandOutcome> {
        let at_edge = self.state.borrow().range.is_at_start();
        if at_edge && self.fetcher.is_some() {
            return self.load_edge(Direction::Left).await;
        }
        self.update_range(|range, len, vp| range.pan_left(vp.pan_step, len))
            .map(CommandOutcome::Moved)
    }

    /// Pan forward `pan_step` points, or load newer points when already at the end
    pub async fn pan_right(&self) -> AppResult<CommandOutcome> {
        let at_edge = {
            let state = self.state.borrow();
            state.range.is_at_end(state.sequence.len())
        };
        if at_edge && self.fetcher.is_some() {
            return self.load_edge(Direction::Right).await;
        }
        self.update_range(|range, len, vp| range.pan_right(vp.pan_step, len))
            .map(CommandOutcome::Moved)
    }

    pub fn zoom_in(&self) -> AppResult<VisibleRange> {
        self.update_range(|range, len, vp| range.zoom_in(len, vp))
    }

    pub fn zoom_out(&self) -> AppResult<VisibleRange> {
        self.update_range(|range, len, vp| range.zoom_out(len, vp))
    }

    /// Keep the current width, showing the newest points
    pub fn reset_to_latest(&self) -> AppResult<VisibleRange> {
        self.update_range(|range, len, _| VisibleRange::latest(range.width(), len))
    }

    /// Request an arbitrary window; it is normalized and clamped, never rejected
    pub fn set_range(&self, start: i64, end: i64) -> AppResult<VisibleRange> {
        self.update_range(|_, len, _| crate::domain::viewport::clamp_range(start, end, len))
    }

    /// Merge points pushed from outside a boundary load (e.g. a live feed).
    ///
    /// Points landing before the window shift it so the same points stay on
    /// screen; points appended after it never move it. Returns how many
    /// points were new.
    pub fn ingest(&self, points: &[Point]) -> AppResult<usize> {
        let (added, old_range, new_range) = {
            let mut state = self.state.borrow_mut();
            if state.closed {
                return Err(AppError::SessionClosed);
            }
            let merged = state.sequence.integrate(points);
            let added = merged.len() - state.sequence.len();
            let old_range = state.range;
            let new_range = anchor_range(&state.sequence, &merged, old_range, &self.config.viewport);
            state.sequence = merged;
            state.range = new_range;
            (added, old_range, new_range)
        };
        log_debug!(COMPONENT, "ingested {} new points", added);
        self.after_range_change(old_range, new_range);
        Ok(added)
    }

    /// Replace the series with a freshly seeded one for `series.ticker`.
    ///
    /// Any in-flight load belongs to the old series and is discarded when it
    /// resolves. The ticker choice is persisted immediately.
    pub fn switch_ticker(&self, series: PriceSeries) -> AppResult<()> {
        let (old_range, new_range, len) = {
            let mut state = self.state.borrow_mut();
            if state.closed {
                return Err(AppError::SessionClosed);
            }
            state.generation += 1;
            state.loads = EdgeLoads::default();
            state.last_error = None;
            state.ticker = series.ticker;
            state.sequence = PointSequence::from_points(&series.points);
            let old_range = state.range;
            state.range = VisibleRange::latest(self.config.viewport.initial_width, state.sequence.len());
            (old_range, state.range, state.sequence.len())
        };
        if let Some(bridge) = &self.persistence {
            bridge.borrow_mut().write(&self.config.persistence.ticker_key, &series.ticker);
        }
        log_info!(COMPONENT, "switched to {} ({}) with {} points", series.ticker, series.ticker.name(), len);
        self.publish(SessionEvent::TickerSwitched { ticker: series.ticker, len });
        self.after_range_change(old_range, new_range);
        Ok(())
    }

    /// Tear the session down. Pending persistence is flushed; loads still in
    /// flight are discarded when they resolve. Idempotent.
    pub fn close(&self) {
        {
            let mut state = self.state.borrow_mut();
            if state.closed {
                return;
            }
            state.closed = true;
            state.generation += 1;
            state.loads = EdgeLoads::default();
        }
        if let Some(bridge) = &self.persistence {
            bridge.borrow_mut().flush();
        }
        log_info!(COMPONENT, "session closed");
        self.publish(SessionEvent::Closed);
    }

    /// Write debounced values whose quiet period has elapsed
    pub fn flush_due_persistence(&self, now_ms: u64) -> usize {
        match &self.persistence {
            Some(bridge) => bridge.borrow_mut().flush_due(now_ms),
            None => 0,
        }
    }

    fn update_range<F>(&self, op: F) -> AppResult<VisibleRange>
    where
        F: FnOnce(VisibleRange, usize, &ViewportConfig) -> VisibleRange,
    {
        let (old_range, new_range) = {
            let mut state = self.state.borrow_mut();
            if state.closed {
                return Err(AppError::SessionClosed);
            }
            let old_range = state.range;
            state.range = op(old_range, state.sequence.len(), &self.config.viewport);
            (old_range, state.range)
        };
        self.after_range_change(old_range, new_range);
        Ok(new_range)
    }

    async fn load_edge(&self, direction: Direction) -> AppResult<CommandOutcome> {
        let Some(fetcher) = self.fetcher.clone() else {
            return Ok(CommandOutcome::Moved(self.range()));
        };

        let (request, generation) = {
            let mut state = self.state.borrow_mut();
            if state.closed {
                return Err(AppError::SessionClosed);
            }
            if !state.loads.try_begin(direction) {
                log_debug!(COMPONENT, "{} load already in flight, request dropped", direction);
                return Ok(CommandOutcome::LoadInFlight);
            }
            let edge = match direction {
                Direction::Left => state.sequence.first().copied(),
                Direction::Right => state.sequence.last().copied(),
            };
            let request = FetchRequest {
                ticker: state.ticker,
                direction,
                edge,
                count: self.config.viewport.batch_size,
            };
            (request, state.generation)
        };

        log_info!(COMPONENT, "loading {} points to the {}", request.count, direction);
        self.publish(SessionEvent::LoadStarted { direction });

        let guard = LoadGuard { state: Rc::clone(&self.state), direction, generation };
        let result = fetcher.request_more(request).await;
        drop(guard);

        let mut state = self.state.borrow_mut();
        if state.closed || state.generation != generation {
            drop(state);
            log_info!(COMPONENT, "{} load resolved after the session moved on, result dropped", direction);
            self.publish(SessionEvent::LoadDiscarded { direction });
            return Ok(CommandOutcome::Discarded);
        }

        let batch = match result {
            Ok(batch) => batch,
            Err(e) => {
                state.last_error = Some(e.clone());
                drop(state);
                log_warn!(COMPONENT, "{} load failed: {}", direction, e);
                self.publish(SessionEvent::LoadFailed { direction, reason: e.to_string() });
                return Err(e);
            }
        };

        state.last_error = None;
        let merged = state.sequence.integrate(&batch);
        let old_range = state.range;
        let anchored = anchor_range(&state.sequence, &merged, old_range, &self.config.viewport);
        let (added, new_range) = match direction {
            Direction::Left => {
                let added = edge_count(state.sequence.first().map(|p| p.t), &merged, |seq, t| seq.count_before(t));
                (added, anchored)
            }
            Direction::Right => {
                let added = edge_count(state.sequence.last().map(|p| p.t), &merged, |seq, t| seq.count_after(t));
                let range = if state.sequence.is_empty() {
                    anchored
                } else {
                    anchored.shifted_right(added.min(self.config.viewport.pan_step), merged.len())
                };
                (added, range)
            }
        };
        let len = merged.len();
        state.sequence = merged;
        state.range = new_range;
        drop(state);

        get_logger().log_with_metadata(
            LogLevel::Info,
            COMPONENT,
            "boundary load merged",
            &format!("direction={} added={} len={} range={:?}", direction, added, len, new_range),
        );
        self.publish(SessionEvent::LoadFinished { direction, added, len });
        self.after_range_change(old_range, new_range);
        Ok(CommandOutcome::Loaded { direction, added, range: new_range })
    }

    fn after_range_change(&self, old_range: VisibleRange, new_range: VisibleRange) {
        if old_range == new_range {
            return;
        }
        if let Some(bridge) = &self.persistence {
            let now = get_time_provider().current_timestamp();
            bridge
                .borrow_mut()
                .write_debounced(&self.config.persistence.range_key, &new_range, now);
        }
        self.publish(SessionEvent::RangeChanged { old_range, new_range });
    }

    fn publish(&self, event: SessionEvent) {
        self.events.borrow().publish(event);
    }
}

/// Window over `merged` showing the same points `range` showed over `old`.
///
/// New points inserted before the window's first point shift both ends;
/// an empty old sequence gets a fresh latest-points window.
fn anchor_range(old: &PointSequence, merged: &PointSequence, range: VisibleRange, vp: &ViewportConfig) -> VisibleRange {
    let Some(anchor) = old.points().get(range.start) else {
        return VisibleRange::latest(vp.initial_width, merged.len());
    };
    let inserted_before = merged.count_before(anchor.t) - range.start;
    range.after_prepend(inserted_before, merged.len())
}

fn edge_count<F>(edge: Option<Timestamp>, merged: &PointSequence, count: F) -> usize
where
    F: Fn(&PointSequence, Timestamp) -> usize,
{
    match edge {
        Some(t) => count(merged, t),
        None => merged.len(),
    }
}
