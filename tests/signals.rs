use futures::executor::block_on;
use futures::future::{FutureExt, LocalBoxFuture};
use leptos::*;
use scroll_chart_wasm::application::{ChartCommand, ChartSession, CommandOutcome};
use scroll_chart_wasm::config::SessionConfig;
use scroll_chart_wasm::domain::{
    errors::{AppError, FetchResult},
    loading::{FetchRequest, PointFetcher},
    series::{Point, Ticker, Timestamp},
    viewport::VisibleRange,
};
use scroll_chart_wasm::infrastructure::MockFeed;
use scroll_chart_wasm::presentation::{ChartSignals, run_and_sync};
use std::rc::Rc;

const END: i64 = 1_700_000_000_000;

fn attached(count: usize) -> (Rc<ChartSession>, ChartSignals) {
    let series = MockFeed::seed(Ticker::Btc, count, Timestamp::from_millis(END));
    let session = Rc::new(ChartSession::new(series, SessionConfig::default()).with_fetcher(Rc::new(MockFeed::new())));
    let signals = ChartSignals::attach(&session);
    (session, signals)
}

#[test]
fn signals_start_from_the_seeded_window() {
    let (_session, signals) = attached(120);
    assert_eq!(signals.range.get_untracked(), VisibleRange::new(84, 119));
    assert_eq!(signals.point_count.get_untracked(), 120);
    assert_eq!(signals.position_label.get_untracked(), "85 - 120 of 120");
    assert!(signals.is_at_end.get_untracked());
    assert!(!signals.is_loading.get_untracked());
}

#[test]
fn signals_follow_commands_and_loads() {
    let (session, signals) = attached(36);

    block_on(session.pan_left()).unwrap();
    assert_eq!(signals.range.get_untracked(), VisibleRange::new(20, 55));
    assert_eq!(signals.point_count.get_untracked(), 56);
    assert_eq!(signals.visible.with_untracked(|v| v.len()), 36);

    session.zoom_in().unwrap();
    assert_eq!(signals.range.get_untracked(), session.range());
}

#[test]
fn ticker_switch_updates_signals() {
    let (session, signals) = attached(120);
    session.switch_ticker(MockFeed::seed(Ticker::Sol, 50, Timestamp::from_millis(END))).unwrap();
    assert_eq!(signals.ticker.get_untracked(), Ticker::Sol);
    assert_eq!(signals.point_count.get_untracked(), 50);
    assert_eq!(signals.range.get_untracked(), VisibleRange::new(14, 49));
}

struct Unreachable;

impl PointFetcher for Unreachable {
    fn request_more(&self, _request: FetchRequest) -> LocalBoxFuture<'static, FetchResult<Vec<Point>>> {
        async { Err(AppError::FetchFailure("host unreachable".to_string())) }.boxed_local()
    }
}

#[test]
fn keyboard_commands_sync_signals() {
    let (session, signals) = attached(120);
    let outcome = block_on(run_and_sync(&session, signals, ChartCommand::PanLeft));
    assert_eq!(outcome, Some(CommandOutcome::Moved(VisibleRange::new(74, 109))));
    assert_eq!(signals.position_label.get_untracked(), "75 - 110 of 120");
}

#[test]
fn failed_command_surfaces_as_last_error() {
    let series = MockFeed::seed(Ticker::Btc, 36, Timestamp::from_millis(END));
    let session = ChartSession::new(series, SessionConfig::default()).with_fetcher(Rc::new(Unreachable));
    let signals = ChartSignals::new(&session.snapshot());

    let outcome = block_on(run_and_sync(&session, signals, ChartCommand::PanLeft));
    assert_eq!(outcome, None);
    assert!(signals.last_error.get_untracked().unwrap().contains("host unreachable"));
    assert!(!signals.is_loading.get_untracked());
    assert_eq!(signals.range.get_untracked(), VisibleRange::new(0, 35));
}

#[test]
fn commands_after_close_leave_signals_consistent() {
    let (session, signals) = attached(120);
    session.close();
    assert_eq!(block_on(run_and_sync(&session, signals, ChartCommand::ZoomIn)), None);
    assert_eq!(signals.range.get_untracked(), VisibleRange::new(84, 119));
}
