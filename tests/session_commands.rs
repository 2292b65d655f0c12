use futures::executor::block_on;
use scroll_chart_wasm::application::{ChartCommand, ChartSession, CommandOutcome};
use scroll_chart_wasm::config::SessionConfig;
use scroll_chart_wasm::domain::{
    events::SessionEvent,
    series::{Point, PriceSeries, Ticker, Timestamp},
    viewport::{Direction, VisibleRange},
};
use scroll_chart_wasm::infrastructure::MockFeed;
use std::cell::RefCell;
use std::rc::Rc;

const END: i64 = 1_700_000_000_000;

fn session(count: usize) -> ChartSession {
    ChartSession::new(MockFeed::seed(Ticker::Btc, count, Timestamp::from_millis(END)), SessionConfig::default())
}

fn run(session: &ChartSession, command: ChartCommand) -> VisibleRange {
    block_on(session.execute(command)).unwrap().range().unwrap()
}

#[test]
fn seeded_session_shows_latest_36_points() {
    let session = session(120);
    assert_eq!(session.range(), VisibleRange::new(84, 119));
    assert_eq!(session.visible_points().len(), 36);
    assert_eq!(session.snapshot().position_label(), "85 - 120 of 120");
}

#[test]
fn walk_through_a_120_point_series() {
    let session = session(120);

    assert_eq!(run(&session, ChartCommand::PanLeft), VisibleRange::new(74, 109));
    assert_eq!(run(&session, ChartCommand::PanRight), VisibleRange::new(84, 119));
    // Flush with the end and no loader: nothing moves.
    assert_eq!(run(&session, ChartCommand::PanRight), VisibleRange::new(84, 119));
    assert_eq!(run(&session, ChartCommand::ZoomOut), VisibleRange::new(74, 119));

    assert_eq!(run(&session, ChartCommand::ResetToLatest), VisibleRange::new(74, 119));
}

#[test]
fn reset_then_zoom_in_on_a_50_point_window() {
    let session = session(120);

    // A 50-point window scrolled back snaps to the last 50 points.
    session.set_range(60, 109).unwrap();
    assert_eq!(run(&session, ChartCommand::ResetToLatest), VisibleRange::new(70, 119));
    assert_eq!(run(&session, ChartCommand::ZoomIn), VisibleRange::new(77, 111));
    assert_eq!(session.visible_points().len(), 35);
}

#[test]
fn zoom_is_bounded_both_ways() {
    let session = session(120);
    for _ in 0..30 {
        session.zoom_in().unwrap();
    }
    assert_eq!(session.range().width(), 10);

    for _ in 0..30 {
        session.zoom_out().unwrap();
    }
    assert_eq!(session.range(), VisibleRange::new(0, 119));
}

#[test]
fn short_sequence_degrades_gracefully() {
    let session = session(5);
    assert_eq!(session.range(), VisibleRange::new(0, 4));
    assert_eq!(run(&session, ChartCommand::PanLeft), VisibleRange::new(0, 4));
    assert_eq!(run(&session, ChartCommand::ZoomIn), VisibleRange::new(0, 4));

    let empty = ChartSession::new(PriceSeries::empty(Ticker::Sol), SessionConfig::default());
    assert_eq!(run(&empty, ChartCommand::ZoomOut), VisibleRange::default());
    assert!(empty.visible_points().is_empty());
    assert_eq!(empty.snapshot().position_label(), "1 - 1 of 0");
}

#[test]
fn out_of_range_requests_are_clamped() {
    let session = session(120);
    assert_eq!(session.set_range(-30, 5).unwrap(), VisibleRange::new(0, 35));
    assert_eq!(session.set_range(500, 400).unwrap(), VisibleRange::new(19, 119));
}

#[test]
fn ingest_before_window_keeps_points_on_screen() {
    let session = session(40);
    let before = session.visible_points();
    let first = session.points()[0];

    let older: Vec<Point> = (1..=5).map(|i| Point::new(first.t.offset(-i * 3_600_000), first.y)).collect();
    assert_eq!(session.ingest(&older).unwrap(), 5);
    assert_eq!(session.visible_points(), before);
    assert_eq!(session.range(), VisibleRange::new(9, 44));

    // Re-ingesting the same points adds nothing.
    assert_eq!(session.ingest(&older).unwrap(), 0);
}

#[test]
fn events_describe_every_change() {
    let session = session(36).with_fetcher(Rc::new(MockFeed::new()));
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    session.subscribe(move |event| sink.borrow_mut().push(event.clone()));

    block_on(session.pan_left()).unwrap();
    session.zoom_in().unwrap();

    let seen = seen.borrow();
    assert_eq!(seen[0], SessionEvent::LoadStarted { direction: Direction::Left });
    assert_eq!(seen[1], SessionEvent::LoadFinished { direction: Direction::Left, added: 20, len: 56 });
    assert_eq!(
        seen[2],
        SessionEvent::RangeChanged { old_range: VisibleRange::new(0, 35), new_range: VisibleRange::new(20, 55) }
    );
    assert!(matches!(seen[3], SessionEvent::RangeChanged { .. }));
    assert_eq!(seen.len(), 4);
}

#[test]
fn key_presses_map_to_commands() {
    let session = session(120);
    let command = ChartCommand::from_key("ArrowLeft").unwrap();
    let outcome = block_on(session.execute(command)).unwrap();
    assert_eq!(outcome, CommandOutcome::Moved(VisibleRange::new(74, 109)));
}

#[test]
fn snapshot_view_model() {
    let points: Vec<Point> = (0..12).map(|i| Point::at(i * 3_600_000, 25.0 * i as f64)).collect();
    let session = ChartSession::new(PriceSeries::new(Ticker::Sol, points), SessionConfig::default());
    session.set_range(8, 11).unwrap();

    let snapshot = serde_json::to_value(session.snapshot()).unwrap();
    insta::assert_json_snapshot!(snapshot, @r###"
    {
      "can_scroll_left": true,
      "can_scroll_right": false,
      "is_at_end": true,
      "last_error": null,
      "len": 12,
      "loading_left": "idle",
      "loading_right": "idle",
      "range": [
        8,
        11
      ],
      "stats": {
        "change": 75.0,
        "change_pct": 37.5,
        "first": 200.0,
        "high": 275.0,
        "last": 275.0,
        "low": 200.0
      },
      "ticker": "SOL",
      "visible": [
        {
          "t": 28800000,
          "y": 200.0
        },
        {
          "t": 32400000,
          "y": 225.0
        },
        {
          "t": 36000000,
          "y": 250.0
        },
        {
          "t": 39600000,
          "y": 275.0
        }
      ]
    }
    "###);
}
