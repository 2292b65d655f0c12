use crate::domain::{
    errors::FetchResult,
    loading::{FetchRequest, PointFetcher},
    logging::LogComponent,
    series::{HOUR_MS, Point, Price, PriceSeries, Ticker, Timestamp},
    viewport::Direction,
};
use crate::log_debug;
use futures::future::{FutureExt, LocalBoxFuture};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Synthetic hourly price feed.
///
/// Output depends only on the ticker, the requested end time and the
/// starting price, so the same request always yields the same points.
#[derive(Debug, Clone, Default)]
pub struct MockFeed {
    latency_ms: u32,
}

impl MockFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every boundary load. Only takes effect in the browser.
    pub fn with_latency(mut self, latency_ms: u32) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    pub fn latency_ms(&self) -> u32 {
        self.latency_ms
    }

    /// `count` hourly points, the last one at `end_at`, walking from the
    /// ticker's base price
    pub fn seed(ticker: Ticker, count: usize, end_at: Timestamp) -> PriceSeries {
        PriceSeries::new(ticker, generate(ticker, count, end_at, None))
    }

    /// `count` points ending one hour before `first`, continuing from its price
    pub fn older_than(ticker: Ticker, first: &Point, count: usize) -> Vec<Point> {
        generate(ticker, count, first.t.offset(-HOUR_MS), Some(first.y.value()))
    }

    /// `count` points starting one hour after `last`, continuing from its price
    pub fn newer_than(ticker: Ticker, last: &Point, count: usize) -> Vec<Point> {
        let end_at = last.t.offset(HOUR_MS.saturating_mul(count as i64));
        generate(ticker, count, end_at, Some(last.y.value()))
    }
}

impl PointFetcher for MockFeed {
    fn request_more(&self, request: FetchRequest) -> LocalBoxFuture<'static, FetchResult<Vec<Point>>> {
        let latency_ms = self.latency_ms;
        async move {
            #[cfg(target_arch = "wasm32")]
            if latency_ms > 0 {
                gloo_timers::future::TimeoutFuture::new(latency_ms).await;
            }
            #[cfg(not(target_arch = "wasm32"))]
            let _ = latency_ms;

            let Some(edge) = request.edge else {
                return Ok(Vec::new());
            };
            let batch = match request.direction {
                Direction::Left => MockFeed::older_than(request.ticker, &edge, request.count),
                Direction::Right => MockFeed::newer_than(request.ticker, &edge, request.count),
            };
            log_debug!(
                LogComponent::Infrastructure("MockFeed"),
                "{} {} points for {}",
                batch.len(),
                request.direction,
                request.ticker
            );
            Ok(batch)
        }
        .boxed_local()
    }
}

fn generate(ticker: Ticker, count: usize, end_at: Timestamp, start_price: Option<f64>) -> Vec<Point> {
    let base = ticker.base_price();
    let vol = ticker.volatility();
    let floor = base * 0.7;
    let mut rng = StdRng::seed_from_u64(seed_for(ticker, end_at));
    let mut price = start_price.unwrap_or(base);
    let start_at = end_at.offset(-HOUR_MS.saturating_mul(count.saturating_sub(1) as i64));

    (0..count)
        .map(|i| {
            let trend = (i as f64 / 10.0).sin() * vol * 0.1;
            let noise = rng.gen_range(-0.5..0.5) * vol;
            price = (price + trend + noise).max(floor);
            Point::new(start_at.offset(i as i64 * HOUR_MS), Price::from(price).round_cents())
        })
        .collect()
}

fn seed_for(ticker: Ticker, end_at: Timestamp) -> u64 {
    let salt: u64 = match ticker {
        Ticker::Btc => 0x9e37_79b9_7f4a_7c15,
        Ticker::Sol => 0xc2b2_ae3d_27d4_eb4f,
    };
    salt ^ end_at.value() as u64
}
