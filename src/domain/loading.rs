use crate::domain::errors::FetchResult;
use crate::domain::series::{Point, Ticker};
use crate::domain::viewport::Direction;
use futures::future::LocalBoxFuture;
use serde::Serialize;

/// Per-edge boundary load state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
}

/// Two independent `idle | loading` machines, one per edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EdgeLoads {
    left: LoadState,
    right: LoadState,
}

impl EdgeLoads {
    pub fn get(&self, direction: Direction) -> LoadState {
        match direction {
            Direction::Left => self.left,
            Direction::Right => self.right,
        }
    }

    /// `idle -> loading`. Returns false, changing nothing, if already loading.
    pub fn try_begin(&mut self, direction: Direction) -> bool {
        let slot = self.slot(direction);
        if *slot == LoadState::Loading {
            return false;
        }
        *slot = LoadState::Loading;
        true
    }

    /// `loading -> idle`, on success and failure alike
    pub fn finish(&mut self, direction: Direction) {
        *self.slot(direction) = LoadState::Idle;
    }

    pub fn any_loading(&self) -> bool {
        self.left == LoadState::Loading || self.right == LoadState::Loading
    }

    fn slot(&mut self, direction: Direction) -> &mut LoadState {
        match direction {
            Direction::Left => &mut self.left,
            Direction::Right => &mut self.right,
        }
    }
}

/// What a fetch capability is asked for
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FetchRequest {
    pub ticker: Ticker,
    pub direction: Direction,
    /// Known point at the requested edge; `None` for an empty sequence
    pub edge: Option<Point>,
    pub count: usize,
}

/// Fetch capability consumed by the boundary loader.
///
/// Must resolve to points strictly beyond `request.edge` in
/// `request.direction`. An empty batch means "no more data".
/// Timeouts, if any, surface as ordinary `Err` values.
pub trait PointFetcher {
    fn request_more(&self, request: FetchRequest) -> LocalBoxFuture<'static, FetchResult<Vec<Point>>>;
}
