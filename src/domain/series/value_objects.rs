use derive_more::{Constructor, Display, From, Into};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display as StrumDisplay, EnumIter, EnumString};

/// One hour in milliseconds, the spacing of generated series.
pub const HOUR_MS: i64 = 3_600_000;

/// Value Object - point timestamp in unix milliseconds, the unique key of a point
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, From, Into, Constructor, Display, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn from_millis(value: i64) -> Self {
        Self(value)
    }

    /// Shift by a signed number of milliseconds
    pub fn offset(&self, delta_ms: i64) -> Self {
        Self(self.0.saturating_add(delta_ms))
    }
}

/// Value Object - price value of a point
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, From, Into, Constructor, Display, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(f64);

impl Price {
    pub fn value(&self) -> f64 {
        self.0
    }

    /// Round to whole cents
    pub fn round_cents(&self) -> Self {
        Self((self.0 * 100.0).round() / 100.0)
    }
}

/// Value Object - asset whose series is being viewed
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, StrumDisplay, EnumIter, EnumString, AsRefStr, Serialize, Deserialize,
)]
pub enum Ticker {
    #[default]
    #[strum(serialize = "BTC")]
    #[serde(rename = "BTC")]
    Btc,

    #[strum(serialize = "SOL")]
    #[serde(rename = "SOL")]
    Sol,
}

impl Ticker {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Btc => "Bitcoin",
            Self::Sol => "Solana",
        }
    }

    /// Anchor price for synthetic series
    pub fn base_price(&self) -> f64 {
        match self {
            Self::Btc => 45_000.0,
            Self::Sol => 100.0,
        }
    }

    /// Per-step volatility for synthetic series
    pub fn volatility(&self) -> f64 {
        match self {
            Self::Btc => 2_000.0,
            Self::Sol => 5.0,
        }
    }

    /// The ticker a two-way switch flips to
    pub fn other(&self) -> Self {
        match self {
            Self::Btc => Self::Sol,
            Self::Sol => Self::Btc,
        }
    }
}
