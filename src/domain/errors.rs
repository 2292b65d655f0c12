use derive_more::Display;

/// Flat error type for the whole crate.
///
/// Range math never fails: empty sequences and inverted or negative
/// range requests are normalized by the viewport, not reported here.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum AppError {
    /// A boundary load was rejected by the fetch capability.
    #[display(fmt = "Fetch failure: {}", _0)]
    FetchFailure(String),
    /// Durable storage could not be read or written.
    #[display(fmt = "Persistence error: {}", _0)]
    Persistence(String),
    #[display(fmt = "Configuration error: {}", _0)]
    Configuration(String),
    /// The session was torn down before the operation could apply.
    #[display(fmt = "Session closed")]
    SessionClosed,
}

impl std::error::Error for AppError {}

pub type FetchResult<T> = Result<T, AppError>;
pub type AppResult<T> = Result<T, AppError>;
