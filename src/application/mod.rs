pub mod commands;
pub mod session;

pub use commands::{ChartCommand, CommandOutcome};
pub use session::{ChartSession, ChartSnapshot};
