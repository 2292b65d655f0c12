pub mod errors;
pub mod events;
pub mod loading;
pub mod logging;
pub mod persistence;
pub mod series;
pub mod viewport;
