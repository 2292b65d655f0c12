//! Adapters behind the domain traits: synthetic feed, key-value stores,
//! browser console and clock.

pub mod mock_feed;
pub mod services;
pub mod storage;

pub use mock_feed::MockFeed;
pub use services::{BrowserTimeProvider, ConsoleLogger};
pub use storage::{BrowserStorage, DebounceTimer, MemoryStore};
