pub mod signals;
pub mod wasm_api;

pub use signals::{ChartSignals, bind_keyboard, run_and_sync};
pub use wasm_api::{JsFetcher, WasmChart};
