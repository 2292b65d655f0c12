use crate::application::{ChartCommand, ChartSession, CommandOutcome};
use crate::config::SessionConfig;
use crate::domain::{
    errors::{AppError, FetchResult},
    loading::{FetchRequest, PointFetcher},
    logging::{LogComponent, get_time_provider},
    persistence::PersistenceBridge,
    series::{Point, Ticker, Timestamp},
};
use crate::event_utils::WindowEventListenerHandle;
use crate::infrastructure::{BrowserStorage, DebounceTimer, MockFeed};
use crate::presentation::signals::{ChartSignals, bind_keyboard};
use crate::{log_info, log_warn};
use futures::future::{FutureExt, LocalBoxFuture};
use gloo::utils::format::JsValueSerdeExt;
use js_sys::{Function, Promise};
use std::cell::RefCell;
use std::rc::Rc;
use std::str::FromStr;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, future_to_promise};

const COMPONENT: LogComponent = LogComponent::Presentation("WasmChart");

/// Fetch capability backed by a JS function
/// `(request) => Point[] | Promise<Point[]>`.
///
/// The request is passed as `{ ticker, direction, edge, count }`.
#[derive(Clone)]
pub struct JsFetcher {
    callback: Function,
}

impl JsFetcher {
    pub fn new(callback: Function) -> Self {
        Self { callback }
    }
}

impl PointFetcher for JsFetcher {
    fn request_more(&self, request: FetchRequest) -> LocalBoxFuture<'static, FetchResult<Vec<Point>>> {
        let callback = self.callback.clone();
        async move {
            let arg = JsValue::from_serde(&request)
                .map_err(|e| AppError::FetchFailure(format!("encode request: {}", e)))?;
            let returned = callback
                .call1(&JsValue::NULL, &arg)
                .map_err(|e| AppError::FetchFailure(format!("loader threw: {:?}", e)))?;
            let resolved = JsFuture::from(Promise::resolve(&returned))
                .await
                .map_err(|e| AppError::FetchFailure(format!("loader rejected: {:?}", e)))?;
            resolved
                .into_serde::<Vec<Point>>()
                .map_err(|e| AppError::FetchFailure(format!("malformed points: {}", e)))
        }
        .boxed_local()
    }
}

/// Scrollable chart session for JS hosts
#[wasm_bindgen]
pub struct WasmChart {
    session: Rc<ChartSession>,
    timer: Option<Rc<DebounceTimer>>,
    signals: ChartSignals,
    keyboard: RefCell<Option<WindowEventListenerHandle>>,
}

#[wasm_bindgen]
impl WasmChart {
    /// `ticker` falls back to the persisted one, then BTC. `load_more` takes
    /// precedence over the built-in mock feed; with neither, edges do not load.
    #[wasm_bindgen(constructor)]
    pub fn new(
        ticker: Option<String>,
        config_json: Option<String>,
        load_more: Option<Function>,
        mock_latency_ms: Option<u32>,
    ) -> Result<WasmChart, JsValue> {
        let config = match config_json {
            Some(json) => SessionConfig::from_json(&json).map_err(to_js)?,
            None => SessionConfig::default(),
        };

        let bridge = match BrowserStorage::local() {
            Ok(storage) => Some(PersistenceBridge::new(Box::new(storage), config.persistence.debounce_ms)),
            Err(e) => {
                log_warn!(COMPONENT, "persistence disabled: {}", e);
                None
            }
        };

        let ticker = match ticker.as_deref().map(Ticker::from_str) {
            Some(Ok(ticker)) => ticker,
            Some(Err(_)) => return Err(JsValue::from_str("unknown ticker")),
            None => bridge
                .as_ref()
                .map(|b| ChartSession::persisted_ticker(b, &config.persistence, Ticker::default()))
                .unwrap_or_default(),
        };

        let now = Timestamp::from_millis(get_time_provider().current_timestamp() as i64);
        let series = MockFeed::seed(ticker, config.viewport.seed_len, now);
        let mut session = ChartSession::new(series, config);

        if let Some(callback) = load_more {
            session = session.with_fetcher(Rc::new(JsFetcher::new(callback)));
        } else if let Some(latency) = mock_latency_ms {
            session = session.with_fetcher(Rc::new(MockFeed::new().with_latency(latency)));
        }
        if let Some(bridge) = bridge {
            session = session.with_persistence(bridge);
        }

        let timer = session.persistence().map(|bridge| Rc::new(DebounceTimer::new(bridge)));
        let session = Rc::new(session);
        let signals = ChartSignals::attach(&session);
        log_info!(COMPONENT, "chart ready for {}", ticker);
        Ok(Self { session, timer, signals, keyboard: RefCell::new(None) })
    }

    /// Run a command by name (`pan-left`, `zoom-in`, ...). Resolves to the new snapshot.
    pub fn command(&self, name: &str) -> Result<Promise, JsValue> {
        let command = ChartCommand::from_str(name)
            .map_err(|_| JsValue::from_str(&format!("unknown command: {}", name)))?;
        Ok(self.run(command))
    }

    /// Map a `KeyboardEvent.key`; `undefined` when the key is not bound
    #[wasm_bindgen(js_name = handleKey)]
    pub fn handle_key(&self, key: &str) -> Option<Promise> {
        ChartCommand::from_key(key).map(|command| self.run(command))
    }

    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        JsValue::from_serde(&self.session.snapshot()).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    #[wasm_bindgen(js_name = positionLabel)]
    pub fn position_label(&self) -> String {
        self.session.snapshot().position_label()
    }

    /// Switch to `ticker`, or to the other ticker when omitted
    #[wasm_bindgen(js_name = switchTicker)]
    pub fn switch_ticker(&self, ticker: Option<String>) -> Result<JsValue, JsValue> {
        let ticker = match ticker {
            Some(name) => Ticker::from_str(&name).map_err(|_| JsValue::from_str("unknown ticker"))?,
            None => self.session.ticker().other(),
        };
        let now = Timestamp::from_millis(get_time_provider().current_timestamp() as i64);
        let series = MockFeed::seed(ticker, self.session.config().viewport.seed_len, now);
        self.session.switch_ticker(series).map_err(to_js)?;
        self.arm_timer();
        self.snapshot()
    }

    /// Drive the chart from window keydown events until `close`
    #[wasm_bindgen(js_name = bindKeyboard)]
    pub fn bind_keyboard(&self) {
        let mut keyboard = self.keyboard.borrow_mut();
        if keyboard.is_none() {
            *keyboard = Some(bind_keyboard(Rc::clone(&self.session), self.signals, self.timer.clone()));
        }
    }

    pub fn close(&self) {
        if let Some(handle) = self.keyboard.borrow_mut().take() {
            handle.remove();
        }
        if let Some(timer) = &self.timer {
            timer.flush();
        }
        self.session.close();
    }

    fn run(&self, command: ChartCommand) -> Promise {
        let session = Rc::clone(&self.session);
        let timer = self.timer.clone();
        future_to_promise(async move {
            let outcome = session.execute(command).await;
            if let Some(timer) = &timer {
                timer.arm();
            }
            match outcome {
                Ok(CommandOutcome::Discarded) => Ok(JsValue::NULL),
                Ok(_) => JsValue::from_serde(&session.snapshot()).map_err(|e| JsValue::from_str(&e.to_string())),
                Err(e) => Err(to_js(e)),
            }
        })
    }

    fn arm_timer(&self) {
        if let Some(timer) = &self.timer {
            timer.arm();
        }
    }
}

impl WasmChart {
    /// Shared handle for Rust-side hosts such as the Leptos bridge
    pub fn session(&self) -> Rc<ChartSession> {
        Rc::clone(&self.session)
    }

    pub fn signals(&self) -> ChartSignals {
        self.signals
    }
}

fn to_js(error: AppError) -> JsValue {
    JsValue::from_str(&error.to_string())
}
