use crate::domain::{
    errors::{AppError, AppResult},
    logging::{LogComponent, get_time_provider},
    persistence::{KeyValueStore, PersistenceBridge},
};
use crate::log_trace;
use gloo::timers::callback::Timeout;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

/// In-process store. Clones share the same map, so a test can keep a
/// handle while the bridge owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    items: Rc<RefCell<HashMap<String, String>>>,
    failing: Rc<Cell<bool>>,
    writes: Rc<Cell<usize>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_item(self, key: &str, value: &str) -> Self {
        self.items.borrow_mut().insert(key.to_string(), value.to_string());
        self
    }

    /// Make every subsequent operation fail, like a full or blocked localStorage
    pub fn set_failing(&self, failing: bool) {
        self.failing.set(failing);
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }

    /// Successful `set_item` calls so far
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> AppResult<Option<String>> {
        if self.failing.get() {
            return Err(AppError::Persistence(format!("store unavailable reading {}", key)));
        }
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> AppResult<()> {
        if self.failing.get() {
            return Err(AppError::Persistence(format!("store unavailable writing {}", key)));
        }
        self.items.borrow_mut().insert(key.to_string(), value.to_string());
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}

/// `window.localStorage`
pub struct BrowserStorage {
    storage: web_sys::Storage,
}

impl BrowserStorage {
    pub fn local() -> AppResult<Self> {
        let window = web_sys::window().ok_or_else(|| AppError::Persistence("no window".into()))?;
        let storage = window
            .local_storage()
            .map_err(|e| AppError::Persistence(format!("localStorage blocked: {:?}", e)))?
            .ok_or_else(|| AppError::Persistence("localStorage unavailable".into()))?;
        Ok(Self { storage })
    }
}

impl KeyValueStore for BrowserStorage {
    fn get_item(&self, key: &str) -> AppResult<Option<String>> {
        self.storage
            .get_item(key)
            .map_err(|e| AppError::Persistence(format!("get {}: {:?}", key, e)))
    }

    fn set_item(&self, key: &str, value: &str) -> AppResult<()> {
        self.storage
            .set_item(key, value)
            .map_err(|e| AppError::Persistence(format!("set {}: {:?}", key, e)))
    }
}

/// Drives a bridge's debounced writes with a browser timer.
///
/// Holds at most one timer, armed for the earliest pending deadline.
/// Re-arming drops the previous `Timeout`, which cancels it.
pub struct DebounceTimer {
    bridge: Rc<RefCell<PersistenceBridge>>,
    pending: Rc<RefCell<Option<Timeout>>>,
}

impl DebounceTimer {
    pub fn new(bridge: Rc<RefCell<PersistenceBridge>>) -> Self {
        Self { bridge, pending: Rc::new(RefCell::new(None)) }
    }

    /// Call after anything that may have scheduled a debounced write
    pub fn arm(&self) {
        let Some(due_at) = self.bridge.borrow().next_due() else {
            self.pending.borrow_mut().take();
            return;
        };
        let now = get_time_provider().current_timestamp();
        let delay = due_at.saturating_sub(now).min(u32::MAX as u64) as u32;

        let bridge = Rc::clone(&self.bridge);
        let pending = Rc::clone(&self.pending);
        let timeout = Timeout::new(delay, move || {
            pending.borrow_mut().take();
            let written = bridge.borrow_mut().flush_due(get_time_provider().current_timestamp());
            log_trace!(LogComponent::Infrastructure("DebounceTimer"), "flushed {} writes", written);
        });
        *self.pending.borrow_mut() = Some(timeout);
    }

    /// Cancel the timer and write everything now
    pub fn flush(&self) -> usize {
        self.pending.borrow_mut().take();
        self.bridge.borrow_mut().flush()
    }
}
