//! In-memory key-value store.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::CoreError;

use super::Store;

#[derive(Debug, Default)]
struct Inner {
    map: HashMap<String, String>,
    fail_writes: bool,
}

/// [`Store`] backed by a plain map.
///
/// Clones share contents, so a test can hand one copy to the engine and
/// inspect writes through another. `fail_writes` makes every `set` and
/// `remove` report failure, for exercising degraded-storage paths.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Rc<RefCell<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle simulated write failure.
    pub fn fail_writes(&self, fail: bool) {
        self.inner.borrow_mut().fail_writes = fail;
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.borrow().map.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CoreError> {
        let mut inner = self.inner.borrow_mut();
        if inner.fail_writes {
            return Err(CoreError::Custom("store writes disabled".into()));
        }
        inner.map.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CoreError> {
        let mut inner = self.inner.borrow_mut();
        if inner.fail_writes {
            return Err(CoreError::Custom("store writes disabled".into()));
        }
        inner.map.remove(key);
        Ok(())
    }
}
