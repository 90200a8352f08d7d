use anyhow::Result;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::mpsc::Receiver;

use super::{StateStore, StoreChange, Subscribers};

#[derive(Default)]
struct Inner {
    values: HashMap<String, String>,
    subscribers: Subscribers,
}

/// Ephemeral store. Clones share the same state and subscriber list, which
/// is how several in-process dashboards see each other's writes.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Rc<RefCell<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStore {
    fn get_raw(&self, key: &str) -> Result<Option<String>> {
        Ok(self.inner.borrow().values.get(key).cloned())
    }

    fn set_raw(&self, key: &str, value: &str) -> Result<()> {
        let mut inner = self.inner.borrow_mut();
        inner.values.insert(key.to_string(), value.to_string());
        inner.subscribers.publish(StoreChange {
            key: key.to_string(),
            new_value: Some(value.to_string()),
        });
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut inner = self.inner.borrow_mut();
        if inner.values.remove(key).is_some() {
            inner.subscribers.publish(StoreChange {
                key: key.to_string(),
                new_value: None,
            });
        }
        Ok(())
    }

    fn subscribe(&self) -> Receiver<StoreChange> {
        self.inner.borrow_mut().subscribers.add()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{self, keys};

    #[test]
    fn clones_observe_each_other() {
        let a = MemoryStore::new();
        let b = a.clone();
        let rx = b.subscribe();

        store::set(&a, keys::FOCUS_MODE, &true).unwrap();
        let change = rx.try_recv().unwrap();
        assert_eq!(change.key, keys::FOCUS_MODE);
        assert_eq!(store::get::<bool>(&b, keys::FOCUS_MODE).unwrap(), Some(true));

        a.remove(keys::FOCUS_MODE).unwrap();
        assert_eq!(rx.try_recv().unwrap().new_value, None);
    }

    #[test]
    fn removing_missing_key_is_silent() {
        let s = MemoryStore::new();
        let rx = s.subscribe();
        s.remove(keys::ACTIVE_MODAL).unwrap();
        assert!(rx.try_recv().is_err());
    }
}
