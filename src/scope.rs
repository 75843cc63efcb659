//! Scope - the shared reactive key/value store.
//!
//! Inputs write into scope, outputs and canvases read from it. Every write
//! notifies subscribers synchronously, after the value is stored, exactly
//! once per write:
//!
//! - no batching: N writes to one key produce N notifications
//! - no deduplication: writing an equal value still notifies
//! - re-entrant: a subscriber may write to scope; the nested notification
//!   completes before the outer one continues
//!
//! The global write count is also mirrored into a spark-signals [`Signal`],
//! so effects and deriveds can track "scope changed" like any other signal.
//!
//! # Example
//!
//! ```ignore
//! use spark_stdio::{ScopeStore, Value};
//!
//! let scope = ScopeStore::new();
//! let id = scope.subscribe(|key| println!("{key} changed"));
//! scope.set("name", "Ada");
//! assert_eq!(scope.get("name"), Some(Value::Text("Ada".into())));
//! scope.unsubscribe(id);
//! ```

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use spark_signals::{signal, Signal};

use crate::types::Value;

/// Called with the key of every write.
pub type Subscriber = Rc<dyn Fn(&str)>;

/// Handle returned by [`ScopeStore::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(usize);

struct Entry {
    value: Value,
    version: u64,
}

struct ScopeInner {
    entries: RefCell<HashMap<String, Entry>>,
    subscribers: RefCell<Vec<(SubscriptionId, Subscriber)>>,
    next_id: Cell<usize>,
    revision: Signal<u64>,
}

/// Shared handle to a scope. Clones refer to the same store.
#[derive(Clone)]
pub struct ScopeStore {
    inner: Rc<ScopeInner>,
}

impl ScopeStore {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(ScopeInner {
                entries: RefCell::new(HashMap::new()),
                subscribers: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
                revision: signal(0),
            }),
        }
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Store `value` under `key`, then notify every subscriber.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        {
            let mut entries = self.inner.entries.borrow_mut();
            let entry = entries.entry(key.clone()).or_insert(Entry {
                value: Value::Null,
                version: 0,
            });
            entry.value = value.into();
            entry.version += 1;
        }
        self.inner.revision.set(self.inner.revision.get() + 1);
        log::trace!("scope write `{key}`");

        // Snapshot so subscribers can (un)subscribe or write while we iterate
        let subscribers: Vec<Subscriber> = self
            .inner
            .subscribers
            .borrow()
            .iter()
            .map(|(_, subscriber)| subscriber.clone())
            .collect();
        for subscriber in subscribers {
            subscriber(&key);
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub fn get(&self, key: &str) -> Option<Value> {
        self.inner.entries.borrow().get(key).map(|e| e.value.clone())
    }

    /// Like [`get`](Self::get), with [`Value::Null`] for missing keys.
    pub fn value(&self, key: &str) -> Value {
        self.get(key).unwrap_or_default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.inner.entries.borrow().contains_key(key)
    }

    /// Number of writes `key` has received. 0 if never written.
    pub fn version(&self, key: &str) -> u64 {
        self.inner.entries.borrow().get(key).map_or(0, |e| e.version)
    }

    /// Total number of writes across all keys.
    pub fn revision(&self) -> u64 {
        self.inner.revision.get()
    }

    /// Reactive view of [`revision`](Self::revision).
    pub fn revision_signal(&self) -> Signal<u64> {
        self.inner.revision.clone()
    }

    /// All keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.inner.entries.borrow().keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.inner.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // =========================================================================
    // Subscriptions
    // =========================================================================

    pub fn subscribe(&self, subscriber: impl Fn(&str) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.inner.next_id.get());
        self.inner.next_id.set(id.0 + 1);
        self.inner
            .subscribers
            .borrow_mut()
            .push((id, Rc::new(subscriber)));
        id
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.inner.subscribers.borrow_mut();
        let before = subscribers.len();
        subscribers.retain(|(sub_id, _)| *sub_id != id);
        before != subscribers.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.borrow().len()
    }
}

impl Default for ScopeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ScopeStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopeStore")
            .field("keys", &self.keys())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_then_get() {
        let scope = ScopeStore::new();
        assert!(scope.get("a").is_none());
        assert_eq!(scope.value("a"), Value::Null);

        scope.set("a", "x");
        assert_eq!(scope.get("a"), Some(Value::Text("x".into())));
        assert!(scope.contains("a"));
        assert_eq!(scope.keys(), vec!["a"]);
    }

    #[test]
    fn test_notifies_once_per_write_without_dedup() {
        let scope = ScopeStore::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = seen.clone();
        scope.subscribe(move |key| seen_clone.borrow_mut().push(key.to_string()));

        scope.set("a", "same");
        scope.set("a", "same");
        scope.set("b", 1);

        assert_eq!(*seen.borrow(), vec!["a", "a", "b"]);
        assert_eq!(scope.version("a"), 2);
        assert_eq!(scope.version("b"), 1);
        assert_eq!(scope.version("missing"), 0);
        assert_eq!(scope.revision(), 3);
    }

    #[test]
    fn test_value_stored_before_notify() {
        let scope = ScopeStore::new();
        let observed = Rc::new(RefCell::new(None));
        let observed_clone = observed.clone();
        let scope_clone = scope.clone();
        scope.subscribe(move |key| {
            *observed_clone.borrow_mut() = scope_clone.get(key);
        });

        scope.set("k", "v");
        assert_eq!(*observed.borrow(), Some(Value::Text("v".into())));
    }

    #[test]
    fn test_reentrant_write() {
        let scope = ScopeStore::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        let scope_clone = scope.clone();
        let order_clone = order.clone();
        scope.subscribe(move |key| {
            order_clone.borrow_mut().push(format!("enter {key}"));
            if key == "a" {
                scope_clone.set("b", "from a");
            }
            order_clone.borrow_mut().push(format!("exit {key}"));
        });

        scope.set("a", 1);

        assert_eq!(
            *order.borrow(),
            vec!["enter a", "enter b", "exit b", "exit a"]
        );
        assert_eq!(scope.get("b"), Some(Value::Text("from a".into())));
    }

    #[test]
    fn test_unsubscribe() {
        let scope = ScopeStore::new();
        let count = Rc::new(Cell::new(0));
        let count_clone = count.clone();
        let id = scope.subscribe(move |_| count_clone.set(count_clone.get() + 1));

        scope.set("a", 1);
        assert!(scope.unsubscribe(id));
        assert!(!scope.unsubscribe(id));
        scope.set("a", 2);

        assert_eq!(count.get(), 1);
        assert_eq!(scope.subscriber_count(), 0);
    }

    #[test]
    fn test_revision_signal_tracks_writes() {
        let scope = ScopeStore::new();
        let revision = scope.revision_signal();
        assert_eq!(revision.get(), 0);

        scope.set("a", 1);
        scope.set("a", 1);
        assert_eq!(revision.get(), 2);
    }
}
