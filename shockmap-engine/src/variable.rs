//! Observable configuration variables
//!
//! A [`Variable`] is a cheap, cloneable handle to a shared value. Setting it
//! runs the optional filter, stores the result, and notifies the registered
//! change listeners only when the stored value actually changed.

use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Maps `(current, requested)` to the value actually stored
pub type Filter<T> = Arc<dyn Fn(&T, T) -> T + Send + Sync>;

type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Handle of a registered change listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u32);

struct Shared<T> {
    value: Mutex<T>,
    default: T,
    filter: Option<Filter<T>>,
    listeners: Mutex<BTreeMap<ListenerId, Listener<T>>>,
    next_listener: AtomicU32,
}

/// A live, observable configuration value
pub struct Variable<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for Variable<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: Clone + PartialEq + Send + 'static> Variable<T> {
    /// Create a variable holding `default`
    pub fn new(default: T) -> Self {
        Self::build(default, None)
    }

    /// Create a variable whose stores go through `filter`
    pub fn with_filter<F>(default: T, filter: F) -> Self
    where
        F: Fn(&T, T) -> T + Send + Sync + 'static,
    {
        Self::build(default, Some(Arc::new(filter)))
    }

    fn build(default: T, filter: Option<Filter<T>>) -> Self {
        Self {
            shared: Arc::new(Shared {
                value: Mutex::new(default.clone()),
                default,
                filter,
                listeners: Mutex::new(BTreeMap::new()),
                next_listener: AtomicU32::new(1),
            }),
        }
    }

    /// Fresh variable with this one's default and filter but no listeners
    pub fn child(&self) -> Self {
        Self::build(self.shared.default.clone(), self.shared.filter.clone())
    }

    /// Current value
    pub fn get(&self) -> T {
        self.shared.value.lock().clone()
    }

    /// Default value
    pub fn default_value(&self) -> &T {
        &self.shared.default
    }

    /// Store `value` (after filtering) and return what was stored
    pub fn set(&self, value: T) -> T {
        let filtered = match &self.shared.filter {
            Some(filter) => {
                let current = self.get();
                filter(&current, value)
            }
            None => value,
        };
        self.store(filtered)
    }

    /// Restore the default value, bypassing the filter
    pub fn reset(&self) {
        self.store(self.shared.default.clone());
    }

    fn store(&self, value: T) -> T {
        let changed = {
            let mut current = self.shared.value.lock();
            if *current == value {
                false
            } else {
                *current = value.clone();
                true
            }
        };
        if changed {
            self.notify(&value);
        }
        value
    }

    fn notify(&self, value: &T) {
        // Snapshot so a listener may touch this variable without deadlocking
        let listeners: Vec<Listener<T>> =
            self.shared.listeners.lock().values().cloned().collect();
        for listener in listeners {
            listener(value);
        }
    }

    /// Register a change listener and return its id
    pub fn add_change_listener<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = ListenerId(self.shared.next_listener.fetch_add(1, Ordering::Relaxed));
        self.shared.listeners.lock().insert(id, Arc::new(listener));
        debug!("Registered change listener {:?}", id);
        id
    }

    /// Deregister a listener; false if it was not registered
    pub fn remove_change_listener(&self, id: ListenerId) -> bool {
        let removed = self.shared.listeners.lock().remove(&id).is_some();
        if removed {
            debug!("Removed change listener {:?}", id);
        }
        removed
    }

    /// Register a listener whose registration ends when the guard is dropped
    pub fn subscribe<F>(&self, listener: F) -> ListenerGuard<T>
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = self.add_change_listener(listener);
        ListenerGuard {
            variable: self.clone(),
            id: Some(id),
        }
    }

    /// Number of registered listeners
    pub fn listener_count(&self) -> usize {
        self.shared.listeners.lock().len()
    }

    /// True if both handles refer to the same variable
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }
}

impl<T: fmt::Debug> fmt::Debug for Variable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Variable")
            .field("value", &*self.shared.value.lock())
            .field("default", &self.shared.default)
            .field("listeners", &self.shared.listeners.lock().len())
            .finish()
    }
}

/// Scoped listener registration
///
/// Dropping the guard (or calling [`release`](ListenerGuard::release))
/// deregisters the listener exactly once.
pub struct ListenerGuard<T: Clone + PartialEq + Send + 'static> {
    variable: Variable<T>,
    id: Option<ListenerId>,
}

impl<T: Clone + PartialEq + Send + 'static> ListenerGuard<T> {
    /// Listener id, or `None` once released
    pub fn id(&self) -> Option<ListenerId> {
        self.id
    }

    /// Deregister now; later calls do nothing
    pub fn release(&mut self) -> bool {
        match self.id.take() {
            Some(id) => self.variable.remove_change_listener(id),
            None => false,
        }
    }
}

impl<T: Clone + PartialEq + Send + 'static> Drop for ListenerGuard<T> {
    fn drop(&mut self) {
        self.release();
    }
}
