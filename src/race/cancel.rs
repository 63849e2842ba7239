//! Caller-owned cancellation handle
//!
//! [`CancelHandle`] is the capability a caller passes into a fetch to stop it
//! early. Listeners registered with [`CancelHandle::on_cancel`] run at most
//! once, on the first [`CancelHandle::cancel`]. The race subscribes through
//! [`CancelHandle::subscribe`], whose guard deregisters on drop.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

type Listener = Box<dyn FnOnce() + Send + 'static>;

/// Registration returned by [`CancelHandle::on_cancel`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

#[derive(Default)]
struct Inner {
    cancelled: AtomicBool,
    next_id: AtomicU64,
    listeners: Mutex<BTreeMap<ListenerId, Listener>>,
}

#[derive(Clone, Default)]
pub struct CancelHandle {
    inner: Arc<Inner>,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Only the first call runs listeners.
    pub fn cancel(&self) {
        let listeners = {
            let mut listeners = self.listeners();
            if self.inner.cancelled.swap(true, Ordering::SeqCst) {
                return;
            }
            std::mem::take(&mut *listeners)
        };

        tracing::debug!(listeners = listeners.len(), "Cancel handle fired");

        // Run outside the lock so listeners may touch the handle
        for (_, listener) in listeners {
            listener();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Register a listener. On an already-cancelled handle it runs immediately.
    pub fn on_cancel<F>(&self, listener: F) -> ListenerId
    where
        F: FnOnce() + Send + 'static,
    {
        let id = ListenerId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));

        let mut listeners = self.listeners();
        if self.is_cancelled() {
            drop(listeners);
            listener();
            return id;
        }
        listeners.insert(id, Box::new(listener));
        id
    }

    /// Remove a listener. Returns false if it already ran or was removed.
    pub fn off_cancel(&self, id: ListenerId) -> bool {
        self.listeners().remove(&id).is_some()
    }

    /// Scoped registration: the listener is removed when the guard drops
    pub fn subscribe<F>(&self, listener: F) -> ListenerGuard
    where
        F: FnOnce() + Send + 'static,
    {
        let id = self.on_cancel(listener);
        ListenerGuard {
            handle: self.clone(),
            id,
        }
    }

    /// Number of listeners still registered
    pub fn listener_count(&self) -> usize {
        self.listeners().len()
    }

    fn listeners(&self) -> MutexGuard<'_, BTreeMap<ListenerId, Listener>> {
        // Listeners never run under the lock, so a poisoned map is still consistent
        self.inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for CancelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelHandle")
            .field("cancelled", &self.is_cancelled())
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// Deregisters its listener when dropped
#[must_use = "dropping the guard deregisters the listener immediately"]
#[derive(Debug)]
pub struct ListenerGuard {
    handle: CancelHandle,
    id: ListenerId,
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        self.handle.off_cancel(self.id);
    }
}
