use std::collections::HashMap;
use std::sync::{Arc, Weak};

use crate::connection::{DetachReceiver, ForgetSignal, ReceiverId, SignalId};
use crate::lock::{LockPolicy, ObjectLock, PolicyMutex};

/// Capability a type implements to be the receiver side of connections.
///
/// Embed a [`Slots<P>`] in the receiver and hand out a borrow of it here.
/// When the receiver is dropped, the registry drops with it and every signal
/// still wired to the receiver is told to let go. That is the whole cleanup
/// contract, no manual disconnection required.
pub trait HasSlots<P: LockPolicy = ObjectLock> {
    fn slots(&self) -> &Slots<P>;
}

/// Per-receiver registry of the signals currently connected to it.
///
/// A given signal appears at most once no matter how many connections it
/// holds to this receiver. The registry is the authoritative list of signals
/// that must be told "forget me" when the receiver goes away.
pub struct Slots<P: LockPolicy = ObjectLock> {
    inner: Arc<SlotsInner<P>>,
}

pub(crate) struct SlotsInner<P: LockPolicy> {
    tracked: PolicyMutex<P, HashMap<SignalId, Weak<P::SignalLink>>>,
}

impl<P: LockPolicy> Slots<P> {
    pub fn new() -> Self {
        Self { inner: Arc::new(SlotsInner { tracked: PolicyMutex::<P, _>::new(HashMap::new()) }) }
    }

    /// Identity of this receiver for as long as any connection can refer to it.
    pub fn id(&self) -> ReceiverId {
        ReceiverId(Arc::as_ptr(&self.inner) as *const () as usize)
    }

    /// Number of distinct signals holding at least one connection to this receiver.
    pub fn tracked_signals(&self) -> usize {
        self.inner.tracked.lock().len()
    }

    pub fn is_tracking(&self, signal: SignalId) -> bool {
        self.inner.tracked.lock().contains_key(&signal)
    }

    /// Drops every connection to this receiver, on every signal tracking it.
    ///
    /// Runs automatically when the receiver is dropped. The tracked set is
    /// drained under our own lock first and the signals notified after it is
    /// released; under [`crate::GlobalLock`] both sides share one mutex, so
    /// calling out while still holding it would deadlock.
    pub fn disconnect_all(&self) {
        let receiver = self.id();
        let links: Vec<Weak<P::SignalLink>> = {
            let mut tracked = self.inner.tracked.lock();
            tracked.drain().map(|(_, link)| link).collect()
        };
        if links.is_empty() {
            return;
        }
        tracing::trace!(receiver = ?receiver, signals = links.len(), "receiver teardown");
        for link in links {
            if let Some(signal) = link.upgrade() {
                signal.detach(receiver);
            }
        }
    }

    pub(crate) fn inner(&self) -> &Arc<SlotsInner<P>> {
        &self.inner
    }

    pub(crate) fn register(&self, signal: SignalId, link: Weak<P::SignalLink>) {
        self.inner.tracked.lock().insert(signal, link);
    }

    pub(crate) fn unregister(&self, signal: SignalId) {
        self.inner.tracked.lock().remove(&signal);
    }
}

impl<P: LockPolicy> Default for Slots<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: LockPolicy> std::fmt::Debug for Slots<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Slots").field("tracked", &self.tracked_signals()).finish()
    }
}

impl<P: LockPolicy> Drop for Slots<P> {
    fn drop(&mut self) {
        self.disconnect_all();
    }
}

impl<P: LockPolicy> ForgetSignal for SlotsInner<P> {
    fn forget(&self, signal: SignalId) {
        self.tracked.lock().remove(&signal);
    }
}
