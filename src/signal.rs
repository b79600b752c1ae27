use std::sync::{Arc, Weak};

use crate::connection::{Connection, DetachReceiver, ForgetSignal, ReceiverId, SignalId, Slot};
use crate::lock::{GlobalLock, LockPolicy, ObjectLock, PolicyMutex, SingleThread};
use crate::slots::{HasSlots, Slots};

/// A broadcastable event source of fixed payload arity.
///
/// `A` is the payload tuple (`()`, `(T0,)`, ... up to eight elements) and `P`
/// the [`LockPolicy`] shared with the receivers it connects to. Handles are
/// cheap clones over one shared core; the core is torn down when the last
/// handle drops, unregistering itself from every connected receiver first.
///
/// Connections are invoked in the order they were made. Connecting the same
/// receiver twice is allowed and fires twice; nothing is deduplicated.
pub struct Signal<A: 'static = (), P: LockPolicy = ObjectLock> {
    core: Arc<SignalCore<A, P>>,
}

struct SignalCore<A: 'static, P: LockPolicy> {
    connections: PolicyMutex<P, Vec<Arc<Connection<A, P>>>>,
}

impl<A: 'static, P: LockPolicy> Signal<A, P> {
    pub fn new() -> Self {
        Self { core: Arc::new(SignalCore { connections: PolicyMutex::<P, _>::new(Vec::new()) }) }
    }

    /// Identity of this signal for as long as any handle or connection refers to it.
    pub fn id(&self) -> SignalId {
        SignalId(Arc::as_ptr(&self.core) as *const () as usize)
    }

    /// Number of live connections, duplicates included.
    pub fn connection_count(&self) -> usize {
        self.core.connections.lock().len()
    }

    /// Invokes every connected slot with `args`, in connection order, on the
    /// calling thread, each to completion before the next. A panicking slot
    /// propagates to the caller; the remaining slots are not invoked.
    ///
    /// The connection list is snapshotted under the lock and the slots run
    /// outside it, so a slot may freely connect, disconnect (itself, another
    /// slot, or everything), drop receivers, or re-emit this same signal.
    /// A slot disconnected mid-emission is not invoked afterwards; a slot
    /// connected mid-emission waits for the next one.
    pub fn emit(&self, args: A) {
        let snapshot: Vec<Arc<Connection<A, P>>> = self.core.connections.lock().clone();
        let mut delivered = 0usize;
        for conn in &snapshot {
            // Re-check just before invoking: the previous slot may have
            // disconnected this one.
            if conn.is_live() && conn.invoke(&args) {
                delivered += 1;
            }
        }
        tracing::trace!(signal = ?self.id(), delivered, connections = snapshot.len(), "emit");
    }

    /// Removes every connection bound to `receiver` and releases the receiver's
    /// tracking entry for this signal. Disconnecting a receiver that was never
    /// connected (or already disconnected) is a no-op.
    pub fn disconnect<R: HasSlots<P>>(&self, receiver: &R) {
        let slots = receiver.slots();
        let target = slots.id();
        let removed = {
            let mut connections = self.core.connections.lock();
            let before = connections.len();
            connections.retain(|conn| {
                if conn.receiver() == target {
                    conn.revoke();
                    false
                } else {
                    true
                }
            });
            before - connections.len()
        };
        if removed > 0 {
            slots.unregister(self.id());
            tracing::trace!(signal = ?self.id(), receiver = ?target, removed, "disconnect");
        }
    }

    /// Removes every connection, releasing each receiver's tracking entry.
    pub fn disconnect_all(&self) {
        let drained: Vec<Arc<Connection<A, P>>> = {
            let mut connections = self.core.connections.lock();
            std::mem::take(&mut *connections)
        };
        let id = self.id();
        for conn in &drained {
            conn.revoke();
        }
        for conn in drained {
            if let Some(slots) = conn.slots().upgrade() {
                slots.forget(id);
            }
        }
    }

    fn push_connection(&self, conn: Connection<A, P>, slots: &Slots<P>, link: Weak<P::SignalLink>) {
        tracing::trace!(signal = ?self.id(), receiver = ?slots.id(), "connect");
        self.core.connections.lock().push(Arc::new(conn));
        slots.register(self.id(), link);
    }
}

// `connect` is the one operation whose bounds legitimately differ per policy:
// under the multi-threaded policies the receiver and slot must be
// `Send + Sync` because the connection can be reached from any thread, while
// `SingleThread` wiring accepts thread-bound receivers (and is itself
// `!Send + !Sync`).
macro_rules! impl_connect {
    ($policy:ty, [$($extra:tt)*]) => {
        impl<A: 'static> Signal<A, $policy> {
            /// Wires `slot` to this signal, bound to `receiver`.
            ///
            /// Appends the connection (invocation order is connection order)
            /// and registers this signal in the receiver's [`Slots`] registry,
            /// so dropping the receiver cleans the connection up. The slot
            /// runs against a borrow of the receiver; a receiver already being
            /// torn down is never invoked.
            pub fn connect<R, F>(&self, receiver: &Arc<R>, slot: F)
            where
                R: HasSlots<$policy> $($extra)* + 'static,
                F: Slot<R, A> $($extra)* + 'static,
            {
                let slots = receiver.slots();
                let rx = Arc::downgrade(receiver);
                let thunk: Box<dyn Fn(&A) -> bool $($extra)*> = Box::new(move |args: &A| match rx.upgrade() {
                    Some(receiver) => {
                        slot.invoke(&receiver, args);
                        true
                    }
                    None => false,
                });
                let anchor_arc: Arc<dyn ForgetSignal $($extra)*> = slots.inner().clone();
                let anchor: Weak<dyn ForgetSignal $($extra)*> = Arc::downgrade(&anchor_arc);
                let link_arc: Arc<dyn DetachReceiver $($extra)*> = self.core.clone();
                let link: Weak<dyn DetachReceiver $($extra)*> = Arc::downgrade(&link_arc);
                self.push_connection(Connection::new(slots.id(), anchor, thunk), slots, link);
            }
        }
    };
}

impl_connect!(SingleThread, []);
impl_connect!(GlobalLock, [+ Send + Sync]);
impl_connect!(ObjectLock, [+ Send + Sync]);

impl<A: 'static, P: LockPolicy> DetachReceiver for SignalCore<A, P> {
    /// Teardown half of a receiver's fan-out: drop its connections without
    /// notifying its registry back, since the registry is already draining.
    fn detach(&self, receiver: ReceiverId) {
        let mut connections = self.connections.lock();
        connections.retain(|conn| {
            if conn.receiver() == receiver {
                conn.revoke();
                false
            } else {
                true
            }
        });
    }
}

impl<A: 'static, P: LockPolicy> Drop for SignalCore<A, P> {
    fn drop(&mut self) {
        // Every surviving receiver must be told this signal is gone before
        // the connections are discarded, or its registry would keep a stale
        // entry for an address that can be recycled.
        let id = SignalId(self as *const Self as *const () as usize);
        let connections = std::mem::take(self.connections.get_mut());
        if connections.is_empty() {
            return;
        }
        tracing::trace!(signal = ?id, connections = connections.len(), "signal teardown");
        for conn in connections {
            conn.revoke();
            if let Some(slots) = conn.slots().upgrade() {
                slots.forget(id);
            }
        }
    }
}

impl<A: 'static, P: LockPolicy> Clone for Signal<A, P> {
    fn clone(&self) -> Self {
        Self { core: self.core.clone() }
    }
}

impl<A: 'static, P: LockPolicy> Default for Signal<A, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: 'static, P: LockPolicy> std::fmt::Debug for Signal<A, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal").field("connections", &self.connection_count()).finish()
    }
}
