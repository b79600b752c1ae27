use std::sync::Weak;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::lock::LockPolicy;

/// Identity of a receiver's registry cell.
///
/// Built from the registry's allocation address. A connection may hold the id
/// after the receiver is gone, but it also holds a `Weak` into the same
/// allocation, so the address stays reserved and the id cannot be recycled
/// while anything still compares against it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReceiverId(pub(crate) usize);

/// Identity of a signal, by the same address-reservation argument as [`ReceiverId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SignalId(pub(crate) usize);

/// Signal-side hook a receiver registry calls during its teardown fan-out:
/// drop every connection bound to `receiver`, without notifying the registry
/// back (it is already draining itself).
#[doc(hidden)]
pub trait DetachReceiver {
    fn detach(&self, receiver: ReceiverId);
}

/// Registry-side hook a signal calls when it goes away or symmetrically
/// releases a receiver: stop tracking `signal`.
#[doc(hidden)]
pub trait ForgetSignal {
    fn forget(&self, signal: SignalId);
}

/// One (signal → receiver, callable) edge. Owned exclusively by the signal
/// that created it; everything pointing the other way is weak.
pub(crate) struct Connection<A: 'static, P: LockPolicy> {
    receiver: ReceiverId,
    slots: Weak<P::SlotsLink>,
    thunk: Box<P::Thunk<A>>,
    live: AtomicBool,
}

impl<A: 'static, P: LockPolicy> Connection<A, P> {
    pub(crate) fn new(receiver: ReceiverId, slots: Weak<P::SlotsLink>, thunk: Box<P::Thunk<A>>) -> Self {
        Self { receiver, slots, thunk, live: AtomicBool::new(true) }
    }

    pub(crate) fn receiver(&self) -> ReceiverId {
        self.receiver
    }

    pub(crate) fn slots(&self) -> &Weak<P::SlotsLink> {
        &self.slots
    }

    /// An emit snapshot can outlive this connection's place in the signal's
    /// list; `live` is how a removal reaches a dispatch already in flight.
    pub(crate) fn is_live(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }

    pub(crate) fn revoke(&self) {
        self.live.store(false, Ordering::Release);
    }

    /// Returns false when the receiver has already been torn down.
    pub(crate) fn invoke(&self, args: &A) -> bool {
        (self.thunk)(args)
    }
}

/// A callable that can be wired to a signal: invoked with a borrow of the
/// receiver and the signal's payload tuple.
///
/// Implemented for `Fn(&R)` through `Fn(&R, T0, ..., T7)`, so both plain
/// methods (`Lamp::turn_on`) and closures connect without adapters. Each
/// argument is cloned out of the payload per invocation; a mismatch between
/// the callable's signature and the signal's payload is a compile error at
/// the `connect` call site.
pub trait Slot<R, A> {
    fn invoke(&self, receiver: &R, args: &A);
}

macro_rules! impl_slot {
    ($($ty:ident . $idx:tt),*) => {
        impl<R, F $(, $ty)*> Slot<R, ($($ty,)*)> for F
        where
            F: Fn(&R $(, $ty)*),
            $($ty: Clone + 'static,)*
        {
            fn invoke(&self, receiver: &R, _args: &($($ty,)*)) {
                self(receiver $(, _args.$idx.clone())*)
            }
        }
    };
}

impl_slot!();
impl_slot!(A0.0);
impl_slot!(A0.0, A1.1);
impl_slot!(A0.0, A1.1, A2.2);
impl_slot!(A0.0, A1.1, A2.2, A3.3);
impl_slot!(A0.0, A1.1, A2.2, A3.3, A4.4);
impl_slot!(A0.0, A1.1, A2.2, A3.3, A4.4, A5.5);
impl_slot!(A0.0, A1.1, A2.2, A3.3, A4.4, A5.5, A6.6);
impl_slot!(A0.0, A1.1, A2.2, A3.3, A4.4, A5.5, A6.6, A7.7);
