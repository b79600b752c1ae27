use std::marker::PhantomData;

use parking_lot::lock_api::{GuardNoSend, RawMutex};

use crate::connection::{DetachReceiver, ForgetSignal};

/// Mutual-exclusion strategy shared by a signal and the receivers wired to it.
///
/// The policy is baked into the types at construction time: a `Signal<A, P>`
/// only connects to receivers whose registry is a `Slots<P>` with the same `P`.
/// Three policies exist and the trait is sealed:
///
/// - [`SingleThread`]: no locking at all. Everything built over it is
///   `!Send + !Sync`, so moving a signal or receiver across threads is a
///   compile error rather than undefined behavior.
/// - [`GlobalLock`]: every signal and every receiver registry in the process
///   shares one mutex. Cheapest on resources, worst on contention.
/// - [`ObjectLock`]: each signal and each receiver registry owns its own
///   mutex; operations on distinct signals never contend. The default.
///
/// All guarded state is accessed through RAII guards, so the lock is released
/// on every exit path, panics included.
pub trait LockPolicy: sealed::Sealed + Sized + 'static {
    #[doc(hidden)]
    type Raw: RawMutex + 'static;
    #[doc(hidden)]
    type SignalLink: ?Sized + DetachReceiver + 'static;
    #[doc(hidden)]
    type SlotsLink: ?Sized + ForgetSignal + 'static;
    #[doc(hidden)]
    type Thunk<A: 'static>: ?Sized + Fn(&A) -> bool + 'static;
}

pub(crate) type PolicyMutex<P, T> = parking_lot::lock_api::Mutex<<P as LockPolicy>::Raw, T>;

/// No-op locking for strictly single-threaded wiring.
pub struct SingleThread;

/// One process-wide mutex serializing all signal traffic.
pub struct GlobalLock;

/// A mutex per signal and per receiver registry.
pub struct ObjectLock;

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::SingleThread {}
    impl Sealed for super::GlobalLock {}
    impl Sealed for super::ObjectLock {}
}

impl LockPolicy for SingleThread {
    type Raw = RawNoop;
    type SignalLink = dyn DetachReceiver + 'static;
    type SlotsLink = dyn ForgetSignal + 'static;
    type Thunk<A: 'static> = dyn Fn(&A) -> bool + 'static;
}

impl LockPolicy for GlobalLock {
    type Raw = RawGlobal;
    type SignalLink = dyn DetachReceiver + Send + Sync + 'static;
    type SlotsLink = dyn ForgetSignal + Send + Sync + 'static;
    type Thunk<A: 'static> = dyn Fn(&A) -> bool + Send + Sync + 'static;
}

impl LockPolicy for ObjectLock {
    type Raw = parking_lot::RawMutex;
    type SignalLink = dyn DetachReceiver + Send + Sync + 'static;
    type SlotsLink = dyn ForgetSignal + Send + Sync + 'static;
    type Thunk<A: 'static> = dyn Fn(&A) -> bool + Send + Sync + 'static;
}

/// Raw mutex that does nothing. The phantom raw pointer keeps it out of
/// `Send`/`Sync`, which is what makes the no-op sound: state guarded by it
/// can never be reached from a second thread.
#[doc(hidden)]
pub struct RawNoop {
    _single_thread: PhantomData<*const ()>,
}

unsafe impl RawMutex for RawNoop {
    const INIT: RawNoop = RawNoop { _single_thread: PhantomData };
    type GuardMarker = GuardNoSend;

    #[inline]
    fn lock(&self) {}

    #[inline]
    fn try_lock(&self) -> bool {
        true
    }

    #[inline]
    unsafe fn unlock(&self) {}
}

static GLOBAL: parking_lot::RawMutex = parking_lot::RawMutex::INIT;

/// Raw mutex delegating to the single process-wide lock.
#[doc(hidden)]
pub struct RawGlobal;

unsafe impl RawMutex for RawGlobal {
    const INIT: RawGlobal = RawGlobal;
    type GuardMarker = GuardNoSend;

    #[inline]
    fn lock(&self) {
        GLOBAL.lock()
    }

    #[inline]
    fn try_lock(&self) -> bool {
        GLOBAL.try_lock()
    }

    #[inline]
    unsafe fn unlock(&self) {
        unsafe { GLOBAL.unlock() }
    }
}
