/*!
Typed signal/slot connections with automatic receiver cleanup

# Design requirements:
- A signal broadcasts to any number of slots; a slot is a callable bound to a
  specific receiver, invoked synchronously, in connection order, on the
  emitting thread.
- Neither side may dangle: dropping a receiver must remove its connections
  from every signal, and dropping a signal must remove it from every
  receiver's tracked set, both synchronously.
- One generic signal type over a payload tuple (arities 0 through 8), not a
  family of per-arity types.
- Locking is a construction-time policy ([`SingleThread`], [`GlobalLock`],
  [`ObjectLock`]) shared by the signal and its receivers. The single-threaded
  policy trades `Send`/`Sync` for zero lock overhead instead of trading
  safety.
- Slots may connect, disconnect, or drop receivers from inside an emission
  without corrupting the dispatch: a slot removed mid-emit is not invoked
  afterwards, a slot added mid-emit waits for the next emission.

# Basic usage

```rust
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use slotwire::{HasSlots, Signal, Slots};

struct Light {
    slots: Slots,
    level: AtomicU32,
}

impl Light {
    fn new() -> Arc<Self> {
        Arc::new(Self { slots: Slots::new(), level: AtomicU32::new(0) })
    }

    fn turn_on(&self) {
        self.level.store(1, Ordering::Relaxed);
    }

    fn dim(&self, level: u32) {
        self.level.store(level, Ordering::Relaxed);
    }
}

impl HasSlots for Light {
    fn slots(&self) -> &Slots {
        &self.slots
    }
}

let clicked: Signal = Signal::new();
let dimmed: Signal<(u32,)> = Signal::new();
let light = Light::new();

clicked.connect(&light, Light::turn_on);
dimmed.connect(&light, Light::dim);

clicked.emit(());
dimmed.emit((7,));
assert_eq!(light.level.load(Ordering::Relaxed), 7);

// Dropping the receiver detaches it from every signal; nothing dangles.
drop(light);
assert_eq!(clicked.connection_count(), 0);
clicked.emit(());
```
*/

mod connection;
mod lock;
mod signal;
mod slots;

pub use connection::*;
pub use lock::*;
pub use signal::*;
pub use slots::*;
