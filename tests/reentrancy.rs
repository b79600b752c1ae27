mod common;

use std::sync::{Arc, Mutex};

use common::{Lamp, journal};
use slotwire::Signal;

#[test]
fn slot_disconnecting_itself_mid_emit_runs_the_rest() {
    let (record, drain) = journal();
    let clicked: Signal = Signal::new();
    let lp1 = Lamp::new("lp1", record.clone());
    let lp2 = Lamp::new("lp2", record.clone());
    let lp3 = Lamp::new("lp3", record);

    clicked.connect(&lp1, Lamp::turn_on);
    {
        let sig = clicked.clone();
        clicked.connect(&lp2, move |lamp: &Lamp| {
            lamp.turn_on();
            sig.disconnect(lamp);
        });
    }
    clicked.connect(&lp3, Lamp::turn_on);

    clicked.emit(());
    assert_eq!(drain(), ["lp1 on", "lp2 on", "lp3 on"]);
    assert_eq!(clicked.connection_count(), 2);

    clicked.emit(());
    assert_eq!(drain(), ["lp1 on", "lp3 on"]);
}

#[test]
fn slot_disconnecting_a_later_slot_prevents_its_invocation() {
    let (record, drain) = journal();
    let clicked: Signal = Signal::new();
    let lp1 = Lamp::new("lp1", record.clone());
    let lp2 = Lamp::new("lp2", record.clone());
    let lp3 = Lamp::new("lp3", record);

    {
        let sig = clicked.clone();
        let target = lp3.clone();
        clicked.connect(&lp1, move |lamp: &Lamp| {
            lamp.turn_on();
            sig.disconnect(&*target);
        });
    }
    clicked.connect(&lp2, Lamp::turn_on);
    clicked.connect(&lp3, Lamp::turn_on);

    clicked.emit(());

    // lp3 was still unvisited when it got disconnected; lp2 must not be skipped.
    assert_eq!(drain(), ["lp1 on", "lp2 on"]);
    assert_eq!(lp3.hits(), 0);
}

#[test]
fn disconnect_all_from_a_slot_stops_the_emission() {
    let (record, drain) = journal();
    let clicked: Signal = Signal::new();
    let lp1 = Lamp::new("lp1", record.clone());
    let lp2 = Lamp::new("lp2", record);

    {
        let sig = clicked.clone();
        clicked.connect(&lp1, move |lamp: &Lamp| {
            lamp.turn_on();
            sig.disconnect_all();
        });
    }
    clicked.connect(&lp2, Lamp::turn_on);

    clicked.emit(());

    assert_eq!(drain(), ["lp1 on"]);
    assert_eq!(clicked.connection_count(), 0);
}

#[test]
fn connect_during_emit_waits_for_the_next_emission() {
    let (record, drain) = journal();
    let clicked: Signal = Signal::new();
    let lp1 = Lamp::new("lp1", record.clone());
    let lp2 = Lamp::new("lp2", record);

    {
        let sig = clicked.clone();
        let late = lp2.clone();
        clicked.connect(&lp1, move |lamp: &Lamp| {
            lamp.turn_on();
            sig.connect(&late, Lamp::turn_on);
        });
    }

    clicked.emit(());
    assert_eq!(drain(), ["lp1 on"]);
    assert_eq!(clicked.connection_count(), 2);

    clicked.emit(());
    assert_eq!(drain(), ["lp1 on", "lp2 on"]);
}

#[test]
fn slot_may_re_emit_the_same_signal() {
    let (record, drain) = journal();
    let clicked: Signal = Signal::new();
    let lp = Lamp::new("lp", record);

    {
        let sig = clicked.clone();
        let fired = std::sync::atomic::AtomicBool::new(false);
        clicked.connect(&lp, move |lamp: &Lamp| {
            lamp.turn_on();
            if !fired.swap(true, std::sync::atomic::Ordering::SeqCst) {
                sig.emit(());
            }
        });
    }

    clicked.emit(());
    assert_eq!(drain(), ["lp on", "lp on"]);
}

#[test]
fn slot_dropping_another_receiver_mid_emit_is_safe() {
    let (record, drain) = journal();
    let clicked: Signal = Signal::new();
    let lp1 = Lamp::new("lp1", record.clone());
    let doomed = Lamp::new("doomed", record);

    let stash: Arc<Mutex<Option<Arc<Lamp>>>> = Arc::new(Mutex::new(Some(doomed.clone())));
    {
        let stash = stash.clone();
        clicked.connect(&lp1, move |lamp: &Lamp| {
            lamp.turn_on();
            stash.lock().unwrap().take();
        });
    }
    clicked.connect(&doomed, Lamp::turn_on);
    drop(doomed);

    clicked.emit(());

    // The doomed lamp was destroyed by the first slot before its turn came up.
    assert_eq!(drain(), ["lp1 on"]);
    assert_eq!(clicked.connection_count(), 1);
}
