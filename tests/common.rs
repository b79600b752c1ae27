use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use slotwire::{HasSlots, Slots};

/// Returns a recorder to hand out to fixtures and a drain that takes
/// everything recorded so far, in order.
#[allow(unused)]
pub fn journal() -> (Arc<dyn Fn(String) + Send + Sync>, Box<dyn Fn() -> Vec<String> + Send + Sync>) {
    let entries = Arc::new(Mutex::new(Vec::new()));
    let record = {
        let entries = entries.clone();
        Arc::new(move |entry: String| {
            entries.lock().unwrap().push(entry);
        }) as Arc<dyn Fn(String) + Send + Sync>
    };
    let drain = Box::new(move || {
        let drained: Vec<String> = entries.lock().unwrap().drain(..).collect();
        drained
    });
    (record, drain)
}

/// Receiver fixture: a lamp that journals what happens to it.
pub struct Lamp {
    slots: Slots,
    name: &'static str,
    hits: AtomicUsize,
    journal: Arc<dyn Fn(String) + Send + Sync>,
}

impl Lamp {
    #[allow(unused)]
    pub fn new(name: &'static str, journal: Arc<dyn Fn(String) + Send + Sync>) -> Arc<Self> {
        Arc::new(Self { slots: Slots::new(), name, hits: AtomicUsize::new(0), journal })
    }

    #[allow(unused)]
    pub fn silent(name: &'static str) -> Arc<Self> {
        Self::new(name, Arc::new(|_| {}))
    }

    pub fn turn_on(&self) {
        self.hits.fetch_add(1, Ordering::SeqCst);
        (self.journal)(format!("{} on", self.name));
    }

    #[allow(unused)]
    pub fn turn_off(&self) {
        self.hits.fetch_add(1, Ordering::SeqCst);
        (self.journal)(format!("{} off", self.name));
    }

    #[allow(unused)]
    pub fn dim(&self, level: i32) {
        self.hits.fetch_add(1, Ordering::SeqCst);
        (self.journal)(format!("{} dim {level}", self.name));
    }

    #[allow(unused)]
    pub fn toggle2(&self, a: i32, b: i32) {
        self.hits.fetch_add(1, Ordering::SeqCst);
        (self.journal)(format!("{} toggle {a},{b}", self.name));
    }

    #[allow(unused)]
    pub fn set_rgb(&self, r: u8, g: u8, b: u8) {
        self.hits.fetch_add(1, Ordering::SeqCst);
        (self.journal)(format!("{} rgb {r},{g},{b}", self.name));
    }

    #[allow(unused)]
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

impl HasSlots for Lamp {
    fn slots(&self) -> &Slots {
        &self.slots
    }
}
