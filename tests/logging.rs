// Resize logging, only built with `--features logging`.
//
// A capturing `log::Log` collects every record emitted in this test binary.
// Tests run in parallel, so each one looks for its own exact message rather
// than counting records.
#![cfg(feature = "logging")]

use log::{Level, LevelFilter, Log, Metadata, Record};
use prime_tables::{ChainedTable, ProbingTable};
use std::sync::{Mutex, Once};

struct Capture;

static CAPTURE: Capture = Capture;
static RECORDS: Mutex<Vec<(Level, String)>> = Mutex::new(Vec::new());
static INIT: Once = Once::new();

impl Log for Capture {
    fn enabled(&self, _: &Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &Record<'_>) {
        if let Ok(mut records) = RECORDS.lock() {
            records.push((record.level(), record.args().to_string()));
        }
    }

    fn flush(&self) {}
}

fn install() {
    INIT.call_once(|| {
        log::set_logger(&CAPTURE).expect("no other logger in this binary");
        log::set_max_level(LevelFilter::Debug);
    });
}

fn logged(level: Level, message: &str) -> bool {
    RECORDS
        .lock()
        .unwrap()
        .iter()
        .any(|(l, m)| *l == level && m == message)
}

// Test: automatic growth in the chained table.
// Assumes: capacity 3 reaches load 1.0 after three keys; the fourth put
// rebuilds into next_prime(6) == 7 buckets.
#[test]
fn chained_growth_emits_debug_record() {
    install();
    let mut t = ChainedTable::new(3);
    for i in 0..4 {
        t.put(&format!("c{i}"), i);
    }
    assert_eq!(t.capacity(), 7);
    assert!(logged(
        Level::Debug,
        "chained table resized: 3 -> 7 buckets (3 entries)"
    ));
}

// Test: automatic growth in the probing table.
// Assumes: capacity 3 reaches load 0.5 after two keys; the third put
// rebuilds into 7 slots.
#[test]
fn probing_growth_emits_debug_record() {
    install();
    let mut t = ProbingTable::new(3);
    for i in 0..3 {
        t.put(&format!("p{i}"), i);
    }
    assert_eq!(t.capacity(), 7);
    assert!(logged(
        Level::Debug,
        "probing table resized to 7 slots (2 entries)"
    ));
}

// Test: saturated resize target.
// Verifies: five keys sharing one probe path cannot fit in 5 slots (only
// three squares mod 5 are distinct), so the rebuild warns and settles on 11.
#[test]
fn saturated_resize_emits_warning() {
    install();
    let mut t = ProbingTable::with_hasher(11, |_: &str| 0u64);
    for k in ["a", "b", "c", "d", "e"] {
        t.put(k, ());
    }
    t.resize(5);
    assert_eq!(t.capacity(), 11);
    assert_eq!(t.len(), 5);
    assert!(logged(
        Level::Warn,
        "probing table: 5 entries do not all fit in 5 slots, growing"
    ));
    assert!(logged(
        Level::Debug,
        "probing table resized to 11 slots (5 entries)"
    ));
}
