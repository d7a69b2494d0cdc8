use core_sync::SyncOnceCell;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

#[test]
fn empty_until_set() {
    let cell = SyncOnceCell::<u32>::new();
    assert!(cell.get().is_none());

    assert_eq!(cell.set(7), Ok(&7));
    assert_eq!(cell.get(), Some(&7));
}

#[test]
fn second_set_hands_the_value_back() {
    let cell = SyncOnceCell::new();
    assert!(cell.set(String::from("first")).is_ok());
    assert_eq!(cell.set(String::from("second")), Err(String::from("second")));
    assert_eq!(cell.get().map(String::as_str), Some("first"));
}

#[test]
fn racing_sets_have_exactly_one_winner() {
    static CELL: SyncOnceCell<usize> = SyncOnceCell::new();
    static WINS: AtomicUsize = AtomicUsize::new(0);

    let threads = 8;
    let start = Arc::new(Barrier::new(threads));
    let handles: Vec<_> = (0..threads)
        .map(|i| {
            let start = Arc::clone(&start);
            thread::spawn(move || {
                start.wait();
                match CELL.set(i) {
                    Ok(v) => {
                        WINS.fetch_add(1, Ordering::SeqCst);
                        Some(*v)
                    }
                    Err(rejected) => {
                        assert_eq!(rejected, i);
                        None
                    }
                }
            })
        })
        .collect();

    let winners: Vec<usize> = handles.into_iter().filter_map(|h| h.join().unwrap()).collect();
    assert_eq!(WINS.load(Ordering::SeqCst), 1);
    assert_eq!(CELL.get(), Some(&winners[0]));
}

#[test]
fn dropping_the_cell_drops_the_value() {
    let value = Arc::new(());
    {
        let cell = SyncOnceCell::new();
        assert!(cell.set(Arc::clone(&value)).is_ok());
        assert_eq!(Arc::strong_count(&value), 2);
    }
    assert_eq!(Arc::strong_count(&value), 1);
}
