//! Tests that files and previews stay index-aligned across edits.

mod common;

use std::sync::Arc;

use paper_analyzer_files::{FileStore, InMemoryPreviewBackend, SelectionPolicy};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn assert_aligned(store: &FileStore) {
    assert_eq!(store.files().count(), store.previews().count());
    for index in 0..store.len() {
        let resource = store
            .resolve_preview(index)
            .expect("every live preview should resolve");
        let file = &store.entries()[index];
        assert_eq!(resource.name, file.file().name);
        assert_eq!(resource.source, file.file().source);
    }
}

#[test]
fn store_alignment_tests_random_add_remove_sequences() {
    let backend = Arc::new(InMemoryPreviewBackend::with_seed(11));
    let mut store = FileStore::new(backend.clone(), SelectionPolicy::default());
    let mut rng = StdRng::seed_from_u64(42);
    let mut counter = 0_u32;

    for _ in 0..500 {
        if store.is_empty() || rng.random_bool(0.55) {
            let batch = rng.random_range(1..4);
            let files = (0..batch)
                .map(|_| {
                    counter += 1;
                    common::image(&format!("page-{counter}.png"))
                })
                .collect();
            let report = store.add(files);
            assert_eq!(report.accepted, batch);
        } else {
            let index = rng.random_range(0..store.len());
            store.remove(index).expect("index is in range");
        }

        assert_aligned(&store);
        assert_eq!(backend.live_count(), store.len());
    }
}

#[test]
fn store_alignment_tests_add_appends_and_keeps_duplicates() {
    let backend = Arc::new(InMemoryPreviewBackend::with_seed(3));
    let mut store = FileStore::new(backend, SelectionPolicy::default());

    store.add(vec![common::image("a.png"), common::image("b.png")]);
    store.add(vec![common::image("a.png")]);

    let names: Vec<_> = store.files().map(|file| file.name.as_str()).collect();
    assert_eq!(names, vec!["a.png", "b.png", "a.png"]);
    assert_aligned(&store);
}

#[test]
fn store_alignment_tests_out_of_range_remove_is_rejected_without_change() {
    let backend = Arc::new(InMemoryPreviewBackend::with_seed(5));
    let mut store = FileStore::new(backend.clone(), SelectionPolicy::default());
    store.add(vec![common::image("a.png")]);

    let error = store.remove(3).expect_err("index 3 is out of range");
    assert_eq!(
        error.to_string(),
        "no file at index 3 (selection has 1 files)"
    );
    assert_eq!(store.len(), 1);
    assert_eq!(backend.released_count(), 0);
    assert_aligned(&store);
}
