//! Durable store tests: round-trip through fresh controllers, cold starts
//! on bad stores, and failure isolation when the store is unwritable.

use std::fs;

use adaptive_difficulty::{
    Action, AdaptiveDifficultyAgent, AttemptOutcome, ControllerConfig, LoadStatus, QTable,
    QTableStore, StateKey, StoreError, Tier, STORE_VERSION,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tempfile::tempdir;

#[test]
fn saved_entries_reload_into_a_fresh_controller() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("q_table.json");
    let cfg = ControllerConfig::default().with_store_path(&path);

    let key = StateKey::new("math", 3, Tier::Excellent);
    let mut table = QTable::new();
    table.insert(key.clone(), [1.0, 2.0, 3.0]);
    QTableStore::new(&path).save(&table).expect("save");

    let (mut agent, status) = AdaptiveDifficultyAgent::open(&cfg, 0);
    assert_eq!(status, LoadStatus::Loaded { entries: 1 });
    assert_eq!(agent.table().peek(&key), Some(&[1.0, 2.0, 3.0]));
    // loaded rows are not re-seeded
    assert_eq!(agent.get_values(&key), [1.0, 2.0, 3.0]);
}

#[test]
fn every_learn_persists_the_full_table() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("q_table.json");
    let cfg = ControllerConfig::default()
        .with_store_path(&path)
        .with_epsilon(0.0);

    let (mut agent, status) = AdaptiveDifficultyAgent::open(&cfg, 0);
    assert_eq!(status, LoadStatus::Missing);

    let step = agent.process_attempt(&AttemptOutcome {
        category: "memory".to_string(),
        difficulty: 2,
        correct: true,
        elapsed_secs: 4.0,
        hint_used: false,
    });
    assert_eq!(step.persist_error, None);

    let on_disk = QTableStore::new(&path).load().expect("load").expect("present");
    assert_eq!(&on_disk, agent.table());

    // A second controller picks up where the first left off.
    let (second, status) = AdaptiveDifficultyAgent::open(&cfg, 99);
    assert_eq!(status, LoadStatus::Loaded { entries: 2 });
    assert_eq!(
        second
            .table()
            .peek(&StateKey::new("memory", 2, Tier::Excellent)),
        Some(&[0.0, 1.0, 16.5])
    );
}

#[test]
fn corrupt_store_starts_cold() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("q_table.json");
    fs::write(&path, "\u{0}\u{1}garbage").unwrap();

    let cfg = ControllerConfig::default().with_store_path(&path);
    let (agent, status) = AdaptiveDifficultyAgent::open(&cfg, 0);

    assert!(agent.table().is_empty());
    assert!(matches!(status, LoadStatus::Discarded(StoreError::Parse { .. })));
}

#[test]
fn future_schema_version_starts_cold() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("q_table.json");
    let future = format!(
        r#"{{"format":"adaptive-difficulty/q-table","version":{},"entries":[
            {{"category":"math","difficulty":1,"tier":"Average","values":[1.0,2.0,3.0]}}]}}"#,
        STORE_VERSION + 1
    );
    fs::write(&path, future).unwrap();

    let cfg = ControllerConfig::default().with_store_path(&path);
    let (agent, status) = AdaptiveDifficultyAgent::open(&cfg, 0);

    assert!(agent.table().is_empty());
    assert_eq!(
        status,
        LoadStatus::Discarded(StoreError::VersionMismatch {
            found: STORE_VERSION + 1,
            expected: STORE_VERSION,
        })
    );
}

#[test]
fn unwritable_store_does_not_block_learning() {
    let dir = tempdir().expect("tempdir");
    // Parent "directory" is a regular file, so every save fails.
    let blocker = dir.path().join("not_a_dir");
    fs::write(&blocker, b"x").unwrap();
    let cfg = ControllerConfig::default()
        .with_store_path(blocker.join("q_table.json"))
        .with_epsilon(0.0);

    let (mut agent, status) = AdaptiveDifficultyAgent::open(&cfg, 0);
    assert!(agent.table().is_empty());
    // A failed read on the path is either "missing" or "discarded"; both start cold.
    assert!(matches!(status, LoadStatus::Missing | LoadStatus::Discarded(_)));

    let state = StateKey::new("math", 3, Tier::Excellent);
    let next = state.next(4);
    let out = agent.learn(&state, Action::Increase, 15.0, &next);

    assert!(matches!(out.persist_error, Some(StoreError::Io { .. })));
    assert_eq!(out.update.updated, 16.5);
    assert_eq!(agent.table().peek(&state), Some(&[0.0, 1.0, 16.5]));

    // The loop keeps going after a failed save.
    let out = agent.learn(&state, Action::Increase, 15.0, &next);
    assert!(out.persist_error.is_some());
    assert!(out.update.updated > 16.5);
}

#[test]
fn save_overwrites_previous_contents() {
    let dir = tempdir().expect("tempdir");
    let store = QTableStore::new(dir.path().join("q_table.json"));

    let mut big = QTable::new();
    for d in 1..=5 {
        big.insert(StateKey::new("math", d, Tier::Average), [0.0, 0.0, 0.0]);
    }
    store.save(&big).unwrap();

    let mut small = QTable::new();
    small.insert(StateKey::new("memory", 1, Tier::Excellent), [9.0, 8.0, 7.0]);
    store.save(&small).unwrap();

    assert_eq!(store.load().unwrap(), Some(small));
}

#[test]
fn learned_values_reload_bit_for_bit() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("q_table.json");
    let cfg = ControllerConfig::default().with_store_path(&path);

    let (mut agent, _) = AdaptiveDifficultyAgent::open(&cfg, 21);
    let mut rng = ChaCha8Rng::seed_from_u64(22);
    let mut difficulty = 3;
    for i in 0..3000 {
        let step = agent.process_attempt(&AttemptOutcome {
            category: if i % 2 == 0 { "math" } else { "memory" }.to_string(),
            difficulty,
            correct: rng.gen_bool(0.6),
            elapsed_secs: rng.gen_range(0.5..25.0),
            hint_used: rng.gen_bool(0.2),
        });
        assert_eq!(step.persist_error, None);
        difficulty = step.next_difficulty;
    }

    let (reopened, status) = AdaptiveDifficultyAgent::open(&cfg, 0);
    assert_eq!(status, LoadStatus::Loaded { entries: agent.table().len() });
    assert_eq!(reopened.table(), agent.table());
}
