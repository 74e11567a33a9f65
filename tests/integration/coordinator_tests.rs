//! Integration tests for coordinator construction, mutation, and observers.

use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Weak};

use agent_steward::coordinator::PersistErrorMode;
use agent_steward::models::state::{WorkflowState, WorkflowStatus};
use agent_steward::persistence::store;
use agent_steward::{AppError, Coordinator};

#[test]
fn empty_coordinator_persists_first_update() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("session").join("state.json");

    let coordinator = Coordinator::new_empty(&path);
    let initial = coordinator.snapshot();
    assert_eq!(initial.status, WorkflowStatus::Working);
    assert!(initial.progress.is_empty());
    assert!(initial.messages.is_empty());
    assert!(!path.exists(), "empty construction does not write");

    coordinator.update(|state| state.task = "x".into()).unwrap();

    let reloaded = store::load(&path).unwrap();
    assert_eq!(reloaded.task, "x");
    assert_eq!(reloaded.status, WorkflowStatus::Working);
}

#[test]
fn open_restores_persisted_state() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("state.json");

    let first = Coordinator::new_empty(&path);
    first
        .update(|state| {
            state.task = "resume me".into();
            state.append_progress("planner", "step one");
        })
        .unwrap();
    drop(first);

    let second = Coordinator::open(&path).unwrap();
    let state = second.snapshot();
    assert_eq!(state.task, "resume me");
    assert_eq!(state.progress.len(), 1);
    assert_eq!(second.state_path(), path.as_path());
}

#[test]
fn open_missing_file_fails_with_io() {
    let dir = tempfile::tempdir().expect("tempdir");
    let result = Coordinator::open(dir.path().join("absent.json"));
    assert!(matches!(result, Err(AppError::Io(_))));
}

#[test]
fn open_malformed_file_fails_with_decode() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("state.json");
    fs::write(&path, "[]").unwrap();
    assert!(matches!(Coordinator::open(&path), Err(AppError::Decode(_))));
}

#[test]
fn seeded_coordinator_writes_immediately() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("seed").join("state.json");
    let seed = WorkflowState {
        task: "seeded".into(),
        status: WorkflowStatus::AgentDone,
        ..WorkflowState::default()
    };

    let coordinator = Coordinator::with_state(&path, seed.clone()).unwrap();
    assert_eq!(store::load(&path).unwrap(), seed);
    assert_eq!(coordinator.snapshot(), seed);
}

#[test]
fn seeded_coordinator_surfaces_write_failure() {
    let dir = tempfile::tempdir().expect("tempdir");
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, "file, not a directory").unwrap();

    let result = Coordinator::with_state(blocker.join("state.json"), WorkflowState::new());
    assert!(matches!(result, Err(AppError::Io(_))));
}

#[test]
fn update_returns_mutation_output() {
    let dir = tempfile::tempdir().expect("tempdir");
    let coordinator = Coordinator::new_empty(dir.path().join("state.json"));

    let id = coordinator
        .update(|state| state.post_message("planner", "builder", "hi"))
        .unwrap();
    assert_eq!(coordinator.snapshot().messages[0].id, id);
}

#[test]
fn snapshot_is_a_detached_copy() {
    let dir = tempfile::tempdir().expect("tempdir");
    let coordinator = Coordinator::new_empty(dir.path().join("state.json"));

    let mut copy = coordinator.snapshot();
    copy.task = "local edit".into();
    assert!(coordinator.snapshot().task.is_empty());
}

#[test]
fn failed_write_keeps_in_memory_mutation_and_skips_observer() {
    let dir = tempfile::tempdir().expect("tempdir");
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, "file, not a directory").unwrap();

    let coordinator = Coordinator::new_empty(blocker.join("state.json"));
    let calls = Arc::new(AtomicUsize::new(0));
    let observed = Arc::clone(&calls);
    coordinator.set_observer(move || {
        observed.fetch_add(1, Ordering::SeqCst);
    });

    let result = coordinator.update(|state| state.task = "unsaved".into());
    assert!(matches!(result, Err(AppError::Io(_))));
    assert_eq!(coordinator.snapshot().task, "unsaved", "no rollback");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn log_and_continue_mode_reports_success_on_write_failure() {
    let dir = tempfile::tempdir().expect("tempdir");
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, "file, not a directory").unwrap();

    let coordinator = Coordinator::new_empty(blocker.join("state.json"));
    let result = coordinator.update_with_mode(PersistErrorMode::LogAndContinue, |state| {
        state.task = "best effort".into();
        7
    });
    assert_eq!(result.unwrap(), 7);
    assert_eq!(coordinator.snapshot().task, "best effort");
}

#[test]
fn best_effort_write_failure_skips_observer() {
    let dir = tempfile::tempdir().expect("tempdir");
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, "file, not a directory").unwrap();

    let coordinator = Coordinator::new_empty(blocker.join("state.json"));
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    coordinator.set_observer(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let result = coordinator.update_with_mode(PersistErrorMode::LogAndContinue, |state| {
        state.task = "unsaved".into();
    });
    assert!(result.is_ok());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn observer_runs_after_each_successful_update() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("state.json");
    let coordinator = Coordinator::new_empty(&path);

    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&seen);
    let observed_path = path.clone();
    coordinator.set_observer(move || {
        // The document is already on disk when the observer runs.
        let on_disk = store::load(&observed_path).unwrap();
        log.lock().unwrap().push(on_disk.task);
    });

    coordinator.update(|state| state.task = "one".into()).unwrap();
    coordinator.update(|state| state.task = "two".into()).unwrap();

    assert_eq!(*seen.lock().unwrap(), ["one", "two"]);
}

#[test]
fn observer_may_reenter_coordinator() {
    let dir = tempfile::tempdir().expect("tempdir");
    let coordinator = Arc::new(Coordinator::new_empty(dir.path().join("state.json")));

    let weak: Weak<Coordinator> = Arc::downgrade(&coordinator);
    let seen_status = Arc::new(Mutex::new(None));
    let record = Arc::clone(&seen_status);
    coordinator.set_observer(move || {
        if let Some(coordinator) = weak.upgrade() {
            *record.lock().unwrap() = Some(coordinator.snapshot().status);
        }
    });

    coordinator
        .update(|state| state.status = WorkflowStatus::AgentDone)
        .unwrap();
    assert_eq!(*seen_status.lock().unwrap(), Some(WorkflowStatus::AgentDone));
}

#[test]
fn set_observer_replaces_previous() {
    let dir = tempfile::tempdir().expect("tempdir");
    let coordinator = Coordinator::new_empty(dir.path().join("state.json"));

    let first = Arc::new(AtomicUsize::new(0));
    let second = Arc::new(AtomicUsize::new(0));
    let f = Arc::clone(&first);
    coordinator.set_observer(move || {
        f.fetch_add(1, Ordering::SeqCst);
    });
    let s = Arc::clone(&second);
    coordinator.set_observer(move || {
        s.fetch_add(1, Ordering::SeqCst);
    });

    coordinator.update(|state| state.task = "t".into()).unwrap();
    assert_eq!(first.load(Ordering::SeqCst), 0);
    assert_eq!(second.load(Ordering::SeqCst), 1);
}

#[test]
fn concurrent_updates_are_all_applied() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("state.json");
    let coordinator = Arc::new(Coordinator::new_empty(&path));

    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let coordinator = Arc::clone(&coordinator);
            std::thread::spawn(move || {
                for step in 0..10 {
                    coordinator
                        .update(|state| state.append_progress(format!("w{worker}"), format!("s{step}")))
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(coordinator.snapshot().progress.len(), 80);
    // Every write is renamed into place whole, so the file always decodes.
    assert!(store::load(&path).is_ok());

    // Racing writes may leave an older snapshot on disk; the next write
    // brings the document back in line with memory.
    coordinator.update(|state| state.task = "settled".into()).unwrap();
    let on_disk = store::load(&path).unwrap();
    assert_eq!(on_disk.progress.len(), 80);
    assert_eq!(on_disk.task, "settled");
}

#[test]
fn coordinator_does_not_restrict_status_values() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("state.json");
    let coordinator = Coordinator::new_empty(&path);

    coordinator
        .update(|state| state.status = WorkflowStatus::from("custom-status"))
        .unwrap();
    assert_eq!(
        store::load(&path).unwrap().status,
        WorkflowStatus::Other("custom-status".into())
    );
}
