// tests/watch_real_fs.rs

use std::error::Error;
use std::fs;
use std::time::Duration;

use tempfile::tempdir;

use watchrun::engine::{rebuild_queue, TriggerReason, REBUILD_QUEUE_CAPACITY};
use watchrun::fs::RealFileSystem;
use watchrun::watch::{discover_watch_set, spawn_watcher, EventFilter, WatchPattern};
use watchrun_test_utils::{init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn discovers_nested_directories_and_skips_hidden_ones() -> TestResult {
    let tmp = tempdir()?;
    let root = tmp.path();
    fs::create_dir_all(root.join("cmd/server"))?;
    fs::create_dir_all(root.join("internal"))?;
    fs::create_dir_all(root.join(".git/objects"))?;
    fs::create_dir_all(root.join("web/.cache/deep"))?;
    fs::write(root.join("main.go"), "package main")?;

    let set = discover_watch_set(&RealFileSystem, root)?;

    assert!(set.contains(root));
    assert!(set.contains(&root.join("cmd")));
    assert!(set.contains(&root.join("cmd/server")));
    assert!(set.contains(&root.join("internal")));
    assert!(set.contains(&root.join("web")));
    assert!(!set.contains(&root.join(".git")));
    assert!(!set.contains(&root.join(".git/objects")));
    assert!(!set.contains(&root.join("web/.cache")));
    assert!(!set.contains(&root.join("web/.cache/deep")));
    assert!(!set.contains(&root.join("main.go")));
    assert_eq!(set.len(), 5);
    Ok(())
}

#[test]
fn root_that_is_a_file_is_rejected() -> TestResult {
    let tmp = tempdir()?;
    let file = tmp.path().join("main.go");
    fs::write(&file, "package main")?;

    assert!(discover_watch_set(&RealFileSystem, &file).is_err());
    Ok(())
}

#[tokio::test]
async fn writing_a_matching_file_queues_a_rebuild() -> TestResult {
    init_tracing();
    let tmp = tempdir()?;
    let root = tmp.path();
    fs::create_dir_all(root.join("pkg"))?;

    let set = discover_watch_set(&RealFileSystem, root)?;
    let (tx, mut rx) = rebuild_queue(REBUILD_QUEUE_CAPACITY);
    let filter = EventFilter::new(WatchPattern::new("*.txt")?, tx);
    let handle = spawn_watcher(&set, filter)?;
    assert_eq!(handle.watched(), 2);

    // Give the backend a moment to arm its watches.
    tokio::time::sleep(Duration::from_millis(100)).await;

    fs::write(root.join("pkg/ignored.bin"), "x")?;
    fs::write(root.join("pkg/notes.txt"), "hello")?;

    let signal = with_timeout(rx.recv()).await.ok_or("queue closed")?;
    assert_eq!(signal.reason, TriggerReason::FileChange);

    drop(handle);
    Ok(())
}

#[tokio::test]
async fn file_renamed_into_place_queues_a_rebuild() -> TestResult {
    init_tracing();
    let tmp = tempdir()?;
    let root = tmp.path();
    // Written before the watcher starts, like an editor's scratch file.
    fs::write(root.join("notes.tmp"), "draft")?;

    let set = discover_watch_set(&RealFileSystem, root)?;
    let (tx, mut rx) = rebuild_queue(REBUILD_QUEUE_CAPACITY);
    let filter = EventFilter::new(WatchPattern::new("*.txt")?, tx);
    let handle = spawn_watcher(&set, filter)?;

    tokio::time::sleep(Duration::from_millis(100)).await;
    fs::rename(root.join("notes.tmp"), root.join("notes.txt"))?;

    let signal = with_timeout(rx.recv()).await.ok_or("queue closed")?;
    assert_eq!(signal.reason, TriggerReason::FileChange);

    drop(handle);
    Ok(())
}
