use crossbeam_channel::unbounded;
use std::fs;
use std::path::PathBuf;

use bnry::batch::{self, BatchEvent, BatchSummary, CancelToken};
use bnry::document::IplFile;
use bnry::header::{HEADER_FIELD_COUNT, HEADER_SIZE, MAGIC};
use bnry::rebuild::{backup_path, write_atomic};
use bnry::records::InstanceRecord;

fn sample_instance() -> InstanceRecord {
    InstanceRecord {
        pos: [1.0, 2.0, 3.0],
        rot: [0.0, 0.0, 0.0, 1.0],
        obj_id: 620,
        interior: 2,
        flags: 4,
    }
}

/// A valid file in a deliberately non-canonical shape: one zero-length gap
/// byte between header and instance array, so a rewrite must change bytes.
fn padded_file() -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(MAGIC);
    let mut fields = [0u32; HEADER_FIELD_COUNT];
    fields[0] = 1;
    fields[6] = (HEADER_SIZE + 1) as u32;
    for field in fields {
        bytes.extend_from_slice(&field.to_le_bytes());
    }
    bytes.push(0xEE);
    sample_instance().write(&mut bytes).unwrap();
    bytes
}

fn extended_file() -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(MAGIC);
    let mut fields = [0u32; HEADER_FIELD_COUNT];
    fields[0] = 1;
    fields[6] = HEADER_SIZE as u32;
    fields[8] = 5;
    for field in fields {
        bytes.extend_from_slice(&field.to_le_bytes());
    }
    sample_instance().write(&mut bytes).unwrap();
    bytes
}

fn run_batch(files: &[PathBuf]) -> (BatchSummary, Vec<BatchEvent>) {
    let (tx, rx) = unbounded();
    let summary = batch::run(files, &tx, &CancelToken::new());
    drop(tx);
    (summary, rx.iter().collect())
}

#[test]
fn test_batch_rewrites_compact_file_with_backup() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("area51.ipl");
    let original = padded_file();
    fs::write(&path, &original).unwrap();

    let (summary, events) = run_batch(&[path.clone()]);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.total, 1);
    assert!(!summary.cancelled);

    // Backup holds the pre-rewrite bytes.
    assert_eq!(fs::read(backup_path(&path)).unwrap(), original);

    // Destination is the canonical form: same records, no gap byte.
    let rewritten = fs::read(&path).unwrap();
    assert_ne!(rewritten, original);
    let file = IplFile::decode(&rewritten).unwrap();
    assert_eq!(file.header.instance_offset(), HEADER_SIZE as u32);
    assert_eq!(file.instances[0], sample_instance());
    assert_eq!(file.instances[0].interior, 2);

    assert!(events
        .iter()
        .any(|e| matches!(e, BatchEvent::Succeeded { name } if name == "area51.ipl")));
}

#[test]
fn test_batch_skips_extended_file_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("custom.ipl");
    let original = extended_file();
    fs::write(&path, &original).unwrap();

    let (summary, events) = run_batch(&[path.clone()]);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.succeeded, 0);

    assert_eq!(fs::read(&path).unwrap(), original);
    assert_eq!(fs::read(backup_path(&path)).unwrap(), original);

    assert!(events
        .iter()
        .any(|e| matches!(e, BatchEvent::Skipped { name, .. } if name == "custom.ipl")));
}

#[test]
fn test_batch_reports_unreadable_file_without_backup() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.ipl");

    let (summary, events) = run_batch(&[path.clone()]);
    assert_eq!(summary.errored, 1);
    assert!(!backup_path(&path).exists());
    assert!(events
        .iter()
        .any(|e| matches!(e, BatchEvent::Errored { name, .. } if name == "missing.ipl")));
}

#[test]
fn test_batch_isolates_failures_per_file() {
    let dir = tempfile::tempdir().unwrap();

    // First file's backup path is blocked by a directory, so its backup
    // copy fails; the second file must still be processed.
    let blocked = dir.path().join("blocked.ipl");
    fs::write(&blocked, padded_file()).unwrap();
    fs::create_dir(backup_path(&blocked)).unwrap();

    let good = dir.path().join("good.ipl");
    fs::write(&good, padded_file()).unwrap();

    let (summary, _) = run_batch(&[blocked.clone(), good.clone()]);
    assert_eq!(summary.errored, 1);
    assert_eq!(summary.succeeded, 1);

    // The blocked file was never replaced.
    assert_eq!(fs::read(&blocked).unwrap(), padded_file());
    // The good one was.
    assert_ne!(fs::read(&good).unwrap(), padded_file());
}

#[test]
fn test_cancelled_run_starts_no_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("untouched.ipl");
    let original = padded_file();
    fs::write(&path, &original).unwrap();

    let (tx, rx) = unbounded();
    let cancel = CancelToken::new();
    cancel.cancel();
    cancel.cancel(); // idempotent

    let summary = batch::run(&[path.clone()], &tx, &cancel);
    drop(tx);

    assert!(summary.cancelled);
    assert_eq!(summary.succeeded + summary.skipped + summary.errored, 0);
    assert_eq!(fs::read(&path).unwrap(), original);
    assert!(!backup_path(&path).exists());

    // The summary still goes out after early cancellation.
    let events: Vec<BatchEvent> = rx.iter().collect();
    assert!(events
        .iter()
        .any(|e| matches!(e, BatchEvent::Finished(s) if s.cancelled)));
}

#[test]
fn test_spawned_batch_delivers_events_across_threads() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("threaded.ipl");
    fs::write(&path, padded_file()).unwrap();

    let (tx, rx) = unbounded();
    let handle = batch::spawn(vec![path], tx, CancelToken::new());

    let events: Vec<BatchEvent> = rx.iter().collect();
    let summary = handle.join().unwrap();
    assert_eq!(summary.succeeded, 1);
    assert!(events
        .iter()
        .any(|e| matches!(e, BatchEvent::Progress { processed: 1, total: 1 })));
}

#[test]
fn test_failed_replace_leaves_destination_and_no_temp() {
    let dir = tempfile::tempdir().unwrap();

    // The destination is a non-empty directory, so the final rename fails
    // after the temp file was fully written.
    let dest = dir.path().join("occupied.ipl");
    fs::create_dir(&dest).unwrap();
    fs::write(dest.join("keep"), b"x").unwrap();

    assert!(write_atomic(&dest, &padded_file()).is_err());

    // Destination untouched, temp file cleaned up.
    assert!(dest.is_dir());
    assert_eq!(fs::read(dest.join("keep")).unwrap(), b"x");
    let entries: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(entries.len(), 1, "stray temp file left behind: {entries:?}");
}
