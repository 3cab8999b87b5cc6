//! Unattended bulk rewriting.
//!
//! Files are processed strictly in list order on one dedicated thread.
//! Every destructive step is preceded by a `.bak` copy and every
//! replacement goes through the atomic temp-file rename, so a crash or a
//! cancellation between any two steps leaves each file either fully
//! original or fully rewritten, never truncated.
//!
//! ## Per-file outcomes
//!
//! | Outcome | Meaning |
//! |---------|---------|
//! | `Succeeded` | backed up, rewritten in canonical compact form |
//! | `Skipped` | decode refused or layout is extended; backup written, original untouched |
//! | `Errored` | I/O failure; original left as it was, backup kept if already made |
//!
//! Cancellation is cooperative and checked only at file boundaries: a
//! request stops the next file from starting but never interrupts a file
//! mid-write.  Events go out fire-and-forget; a dropped receiver cannot
//! stall the run.

use crossbeam_channel::Sender;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::rebuild::{copy_to_backup, rebuild_preserving_original, write_atomic};

/// Shared cancellation flag.  Setting it is idempotent; clones observe the
/// same flag from any thread.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone)]
pub enum BatchEvent {
    Started { total: usize },
    Succeeded { name: String },
    Skipped { name: String, reason: String },
    Errored { name: String, reason: String },
    /// Sent after every file regardless of its outcome.
    Progress { processed: usize, total: usize },
    Finished(BatchSummary),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub skipped: usize,
    pub errored: usize,
    pub cancelled: bool,
}

/// Run the batch on the calling thread.  Emits the full event stream and
/// returns the summary that was also sent as [`BatchEvent::Finished`].
pub fn run(files: &[PathBuf], events: &Sender<BatchEvent>, cancel: &CancelToken) -> BatchSummary {
    let mut summary = BatchSummary {
        total: files.len(),
        ..BatchSummary::default()
    };
    events.send(BatchEvent::Started { total: files.len() }).ok();

    for (index, path) in files.iter().enumerate() {
        if cancel.is_cancelled() {
            summary.cancelled = true;
            break;
        }

        let name = display_name(path);
        match rewrite_one(path) {
            Outcome::Succeeded => {
                summary.succeeded += 1;
                events.send(BatchEvent::Succeeded { name }).ok();
            }
            Outcome::Skipped(reason) => {
                summary.skipped += 1;
                events.send(BatchEvent::Skipped { name, reason }).ok();
            }
            Outcome::Errored(reason) => {
                summary.errored += 1;
                events.send(BatchEvent::Errored { name, reason }).ok();
            }
        }
        events
            .send(BatchEvent::Progress {
                processed: index + 1,
                total: files.len(),
            })
            .ok();
    }

    events.send(BatchEvent::Finished(summary)).ok();
    summary
}

/// Run the batch on a dedicated background thread.
pub fn spawn(
    files: Vec<PathBuf>,
    events: Sender<BatchEvent>,
    cancel: CancelToken,
) -> JoinHandle<BatchSummary> {
    thread::spawn(move || run(&files, &events, &cancel))
}

enum Outcome {
    Succeeded,
    Skipped(String),
    Errored(String),
}

fn rewrite_one(path: &Path) -> Outcome {
    // Read failure: nothing to back up, nothing was touched.
    let original = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => return Outcome::Errored(e.to_string()),
    };

    match rebuild_preserving_original(&original) {
        Err(refusal) => {
            // Extended layout or undecodable bytes.  Keep a backup for the
            // operator and leave the original byte-for-byte unchanged.
            match copy_to_backup(path) {
                Ok(()) => Outcome::Skipped(refusal.to_string()),
                Err(e) => Outcome::Errored(e.to_string()),
            }
        }
        Ok(rebuilt) => {
            if let Err(e) = copy_to_backup(path) {
                return Outcome::Errored(e.to_string());
            }
            match write_atomic(path, &rebuilt) {
                Ok(()) => Outcome::Succeeded,
                Err(e) => Outcome::Errored(e.to_string()),
            }
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
