//! Scan control: cooperative cancellation and progress reporting.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::Error;

/// Shared cancellation flag, checked once per candidate.
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

/// Receives progress from a corpus scan. Every method defaults to doing nothing.
pub trait ScanObserver {
    /// About to process candidate `index` (0-indexed) of `total`.
    fn candidate(&self, _index: usize, _total: usize, _location: &str) {}

    /// A candidate was skipped; the scan goes on.
    fn skipped(&self, _location: &str, _error: &Error) {}

    fn finished(&self, _scanned: usize, _cancelled: bool) {}
}

/// Observer that reports nothing.
pub struct Silent;

impl ScanObserver for Silent {}

/// Observer that writes status lines to stderr when it is a terminal.
pub struct StatusObserver;

impl ScanObserver for StatusObserver {
    fn candidate(&self, index: usize, total: usize, location: &str) {
        log_status!("scan", "({}/{}) {}", index + 1, total, location);
    }

    fn skipped(&self, location: &str, error: &Error) {
        log_status!("scan", "Skipped {}: {}", location, error.cause());
    }

    fn finished(&self, scanned: usize, cancelled: bool) {
        if cancelled {
            log_status!("scan", "Cancelled after {} candidate(s)", scanned);
        } else {
            log_status!("scan", "Scanned {} candidate(s)", scanned);
        }
    }
}

/// Cancellation and observation for one scan.
pub struct ScanControl<'a> {
    pub cancel: CancelToken,
    pub observer: &'a dyn ScanObserver,
}

impl<'a> ScanControl<'a> {
    pub fn new(cancel: CancelToken, observer: &'a dyn ScanObserver) -> Self {
        Self { cancel, observer }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl ScanControl<'static> {
    /// Uncancellable scan with no progress output.
    pub fn silent() -> Self {
        Self {
            cancel: CancelToken::new(),
            observer: &Silent,
        }
    }
}
