//! Ctrl+C handling for cooperative cancellation.
//!
//! A single [`ShutdownHandler`] per process owns an `Arc<AtomicBool>`. The
//! flag is handed to the finder, which passes it on to the walker and the
//! coordinator. Once it is set no new directory task does any work, running
//! tasks stop at their next entry, and the scan returns partial results.
//!
//! ```rust,no_run
//! use dupewalk::duplicates::FinderConfig;
//! use dupewalk::signal::install_handler;
//!
//! let handler = install_handler().unwrap();
//! let config = FinderConfig::default().with_shutdown_flag(handler.flag());
//! ```

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

/// Shared cancellation flag.
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandler {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandler {
    /// Create a handler with no shutdown requested.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether Ctrl+C was pressed or [`ShutdownHandler::request_shutdown`] was called.
    #[must_use]
    pub fn is_shutdown_requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Raise the flag.
    pub fn request_shutdown(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Lower the flag again.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }

    /// The shared flag, for components that poll it.
    #[must_use]
    pub fn flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }
}

/// Error type for signal handler installation.
#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    /// Failed to install the Ctrl+C handler.
    #[error("Failed to install signal handler: {0}")]
    InstallFailed(#[from] ctrlc::Error),
}

static GLOBAL_HANDLER: OnceLock<ShutdownHandler> = OnceLock::new();

/// Register the process-wide Ctrl+C hook and return its handler.
///
/// The hook is registered on the first call. Later calls (for example
/// several `run_app` invocations in one test binary) get the same handler
/// back with its flag cleared.
///
/// On interrupt the flag is set and "Interrupted. Cleaning up..." is
/// written to stderr.
///
/// # Errors
///
/// Returns [`SignalError::InstallFailed`] if another Ctrl+C hook was
/// registered outside this module. The handler still works for manual
/// [`ShutdownHandler::request_shutdown`] calls on later invocations.
pub fn install_handler() -> Result<ShutdownHandler, SignalError> {
    let mut failure = None;
    let handler = GLOBAL_HANDLER.get_or_init(|| {
        let handler = ShutdownHandler::new();
        if let Err(e) = register(handler.flag()) {
            failure = Some(e);
        }
        handler
    });
    if let Some(e) = failure {
        return Err(e.into());
    }

    handler.reset();
    Ok(handler.clone())
}

fn register(flag: Arc<AtomicBool>) -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
        let mut stderr = std::io::stderr();
        let _ = writeln!(stderr, "\nInterrupted. Cleaning up...");
        let _ = stderr.flush();
    })
}
