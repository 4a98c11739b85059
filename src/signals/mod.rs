//! Interrupt handling for graceful shutdown.
//!
//! Signals do not abort the process directly; they set a shared flag the
//! pipeline polls between atomic steps, so a download is never killed
//! mid-stream and temp-dir cleanup always runs.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared cancellation flag, cloneable across tasks.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// Spawn watchers for SIGINT (and SIGTERM on unix) that set the returned
/// flag. Must be called from within a tokio runtime.
pub fn install() -> CancelFlag {
    let flag = CancelFlag::new();

    let interrupt = flag.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nInterrupted, finishing current step before cleanup...");
            interrupt.cancel();
        }
    });

    #[cfg(unix)]
    {
        let terminate = flag.clone();
        tokio::spawn(async move {
            use tokio::signal::unix::{signal, SignalKind};
            if let Ok(mut stream) = signal(SignalKind::terminate()) {
                if stream.recv().await.is_some() {
                    terminate.cancel();
                }
            }
        });
    }

    flag
}
