//! Terminal display surface.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use axprogress_session::DisplaySink;

/// Terminal stand-in for the host's read-only text window: each refresh
/// replaces the visible block wholesale, reading from the top. Write
/// failures are swallowed; a broken pipe must not take the session down.
#[derive(Default)]
pub struct TerminalDisplay {
    closed: AtomicBool,
}

impl TerminalDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the surface as externally closed; the session observes this
    /// on its next tick.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Relaxed);
    }
}

#[async_trait]
impl DisplaySink for TerminalDisplay {
    async fn replace_text(&self, text: &str) {
        let mut stdout = io::stdout().lock();
        let _ = writeln!(stdout, "----- progress -----");
        let _ = writeln!(stdout, "{text}");
        let _ = writeln!(stdout, "--------------------");
    }

    async fn announce(&self, message: &str) {
        let mut stdout = io::stdout().lock();
        let _ = writeln!(stdout, "* {message}");
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Relaxed)
    }
}
