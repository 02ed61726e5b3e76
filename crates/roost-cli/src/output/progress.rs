//! Progress display for dependency resolution.
//!
//! Wired to the resolver's discovery/completion callbacks; redraws are
//! throttled so fast local resolutions do not flood the terminal.

use std::io::{self, Write};
use std::sync::Mutex;
use std::time::{Duration, Instant};

struct Counters {
    found: usize,
    resolved: usize,
    last_update: Instant,
}

/// Running found/resolved counter rendered on a single terminal line
pub struct ResolveProgress {
    inner: Mutex<Counters>,
}

impl ResolveProgress {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Counters {
                found: 0,
                resolved: 0,
                last_update: Instant::now(),
            }),
        }
    }

    /// Record a newly discovered module
    pub fn found(&self, total: usize) {
        let mut inner = self.lock();
        inner.found = inner.found.max(total);
        Self::maybe_display(&mut inner);
    }

    /// Record a completed (or failed) resolution
    pub fn resolved(&self, total: usize) {
        let mut inner = self.lock();
        inner.resolved = inner.resolved.max(total);
        Self::maybe_display(&mut inner);
    }

    /// Print the final state and move off the progress line
    pub fn finish(&self) {
        let inner = self.lock();
        Self::display(&inner);
        println!();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Counters> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Redraw at most every 50ms to avoid flickering
    fn maybe_display(inner: &mut Counters) {
        let now = Instant::now();
        if now.duration_since(inner.last_update) > Duration::from_millis(50) {
            Self::display(inner);
            inner.last_update = now;
        }
    }

    fn display(inner: &Counters) {
        print!(
            "\rResolving modules... {}/{} resolved",
            inner.resolved, inner.found
        );
        let _ = io::stdout().flush();
    }
}

impl Default for ResolveProgress {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_totals_are_monotonic() {
        let progress = ResolveProgress::new();
        progress.found(1);
        progress.found(3);
        progress.found(2); // late callback, must not move the counter back
        progress.resolved(1);

        let inner = progress.lock();
        assert_eq!(inner.found, 3);
        assert_eq!(inner.resolved, 1);
    }
}
