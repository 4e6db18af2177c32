//! Latest-only sequencing for debounced product search.
//!
//! Every keystroke (or input line) takes a ticket. A search may only run,
//! and its results may only be shown, while its ticket is still the newest
//! one issued. Older requests are abandoned rather than awaited.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchTicket(u64);

#[derive(Debug, Default)]
struct Inner {
    latest: AtomicU64,
    publish: Mutex<()>,
}

#[derive(Debug, Clone, Default)]
pub struct SearchSequencer {
    inner: Arc<Inner>,
}

impl SearchSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Supersedes every ticket issued before.
    pub fn issue(&self) -> SearchTicket {
        SearchTicket(self.inner.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: SearchTicket) -> bool {
        self.inner.latest.load(Ordering::SeqCst) == ticket.0
    }

    /// Waits out the debounce window; false if a newer ticket arrived.
    pub fn debounce(&self, ticket: SearchTicket, window: Duration) -> bool {
        thread::sleep(window);
        self.is_current(ticket)
    }

    /// Runs `show` only if `ticket` is still the latest. Publishing is
    /// serialized so a stale result can never land after a newer one.
    pub fn publish<F: FnOnce()>(&self, ticket: SearchTicket, show: F) -> bool {
        let _guard = self
            .inner
            .publish
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if !self.is_current(ticket) {
            tracing::debug!(ticket = ticket.0, "dropping stale search result");
            return false;
        }
        show();
        true
    }

    /// Serves queued searches one at a time until every sender is gone.
    /// Requests already superseded when dequeued are skipped without
    /// waiting out the window.
    pub fn run_latest<T, S, P>(
        &self,
        requests: Receiver<(SearchTicket, String)>,
        window: Duration,
        mut search: S,
        mut show: P,
    ) where
        S: FnMut(&str) -> T,
        P: FnMut(&str, T),
    {
        for (ticket, query) in requests {
            if !self.is_current(ticket) || !self.debounce(ticket, window) {
                tracing::debug!(ticket = ticket.0, "skipping superseded search");
                continue;
            }
            let found = search(&query);
            self.publish(ticket, || show(&query, found));
        }
    }
}
