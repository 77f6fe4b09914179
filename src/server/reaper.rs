//! Reclamation of finished session tasks.

use std::future::Future;

use tokio::task::{JoinError, JoinSet};
use tracing::error;

/// Registry of session tasks that have been spawned but not yet reclaimed.
///
/// The accept loop reaps non-blockingly before every wait and is woken by
/// [`SessionReaper::join_next`] whenever a session finishes, so the set
/// stays drained even on an otherwise idle server.
#[derive(Default)]
pub struct SessionReaper {
    tasks: JoinSet<()>,
}

impl SessionReaper {
    pub fn new() -> Self {
        Self {
            tasks: JoinSet::new(),
        }
    }

    /// Number of sessions not yet reclaimed.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Track one session task.
    pub fn spawn<F>(&mut self, session: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.tasks.spawn(session);
    }

    /// Collect every finished session without blocking. Safe on an empty
    /// set.
    pub fn reap_finished(&mut self) {
        while let Some(result) = self.tasks.try_join_next() {
            log_termination(result);
        }
    }

    /// Wait for the next session to finish and reclaim it. Resolves to
    /// `None` immediately when the set is empty, so select arms over this
    /// must be guarded on `!is_empty()`.
    pub async fn join_next(&mut self) -> Option<()> {
        let result = self.tasks.join_next().await?;
        log_termination(result);
        Some(())
    }
}

fn log_termination(result: std::result::Result<(), JoinError>) {
    if let Err(e) = result {
        if e.is_panic() {
            error!("session task panicked: {}", e);
        }
    }
}
