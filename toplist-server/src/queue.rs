//! World-mutation task queue.
//!
//! Ranking fetches run on a tokio runtime; their results come back through
//! an unbounded channel and are applied only when the host drains the queue
//! from its game tick.
//!
//! ```text
//! game tick ──spawn_*──▶ tokio task ──fetch_top_or_empty──▶ channel
//!     ▲                                                        │
//!     └──────────────────────── drain() ◀──────────────────────┘
//! ```

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use toplist_core::lifecycle::{CreateTicket, SessionToken};
use toplist_core::types::RankedEntity;
use toplist_ranking::RankingClient;
use tracing::debug;

/// A fetched result waiting to be applied on the world-mutation context.
#[derive(Debug, Clone)]
pub enum WorldTask {
    /// Rankings for a pending placement.
    CreateReady {
        /// Placement request the rankings belong to.
        ticket: CreateTicket,
        /// Fetched rankings, empty on failure.
        ranked: Vec<RankedEntity>,
    },
    /// Rankings for a refresh cycle.
    RefreshReady {
        /// Session the refresh was started in.
        token: SessionToken,
        /// Fetched rankings, empty on failure.
        ranked: Vec<RankedEntity>,
    },
}

/// Counters describing queue traffic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueStats {
    /// Fetches spawned and not yet delivered.
    pub in_flight: usize,
    /// Fetches spawned in total.
    pub total_spawned: u64,
    /// Results handed to the host via [`WorldQueue::drain`] or [`WorldQueue::recv`].
    pub total_applied: u64,
}

/// Spawns ranking fetches and collects their results for the game tick.
pub struct WorldQueue {
    runtime: Handle,
    client: Arc<RankingClient>,
    tx: UnboundedSender<WorldTask>,
    rx: UnboundedReceiver<WorldTask>,
    stats: Arc<Mutex<QueueStats>>,
}

impl std::fmt::Debug for WorldQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorldQueue")
            .field("client", &self.client)
            .field("stats", &*self.stats.lock())
            .finish_non_exhaustive()
    }
}

impl WorldQueue {
    /// Create a queue whose fetches run on `runtime`.
    #[must_use]
    pub fn new(runtime: Handle, client: RankingClient) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            runtime,
            client: Arc::new(client),
            tx,
            rx,
            stats: Arc::new(Mutex::new(QueueStats::default())),
        }
    }

    /// The ranking client fetches go through.
    #[must_use]
    pub fn client(&self) -> &RankingClient {
        &self.client
    }

    /// Fetch `limit` rows for a pending placement.
    pub fn spawn_create(&self, ticket: CreateTicket, limit: usize) {
        self.spawn(limit, move |ranked| WorldTask::CreateReady { ticket, ranked });
    }

    /// Fetch `limit` rows for a refresh cycle.
    pub fn spawn_refresh(&self, token: SessionToken, limit: usize) {
        self.spawn(limit, move |ranked| WorldTask::RefreshReady { token, ranked });
    }

    fn spawn<F>(&self, limit: usize, complete: F)
    where
        F: FnOnce(Vec<RankedEntity>) -> WorldTask + Send + 'static,
    {
        {
            let mut stats = self.stats.lock();
            stats.in_flight += 1;
            stats.total_spawned += 1;
        }

        let client = Arc::clone(&self.client);
        let tx = self.tx.clone();
        let stats = Arc::clone(&self.stats);
        self.runtime.spawn(async move {
            let ranked = client.fetch_top_or_empty(limit).await;
            if tx.send(complete(ranked)).is_err() {
                debug!("World queue closed, dropping fetched rankings");
                stats.lock().in_flight -= 1;
            }
        });
    }

    /// Take every result that has arrived, oldest first. Never blocks.
    pub fn drain(&mut self) -> Vec<WorldTask> {
        let mut tasks = Vec::new();
        while let Ok(task) = self.rx.try_recv() {
            tasks.push(task);
        }
        if !tasks.is_empty() {
            let mut stats = self.stats.lock();
            stats.in_flight = stats.in_flight.saturating_sub(tasks.len());
            stats.total_applied += tasks.len() as u64;
        }
        tasks
    }

    /// Wait for the next result.
    ///
    /// For hosts that drive the world from an async loop; tick-based hosts
    /// use [`WorldQueue::drain`].
    pub async fn recv(&mut self) -> Option<WorldTask> {
        let task = self.rx.recv().await?;
        let mut stats = self.stats.lock();
        stats.in_flight = stats.in_flight.saturating_sub(1);
        stats.total_applied += 1;
        Some(task)
    }

    /// Current traffic counters.
    #[must_use]
    pub fn stats(&self) -> QueueStats {
        *self.stats.lock()
    }
}
