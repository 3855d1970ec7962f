//! Plugin façade for a game-server host.
//!
//! The host forwards its events, operator commands and ticks here, all from
//! the world-mutation thread. Ranking fetches run on the tokio runtime given
//! at construction; their results are applied on the next [`ToplistPlugin::on_tick`].

use std::time::Instant;

use tokio::runtime::Handle;
use toplist_core::config::ToplistConfig;
use toplist_core::lifecycle::ToplistManager;
use toplist_core::persistence::PlacementStore;
use toplist_core::renderer::Renderer;
use toplist_core::types::{Actor, ActorId};
use toplist_ranking::RankingClient;
use tracing::{debug, info};

use crate::commands::{self, OperatorCommand};
use crate::events::GameEvent;
use crate::queue::{WorldQueue, WorldTask};
use crate::schedule::RefreshSchedule;

/// A message for one operator, produced when a deferred command completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outbound {
    /// Recipient.
    pub actor: ActorId,
    /// Prefixed reply text.
    pub message: String,
}

/// Wires configuration, the lifecycle manager, the ranking client and the
/// task queue together behind the host's callbacks.
#[derive(Debug)]
pub struct ToplistPlugin<R: Renderer> {
    config: ToplistConfig,
    manager: ToplistManager<R>,
    queue: WorldQueue,
    schedule: RefreshSchedule,
}

impl<R: Renderer> ToplistPlugin<R> {
    /// Create a plugin using the score store named in `config.database`.
    #[must_use]
    pub fn new(config: ToplistConfig, renderer: R, runtime: Handle) -> Self {
        let client = RankingClient::from_config(&config.database);
        Self::with_client(config, renderer, client, runtime)
    }

    /// Create a plugin with an explicit ranking client.
    #[must_use]
    pub fn with_client(
        config: ToplistConfig,
        renderer: R,
        client: RankingClient,
        runtime: Handle,
    ) -> Self {
        let store = PlacementStore::from_config(&config.persistence);
        let manager = ToplistManager::new(renderer, store, &config.display);
        let schedule = RefreshSchedule::from_config(&config.display);

        info!(
            enabled = config.general.enabled,
            top_count = config.display.top_count,
            timed_refresh = schedule.is_enabled(),
            store = %manager.store().directory().display(),
            "Toplist plugin ready"
        );

        Self {
            config,
            manager,
            queue: WorldQueue::new(runtime, client),
            schedule,
        }
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &ToplistConfig {
        &self.config
    }

    /// The lifecycle manager.
    #[must_use]
    pub fn manager(&self) -> &ToplistManager<R> {
        &self.manager
    }

    /// Mutable access to the lifecycle manager.
    pub fn manager_mut(&mut self) -> &mut ToplistManager<R> {
        &mut self.manager
    }

    /// The task queue.
    #[must_use]
    pub fn queue(&self) -> &WorldQueue {
        &self.queue
    }

    // ------------------------------------------------------------------
    // Host callbacks
    // ------------------------------------------------------------------

    /// React to a host event.
    pub fn on_event(&mut self, event: &GameEvent, now: Instant) {
        if !self.config.general.enabled {
            return;
        }

        match event {
            GameEvent::MapStart { map } => {
                let report = self.manager.load_world(map);
                self.schedule.reset(now);
                if report.created > 0 {
                    self.request_refresh();
                }
            }
            GameEvent::MapEnd | GameEvent::Shutdown => {
                self.manager.unload_world();
            }
            GameEvent::RoundStart => {
                self.request_refresh();
            }
        }
    }

    /// Handle an operator command.
    ///
    /// Returns `None` when the command is not a toplist command. Otherwise
    /// returns the immediate reply, if any; placements reply later through
    /// [`ToplistPlugin::on_tick`].
    pub fn on_command(&mut self, actor: &Actor, command: &str) -> Option<String> {
        let command = OperatorCommand::parse(command)?;
        if !self.config.general.enabled {
            return None;
        }
        if let Err(reply) = commands::authorize(actor) {
            info!(actor = %actor.name, command = command.name(), "Command denied");
            return Some(commands::format_reply(&reply));
        }

        match command {
            OperatorCommand::Place => match self.manager.begin_create(actor) {
                Ok(ticket) => {
                    self.queue.spawn_create(ticket, self.manager.top_count());
                    None
                }
                Err(reply) => Some(commands::format_reply(&reply)),
            },
            OperatorCommand::Remove => {
                let reply = self.manager.remove_nearest(actor);
                Some(commands::format_reply(&reply))
            }
        }
    }

    /// Advance timers and apply every fetched result.
    ///
    /// Returns replies for operators whose placements completed.
    pub fn on_tick(&mut self, now: Instant) -> Vec<Outbound> {
        if !self.config.general.enabled {
            return Vec::new();
        }
        if self.schedule.poll(now) {
            debug!("Timed refresh due");
            self.request_refresh();
        }

        let mut outbound = Vec::new();
        for task in self.queue.drain() {
            if let Some(message) = self.apply(task) {
                outbound.push(message);
            }
        }
        outbound
    }

    /// Apply one fetched result.
    ///
    /// Async hosts feed [`WorldQueue::recv`] results through here instead of
    /// calling [`ToplistPlugin::on_tick`].
    pub fn apply(&mut self, task: WorldTask) -> Option<Outbound> {
        match task {
            WorldTask::CreateReady { ticket, ranked } => {
                let reply = self.manager.complete_create(&ticket, &ranked);
                Some(Outbound {
                    actor: ticket.actor,
                    message: commands::format_reply(&reply),
                })
            }
            WorldTask::RefreshReady { token, ranked } => {
                self.manager.complete_refresh(token, &ranked);
                None
            }
        }
    }

    /// Start a refresh of every live display. Returns `false` when no world
    /// session is active.
    pub fn request_refresh(&self) -> bool {
        match self.manager.begin_refresh() {
            Some(token) => {
                self.queue.spawn_refresh(token, self.manager.top_count());
                true
            }
            None => false,
        }
    }

    /// Mutable access to the task queue, for hosts that await results.
    pub fn queue_mut(&mut self) -> &mut WorldQueue {
        &mut self.queue
    }
}
