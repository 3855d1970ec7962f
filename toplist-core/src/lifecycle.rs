//! Display lifecycle manager.
//!
//! Reconciles durable placements with live renderer handles for one loaded
//! world at a time:
//!
//! ```text
//! Unloaded ──load_world──▶ Loading ──▶ Active ──unload_world──▶ Unloading ──▶ Unloaded
//!                                       │  ▲
//!                                       └──┘ create / remove / refresh
//! ```
//!
//! Every method here must run on the world mutation context. Operations that
//! need ranking data are split in two: `begin_*` hands out a ticket carrying
//! the session epoch, the caller fetches rankings off-thread, and
//! `complete_*` applies the result only if that session is still active.

use tracing::{debug, error, info, warn};

use crate::config::DisplayConfig;
use crate::error::ToplistError;
use crate::format::ContentFormatter;
use crate::geometry::nearest_within;
use crate::persistence::PlacementStore;
use crate::placement::PlacementRecord;
use crate::registry::DisplayRegistry;
use crate::renderer::{RenderError, Renderer};
use crate::types::{Actor, ActorId, DisplayHandle, RankedEntity};

/// Operator-facing messages.
pub mod messages {
    /// Renderer capability missing.
    pub const RENDERER_UNAVAILABLE: &str = "Failed to get the world text API.";
    /// No world session.
    pub const NO_WORLD: &str = "No map is loaded.";
    /// Nothing within removal range.
    pub const MOVE_CLOSER: &str = "Move closer to the Toplist that you want to remove.";
    /// Removal done.
    pub const REMOVED: &str = "Toplist removed!";
    /// Removal done, but the saved placement could not be updated.
    pub const REMOVED_NOT_SAVED: &str = "Toplist removed, but its saved placement could not be updated.";
    /// Placement done.
    pub const PLACED: &str = "Toplist placed!";
    /// Placement live, but not saved.
    pub const PLACED_NOT_SAVED: &str = "Toplist placed, but its position could not be saved.";
    /// Renderer refused to create the display.
    pub const PLACE_FAILED: &str = "Failed to place the Toplist.";
    /// Renderer refused to destroy the display.
    pub const REMOVE_FAILED: &str = "Failed to remove the Toplist.";
    /// The map changed while rankings were being fetched.
    pub const STALE: &str = "The map changed before the Toplist was ready.";
}

/// Lifecycle state of the current world session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No world loaded.
    Unloaded,
    /// Recreating persisted displays.
    Loading,
    /// Displays live; commands and refreshes accepted.
    Active,
    /// Tearing displays down.
    Unloading,
}

/// Identifies the world session an async operation was started in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionToken {
    epoch: u64,
}

/// Pending "place a display" request awaiting ranking data.
#[derive(Debug, Clone)]
pub struct CreateTicket {
    /// Session the request belongs to.
    pub token: SessionToken,
    /// Requesting actor; the display is created in front of them.
    pub actor: ActorId,
    /// Requesting actor's name, for logs.
    pub actor_name: String,
}

/// Short status message for the requesting operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandReply {
    /// Whether the operation did what was asked.
    pub success: bool,
    /// Text shown to the operator.
    pub message: String,
}

impl CommandReply {
    /// Successful reply.
    #[must_use]
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    /// Failed reply.
    #[must_use]
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Outcome of [`ToplistManager::load_world`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    /// World that was loaded.
    pub world_id: String,
    /// Records found on disk.
    pub persisted: usize,
    /// Displays created and registered.
    pub created: usize,
    /// Records that could not be shown.
    pub skipped: usize,
    /// Displays torn down from a previous session first.
    pub replaced: usize,
}

#[derive(Debug)]
struct WorldSession {
    world_id: String,
    epoch: u64,
    registry: DisplayRegistry,
}

/// Owns the live displays of the loaded world and keeps them in step with
/// the placement store.
#[derive(Debug)]
pub struct ToplistManager<R: Renderer> {
    renderer: R,
    store: PlacementStore,
    formatter: ContentFormatter,
    proximity_threshold: f32,
    state: SessionState,
    session: Option<WorldSession>,
    next_epoch: u64,
}

impl<R: Renderer> ToplistManager<R> {
    /// Create a manager with no world loaded.
    #[must_use]
    pub fn new(renderer: R, store: PlacementStore, config: &DisplayConfig) -> Self {
        Self {
            renderer,
            store,
            formatter: ContentFormatter::from_config(config),
            proximity_threshold: config.proximity_threshold,
            state: SessionState::Unloaded,
            session: None,
            next_epoch: 1,
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Identifier of the loaded world.
    #[must_use]
    pub fn world_id(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.world_id.as_str())
    }

    /// Live displays of the loaded world.
    #[must_use]
    pub fn registry(&self) -> Option<&DisplayRegistry> {
        self.session.as_ref().map(|s| &s.registry)
    }

    /// Number of live displays (0 when no world is loaded).
    #[must_use]
    pub fn display_count(&self) -> usize {
        self.registry().map_or(0, DisplayRegistry::len)
    }

    /// The renderer.
    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Mutable access to the renderer.
    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// The placement store.
    #[must_use]
    pub fn store(&self) -> &PlacementStore {
        &self.store
    }

    /// Number of ranked rows each display shows.
    #[must_use]
    pub fn top_count(&self) -> usize {
        self.formatter.top_count()
    }

    /// Whether `token` still refers to the active session.
    #[must_use]
    pub fn is_current(&self, token: SessionToken) -> bool {
        self.state == SessionState::Active
            && self.session.as_ref().is_some_and(|s| s.epoch == token.epoch)
    }

    // ------------------------------------------------------------------
    // World load / unload
    // ------------------------------------------------------------------

    /// Start a session for `world_id`, recreating one empty display per
    /// persisted placement.
    ///
    /// Any previous session is torn down first. Renderer failures skip the
    /// affected record and never abort the load.
    pub fn load_world(&mut self, world_id: &str) -> LoadReport {
        let replaced = if self.session.is_some() {
            info!(world = %world_id, "Replacing previous world session");
            self.unload_world()
        } else {
            0
        };

        self.state = SessionState::Loading;
        let records = self.store.load_and_migrate(world_id);
        let mut registry = DisplayRegistry::new();
        let mut skipped = 0;

        for record in &records {
            if !self.renderer.is_available() {
                warn!(world = %world_id, placement = %record.id, "Renderer unavailable, skipping placement");
                skipped += 1;
                continue;
            }
            match self.renderer.create_display_at(record.transform(), &[]) {
                Ok(handle) => {
                    debug!(world = %world_id, placement = %record.id, handle = %handle, "Restored display");
                    registry.insert(handle, Some(record.id), Vec::new());
                }
                Err(e) => {
                    warn!(world = %world_id, placement = %record.id, error = %e, "Failed to restore display");
                    skipped += 1;
                }
            }
        }

        let epoch = self.next_epoch;
        self.next_epoch += 1;
        let created = registry.len();
        self.session = Some(WorldSession {
            world_id: world_id.to_string(),
            epoch,
            registry,
        });
        self.state = SessionState::Active;

        info!(world = %world_id, persisted = records.len(), created, skipped, "World session active");
        LoadReport {
            world_id: world_id.to_string(),
            persisted: records.len(),
            created,
            skipped,
            replaced,
        }
    }

    /// End the current session, destroying every live display.
    ///
    /// Persisted placements are left untouched. Returns the number of
    /// destroy calls issued.
    pub fn unload_world(&mut self) -> usize {
        let Some(mut session) = self.session.take() else {
            self.state = SessionState::Unloaded;
            return 0;
        };

        self.state = SessionState::Unloading;
        let handles = session.registry.drain();
        for &handle in &handles {
            if let Err(e) = self.renderer.destroy_display(handle) {
                warn!(world = %session.world_id, handle = %handle, error = %e, "Failed to destroy display");
            }
        }
        self.state = SessionState::Unloaded;

        info!(world = %session.world_id, destroyed = handles.len(), "World session unloaded");
        handles.len()
    }

    // ------------------------------------------------------------------
    // Create
    // ------------------------------------------------------------------

    /// Validate a "place a display" request before rankings are fetched.
    ///
    /// # Errors
    /// Returns the reply to send when the request cannot proceed.
    pub fn begin_create(&self, actor: &Actor) -> Result<CreateTicket, CommandReply> {
        let token = self.require_session().map_err(|e| {
            debug!(actor = %actor.name, error = %e, "Placement refused");
            match e {
                ToplistError::RendererUnavailable => CommandReply::fail(messages::RENDERER_UNAVAILABLE),
                _ => CommandReply::fail(messages::NO_WORLD),
            }
        })?;

        debug!(actor = %actor.name, "Placement requested");
        Ok(CreateTicket {
            token,
            actor: actor.id,
            actor_name: actor.name.clone(),
        })
    }

    /// Create the display for `ticket` with freshly fetched rankings and
    /// persist where the renderer put it.
    ///
    /// When the renderer cannot report a transform the display stays live
    /// and registered but is not persisted.
    pub fn complete_create(&mut self, ticket: &CreateTicket, ranked: &[RankedEntity]) -> CommandReply {
        if !self.is_current(ticket.token) {
            debug!(actor = %ticket.actor_name, "Dropping placement for a stale session");
            return CommandReply::fail(messages::STALE);
        }
        if !self.renderer.is_available() {
            return CommandReply::fail(messages::RENDERER_UNAVAILABLE);
        }

        let lines = self.formatter.format(ranked);
        let handle = match self.renderer.create_display_for_actor(ticket.actor, &lines) {
            Ok(handle) => handle,
            Err(e) => {
                error!(actor = %ticket.actor_name, error = %e, "Failed to create display");
                return CommandReply::fail(messages::PLACE_FAILED);
            }
        };

        let transform = self.renderer.resolved_transform(handle);
        let Some(session) = self.session.as_mut() else {
            return CommandReply::fail(messages::NO_WORLD);
        };

        let Some(transform) = transform else {
            error!(handle = %handle, "Failed to resolve location or rotation of new display");
            session.registry.insert(handle, None, lines);
            return CommandReply::fail(messages::PLACED_NOT_SAVED);
        };

        let record = PlacementRecord::new(transform);
        let placement = record.id;
        match self.store.append(&session.world_id, record) {
            Ok(()) => {
                session.registry.insert(handle, Some(placement), lines);
                info!(
                    world = %session.world_id,
                    actor = %ticket.actor_name,
                    handle = %handle,
                    placement = %placement,
                    location = %transform.location,
                    "Toplist placed"
                );
                CommandReply::ok(messages::PLACED)
            }
            Err(e) => {
                error!(world = %session.world_id, handle = %handle, error = %e, "Failed to persist placement");
                session.registry.insert(handle, None, lines);
                CommandReply::fail(messages::PLACED_NOT_SAVED)
            }
        }
    }

    // ------------------------------------------------------------------
    // Refresh
    // ------------------------------------------------------------------

    /// Token for a refresh cycle, or `None` when no session is active.
    #[must_use]
    pub fn begin_refresh(&self) -> Option<SessionToken> {
        self.active_token()
    }

    /// Push the same freshly formatted leaderboard to every live display.
    ///
    /// Never creates or destroys displays; handles the renderer no longer
    /// knows are dropped from the registry. Returns the number of displays
    /// updated.
    pub fn complete_refresh(&mut self, token: SessionToken, ranked: &[RankedEntity]) -> usize {
        if !self.is_current(token) {
            debug!("Dropping refresh for a stale session");
            return 0;
        }
        if !self.renderer.is_available() {
            warn!("Renderer unavailable, skipping refresh");
            return 0;
        }

        let lines = self.formatter.format(ranked);
        let Some(session) = self.session.as_mut() else {
            return 0;
        };

        let mut updated = 0;
        for handle in session.registry.handles() {
            match self.renderer.update_display(handle, &lines) {
                Ok(()) => {
                    session.registry.set_lines(handle, lines.clone());
                    updated += 1;
                }
                Err(RenderError::UnknownHandle(_)) => {
                    warn!(world = %session.world_id, handle = %handle, "Display vanished, unregistering");
                    session.registry.remove(handle);
                }
                Err(e) => {
                    warn!(world = %session.world_id, handle = %handle, error = %e, "Failed to update display");
                }
            }
        }

        debug!(world = %session.world_id, updated, rows = lines.len() - 1, "Refreshed toplists");
        updated
    }

    // ------------------------------------------------------------------
    // Remove
    // ------------------------------------------------------------------

    /// Destroy the live display closest to `actor` (within the proximity
    /// threshold) and forget its placement.
    pub fn remove_nearest(&mut self, actor: &Actor) -> CommandReply {
        if !self.renderer.is_available() {
            return CommandReply::fail(messages::RENDERER_UNAVAILABLE);
        }
        if self.active_token().is_none() {
            return CommandReply::fail(messages::NO_WORLD);
        }
        let Some((handle, distance)) = self.nearest_display(actor) else {
            debug!(actor = %actor.name, "No display within removal range");
            return CommandReply::fail(messages::MOVE_CLOSER);
        };

        match self.renderer.destroy_display(handle) {
            Ok(()) | Err(RenderError::UnknownHandle(_)) => {}
            Err(e) => {
                error!(handle = %handle, error = %e, "Failed to destroy display");
                return CommandReply::fail(messages::REMOVE_FAILED);
            }
        }

        let Some(session) = self.session.as_mut() else {
            return CommandReply::fail(messages::NO_WORLD);
        };
        let placement = session.registry.remove(handle).and_then(|e| e.placement);
        info!(
            world = %session.world_id,
            actor = %actor.name,
            handle = %handle,
            distance,
            "Toplist removed"
        );

        let Some(placement) = placement else {
            return CommandReply::ok(messages::REMOVED);
        };
        match self.store.remove(&session.world_id, placement) {
            Ok(true) => CommandReply::ok(messages::REMOVED),
            Ok(false) => {
                warn!(world = %session.world_id, placement = %placement, "Placement already missing from store");
                CommandReply::ok(messages::REMOVED)
            }
            Err(e) => {
                error!(world = %session.world_id, placement = %placement, error = %e, "Failed to remove placement");
                CommandReply::fail(messages::REMOVED_NOT_SAVED)
            }
        }
    }

    /// Live handle for `actor`'s nearest display within the proximity
    /// threshold, and its distance. `None` when the actor has no position.
    #[must_use]
    pub fn nearest_display(&self, actor: &Actor) -> Option<(DisplayHandle, f32)> {
        let session = self.session.as_ref()?;
        let origin = actor.position?;
        let candidates = session.registry.handles().into_iter().filter_map(|handle| {
            self.renderer
                .resolved_transform(handle)
                .map(|t| (handle, t.location))
        });
        nearest_within(origin, candidates, self.proximity_threshold)
    }

    fn require_session(&self) -> crate::error::Result<SessionToken> {
        if !self.renderer.is_available() {
            return Err(ToplistError::RendererUnavailable);
        }
        self.active_token().ok_or(ToplistError::NoActiveWorld)
    }

    fn active_token(&self) -> Option<SessionToken> {
        match (&self.session, self.state) {
            (Some(session), SessionState::Active) => Some(SessionToken {
                epoch: session.epoch,
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::types::{Angles, DisplayLine, Transform, Vec3};

    #[derive(Debug, Default)]
    struct StubRenderer {
        next: u64,
        live: HashMap<DisplayHandle, Vec<DisplayLine>>,
        hide_transforms: bool,
    }

    impl Renderer for StubRenderer {
        fn is_available(&self) -> bool {
            true
        }

        fn create_display_for_actor(
            &mut self,
            _actor: ActorId,
            lines: &[DisplayLine],
        ) -> Result<DisplayHandle, RenderError> {
            self.create_display_at(Transform::default(), lines)
        }

        fn create_display_at(
            &mut self,
            _transform: Transform,
            lines: &[DisplayLine],
        ) -> Result<DisplayHandle, RenderError> {
            self.next += 1;
            let handle = DisplayHandle(self.next);
            self.live.insert(handle, lines.to_vec());
            Ok(handle)
        }

        fn update_display(
            &mut self,
            handle: DisplayHandle,
            lines: &[DisplayLine],
        ) -> Result<(), RenderError> {
            let slot = self.live.get_mut(&handle).ok_or(RenderError::UnknownHandle(handle))?;
            *slot = lines.to_vec();
            Ok(())
        }

        fn destroy_display(&mut self, handle: DisplayHandle) -> Result<(), RenderError> {
            self.live
                .remove(&handle)
                .map(|_| ())
                .ok_or(RenderError::UnknownHandle(handle))
        }

        fn resolved_transform(&self, handle: DisplayHandle) -> Option<Transform> {
            (!self.hide_transforms && self.live.contains_key(&handle)).then(|| Transform {
                location: Vec3::new(1.0, 2.0, 3.0),
                orientation: Angles::new(0.0, 90.0, 0.0),
            })
        }
    }

    fn operator() -> Actor {
        Actor {
            id: ActorId(1),
            name: "admin".into(),
            position: Some(Vec3::default()),
            privileged: true,
        }
    }

    fn manager(dir: &std::path::Path) -> ToplistManager<StubRenderer> {
        ToplistManager::new(
            StubRenderer::default(),
            PlacementStore::new(dir),
            &DisplayConfig::default(),
        )
    }

    #[test]
    fn starts_unloaded() {
        let dir = tempfile::tempdir().expect("tempdir");
        let manager = manager(dir.path());
        assert_eq!(manager.state(), SessionState::Unloaded);
        assert!(manager.begin_refresh().is_none());
        assert_eq!(
            manager.begin_create(&operator()).expect_err("no world").message,
            messages::NO_WORLD
        );
    }

    #[test]
    fn stale_ticket_is_ignored_after_reload() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut manager = manager(dir.path());
        manager.load_world("de_dust2");
        let ticket = manager.begin_create(&operator()).expect("ticket");

        manager.load_world("de_mirage");
        let reply = manager.complete_create(&ticket, &[]);

        assert!(!reply.success);
        assert_eq!(manager.display_count(), 0);
        assert!(manager.renderer().live.is_empty());
    }

    #[test]
    fn stale_refresh_after_unload_is_noop() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut manager = manager(dir.path());
        manager.load_world("de_dust2");
        let token = manager.begin_refresh().expect("token");
        manager.unload_world();

        assert_eq!(manager.complete_refresh(token, &[RankedEntity::new("a", 1, 1)]), 0);
        assert_eq!(manager.state(), SessionState::Unloaded);
    }

    #[test]
    fn unresolved_transform_keeps_handle_but_skips_persisting() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut manager = manager(dir.path());
        manager.renderer_mut().hide_transforms = true;
        manager.load_world("de_dust2");

        let ticket = manager.begin_create(&operator()).expect("ticket");
        let reply = manager.complete_create(&ticket, &[]);

        assert_eq!(reply, CommandReply::fail(messages::PLACED_NOT_SAVED));
        assert_eq!(manager.display_count(), 1);
        assert!(manager.store().load("de_dust2").is_empty());
    }

    #[test]
    fn vanished_handles_are_unregistered_on_refresh() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut manager = manager(dir.path());
        manager.load_world("de_dust2");
        let ticket = manager.begin_create(&operator()).expect("ticket");
        assert!(manager.complete_create(&ticket, &[]).success);

        manager.renderer_mut().live.clear();
        let token = manager.begin_refresh().expect("token");
        assert_eq!(manager.complete_refresh(token, &[]), 0);
        assert_eq!(manager.display_count(), 0);
    }
}
