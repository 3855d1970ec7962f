//! Boundary to the host's in-world text renderer.
//!
//! The renderer owns the actual display objects; this crate only ever holds
//! the [`DisplayHandle`]s it hands out. All calls are made from the world
//! mutation context (the game thread), never from async tasks.

use thiserror::Error;

use crate::types::{ActorId, DisplayHandle, DisplayLine, Transform};

/// Errors reported by a [`Renderer`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// The renderer capability is not loaded right now.
    #[error("renderer capability unavailable")]
    Unavailable,
    /// The handle does not refer to a live display.
    #[error("unknown display handle {0}")]
    UnknownHandle(DisplayHandle),
    /// Any other host-side failure.
    #[error("renderer failure: {0}")]
    Failed(String),
}

/// In-world text display service provided by the host.
pub trait Renderer {
    /// Whether the capability is currently loaded.
    fn is_available(&self) -> bool;

    /// Create a wall display in front of `actor`, using the actor's current
    /// position and view direction.
    ///
    /// # Errors
    /// Returns [`RenderError`] if the display could not be created.
    fn create_display_for_actor(
        &mut self,
        actor: ActorId,
        lines: &[DisplayLine],
    ) -> Result<DisplayHandle, RenderError>;

    /// Create a wall display at an explicit transform.
    ///
    /// # Errors
    /// Returns [`RenderError`] if the display could not be created.
    fn create_display_at(
        &mut self,
        transform: Transform,
        lines: &[DisplayLine],
    ) -> Result<DisplayHandle, RenderError>;

    /// Replace the content of a live display.
    ///
    /// # Errors
    /// Returns [`RenderError`] if the handle is unknown or the update failed.
    fn update_display(
        &mut self,
        handle: DisplayHandle,
        lines: &[DisplayLine],
    ) -> Result<(), RenderError>;

    /// Destroy a live display.
    ///
    /// # Errors
    /// Returns [`RenderError`] if the handle is unknown or destruction failed.
    fn destroy_display(&mut self, handle: DisplayHandle) -> Result<(), RenderError>;

    /// Where the renderer actually put the display, if it can tell.
    fn resolved_transform(&self, handle: DisplayHandle) -> Option<Transform>;
}
