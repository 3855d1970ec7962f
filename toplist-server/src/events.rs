//! Host game events the toplist system reacts to.

/// A host event that drives the display lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    /// A map finished loading and the world can be populated.
    MapStart {
        /// Map (world) identifier, used to pick the placement file.
        map: String,
    },

    /// The current map is ending; live displays must go.
    MapEnd,

    /// A new round began on the current map.
    RoundStart,

    /// The plugin or server is shutting down.
    Shutdown,
}

impl GameEvent {
    /// Convenience constructor for [`GameEvent::MapStart`].
    #[must_use]
    pub fn map_start(map: impl Into<String>) -> Self {
        Self::MapStart { map: map.into() }
    }
}
