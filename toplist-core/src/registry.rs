//! Live display bookkeeping for one loaded world.
//!
//! Maps renderer handles to the stable [`PlacementId`] of their durable
//! record, in both directions, and remembers the last content pushed to
//! each handle. A handle without a placement is live but was never
//! persisted (its transform could not be resolved at creation).

use std::collections::HashMap;

use crate::types::{DisplayHandle, DisplayLine, PlacementId};

/// A registered live display.
#[derive(Debug, Clone, Default)]
pub struct DisplayEntry {
    /// Durable record backing this display, if any.
    pub placement: Option<PlacementId>,
    /// Content last sent to the renderer.
    pub lines: Vec<DisplayLine>,
}

/// Set of live display handles for the current world session.
#[derive(Debug, Default)]
pub struct DisplayRegistry {
    entries: HashMap<DisplayHandle, DisplayEntry>,
    by_placement: HashMap<PlacementId, DisplayHandle>,
}

impl DisplayRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a live handle. Re-registering a handle replaces its entry.
    pub fn insert(
        &mut self,
        handle: DisplayHandle,
        placement: Option<PlacementId>,
        lines: Vec<DisplayLine>,
    ) {
        if let Some(old) = self.entries.insert(handle, DisplayEntry { placement, lines }) {
            if let Some(old_placement) = old.placement {
                self.by_placement.remove(&old_placement);
            }
        }
        if let Some(placement) = placement {
            self.by_placement.insert(placement, handle);
        }
    }

    /// Unregister a handle, returning its entry.
    pub fn remove(&mut self, handle: DisplayHandle) -> Option<DisplayEntry> {
        let entry = self.entries.remove(&handle)?;
        if let Some(placement) = entry.placement {
            self.by_placement.remove(&placement);
        }
        Some(entry)
    }

    /// Record new content for a handle. Returns `false` if the handle is unknown.
    pub fn set_lines(&mut self, handle: DisplayHandle, lines: Vec<DisplayLine>) -> bool {
        match self.entries.get_mut(&handle) {
            Some(entry) => {
                entry.lines = lines;
                true
            }
            None => false,
        }
    }

    /// Placement backing a handle.
    #[must_use]
    pub fn placement_of(&self, handle: DisplayHandle) -> Option<PlacementId> {
        self.entries.get(&handle).and_then(|e| e.placement)
    }

    /// Handle showing a placement.
    #[must_use]
    pub fn handle_of(&self, placement: PlacementId) -> Option<DisplayHandle> {
        self.by_placement.get(&placement).copied()
    }

    /// Whether `handle` is registered.
    #[must_use]
    pub fn contains(&self, handle: DisplayHandle) -> bool {
        self.entries.contains_key(&handle)
    }

    /// All registered handles, sorted for deterministic iteration.
    #[must_use]
    pub fn handles(&self) -> Vec<DisplayHandle> {
        let mut handles: Vec<DisplayHandle> = self.entries.keys().copied().collect();
        handles.sort_unstable();
        handles
    }

    /// Number of live displays.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no display is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove and return every handle.
    pub fn drain(&mut self) -> Vec<DisplayHandle> {
        self.by_placement.clear();
        let mut handles: Vec<DisplayHandle> = self.entries.drain().map(|(h, _)| h).collect();
        handles.sort_unstable();
        handles
    }
}
