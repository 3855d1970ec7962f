//! Core type definitions for toplist displays.
//!
//! Spatial triples format as whitespace-delimited `"x y z"` strings, which is
//! also how they are stored on disk.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ToplistError;

// ---------------------------------------------------------------------------
// Identity Types
// ---------------------------------------------------------------------------

/// Stable identifier assigned to a placement when it is first created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlacementId(pub Uuid);

impl PlacementId {
    /// Create a new random placement ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PlacementId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PlacementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque identifier issued by the renderer for a live display object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DisplayHandle(pub u64);

impl fmt::Display for DisplayHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifier of a connected actor (player / operator).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActorId(pub u64);

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The actor issuing an operator command.
#[derive(Debug, Clone, PartialEq)]
pub struct Actor {
    /// Actor identity.
    pub id: ActorId,
    /// Display name, used for logging.
    pub name: String,
    /// Current world position; `None` while the actor has no body in the world.
    pub position: Option<Vec3>,
    /// Whether the actor holds the elevated privilege required by commands.
    pub privileged: bool,
}

// ---------------------------------------------------------------------------
// Spatial
// ---------------------------------------------------------------------------

/// A 3D position in the game world.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    /// X coordinate.
    pub x: f32,
    /// Y coordinate.
    pub y: f32,
    /// Z coordinate.
    pub z: f32,
}

impl Vec3 {
    /// Construct a position.
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Euler orientation of a display object, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Angles {
    /// Rotation around the lateral axis.
    pub pitch: f32,
    /// Rotation around the vertical axis.
    pub yaw: f32,
    /// Rotation around the forward axis.
    pub roll: f32,
}

impl Angles {
    /// Construct an orientation.
    #[must_use]
    pub const fn new(pitch: f32, yaw: f32, roll: f32) -> Self {
        Self { pitch, yaw, roll }
    }
}

/// Resolved placement of a display object in the world.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Transform {
    /// Where the object sits.
    pub location: Vec3,
    /// How it is rotated.
    pub orientation: Angles,
}

fn parse_triple(input: &str) -> Result<[f32; 3], ToplistError> {
    let invalid = |reason: String| ToplistError::InvalidTriple {
        input: input.to_string(),
        reason,
    };

    let parts: Vec<&str> = input.split_whitespace().collect();
    if parts.len() != 3 {
        return Err(invalid(format!("expected 3 components, found {}", parts.len())));
    }

    let mut out = [0.0_f32; 3];
    for (slot, part) in out.iter_mut().zip(&parts) {
        let value: f32 = part
            .parse()
            .map_err(|e| invalid(format!("component '{part}': {e}")))?;
        if !value.is_finite() {
            return Err(invalid(format!("component '{part}' is not finite")));
        }
        *slot = value;
    }
    Ok(out)
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.x, self.y, self.z)
    }
}

impl FromStr for Vec3 {
    type Err = ToplistError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let [x, y, z] = parse_triple(s)?;
        Ok(Self { x, y, z })
    }
}

impl fmt::Display for Angles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.pitch, self.yaw, self.roll)
    }
}

impl FromStr for Angles {
    type Err = ToplistError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let [pitch, yaw, roll] = parse_triple(s)?;
        Ok(Self { pitch, yaw, roll })
    }
}

// ---------------------------------------------------------------------------
// Ranking & display content
// ---------------------------------------------------------------------------

/// One row of the leaderboard as returned by the score store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedEntity {
    /// Player name.
    pub name: String,
    /// Score (points).
    pub score: i64,
    /// Dense rank, 1-based. Tied scores share a rank.
    pub rank: u32,
}

impl RankedEntity {
    /// Convenience constructor.
    #[must_use]
    pub fn new(name: impl Into<String>, score: i64, rank: u32) -> Self {
        Self {
            name: name.into(),
            score,
            rank,
        }
    }
}

/// Text colour understood by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    /// Title colour.
    Pink,
    /// First place.
    Red,
    /// Second place.
    Orange,
    /// Third place.
    Yellow,
    /// Everyone else.
    White,
}

/// A single styled line of a display.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayLine {
    /// Text content.
    pub text: String,
    /// Text colour.
    pub color: Color,
    /// Font size in points.
    pub font_size: u32,
    /// Render without world lighting.
    pub full_bright: bool,
    /// World-space scale.
    pub scale: f32,
}
