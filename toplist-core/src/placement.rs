//! Durable placement records.
//!
//! A placement remembers where an operator put a display. On disk each
//! record is a JSON object with whitespace-delimited float triples:
//!
//! ```json
//! { "id": "…uuid…", "location": "120 -340.5 64", "rotation": "0 90 0" }
//! ```
//!
//! `id` and `placed_at` are optional when reading so that files written
//! before stable IDs existed still load; such records get a fresh ID.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ToplistError;
use crate::types::{Angles, PlacementId, Transform, Vec3};

/// Where a display was placed, as remembered across restarts.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementRecord {
    /// Stable identity, assigned at creation.
    pub id: PlacementId,
    /// World position.
    pub location: Vec3,
    /// Orientation.
    pub rotation: Angles,
    /// When the operator placed it, if known.
    pub placed_at: Option<DateTime<Utc>>,
}

impl PlacementRecord {
    /// New record for a display resolved at `transform`.
    #[must_use]
    pub fn new(transform: Transform) -> Self {
        Self {
            id: PlacementId::new(),
            location: transform.location,
            rotation: transform.orientation,
            placed_at: Some(Utc::now()),
        }
    }

    /// The record's position and orientation.
    #[must_use]
    pub fn transform(&self) -> Transform {
        Transform {
            location: self.location,
            orientation: self.rotation,
        }
    }
}

/// On-disk shape of a [`PlacementRecord`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct StoredPlacement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(alias = "Location")]
    pub location: String,
    #[serde(alias = "Rotation")]
    pub rotation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placed_at: Option<DateTime<Utc>>,
}

impl From<&PlacementRecord> for StoredPlacement {
    fn from(record: &PlacementRecord) -> Self {
        Self {
            id: Some(record.id.0),
            location: record.location.to_string(),
            rotation: record.rotation.to_string(),
            placed_at: record.placed_at,
        }
    }
}

impl TryFrom<StoredPlacement> for PlacementRecord {
    type Error = ToplistError;

    fn try_from(stored: StoredPlacement) -> Result<Self, Self::Error> {
        Ok(Self {
            id: stored.id.map_or_else(PlacementId::new, PlacementId),
            location: stored.location.parse()?,
            rotation: stored.rotation.parse()?,
            placed_at: stored.placed_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_record_without_id_gets_one() {
        let stored: StoredPlacement =
            serde_json::from_str(r#"{"Location":"1 2 3","Rotation":"0 90 0"}"#).expect("json");
        let record = PlacementRecord::try_from(stored).expect("valid");
        assert_eq!(record.location, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(record.rotation, Angles::new(0.0, 90.0, 0.0));
        assert!(record.placed_at.is_none());
    }

    #[test]
    fn stored_form_keeps_id() {
        let record = PlacementRecord::new(Transform {
            location: Vec3::new(-5.5, 10.0, 64.0),
            orientation: Angles::new(0.0, 180.0, 0.0),
        });
        let stored = StoredPlacement::from(&record);
        assert_eq!(stored.location, "-5.5 10 64");
        assert_eq!(stored.rotation, "0 180 0");

        let back = PlacementRecord::try_from(stored).expect("valid");
        assert_eq!(back, record);
    }

    #[test]
    fn bad_triple_fails_conversion() {
        let stored = StoredPlacement {
            id: None,
            location: "1 2".into(),
            rotation: "0 0 0".into(),
            placed_at: None,
        };
        assert!(PlacementRecord::try_from(stored).is_err());
    }
}
