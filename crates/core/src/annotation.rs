//! Edit payloads and their presence validation.
//!
//! Every field of an edit is required, but "required" means present: a
//! value of `0` is a legitimate frame, track, class or coordinate. Only a
//! missing key or an explicit `null` counts as absent.

use serde::Deserialize;

use crate::error::CoreError;
use crate::types::FieldValue;

/// Message returned when a bounding-box edit is missing a field.
pub const INCOMPLETE_BOUNDING_BOX: &str = "Incomplete data provided.";

/// Message returned when a track-id edit is missing a field.
pub const INVALID_TRACK_ID_UPDATE: &str = "Invalid data";

/// Message returned when a bounding-box key matches no row.
pub const NO_MATCHING_ENTRY: &str = "No matching entry found in CSV.";

// ── Validated edits ──────────────────────────────────────────────────

/// Composite key identifying one detection.
#[derive(Debug, Clone, PartialEq)]
pub struct RowKey {
    pub frame: FieldValue,
    pub track_id: FieldValue,
    pub class_id: FieldValue,
}

/// Corner coordinates `(x1, y1)-(x2, y2)`.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundingBox {
    pub x1: FieldValue,
    pub y1: FieldValue,
    pub x2: FieldValue,
    pub y2: FieldValue,
}

impl BoundingBox {
    pub fn as_array(&self) -> [&FieldValue; 4] {
        [&self.x1, &self.y1, &self.x2, &self.y2]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoundingBoxUpdate {
    pub key: RowKey,
    pub bbox: BoundingBox,
}

/// Reassign `track_id` on every row of one frame carrying `current_id`.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackIdUpdate {
    pub current_id: FieldValue,
    pub new_id: FieldValue,
    pub frame: FieldValue,
}

// ── Raw payloads ─────────────────────────────────────────────────────

/// Body of `POST /update-bounding-box`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BoundingBoxInput {
    pub frame_id: Option<FieldValue>,
    pub track_id: Option<FieldValue>,
    pub class_id: Option<FieldValue>,
    pub x1: Option<FieldValue>,
    pub y1: Option<FieldValue>,
    pub x2: Option<FieldValue>,
    pub y2: Option<FieldValue>,
}

impl BoundingBoxInput {
    /// Names of the fields that are absent.
    fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("frame_id", self.frame_id.is_none()),
            ("track_id", self.track_id.is_none()),
            ("class_id", self.class_id.is_none()),
            ("x1", self.x1.is_none()),
            ("y1", self.y1.is_none()),
            ("x2", self.x2.is_none()),
            ("y2", self.y2.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, missing)| missing.then_some(name))
        .collect()
    }

    pub fn validate(&self) -> Result<BoundingBoxUpdate, CoreError> {
        let (
            Some(frame),
            Some(track_id),
            Some(class_id),
            Some(x1),
            Some(y1),
            Some(x2),
            Some(y2),
        ) = (
            &self.frame_id,
            &self.track_id,
            &self.class_id,
            &self.x1,
            &self.y1,
            &self.x2,
            &self.y2,
        )
        else {
            tracing::debug!(missing = ?self.missing_fields(), "Bounding box payload incomplete");
            return Err(CoreError::Validation(INCOMPLETE_BOUNDING_BOX.to_string()));
        };

        let bbox = BoundingBox {
            x1: x1.clone(),
            y1: y1.clone(),
            x2: x2.clone(),
            y2: y2.clone(),
        };
        if bbox.as_array().iter().any(|v| v.as_number().is_none()) {
            return Err(CoreError::Validation(
                "Bounding box coordinates must be numeric.".to_string(),
            ));
        }

        Ok(BoundingBoxUpdate {
            key: RowKey {
                frame: frame.clone(),
                track_id: track_id.clone(),
                class_id: class_id.clone(),
            },
            bbox,
        })
    }
}

/// Body of `POST /update-id`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackIdInput {
    pub current_id: Option<FieldValue>,
    pub new_id: Option<FieldValue>,
    pub current_frame: Option<FieldValue>,
}

impl TrackIdInput {
    pub fn validate(self) -> Result<TrackIdUpdate, CoreError> {
        match (self.current_id, self.new_id, self.current_frame) {
            (Some(current_id), Some(new_id), Some(frame)) => Ok(TrackIdUpdate {
                current_id,
                new_id,
                frame,
            }),
            _ => Err(CoreError::Validation(INVALID_TRACK_ID_UPDATE.to_string())),
        }
    }
}
