//! In-memory annotation table.
//!
//! Cells are kept as the raw text read from the CSV so that columns the
//! editor never touches are written back exactly as they were uploaded.
//! Lookups are a linear scan; tables are thousands of rows, not millions.

use indexmap::IndexMap;

use crate::annotation::{BoundingBoxUpdate, RowKey, TrackIdUpdate, NO_MATCHING_ENTRY};
use crate::error::CoreError;
use crate::types::FieldValue;

pub const COL_FRAME: &str = "frame";
pub const COL_TRACK_ID: &str = "track_id";
pub const COL_CLASS_ID: &str = "class_id";
pub const COL_X1: &str = "x1";
pub const COL_Y1: &str = "y1";
pub const COL_X2: &str = "x2";
pub const COL_Y2: &str = "y2";

/// Columns every uploaded table must carry. Extra columns are preserved.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    COL_FRAME,
    COL_TRACK_ID,
    COL_CLASS_ID,
    COL_X1,
    COL_Y1,
    COL_X2,
    COL_Y2,
];

/// A row rendered as `column -> cell`, in file column order.
pub type RowMap = IndexMap<String, String>;

/// Optional predicate over the key columns; `None` does not filter.
#[derive(Debug, Clone, Default)]
pub struct RowFilter {
    pub frame: Option<FieldValue>,
    pub track_id: Option<FieldValue>,
    pub class_id: Option<FieldValue>,
}

impl From<&RowKey> for RowFilter {
    fn from(key: &RowKey) -> Self {
        Self {
            frame: Some(key.frame.clone()),
            track_id: Some(key.track_id.clone()),
            class_id: Some(key.class_id.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Parse CSV bytes with a header row.
    ///
    /// Fails with [`CoreError::Format`] on an empty source, ragged rows,
    /// invalid UTF-8, or a header lacking one of [`REQUIRED_COLUMNS`].
    pub fn parse(bytes: &[u8]) -> Result<Self, CoreError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .from_reader(bytes);

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        if headers.iter().all(|h| h.trim().is_empty()) {
            return Err(CoreError::Format("CSV has no header row".to_string()));
        }

        let rows = reader
            .records()
            .map(|record| record.map(|r| r.iter().map(str::to_string).collect()))
            .collect::<Result<Vec<Vec<String>>, csv::Error>>()?;

        let table = Self { headers, rows };
        for name in REQUIRED_COLUMNS {
            if table.column(name).is_none() {
                return Err(CoreError::Format(format!(
                    "missing required column '{name}'"
                )));
            }
        }
        Ok(table)
    }

    /// Serialize back to CSV, header first, rows in load order.
    pub fn to_csv_bytes(&self) -> Result<Vec<u8>, CoreError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer
            .into_inner()
            .map_err(|e| CoreError::Io(e.into_error()))
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows matching `filter`, as ordered column maps.
    pub fn select(&self, filter: &RowFilter) -> Vec<RowMap> {
        self.matching_indices(filter)
            .into_iter()
            .map(|i| self.row_map(i))
            .collect()
    }

    /// Overwrite `x1, y1, x2, y2` on every row matching the key.
    ///
    /// Returns the number of rows changed. Zero matches is
    /// [`CoreError::NotFound`] and leaves the table untouched.
    pub fn update_bounding_box(&mut self, update: &BoundingBoxUpdate) -> Result<usize, CoreError> {
        let matches = self.matching_indices(&RowFilter::from(&update.key));
        if matches.is_empty() {
            return Err(CoreError::NotFound(NO_MATCHING_ENTRY.to_string()));
        }

        let mut columns = [0usize; 4];
        for (slot, name) in columns.iter_mut().zip([COL_X1, COL_Y1, COL_X2, COL_Y2]) {
            *slot = self.require_column(name)?;
        }
        let cells = update.bbox.as_array().map(FieldValue::to_cell);

        for &i in &matches {
            for (col, cell) in columns.iter().zip(&cells) {
                self.rows[i][*col] = cell.clone();
            }
        }
        Ok(matches.len())
    }

    /// Set `track_id = new_id` on rows where `track_id == current_id` and
    /// `frame == frame`. Zero matches is not an error.
    pub fn reassign_track_id(&mut self, update: &TrackIdUpdate) -> Result<usize, CoreError> {
        let filter = RowFilter {
            frame: Some(update.frame.clone()),
            track_id: Some(update.current_id.clone()),
            class_id: None,
        };
        let matches = self.matching_indices(&filter);
        let col = self.require_column(COL_TRACK_ID)?;
        let cell = update.new_id.to_cell();
        for &i in &matches {
            self.rows[i][col] = cell.clone();
        }
        Ok(matches.len())
    }

    fn matching_indices(&self, filter: &RowFilter) -> Vec<usize> {
        let predicates: Vec<(usize, &FieldValue)> = [
            (COL_FRAME, filter.frame.as_ref()),
            (COL_TRACK_ID, filter.track_id.as_ref()),
            (COL_CLASS_ID, filter.class_id.as_ref()),
        ]
        .into_iter()
        .filter_map(|(name, value)| Some((self.column(name)?, value?)))
        .collect();

        self.rows
            .iter()
            .enumerate()
            .filter(|(_, row)| {
                predicates
                    .iter()
                    .all(|(col, value)| value.matches_cell(&row[*col]))
            })
            .map(|(i, _)| i)
            .collect()
    }

    fn row_map(&self, index: usize) -> RowMap {
        self.headers
            .iter()
            .cloned()
            .zip(self.rows[index].iter().cloned())
            .collect()
    }

    fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.trim() == name)
    }

    fn require_column(&self, name: &str) -> Result<usize, CoreError> {
        self.column(name)
            .ok_or_else(|| CoreError::Format(format!("missing required column '{name}'")))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::annotation::BoundingBox;

    const SAMPLE: &str = "frame,track_id,class_id,x1,y1,x2,y2,score\n\
                          1,5,2,0,0,10,10,0.91\n\
                          1,6,2,1,1,2,2,0.40\n\
                          2,5,2,3,3,12,12,0.88\n";

    fn sample() -> Table {
        Table::parse(SAMPLE.as_bytes()).unwrap()
    }

    fn bbox_update(frame: i64, track: i64, class: i64, coords: [i64; 4]) -> BoundingBoxUpdate {
        BoundingBoxUpdate {
            key: RowKey {
                frame: frame.into(),
                track_id: track.into(),
                class_id: class.into(),
            },
            bbox: BoundingBox {
                x1: coords[0].into(),
                y1: coords[1].into(),
                x2: coords[2].into(),
                y2: coords[3].into(),
            },
        }
    }

    #[test]
    fn parse_keeps_extra_columns() {
        let table = sample();
        assert_eq!(table.len(), 3);
        assert_eq!(table.headers().last().map(String::as_str), Some("score"));
    }

    #[test]
    fn round_trip_is_byte_identical() {
        let bytes = sample().to_csv_bytes().unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), SAMPLE);
    }

    #[test]
    fn empty_source_is_a_format_error() {
        assert_matches!(Table::parse(b""), Err(CoreError::Format(_)));
    }

    #[test]
    fn ragged_rows_are_a_format_error() {
        let src = "frame,track_id,class_id,x1,y1,x2,y2\n1,5,2,0,0\n";
        assert_matches!(Table::parse(src.as_bytes()), Err(CoreError::Format(_)));
    }

    #[test]
    fn missing_column_is_a_format_error() {
        let src = "frame,track_id,x1,y1,x2,y2\n1,5,0,0,1,1\n";
        assert_matches!(
            Table::parse(src.as_bytes()),
            Err(CoreError::Format(msg)) if msg.contains("class_id")
        );
    }

    #[test]
    fn bounding_box_update_touches_only_the_matching_row() {
        let mut table = sample();
        let changed = table
            .update_bounding_box(&bbox_update(1, 5, 2, [5, 5, 15, 15]))
            .unwrap();
        assert_eq!(changed, 1);

        let rows = table.select(&RowFilter::default());
        assert_eq!(rows[0]["x1"], "5");
        assert_eq!(rows[0]["y2"], "15");
        assert_eq!(rows[0]["score"], "0.91");
        assert_eq!(rows[1]["x1"], "1");
        assert_eq!(rows[1]["x2"], "2");
        assert_eq!(rows[2]["x1"], "3");
    }

    #[test]
    fn bounding_box_update_without_match_leaves_table_untouched() {
        let mut table = sample();
        let before = table.clone();
        assert_matches!(
            table.update_bounding_box(&bbox_update(9, 5, 2, [5, 5, 15, 15])),
            Err(CoreError::NotFound(msg)) if msg == NO_MATCHING_ENTRY
        );
        assert_eq!(table, before);
    }

    #[test]
    fn bounding_box_update_hits_every_duplicate() {
        let src = "frame,track_id,class_id,x1,y1,x2,y2\n1,5,2,0,0,1,1\n1,5,2,2,2,3,3\n";
        let mut table = Table::parse(src.as_bytes()).unwrap();
        let changed = table
            .update_bounding_box(&bbox_update(1, 5, 2, [7, 7, 8, 8]))
            .unwrap();
        assert_eq!(changed, 2);
        assert!(table.select(&RowFilter::default()).iter().all(|r| r["x1"] == "7"));
    }

    #[test]
    fn neighbouring_large_track_ids_stay_distinct() {
        let src = "frame,track_id,class_id,x1,y1,x2,y2\n1,9007199254740992,2,0,0,1,1\n";
        let mut table = Table::parse(src.as_bytes()).unwrap();
        let before = table.clone();

        assert_matches!(
            table.update_bounding_box(&bbox_update(1, 9_007_199_254_740_993, 2, [5, 5, 6, 6])),
            Err(CoreError::NotFound(_))
        );
        assert_eq!(table, before);
    }

    #[test]
    fn float_like_class_labels_match_as_text() {
        let src = "frame,track_id,class_id,x1,y1,x2,y2\n1,5,NaN,0,0,1,1\n";
        let mut table = Table::parse(src.as_bytes()).unwrap();
        let update = BoundingBoxUpdate {
            key: RowKey {
                frame: FieldValue::Int(1),
                track_id: FieldValue::Int(5),
                class_id: FieldValue::from("NaN"),
            },
            ..bbox_update(1, 5, 0, [5, 5, 6, 6])
        };

        assert_eq!(table.update_bounding_box(&update).unwrap(), 1);
        assert_eq!(table.select(&RowFilter::default())[0]["x2"], "6");
    }

    #[test]
    fn reassign_track_id_is_scoped_to_frame() {
        let mut table = sample();
        let changed = table
            .reassign_track_id(&TrackIdUpdate {
                current_id: FieldValue::Int(5),
                new_id: FieldValue::Int(42),
                frame: FieldValue::Int(1),
            })
            .unwrap();
        assert_eq!(changed, 1);

        let rows = table.select(&RowFilter::default());
        assert_eq!(rows[0]["track_id"], "42");
        assert_eq!(rows[1]["track_id"], "6");
        assert_eq!(rows[2]["track_id"], "5");
    }

    #[test]
    fn reassign_track_id_without_match_is_ok() {
        let mut table = sample();
        let changed = table
            .reassign_track_id(&TrackIdUpdate {
                current_id: FieldValue::Int(99),
                new_id: FieldValue::Int(1),
                frame: FieldValue::Int(1),
            })
            .unwrap();
        assert_eq!(changed, 0);
    }

    #[test]
    fn select_filters_on_given_keys_only() {
        let table = sample();
        let filter = RowFilter {
            track_id: Some("5".into()),
            ..Default::default()
        };
        let rows = table.select(&filter);
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0].keys().map(String::as_str).collect::<Vec<_>>(),
            REQUIRED_COLUMNS
                .iter()
                .copied()
                .chain(["score"])
                .collect::<Vec<_>>()
        );
    }
}
