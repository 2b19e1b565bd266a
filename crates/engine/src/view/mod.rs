//! Views: a document, one tab, or a rectangle inside a tab.
//!
//! A view caches fetched values and formats, and queues mutations until
//! [`View::commit`]. All three share a [`Component`] and the [`View`] trait;
//! grid-structure operations are only offered where they make sense.

mod component;
mod document;
mod formatting;
mod range;
mod tab;

use std::collections::BTreeMap;

use sheetbatch_core::address::RectRange;
use sheetbatch_core::value::Value;
use sheetbatch_protocol::BatchResponse;

use crate::error::ViewError;
use crate::request::PendingRequest;

pub use component::Component;
pub use document::Document;
pub use formatting::{CellFormatting, RangeGridFormatting, TabGridFormatting, TextFormatting};
pub use range::RangeView;
pub use tab::Tab;

/// Data handed to [`View::write_values`].
#[derive(Debug, Clone, PartialEq)]
pub enum WriteData {
    /// Row-major cells, written as given
    Rows(Vec<Vec<Value>>),
    /// Records keyed by the text of the view's header row
    Records(Vec<BTreeMap<String, Value>>),
}

impl WriteData {
    /// Build from JSON: an array of arrays becomes rows, an array of objects
    /// becomes records. Scalars are classified like [`Value::classify`]; a
    /// `null` row cell is written as empty text and a `null` record field is
    /// skipped.
    pub fn from_json(raw: &serde_json::Value) -> Result<Self, ViewError> {
        let items = raw
            .as_array()
            .ok_or_else(|| ViewError::InvalidArgument("write data must be a JSON array".into()))?;

        if items.iter().all(|i| i.is_object()) && !items.is_empty() {
            let records = items
                .iter()
                .filter_map(|i| i.as_object())
                .map(|obj| {
                    obj.iter()
                        .filter_map(|(k, v)| Value::classify(v).map(|v| (k.clone(), v)))
                        .collect()
                })
                .collect();
            return Ok(WriteData::Records(records));
        }

        let mut rows = Vec::with_capacity(items.len());
        for item in items {
            let cells = item
                .as_array()
                .ok_or_else(|| ViewError::InvalidArgument("rows and records cannot be mixed".into()))?;
            rows.push(
                cells
                    .iter()
                    .map(|c| Value::classify(c).unwrap_or_else(|| Value::Text(String::new())))
                    .collect(),
            );
        }
        Ok(WriteData::Rows(rows))
    }
}

impl From<Vec<Vec<Value>>> for WriteData {
    fn from(rows: Vec<Vec<Value>>) -> Self {
        WriteData::Rows(rows)
    }
}

impl From<Vec<BTreeMap<String, Value>>> for WriteData {
    fn from(records: Vec<BTreeMap<String, Value>>) -> Self {
        WriteData::Records(records)
    }
}

/// Where [`View::write_values`] puts the data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WriteMode {
    /// At the view's origin, or the row below the header for records
    #[default]
    Overwrite,
    /// In the row after the cached data
    Append,
}

/// Operations shared by every view.
pub trait View<'c> {
    fn component(&self) -> &Component<'c>;

    fn component_mut(&mut self) -> &mut Component<'c>;

    /// Reload the caches from the service.
    fn refresh(&mut self) -> Result<(), ViewError> {
        self.component_mut().fetch()
    }

    /// [`refresh`](Self::refresh), chainable.
    fn fetch(&mut self) -> Result<&mut Self, ViewError>
    where
        Self: Sized,
    {
        self.refresh()?;
        Ok(self)
    }

    /// Queue one `updateCells` request and update the cached values.
    fn write_values(&mut self, data: WriteData, mode: WriteMode) -> Result<&mut Self, ViewError>
    where
        Self: Sized,
    {
        self.component_mut().write_values(data, mode)?;
        Ok(self)
    }

    /// Send the queued requests as one batch.
    fn commit(&mut self) -> Result<BatchResponse, ViewError> {
        self.component_mut().commit()
    }

    fn values<'a>(&'a self) -> &'a [Vec<Option<Value>>]
    where
        'c: 'a,
    {
        self.component().values()
    }

    fn formats<'a>(&'a self) -> &'a [Vec<serde_json::Value>]
    where
        'c: 'a,
    {
        self.component().formats()
    }

    /// `(rows, columns)` of the cached values.
    fn data_shape(&self) -> (usize, usize) {
        self.component().data_shape()
    }

    fn requests<'a>(&'a self) -> &'a [PendingRequest]
    where
        'c: 'a,
    {
        self.component().requests()
    }

    fn clear_requests(&mut self) {
        self.component_mut().clear_requests();
    }

    fn range(&self) -> RectRange {
        self.component().range()
    }

    fn document_id<'a>(&'a self) -> &'a str
    where
        'c: 'a,
    {
        self.component().document_id()
    }

    fn tab_title<'a>(&'a self) -> &'a str
    where
        'c: 'a,
    {
        self.component().tab_title()
    }

    fn format_cell(&mut self) -> CellFormatting<'_, 'c> {
        CellFormatting::new(self.component_mut())
    }

    fn format_text(&mut self) -> TextFormatting<'_, 'c> {
        TextFormatting::new(self.component_mut())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_write_data_from_json_rows() {
        let data = WriteData::from_json(&json!([[1, "x", true], [null, "=A1"]])).unwrap();
        assert_eq!(
            data,
            WriteData::Rows(vec![
                vec![Value::from(1), Value::from("x"), Value::from(true)],
                vec![Value::Text(String::new()), Value::Formula("=A1".into())],
            ])
        );
    }

    #[test]
    fn test_write_data_from_json_records() {
        let data = WriteData::from_json(&json!([{"a": 1, "b": null}, {"b": "y"}])).unwrap();
        let WriteData::Records(records) = data else {
            panic!("expected records");
        };
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("a"), Some(&Value::from(1)));
        assert!(records[0].get("b").is_none());
        assert_eq!(records[1].get("b"), Some(&Value::from("y")));
    }

    #[test]
    fn test_write_data_from_json_rejects_mixed() {
        assert!(WriteData::from_json(&json!({"a": 1})).is_err());
        assert!(WriteData::from_json(&json!([[1], {"a": 1}])).is_err());
    }
}
