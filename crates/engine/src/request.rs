//! Pending batch requests and the builders that produce them.
//!
//! Every builder returns one [`PendingRequest`] whose `target` is the range
//! it touches, so the queue can group and check overlaps without looking
//! inside the payload.

use serde_json::{json, Map, Value as Json};
use sheetbatch_core::address::{Axis, LinearRange, Range, RectRange, TabId};
use sheetbatch_core::value::{self, Channel, Value};
use sheetbatch_protocol::{
    Borders, Color, Dimension, Format, HorizontalAlign, TabProperties, ToDimensionRange, ToGridRange,
    VerticalAlign,
};

/// Formula used by the alternating-row conditional format.
const ALTERNATING_ROW_FORMULA: &str = "=MOD(ROW(), 2)";

/// Batch request names used by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    UpdateCells,
    RepeatCell,
    AddConditionalFormatRule,
    AutoResizeDimensions,
    AppendDimension,
    InsertDimension,
    DeleteDimension,
    UpdateSheetProperties,
    AddSheet,
}

impl RequestKind {
    pub fn name(self) -> &'static str {
        match self {
            RequestKind::UpdateCells => "updateCells",
            RequestKind::RepeatCell => "repeatCell",
            RequestKind::AddConditionalFormatRule => "addConditionalFormatRule",
            RequestKind::AutoResizeDimensions => "autoResizeDimensions",
            RequestKind::AppendDimension => "appendDimension",
            RequestKind::InsertDimension => "insertDimension",
            RequestKind::DeleteDimension => "deleteDimension",
            RequestKind::UpdateSheetProperties => "updateSheetProperties",
            RequestKind::AddSheet => "addSheet",
        }
    }

    /// False for tab-level requests, whose target only names the tab.
    pub fn touches_cells(self) -> bool {
        !matches!(self, RequestKind::UpdateSheetProperties | RequestKind::AddSheet)
    }
}

/// One queued mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingRequest {
    pub kind: RequestKind,
    pub target: Range,
    pub payload: Map<String, Json>,
}

impl PendingRequest {
    pub fn new(kind: RequestKind, target: impl Into<Range>, payload: Json) -> Self {
        let payload = match payload {
            Json::Object(map) => map,
            _ => Map::new(),
        };
        Self { kind, target: target.into(), payload }
    }

    /// `{"<kind>": payload}` as the service expects it.
    pub fn to_wire(&self) -> Json {
        let mut obj = Map::new();
        obj.insert(self.kind.name().to_string(), Json::Object(self.payload.clone()));
        Json::Object(obj)
    }
}

// ============================================================================
// Values
// ============================================================================

/// Write a block of values at `dest`. Row/column extent of `dest` is the
/// caller's business; cells are encoded for `channel`.
pub fn update_cells(dest: &RectRange, rows: &[Vec<Option<Value>>], channel: Channel) -> PendingRequest {
    let rows: Vec<Json> = rows
        .iter()
        .map(|row| {
            let values: Vec<Json> = row.iter().map(|v| value::encode(v.as_ref(), channel)).collect();
            json!({ "values": values })
        })
        .collect();

    PendingRequest::new(
        RequestKind::UpdateCells,
        *dest,
        json!({
            "fields": channel.value_key(),
            "rows": rows,
            "range": dest.to_grid_range(),
        }),
    )
}

// ============================================================================
// Cell formatting
// ============================================================================

pub fn set_background_color(rng: &RectRange, color: Color) -> PendingRequest {
    PendingRequest::new(
        RequestKind::RepeatCell,
        *rng,
        json!({
            "range": rng.to_grid_range(),
            "fields": "userEnteredFormat(backgroundColor)",
            "cell": { "userEnteredFormat": { "backgroundColor": color } },
        }),
    )
}

pub fn set_border_format(rng: &RectRange, borders: &Borders) -> PendingRequest {
    PendingRequest::new(
        RequestKind::RepeatCell,
        *rng,
        json!({
            "range": rng.to_grid_range(),
            "fields": "userEnteredFormat(borders)",
            "cell": { "userEnteredFormat": { "borders": borders } },
        }),
    )
}

/// Conditional format coloring every other row of `rng`.
pub fn add_alternating_row_background(rng: &RectRange, color: Color) -> PendingRequest {
    PendingRequest::new(
        RequestKind::AddConditionalFormatRule,
        *rng,
        json!({
            "rule": {
                "ranges": [rng.to_grid_range()],
                "booleanRule": {
                    "condition": {
                        "type": "CUSTOM_FORMULA",
                        "values": [{ "userEnteredValue": ALTERNATING_ROW_FORMULA }],
                    },
                    "format": { "backgroundColor": color },
                },
            },
            "index": rng.start_row(),
        }),
    )
}

// ============================================================================
// Text formatting
// ============================================================================

pub fn apply_format(rng: &RectRange, format: &Format) -> PendingRequest {
    PendingRequest::new(
        RequestKind::RepeatCell,
        *rng,
        json!({
            "range": rng.to_grid_range(),
            "fields": format.fields(),
            "cell": format.cell(),
        }),
    )
}

/// Alignment update. Only the given axes are sent and masked.
pub fn set_text_alignment(
    rng: &RectRange,
    horizontal: Option<HorizontalAlign>,
    vertical: Option<VerticalAlign>,
) -> PendingRequest {
    let mut fmt = Map::new();
    let mut fields = Vec::new();
    if let Some(h) = horizontal {
        fmt.insert("horizontalAlignment".into(), json!(h));
        fields.push("horizontalAlignment");
    }
    if let Some(v) = vertical {
        fmt.insert("verticalAlignment".into(), json!(v));
        fields.push("verticalAlignment");
    }

    PendingRequest::new(
        RequestKind::RepeatCell,
        *rng,
        json!({
            "range": rng.to_grid_range(),
            "fields": format!("userEnteredFormat({})", fields.join(",")),
            "cell": { "userEnteredFormat": fmt },
        }),
    )
}

// ============================================================================
// Grid structure
// ============================================================================

pub fn auto_column_width(columns: &LinearRange) -> PendingRequest {
    PendingRequest::new(
        RequestKind::AutoResizeDimensions,
        *columns,
        json!({ "dimensions": columns.to_dimension_range() }),
    )
}

/// Append `length` rows or columns after the current `count` of the tab.
pub fn append_dimension(band: &LinearRange) -> PendingRequest {
    PendingRequest::new(
        RequestKind::AppendDimension,
        *band,
        json!({
            "sheetId": band.tab_id(),
            "dimension": Dimension::from(band.axis()),
            "length": band.len().unwrap_or(0),
        }),
    )
}

/// Insert empty rows or columns covering `band`.
pub fn insert_dimension(band: &LinearRange) -> PendingRequest {
    PendingRequest::new(
        RequestKind::InsertDimension,
        *band,
        json!({
            "range": band.to_dimension_range(),
            "inheritFromBefore": false,
        }),
    )
}

pub fn delete_dimension(band: &LinearRange) -> PendingRequest {
    PendingRequest::new(
        RequestKind::DeleteDimension,
        *band,
        json!({ "range": band.to_dimension_range() }),
    )
}

/// Freeze the leading rows and/or columns of a tab. At least one of the two
/// must be given; the view checks that.
pub fn freeze(tab_id: TabId, rows: Option<u32>, columns: Option<u32>) -> PendingRequest {
    let mut grid = Map::new();
    let mut fields = Vec::new();
    if let Some(r) = rows {
        grid.insert("frozenRowCount".into(), json!(r));
        fields.push("frozenRowCount");
    }
    if let Some(c) = columns {
        grid.insert("frozenColumnCount".into(), json!(c));
        fields.push("frozenColumnCount");
    }

    PendingRequest::new(
        RequestKind::UpdateSheetProperties,
        whole_tab(tab_id),
        json!({
            "properties": { "sheetId": tab_id, "gridProperties": grid },
            "fields": format!("gridProperties({})", fields.join(",")),
        }),
    )
}

pub fn add_sheet(props: &TabProperties) -> PendingRequest {
    PendingRequest::new(RequestKind::AddSheet, whole_tab(props.sheet_id), json!({ "properties": props }))
}

fn whole_tab(tab_id: TabId) -> Range {
    match LinearRange::new(tab_id, Axis::Rows, 0, None) {
        Ok(band) => Range::Linear(band),
        // a band without an end is never inverted
        Err(_) => Range::Rect(RectRange::cell(tab_id, 0, 0)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetbatch_core::address;
    use sheetbatch_protocol::{Border, BorderSide, BorderStyle, NumericFormat, TextFormat};

    fn rect(text: &str) -> RectRange {
        address::parse_rect(text, 0).unwrap()
    }

    fn b5_d10() -> Json {
        json!({
            "sheetId": 0,
            "startRowIndex": 4,
            "endRowIndex": 10,
            "startColumnIndex": 1,
            "endColumnIndex": 4,
        })
    }

    #[test]
    fn test_update_cells() {
        let dest = rect("A1:C1");
        let rows = vec![vec![Some(Value::from(1)), Some(Value::from("x")), Some(Value::from(true))]];
        let req = update_cells(&dest, &rows, Channel::Effective);
        assert_eq!(req.kind, RequestKind::UpdateCells);
        assert_eq!(
            req.to_wire(),
            json!({"updateCells": {
                "fields": "effectiveValue",
                "rows": [{"values": [
                    {"effectiveValue": {"numberValue": 1}},
                    {"effectiveValue": {"stringValue": "x"}},
                    {"effectiveValue": {"boolValue": true}},
                ]}],
                "range": {"sheetId": 0, "startRowIndex": 0, "endRowIndex": 1,
                          "startColumnIndex": 0, "endColumnIndex": 3},
            }})
        );
    }

    #[test]
    fn test_update_cells_empty_cell() {
        let rows = vec![vec![None, Some(Value::from("=A1"))]];
        let req = update_cells(&rect("A1:B1"), &rows, Channel::UserEntered);
        assert_eq!(
            req.payload["rows"],
            json!([{"values": [{}, {"userEnteredValue": {"formulaValue": "=A1"}}]}])
        );
    }

    #[test]
    fn test_set_background_color() {
        let req = set_background_color(&rect("B5:D10"), Color::new(0.4, 0.7, 0.3));
        assert_eq!(
            req.to_wire(),
            json!({"repeatCell": {
                "range": b5_d10(),
                "fields": "userEnteredFormat(backgroundColor)",
                "cell": {"userEnteredFormat": {"backgroundColor":
                    {"red": 0.4, "green": 0.7, "blue": 0.3, "alpha": 1.0}}},
            }})
        );
    }

    #[test]
    fn test_set_border_format() {
        let borders = Borders::default()
            .side(BorderSide::Left, Border::new(BorderStyle::Solid, Color::new(0.0, 1.0, 0.0)))
            .side(BorderSide::Right, Border::new(BorderStyle::Dashed, Color::BLACK));
        let req = set_border_format(&rect("B5:D10"), &borders);
        let cell = &req.payload["cell"]["userEnteredFormat"]["borders"];
        assert_eq!(cell["left"]["style"], "SOLID");
        assert_eq!(cell["right"]["style"], "DASHED");
        assert!(cell.get("top").is_none());
        assert_eq!(req.payload["range"], b5_d10());
    }

    #[test]
    fn test_add_alternating_row_background() {
        let rng = RectRange::new(0, 1, 0, Some(4), Some(9)).unwrap();
        let req = add_alternating_row_background(&rng, Color::new(0.2, 0.3, 0.0));
        assert_eq!(
            req.to_wire(),
            json!({"addConditionalFormatRule": {
                "rule": {
                    "ranges": [{"sheetId": 0, "startRowIndex": 1, "endRowIndex": 5,
                                "startColumnIndex": 0, "endColumnIndex": 10}],
                    "booleanRule": {
                        "condition": {
                            "type": "CUSTOM_FORMULA",
                            "values": [{"userEnteredValue": "=MOD(ROW(), 2)"}],
                        },
                        "format": {"backgroundColor": {"red": 0.2, "green": 0.3, "blue": 0.0, "alpha": 1.0}},
                    },
                },
                "index": 1,
            }})
        );
    }

    #[test]
    fn test_apply_format() {
        let text = TextFormat { font_size: Some(12), bold: Some(true), ..Default::default() };
        let req = apply_format(&rect("A1:A4"), &Format::from(text));
        assert_eq!(req.payload["fields"], "userEnteredFormat(textFormat)");
        assert_eq!(req.payload["cell"], json!({"userEnteredFormat": {"textFormat": {"fontSize": 12, "bold": true}}}));

        let req = apply_format(&rect("A1:A4"), &Format::from(NumericFormat::Accounting));
        assert_eq!(req.payload["fields"], "userEnteredFormat(numberFormat)");
        assert_eq!(req.payload["cell"]["userEnteredFormat"]["numberFormat"]["type"], "NUMBER");
    }

    #[test]
    fn test_set_text_alignment() {
        let req = set_text_alignment(&rect("A1:A4"), Some(HorizontalAlign::Center), Some(VerticalAlign::Top));
        assert_eq!(req.payload["fields"], "userEnteredFormat(horizontalAlignment,verticalAlignment)");
        assert_eq!(
            req.payload["cell"],
            json!({"userEnteredFormat": {"horizontalAlignment": "CENTER", "verticalAlignment": "TOP"}})
        );

        let req = set_text_alignment(&rect("A1"), None, Some(VerticalAlign::Bottom));
        assert_eq!(req.payload["fields"], "userEnteredFormat(verticalAlignment)");
    }

    #[test]
    fn test_auto_column_width() {
        let cols = LinearRange::span(0, Axis::Columns, 0, 5).unwrap();
        assert_eq!(
            auto_column_width(&cols).to_wire(),
            json!({"autoResizeDimensions": {"dimensions":
                {"sheetId": 0, "dimension": "COLUMNS", "startIndex": 0, "endIndex": 5}}})
        );
    }

    #[test]
    fn test_grid_structure_requests() {
        let appended = LinearRange::span(2, Axis::Rows, 1000, 10).unwrap();
        assert_eq!(
            append_dimension(&appended).to_wire(),
            json!({"appendDimension": {"sheetId": 2, "dimension": "ROWS", "length": 10}})
        );

        let inserted = LinearRange::span(0, Axis::Columns, 3, 2).unwrap();
        assert_eq!(
            insert_dimension(&inserted).to_wire(),
            json!({"insertDimension": {
                "range": {"sheetId": 0, "dimension": "COLUMNS", "startIndex": 3, "endIndex": 5},
                "inheritFromBefore": false,
            }})
        );

        let deleted = LinearRange::span(0, Axis::Rows, 4, 3).unwrap();
        assert_eq!(
            delete_dimension(&deleted).to_wire(),
            json!({"deleteDimension": {"range": {"sheetId": 0, "dimension": "ROWS", "startIndex": 4, "endIndex": 7}}})
        );
    }

    #[test]
    fn test_freeze() {
        assert_eq!(
            freeze(0, Some(1), Some(2)).to_wire(),
            json!({"updateSheetProperties": {
                "properties": {"sheetId": 0, "gridProperties": {"frozenRowCount": 1, "frozenColumnCount": 2}},
                "fields": "gridProperties(frozenRowCount,frozenColumnCount)",
            }})
        );
        assert_eq!(freeze(0, Some(1), None).payload["fields"], "gridProperties(frozenRowCount)");
    }

    #[test]
    fn test_add_sheet() {
        let props = TabProperties::new(7, "Q1").with_grid(10, 4).with_index(2);
        let req = add_sheet(&props);
        assert_eq!(req.target.tab_id(), 7);
        assert_eq!(
            req.to_wire(),
            json!({"addSheet": {"properties": {
                "sheetId": 7, "title": "Q1", "index": 2,
                "gridProperties": {"rowCount": 10, "columnCount": 4},
            }}})
        );
    }
}
