//! Sheets API wire types.
//!
//! Serde shapes for the parts of the service's JSON the batching layer reads
//! and writes: grid and dimension ranges, colors, borders, text and number
//! formats, tab properties, fetched grid data and batch responses.
//!
//! Grid ranges on the wire are half-open (`endRowIndex` is exclusive); the
//! range types in `sheetbatch-core` are inclusive. Conversions live here.

use serde::{Deserialize, Serialize};
use sheetbatch_core::address::{Axis, LinearRange, Range, RectRange, TabId};

/// Default grid size of a new tab.
pub const DEFAULT_TAB_ROWS: u32 = 1000;
pub const DEFAULT_TAB_COLUMNS: u32 = 26;

/// Field mask for fetching cell data with all value channels and formats.
pub const CELL_DATA_FIELDS: &str =
    "sheets(data(rowData(values(userEnteredValue,formattedValue,effectiveValue,effectiveFormat))))";

/// Field mask for fetching the document title and tab list.
pub const PROPERTIES_FIELDS: &str =
    "properties(title),sheets(properties(index,sheetId,title,gridProperties(columnCount,rowCount)))";

// =============================================================================
// Ranges
// =============================================================================

/// Half-open rectangle on a tab. Absent bounds are unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridRange {
    pub sheet_id: TabId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_row_index: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_row_index: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_column_index: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_column_index: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Dimension {
    Rows,
    Columns,
}

impl From<Axis> for Dimension {
    fn from(axis: Axis) -> Self {
        match axis {
            Axis::Rows => Dimension::Rows,
            Axis::Columns => Dimension::Columns,
        }
    }
}

/// Half-open band of rows or columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionRange {
    pub sheet_id: TabId,
    pub dimension: Dimension,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_index: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_index: Option<u32>,
}

/// Conversion of an inclusive range into the wire's half-open rectangle.
pub trait ToGridRange {
    fn to_grid_range(&self) -> GridRange;
}

/// Conversion of an inclusive band into the wire's half-open band.
pub trait ToDimensionRange {
    fn to_dimension_range(&self) -> DimensionRange;
}

fn exclusive(end: Option<u32>) -> Option<u32> {
    end.map(|e| e.saturating_add(1))
}

impl ToGridRange for RectRange {
    fn to_grid_range(&self) -> GridRange {
        GridRange {
            sheet_id: self.tab_id(),
            start_row_index: Some(self.start_row()),
            end_row_index: exclusive(self.end_row()),
            start_column_index: Some(self.start_col()),
            end_column_index: exclusive(self.end_col()),
        }
    }
}

impl ToGridRange for LinearRange {
    fn to_grid_range(&self) -> GridRange {
        self.to_rect().to_grid_range()
    }
}

impl ToGridRange for Range {
    fn to_grid_range(&self) -> GridRange {
        self.to_rect().to_grid_range()
    }
}

impl ToDimensionRange for LinearRange {
    fn to_dimension_range(&self) -> DimensionRange {
        DimensionRange {
            sheet_id: self.tab_id(),
            dimension: self.axis().into(),
            start_index: Some(self.start()),
            end_index: exclusive(self.end()),
        }
    }
}

// =============================================================================
// Colors and borders
// =============================================================================

/// RGBA color with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    #[serde(default)]
    pub red: f64,
    #[serde(default)]
    pub green: f64,
    #[serde(default)]
    pub blue: f64,
    #[serde(default = "opaque")]
    pub alpha: f64,
}

fn opaque() -> f64 {
    1.0
}

impl Color {
    pub const BLACK: Color = Color { red: 0.0, green: 0.0, blue: 0.0, alpha: 1.0 };
    pub const WHITE: Color = Color { red: 1.0, green: 1.0, blue: 1.0, alpha: 1.0 };

    /// Opaque color from unit components.
    pub fn new(red: f64, green: f64, blue: f64) -> Self {
        Self { red, green, blue, alpha: 1.0 }
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Opaque color from 8-bit channels.
    pub fn from_rgb8(red: u8, green: u8, blue: u8) -> Self {
        Self::new(red as f64 / 255.0, green as f64 / 255.0, blue as f64 / 255.0)
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BorderStyle {
    Dotted,
    Dashed,
    #[default]
    Solid,
    SolidMedium,
    SolidThick,
    None,
    Double,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BorderSide {
    Top,
    Bottom,
    Left,
    Right,
}

impl BorderSide {
    pub const ALL: [BorderSide; 4] = [BorderSide::Top, BorderSide::Bottom, BorderSide::Left, BorderSide::Right];
}

/// One border line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Border {
    pub style: BorderStyle,
    pub color: Color,
}

impl Border {
    pub fn new(style: BorderStyle, color: Color) -> Self {
        Self { style, color }
    }
}

/// The borders of a cell; unset sides are left alone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Borders {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<Border>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bottom: Option<Border>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left: Option<Border>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right: Option<Border>,
}

impl Borders {
    /// The same border on every side.
    pub fn all(border: Border) -> Self {
        Self { top: Some(border), bottom: Some(border), left: Some(border), right: Some(border) }
    }

    /// Set one side.
    pub fn side(mut self, side: BorderSide, border: Border) -> Self {
        let slot = match side {
            BorderSide::Top => &mut self.top,
            BorderSide::Bottom => &mut self.bottom,
            BorderSide::Left => &mut self.left,
            BorderSide::Right => &mut self.right,
        };
        *slot = Some(border);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.top.is_none() && self.bottom.is_none() && self.left.is_none() && self.right.is_none()
    }
}

// =============================================================================
// Text and number formats
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HorizontalAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerticalAlign {
    Top,
    Middle,
    Bottom,
}

/// Font settings. Unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextFormat {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strikethrough: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub underline: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foreground_color: Option<Color>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NumberFormatType {
    Text,
    Number,
    Percent,
    Currency,
    Date,
    Time,
    DateTime,
    Scientific,
}

/// `numberFormat` object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberFormat {
    #[serde(rename = "type")]
    pub kind: NumberFormatType,
    pub pattern: String,
}

/// Number format presets matching the service's format menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NumericFormat {
    Automatic,
    Number,
    Accounting,
    Percent,
    Scientific,
    Financial,
    Currency,
    CurrencyRounded,
    Date,
    Time,
    DateTime,
    Duration,
    Custom(NumberFormat),
}

impl NumericFormat {
    pub fn number_format(&self) -> NumberFormat {
        use NumberFormatType as T;
        let (kind, pattern) = match self {
            NumericFormat::Automatic => (T::Number, ""),
            NumericFormat::Number => (T::Number, "#,##0.00"),
            NumericFormat::Accounting => {
                (T::Number, r#"_($* #,##0.00_);_($* \(#,##0.00\);_($* "-"??_);_(@_)"#)
            }
            NumericFormat::Percent => (T::Percent, "0.00%"),
            NumericFormat::Scientific => (T::Scientific, "0.00E+00"),
            NumericFormat::Financial => (T::Number, "#,##0.00;(#,##0.00)"),
            NumericFormat::Currency => (T::Currency, r##""$"#,##0.00"##),
            NumericFormat::CurrencyRounded => (T::Currency, r##""$"#,##0"##),
            NumericFormat::Date => (T::Date, "M/d/yyyy"),
            NumericFormat::Time => (T::Time, "h:mm:ss am/pm"),
            NumericFormat::DateTime => (T::DateTime, "M/d/yyyy H:mm:ss"),
            NumericFormat::Duration => (T::Time, "[h]:mm:ss"),
            NumericFormat::Custom(fmt) => return fmt.clone(),
        };
        NumberFormat { kind, pattern: pattern.to_string() }
    }
}

/// Anything `apply_format` accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum Format {
    Text(TextFormat),
    Numeric(NumericFormat),
}

impl Format {
    /// Key inside `userEnteredFormat`.
    pub fn format_key(&self) -> &'static str {
        match self {
            Format::Text(_) => "textFormat",
            Format::Numeric(_) => "numberFormat",
        }
    }

    /// Field mask for a `repeatCell` carrying this format.
    pub fn fields(&self) -> String {
        format!("userEnteredFormat({})", self.format_key())
    }

    /// The `cell` object of a `repeatCell` carrying this format.
    pub fn cell(&self) -> serde_json::Value {
        let inner = match self {
            Format::Text(tf) => serde_json::to_value(tf),
            Format::Numeric(nf) => serde_json::to_value(nf.number_format()),
        }
        .unwrap_or_default();
        let mut fmt = serde_json::Map::new();
        fmt.insert(self.format_key().to_string(), inner);
        serde_json::json!({ "userEnteredFormat": fmt })
    }
}

impl From<TextFormat> for Format {
    fn from(tf: TextFormat) -> Self {
        Format::Text(tf)
    }
}

impl From<NumericFormat> for Format {
    fn from(nf: NumericFormat) -> Self {
        Format::Numeric(nf)
    }
}

// =============================================================================
// Tabs and documents
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridProperties {
    #[serde(default = "default_rows")]
    pub row_count: u32,
    #[serde(default = "default_columns")]
    pub column_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frozen_row_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frozen_column_count: Option<u32>,
}

fn default_rows() -> u32 {
    DEFAULT_TAB_ROWS
}

fn default_columns() -> u32 {
    DEFAULT_TAB_COLUMNS
}

impl GridProperties {
    pub fn new(row_count: u32, column_count: u32) -> Self {
        Self { row_count, column_count, frozen_row_count: None, frozen_column_count: None }
    }
}

impl Default for GridProperties {
    fn default() -> Self {
        Self::new(DEFAULT_TAB_ROWS, DEFAULT_TAB_COLUMNS)
    }
}

/// A tab's `properties` object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabProperties {
    #[serde(default)]
    pub sheet_id: TabId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
    #[serde(default)]
    pub grid_properties: GridProperties,
}

impl TabProperties {
    pub fn new(sheet_id: TabId, title: impl Into<String>) -> Self {
        Self { sheet_id, title: title.into(), index: None, grid_properties: GridProperties::default() }
    }

    pub fn with_index(mut self, index: u32) -> Self {
        self.index = Some(index);
        self
    }

    pub fn with_grid(mut self, row_count: u32, column_count: u32) -> Self {
        self.grid_properties.row_count = row_count;
        self.grid_properties.column_count = column_count;
        self
    }

    /// The whole grid of this tab as an inclusive range.
    pub fn full_range(&self) -> RectRange {
        let rows = self.grid_properties.row_count.max(1);
        let cols = self.grid_properties.column_count.max(1);
        // rows/cols are at least 1 so the bounds are ordered
        RectRange::new(self.sheet_id, 0, 0, Some(rows - 1), Some(cols - 1))
            .unwrap_or_else(|_| RectRange::cell(self.sheet_id, 0, 0))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentProperties {
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetEntry {
    pub properties: TabProperties,
}

/// Response of a properties fetch (`PROPERTIES_FIELDS`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpreadsheetProperties {
    #[serde(default)]
    pub properties: DocumentProperties,
    #[serde(default)]
    pub sheets: Vec<SheetEntry>,
}

/// One row of fetched cells. Cells are left as raw `CellData` objects for the
/// value codec.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RowData {
    #[serde(default)]
    pub values: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_row: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_column: Option<u32>,
    #[serde(default)]
    pub row_data: Vec<RowData>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SheetData {
    #[serde(default)]
    pub data: Vec<GridData>,
}

/// Response of a cell data fetch (`CELL_DATA_FIELDS`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpreadsheetData {
    #[serde(default)]
    pub sheets: Vec<SheetData>,
}

impl SpreadsheetData {
    /// Rows of the first grid of the first sheet, which is what a
    /// single-range fetch returns.
    pub fn rows(&self) -> &[RowData] {
        self.sheets
            .first()
            .and_then(|s| s.data.first())
            .map(|g| g.row_data.as_slice())
            .unwrap_or(&[])
    }
}

// =============================================================================
// Batch update
// =============================================================================

/// Body of a `batchUpdate` call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchUpdateRequest {
    pub requests: Vec<serde_json::Value>,
}

/// Response of a `batchUpdate` call. Replies are positional, one per request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResponse {
    #[serde(default)]
    pub spreadsheet_id: String,
    #[serde(default)]
    pub replies: Vec<serde_json::Value>,
}
