//! Range notation codec.
//!
//! Converts between the service's A1-style notation (`B2:D10`, `C:C`,
//! `Sheet1!A1:B2`, `2:5`) and zero-based grid coordinates. All bounds are
//! inclusive; an absent end means "to the edge of the sheet".

use std::fmt;

/// Identifier of a tab (the service's `sheetId`).
pub type TabId = u32;

/// Error raised for malformed, inverted or out-of-place range notation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    /// Column label contains something other than `A`-`Z`
    InvalidColumn(String),
    /// Row number is zero, negative or not a number
    InvalidRow(String),
    /// Notation does not have the shape of a range
    Malformed(String),
    /// End bound precedes start bound
    Inverted(String),
    /// Column numbers are 1-based
    ZeroColumn,
    /// Index does not fit the grid coordinate type
    Overflow(String),
    /// Range belongs to a different tab than the view it was given to
    TabMismatch { expected: TabId, found: TabId },
    /// Range reaches outside the view it was given to
    OutOfBounds { range: String, bounds: String },
}

impl fmt::Display for AddressError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressError::InvalidColumn(label) => write!(f, "Invalid column label: {:?}", label),
            AddressError::InvalidRow(row) => write!(f, "Invalid row number: {:?}", row),
            AddressError::Malformed(text) => write!(f, "{:?} is not a valid range", text),
            AddressError::Inverted(text) => write!(f, "Range {:?} ends before it starts", text),
            AddressError::ZeroColumn => write!(f, "Column numbers start at 1"),
            AddressError::Overflow(text) => write!(f, "Index out of range in {:?}", text),
            AddressError::TabMismatch { expected, found } => {
                write!(f, "Range targets tab {} but the view is on tab {}", found, expected)
            }
            AddressError::OutOfBounds { range, bounds } => {
                write!(f, "Range {} is outside of {}", range, bounds)
            }
        }
    }
}

impl std::error::Error for AddressError {}

// ============================================================================
// Column labels
// ============================================================================

/// Decode a column label into its 1-based column number (A=1, Z=26, AA=27).
///
/// Labels are bijective base-26: there is no zero digit. Only uppercase
/// `A`-`Z` is accepted.
pub fn decode_column(label: &str) -> Result<u32, AddressError> {
    if label.is_empty() {
        return Err(AddressError::InvalidColumn(label.to_string()));
    }

    let mut acc: u64 = 0;
    for c in label.chars() {
        if !c.is_ascii_uppercase() {
            return Err(AddressError::InvalidColumn(label.to_string()));
        }
        acc = acc * 26 + (c as u64 - 'A' as u64 + 1);
        if acc > u32::MAX as u64 {
            return Err(AddressError::Overflow(label.to_string()));
        }
    }

    Ok(acc as u32)
}

/// Encode a 1-based column number as its label. Inverse of [`decode_column`].
pub fn encode_column(n: u32) -> Result<String, AddressError> {
    if n == 0 {
        return Err(AddressError::ZeroColumn);
    }
    Ok(label_for(n as u64))
}

/// Label of a zero-based column index.
pub(crate) fn column_label(index: u32) -> String {
    label_for(index as u64 + 1)
}

fn label_for(mut n: u64) -> String {
    let mut digits = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        digits.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    digits.iter().rev().collect()
}

// ============================================================================
// Range types
// ============================================================================

/// A rectangular block of cells on one tab.
///
/// `end_row` without `end_col` cannot be written in notation and is refused
/// by [`RectRange::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RectRange {
    tab_id: TabId,
    start_row: u32,
    start_col: u32,
    end_row: Option<u32>,
    end_col: Option<u32>,
}

impl RectRange {
    pub fn new(
        tab_id: TabId,
        start_row: u32,
        start_col: u32,
        end_row: Option<u32>,
        end_col: Option<u32>,
    ) -> Result<Self, AddressError> {
        let rng = Self { tab_id, start_row, start_col, end_row, end_col };
        if end_row.is_some() && end_col.is_none() {
            return Err(AddressError::Malformed(format!(
                "{}{}:{}",
                column_label(start_col),
                start_row as u64 + 1,
                end_row.map(|r| r as u64 + 1).unwrap_or_default()
            )));
        }
        if end_row.map_or(false, |e| e < start_row) || end_col.map_or(false, |e| e < start_col) {
            return Err(AddressError::Inverted(rng.notation_unchecked()));
        }
        Ok(rng)
    }

    /// A single cell.
    pub fn cell(tab_id: TabId, row: u32, col: u32) -> Self {
        Self { tab_id, start_row: row, start_col: col, end_row: Some(row), end_col: Some(col) }
    }

    /// Whole columns `start_col..=end_col`, every row.
    pub fn column_span(tab_id: TabId, start_col: u32, end_col: u32) -> Result<Self, AddressError> {
        Self::new(tab_id, 0, start_col, None, Some(end_col))
    }

    pub fn tab_id(&self) -> TabId {
        self.tab_id
    }

    pub fn start_row(&self) -> u32 {
        self.start_row
    }

    pub fn start_col(&self) -> u32 {
        self.start_col
    }

    pub fn end_row(&self) -> Option<u32> {
        self.end_row
    }

    pub fn end_col(&self) -> Option<u32> {
        self.end_col
    }

    /// Same bounds on another tab.
    pub fn with_tab(mut self, tab_id: TabId) -> Self {
        self.tab_id = tab_id;
        self
    }

    /// Number of rows, if bounded. Wide enough for a band ending at `u32::MAX`.
    pub fn row_len(&self) -> Option<u64> {
        self.end_row.map(|e| inclusive_len(self.start_row, e))
    }

    /// Number of columns, if bounded.
    pub fn col_len(&self) -> Option<u64> {
        self.end_col.map(|e| inclusive_len(self.start_col, e))
    }

    /// The column band this range covers.
    pub fn columns(&self) -> LinearRange {
        LinearRange { tab_id: self.tab_id, axis: Axis::Columns, start: self.start_col, end: self.end_col }
    }

    /// The row band this range covers.
    pub fn rows(&self) -> LinearRange {
        LinearRange { tab_id: self.tab_id, axis: Axis::Rows, start: self.start_row, end: self.end_row }
    }

    /// True when `other` lies entirely inside this range (same tab).
    pub fn contains(&self, other: &RectRange) -> bool {
        self.tab_id == other.tab_id
            && within(self.start_row, self.end_row, other.start_row, other.end_row)
            && within(self.start_col, self.end_col, other.start_col, other.end_col)
    }

    fn notation_unchecked(&self) -> String {
        let start = format!("{}{}", column_label(self.start_col), self.start_row as u64 + 1);
        match (self.end_row, self.end_col) {
            (Some(er), Some(ec)) => {
                if er == self.start_row && ec == self.start_col {
                    start
                } else {
                    format!("{}:{}{}", start, column_label(ec), er as u64 + 1)
                }
            }
            (None, Some(ec)) => {
                if self.start_row == 0 {
                    format!("{}:{}", column_label(self.start_col), column_label(ec))
                } else {
                    format!("{}:{}", start, column_label(ec))
                }
            }
            // an end row always comes with an end column
            (_, None) => format!("{}:", start),
        }
    }
}

impl fmt::Display for RectRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.notation_unchecked())
    }
}

/// Axis of a [`LinearRange`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Rows,
    Columns,
}

impl Axis {
    /// The service's dimension name.
    pub fn dimension(self) -> &'static str {
        match self {
            Axis::Rows => "ROWS",
            Axis::Columns => "COLUMNS",
        }
    }
}

/// A band of whole rows or whole columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LinearRange {
    tab_id: TabId,
    axis: Axis,
    start: u32,
    end: Option<u32>,
}

impl LinearRange {
    pub fn new(tab_id: TabId, axis: Axis, start: u32, end: Option<u32>) -> Result<Self, AddressError> {
        let rng = Self { tab_id, axis, start, end };
        if end.map_or(false, |e| e < start) {
            return Err(AddressError::Inverted(rng.to_string()));
        }
        Ok(rng)
    }

    /// `count` indexes starting at `start`. `count` must be at least 1.
    pub fn span(tab_id: TabId, axis: Axis, start: u32, count: u32) -> Result<Self, AddressError> {
        if count == 0 {
            return Err(AddressError::Malformed(format!("empty {} band", axis.dimension())));
        }
        let end = start
            .checked_add(count - 1)
            .ok_or_else(|| AddressError::Overflow(format!("{}+{}", start, count)))?;
        Self::new(tab_id, axis, start, Some(end))
    }

    pub fn tab_id(&self) -> TabId {
        self.tab_id
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> Option<u32> {
        self.end
    }

    pub fn len(&self) -> Option<u64> {
        self.end.map(|e| inclusive_len(self.start, e))
    }

    /// The band as a rectangle spanning the whole other axis.
    pub fn to_rect(&self) -> RectRange {
        match self.axis {
            Axis::Rows => RectRange {
                tab_id: self.tab_id,
                start_row: self.start,
                start_col: 0,
                end_row: self.end,
                end_col: None,
            },
            Axis::Columns => RectRange {
                tab_id: self.tab_id,
                start_row: 0,
                start_col: self.start,
                end_row: None,
                end_col: self.end,
            },
        }
    }
}

impl fmt::Display for LinearRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.axis {
            Axis::Rows => {
                write!(f, "{}:", self.start as u64 + 1)?;
                if let Some(end) = self.end {
                    write!(f, "{}", end as u64 + 1)?;
                }
                Ok(())
            }
            Axis::Columns => {
                write!(f, "{}:", column_label(self.start))?;
                if let Some(end) = self.end {
                    f.write_str(&column_label(end))?;
                }
                Ok(())
            }
        }
    }
}

/// Result of parsing notation: a rectangle or a row band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Range {
    Rect(RectRange),
    Linear(LinearRange),
}

impl Range {
    pub fn tab_id(&self) -> TabId {
        match self {
            Range::Rect(r) => r.tab_id,
            Range::Linear(l) => l.tab_id,
        }
    }

    /// Key that is equal for two ranges iff they address the same cells.
    pub fn canonical_key(&self) -> String {
        format!("{}!{}", self.tab_id(), self)
    }

    /// Rectangle covering the same cells.
    pub fn to_rect(&self) -> RectRange {
        match self {
            Range::Rect(r) => *r,
            Range::Linear(l) => l.to_rect(),
        }
    }

    /// True when the two ranges share at least one cell.
    pub fn overlaps(&self, other: &Range) -> bool {
        let a = self.to_rect();
        let b = other.to_rect();
        a.tab_id == b.tab_id
            && intersects(a.start_row, a.end_row, b.start_row, b.end_row)
            && intersects(a.start_col, a.end_col, b.start_col, b.end_col)
    }

    pub fn as_rect(&self) -> Option<&RectRange> {
        match self {
            Range::Rect(r) => Some(r),
            Range::Linear(_) => None,
        }
    }

    pub fn as_linear(&self) -> Option<&LinearRange> {
        match self {
            Range::Rect(_) => None,
            Range::Linear(l) => Some(l),
        }
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Range::Rect(r) => write!(f, "{}", r),
            Range::Linear(l) => write!(f, "{}", l),
        }
    }
}

impl From<RectRange> for Range {
    fn from(r: RectRange) -> Self {
        Range::Rect(r)
    }
}

impl From<LinearRange> for Range {
    fn from(l: LinearRange) -> Self {
        Range::Linear(l)
    }
}

fn intersects(a0: u32, a1: Option<u32>, b0: u32, b1: Option<u32>) -> bool {
    a1.map_or(true, |a1| b0 <= a1) && b1.map_or(true, |b1| a0 <= b1)
}

fn within(outer0: u32, outer1: Option<u32>, inner0: u32, inner1: Option<u32>) -> bool {
    if inner0 < outer0 {
        return false;
    }
    match (outer1, inner1) {
        (None, _) => true,
        (Some(_), None) => false,
        (Some(o), Some(i)) => i <= o,
    }
}

// ============================================================================
// Parsing
// ============================================================================

/// Parse notation into a range on `tab_id`. A `Title!` prefix is accepted
/// and dropped; see [`parse_qualified`] to keep it.
pub fn parse(text: &str, tab_id: TabId) -> Result<Range, AddressError> {
    parse_qualified(text, tab_id).map(|(_, rng)| rng)
}

/// Parse notation, returning the tab title prefix if there was one.
pub fn parse_qualified(text: &str, tab_id: TabId) -> Result<(Option<String>, Range), AddressError> {
    let (title, body) = split_title(text)?;
    let rng = parse_body(text, body, tab_id)?;
    Ok((title, rng))
}

/// Parse notation that must denote a rectangle.
pub fn parse_rect(text: &str, tab_id: TabId) -> Result<RectRange, AddressError> {
    match parse(text, tab_id)? {
        Range::Rect(r) => Ok(r),
        Range::Linear(_) => Err(AddressError::Malformed(text.to_string())),
    }
}

/// Canonical notation of a range.
pub fn format(rng: &Range) -> String {
    rng.to_string()
}

/// Notation prefixed with a tab title, quoted when needed.
pub fn format_qualified(title: &str, rng: &Range) -> String {
    let plain = !title.is_empty() && title.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if plain {
        format!("{}!{}", title, rng)
    } else {
        format!("'{}'!{}", title.replace('\'', "''"), rng)
    }
}

fn split_title(text: &str) -> Result<(Option<String>, &str), AddressError> {
    let Some((title, body)) = text.rsplit_once('!') else {
        return Ok((None, text));
    };

    let title = if let Some(quoted) = title.strip_prefix('\'') {
        let inner = quoted
            .strip_suffix('\'')
            .ok_or_else(|| AddressError::Malformed(text.to_string()))?;
        inner.replace("''", "'")
    } else {
        title.to_string()
    };

    if title.is_empty() {
        return Err(AddressError::Malformed(text.to_string()));
    }
    Ok((Some(title), body))
}

/// One side of a `start:end` pair. Both parts are zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Side {
    col: Option<u32>,
    row: Option<u32>,
}

impl Side {
    fn is_empty(&self) -> bool {
        self.col.is_none() && self.row.is_none()
    }
}

/// Inclusive count of `start..=end`.
fn inclusive_len(start: u32, end: u32) -> u64 {
    u64::from(end) - u64::from(start) + 1
}

fn parse_side(text: &str) -> Result<Side, AddressError> {
    let split = text.find(|c: char| c.is_ascii_digit()).unwrap_or(text.len());
    let (label, digits) = text.split_at(split);

    let col = if label.is_empty() {
        None
    } else {
        Some(decode_column(label)? - 1)
    };

    let row = if digits.is_empty() {
        None
    } else {
        if !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(AddressError::InvalidRow(digits.to_string()));
        }
        let n: u64 = digits
            .parse()
            .map_err(|_| AddressError::Overflow(digits.to_string()))?;
        if n == 0 {
            return Err(AddressError::InvalidRow(digits.to_string()));
        }
        if n - 1 > u32::MAX as u64 {
            return Err(AddressError::Overflow(digits.to_string()));
        }
        Some((n - 1) as u32)
    };

    Ok(Side { col, row })
}

fn parse_body(original: &str, body: &str, tab_id: TabId) -> Result<Range, AddressError> {
    let malformed = || AddressError::Malformed(original.to_string());
    if body.is_empty() {
        return Err(malformed());
    }

    let Some((start_text, end_text)) = body.split_once(':') else {
        let side = parse_side(body)?;
        return match (side.col, side.row) {
            (Some(col), Some(row)) => Ok(Range::Rect(RectRange::cell(tab_id, row, col))),
            (Some(col), None) => Ok(Range::Rect(RectRange::column_span(tab_id, col, col)?)),
            (None, Some(row)) => Ok(Range::Linear(LinearRange::new(tab_id, Axis::Rows, row, Some(row))?)),
            (None, None) => Err(malformed()),
        };
    };

    if end_text.contains(':') || start_text.is_empty() {
        return Err(malformed());
    }

    let start = parse_side(start_text)?;
    let end = parse_side(end_text)?;

    let inverted = |e: AddressError| match e {
        AddressError::Inverted(_) => AddressError::Inverted(original.to_string()),
        other => other,
    };

    match (start.col, start.row) {
        (None, Some(start_row)) => {
            if end.col.is_some() {
                return Err(malformed());
            }
            LinearRange::new(tab_id, Axis::Rows, start_row, end.row)
                .map(Range::Linear)
                .map_err(inverted)
        }
        (Some(start_col), start_row) => {
            if end.col.is_none() && end.row.is_some() {
                return Err(malformed());
            }
            let start_row = start_row.unwrap_or(0);
            let rng = if end.is_empty() {
                RectRange::new(tab_id, start_row, start_col, None, None)
            } else {
                RectRange::new(tab_id, start_row, start_col, end.row, end.col)
            };
            rng.map(Range::Rect).map_err(inverted)
        }
        (None, None) => Err(malformed()),
    }
}
