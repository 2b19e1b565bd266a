use std::collections::{BTreeMap, HashMap};

use serde_json::{json, Value as Json};
use sheetbatch_config::ViewSettings;
use sheetbatch_core::address::{self, AddressError, Axis, LinearRange, Range, RectRange, TabId};
use sheetbatch_core::value::{self, Value};
use sheetbatch_protocol::{BatchResponse, SpreadsheetData};

use crate::error::{DispatchError, SchemaError, ViewError};
use crate::queue::RequestQueue;
use crate::request::{self, PendingRequest};
use crate::transport::Transport;
use crate::view::{WriteData, WriteMode};

/// State shared by every view: where it points, what it has cached, and what
/// it has queued.
pub struct Component<'c> {
    transport: &'c dyn Transport,
    document_id: String,
    tab_title: String,
    range: RectRange,
    /// Tab grid size `(rows, columns)` when known
    grid: Option<(u32, u32)>,
    values: Vec<Vec<Option<Value>>>,
    formats: Vec<Vec<Json>>,
    queue: RequestQueue,
    settings: ViewSettings,
}

impl<'c> Component<'c> {
    pub fn new(
        transport: &'c dyn Transport,
        document_id: impl Into<String>,
        tab_title: impl Into<String>,
        range: RectRange,
        settings: ViewSettings,
    ) -> Self {
        Self {
            transport,
            document_id: document_id.into(),
            tab_title: tab_title.into(),
            range,
            grid: None,
            values: Vec::new(),
            formats: Vec::new(),
            queue: RequestQueue::new(),
            settings,
        }
    }

    pub fn transport(&self) -> &'c dyn Transport {
        self.transport
    }

    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    pub fn tab_title(&self) -> &str {
        &self.tab_title
    }

    pub fn tab_id(&self) -> TabId {
        self.range.tab_id()
    }

    pub fn range(&self) -> RectRange {
        self.range
    }

    pub fn settings(&self) -> &ViewSettings {
        &self.settings
    }

    pub fn values(&self) -> &[Vec<Option<Value>>] {
        &self.values
    }

    pub fn formats(&self) -> &[Vec<Json>] {
        &self.formats
    }

    pub fn data_shape(&self) -> (usize, usize) {
        let width = self.values.first().map(Vec::len).unwrap_or(0);
        (self.values.len(), width)
    }

    pub fn requests(&self) -> &[PendingRequest] {
        self.queue.peek()
    }

    pub fn queue(&self) -> &RequestQueue {
        &self.queue
    }

    pub fn clear_requests(&mut self) {
        self.queue.clear();
    }

    pub(crate) fn set_settings(&mut self, settings: ViewSettings) {
        self.settings = settings;
    }

    pub(crate) fn set_grid(&mut self, rows: u32, columns: u32) {
        self.grid = Some((rows, columns));
    }

    pub(crate) fn set_range(&mut self, range: RectRange) {
        self.range = range;
    }

    /// Point at another tab. Cached data no longer applies and is dropped.
    pub(crate) fn retarget(&mut self, tab_title: &str, range: RectRange, grid: (u32, u32)) {
        self.tab_title = tab_title.to_string();
        self.range = range;
        self.grid = Some(grid);
        self.values.clear();
        self.formats.clear();
    }

    pub(crate) fn queue_request(&mut self, request: PendingRequest) {
        self.queue.append(request);
    }

    // ── Fetch ───────────────────────────────────────────────────────────

    /// Replace the caches with the service's current cell data.
    pub fn fetch(&mut self) -> Result<(), ViewError> {
        let text = address::format_qualified(&self.tab_title, &Range::Rect(self.range));
        log::debug!("fetch {} from {}", text, self.document_id);

        let raw = self.transport.fetch_remote(&self.document_id, &text)?;
        let data: SpreadsheetData =
            serde_json::from_value(raw).map_err(|e| DispatchError::Parse(e.to_string()))?;

        let channel = self.settings.read_channel;
        let rows = data.rows();
        let width = rows.iter().map(|r| r.values.len()).max().unwrap_or(0);
        let mut values = Vec::with_capacity(rows.len());
        let mut formats = Vec::with_capacity(rows.len());

        for (r, row) in rows.iter().enumerate() {
            let mut value_row = Vec::with_capacity(width);
            let mut format_row = Vec::with_capacity(width);
            for (c, cell) in row.values.iter().enumerate() {
                let decoded = value::decode(cell, channel).map_err(|e| {
                    let at = RectRange::cell(
                        self.range.tab_id(),
                        self.range.start_row() + r as u32,
                        self.range.start_col() + c as u32,
                    );
                    e.at(&at)
                })?;
                value_row.push(decoded);
                format_row.push(cell.get("effectiveFormat").cloned().unwrap_or_else(|| json!({})));
            }
            value_row.resize(width, None);
            format_row.resize(width, json!({}));
            values.push(value_row);
            formats.push(format_row);
        }

        log::debug!("fetched {} row(s) x {} column(s)", values.len(), width);
        self.values = values;
        self.formats = formats;
        Ok(())
    }

    // ── Write ───────────────────────────────────────────────────────────

    pub fn write_values(&mut self, data: WriteData, mode: WriteMode) -> Result<(), ViewError> {
        // records are data rows; the header row they map through stays put
        let (rows, first_row): (Vec<Vec<Option<Value>>>, u32) = match data {
            WriteData::Rows(rows) => (rows.into_iter().map(|r| r.into_iter().map(Some).collect()).collect(), 0),
            WriteData::Records(records) => (self.records_to_rows(records)?, 1),
        };

        let height = rows.len() as u32;
        let width = rows.iter().map(Vec::len).max().unwrap_or(0) as u32;
        if height == 0 || width == 0 {
            return Ok(());
        }

        let row_offset = match mode {
            WriteMode::Overwrite => first_row,
            WriteMode::Append => (self.values.len() as u32).max(first_row),
        };
        let start_row = self.range.start_row() + row_offset;
        let start_col = self.range.start_col();
        let dest = RectRange::new(
            self.range.tab_id(),
            start_row,
            start_col,
            Some(start_row + height - 1),
            Some(start_col + width - 1),
        )?;

        self.queue.append(request::update_cells(&dest, &rows, self.settings.write_channel));

        self.ensure_cached(row_offset as usize + rows.len(), width as usize);
        for (i, row) in rows.into_iter().enumerate() {
            let cached = &mut self.values[row_offset as usize + i];
            for (j, cell) in row.into_iter().enumerate() {
                cached[j] = cell;
            }
        }
        Ok(())
    }

    /// Map records through the header row (row 0 of the cache).
    fn records_to_rows(
        &self,
        records: Vec<BTreeMap<String, Value>>,
    ) -> Result<Vec<Vec<Option<Value>>>, SchemaError> {
        let header = self
            .values
            .first()
            .filter(|row| row.iter().any(Option::is_some))
            .ok_or(SchemaError::MissingHeader)?;

        let columns: HashMap<&str, usize> = header
            .iter()
            .enumerate()
            .filter_map(|(i, cell)| cell.as_ref().and_then(Value::as_text).map(|name| (name, i)))
            .collect();

        records
            .into_iter()
            .map(|record| {
                let mut row = vec![None; header.len()];
                for (key, v) in record {
                    let idx = *columns.get(key.as_str()).ok_or_else(|| SchemaError::UnknownColumn(key.clone()))?;
                    row[idx] = Some(v);
                }
                Ok(row)
            })
            .collect()
    }

    /// Grow both caches to at least `rows` x `columns`.
    fn ensure_cached(&mut self, rows: usize, columns: usize) {
        let width = columns.max(self.data_shape().1);
        if self.values.len() < rows {
            self.values.resize_with(rows, Vec::new);
            self.formats.resize_with(rows, Vec::new);
        }
        for row in self.values.iter_mut() {
            if row.len() < width {
                row.resize(width, None);
            }
        }
        for row in self.formats.iter_mut() {
            if row.len() < width {
                row.resize(width, json!({}));
            }
        }
    }

    // ── Commit ──────────────────────────────────────────────────────────

    pub fn commit(&mut self) -> Result<BatchResponse, ViewError> {
        if self.settings.warn_on_overlap {
            let queued = self.queue.peek();
            for (i, j) in self.queue.partial_overlaps() {
                log::warn!(
                    "request #{} ({} on {}) partially overlaps request #{} ({} on {}); the later one wins on shared cells",
                    i,
                    queued[i].kind.name(),
                    queued[i].target,
                    j,
                    queued[j].kind.name(),
                    queued[j].target
                );
            }
        }
        Ok(self.queue.flush(self.transport, &self.document_id)?)
    }

    // ── Range validation ────────────────────────────────────────────────

    /// The range a formatting call applies to: `rng` if given (it must lie on
    /// this view's tab and inside its range), otherwise the view's range.
    pub fn resolve(&self, rng: Option<RectRange>) -> Result<RectRange, ViewError> {
        let Some(rng) = rng else {
            return Ok(self.range);
        };
        self.check_tab(rng.tab_id())?;
        if !self.range.contains(&self.bounded(rng)) {
            return Err(AddressError::OutOfBounds { range: rng.to_string(), bounds: self.range.to_string() }.into());
        }
        Ok(rng)
    }

    /// Like [`resolve`](Self::resolve) for a band on `axis`. A rectangle is
    /// taken as its projection onto `axis`.
    pub fn resolve_band(&self, rng: Option<Range>, axis: Axis) -> Result<LinearRange, ViewError> {
        let own = project(&self.range, axis);
        let band = match rng {
            None => return Ok(own),
            Some(Range::Rect(r)) => project(&r, axis),
            Some(Range::Linear(l)) if l.axis() == axis => l,
            Some(Range::Linear(l)) => {
                return Err(ViewError::InvalidArgument(format!(
                    "{} is a {} band, expected {}",
                    l,
                    l.axis().dimension(),
                    axis.dimension()
                )))
            }
        };
        self.check_tab(band.tab_id())?;

        let limit = self.grid.map(|(rows, cols)| match axis {
            Axis::Rows => rows,
            Axis::Columns => cols,
        });
        let end = band.end().or_else(|| limit.map(|l| l.saturating_sub(1)));
        let inside = band.start() >= own.start()
            && match (own.end(), end) {
                (None, _) => true,
                (Some(_), None) => false,
                (Some(o), Some(e)) => e <= o,
            };
        if !inside {
            return Err(AddressError::OutOfBounds { range: band.to_string(), bounds: own.to_string() }.into());
        }
        Ok(band)
    }

    fn check_tab(&self, tab_id: TabId) -> Result<(), ViewError> {
        if tab_id != self.range.tab_id() {
            return Err(AddressError::TabMismatch { expected: self.range.tab_id(), found: tab_id }.into());
        }
        Ok(())
    }

    /// `rng` with unbounded ends pinned to the tab's last row/column, when
    /// the grid size is known.
    fn bounded(&self, rng: RectRange) -> RectRange {
        let Some((rows, cols)) = self.grid else {
            return rng;
        };
        let end_row = rng.end_row().unwrap_or(rows.saturating_sub(1)).max(rng.start_row());
        let end_col = rng.end_col().unwrap_or(cols.saturating_sub(1)).max(rng.start_col());
        RectRange::new(rng.tab_id(), rng.start_row(), rng.start_col(), Some(end_row), Some(end_col)).unwrap_or(rng)
    }

    // ── Cache bookkeeping for grid-structure changes ────────────────────

    /// `count` empty rows/columns were inserted at tab index `at`.
    pub(crate) fn insert_cached(&mut self, axis: Axis, at: u32, count: u32) {
        let origin = match axis {
            Axis::Rows => self.range.start_row(),
            Axis::Columns => self.range.start_col(),
        };
        let Some(rel) = at.checked_sub(origin).map(|r| r as usize) else {
            return;
        };
        let count = count as usize;

        match axis {
            Axis::Rows => {
                if rel >= self.values.len() {
                    return;
                }
                let width = self.data_shape().1;
                for _ in 0..count {
                    self.values.insert(rel, vec![None; width]);
                    self.formats.insert(rel, vec![json!({}); width]);
                }
            }
            Axis::Columns => {
                for row in self.values.iter_mut() {
                    if rel < row.len() {
                        row.splice(rel..rel, std::iter::repeat(None).take(count));
                    }
                }
                for row in self.formats.iter_mut() {
                    if rel < row.len() {
                        row.splice(rel..rel, std::iter::repeat(json!({})).take(count));
                    }
                }
            }
        }
    }

    /// Tab indexes `start..=end` on `axis` were deleted.
    pub(crate) fn delete_cached(&mut self, axis: Axis, start: u32, end: u32) {
        let origin = match axis {
            Axis::Rows => self.range.start_row(),
            Axis::Columns => self.range.start_col(),
        };
        let Some(rel_end) = end.checked_sub(origin).map(|e| e as usize) else {
            return;
        };
        let rel_start = start.saturating_sub(origin) as usize;

        match axis {
            Axis::Rows => {
                if rel_start >= self.values.len() {
                    return;
                }
                let stop = (rel_end + 1).min(self.values.len());
                self.values.drain(rel_start..stop);
                self.formats.drain(rel_start..stop.min(self.formats.len()));
            }
            Axis::Columns => {
                for row in self.values.iter_mut() {
                    if rel_start < row.len() {
                        let stop = (rel_end + 1).min(row.len());
                        row.drain(rel_start..stop);
                    }
                }
                for row in self.formats.iter_mut() {
                    if rel_start < row.len() {
                        let stop = (rel_end + 1).min(row.len());
                        row.drain(rel_start..stop);
                    }
                }
            }
        }
    }
}

fn project(rng: &RectRange, axis: Axis) -> LinearRange {
    match axis {
        Axis::Rows => rng.rows(),
        Axis::Columns => rng.columns(),
    }
}
