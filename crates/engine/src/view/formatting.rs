//! Chainable request builders bound to a view.
//!
//! Each method validates its optional range against the view, queues exactly
//! one request and hands back the builder:
//!
//! ```ignore
//! tab.format_cell()
//!     .set_background_color(Color::from_rgb8(240, 240, 240), None)?
//!     .set_border_format(&Borders::all(Border::default()), None)?;
//! tab.commit()?;
//! ```

use sheetbatch_core::address::{Axis, LinearRange, Range, RectRange};
use sheetbatch_protocol::{Borders, Color, Format, HorizontalAlign, VerticalAlign};

use crate::error::ViewError;
use crate::request;
use crate::view::component::Component;
use crate::view::tab::Tab;
use crate::view::View;

// ============================================================================
// Cells
// ============================================================================

/// Backgrounds and borders.
pub struct CellFormatting<'a, 'c> {
    component: &'a mut Component<'c>,
}

impl<'a, 'c> CellFormatting<'a, 'c> {
    pub(crate) fn new(component: &'a mut Component<'c>) -> Self {
        Self { component }
    }

    /// Color every other row of `rng` with a conditional format rule.
    pub fn add_alternating_row_background(
        &mut self,
        color: Color,
        rng: Option<RectRange>,
    ) -> Result<&mut Self, ViewError> {
        let rng = self.component.resolve(rng)?;
        self.component.queue_request(request::add_alternating_row_background(&rng, color));
        Ok(self)
    }

    pub fn set_background_color(&mut self, color: Color, rng: Option<RectRange>) -> Result<&mut Self, ViewError> {
        let rng = self.component.resolve(rng)?;
        self.component.queue_request(request::set_background_color(&rng, color));
        Ok(self)
    }

    pub fn set_border_format(&mut self, borders: &Borders, rng: Option<RectRange>) -> Result<&mut Self, ViewError> {
        if borders.is_empty() {
            return Err(ViewError::InvalidArgument("no border sides given".into()));
        }
        let rng = self.component.resolve(rng)?;
        self.component.queue_request(request::set_border_format(&rng, borders));
        Ok(self)
    }
}

// ============================================================================
// Text
// ============================================================================

/// Font, number format and alignment.
pub struct TextFormatting<'a, 'c> {
    component: &'a mut Component<'c>,
}

impl<'a, 'c> TextFormatting<'a, 'c> {
    pub(crate) fn new(component: &'a mut Component<'c>) -> Self {
        Self { component }
    }

    /// Apply a [`TextFormat`](sheetbatch_protocol::TextFormat) or a
    /// [`NumericFormat`](sheetbatch_protocol::NumericFormat) preset.
    pub fn apply_format(&mut self, format: impl Into<Format>, rng: Option<RectRange>) -> Result<&mut Self, ViewError> {
        let rng = self.component.resolve(rng)?;
        self.component.queue_request(request::apply_format(&rng, &format.into()));
        Ok(self)
    }

    pub fn set_text_alignment(
        &mut self,
        horizontal: Option<HorizontalAlign>,
        vertical: Option<VerticalAlign>,
        rng: Option<RectRange>,
    ) -> Result<&mut Self, ViewError> {
        if horizontal.is_none() && vertical.is_none() {
            return Err(ViewError::InvalidArgument("one of horizontal or vertical alignment is required".into()));
        }
        let rng = self.component.resolve(rng)?;
        self.component.queue_request(request::set_text_alignment(&rng, horizontal, vertical));
        Ok(self)
    }
}

// ============================================================================
// Grid
// ============================================================================

/// Grid operations available on any view.
pub struct RangeGridFormatting<'a, 'c> {
    component: &'a mut Component<'c>,
}

impl<'a, 'c> RangeGridFormatting<'a, 'c> {
    pub(crate) fn new(component: &'a mut Component<'c>) -> Self {
        Self { component }
    }

    /// Fit column widths to their contents. `rng` may be a column band or a
    /// rectangle (its columns are used); defaults to the view's columns.
    pub fn auto_column_width(&mut self, rng: Option<Range>) -> Result<&mut Self, ViewError> {
        let band = self.component.resolve_band(rng, Axis::Columns)?;
        self.component.queue_request(request::auto_column_width(&band));
        Ok(self)
    }
}

/// Grid operations on a whole tab. Row and column counts, the tab's range and
/// the cached grids are adjusted as requests are queued.
pub struct TabGridFormatting<'a, 'c> {
    tab: &'a mut Tab<'c>,
}

impl<'a, 'c> TabGridFormatting<'a, 'c> {
    pub(crate) fn new(tab: &'a mut Tab<'c>) -> Self {
        Self { tab }
    }

    pub fn auto_column_width(&mut self, rng: Option<Range>) -> Result<&mut Self, ViewError> {
        let band = self.tab.component().resolve_band(rng, Axis::Columns)?;
        self.tab.component_mut().queue_request(request::auto_column_width(&band));
        Ok(self)
    }

    /// Add `count` empty rows at the bottom of the tab.
    pub fn append_rows(&mut self, count: u32) -> Result<&mut Self, ViewError> {
        self.append(Axis::Rows, count)?;
        Ok(self)
    }

    /// Insert `count` empty rows so the first new row has index `at`.
    pub fn insert_rows(&mut self, count: u32, at: u32) -> Result<&mut Self, ViewError> {
        self.insert(Axis::Rows, count, at)?;
        Ok(self)
    }

    /// Delete a band of rows. A rectangle deletes the rows it spans.
    pub fn delete_rows(&mut self, rng: Range) -> Result<&mut Self, ViewError> {
        self.delete(Axis::Rows, rng)?;
        Ok(self)
    }

    /// Add `count` empty columns at the right edge of the tab.
    pub fn append_columns(&mut self, count: u32) -> Result<&mut Self, ViewError> {
        self.append(Axis::Columns, count)?;
        Ok(self)
    }

    /// Insert `count` empty columns so the first new column has index `at`.
    pub fn insert_columns(&mut self, count: u32, at: u32) -> Result<&mut Self, ViewError> {
        self.insert(Axis::Columns, count, at)?;
        Ok(self)
    }

    /// Delete a band of columns. A rectangle deletes the columns it spans.
    pub fn delete_columns(&mut self, rng: Range) -> Result<&mut Self, ViewError> {
        self.delete(Axis::Columns, rng)?;
        Ok(self)
    }

    /// Freeze the first `rows` rows and/or `columns` columns.
    pub fn freeze(&mut self, rows: Option<u32>, columns: Option<u32>) -> Result<&mut Self, ViewError> {
        if rows.is_none() && columns.is_none() {
            return Err(ViewError::InvalidArgument("one of rows or columns must be given".into()));
        }
        let (row_count, col_count) = self.tab.grid_size();
        if rows.map_or(false, |r| r > row_count) || columns.map_or(false, |c| c > col_count) {
            return Err(ViewError::InvalidArgument(format!(
                "cannot freeze beyond the {}x{} grid",
                row_count, col_count
            )));
        }
        let tab_id = self.tab.tab_id();
        self.tab.component_mut().queue_request(request::freeze(tab_id, rows, columns));
        self.tab.set_frozen(rows, columns);
        Ok(self)
    }

    // ── Internal helpers ────────────────────────────────────────────────

    fn append(&mut self, axis: Axis, count: u32) -> Result<(), ViewError> {
        let band = LinearRange::span(self.tab.tab_id(), axis, self.tab.count(axis), nonzero(count)?)?;
        self.tab.component_mut().queue_request(request::append_dimension(&band));
        self.tab.grow(axis, count);
        Ok(())
    }

    fn insert(&mut self, axis: Axis, count: u32, at: u32) -> Result<(), ViewError> {
        let current = self.tab.count(axis);
        if at > current {
            return Err(ViewError::InvalidArgument(format!(
                "cannot insert at index {}; the tab has {} {}",
                at,
                current,
                axis.dimension().to_lowercase()
            )));
        }
        let band = LinearRange::span(self.tab.tab_id(), axis, at, nonzero(count)?)?;
        self.tab.component_mut().queue_request(request::insert_dimension(&band));
        self.tab.inserted(&band);
        Ok(())
    }

    fn delete(&mut self, axis: Axis, rng: Range) -> Result<(), ViewError> {
        let band = self.tab.component().resolve_band(Some(rng), axis)?;
        self.tab.component_mut().queue_request(request::delete_dimension(&band));
        self.tab.deleted(&band);
        Ok(())
    }
}

fn nonzero(count: u32) -> Result<u32, ViewError> {
    if count == 0 {
        return Err(ViewError::InvalidArgument("count must be at least 1".into()));
    }
    Ok(count)
}
