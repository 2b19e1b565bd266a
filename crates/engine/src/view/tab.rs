use sheetbatch_config::ViewSettings;
use sheetbatch_core::address::{Axis, LinearRange, TabId};
use sheetbatch_protocol::{BatchResponse, TabProperties};

use crate::error::ViewError;
use crate::request::{self, PendingRequest};
use crate::transport::Transport;
use crate::view::component::Component;
use crate::view::formatting::TabGridFormatting;
use crate::view::View;

/// View of one whole tab.
pub struct Tab<'c> {
    component: Component<'c>,
    properties: TabProperties,
}

impl<'c> Tab<'c> {
    pub fn new(transport: &'c dyn Transport, document_id: impl Into<String>, properties: TabProperties) -> Self {
        let mut component = Component::new(
            transport,
            document_id,
            properties.title.clone(),
            properties.full_range(),
            ViewSettings::default(),
        );
        let grid = &properties.grid_properties;
        component.set_grid(grid.row_count, grid.column_count);
        Self { component, properties }
    }

    /// A tab that does not exist yet, sized from `settings`. Queue it with
    /// [`create`](Self::create) or [`add_tab_request`](Self::add_tab_request).
    pub fn blank(
        transport: &'c dyn Transport,
        document_id: impl Into<String>,
        sheet_id: TabId,
        title: impl Into<String>,
        settings: ViewSettings,
    ) -> Self {
        let properties =
            TabProperties::new(sheet_id, title).with_grid(settings.default_rows, settings.default_columns);
        Self::new(transport, document_id, properties).with_settings(settings)
    }

    pub fn with_settings(mut self, settings: ViewSettings) -> Self {
        self.component.set_settings(settings);
        self
    }

    pub fn properties(&self) -> &TabProperties {
        &self.properties
    }

    pub fn tab_id(&self) -> TabId {
        self.properties.sheet_id
    }

    pub fn title(&self) -> &str {
        &self.properties.title
    }

    /// `(rows, columns)` of the tab grid.
    pub fn grid_size(&self) -> (u32, u32) {
        let grid = &self.properties.grid_properties;
        (grid.row_count, grid.column_count)
    }

    /// The `addSheet` request for this tab.
    pub fn add_tab_request(&self) -> PendingRequest {
        request::add_sheet(&self.properties)
    }

    /// Queue `addSheet` for this tab and commit.
    pub fn create(&mut self) -> Result<BatchResponse, ViewError> {
        let req = self.add_tab_request();
        self.component.queue_request(req);
        self.component.commit()
    }

    pub fn format_grid(&mut self) -> TabGridFormatting<'_, 'c> {
        TabGridFormatting::new(self)
    }

    // ── Grid bookkeeping ────────────────────────────────────────────────

    pub(crate) fn count(&self, axis: Axis) -> u32 {
        let (rows, cols) = self.grid_size();
        match axis {
            Axis::Rows => rows,
            Axis::Columns => cols,
        }
    }

    fn set_count(&mut self, axis: Axis, count: u32) {
        let grid = &mut self.properties.grid_properties;
        match axis {
            Axis::Rows => grid.row_count = count,
            Axis::Columns => grid.column_count = count,
        }
        let (rows, cols) = self.grid_size();
        self.component.set_grid(rows, cols);
        self.component.set_range(self.properties.full_range());
    }

    pub(crate) fn grow(&mut self, axis: Axis, count: u32) {
        self.set_count(axis, self.count(axis).saturating_add(count));
    }

    pub(crate) fn inserted(&mut self, band: &LinearRange) {
        let count = band.len().map_or(0, |n| u32::try_from(n).unwrap_or(u32::MAX));
        self.grow(band.axis(), count);
        self.component.insert_cached(band.axis(), band.start(), count);
    }

    pub(crate) fn deleted(&mut self, band: &LinearRange) {
        let axis = band.axis();
        let current = self.count(axis);
        let end = band.end().unwrap_or(current.saturating_sub(1)).min(current.saturating_sub(1));
        if band.start() > end {
            return;
        }
        self.component.delete_cached(axis, band.start(), end);
        self.set_count(axis, current - (end - band.start() + 1));
    }

    pub(crate) fn set_frozen(&mut self, rows: Option<u32>, columns: Option<u32>) {
        let grid = &mut self.properties.grid_properties;
        if rows.is_some() {
            grid.frozen_row_count = rows;
        }
        if columns.is_some() {
            grid.frozen_column_count = columns;
        }
    }
}

impl<'c> View<'c> for Tab<'c> {
    fn component(&self) -> &Component<'c> {
        &self.component
    }

    fn component_mut(&mut self) -> &mut Component<'c> {
        &mut self.component
    }
}
