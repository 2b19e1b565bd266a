use sheetbatch_config::ViewSettings;
use sheetbatch_core::address::RectRange;
use sheetbatch_protocol::{SpreadsheetProperties, TabProperties};

use crate::error::{DispatchError, ViewError};
use crate::request;
use crate::transport::Transport;
use crate::view::component::Component;
use crate::view::formatting::RangeGridFormatting;
use crate::view::tab::Tab;
use crate::view::View;

/// View of a whole document. Values and formatting act on the active tab
/// (the first one unless [`select_tab`](Document::select_tab) says otherwise).
pub struct Document<'c> {
    component: Component<'c>,
    title: String,
    tabs: Vec<TabProperties>,
    active: usize,
}

impl<'c> Document<'c> {
    /// A document handle with nothing loaded. Call [`View::fetch`] to load the
    /// tab list and the active tab's cells.
    pub fn new(transport: &'c dyn Transport, document_id: impl Into<String>) -> Self {
        Self {
            component: Component::new(transport, document_id, "", RectRange::cell(0, 0, 0), ViewSettings::default()),
            title: String::new(),
            tabs: Vec::new(),
            active: 0,
        }
    }

    /// [`new`](Self::new) followed by a fetch.
    pub fn open(transport: &'c dyn Transport, document_id: impl Into<String>) -> Result<Self, ViewError> {
        let mut doc = Self::new(transport, document_id);
        doc.refresh()?;
        Ok(doc)
    }

    pub fn with_settings(mut self, settings: ViewSettings) -> Self {
        self.component.set_settings(settings);
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn tabs(&self) -> &[TabProperties] {
        &self.tabs
    }

    pub fn active_tab(&self) -> Option<&TabProperties> {
        self.tabs.get(self.active)
    }

    /// A [`Tab`] view of the tab titled `title`, sharing this document's
    /// transport and settings.
    pub fn tab(&self, title: &str) -> Result<Tab<'c>, ViewError> {
        let props = self
            .tabs
            .iter()
            .find(|t| t.title == title)
            .ok_or_else(|| ViewError::UnknownTab(title.to_string()))?;
        Ok(self.tab_view(props))
    }

    /// A [`Tab`] view of the tab at position `index`.
    pub fn tab_at(&self, index: usize) -> Result<Tab<'c>, ViewError> {
        let props = self
            .tabs
            .get(index)
            .ok_or_else(|| ViewError::InvalidArgument(format!("no tab at index {} ({} tabs)", index, self.tabs.len())))?;
        Ok(self.tab_view(props))
    }

    /// Point the document's values and formatting at another tab. Cached
    /// values are dropped; queued requests stay.
    pub fn select_tab(&mut self, title: &str) -> Result<&mut Self, ViewError> {
        let index = self
            .tabs
            .iter()
            .position(|t| t.title == title)
            .ok_or_else(|| ViewError::UnknownTab(title.to_string()))?;
        self.activate(index);
        Ok(self)
    }

    /// Queue `addSheet` for a new tab and list it locally.
    pub fn add_tab(&mut self, mut properties: TabProperties) -> Result<&mut Self, ViewError> {
        if self.tabs.iter().any(|t| t.title == properties.title) {
            return Err(ViewError::DuplicateTab(properties.title));
        }
        if self.tabs.iter().any(|t| t.sheet_id == properties.sheet_id) {
            return Err(ViewError::InvalidArgument(format!("tab id {} is already in use", properties.sheet_id)));
        }
        if properties.index.is_none() {
            properties.index = Some(self.tabs.len() as u32);
        }

        self.component.queue_request(request::add_sheet(&properties));
        self.tabs.push(properties);
        if self.tabs.len() == 1 {
            self.activate(0);
        }
        Ok(self)
    }

    /// Grid operations on the active tab's range.
    pub fn format_grid(&mut self) -> RangeGridFormatting<'_, 'c> {
        RangeGridFormatting::new(&mut self.component)
    }

    // ── Internal helpers ────────────────────────────────────────────────

    fn tab_view(&self, props: &TabProperties) -> Tab<'c> {
        Tab::new(self.component.transport(), self.component.document_id(), props.clone())
            .with_settings(*self.component.settings())
    }

    fn activate(&mut self, index: usize) {
        self.active = index;
        if let Some(props) = self.tabs.get(index) {
            let grid = &props.grid_properties;
            self.component
                .retarget(&props.title, props.full_range(), (grid.row_count, grid.column_count));
        }
    }

    fn refresh_properties(&mut self) -> Result<(), ViewError> {
        let raw = self.component.transport().fetch_properties(self.component.document_id())?;
        let parsed: SpreadsheetProperties =
            serde_json::from_value(raw).map_err(|e| DispatchError::Parse(e.to_string()))?;

        let previous = self.active_tab().map(|t| t.title.clone());
        self.title = parsed.properties.title;
        self.tabs = parsed.sheets.into_iter().map(|s| s.properties).collect();
        log::debug!("document {:?} has {} tab(s)", self.title, self.tabs.len());

        let index = previous
            .and_then(|title| self.tabs.iter().position(|t| t.title == title))
            .unwrap_or(0);
        self.activate(index);
        Ok(())
    }
}

impl<'c> View<'c> for Document<'c> {
    fn component(&self) -> &Component<'c> {
        &self.component
    }

    fn component_mut(&mut self) -> &mut Component<'c> {
        &mut self.component
    }

    /// Reload the title and tab list, then the active tab's cells.
    fn refresh(&mut self) -> Result<(), ViewError> {
        self.refresh_properties()?;
        if self.tabs.is_empty() {
            return Ok(());
        }
        self.component.fetch()
    }
}
