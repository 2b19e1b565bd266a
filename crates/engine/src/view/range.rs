use sheetbatch_config::ViewSettings;
use sheetbatch_core::address::RectRange;

use crate::transport::Transport;
use crate::view::component::Component;
use crate::view::formatting::RangeGridFormatting;
use crate::view::View;

/// View of a rectangle inside one tab.
pub struct RangeView<'c> {
    component: Component<'c>,
}

impl<'c> RangeView<'c> {
    /// `tab_title` names the tab `range` lives on; it qualifies the fetch.
    pub fn new(
        transport: &'c dyn Transport,
        document_id: impl Into<String>,
        tab_title: impl Into<String>,
        range: RectRange,
    ) -> Self {
        Self { component: Component::new(transport, document_id, tab_title, range, ViewSettings::default()) }
    }

    pub fn with_settings(mut self, settings: ViewSettings) -> Self {
        self.component.set_settings(settings);
        self
    }

    pub fn format_grid(&mut self) -> RangeGridFormatting<'_, 'c> {
        RangeGridFormatting::new(&mut self.component)
    }
}

impl<'c> View<'c> for RangeView<'c> {
    fn component(&self) -> &Component<'c> {
        &self.component
    }

    fn component_mut(&mut self) -> &mut Component<'c> {
        &mut self.component
    }
}
