pub mod composite;
pub mod native;
pub mod wait;

use tracing::{debug, warn};

use crate::dom::page::{NodeId, Page, PageError};
use crate::field::field_model::{FieldDescriptor, FieldHandle, WidgetType};
use crate::resolve::value::ResolvedValue;

pub use composite::cascader_paths;
pub use native::set_input_value;
pub use wait::WaitPolicy;

type Handler =
    fn(&Applicator, &mut dyn Page, NodeId, &FieldDescriptor, &ResolvedValue) -> Result<bool, PageError>;

/// The dispatch table: one interaction protocol per widget variant.
fn handler_for(widget: &WidgetType) -> Handler {
    match widget {
        WidgetType::Checkbox => native::apply_checkbox,
        WidgetType::Radio => native::apply_radio,
        WidgetType::Select => native::apply_select,
        WidgetType::ContentEditable => native::apply_content_editable,
        WidgetType::Text(_) | WidgetType::Textarea => native::apply_text,
        WidgetType::Switch => composite::apply_switch,
        WidgetType::DateRange => composite::apply_date_range,
        WidgetType::DatePicker => composite::apply_date_picker,
        WidgetType::Dropdown | WidgetType::MultiDropdown => composite::apply_dropdown,
        WidgetType::Cascader => composite::apply_cascader,
    }
}

/// Writes resolved values into the page.
#[derive(Debug, Clone, Default)]
pub struct Applicator {
    pub(crate) wait: WaitPolicy,
}

impl Applicator {
    pub fn new(wait: WaitPolicy) -> Self {
        Self { wait }
    }

    pub fn wait_policy(&self) -> WaitPolicy {
        self.wait
    }

    /// Apply `value` to one field. Returns true iff a change was committed;
    /// missing sub-structure and page failures are reported as `false`.
    pub fn apply(
        &self,
        page: &mut dyn Page,
        handle: FieldHandle,
        descriptor: &FieldDescriptor,
        value: &ResolvedValue,
    ) -> bool {
        if value.is_undefined() {
            return false;
        }

        let handler = handler_for(descriptor.widget());
        match handler(self, page, handle.node(), descriptor, value) {
            Ok(applied) => {
                debug!(
                    node = handle.node().0,
                    widget = descriptor.widget_type(),
                    applied,
                    "Applied value"
                );
                applied
            }
            Err(e) => {
                warn!(
                    node = handle.node().0,
                    widget = descriptor.widget_type(),
                    error = %e,
                    "Field application failed"
                );
                false
            }
        }
    }
}
