use serde::{Serialize, Serializer};

use crate::dom::page::{NodeId, SelectOption};

// ============================================================================
// Field descriptor model
// ============================================================================

/// Structural category of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Native,
    Composite,
}

/// Composite-widget family, or `Native` for plain form controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Framework {
    Native,
    Antd,
    Element,
}

/// Closed set of widget variants. Each variant has exactly one application
/// protocol; a new widget family is added here, not in the applicator's
/// conditionals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetType {
    // ---- native ----
    /// Text-like `<input>`; carries the lowercase `type` attribute.
    Text(String),
    Textarea,
    Checkbox,
    Radio,
    Select,
    ContentEditable,

    // ---- composite ----
    Dropdown,
    MultiDropdown,
    DatePicker,
    DateRange,
    Switch,
    Cascader,
}

impl WidgetType {
    /// Classify a native control from its tag and `type` attribute.
    pub fn native(tag: &str, input_type: Option<&str>) -> Self {
        match tag {
            "input" => match input_type.map(str::to_ascii_lowercase).as_deref() {
                Some("checkbox") => WidgetType::Checkbox,
                Some("radio") => WidgetType::Radio,
                Some(t) if !t.is_empty() => WidgetType::Text(t.to_string()),
                _ => WidgetType::Text("text".into()),
            },
            "textarea" => WidgetType::Textarea,
            "select" => WidgetType::Select,
            _ => WidgetType::ContentEditable,
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            WidgetType::Text(_)
            | WidgetType::Textarea
            | WidgetType::Checkbox
            | WidgetType::Radio
            | WidgetType::Select
            | WidgetType::ContentEditable => FieldKind::Native,
            _ => FieldKind::Composite,
        }
    }

    /// Type tag as exposed to data sources: the input type for native inputs,
    /// the widget name for composites.
    pub fn as_str(&self) -> &str {
        match self {
            WidgetType::Text(t) => t,
            WidgetType::Textarea => "textarea",
            WidgetType::Checkbox => "checkbox",
            WidgetType::Radio => "radio",
            WidgetType::Select => "select",
            WidgetType::ContentEditable => "contenteditable",
            WidgetType::Dropdown => "select",
            WidgetType::MultiDropdown => "multiselect",
            WidgetType::DatePicker => "datepicker",
            WidgetType::DateRange => "daterange",
            WidgetType::Switch => "switch",
            WidgetType::Cascader => "cascader",
        }
    }
}

impl Serialize for WidgetType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Identity signals of one field, detached from its DOM shape.
///
/// Serializes as the plain-data payload handed to the value service:
/// `{"kind", "type", "candidates", "placeholder", "options", "framework"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDescriptor {
    kind: FieldKind,
    #[serde(rename = "type")]
    widget: WidgetType,
    candidates: Vec<String>,
    placeholder: String,
    options: Vec<SelectOption>,
    framework: Framework,
}

impl FieldDescriptor {
    /// Build a descriptor. Empty candidate keys are dropped, duplicates keep
    /// their first position, and options are discarded for anything but a
    /// native select.
    pub fn new(
        widget: WidgetType,
        framework: Framework,
        candidates: Vec<String>,
        placeholder: String,
        options: Vec<SelectOption>,
    ) -> Self {
        let mut keys: Vec<String> = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            if !candidate.is_empty() && !keys.contains(&candidate) {
                keys.push(candidate);
            }
        }

        let options = if widget == WidgetType::Select {
            options
        } else {
            Vec::new()
        };

        Self {
            kind: widget.kind(),
            widget,
            candidates: keys,
            placeholder,
            options,
            framework,
        }
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn widget(&self) -> &WidgetType {
        &self.widget
    }

    pub fn widget_type(&self) -> &str {
        self.widget.as_str()
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    pub fn options(&self) -> &[SelectOption] {
        &self.options
    }

    pub fn framework(&self) -> Framework {
        self.framework
    }
}

/// Live element backing a descriptor. For composites this is the widget
/// root, since some interactions must be dispatched on the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldHandle(pub NodeId);

impl FieldHandle {
    pub fn node(&self) -> NodeId {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveredField {
    pub handle: FieldHandle,
    pub descriptor: FieldDescriptor,
}
