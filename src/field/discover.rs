use std::collections::HashSet;

use tracing::{debug, warn};

use crate::dom::page::{NodeId, Page, PageError};
use crate::dom::selector::{Compound, Selector};
use crate::field::candidates::candidate_keys;
use crate::field::field_model::{DiscoveredField, FieldDescriptor, FieldHandle, Framework, WidgetType};

// ============================================================================
// Widget markers
// ============================================================================

pub const DROPDOWN_ROOTS: &[&str] = &["ant-select", "el-select"];
pub const DROPDOWN_MULTIPLE: &[&str] = &["ant-select-multiple", "el-select--multiple"];

pub const PICKER_ROOTS: &[&str] = &[
    "ant-picker",
    "ant-picker-range",
    "el-date-editor",
    "el-date-picker",
    "el-date-editor--date",
    "el-date-editor--daterange",
    "el-date-editor--datetimerange",
];
pub const PICKER_RANGE: &[&str] = &[
    "ant-picker-range",
    "el-date-editor--daterange",
    "el-date-editor--datetimerange",
];

pub const SWITCH_ROOTS: &[&str] = &["ant-switch", "el-switch"];
pub const CASCADER_ROOTS: &[&str] = &["ant-cascader", "el-cascader"];

/// Input types that are never user-fillable.
const SKIPPED_INPUT_TYPES: &[&str] = &["hidden", "button", "submit", "reset", "file", "image"];

fn native_selector() -> Selector {
    Selector::any_of([
        Compound::tag("input"),
        Compound::tag("textarea"),
        Compound::tag("select"),
        Compound::any().with_attr("contenteditable"),
    ])
}

fn composite_selector() -> Selector {
    let all: Vec<&str> = DROPDOWN_ROOTS
        .iter()
        .chain(PICKER_ROOTS)
        .chain(SWITCH_ROOTS)
        .chain(CASCADER_ROOTS)
        .copied()
        .collect();
    Selector::classes(&all)
}

fn has_any_class(page: &dyn Page, node: NodeId, classes: &[&str]) -> Result<bool, PageError> {
    for class in classes {
        if page.has_class(node, class)? {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Inner control of a dropdown: the combobox input, any input, or the antd
/// selector box, in that priority.
pub fn dropdown_control(page: &dyn Page, root: NodeId) -> Result<Option<NodeId>, PageError> {
    let priority = [
        Selector::from(Compound::tag("input").attr_eq("role", "combobox")),
        Selector::tag("input"),
        Selector::classes(&["ant-select-selector"]),
    ];
    for selector in &priority {
        if let Some(node) = page.query(Some(root), selector)? {
            return Ok(Some(node));
        }
    }
    Ok(None)
}

// ============================================================================
// Discovery
// ============================================================================

/// Scan the page once: native controls in document order, then composite
/// widgets grouped as dropdowns, date pickers, switches, cascaders.
///
/// Native controls that live inside a recognized widget root belong to that
/// widget and are not reported on their own, so every field appears once.
pub fn discover(page: &dyn Page) -> Vec<DiscoveredField> {
    let composites = discover_composites(page);
    let roots: HashSet<NodeId> = composites.iter().map(|f| f.handle.node()).collect();

    let mut fields = discover_native(page, &roots);
    debug!(
        native = fields.len(),
        composite = composites.len(),
        "Discovered fields"
    );
    fields.extend(composites);
    fields
}

fn discover_native(page: &dyn Page, widget_roots: &HashSet<NodeId>) -> Vec<DiscoveredField> {
    let nodes = match page.query_all(None, &native_selector()) {
        Ok(nodes) => nodes,
        Err(e) => {
            warn!(error = %e, "Native field scan failed");
            return Vec::new();
        }
    };

    let widget_marker = composite_selector();
    let mut fields = Vec::new();

    for node in nodes {
        match describe_native(page, node, widget_roots, &widget_marker) {
            Ok(Some(descriptor)) => fields.push(DiscoveredField {
                handle: FieldHandle(node),
                descriptor,
            }),
            Ok(None) => {}
            Err(e) => warn!(node = node.0, error = %e, "Skipping unreadable field"),
        }
    }
    fields
}

fn describe_native(
    page: &dyn Page,
    node: NodeId,
    widget_roots: &HashSet<NodeId>,
    widget_marker: &Selector,
) -> Result<Option<FieldDescriptor>, PageError> {
    if page.is_disabled(node)? {
        return Ok(None);
    }

    let tag = page.tag_name(node)?;
    let input_type = page.attribute(node, "type")?;
    match tag.as_str() {
        "input" => {
            let t = input_type.as_deref().unwrap_or("text").to_ascii_lowercase();
            if SKIPPED_INPUT_TYPES.contains(&t.as_str()) {
                return Ok(None);
            }
        }
        "textarea" | "select" => {}
        // `contenteditable="false"` and friends carry the attribute too
        _ if !page.is_content_editable(node)? => return Ok(None),
        _ => {}
    }

    if let Some(owner) = page.closest(node, widget_marker)? {
        if widget_roots.contains(&owner) {
            return Ok(None);
        }
    }

    let widget = WidgetType::native(&tag, input_type.as_deref());
    let options = if widget == WidgetType::Select {
        page.select_options(node)?
    } else {
        Vec::new()
    };

    Ok(Some(FieldDescriptor::new(
        widget,
        Framework::Native,
        candidate_keys(page, node)?,
        page.attribute(node, "placeholder")?.unwrap_or_default(),
        options,
    )))
}

/// One composite group: root markers, markers that mean "antd", and the
/// per-root classifier.
struct WidgetGroup {
    name: &'static str,
    roots: &'static [&'static str],
    antd: &'static [&'static str],
    classify: fn(&dyn Page, NodeId) -> Result<Option<(WidgetType, NodeId)>, PageError>,
}

const GROUPS: &[WidgetGroup] = &[
    WidgetGroup {
        name: "dropdown",
        roots: DROPDOWN_ROOTS,
        antd: &["ant-select"],
        classify: classify_dropdown,
    },
    WidgetGroup {
        name: "picker",
        roots: PICKER_ROOTS,
        antd: &["ant-picker", "ant-picker-range"],
        classify: classify_picker,
    },
    WidgetGroup {
        name: "switch",
        roots: SWITCH_ROOTS,
        antd: &["ant-switch"],
        classify: classify_switch,
    },
    WidgetGroup {
        name: "cascader",
        roots: CASCADER_ROOTS,
        antd: &["ant-cascader"],
        classify: classify_cascader,
    },
];

fn classify_dropdown(page: &dyn Page, root: NodeId) -> Result<Option<(WidgetType, NodeId)>, PageError> {
    // antd renders cascaders on top of select markup
    if has_any_class(page, root, CASCADER_ROOTS)? {
        return Ok(None);
    }
    let Some(control) = dropdown_control(page, root)? else {
        return Ok(None);
    };
    let widget = if has_any_class(page, root, DROPDOWN_MULTIPLE)? {
        WidgetType::MultiDropdown
    } else {
        WidgetType::Dropdown
    };
    Ok(Some((widget, control)))
}

fn classify_picker(page: &dyn Page, root: NodeId) -> Result<Option<(WidgetType, NodeId)>, PageError> {
    let Some(input) = page.query(Some(root), &Selector::tag("input"))? else {
        return Ok(None);
    };
    let widget = if has_any_class(page, root, PICKER_RANGE)? {
        WidgetType::DateRange
    } else {
        WidgetType::DatePicker
    };
    Ok(Some((widget, input)))
}

fn classify_switch(page: &dyn Page, root: NodeId) -> Result<Option<(WidgetType, NodeId)>, PageError> {
    let signal = page.query(Some(root), &Selector::tag("input"))?.unwrap_or(root);
    Ok(Some((WidgetType::Switch, signal)))
}

fn classify_cascader(page: &dyn Page, root: NodeId) -> Result<Option<(WidgetType, NodeId)>, PageError> {
    let signal = page.query(Some(root), &Selector::tag("input"))?.unwrap_or(root);
    Ok(Some((WidgetType::Cascader, signal)))
}

fn discover_composites(page: &dyn Page) -> Vec<DiscoveredField> {
    let mut claimed: HashSet<NodeId> = HashSet::new();
    let mut fields = Vec::new();

    for group in GROUPS {
        let roots = match page.query_all(None, &Selector::classes(group.roots)) {
            Ok(roots) => roots,
            Err(e) => {
                warn!(group = group.name, error = %e, "Widget scan failed");
                continue;
            }
        };

        for root in roots {
            if claimed.contains(&root) {
                continue;
            }
            match describe_composite(page, root, group) {
                Ok(Some(descriptor)) => {
                    claimed.insert(root);
                    fields.push(DiscoveredField {
                        handle: FieldHandle(root),
                        descriptor,
                    });
                }
                Ok(None) => debug!(group = group.name, root = root.0, "Widget root without control"),
                Err(e) => warn!(group = group.name, root = root.0, error = %e, "Skipping unreadable widget"),
            }
        }
    }
    fields
}

fn describe_composite(
    page: &dyn Page,
    root: NodeId,
    group: &WidgetGroup,
) -> Result<Option<FieldDescriptor>, PageError> {
    let Some((widget, signal)) = (group.classify)(page, root)? else {
        return Ok(None);
    };

    let framework = if has_any_class(page, root, group.antd)? {
        Framework::Antd
    } else {
        Framework::Element
    };

    let placeholder = if widget == WidgetType::Switch {
        String::new()
    } else {
        page.attribute(signal, "placeholder")?.unwrap_or_default()
    };

    Ok(Some(FieldDescriptor::new(
        widget,
        framework,
        candidate_keys(page, signal)?,
        placeholder,
        Vec::new(),
    )))
}
