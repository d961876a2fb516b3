use serde_json::Value;
use tracing::debug;

use crate::apply::Applicator;
use crate::apply::native::set_input_value;
use crate::dom::page::{DomEvent, NodeId, Page, PageError};
use crate::dom::selector::{Compound, Selector};
use crate::field::candidates::normalize_text;
use crate::field::discover::dropdown_control;
use crate::field::field_model::{FieldDescriptor, Framework, WidgetType};
use crate::resolve::value::{ResolvedValue, json_text};

const SWITCH_ON: &[&str] = &["ant-switch-checked", "is-checked"];

fn option_selector(framework: Framework) -> Selector {
    match framework {
        Framework::Antd => Selector::classes(&["ant-select-item-option"]),
        _ => Selector::classes(&["el-select-dropdown__item"]),
    }
}

fn panel_selector(framework: Framework) -> Selector {
    match framework {
        Framework::Antd => Selector::classes(&["ant-select-dropdown"]),
        _ => Selector::classes(&["el-select-dropdown"]),
    }
}

/// Closed popups stay in the DOM: antd marks them with a `-hidden` class,
/// Element hides them with `display: none`.
fn closed_popup() -> Selector {
    Selector::any_of([
        Compound::class("ant-select-dropdown-hidden"),
        Compound::class("ant-cascader-menus-hidden"),
        Compound::any().attr_contains("style", "display: none"),
        Compound::any().attr_contains("style", "display:none"),
    ])
}

/// The nodes of `nodes` that are not inside a closed popup.
fn shown(page: &dyn Page, nodes: Vec<NodeId>) -> Result<Vec<NodeId>, PageError> {
    let closed = closed_popup();
    let mut open = Vec::with_capacity(nodes.len());
    for node in nodes {
        if page.closest(node, &closed)?.is_none() {
            open.push(node);
        }
    }
    Ok(open)
}

fn open_panels(page: &dyn Page, selector: &Selector) -> Result<Vec<NodeId>, PageError> {
    shown(page, page.query_all(None, selector)?)
}

fn menu_selector(framework: Framework) -> Selector {
    match framework {
        Framework::Antd => Selector::classes(&["ant-cascader-menu"]),
        _ => Selector::classes(&["el-cascader-panel"]),
    }
}

fn menu_item_selector(framework: Framework) -> Selector {
    match framework {
        Framework::Antd => Selector::classes(&["ant-cascader-menu-item"]),
        _ => Selector::classes(&["el-cascader-node"]),
    }
}

/// First node whose normalized text contains `target`, else the first node.
fn pick_by_text(page: &dyn Page, nodes: &[NodeId], target: &str) -> Result<Option<NodeId>, PageError> {
    let needle = normalize_text(target);
    for node in nodes {
        if normalize_text(&page.text_content(*node)?).contains(&needle) {
            return Ok(Some(*node));
        }
    }
    Ok(nodes.first().copied())
}

// ============================================================================
// Switch
// ============================================================================

/// Toggle only through interaction, and only when the state differs.
pub(crate) fn apply_switch(
    _: &Applicator,
    page: &mut dyn Page,
    root: NodeId,
    _: &FieldDescriptor,
    value: &ResolvedValue,
) -> Result<bool, PageError> {
    let current = match page.query(Some(root), &Selector::tag("input"))? {
        Some(input) => page.is_checked(input)?,
        None => {
            let mut on = false;
            for class in SWITCH_ON {
                on |= page.has_class(root, class)?;
            }
            on
        }
    };

    if current != value.is_truthy() {
        page.click(root)?;
    }
    Ok(true)
}

// ============================================================================
// Date pickers
// ============================================================================

pub(crate) fn apply_date_range(
    _: &Applicator,
    page: &mut dyn Page,
    root: NodeId,
    _: &FieldDescriptor,
    value: &ResolvedValue,
) -> Result<bool, PageError> {
    let inputs = page.query_all(Some(root), &Selector::tag("input"))?;
    if inputs.len() != 2 {
        debug!(root = root.0, inputs = inputs.len(), "Date range needs exactly two inputs");
        return Ok(false);
    }

    let pieces: Vec<String> = match value {
        ResolvedValue::List(items) => items.iter().map(json_text).collect(),
        other => other.as_text().split(',').map(str::to_string).collect(),
    };
    let start = pieces.first().map(|s| s.trim()).unwrap_or("");
    let end = pieces.get(1).map(|s| s.trim()).unwrap_or("");

    set_input_value(page, inputs[0], start)?;
    set_input_value(page, inputs[1], end)?;
    Ok(true)
}

pub(crate) fn apply_date_picker(
    _: &Applicator,
    page: &mut dyn Page,
    root: NodeId,
    _: &FieldDescriptor,
    value: &ResolvedValue,
) -> Result<bool, PageError> {
    let Some(input) = page.query(Some(root), &Selector::tag("input"))? else {
        return Ok(false);
    };
    set_input_value(page, input, &value.as_text())?;
    Ok(true)
}

// ============================================================================
// Dropdowns
// ============================================================================

/// Open the dropdown, then click one option per target. Options are read
/// from the panel this click opened, never from another dropdown's panel.
/// A target with no matching option falls back to the panel's first option
/// so the field still moves forward.
pub(crate) fn apply_dropdown(
    applicator: &Applicator,
    page: &mut dyn Page,
    root: NodeId,
    descriptor: &FieldDescriptor,
    value: &ResolvedValue,
) -> Result<bool, PageError> {
    let Some(control) = dropdown_control(page, root)? else {
        return Ok(false);
    };

    let panels = panel_selector(descriptor.framework());
    let already_open = open_panels(page, &panels)?;

    page.click(control)?;
    page.focus(control)?;
    if page.tag_name(control)? == "input" {
        page.set_value(control, "")?;
        page.dispatch(control, DomEvent::Input)?;
    }

    // A panel that was open before the click only counts when nothing new
    // shows up, e.g. a multi select left open by an earlier fill.
    let opened = applicator.wait.wait_for(|| {
        let open = open_panels(page, &panels)?;
        Ok(open.into_iter().rev().find(|p| !already_open.contains(p)))
    })?;
    let panel = match opened {
        Some(panel) => panel,
        None => match open_panels(page, &panels)?.last() {
            Some(panel) => *panel,
            None => {
                debug!(root = root.0, "Dropdown opened no option panel");
                return Ok(false);
            }
        },
    };

    let targets = match descriptor.widget() {
        WidgetType::MultiDropdown => value.to_list(),
        _ => vec![value.as_text()],
    };
    let options_selector = option_selector(descriptor.framework());

    let mut applied = false;
    for target in &targets {
        let options = applicator.wait.wait_for(|| {
            let found = page.query_all(Some(panel), &options_selector)?;
            Ok((!found.is_empty()).then_some(found))
        })?;
        let Some(options) = options else {
            debug!(root = root.0, panel = panel.0, "Dropdown rendered no options");
            break;
        };

        if let Some(chosen) = pick_by_text(page, &options, target)? {
            page.click(chosen)?;
            applied = true;
        }
    }
    Ok(applied)
}

// ============================================================================
// Cascader
// ============================================================================

fn text_path(raw: &str) -> Vec<String> {
    raw.split('/')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Interpret a cascader value as one or more paths of segments.
///
/// Accepts a list of lists, a single list of segments, or text such as
/// `"Zhejiang / Hangzhou, Jiangsu / Nanjing"`.
pub fn cascader_paths(value: &ResolvedValue) -> Vec<Vec<String>> {
    match value {
        ResolvedValue::Undefined => Vec::new(),
        ResolvedValue::List(items) => {
            if matches!(items.first(), Some(Value::Array(_))) {
                items
                    .iter()
                    .map(|item| match item {
                        Value::Array(segments) => segments.iter().map(json_text).collect(),
                        other => text_path(&json_text(other)),
                    })
                    .collect()
            } else {
                vec![items.iter().map(json_text).collect()]
            }
        }
        ResolvedValue::Scalar(_) => value
            .as_text()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(text_path)
            .collect(),
    }
}

/// Open the cascader and walk each path one menu level per segment, always
/// choosing from the most recently opened menu.
pub(crate) fn apply_cascader(
    applicator: &Applicator,
    page: &mut dyn Page,
    root: NodeId,
    descriptor: &FieldDescriptor,
    value: &ResolvedValue,
) -> Result<bool, PageError> {
    page.click(root)?;

    let menus_selector = menu_selector(descriptor.framework());
    let items_selector = menu_item_selector(descriptor.framework());
    let mut clicked = false;

    for path in cascader_paths(value) {
        for (depth, segment) in path.iter().enumerate() {
            let menus = match applicator.wait.wait_for(|| {
                let found = open_panels(page, &menus_selector)?;
                Ok((found.len() > depth).then_some(found))
            })? {
                Some(menus) => menus,
                None => open_panels(page, &menus_selector)?,
            };

            let active = menus.last().copied();
            let items = page.query_all(active, &items_selector)?;
            if let Some(chosen) = pick_by_text(page, &items, segment)? {
                page.click(chosen)?;
                clicked = true;
            }
        }
    }
    Ok(clicked)
}
