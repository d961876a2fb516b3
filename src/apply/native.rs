use crate::apply::Applicator;
use crate::dom::page::{DomEvent, NodeId, Page, PageError};
use crate::field::field_model::FieldDescriptor;
use crate::resolve::value::ResolvedValue;

/// Text-input protocol: focus, assign, `input` + `change`, blur. The blur
/// matters: many pages validate on it.
pub fn set_input_value(page: &mut dyn Page, node: NodeId, value: &str) -> Result<(), PageError> {
    page.focus(node)?;
    page.set_value(node, value)?;
    page.dispatch(node, DomEvent::Input)?;
    page.dispatch(node, DomEvent::Change)?;
    page.blur(node)
}

pub(crate) fn apply_checkbox(
    _: &Applicator,
    page: &mut dyn Page,
    node: NodeId,
    _: &FieldDescriptor,
    value: &ResolvedValue,
) -> Result<bool, PageError> {
    page.set_checked(node, value.is_truthy())?;
    page.dispatch(node, DomEvent::Change)?;
    Ok(true)
}

/// Radios are matched per button: only the button whose own value equals
/// the target gets checked.
pub(crate) fn apply_radio(
    _: &Applicator,
    page: &mut dyn Page,
    node: NodeId,
    _: &FieldDescriptor,
    value: &ResolvedValue,
) -> Result<bool, PageError> {
    let target = value.as_text();
    if target.is_empty() || page.value(node)? != target {
        return Ok(false);
    }
    page.set_checked(node, true)?;
    page.dispatch(node, DomEvent::Change)?;
    Ok(true)
}

pub(crate) fn apply_select(
    _: &Applicator,
    page: &mut dyn Page,
    node: NodeId,
    _: &FieldDescriptor,
    value: &ResolvedValue,
) -> Result<bool, PageError> {
    let target = value.as_text();
    let options = page.select_options(node)?;
    let Some(hit) = options
        .iter()
        .find(|o| o.value == target || o.text.trim() == target)
    else {
        return Ok(false);
    };
    page.set_value(node, &hit.value)?;
    page.dispatch(node, DomEvent::Change)?;
    Ok(true)
}

pub(crate) fn apply_content_editable(
    _: &Applicator,
    page: &mut dyn Page,
    node: NodeId,
    _: &FieldDescriptor,
    value: &ResolvedValue,
) -> Result<bool, PageError> {
    page.set_text_content(node, &value.as_text())?;
    page.dispatch(node, DomEvent::Input)?;
    Ok(true)
}

pub(crate) fn apply_text(
    _: &Applicator,
    page: &mut dyn Page,
    node: NodeId,
    _: &FieldDescriptor,
    value: &ResolvedValue,
) -> Result<bool, PageError> {
    set_input_value(page, node, &value.as_text())?;
    Ok(true)
}
