use crate::dom::page::{NodeId, Page, PageError};
use crate::dom::selector::{Compound, Selector};

/// Trim and lowercase; the single normalization used for every text
/// comparison in the engine.
pub fn normalize_text(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Label text for an element, by priority: `label[for=<id>]`, an enclosing
/// `<label>`, then `aria-label`.
pub fn label_text(page: &dyn Page, node: NodeId) -> Result<String, PageError> {
    if let Some(id) = page.attribute(node, "id")?.filter(|id| !id.is_empty()) {
        let by_for = Selector::from(Compound::tag("label").attr_eq("for", &id));
        if let Some(label) = page.query(None, &by_for)? {
            return page.text_content(label);
        }
    }

    if let Some(label) = page.closest(node, &Selector::tag("label"))? {
        return page.text_content(label);
    }

    Ok(page.attribute(node, "aria-label")?.unwrap_or_default())
}

/// Candidate keys for an element: label, name, id, placeholder and
/// aria-label, normalized, empties dropped, first occurrence kept.
pub fn candidate_keys(page: &dyn Page, node: NodeId) -> Result<Vec<String>, PageError> {
    let label = label_text(page, node)?;
    let name = page.attribute(node, "name")?.unwrap_or_default();
    let id = page.attribute(node, "id")?.unwrap_or_default();
    let placeholder = page.attribute(node, "placeholder")?.unwrap_or_default();
    let aria = page.attribute(node, "aria-label")?.unwrap_or_default();

    let mut keys: Vec<String> = Vec::new();
    for raw in [label, name, id, placeholder, aria] {
        let key = normalize_text(&raw);
        if !key.is_empty() && !keys.contains(&key) {
            keys.push(key);
        }
    }
    Ok(keys)
}
