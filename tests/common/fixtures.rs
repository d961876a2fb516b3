use form_autofill::dom::{Compound, Document, DomEvent, NodeId, Page, Selector};

// =========================================================================
// Native controls
// =========================================================================

/// `<label for=id>text</label><input id=id type=..>`; returns the input.
pub fn labeled_input(doc: &mut Document, parent: NodeId, label: &str, id: &str, input_type: &str) -> NodeId {
    let l = doc.append_element(parent, "label", &[("for", id)]);
    doc.append_text(l, label);
    doc.append_element(parent, "input", &[("id", id), ("type", input_type)])
}

/// `<form>` under body.
pub fn form(doc: &mut Document) -> NodeId {
    let body = doc.body();
    doc.append_element(body, "form", &[])
}

/// A select with `(value, text)` options.
pub fn select(doc: &mut Document, parent: NodeId, name: &str, options: &[(&str, &str)]) -> NodeId {
    let select = doc.append_element(parent, "select", &[("name", name)]);
    for (value, text) in options {
        let option = doc.append_element(select, "option", &[("value", value)]);
        doc.append_text(option, text);
    }
    select
}

/// The two-field page used by the end-to-end scenarios: an email input and
/// a "subscribe" checkbox.
pub fn email_and_subscribe() -> (Document, NodeId, NodeId) {
    let mut doc = Document::new();
    let form = form(&mut doc);
    let email = labeled_input(&mut doc, form, "Email", "email", "email");
    let subscribe = labeled_input(&mut doc, form, "Subscribe", "subscribe", "checkbox");
    (doc, email, subscribe)
}

pub fn email_and_phone() -> (Document, NodeId, NodeId) {
    let mut doc = Document::new();
    let form = form(&mut doc);
    let email = labeled_input(&mut doc, form, "Email", "email", "email");
    let phone = labeled_input(&mut doc, form, "Phone", "phone", "tel");
    (doc, email, phone)
}

// =========================================================================
// Composite widgets with page scripts
// =========================================================================

fn owned_by(root: NodeId) -> String {
    root.0.to_string()
}

/// Append `text` to the comma-separated `data-selected` attribute of `root`.
fn record_selection(doc: &mut Document, root: NodeId, text: &str) {
    let previous = doc.attribute(root, "data-selected").ok().flatten();
    let next = match previous {
        Some(p) if !p.is_empty() => format!("{},{}", p, text),
        _ => text.to_string(),
    };
    let _ = doc.set_attribute(root, "data-selected", &next);
}

/// antd-style select. Clicking anywhere in the root renders a detached
/// option panel under body, or shows it again when it already exists.
/// Clicking an option records its text in the root's `data-selected`
/// attribute; a single select then hides its panel, which stays in the DOM.
pub fn antd_select(doc: &mut Document, parent: NodeId, aria_label: &str, options: &[&str], multiple: bool) -> NodeId {
    let class = if multiple {
        "ant-select ant-select-multiple"
    } else {
        "ant-select"
    };
    let root = doc.append_element(parent, "div", &[("class", class)]);
    let selector = doc.append_element(root, "div", &[("class", "ant-select-selector")]);
    doc.append_element(
        selector,
        "input",
        &[("role", "combobox"), ("aria-label", aria_label)],
    );

    let labels: Vec<String> = options.iter().map(|s| s.to_string()).collect();
    doc.on(root, DomEvent::Click, move |doc, _| {
        if let Some(panel) = antd_panel_of(doc, root) {
            let _ = doc.remove_class(panel, "ant-select-dropdown-hidden");
            return;
        }
        let body = doc.body();
        let owner = owned_by(root);
        let panel = doc.append_element(
            body,
            "div",
            &[("class", "ant-select-dropdown"), ("data-owner", owner.as_str())],
        );
        for label in &labels {
            let item = doc.append_element(panel, "div", &[("class", "ant-select-item-option")]);
            doc.append_text(item, label);
            doc.on(item, DomEvent::Click, move |doc, item| {
                let text = doc.text_content(item).unwrap_or_default();
                record_selection(doc, root, &text);
                if !multiple {
                    let _ = doc.add_class(panel, "ant-select-dropdown-hidden");
                }
            });
        }
    });
    root
}

/// The option panel rendered for the antd select `root`, if opened once.
pub fn antd_panel_of(doc: &Document, root: NodeId) -> Option<NodeId> {
    let selector = Selector::from(
        Compound::class("ant-select-dropdown").attr_eq("data-owner", &owned_by(root)),
    );
    doc.query(None, &selector).ok().flatten()
}

/// Element-style select. The popper panel is rendered under body on first
/// click and toggled with `display: none` afterwards, as `v-show` does.
pub fn el_select(doc: &mut Document, parent: NodeId, placeholder: &str, options: &[&str]) -> NodeId {
    let root = doc.append_element(parent, "div", &[("class", "el-select")]);
    doc.append_element(root, "input", &[("placeholder", placeholder), ("readonly", "")]);

    let labels: Vec<String> = options.iter().map(|s| s.to_string()).collect();
    let panel_slot: std::rc::Rc<std::cell::Cell<Option<NodeId>>> = Default::default();
    doc.on(root, DomEvent::Click, move |doc, _| {
        if let Some(panel) = panel_slot.get() {
            let _ = doc.remove_attribute(panel, "style");
            return;
        }
        let body = doc.body();
        let panel = doc.append_element(body, "div", &[("class", "el-select-dropdown el-popper")]);
        let list = doc.append_element(panel, "ul", &[("class", "el-select-dropdown__list")]);
        for label in &labels {
            let item = doc.append_element(list, "li", &[("class", "el-select-dropdown__item")]);
            doc.append_text(item, label);
            doc.on(item, DomEvent::Click, move |doc, item| {
                let text = doc.text_content(item).unwrap_or_default();
                record_selection(doc, root, &text);
                let _ = doc.set_attribute(panel, "style", "z-index: 2001; display: none;");
            });
        }
        panel_slot.set(Some(panel));
    });
    root
}

/// antd-style cascader over a two-level tree. Each click on a level-0 item
/// opens the level-1 menu of its children; a level-1 click records the
/// `parent/child` path.
pub fn antd_cascader(doc: &mut Document, parent: NodeId, aria_label: &str, tree: &[(&str, &[&str])]) -> NodeId {
    let root = doc.append_element(parent, "div", &[("class", "ant-select ant-cascader")]);
    doc.append_element(root, "input", &[("aria-label", aria_label)]);

    let tree: Vec<(String, Vec<String>)> = tree
        .iter()
        .map(|(p, children)| (p.to_string(), children.iter().map(|c| c.to_string()).collect()))
        .collect();

    doc.on(root, DomEvent::Click, move |doc, _| {
        let body = doc.body();
        let menu = doc.append_element(body, "ul", &[("class", "ant-cascader-menu")]);
        for (label, children) in &tree {
            let item = doc.append_element(menu, "li", &[("class", "ant-cascader-menu-item")]);
            doc.append_text(item, label);

            let label = label.clone();
            let children = children.clone();
            doc.on(item, DomEvent::Click, move |doc, _| {
                let body = doc.body();
                let sub = doc.append_element(body, "ul", &[("class", "ant-cascader-menu")]);
                for child in &children {
                    let leaf = doc.append_element(sub, "li", &[("class", "ant-cascader-menu-item")]);
                    doc.append_text(leaf, child);
                    let path = format!("{}/{}", label, child);
                    doc.on(leaf, DomEvent::Click, move |doc, _| {
                        record_selection(doc, root, &path);
                    });
                }
            });
        }
    });
    root
}

/// antd-style switch without an inner input; clicking toggles the
/// `ant-switch-checked` class.
pub fn antd_switch(doc: &mut Document, parent: NodeId, aria_label: &str, on: bool) -> NodeId {
    let class = if on { "ant-switch ant-switch-checked" } else { "ant-switch" };
    let root = doc.append_element(parent, "button", &[("class", class), ("aria-label", aria_label)]);
    doc.on(root, DomEvent::Click, |doc, target| {
        if doc.has_class(target, "ant-switch-checked").unwrap_or(false) {
            let _ = doc.remove_class(target, "ant-switch-checked");
        } else {
            let _ = doc.add_class(target, "ant-switch-checked");
        }
    });
    root
}

/// Element-style switch wrapping a checkbox; clicking the root toggles it.
pub fn el_switch(doc: &mut Document, parent: NodeId, name: &str, on: bool) -> (NodeId, NodeId) {
    let root = doc.append_element(parent, "div", &[("class", "el-switch")]);
    let input = if on {
        doc.append_element(
            root,
            "input",
            &[("type", "checkbox"), ("class", "el-switch__input"), ("name", name), ("checked", "")],
        )
    } else {
        doc.append_element(
            root,
            "input",
            &[("type", "checkbox"), ("class", "el-switch__input"), ("name", name)],
        )
    };
    doc.on(root, DomEvent::Click, move |doc, _| {
        let next = !doc.is_checked(input).unwrap_or(false);
        let _ = doc.set_checked(input, next);
    });
    (root, input)
}

pub fn antd_date_picker(doc: &mut Document, parent: NodeId, placeholder: &str) -> NodeId {
    let root = doc.append_element(parent, "div", &[("class", "ant-picker")]);
    doc.append_element(root, "input", &[("placeholder", placeholder)]);
    root
}

/// Range picker with `inputs` inner inputs (normally two).
pub fn antd_range_picker(doc: &mut Document, parent: NodeId, name: &str, inputs: usize) -> NodeId {
    let root = doc.append_element(parent, "div", &[("class", "ant-picker ant-picker-range")]);
    for i in 0..inputs {
        let input_name = format!("{}_{}", name, i);
        doc.append_element(root, "input", &[("name", input_name.as_str())]);
    }
    root
}

/// All inputs under `root`, in order.
pub fn inputs_of(doc: &Document, root: NodeId) -> Vec<NodeId> {
    doc.query_all(Some(root), &Selector::tag("input"))
        .unwrap_or_default()
}
