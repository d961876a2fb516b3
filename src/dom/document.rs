use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::dom::page::{DomEvent, NodeId, Page, PageError, SelectOption};
use crate::dom::selector::{Compound, Selector};

/// Page script attached to an element. Runs with full access to the document,
/// so it can render dropdown panels, toggle classes, and so on.
pub type Listener = Rc<dyn Fn(&mut Document, NodeId)>;

/// A notification observed by the document, in dispatch order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventRecord {
    pub target: NodeId,
    pub event: DomEvent,
}

#[derive(Debug, Clone)]
pub(crate) enum NodeType {
    Document,
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) node_type: NodeType,
}

/// Element state. `value`, `checked` and `selected` are `None` until a script
/// writes them; until then the attribute (or text) provides the default.
#[derive(Debug, Clone)]
pub(crate) struct Element {
    pub(crate) tag_name: String,
    pub(crate) attrs: Vec<(String, String)>,
    pub(crate) value: Option<String>,
    pub(crate) checked: Option<bool>,
    pub(crate) selected: Option<bool>,
}

impl Element {
    pub(crate) fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    fn input_type(&self) -> String {
        self.attr("type").unwrap_or("text").to_ascii_lowercase()
    }
}

/// In-memory arena DOM.
///
/// Backs offline snapshot runs and the test suite. Supports the subset of
/// browser behaviour the fill engine relies on: property vs. attribute state,
/// select/option semantics, radio groups, checkbox click defaults, bubbling
/// listeners and an event log.
pub struct Document {
    pub(crate) nodes: Vec<Node>,
    body: NodeId,
    listeners: HashMap<(NodeId, DomEvent), Vec<Listener>>,
    events: Vec<EventRecord>,
    active_element: Option<NodeId>,
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("nodes", &self.nodes.len())
            .field("listeners", &self.listeners.len())
            .field("events", &self.events.len())
            .finish()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                node_type: NodeType::Document,
            }],
            body: NodeId(0),
            listeners: HashMap::new(),
            events: Vec::new(),
            active_element: None,
        };
        doc.body = doc.create_node(
            Some(NodeId(0)),
            NodeType::Element(Element {
                tag_name: "body".into(),
                attrs: Vec::new(),
                value: None,
                checked: None,
                selected: None,
            }),
        );
        doc
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    fn create_node(&mut self, parent: Option<NodeId>, node_type: NodeType) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent,
            children: Vec::new(),
            node_type,
        });
        if let Some(parent_id) = parent {
            self.nodes[parent_id.0].children.push(id);
        }
        id
    }

    /// Append an element. Attribute names are case-insensitive and stored
    /// lowercase.
    pub fn append_element(&mut self, parent: NodeId, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        let element = Element {
            tag_name: tag.to_ascii_lowercase(),
            attrs: attrs
                .iter()
                .map(|(k, v)| (k.to_ascii_lowercase(), v.to_string()))
                .collect(),
            value: None,
            checked: None,
            selected: None,
        };
        self.create_node(Some(parent), NodeType::Element(element))
    }

    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        self.create_node(Some(parent), NodeType::Text(text.to_string()))
    }

    /// Detach a node from its parent. The handle stays valid, like a removed
    /// DOM node that a script still references.
    pub fn remove(&mut self, node: NodeId) {
        let Some(parent) = self.nodes.get(node.0).and_then(|n| n.parent) else {
            return;
        };
        self.nodes[parent.0].children.retain(|c| *c != node);
        self.nodes[node.0].parent = None;
    }

    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), PageError> {
        let name = name.to_ascii_lowercase();
        let element = self.element_mut(node)?;
        match element.attrs.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value.to_string(),
            None => element.attrs.push((name, value.to_string())),
        }
        Ok(())
    }

    pub fn remove_attribute(&mut self, node: NodeId, name: &str) -> Result<(), PageError> {
        let name = name.to_ascii_lowercase();
        self.element_mut(node)?.attrs.retain(|(k, _)| *k != name);
        Ok(())
    }

    pub fn add_class(&mut self, node: NodeId, class: &str) -> Result<(), PageError> {
        let current = self.element(node)?.attr("class").unwrap_or("").to_string();
        if current.split_whitespace().any(|c| c == class) {
            return Ok(());
        }
        let next = if current.trim().is_empty() {
            class.to_string()
        } else {
            format!("{} {}", current.trim(), class)
        };
        self.set_attribute(node, "class", &next)
    }

    pub fn remove_class(&mut self, node: NodeId, class: &str) -> Result<(), PageError> {
        let current = self.element(node)?.attr("class").unwrap_or("").to_string();
        let next: Vec<&str> = current.split_whitespace().filter(|c| *c != class).collect();
        self.set_attribute(node, "class", &next.join(" "))
    }

    /// Register a page script for `event` on `node`. Listeners see bubbling
    /// events from descendants too.
    pub fn on(&mut self, node: NodeId, event: DomEvent, listener: impl Fn(&mut Document, NodeId) + 'static) {
        self.listeners
            .entry((node, event))
            .or_default()
            .push(Rc::new(listener));
    }

    pub fn events(&self) -> &[EventRecord] {
        &self.events
    }

    /// Events whose target is `node`, in order.
    pub fn events_for(&self, node: NodeId) -> Vec<DomEvent> {
        self.events
            .iter()
            .filter(|r| r.target == node)
            .map(|r| r.event)
            .collect()
    }

    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    pub fn active_element(&self) -> Option<NodeId> {
        self.active_element
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.0).and_then(|n| n.parent)
    }

    pub(crate) fn element(&self, node: NodeId) -> Result<&Element, PageError> {
        match self.nodes.get(node.0).map(|n| &n.node_type) {
            Some(NodeType::Element(element)) => Ok(element),
            Some(_) => Err(PageError::Unsupported {
                operation: "element access".into(),
                tag: "#node".into(),
            }),
            None => Err(PageError::StaleNode(node)),
        }
    }

    fn element_mut(&mut self, node: NodeId) -> Result<&mut Element, PageError> {
        match self.nodes.get_mut(node.0).map(|n| &mut n.node_type) {
            Some(NodeType::Element(element)) => Ok(element),
            Some(_) => Err(PageError::Unsupported {
                operation: "element access".into(),
                tag: "#node".into(),
            }),
            None => Err(PageError::StaleNode(node)),
        }
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        match &self.nodes[node.0].node_type {
            NodeType::Text(text) => out.push_str(text),
            NodeType::Document | NodeType::Element(_) => {
                for child in &self.nodes[node.0].children {
                    self.collect_text(*child, out);
                }
            }
        }
    }

    fn descendants(&self, node: NodeId, out: &mut Vec<NodeId>) {
        for child in &self.nodes[node.0].children {
            out.push(*child);
            self.descendants(*child, out);
        }
    }

    fn element_matches(&self, node: NodeId, selector: &Selector) -> bool {
        match &self.nodes[node.0].node_type {
            NodeType::Element(element) => {
                selector.matches(&element.tag_name, |name| element.attr(name))
            }
            _ => false,
        }
    }

    /// `<option>` descendants of a select.
    fn option_nodes(&self, select: NodeId) -> Vec<NodeId> {
        let mut all = Vec::new();
        self.descendants(select, &mut all);
        let option = Selector::from(Compound::tag("option"));
        all.into_iter()
            .filter(|n| self.element_matches(*n, &option))
            .collect()
    }

    fn option_value(&self, option: NodeId) -> String {
        match self.element(option) {
            Ok(element) => match element.attr("value") {
                Some(v) => v.to_string(),
                None => self.text_of(option).trim().to_string(),
            },
            Err(_) => String::new(),
        }
    }

    fn option_selected(&self, option: NodeId) -> bool {
        self.element(option)
            .map(|e| e.selected.unwrap_or_else(|| e.attr("selected").is_some()))
            .unwrap_or(false)
    }

    fn text_of(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node, &mut out);
        out
    }

    fn record(&mut self, target: NodeId, event: DomEvent, bubbles: bool) {
        self.events.push(EventRecord { target, event });

        let mut chain = vec![target];
        if bubbles {
            let mut cursor = self.parent(target);
            while let Some(current) = cursor {
                chain.push(current);
                cursor = self.parent(current);
            }
        }

        let pending: Vec<Listener> = chain
            .iter()
            .filter_map(|n| self.listeners.get(&(*n, event)))
            .flat_map(|ls| ls.iter().cloned())
            .collect();

        for listener in pending {
            listener(self, target);
        }
    }

    fn uncheck_radio_group(&mut self, node: NodeId) -> Result<(), PageError> {
        let name = match self.element(node)?.attr("name") {
            Some(n) if !n.is_empty() => n.to_string(),
            _ => return Ok(()),
        };
        let group = Selector::from(Compound::tag("input").attr_eq("type", "radio").attr_eq("name", &name));
        for other in self.query_all(None, &group)? {
            if other != node {
                self.element_mut(other)?.checked = Some(false);
            }
        }
        Ok(())
    }
}

impl Page for Document {
    fn query_all(&self, scope: Option<NodeId>, selector: &Selector) -> Result<Vec<NodeId>, PageError> {
        let start = scope.unwrap_or(NodeId(0));
        if start.0 >= self.nodes.len() {
            return Err(PageError::StaleNode(start));
        }
        let mut all = Vec::new();
        self.descendants(start, &mut all);
        Ok(all
            .into_iter()
            .filter(|n| self.element_matches(*n, selector))
            .collect())
    }

    fn closest(&self, node: NodeId, selector: &Selector) -> Result<Option<NodeId>, PageError> {
        self.element(node)?;
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if self.element_matches(current, selector) {
                return Ok(Some(current));
            }
            cursor = self.parent(current);
        }
        Ok(None)
    }

    fn tag_name(&self, node: NodeId) -> Result<String, PageError> {
        Ok(self.element(node)?.tag_name.clone())
    }

    fn attribute(&self, node: NodeId, name: &str) -> Result<Option<String>, PageError> {
        let name = name.to_ascii_lowercase();
        Ok(self.element(node)?.attr(&name).map(str::to_string))
    }

    fn text_content(&self, node: NodeId) -> Result<String, PageError> {
        if node.0 >= self.nodes.len() {
            return Err(PageError::StaleNode(node));
        }
        Ok(self.text_of(node))
    }

    fn is_disabled(&self, node: NodeId) -> Result<bool, PageError> {
        Ok(self.element(node)?.attr("disabled").is_some())
    }

    fn is_content_editable(&self, node: NodeId) -> Result<bool, PageError> {
        self.element(node)?;
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if let Ok(element) = self.element(current) {
                match element.attr("contenteditable").map(str::to_ascii_lowercase).as_deref() {
                    Some("") | Some("true") | Some("plaintext-only") => return Ok(true),
                    Some("false") => return Ok(false),
                    _ => {}
                }
            }
            cursor = self.parent(current);
        }
        Ok(false)
    }

    fn value(&self, node: NodeId) -> Result<String, PageError> {
        let element = self.element(node)?;
        match element.tag_name.as_str() {
            "select" => {
                let options = self.option_nodes(node);
                let chosen = options
                    .iter()
                    .find(|o| self.option_selected(**o))
                    .or_else(|| options.first());
                Ok(chosen.map(|o| self.option_value(*o)).unwrap_or_default())
            }
            "textarea" => Ok(element.value.clone().unwrap_or_else(|| self.text_of(node))),
            "option" => Ok(self.option_value(node)),
            _ => Ok(element
                .value
                .clone()
                .or_else(|| element.attr("value").map(str::to_string))
                .unwrap_or_default()),
        }
    }

    fn is_checked(&self, node: NodeId) -> Result<bool, PageError> {
        let element = self.element(node)?;
        Ok(element.checked.unwrap_or_else(|| element.attr("checked").is_some()))
    }

    fn select_options(&self, node: NodeId) -> Result<Vec<SelectOption>, PageError> {
        if self.element(node)?.tag_name != "select" {
            return Ok(Vec::new());
        }
        Ok(self
            .option_nodes(node)
            .into_iter()
            .map(|o| SelectOption {
                value: self.option_value(o),
                text: self.text_of(o),
            })
            .collect())
    }

    fn set_value(&mut self, node: NodeId, value: &str) -> Result<(), PageError> {
        let tag = self.element(node)?.tag_name.clone();
        match tag.as_str() {
            "select" => {
                let options = self.option_nodes(node);
                let values: Vec<String> = options.iter().map(|o| self.option_value(*o)).collect();
                let mut taken = false;
                for (option, option_value) in options.iter().zip(values) {
                    let hit = !taken && option_value == value;
                    taken |= hit;
                    self.element_mut(*option)?.selected = Some(hit);
                }
                Ok(())
            }
            "input" | "textarea" => {
                self.element_mut(node)?.value = Some(value.to_string());
                Ok(())
            }
            _ => Err(PageError::Unsupported {
                operation: "set_value".into(),
                tag,
            }),
        }
    }

    fn set_checked(&mut self, node: NodeId, checked: bool) -> Result<(), PageError> {
        let element = self.element(node)?;
        if element.tag_name != "input" {
            return Err(PageError::Unsupported {
                operation: "set_checked".into(),
                tag: element.tag_name.clone(),
            });
        }
        let is_radio = element.input_type() == "radio";
        if is_radio && checked {
            self.uncheck_radio_group(node)?;
        }
        self.element_mut(node)?.checked = Some(checked);
        Ok(())
    }

    fn set_text_content(&mut self, node: NodeId, text: &str) -> Result<(), PageError> {
        self.element(node)?;
        for child in std::mem::take(&mut self.nodes[node.0].children) {
            self.nodes[child.0].parent = None;
        }
        if !text.is_empty() {
            self.append_text(node, text);
        }
        Ok(())
    }

    fn focus(&mut self, node: NodeId) -> Result<(), PageError> {
        self.element(node)?;
        self.active_element = Some(node);
        self.record(node, DomEvent::Focus, false);
        Ok(())
    }

    fn blur(&mut self, node: NodeId) -> Result<(), PageError> {
        self.element(node)?;
        if self.active_element == Some(node) {
            self.active_element = None;
        }
        self.record(node, DomEvent::Blur, false);
        Ok(())
    }

    fn click(&mut self, node: NodeId) -> Result<(), PageError> {
        let element = self.element(node)?;
        if element.attr("disabled").is_some() {
            return Ok(());
        }
        if element.tag_name == "input" {
            match element.input_type().as_str() {
                "checkbox" => {
                    let next = !self.is_checked(node)?;
                    self.element_mut(node)?.checked = Some(next);
                }
                "radio" => self.set_checked(node, true)?,
                _ => {}
            }
        }
        self.record(node, DomEvent::Click, true);
        Ok(())
    }

    fn dispatch(&mut self, node: NodeId, event: DomEvent) -> Result<(), PageError> {
        self.element(node)?;
        self.record(node, event, true);
        Ok(())
    }
}
