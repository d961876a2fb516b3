use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::dom::document::{Document, NodeType};
use crate::dom::page::{NodeId, Page};

/// JSON form of a page body, used for offline fills.
///
/// ```json
/// [
///   {"tag": "label", "attrs": {"for": "email"}, "children": ["Email"]},
///   {"tag": "input", "attrs": {"id": "email", "type": "email"}}
/// ]
/// ```
///
/// Attribute values may be strings, numbers or booleans; `true` means the
/// attribute is present with an empty value, `false` and `null` omit it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SnapshotNode {
    Text(String),
    Element {
        tag: String,
        #[serde(default, skip_serializing_if = "Map::is_empty")]
        attrs: Map<String, Value>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        children: Vec<SnapshotNode>,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SnapshotFile {
    Many(Vec<SnapshotNode>),
    One(SnapshotNode),
}

/// Parse a snapshot file: either a single node or an array of body children.
pub fn parse_snapshot(json: &str) -> Result<Vec<SnapshotNode>, serde_json::Error> {
    Ok(match serde_json::from_str::<SnapshotFile>(json)? {
        SnapshotFile::Many(nodes) => nodes,
        SnapshotFile::One(node) => vec![node],
    })
}

fn attr_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::Bool(true) => Some(String::new()),
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

impl Document {
    pub fn from_snapshot(nodes: &[SnapshotNode]) -> Document {
        let mut doc = Document::new();
        let body = doc.body();
        for node in nodes {
            doc.import(body, node);
        }
        doc
    }

    fn import(&mut self, parent: NodeId, node: &SnapshotNode) {
        match node {
            SnapshotNode::Text(text) => {
                self.append_text(parent, text);
            }
            SnapshotNode::Element { tag, attrs, children } => {
                let pairs: Vec<(String, String)> = attrs
                    .iter()
                    .filter_map(|(k, v)| attr_text(v).map(|t| (k.clone(), t)))
                    .collect();
                let borrowed: Vec<(&str, &str)> =
                    pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
                let id = self.append_element(parent, tag, &borrowed);
                for child in children {
                    self.import(id, child);
                }
            }
        }
    }

    /// Export the body with live state folded back into attributes: the
    /// current `value`, and `checked` / `selected` flags.
    pub fn to_snapshot(&self) -> Vec<SnapshotNode> {
        self.nodes[self.body().0]
            .children
            .iter()
            .map(|c| self.export(*c))
            .collect()
    }

    fn export(&self, node: NodeId) -> SnapshotNode {
        let entry = &self.nodes[node.0];
        match &entry.node_type {
            NodeType::Text(text) => SnapshotNode::Text(text.clone()),
            NodeType::Document => SnapshotNode::Text(String::new()),
            NodeType::Element(element) => {
                let mut attrs = Map::new();
                for (k, v) in &element.attrs {
                    attrs.insert(k.clone(), Value::String(v.clone()));
                }
                if let Some(value) = &element.value {
                    attrs.insert("value".into(), Value::String(value.clone()));
                }
                if element.checked.is_some() {
                    if self.is_checked(node).unwrap_or(false) {
                        attrs.insert("checked".into(), Value::Bool(true));
                    } else {
                        attrs.remove("checked");
                    }
                }
                if let Some(selected) = element.selected {
                    if selected {
                        attrs.insert("selected".into(), Value::Bool(true));
                    } else {
                        attrs.remove("selected");
                    }
                }
                SnapshotNode::Element {
                    tag: element.tag_name.clone(),
                    attrs,
                    children: entry.children.iter().map(|c| self.export(*c)).collect(),
                }
            }
        }
    }
}
