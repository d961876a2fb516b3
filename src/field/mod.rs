pub mod candidates;
pub mod discover;
pub mod field_model;

pub use candidates::{candidate_keys, label_text, normalize_text};
pub use discover::discover;
pub use field_model::{DiscoveredField, FieldDescriptor, FieldHandle, FieldKind, Framework, WidgetType};
