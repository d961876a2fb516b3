pub mod heuristic;
pub mod record;
pub mod value;

use serde_json::{Map, Value};

use crate::field::field_model::FieldDescriptor;

pub use heuristic::{Category, categorize, pick_auto_value};
pub use record::match_record;
pub use value::ResolvedValue;

/// Where a run's values come from. Fixed for the whole run.
#[derive(Debug, Clone, Copy)]
pub enum Resolution<'a> {
    Heuristic,
    Record(&'a Map<String, Value>),
}

/// Resolve one field. Pure: never touches the page.
pub fn resolve(descriptor: &FieldDescriptor, mode: Resolution<'_>) -> ResolvedValue {
    match mode {
        Resolution::Heuristic => pick_auto_value(descriptor),
        Resolution::Record(record) => match_record(descriptor.candidates(), record),
    }
}
