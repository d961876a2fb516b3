use serde_json::{Map, Value};

use crate::field::candidates::normalize_text;
use crate::resolve::value::ResolvedValue;

/// Look a field up in a flat record.
///
/// Two passes over the candidates, in order: a key whose normalized form
/// equals the candidate, then a key whose normalized form contains it. An
/// exact hit for any candidate beats a containment hit for every candidate.
pub fn match_record(candidates: &[String], record: &Map<String, Value>) -> ResolvedValue {
    let keys: Vec<(String, &Value)> = record
        .iter()
        .map(|(k, v)| (normalize_text(k), v))
        .collect();

    for candidate in candidates {
        if let Some((_, value)) = keys.iter().find(|(k, _)| k == candidate) {
            return ResolvedValue::from_json((*value).clone());
        }
    }

    for candidate in candidates {
        if let Some((_, value)) = keys.iter().find(|(k, _)| k.contains(candidate.as_str())) {
            return ResolvedValue::from_json((*value).clone());
        }
    }

    ResolvedValue::Undefined
}
