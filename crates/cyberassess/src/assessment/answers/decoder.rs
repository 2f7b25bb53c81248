use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::super::quiz::positional_key;

// Rows written by older clients were occasionally JSON-encoded twice.
const MAX_ENCODING_DEPTH: usize = 2;

/// Raw answers keyed by whatever ids the stored record used, in record order.
/// `None` marks a key that was present without a usable value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct RawAnswers {
    entries: Vec<(String, Option<i32>)>,
}

impl RawAnswers {
    pub(crate) fn value(&self, key: &str) -> Option<i32> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .and_then(|(_, value)| *value)
    }

    pub(crate) fn entries(&self) -> impl Iterator<Item = (&str, Option<i32>)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), *value))
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    fn insert(&mut self, key: String, value: Option<i32>) {
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }
}

pub(crate) fn decode(raw: &Value) -> RawAnswers {
    decode_at_depth(raw, 0)
}

fn decode_at_depth(raw: &Value, depth: usize) -> RawAnswers {
    match raw {
        Value::Object(map) => from_object(map),
        Value::Array(items) => from_array(items),
        Value::String(encoded) if depth < MAX_ENCODING_DEPTH => {
            match serde_json::from_str::<Value>(encoded) {
                Ok(decoded) => decode_at_depth(&decoded, depth + 1),
                Err(err) => {
                    warn!(error = %err, "answers are not valid JSON; treating as empty");
                    RawAnswers::default()
                }
            }
        }
        Value::Null => {
            debug!("no answers recorded");
            RawAnswers::default()
        }
        other => {
            warn!(
                shape = value_kind(other),
                "unsupported answers shape; treating as empty"
            );
            RawAnswers::default()
        }
    }
}

fn from_object(map: &Map<String, Value>) -> RawAnswers {
    let mut answers = RawAnswers::default();
    for (key, value) in map {
        answers.insert(key.trim().to_string(), coerce(value));
    }
    answers
}

fn from_array(items: &[Value]) -> RawAnswers {
    let mut answers = RawAnswers::default();
    for (index, item) in items.iter().enumerate() {
        match keyed_entry(item) {
            Some((key, value)) => answers.insert(key, value),
            None => answers.insert(positional_key(index), coerce(item)),
        }
    }
    answers
}

fn keyed_entry(item: &Value) -> Option<(String, Option<i32>)> {
    let map = item.as_object()?;
    let key = match map.get("id")? {
        Value::String(id) if !id.trim().is_empty() => id.trim().to_string(),
        Value::Number(id) => id.to_string(),
        _ => return None,
    };
    let value = map.get("value").and_then(coerce);
    Some((key, value))
}

/// Numeric coercion of a single stored answer. Unparseable values count as `0`,
/// `null` and blank strings count as unanswered.
pub(crate) fn coerce(value: &Value) -> Option<i32> {
    match value {
        Value::Null => None,
        Value::Bool(flag) => Some(i32::from(*flag)),
        Value::Number(number) => number
            .as_i64()
            .map(|value| value.clamp(i32::MIN as i64, i32::MAX as i64) as i32)
            .or_else(|| number.as_f64().map(round_to_i32)),
        Value::String(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return None;
            }
            Some(
                trimmed
                    .parse::<f64>()
                    .ok()
                    .filter(|parsed| parsed.is_finite())
                    .map(round_to_i32)
                    .unwrap_or(0),
            )
        }
        Value::Object(map) => match map.get("value") {
            Some(inner) => coerce(inner),
            None => Some(0),
        },
        Value::Array(_) => Some(0),
    }
}

fn round_to_i32(value: f64) -> i32 {
    value.round().clamp(i32::MIN as f64, i32::MAX as f64) as i32
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn coerce_handles_numbers_strings_and_flags() {
        assert_eq!(coerce(&json!(2)), Some(2));
        assert_eq!(coerce(&json!(2.6)), Some(3));
        assert_eq!(coerce(&json!(" 1 ")), Some(1));
        assert_eq!(coerce(&json!("1.5")), Some(2));
        assert_eq!(coerce(&json!("mucho")), Some(0));
        assert_eq!(coerce(&json!(true)), Some(1));
        assert_eq!(coerce(&json!({ "value": "3" })), Some(3));
        assert_eq!(coerce(&json!(null)), None);
        assert_eq!(coerce(&json!("  ")), None);
    }

    #[test]
    fn decode_object_preserves_record_order() {
        let answers = decode(&json!({ "b-2": 1, "a-1": "3", "c-9": null }));
        let keys: Vec<_> = answers.entries().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["b-2", "a-1", "c-9"]);
        assert_eq!(answers.value("a-1"), Some(3));
        assert_eq!(answers.value("c-9"), None);
    }

    #[test]
    fn decode_array_uses_ids_or_positions() {
        let answers = decode(&json!([
            { "id": "politicas-1", "value": 2 },
            3,
            { "label": "sin id" },
            { "id": "datos-1", "value": null }
        ]));
        assert_eq!(answers.len(), 4);
        assert_eq!(answers.value("politicas-1"), Some(2));
        assert_eq!(answers.value("q2"), Some(3));
        assert_eq!(answers.value("q3"), Some(0));
        assert_eq!(answers.value("datos-1"), None);
    }

    #[test]
    fn decode_array_later_duplicates_win() {
        let answers = decode(&json!([
            { "id": "q1", "value": 1 },
            { "id": "q1", "value": 3 }
        ]));
        assert_eq!(answers.len(), 1);
        assert_eq!(answers.value("q1"), Some(3));
    }

    #[test]
    fn decode_parses_encoded_strings() {
        let once = decode(&json!("{\"q1\": 2}"));
        assert_eq!(once.value("q1"), Some(2));

        let twice = decode(&Value::String(
            serde_json::to_string("{\"q1\": 1}").expect("encode"),
        ));
        assert_eq!(twice.value("q1"), Some(1));
    }

    #[test]
    fn decode_treats_malformed_input_as_empty() {
        assert_eq!(decode(&json!("not json")).len(), 0);
        assert_eq!(decode(&json!(42)).len(), 0);
        assert_eq!(decode(&json!(null)).len(), 0);
        assert_eq!(decode(&json!(false)).len(), 0);
    }
}
