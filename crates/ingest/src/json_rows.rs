//! JSON → rows.
//!
//! Accepted top-level shapes:
//! - `[{...}, {...}]` — non-object elements are skipped
//! - `{...}` — exactly one row
//! - `{"records": [{...}, ...]}` — same skip rule as a bare list

use serde_json::{Map, Value};
use tabula_core::Fields;
use tabula_core::error::IngestError;
use tracing::debug;

use crate::malformed;

pub(crate) fn parse(filename: &str, content: &[u8]) -> Result<Vec<Fields>, IngestError> {
    let payload: Value = serde_json::from_slice(content).map_err(|e| malformed(filename, e))?;

    let rows = match &payload {
        Value::Array(items) => objects(items),
        Value::Object(map) => match map.get("records") {
            Some(Value::Array(items)) => {
                debug!(file = %filename, "JSON parsed (records key)");
                objects(items)
            }
            _ => {
                debug!(file = %filename, "JSON parsed single object");
                vec![normalize_object(map)]
            }
        },
        _ => {
            return Err(IngestError::InvalidShape {
                filename: filename.to_string(),
            });
        }
    };

    Ok(rows)
}

fn objects(items: &[Value]) -> Vec<Fields> {
    items
        .iter()
        .filter_map(Value::as_object)
        .map(normalize_object)
        .collect()
}

fn normalize_object(object: &Map<String, Value>) -> Fields {
    object
        .iter()
        .map(|(key, value)| (key.clone(), stringify(value)))
        .collect()
}

/// Render a JSON value as field text. `null` becomes the empty string.
fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        nested => nested.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_str(content: &str) -> Result<Vec<Fields>, IngestError> {
        parse("test.json", content.as_bytes())
    }

    #[test]
    fn list_of_objects() {
        let rows = parse_str(r#"[{"name":"Alice"},{"name":"Bob"}]"#).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].get("name"), Some("Bob"));
    }

    #[test]
    fn non_objects_in_list_are_skipped() {
        let rows = parse_str(r#"[{"a":1}, 2, "x", null, [1], {"a":3}]"#).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("a"), Some("1"));
        assert_eq!(rows[1].get("a"), Some("3"));
    }

    #[test]
    fn records_key() {
        let rows = parse_str(r#"{"records":[{"a":"x"}, 5, {"a":"y"}], "meta": 1}"#).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].get("a"), Some("y"));
    }

    #[test]
    fn records_key_that_is_not_a_list_is_a_single_row() {
        let rows = parse_str(r#"{"records":"none","owner":"ops"}"#).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("records"), Some("none"));
    }

    #[test]
    fn key_order_follows_document() {
        let rows = parse_str(r#"{"zeta":1,"alpha":2,"mid":3}"#).unwrap();
        assert_eq!(
            rows[0].keys().collect::<Vec<_>>(),
            vec!["zeta", "alpha", "mid"]
        );
    }

    #[test]
    fn values_are_stringified() {
        let rows =
            parse_str(r#"{"n":1.5,"i":-2,"t":true,"s":"txt","z":null,"o":{"k":[1,2]}}"#).unwrap();
        let row = &rows[0];
        assert_eq!(row.get("n"), Some("1.5"));
        assert_eq!(row.get("i"), Some("-2"));
        assert_eq!(row.get("t"), Some("true"));
        assert_eq!(row.get("s"), Some("txt"));
        assert_eq!(row.get("z"), Some(""));
        assert_eq!(row.get("o"), Some(r#"{"k":[1,2]}"#));
    }

    #[test]
    fn scalar_top_level_is_invalid_shape() {
        for body in ["42", "\"text\"", "true", "null"] {
            let err = parse_str(body).unwrap_err();
            assert!(
                matches!(err, IngestError::InvalidShape { .. }),
                "{body} gave {err:?}"
            );
        }
    }

    #[test]
    fn syntax_error_is_malformed() {
        let err = parse_str(r#"{"a": "#).unwrap_err();
        assert!(matches!(err, IngestError::Malformed { .. }));
    }
}
