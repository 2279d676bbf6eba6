//! Query string decoding
//!
//! Query parameters arrive either flat (`?filter={"where":{"color":"red"}}`)
//! or in bracket form (`?filter[where][color]=red`, `?ids[]=1&ids[]=2`).
//! Both decode into a nested JSON object; leaf values stay strings.

use crate::error::FrameworkError;
use serde_json::{Map, Value};

/// Decode a raw query string into a nested JSON object
pub fn parse_query(raw: &str) -> Result<Map<String, Value>, FrameworkError> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(raw)
        .map_err(|e| FrameworkError::bad_request(format!("Malformed query string: {}", e)))?;

    let mut root = Map::new();
    for (key, value) in pairs {
        let path = split_key(&key)?;
        insert_path(&mut root, &path, Value::String(value))?;
    }
    Ok(root)
}

/// Split `filter[where][color]` into `["filter", "where", "color"]`
fn split_key(key: &str) -> Result<Vec<String>, FrameworkError> {
    let malformed = || FrameworkError::bad_request(format!("Malformed query key '{}'", key));

    let (head, mut rest) = match key.find('[') {
        Some(pos) => (&key[..pos], &key[pos..]),
        None => (key, ""),
    };
    if head.is_empty() {
        return Err(malformed());
    }

    let mut path = vec![head.to_string()];
    while !rest.is_empty() {
        if !rest.starts_with('[') {
            return Err(malformed());
        }
        let close = rest.find(']').ok_or_else(malformed)?;
        path.push(rest[1..close].to_string());
        rest = &rest[close + 1..];
    }
    Ok(path)
}

fn insert_path(
    target: &mut Map<String, Value>,
    path: &[String],
    value: Value,
) -> Result<(), FrameworkError> {
    let (segment, rest) = match path.split_first() {
        Some(split) => split,
        None => return Ok(()),
    };

    if rest.is_empty() {
        target.insert(segment.clone(), value);
        return Ok(());
    }

    // `key[]` and `key[0]` build arrays; anything else builds objects.
    let next_is_index = rest[0].is_empty() || rest[0].parse::<usize>().is_ok();
    let slot = target.entry(segment.clone()).or_insert_with(|| {
        if next_is_index {
            Value::Array(Vec::new())
        } else {
            Value::Object(Map::new())
        }
    });
    insert_into(slot, rest, value)
}

fn insert_into(slot: &mut Value, path: &[String], value: Value) -> Result<(), FrameworkError> {
    match slot {
        Value::Object(map) => insert_path(map, path, value),
        Value::Array(items) => {
            let (segment, rest) = match path.split_first() {
                Some(split) => split,
                None => return Ok(()),
            };
            let index = if segment.is_empty() {
                items.len()
            } else {
                segment.parse::<usize>().map_err(|_| {
                    FrameworkError::bad_request(format!(
                        "Cannot mix array and object keys at '{}'",
                        segment
                    ))
                })?
            };
            if rest.is_empty() {
                if index < items.len() {
                    items[index] = value;
                } else {
                    items.push(value);
                }
                return Ok(());
            }
            if index >= items.len() {
                items.push(Value::Object(Map::new()));
            }
            let last = items.len() - 1;
            let child = &mut items[index.min(last)];
            insert_into(child, rest, value)
        }
        _ => Err(FrameworkError::bad_request(
            "Query key used both as a value and as a nested object",
        )),
    }
}

/// Interpret a decoded query parameter that may hold JSON
///
/// Strings that look like JSON objects or arrays are parsed; everything else
/// is returned unchanged.
pub fn decode_json_param(name: &str, value: &Value) -> Result<Value, FrameworkError> {
    match value {
        Value::String(raw) => {
            let trimmed = raw.trim_start();
            if trimmed.starts_with('{') || trimmed.starts_with('[') {
                serde_json::from_str(raw).map_err(|e| {
                    FrameworkError::invalid_filter(format!("'{}' is not valid JSON: {}", name, e))
                })
            } else {
                Ok(value.clone())
            }
        }
        other => Ok(other.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_flat_pairs() {
        let query = parse_query("a=1&b=two%20words").unwrap();
        assert_eq!(Value::Object(query), json!({"a": "1", "b": "two words"}));
    }

    #[test]
    fn test_bracket_objects() {
        let query = parse_query("filter%5Bwhere%5D%5Bcolor%5D=black&filter[limit]=2").unwrap();
        assert_eq!(
            Value::Object(query),
            json!({"filter": {"where": {"color": "black"}, "limit": "2"}})
        );
    }

    #[test]
    fn test_bracket_arrays() {
        let query = parse_query("where[id][inq][]=1&where[id][inq][]=3").unwrap();
        assert_eq!(Value::Object(query), json!({"where": {"id": {"inq": ["1", "3"]}}}));

        let query = parse_query("include[0][relation]=todos").unwrap();
        assert_eq!(Value::Object(query), json!({"include": [{"relation": "todos"}]}));
    }

    #[test]
    fn test_malformed_keys() {
        assert!(parse_query("[x]=1").is_err());
        assert!(parse_query("a[b=1").is_err());
        assert!(parse_query("a=1&a[b]=2").is_err());
    }

    #[test]
    fn test_decode_json_param() {
        let raw = json!("{\"where\":{\"title\":\"day\"}}");
        assert_eq!(
            decode_json_param("filter", &raw).unwrap(),
            json!({"where": {"title": "day"}})
        );
        assert_eq!(decode_json_param("x", &json!("plain")).unwrap(), json!("plain"));
        assert!(decode_json_param("filter", &json!("{not json")).is_err());
    }
}
