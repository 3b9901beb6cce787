/*
 * Copyright 2025 Security Union LLC
 *
 * Licensed under either of
 *
 * * Apache License, Version 2.0
 *   (http://www.apache.org/licenses/LICENSE-2.0)
 * * MIT license
 *   (http://opensource.org/licenses/MIT)
 *
 * at your option.
 */

//! snake_case / kebab-case / dot.case → camelCase key conversion.
//!
//! Auth0 returns snake_case payloads; applications consume camelCase. The
//! conversion works on [`Node`], a JSON-like tree that can also carry dates and
//! regex patterns. Those two are opaque scalars: they are carried over as-is and
//! never walked.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;
use serde_json::{Map, Number, Value};

/// Convert one identifier to camelCase.
///
/// `_`, `.` and `-` are the only delimiters. A run of delimiters is dropped and
/// the next character upper-cased; trailing delimiters are dropped. The output
/// never contains a delimiter, so applying this twice is the same as once.
pub fn camelize(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut upper_next = false;

    for ch in input.chars() {
        if is_delimiter(ch) {
            upper_next = true;
            continue;
        }
        if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }

    out
}

fn is_delimiter(ch: char) -> bool {
    matches!(ch, '_' | '.' | '-')
}

/// How far [`camelize_keys`] descends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Depth {
    /// Only the keys of the outermost object(s).
    Shallow,
    /// Every object key at every level.
    Deep,
}

/// JSON-like value tree with date and pattern leaves.
#[derive(Debug, Clone)]
pub enum Node {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Date(DateTime<Utc>),
    Pattern(Arc<Regex>),
    Array(Vec<Node>),
    Object(BTreeMap<String, Node>),
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Node::Null, Node::Null) => true,
            (Node::Bool(a), Node::Bool(b)) => a == b,
            (Node::Number(a), Node::Number(b)) => a == b,
            (Node::String(a), Node::String(b)) => a == b,
            (Node::Date(a), Node::Date(b)) => a == b,
            (Node::Pattern(a), Node::Pattern(b)) => a.as_str() == b.as_str(),
            (Node::Array(a), Node::Array(b)) => a == b,
            (Node::Object(a), Node::Object(b)) => a == b,
            _ => false,
        }
    }
}

/// Produce a new tree with object keys camelized.
///
/// Arrays are mapped element-wise at the same depth, so a shallow transform of
/// an array of objects rewrites each element's own top-level keys. When two
/// keys collapse to the same camelCase name, the one sorting last wins.
pub fn camelize_keys(node: &Node, depth: Depth) -> Node {
    match node {
        Node::Object(map) => Node::Object(
            map.iter()
                .map(|(key, value)| {
                    let value = match depth {
                        Depth::Deep => camelize_keys(value, depth),
                        Depth::Shallow => value.clone(),
                    };
                    (camelize(key), value)
                })
                .collect(),
        ),
        Node::Array(items) => Node::Array(items.iter().map(|i| camelize_keys(i, depth)).collect()),
        // Dates and patterns are leaves: cloning a pattern clones the Arc.
        other => other.clone(),
    }
}

/// [`camelize_keys`] over plain JSON.
pub fn camelize_json_keys(value: &Value, depth: Depth) -> Value {
    camelize_keys(&Node::from(value), depth).into()
}

impl From<&Value> for Node {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Node::Null,
            Value::Bool(b) => Node::Bool(*b),
            Value::Number(n) => Node::Number(n.clone()),
            Value::String(s) => Node::String(s.clone()),
            Value::Array(items) => Node::Array(items.iter().map(Node::from).collect()),
            Value::Object(map) => Node::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), Node::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<Node> for Value {
    fn from(node: Node) -> Self {
        match node {
            Node::Null => Value::Null,
            Node::Bool(b) => Value::Bool(b),
            Node::Number(n) => Value::Number(n),
            Node::String(s) => Value::String(s),
            Node::Date(d) => Value::String(d.to_rfc3339_opts(SecondsFormat::Millis, true)),
            Node::Pattern(p) => Value::String(p.as_str().to_string()),
            Node::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            Node::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect::<Map<String, Value>>(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn object(entries: Vec<(&str, Node)>) -> Node {
        Node::Object(
            entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        )
    }

    #[test]
    fn camelizes_all_delimiters() {
        assert_eq!(camelize("given_name"), "givenName");
        assert_eq!(camelize("x-request-id"), "xRequestId");
        assert_eq!(camelize("app.metadata.plan"), "appMetadataPlan");
        assert_eq!(camelize("email"), "email");
    }

    #[test]
    fn delimiter_runs_and_trailing_delimiters() {
        assert_eq!(camelize("a__b"), "aB");
        assert_eq!(camelize("a_.-b"), "aB");
        assert_eq!(camelize("name_"), "name");
        assert_eq!(camelize("_id"), "Id");
    }

    #[test]
    fn camelize_is_idempotent() {
        for input in [
            "user_id",
            "a__b",
            "x-y.z_w",
            "already_camelCase_mix",
            "trailing__",
            "__",
            "",
            "ünï_cödé",
            "9_lives",
        ] {
            let once = camelize(input);
            assert_eq!(camelize(&once), once, "input: {input:?}");
        }
    }

    #[test]
    fn deep_transform_rewrites_nested_objects_and_arrays() {
        let input = json!({
            "user_metadata": { "favorite_color": "blue" },
            "identities": [{ "is_social": true, "connection": "google-oauth2" }]
        });
        let out = camelize_json_keys(&input, Depth::Deep);
        assert_eq!(
            out,
            json!({
                "userMetadata": { "favoriteColor": "blue" },
                "identities": [{ "isSocial": true, "connection": "google-oauth2" }]
            })
        );
    }

    #[test]
    fn shallow_transform_leaves_nested_keys_untouched() {
        let input = json!({
            "user_metadata": { "favorite_color": "blue" },
            "email_verified": true
        });
        let out = camelize_json_keys(&input, Depth::Shallow);
        assert_eq!(
            out,
            json!({
                "userMetadata": { "favorite_color": "blue" },
                "emailVerified": true
            })
        );
    }

    #[test]
    fn deep_transform_passes_dates_and_patterns_through() {
        let date = Utc.with_ymd_and_hms(2024, 2, 4, 12, 0, 0).unwrap();
        let pattern = Arc::new(Regex::new(r"^auth0\|[a-z0-9_]+$").unwrap());
        let input = object(vec![
            ("updated_at", Node::Date(date)),
            (
                "nested_value",
                object(vec![("sub_pattern", Node::Pattern(pattern.clone()))]),
            ),
        ]);

        let out = camelize_keys(&input, Depth::Deep);

        let Node::Object(top) = &out else {
            panic!("expected object");
        };
        assert_eq!(top.get("updatedAt"), Some(&Node::Date(date)));
        let Some(Node::Object(nested)) = top.get("nestedValue") else {
            panic!("expected nested object");
        };
        match nested.get("subPattern") {
            Some(Node::Pattern(p)) => assert!(Arc::ptr_eq(p, &pattern)),
            other => panic!("expected pattern, got {other:?}"),
        }
    }

    #[test]
    fn input_is_not_mutated() {
        let input = json!({ "family_name": "Ice" });
        let before = input.clone();
        let _ = camelize_json_keys(&input, Depth::Deep);
        assert_eq!(input, before);
    }

    #[test]
    fn dates_render_as_rfc3339_in_json() {
        let date = Utc.with_ymd_and_hms(2024, 2, 4, 12, 0, 0).unwrap();
        let value: Value = object(vec![("at", Node::Date(date))]).into();
        assert_eq!(value, json!({ "at": "2024-02-04T12:00:00.000Z" }));
    }
}
