//! MkDocs-flavoured YAML handling.
//!
//! `mkdocs.yml` files use the `!ENV` tag for environment lookups, which plain
//! serde cannot map onto structs. The document is parsed into a [`Value`]
//! first, `!ENV` nodes are resolved in place and other tags are left alone.

use serde::{Deserialize, Deserializer};
use serde_yaml::Value;
use serde_yaml::value::TaggedValue;

/// Replace every `!ENV` node in `value` with its resolved value.
///
/// `!ENV NAME` yields the variable's value or null. `!ENV [A, B, default]`
/// tries each name in order; when none is set the last item is the default.
pub(crate) fn resolve_env_tags(value: Value) -> Value {
    match value {
        Value::Tagged(tagged) => {
            let TaggedValue { tag, value } = *tagged;
            if tag == "ENV" {
                resolve_env_tag(value)
            } else {
                Value::Tagged(Box::new(TaggedValue {
                    tag,
                    value: resolve_env_tags(value),
                }))
            }
        }
        Value::Sequence(items) => Value::Sequence(items.into_iter().map(resolve_env_tags).collect()),
        Value::Mapping(map) => Value::Mapping(
            map.into_iter()
                .map(|(k, v)| (k, resolve_env_tags(v)))
                .collect(),
        ),
        other => other,
    }
}

fn resolve_env_tag(value: Value) -> Value {
    let candidates = match value {
        Value::Sequence(items) => items,
        other => vec![other],
    };

    for candidate in &candidates {
        if let Some(name) = candidate.as_str()
            && let Ok(resolved) = std::env::var(name)
        {
            return Value::String(resolved);
        }
    }

    if candidates.len() > 1 {
        candidates.into_iter().last().unwrap_or(Value::Null)
    } else {
        Value::Null
    }
}

/// Accept an id written either as a YAML integer or a string.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected string or number, got {other:?}"
        ))),
    }
}

/// Accept a boolean written as a YAML bool or as a string (values from `!ENV`).
pub(crate) fn flexible_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(b)),
        Some(Value::String(s)) => parse_truthy(&s)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid boolean '{s}'"))),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected boolean, got {other:?}"
        ))),
    }
}

/// Parse the boolean spellings accepted in options and environment gates.
pub(crate) fn parse_truthy(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
