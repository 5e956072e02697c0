//! Remote identifiers arrive as JSON strings or numbers depending on the
//! resource, both are normalised to `String`.
//!
//! Serialization always writes the string form, so a legacy numeric id
//! such as `42` is exported as `"42"`. The service accepts either form.

use serde::{Deserialize, Deserializer, de::Error};
use serde_json::Value as JsonValue;

pub(crate) fn deserialize_opt<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<JsonValue>::deserialize(deserializer)? {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::String(s)) => Ok(Some(s)),
        Some(JsonValue::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(D::Error::custom(format!("invalid id: {}", other))),
    }
}

pub(crate) fn deserialize<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_opt(deserializer)?.ok_or_else(|| D::Error::custom("missing id"))
}
