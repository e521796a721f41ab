//! Field deserializers for catalog records.
//!
//! The backend serializes absent optional fields as explicit `null`, and a
//! few summary columns arrive as numbers where the client shows text.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Treat `null` like a missing key. Pair with `#[serde(default)]`.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Display text for a column sent as either a string or a number.
pub fn text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(text) => text,
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    })
}
