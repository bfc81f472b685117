//! Utilities to be used in serde derives for more robust (de)serializations.

use std::str::FromStr;

use serde::{Deserialize, Deserializer};

/// Many WebAuthn dictionary members carry the following wording.
///
/// > The values SHOULD be members of `T` but client platforms MUST ignore unknown values.
///
/// This method is a simple way of ignoring unknown values without failing deserialization.
pub(crate) fn ignore_unknown<'de, D, T>(de: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(T::deserialize(de).unwrap_or_default())
}

/// Like [`ignore_unknown`] but for a list, where only the unknown entries are dropped.
pub(crate) fn ignore_unknown_vec<'de, D, T>(de: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let values = Vec::<serde_json::Value>::deserialize(de)?;
    Ok(values
        .into_iter()
        .filter_map(|v| T::deserialize(v).ok())
        .collect())
}

/// Like [`ignore_unknown_vec`] for an optional list. An absent or `null` list stays `None`
/// while a list whose entries are all unknown becomes an empty list.
pub(crate) fn ignore_unknown_opt_vec<'de, D, T>(de: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let Some(values) = Option::<Vec<serde_json::Value>>::deserialize(de)? else {
        return Ok(None);
    };
    Ok(Some(
        values
            .into_iter()
            .filter_map(|v| T::deserialize(v).ok())
            .collect(),
    ))
}

/// Servers are not consistent in how they send numeric values such as `timeout`. This accepts
/// JSON numbers, including floats which are truncated, as well as numeric strings. Anything
/// else is treated as absent.
pub(crate) fn maybe_stringified<'de, D>(de: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(de)?;
    Ok(match value {
        Some(serde_json::Value::Number(num)) => num
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .or_else(|| num.as_f64().and_then(truncate_f64)),
        Some(serde_json::Value::String(s)) => u32::from_str(s.trim())
            .ok()
            .or_else(|| f64::from_str(s.trim()).ok().and_then(truncate_f64)),
        _ => None,
    })
}

fn truncate_f64(value: f64) -> Option<u32> {
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    format!("{:.0}", value.trunc()).parse().ok()
}
