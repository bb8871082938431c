//! Decoding of indexer payloads.
//!
//! With the `tracing` feature, fields the record types do not capture are logged as warnings so
//! schema drift in the indexer shows up early, and decoding failures are logged with the JSON
//! path that failed.

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Decodes `value` into `T`, logging unknown fields when `tracing` is enabled.
#[cfg(feature = "tracing")]
pub(crate) fn deserialize_with_warnings<T: DeserializeOwned>(value: Value) -> crate::Result<T> {
    use std::any::type_name;

    let original = value.clone();
    let mut unknown_paths: Vec<String> = Vec::new();

    let result: T = serde_ignored::deserialize(value, |path| {
        unknown_paths.push(path.to_string());
    })
    .inspect_err(|_e| {
        if let Err(path_err) = serde_path_to_error::deserialize::<_, T>(&original) {
            tracing::error!(
                type_name = %type_name::<T>(),
                path = %path_err.path(),
                error = %path_err.inner(),
                "failed to decode indexer record"
            );
        }
    })?;

    for path in unknown_paths {
        let value = lookup_value(&original, &path)
            .map_or_else(|| "<missing>".to_owned(), Value::to_string);

        tracing::warn!(
            type_name = %type_name::<T>(),
            field = %path,
            %value,
            "unknown field in indexer response"
        );
    }

    Ok(result)
}

#[cfg(not(feature = "tracing"))]
pub(crate) fn deserialize_with_warnings<T: DeserializeOwned>(value: Value) -> crate::Result<T> {
    Ok(serde_json::from_value(value)?)
}

/// Follows a `serde_ignored` path such as `data.positions.0.extra` or `data.condition.?.extra`.
#[cfg(feature = "tracing")]
fn lookup_value<'value>(value: &'value Value, path: &str) -> Option<&'value Value> {
    path.split('.')
        .filter(|segment| !segment.is_empty() && *segment != "?")
        .try_fold(value, |current, segment| match current {
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?),
            Value::Object(fields) => fields.get(segment),
            _ => None,
        })
}
