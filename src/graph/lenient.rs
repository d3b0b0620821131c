use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Any non-string value becomes `None`.
pub(crate) fn string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
	Ok(match Value::deserialize(deserializer)? {
		Value::String(s) => Some(s),
		_ => None,
	})
}

/// Any non-numeric value becomes `None`.
pub(crate) fn number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
	Ok(match Value::deserialize(deserializer)? {
		Value::Number(n) => n.as_f64(),
		_ => None,
	})
}

/// Null or non-array values become an empty list; entries that fail to decode are dropped.
pub(crate) fn list<'de, D: Deserializer<'de>, T: DeserializeOwned>(
	deserializer: D,
) -> Result<Vec<T>, D::Error> {
	let Value::Array(items) = Value::deserialize(deserializer)? else {
		return Ok(Vec::new());
	};
	Ok(items
		.into_iter()
		.filter_map(|item| {
			serde_json::from_value(item)
				.inspect_err(|e| log::debug!("Skipping malformed entry: {}", e))
				.ok()
		})
		.collect())
}
