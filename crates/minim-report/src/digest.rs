use minim_core::{ErrorInfo, MinimError, TrialConfiguration};
use minim_engine::SubjectRegistry;
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Serialises `value` to JSON with object keys sorted recursively.
pub fn to_canonical_json_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, MinimError> {
    let value = serde_json::to_value(value).map_err(|err| {
        MinimError::Serde(ErrorInfo::new("canonical-json-encode", err.to_string()))
    })?;
    let canonical = canonicalize(value);
    serde_json::to_vec(&canonical).map_err(|err| {
        MinimError::Serde(ErrorInfo::new("canonical-json-write", err.to_string()))
    })
}

fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, canonicalize(value)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

/// Computes a stable hexadecimal hash for the provided serializable payload.
pub fn stable_hash_string<T: Serialize>(value: &T) -> Result<String, MinimError> {
    let bytes = to_canonical_json_bytes(value)?;
    let digest = Sha256::digest(bytes);
    Ok(format!("{:x}", digest))
}

/// Digest of a trial configuration's definition.
pub fn config_digest(config: &TrialConfiguration) -> Result<String, MinimError> {
    stable_hash_string(&config.definition())
}

/// Digest of the registry contents in randomisation order.
pub fn registry_digest(registry: &SubjectRegistry) -> Result<String, MinimError> {
    stable_hash_string(&registry.records())
}
