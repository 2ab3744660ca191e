//! Pure key and value transforms.
//!
//! These functions turn hierarchical configuration keys into environment
//! variable names and recognise secret indirections stored as values.

use crate::constants::{
    ENV_NAME_SEPARATOR, KEY_DELIMITER, SECRETS_PATH_SEGMENT, SECRET_REFERENCE_MARKER,
};
use crate::errors::{Error, MalformedReason, Result};
use crate::types::SecretReference;
use url::Url;

/// Map a hierarchical key to an environment variable name.
///
/// Every `/` becomes `_` (consecutive delimiters are not collapsed) and the
/// result is uppercased. Total: never fails, `""` maps to `""`.
#[must_use]
pub fn derive_env_name(key: &str) -> String {
    key.replace(KEY_DELIMITER, &ENV_NAME_SEPARATOR.to_string())
        .to_uppercase()
}

/// True when the content type hint marks a secret indirection.
///
/// Case-sensitive substring match.
#[must_use]
pub fn is_secret_reference(content_type: Option<&str>) -> bool {
    content_type.is_some_and(|hint| hint.contains(SECRET_REFERENCE_MARKER))
}

/// Parse a stored `{"uri": "..."}` document into a [`SecretReference`]
pub fn parse_secret_reference(raw_value: &str) -> Result<SecretReference> {
    let document: serde_json::Value = serde_json::from_str(raw_value)
        .map_err(|_| Error::malformed_reference(raw_value, MalformedReason::InvalidJson))?;

    let uri = document
        .get("uri")
        .and_then(serde_json::Value::as_str)
        .filter(|uri| !uri.is_empty())
        .ok_or_else(|| Error::malformed_reference(raw_value, MalformedReason::MissingUri))?;

    decompose_secret_uri(uri)
}

/// Split a secret URI into vault location, name and optional version.
///
/// Accepts `/secrets/<name>` and `/secrets/<name>/<version>` paths only.
pub fn decompose_secret_uri(uri: &str) -> Result<SecretReference> {
    let invalid = || Error::malformed_reference(uri, MalformedReason::InvalidUri);

    let parsed = Url::parse(uri).map_err(|_| invalid())?;
    let host = parsed.host_str().filter(|h| !h.is_empty()).ok_or_else(invalid)?;

    let vault_location = match parsed.port() {
        Some(port) => format!("{}://{host}:{port}", parsed.scheme()),
        None => format!("{}://{host}", parsed.scheme()),
    };

    let mut segments: Vec<&str> = parsed.path_segments().ok_or_else(invalid)?.collect();
    // `/secrets/name/` parses with a trailing empty segment
    if segments.len() == 3 && segments[2].is_empty() {
        segments.pop();
    }

    match segments.as_slice() {
        [prefix, name] if *prefix == SECRETS_PATH_SEGMENT && !name.is_empty() => {
            Ok(SecretReference::new(vault_location, *name, None))
        }
        [prefix, name, version]
            if *prefix == SECRETS_PATH_SEGMENT && !name.is_empty() && !version.is_empty() =>
        {
            Ok(SecretReference::new(
                vault_location,
                *name,
                Some((*version).to_string()),
            ))
        }
        _ => Err(invalid()),
    }
}
