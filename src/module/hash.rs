//! Fingerprint of the slash command set.
//!
//! The hash is stored per guild after a successful deployment, so the next start
//! can skip guilds whose commands are already current.

use serde_json::Value;
use serenity::all::CreateCommand;
use sha2::{Digest, Sha256};

/// Calculates the SHA-256 hex digest of a set of command definitions.
///
/// Definitions are sorted by name before hashing, so the result depends only on
/// the definitions and not on the order they were registered in.
///
/// # Arguments
/// - `definitions` - Command definitions as sent to Discord
///
/// # Returns
/// - `Ok(String)` - Lowercase hex digest
/// - `Err(serde_json::Error)` - A definition could not be serialized
pub fn calc_command_hash(definitions: &[CreateCommand]) -> Result<String, serde_json::Error> {
    let mut values = definitions
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<Value>, _>>()?;

    values.sort_by(|a, b| command_name(a).cmp(command_name(b)));

    let serialized = serde_json::to_vec(&values)?;
    let digest = Sha256::digest(&serialized);

    Ok(format!("{:x}", digest))
}

fn command_name(definition: &Value) -> &str {
    definition
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or_default()
}
