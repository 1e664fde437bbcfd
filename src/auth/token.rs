use rand::Rng;

use super::secret::hash_secret;
use crate::error::{Error, Result};

const TOKEN_PREFIX: &str = "campus";
const LOOKUP_LENGTH: usize = 8;
const SECRET_LENGTH: usize = 24;
const SECRET_BYTES: usize = 12;

/// Generates a new bearer token with the format: campus_<lookup>_<secret>
/// Returns (raw_token, lookup, hash). Only the hash and lookup are persisted;
/// the raw token is shown to the caller once.
pub fn generate_token() -> Result<(String, String, String)> {
    let lookup = generate_lookup();
    let secret = generate_secret();
    let raw_token = format!("{TOKEN_PREFIX}_{lookup}_{secret}");
    let hash = hash_secret(&raw_token)?;
    Ok((raw_token, lookup, hash))
}

/// First 8 chars of a UUID, used as the indexed lookup column.
fn generate_lookup() -> String {
    let uuid = uuid::Uuid::new_v4();
    uuid.to_string()[..LOOKUP_LENGTH].to_string()
}

fn generate_secret() -> String {
    let mut bytes = [0u8; SECRET_BYTES];
    rand::thread_rng().fill(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Parses a raw token into (lookup, secret), validating shape only.
pub fn parse_token(token: &str) -> Result<(String, String)> {
    let parts: Vec<&str> = token.split('_').collect();
    if parts.len() != 3 || parts[0] != TOKEN_PREFIX {
        return Err(Error::InvalidTokenFormat);
    }

    let (lookup, secret) = (parts[1], parts[2]);
    if lookup.len() != LOOKUP_LENGTH || secret.len() != SECRET_LENGTH {
        return Err(Error::InvalidTokenFormat);
    }

    Ok((lookup.to_string(), secret.to_string()))
}
