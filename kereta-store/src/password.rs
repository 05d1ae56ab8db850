use bcrypt::{hash, verify, DEFAULT_COST};

use kereta_core::{CoreError, CoreResult};

/// Salted bcrypt hash of a plaintext password. Runs on the blocking pool
/// so the hash cost does not stall the runtime.
pub async fn hash_password(password: &str) -> CoreResult<String> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || {
        hash(password, DEFAULT_COST).map_err(|e| CoreError::Persistence(e.to_string()))
    })
    .await
    .map_err(|e| CoreError::Persistence(e.to_string()))?
}

/// Constant-cost verification against a stored hash. A malformed stored
/// hash verifies as a mismatch, not an internal error, so one bad row
/// cannot lock out the endpoint.
pub async fn verify_password(password: &str, stored_hash: &str) -> CoreResult<bool> {
    let password = password.to_string();
    let stored_hash = stored_hash.to_string();
    tokio::task::spawn_blocking(move || Ok(verify(password, &stored_hash).unwrap_or(false)))
        .await
        .map_err(|e| CoreError::Persistence(e.to_string()))?
}
