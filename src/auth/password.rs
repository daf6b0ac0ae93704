use crate::error::AppResult;

/// Hash a plaintext password for storage.
pub fn hash_password(plaintext: &str) -> AppResult<String> {
    Ok(bcrypt::hash(plaintext, bcrypt::DEFAULT_COST)?)
}

/// Verify plaintext against a stored hash - constant-time via bcrypt.
/// Malformed hashes verify as false rather than erroring.
pub fn verify_password(plaintext: &str, hash: &str) -> bool {
    bcrypt::verify(plaintext, hash).unwrap_or(false)
}
