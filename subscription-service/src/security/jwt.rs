/// JWT validation for the subscription service.
///
/// Tokens are issued by the identity service; this service only verifies
/// them. RS256 only - no symmetric algorithms, to prevent algorithm
/// confusion attacks. The verification key is loaded once at startup and
/// immutable thereafter.
use anyhow::{anyhow, Result};
use jsonwebtoken::{decode, Algorithm, DecodingKey, TokenData, Validation};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

/// JWT algorithm - MUST match the identity service
const JWT_ALGORITHM: Algorithm = Algorithm::RS256;

/// Claims carried by access tokens
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID as UUID string)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Token type: "access" or "refresh"
    pub token_type: String,
}

static JWT_DECODING_KEY: OnceCell<DecodingKey> = OnceCell::new();

/// Initialize the verification key from a PEM-formatted RSA public key.
///
/// MUST be called during startup before any token validation. Can only be
/// called once.
pub fn initialize_verification_key(public_key_pem: &str) -> Result<()> {
    let decoding_key = DecodingKey::from_rsa_pem(public_key_pem.as_bytes())
        .map_err(|e| anyhow!("Invalid RSA public key: {}", e))?;

    JWT_DECODING_KEY
        .set(decoding_key)
        .map_err(|_| anyhow!("JWT verification key already initialized"))
}

/// Validate an access token and return its claims.
pub fn validate_token(token: &str) -> Result<TokenData<Claims>> {
    let decoding_key = JWT_DECODING_KEY
        .get()
        .ok_or_else(|| anyhow!("JWT verification key not initialized"))?;

    let validation = Validation::new(JWT_ALGORITHM);

    let token_data = decode::<Claims>(token, decoding_key, &validation)
        .map_err(|e| anyhow!("Token validation failed: {}", e))?;

    if token_data.claims.token_type != "access" {
        return Err(anyhow!("Not an access token"));
    }

    Ok(token_data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_requires_initialized_key() {
        // No test in this binary initializes the key, so validation must
        // refuse rather than fall back to anything weaker.
        let err = validate_token("not.a.token").unwrap_err();
        assert!(err.to_string().contains("not initialized"));
    }
}
