use anyhow::{Context, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use fiasko_common::models::auth::Claims;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

/// Hash a password using argon2id
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?;
    Ok(hash.to_string())
}

/// Verify a password against a hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| anyhow::anyhow!("Invalid password hash: {}", e))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Mint a session token binding the user's identity to an expiry instant
pub fn create_session_token(
    user_id: Uuid,
    email: &str,
    username: &str,
    jwt_secret: &str,
    ttl_secs: i64,
) -> Result<String> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        username: username.to_string(),
        iat: now,
        exp: now + ttl_secs,
    };
    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    )
    .context("Failed to create session token")
}

/// Validate a session token and return its claims. Signature and expiry
/// only -- tokens are stateless, so there is no storage lookup.
pub fn validate_session_token(token: &str, jwt_secret: &str) -> Result<Claims> {
    let token_data = jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .context("Invalid session token")?;
    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_and_verify_correct() {
        let password = "my-secure-password";
        let hash = hash_password(password).unwrap();
        assert!(verify_password(password, &hash).unwrap());
    }

    #[test]
    fn test_password_verify_wrong() {
        let hash = hash_password("correct-password").unwrap();
        assert!(!verify_password("wrong-password", &hash).unwrap());
    }

    #[test]
    fn test_password_different_salts() {
        let password = "same-password";
        let hash1 = hash_password(password).unwrap();
        let hash2 = hash_password(password).unwrap();
        assert_ne!(hash1, hash2);
        // Both still verify
        assert!(verify_password(password, &hash1).unwrap());
        assert!(verify_password(password, &hash2).unwrap());
    }

    #[test]
    fn test_token_create_and_validate() {
        let secret = "test-jwt-secret";
        let user_id = Uuid::new_v4();
        let token =
            create_session_token(user_id, "test@example.com", "tester", secret, 900).unwrap();
        let claims = validate_session_token(&token, secret).unwrap();
        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.email, "test@example.com");
        assert_eq!(claims.username, "tester");
        assert_eq!(claims.exp - claims.iat, 900);
    }

    #[test]
    fn test_token_wrong_secret_fails() {
        let token = create_session_token(
            Uuid::new_v4(),
            "test@example.com",
            "tester",
            "secret-1",
            900,
        )
        .unwrap();
        let result = validate_session_token(&token, "secret-2");
        assert!(result.is_err());
    }

    #[test]
    fn test_token_expired_fails() {
        // Well past the validator's default leeway
        let token = create_session_token(
            Uuid::new_v4(),
            "test@example.com",
            "tester",
            "test-jwt-secret",
            -7200,
        )
        .unwrap();
        let result = validate_session_token(&token, "test-jwt-secret");
        assert!(result.is_err());
    }

    #[test]
    fn test_token_garbled_fails() {
        let result = validate_session_token("not-a-jwt", "test-jwt-secret");
        assert!(result.is_err());
    }
}
