use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id the token was issued for.
    pub sub: Uuid,
    pub email: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: Uuid, email: String, expiry_hours: u64) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            sub: user_id,
            email,
            exp,
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug)]
pub enum TokenError {
    Generation(String),
    Invalid(String),
    MissingSecret,
}

impl std::fmt::Display for TokenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenError::Generation(msg) => write!(f, "token generation error: {}", msg),
            TokenError::Invalid(msg) => write!(f, "invalid token: {}", msg),
            TokenError::MissingSecret => write!(f, "signing secret not configured"),
        }
    }
}

impl std::error::Error for TokenError {}

pub fn generate_token(claims: &Claims, secret: &str) -> Result<String, TokenError> {
    if secret.is_empty() {
        return Err(TokenError::MissingSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key)
        .map_err(|e| TokenError::Generation(e.to_string()))
}

/// Verify signature and expiry, returning the claims on success.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, TokenError> {
    if secret.is_empty() {
        return Err(TokenError::MissingSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let token_data = decode::<Claims>(token, &decoding_key, &Validation::default())
        .map_err(|e| TokenError::Invalid(e.to_string()))?;

    Ok(token_data.claims)
}

/// Salted one-way hash for credential storage. Plaintext never reaches the store.
pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
}

/// Constant-time verification against a stored hash.
pub fn verify_password(password: &str, hashed: &str) -> Result<bool, bcrypt::BcryptError> {
    bcrypt::verify(password, hashed)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit-test-secret";

    #[test]
    fn token_round_trip() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, "a@x.com".to_string(), 24);
        let token = generate_token(&claims, SECRET).unwrap();

        let decoded = verify_token(&token, SECRET).unwrap();
        assert_eq!(decoded.sub, user_id);
        assert_eq!(decoded.email, "a@x.com");
    }

    #[test]
    fn tampered_signature_is_rejected() {
        let claims = Claims::new(Uuid::new_v4(), "a@x.com".to_string(), 24);
        let token = generate_token(&claims, SECRET).unwrap();

        assert!(verify_token(&token, "some-other-secret").is_err());

        // Flipping a payload character breaks the signature too
        let mut chars: Vec<char> = token.chars().collect();
        let mid = chars.len() / 2;
        chars[mid] = if chars[mid] == 'a' { 'b' } else { 'a' };
        let tampered: String = chars.into_iter().collect();
        assert!(verify_token(&tampered, SECRET).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let mut claims = Claims::new(Uuid::new_v4(), "a@x.com".to_string(), 24);
        claims.exp = (Utc::now() - Duration::hours(2)).timestamp();
        let token = generate_token(&claims, SECRET).unwrap();

        assert!(verify_token(&token, SECRET).is_err());
    }

    #[test]
    fn password_hash_and_verify() {
        let hashed = hash_password("SecurePassword123").unwrap();
        assert_ne!(hashed, "SecurePassword123");
        assert!(verify_password("SecurePassword123", &hashed).unwrap());
        assert!(!verify_password("WrongPassword", &hashed).unwrap());
    }

    #[test]
    fn empty_secret_is_refused() {
        let claims = Claims::new(Uuid::new_v4(), "a@x.com".to_string(), 24);
        assert!(matches!(
            generate_token(&claims, ""),
            Err(TokenError::MissingSecret)
        ));
        assert!(matches!(
            verify_token("whatever", ""),
            Err(TokenError::MissingSecret)
        ));
    }
}
