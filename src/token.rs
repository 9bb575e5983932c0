//! Manage json web tokens.

use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Bearer tokens stay valid 24 hours.
pub const EXPIRATION_TIME: u64 = 60 * 60 * 24;

/// Pieces of information asserted on a JWT.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Claims {
    /// Identifies the expiration time on or after which the JWT must not be
    /// accepted for processing.
    pub exp: u64,
    /// Identifies the time at which the JWT was issued.
    pub iat: u64,
    /// Identifies the organization that issued the JWT.
    pub iss: String,
    /// User ID.
    pub sub: String,
}

/// Manage JWT tokens.
#[derive(Clone)]
pub struct TokenManager {
    algorithm: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    name: String,
}

impl TokenManager {
    /// Create a new [`TokenManager`] from a process-wide secret.
    pub fn new(name: &str, secret: &str) -> Self {
        Self {
            algorithm: Algorithm::HS256,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            name: name.to_owned(),
        }
    }

    /// Create a new token whose payload carries only the user id.
    pub fn create(&self, user_id: &str) -> Result<String> {
        let time = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();
        let header = Header::new(self.algorithm);
        let claims = Claims {
            exp: time + EXPIRATION_TIME,
            iat: time,
            iss: self.name.clone(),
            sub: user_id.to_owned(),
        };

        Ok(encode(&header, &claims, &self.encoding_key)?)
    }

    /// Decode and check a token.
    pub fn decode(&self, token: &str) -> Result<Claims> {
        let validation = Validation::new(self.algorithm);
        Ok(decode::<Claims>(token, &self.decoding_key, &validation)?.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "an-unremarkable-test-secret";

    #[test]
    fn test_create_and_decode() {
        let manager = TokenManager::new("saucery", SECRET);

        let token = manager.create("grilled-cheese").unwrap();
        let claims = manager.decode(&token).unwrap();

        assert_eq!(claims.sub, "grilled-cheese");
        assert_eq!(claims.iss, "saucery");
        assert_eq!(claims.exp - claims.iat, EXPIRATION_TIME);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let manager = TokenManager::new("saucery", SECRET);
        let other = TokenManager::new("saucery", "a-different-secret");

        let token = manager.create("grilled-cheese").unwrap();
        assert!(other.decode(&token).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let manager = TokenManager::new("saucery", SECRET);

        let time = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs();
        let claims = Claims {
            exp: time - EXPIRATION_TIME,
            iat: time - 2 * EXPIRATION_TIME,
            iss: "saucery".to_owned(),
            sub: "grilled-cheese".to_owned(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert!(manager.decode(&token).is_err());
    }

    #[test]
    fn test_garbage_rejected() {
        let manager = TokenManager::new("saucery", SECRET);
        assert!(manager.decode("not.a.token").is_err());
    }
}
