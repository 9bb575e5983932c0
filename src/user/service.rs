use std::sync::Arc;

use sqlx::{Pool, Postgres};

use crate::crypto::{self, Crypto};
use crate::error::{Result, ServerError};
use crate::user::{User, UserRepository};

/// Bytes of entropy behind a user id.
const ID_LENGTH: usize = 8;

/// Account manager: registration and authentication.
#[derive(Clone)]
pub struct AuthService {
    repo: UserRepository,
    crypto: Arc<Crypto>,
}

impl AuthService {
    /// Create a new [`AuthService`].
    pub fn new(pool: Pool<Postgres>, crypto: Arc<Crypto>) -> Self {
        Self {
            repo: UserRepository::new(pool),
            crypto,
        }
    }

    /// Register a new account.
    ///
    /// The email is digested for lookup and encrypted for storage; the
    /// password becomes an Argon2id PHC string. A second registration with
    /// the same address fails with [`ServerError::DuplicateUser`].
    pub async fn register(&self, email: &str, password: &str) -> Result<User> {
        let user = User {
            id: crypto::random_id(ID_LENGTH),
            email_hash: self.crypto.hasher.digest(email),
            email_cipher: self.crypto.symmetric.encrypt_and_hex(email)?,
            password: self.crypto.pwd.hash_password(password)?,
            ..Default::default()
        };

        self.repo.insert(&user).await?;
        Ok(user)
    }

    /// Check credentials and return the matching account.
    ///
    /// An unknown address yields [`ServerError::NotFound`], a wrong password
    /// [`ServerError::InvalidCredentials`]; the login route collapses both
    /// into 401.
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<User> {
        let digest = self.crypto.hasher.digest(email);
        let user = self
            .repo
            .find_by_email_hash(&digest)
            .await?
            .ok_or(ServerError::NotFound)?;

        self.crypto
            .pwd
            .verify_password(password, &user.password)
            .map_err(|_| ServerError::InvalidCredentials)?;

        Ok(user)
    }
}
