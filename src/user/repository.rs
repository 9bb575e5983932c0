//! Handle database requests for accounts.

use sqlx::{Pool, Postgres};

use crate::error::{Result, ServerError};
use crate::user::User;

#[derive(Clone)]
pub struct UserRepository {
    pool: Pool<Postgres>,
}

impl UserRepository {
    /// Create a new [`UserRepository`].
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Insert [`User`] into database.
    ///
    /// The unique constraint on `email_hash` settles concurrent
    /// registrations of the same address.
    pub async fn insert(&self, user: &User) -> Result<()> {
        sqlx::query(
            r#"INSERT INTO users (id, email_hash, email_cipher, password)
                VALUES ($1, $2, $3, $4)"#,
        )
        .bind(&user.id)
        .bind(&user.email_hash)
        .bind(&user.email_cipher)
        .bind(&user.password)
        .execute(&self.pool)
        .await
        .map_err(|err| ServerError::from(err).on_duplicate())?;

        Ok(())
    }

    /// Find a user through the email digest.
    pub async fn find_by_email_hash(
        &self,
        email_hash: &str,
    ) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"SELECT id, email_hash, email_cipher, password, created_at
                FROM users WHERE email_hash = $1"#,
        )
        .bind(email_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}
