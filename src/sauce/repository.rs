//! Handle database requests for sauces.
//!
//! Vote transitions are single guarded UPDATE statements so the counter and
//! the matching array move together, whatever other voters do concurrently.

use sqlx::{Pool, Postgres};

use crate::error::Result;
use crate::sauce::{Sauce, SauceFields};

const SAUCE_COLUMNS: &str = r#"id, user_id, name, manufacturer, description,
    main_pepper, heat, image_url, likes, dislikes, users_liked,
    users_disliked, created_at"#;

/// Which of the two vote sides a statement works on.
#[derive(Clone, Copy, Debug)]
pub enum VoteSide {
    Like,
    Dislike,
}

#[derive(Clone)]
pub struct SauceRepository {
    pool: Pool<Postgres>,
}

impl SauceRepository {
    /// Create a new [`SauceRepository`].
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Every sauce, store default order.
    pub async fn all(&self) -> Result<Vec<Sauce>> {
        let sauces = sqlx::query_as::<_, Sauce>(&format!(
            r#"SELECT {SAUCE_COLUMNS} FROM sauces"#
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(sauces)
    }

    /// Find one sauce using `id` field.
    pub async fn find_by_id(&self, id: &str) -> Result<Option<Sauce>> {
        let sauce = sqlx::query_as::<_, Sauce>(&format!(
            r#"SELECT {SAUCE_COLUMNS} FROM sauces WHERE id = $1"#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sauce)
    }

    /// Insert [`Sauce`] into database.
    ///
    /// Counters and vote arrays are part of the insert; nothing is patched
    /// up after the save.
    pub async fn insert(&self, sauce: &Sauce) -> Result<()> {
        sqlx::query(
            r#"INSERT INTO sauces
                (id, user_id, name, manufacturer, description, main_pepper,
                 heat, image_url, likes, dislikes, users_liked, users_disliked)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)"#,
        )
        .bind(&sauce.id)
        .bind(&sauce.user_id)
        .bind(&sauce.name)
        .bind(&sauce.manufacturer)
        .bind(&sauce.description)
        .bind(&sauce.main_pepper)
        .bind(sauce.heat)
        .bind(&sauce.image_url)
        .bind(sauce.likes)
        .bind(sauce.dislikes)
        .bind(&sauce.users_liked)
        .bind(&sauce.users_disliked)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Replace the editable fields of a sauce.
    pub async fn update_fields(
        &self,
        id: &str,
        fields: &SauceFields,
    ) -> Result<u64> {
        let result = sqlx::query(
            r#"UPDATE sauces
                SET name = $2, manufacturer = $3, description = $4,
                    main_pepper = $5, heat = $6
                WHERE id = $1"#,
        )
        .bind(id)
        .bind(&fields.name)
        .bind(&fields.manufacturer)
        .bind(&fields.description)
        .bind(&fields.main_pepper)
        .bind(fields.heat)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Point a sauce at a freshly stored picture.
    pub async fn set_image(&self, id: &str, locator: &str) -> Result<()> {
        sqlx::query(r#"UPDATE sauces SET image_url = $2 WHERE id = $1"#)
            .bind(id)
            .bind(locator)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Remove a sauce record.
    pub async fn delete(&self, id: &str) -> Result<()> {
        sqlx::query(r#"DELETE FROM sauces WHERE id = $1"#)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Record a like or dislike: append the voter and bump the counter by
    /// exactly one, guarded against the voter already standing on either
    /// side. Returns the affected row count; zero means the guard refused
    /// (standing vote) or the sauce does not exist.
    pub async fn add_vote(
        &self,
        id: &str,
        user_id: &str,
        side: VoteSide,
    ) -> Result<u64> {
        let query = match side {
            VoteSide::Like => {
                r#"UPDATE sauces
                    SET likes = likes + 1,
                        users_liked = ARRAY_APPEND(users_liked, $2)
                    WHERE id = $1
                      AND $2 <> ALL(users_liked)
                      AND $2 <> ALL(users_disliked)"#
            },
            VoteSide::Dislike => {
                r#"UPDATE sauces
                    SET dislikes = dislikes + 1,
                        users_disliked = ARRAY_APPEND(users_disliked, $2)
                    WHERE id = $1
                      AND $2 <> ALL(users_liked)
                      AND $2 <> ALL(users_disliked)"#
            },
        };

        let result = sqlx::query(query)
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Withdraw a standing vote on one side: remove the voter and decrement
    /// the counter by one, only if the voter is actually there. Returns the
    /// affected row count.
    pub async fn remove_vote(
        &self,
        id: &str,
        user_id: &str,
        side: VoteSide,
    ) -> Result<u64> {
        let query = match side {
            VoteSide::Like => {
                r#"UPDATE sauces
                    SET likes = likes - 1,
                        users_liked = ARRAY_REMOVE(users_liked, $2)
                    WHERE id = $1 AND $2 = ANY(users_liked)"#
            },
            VoteSide::Dislike => {
                r#"UPDATE sauces
                    SET dislikes = dislikes - 1,
                        users_disliked = ARRAY_REMOVE(users_disliked, $2)
                    WHERE id = $1 AND $2 = ANY(users_disliked)"#
            },
        };

        let result = sqlx::query(query)
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
