mod repository;
mod service;

pub use repository::*;
pub use service::*;

use serde::{Deserialize, Serialize};

/// User as saved on database.
///
/// The raw email never touches the store: `email_hash` is the peppered
/// digest used as uniqueness key, `email_cipher` the reversible mask.
#[derive(
    Clone, Debug, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow,
)]
pub struct User {
    pub id: String,
    #[serde(skip)]
    pub email_hash: String,
    #[serde(skip)]
    pub email_cipher: String,
    #[serde(skip)]
    pub password: String,
    pub created_at: chrono::NaiveDate,
}
