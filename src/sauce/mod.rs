mod repository;
mod service;

pub use repository::*;
pub use service::*;

use serde::{Deserialize, Serialize};

/// Sauce as saved on database.
///
/// Counters mirror the vote arrays: `likes == |users_liked|` and
/// `dislikes == |users_disliked|` after every operation.
#[derive(
    Clone, Debug, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow,
)]
#[serde(rename_all = "camelCase")]
pub struct Sauce {
    pub id: String,
    /// Account that submitted the sauce; the only one allowed to edit it.
    pub user_id: String,
    pub name: String,
    pub manufacturer: String,
    pub description: String,
    pub main_pepper: String,
    pub heat: i16,
    pub image_url: String,
    pub likes: i32,
    pub dislikes: i32,
    pub users_liked: Vec<String>,
    pub users_disliked: Vec<String>,
    pub created_at: chrono::NaiveDate,
}

/// Editable (non-image, non-vote) fields of a [`Sauce`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SauceFields {
    pub name: String,
    pub manufacturer: String,
    pub description: String,
    pub main_pepper: String,
    pub heat: i16,
}

/// Three-state vote a user may hold on a sauce, as sent on the wire:
/// `1` likes, `-1` dislikes, `0` clears the standing vote.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "i8", into = "i8")]
pub enum Vote {
    Like,
    Clear,
    Dislike,
}

impl TryFrom<i8> for Vote {
    type Error = String;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Vote::Like),
            0 => Ok(Vote::Clear),
            -1 => Ok(Vote::Dislike),
            other => Err(format!("vote must be 1, 0 or -1, got {other}")),
        }
    }
}

impl From<Vote> for i8 {
    fn from(vote: Vote) -> i8 {
        match vote {
            Vote::Like => 1,
            Vote::Clear => 0,
            Vote::Dislike => -1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vote_from_wire() {
        assert_eq!(serde_json::from_str::<Vote>("1").unwrap(), Vote::Like);
        assert_eq!(serde_json::from_str::<Vote>("0").unwrap(), Vote::Clear);
        assert_eq!(serde_json::from_str::<Vote>("-1").unwrap(), Vote::Dislike);
        assert!(serde_json::from_str::<Vote>("2").is_err());
    }

    #[test]
    fn test_sauce_wire_names() {
        let sauce = Sauce {
            id: "s1".into(),
            user_id: "u1".into(),
            main_pepper: "Habanero".into(),
            image_url: "/images/s1.png".into(),
            ..Default::default()
        };

        let json = serde_json::to_value(&sauce).unwrap();
        assert_eq!(json["userId"], "u1");
        assert_eq!(json["mainPepper"], "Habanero");
        assert_eq!(json["imageUrl"], "/images/s1.png");
        assert!(json["usersLiked"].as_array().unwrap().is_empty());
    }
}
