use sqlx::{Pool, Postgres};

use crate::crypto;
use crate::error::{Result, ServerError};
use crate::image::ImageStore;
use crate::sauce::{Sauce, SauceFields, SauceRepository, Vote, VoteSide};

/// Bytes of entropy behind a sauce id.
const ID_LENGTH: usize = 8;

/// An uploaded picture: raw bytes plus the declared content type.
pub type Upload = (axum::body::Bytes, Option<String>);

/// Sauce manager: CRUD, vote toggling and picture lifecycle.
#[derive(Clone)]
pub struct SauceService {
    repo: SauceRepository,
    images: ImageStore,
}

impl SauceService {
    /// Create a new [`SauceService`].
    pub fn new(pool: Pool<Postgres>, images: ImageStore) -> Self {
        Self {
            repo: SauceRepository::new(pool),
            images,
        }
    }

    /// Every sauce.
    pub async fn list(&self) -> Result<Vec<Sauce>> {
        self.repo.all().await
    }

    /// One sauce by id.
    pub async fn get(&self, id: &str) -> Result<Sauce> {
        self.repo.find_by_id(id).await?.ok_or(ServerError::NotFound)
    }

    /// Submit a new sauce. The picture is mandatory and only written once
    /// the fields passed validation; if the record insert still fails, the
    /// fresh blob is dropped again rather than orphaned.
    pub async fn create(
        &self,
        owner: &str,
        fields: SauceFields,
        image: Option<Upload>,
    ) -> Result<Sauce> {
        let Some((bytes, content_type)) = image.filter(|(b, _)| !b.is_empty())
        else {
            return Err(ServerError::MissingImage);
        };

        let locator = self.images.store(&bytes, content_type.as_deref()).await?;

        let sauce = Sauce {
            id: crypto::random_id(ID_LENGTH),
            user_id: owner.to_owned(),
            name: fields.name,
            manufacturer: fields.manufacturer,
            description: fields.description,
            main_pepper: fields.main_pepper,
            heat: fields.heat,
            image_url: locator.clone(),
            likes: 0,
            dislikes: 0,
            users_liked: Vec::new(),
            users_disliked: Vec::new(),
            ..Default::default()
        };

        if let Err(err) = self.repo.insert(&sauce).await {
            if let Err(release) = self.images.release(&locator).await {
                tracing::warn!(
                    error = %release,
                    %locator,
                    "picture of failed submission not released"
                );
            }
            return Err(err);
        }

        Ok(sauce)
    }

    /// Edit a sauce. Only the owner may do so; a new picture replaces the
    /// stored blob and the previous one is released afterwards.
    pub async fn update(
        &self,
        id: &str,
        caller: &str,
        fields: SauceFields,
        image: Option<Upload>,
    ) -> Result<()> {
        let current = self.owned_by(id, caller).await?;

        self.repo.update_fields(id, &fields).await?;

        if let Some((bytes, content_type)) = image.filter(|(b, _)| !b.is_empty())
        {
            let locator =
                self.images.store(&bytes, content_type.as_deref()).await?;
            self.repo.set_image(id, &locator).await?;

            if let Err(err) = self.images.release(&current.image_url).await {
                tracing::warn!(
                    error = %err,
                    sauce_id = id,
                    "previous picture not released"
                );
            }
        }

        Ok(())
    }

    /// Remove a sauce and its picture. A failed picture release is logged
    /// and the record removal proceeds anyway.
    pub async fn delete(&self, id: &str, caller: &str) -> Result<()> {
        let current = self.owned_by(id, caller).await?;

        if let Err(err) = self.images.release(&current.image_url).await {
            tracing::warn!(
                error = %err,
                sauce_id = id,
                "picture not released, removing record anyway"
            );
        }

        self.repo.delete(id).await
    }

    /// Apply a three-state vote toggle for `caller`.
    ///
    /// Casting on either side requires no standing vote; clearing an absent
    /// vote succeeds as a no-op.
    pub async fn vote(
        &self,
        id: &str,
        caller: &str,
        direction: Vote,
    ) -> Result<()> {
        match direction {
            Vote::Like => self.cast(id, caller, VoteSide::Like).await,
            Vote::Dislike => self.cast(id, caller, VoteSide::Dislike).await,
            Vote::Clear => self.clear(id, caller).await,
        }
    }

    async fn cast(&self, id: &str, caller: &str, side: VoteSide) -> Result<()> {
        if self.repo.add_vote(id, caller, side).await? > 0 {
            return Ok(());
        }

        // Guard miss: either the sauce is gone or a vote already stands.
        match self.repo.find_by_id(id).await? {
            Some(_) => Err(ServerError::Conflict),
            None => Err(ServerError::NotFound),
        }
    }

    async fn clear(&self, id: &str, caller: &str) -> Result<()> {
        if self.repo.remove_vote(id, caller, VoteSide::Like).await? > 0
            || self.repo.remove_vote(id, caller, VoteSide::Dislike).await? > 0
        {
            return Ok(());
        }

        // Nothing to clear. Still report a missing sauce.
        match self.repo.find_by_id(id).await? {
            Some(_) => Ok(()),
            None => Err(ServerError::NotFound),
        }
    }

    /// Fetch a sauce and check the caller owns it.
    async fn owned_by(&self, id: &str, caller: &str) -> Result<Sauce> {
        let sauce =
            self.repo.find_by_id(id).await?.ok_or(ServerError::NotFound)?;

        if sauce.user_id != caller {
            return Err(ServerError::Forbidden);
        }

        Ok(sauce)
    }
}
