//! Local blob store for sauce pictures.
//!
//! References are random hex filenames, handed out on store and resolvable
//! under the static `/images` route. Release tolerates an already-missing
//! blob so a half-cleaned record can still be deleted.

use std::path::{Path, PathBuf};

use rand::RngCore;
use rand::rngs::OsRng;
use tokio::fs;

use crate::error::{Result, ServerError};

const REFERENCE_LENGTH: usize = 16;

/// Public route under which stored pictures are served.
pub const PUBLIC_ROUTE: &str = "/images";

/// Filesystem-backed picture store.
#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    /// Create a new [`ImageStore`], making sure the directory exists.
    pub fn new(root: impl Into<PathBuf>) -> std::io::Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Directory served under [`PUBLIC_ROUTE`].
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write picture bytes and return the public locator (`/images/<file>`).
    pub async fn store(
        &self,
        bytes: &[u8],
        content_type: Option<&str>,
    ) -> Result<String> {
        let extension = extension_for(content_type)?;

        let mut raw = [0u8; REFERENCE_LENGTH];
        OsRng.fill_bytes(&mut raw);
        let file_name = format!("{}.{extension}", hex::encode(raw));

        fs::write(self.root.join(&file_name), bytes).await.map_err(
            |err| ServerError::Internal {
                details: "cannot write picture file".into(),
                source: Some(Box::new(err)),
            },
        )?;

        Ok(format!("{PUBLIC_ROUTE}/{file_name}"))
    }

    /// Unlink the blob behind a locator. A missing file is not an error.
    pub async fn release(&self, locator: &str) -> Result<()> {
        let Some(file_name) = file_name_of(locator) else {
            return Ok(());
        };

        match fs::remove_file(self.root.join(file_name)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(ServerError::Internal {
                details: format!("cannot unlink picture `{file_name}`"),
                source: Some(Box::new(err)),
            }),
        }
    }
}

/// Extract the stored file name from a `/images/<file>` locator.
///
/// Locators come back from the database, so anything not matching the shape
/// we hand out (including path traversal) resolves to nothing.
fn file_name_of(locator: &str) -> Option<&str> {
    let file_name = locator.strip_prefix(PUBLIC_ROUTE)?.strip_prefix('/')?;

    if file_name.is_empty() || file_name.contains(['/', '\\']) || file_name.contains("..") {
        return None;
    }

    Some(file_name)
}

fn extension_for(content_type: Option<&str>) -> Result<&'static str> {
    match content_type {
        Some("image/png") => Ok("png"),
        Some("image/jpeg") => Ok("jpg"),
        Some("image/webp") => Ok("webp"),
        _ => {
            let mut errors = validator::ValidationErrors::new();
            errors.add(
                "image",
                validator::ValidationError::new("content_type")
                    .with_message("Picture must be PNG, JPEG or WEBP.".into()),
            );
            Err(errors.into())
        },
    }
}
