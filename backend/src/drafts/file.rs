//! Drafts as JSON files, one per purchase order

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use shared::{draft_key, Draft};
use tokio::fs;
use uuid::Uuid;

use super::{DraftError, DraftStore};

#[derive(Debug, Clone)]
pub struct FileDraftStore {
    directory: PathBuf,
}

impl FileDraftStore {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn path_for(&self, order_id: Uuid) -> PathBuf {
        self.directory.join(format!("{}.json", draft_key(order_id)))
    }
}

#[async_trait]
impl DraftStore for FileDraftStore {
    async fn get(&self, order_id: Uuid) -> Result<Option<Draft>, DraftError> {
        let bytes = match fs::read(self.path_for(order_id)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    async fn put(&self, order_id: Uuid, draft: &Draft) -> Result<(), DraftError> {
        fs::create_dir_all(&self.directory).await?;

        let target = self.path_for(order_id);
        // Readers only ever see a complete file
        let staging = self
            .directory
            .join(format!("{}.{}.tmp", draft_key(order_id), Uuid::new_v4()));
        let bytes = serde_json::to_vec(draft)?;

        fs::write(&staging, &bytes).await?;
        if let Err(e) = fs::rename(&staging, &target).await {
            let _ = fs::remove_file(&staging).await;
            return Err(e.into());
        }
        Ok(())
    }

    async fn clear(&self, order_id: Uuid) -> Result<(), DraftError> {
        match fs::remove_file(self.path_for(order_id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
