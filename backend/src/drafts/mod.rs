//! Draft persistence port
//!
//! One draft per purchase order, stored under [`shared::draft_key`].
//! Writes are last-write-wins; there is no merge between sessions.

use async_trait::async_trait;
use shared::Draft;
use thiserror::Error;
use uuid::Uuid;

mod file;
mod memory;

pub use file::FileDraftStore;
pub use memory::MemoryDraftStore;

#[derive(Error, Debug)]
pub enum DraftError {
    #[error("Draft storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Draft is not valid JSON: {0}")]
    Encoding(#[from] serde_json::Error),
}

#[async_trait]
pub trait DraftStore: Send + Sync {
    async fn get(&self, order_id: Uuid) -> Result<Option<Draft>, DraftError>;

    async fn put(&self, order_id: Uuid, draft: &Draft) -> Result<(), DraftError>;

    /// Removing a draft that does not exist is not an error
    async fn clear(&self, order_id: Uuid) -> Result<(), DraftError>;
}
