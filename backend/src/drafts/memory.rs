use std::collections::HashMap;

use async_trait::async_trait;
use shared::{draft_key, Draft};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{DraftError, DraftStore};

/// Process-local drafts, lost on restart
#[derive(Debug, Default)]
pub struct MemoryDraftStore {
    drafts: RwLock<HashMap<String, Draft>>,
}

impl MemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.drafts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.drafts.read().await.is_empty()
    }
}

#[async_trait]
impl DraftStore for MemoryDraftStore {
    async fn get(&self, order_id: Uuid) -> Result<Option<Draft>, DraftError> {
        Ok(self.drafts.read().await.get(&draft_key(order_id)).cloned())
    }

    async fn put(&self, order_id: Uuid, draft: &Draft) -> Result<(), DraftError> {
        self.drafts
            .write()
            .await
            .insert(draft_key(order_id), draft.clone());
        Ok(())
    }

    async fn clear(&self, order_id: Uuid) -> Result<(), DraftError> {
        self.drafts.write().await.remove(&draft_key(order_id));
        Ok(())
    }
}
