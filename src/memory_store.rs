use crate::{
    domain::{CatalogFilter, CatalogStore},
    errors::RepoError,
    models::MemeRecord,
};
use anyhow::anyhow;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Process-local catalog used for development and tests.
#[derive(Debug, Default)]
pub struct InMemoryCatalogStore {
    memes: RwLock<HashMap<Uuid, MemeRecord>>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: impl IntoIterator<Item = MemeRecord>) -> Self {
        let memes = records.into_iter().map(|m| (m.id, m)).collect();
        Self {
            memes: RwLock::new(memes),
        }
    }

    async fn bump(&self, id: Uuid, counter: fn(&mut MemeRecord) -> &mut u64) -> Result<u64, RepoError> {
        let mut memes = self.memes.write().await;
        let meme = memes.get_mut(&id).ok_or(RepoError::NotFound(id))?;
        let value = counter(meme);
        *value = value.saturating_add(1);
        Ok(*value)
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn create(&self, meme: &MemeRecord) -> Result<(), RepoError> {
        let mut memes = self.memes.write().await;
        if memes.contains_key(&meme.id) {
            return Err(RepoError::BackendError(anyhow!("duplicate meme id {}", meme.id)));
        }
        memes.insert(meme.id, meme.clone());
        tracing::debug!(meme_id = %meme.id, "InMemory: stored meme");
        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<MemeRecord>, RepoError> {
        Ok(self.memes.read().await.get(&id).cloned())
    }

    async fn scan(&self, filter: &CatalogFilter) -> Result<Vec<MemeRecord>, RepoError> {
        let memes = self.memes.read().await;
        Ok(memes.values().filter(|m| filter.matches(m)).cloned().collect())
    }

    async fn count(&self, filter: &CatalogFilter) -> Result<u64, RepoError> {
        let memes = self.memes.read().await;
        Ok(memes.values().filter(|m| filter.matches(m)).count() as u64)
    }

    async fn increment_upvotes(&self, id: Uuid) -> Result<u64, RepoError> {
        self.bump(id, |m| &mut m.upvotes).await
    }

    async fn increment_downloads(&self, id: Uuid) -> Result<u64, RepoError> {
        self.bump(id, |m| &mut m.downloads).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(tag: &str) -> MemeRecord {
        MemeRecord {
            id: Uuid::new_v4(),
            image_url: "u".into(),
            storage_id: "s".into(),
            tags: vec![tag.to_string()],
            description: "d".into(),
            upvotes: 0,
            downloads: 0,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn increments_return_the_new_count() {
        let meme = record("cat");
        let store = InMemoryCatalogStore::with_records([meme.clone()]);
        assert_eq!(store.increment_upvotes(meme.id).await.unwrap(), 1);
        assert_eq!(store.increment_upvotes(meme.id).await.unwrap(), 2);
        assert_eq!(store.increment_downloads(meme.id).await.unwrap(), 1);

        let stored = store.get_by_id(meme.id).await.unwrap().unwrap();
        assert_eq!((stored.upvotes, stored.downloads), (2, 1));
    }

    #[tokio::test]
    async fn incrementing_a_missing_meme_is_not_found() {
        let store = InMemoryCatalogStore::new();
        let id = Uuid::new_v4();
        assert!(matches!(store.increment_upvotes(id).await, Err(RepoError::NotFound(missing)) if missing == id));
        assert!(matches!(store.increment_downloads(id).await, Err(RepoError::NotFound(_))));
    }

    #[tokio::test]
    async fn scan_and_count_agree_with_the_filter() {
        let store = InMemoryCatalogStore::with_records([record("cat"), record("dog"), record("cat")]);
        let filter = CatalogFilter::with_tag("cat");
        assert_eq!(store.scan(&filter).await.unwrap().len(), 2);
        assert_eq!(store.count(&filter).await.unwrap(), 2);
        assert_eq!(store.count(&CatalogFilter::all()).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn duplicate_ids_are_rejected() {
        let meme = record("cat");
        let store = InMemoryCatalogStore::new();
        store.create(&meme).await.unwrap();
        assert!(store.create(&meme).await.is_err());
    }
}
