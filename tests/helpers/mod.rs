#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};
use meme_market::{memory_store::InMemoryCatalogStore, models::MemeRecord, AppState};
use std::sync::Arc;
use uuid::Uuid;

/// Build a record created `age` before `now` with the given counters.
pub fn meme_at(
    tags: &[&str],
    description: &str,
    upvotes: u64,
    downloads: u64,
    now: DateTime<Utc>,
    age: Duration,
) -> MemeRecord {
    MemeRecord {
        id: Uuid::new_v4(),
        image_url: format!("https://cdn.example.com/{}.png", tags.join("-")),
        storage_id: format!("memes/{}", tags.join("-")),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        description: description.to_string(),
        upvotes,
        downloads,
        created_at: now - age,
    }
}

pub fn meme(tags: &[&str], description: &str) -> MemeRecord {
    meme_at(tags, description, 0, 0, Utc::now(), Duration::zero())
}

pub fn store_with(records: Vec<MemeRecord>) -> Arc<InMemoryCatalogStore> {
    Arc::new(InMemoryCatalogStore::with_records(records))
}

pub fn app_state(records: Vec<MemeRecord>) -> Arc<AppState> {
    Arc::new(AppState {
        catalog: store_with(records),
    })
}
