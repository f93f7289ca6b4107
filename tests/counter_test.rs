mod helpers;

use helpers::{meme, store_with};
use meme_market::domain::CatalogStore;
use std::sync::Arc;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_increments_are_never_lost() {
    let record = meme(&["cat"], "");
    let id = record.id;
    let store: Arc<dyn CatalogStore> = store_with(vec![record]);

    let mut tasks = Vec::new();
    for i in 0..200 {
        let store = Arc::clone(&store);
        tasks.push(tokio::spawn(async move {
            if i % 2 == 0 {
                store.increment_upvotes(id).await.unwrap();
            } else {
                store.increment_downloads(id).await.unwrap();
            }
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    let stored = store.get_by_id(id).await.unwrap().unwrap();
    assert_eq!(stored.upvotes, 100);
    assert_eq!(stored.downloads, 100);
}
