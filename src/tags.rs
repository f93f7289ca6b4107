//! Per-tag engagement statistics, recomputed from the catalog on each call.

use std::collections::HashMap;

use crate::domain::{CatalogFilter, CatalogStore};
use crate::errors::AppError;
use crate::models::{MemeRecord, TagStats};
use crate::trending::round2;

pub const DEFAULT_POPULAR_LIMIT: usize = 30;
pub const DEFAULT_SUGGESTION_LIMIT: usize = 10;

#[derive(Default)]
struct Totals {
    count: u64,
    upvotes: u64,
    downloads: u64,
}

/// Groups records by tag, keeping only tags accepted by `keep`.
/// A record contributes once to each distinct tag it carries.
pub fn aggregate_tags<F>(memes: &[MemeRecord], keep: F) -> Vec<TagStats>
where
    F: Fn(&str) -> bool,
{
    let mut groups: HashMap<&str, Totals> = HashMap::new();
    for meme in memes {
        let mut seen: Vec<&str> = Vec::with_capacity(meme.tags.len());
        for tag in meme.tags.iter().map(String::as_str) {
            if seen.contains(&tag) || !keep(tag) {
                continue;
            }
            seen.push(tag);
            let totals = groups.entry(tag).or_default();
            totals.count += 1;
            totals.upvotes += meme.upvotes;
            totals.downloads += meme.downloads;
        }
    }

    let mut stats: Vec<TagStats> = groups
        .into_iter()
        .map(|(tag, totals)| TagStats {
            tag: tag.to_string(),
            count: totals.count,
            total_upvotes: totals.upvotes,
            total_downloads: totals.downloads,
            avg_upvotes: round2(totals.upvotes as f64 / totals.count as f64),
        })
        .collect();
    stats.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| b.total_upvotes.cmp(&a.total_upvotes))
            .then_with(|| a.tag.cmp(&b.tag))
    });
    stats
}

/// Most used tags across the whole catalog.
pub async fn popular_tags(store: &dyn CatalogStore, limit: usize) -> Result<Vec<TagStats>, AppError> {
    let memes = store.scan(&CatalogFilter::all()).await?;
    let mut stats = aggregate_tags(&memes, |_| true);
    stats.truncate(limit);
    tracing::debug!(scanned = memes.len(), returned = stats.len(), "Popular tags aggregated");
    Ok(stats)
}

/// Popular tags containing `fragment`, for autocomplete.
pub async fn suggest_tags(
    store: &dyn CatalogStore,
    fragment: &str,
    limit: usize,
) -> Result<Vec<TagStats>, AppError> {
    let fragment = fragment.trim().to_lowercase();
    if fragment.is_empty() {
        return Err(AppError::InvalidQuery("tag fragment cannot be empty".to_string()));
    }
    let filter = CatalogFilter {
        tag_contains: Some(fragment.clone()),
        ..CatalogFilter::default()
    };
    let memes = store.scan(&filter).await?;
    let mut stats = aggregate_tags(&memes, |tag| tag.contains(fragment.as_str()));
    stats.truncate(limit);
    Ok(stats)
}
