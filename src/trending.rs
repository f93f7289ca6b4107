//! Time-decayed trending ranking over a rolling 30 day window.

use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;

use crate::domain::{CatalogFilter, CatalogStore};
use crate::errors::AppError;
use crate::models::{MemeRecord, TrendingMeme, TrendingMetadata, TrendingResponse};
use crate::pagination::{paginate, Page};

pub const TRENDING_WINDOW_DAYS: i64 = 30;
pub const TOP_TAG_WINDOW_DAYS: i64 = 7;
pub const ALGORITHM: &str = "(upvotes * 2 + downloads) / (days_since_creation + 1)";

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Rounds half away from zero to two decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Fractional days between creation and `now`. Future timestamps count as zero.
pub fn days_since_creation(created_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let elapsed = (now - created_at).num_milliseconds() as f64 / MILLIS_PER_DAY;
    elapsed.max(0.0)
}

/// Weighted engagement: an upvote is worth two downloads.
pub fn engagement(meme: &MemeRecord) -> u64 {
    meme.upvotes.saturating_mul(2).saturating_add(meme.downloads)
}

pub fn trend_score(upvotes: u64, downloads: u64, days_since_creation: f64) -> f64 {
    let weighted = upvotes.saturating_mul(2).saturating_add(downloads) as f64;
    weighted / (days_since_creation + 1.0)
}

fn within_window(meme: &MemeRecord, now: DateTime<Utc>, days: i64) -> bool {
    now - meme.created_at <= Duration::days(days)
}

/// Drops records older than the window, scores the rest and orders them by
/// score, upvotes, then recency.
pub fn rank_trending(memes: Vec<MemeRecord>, now: DateTime<Utc>) -> Vec<TrendingMeme> {
    let mut ranked: Vec<TrendingMeme> = memes
        .into_iter()
        .filter(|meme| within_window(meme, now, TRENDING_WINDOW_DAYS))
        .map(|meme| {
            let days = days_since_creation(meme.created_at, now);
            TrendingMeme {
                trending_score: round2(trend_score(meme.upvotes, meme.downloads, days)),
                days_since_creation: round2(days),
                meme,
            }
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.trending_score
            .total_cmp(&a.trending_score)
            .then_with(|| b.meme.upvotes.cmp(&a.meme.upvotes))
            .then_with(|| b.meme.created_at.cmp(&a.meme.created_at))
            .then_with(|| a.meme.id.cmp(&b.meme.id))
    });
    ranked
}

/// Tag with the best average engagement among records from the last week.
/// Ties prefer the larger group, then the alphabetically first tag.
pub fn most_trending_tag(memes: &[MemeRecord], now: DateTime<Utc>) -> Option<String> {
    let mut groups: BTreeMap<&str, (u64, u64)> = BTreeMap::new();
    for meme in memes.iter().filter(|m| within_window(m, now, TOP_TAG_WINDOW_DAYS)) {
        let score = engagement(meme);
        let mut seen: Vec<&str> = Vec::with_capacity(meme.tags.len());
        for tag in &meme.tags {
            if seen.contains(&tag.as_str()) {
                continue;
            }
            seen.push(tag);
            let entry = groups.entry(tag).or_insert((0, 0));
            entry.0 += score;
            entry.1 += 1;
        }
    }

    let mut best: Option<(&str, f64, u64)> = None;
    for (tag, (total, count)) in groups {
        let avg = total as f64 / count as f64;
        let better = match best {
            None => true,
            Some((_, best_avg, best_count)) => {
                avg > best_avg || (avg == best_avg && count > best_count)
            }
        };
        if better {
            best = Some((tag, avg, count));
        }
    }
    best.map(|(tag, _, _)| tag.to_string())
}

/// Scans the trailing window once and builds the trending page from it.
pub async fn trending_memes(
    store: &dyn CatalogStore,
    page: &Page,
    now: DateTime<Utc>,
) -> Result<TrendingResponse, AppError> {
    let since = now - Duration::days(TRENDING_WINDOW_DAYS);
    let recent = store.scan(&CatalogFilter::created_since(since)).await?;

    let most_trending_tag = most_trending_tag(&recent, now);
    let ranked = rank_trending(recent, now);
    let (trending_memes, pagination) = paginate(ranked, page);

    tracing::debug!(
        eligible = pagination.total_items,
        returned = trending_memes.len(),
        top_tag = ?most_trending_tag,
        "Trending ranked"
    );

    Ok(TrendingResponse {
        trending_memes,
        most_trending_tag,
        pagination,
        metadata: TrendingMetadata {
            calculation_period: format!("{} days", TRENDING_WINDOW_DAYS),
            algorithm: ALGORITHM.to_string(),
        },
    })
}
