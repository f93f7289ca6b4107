//! Keyword search over tags and descriptions.
//!
//! A query is split into lowercase tokens; a record matches when any token is
//! a raw substring of one of its tags or of its description (so "cat" also
//! hits "category"). Description hits weigh twice as much as tag hits, and
//! each token counts at most once per field.

use crate::domain::{CatalogFilter, CatalogStore};
use crate::errors::AppError;
use crate::models::{MemeRecord, RelevanceHit, SearchResponse};
use crate::pagination::{paginate, Page};

const DESCRIPTION_WEIGHT: u32 = 2;
const TAG_WEIGHT: u32 = 1;

/// Lowercases, splits on whitespace and drops one-character tokens.
/// Repeated tokens are kept once, in first-seen order.
pub fn tokenize_query(query: &str) -> Result<Vec<String>, AppError> {
    if query.trim().is_empty() {
        return Err(AppError::InvalidQuery("search query cannot be empty".to_string()));
    }
    let mut tokens: Vec<String> = Vec::new();
    for word in query.to_lowercase().split_whitespace() {
        if word.chars().count() > 1 && !tokens.iter().any(|t| t == word) {
            tokens.push(word.to_string());
        }
    }
    if tokens.is_empty() {
        return Err(AppError::InvalidQuery(
            "search query needs at least one term longer than one character".to_string(),
        ));
    }
    Ok(tokens)
}

/// `2 * (tokens found in the description) + (tokens found in any tag)`.
pub fn relevance_score(meme: &MemeRecord, tokens: &[String]) -> u32 {
    let description = meme.description.to_lowercase();
    let tags: Vec<String> = meme.tags.iter().map(|t| t.to_lowercase()).collect();

    let description_hits = tokens.iter().filter(|t| description.contains(t.as_str())).count() as u32;
    let tag_hits = tokens
        .iter()
        .filter(|t| tags.iter().any(|tag| tag.contains(t.as_str())))
        .count() as u32;

    DESCRIPTION_WEIGHT * description_hits + TAG_WEIGHT * tag_hits
}

/// Scores every candidate and orders by score, then newest first.
pub fn rank_matches(memes: Vec<MemeRecord>, tokens: &[String]) -> Vec<RelevanceHit> {
    let mut hits: Vec<RelevanceHit> = memes
        .into_iter()
        .filter_map(|meme| {
            let relevance_score = relevance_score(&meme, tokens);
            (relevance_score > 0).then_some(RelevanceHit { meme, relevance_score })
        })
        .collect();
    hits.sort_by(|a, b| {
        b.relevance_score
            .cmp(&a.relevance_score)
            .then_with(|| b.meme.created_at.cmp(&a.meme.created_at))
            .then_with(|| a.meme.id.cmp(&b.meme.id))
    });
    hits
}

/// Runs a ranked search. The whole match set is ranked before paging.
pub async fn search_memes(
    store: &dyn CatalogStore,
    query: &str,
    page: &Page,
) -> Result<SearchResponse, AppError> {
    let tokens = tokenize_query(query)?;
    let filter = CatalogFilter {
        keywords: tokens.clone(),
        ..CatalogFilter::default()
    };
    let candidates = store.scan(&filter).await?;
    let ranked = rank_matches(candidates, &tokens);
    let (memes, pagination) = paginate(ranked, page);

    tracing::debug!(
        tokens = ?tokens,
        total_matches = pagination.total_items,
        returned = memes.len(),
        "Search ranked"
    );

    Ok(SearchResponse {
        search_words: tokens,
        memes,
        pagination,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use uuid::Uuid;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 20, 9, 0, 0).unwrap()
    }

    fn meme(tags: &[&str], description: &str, hours_ago: i64) -> MemeRecord {
        MemeRecord {
            id: Uuid::new_v4(),
            image_url: "https://cdn.example.com/m.png".into(),
            storage_id: "m".into(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            description: description.into(),
            upvotes: 0,
            downloads: 0,
            created_at: now() - Duration::hours(hours_ago),
        }
    }

    fn tokens(query: &str) -> Vec<String> {
        tokenize_query(query).unwrap()
    }

    #[test]
    fn tokenizer_lowercases_and_drops_short_words() {
        assert_eq!(tokens("  Funny A cat   MEMES "), vec!["funny", "cat", "memes"]);
        assert_eq!(tokens("cat cat CAT"), vec!["cat"]);
    }

    #[test]
    fn degenerate_queries_are_rejected() {
        assert!(matches!(tokenize_query(""), Err(AppError::InvalidQuery(_))));
        assert!(matches!(tokenize_query("   \t"), Err(AppError::InvalidQuery(_))));
        assert!(matches!(tokenize_query("a b c"), Err(AppError::InvalidQuery(_))));
    }

    #[test]
    fn description_hits_count_double() {
        let r1 = meme(&["drake", "reaction"], "pointing at choices", 0);
        let r2 = meme(&["cat"], "pointing meme", 0);
        let query = tokens("pointing choices");
        assert_eq!(relevance_score(&r1, &query), 4);
        assert_eq!(relevance_score(&r2, &query), 2);

        let ranked = rank_matches(vec![r2.clone(), r1.clone()], &query);
        let order: Vec<Uuid> = ranked.iter().map(|h| h.meme.id).collect();
        assert_eq!(order, vec![r1.id, r2.id]);
    }

    #[test]
    fn each_token_counts_once_per_field() {
        let m = meme(&["cat", "cats", "catnip"], "cat sees cat", 0);
        assert_eq!(relevance_score(&m, &tokens("cat")), 3);
    }

    #[test]
    fn substring_matching_is_not_word_bounded() {
        let m = meme(&["category"], "nothing here", 0);
        assert_eq!(relevance_score(&m, &tokens("cat")), 1);
    }

    #[test]
    fn score_ignores_token_order() {
        let m = meme(&["doge", "wow"], "such wow much doge", 0);
        assert_eq!(
            relevance_score(&m, &tokens("doge wow such")),
            relevance_score(&m, &tokens("such wow doge"))
        );
    }

    #[test]
    fn ties_go_to_the_newest() {
        let older = meme(&["cat"], "", 48);
        let newer = meme(&["cat"], "", 1);
        let ranked = rank_matches(vec![older.clone(), newer.clone()], &tokens("cat"));
        assert_eq!(ranked[0].meme.id, newer.id);
        assert_eq!(ranked[1].meme.id, older.id);
    }

    #[test]
    fn non_matching_records_are_excluded() {
        let ranked = rank_matches(vec![meme(&["dog"], "a dog", 0)], &tokens("zebra stripes"));
        assert!(ranked.is_empty());
    }

    #[test]
    fn every_hit_contains_some_token() {
        let memes = vec![
            meme(&["drake"], "choices", 0),
            meme(&["dog"], "woof", 1),
            meme(&["cat"], "pointing", 2),
            meme(&["surprised", "pikachu"], "shock", 3),
        ];
        let query = tokens("pointing drake pika");
        for hit in rank_matches(memes, &query) {
            let found = query.iter().any(|t| {
                hit.meme.description.contains(t.as_str()) || hit.meme.tags.iter().any(|tag| tag.contains(t.as_str()))
            });
            assert!(found, "record {:?} matched without containing a token", hit.meme.tags);
        }
    }
}
