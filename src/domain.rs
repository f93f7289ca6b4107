use crate::errors::RepoError;
use crate::models::MemeRecord;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Predicate for catalog scans. Populated fields are combined with AND.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogFilter {
    /// Exact tag membership.
    pub tag: Option<String>,
    /// Case-insensitive substring of at least one tag.
    pub tag_contains: Option<String>,
    /// Matches when any keyword is a case-insensitive substring of any tag
    /// or of the description.
    pub keywords: Vec<String>,
    /// Inclusive lower bound on `created_at`.
    pub created_after: Option<DateTime<Utc>>,
}

impl CatalogFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_tag(tag: impl Into<String>) -> Self {
        Self {
            tag: Some(tag.into()),
            ..Self::default()
        }
    }

    pub fn created_since(since: DateTime<Utc>) -> Self {
        Self {
            created_after: Some(since),
            ..Self::default()
        }
    }

    /// Reference predicate; every store implementation must agree with it.
    pub fn matches(&self, record: &MemeRecord) -> bool {
        if let Some(tag) = &self.tag {
            if !record.tags.iter().any(|t| t == tag) {
                return false;
            }
        }
        if let Some(fragment) = &self.tag_contains {
            let fragment = fragment.to_lowercase();
            if !record.tags.iter().any(|t| t.to_lowercase().contains(&fragment)) {
                return false;
            }
        }
        if !self.keywords.is_empty() {
            let description = record.description.to_lowercase();
            let tags: Vec<String> = record.tags.iter().map(|t| t.to_lowercase()).collect();
            let hit = self.keywords.iter().any(|keyword| {
                let keyword = keyword.to_lowercase();
                description.contains(&keyword) || tags.iter().any(|t| t.contains(&keyword))
            });
            if !hit {
                return false;
            }
        }
        if let Some(since) = self.created_after {
            if record.created_at < since {
                return false;
            }
        }
        true
    }
}

/// Durable mapping from meme id to record. The ranking views only read;
/// the two counters are the only mutations after creation.
#[async_trait]
pub trait CatalogStore: Send + Sync + 'static {
    /// Stores a newly created record.
    async fn create(&self, meme: &MemeRecord) -> Result<(), RepoError>;

    /// Returns Ok(None) if the meme is not found.
    async fn get_by_id(&self, id: Uuid) -> Result<Option<MemeRecord>, RepoError>;

    /// Returns every record matching `filter`, in no particular order.
    async fn scan(&self, filter: &CatalogFilter) -> Result<Vec<MemeRecord>, RepoError>;

    async fn count(&self, filter: &CatalogFilter) -> Result<u64, RepoError>;

    /// Atomically adds one upvote and returns the new total.
    async fn increment_upvotes(&self, id: Uuid) -> Result<u64, RepoError>;

    /// Atomically adds one download and returns the new total.
    async fn increment_downloads(&self, id: Uuid) -> Result<u64, RepoError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record(tags: &[&str], description: &str) -> MemeRecord {
        MemeRecord {
            id: Uuid::new_v4(),
            image_url: "https://cdn.example.com/m.png".into(),
            storage_id: "m".into(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            description: description.into(),
            upvotes: 0,
            downloads: 0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn empty_filter_matches_everything() {
        assert!(CatalogFilter::all().matches(&record(&["cat"], "")));
    }

    #[test]
    fn tag_membership_is_exact() {
        let meme = record(&["category", "dog"], "");
        assert!(CatalogFilter::with_tag("dog").matches(&meme));
        assert!(!CatalogFilter::with_tag("cat").matches(&meme));
    }

    #[test]
    fn keywords_match_raw_substrings_of_tags_or_description() {
        let meme = record(&["category"], "a dog sleeping");
        let filter = |words: &[&str]| CatalogFilter {
            keywords: words.iter().map(|w| w.to_string()).collect(),
            ..CatalogFilter::default()
        };
        assert!(filter(&["cat"]).matches(&meme));
        assert!(filter(&["zebra", "SLEEP"]).matches(&meme));
        assert!(!filter(&["zebra", "horse"]).matches(&meme));
    }

    #[test]
    fn created_after_is_inclusive() {
        let meme = record(&["cat"], "");
        assert!(CatalogFilter::created_since(meme.created_at).matches(&meme));
        assert!(!CatalogFilter::created_since(meme.created_at + Duration::seconds(1)).matches(&meme));
    }

    #[test]
    fn tag_contains_ignores_case() {
        let meme = record(&["Funny-Cats"], "");
        let filter = CatalogFilter {
            tag_contains: Some("cat".into()),
            ..CatalogFilter::default()
        };
        assert!(filter.matches(&meme));
    }
}
