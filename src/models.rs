use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::pagination::PaginationInfo;

pub const MAX_TAG_LEN: usize = 50;
pub const MAX_DESCRIPTION_LEN: usize = 500;

/// Stand-in used when the upstream caption generator produced nothing.
pub const DEFAULT_DESCRIPTION: &str = "no description available";

/// One catalog entry: an uploaded meme plus its engagement counters.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MemeRecord {
    pub id: Uuid,
    pub image_url: String,
    pub storage_id: String,
    pub tags: Vec<String>,
    pub description: String,
    pub upvotes: u64,
    pub downloads: u64,
    pub created_at: DateTime<Utc>,
}

/// Creation payload. Tags and description arrive already generated upstream.
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewMeme {
    pub image_url: String,
    pub storage_id: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl NewMeme {
    /// Validates and normalizes the payload into a fresh record with zeroed counters.
    pub fn into_record(self, id: Uuid, created_at: DateTime<Utc>) -> Result<MemeRecord, AppError> {
        let image_url = self.image_url.trim().to_string();
        if image_url.is_empty() {
            return Err(AppError::InvalidInput("imageUrl is required".to_string()));
        }
        let storage_id = self.storage_id.trim().to_string();
        if storage_id.is_empty() {
            return Err(AppError::InvalidInput("storageId is required".to_string()));
        }

        let mut tags: Vec<String> = Vec::with_capacity(self.tags.len());
        for raw in &self.tags {
            let tag = normalize_tag(raw)?;
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }
        if tags.is_empty() {
            return Err(AppError::InvalidInput("at least one tag is required".to_string()));
        }

        let description = match self.description.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => text.to_lowercase(),
            _ => DEFAULT_DESCRIPTION.to_string(),
        };
        if description.chars().count() > MAX_DESCRIPTION_LEN {
            return Err(AppError::InvalidInput(format!(
                "description must be at most {} characters",
                MAX_DESCRIPTION_LEN
            )));
        }

        Ok(MemeRecord {
            id,
            image_url,
            storage_id,
            tags,
            description,
            upvotes: 0,
            downloads: 0,
            created_at,
        })
    }
}

/// Lowercases and checks a tag against `[a-z0-9\s\-_]+`, 1 to 50 chars.
pub fn normalize_tag(raw: &str) -> Result<String, AppError> {
    let tag = raw.trim().to_lowercase();
    let len = tag.chars().count();
    if len == 0 || len > MAX_TAG_LEN {
        return Err(AppError::InvalidInput(format!(
            "tag '{}' must be between 1 and {} characters",
            raw, MAX_TAG_LEN
        )));
    }
    let allowed = |c: char| {
        c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_ascii_whitespace() || c == '-' || c == '_'
    };
    if !tag.chars().all(allowed) {
        return Err(AppError::InvalidInput(format!(
            "tag '{}' may only contain letters, digits, spaces, '-' and '_'",
            raw
        )));
    }
    Ok(tag)
}

// --- Ranked entries ---

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RelevanceHit {
    #[serde(flatten)]
    pub meme: MemeRecord,
    pub relevance_score: u32,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrendingMeme {
    #[serde(flatten)]
    pub meme: MemeRecord,
    pub trending_score: f64,
    pub days_since_creation: f64,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TagStats {
    pub tag: String,
    pub count: u64,
    pub total_upvotes: u64,
    pub total_downloads: u64,
    pub avg_upvotes: f64,
}

// --- API responses ---

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub search_words: Vec<String>,
    pub memes: Vec<RelevanceHit>,
    pub pagination: PaginationInfo,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct TrendingMetadata {
    pub calculation_period: String,
    pub algorithm: String,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct TrendingResponse {
    pub trending_memes: Vec<TrendingMeme>,
    pub most_trending_tag: Option<String>,
    pub pagination: PaginationInfo,
    pub metadata: TrendingMetadata,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PopularTagsResponse {
    pub popular_tags: Vec<TagStats>,
}

#[derive(Serialize, Debug)]
pub struct TagSuggestionsResponse {
    pub suggestions: Vec<TagStats>,
}

#[derive(Serialize, Debug)]
pub struct MemeListResponse {
    pub memes: Vec<MemeRecord>,
    pub pagination: PaginationInfo,
}

#[derive(Serialize, Debug)]
pub struct TagMemesResponse {
    pub tag: String,
    pub memes: Vec<MemeRecord>,
    pub pagination: PaginationInfo,
}

#[derive(Serialize, Debug)]
pub struct UpvoteResponse {
    pub id: Uuid,
    pub upvotes: u64,
}

#[derive(Serialize, Debug)]
pub struct DownloadResponse {
    pub id: Uuid,
    pub downloads: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(tags: &[&str], description: Option<&str>) -> NewMeme {
        NewMeme {
            image_url: "https://cdn.example.com/a.png".to_string(),
            storage_id: "memes/a".to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            description: description.map(str::to_string),
        }
    }

    #[test]
    fn tags_are_normalized_and_deduplicated() {
        let record = payload(&[" Drake ", "reaction", "DRAKE", "hot-take_2"], Some("Pointing At Choices"))
            .into_record(Uuid::new_v4(), Utc::now())
            .unwrap();
        assert_eq!(record.tags, vec!["drake", "reaction", "hot-take_2"]);
        assert_eq!(record.description, "pointing at choices");
        assert_eq!(record.upvotes, 0);
        assert_eq!(record.downloads, 0);
    }

    #[test]
    fn missing_description_falls_back_to_default() {
        let record = payload(&["cat"], None).into_record(Uuid::new_v4(), Utc::now()).unwrap();
        assert_eq!(record.description, DEFAULT_DESCRIPTION);

        let blank = payload(&["cat"], Some("   ")).into_record(Uuid::new_v4(), Utc::now()).unwrap();
        assert_eq!(blank.description, DEFAULT_DESCRIPTION);
    }

    #[test]
    fn invalid_payloads_are_rejected() {
        assert!(payload(&[], None).into_record(Uuid::new_v4(), Utc::now()).is_err());
        assert!(payload(&["no!bang"], None).into_record(Uuid::new_v4(), Utc::now()).is_err());
        let long_tag = "x".repeat(MAX_TAG_LEN + 1);
        assert!(payload(&[long_tag.as_str()], None).into_record(Uuid::new_v4(), Utc::now()).is_err());
        let long_description = "y".repeat(MAX_DESCRIPTION_LEN + 1);
        assert!(payload(&["cat"], Some(long_description.as_str()))
            .into_record(Uuid::new_v4(), Utc::now())
            .is_err());

        let mut no_url = payload(&["cat"], None);
        no_url.image_url = " ".to_string();
        assert!(matches!(
            no_url.into_record(Uuid::new_v4(), Utc::now()),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn ranked_entries_flatten_the_record() {
        let meme = payload(&["cat"], Some("a cat")).into_record(Uuid::new_v4(), Utc::now()).unwrap();
        let hit = RelevanceHit { meme, relevance_score: 3 };
        let json = serde_json::to_value(&hit).unwrap();
        assert_eq!(json["relevanceScore"], 3);
        assert_eq!(json["tags"][0], "cat");
        assert!(json.get("imageUrl").is_some());
        assert!(json.get("meme").is_none());
    }
}
