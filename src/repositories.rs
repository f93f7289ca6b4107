use crate::{
    domain::{CatalogFilter, CatalogStore},
    errors::RepoError,
    models::MemeRecord,
};
use anyhow::Context;
use async_trait::async_trait;
use aws_sdk_dynamodb::{
    error::SdkError,
    types::{AttributeValue, ReturnValue},
    Client as DynamoDbClient,
};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::{self, info};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct DynamoDbCatalogStore {
    client: DynamoDbClient,
    table_name: String,
}

impl DynamoDbCatalogStore {
    /// Creates a new store instance configured for a specific table.
    pub fn new(client: DynamoDbClient, table_name: String) -> Self {
        info!(%table_name, "Initializing DynamoDbCatalogStore");
        Self { client, table_name }
    }

    /// Atomic `ADD` on a numeric counter, guarded by the item existing.
    async fn increment(&self, id: Uuid, attribute: &str) -> Result<u64, RepoError> {
        let id_str = id.to_string();
        let resp = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key("meme_id", AttributeValue::S(id_str.clone()))
            .update_expression("ADD #counter :one")
            .condition_expression("attribute_exists(meme_id)")
            .expression_attribute_names("#counter", attribute)
            .expression_attribute_values(":one", AttributeValue::N("1".to_string()))
            .return_values(ReturnValue::UpdatedNew)
            .send()
            .await;

        let output = match resp {
            Ok(output) => output,
            Err(SdkError::ServiceError(service_err))
                if service_err.err().is_conditional_check_failed_exception() =>
            {
                tracing::debug!(meme_id = %id_str, attribute, "DynamoDB: increment on missing meme");
                return Err(RepoError::NotFound(id));
            }
            Err(e) => {
                return Err(RepoError::BackendError(anyhow::Error::new(e).context(format!(
                    "DynamoDB (table: {}): Failed to increment {} (id: {})",
                    self.table_name, attribute, id_str
                ))));
            }
        };

        output
            .attributes
            .as_ref()
            .and_then(|attrs| attrs.get(attribute))
            .and_then(|v| v.as_n().ok())
            .and_then(|n| n.parse::<u64>().ok())
            .ok_or_else(|| {
                RepoError::DataCorruption(format!(
                    "DynamoDB (table: {}): update of {} for id {} returned no numeric value",
                    self.table_name, attribute, id_str
                ))
            })
    }
}

/// Filter expression for the parts of a [`CatalogFilter`] DynamoDB can evaluate.
/// Substring matching across list elements is not expressible, so those
/// fields are applied after the scan.
fn pushdown_expression(
    filter: &CatalogFilter,
) -> Option<(String, HashMap<String, AttributeValue>)> {
    let mut clauses = Vec::new();
    let mut values = HashMap::new();
    if let Some(since) = filter.created_after {
        clauses.push("created_at >= :since".to_string());
        values.insert(
            ":since".to_string(),
            AttributeValue::N(since.timestamp_millis().to_string()),
        );
    }
    if let Some(tag) = &filter.tag {
        clauses.push("contains(tags, :tag)".to_string());
        values.insert(":tag".to_string(), AttributeValue::S(tag.clone()));
    }
    if clauses.is_empty() {
        None
    } else {
        Some((clauses.join(" AND "), values))
    }
}

#[async_trait]
impl CatalogStore for DynamoDbCatalogStore {
    /// Stores a `MemeRecord` in the DynamoDB table using PutItem.
    async fn create(&self, meme: &MemeRecord) -> Result<(), RepoError> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(meme_to_item(meme)))
            .condition_expression("attribute_not_exists(meme_id)")
            .send()
            .await
            .context(format!("DynamoDB (table: {}): Failed to put meme (id: {})", self.table_name, meme.id))
            .map_err(RepoError::BackendError)?;
        Ok(())
    }

    /// Retrieves a `MemeRecord` from DynamoDB using GetItem.
    async fn get_by_id(&self, id: Uuid) -> Result<Option<MemeRecord>, RepoError> {
        let id_str = id.to_string();
        let resp = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key("meme_id", AttributeValue::S(id_str.clone()))
            .send()
            .await
            .context(format!("DynamoDB (table: {}): Failed to get meme (id: {})", self.table_name, id_str))
            .map_err(RepoError::BackendError)?;

        match resp.item {
            Some(item) => match item_to_meme(&item) {
                Some(meme) => Ok(Some(meme)),
                None => {
                    tracing::error!(meme_id = %id_str, table_name = %self.table_name, "DynamoDB: Retrieved item but failed to parse into MemeRecord");
                    Err(RepoError::DataCorruption(format!(
                        "Failed to parse meme data retrieved from DynamoDB table '{}' for id {}",
                        self.table_name, id_str
                    )))
                }
            },
            None => Ok(None),
        }
    }

    /// Scans the table, following `LastEvaluatedKey` until exhausted.
    async fn scan(&self, filter: &CatalogFilter) -> Result<Vec<MemeRecord>, RepoError> {
        tracing::debug!(?filter, "DynamoDB: Scanning table '{}'", self.table_name);
        let pushdown = pushdown_expression(filter);
        let mut memes: Vec<MemeRecord> = Vec::new();
        let mut last_evaluated_key: Option<HashMap<String, AttributeValue>> = None;

        loop {
            let mut request_builder = self.client.scan().table_name(&self.table_name);

            if let Some((expression, values)) = &pushdown {
                request_builder = request_builder
                    .filter_expression(expression)
                    .set_expression_attribute_values(Some(values.clone()));
            }
            if let Some(lek) = last_evaluated_key {
                request_builder = request_builder.set_exclusive_start_key(Some(lek));
            }

            let resp = request_builder
                .send()
                .await
                .context(format!("DynamoDB: Failed to scan table '{}'", self.table_name))
                .map_err(RepoError::BackendError)?;

            if let Some(items) = resp.items {
                tracing::debug!("DynamoDB Scan (table: {}): Returned {} items", self.table_name, items.len());
                for item in items {
                    match item_to_meme(&item) {
                        Some(meme) => {
                            if filter.matches(&meme) {
                                memes.push(meme);
                            }
                        }
                        None => {
                            let item_id = item.get("meme_id").and_then(|v| v.as_s().ok());
                            tracing::error!(item.id = ?item_id, table_name = %self.table_name, "DynamoDB: Failed to parse item from scan into MemeRecord");
                            return Err(RepoError::DataCorruption(format!(
                                "DynamoDB: Failed to parse item {:?} during scan of table '{}'",
                                item_id, self.table_name
                            )));
                        }
                    }
                }
            }

            last_evaluated_key = resp.last_evaluated_key;
            if last_evaluated_key.is_none() {
                break;
            }
        }

        tracing::debug!("DynamoDB (table: {}): Scan matched {} memes", self.table_name, memes.len());
        Ok(memes)
    }

    async fn count(&self, filter: &CatalogFilter) -> Result<u64, RepoError> {
        // Keyword and tag-substring filters only exist client-side.
        Ok(self.scan(filter).await?.len() as u64)
    }

    async fn increment_upvotes(&self, id: Uuid) -> Result<u64, RepoError> {
        self.increment(id, "upvotes").await
    }

    async fn increment_downloads(&self, id: Uuid) -> Result<u64, RepoError> {
        self.increment(id, "downloads").await
    }
}

fn meme_to_item(meme: &MemeRecord) -> HashMap<String, AttributeValue> {
    let tags = meme
        .tags
        .iter()
        .map(|t| AttributeValue::S(t.clone()))
        .collect();
    HashMap::from([
        ("meme_id".to_string(), AttributeValue::S(meme.id.to_string())),
        ("image_url".to_string(), AttributeValue::S(meme.image_url.clone())),
        ("storage_id".to_string(), AttributeValue::S(meme.storage_id.clone())),
        ("tags".to_string(), AttributeValue::L(tags)),
        ("description".to_string(), AttributeValue::S(meme.description.clone())),
        ("upvotes".to_string(), AttributeValue::N(meme.upvotes.to_string())),
        ("downloads".to_string(), AttributeValue::N(meme.downloads.to_string())),
        (
            "created_at".to_string(),
            AttributeValue::N(meme.created_at.timestamp_millis().to_string()),
        ),
    ])
}

// Returns None when any required attribute is missing or mistyped.
fn item_to_meme(item: &HashMap<String, AttributeValue>) -> Option<MemeRecord> {
    let id = item
        .get("meme_id")?
        .as_s()
        .ok()
        .and_then(|s| Uuid::parse_str(s).ok())?;
    let image_url = item.get("image_url")?.as_s().ok()?.to_string();
    let storage_id = item.get("storage_id")?.as_s().ok()?.to_string();
    let tags = item
        .get("tags")?
        .as_l()
        .ok()?
        .iter()
        .map(|v| v.as_s().ok().map(|s| s.to_string()))
        .collect::<Option<Vec<String>>>()?;
    let description = item.get("description")?.as_s().ok()?.to_string();
    let upvotes = number(item, "upvotes")?;
    let downloads = number(item, "downloads")?;
    let created_at_ms: i64 = item.get("created_at")?.as_n().ok()?.parse().ok()?;
    let created_at = DateTime::<Utc>::from_timestamp_millis(created_at_ms)?;

    Some(MemeRecord {
        id,
        image_url,
        storage_id,
        tags,
        description,
        upvotes,
        downloads,
        created_at,
    })
}

// Counters created before the attribute existed read as zero.
fn number(item: &HashMap<String, AttributeValue>, key: &str) -> Option<u64> {
    match item.get(key) {
        None => Some(0),
        Some(value) => value.as_n().ok()?.parse().ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn sample() -> MemeRecord {
        MemeRecord {
            id: Uuid::new_v4(),
            image_url: "https://cdn.example.com/x.png".into(),
            storage_id: "memes/x".into(),
            tags: vec!["drake".into(), "reaction".into()],
            description: "pointing at choices".into(),
            upvotes: 7,
            downloads: 3,
            created_at: Utc.with_ymd_and_hms(2026, 3, 1, 8, 30, 0).unwrap(),
        }
    }

    #[test]
    fn item_conversion_preserves_tag_order_and_counters() {
        let meme = sample();
        let parsed = item_to_meme(&meme_to_item(&meme)).unwrap();
        assert_eq!(parsed, meme);
    }

    #[test]
    fn missing_counters_read_as_zero() {
        let mut item = meme_to_item(&sample());
        item.remove("upvotes");
        assert_eq!(item_to_meme(&item).unwrap().upvotes, 0);
    }

    #[test]
    fn malformed_items_are_rejected() {
        let mut item = meme_to_item(&sample());
        item.insert("tags".into(), AttributeValue::S("drake".into()));
        assert!(item_to_meme(&item).is_none());
    }

    #[test]
    fn pushdown_covers_time_and_tag_only() {
        assert!(pushdown_expression(&CatalogFilter::all()).is_none());

        let since = Utc::now() - Duration::days(7);
        let filter = CatalogFilter {
            tag: Some("cat".into()),
            keywords: vec!["ignored".into()],
            created_after: Some(since),
            ..CatalogFilter::default()
        };
        let (expression, values) = pushdown_expression(&filter).unwrap();
        assert_eq!(expression, "created_at >= :since AND contains(tags, :tag)");
        assert_eq!(values.len(), 2);
        assert_eq!(
            values.get(":since").and_then(|v| v.as_n().ok()).cloned(),
            Some(since.timestamp_millis().to_string())
        );
    }
}
