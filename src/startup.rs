use crate::{
    aws_clients::{create_dynamodb_client, create_sdk_config},
    config::{CatalogBackend, Config},
    domain::CatalogStore,
    errors::AppError,
    memory_store::InMemoryCatalogStore,
    repositories::DynamoDbCatalogStore,
};
use aws_sdk_dynamodb::{
    error::SdkError as DynamoSdkError,
    types::{AttributeDefinition, BillingMode, KeySchemaElement, KeyType, ScalarAttributeType},
    Client as DynamoDbClient,
};
use std::sync::Arc;
use tracing;

/// Creates the DynamoDB table if it doesn't exist.
async fn create_dynamodb_table_if_not_exists(client: &DynamoDbClient, table_name: &str) -> Result<(), AppError> {
    let result = client
        .create_table()
        .table_name(table_name)
        .attribute_definitions(
            AttributeDefinition::builder()
                .attribute_name("meme_id")
                .attribute_type(ScalarAttributeType::S)
                .build()?,
        )
        .key_schema(
            KeySchemaElement::builder()
                .attribute_name("meme_id")
                .key_type(KeyType::Hash)
                .build()?,
        )
        .billing_mode(BillingMode::PayPerRequest)
        .send()
        .await;
    match result {
        Ok(_) => {
            tracing::info!("Startup: Table '{}' created successfully or setup initiated.", table_name);
            Ok(())
        }
        Err(e) => {
            if let DynamoSdkError::ServiceError(service_err) = &e {
                if service_err.err().is_resource_in_use_exception() {
                    tracing::info!("Startup: Table '{}' already exists, no action needed.", table_name);
                    return Ok(());
                }
                tracing::error!("Startup: Service error creating DynamoDB table '{}': {:?}", table_name, service_err);
            } else {
                tracing::error!("Startup: SDK error creating DynamoDB table '{}': {}", table_name, e);
            }
            Err(AppError::InitError(format!(
                "Startup: could not create DynamoDB table '{}': {}",
                table_name, e
            )))
        }
    }
}

/// Builds the configured Catalog Store, provisioning the table when needed.
pub async fn init_catalog(config: &Config) -> Result<Arc<dyn CatalogStore>, AppError> {
    match config.catalog_backend {
        CatalogBackend::Memory => {
            tracing::warn!("Startup: Using in-memory catalog; records are lost on restart.");
            Ok(Arc::new(InMemoryCatalogStore::new()))
        }
        CatalogBackend::DynamoDb => {
            tracing::info!("Startup: Initializing AWS resources...");
            let sdk_config = create_sdk_config(config).await;
            let client = create_dynamodb_client(&sdk_config);
            create_dynamodb_table_if_not_exists(&client, &config.memes_table).await?;
            tracing::info!("Startup: AWS resource initialization complete.");
            Ok(Arc::new(DynamoDbCatalogStore::new(client, config.memes_table.clone())))
        }
    }
}
