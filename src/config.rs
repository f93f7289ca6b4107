use std::{env, net::SocketAddr, str::FromStr};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid environment variable format for {0}: {1}")]
    InvalidVar(String, String),
    #[error(transparent)]
    DotEnvError(#[from] dotenvy::Error),
}

/// Which Catalog Store implementation backs the service.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CatalogBackend {
    DynamoDb,
    Memory,
}

impl FromStr for CatalogBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dynamodb" | "dynamo" => Ok(CatalogBackend::DynamoDb),
            "memory" | "in-memory" => Ok(CatalogBackend::Memory),
            other => Err(format!("unknown catalog backend '{}'", other)),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub catalog_backend: CatalogBackend,
    pub memes_table: String,
    // Store region as string for simplicity here, aws_clients can convert
    pub aws_region: String,
    // Optional endpoint for LocalStack
    pub localstack_endpoint: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (ignores errors, relies on env vars otherwise)
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_address_str = lookup("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:3000".to_string());
        let bind_address = SocketAddr::from_str(&bind_address_str)
            .map_err(|e| ConfigError::InvalidVar("BIND_ADDRESS".into(), e.to_string()))?;

        let catalog_backend = match lookup("CATALOG_BACKEND") {
            Some(raw) => raw
                .parse()
                .map_err(|e: String| ConfigError::InvalidVar("CATALOG_BACKEND".into(), e))?,
            None => CatalogBackend::DynamoDb,
        };

        let memes_table = lookup("MEMES_TABLE_NAME").unwrap_or_else(|| "memes".to_string());
        if memes_table.trim().is_empty() {
            return Err(ConfigError::MissingVar("MEMES_TABLE_NAME".into()));
        }

        let aws_region = lookup("AWS_DEFAULT_REGION").unwrap_or_else(|| "ca-central-1".to_string());

        // Allow overriding endpoint for localstack/testing
        let localstack_endpoint = lookup("AWS_ENDPOINT_URL").filter(|url| !url.trim().is_empty());

        Ok(Config {
            bind_address,
            catalog_backend,
            memes_table,
            aws_region,
            localstack_endpoint,
        })
    }
}
