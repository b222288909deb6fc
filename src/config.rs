use serde::{Deserialize, Serialize};

use crate::error::ConverterError;
use crate::model::ConversionMode;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub converter: ConverterConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Connection settings for the document store HTTP API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Versioned API root, e.g. `https://<project>.api.example.io/v2021-10-21`
    pub base_url: String,
    pub dataset: String,
    pub token: Option<String>,
    pub timeout_secs: u64,
}

/// Settings for one scan + convert cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    /// Restrict the scan to these `_type` values; empty means all types
    pub document_types: Vec<String>,
    /// Free text matched against `title` and `name`
    pub search: Option<String>,
    /// Raw query that replaces the generated one
    pub custom_query: Option<String>,
    pub batch_size: usize,
    pub dry_run: bool,
    pub max_documents: usize,
    pub mode: ConversionMode,
    pub include_drafts: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3333/v1".to_string(),
            dataset: "production".to_string(),
            token: None,
            timeout_secs: 30,
        }
    }
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            document_types: Vec::new(),
            search: None,
            custom_query: None,
            batch_size: 10,
            dry_run: false,
            max_documents: 1000,
            mode: ConversionMode::StrongToWeak,
            include_drafts: false,
        }
    }
}

impl ConverterConfig {
    pub fn validate(&self) -> Result<(), ConverterError> {
        if self.batch_size == 0 {
            return Err(ConverterError::Configuration(
                "batch_size must be at least 1".to_string(),
            ));
        }
        if self.max_documents == 0 {
            return Err(ConverterError::Configuration(
                "max_documents must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Custom query with surrounding whitespace removed, if one was given
    pub fn effective_custom_query(&self) -> Option<&str> {
        self.custom_query
            .as_deref()
            .map(str::trim)
            .filter(|query| !query.is_empty())
    }

    /// Whether switching to `other` invalidates groups scanned under `self`
    pub fn scan_differs(&self, other: &ConverterConfig) -> bool {
        self.mode != other.mode
            || self.document_types != other.document_types
            || self.search != other.search
            || self.custom_query != other.custom_query
            || self.max_documents != other.max_documents
            || self.include_drafts != other.include_drafts
    }
}

impl AppConfig {
    /// Load configuration from defaults, an optional `config` file and `REFCONV_*` variables
    pub fn load() -> anyhow::Result<Self> {
        let mut config = config::Config::builder();

        // Add default configuration
        config = config.add_source(config::Config::try_from(&AppConfig::default())?);

        // Add config file if it exists
        config = config.add_source(config::File::with_name("config").required(false));

        // e.g. REFCONV_CONVERTER__BATCH_SIZE=25, REFCONV_CONVERTER__DOCUMENT_TYPES=post,page
        config = config.add_source(
            config::Environment::with_prefix("REFCONV")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("converter.document_types"),
        );

        let config = config.build()?;
        let app_config: AppConfig = config.try_deserialize()?;

        app_config.converter.validate()?;

        Ok(app_config)
    }

    /// API token from config, falling back to `DOCUMENT_STORE_TOKEN`
    pub fn store_token(&self) -> Option<String> {
        if let Some(token) = &self.store.token {
            return Some(token.clone());
        }
        std::env::var("DOCUMENT_STORE_TOKEN").ok()
    }

    /// Get the server bind address
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
