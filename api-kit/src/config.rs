//! Process-wide configuration, read from the environment (and `.env`).

use std::collections::BTreeSet;
use std::env;
use std::path::PathBuf;

use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Title for the generated document's `info` block.
    pub title: String,
    pub version: String,
    /// URLs for the document's `servers` list.
    pub servers: Vec<String>,
    pub include_tags: Option<BTreeSet<String>>,
    pub exclude_tags: Option<BTreeSet<String>>,
    /// Global serialize-by-alias default. Endpoint and request-scoped
    /// overrides take precedence.
    pub serialize_by_alias: bool,
    /// Where the schema file command writes the document.
    pub schema_path: Option<PathBuf>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            title: "API overview".to_string(),
            version: "0.0.1".to_string(),
            servers: Vec::new(),
            include_tags: None,
            exclude_tags: None,
            serialize_by_alias: false,
            schema_path: None,
        }
    }
}

impl ApiConfig {
    /// Loads configuration from the environment. Unset variables keep their
    /// defaults.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        let mut config = Self::default();
        if let Ok(title) = env::var("API_SCHEMA_TITLE") {
            config.title = title;
        }
        if let Ok(version) = env::var("API_SCHEMA_VERSION") {
            config.version = version;
        }
        if let Ok(servers) = env::var("API_SCHEMA_SERVERS") {
            config.servers = split_list(&servers);
        }
        if let Ok(tags) = env::var("API_SCHEMA_INCLUDE_TAGS") {
            config.include_tags = Some(split_list(&tags).into_iter().collect());
        }
        if let Ok(tags) = env::var("API_SCHEMA_EXCLUDE_TAGS") {
            config.exclude_tags = Some(split_list(&tags).into_iter().collect());
        }
        if let Ok(raw) = env::var("API_SERIALIZE_BY_ALIAS") {
            config.serialize_by_alias = parse_bool("API_SERIALIZE_BY_ALIAS", &raw)?;
        }
        if let Ok(path) = env::var("API_SCHEMA_PATH") {
            config.schema_path = Some(PathBuf::from(path));
        }
        if env::var("API_SCHEMA_IGNORED_RESOLVERS").is_ok() {
            tracing::warn!("API_SCHEMA_IGNORED_RESOLVERS is deprecated and has no effect");
        }
        Ok(config)
    }

    /// Builds the tag filter for schema generation. Declaring both an
    /// include-set and an exclude-set is a configuration error, reported
    /// here so it surfaces when the document is generated.
    pub fn tag_filter(&self) -> Result<TagFilter> {
        match (&self.include_tags, &self.exclude_tags) {
            (Some(_), Some(_)) => Err(Error::Config(
                "include_tags and exclude_tags are mutually exclusive".to_string(),
            )),
            (Some(include), None) => Ok(TagFilter::Include(include.clone())),
            (None, Some(exclude)) => Ok(TagFilter::Exclude(exclude.clone())),
            (None, None) => Ok(TagFilter::All),
        }
    }
}

fn parse_bool(name: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(Error::Config(format!(
            "{name} must be a boolean, got `{other}`"
        ))),
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}

/// Decides which endpoints make it into the generated document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagFilter {
    All,
    Include(BTreeSet<String>),
    Exclude(BTreeSet<String>),
}

impl TagFilter {
    /// Endpoints without tags are always included.
    pub fn allows(&self, tags: &[String]) -> bool {
        if tags.is_empty() {
            return true;
        }
        match self {
            TagFilter::All => true,
            TagFilter::Include(include) => tags.iter().any(|tag| include.contains(tag)),
            TagFilter::Exclude(exclude) => !tags.iter().any(|tag| exclude.contains(tag)),
        }
    }
}
