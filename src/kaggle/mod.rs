pub mod download;
pub mod http;

use async_trait::async_trait;
use chrono::{ DateTime, Utc };
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

use crate::cli::Args;
use self::http::HttpKaggleApi;

#[derive(Debug, Error)]
pub enum KaggleError {
    #[error("invalid dataset reference '{0}': expected 'owner/dataset-name'")]
    InvalidRef(String),
    #[error("Kaggle credentials are not configured (set KAGGLE_USERNAME and KAGGLE_KEY)")]
    MissingCredentials,
    #[error("competition '{0}' not found")]
    CompetitionNotFound(String),
    #[error("Kaggle API request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid authorization header: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
}

/// An `owner/dataset-name` pair, the form Kaggle uses everywhere.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatasetRef {
    pub owner: String,
    pub slug: String,
}

impl FromStr for DatasetRef {
    type Err = KaggleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((owner, slug))
                if !owner.is_empty() && !slug.is_empty() && !slug.contains('/') => {
                Ok(Self { owner: owner.to_string(), slug: slug.to_string() })
            }
            _ => Err(KaggleError::InvalidRef(s.to_string())),
        }
    }
}

impl fmt::Display for DatasetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.slug)
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DatasetSummary {
    #[serde(rename = "ref")]
    pub dataset_ref: String,
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub total_bytes: Option<u64>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub download_count: Option<u64>,
    #[serde(default)]
    pub usability_rating: Option<f64>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DatasetFile {
    pub name: String,
    #[serde(default)]
    pub total_bytes: Option<u64>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CompetitionInfo {
    #[serde(rename = "ref")]
    pub competition_ref: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub reward: Option<String>,
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub team_count: Option<u64>,
}

/// The upstream operations the handlers need, one method per API call.
#[async_trait]
pub trait KaggleApi: Send + Sync {
    async fn dataset_list(&self, search: &str) -> Result<Vec<DatasetSummary>, KaggleError>;

    async fn dataset_view(&self, dataset: &DatasetRef) -> Result<DatasetSummary, KaggleError>;

    async fn dataset_list_files(
        &self,
        dataset: &DatasetRef
    ) -> Result<Vec<DatasetFile>, KaggleError>;

    /// Returns the dataset archive (a zip) as raw bytes.
    async fn dataset_download(&self, dataset: &DatasetRef) -> Result<Vec<u8>, KaggleError>;

    async fn competition_view(&self, name: &str) -> Result<CompetitionInfo, KaggleError>;
}

pub fn new_client(args: &Args) -> Result<Arc<dyn KaggleApi>, KaggleError> {
    let client = HttpKaggleApi::from_args(args)?;
    Ok(Arc::new(client))
}

/// Human-readable byte count, the way the upstream UI reports dataset sizes.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];
    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64;
    let mut unit = "B";
    for next in UNITS {
        if value < 1024.0 {
            break;
        }
        value /= 1024.0;
        unit = next;
    }
    format!("{:.1} {}", value, unit)
}
