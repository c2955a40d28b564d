use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use async_trait::async_trait;
use reqwest::{ Client as HttpClient, header::{ HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION } };
use serde::Deserialize;
use std::time::Duration;

use super::{
    CompetitionInfo,
    DatasetFile,
    DatasetRef,
    DatasetSummary,
    KaggleApi,
    KaggleError,
};
use crate::cli::Args;

/// Client for the Kaggle public REST API using HTTP Basic authentication.
#[derive(Debug)]
pub struct HttpKaggleApi {
    http: HttpClient,
    base_url: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DatasetFilesResponse {
    #[serde(default)]
    dataset_files: Vec<DatasetFile>,
}

impl HttpKaggleApi {
    pub fn new(
        username: &str,
        key: &str,
        base_url: &str,
        timeout_secs: u64
    ) -> Result<Self, KaggleError> {
        if username.is_empty() || key.is_empty() {
            return Err(KaggleError::MissingCredentials);
        }

        let token = BASE64.encode(format!("{}:{}", username, key));
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Basic {}", token))?);

        let http = HttpClient::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_args(args: &Args) -> Result<Self, KaggleError> {
        Self::new(
            &args.kaggle_username,
            &args.kaggle_key,
            &args.kaggle_base_url,
            args.request_timeout_secs,
        )
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl KaggleApi for HttpKaggleApi {
    async fn dataset_list(&self, search: &str) -> Result<Vec<DatasetSummary>, KaggleError> {
        let results = self.http
            .get(self.url("/datasets/list"))
            .query(&[("search", search)])
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<DatasetSummary>>()
            .await?;
        Ok(results)
    }

    async fn dataset_view(&self, dataset: &DatasetRef) -> Result<DatasetSummary, KaggleError> {
        let info = self.http
            .get(self.url(&format!("/datasets/view/{}/{}", dataset.owner, dataset.slug)))
            .send()
            .await?
            .error_for_status()?
            .json::<DatasetSummary>()
            .await?;
        Ok(info)
    }

    async fn dataset_list_files(
        &self,
        dataset: &DatasetRef
    ) -> Result<Vec<DatasetFile>, KaggleError> {
        let response = self.http
            .get(self.url(&format!("/datasets/list/{}/{}", dataset.owner, dataset.slug)))
            .send()
            .await?
            .error_for_status()?
            .json::<DatasetFilesResponse>()
            .await?;
        Ok(response.dataset_files)
    }

    async fn dataset_download(&self, dataset: &DatasetRef) -> Result<Vec<u8>, KaggleError> {
        let bytes = self.http
            .get(self.url(&format!("/datasets/download/{}/{}", dataset.owner, dataset.slug)))
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        Ok(bytes.to_vec())
    }

    async fn competition_view(&self, name: &str) -> Result<CompetitionInfo, KaggleError> {
        // No dedicated view endpoint on the public surface; search and match.
        let entries = self.http
            .get(self.url("/competitions/list"))
            .query(&[("search", name)])
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<CompetitionInfo>>()
            .await?;

        entries
            .iter()
            .find(|c| ref_matches(&c.competition_ref, name))
            .or_else(|| entries.first())
            .cloned()
            .ok_or_else(|| KaggleError::CompetitionNotFound(name.to_string()))
    }
}

// Newer API versions return URL-style refs such as
// "https://www.kaggle.com/competitions/titanic".
fn ref_matches(candidate: &str, wanted: &str) -> bool {
    if candidate.eq_ignore_ascii_case(wanted) {
        return true;
    }
    candidate
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .map(|tail| tail.eq_ignore_ascii_case(wanted))
        .unwrap_or(false)
}
