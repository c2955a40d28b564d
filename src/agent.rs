use crate::cli::Args;
use crate::kaggle::{ self, format_size, DatasetRef, KaggleApi, KaggleError };
use crate::kaggle::download::{ extract_archive, resolve_download_path, sample_from_archive };
use crate::models::chat::{ ChatMessage, ChatRequest, ChatResponse, Usage };

use log::info;
use serde_json::{ json, Value as JsonValue };
use std::error::Error;
use std::fmt;
use std::path::{ Path, PathBuf };
use std::sync::Arc;

const HELP_MESSAGE: &str =
    "I can help you interact with Kaggle. Please provide context in your request:\n\
    - For dataset info: Include 'dataset_name' in the context\n\
    - For competition info: Include 'competition_name' in the context\n\
    - For search: Include 'query' in the context";

#[derive(Debug)]
pub enum AgentError {
    NoUserMessage,
    Upstream(String),
}

impl fmt::Display for AgentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentError::NoUserMessage => write!(f, "No user message found in the request"),
            AgentError::Upstream(detail) => write!(f, "{}", detail),
        }
    }
}

impl Error for AgentError {}

fn upstream(action: &str, err: impl fmt::Display) -> AgentError {
    AgentError::Upstream(format!("Error processing {}: {}", action, err))
}

/// Routes chat intents to the Kaggle wrapper handlers.
#[derive(Clone)]
pub struct KaggleAgent {
    api: Arc<dyn KaggleApi>,
    download_dir: PathBuf,
    search_limit: usize,
    sample_rows: usize,
}

impl KaggleAgent {
    pub fn new(
        api: Arc<dyn KaggleApi>,
        download_dir: PathBuf,
        search_limit: usize,
        sample_rows: usize
    ) -> Self {
        Self { api, download_dir, search_limit, sample_rows }
    }

    pub fn from_args(args: &Args) -> Result<Self, KaggleError> {
        let api = kaggle::new_client(args)?;
        Ok(
            Self::new(
                api,
                PathBuf::from(&args.download_dir),
                args.search_limit,
                args.sample_rows
            )
        )
    }

    /// Routes the latest user message to a handler by substring sniffing on
    /// the content combined with the required context key, and wraps the
    /// result in the response envelope.
    pub async fn handle_chat(&self, request: &ChatRequest) -> Result<ChatResponse, AgentError> {
        let latest = request.messages
            .iter()
            .rev()
            .find(|m| m.role == "user")
            .ok_or(AgentError::NoUserMessage)?;

        let content = latest.content.to_lowercase();
        let empty = json!({});
        let ctx = latest.context.as_ref().unwrap_or(&empty);
        let query = ctx.get("query").and_then(JsonValue::as_str);
        let dataset_name = ctx.get("dataset_name").and_then(JsonValue::as_str);
        let competition_name = ctx.get("competition_name").and_then(JsonValue::as_str);

        let (message, response_context) = if
            let (true, Some(query)) = (content.contains("search"), query)
        {
            (
                format!("Here are the search results for '{}'.", query),
                self.search_datasets(query).await?,
            )
        } else if let (true, Some(name)) = (content.contains("dataset"), dataset_name) {
            let include_sample = ctx
                .get("include_sample")
                .and_then(JsonValue::as_bool)
                .unwrap_or(false);
            (
                format!("Here is the information for dataset '{}'.", name),
                self.dataset_info(name, include_sample).await?,
            )
        } else if let (true, Some(name)) = (content.contains("competition"), competition_name) {
            (
                format!("Here is the information for competition '{}'.", name),
                self.competition_info(name).await?,
            )
        } else {
            (HELP_MESSAGE.to_string(), json!({}))
        };

        let usage = Usage::estimate(&request.messages, &message);
        Ok(ChatResponse {
            message: ChatMessage::assistant(message, response_context),
            usage,
        })
    }

    pub async fn search_datasets(&self, query: &str) -> Result<JsonValue, AgentError> {
        let results = self.api
            .dataset_list(query).await
            .map_err(|e| upstream("search", e))?;

        let rows: Vec<JsonValue> = results
            .iter()
            .take(self.search_limit)
            .map(|ds|
                json!({
                    "ref": ds.dataset_ref,
                    "title": ds.title,
                    "subtitle": ds.subtitle,
                    "download_count": ds.download_count,
                    "last_updated": ds.last_updated.map(|t| t.to_rfc3339()),
                    "usability_rating": ds.usability_rating,
                })
            )
            .collect();

        Ok(json!({ "results": rows }))
    }

    pub async fn dataset_info(
        &self,
        name: &str,
        include_sample: bool
    ) -> Result<JsonValue, AgentError> {
        let dataset: DatasetRef = name.parse().map_err(|e| upstream("dataset info", e))?;
        let info = self.api
            .dataset_view(&dataset).await
            .map_err(|e| upstream("dataset info", e))?;
        let files = self.api
            .dataset_list_files(&dataset).await
            .map_err(|e| upstream("dataset info", e))?;

        let mut payload = json!({
            "title": info.title,
            "size": info.total_bytes.map(format_size),
            "lastUpdated": info.last_updated.map(|t| t.to_rfc3339()),
            "downloadCount": info.download_count,
            "files": files
                .iter()
                .map(|f| json!({ "name": f.name, "size": f.total_bytes }))
                .collect::<Vec<_>>(),
        });

        if include_sample {
            let archive = self.api
                .dataset_download(&dataset).await
                .map_err(|e| upstream("dataset info", e))?;
            let sample = sample_from_archive(&archive, self.sample_rows).map_err(|e|
                upstream("dataset info", e)
            )?;
            payload["sample_data"] = JsonValue::Array(sample.unwrap_or_default());
        }

        Ok(payload)
    }

    pub async fn competition_info(&self, name: &str) -> Result<JsonValue, AgentError> {
        let info = self.api
            .competition_view(name).await
            .map_err(|e| upstream("competition info", e))?;

        Ok(
            json!({
                "title": info.title,
                "category": info.category,
                "deadline": info.deadline.map(|t| t.to_rfc3339()),
                "reward": info.reward,
                "teamCount": info.team_count,
                "description": info.description,
            })
        )
    }

    /// Downloads and unzips a dataset, returning the destination and the
    /// extracted file names.
    pub async fn download_dataset(
        &self,
        dataset_ref: &str,
        download_path: Option<&Path>
    ) -> Result<(PathBuf, Vec<String>), AgentError> {
        let dataset: DatasetRef = dataset_ref.parse().map_err(|e| upstream("download", e))?;
        let dest = resolve_download_path(&self.download_dir, &dataset, download_path);

        info!("Downloading dataset {} into {}", dataset, dest.display());
        let archive = self.api
            .dataset_download(&dataset).await
            .map_err(|e| upstream("download", e))?;
        let files = extract_archive(&archive, &dest).map_err(|e| upstream("download", e))?;
        Ok((dest, files))
    }
}
