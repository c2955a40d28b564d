use crate::agent::KaggleAgent;

use serde::Deserialize;
use serde_json::{ json, Value as JsonValue };
use std::error::Error;
use std::fmt;
use std::path::PathBuf;

#[derive(Deserialize, Debug, Clone)]
pub struct ToolCall {
    pub name: String,
    #[serde(default)]
    pub arguments: JsonValue,
}

#[derive(Debug)]
pub enum ResourceError {
    UnsupportedUri(String),
    Upstream(String),
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceError::UnsupportedUri(uri) => {
                write!(f, "unsupported resource URI '{}': expected kaggle://competitions/{{id}}", uri)
            }
            ResourceError::Upstream(detail) => write!(f, "{}", detail),
        }
    }
}

impl Error for ResourceError {}

pub fn list_tools() -> JsonValue {
    json!({
        "tools": [
            {
                "name": "search_kaggle_datasets",
                "description": "Search Kaggle for datasets matching a query string",
                "parameters": {
                    "query": "search terms (required)"
                }
            },
            {
                "name": "download_kaggle_dataset",
                "description": "Download a Kaggle dataset and unzip it locally",
                "parameters": {
                    "dataset_ref": "owner/dataset-name (required)",
                    "download_path": "target directory (optional, defaults to datasets/<name>)"
                }
            }
        ]
    })
}

/// Dispatches a tool call by name. Failures are reported in-band as an
/// `error` field rather than a transport error.
pub async fn call_tool(agent: &KaggleAgent, call: &ToolCall) -> JsonValue {
    match call.name.as_str() {
        "search_kaggle_datasets" => {
            let Some(query) = call.arguments.get("query").and_then(JsonValue::as_str) else {
                return json!({ "error": "search_kaggle_datasets requires a 'query' argument" });
            };
            match agent.search_datasets(query).await {
                Ok(results) => results,
                Err(e) => json!({ "error": e.to_string() }),
            }
        }
        "download_kaggle_dataset" => {
            let Some(dataset_ref) = call.arguments
                .get("dataset_ref")
                .and_then(JsonValue::as_str) else {
                return json!({ "error": "download_kaggle_dataset requires a 'dataset_ref' argument" });
            };
            let download_path = call.arguments
                .get("download_path")
                .and_then(JsonValue::as_str)
                .map(PathBuf::from);

            match agent.download_dataset(dataset_ref, download_path.as_deref()).await {
                Ok((path, files)) =>
                    json!({
                        "dataset": dataset_ref,
                        "path": path.display().to_string(),
                        "files": files,
                    }),
                Err(e) => json!({ "error": e.to_string() }),
            }
        }
        other => json!({ "error": format!("unknown tool '{}'", other) }),
    }
}

/// Resolves a `kaggle://competitions/{id}` URI to a text block.
pub async fn read_resource(agent: &KaggleAgent, uri: &str) -> Result<String, ResourceError> {
    let Some(id) = uri.strip_prefix("kaggle://competitions/") else {
        return Err(ResourceError::UnsupportedUri(uri.to_string()));
    };
    if id.is_empty() || id.contains('/') {
        return Err(ResourceError::UnsupportedUri(uri.to_string()));
    }

    let info = agent
        .competition_info(id).await
        .map_err(|e| ResourceError::Upstream(e.to_string()))?;

    let field = |key: &str| {
        info.get(key)
            .and_then(JsonValue::as_str)
            .unwrap_or("unknown")
            .to_string()
    };
    let teams = info
        .get("teamCount")
        .and_then(JsonValue::as_u64)
        .map(|n| n.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    Ok(
        format!(
            "Competition: {}\nCategory: {}\nDeadline: {}\nReward: {}\nTeams: {}\n\n{}",
            field("title"),
            field("category"),
            field("deadline"),
            field("reward"),
            teams,
            field("description")
        )
    )
}

/// Deterministic exploratory-analysis prompt for a dataset.
pub fn explore_dataset_prompt(dataset_ref: &str) -> String {
    format!(
        "Perform an exploratory analysis of the Kaggle dataset '{}'.\n\n\
        1. Download the dataset with the download_kaggle_dataset tool.\n\
        2. List the extracted files and note their formats and sizes.\n\
        3. For tabular files, summarize the columns, data types and missing values.\n\
        4. Report notable distributions, correlations and outliers.\n\
        5. Suggest follow-up questions this data could answer.",
        dataset_ref
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kaggle::testing::StaticApi;
    use std::path::PathBuf;
    use std::sync::Arc;

    fn agent() -> KaggleAgent {
        KaggleAgent::new(Arc::new(StaticApi::ok()), PathBuf::from("datasets"), 10, 5)
    }

    fn call(name: &str, arguments: JsonValue) -> ToolCall {
        ToolCall { name: name.to_string(), arguments }
    }

    #[tokio::test]
    async fn search_tool_returns_result_rows() {
        let result = call_tool(
            &agent(),
            &call("search_kaggle_datasets", json!({"query": "weather"}))
        ).await;
        assert!(result.get("error").is_none());
        assert_eq!(result["results"][0]["ref"], "owner/weather");
    }

    #[tokio::test]
    async fn search_tool_requires_query_argument() {
        let result = call_tool(&agent(), &call("search_kaggle_datasets", json!({}))).await;
        assert!(result["error"].as_str().unwrap().contains("query"));
    }

    #[tokio::test]
    async fn unknown_tool_is_reported_in_band() {
        let result = call_tool(&agent(), &call("make_coffee", json!({}))).await;
        assert_eq!(result["error"], "unknown tool 'make_coffee'");
    }

    #[tokio::test]
    async fn download_tool_reports_path_and_files() {
        let dir = tempfile::tempdir().unwrap();
        let result = call_tool(
            &agent(),
            &call(
                "download_kaggle_dataset",
                json!({
                    "dataset_ref": "heptapod/titanic",
                    "download_path": dir.path().to_str().unwrap(),
                })
            )
        ).await;

        assert!(result.get("error").is_none(), "got {}", result);
        assert_eq!(result["dataset"], "heptapod/titanic");
        assert_eq!(result["path"], dir.path().to_str().unwrap());
        assert_eq!(result["files"][0], "train.csv");
    }

    #[tokio::test]
    async fn download_tool_reports_malformed_ref_in_band() {
        let result = call_tool(
            &agent(),
            &call("download_kaggle_dataset", json!({"dataset_ref": "titanic"}))
        ).await;
        assert!(result["error"].as_str().unwrap().contains("invalid dataset reference"));
    }

    #[tokio::test]
    async fn competition_resource_renders_text_block() {
        let text = read_resource(&agent(), "kaggle://competitions/titanic").await.unwrap();
        assert!(text.starts_with("Competition: Titanic"));
        assert!(text.contains("Category: Getting Started"));
        assert!(text.contains("Predict survival"));
    }

    #[tokio::test]
    async fn malformed_resource_uri_is_rejected() {
        for uri in ["kaggle://datasets/x", "kaggle://competitions/", "kaggle://competitions/a/b"] {
            let err = read_resource(&agent(), uri).await.unwrap_err();
            assert!(matches!(err, ResourceError::UnsupportedUri(_)), "accepted {}", uri);
        }
    }

    #[test]
    fn explore_prompt_mentions_the_dataset() {
        let prompt = explore_dataset_prompt("owner/weather");
        assert!(prompt.contains("'owner/weather'"));
        assert!(prompt.contains("download_kaggle_dataset"));
    }

    #[test]
    fn tool_listing_names_both_tools() {
        let listing = list_tools();
        let names: Vec<&str> = listing["tools"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["search_kaggle_datasets", "download_kaggle_dataset"]);
    }
}
