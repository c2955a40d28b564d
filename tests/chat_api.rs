//! Drives the HTTP router end to end against a canned upstream.

use async_trait::async_trait;
use axum::body::{ to_bytes, Body };
use axum::http::{ header, Request, StatusCode };
use axum::Router;
use kaggle_bridge::agent::KaggleAgent;
use kaggle_bridge::kaggle::{
    CompetitionInfo,
    DatasetFile,
    DatasetRef,
    DatasetSummary,
    KaggleApi,
    KaggleError,
};
use serde_json::{ json, Value as JsonValue };
use std::io::{ Cursor, Write };
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceExt;

struct CannedApi;

fn archive_fixture() -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    {
        let mut writer = zip::ZipWriter::new(&mut buffer);
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored);
        writer.start_file("train.csv", options).unwrap();
        writer.write_all(b"name,age\nAda,36\n").unwrap();
        writer.finish().unwrap();
    }
    buffer.into_inner()
}

#[async_trait]
impl KaggleApi for CannedApi {
    async fn dataset_list(&self, search: &str) -> Result<Vec<DatasetSummary>, KaggleError> {
        Ok(
            vec![DatasetSummary {
                dataset_ref: format!("owner/{}", search),
                title: "Weather History".to_string(),
                subtitle: Some("Daily readings".to_string()),
                total_bytes: Some(1 << 20),
                last_updated: None,
                download_count: Some(42),
                usability_rating: Some(0.88),
            }]
        )
    }

    async fn dataset_view(&self, dataset: &DatasetRef) -> Result<DatasetSummary, KaggleError> {
        Ok(DatasetSummary {
            dataset_ref: dataset.to_string(),
            title: "Titanic".to_string(),
            subtitle: None,
            total_bytes: Some(2048),
            last_updated: None,
            download_count: Some(7),
            usability_rating: None,
        })
    }

    async fn dataset_list_files(
        &self,
        _dataset: &DatasetRef
    ) -> Result<Vec<DatasetFile>, KaggleError> {
        Ok(vec![DatasetFile { name: "train.csv".to_string(), total_bytes: Some(1024) }])
    }

    async fn dataset_download(&self, _dataset: &DatasetRef) -> Result<Vec<u8>, KaggleError> {
        Ok(archive_fixture())
    }

    async fn competition_view(&self, name: &str) -> Result<CompetitionInfo, KaggleError> {
        Ok(CompetitionInfo {
            competition_ref: name.to_string(),
            title: "Titanic - Machine Learning from Disaster".to_string(),
            description: Some("Predict survival on the Titanic".to_string()),
            category: Some("Getting Started".to_string()),
            reward: Some("Knowledge".to_string()),
            deadline: None,
            team_count: Some(15000),
        })
    }
}

fn test_router() -> Router {
    let agent = KaggleAgent::new(Arc::new(CannedApi), PathBuf::from("datasets"), 10, 5);
    kaggle_bridge::server::api::build_router(Arc::new(agent))
}

async fn body_json(response: axum::response::Response) -> JsonValue {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, body: JsonValue) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn root_reports_liveness() {
    let response = test_router()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap()).await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Kaggle bridge server is running");
}

#[tokio::test]
async fn chat_search_returns_envelope_with_usage() {
    let request = post_json(
        "/v1/chat/completions",
        json!({
            "messages": [{
                "role": "user",
                "content": "Search for datasets about machine learning",
                "context": {"query": "machine learning"}
            }],
            "max_tokens": 1000
        })
    );

    let response = test_router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["message"]["role"], "assistant");
    assert_eq!(
        body["message"]["content"],
        "Here are the search results for 'machine learning'."
    );
    assert_eq!(body["message"]["context"]["results"][0]["ref"], "owner/machine learning");

    let usage = &body["usage"];
    assert_eq!(
        usage["total_tokens"].as_u64().unwrap(),
        usage["prompt_tokens"].as_u64().unwrap() + usage["completion_tokens"].as_u64().unwrap()
    );
}

#[tokio::test]
async fn chat_without_user_message_is_bad_request() {
    let request = post_json(
        "/v1/chat/completions",
        json!({
            "messages": [{"role": "assistant", "content": "hello"}]
        })
    );

    let response = test_router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["detail"], "No user message found in the request");
}

#[tokio::test]
async fn chat_without_recognized_intent_returns_help() {
    let request = post_json(
        "/v1/chat/completions",
        json!({
            "messages": [{"role": "user", "content": "what can you do?"}]
        })
    );

    let response = test_router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let content = body["message"]["content"].as_str().unwrap();
    assert!(content.starts_with("I can help you interact with Kaggle"));
    assert_eq!(body["message"]["context"], json!({}));
}

#[tokio::test]
async fn tool_listing_and_dispatch_work_over_http() {
    let response = test_router()
        .oneshot(Request::builder().uri("/v1/tools").body(Body::empty()).unwrap()).await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let listing = body_json(response).await;
    assert_eq!(listing["tools"][0]["name"], "search_kaggle_datasets");

    let call = post_json(
        "/v1/tools/call",
        json!({"name": "search_kaggle_datasets", "arguments": {"query": "covid"}})
    );
    let response = test_router().oneshot(call).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["results"][0]["ref"], "owner/covid");
}

#[tokio::test]
async fn unknown_tool_errors_in_band() {
    let call = post_json("/v1/tools/call", json!({"name": "nope", "arguments": {}}));
    let response = test_router().oneshot(call).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["error"], "unknown tool 'nope'");
}

#[tokio::test]
async fn competition_resource_is_served_as_text() {
    let response = test_router()
        .oneshot(
            Request::builder()
                .uri("/v1/resources?uri=kaggle://competitions/titanic")
                .body(Body::empty())
                .unwrap()
        ).await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.starts_with("Competition: Titanic"));
    assert!(text.contains("Teams: 15000"));
}

#[tokio::test]
async fn malformed_resource_uri_is_bad_request() {
    let response = test_router()
        .oneshot(
            Request::builder()
                .uri("/v1/resources?uri=kaggle://datasets/titanic")
                .body(Body::empty())
                .unwrap()
        ).await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["detail"].as_str().unwrap().contains("unsupported resource URI"));
}

#[tokio::test]
async fn explore_prompt_mentions_dataset_ref() {
    let response = test_router()
        .oneshot(
            Request::builder()
                .uri("/v1/prompts/explore-dataset?dataset_ref=owner/weather")
                .body(Body::empty())
                .unwrap()
        ).await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("'owner/weather'"));
}
