pub mod html;

use crate::models::chat::{ ChatMessage, ChatResponse };

use log::error;
use reqwest::Client as HttpClient;
use serde_json::json;
use std::error::Error;

/// Companion client for the chat endpoint. Keeps the conversation history
/// in memory and replays it with every request.
pub struct ChatApiClient {
    http: HttpClient,
    server_url: String,
    conversation_history: Vec<ChatMessage>,
}

impl ChatApiClient {
    pub fn new(server_url: impl Into<String>) -> Self {
        let server_url = server_url.into().trim_end_matches('/').to_string();
        Self {
            http: HttpClient::new(),
            server_url,
            conversation_history: Vec::new(),
        }
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.conversation_history
    }

    pub fn search_message(query: &str) -> ChatMessage {
        ChatMessage::user(
            format!("Search for datasets related to {}", query),
            json!({ "query": query })
        )
    }

    pub fn dataset_message(dataset_name: &str, include_sample: bool) -> ChatMessage {
        ChatMessage::user(
            format!("Tell me about the dataset {}", dataset_name),
            json!({ "dataset_name": dataset_name, "include_sample": include_sample })
        )
    }

    pub fn competition_message(competition_name: &str) -> ChatMessage {
        ChatMessage::user(
            format!("Give me information about the competition {}", competition_name),
            json!({ "competition_name": competition_name })
        )
    }

    pub async fn search_datasets(
        &mut self,
        query: &str
    ) -> Result<ChatResponse, Box<dyn Error + Send + Sync>> {
        self.send_request(Self::search_message(query)).await
    }

    pub async fn get_dataset_info(
        &mut self,
        dataset_name: &str,
        include_sample: bool
    ) -> Result<ChatResponse, Box<dyn Error + Send + Sync>> {
        self.send_request(Self::dataset_message(dataset_name, include_sample)).await
    }

    pub async fn get_competition_info(
        &mut self,
        competition_name: &str
    ) -> Result<ChatResponse, Box<dyn Error + Send + Sync>> {
        self.send_request(Self::competition_message(competition_name)).await
    }

    async fn send_request(
        &mut self,
        message: ChatMessage
    ) -> Result<ChatResponse, Box<dyn Error + Send + Sync>> {
        self.conversation_history.push(message);

        let payload = json!({
            "messages": self.conversation_history,
            "max_tokens": 1000,
        });

        let response = self.http
            .post(format!("{}/v1/chat/completions", self.server_url))
            .json(&payload)
            .send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("Chat request failed: {} - {}", status, body);
            return Err(format!("server returned {}: {}", status, body).into());
        }

        let parsed = response.json::<ChatResponse>().await?;
        self.conversation_history.push(parsed.message.clone());
        Ok(parsed)
    }
}
