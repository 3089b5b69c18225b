//! # API Client
//!
//! Native HTTP client for the SuperMaya backend.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Instant;

use super::endpoints;
use super::{
    error_message, Attachment, ChatBackend, HistoryPage, Interaction, InteractionId,
    LoginResponse, QueryResponse, RegisterRequest, TextQueryRequest, UserProfile,
};
use crate::error::{ClientError, ClientResult};
use crate::session::TokenStore;

/// HTTP client holding the base URL and the token store.
///
/// The store is consulted on every request, so a login or logout elsewhere in
/// the process takes effect on the next call.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    tokens: Arc<dyn TokenStore + Send + Sync>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, tokens: Arc<dyn TokenStore + Send + Sync>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            tokens,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        endpoints::url(&self.base_url, path)
    }

    /// Attach `Authorization: Bearer` when a token is stored
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.tokens.load() {
            Some(token) => request.bearer_auth(token.as_str()),
            None => {
                tracing::debug!("No stored token, sending unauthenticated");
                request
            }
        }
    }

    /// Send a request and turn non-2xx answers into [`ClientError::Api`]
    async fn execute(&self, operation: &'static str, request: RequestBuilder) -> ClientResult<Response> {
        let start = Instant::now();

        let response = request.send().await.map_err(|e| {
            tracing::error!(operation, error = %e, "Request failed");
            if e.is_builder() {
                ClientError::Request(e.to_string())
            } else {
                ClientError::Network(e.to_string())
            }
        })?;

        let status = response.status();
        let duration_ms = start.elapsed().as_millis() as u64;

        if status.is_success() {
            tracing::info!(operation, status = status.as_u16(), duration_ms, "Request completed");
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body, status.canonical_reason().unwrap_or("Request failed"));
        tracing::error!(
            operation,
            status = status.as_u16(),
            error = %message,
            duration_ms,
            "Request rejected"
        );
        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn execute_json<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> ClientResult<T> {
        let response = self.execute(operation, request).await?;
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(operation, error = %e, "Unexpected response body");
            ClientError::Parse(e.to_string())
        })
    }
}

fn image_part(image: &Attachment) -> ClientResult<Part> {
    Part::bytes(image.bytes.clone())
        .file_name(image.file_name.clone())
        .mime_str(&image.content_type)
        .map_err(|e| ClientError::Request(format!("Invalid content type {}: {}", image.content_type, e)))
}

#[async_trait(?Send)]
impl ChatBackend for ApiClient {
    #[tracing::instrument(skip(self, password))]
    async fn register(&self, email: &str, password: &str) -> ClientResult<()> {
        let request = self
            .client
            .post(self.url(endpoints::REGISTER))
            .json(&RegisterRequest { email, password });

        self.execute("register", request).await?;
        Ok(())
    }

    #[tracing::instrument(skip(self, password))]
    async fn login(&self, email: &str, password: &str) -> ClientResult<LoginResponse> {
        let form = Form::new()
            .text("username", email.to_string())
            .text("password", password.to_string());
        let request = self.authorize(self.client.post(self.url(endpoints::TOKEN)).multipart(form));

        self.execute_json("login", request).await
    }

    async fn text_query(&self, query: &str) -> ClientResult<QueryResponse> {
        let request = self.authorize(
            self.client
                .post(self.url(endpoints::CHAT_TEXT))
                .json(&TextQueryRequest { user_query: query }),
        );

        self.execute_json("text_query", request).await
    }

    async fn image_query(&self, query: &str, image: &Attachment) -> ClientResult<QueryResponse> {
        let form = Form::new()
            .text("user_query", query.to_string())
            .part("image", image_part(image)?);
        let request = self.authorize(self.client.post(self.url(endpoints::CHAT_IMAGE)).multipart(form));

        tracing::debug!(file_name = %image.file_name, size = image.bytes.len(), "Uploading image");
        self.execute_json("image_query", request).await
    }

    async fn submit_feedback(&self, interaction_id: &InteractionId, is_good: bool) -> ClientResult<()> {
        let request = self.authorize(
            self.client
                .post(self.url(&endpoints::feedback(interaction_id, is_good))),
        );

        self.execute("submit_feedback", request).await?;
        Ok(())
    }

    async fn history(&self, page: HistoryPage) -> ClientResult<Vec<Interaction>> {
        let request = self.authorize(self.client.get(self.url(&endpoints::history(page))));
        self.execute_json("history", request).await
    }

    async fn profile(&self) -> ClientResult<UserProfile> {
        let request = self.authorize(self.client.get(self.url(endpoints::PROFILE)));
        self.execute_json("profile", request).await
    }

    async fn update_system_prompt(&self, prompt: &str) -> ClientResult<UserProfile> {
        let form = Form::new().text("prompt", prompt.to_string());
        let request = self.authorize(
            self.client
                .put(self.url(endpoints::SYSTEM_PROMPT))
                .multipart(form),
        );

        self.execute_json("update_system_prompt", request).await
    }
}
