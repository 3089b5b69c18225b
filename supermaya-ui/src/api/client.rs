//! HTTP API Client
//!
//! [`HttpBackend`] talks to the SuperMaya backend with gloo-net. The bearer token
//! is read from local storage on every call, so login and logout take effect
//! immediately.

use async_trait::async_trait;
use gloo_net::http::{Request, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use wasm_bindgen::JsValue;

use supermaya::api::{
    endpoints, error_message, Attachment, ChatBackend, HistoryPage, Interaction, InteractionId,
    LoginResponse, QueryResponse, RegisterRequest, TextQueryRequest, UserProfile,
    DEFAULT_API_BASE,
};
use supermaya::{ClientError, ClientResult, TokenStore};

use crate::state::storage::{local_storage, LocalStorageTokenStore};

/// Local storage key of the API base URL override
const API_URL_KEY: &str = "supermaya_api_url";

/// Get the API base URL from local storage or use default
pub fn get_api_base() -> String {
    let url = local_storage()
        .and_then(|storage| storage.get_item(API_URL_KEY).ok().flatten())
        .filter(|url| !url.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
    normalize_base(&url)
}

/// Set the API base URL in local storage
pub fn set_api_base(url: &str) {
    if let Some(storage) = local_storage() {
        let _ = storage.set_item(API_URL_KEY, &normalize_base(url));
    }
}

/// Trim whitespace and the trailing slash
fn normalize_base(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn log_error(operation: &str, error: &ClientError) {
    web_sys::console::error_1(&format!("{} failed: {}", operation, error).into());
}

#[derive(Debug, Clone, Default)]
pub struct HttpBackend {
    tokens: LocalStorageTokenStore,
}

impl HttpBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn url(path: &str) -> String {
        endpoints::url(&get_api_base(), path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.tokens.load() {
            Some(token) => request.header("Authorization", &format!("Bearer {}", token.as_str())),
            None => request,
        }
    }

    async fn execute(
        &self,
        operation: &'static str,
        request: Result<Request, gloo_net::Error>,
    ) -> ClientResult<Response> {
        let request = request.map_err(|e| {
            let error = ClientError::Request(e.to_string());
            log_error(operation, &error);
            error
        })?;

        let response = request.send().await.map_err(|e| {
            let error = ClientError::Network(e.to_string());
            log_error(operation, &error);
            error
        })?;

        if response.ok() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let error = ClientError::Api {
            status: response.status(),
            message: error_message(&body, &response.status_text()),
        };
        log_error(operation, &error);
        Err(error)
    }

    async fn execute_json<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: Result<Request, gloo_net::Error>,
    ) -> ClientResult<T> {
        let response = self.execute(operation, request).await?;
        response.json::<T>().await.map_err(|e| {
            let error = ClientError::Parse(e.to_string());
            log_error(operation, &error);
            error
        })
    }
}

/// Multipart body with text fields and an optional file field
fn form_data(fields: &[(&str, &str)], file: Option<(&str, &Attachment)>) -> ClientResult<web_sys::FormData> {
    let js_err = |e: JsValue| ClientError::Request(format!("{:?}", e));

    let form = web_sys::FormData::new().map_err(js_err)?;
    for (name, value) in fields {
        form.append_with_str(name, value).map_err(js_err)?;
    }

    if let Some((name, attachment)) = file {
        let bytes = js_sys::Uint8Array::from(attachment.bytes.as_slice());
        let parts = js_sys::Array::of1(&bytes);
        let options = web_sys::BlobPropertyBag::new();
        options.set_type(&attachment.content_type);
        let blob = web_sys::Blob::new_with_u8_array_sequence_and_options(&parts, &options)
            .map_err(js_err)?;
        form.append_with_blob_and_filename(name, &blob, &attachment.file_name)
            .map_err(js_err)?;
    }

    Ok(form)
}

#[async_trait(?Send)]
impl ChatBackend for HttpBackend {
    async fn register(&self, email: &str, password: &str) -> ClientResult<()> {
        let request = Request::post(&Self::url(endpoints::REGISTER))
            .json(&RegisterRequest { email, password });

        self.execute("register", request).await?;
        Ok(())
    }

    async fn login(&self, email: &str, password: &str) -> ClientResult<LoginResponse> {
        let form = form_data(&[("username", email), ("password", password)], None)?;
        let request = self
            .authorize(Request::post(&Self::url(endpoints::TOKEN)))
            .body(form);

        self.execute_json("login", request).await
    }

    async fn text_query(&self, query: &str) -> ClientResult<QueryResponse> {
        let request = self
            .authorize(Request::post(&Self::url(endpoints::CHAT_TEXT)))
            .json(&TextQueryRequest { user_query: query });

        self.execute_json("text_query", request).await
    }

    async fn image_query(&self, query: &str, image: &Attachment) -> ClientResult<QueryResponse> {
        let form = form_data(&[("user_query", query)], Some(("image", image)))?;
        let request = self
            .authorize(Request::post(&Self::url(endpoints::CHAT_IMAGE)))
            .body(form);

        self.execute_json("image_query", request).await
    }

    async fn submit_feedback(&self, interaction_id: &InteractionId, is_good: bool) -> ClientResult<()> {
        let request = self
            .authorize(
                Request::post(&Self::url(&endpoints::feedback(interaction_id, is_good))),
            )
            .build();

        self.execute("submit_feedback", request).await?;
        Ok(())
    }

    async fn history(&self, page: HistoryPage) -> ClientResult<Vec<Interaction>> {
        let request = self
            .authorize(Request::get(&Self::url(&endpoints::history(page))))
            .build();

        self.execute_json("history", request).await
    }

    async fn profile(&self) -> ClientResult<UserProfile> {
        let request = self
            .authorize(Request::get(&Self::url(endpoints::PROFILE)))
            .build();

        self.execute_json("profile", request).await
    }

    async fn update_system_prompt(&self, prompt: &str) -> ClientResult<UserProfile> {
        let form = form_data(&[("prompt", prompt)], None)?;
        let request = self
            .authorize(Request::put(&Self::url(endpoints::SYSTEM_PROMPT)))
            .body(form);

        self.execute_json("update_system_prompt", request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_base() {
        assert_eq!(normalize_base(" http://localhost:8000/ "), "http://localhost:8000");
        assert_eq!(normalize_base("https://maya.example.com"), "https://maya.example.com");
    }
}
