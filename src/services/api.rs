//! HTTP client for the VPass backend
//!
//! Every backend call goes through [`ApiClient`], which builds URLs from the
//! configured base, attaches the bearer token of the current session and
//! folds transport, status and decoding failures into [`ApiError`].

use std::sync::{Arc, RwLock};
use std::time::Duration;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::config::settings::Settings;
use crate::utils::errors::{ApiError, VpassError, Result};
use crate::utils::helpers::generate_uuid;
use crate::utils::logging::log_api_error;

const REQUEST_ID_HEADER: &str = "X-Request-ID";

/// Shared HTTP client bound to one backend
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Arc<RwLock<Option<String>>>,
}

impl ApiClient {
    /// Create a new ApiClient instance
    pub fn new(settings: &Settings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.api.timeout_seconds))
            .user_agent(settings.api.user_agent.clone())
            .build()
            .map_err(VpassError::Http)?;

        // Parse once so a bad base URL fails at construction
        Url::parse(&settings.api.base_url)?;

        Ok(Self {
            client,
            base_url: settings.api.base_url.trim_end_matches('/').to_string(),
            token: Arc::new(RwLock::new(None)),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Use `token` as bearer credential for subsequent requests
    pub fn set_token(&self, token: Option<String>) {
        let mut guard = self.token.write().unwrap_or_else(|e| e.into_inner());
        *guard = token;
    }

    pub fn has_token(&self) -> bool {
        self.token.read().unwrap_or_else(|e| e.into_inner()).is_some()
    }

    fn current_token(&self) -> Option<String> {
        self.token.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Absolute URL for an API path such as `/api/events/`
    pub fn url(&self, path: &str) -> Result<Url> {
        Ok(Url::parse(&format!("{}{}", self.base_url, path))?)
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let url = self.url(path)?;
        let mut builder = self.client.request(method, url);
        if let Some(token) = self.current_token() {
            builder = builder.bearer_auth(token);
        }
        Ok(builder)
    }

    /// `GET` and decode a JSON body
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.execute(self.request(Method::GET, path)?, "GET", path).await?;
        decode_json(response).await
    }

    /// `GET` a binary body
    pub async fn get_bytes(&self, path: &str) -> Result<Vec<u8>> {
        let response = self.execute(self.request(Method::GET, path)?, "GET", path).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::MalformedResponse(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    /// `POST` a JSON body and decode the JSON answer
    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let builder = self.request(Method::POST, path)?.json(body);
        let response = self.execute(builder, "POST", path).await?;
        decode_json(response).await
    }

    /// `POST` without a body and decode the JSON answer
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let builder = self
            .request(Method::POST, path)?
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        let response = self.execute(builder, "POST", path).await?;
        decode_json(response).await
    }

    /// `POST` a JSON body, ignoring whatever the backend answers
    pub async fn post_discard<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<()> {
        let builder = self.request(Method::POST, path)?.json(body);
        self.execute(builder, "POST", path).await?;
        Ok(())
    }

    /// `PUT` a JSON body and decode the JSON answer
    pub async fn put_json<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let builder = self.request(Method::PUT, path)?.json(body);
        let response = self.execute(builder, "PUT", path).await?;
        decode_json(response).await
    }

    /// `DELETE`; the backend answers with an empty body
    pub async fn delete(&self, path: &str) -> Result<()> {
        self.execute(self.request(Method::DELETE, path)?, "DELETE", path).await?;
        Ok(())
    }

    async fn execute(&self, builder: RequestBuilder, method: &str, path: &str) -> Result<Response> {
        let request_id = generate_uuid();
        debug!(method = method, path = path, request_id = %request_id, "Sending API request");

        let response = builder
            .header(REQUEST_ID_HEADER, &request_id)
            .send()
            .await
            .map_err(|e| {
                let err = if e.is_timeout() {
                    ApiError::Timeout
                } else {
                    ApiError::Network(e.to_string())
                };
                log_api_error(path, &err.to_string(), Some(method));
                err
            })?;

        let status = response.status();
        if status.is_success() {
            debug!(method = method, path = path, status = status.as_u16(), "API request succeeded");
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let detail = extract_detail(&body);
        warn!(
            method = method,
            path = path,
            status = status.as_u16(),
            detail = ?detail,
            request_id = %request_id,
            "API request rejected"
        );

        let err = if status == StatusCode::UNAUTHORIZED {
            ApiError::Unauthorized { detail }
        } else {
            ApiError::Server { status: status.as_u16(), detail }
        };
        Err(err.into())
    }
}

async fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let bytes = response
        .bytes()
        .await
        .map_err(|e| ApiError::MalformedResponse(e.to_string()))?;

    serde_json::from_slice(&bytes).map_err(|e| ApiError::MalformedResponse(e.to_string()).into())
}

/// Pull a human readable message out of an error body.
///
/// Understands `{"detail": ..}`, `{"error": ..}` and field validation maps
/// such as `{"email": ["This field is required."]}`.
pub fn extract_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let object = value.as_object()?;

    for key in ["detail", "error", "message"] {
        if let Some(text) = object.get(key).and_then(|v| v.as_str()) {
            return Some(text.to_string());
        }
    }

    if let Some(first) = object
        .get("non_field_errors")
        .and_then(|v| v.as_array())
        .and_then(|errors| errors.first())
        .and_then(|v| v.as_str())
    {
        return Some(first.to_string());
    }

    object.iter().find_map(|(field, messages)| {
        let message = match messages {
            serde_json::Value::String(s) => Some(s.as_str()),
            serde_json::Value::Array(items) => items.first().and_then(|v| v.as_str()),
            _ => None,
        }?;
        Some(format!("{}: {}", field, message))
    })
}
