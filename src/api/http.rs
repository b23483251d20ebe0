//! Backend client over HTTP/JSON
//!
//! Endpoints:
//! 1. Catalog: GET /movies, GET /tv_shows, GET /genres
//! 2. Auth: POST /login, POST /register
//! 3. Protected (bearer token): GET /recommended_movies, GET /recommended_tv_shows,
//!    GET /movie/{imdb_id}, GET /tv_shows/{imdb_id}
//!
//! The backend reports failures as `{"Error": "..."}` (sometimes lower-case `error`),
//! either with a non-2xx status or inside a 200 body.
use crate::{
    api::{
        request_id::{backend_span, RequestId, REQUEST_ID_HEADER},
        AuthApi, CatalogApi,
    },
    config::Config,
    error::{AppError, AppResult},
    models::{
        ApiMovie, ApiShow, CatalogItem, Category, ContentKind, Genre, LoginRequest, LoginResponse,
        RegisterRequest,
    },
};
use reqwest::{Client as HttpClient, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::Instrument;

#[derive(Clone, Debug)]
pub struct HttpBackend {
    http_client: HttpClient,
    api_url: String,
}

impl HttpBackend {
    /// Creates a backend client rooted at `api_url`
    pub fn new(api_url: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;
        let api_url = api_url.into().trim_end_matches('/').to_string();

        tracing::info!(api_url = %api_url, "Created backend client");

        Ok(Self {
            http_client,
            api_url,
        })
    }

    pub fn from_config(config: &Config) -> AppResult<Self> {
        Self::new(
            config.api_base_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path.trim_start_matches('/'))
    }

    /// Sends a request tagged with a fresh request id and returns status plus body
    async fn send(
        &self,
        method: &str,
        path: &str,
        builder: RequestBuilder,
    ) -> AppResult<(StatusCode, String)> {
        let request_id = RequestId::new();
        let span = backend_span(method, path, &request_id);

        async move {
            let response = builder
                .header(REQUEST_ID_HEADER, request_id.as_str())
                .send()
                .await
                .map_err(|e| {
                    tracing::error!(error = %e, "Backend unreachable");
                    AppError::HttpClient(e)
                })?;

            let status = response.status();
            let body = response.text().await?;
            tracing::debug!(status = %status, bytes = body.len(), "Backend responded");

            Ok((status, body))
        }
        .instrument(span)
        .await
    }

    /// GET a JSON document, failing on non-success status or undecodable body
    async fn get_json<T: DeserializeOwned>(&self, path: &str, token: Option<&str>) -> AppResult<T> {
        let mut builder = self.http_client.get(self.url(path));
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }

        let (status, body) = self.send("GET", path, builder).await?;

        if !status.is_success() {
            let message = error_message_from_body(&body).unwrap_or(body);
            tracing::warn!(path = %path, status = %status, message = %message, "Backend request failed");
            return Err(AppError::Backend { status, message });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(path = %path, error = %e, "Failed to decode backend response");
            AppError::MalformedPayload(format!("{}: {}", path, e))
        })
    }

    /// POST a JSON body and return the status with the decoded body, if any
    async fn post_json<B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> AppResult<(StatusCode, Option<Value>)> {
        let builder = self.http_client.post(self.url(path)).json(body);
        let (status, body) = self.send("POST", path, builder).await?;
        Ok((status, serde_json::from_str(&body).ok()))
    }
}

/// Extracts the backend's error text from a JSON value
pub fn error_message(value: &Value) -> Option<String> {
    value
        .get("error")
        .or_else(|| value.get("Error"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn error_message_from_body(body: &str) -> Option<String> {
    serde_json::from_str::<Value>(body)
        .ok()
        .as_ref()
        .and_then(error_message)
}

fn decode_items(category: Category, items: Vec<Value>) -> AppResult<Vec<CatalogItem>> {
    items
        .into_iter()
        .map(|value| decode_item(category.content_kind(), value))
        .collect()
}

fn decode_item(kind: ContentKind, value: Value) -> AppResult<CatalogItem> {
    let item = match kind {
        ContentKind::Movie => serde_json::from_value::<ApiMovie>(value).map(CatalogItem::from),
        ContentKind::Show => serde_json::from_value::<ApiShow>(value).map(CatalogItem::from),
    };
    item.map_err(|e| AppError::MalformedPayload(format!("invalid {}: {}", kind, e)))
}

#[async_trait::async_trait]
impl CatalogApi for HttpBackend {
    async fn list(&self, category: Category) -> AppResult<Vec<CatalogItem>> {
        let raw: Vec<Value> = self.get_json(category.list_path(), None).await?;
        let items = decode_items(category, raw)?;

        tracing::info!(
            category = %category,
            results = items.len(),
            "Catalog list fetched"
        );

        Ok(items)
    }

    async fn genres(&self) -> AppResult<Vec<Genre>> {
        self.get_json("/genres", None).await
    }

    async fn recommended(&self, category: Category, token: &str) -> AppResult<Vec<CatalogItem>> {
        let raw: Vec<Value> = self
            .get_json(category.recommended_path(), Some(token))
            .await?;
        decode_items(category, raw)
    }

    async fn item(&self, kind: ContentKind, imdb_id: &str, token: &str) -> AppResult<CatalogItem> {
        if imdb_id.trim().is_empty() {
            return Err(AppError::InvalidInput("IMDB id cannot be empty".to_string()));
        }

        let raw: Value = self.get_json(&kind.item_path(imdb_id), Some(token)).await?;
        decode_item(kind, raw)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

#[async_trait::async_trait]
impl AuthApi for HttpBackend {
    async fn login(&self, request: &LoginRequest) -> AppResult<LoginResponse> {
        let (status, body) = self.post_json("/login", request).await?;

        if let Some(message) = body.as_ref().and_then(error_message) {
            return Err(AppError::InvalidCredentials(message));
        }

        if status.is_server_error() {
            return Err(AppError::Backend {
                status,
                message: "login unavailable".to_string(),
            });
        }

        if !status.is_success() {
            return Err(AppError::InvalidCredentials(String::new()));
        }

        let body = body.ok_or_else(|| {
            AppError::MalformedPayload("login response is not JSON".to_string())
        })?;

        serde_json::from_value(body)
            .map_err(|e| AppError::MalformedPayload(format!("login response: {}", e)))
    }

    async fn register(&self, request: &RegisterRequest) -> AppResult<()> {
        let (status, body) = self.post_json("/register", request).await?;

        if let Some(message) = body.as_ref().and_then(error_message) {
            return Err(AppError::Registration(message));
        }

        if !status.is_success() {
            return Err(AppError::Registration(String::new()));
        }

        Ok(())
    }
}
