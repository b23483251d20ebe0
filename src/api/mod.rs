//! Backend collaborator abstraction
//!
//! Components never talk to the backend directly. Each receives one of these traits,
//! so tests can swap in doubles and the transport stays pluggable.
use crate::{
    error::AppResult,
    models::{
        CatalogItem, Category, ContentKind, Genre, LoginRequest, LoginResponse, RegisterRequest,
    },
};

pub mod http;
pub mod request_id;

pub use http::HttpBackend;

/// Read access to the movie and show catalog
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogApi: Send + Sync {
    /// List every item of one category
    async fn list(&self, category: Category) -> AppResult<Vec<CatalogItem>>;

    /// Genres known to the backend
    async fn genres(&self) -> AppResult<Vec<Genre>>;

    /// Items recommended for the bearer of `token`
    async fn recommended(&self, category: Category, token: &str) -> AppResult<Vec<CatalogItem>>;

    /// One item by IMDB id, used by the review view
    async fn item(&self, kind: ContentKind, imdb_id: &str, token: &str) -> AppResult<CatalogItem>;

    /// Backend name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Account endpoints
///
/// Implementations convert backend error payloads into `InvalidCredentials` (login)
/// or `Registration` (register); transport faults stay `HttpClient` errors.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, request: &LoginRequest) -> AppResult<LoginResponse>;

    async fn register(&self, request: &RegisterRequest) -> AppResult<()>;
}
