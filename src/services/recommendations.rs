use std::sync::Arc;

use crate::{
    api::CatalogApi,
    error::{AppError, AppResult},
    models::{CatalogItem, Category, ContentKind},
    services::session::SessionStore,
};

/// Loads the protected views' data with the current session's token
///
/// Without a session nothing is requested and `Unauthenticated` is returned.
pub struct Recommendations {
    api: Arc<dyn CatalogApi>,
    session: Arc<SessionStore>,
}

impl Recommendations {
    pub fn new(api: Arc<dyn CatalogApi>, session: Arc<SessionStore>) -> Self {
        Self { api, session }
    }

    /// Items recommended for the signed-in user
    pub async fn load(&self, category: Category) -> AppResult<Vec<CatalogItem>> {
        let token = self.session.token().ok_or(AppError::Unauthenticated)?;

        let items = self.api.recommended(category, &token).await?;
        tracing::info!(
            category = %category,
            results = items.len(),
            "Recommendations loaded"
        );
        Ok(items)
    }

    /// The item a review view is opened for
    pub async fn review_item(&self, kind: ContentKind, imdb_id: &str) -> AppResult<CatalogItem> {
        let token = self.session.token().ok_or(AppError::Unauthenticated)?;

        let item = self.api.item(kind, imdb_id, &token).await?;
        if item.kind() != kind {
            return Err(AppError::MalformedPayload(format!(
                "expected a {} for {}, got a {}",
                kind,
                imdb_id,
                item.kind()
            )));
        }
        Ok(item)
    }
}
