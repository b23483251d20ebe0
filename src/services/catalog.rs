use std::collections::HashMap;
use std::fmt::Display;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{
    api::CatalogApi,
    error::{AppError, AppResult},
    models::{CatalogItem, Category},
};

/// Identifier of one issued list request
///
/// Tokens come from a single counter shared by all categories, so a token is never
/// reused and a late response can always be told apart from the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestToken(u64);

impl Display for RequestToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// Successful fetch with nothing to show
    Info,
    Error,
}

/// Text shown in place of the item grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub kind: MessageKind,
    pub text: String,
}

impl StatusMessage {
    pub fn empty(category: Category) -> Self {
        Self {
            kind: MessageKind::Info,
            text: format!("There are currently no {} available", category),
        }
    }

    pub fn fetch_failed(category: Category) -> Self {
        Self {
            kind: MessageKind::Error,
            text: AppError::fetch_failure_message(category),
        }
    }
}

/// Snapshot of one category's catalog data
///
/// Snapshots are immutable; every change publishes a new `Arc<CategoryState>`.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryState {
    pub category: Category,
    /// Shared so consumers can detect a fresh list with `Arc::ptr_eq`
    pub items: Arc<[CatalogItem]>,
    pub loading: bool,
    pub message: Option<StatusMessage>,
    pub request_token: RequestToken,
}

impl CategoryState {
    pub fn error_message(&self) -> Option<&str> {
        self.message.as_ref().map(|m| m.text.as_str())
    }
}

/// Handle for a request issued by [`CatalogFetcher::begin`]
#[derive(Debug)]
pub struct PendingFetch {
    pub category: Category,
    pub token: RequestToken,
}

#[derive(Default)]
struct FetcherInner {
    active: Option<Category>,
    last_token: u64,
    /// Token whose response may still be applied, per category
    expected: HashMap<Category, RequestToken>,
    states: HashMap<Category, Arc<CategoryState>>,
}

/// Fetches the item list of the active category
///
/// Every activation issues a fresh request; nothing is cached across activations.
/// A response is applied only if its token is still the expected one for a category
/// that is still active, so out-of-order responses are dropped on arrival.
pub struct CatalogFetcher {
    api: Arc<dyn CatalogApi>,
    inner: Arc<RwLock<FetcherInner>>,
}

impl CatalogFetcher {
    pub fn new(api: Arc<dyn CatalogApi>) -> Self {
        Self {
            api,
            inner: Arc::new(RwLock::new(FetcherInner::default())),
        }
    }

    /// Activates `category` and fetches its list
    ///
    /// Returns the published state, or `None` when a newer activation superseded this one
    /// before the response arrived.
    pub async fn activate(&self, category: Category) -> Option<Arc<CategoryState>> {
        let pending = self.begin(category).await;
        self.fetch(pending).await
    }

    /// Performs the request for `pending` and applies its outcome
    pub async fn fetch(&self, pending: PendingFetch) -> Option<Arc<CategoryState>> {
        let result = self.api.list(pending.category).await;
        self.complete(pending, result).await
    }

    /// Marks `category` active and loading, and issues a new request token
    pub async fn begin(&self, category: Category) -> PendingFetch {
        let mut inner = self.inner.write().await;

        inner.last_token += 1;
        let token = RequestToken(inner.last_token);

        if let Some(previous) = inner.active.filter(|c| *c != category) {
            // Switching away abandons the previous request
            inner.expected.remove(&previous);
            if let Some(state) = inner.states.get(&previous).filter(|s| s.loading) {
                let settled = CategoryState {
                    loading: false,
                    ..CategoryState::clone(state)
                };
                inner.states.insert(previous, Arc::new(settled));
            }
        }

        let items = inner
            .states
            .get(&category)
            .map(|s| s.items.clone())
            .unwrap_or_else(|| Arc::from(Vec::new()));

        inner.active = Some(category);
        inner.expected.insert(category, token);
        inner.states.insert(
            category,
            Arc::new(CategoryState {
                category,
                items,
                loading: true,
                message: None,
                request_token: token,
            }),
        );

        tracing::debug!(category = %category, token = %token, "Catalog fetch issued");

        PendingFetch { category, token }
    }

    /// Applies the outcome of a request issued by [`CatalogFetcher::begin`]
    pub async fn complete(
        &self,
        pending: PendingFetch,
        result: AppResult<Vec<CatalogItem>>,
    ) -> Option<Arc<CategoryState>> {
        let PendingFetch { category, token } = pending;
        let mut inner = self.inner.write().await;

        let current = inner.active == Some(category) && inner.expected.get(&category) == Some(&token);
        if !current {
            tracing::debug!(
                category = %category,
                token = %token,
                active = ?inner.active,
                "Discarding stale catalog response"
            );
            return None;
        }

        inner.expected.remove(&category);

        let previous_items = inner
            .states
            .get(&category)
            .map(|s| s.items.clone())
            .unwrap_or_else(|| Arc::from(Vec::new()));

        let state = match result {
            Ok(items) => {
                tracing::info!(category = %category, token = %token, count = items.len(), "Catalog loaded");
                let message = items.is_empty().then(|| StatusMessage::empty(category));
                CategoryState {
                    category,
                    items: Arc::from(items),
                    loading: false,
                    message,
                    request_token: token,
                }
            }
            Err(e) => {
                tracing::warn!(category = %category, token = %token, error = %e, "Catalog fetch failed");
                CategoryState {
                    category,
                    items: previous_items,
                    loading: false,
                    message: Some(StatusMessage::fetch_failed(category)),
                    request_token: token,
                }
            }
        };

        let state = Arc::new(state);
        inner.states.insert(category, state.clone());
        Some(state)
    }

    /// Latest published state of `category`, if it was ever activated
    pub async fn state(&self, category: Category) -> Option<Arc<CategoryState>> {
        self.inner.read().await.states.get(&category).cloned()
    }

    pub async fn active_category(&self) -> Option<Category> {
        self.inner.read().await.active
    }

    pub async fn active_state(&self) -> Option<Arc<CategoryState>> {
        let inner = self.inner.read().await;
        inner.active.and_then(|c| inner.states.get(&c).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockCatalogApi;
    use crate::models::{ApiMovie, Genre, GenreId};
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tokio::sync::oneshot;

    fn movie(id: &str, genres: &[u32]) -> CatalogItem {
        CatalogItem::from(ApiMovie {
            id: id.to_string(),
            title: format!("Movie {}", id),
            poster_path: String::new(),
            imdb_id: format!("tt{}", id),
            genre: genres
                .iter()
                .map(|g| Genre {
                    id: GenreId(*g),
                    name: String::new(),
                })
                .collect(),
            ranking: None,
        })
    }

    fn ids(state: &CategoryState) -> Vec<&str> {
        state.items.iter().map(|i| i.id()).collect()
    }

    #[tokio::test]
    async fn test_activate_publishes_items() {
        let mut api = MockCatalogApi::new();
        api.expect_list()
            .withf(|c| *c == Category::Movies)
            .times(1)
            .returning(|_| Ok(vec![movie("1", &[7]), movie("2", &[1])]));

        let fetcher = CatalogFetcher::new(Arc::new(api));
        let state = fetcher.activate(Category::Movies).await.unwrap();

        assert!(!state.loading);
        assert_eq!(ids(&state), vec!["1", "2"]);
        assert_eq!(state.message, None);
        assert_eq!(fetcher.active_category().await, Some(Category::Movies));
    }

    #[tokio::test]
    async fn test_empty_list_sets_informational_message() {
        let mut api = MockCatalogApi::new();
        api.expect_list().returning(|_| Ok(Vec::new()));

        let fetcher = CatalogFetcher::new(Arc::new(api));
        let state = fetcher.activate(Category::Movies).await.unwrap();

        assert!(!state.loading);
        assert!(state.items.is_empty());
        assert_eq!(
            state.error_message(),
            Some("There are currently no movies available")
        );
        assert_eq!(state.message.as_ref().unwrap().kind, MessageKind::Info);
    }

    #[tokio::test]
    async fn test_failure_sets_error_message() {
        let mut api = MockCatalogApi::new();
        api.expect_list()
            .returning(|_| Err(AppError::MalformedPayload("not an array".to_string())));

        let fetcher = CatalogFetcher::new(Arc::new(api));
        let state = fetcher.activate(Category::Shows).await.unwrap();

        assert!(!state.loading);
        assert_eq!(state.error_message(), Some("Error fetching shows"));
        assert_eq!(state.message.as_ref().unwrap().kind, MessageKind::Error);
    }

    #[tokio::test]
    async fn test_every_activation_refetches() {
        let mut api = MockCatalogApi::new();
        api.expect_list()
            .withf(|c| *c == Category::Movies)
            .times(2)
            .returning(|_| Ok(vec![movie("1", &[])]));
        api.expect_list()
            .withf(|c| *c == Category::Shows)
            .times(1)
            .returning(|_| Ok(Vec::new()));

        let fetcher = CatalogFetcher::new(Arc::new(api));
        let first = fetcher.activate(Category::Movies).await.unwrap();
        fetcher.activate(Category::Shows).await.unwrap();
        let second = fetcher.activate(Category::Movies).await.unwrap();

        assert!(second.request_token > first.request_token);
        assert!(!Arc::ptr_eq(&first.items, &second.items));
    }

    #[tokio::test]
    async fn test_begin_marks_loading_and_clears_message() {
        let mut api = MockCatalogApi::new();
        api.expect_list().returning(|_| Ok(Vec::new()));

        let fetcher = CatalogFetcher::new(Arc::new(api));
        fetcher.activate(Category::Movies).await.unwrap();

        let pending = fetcher.begin(Category::Movies).await;
        let state = fetcher.state(Category::Movies).await.unwrap();
        assert!(state.loading);
        assert_eq!(state.message, None);
        assert_eq!(state.request_token, pending.token);
    }

    #[tokio::test]
    async fn test_late_response_for_switched_category_is_discarded() {
        let fetcher = CatalogFetcher::new(Arc::new(MockCatalogApi::new()));

        let movies = fetcher.begin(Category::Movies).await;
        let shows = fetcher.begin(Category::Shows).await;

        let applied = fetcher
            .complete(shows, Ok(vec![movie("s1", &[])]))
            .await
            .unwrap();
        assert_eq!(ids(&applied), vec!["s1"]);

        let late = fetcher.complete(movies, Ok(vec![movie("m1", &[])])).await;
        assert!(late.is_none());

        let shows_state = fetcher.state(Category::Shows).await.unwrap();
        assert!(Arc::ptr_eq(&shows_state, &applied));
        let movies_state = fetcher.state(Category::Movies).await.unwrap();
        assert!(movies_state.items.is_empty());
        assert!(!movies_state.loading);
    }

    #[tokio::test]
    async fn test_only_latest_request_for_same_category_applies() {
        let fetcher = CatalogFetcher::new(Arc::new(MockCatalogApi::new()));

        let older = fetcher.begin(Category::Movies).await;
        let newer = fetcher.begin(Category::Movies).await;

        // Newer resolves first, older arrives afterwards
        assert!(fetcher.complete(newer, Ok(vec![movie("new", &[])])).await.is_some());
        assert!(fetcher.complete(older, Ok(vec![movie("old", &[])])).await.is_none());

        let state = fetcher.state(Category::Movies).await.unwrap();
        assert_eq!(ids(&state), vec!["new"]);
    }

    #[tokio::test]
    async fn test_older_request_resolving_first_is_still_discarded() {
        let fetcher = CatalogFetcher::new(Arc::new(MockCatalogApi::new()));

        let older = fetcher.begin(Category::Movies).await;
        let newer = fetcher.begin(Category::Movies).await;

        assert!(fetcher.complete(older, Ok(vec![movie("old", &[])])).await.is_none());
        let state = fetcher.state(Category::Movies).await.unwrap();
        assert!(state.loading);

        assert!(fetcher.complete(newer, Err(AppError::Internal("boom".into()))).await.is_some());
        let state = fetcher.state(Category::Movies).await.unwrap();
        assert_eq!(state.error_message(), Some("Error fetching movies"));
    }

    /// Resolves list calls in whatever order the test releases them
    struct GatedApi {
        gates: Mutex<VecDeque<oneshot::Receiver<Vec<CatalogItem>>>>,
    }

    #[async_trait::async_trait]
    impl CatalogApi for GatedApi {
        async fn list(&self, _category: Category) -> AppResult<Vec<CatalogItem>> {
            let gate = self.gates.lock().unwrap().pop_front().expect("unexpected list call");
            gate.await.map_err(|e| AppError::Internal(e.to_string()))
        }

        async fn genres(&self) -> AppResult<Vec<Genre>> {
            unimplemented!()
        }

        async fn recommended(&self, _: Category, _: &str) -> AppResult<Vec<CatalogItem>> {
            unimplemented!()
        }

        async fn item(
            &self,
            _: crate::models::ContentKind,
            _: &str,
            _: &str,
        ) -> AppResult<CatalogItem> {
            unimplemented!()
        }

        fn name(&self) -> &'static str {
            "gated"
        }
    }

    #[tokio::test]
    async fn test_out_of_order_responses_across_categories() {
        let (movies_tx, movies_rx) = oneshot::channel();
        let (shows_tx, shows_rx) = oneshot::channel();
        let api = GatedApi {
            gates: Mutex::new(VecDeque::from([movies_rx, shows_rx])),
        };
        let fetcher = CatalogFetcher::new(Arc::new(api));

        let activate_movies = fetcher.activate(Category::Movies);
        let activate_shows = async {
            tokio::task::yield_now().await;
            fetcher.activate(Category::Shows).await
        };
        let resolve = async {
            for _ in 0..3 {
                tokio::task::yield_now().await;
            }
            shows_tx.send(vec![movie("s1", &[])]).unwrap();
            for _ in 0..3 {
                tokio::task::yield_now().await;
            }
            movies_tx.send(vec![movie("m1", &[7])]).unwrap();
        };

        let (movies, shows, ()) = tokio::join!(activate_movies, activate_shows, resolve);

        assert!(movies.is_none());
        let shows = shows.unwrap();
        assert_eq!(ids(&shows), vec!["s1"]);

        let active = fetcher.active_state().await.unwrap();
        assert_eq!(active.category, Category::Shows);
        assert!(Arc::ptr_eq(&active, &shows));
        assert!(fetcher.state(Category::Movies).await.unwrap().items.is_empty());
    }
}
