use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{
    api::CatalogApi,
    config::Config,
    error::{AppError, AppResult},
    models::{CatalogItem, Category, GenreSelection},
    services::{
        carousel::CarouselScheduler,
        catalog::{CatalogFetcher, CategoryState, StatusMessage},
        genre_filter::{derive_filtered_items, GenreOptions},
    },
};

/// Everything the home view renders, as one snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct BrowseView {
    pub category: Option<Category>,
    pub loading: bool,
    pub message: Option<StatusMessage>,
    pub selected_genre: GenreSelection,
    pub heading: String,
    /// Grid contents after the genre filter
    pub items: Vec<CatalogItem>,
    pub featured: Vec<CatalogItem>,
    pub active_index: usize,
}

struct BrowseInner {
    carousel: CarouselScheduler,
    genres: GenreOptions,
    selected_genre: GenreSelection,
}

/// Drives the home view: category tabs feed the fetcher, whose list feeds the
/// genre filter (grid) and the carousel (featured window)
///
/// The carousel rotates over the fetched list, not the filtered one, and is restarted
/// whenever a new list is published or the genre changes.
pub struct BrowseController {
    fetcher: CatalogFetcher,
    api: Arc<dyn CatalogApi>,
    inner: RwLock<BrowseInner>,
}

impl BrowseController {
    pub fn new(api: Arc<dyn CatalogApi>, carousel: CarouselScheduler, genres: GenreOptions) -> Self {
        Self {
            fetcher: CatalogFetcher::new(api.clone()),
            api,
            inner: RwLock::new(BrowseInner {
                carousel,
                genres,
                selected_genre: GenreSelection::All,
            }),
        }
    }

    pub fn from_config(api: Arc<dyn CatalogApi>, config: &Config) -> Self {
        let carousel = CarouselScheduler::new(config.carousel_interval(), config.carousel_window);
        Self::new(api, carousel, GenreOptions::default())
    }

    /// Switches to `category`: resets the filter, clears the carousel and re-fetches
    ///
    /// Returns the published state, or `None` if a later selection superseded this one.
    pub async fn select_category(&self, category: Category) -> Option<Arc<CategoryState>> {
        let pending = {
            let mut inner = self.inner.write().await;
            inner.selected_genre = GenreSelection::All;
            // The featured window must not show the previous list while loading
            inner.carousel.clear();
            // Issued under the same lock so an older completion cannot restart the carousel
            self.fetcher.begin(category).await
        };

        let state = self.fetcher.fetch(pending).await?;

        let mut inner = self.inner.write().await;
        let still_current = self
            .fetcher
            .active_state()
            .await
            .is_some_and(|active| Arc::ptr_eq(&active, &state));
        if still_current {
            inner.carousel.start(state.items.clone());
        }

        Some(state)
    }

    /// Re-fetches the active category
    pub async fn refresh(&self) -> Option<Arc<CategoryState>> {
        let category = self.fetcher.active_category().await?;
        self.select_category(category).await
    }

    /// Applies a genre filter; only configured options are accepted
    pub async fn select_genre(&self, selection: GenreSelection) -> AppResult<()> {
        let mut inner = self.inner.write().await;

        if !inner.genres.contains(selection) {
            return Err(AppError::InvalidInput(format!("Unknown genre {}", selection)));
        }
        if inner.selected_genre == selection {
            return Ok(());
        }

        inner.selected_genre = selection;
        tracing::debug!(genre = %selection, "Genre filter changed");

        if let Some(state) = self.fetcher.active_state().await.filter(|s| !s.loading) {
            inner.carousel.start(state.items.clone());
        }
        Ok(())
    }

    /// Replaces the filter options with the backend's genre list
    ///
    /// On failure the current options stay in place.
    pub async fn load_genre_options(&self) -> AppResult<()> {
        let genres = self.api.genres().await.map_err(|e| {
            tracing::warn!(error = %e, "Failed to load genres, keeping defaults");
            e
        })?;

        let mut inner = self.inner.write().await;
        inner.genres = GenreOptions::from_genres(genres);
        if !inner.genres.contains(inner.selected_genre) {
            inner.selected_genre = GenreSelection::All;
        }
        Ok(())
    }

    pub async fn genre_options(&self) -> GenreOptions {
        self.inner.read().await.genres.clone()
    }

    /// Advances the featured carousel by one step
    pub async fn tick_carousel(&self) -> usize {
        self.inner.read().await.carousel.tick()
    }

    pub async fn carousel_running(&self) -> bool {
        self.inner.read().await.carousel.is_running()
    }

    /// Tears the view down; no timer outlives it
    pub async fn close(&self) {
        self.inner.write().await.carousel.stop();
    }

    pub async fn view(&self) -> BrowseView {
        let inner = self.inner.read().await;
        let state = self.fetcher.active_state().await;

        let selected = inner.selected_genre;
        let heading = match (selected, inner.genres.name(selected)) {
            (GenreSelection::All, _) | (_, None) => "Trending".to_string(),
            (_, Some(name)) => format!("Trending in {}", name),
        };

        let items = state
            .as_ref()
            .map(|s| derive_filtered_items(&s.items, selected).into_owned())
            .unwrap_or_default();

        BrowseView {
            category: state.as_ref().map(|s| s.category),
            loading: state.as_ref().is_some_and(|s| s.loading),
            message: state.as_ref().and_then(|s| s.message.clone()),
            selected_genre: selected,
            heading,
            items,
            featured: inner.carousel.featured().to_vec(),
            active_index: inner.carousel.active_index(),
        }
    }
}
