use serde::{Deserialize, Deserializer, Serialize};
use std::{collections::BTreeSet, fmt::Display};

pub mod session;

pub use session::{LoginRequest, LoginResponse, RegisterRequest, Session};

/// One of the two content classes a visitor can browse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Movies,
    Shows,
}

impl Category {
    /// Backend list endpoint for this category
    pub fn list_path(&self) -> &'static str {
        match self {
            Category::Movies => "/movies",
            Category::Shows => "/tv_shows",
        }
    }

    /// Backend endpoint returning the signed-in user's recommendations
    pub fn recommended_path(&self) -> &'static str {
        match self {
            Category::Movies => "/recommended_movies",
            Category::Shows => "/recommended_tv_shows",
        }
    }

    pub fn content_kind(&self) -> ContentKind {
        match self {
            Category::Movies => ContentKind::Movie,
            Category::Shows => ContentKind::Show,
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Movies => write!(f, "movies"),
            Category::Shows => write!(f, "shows"),
        }
    }
}

/// Kind of a single catalog item, as it appears in review paths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Movie,
    Show,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Movie => "movie",
            ContentKind::Show => "show",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "movie" => Some(ContentKind::Movie),
            "show" => Some(ContentKind::Show),
            _ => None,
        }
    }

    /// Backend path for fetching one item of this kind
    pub fn item_path(&self, imdb_id: &str) -> String {
        match self {
            ContentKind::Movie => format!("/movie/{}", imdb_id),
            ContentKind::Show => format!("/tv_shows/{}", imdb_id),
        }
    }
}

impl Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Backend genre identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenreId(pub u32);

impl Display for GenreId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Genre as exchanged with the backend (`{genre_id, genre_name}`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    #[serde(rename = "genre_id")]
    pub id: GenreId,
    #[serde(rename = "genre_name", default)]
    pub name: String,
}

/// Genre filter selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenreSelection {
    #[default]
    All,
    Genre(GenreId),
}

impl Display for GenreSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenreSelection::All => write!(f, "all"),
            GenreSelection::Genre(id) => write!(f, "{}", id),
        }
    }
}

impl From<GenreId> for GenreSelection {
    fn from(id: GenreId) -> Self {
        GenreSelection::Genre(id)
    }
}

/// Review-derived ranking badge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ranking {
    pub name: String,
    pub value: i32,
}

/// Fields shared by movies and shows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemInfo {
    pub id: String,
    pub title: String,
    pub poster_url: String,
    pub imdb_id: String,
    pub genre_ids: BTreeSet<GenreId>,
    pub ranking: Option<Ranking>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Movie {
    #[serde(flatten)]
    pub info: ItemInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Show {
    #[serde(flatten)]
    pub info: ItemInfo,
    pub status: String,
    pub total_seasons: u32,
    pub seasons: Vec<Season>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Season {
    pub number: u32,
    pub episodes: Vec<Episode>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Episode {
    pub number: u32,
    pub title: String,
    pub duration_minutes: u32,
    pub synopsis: Option<String>,
}

/// A browsable catalog entry, discriminated by `kind`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CatalogItem {
    Movie(Movie),
    Show(Show),
}

impl CatalogItem {
    pub fn info(&self) -> &ItemInfo {
        match self {
            CatalogItem::Movie(movie) => &movie.info,
            CatalogItem::Show(show) => &show.info,
        }
    }

    pub fn id(&self) -> &str {
        &self.info().id
    }

    pub fn title(&self) -> &str {
        &self.info().title
    }

    pub fn kind(&self) -> ContentKind {
        match self {
            CatalogItem::Movie(_) => ContentKind::Movie,
            CatalogItem::Show(_) => ContentKind::Show,
        }
    }

    pub fn has_genre(&self, genre: GenreId) -> bool {
        self.info().genre_ids.contains(&genre)
    }
}

// ============================================================================
// Backend Wire Types
// ============================================================================

/// Accepts ids serialized either as strings (object ids) or as numbers
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {}",
            other
        ))),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiRanking {
    #[serde(default)]
    pub ranking_name: String,
    #[serde(default)]
    pub ranking_value: i32,
}

impl ApiRanking {
    /// Backend sends a zero ranking instead of omitting it
    fn into_ranking(self) -> Option<Ranking> {
        if self.ranking_name.is_empty() {
            None
        } else {
            Some(Ranking {
                name: self.ranking_name,
                value: self.ranking_value,
            })
        }
    }
}

/// Movie payload from GET /movies
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiMovie {
    #[serde(rename = "_id", deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub poster_path: String,
    #[serde(default)]
    pub imdb_id: String,
    #[serde(default)]
    pub genre: Vec<Genre>,
    #[serde(default)]
    pub ranking: Option<ApiRanking>,
}

impl ApiMovie {
    fn into_info(self) -> ItemInfo {
        ItemInfo {
            id: self.id,
            title: self.title,
            poster_url: self.poster_path,
            imdb_id: self.imdb_id,
            genre_ids: self.genre.iter().map(|g| g.id).collect(),
            ranking: self.ranking.and_then(ApiRanking::into_ranking),
        }
    }
}

impl From<ApiMovie> for CatalogItem {
    fn from(movie: ApiMovie) -> Self {
        CatalogItem::Movie(Movie {
            info: movie.into_info(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEpisode {
    pub episode_number: u32,
    #[serde(default)]
    pub episode_title: String,
    #[serde(default)]
    pub duration: u32,
    #[serde(default)]
    pub synopsis: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSeason {
    pub season_number: u32,
    #[serde(default)]
    pub episodes: Vec<ApiEpisode>,
}

/// Show payload from GET /tv_shows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiShow {
    #[serde(flatten)]
    pub base: ApiMovie,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub total_seasons: u32,
    #[serde(default)]
    pub seasons: Vec<ApiSeason>,
}

impl From<ApiShow> for CatalogItem {
    fn from(show: ApiShow) -> Self {
        let seasons = show
            .seasons
            .into_iter()
            .map(|season| Season {
                number: season.season_number,
                episodes: season
                    .episodes
                    .into_iter()
                    .map(|episode| Episode {
                        number: episode.episode_number,
                        title: episode.episode_title,
                        duration_minutes: episode.duration,
                        synopsis: episode.synopsis.filter(|s| !s.is_empty()),
                    })
                    .collect(),
            })
            .collect();

        CatalogItem::Show(Show {
            info: show.base.into_info(),
            status: show.status,
            total_seasons: show.total_seasons,
            seasons,
        })
    }
}
