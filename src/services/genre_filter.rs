use std::borrow::Cow;

use crate::models::{CatalogItem, Genre, GenreId, GenreSelection};

/// Narrows `items` to those tagged with the selected genre
///
/// `All` hands back the input untouched. Otherwise the matching items are
/// returned in their original order; no match yields an empty list.
pub fn derive_filtered_items(
    items: &[CatalogItem],
    selected: GenreSelection,
) -> Cow<'_, [CatalogItem]> {
    match selected {
        GenreSelection::All => Cow::Borrowed(items),
        GenreSelection::Genre(genre) => Cow::Owned(
            items
                .iter()
                .filter(|item| item.has_genre(genre))
                .cloned()
                .collect(),
        ),
    }
}

/// One entry of the genre filter bar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenreOption {
    pub selection: GenreSelection,
    pub name: String,
}

/// The genres a visitor may filter by, `All` first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenreOptions(Vec<GenreOption>);

impl Default for GenreOptions {
    fn default() -> Self {
        Self::from_genres(vec![
            Genre {
                id: GenreId(7),
                name: "Action".to_string(),
            },
            Genre {
                id: GenreId(1),
                name: "Romance".to_string(),
            },
            Genre {
                id: GenreId(4),
                name: "Special".to_string(),
            },
        ])
    }
}

impl GenreOptions {
    /// Builds the option list from backend genres, skipping duplicates
    pub fn from_genres(genres: Vec<Genre>) -> Self {
        let mut options = vec![GenreOption {
            selection: GenreSelection::All,
            name: "Trending".to_string(),
        }];

        for genre in genres {
            let selection = GenreSelection::Genre(genre.id);
            if !options.iter().any(|o| o.selection == selection) {
                options.push(GenreOption {
                    selection,
                    name: genre.name,
                });
            }
        }

        Self(options)
    }

    pub fn contains(&self, selection: GenreSelection) -> bool {
        self.0.iter().any(|o| o.selection == selection)
    }

    pub fn name(&self, selection: GenreSelection) -> Option<&str> {
        self.0
            .iter()
            .find(|o| o.selection == selection)
            .map(|o| o.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &GenreOption> {
        self.0.iter()
    }
}
