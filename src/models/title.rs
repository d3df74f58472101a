use serde::{Deserialize, Serialize};

use super::taxonomy::{Category, Genre};

/// A catalogued work together with its resolved classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Title {
    pub id: i32,
    pub name: String,
    pub year: Option<i16>,
    pub description: Option<String>,
    pub category: Option<Category>,
    pub genres: Vec<Genre>,
}

impl Title {
    /// Genre names joined for display, e.g. `"Drama, Comedy"`.
    #[must_use]
    pub fn genre_names(&self) -> String {
        self.genres
            .iter()
            .map(|g| g.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    #[must_use]
    pub fn genre_ids(&self) -> Vec<i32> {
        self.genres.iter().map(|g| g.id).collect()
    }
}

/// Fields accepted when creating or replacing a title.
#[derive(Debug, Clone, Default)]
pub struct NewTitle {
    pub name: String,
    pub year: Option<i16>,
    pub description: Option<String>,
    pub category_id: Option<i32>,
    pub genre_ids: Vec<i32>,
}

/// Partial update. `None` leaves a column untouched; `Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct TitleChanges {
    pub name: Option<String>,
    pub year: Option<Option<i16>>,
    pub description: Option<Option<String>>,
    pub category_id: Option<Option<i32>>,
    pub genre_ids: Option<Vec<i32>>,
}
