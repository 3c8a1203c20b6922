use serde::{Deserialize, Serialize};

use super::AnimeRecord;

/// A user-defined named collection of anime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub animes: Vec<AnimeRecord>,
}

impl Playlist {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            animes: Vec::new(),
        }
    }

    pub fn contains(&self, anime_id: &str) -> bool {
        self.animes.iter().any(|a| a.id == anime_id)
    }

    /// Case-insensitive name comparison.
    pub fn has_name(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }
}
