use serde::{Deserialize, Serialize};

/// Shown in place of a missing description.
pub const NO_DESCRIPTION: &str = "No description.";

/// A single catalog entry. Identity is `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimeRecord {
    pub id: String,
    pub title: String,
    pub genre: String,
    pub rating: f64,
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl AnimeRecord {
    /// The description, or a placeholder when the record has none.
    pub fn description_or_default(&self) -> &str {
        self.description
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or(NO_DESCRIPTION)
    }
}

/// Request body for creating a record; the server assigns the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAnime {
    pub title: String,
    pub genre: String,
    pub rating: f64,
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl NewAnime {
    /// Attach a server-assigned id.
    pub fn with_id(self, id: impl Into<String>) -> AnimeRecord {
        AnimeRecord {
            id: id.into(),
            title: self.title,
            genre: self.genre,
            rating: self.rating,
            image: self.image,
            description: self.description,
        }
    }
}

/// Partial update; only the fields that are `Some` are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl AnimePatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.genre.is_none()
            && self.rating.is_none()
            && self.image.is_none()
            && self.description.is_none()
    }
}
