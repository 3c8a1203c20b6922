use serde::Deserialize;

use anidex_core::models::AnimeRecord;

use crate::error::CatalogError;

// ── Wire types ──────────────────────────────────────────────────
//
// Every field is optional on the wire so that a malformed record is reported
// as a `Schema` error naming the field, not as an opaque parse failure.

#[derive(Debug, Deserialize)]
pub struct AnimeWire {
    pub id: Option<WireId>,
    pub title: Option<String>,
    pub genre: Option<String>,
    pub rating: Option<WireNumber>,
    pub image: Option<String>,
    pub description: Option<String>,
}

/// mockapi ids are strings, but non-negative integer ids are accepted too.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum WireId {
    Text(String),
    Number(serde_json::Number),
}

/// Ratings may arrive as numbers or numeric strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum WireNumber {
    Number(f64),
    Text(String),
}

impl AnimeWire {
    /// Check the record and convert it into the domain type.
    pub fn validate(self) -> Result<AnimeRecord, CatalogError> {
        let id = match self.id {
            Some(WireId::Text(s)) => s,
            Some(WireId::Number(n)) => match n.as_u64() {
                Some(n) => n.to_string(),
                None => return Err(schema("id", format!("not a valid id: {n}"))),
            },
            None => return Err(missing("id")),
        };
        if id.trim().is_empty() {
            return Err(schema("id", "must not be empty"));
        }

        let title = self.title.ok_or_else(|| missing("title"))?;
        if title.trim().is_empty() {
            return Err(schema("title", "must not be empty"));
        }

        let rating = match self.rating {
            Some(WireNumber::Number(n)) => n,
            Some(WireNumber::Text(s)) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| schema("rating", format!("not a number: {s:?}")))?,
            None => return Err(missing("rating")),
        };
        if !rating.is_finite() {
            return Err(schema("rating", "must be finite"));
        }

        Ok(AnimeRecord {
            id,
            title,
            genre: self.genre.ok_or_else(|| missing("genre"))?,
            rating,
            image: self.image.ok_or_else(|| missing("image"))?,
            description: self.description.filter(|d| !d.trim().is_empty()),
        })
    }
}

/// Decode and validate a single record.
pub fn decode_record(body: &str) -> Result<AnimeRecord, CatalogError> {
    let wire: AnimeWire =
        serde_json::from_str(body).map_err(|e| CatalogError::Parse(e.to_string()))?;
    wire.validate()
}

/// Decode and validate a list of records. One bad record fails the whole list.
pub fn decode_records(body: &str) -> Result<Vec<AnimeRecord>, CatalogError> {
    let wire: Vec<AnimeWire> =
        serde_json::from_str(body).map_err(|e| CatalogError::Parse(e.to_string()))?;
    wire.into_iter().map(AnimeWire::validate).collect()
}

fn missing(field: &'static str) -> CatalogError {
    schema(field, "missing")
}

fn schema(field: &'static str, reason: impl Into<String>) -> CatalogError {
    CatalogError::Schema {
        field,
        reason: reason.into(),
    }
}
