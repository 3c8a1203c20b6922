//! Trait definition for the remote anime catalog.
//!
//! The runtime only talks to the catalog through this trait, so tests and
//! alternative backends can stand in for the mock REST service.

use std::future::Future;

use anidex_core::models::{AnimePatch, AnimeRecord, NewAnime};

/// CRUD access to a remote collection of anime records.
///
/// No method retries; every failure is returned to the caller as-is.
pub trait CatalogService: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetch every record, in server order.
    fn list_all(&self) -> impl Future<Output = Result<Vec<AnimeRecord>, Self::Error>> + Send;

    /// Fetch a single record.
    fn get_by_id(&self, id: &str)
        -> impl Future<Output = Result<AnimeRecord, Self::Error>> + Send;

    /// Create a record; the server assigns its id.
    fn create(
        &self,
        anime: &NewAnime,
    ) -> impl Future<Output = Result<AnimeRecord, Self::Error>> + Send;

    /// Apply a partial update and return the stored record.
    fn update(
        &self,
        id: &str,
        patch: &AnimePatch,
    ) -> impl Future<Output = Result<AnimeRecord, Self::Error>> + Send;

    fn delete(&self, id: &str) -> impl Future<Output = Result<(), Self::Error>> + Send;
}
