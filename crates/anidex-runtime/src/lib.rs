mod notice;

use std::time::Duration;

use anidex_api::{CatalogError, CatalogService, MockApiClient};
use anidex_core::config::AppConfig;
use anidex_core::error::PlaylistError;
use anidex_core::models::{AnimePatch, AnimeRecord, NewAnime, Playlist};
use anidex_core::playlist::{PlaylistStore, StoreEvent, StoreOptions, SubscriptionId};
use anidex_core::storage::{KeyValueStore, SqliteStore};

pub use notice::{Notice, NoticeKind};

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("config error: {0}")]
    Config(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
    #[error("not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Playlist(#[from] PlaylistError),
}

/// Everything a presentation layer needs: the remote catalog and the
/// user's playlists.
pub struct Runtime<C, S = SqliteStore> {
    config: AppConfig,
    catalog: C,
    playlists: PlaylistStore<S>,
}

impl Runtime<MockApiClient, SqliteStore> {
    /// Build the catalog client from config and open the on-disk store.
    pub fn open(config: AppConfig) -> Result<Self, RuntimeError> {
        let timeout = (config.api.timeout_secs > 0)
            .then(|| Duration::from_secs(config.api.timeout_secs));
        let catalog = MockApiClient::with_timeout(&config.api.base_url, timeout)
            .map_err(|e| RuntimeError::Config(e.to_string()))?;

        let db_path = config
            .ensure_db_path()
            .map_err(|e| RuntimeError::Config(e.to_string()))?;
        let storage =
            SqliteStore::open(&db_path).map_err(|e| RuntimeError::Storage(e.to_string()))?;

        Self::new(config, catalog, storage)
    }
}

impl<C, S> Runtime<C, S>
where
    C: CatalogService<Error = CatalogError>,
    S: KeyValueStore,
{
    pub fn new(config: AppConfig, catalog: C, storage: S) -> Result<Self, RuntimeError> {
        let options = StoreOptions {
            rename_policy: config.playlists.rename_policy,
        };
        let playlists = PlaylistStore::load(storage, options)?;
        Ok(Self {
            config,
            catalog,
            playlists,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn playlists(&self) -> &PlaylistStore<S> {
        &self.playlists
    }

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&StoreEvent) + Send + 'static,
    {
        self.playlists.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.playlists.unsubscribe(id)
    }

    // ── Catalog ─────────────────────────────────────────────────

    pub async fn list_anime(&self) -> Result<Vec<AnimeRecord>, RuntimeError> {
        let records = self.catalog.list_all().await?;
        tracing::debug!(count = records.len(), "fetched catalog");
        Ok(records)
    }

    pub async fn anime_detail(&self, id: &str) -> Result<AnimeRecord, RuntimeError> {
        self.catalog.get_by_id(id).await.map_err(not_found)
    }

    pub async fn add_anime(&self, anime: NewAnime) -> Result<AnimeRecord, RuntimeError> {
        let created = self.catalog.create(&anime).await?;
        tracing::info!(id = %created.id, title = %created.title, "added anime");
        Ok(created)
    }

    pub async fn update_anime(
        &self,
        id: &str,
        patch: AnimePatch,
    ) -> Result<AnimeRecord, RuntimeError> {
        self.catalog.update(id, &patch).await.map_err(not_found)
    }

    pub async fn delete_anime(&self, id: &str) -> Result<(), RuntimeError> {
        self.catalog.delete(id).await?;
        tracing::info!(id, "deleted anime");
        Ok(())
    }

    // ── Playlists ───────────────────────────────────────────────

    pub fn create_playlist(&mut self, name: &str) -> Notice {
        match self.playlists.create_playlist(name) {
            Ok(playlist) => Notice::success(format!("Playlist \"{}\" created.", playlist.name)),
            Err(e) => rejected(e),
        }
    }

    /// Delete a playlist. Confirmation is the caller's job.
    pub fn delete_playlist(&mut self, id: &str) -> Notice {
        match self.playlists.delete_playlist(id) {
            Ok(true) => Notice::success("Playlist deleted."),
            Ok(false) => Notice::info("No playlist with that id."),
            Err(e) => rejected(e),
        }
    }

    pub fn rename_playlist(&mut self, id: &str, new_name: &str) -> Notice {
        match self.playlists.rename_playlist(id, new_name) {
            Ok(true) => Notice::success("Playlist name updated."),
            Ok(false) => Notice::info("No playlist with that id."),
            Err(e) => rejected(e),
        }
    }

    pub fn select_playlist(&mut self, id: &str) -> Notice {
        match self.playlists.select_playlist(id) {
            Ok(()) => {
                let name = self.playlist_name(id);
                Notice::success(format!("Selected playlist \"{name}\"."))
            }
            Err(e) => rejected(e),
        }
    }

    pub fn remove_from_playlist(&mut self, playlist_id: &str, anime_id: &str) -> Notice {
        match self.playlists.remove_anime_from_playlist(playlist_id, anime_id) {
            Ok(true) => Notice::info("Anime removed from playlist."),
            Ok(false) => Notice::info("Anime is not in this playlist."),
            Err(e) => rejected(e),
        }
    }

    /// Fetch `anime_id` and add it to `playlist_id`, or to the selected
    /// playlist when `None`.
    pub async fn add_to_playlist(&mut self, anime_id: &str, playlist_id: Option<&str>) -> Notice {
        if self.playlists.is_empty() {
            return Notice::error("Create a playlist first.");
        }

        let anime = match self.anime_detail(anime_id).await {
            Ok(anime) => anime,
            Err(RuntimeError::NotFound(_)) => return Notice::error("Anime not found."),
            Err(e) => {
                tracing::warn!(error = %e, anime_id, "could not load anime");
                return Notice::error(format!("Could not load anime: {e}"));
            }
        };

        let target = match playlist_id {
            Some(id) => id.to_string(),
            None => self.playlists.selected_id().unwrap_or_default().to_string(),
        };
        let title = anime.title.clone();

        match self.playlists.add_anime_to_playlist(&target, anime) {
            Ok(()) => {
                let name = self.playlist_name(&target);
                Notice::success(format!("{title} added to \"{name}\"."))
            }
            Err(e) => rejected(e),
        }
    }

    pub fn export_playlists(&self) -> Result<String, RuntimeError> {
        Ok(self.playlists.export_json()?)
    }

    pub fn import_playlists(&mut self, blob: &str) -> Notice {
        match self.playlists.import_json(blob) {
            Ok(count) => Notice::success(format!("Imported {count} playlists.")),
            Err(e) => rejected(e),
        }
    }

    /// Every playlist, for display.
    pub fn list_playlists(&self) -> &[Playlist] {
        self.playlists.playlists()
    }

    fn playlist_name(&self, id: &str) -> String {
        self.playlists
            .get(id)
            .map(|p| p.name.clone())
            .unwrap_or_default()
    }
}

fn not_found(err: CatalogError) -> RuntimeError {
    match err {
        CatalogError::NotFound(id) => RuntimeError::NotFound(id),
        other => RuntimeError::Catalog(other),
    }
}

fn rejected(err: PlaylistError) -> Notice {
    if err.is_user_error() {
        tracing::debug!(error = %err, "playlist command rejected");
    } else {
        tracing::error!(error = %err, "playlist command failed");
    }
    Notice::from(&err)
}
