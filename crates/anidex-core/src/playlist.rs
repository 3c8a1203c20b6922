//! Playlist store: the user's named playlists, persisted as a single blob.
//!
//! Every mutation stages a new collection, writes the whole thing to storage,
//! and only then swaps it in. A rejected command or a failed write leaves the
//! in-memory collection untouched.

use std::collections::HashSet;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::PlaylistError;
use crate::models::{AnimeRecord, Playlist};
use crate::storage::{keys, KeyValueStore};

/// Whether renaming may produce a name already used by another playlist.
///
/// Creation always rejects case-insensitive duplicates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenamePolicy {
    #[default]
    AllowDuplicates,
    RequireUnique,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StoreOptions {
    pub rename_policy: RenamePolicy,
}

/// A committed change, delivered to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    Created { id: String },
    Deleted { id: String },
    Renamed { id: String, name: String },
    AnimeAdded { playlist_id: String, anime_id: String },
    AnimeRemoved { playlist_id: String, anime_id: String },
    Selected { id: Option<String> },
    Replaced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&StoreEvent) + Send>;

pub struct PlaylistStore<S> {
    storage: S,
    playlists: Vec<Playlist>,
    selected: Option<String>,
    options: StoreOptions,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl<S: KeyValueStore> PlaylistStore<S> {
    /// Load the collection from storage.
    ///
    /// A blob that does not decode is logged, removed from storage, and
    /// replaced by an empty collection.
    pub fn load(storage: S, options: StoreOptions) -> Result<Self, PlaylistError> {
        let playlists = match storage.get(keys::PLAYLISTS)? {
            None => Vec::new(),
            Some(blob) => match decode_collection(&blob) {
                Ok(playlists) => playlists,
                Err(e) => {
                    tracing::warn!(error = %e, "discarding stored playlists");
                    storage.remove(keys::PLAYLISTS)?;
                    Vec::new()
                }
            },
        };

        let stored_selection = storage.get(keys::SELECTED_PLAYLIST_ID)?;
        let selected = resolve_selection(&playlists, stored_selection.as_deref());

        tracing::debug!(
            playlists = playlists.len(),
            selected = selected.as_deref().unwrap_or("-"),
            "loaded playlists"
        );

        Ok(Self {
            storage,
            playlists,
            selected,
            options,
            listeners: Vec::new(),
            next_subscription: 0,
        })
    }

    // ── Queries ─────────────────────────────────────────────────

    pub fn playlists(&self) -> &[Playlist] {
        &self.playlists
    }

    pub fn get(&self, id: &str) -> Option<&Playlist> {
        self.playlists.iter().find(|p| p.id == id)
    }

    /// Case-insensitive lookup by name.
    pub fn find_by_name(&self, name: &str) -> Option<&Playlist> {
        let name = name.trim();
        self.playlists.iter().find(|p| p.has_name(name))
    }

    /// The active playlist: the stored choice while it exists, else the first.
    pub fn selected_id(&self) -> Option<&str> {
        self.selected
            .as_deref()
            .filter(|id| self.get(id).is_some())
            .or_else(|| self.playlists.first().map(|p| p.id.as_str()))
    }

    pub fn selected(&self) -> Option<&Playlist> {
        self.selected_id().and_then(|id| self.get(id))
    }

    pub fn len(&self) -> usize {
        self.playlists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.playlists.is_empty()
    }

    pub fn options(&self) -> StoreOptions {
        self.options
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    // ── Commands ────────────────────────────────────────────────

    /// Append a new, empty playlist.
    pub fn create_playlist(&mut self, name: &str) -> Result<Playlist, PlaylistError> {
        let name = validate_name(name)?;
        if self.find_by_name(name).is_some() {
            return Err(PlaylistError::DuplicateName(name.to_string()));
        }

        let playlist = Playlist::new(self.next_id(), name);
        let mut staged = self.playlists.clone();
        staged.push(playlist.clone());
        self.commit(
            staged,
            StoreEvent::Created {
                id: playlist.id.clone(),
            },
        )?;

        tracing::info!(id = %playlist.id, name = %playlist.name, "created playlist");
        Ok(playlist)
    }

    /// Remove a playlist. Returns `false` when the id is unknown.
    pub fn delete_playlist(&mut self, id: &str) -> Result<bool, PlaylistError> {
        if self.get(id).is_none() {
            return Ok(false);
        }

        let staged: Vec<Playlist> = self
            .playlists
            .iter()
            .filter(|p| p.id != id)
            .cloned()
            .collect();
        self.commit(staged, StoreEvent::Deleted { id: id.to_string() })?;

        if self.selected.as_deref() == Some(id) {
            let fallback = self.playlists.first().map(|p| p.id.clone());
            self.follow_selection(fallback);
        }

        tracing::info!(id, "deleted playlist");
        Ok(true)
    }

    /// Rename a playlist. Returns `false` when the id is unknown.
    pub fn rename_playlist(&mut self, id: &str, new_name: &str) -> Result<bool, PlaylistError> {
        let name = validate_name(new_name)?;
        if self.get(id).is_none() {
            return Ok(false);
        }

        if self.options.rename_policy == RenamePolicy::RequireUnique
            && self.playlists.iter().any(|p| p.id != id && p.has_name(name))
        {
            return Err(PlaylistError::DuplicateName(name.to_string()));
        }

        let mut staged = self.playlists.clone();
        if let Some(playlist) = staged.iter_mut().find(|p| p.id == id) {
            playlist.name = name.to_string();
        }
        self.commit(
            staged,
            StoreEvent::Renamed {
                id: id.to_string(),
                name: name.to_string(),
            },
        )?;

        tracing::info!(id, name, "renamed playlist");
        Ok(true)
    }

    /// Append `anime` to a playlist, rejecting a duplicate id.
    pub fn add_anime_to_playlist(
        &mut self,
        playlist_id: &str,
        anime: AnimeRecord,
    ) -> Result<(), PlaylistError> {
        let playlist_id = playlist_id.trim();
        if playlist_id.is_empty() {
            return Err(PlaylistError::NoPlaylistSelected);
        }

        let Some(index) = self.playlists.iter().position(|p| p.id == playlist_id) else {
            return Err(PlaylistError::PlaylistNotFound(playlist_id.to_string()));
        };

        let target = &self.playlists[index];
        if target.contains(&anime.id) {
            return Err(PlaylistError::DuplicateAnime {
                anime_id: anime.id,
                playlist: target.name.clone(),
            });
        }

        let anime_id = anime.id.clone();
        let mut staged = self.playlists.clone();
        staged[index].animes.push(anime);
        self.commit(
            staged,
            StoreEvent::AnimeAdded {
                playlist_id: playlist_id.to_string(),
                anime_id: anime_id.clone(),
            },
        )?;

        tracing::debug!(playlist_id, anime_id = %anime_id, "added anime to playlist");
        Ok(())
    }

    /// Append `anime` to the selected playlist.
    pub fn add_anime_to_selected(&mut self, anime: AnimeRecord) -> Result<(), PlaylistError> {
        let selected = self.selected_id().unwrap_or_default().to_string();
        self.add_anime_to_playlist(&selected, anime)
    }

    /// Remove an anime from a playlist. Absent ids leave everything as is.
    pub fn remove_anime_from_playlist(
        &mut self,
        playlist_id: &str,
        anime_id: &str,
    ) -> Result<bool, PlaylistError> {
        let playlist_id = playlist_id.trim();
        let Some(index) = self
            .playlists
            .iter()
            .position(|p| p.id == playlist_id && p.contains(anime_id))
        else {
            return Ok(false);
        };

        let mut staged = self.playlists.clone();
        staged[index].animes.retain(|a| a.id != anime_id);
        self.commit(
            staged,
            StoreEvent::AnimeRemoved {
                playlist_id: playlist_id.to_string(),
                anime_id: anime_id.to_string(),
            },
        )?;

        tracing::debug!(playlist_id, anime_id, "removed anime from playlist");
        Ok(true)
    }

    /// Make `id` the target of add-to-selected and persist the choice.
    pub fn select_playlist(&mut self, id: &str) -> Result<(), PlaylistError> {
        if self.get(id).is_none() {
            return Err(PlaylistError::PlaylistNotFound(id.to_string()));
        }
        self.write_selection(Some(id.to_string()))
    }

    // ── Import / export ─────────────────────────────────────────

    /// The persisted representation of the whole collection.
    pub fn export_json(&self) -> Result<String, PlaylistError> {
        serde_json::to_string_pretty(&self.playlists)
            .map_err(|e| PlaylistError::Storage(e.into()))
    }

    /// Replace the whole collection from an exported blob.
    ///
    /// Unlike `load`, a blob that breaks the collection invariants is
    /// rejected rather than accepted as-is.
    pub fn import_json(&mut self, blob: &str) -> Result<usize, PlaylistError> {
        let staged = decode_collection(blob)?;
        check_invariants(&staged)?;

        let count = staged.len();
        self.commit(staged, StoreEvent::Replaced)?;

        let selection = resolve_selection(&self.playlists, self.selected.as_deref());
        if selection != self.selected {
            self.follow_selection(selection);
        }

        tracing::info!(count, "imported playlists");
        Ok(count)
    }

    // ── Subscribers ─────────────────────────────────────────────

    /// Register a callback run after every committed change.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&StoreEvent) + Send + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    // ── Internals ───────────────────────────────────────────────

    /// Playlist ids are creation timestamps in milliseconds, bumped past any
    /// id already taken.
    fn next_id(&self) -> String {
        let mut millis = Utc::now().timestamp_millis();
        loop {
            let candidate = millis.to_string();
            if self.get(&candidate).is_none() {
                return candidate;
            }
            millis += 1;
        }
    }

    fn commit(&mut self, staged: Vec<Playlist>, event: StoreEvent) -> Result<(), PlaylistError> {
        let blob = serde_json::to_string(&staged).map_err(|e| PlaylistError::Storage(e.into()))?;
        self.storage.set(keys::PLAYLISTS, &blob)?;
        self.playlists = staged;
        self.emit(&event);
        Ok(())
    }

    fn write_selection(&mut self, id: Option<String>) -> Result<(), PlaylistError> {
        match id.as_deref() {
            Some(id) => self.storage.set(keys::SELECTED_PLAYLIST_ID, id)?,
            None => self.storage.remove(keys::SELECTED_PLAYLIST_ID)?,
        }
        self.selected = id.clone();
        self.emit(&StoreEvent::Selected { id });
        Ok(())
    }

    /// Move the selection after a change that is already committed.
    ///
    /// The collection is saved at this point, so a failed write only leaves a
    /// stale key behind, which `load` resolves to the same fallback.
    fn follow_selection(&mut self, id: Option<String>) {
        if let Err(e) = self.write_selection(id.clone()) {
            tracing::warn!(error = %e, "could not save playlist selection");
            self.selected = id.clone();
            self.emit(&StoreEvent::Selected { id });
        }
    }

    fn emit(&mut self, event: &StoreEvent) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(event);
        }
    }
}

fn validate_name(name: &str) -> Result<&str, PlaylistError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(PlaylistError::Validation(
            "playlist name must not be empty".into(),
        ));
    }
    Ok(trimmed)
}

fn decode_collection(blob: &str) -> Result<Vec<Playlist>, PlaylistError> {
    serde_json::from_str(blob).map_err(|e| PlaylistError::StorageParse(e.to_string()))
}

fn check_invariants(playlists: &[Playlist]) -> Result<(), PlaylistError> {
    let mut ids = HashSet::new();
    let mut names = HashSet::new();
    for playlist in playlists {
        if playlist.name.trim().is_empty() {
            return Err(PlaylistError::StorageParse(format!(
                "playlist {} has an empty name",
                playlist.id
            )));
        }
        if !ids.insert(playlist.id.as_str()) {
            return Err(PlaylistError::StorageParse(format!(
                "duplicate playlist id {}",
                playlist.id
            )));
        }
        if !names.insert(playlist.name.to_lowercase()) {
            return Err(PlaylistError::StorageParse(format!(
                "duplicate playlist name \"{}\"",
                playlist.name
            )));
        }
        let mut anime_ids = HashSet::new();
        for anime in &playlist.animes {
            if !anime_ids.insert(anime.id.as_str()) {
                return Err(PlaylistError::StorageParse(format!(
                    "anime {} appears twice in \"{}\"",
                    anime.id, playlist.name
                )));
            }
        }
    }
    Ok(())
}

/// Keep `stored` if it still names a playlist, else fall back to the first.
fn resolve_selection(playlists: &[Playlist], stored: Option<&str>) -> Option<String> {
    stored
        .filter(|id| playlists.iter().any(|p| p.id == *id))
        .map(str::to_string)
        .or_else(|| playlists.first().map(|p| p.id.clone()))
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::error::AnidexError;
    use crate::storage::{MemoryStore, SqliteStore};

    fn anime(id: &str) -> AnimeRecord {
        AnimeRecord {
            id: id.into(),
            title: format!("Anime {id}"),
            genre: "Action".into(),
            rating: 8.5,
            image: format!("https://example.com/{id}.jpg"),
            description: None,
        }
    }

    fn empty_store() -> PlaylistStore<MemoryStore> {
        PlaylistStore::load(MemoryStore::new(), StoreOptions::default()).unwrap()
    }

    /// Storage whose writes can be switched off.
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryStore,
        fail_writes: Cell<bool>,
        fail_removes: Cell<bool>,
    }

    impl KeyValueStore for FlakyStore {
        fn get(&self, key: &str) -> Result<Option<String>, AnidexError> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), AnidexError> {
            if self.fail_writes.get() {
                return Err(AnidexError::Io(std::io::Error::other("disk full")));
            }
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<(), AnidexError> {
            if self.fail_removes.get() {
                return Err(AnidexError::Io(std::io::Error::other("read-only")));
            }
            self.inner.remove(key)
        }
    }

    #[test]
    fn test_create_adds_one_empty_playlist() {
        let mut store = empty_store();
        for (i, name) in ["Action", "Romance", "  Isekai  "].iter().enumerate() {
            let created = store.create_playlist(name).unwrap();
            assert_eq!(store.len(), i + 1);
            assert!(created.animes.is_empty());
            assert_eq!(created.name, name.trim());
        }
        let ids: HashSet<_> = store.playlists().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn test_create_rejects_empty_name() {
        let mut store = empty_store();
        let err = store.create_playlist("   ").unwrap_err();
        assert!(matches!(err, PlaylistError::Validation(_)));
        assert!(store.is_empty());
        assert_eq!(store.storage().get(keys::PLAYLISTS).unwrap(), None);
    }

    #[test]
    fn test_create_rejects_case_insensitive_duplicate() {
        let mut store = empty_store();
        store.create_playlist("Favorites").unwrap();
        let err = store.create_playlist("favorites").unwrap_err();
        assert!(matches!(err, PlaylistError::DuplicateName(ref n) if n == "favorites"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_add_same_anime_twice_is_reported() {
        let mut store = empty_store();
        let id = store.create_playlist("Action").unwrap().id;
        store.add_anime_to_playlist(&id, anime("42")).unwrap();

        let err = store.add_anime_to_playlist(&id, anime("42")).unwrap_err();
        assert!(matches!(
            err,
            PlaylistError::DuplicateAnime { ref anime_id, ref playlist }
                if anime_id == "42" && playlist == "Action"
        ));
        assert_eq!(store.get(&id).unwrap().animes.len(), 1);
    }

    #[test]
    fn test_add_requires_playlist_id() {
        let mut store = empty_store();
        store.create_playlist("Action").unwrap();
        let err = store.add_anime_to_playlist("", anime("1")).unwrap_err();
        assert!(matches!(err, PlaylistError::NoPlaylistSelected));
    }

    #[test]
    fn test_add_to_selected_without_playlists() {
        let mut store = empty_store();
        let err = store.add_anime_to_selected(anime("1")).unwrap_err();
        assert!(matches!(err, PlaylistError::NoPlaylistSelected));
    }

    #[test]
    fn test_first_playlist_is_selected_implicitly() {
        let mut store = empty_store();
        let first = store.create_playlist("First").unwrap().id;
        store.create_playlist("Second").unwrap();

        store.add_anime_to_selected(anime("1")).unwrap();
        assert!(store.get(&first).unwrap().contains("1"));
    }

    #[test]
    fn test_remove_absent_anime_is_noop() {
        let mut store = empty_store();
        let id = store.create_playlist("Action").unwrap().id;
        store.add_anime_to_playlist(&id, anime("1")).unwrap();
        let before = store.playlists().to_vec();
        let blob_before = store.storage().get(keys::PLAYLISTS).unwrap();

        assert!(!store.remove_anime_from_playlist(&id, "999").unwrap());
        assert!(!store.remove_anime_from_playlist("nope", "1").unwrap());

        assert_eq!(store.playlists(), before.as_slice());
        assert_eq!(store.storage().get(keys::PLAYLISTS).unwrap(), blob_before);
    }

    #[test]
    fn test_remove_present_anime() {
        let mut store = empty_store();
        let id = store.create_playlist("Action").unwrap().id;
        store.add_anime_to_playlist(&id, anime("1")).unwrap();
        store.add_anime_to_playlist(&id, anime("2")).unwrap();

        assert!(store.remove_anime_from_playlist(&format!(" {id} "), "1").unwrap());
        let remaining: Vec<_> = store.get(&id).unwrap().animes.iter().map(|a| &a.id).collect();
        assert_eq!(remaining, vec!["2"]);
    }

    #[test]
    fn test_add_after_delete_is_not_found() {
        let mut store = empty_store();
        let id = store.create_playlist("Action").unwrap().id;
        assert!(store.delete_playlist(&id).unwrap());

        let err = store.add_anime_to_playlist(&id, anime("1")).unwrap_err();
        assert!(matches!(err, PlaylistError::PlaylistNotFound(ref missing) if *missing == id));
    }

    #[test]
    fn test_delete_unknown_is_noop() {
        let mut store = empty_store();
        store.create_playlist("Action").unwrap();
        assert!(!store.delete_playlist("missing").unwrap());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_roundtrip_through_storage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("anidex.db");

        let original = {
            let mut store =
                PlaylistStore::load(SqliteStore::open(&path).unwrap(), StoreOptions::default())
                    .unwrap();
            let action = store.create_playlist("Action").unwrap().id;
            let drama = store.create_playlist("Drama").unwrap().id;
            store.add_anime_to_playlist(&action, anime("1")).unwrap();
            let mut described = anime("2");
            described.description = Some("Space bounty hunters.".into());
            store.add_anime_to_playlist(&drama, described).unwrap();
            store.select_playlist(&drama).unwrap();
            store.playlists().to_vec()
        };

        let reloaded =
            PlaylistStore::load(SqliteStore::open(&path).unwrap(), StoreOptions::default())
                .unwrap();
        assert_eq!(reloaded.playlists(), original.as_slice());
        assert_eq!(reloaded.selected_id(), Some(original[1].id.as_str()));
    }

    #[test]
    fn test_scenario_create_then_add() {
        let mut store = empty_store();
        let id = store.create_playlist("Action").unwrap().id;
        store.add_anime_to_playlist(&id, anime("42")).unwrap();

        assert_eq!(store.len(), 1);
        let playlist = &store.playlists()[0];
        assert_eq!(playlist.name, "Action");
        assert_eq!(playlist.animes.len(), 1);
        assert_eq!(playlist.animes[0].id, "42");
    }

    #[test]
    fn test_corrupt_blob_resets_and_clears_key() {
        let storage = MemoryStore::new();
        storage.set(keys::PLAYLISTS, "{not json").unwrap();

        let store = PlaylistStore::load(storage, StoreOptions::default()).unwrap();
        assert!(store.is_empty());
        assert_eq!(store.storage().get(keys::PLAYLISTS).unwrap(), None);
    }

    #[test]
    fn test_non_array_blob_is_corrupt() {
        let storage = MemoryStore::new();
        storage.set(keys::PLAYLISTS, r#"{"id":"1"}"#).unwrap();

        let store = PlaylistStore::load(storage, StoreOptions::default()).unwrap();
        assert!(store.is_empty());
        assert_eq!(store.storage().get(keys::PLAYLISTS).unwrap(), None);
    }

    #[test]
    fn test_loads_blob_without_description_fields() {
        let storage = MemoryStore::new();
        storage
            .set(
                keys::PLAYLISTS,
                r#"[{"id":"1700000000000","name":"Action","animes":[
                    {"id":"42","title":"Bebop","genre":"Sci-Fi","rating":8.8,
                     "image":"https://example.com/b.jpg"}]}]"#,
            )
            .unwrap();

        let store = PlaylistStore::load(storage, StoreOptions::default()).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.playlists()[0].animes[0].description, None);
    }

    #[test]
    fn test_selection_falls_back_to_first_when_stale() {
        let storage = MemoryStore::new();
        {
            let mut store = PlaylistStore::load(&storage, StoreOptions::default()).unwrap();
            store.create_playlist("First").unwrap();
            store.create_playlist("Second").unwrap();
        }
        storage.set(keys::SELECTED_PLAYLIST_ID, "gone").unwrap();

        let store = PlaylistStore::load(&storage, StoreOptions::default()).unwrap();
        assert_eq!(store.selected().unwrap().name, "First");
    }

    #[test]
    fn test_selection_survives_reload() {
        let storage = MemoryStore::new();
        let second = {
            let mut store = PlaylistStore::load(&storage, StoreOptions::default()).unwrap();
            store.create_playlist("First").unwrap();
            let second = store.create_playlist("Second").unwrap().id;
            store.select_playlist(&second).unwrap();
            second
        };

        let mut store = PlaylistStore::load(&storage, StoreOptions::default()).unwrap();
        assert_eq!(store.selected_id(), Some(second.as_str()));

        store.add_anime_to_selected(anime("7")).unwrap();
        assert!(store.get(&second).unwrap().contains("7"));
    }

    #[test]
    fn test_select_unknown_playlist() {
        let mut store = empty_store();
        let err = store.select_playlist("missing").unwrap_err();
        assert!(matches!(err, PlaylistError::PlaylistNotFound(_)));
        assert_eq!(store.selected_id(), None);
    }

    #[test]
    fn test_deleting_selected_moves_selection() {
        let mut store = empty_store();
        let first = store.create_playlist("First").unwrap().id;
        let second = store.create_playlist("Second").unwrap().id;
        store.select_playlist(&first).unwrap();

        store.delete_playlist(&first).unwrap();
        assert_eq!(store.selected_id(), Some(second.as_str()));

        store.delete_playlist(&second).unwrap();
        assert_eq!(store.selected_id(), None);
        assert_eq!(
            store.storage().get(keys::SELECTED_PLAYLIST_ID).unwrap(),
            None
        );
    }

    #[test]
    fn test_delete_survives_failed_selection_write() {
        let mut store = PlaylistStore::load(FlakyStore::default(), StoreOptions::default()).unwrap();
        let id = store.create_playlist("Only").unwrap().id;
        store.select_playlist(&id).unwrap();

        store.storage().fail_removes.set(true);
        assert!(store.delete_playlist(&id).unwrap());
        assert!(store.is_empty());
        assert_eq!(store.selected_id(), None);
        assert_eq!(store.storage().get(keys::PLAYLISTS).unwrap().as_deref(), Some("[]"));

        // The stale key still names the deleted playlist; reloading ignores it.
        let FlakyStore { inner, .. } = store.storage;
        let reloaded = PlaylistStore::load(inner, StoreOptions::default()).unwrap();
        assert!(reloaded.is_empty());
        assert_eq!(reloaded.selected_id(), None);
    }

    #[test]
    fn test_rename_trims_and_validates() {
        let mut store = empty_store();
        let id = store.create_playlist("Action").unwrap().id;

        assert!(store.rename_playlist(&id, "  Shounen ").unwrap());
        assert_eq!(store.get(&id).unwrap().name, "Shounen");

        let err = store.rename_playlist(&id, "  ").unwrap_err();
        assert!(matches!(err, PlaylistError::Validation(_)));
        assert_eq!(store.get(&id).unwrap().name, "Shounen");

        assert!(!store.rename_playlist("missing", "Other").unwrap());
    }

    #[test]
    fn test_rename_allows_duplicates_by_default() {
        let mut store = empty_store();
        store.create_playlist("Action").unwrap();
        let id = store.create_playlist("Drama").unwrap().id;

        assert!(store.rename_playlist(&id, "ACTION").unwrap());
        assert_eq!(store.get(&id).unwrap().name, "ACTION");
    }

    #[test]
    fn test_rename_require_unique() {
        let options = StoreOptions {
            rename_policy: RenamePolicy::RequireUnique,
        };
        let mut store = PlaylistStore::load(MemoryStore::new(), options).unwrap();
        store.create_playlist("Action").unwrap();
        let id = store.create_playlist("Drama").unwrap().id;

        let err = store.rename_playlist(&id, "action").unwrap_err();
        assert!(matches!(err, PlaylistError::DuplicateName(_)));
        assert_eq!(store.get(&id).unwrap().name, "Drama");

        // Changing only the case of its own name is fine.
        assert!(store.rename_playlist(&id, "DRAMA").unwrap());
    }

    #[test]
    fn test_failed_write_leaves_state_untouched() {
        let mut store = PlaylistStore::load(FlakyStore::default(), StoreOptions::default()).unwrap();
        let id = store.create_playlist("Action").unwrap().id;
        let before = store.playlists().to_vec();

        store.storage().fail_writes.set(true);
        let err = store.add_anime_to_playlist(&id, anime("1")).unwrap_err();
        assert!(matches!(err, PlaylistError::Storage(_)));
        assert!(!err.is_user_error());
        assert!(store.create_playlist("Drama").is_err());

        assert_eq!(store.playlists(), before.as_slice());
    }

    #[test]
    fn test_subscribers_see_committed_changes() {
        let mut store = empty_store();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let sub = store.subscribe(move |event| sink.lock().unwrap().push(event.clone()));

        let id = store.create_playlist("Action").unwrap().id;
        let _ = store.create_playlist("action");
        store.add_anime_to_playlist(&id, anime("1")).unwrap();
        store.select_playlist(&id).unwrap();

        assert!(store.unsubscribe(sub));
        store.delete_playlist(&id).unwrap();

        let events = seen.lock().unwrap().clone();
        assert_eq!(
            events,
            vec![
                StoreEvent::Created { id: id.clone() },
                StoreEvent::AnimeAdded {
                    playlist_id: id.clone(),
                    anime_id: "1".into(),
                },
                StoreEvent::Selected {
                    id: Some(id.clone())
                },
            ]
        );
    }

    #[test]
    fn test_export_import() {
        let mut store = empty_store();
        let id = store.create_playlist("Action").unwrap().id;
        store.add_anime_to_playlist(&id, anime("1")).unwrap();
        let exported = store.export_json().unwrap();

        let mut other = empty_store();
        other.create_playlist("Old").unwrap();
        assert_eq!(other.import_json(&exported).unwrap(), 1);
        assert_eq!(other.playlists(), store.playlists());
        assert_eq!(other.selected_id(), Some(id.as_str()));
    }

    #[test]
    fn test_import_rejects_broken_invariants() {
        let mut store = empty_store();
        store.create_playlist("Keep").unwrap();
        let before = store.playlists().to_vec();

        let dup_names = r#"[{"id":"1","name":"A","animes":[]},{"id":"2","name":"a","animes":[]}]"#;
        let dup_anime = r#"[{"id":"1","name":"A","animes":[
            {"id":"9","title":"x","genre":"g","rating":1,"image":"i"},
            {"id":"9","title":"x","genre":"g","rating":1,"image":"i"}]}]"#;

        for blob in [dup_names, dup_anime, "nope"] {
            let err = store.import_json(blob).unwrap_err();
            assert!(matches!(err, PlaylistError::StorageParse(_)));
        }
        assert_eq!(store.playlists(), before.as_slice());
    }
}
