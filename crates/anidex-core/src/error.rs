use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnidexError {
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialize error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Errors from playlist operations.
///
/// Everything except `Storage` is a rejected command: the collection is left
/// exactly as it was.
#[derive(Debug, Error)]
pub enum PlaylistError {
    #[error("{0}")]
    Validation(String),

    #[error("a playlist named \"{0}\" already exists")]
    DuplicateName(String),

    #[error("anime {anime_id} is already in playlist \"{playlist}\"")]
    DuplicateAnime { anime_id: String, playlist: String },

    #[error("no playlist selected")]
    NoPlaylistSelected,

    #[error("playlist not found: {0}")]
    PlaylistNotFound(String),

    #[error("stored playlists are corrupt: {0}")]
    StorageParse(String),

    #[error(transparent)]
    Storage(#[from] AnidexError),
}

impl PlaylistError {
    /// True when the error is a rejected user command rather than an I/O failure.
    pub fn is_user_error(&self) -> bool {
        !matches!(self, Self::Storage(_))
    }
}
