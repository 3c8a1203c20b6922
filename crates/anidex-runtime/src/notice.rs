use serde::{Deserialize, Serialize};

use anidex_core::error::PlaylistError;

/// Severity of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Success,
    Error,
    Info,
}

/// A transient message shown after a user action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == NoticeKind::Error
    }
}

impl From<&PlaylistError> for Notice {
    fn from(err: &PlaylistError) -> Self {
        match err {
            PlaylistError::Validation(_) => Notice::error("Playlist name must not be empty."),
            PlaylistError::DuplicateName(_) => {
                Notice::error("A playlist with this name already exists.")
            }
            PlaylistError::DuplicateAnime { .. } => {
                Notice::error("Anime is already in this playlist.")
            }
            PlaylistError::NoPlaylistSelected => Notice::error("Select a playlist first."),
            PlaylistError::PlaylistNotFound(_) => Notice::error("Playlist not found."),
            PlaylistError::StorageParse(reason) => {
                Notice::error(format!("Playlist data is invalid: {reason}"))
            }
            PlaylistError::Storage(e) => Notice::error(format!("Could not save playlists: {e}")),
        }
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}
