pub mod anime;
pub mod playlist;

pub use anime::{AnimePatch, AnimeRecord, NewAnime};
pub use playlist::Playlist;
