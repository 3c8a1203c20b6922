use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use anidex_core::models::{AnimePatch, NewAnime};

/// Browse the anime catalogue and manage local playlists.
#[derive(Debug, Parser)]
#[command(name = "anidex", version, about)]
pub struct Cli {
    /// Config file to use instead of the per-user one.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Storage database to use instead of the configured one.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Log debug output to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Remote catalogue commands.
    #[command(subcommand)]
    Anime(AnimeCommand),

    /// Local playlist commands.
    #[command(subcommand)]
    Playlist(PlaylistCommand),
}

#[derive(Debug, Subcommand)]
pub enum AnimeCommand {
    /// List every anime in the catalogue.
    List,
    /// Show one anime in detail.
    Show { id: String },
    /// Add an anime to the catalogue.
    Add(AnimeFields),
    /// Change fields of an existing anime.
    Update {
        id: String,
        #[command(flatten)]
        fields: AnimeUpdateFields,
    },
    /// Remove an anime from the catalogue.
    Delete {
        id: String,
        /// Skip the confirmation prompt.
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Debug, Args)]
pub struct AnimeFields {
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub genre: String,
    #[arg(long)]
    pub rating: f64,
    #[arg(long)]
    pub image: String,
    #[arg(long)]
    pub description: Option<String>,
}

#[derive(Debug, Args)]
pub struct AnimeUpdateFields {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub genre: Option<String>,
    #[arg(long)]
    pub rating: Option<f64>,
    #[arg(long)]
    pub image: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum PlaylistCommand {
    /// List playlists and their anime.
    List,
    /// Create an empty playlist.
    Create { name: String },
    /// Rename a playlist.
    Rename { id: String, name: String },
    /// Delete a playlist.
    Delete {
        id: String,
        /// Skip the confirmation prompt.
        #[arg(short, long)]
        yes: bool,
    },
    /// Make a playlist the default target of `add`.
    Select { id: String },
    /// Fetch an anime and add it to a playlist.
    Add {
        anime_id: String,
        /// Target playlist; defaults to the selected one.
        #[arg(long)]
        playlist: Option<String>,
    },
    /// Remove an anime from a playlist.
    Remove {
        playlist_id: String,
        anime_id: String,
    },
    /// Print all playlists as JSON.
    Export,
    /// Replace all playlists from a JSON file.
    Import { file: PathBuf },
}

impl From<AnimeFields> for NewAnime {
    fn from(f: AnimeFields) -> Self {
        NewAnime {
            title: f.title,
            genre: f.genre,
            rating: f.rating,
            image: f.image,
            description: f.description,
        }
    }
}

impl From<AnimeUpdateFields> for AnimePatch {
    fn from(f: AnimeUpdateFields) -> Self {
        AnimePatch {
            title: f.title,
            genre: f.genre,
            rating: f.rating,
            image: f.image,
            description: f.description,
        }
    }
}
