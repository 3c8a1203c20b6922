use std::io::{BufRead, Write};
use std::process::ExitCode;

use anidex_api::CatalogService;
use anidex_core::error::AnidexError;
use anidex_core::models::AnimePatch;
use anidex_core::storage::KeyValueStore;
use anidex_runtime::{Notice, Runtime, RuntimeError};

use crate::cli::{AnimeCommand, Command, PlaylistCommand};
use crate::render;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
    #[error("config error: {0}")]
    Config(#[from] AnidexError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Usage(String),
}

pub async fn run<C, S>(rt: &mut Runtime<C, S>, command: Command) -> Result<ExitCode, CliError>
where
    C: CatalogService<Error = anidex_api::CatalogError>,
    S: KeyValueStore,
{
    tracing::debug!(?command, "running command");
    match command {
        Command::Anime(cmd) => run_anime(rt, cmd).await,
        Command::Playlist(cmd) => run_playlist(rt, cmd).await,
    }
}

async fn run_anime<C, S>(rt: &mut Runtime<C, S>, cmd: AnimeCommand) -> Result<ExitCode, CliError>
where
    C: CatalogService<Error = anidex_api::CatalogError>,
    S: KeyValueStore,
{
    match cmd {
        AnimeCommand::List => {
            let records = rt.list_anime().await?;
            if records.is_empty() {
                println!("No anime in the catalogue.");
            }
            for anime in &records {
                println!("{}", render::anime_row(anime));
            }
        }
        AnimeCommand::Show { id } => {
            let anime = rt.anime_detail(&id).await?;
            println!("{}", render::anime_detail(&anime));
        }
        AnimeCommand::Add(fields) => {
            let created = rt.add_anime(fields.into()).await?;
            println!("{}", render::anime_row(&created));
        }
        AnimeCommand::Update { id, fields } => {
            let patch = AnimePatch::from(fields);
            if patch.is_empty() {
                return Err(CliError::Usage("nothing to update".into()));
            }
            let updated = rt.update_anime(&id, patch).await?;
            println!("{}", render::anime_row(&updated));
        }
        AnimeCommand::Delete { id, yes } => {
            if !yes && !confirm(&format!("Delete anime {id} from the catalogue?"))? {
                tracing::debug!(id, "anime delete cancelled");
                return Ok(ExitCode::SUCCESS);
            }
            rt.delete_anime(&id).await?;
            println!("{}", render::notice(&Notice::success("Anime deleted.")));
        }
    }
    Ok(ExitCode::SUCCESS)
}

async fn run_playlist<C, S>(
    rt: &mut Runtime<C, S>,
    cmd: PlaylistCommand,
) -> Result<ExitCode, CliError>
where
    C: CatalogService<Error = anidex_api::CatalogError>,
    S: KeyValueStore,
{
    let notice = match cmd {
        PlaylistCommand::List => {
            let selected = rt.playlists().selected_id().map(str::to_string);
            if rt.list_playlists().is_empty() {
                println!("No playlists yet. Create one with `anidex playlist create <name>`.");
            }
            for playlist in rt.list_playlists() {
                let is_selected = selected.as_deref() == Some(playlist.id.as_str());
                println!("{}", render::playlist(playlist, is_selected));
            }
            return Ok(ExitCode::SUCCESS);
        }
        PlaylistCommand::Export => {
            println!("{}", rt.export_playlists()?);
            return Ok(ExitCode::SUCCESS);
        }
        PlaylistCommand::Create { name } => rt.create_playlist(&name),
        PlaylistCommand::Rename { id, name } => rt.rename_playlist(&id, &name),
        PlaylistCommand::Delete { id, yes } => {
            if !yes && !confirm("Delete this playlist?")? {
                tracing::debug!(id, "playlist delete cancelled");
                return Ok(ExitCode::SUCCESS);
            }
            rt.delete_playlist(&id)
        }
        PlaylistCommand::Select { id } => rt.select_playlist(&id),
        PlaylistCommand::Add { anime_id, playlist } => {
            rt.add_to_playlist(&anime_id, playlist.as_deref()).await
        }
        PlaylistCommand::Remove {
            playlist_id,
            anime_id,
        } => rt.remove_from_playlist(&playlist_id, &anime_id),
        PlaylistCommand::Import { file } => {
            tracing::debug!(path = %file.display(), "reading playlist import");
            let blob = std::fs::read_to_string(&file)?;
            rt.import_playlists(&blob)
        }
    };

    println!("{}", render::notice(&notice));
    Ok(if notice.is_error() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

/// Ask a yes/no question on the terminal. Anything but `y`/`yes` is a no.
fn confirm(question: &str) -> Result<bool, CliError> {
    let mut stdout = std::io::stdout();
    write!(stdout, "{question} [y/N] ")?;
    stdout.flush()?;

    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
