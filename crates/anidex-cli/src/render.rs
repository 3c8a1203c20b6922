use std::fmt::Write as _;

use anidex_core::models::{AnimeRecord, Playlist};
use anidex_runtime::{Notice, NoticeKind};

/// One line per anime: id, title, genre and rating.
pub fn anime_row(anime: &AnimeRecord) -> String {
    format!(
        "{:>6}  {}  [{}]  ★ {}",
        anime.id, anime.title, anime.genre, anime.rating
    )
}

pub fn anime_detail(anime: &AnimeRecord) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", anime.title);
    let _ = writeln!(out, "  genre:  {}", anime.genre);
    let _ = writeln!(out, "  rating: ★ {}", anime.rating);
    let _ = writeln!(out, "  image:  {}", anime.image);
    let _ = writeln!(out);
    let _ = write!(out, "{}", anime.description_or_default());
    out
}

/// A playlist heading followed by its anime, indented.
pub fn playlist(playlist: &Playlist, selected: bool) -> String {
    let marker = if selected { "*" } else { " " };
    let mut out = format!(
        "{marker} {}  {} ({} anime)",
        playlist.id,
        playlist.name,
        playlist.animes.len()
    );
    if playlist.animes.is_empty() {
        out.push_str("\n      (empty)");
    }
    for anime in &playlist.animes {
        let _ = write!(out, "\n    {}", anime_row(anime));
    }
    out
}

pub fn notice(notice: &Notice) -> String {
    let prefix = match notice.kind {
        NoticeKind::Success => "✓",
        NoticeKind::Error => "✗",
        NoticeKind::Info => "i",
    };
    format!("{prefix} {}", notice.message)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bebop() -> AnimeRecord {
        AnimeRecord {
            id: "42".into(),
            title: "Cowboy Bebop".into(),
            genre: "Sci-Fi".into(),
            rating: 8.8,
            image: "https://example.com/bebop.jpg".into(),
            description: None,
        }
    }

    #[test]
    fn test_detail_falls_back_to_placeholder() {
        let out = anime_detail(&bebop());
        assert!(out.starts_with("Cowboy Bebop\n"));
        assert!(out.ends_with("No description."));
    }

    #[test]
    fn test_playlist_marks_selection() {
        let mut pl = Playlist::new("1", "Action");
        assert!(playlist(&pl, true).starts_with("* 1  Action (0 anime)"));
        assert!(playlist(&pl, false).contains("(empty)"));

        pl.animes.push(bebop());
        let out = playlist(&pl, false);
        assert!(out.contains("Cowboy Bebop  [Sci-Fi]"));
        assert!(!out.contains("(empty)"));
    }

    #[test]
    fn test_notice_prefix() {
        assert_eq!(notice(&Notice::error("nope")), "✗ nope");
        assert_eq!(notice(&Notice::success("ok")), "✓ ok");
    }
}
