use crate::finder::{Candidates, Found, GameFinder};
use crate::game::SearchRequest;
use std::iter;
use std::path::PathBuf;

/// Discord installs to `<local app data>/DiscordGames/<game>` or `C:\Games\<game>`. The game
/// files live in a `content` subfolder; the parent holds Discord's own files.
pub struct DiscordFinder {
    games_dir: Option<PathBuf>,
    fallback_root: Option<PathBuf>,
}

impl Default for DiscordFinder {
    fn default() -> Self {
        Self {
            games_dir: dirs::data_local_dir().map(|dir| dir.join("DiscordGames")),
            fallback_root: cfg!(windows).then(|| PathBuf::from(r"C:\Games")),
        }
    }
}

impl DiscordFinder {
    pub fn with_roots(games_dir: impl Into<PathBuf>, fallback_root: Option<PathBuf>) -> Self {
        Self {
            games_dir: Some(games_dir.into()),
            fallback_root,
        }
    }
}

impl GameFinder for DiscordFinder {
    fn name(&self) -> &'static str {
        "DiscordFinder"
    }

    fn find_game<'a>(&'a self, request: &'a SearchRequest) -> Candidates<'a> {
        let by_name = self
            .games_dir
            .iter()
            .chain(&self.fallback_root)
            .map(move |root| root.join(request.normalized_name()).join("content"));
        let searched = iter::once_with(move || {
            self.games_dir
                .as_deref()
                .and_then(|dir| request.find_folder_with_game_name(dir))
                .map(|game| game.join("content"))
        })
        .flatten();
        Box::new(by_name.chain(searched).map(Found::Candidate))
    }
}
