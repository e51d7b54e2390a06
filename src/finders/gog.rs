use crate::finder::{Candidates, Found, GameFinder};
use crate::game::SearchRequest;
use crate::registry::{self, Hive, SharedRegistry};
use std::path::PathBuf;

const GOG_GAMES_KEY: &str = r"SOFTWARE\WOW6432Node\GOG.com\Games";

/// GOG Galaxy registers every installed game under [`GOG_GAMES_KEY`], one subkey per game id.
/// Hosts without a registry have nothing to find.
pub struct GogFinder {
    registry: SharedRegistry,
}

impl Default for GogFinder {
    fn default() -> Self {
        Self::with_registry(registry::system())
    }
}

impl GogFinder {
    pub fn with_registry(registry: SharedRegistry) -> Self {
        Self { registry }
    }

    fn game_path(&self, game_id: &str, request: &SearchRequest) -> Option<PathBuf> {
        let key = format!(r"{GOG_GAMES_KEY}\{game_id}");
        let path: PathBuf = self.registry.read_or(Hive::LocalMachine, &key, "path", PathBuf::new());
        if path.as_os_str().is_empty() {
            return None;
        }

        let folder_matches = path
            .file_name()
            .is_some_and(|folder| request.is_similar(&folder.to_string_lossy()));
        let name_matches = || {
            self.registry
                .read_string(Hive::LocalMachine, &key, "gameName")
                .is_some_and(|name| request.is_similar(&name))
        };
        (folder_matches || name_matches()).then_some(path)
    }
}

impl GameFinder for GogFinder {
    fn name(&self) -> &'static str {
        "GogFinder"
    }

    fn find_game<'a>(&'a self, request: &'a SearchRequest) -> Candidates<'a> {
        let game_ids = self.registry.subkey_names(Hive::LocalMachine, GOG_GAMES_KEY);
        Box::new(
            game_ids
                .into_iter()
                .filter_map(move |id| self.game_path(&id, request))
                .map(Found::Candidate),
        )
    }
}
