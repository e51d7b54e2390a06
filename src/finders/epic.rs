use crate::finder::{Candidates, Found, GameFinder};
use crate::game::SearchRequest;
use crate::records;
use crate::utils::has_extension;
use std::cell::Cell;
use std::iter;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use walkdir::WalkDir;

const ITEM_KEYS: &[&str] = &["DisplayName", "InstallLocation"];

/// Reads the `.item` manifests the Epic Games Launcher writes for every installed game.
pub struct EpicGamesFinder {
    manifest_dir: Option<PathBuf>,
}

impl Default for EpicGamesFinder {
    fn default() -> Self {
        Self {
            manifest_dir: default_manifest_dir(),
        }
    }
}

impl EpicGamesFinder {
    pub fn with_manifest_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            manifest_dir: Some(dir.into()),
        }
    }
}

fn default_manifest_dir() -> Option<PathBuf> {
    let data_dir = if cfg!(windows) {
        std::env::var_os("ProgramData").map(PathBuf::from)
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
    } else {
        None
    };
    data_dir.map(|dir| dir.join("Epic").join("EpicGamesLauncher").join("Data").join("Manifests"))
}

impl GameFinder for EpicGamesFinder {
    fn name(&self) -> &'static str {
        "EpicGamesFinder"
    }

    fn find_game<'a>(&'a self, request: &'a SearchRequest) -> Candidates<'a> {
        let Some(manifest_dir) = self.manifest_dir.as_deref().filter(|dir| dir.is_dir()) else {
            return Box::new(iter::once(Found::Error(
                "Epic Games manifest directory does not exist. Verify that Epic Games Store has been installed"
                    .to_string(),
            )));
        };

        // Set once a manifest matched; the orchestrator reports rejected installs itself.
        let matched = Rc::new(Cell::new(false));
        let seen = Rc::clone(&matched);
        let matches = WalkDir::new(manifest_dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file() && has_extension(entry.path(), "item"))
            .filter_map(move |entry| install_location(entry.path(), request))
            .inspect(move |_| seen.set(true))
            .map(Found::Candidate);
        let no_match = iter::once_with(move || {
            let message = format!("No Epic Games manifest matches {}", request.name());
            (!matched.get()).then_some(Found::Error(message))
        })
        .flatten();
        Box::new(matches.chain(no_match))
    }
}

/// Install location from an item file, if the file describes the requested game.
fn install_location(item: &Path, request: &SearchRequest) -> Option<PathBuf> {
    let props = records::extract_file(item, ITEM_KEYS);
    if !props.get("displayname").is_some_and(|name| request.is_similar(name)) {
        return None;
    }
    props
        .get("installlocation")
        .filter(|location| !location.trim().is_empty())
        .map(PathBuf::from)
}
