use crate::finder::{Candidates, Found, GameFinder};
use crate::game::SearchRequest;
use std::path::PathBuf;

/// The Xbox app installs to `<drive>\XboxGames\<game>\Content`, `C:` unless the user picked
/// another drive. The chosen drive is not readable from the store settings, so every drive is
/// tried.
pub struct MicrosoftFinder {
    default_root: Option<PathBuf>,
    drives: Vec<PathBuf>,
}

impl Default for MicrosoftFinder {
    fn default() -> Self {
        if !cfg!(windows) {
            return Self::with_drives(Vec::new());
        }
        Self {
            default_root: Some(PathBuf::from(r"C:\XboxGames")),
            drives: other_drives(),
        }
    }
}

impl MicrosoftFinder {
    /// Searches `<drive>/XboxGames` on the given drive roots only.
    pub fn with_drives(drives: Vec<PathBuf>) -> Self {
        Self {
            default_root: None,
            drives,
        }
    }
}

/// Drive roots other than `C:` that exist. Floppy letters are skipped.
fn other_drives() -> Vec<PathBuf> {
    ('D'..='Z')
        .map(|letter| PathBuf::from(format!(r"{letter}:\")))
        .filter(|drive| drive.is_dir())
        .collect()
}

impl GameFinder for MicrosoftFinder {
    fn name(&self) -> &'static str {
        "MicrosoftFinder"
    }

    fn find_game<'a>(&'a self, request: &'a SearchRequest) -> Candidates<'a> {
        let default = self
            .default_root
            .iter()
            .map(move |root| root.join(request.normalized_name()).join("Content"));
        let other_drives = self.drives.iter().filter_map(move |drive| {
            request
                .find_folder_with_game_name(&drive.join("XboxGames"))
                .map(|game| game.join("Content"))
        });
        Box::new(default.chain(other_drives).map(Found::Candidate))
    }
}
