use anyhow::{Context, Result};
use game_discovery::SearchRequest;
use game_discovery::path_has_executable;
use game_discovery::utils::{dir_has_executable, sanitize_filename};
use std::fs;
use std::path::{Path, PathBuf};

/// Remembers the last discovered path of a game between runs.
pub struct Cache {
    file: PathBuf,
}

impl Cache {
    pub fn new(dir: &Path, game: &str) -> Self {
        let file_name = format!("{}.cache", sanitize_filename(game, ""));
        Self {
            file: dir.join("gamediscovery").join(file_name),
        }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    /// The cached path, if it still holds the game's executable.
    pub fn read_valid(&self, request: &SearchRequest) -> Option<PathBuf> {
        let cached = fs::read_to_string(&self.file).ok()?;
        let path = PathBuf::from(cached.trim());
        if path.as_os_str().is_empty() {
            return None;
        }

        let quick = request.exe_name().is_empty() && dir_has_executable(&path);
        (quick || path_has_executable(&path, request.exe_name(), request.search_depth())).then_some(path)
    }

    /// Stores `path`, or an empty entry when nothing was found.
    pub fn store(&self, path: Option<&Path>) -> Result<()> {
        if let Some(parent) = self.file.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create cache dir {}", parent.display()))?;
        }
        let contents = path.map(|p| p.to_string_lossy().into_owned()).unwrap_or_default();
        fs::write(&self.file, contents)
            .with_context(|| format!("Failed to write cache {}", self.file.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Scratch directory removed on drop, even when an assert fails.
    struct Scratch(PathBuf);

    impl Scratch {
        fn new(name: &str) -> Self {
            let dir = std::env::temp_dir().join(format!("discover-cache-{}-{name}", std::process::id()));
            let _ = fs::remove_dir_all(&dir);
            fs::create_dir_all(&dir).unwrap();
            Self(dir)
        }
    }

    impl Drop for Scratch {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.0);
        }
    }

    #[test]
    fn file_name_is_sanitized() {
        let cache = Cache::new(Path::new("obj"), "Subnautica: Below Zero");
        assert!(cache.file().ends_with("gamediscovery/Subnautica Below Zero.cache"));
    }

    #[test]
    fn stored_path_is_read_back_while_valid() {
        let scratch = Scratch::new("valid");
        let game = scratch.0.join("Game");
        fs::create_dir_all(&game).unwrap();
        fs::write(game.join("Game.exe"), b"MZ\x90\x00").unwrap();

        let request = SearchRequest::new("Game").unwrap();
        let cache = Cache::new(&scratch.0, request.name());
        assert_eq!(cache.read_valid(&request), None);

        cache.store(Some(&game)).unwrap();
        assert_eq!(cache.read_valid(&request), Some(game.clone()));

        fs::remove_file(game.join("Game.exe")).unwrap();
        assert_eq!(cache.read_valid(&request), None);
    }

    #[test]
    fn empty_entry_is_a_miss() {
        let scratch = Scratch::new("empty");
        let request = SearchRequest::new("Game").unwrap();
        let cache = Cache::new(&scratch.0, request.name());
        cache.store(None).unwrap();
        assert_eq!(fs::read_to_string(cache.file()).unwrap(), "");
        assert_eq!(cache.read_valid(&request), None);
    }

    #[test]
    fn scratch_is_removed_on_drop() {
        let scratch = Scratch::new("drop");
        let dir = scratch.0.clone();
        assert!(dir.is_dir());
        drop(scratch);
        assert!(!dir.exists());
    }
}
