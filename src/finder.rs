use crate::finders::{DiscordFinder, EpicGamesFinder, GogFinder, MicrosoftFinder, SteamFinder};
use crate::game::SearchRequest;
use crate::platform::Platform;
use crate::utils::{has_extension, is_executable_file, path_depth, prettify_path};
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// One item produced by a [`GameFinder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Found {
    /// A directory that might hold the game. Not verified yet.
    Candidate(PathBuf),
    /// The finder gave up, for example because its store is not installed.
    Error(String),
}

pub type Candidates<'a> = Box<dyn Iterator<Item = Found> + 'a>;

/// Knows where one store keeps its games.
///
/// Finders only propose directories, most likely first; checking them for an executable is
/// left to [`InstallationFinder`], which stops pulling candidates at the first good one.
pub trait GameFinder {
    /// Identifies the finder in results and log messages.
    fn name(&self) -> &'static str;

    fn find_game<'a>(&'a self, request: &'a SearchRequest) -> Candidates<'a>;
}

pub type BoxedFinder = Box<dyn GameFinder + Send + Sync>;

/// The outcome of searching one platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinderResult {
    pub platform: Platform,
    pub finder_name: &'static str,
    /// Absolute path of the installation, or why none was found.
    pub outcome: Result<PathBuf, String>,
}

impl FinderResult {
    pub fn path(&self) -> Option<&Path> {
        self.outcome.as_deref().ok()
    }

    pub fn error(&self) -> Option<&str> {
        self.outcome.as_ref().err().map(String::as_str)
    }

    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Searches game stores for an installation, one [`GameFinder`] per platform.
pub struct InstallationFinder {
    finders: HashMap<Platform, BoxedFinder>,
}

impl InstallationFinder {
    /// `finders` maps single platforms to the finder responsible for them.
    pub fn new(finders: impl IntoIterator<Item = (Platform, BoxedFinder)>) -> Self {
        Self {
            finders: finders.into_iter().collect(),
        }
    }

    /// All built-in finders, looking in the places the host OS uses by default.
    pub fn with_default_finders() -> Self {
        Self::new([
            (Platform::STEAM, Box::new(SteamFinder::default()) as BoxedFinder),
            (Platform::EPIC, Box::new(EpicGamesFinder::default()) as BoxedFinder),
            (Platform::MICROSOFT, Box::new(MicrosoftFinder::default()) as BoxedFinder),
            (Platform::GOG, Box::new(GogFinder::default()) as BoxedFinder),
            (Platform::DISCORD, Box::new(DiscordFinder::default()) as BoxedFinder),
        ])
    }

    /// Searches the given platforms in bit order. See [`InstallationFinder::find_game_in`].
    pub fn find_game<'a>(
        &'a self,
        request: &'a SearchRequest,
        platforms: Platform,
    ) -> impl Iterator<Item = FinderResult> + 'a {
        self.find_game_in(request, platforms.unique_flags())
    }

    /// Lazily yields one result per requested platform that has a finder, in the order given.
    /// Platforms without a finder are skipped. Nothing is searched until the iterator is advanced.
    pub fn find_game_in<'a, I>(
        &'a self,
        request: &'a SearchRequest,
        platforms: I,
    ) -> impl Iterator<Item = FinderResult> + 'a
    where
        I: IntoIterator<Item = Platform>,
        I::IntoIter: 'a,
    {
        platforms.into_iter().filter_map(move |platform| {
            let finder = self.finders.get(&platform)?;
            Some(search_platform(platform, finder.as_ref(), request))
        })
    }
}

fn search_platform(
    platform: Platform,
    finder: &(dyn GameFinder + Send + Sync),
    request: &SearchRequest,
) -> FinderResult {
    debug!("Searching {} for {}", platform.display_name(), request.name());

    let finish = |outcome| FinderResult {
        platform,
        finder_name: finder.name(),
        outcome,
    };

    for found in finder.find_game(request) {
        match found {
            Found::Error(message) => {
                debug!("{}: {message}", finder.name());
                return finish(Err(message));
            }
            Found::Candidate(path) => {
                if path_has_executable(&path, request.exe_name(), request.search_depth()) {
                    let path = prettify_path(&path);
                    info!("Found {} in {}", request.name(), path.display());
                    return finish(Ok(path));
                }
                debug!("{}: no executable in {}", finder.name(), path.display());
            }
        }
    }

    finish(Err(format!(
        "It appears you don't have {} installed ({} found no installation)",
        request.name(),
        finder.name()
    )))
}

/// True if `directory` holds an executable within `max_depth` levels below it.
///
/// `exe_name` may be empty to accept any executable, or just an extension such as `.exe`. When it
/// has an extension only files with that extension count; its stem must match the file stem
/// exactly. The walk is breadth first and ends at the first directory deeper than `max_depth`.
/// Failing to read a directory ends it too. Entries that can't be inspected, like dangling
/// symlinks, are skipped.
pub fn path_has_executable(directory: &Path, exe_name: &str, max_depth: usize) -> bool {
    if !directory.is_dir() {
        return false;
    }

    let (wanted_stem, wanted_ext) = split_exe_name(exe_name);

    let mut queue = VecDeque::from([directory.to_path_buf()]);
    while let Some(dir) = queue.pop_front() {
        let Some(depth) = path_depth(&dir, directory) else {
            return false;
        };
        if depth > max_depth {
            // Breadth first: everything left in the queue is at least this deep.
            return false;
        }

        let entries = WalkDir::new(&dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) if err.depth() == 0 => {
                    debug!("Stopped searching {}: {err}", directory.display());
                    return false;
                }
                Err(_) => continue,
            };
            if entry.file_type().is_dir() {
                queue.push_back(entry.into_path());
            } else if is_wanted_executable(entry.path(), wanted_ext.as_deref(), &wanted_stem) {
                return true;
            }
        }
    }
    false
}

/// Stem and extension of `exe_name`. A lone extension like `.exe` has an empty stem.
fn split_exe_name(exe_name: &str) -> (String, Option<String>) {
    if let Some(ext) = exe_name
        .strip_prefix('.')
        .filter(|ext| !ext.is_empty() && !ext.contains('.'))
    {
        return (String::new(), Some(ext.to_string()));
    }
    let exe_name = Path::new(exe_name);
    let stem = exe_name
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = exe_name.extension().map(|e| e.to_string_lossy().into_owned());
    (stem, ext)
}

fn is_wanted_executable(path: &Path, ext: Option<&str>, stem: &str) -> bool {
    if ext.is_some_and(|ext| !has_extension(path, ext)) {
        return false;
    }
    if !stem.is_empty() && path.file_stem().is_none_or(|s| s != stem) {
        return false;
    }
    is_executable_file(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::TempDir;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const MZ: &[u8] = b"MZ\x90\x00\x03\x00\x00\x00";

    fn steam_fixture(exe_contents: &[u8]) -> TempDir {
        let tmp = TempDir::new();
        tmp.write(
            "steamapps/appmanifest_1.acf",
            b"\"AppState\"\n{\n\t\"appid\"\t\t\"1\"\n\t\"name\"\t\t\"Subnautica\"\n\t\"installdir\"\t\t\"Subnautica\"\n}\n",
        );
        tmp.write("steamapps/common/Subnautica/Subnautica.exe", exe_contents);
        tmp
    }

    fn steam_only(root: &Path) -> InstallationFinder {
        InstallationFinder::new([(
            Platform::STEAM,
            Box::new(SteamFinder::with_root(root)) as BoxedFinder,
        )])
    }

    fn subnautica() -> SearchRequest {
        SearchRequest::new("Subnautica")
            .unwrap()
            .with_exe_name("Subnautica")
            .with_search_depth(0)
    }

    /// Hands out a fixed list of items and counts how many were taken.
    struct ListFinder {
        items: Vec<Found>,
        taken: Arc<AtomicUsize>,
        calls: Arc<AtomicUsize>,
    }

    impl ListFinder {
        fn new(items: Vec<Found>) -> Self {
            Self {
                items,
                taken: Arc::default(),
                calls: Arc::default(),
            }
        }
    }

    impl GameFinder for ListFinder {
        fn name(&self) -> &'static str {
            "ListFinder"
        }

        fn find_game<'a>(&'a self, _request: &'a SearchRequest) -> Candidates<'a> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            Box::new(self.items.iter().cloned().inspect(move |_| {
                self.taken.fetch_add(1, Ordering::Relaxed);
            }))
        }
    }

    #[test]
    fn finds_steam_install() {
        let tmp = steam_fixture(MZ);
        let finder = steam_only(tmp.path());
        let results: Vec<_> = finder.find_game(&subnautica(), Platform::STEAM).collect();
        assert_eq!(results.len(), 1);
        let result = &results[0];
        assert_eq!(result.platform, Platform::STEAM);
        assert_eq!(result.finder_name, "SteamFinder");
        assert_eq!(result.error(), None);
        let path = result.path().unwrap();
        assert!(path.is_absolute());
        assert!(path.ends_with("Subnautica"));
    }

    #[test]
    fn wrong_signature_is_not_found() {
        let tmp = steam_fixture(b"NOTANEXE");
        let finder = steam_only(tmp.path());
        let results: Vec<_> = finder.find_game(&subnautica(), Platform::STEAM).collect();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].path(), None);
        let error = results[0].error().unwrap();
        assert!(error.contains("Subnautica"));
        assert!(error.contains("SteamFinder"));
    }

    #[test]
    fn platforms_without_finder_are_skipped() {
        let tmp = steam_fixture(MZ);
        let finder = steam_only(tmp.path());
        let results: Vec<_> = finder.find_game(&subnautica(), Platform::ALL).collect();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].platform, Platform::STEAM);
        assert_eq!(finder.find_game(&subnautica(), Platform::EPIC).count(), 0);
    }

    #[test]
    fn stops_at_first_valid_candidate() {
        let tmp = TempDir::new();
        tmp.write("good/Subnautica.exe", MZ);
        let list = ListFinder::new(vec![
            Found::Candidate(tmp.path().join("missing")),
            Found::Candidate(tmp.path().join("good")),
            Found::Candidate(tmp.path().join("good")),
            Found::Error("never reached".to_string()),
        ]);
        let taken = list.taken.clone();
        let finder = InstallationFinder::new([(Platform::GOG, Box::new(list) as BoxedFinder)]);
        let result = finder.find_game(&subnautica(), Platform::GOG).next().unwrap();
        assert!(result.path().unwrap().ends_with("good"));
        assert_eq!(result.finder_name, "ListFinder");
        assert_eq!(taken.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn explicit_error_is_passed_through() {
        let tmp = TempDir::new();
        tmp.write("good/Subnautica.exe", MZ);
        let list = ListFinder::new(vec![
            Found::Error("Store is not installed".to_string()),
            Found::Candidate(tmp.path().join("good")),
        ]);
        let finder = InstallationFinder::new([(Platform::EPIC, Box::new(list) as BoxedFinder)]);
        let result = finder.find_game(&subnautica(), Platform::EPIC).next().unwrap();
        assert_eq!(result.error(), Some("Store is not installed"));
        assert_eq!(result.platform, Platform::EPIC);
    }

    #[test]
    fn results_follow_requested_order_and_are_lazy() {
        let first = ListFinder::new(vec![]);
        let second = ListFinder::new(vec![]);
        let second_calls = second.calls.clone();
        let finder = InstallationFinder::new([
            (Platform::DISCORD, Box::new(first) as BoxedFinder),
            (Platform::STEAM, Box::new(second) as BoxedFinder),
        ]);
        let request = subnautica();
        let mut results = finder.find_game_in(&request, [Platform::DISCORD, Platform::STEAM]);
        assert_eq!(results.next().unwrap().platform, Platform::DISCORD);
        assert_eq!(second_calls.load(Ordering::Relaxed), 0);
        assert_eq!(results.next().unwrap().platform, Platform::STEAM);
        assert_eq!(second_calls.load(Ordering::Relaxed), 1);
        assert!(results.next().is_none());
    }

    #[test]
    fn depth_bound_limits_search() {
        let tmp = TempDir::new();
        tmp.write("bin/x64/Game.exe", MZ);
        assert!(!path_has_executable(tmp.path(), "", 0));
        assert!(!path_has_executable(tmp.path(), "", 1));
        assert!(path_has_executable(tmp.path(), "", 2));
        assert!(path_has_executable(tmp.path(), "", 5));
    }

    #[test]
    fn shallow_match_found_despite_deep_tree() {
        let tmp = TempDir::new();
        tmp.write("a/b/c/d/Other.exe", MZ);
        tmp.write("Game.exe", MZ);
        assert!(path_has_executable(tmp.path(), "Game.exe", 0));
    }

    #[test]
    fn executable_name_and_extension_must_match() {
        let tmp = TempDir::new();
        tmp.write("Game.exe", MZ);
        assert!(path_has_executable(tmp.path(), "Game", 0));
        assert!(path_has_executable(tmp.path(), "Game.EXE", 0));
        assert!(!path_has_executable(tmp.path(), "game", 0));
        assert!(!path_has_executable(tmp.path(), "Game.bin", 0));
        assert!(!path_has_executable(tmp.path(), "Launcher", 0));
        assert!(!path_has_executable(&tmp.path().join("missing"), "", 0));
    }

    #[test]
    fn lone_extension_accepts_any_stem() {
        let tmp = TempDir::new();
        tmp.write("Game.exe", MZ);
        assert!(path_has_executable(tmp.path(), ".exe", 0));
        assert!(path_has_executable(tmp.path(), ".EXE", 0));
        assert!(!path_has_executable(tmp.path(), ".bin", 0));
        assert_eq!(split_exe_name(".exe"), (String::new(), Some("exe".to_string())));
        assert_eq!(split_exe_name("Game.exe"), ("Game".to_string(), Some("exe".to_string())));
        assert_eq!(split_exe_name("Game"), ("Game".to_string(), None));
    }

    #[cfg(unix)]
    #[test]
    fn dangling_symlink_is_skipped() {
        let tmp = TempDir::new();
        std::os::unix::fs::symlink(tmp.path().join("gone"), tmp.path().join("A_dangling")).unwrap();
        assert!(!path_has_executable(tmp.path(), "", 0));
        assert!(!path_has_executable(tmp.path(), "Subnautica", 3));

        tmp.write("Subnautica.exe", MZ);
        assert!(path_has_executable(tmp.path(), "Subnautica", 0));
        assert!(path_has_executable(tmp.path(), "", 0));
    }

    #[cfg(unix)]
    #[test]
    fn dangling_symlink_in_subdirectory_is_skipped() {
        let tmp = TempDir::new();
        let bin = tmp.mkdir("bin");
        std::os::unix::fs::symlink(bin.join("gone"), bin.join("A_dangling")).unwrap();
        tmp.write("bin/Subnautica.exe", MZ);
        assert!(!path_has_executable(tmp.path(), "Subnautica", 0));
        assert!(path_has_executable(tmp.path(), "Subnautica", 1));
    }

    #[test]
    fn steam_install_found_next_to_unreadable_entry() {
        let tmp = steam_fixture(MZ);
        #[cfg(unix)]
        std::os::unix::fs::symlink(
            tmp.path().join("nowhere"),
            tmp.path().join("steamapps/common/Subnautica/A_broken"),
        )
        .unwrap();
        let finder = steam_only(tmp.path());
        let result = finder.find_game(&subnautica(), Platform::STEAM).next().unwrap();
        assert!(result.path().unwrap().ends_with("Subnautica"));
    }
}
