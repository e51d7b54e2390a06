//! Steam keeps one `appmanifest_<appid>.acf` per installed game in `<library>/steamapps`, and the
//! game itself in `<library>/steamapps/common/<installdir>`. Libraries other than the one Steam
//! is installed in are listed in `steamapps/libraryfolders.vdf`.

use crate::finder::{Candidates, Found, GameFinder};
use crate::game::SearchRequest;
use crate::records;
use crate::registry::{self, Hive, Registry, SharedRegistry};
use std::fs::File;
use std::io::BufReader;
use std::iter;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

const MANIFEST_KEYS: &[&str] = &["appid", "name", "installdir"];

// Most specific first.
const REGISTRY_PATHS: &[(Hive, &str, &str)] = &[
    (Hive::CurrentUser, r"Software\Valve\Steam", "SteamPath"),
    (Hive::LocalMachine, r"SOFTWARE\WOW6432Node\Valve\Steam", "InstallPath"),
    (Hive::LocalMachine, r"SOFTWARE\Valve\Steam", "InstallPath"),
];

pub struct SteamFinder {
    root: Option<PathBuf>,
    registry: SharedRegistry,
}

impl Default for SteamFinder {
    fn default() -> Self {
        Self {
            root: None,
            registry: registry::system(),
        }
    }
}

impl SteamFinder {
    /// Uses `root` as the Steam installation instead of looking for it.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
            ..Self::default()
        }
    }

    fn steam_path(&self) -> Option<PathBuf> {
        match &self.root {
            Some(root) => root.is_dir().then(|| root.clone()),
            None => locate_steam(self.registry.as_ref()),
        }
    }
}

impl GameFinder for SteamFinder {
    fn name(&self) -> &'static str {
        "SteamFinder"
    }

    fn find_game<'a>(&'a self, request: &'a SearchRequest) -> Candidates<'a> {
        let Some(steam_path) = self.steam_path() else {
            return Box::new(iter::once(Found::Error("Steam is not installed".to_string())));
        };
        debug!("Steam is installed in {}", steam_path.display());

        let candidate = find_in_library(&steam_path, request).or_else(|| {
            library_roots(&steam_path.join("steamapps").join("libraryfolders.vdf"))
                .into_iter()
                .find_map(|library| find_in_library(&library, request))
        });
        Box::new(candidate.map(Found::Candidate).into_iter())
    }
}

fn locate_steam(registry: &(dyn Registry + Send + Sync)) -> Option<PathBuf> {
    if cfg!(windows) {
        return windows_steam_path(registry);
    }

    let home = dirs::home_dir().filter(|h| h.is_dir())?;
    if cfg!(target_os = "macos") {
        let path = home.join("Library").join("Application Support").join("Steam");
        return path.is_dir().then_some(path);
    }

    let flatpak = home.join(".var").join("app").join("com.valvesoftware.Steam");
    [
        home.join(".local").join("share").join("Steam"),
        // Compatibility symlinks kept by most distributions
        home.join(".steam").join("steam"),
        home.join(".steam").join("root"),
        flatpak.join(".local").join("share").join("Steam"),
        flatpak.join(".steam").join("steam"),
    ]
    .into_iter()
    .find(|path| path.is_dir())
}

fn windows_steam_path(registry: &(dyn Registry + Send + Sync)) -> Option<PathBuf> {
    let from_registry = REGISTRY_PATHS
        .iter()
        .filter_map(|(hive, key, value)| registry.read_string(*hive, key, value))
        .filter(|path| !path.trim().is_empty())
        .map(PathBuf::from);
    let program_files = std::env::var_os("ProgramFiles(x86)").map(|p| PathBuf::from(p).join("Steam"));

    from_registry.chain(program_files).find(|path| path.is_dir())
}

/// Install folder of the game if `library` has a manifest for it.
fn find_in_library(library: &Path, request: &SearchRequest) -> Option<PathBuf> {
    let install_dir = find_install_dir(&library.join("steamapps"), request)?;
    let path = library.join("steamapps").join("common").join(&install_dir);
    if cfg!(target_os = "macos") {
        return Some(path.join(format!("{install_dir}.app")).join("Contents"));
    }
    Some(path)
}

fn find_install_dir(steamapps: &Path, request: &SearchRequest) -> Option<String> {
    WalkDir::new(steamapps)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file() && is_manifest(entry.path()))
        .find_map(|entry| {
            let mut props = records::extract_file(entry.path(), MANIFEST_KEYS);
            if !props.get("name").is_some_and(|name| request.is_similar(name)) {
                return None;
            }
            props.get("appid")?.trim().parse::<u32>().ok()?;
            props.remove("installdir").filter(|dir| !dir.trim().is_empty())
        })
}

fn is_manifest(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy())
        .is_some_and(|name| name.starts_with("appmanifest_") && name.ends_with(".acf"))
}

/// Library folders listed in `libraryfolders.vdf`. Older files key them by index, newer ones
/// by `path`. App size entries are also numeric, but their values are not absolute paths.
fn library_roots(library_folders: &Path) -> Vec<PathBuf> {
    let Ok(file) = File::open(library_folders) else {
        return Vec::new();
    };
    records::records(BufReader::new(file))
        .filter(|(key, _)| key.eq_ignore_ascii_case("path") || key.parse::<u64>().is_ok())
        .map(|(_, value)| PathBuf::from(value))
        .filter(|path| path.is_absolute())
        .collect()
}
