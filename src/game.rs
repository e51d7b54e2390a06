use anyhow::{Result, bail};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// What to look for: a game by name, optionally narrowed down to a specific executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    name: String,
    normalized_name: String,
    exe_name: String,
    search_depth: usize,
}

impl SearchRequest {
    /// A request for any executable at the top level of the installation folder.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            bail!("A game name is required to search for an installation");
        }

        Ok(Self {
            normalized_name: normalize_name(&name),
            name,
            exe_name: String::new(),
            search_depth: 0,
        })
    }

    /// Only accept installations holding this executable. The extension is optional; the
    /// file name without extension must match exactly.
    pub fn with_exe_name(mut self, exe_name: impl Into<String>) -> Self {
        self.exe_name = exe_name.into();
        self
    }

    /// How many directory levels below the installation folder may hold the executable.
    pub fn with_search_depth(mut self, depth: usize) -> Self {
        self.search_depth = depth;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The name restricted to ASCII letters, digits, `_`, `.` and spaces.
    pub fn normalized_name(&self) -> &str {
        &self.normalized_name
    }

    /// Empty when any executable will do.
    pub fn exe_name(&self) -> &str {
        &self.exe_name
    }

    pub fn search_depth(&self) -> usize {
        self.search_depth
    }

    pub fn is_similar(&self, other_name: &str) -> bool {
        self.name.eq_ignore_ascii_case(other_name)
            || self.normalized_name.eq_ignore_ascii_case(&normalize_name(other_name))
    }

    /// First direct subdirectory of `root` whose name is similar to the game's name.
    pub fn find_folder_with_game_name(&self, root: &Path) -> Option<PathBuf> {
        WalkDir::new(root)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_dir())
            .find(|entry| self.is_similar(&entry.file_name().to_string_lossy()))
            .map(|entry| entry.into_path())
    }
}

pub fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | ' '))
        .collect()
}
