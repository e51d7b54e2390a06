//! Finds where a game is installed by asking the stores it may have come from: Steam, the Epic
//! Games Store, GOG Galaxy, the Microsoft Store and Discord.
//!
//! ```no_run
//! use game_discovery::{InstallationFinder, Platform, SearchRequest};
//!
//! let request = SearchRequest::new("Subnautica")?.with_exe_name("Subnautica");
//! let finder = InstallationFinder::with_default_finders();
//! if let Some(path) = finder
//!     .find_game(&request, Platform::ALL)
//!     .find_map(|result| result.path().map(|p| p.to_path_buf()))
//! {
//!     println!("{}", path.display());
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

mod finder;
pub mod finders;
mod game;
mod platform;
pub mod records;
pub mod registry;
pub mod utils;

#[cfg(test)]
mod test_util;

pub use finder::{
    BoxedFinder, Candidates, Found, FinderResult, GameFinder, InstallationFinder, path_has_executable,
};
pub use game::{SearchRequest, normalize_name};
pub use platform::Platform;
