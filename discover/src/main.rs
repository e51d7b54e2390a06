mod cache;
mod config;

use crate::cache::Cache;
use crate::config::Config;
use anyhow::{Result, bail};
use clap::Parser;
use game_discovery::{InstallationFinder, SearchRequest};
use std::path::PathBuf;
use tracing::{info, warn};

/// Prints the installation folder of a game, searching the stores it may have come from.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Config file. Defaults to ./discover.toml, then to built-in defaults.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Game name as the stores list it.
    #[arg(long)]
    game: Option<String>,
    /// Executable to look for; the extension is optional.
    #[arg(long)]
    exe: Option<String>,
    /// Directory levels below the installation folder to search for the executable.
    #[arg(long)]
    depth: Option<usize>,
    /// Platform to search (steam, epic, microsoft, gog, discord, all). Repeat to search several.
    #[arg(long = "platform")]
    platforms: Vec<String>,
    /// Directory holding the discovery cache.
    #[arg(long)]
    cache_dir: Option<PathBuf>,
    /// Always search, and don't write the cache.
    #[arg(long)]
    no_cache: bool,
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let mut config = Config::load(args.config.as_deref())?;
    if let Some(game) = args.game {
        config.search.game = game;
    }
    if let Some(exe) = args.exe {
        config.search.exe = exe;
    }
    if let Some(depth) = args.depth {
        config.search.depth = depth;
    }
    if !args.platforms.is_empty() {
        config.search.platforms = args.platforms;
    }
    if let Some(dir) = args.cache_dir {
        config.cache.dir = dir;
    }
    if args.no_cache {
        config.cache.enabled = false;
    }

    if config.search.game.trim().is_empty() {
        bail!("A game name is required: pass --game or set search.game in discover.toml");
    }
    let request = SearchRequest::new(config.search.game.as_str())?
        .with_exe_name(config.search.exe.as_str())
        .with_search_depth(config.search.depth);
    let platforms = config.search.platforms()?;

    let cache = config
        .cache
        .enabled
        .then(|| Cache::new(&config.cache.dir, request.name()));
    if let Some(path) = cache.as_ref().and_then(|cache| cache.read_valid(&request)) {
        info!("Using cached location of {}", request.name());
        println!("{}", path.display());
        return Ok(());
    }

    let finder = InstallationFinder::with_default_finders();
    let mut failures = Vec::new();
    let found = finder.find_game_in(&request, platforms).find_map(|result| match result.outcome {
        Ok(path) => Some(path),
        Err(message) => {
            failures.push(format!("{} ({}): {message}", result.platform.display_name(), result.finder_name));
            None
        }
    });

    if let Some(Err(err)) = cache.as_ref().map(|cache| cache.store(found.as_deref())) {
        warn!("{err:#}");
    }

    match found {
        Some(path) => {
            println!("{}", path.display());
            Ok(())
        }
        None => {
            for failure in &failures {
                warn!("{failure}");
            }
            bail!("Could not find {} on any platform", request.name())
        }
    }
}
