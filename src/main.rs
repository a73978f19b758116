// Steam's community pages only list owned games as a JavaScript literal, and
// the store API answers one appid per request. Both are polled without auth,
// so every store lookup is spaced out and cached for good.

use std::path::PathBuf;

use anyhow::{Context, Result};
use log::{error, info};

use cache::CacheStore;
use config::{FileConfig, Settings};
use fetch::HttpFetcher;
use profile::Grabber;
use user::UserId;

mod cache;
mod cli;
mod config;
mod error;
mod fetch;
mod game;
mod logging;
mod profile;
mod report;
mod store;
mod user;

fn main() -> Result<()> {
    let mut command = cli::build_command();
    let matches = command.get_matches_mut();

    logging::init(matches.get_flag("verbose"));

    let file_config = match matches.get_one::<PathBuf>("config") {
        Some(path) => FileConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => FileConfig::default(),
    };
    let settings = Settings::resolve(&matches, file_config);

    if settings.users.is_empty() {
        command.print_help()?;
        return Ok(());
    }

    let cache = CacheStore::load(&settings.cache_file)
        .context("cannot continue with an unreadable cache; delete it to start over")?;
    let fetcher = HttpFetcher::new(settings.timeout).context("failed to build HTTP client")?;
    let mut grabber = Grabber::new(
        fetcher,
        cache,
        settings.endpoints.clone(),
        settings.request_delay,
    );

    let mut results = Vec::with_capacity(settings.users.len());
    for raw in &settings.users {
        let games = match UserId::parse(raw) {
            Ok(user) => grabber.owned_games(&user),
            Err(e) => {
                error!("{e}");
                None
            }
        };
        results.push((raw.clone(), games));
    }
    let users = report::collect(results);

    let common = report::common_games(&users);
    if common.is_empty() {
        info!("No games in common");
    }

    for line in report::render(grabber.cache(), &common, settings.color) {
        println!("{line}");
    }

    Ok(())
}
