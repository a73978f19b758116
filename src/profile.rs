//! Owned-game lookups from Steam community profile pages.
//!
//! The games tab embeds its list as a JavaScript literal
//! (`var rgGames = [{"appid": 10, "name": "Counter-Strike", ...}, ...];`).
//! Everything that depends on that markup lives in [`extract_games`].

use std::collections::BTreeSet;
use std::{thread, time::Duration};

use log::{debug, error, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::cache::CacheStore;
use crate::config::Endpoints;
use crate::error::ParseError;
use crate::fetch::Fetch;
use crate::game::{GameRecord, OwnedGame};
use crate::store;
use crate::user::UserId;

/// Longest slice of a page echoed into an error log.
const MAX_LOGGED_PAGE_LEN: usize = 500;

/// Format: var rgGames = [ ... ];
static GAMES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"var rgGames[ ]*=[ ]*(\[.*\])").expect("Invalid GAMES_RE regex"));

/// Pulls the embedded game list out of a profile page.
pub fn extract_games(page: &str) -> Result<Vec<OwnedGame>, ParseError> {
    let captured = GAMES_RE
        .captures(page)
        .and_then(|c| c.get(1))
        .ok_or(ParseError::MarkerNotFound)?;

    let list = json::parse(captured.as_str())?;
    if !list.is_array() {
        return Err(ParseError::Shape("rgGames is not an array".to_string()));
    }

    let mut games = Vec::with_capacity(list.len());
    for entry in list.members() {
        let Some(app_id) = entry["appid"].as_u32() else {
            warn!("Ignoring profile entry without a numeric appid: {}", entry.dump());
            continue;
        };
        let name = entry["name"].as_str().unwrap_or_default();
        games.push(OwnedGame::new(app_id, name));
    }

    Ok(games)
}

/// Resolves users' owned games, enriching unseen titles and keeping the
/// cache current.
pub struct Grabber<F> {
    fetcher: F,
    cache: CacheStore,
    endpoints: Endpoints,
    request_delay: Duration,
}

impl<F: Fetch> Grabber<F> {
    pub fn new(fetcher: F, cache: CacheStore, endpoints: Endpoints, request_delay: Duration) -> Self {
        Self {
            fetcher,
            cache,
            endpoints,
            request_delay,
        }
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    /// Returns the appids owned by `user` that have complete store data.
    ///
    /// `None` means the profile could not be fetched or parsed, which is
    /// different from `Some` of an empty set.
    pub fn owned_games(&mut self, user: &UserId) -> Option<BTreeSet<u32>> {
        let url = self.endpoints.profile_url(user);
        info!("Fetching games for user {user}");
        debug!("{url}");

        let page = match self.fetcher.fetch(&url) {
            Ok(page) => page,
            Err(e) => {
                error!("Failed to fetch profile of {user}: {e}");
                return None;
            }
        };

        let listed = match extract_games(&page) {
            Ok(listed) => listed,
            Err(e) => {
                error!(
                    "Failed to parse profile of {user}: {e}. Page starts with: {}",
                    truncate(&page, MAX_LOGGED_PAGE_LEN)
                );
                debug!("Full profile page for {user}:\n{page}");
                return None;
            }
        };

        let mut owned = BTreeSet::new();
        let mut enriched = 0usize;

        for game in listed {
            if self.cache.contains(game.app_id) {
                owned.insert(game.app_id);
                continue;
            }

            thread::sleep(self.request_delay);

            let Some(details) = store::enrich(&self.fetcher, &self.endpoints, &game) else {
                continue;
            };

            owned.insert(game.app_id);
            self.cache.insert(GameRecord::new(game, details));
            enriched += 1;
        }

        info!(
            "{user} owns {} resolvable games ({enriched} newly fetched)",
            owned.len()
        );

        if let Err(e) = self.cache.save() {
            error!("Failed to write cache: {e}");
        }

        Some(owned)
    }
}

fn truncate(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
