use std::collections::{BTreeMap, BTreeSet};

use colored::Colorize;
use log::warn;

use crate::cache::CacheStore;
use crate::game::GameRecord;

/// Owned appids per user, for users whose profile could be read.
pub type UserGames = BTreeMap<String, BTreeSet<u32>>;

/// Keeps users with at least one resolvable game. Users without data, or
/// with an empty library, are left out so they don't empty the intersection.
pub fn collect<I>(results: I) -> UserGames
where
    I: IntoIterator<Item = (String, Option<BTreeSet<u32>>)>,
{
    let mut users = UserGames::new();
    for (user, games) in results {
        match games {
            Some(games) if !games.is_empty() => {
                users.insert(user, games);
            }
            Some(_) => warn!("No games found for user {user}, leaving them out"),
            None => warn!("Missing data for user {user}"),
        }
    }
    users
}

/// Appids owned by every user. No users means no common games.
pub fn common_games(users: &UserGames) -> BTreeSet<u32> {
    let mut sets = users.values();
    let Some(first) = sets.next() else {
        return BTreeSet::new();
    };

    sets.fold(first.clone(), |common, owned| {
        common.intersection(owned).copied().collect()
    })
}

/// One formatted line per common game, in appid order.
pub fn render(cache: &CacheStore, common: &BTreeSet<u32>, color: bool) -> Vec<String> {
    common
        .iter()
        .filter_map(|&app_id| {
            let record = cache.get(app_id);
            if record.is_none() {
                warn!("Missing info for appid {app_id}");
            }
            record
        })
        .map(|record| render_line(record, color))
        .collect()
}

pub fn render_line(game: &GameRecord, color: bool) -> String {
    let flag = |on: bool| marker(on, color);
    format!(
        "(Win: {}, Linux: {}, OS/X: {}) [F2P: {}, MP: {}, Co-op: {}] {}",
        flag(game.platforms.windows),
        flag(game.platforms.linux),
        flag(game.platforms.mac),
        flag(game.is_free),
        flag(game.multiplayer),
        flag(game.coop),
        game.name
    )
}

fn marker(on: bool, color: bool) -> String {
    let text = format!("{:3}", if on { "yes" } else { "no" });
    match (color, on) {
        (false, _) => text,
        (true, true) => text.green().to_string(),
        (true, false) => text.red().to_string(),
    }
}
