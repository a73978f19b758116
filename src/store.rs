//! Store metadata lookups for games not yet in the cache.

use json::JsonValue;
use log::{debug, warn};

use crate::config::Endpoints;
use crate::error::ParseError;
use crate::fetch::Fetch;
use crate::game::{OwnedGame, Platforms, StoreDetails};

/// Fetches the store details for `game`. Failures are logged and reported
/// as `None`; `game` itself is never touched.
pub fn enrich<F: Fetch + ?Sized>(
    fetcher: &F,
    endpoints: &Endpoints,
    game: &OwnedGame,
) -> Option<StoreDetails> {
    let url = endpoints.app_details_url(game.app_id);
    debug!("Fetching info for appid {} ({url})", game.app_id);

    let body = match fetcher.fetch(&url) {
        Ok(body) => body,
        Err(e) => {
            warn!("Failed to fetch store details for {} ({}): {e}", game.name, game.app_id);
            return None;
        }
    };

    match parse_details(game.app_id, &body) {
        Ok(details) => Some(details),
        Err(e) => {
            warn!("Skipping {} ({}): {e}", game.name, game.app_id);
            None
        }
    }
}

/// Extracts the cached fields from an `appdetails` response.
///
/// The response is an object keyed by appid; the entry must carry a `data`
/// section. Missing platform keys or categories count as `false`.
pub fn parse_details(app_id: u32, body: &str) -> Result<StoreDetails, ParseError> {
    let response = json::parse(body)?;
    let key = app_id.to_string();

    if !response.has_key(&key) {
        return Err(ParseError::Shape(format!(
            "response has no entry for appid {app_id}"
        )));
    }

    let data = &response[key.as_str()]["data"];
    if !data.is_object() {
        return Err(ParseError::Shape(format!(
            "missing `data` section for appid {app_id}"
        )));
    }

    let is_free = data["is_free"]
        .as_bool()
        .ok_or_else(|| ParseError::Shape("missing `is_free`".to_string()))?;

    let platforms = &data["platforms"];
    if !platforms.is_object() {
        return Err(ParseError::Shape("missing `platforms`".to_string()));
    }

    Ok(StoreDetails::with_categories(
        is_free,
        Platforms {
            windows: supported(platforms, "windows"),
            linux: supported(platforms, "linux"),
            mac: supported(platforms, "mac"),
        },
        &category_ids(&data["categories"]),
    ))
}

fn supported(platforms: &JsonValue, os: &str) -> bool {
    platforms[os].as_bool().unwrap_or(false)
}

fn category_ids(categories: &JsonValue) -> Vec<u32> {
    categories
        .members()
        .filter_map(|category| category["id"].as_u32())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::fake::FakeFetcher;

    const PORTAL_2: &str = r#"{
        "620": {
            "success": true,
            "data": {
                "type": "game",
                "name": "Portal 2",
                "is_free": false,
                "platforms": {"windows": true, "mac": false, "linux": true},
                "categories": [
                    {"id": 2, "description": "Single-player"},
                    {"id": 9, "description": "Co-op"},
                    {"id": 1, "description": "Multi-player"}
                ]
            }
        }
    }"#;

    #[test]
    fn parses_flags_from_details() {
        let details = parse_details(620, PORTAL_2).unwrap();
        assert!(!details.is_free);
        assert_eq!(
            details.platforms,
            Platforms {
                windows: true,
                linux: true,
                mac: false
            }
        );
        assert!(details.multiplayer);
        assert!(details.coop);
    }

    #[test]
    fn other_categories_are_not_multiplayer() {
        let body = r#"{"70": {"success": true, "data": {
            "is_free": true,
            "platforms": {"windows": true},
            "categories": [{"id": 2}]
        }}}"#;
        let details = parse_details(70, body).unwrap();
        assert!(details.is_free);
        assert!(!details.multiplayer);
        assert!(!details.coop);
        assert!(!details.platforms.linux);
    }

    #[test]
    fn missing_categories_mean_no_tags() {
        let body = r#"{"70": {"data": {"is_free": false, "platforms": {}}}}"#;
        let details = parse_details(70, body).unwrap();
        assert!(!details.multiplayer);
        assert!(!details.coop);
    }

    #[test]
    fn wrong_appid_is_a_shape_error() {
        assert!(matches!(
            parse_details(440, PORTAL_2),
            Err(ParseError::Shape(_))
        ));
    }

    #[test]
    fn missing_data_is_a_shape_error() {
        let body = r#"{"620": {"success": false}}"#;
        assert!(matches!(
            parse_details(620, body),
            Err(ParseError::Shape(_))
        ));
    }

    #[test]
    fn html_instead_of_json_is_a_json_error() {
        assert!(matches!(
            parse_details(620, "<html>Access Denied</html>"),
            Err(ParseError::Json(_))
        ));
    }

    #[test]
    fn enrich_reports_failure_without_touching_the_stub() {
        let endpoints = Endpoints::default();
        let stub = OwnedGame::new(620, "Portal 2");
        let fetcher =
            FakeFetcher::new().page(&endpoints.app_details_url(620), r#"{"620": {"success": false}}"#);

        assert_eq!(enrich(&fetcher, &endpoints, &stub), None);
        assert_eq!(stub, OwnedGame::new(620, "Portal 2"));
        assert_eq!(fetcher.calls().len(), 1);
    }

    #[test]
    fn enrich_reports_network_failure() {
        let endpoints = Endpoints::default();
        let fetcher = FakeFetcher::new().status(&endpoints.app_details_url(620), 503);

        assert_eq!(
            enrich(&fetcher, &endpoints, &OwnedGame::new(620, "Portal 2")),
            None
        );
    }

    #[test]
    fn enrich_returns_details() {
        let endpoints = Endpoints::default();
        let fetcher = FakeFetcher::new().page(&endpoints.app_details_url(620), PORTAL_2);

        let details = enrich(&fetcher, &endpoints, &OwnedGame::new(620, "Portal 2")).unwrap();
        assert!(details.coop);
    }
}
