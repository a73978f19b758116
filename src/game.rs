use json::JsonValue;

use crate::error::ParseError;

/// Steam store category id for multi-player games.
pub const CATEGORY_MULTIPLAYER: u32 = 1;
/// Steam store category id for co-op games.
pub const CATEGORY_COOP: u32 = 9;

/// A game as listed on a profile page, before store enrichment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedGame {
    pub app_id: u32,
    pub name: String,
}

impl OwnedGame {
    pub fn new(app_id: u32, name: impl Into<String>) -> Self {
        Self {
            app_id,
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Platforms {
    pub windows: bool,
    pub linux: bool,
    pub mac: bool,
}

/// Fields pulled from the store's app details.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreDetails {
    pub is_free: bool,
    pub platforms: Platforms,
    pub multiplayer: bool,
    pub coop: bool,
}

impl StoreDetails {
    /// Derives the multiplayer and co-op flags from a list of category ids.
    pub fn with_categories(is_free: bool, platforms: Platforms, categories: &[u32]) -> Self {
        Self {
            is_free,
            platforms,
            multiplayer: categories.contains(&CATEGORY_MULTIPLAYER),
            coop: categories.contains(&CATEGORY_COOP),
        }
    }
}

/// A fully enriched cache entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameRecord {
    pub app_id: u32,
    pub name: String,
    pub is_free: bool,
    pub platforms: Platforms,
    pub multiplayer: bool,
    pub coop: bool,
}

impl GameRecord {
    pub fn new(game: OwnedGame, details: StoreDetails) -> Self {
        Self {
            app_id: game.app_id,
            name: game.name,
            is_free: details.is_free,
            platforms: details.platforms,
            multiplayer: details.multiplayer,
            coop: details.coop,
        }
    }

    pub fn to_json(&self) -> JsonValue {
        let mut platforms = JsonValue::new_object();
        platforms["windows"] = self.platforms.windows.into();
        platforms["linux"] = self.platforms.linux.into();
        platforms["mac"] = self.platforms.mac.into();

        let mut record = JsonValue::new_object();
        record["name"] = self.name.as_str().into();
        record["is_free"] = self.is_free.into();
        record["platforms"] = platforms;
        record["multiplayer"] = self.multiplayer.into();
        record["coop"] = self.coop.into();
        record
    }

    /// Rebuilds a record from its cached JSON form. Every field is required.
    pub fn from_json(app_id: u32, value: &JsonValue) -> Result<Self, ParseError> {
        let flag = |value: &JsonValue, key: &str| {
            value[key]
                .as_bool()
                .ok_or_else(|| ParseError::Shape(format!("appid {app_id}: missing `{key}`")))
        };

        let name = value["name"]
            .as_str()
            .ok_or_else(|| ParseError::Shape(format!("appid {app_id}: missing `name`")))?;
        let platforms = &value["platforms"];

        Ok(Self {
            app_id,
            name: name.to_string(),
            is_free: flag(value, "is_free")?,
            platforms: Platforms {
                windows: flag(platforms, "windows")?,
                linux: flag(platforms, "linux")?,
                mac: flag(platforms, "mac")?,
            },
            multiplayer: flag(value, "multiplayer")?,
            coop: flag(value, "coop")?,
        })
    }
}
