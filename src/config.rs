use std::fs::read_to_string;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::ArgMatches;
use yaml_rust2::{Yaml, YamlLoader};

use crate::error::ConfigError;
use crate::user::UserId;

pub const DEFAULT_CACHE_FILE: &str = ".SteamParty.cache";
pub const DEFAULT_REQUEST_DELAY_MS: u64 = 200;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const DEFAULT_PROFILE_URL: &str = "https://steamcommunity.com/{kind}/{id}/games/?tab=all";
pub const DEFAULT_APP_DETAILS_URL: &str =
    "https://store.steampowered.com/api/appdetails?appids={appid}";

/// URL templates for the two Steam endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// `{kind}` becomes `profiles` or `id`, `{id}` the identifier.
    pub profile: String,
    /// `{appid}` becomes the numeric appid.
    pub app_details: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            profile: DEFAULT_PROFILE_URL.to_string(),
            app_details: DEFAULT_APP_DETAILS_URL.to_string(),
        }
    }
}

impl Endpoints {
    pub fn profile_url(&self, user: &UserId) -> String {
        self.profile
            .replace("{kind}", user.kind())
            .replace("{id}", user.as_str())
    }

    pub fn app_details_url(&self, app_id: u32) -> String {
        self.app_details.replace("{appid}", &app_id.to_string())
    }
}

/// Contents of the optional YAML config file. Every key is optional.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct FileConfig {
    pub users: Vec<String>,
    pub cache_file: Option<PathBuf>,
    pub request_delay_ms: Option<u64>,
    pub timeout_secs: Option<u64>,
    pub color: Option<bool>,
    pub profile_url: Option<String>,
    pub app_details_url: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let docs = YamlLoader::load_from_str(text)?;
        let Some(doc) = docs.first() else {
            return Ok(Self::default());
        };

        if doc.as_hash().is_none() {
            return Err(ConfigError::Invalid(
                "top level must be a mapping".to_string(),
            ));
        }

        let users = match &doc["users"] {
            Yaml::BadValue | Yaml::Null => Vec::new(),
            Yaml::Array(items) => items
                .iter()
                .map(|item| scalar(item, "users"))
                .collect::<Result<_, _>>()?,
            other => vec![scalar(other, "users")?],
        };

        Ok(Self {
            users,
            cache_file: opt_str(doc, "cache_file")?.map(PathBuf::from),
            request_delay_ms: opt_u64(doc, "request_delay_ms")?,
            timeout_secs: opt_u64(doc, "timeout_secs")?,
            color: opt_bool(doc, "color")?,
            profile_url: opt_str(&doc["endpoints"], "profile")?,
            app_details_url: opt_str(&doc["endpoints"], "app_details")?,
        })
    }
}

/// SteamIDs are commonly written unquoted, so YAML hands them back as integers.
fn scalar(value: &Yaml, key: &str) -> Result<String, ConfigError> {
    match value {
        Yaml::String(s) => Ok(s.clone()),
        Yaml::Integer(i) => Ok(i.to_string()),
        _ => Err(ConfigError::Invalid(format!(
            "`{key}` entries must be strings or numbers"
        ))),
    }
}

fn opt_str(doc: &Yaml, key: &str) -> Result<Option<String>, ConfigError> {
    match &doc[key] {
        Yaml::BadValue | Yaml::Null => Ok(None),
        Yaml::String(s) => Ok(Some(s.clone())),
        _ => Err(ConfigError::Invalid(format!("`{key}` must be a string"))),
    }
}

fn opt_u64(doc: &Yaml, key: &str) -> Result<Option<u64>, ConfigError> {
    match &doc[key] {
        Yaml::BadValue | Yaml::Null => Ok(None),
        Yaml::Integer(i) => u64::try_from(*i)
            .map(Some)
            .map_err(|_| ConfigError::Invalid(format!("`{key}` must not be negative"))),
        _ => Err(ConfigError::Invalid(format!("`{key}` must be an integer"))),
    }
}

fn opt_bool(doc: &Yaml, key: &str) -> Result<Option<bool>, ConfigError> {
    match &doc[key] {
        Yaml::BadValue | Yaml::Null => Ok(None),
        Yaml::Boolean(b) => Ok(Some(*b)),
        _ => Err(ConfigError::Invalid(format!("`{key}` must be true or false"))),
    }
}

/// Everything a run needs, after merging CLI flags over the config file.
#[derive(Debug, Clone)]
pub struct Settings {
    pub users: Vec<String>,
    pub cache_file: PathBuf,
    pub request_delay: Duration,
    pub timeout: Duration,
    pub color: bool,
    pub endpoints: Endpoints,
}

impl Settings {
    pub fn resolve(matches: &ArgMatches, file: FileConfig) -> Self {
        let mut users: Vec<String> = Vec::new();
        let cli_users = matches
            .get_many::<String>("user_ids")
            .into_iter()
            .flatten()
            .cloned();
        for user in file.users.into_iter().chain(cli_users) {
            if !users.contains(&user) {
                users.push(user);
            }
        }

        let cache_file = matches
            .get_one::<PathBuf>("cache_file")
            .cloned()
            .or(file.cache_file)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_FILE));

        let delay_ms = matches
            .get_one::<u64>("delay_ms")
            .copied()
            .or(file.request_delay_ms)
            .unwrap_or(DEFAULT_REQUEST_DELAY_MS);

        let color = !matches.get_flag("no_color") && file.color.unwrap_or(true);

        let defaults = Endpoints::default();
        Self {
            users,
            cache_file,
            request_delay: Duration::from_millis(delay_ms),
            timeout: Duration::from_secs(file.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
            color,
            endpoints: Endpoints {
                profile: file.profile_url.unwrap_or(defaults.profile),
                app_details: file.app_details_url.unwrap_or(defaults.app_details),
            },
        }
    }
}
