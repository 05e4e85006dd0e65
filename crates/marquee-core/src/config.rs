use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use marquee_api::news::NEWS_API_BASE;
use marquee_api::tmdb::{DEFAULT_LANGUAGE, TMDB_API_BASE};
use marquee_api::users::USERS_API_BASE;

/// Main configuration structure
///
/// Loaded from the config file, then environment variables, then CLI flags.
/// Priority: CLI > Env > File > Defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub news: NewsConfig,
    #[serde(default)]
    pub tmdb: TmdbConfig,
    #[serde(default)]
    pub users: UsersConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

impl Config {
    /// Load config from the default location, falling back to defaults
    pub fn load() -> crate::Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> crate::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: Config = toml::from_str(&contents)
                .map_err(|e| crate::Error::ConfigError(format!("Failed to parse config: {}", e)))?;
            Ok(config)
        } else {
            // No config file? Use defaults
            Ok(Self::default())
        }
    }

    /// Save config to disk
    pub fn save(&self) -> crate::Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> crate::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| crate::Error::ConfigError(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Overlay the environment variables that are set and non-empty
    pub fn apply_env(&mut self) {
        self.apply_vars(|name| std::env::var(name).ok());
    }

    /// Same as [`apply_env`](Self::apply_env) with an injectable lookup, so tests
    /// don't have to touch the process environment
    pub fn apply_vars(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = get("NEWS_API_KEY") {
            self.news.api_key = Some(key);
        }
        if let Some(url) = get("NEWS_BASE_URL") {
            self.news.base_url = url;
        }
        if let Some(key) = get("TMDB_API_KEY") {
            self.tmdb.api_key = Some(key);
        }
        if let Some(token) = get("TMDB_BEARER_TOKEN") {
            self.tmdb.bearer_token = Some(token);
        }
        if let Some(url) = get("USERS_API_BASE_URL") {
            self.users.base_url = url;
        }
        if let Some(token) = get("USERS_API_TOKEN") {
            self.users.bearer_token = Some(token);
        }
    }

    /// `<config_dir>/marquee/config.toml`
    pub fn config_path() -> crate::Result<PathBuf> {
        Ok(dirs::config_dir()
            .ok_or_else(|| crate::Error::ConfigError("Could not find config directory".into()))?
            .join("marquee")
            .join("config.toml"))
    }

    /// `<data_dir>/marquee`, home of the session store and the TUI log
    pub fn data_dir() -> crate::Result<PathBuf> {
        Ok(dirs::data_dir()
            .ok_or_else(|| crate::Error::ConfigError("Could not find data directory".into()))?
            .join("marquee"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewsConfig {
    /// NewsAPI key, get one at https://newsapi.org/register
    pub api_key: Option<String>,

    #[serde(default = "default_news_url")]
    pub base_url: String,

    #[serde(default = "default_country")]
    pub country: String,

    #[serde(default = "default_news_language")]
    pub language: String,

    #[serde(default = "default_sort_by")]
    pub sort_by: String,
}

fn default_news_url() -> String {
    NEWS_API_BASE.to_string()
}

fn default_country() -> String {
    "us".to_string()
}

fn default_news_language() -> String {
    "en".to_string()
}

fn default_sort_by() -> String {
    "publishedAt".to_string()
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_news_url(),
            country: default_country(),
            language: default_news_language(),
            sort_by: default_sort_by(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TmdbConfig {
    /// v3 API key, sent as `api_key`
    pub api_key: Option<String>,

    /// v4 read access token, sent as a bearer header
    pub bearer_token: Option<String>,

    #[serde(default = "default_tmdb_url")]
    pub base_url: String,

    /// Where image uploads go; next to the API base when unset
    #[serde(default)]
    pub upload_url: Option<String>,

    #[serde(default = "default_tmdb_language")]
    pub language: String,
}

fn default_tmdb_url() -> String {
    TMDB_API_BASE.to_string()
}

fn default_tmdb_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            bearer_token: None,
            base_url: default_tmdb_url(),
            upload_url: None,
            language: default_tmdb_language(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UsersConfig {
    #[serde(default = "default_users_url")]
    pub base_url: String,

    pub bearer_token: Option<String>,

    /// Connect and read timeout
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_true")]
    pub retry_on_connection_failure: bool,
}

fn default_users_url() -> String {
    USERS_API_BASE.to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

impl Default for UsersConfig {
    fn default() -> Self {
        Self {
            base_url: default_users_url(),
            bearer_token: None,
            timeout_secs: default_timeout(),
            retry_on_connection_failure: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionConfig {
    /// How long a stored TMDB session is trusted before asking to log in again
    #[serde(default = "default_valid_days")]
    pub valid_for_days: u64,

    /// Key the session is stored under
    #[serde(default = "default_profile")]
    pub profile: String,
}

fn default_valid_days() -> u64 {
    30
}

fn default_profile() -> String {
    "default".to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            valid_for_days: default_valid_days(),
            profile: default_profile(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UiConfig {
    /// Enable mouse support in TUI
    #[serde(default = "default_true")]
    pub mouse_enabled: bool,

    /// Quiet period before a news search is sent
    #[serde(default = "default_debounce")]
    pub search_debounce_ms: u64,
}

fn default_debounce() -> u64 {
    1000
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            mouse_enabled: true,
            search_debounce_ms: default_debounce(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.news.base_url, "https://newsapi.org/v2/");
        assert_eq!(config.news.country, "us");
        assert_eq!(config.tmdb.language, "en-US");
        assert_eq!(config.users.timeout_secs, 30);
        assert!(config.users.retry_on_connection_failure);
        assert_eq!(config.ui.search_debounce_ms, 1000);
        assert_eq!(config.session.valid_for_days, 30);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [news]
            api_key = "abc"

            [users]
            timeout_secs = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.news.api_key.as_deref(), Some("abc"));
        assert_eq!(config.news.language, "en");
        assert_eq!(config.users.timeout_secs, 5);
        assert_eq!(config.users.base_url, "https://api.example.com/");
        assert_eq!(config.tmdb, TmdbConfig::default());
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = Config::default();
        config.news.api_key = Some("from-file".into());
        config.tmdb.api_key = Some("tmdb-file".into());

        let env: HashMap<&str, &str> = [
            ("NEWS_API_KEY", "from-env"),
            ("TMDB_BEARER_TOKEN", "bearer"),
            ("USERS_API_BASE_URL", "http://localhost:3000/"),
            // Blank values don't count
            ("TMDB_API_KEY", "  "),
        ]
        .into_iter()
        .collect();
        config.apply_vars(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(config.news.api_key.as_deref(), Some("from-env"));
        assert_eq!(config.tmdb.api_key.as_deref(), Some("tmdb-file"));
        assert_eq!(config.tmdb.bearer_token.as_deref(), Some("bearer"));
        assert_eq!(config.users.base_url, "http://localhost:3000/");
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.session.valid_for_days = 7;
        config.ui.mouse_enabled = false;
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_broken_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[news\napi_key = ").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(crate::Error::ConfigError(_))
        ));
    }
}
