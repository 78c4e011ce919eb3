//! Tracker configuration.
//!
//! Every knob has a literal default; the binary runs on `TrackerConfig::default()`
//! unless a `steamtrend.toml` sits in the working directory. Partial TOML files
//! are fine: missing sections fall back to their defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::align::AlignOptions;
use crate::series::AppId;
use crate::tiers::TierThresholds;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Base URLs of the remote services.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    /// Player-count charts: `{steamcharts}/app/{id}/chart-data.json`.
    pub steamcharts: String,
    /// Web API: `{web_api}/ISteamApps/GetAppList/v0002/`.
    pub web_api: String,
    /// Community market: listings and search.
    pub community: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            steamcharts: "https://steamcharts.com".into(),
            web_api: "http://api.steampowered.com".into(),
            community: "https://steamcommunity.com".into(),
        }
    }
}

/// Where cached CSV files live, one directory per kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheDirs {
    pub player_history: PathBuf,
    pub item_price_history: PathBuf,
}

impl Default for CacheDirs {
    fn default() -> Self {
        Self {
            player_history: PathBuf::from("steamcharts"),
            item_price_history: PathBuf::from("item_price_history"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    /// Results requested per search page; a shorter page ends pagination.
    pub page_size: u32,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self { page_size: 100 }
    }
}

/// The complete configuration for one tracker run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub games: Vec<AppId>,
    /// Directory for exported CSV/JSON reports.
    pub report_dir: PathBuf,
    pub endpoints: Endpoints,
    pub cache: CacheDirs,
    pub align: AlignOptions,
    pub tiers: TierThresholds,
    pub market: MarketConfig,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            games: DEFAULT_GAMES.to_vec(),
            report_dir: PathBuf::from("reports"),
            endpoints: Endpoints::default(),
            cache: CacheDirs::default(),
            align: AlignOptions::default(),
            tiers: TierThresholds::default(),
            market: MarketConfig::default(),
        }
    }
}

impl TrackerConfig {
    /// Load a configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse a configuration from a TOML string and validate it.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if it exists, otherwise the built-in defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.align.window == 0 {
            return Err(ConfigError::Invalid("align.window must be >= 1".into()));
        }
        if self.market.page_size == 0 {
            return Err(ConfigError::Invalid("market.page_size must be >= 1".into()));
        }
        let t = &self.tiers;
        if !(t.top > t.second && t.second > t.third && t.third > t.fourth) {
            return Err(ConfigError::Invalid(
                "tier thresholds must be strictly decreasing from top to fourth".into(),
            ));
        }
        Ok(())
    }
}

/// Games tracked by default.
pub const DEFAULT_GAMES: &[AppId] = &[
    1448230, 304930, 440, 252490, 218620, 232090, 570, 322330, 730, 290340,
    866510, 614910, 603750, 282800, 253230, 562430, 270880, 450860, 530700, 583950,
    582810, 489940, 706990, 1723560, 296300, 618140, 238460, 650580, 1142220, 550650,
    225600, 575950, 709840, 531960, 598780, 529840, 429780, 829080, 615050, 397900,
    722960, 302670, 588120, 544840, 602770, 665360, 451600, 1782210, 832680, 447820,
    672490, 346930, 665550, 707590, 274940, 684130, 663920, 278970, 506730, 401190,
    667530, 374670, 417860, 530630, 744760, 227300, 1092140, 800280, 519870, 391240,
    364640, 486780, 546170, 1086410, 571740, 431240, 369990, 914260, 1520380, 581740,
    679990, 433530, 269210, 374280, 457960, 560080, 348670, 363360, 513510, 518150,
    728540, 724430, 844870, 701760, 794600, 634340, 1635450, 546930, 949000, 420900,
    534210, 516940, 299740, 749830, 323850, 4920, 696400, 471550, 885570, 643270,
    578080, 757130, 1986390, 238960, 1521580, 321360, 508710, 774861, 338170, 764030,
    656610, 1280770, 517710, 328070, 574180, 663690, 270450, 843660, 1070330, 366440,
    464350, 705710, 496960, 684580, 530300, 485610, 528970, 690530, 244850, 207140,
    454580, 381250, 250820, 264710, 418030, 321400, 440730, 437220, 757160, 859700,
    676340, 654700, 391460, 562260, 431960, 230410, 709870, 308080, 424370, 657730,
    552990, 625340, 263920, 914160, 714910, 722670, 840140, 1575870,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = TrackerConfig::default();
        config.validate().unwrap();
        assert_eq!(config.games.len(), 168);
        assert_eq!(config.align.window, 5);
        assert_eq!(config.market.page_size, 100);
        assert_eq!(config.cache.player_history, PathBuf::from("steamcharts"));
    }

    #[test]
    fn toml_roundtrip() {
        let config = TrackerConfig::default();
        let toml_str = config.to_toml().unwrap();
        let parsed = TrackerConfig::from_toml(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let parsed = TrackerConfig::from_toml("games = [570, 730]\n[align]\nwindow = 3\n").unwrap();
        assert_eq!(parsed.games, vec![570, 730]);
        assert_eq!(parsed.align.window, 3);
        assert_eq!(parsed.tiers, TierThresholds::default());
        assert_eq!(parsed.endpoints, Endpoints::default());
    }

    #[test]
    fn zero_window_is_rejected() {
        let err = TrackerConfig::from_toml("[align]\nwindow = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn unordered_thresholds_are_rejected() {
        let err = TrackerConfig::from_toml("[tiers]\ntop = 10.0\nsecond = 100.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = TrackerConfig::load_or_default(&dir.path().join("steamtrend.toml")).unwrap();
        assert_eq!(config, TrackerConfig::default());
    }
}
