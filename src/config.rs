//! Runtime configuration loaded from TOML.
//!
//! ```toml
//! [rules]
//! restricted = "black"   # "black" | "white" | "none"
//!
//! [search]
//! depth = 3
//! radius = 1
//!
//! [clock]
//! seconds_per_side = 300
//!
//! [server]
//! host = "127.0.0.1"
//! port = 3000
//! ```
//!
//! Every field has a default, so an empty file is a valid configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::board::Stone;
use crate::error::ConfigError;
use crate::rules::RuleSet;
use crate::search::{DEFAULT_DEPTH, DEFAULT_RADIUS};

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "OMOK_CONFIG";

/// File picked up from the working directory when nothing else is given.
pub const DEFAULT_CONFIG_FILE: &str = "omok.toml";

/// Deepest search accepted from configuration.
pub const MAX_DEPTH: u8 = 6;

/// Which side plays under overline / double-four / double-three restrictions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Restriction {
    #[default]
    Black,
    White,
    None,
}

impl Restriction {
    pub fn ruleset(self) -> RuleSet {
        let restricted = match self {
            Restriction::Black => Some(Stone::Black),
            Restriction::White => Some(Stone::White),
            Restriction::None => None,
        };
        RuleSet { restricted }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Getters, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    restricted: Restriction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Plies searched below each root move.
    depth: u8,
    /// Candidate distance from existing stones.
    radius: u8,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            depth: DEFAULT_DEPTH,
            radius: DEFAULT_RADIUS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    seconds_per_side: u64,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            seconds_per_side: 300,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    host: String,
    port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl ServerConfig {
    /// `host:port` suitable for binding or connecting.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Complete configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Getters, Serialize, Deserialize)]
#[serde(default)]
pub struct OmokConfig {
    rules: RulesConfig,
    search: SearchConfig,
    clock: ClockConfig,
    server: ServerConfig,
}

impl OmokConfig {
    /// Parses and validates configuration from TOML text.
    #[instrument(skip(content))]
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        let config = Self::from_toml_str(&content)?;
        info!(
            restricted = ?config.rules.restricted,
            depth = config.search.depth,
            port = config.server.port,
            "Config loaded successfully"
        );
        Ok(config)
    }

    /// Resolves the config file and loads it.
    ///
    /// Lookup order: `explicit`, then `$OMOK_CONFIG` (after reading `.env`),
    /// then `omok.toml` in the working directory. Without any of these the
    /// defaults are used. A file that is named but unreadable is an error.
    #[instrument(skip(explicit))]
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let path = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from))
            .or_else(|| {
                let local = PathBuf::from(DEFAULT_CONFIG_FILE);
                local.exists().then_some(local)
            });

        match path {
            Some(path) => Self::from_file(path),
            None => {
                debug!("No config file, using defaults");
                Ok(Self::default())
            }
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.search.depth > MAX_DEPTH {
            return Err(ConfigError::new(format!(
                "search.depth must be at most {}, got {}",
                MAX_DEPTH, self.search.depth
            )));
        }
        if self.search.radius == 0 {
            return Err(ConfigError::new("search.radius must be at least 1"));
        }
        if self.clock.seconds_per_side == 0 {
            return Err(ConfigError::new("clock.seconds_per_side must be positive"));
        }
        Ok(())
    }

    /// Rule variant selected by `[rules]`.
    pub fn ruleset(&self) -> RuleSet {
        self.rules.restricted.ruleset()
    }

    /// Time budget for each side.
    pub fn per_side(&self) -> Duration {
        Duration::from_secs(self.clock.seconds_per_side)
    }

    /// Overrides the search depth, keeping it within bounds.
    pub fn with_depth(mut self, depth: u8) -> Self {
        self.search.depth = depth.min(MAX_DEPTH);
        self
    }

    pub fn with_restriction(mut self, restricted: Restriction) -> Self {
        self.rules.restricted = restricted;
        self
    }

    pub fn with_clock(mut self, seconds_per_side: u64) -> Self {
        self.clock.seconds_per_side = seconds_per_side.max(1);
        self
    }

    pub fn with_server(mut self, host: impl Into<String>, port: u16) -> Self {
        self.server.host = host.into();
        self.server.port = port;
        self
    }
}
