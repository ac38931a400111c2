//! Configuration management for the Manbo voice plugin.
//!
//! Settings come from an optional YAML file layered under `MANBO_*`
//! environment variables, e.g. `MANBO_PLUGIN__RATE_LIMIT=5`.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{ManboError, Result};

/// Environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "MANBO";

/// Keys whose environment values are comma-separated lists.
const ENV_LIST_KEYS: [&str; 3] = [
    "plugin.allowed_groups",
    "plugin.blocked_groups",
    "plugin.blocked_users",
];

/// Main configuration for the plugin.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManboConfig {
    /// Command handling, permissions and rate limiting
    #[serde(default)]
    pub plugin: PluginConfig,

    /// Text-to-speech API settings
    #[serde(default)]
    pub api: ApiConfig,
}

/// Plugin behavior configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Master switch for the plugin
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Command word, without the leading slash
    #[serde(default = "default_command")]
    pub command: String,

    /// Requests per minute per rate limit key. `-1` is unlimited, `0` blocks everything.
    #[serde(default = "default_rate_limit")]
    pub rate_limit: i64,

    /// Maximum number of characters accepted for synthesis
    #[serde(default = "default_max_text_length")]
    pub max_text_length: usize,

    /// Groups the command may be used in. Empty means every group.
    #[serde(default, deserialize_with = "id_list::deserialize")]
    pub allowed_groups: Vec<i64>,

    /// Groups the command is never answered in
    #[serde(default, deserialize_with = "id_list::deserialize")]
    pub blocked_groups: Vec<i64>,

    /// Users whose commands are ignored
    #[serde(default, deserialize_with = "id_list::deserialize")]
    pub blocked_users: Vec<i64>,

    /// Whether the command is answered in private chats
    #[serde(default = "default_allow_private")]
    pub allow_private: bool,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            command: default_command(),
            rate_limit: default_rate_limit(),
            max_text_length: default_max_text_length(),
            allowed_groups: Vec::new(),
            blocked_groups: Vec::new(),
            blocked_users: Vec::new(),
            allow_private: default_allow_private(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_command() -> String {
    "曼波".to_string()
}

fn default_rate_limit() -> i64 {
    -1
}

fn default_max_text_length() -> usize {
    200
}

fn default_allow_private() -> bool {
    true
}

/// Text-to-speech API configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Endpoint that accepts `{"text": ...}` and answers with an audio URL
    #[serde(default = "default_api_url")]
    pub url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Optional bearer token
    #[serde(default)]
    pub token: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: default_api_url(),
            timeout_secs: default_timeout(),
            token: None,
        }
    }
}

impl ApiConfig {
    /// Request timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_api_url() -> String {
    "http://127.0.0.1:8000/tts".to_string()
}

fn default_timeout() -> u64 {
    30
}

/// Accepts a list of ids, or a single id, as environment overrides yield
/// either depending on how many values were given.
mod id_list {
    use serde::de::{self, Deserializer, SeqAccess, Visitor};
    use std::fmt;

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<i64>, D::Error> {
        deserializer.deserialize_any(IdListVisitor)
    }

    struct IdListVisitor;

    impl<'de> Visitor<'de> for IdListVisitor {
        type Value = Vec<i64>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("an id or a list of ids")
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            Ok(vec![v])
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            Id::from_u64::<E>(v).map(|id| vec![id.0])
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| Id::parse::<E>(s).map(|id| id.0))
                .collect()
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let mut ids = Vec::new();
            while let Some(id) = seq.next_element::<Id>()? {
                ids.push(id.0);
            }
            Ok(ids)
        }
    }

    /// One list element, given as a number or a numeric string.
    struct Id(i64);

    impl Id {
        fn from_u64<E: de::Error>(v: u64) -> Result<Self, E> {
            i64::try_from(v)
                .map(Id)
                .map_err(|_| E::custom(format!("id {} out of range", v)))
        }

        fn parse<E: de::Error>(v: &str) -> Result<Self, E> {
            v.trim()
                .parse()
                .map(Id)
                .map_err(|_| E::custom(format!("invalid id {:?}", v)))
        }
    }

    impl<'de> de::Deserialize<'de> for Id {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            struct IdVisitor;

            impl<'de> Visitor<'de> for IdVisitor {
                type Value = Id;

                fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                    f.write_str("an integer id")
                }

                fn visit_i64<E: de::Error>(self, v: i64) -> Result<Id, E> {
                    Ok(Id(v))
                }

                fn visit_u64<E: de::Error>(self, v: u64) -> Result<Id, E> {
                    Id::from_u64(v)
                }

                fn visit_str<E: de::Error>(self, v: &str) -> Result<Id, E> {
                    Id::parse(v)
                }
            }

            deserializer.deserialize_any(IdVisitor)
        }
    }
}

impl ManboConfig {
    /// Load configuration from an optional YAML file plus environment overrides.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(
                config::File::from(Path::new(path))
                    .format(config::FileFormat::Yaml)
                    .required(true),
            );
        }

        let environment = ENV_LIST_KEYS.iter().fold(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(","),
            |env, key| env.with_list_parse_key(key),
        );

        let config: ManboConfig = builder
            .add_source(environment)
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: ManboConfig = serde_yaml::from_str(yaml)
            .map_err(|e| ManboError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the plugin cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.plugin.rate_limit < -1 {
            return Err(ManboError::Config(format!(
                "plugin.rate_limit must be -1, 0 or positive, got {}",
                self.plugin.rate_limit
            )));
        }
        if self.plugin.command.trim().is_empty() {
            return Err(ManboError::Config("plugin.command must not be empty".into()));
        }
        if self.plugin.max_text_length == 0 {
            return Err(ManboError::Config(
                "plugin.max_text_length must be greater than zero".into(),
            ));
        }
        if self.api.url.trim().is_empty() {
            return Err(ManboError::Config("api.url must not be empty".into()));
        }
        if self.api.timeout_secs == 0 {
            return Err(ManboError::Config(
                "api.timeout_secs must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}
