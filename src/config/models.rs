use crate::humanize::HumanDuration;
use serde::{Deserialize, Serialize};

/// Top-level configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub race: RaceConfig,
    /// Delivery paths, raced in declaration order
    #[serde(default = "default_paths")]
    pub paths: Vec<PathConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            race: RaceConfig::default(),
            paths: default_paths(),
        }
    }
}

/// Race and HTTP client settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RaceConfig {
    /// Global deadline for the whole race
    #[serde(default = "default_deadline")]
    pub deadline: HumanDuration,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: HumanDuration,
    /// Per-request ceiling enforced by the HTTP client, including the body read
    #[serde(default = "default_request_timeout")]
    pub request_timeout: HumanDuration,
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            deadline: default_deadline(),
            user_agent: default_user_agent(),
            connect_timeout: default_connect_timeout(),
            request_timeout: default_request_timeout(),
        }
    }
}

fn default_deadline() -> HumanDuration {
    HumanDuration::from_secs(45)
}

fn default_user_agent() -> String {
    "feedrace/0.1.0".to_string()
}

fn default_connect_timeout() -> HumanDuration {
    HumanDuration::from_secs(10)
}

fn default_request_timeout() -> HumanDuration {
    HumanDuration::from_secs(60)
}

/// One delivery path: `{url}` is replaced by the target as-is,
/// `{url_encoded}` by its percent-encoded form
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PathConfig {
    pub name: String,
    pub template: String,
}

impl PathConfig {
    pub fn new(name: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            template: template.into(),
        }
    }
}

pub(crate) fn default_paths() -> Vec<PathConfig> {
    vec![
        PathConfig::new("direct", "{url}"),
        PathConfig::new("allorigins", "https://api.allorigins.win/raw?url={url_encoded}"),
        PathConfig::new("corsproxy", "https://corsproxy.io/?{url_encoded}"),
        PathConfig::new("codetabs", "https://api.codetabs.com/v1/proxy?quest={url_encoded}"),
    ]
}
