pub mod cli;
pub mod toml_config;

use serde::{Deserialize, Serialize};

pub use cli::{Cli, Command, MigrateCommand};
pub use toml_config::ServiceConfig;

/// Deployment mode, chosen by the `ENV` build argument or `--env`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    /// Only the literal `production` selects production; anything else is development.
    pub fn from_env_value(value: &str) -> Self {
        if value == "production" {
            Self::Production
        } else {
            Self::Development
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl From<String> for Environment {
    fn from(value: String) -> Self {
        Self::from_env_value(&value)
    }
}
