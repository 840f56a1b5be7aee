//! Server settings
//!
//! Loaded from an optional `jobtoken.toml` / `jobtoken.yaml` in the working
//! directory, then `JOBTOKEN_*` environment variables.

use config::{Config, ConfigError, Environment, File};
use jobtoken_oidc::OidcConfig;
use serde::Deserialize;
use std::path::PathBuf;

/// Application configuration settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Root URL of the host (e.g., "https://ci.example.org")
    pub root_url: String,
    /// Address the HTTP server listens on
    pub bind: String,
    /// JSON file holding scopes and their credentials
    pub credentials_file: PathBuf,
    /// Hex file holding the master key that encrypts private keys
    pub master_key_file: PathBuf,
    /// Required in `X-Admin-Key` on admin routes when set
    #[serde(default)]
    pub admin_key: Option<String>,
}

impl Settings {
    /// Load settings from `jobtoken.*` and the environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("jobtoken")
    }

    /// Load settings from the config file `name` (extension optional) and
    /// the environment
    pub fn load_from(name: &str) -> Result<Self, ConfigError> {
        let settings: Settings = Config::builder()
            .set_default("root_url", "http://localhost:3000")?
            .set_default("bind", "0.0.0.0:3000")?
            .set_default("credentials_file", "credentials.json")?
            .set_default("master_key_file", "master.key")?
            .add_source(File::with_name(name).required(false))
            .add_source(Environment::with_prefix("JOBTOKEN"))
            .build()?
            .try_deserialize()?;

        Ok(Settings {
            admin_key: settings.admin_key.filter(|k| !k.is_empty()),
            ..settings
        })
    }

    pub fn oidc_config(&self) -> OidcConfig {
        OidcConfig::new(&self.root_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "root_url = \"https://ci.example.org/\"\ncredentials_file = \"/var/lib/jobtoken/credentials.json\""
        )
        .unwrap();

        let settings = Settings::load_from(file.path().to_str().unwrap()).unwrap();
        assert_eq!(settings.root_url, "https://ci.example.org/");
        assert_eq!(
            settings.credentials_file,
            PathBuf::from("/var/lib/jobtoken/credentials.json")
        );
        assert_eq!(settings.master_key_file, PathBuf::from("master.key"));
        assert_eq!(
            settings.oidc_config().issuer_url("/job/team"),
            "https://ci.example.org/oidc/job/team"
        );
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let settings = Settings::load_from("/nonexistent/jobtoken-settings").unwrap();
        assert_eq!(settings.master_key_file, PathBuf::from("master.key"));
        assert_eq!(settings.credentials_file, PathBuf::from("credentials.json"));
    }
}
