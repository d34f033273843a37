//! Configuration management for ado-rest.
//!
//! The request path never reads the environment. Instead, callers build a
//! [`ClientConfig`] explicitly, or let [`Config`] gather values from:
//! - TOML configuration files following the XDG Base Directory specification
//! - Environment variables (`AZURE_DEVOPS_ORGANIZATION`, `AZURE_DEVOPS_PROJECT`,
//!   `AZURE_DEVOPS_PAT`, `AZURE_DEVOPS_BASE_URL`)
//! - Command line flags
//!
//! and then [`Config::resolve`] it. Missing required values fail here, before
//! any request is issued.
//!
//! ## Example
//!
//! ```rust
//! use ado_rest::config::{ClientConfig, Config};
//! use ado_rest::parsed_property::ParsedProperty;
//!
//! let explicit = Config {
//!     organization: Some(ParsedProperty::Cli("contoso".to_string())),
//!     project: Some(ParsedProperty::Cli("fabrikam".to_string())),
//!     pat: Some(ParsedProperty::Cli("secret".to_string().into())),
//!     ..Config::default()
//! };
//!
//! let config: ClientConfig = Config::default().merge(explicit).resolve().unwrap();
//! assert_eq!(config.organization(), "contoso");
//! assert_eq!(config.base_url().as_str(), "https://dev.azure.com/");
//! ```

use crate::error::ConfigError;
use crate::parsed_property::ParsedProperty;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

/// Public Azure DevOps services host.
pub const DEFAULT_BASE_URL: &str = "https://dev.azure.com";

pub const ORGANIZATION_ENV: &str = "AZURE_DEVOPS_ORGANIZATION";
pub const PROJECT_ENV: &str = "AZURE_DEVOPS_PROJECT";
pub const PAT_ENV: &str = "AZURE_DEVOPS_PAT";
pub const BASE_URL_ENV: &str = "AZURE_DEVOPS_BASE_URL";

/// Temporary struct for deserializing TOML configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct ConfigFile {
    pub organization: Option<String>,
    pub project: Option<String>,
    pub pat: Option<String>,
    pub base_url: Option<String>,
}

/// Connection settings assembled from CLI arguments, environment variables,
/// config file, and defaults. Every field remembers its source.
#[derive(Debug)]
pub struct Config {
    /// Azure DevOps organization name.
    pub organization: Option<ParsedProperty<String>>,
    /// Azure DevOps project name.
    pub project: Option<ParsedProperty<String>>,
    /// Personal access token.
    pub pat: Option<ParsedProperty<SecretString>>,
    /// Scheme and host of the service, e.g. `https://dev.azure.com`.
    pub base_url: Option<ParsedProperty<String>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            organization: None,
            project: None,
            pat: None,
            base_url: Some(ParsedProperty::Default(DEFAULT_BASE_URL.to_string())),
        }
    }
}

impl Config {
    /// Load configuration from the XDG config directory.
    ///
    /// A missing file is not an error and yields an empty configuration.
    pub fn load_from_file() -> Result<Self, ConfigError> {
        let config_path = Self::config_path()?;
        Self::load_from_path(&config_path)
    }

    /// Load configuration from an explicit TOML file.
    pub fn load_from_path(config_path: &Path) -> Result<Self, ConfigError> {
        if !config_path.exists() {
            return Ok(Self::empty());
        }

        let config_content =
            fs::read_to_string(config_path).map_err(|e| ConfigError::FileReadError {
                path: config_path.to_path_buf(),
                message: e.to_string(),
            })?;

        let config_file: ConfigFile =
            toml::from_str(&config_content).map_err(|e| ConfigError::ParseError {
                path: config_path.to_path_buf(),
                message: e.to_string(),
            })?;

        let from_file = |v: String| ParsedProperty::File(v, config_path.to_path_buf());

        Ok(Self {
            organization: config_file.organization.map(from_file),
            project: config_file.project.map(from_file),
            pat: config_file
                .pat
                .map(|v| from_file(v).map(SecretString::from)),
            base_url: config_file.base_url.map(from_file),
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Empty variables are treated as unset.
    pub fn load_from_env() -> Self {
        fn var(name: &'static str) -> Option<ParsedProperty<String>> {
            std::env::var(name)
                .ok()
                .filter(|v| !v.is_empty())
                .map(|v| ParsedProperty::Env(v, name))
        }

        Self {
            organization: var(ORGANIZATION_ENV),
            project: var(PROJECT_ENV),
            pat: var(PAT_ENV).map(|p| p.map(SecretString::from)),
            base_url: var(BASE_URL_ENV),
        }
    }

    /// A configuration with no values at all, not even defaults.
    pub fn empty() -> Self {
        Self {
            organization: None,
            project: None,
            pat: None,
            base_url: None,
        }
    }

    /// Path of the config file: `$XDG_CONFIG_HOME/ado-rest/config.toml`,
    /// falling back to `~/.config/ado-rest/config.toml`.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = match std::env::var("XDG_CONFIG_HOME") {
            Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => dirs::home_dir()
                .map(|home| home.join(".config"))
                .ok_or_else(|| ConfigError::DirectoryCreationError {
                    path: PathBuf::from("~/.config"),
                    message: "could not determine home directory".to_string(),
                })?,
        };

        Ok(config_dir.join("ado-rest").join("config.toml"))
    }

    /// Merge this config with another, preferring values from other when they exist
    pub fn merge(self, other: Self) -> Self {
        Self {
            organization: other.organization.or(self.organization),
            project: other.project.or(self.project),
            pat: other.pat.or(self.pat),
            base_url: other.base_url.or(self.base_url),
        }
    }

    /// Load file, then environment, on top of the defaults.
    pub fn load() -> Result<Self, ConfigError> {
        Ok(Self::default()
            .merge(Self::load_from_file()?)
            .merge(Self::load_from_env()))
    }

    /// Validate and freeze the configuration.
    pub fn resolve(self) -> Result<ClientConfig, ConfigError> {
        let organization = required(self.organization, "organization", ORGANIZATION_ENV)?;
        let project = required(self.project, "project", PROJECT_ENV)?;
        let pat = self
            .pat
            .map(ParsedProperty::into_value)
            .filter(|p| !p.expose_secret().is_empty())
            .ok_or_else(|| missing("pat", PAT_ENV))?;

        let config = ClientConfig::new(organization, project, pat)?;
        match self.base_url {
            Some(base_url) => config.with_base_url(base_url.value()),
            None => Ok(config),
        }
    }

    /// Create a sample config file for user reference.
    ///
    /// Existing files are left untouched. Returns the path of the file.
    pub fn create_sample_config() -> Result<PathBuf, ConfigError> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            return Ok(config_path);
        }

        if let Some(dir) = config_path.parent() {
            fs::create_dir_all(dir).map_err(|e| ConfigError::DirectoryCreationError {
                path: dir.to_path_buf(),
                message: e.to_string(),
            })?;
        }

        let sample_config = r#"# ado-rest configuration file
# Location: ~/.config/ado-rest/config.toml (or $XDG_CONFIG_HOME/ado-rest/config.toml)
# Environment variables and command line flags take precedence over this file.

# Azure DevOps organization (required)
# organization = "your-organization"

# Azure DevOps project (required)
# project = "your-project"

# Personal access token (required). Prefer the AZURE_DEVOPS_PAT environment variable.
# pat = "your-personal-access-token"

# Service URL, only needed for Azure DevOps Server installations
# base_url = "https://dev.azure.com"
"#;

        fs::write(&config_path, sample_config).map_err(|e| ConfigError::FileReadError {
            path: config_path.clone(),
            message: e.to_string(),
        })?;

        Ok(config_path)
    }
}

fn missing(field: &str, env_var: &str) -> ConfigError {
    ConfigError::MissingRequired {
        field: field.to_string(),
        env_var: env_var.to_string(),
    }
}

fn required(
    value: Option<ParsedProperty<String>>,
    field: &str,
    env_var: &str,
) -> Result<String, ConfigError> {
    value
        .map(ParsedProperty::into_value)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| missing(field, env_var))
}

/// Immutable connection settings shared by every node of the resource tree.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    organization: String,
    project: String,
    pat: SecretString,
    base_url: Url,
}

impl ClientConfig {
    /// Creates a configuration for the public service host.
    ///
    /// Fails with [`ConfigError::MissingRequired`] if any value is empty.
    pub fn new(
        organization: impl Into<String>,
        project: impl Into<String>,
        pat: SecretString,
    ) -> Result<Self, ConfigError> {
        let organization = organization.into();
        let project = project.into();

        if organization.trim().is_empty() {
            return Err(missing("organization", ORGANIZATION_ENV));
        }
        if project.trim().is_empty() {
            return Err(missing("project", PROJECT_ENV));
        }
        if pat.expose_secret().is_empty() {
            return Err(missing("pat", PAT_ENV));
        }

        Ok(Self {
            organization,
            project,
            pat,
            base_url: Url::parse(DEFAULT_BASE_URL).map_err(|e| ConfigError::InvalidValue {
                field: "base_url".to_string(),
                message: e.to_string(),
            })?,
        })
    }

    /// Points the configuration at another host (Azure DevOps Server, test servers).
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, ConfigError> {
        let url = Url::parse(base_url).map_err(|e| ConfigError::InvalidValue {
            field: "base_url".to_string(),
            message: e.to_string(),
        })?;
        if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidValue {
                field: "base_url".to_string(),
                message: format!("'{base_url}' is not an http(s) URL"),
            });
        }
        self.base_url = url;
        Ok(self)
    }

    /// Builds the configuration from the process environment only.
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::default().merge(Config::load_from_env()).resolve()
    }

    /// Returns the organization name.
    pub fn organization(&self) -> &str {
        &self.organization
    }

    /// Returns the project name.
    pub fn project(&self) -> &str {
        &self.project
    }

    /// Returns the personal access token.
    pub fn pat(&self) -> &SecretString {
        &self.pat
    }

    /// Returns the service URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

impl PartialEq for ClientConfig {
    fn eq(&self, other: &Self) -> bool {
        self.organization == other.organization
            && self.project == other.project
            && self.base_url == other.base_url
            && self.pat.expose_secret() == other.pat.expose_secret()
    }
}

impl Eq for ClientConfig {}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::file_serial;
    use std::env;
    use tempfile::TempDir;

    fn clear_env() {
        for var in [ORGANIZATION_ENV, PROJECT_ENV, PAT_ENV, BASE_URL_ENV] {
            unsafe {
                env::remove_var(var);
            }
        }
    }

    /// # Config Default
    ///
    /// ## Test Scenario
    /// - Builds the default configuration
    ///
    /// ## Expected Outcome
    /// - Only the base URL has a value, and it is the public host
    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.organization.is_none());
        assert!(config.project.is_none());
        assert!(config.pat.is_none());
        assert_eq!(
            config.base_url.as_deref().map(String::as_str),
            Some(DEFAULT_BASE_URL)
        );
    }

    /// # Load From Environment
    ///
    /// Tests that every supported variable is picked up.
    ///
    /// ## Test Scenario
    /// - Sets all AZURE_DEVOPS_* variables
    /// - Loads and resolves the configuration
    ///
    /// ## Expected Outcome
    /// - Values come from the environment and remember their variable
    #[test]
    #[file_serial(env_tests)]
    fn test_load_from_env_all_variables() {
        clear_env();
        unsafe {
            env::set_var(ORGANIZATION_ENV, "contoso");
            env::set_var(PROJECT_ENV, "fabrikam");
            env::set_var(PAT_ENV, "token");
            env::set_var(BASE_URL_ENV, "https://ado.internal.example");
        }

        let config = Config::load_from_env();
        assert_eq!(
            config.organization,
            Some(ParsedProperty::Env("contoso".to_string(), ORGANIZATION_ENV))
        );
        assert_eq!(
            config.project.as_ref().map(ParsedProperty::source).as_deref(),
            Some("env (AZURE_DEVOPS_PROJECT)")
        );

        let resolved = config.resolve().unwrap();
        assert_eq!(resolved.organization(), "contoso");
        assert_eq!(resolved.project(), "fabrikam");
        assert_eq!(resolved.pat().expose_secret(), "token");
        assert_eq!(resolved.base_url().host_str(), Some("ado.internal.example"));

        clear_env();
    }

    /// # Missing Values Fail Fast
    ///
    /// ## Test Scenario
    /// - Clears the environment and resolves
    /// - Sets an empty organization variable and resolves
    ///
    /// ## Expected Outcome
    /// - Resolution fails naming the organization first
    /// - Empty variables count as missing
    #[test]
    #[file_serial(env_tests)]
    fn test_from_env_missing_values() {
        clear_env();

        let err = ClientConfig::from_env().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingRequired { ref field, .. } if field == "organization"
        ));

        unsafe {
            env::set_var(ORGANIZATION_ENV, "");
            env::set_var(PROJECT_ENV, "fabrikam");
            env::set_var(PAT_ENV, "token");
        }
        assert!(Config::load_from_env().organization.is_none());

        unsafe {
            env::set_var(ORGANIZATION_ENV, "contoso");
            env::remove_var(PAT_ENV);
        }
        let err = ClientConfig::from_env().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingRequired { ref env_var, .. } if env_var == PAT_ENV
        ));

        clear_env();
    }

    /// # Merge Precedence
    ///
    /// ## Test Scenario
    /// - Merges a file-like config with a CLI-like config
    ///
    /// ## Expected Outcome
    /// - Values from the later config win, others are kept
    #[test]
    fn test_config_merge_other_takes_precedence() {
        let base = Config {
            organization: Some(ParsedProperty::File(
                "from-file".to_string(),
                PathBuf::from("config.toml"),
            )),
            project: Some(ParsedProperty::File(
                "file-project".to_string(),
                PathBuf::from("config.toml"),
            )),
            ..Config::default()
        };
        let cli = Config {
            organization: Some(ParsedProperty::Cli("from-cli".to_string())),
            ..Config::empty()
        };

        let merged = base.merge(cli);
        assert_eq!(
            merged.organization,
            Some(ParsedProperty::Cli("from-cli".to_string()))
        );
        assert_eq!(merged.project.as_deref().map(String::as_str), Some("file-project"));
        assert!(merged.base_url.is_some());
    }

    /// # Load From File
    ///
    /// ## Test Scenario
    /// - Writes a TOML file with all keys into a temp directory
    ///
    /// ## Expected Outcome
    /// - Every key is read and tagged with the file path
    #[test]
    fn test_load_from_path_valid_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
organization = "contoso"
project = "fabrikam"
pat = "file-token"
base_url = "https://tfs.example.com/tfs"
"#,
        )
        .unwrap();

        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(
            config.organization,
            Some(ParsedProperty::File("contoso".to_string(), path.clone()))
        );
        assert_eq!(
            config.pat.as_ref().map(|p| p.expose_secret().to_string()),
            Some("file-token".to_string())
        );

        let resolved = config.resolve().unwrap();
        assert_eq!(resolved.base_url().path(), "/tfs");
    }

    #[test]
    fn test_load_from_path_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from_path(&dir.path().join("nope.toml")).unwrap();
        assert!(config.organization.is_none());
        assert!(config.base_url.is_none());
    }

    #[test]
    fn test_load_from_path_invalid_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "organization = [unterminated").unwrap();

        let err = Config::load_from_path(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    /// # Sample Config Creation
    ///
    /// ## Test Scenario
    /// - Points XDG_CONFIG_HOME at a temp dir and creates the sample twice
    ///
    /// ## Expected Outcome
    /// - The file lands under ado-rest/config.toml and is not overwritten
    #[test]
    #[file_serial(env_tests)]
    fn test_create_sample_config() {
        let dir = TempDir::new().unwrap();
        let original_xdg = env::var("XDG_CONFIG_HOME").ok();
        unsafe {
            env::set_var("XDG_CONFIG_HOME", dir.path());
        }

        let path = Config::create_sample_config().unwrap();
        assert_eq!(path, dir.path().join("ado-rest").join("config.toml"));
        fs::write(&path, "organization = \"kept\"\n").unwrap();

        Config::create_sample_config().unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "organization = \"kept\"\n");

        // The sample itself must parse
        let loaded = Config::load_from_file().unwrap();
        assert_eq!(loaded.organization.as_deref().map(String::as_str), Some("kept"));

        unsafe {
            match original_xdg {
                Some(v) => env::set_var("XDG_CONFIG_HOME", v),
                None => env::remove_var("XDG_CONFIG_HOME"),
            }
        }
    }

    /// # ClientConfig Validation
    ///
    /// ## Test Scenario
    /// - Builds configs with blank values and bad base URLs
    ///
    /// ## Expected Outcome
    /// - Blank values are MissingRequired, bad URLs are InvalidValue
    #[test]
    fn test_client_config_validation() {
        let pat = || SecretString::from("t".to_string());

        assert!(matches!(
            ClientConfig::new(" ", "p", pat()),
            Err(ConfigError::MissingRequired { .. })
        ));
        assert!(matches!(
            ClientConfig::new("o", "", pat()),
            Err(ConfigError::MissingRequired { .. })
        ));
        assert!(matches!(
            ClientConfig::new("o", "p", SecretString::from(String::new())),
            Err(ConfigError::MissingRequired { .. })
        ));

        let config = ClientConfig::new("o", "p", pat()).unwrap();
        assert!(matches!(
            config.clone().with_base_url("not a url"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            config.clone().with_base_url("mailto:someone@example.com"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(config.with_base_url("http://localhost:8080").is_ok());
    }

    #[test]
    fn test_client_config_equality_includes_token() {
        let a = ClientConfig::new("o", "p", SecretString::from("hunter2".to_string())).unwrap();
        let b = ClientConfig::new("o", "p", SecretString::from("hunter2".to_string())).unwrap();
        let c = ClientConfig::new("o", "p", SecretString::from("two".to_string())).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(!format!("{a:?}").contains("hunter2"));
    }
}
