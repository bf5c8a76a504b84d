use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ApiConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
}

impl ApiConfig {
    /// Loads the configuration, later sources overriding earlier ones:
    /// built-in defaults, `census.toml` in the working directory,
    /// `~/.config/census/api.toml`, `explicit` (must exist when given) and
    /// finally `CENSUS_` environment variables such as `CENSUS_SERVER__PORT`.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut settings = defaults()?;

        if let Ok(current_dir) = env::current_dir() {
            let local = current_dir.join("census.toml");
            if local.exists() {
                settings = settings.add_source(File::from(local));
            }
        }

        if let Some(user) = user_config_path() {
            settings = settings.add_source(File::from(user).required(false));
        }

        if let Some(path) = explicit {
            settings = settings.add_source(File::from(path.to_path_buf()));
        }

        settings = settings.add_source(
            Environment::with_prefix("CENSUS")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        finish(settings)
    }

    /// Loads defaults overlaid with a single file, ignoring the environment.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        finish(defaults()?.add_source(File::from(path.to_path_buf())))
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.server.host.clone(), self.server.port)
    }
}

fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("server.host", "127.0.0.1")?
        .set_default("server.port", 8080)?
        .set_default(
            "database.path",
            get_default_db_path().to_string_lossy().to_string(),
        )?
        .set_default("logging.level", "info")
}

fn finish(settings: ConfigBuilder<DefaultState>) -> Result<ApiConfig, ConfigError> {
    let mut config: ApiConfig = settings.build()?.try_deserialize()?;
    config.database.path = expand_tilde(&config.database.path);
    Ok(config)
}

fn expand_tilde(path: &Path) -> PathBuf {
    if path.starts_with("~") {
        if let Some(home) = home::home_dir() {
            let path_str = path.to_string_lossy();
            let expanded = path_str.replacen('~', &home.to_string_lossy(), 1);
            return PathBuf::from(expanded);
        }
    }
    path.to_path_buf()
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("census/api.toml"))
}

fn get_default_db_path() -> PathBuf {
    if let Some(data_dir) = dirs::data_local_dir() {
        data_dir.join("census/census.db")
    } else {
        PathBuf::from("census.db")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults_fill_missing_sections() {
        let file = write_config(
            r#"
[server]
port = 9090
"#,
        );

        let config = ApiConfig::from_file(file.path()).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.logging.level, "info");
        assert!(config.database.path.ends_with("census.db"));
    }

    #[test]
    fn test_database_path_tilde_is_expanded() {
        let file = write_config(
            r#"
[database]
path = "~/census/data.db"

[logging]
level = "debug"
"#,
        );

        let config = ApiConfig::from_file(file.path()).unwrap();
        assert!(!config.database.path.starts_with("~"));
        assert!(config.database.path.ends_with("census/data.db"));
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_environment_overrides_explicit_file() {
        let file = write_config(
            r#"
[server]
host = "0.0.0.0"
port = 9090

[logging]
level = "warn"
"#,
        );

        std::env::set_var("CENSUS_SERVER__PORT", "9191");
        std::env::set_var("CENSUS_LOGGING__LEVEL", "trace");
        let loaded = ApiConfig::load(Some(file.path()));
        std::env::remove_var("CENSUS_SERVER__PORT");
        std::env::remove_var("CENSUS_LOGGING__LEVEL");

        let config = loaded.unwrap();
        assert_eq!(config.server.port, 9191);
        assert_eq!(config.logging.level, "trace");
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        assert!(ApiConfig::from_file(&missing).is_err());
    }
}
