use anyhow::{Context, Result, anyhow};
use clap::Parser;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATABASE_PATH: &str = "database.json";
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// Command line flags. Each one can also come from the environment.
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "carstore", version, about = "Car record store with a JSON HTTP API")]
pub struct Cli {
    /// JSON config file; `config.json` is used when present
    #[arg(long, env = "CARS_CONFIG")]
    pub config: Option<PathBuf>,

    #[arg(long, env = "APP_HOST")]
    pub host: Option<String>,

    #[arg(long, env = "APP_PORT")]
    pub port: Option<u16>,

    /// Backing file for the car records
    #[arg(long = "database", env = "CARS_DATABASE_PATH")]
    pub database_path: Option<PathBuf>,
}

/// Contents of the optional JSON config file. Every field may be omitted.
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub host: Option<String>,
    pub port: Option<PortValue>,
    pub database_path: Option<PathBuf>,
}

/// Accepts both `8080` and the listen-address style `":8080"`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PortValue {
    Number(u16),
    Text(String),
}

impl PortValue {
    fn resolve(&self) -> Result<u16> {
        match self {
            Self::Number(port) => Ok(*port),
            Self::Text(raw) => raw
                .trim()
                .trim_start_matches(':')
                .parse::<u16>()
                .map_err(|_| anyhow!("port '{raw}' must be a valid u16")),
        }
    }
}

impl FileConfig {
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_path: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
        }
    }
}

impl AppConfig {
    /// Loads `.env`, parses flags and environment, then layers them over the
    /// config file and the defaults.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::resolve(Cli::parse())
    }

    pub fn resolve(cli: Cli) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => Some(FileConfig::from_path(path)?),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Some(FileConfig::from_path(default_path)?)
                } else {
                    None
                }
            }
        };

        let mut config = Self::default();
        if let Some(file) = file {
            config.apply_file(file)?;
        }
        config.apply_cli(cli);
        Ok(config)
    }

    fn apply_file(&mut self, file: FileConfig) -> Result<()> {
        if let Some(host) = file.host {
            self.host = host;
        }
        if let Some(port) = file.port {
            self.port = port.resolve().context("invalid port in config file")?;
        }
        if let Some(path) = file.database_path {
            self.database_path = path;
        }
        Ok(())
    }

    fn apply_cli(&mut self, cli: Cli) {
        if let Some(host) = cli.host {
            self.host = host;
        }
        if let Some(port) = cli.port {
            self.port = port;
        }
        if let Some(path) = cli.database_path {
            self.database_path = path;
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("config.json");
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn file_values_override_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(
            &temp_dir,
            r#"{"host": "127.0.0.1", "port": ":9090", "database_path": "/tmp/cars.json"}"#,
        );

        let config = AppConfig::resolve(Cli {
            config: Some(path),
            ..Cli::default()
        })
        .unwrap();

        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 9090);
        assert_eq!(config.database_path, PathBuf::from("/tmp/cars.json"));
        assert_eq!(config.address(), "127.0.0.1:9090");
    }

    #[test]
    fn cli_values_override_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(&temp_dir, r#"{"port": 9090}"#);

        let config = AppConfig::resolve(Cli {
            config: Some(path),
            port: Some(7070),
            database_path: Some(PathBuf::from("other.json")),
            ..Cli::default()
        })
        .unwrap();

        assert_eq!(config.host, DEFAULT_HOST);
        assert_eq!(config.port, 7070);
        assert_eq!(config.database_path, PathBuf::from("other.json"));
    }

    #[test]
    fn missing_explicit_config_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let result = AppConfig::resolve(Cli {
            config: Some(temp_dir.path().join("absent.json")),
            ..Cli::default()
        });
        assert!(result.is_err());
    }

    #[test]
    fn invalid_port_string_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(&temp_dir, r#"{"port": ":http"}"#);
        let result = AppConfig::resolve(Cli {
            config: Some(path),
            ..Cli::default()
        });
        assert!(result.is_err());
    }

    #[test]
    fn cli_parses_flags() {
        let cli = Cli::try_parse_from([
            "carstore",
            "--port",
            "3000",
            "--database",
            "cars.json",
        ])
        .unwrap();
        assert_eq!(cli.port, Some(3000));
        assert_eq!(cli.database_path, Some(PathBuf::from("cars.json")));
    }
}
