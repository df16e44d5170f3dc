use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::tools::server_info::{ServerIdentity, DEFAULT_DESCRIPTION, DEFAULT_SERVER_NAME};

pub const CONFIG_PATH_ENV: &str = "JETSON_MCP_CONFIG";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Server,
    Stdio,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mode::Server => "server",
            Mode::Stdio => "stdio",
        })
    }
}

impl FromStr for Mode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "server" => Ok(Mode::Server),
            "stdio" => Ok(Mode::Stdio),
            other => Err(ConfigError::InvalidMode(other.to_owned())),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid MODE: {0}. Must be 'server' or 'stdio'")]
    InvalidMode(String),
    #[error("PORT cannot be 0")]
    InvalidPort,
    #[error("invalid HOST: {0}")]
    InvalidHost(String),
}

/// Resolved settings: defaults, then TOML file, then environment, then CLI.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub mode: Mode,
    pub host: String,
    pub port: u16,
    pub server_name: String,
    pub description: String,
    /// How long to wait for open streams after a shutdown signal.
    pub shutdown_grace_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: Mode::Server,
            host: "0.0.0.0".into(),
            port: 8000,
            server_name: DEFAULT_SERVER_NAME.into(),
            description: DEFAULT_DESCRIPTION.into(),
            shutdown_grace_secs: 5,
        }
    }
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut cfg = match path {
            Some(p) => {
                let raw = std::fs::read_to_string(p).map_err(|source| ConfigError::Io {
                    path: p.to_path_buf(),
                    source,
                })?;
                Self::from_toml_str(&raw)?
            }
            None => Self::default(),
        };
        cfg.apply_env();
        Ok(cfg)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    /// Unparseable values are ignored, same as unset ones.
    pub fn apply_env(&mut self) {
        if let Some(mode) = env_str("MODE").and_then(|s| s.parse().ok()) {
            self.mode = mode;
        }
        if let Some(host) = env_str("HOST") {
            self.host = host;
        }
        if let Some(port) = env_str("PORT").and_then(|s| s.parse::<u16>().ok()) {
            self.port = port;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mode == Mode::Server && self.port == 0 {
            return Err(ConfigError::InvalidPort);
        }
        self.addr().map(|_| ())
    }

    pub fn addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|_| ConfigError::InvalidHost(self.host.clone()))?;
        Ok(SocketAddr::new(ip, self.port))
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }

    pub fn identity(&self) -> ServerIdentity {
        ServerIdentity {
            server_name: self.server_name.clone(),
            description: self.description.clone(),
            ..ServerIdentity::default()
        }
    }
}

fn env_str(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for k in ["MODE", "HOST", "PORT", CONFIG_PATH_ENV] {
            std::env::remove_var(k);
        }
    }

    #[test]
    #[serial]
    fn defaults_to_server_on_all_interfaces_8000() {
        clear_env();
        let cfg = Config::load(None).unwrap();
        assert_eq!(cfg.mode, Mode::Server);
        assert_eq!(cfg.port, 8000);
        assert_eq!(cfg.addr().unwrap().to_string(), "0.0.0.0:8000");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    #[serial]
    fn parses_env_overrides() {
        clear_env();
        std::env::set_var("MODE", "stdio");
        std::env::set_var("PORT", "9090");
        std::env::set_var("HOST", "127.0.0.1");
        let cfg = Config::load(None).unwrap();
        assert_eq!(cfg.mode, Mode::Stdio);
        assert_eq!(cfg.port, 9090);
        assert_eq!(cfg.host, "127.0.0.1");
        clear_env();
    }

    #[test]
    #[serial]
    fn non_numeric_port_falls_back() {
        clear_env();
        std::env::set_var("PORT", "not-a-port");
        assert_eq!(Config::load(None).unwrap().port, 8000);
        clear_env();
    }

    #[test]
    #[serial]
    fn env_wins_over_toml_file() {
        clear_env();
        let path = std::env::temp_dir().join(format!("jetson-mcp-{}.toml", std::process::id()));
        std::fs::write(&path, "port = 7000\nserver_name = \"bench\"\n").unwrap();
        std::env::set_var("PORT", "7100");
        let cfg = Config::load(Some(&path)).unwrap();
        assert_eq!(cfg.port, 7100);
        assert_eq!(cfg.server_name, "bench");
        assert_eq!(cfg.identity().server_name, "bench");
        std::fs::remove_file(&path).unwrap();
        clear_env();
    }

    #[test]
    #[serial]
    fn broken_file_is_an_error_not_skipped() {
        clear_env();
        let path = std::env::temp_dir().join(format!("jetson-mcp-bad-{}.toml", std::process::id()));
        std::fs::write(&path, "port = \"eight thousand\"\n").unwrap();
        let res = Config::load(Some(&path));
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(res, Err(ConfigError::Parse(_))));
    }

    #[test]
    #[serial]
    fn missing_file_is_an_error() {
        clear_env();
        let err = Config::load(Some(Path::new("/no/such/jetson.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn toml_rejects_unknown_mode() {
        assert!(matches!(
            Config::from_toml_str("mode = \"daemon\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn validate_rejects_port_zero_and_bad_host() {
        let cfg = Config { port: 0, ..Config::default() };
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidPort)));
        let cfg = Config { host: "not an ip".into(), ..Config::default() };
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidHost(_))));
    }

    #[test]
    fn mode_parses_case_insensitively() {
        assert_eq!("STDIO".parse::<Mode>().unwrap(), Mode::Stdio);
        assert!("daemon".parse::<Mode>().is_err());
    }
}
