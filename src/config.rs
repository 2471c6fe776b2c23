use std::env;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use tracing::{info, warn};

use crate::snap::SnapConfig;

/// Complete application configuration, loaded from environment variables or default values.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub store: StoreConfig,
    pub snap: SnapSettings,
    pub advisor: AdvisorConfig,
}

impl AppConfig {
    /// Creates a configuration from the currently available environment variables.
    pub fn from_env() -> Self {
        Self {
            api: ApiConfig::from_env(),
            store: StoreConfig::from_env(),
            snap: SnapSettings::from_env(),
            advisor: AdvisorConfig::from_env(),
        }
    }
}

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    bind_ip: IpAddr,
    display_host: String,
    port: u16,
}

impl ApiConfig {
    const DEFAULT_HOST: &'static str = "0.0.0.0";
    const DEFAULT_PORT: u16 = 8080;
    const HOST_VAR: &'static str = "STORAGE_PLANNER_API_HOST";
    const PORT_VAR: &'static str = "STORAGE_PLANNER_API_PORT";

    fn from_env() -> Self {
        let host_value = env_string(Self::HOST_VAR).unwrap_or_else(|| Self::DEFAULT_HOST.to_string());
        let (bind_ip, display_host) = match host_value.parse::<IpAddr>() {
            Ok(ip) => (ip, host_value),
            Err(err) => {
                warn!(
                    "⚠️ Could not parse {} ('{}'): {}. Using {}.",
                    Self::HOST_VAR,
                    host_value,
                    err,
                    Self::DEFAULT_HOST
                );
                (
                    IpAddr::V4(Ipv4Addr::UNSPECIFIED),
                    Self::DEFAULT_HOST.to_string(),
                )
            }
        };

        let port = env_string(Self::PORT_VAR)
            .map(|raw| parse_port(&raw, Self::PORT_VAR).unwrap_or(Self::DEFAULT_PORT))
            .unwrap_or(Self::DEFAULT_PORT);

        Self {
            bind_ip,
            display_host,
            port,
        }
    }

    /// Socket address to bind the server to.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_ip, self.port)
    }

    /// Visible hostname for logging and hints.
    pub fn display_host(&self) -> &str {
        &self.display_host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Indicates whether binding to all interfaces.
    pub fn binds_to_all_interfaces(&self) -> bool {
        match self.bind_ip {
            IpAddr::V4(addr) => addr == Ipv4Addr::UNSPECIFIED,
            IpAddr::V6(addr) => addr == Ipv6Addr::UNSPECIFIED,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_ip: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            display_host: Self::DEFAULT_HOST.to_string(),
            port: Self::DEFAULT_PORT,
        }
    }
}

/// Where the planner state is kept.
#[derive(Clone, Debug)]
pub struct StoreConfig {
    data_file: PathBuf,
    seed_defaults: bool,
}

impl StoreConfig {
    const DEFAULT_DATA_FILE: &'static str = "storage_planner.json";
    const DATA_FILE_VAR: &'static str = "STORAGE_PLANNER_DATA_FILE";
    const SEED_VAR: &'static str = "STORAGE_PLANNER_SEED_DEFAULTS";

    fn from_env() -> Self {
        let data_file = env_string(Self::DATA_FILE_VAR)
            .unwrap_or_else(|| Self::DEFAULT_DATA_FILE.to_string());
        let seed_defaults = env_string(Self::SEED_VAR)
            .and_then(|raw| parse_bool(&raw, Self::SEED_VAR))
            .unwrap_or(true);
        Self {
            data_file: PathBuf::from(data_file),
            seed_defaults,
        }
    }

    /// JSON file the snapshot is saved to.
    pub fn data_file(&self) -> &PathBuf {
        &self.data_file
    }

    /// Whether an empty store starts with the demo room.
    pub fn seed_defaults(&self) -> bool {
        self.seed_defaults
    }
}

/// Tuning of the snap engine.
#[derive(Clone, Debug)]
pub struct SnapSettings {
    snap: SnapConfig,
}

impl SnapSettings {
    const BAND_TOLERANCE_VAR: &'static str = "STORAGE_PLANNER_SNAP_BAND_TOLERANCE";

    fn from_env() -> Self {
        let band_tolerance = parse_f64_with_warning(
            Self::BAND_TOLERANCE_VAR,
            env_string(Self::BAND_TOLERANCE_VAR),
            SnapConfig::DEFAULT_BAND_TOLERANCE,
            |value| value > 0.0,
            "must be greater than 0",
            "Adjusted shelf tolerance changes which band dropped items land on",
        );
        Self {
            snap: SnapConfig::builder().band_tolerance(band_tolerance).build(),
        }
    }

    /// Returns the configured SnapConfig.
    pub fn snap_config(&self) -> SnapConfig {
        self.snap
    }
}

/// Connection to the external layout advisor.
#[derive(Clone, Debug)]
pub struct AdvisorConfig {
    /// Base URL; `None` disables the advisor
    pub url: Option<String>,
    pub token: Option<String>,
    pub timeout: Duration,
}

impl AdvisorConfig {
    const DEFAULT_TIMEOUT_SECS: u64 = 30;
    const URL_VAR: &'static str = "STORAGE_PLANNER_ADVISOR_URL";
    const TOKEN_VAR: &'static str = "STORAGE_PLANNER_ADVISOR_TOKEN";
    const TIMEOUT_VAR: &'static str = "STORAGE_PLANNER_HTTP_TIMEOUT_SECS";

    fn from_env() -> Self {
        let url = env_string(Self::URL_VAR);
        if url.is_none() {
            info!("ℹ️ {} not set, layout suggestions are disabled", Self::URL_VAR);
        }
        Self {
            url,
            token: env_string(Self::TOKEN_VAR),
            timeout: Duration::from_secs(parse_timeout_secs(
                env_string(Self::TIMEOUT_VAR).as_deref(),
                Self::TIMEOUT_VAR,
                Self::DEFAULT_TIMEOUT_SECS,
            )),
        }
    }
}

fn env_string(name: &str) -> Option<String> {
    match env::var(name) {
        Ok(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_owned())
            }
        }
        Err(env::VarError::NotPresent) => None,
        Err(err) => {
            warn!("⚠️ Access to {} failed: {}. Using default value.", name, err);
            None
        }
    }
}

fn parse_bool(raw: &str, var_name: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "no" | "n" | "off" => Some(false),
        other => {
            warn!(
                "⚠️ Could not interpret {} ('{}') as boolean value. Using default value.",
                var_name, other
            );
            None
        }
    }
}

fn parse_port(raw: &str, var_name: &str) -> Option<u16> {
    match raw.parse::<u16>() {
        Ok(0) => {
            warn!("⚠️ {} must not be 0. Using default port.", var_name);
            None
        }
        Ok(value) => Some(value),
        Err(err) => {
            warn!("⚠️ Could not parse {} ('{}'): {}. Using default port.", var_name, raw, err);
            None
        }
    }
}

fn parse_timeout_secs(raw: Option<&str>, var_name: &str, default: u64) -> u64 {
    match raw.map(|value| value.parse::<u64>()) {
        None | Some(Ok(0)) => default,
        Some(Ok(secs)) => secs,
        Some(Err(err)) => {
            warn!(
                "⚠️ Could not parse {} ('{}'): {}. Using default timeout {}s.",
                var_name,
                raw.unwrap_or_default(),
                err,
                default
            );
            default
        }
    }
}

fn parse_f64_with_warning(
    var_name: &str,
    raw: Option<String>,
    default: f64,
    validator: impl Fn(f64) -> bool,
    invalid_hint: &str,
    warning: &str,
) -> f64 {
    match raw {
        Some(raw) => match raw.parse::<f64>() {
            Ok(value) => {
                if !validator(value) {
                    warn!(
                        "⚠️ {} contains invalid value '{}': {}. Using {}.",
                        var_name, raw, invalid_hint, default
                    );
                    default
                } else {
                    let tolerance = (default.abs().max(1.0)) * 1e-9;
                    if (value - default).abs() > tolerance {
                        warn!("⚠️ {} ({} = {}).", warning, var_name, value);
                    }
                    value
                }
            }
            Err(err) => {
                warn!(
                    "⚠️ Could not parse {} ('{}') as number: {}. Using {}.",
                    var_name, raw, err, default
                );
                default
            }
        },
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool_true_values() {
        assert_eq!(parse_bool("1", "TEST_VAR"), Some(true));
        assert_eq!(parse_bool("true", "TEST_VAR"), Some(true));
        assert_eq!(parse_bool("yes", "TEST_VAR"), Some(true));
        assert_eq!(parse_bool("y", "TEST_VAR"), Some(true));
        assert_eq!(parse_bool("on", "TEST_VAR"), Some(true));

        // Test case insensitivity
        assert_eq!(parse_bool("TRUE", "TEST_VAR"), Some(true));
        assert_eq!(parse_bool("Yes", "TEST_VAR"), Some(true));

        assert_eq!(parse_bool(" true ", "TEST_VAR"), Some(true));
    }

    #[test]
    fn test_parse_bool_false_values() {
        assert_eq!(parse_bool("0", "TEST_VAR"), Some(false));
        assert_eq!(parse_bool("false", "TEST_VAR"), Some(false));
        assert_eq!(parse_bool("no", "TEST_VAR"), Some(false));
        assert_eq!(parse_bool("OFF", "TEST_VAR"), Some(false));
        assert_eq!(parse_bool("  0  ", "TEST_VAR"), Some(false));
    }

    #[test]
    fn test_parse_bool_invalid_values() {
        assert_eq!(parse_bool("invalid", "TEST_VAR"), None);
        assert_eq!(parse_bool("2", "TEST_VAR"), None);
        assert_eq!(parse_bool("", "TEST_VAR"), None);
    }

    #[test]
    fn test_parse_port() {
        assert_eq!(parse_port("3000", "TEST_VAR"), Some(3000));
        assert_eq!(parse_port("0", "TEST_VAR"), None);
        assert_eq!(parse_port("70000", "TEST_VAR"), None);
        assert_eq!(parse_port("http", "TEST_VAR"), None);
    }

    #[test]
    fn test_parse_timeout() {
        assert_eq!(parse_timeout_secs(None, "TEST_VAR", 30), 30);
        assert_eq!(parse_timeout_secs(Some("5"), "TEST_VAR", 30), 5);
        assert_eq!(parse_timeout_secs(Some("0"), "TEST_VAR", 30), 30);
        assert_eq!(parse_timeout_secs(Some("soon"), "TEST_VAR", 30), 30);
    }

    #[test]
    fn test_band_tolerance_must_be_positive() {
        let positive = |v: f64| v > 0.0;
        assert_eq!(
            parse_f64_with_warning("TEST_VAR", Some("15".into()), 10.0, positive, "", ""),
            15.0
        );
        assert_eq!(
            parse_f64_with_warning("TEST_VAR", Some("-1".into()), 10.0, positive, "", ""),
            10.0
        );
        assert_eq!(
            parse_f64_with_warning("TEST_VAR", Some("abc".into()), 10.0, positive, "", ""),
            10.0
        );
        assert_eq!(parse_f64_with_warning("TEST_VAR", None, 10.0, positive, "", ""), 10.0);
    }
}
