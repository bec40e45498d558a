//! Configuration Module
//!
//! Handles loading and managing node configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::cluster::ClusterMode;

/// Default capacity budget: 4 GiB of serialized values.
pub const DEFAULT_CAPACITY_BYTES: u64 = 4 * 1024 * 1024 * 1024;

/// Node configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Feature toggle; when off, reads miss and writes are discarded
    pub cache_enabled: bool,
    /// Byte budget for the sum of all serialized values
    pub capacity_bytes: u64,
    /// Directory group this node belongs to; None = standalone
    pub cluster_group: Option<String>,
    /// Static `(member id, address)` pairs served by the built-in directory
    pub cluster_members: Vec<(String, String)>,
    /// Shared secret carried by invalidation requests
    pub cache_secret: String,
    /// HTTP server port
    pub server_port: u16,
    /// Port assumed for peer addresses that do not carry one
    pub peer_port: u16,
    /// Membership refresh interval in seconds
    pub refresh_interval: u64,
    /// Health probe bound in milliseconds
    pub probe_timeout_ms: u64,
    /// Invalidation request bound in milliseconds
    pub invalidate_timeout_ms: u64,
    /// Directory lookup bound in milliseconds
    pub directory_timeout_ms: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_ENABLED` - `"true"` enables caching (default: disabled)
    /// - `CACHE_CAPACITY_BYTES` - Byte budget (default: 4 GiB)
    /// - `CACHE_CLUSTER_GROUP` - Directory group name (default: unset, standalone)
    /// - `CACHE_CLUSTER_MEMBERS` - Comma-separated `id=address` pairs (default: empty)
    /// - `CACHE_SECRET` - Shared invalidation secret (default: empty)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CACHE_PEER_PORT` - Port for peer addresses without one (default: 3000)
    /// - `CACHE_REFRESH_INTERVAL` - Membership refresh period in seconds (default: 60)
    /// - `CACHE_PROBE_TIMEOUT_MS` - Health probe timeout (default: 5000)
    /// - `CACHE_INVALIDATE_TIMEOUT_MS` - Invalidation timeout (default: 1000)
    /// - `CACHE_DIRECTORY_TIMEOUT_MS` - Directory lookup timeout (default: 5000)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            cache_enabled: env::var("CACHE_ENABLED")
                .map(|v| v == "true")
                .unwrap_or(defaults.cache_enabled),
            capacity_bytes: parse_var("CACHE_CAPACITY_BYTES", defaults.capacity_bytes),
            cluster_group: env::var("CACHE_CLUSTER_GROUP")
                .ok()
                .filter(|group| !group.trim().is_empty()),
            cluster_members: env::var("CACHE_CLUSTER_MEMBERS")
                .map(|v| parse_members(&v))
                .unwrap_or_default(),
            cache_secret: env::var("CACHE_SECRET").unwrap_or_default(),
            server_port: parse_var("SERVER_PORT", defaults.server_port),
            peer_port: parse_var("CACHE_PEER_PORT", defaults.peer_port),
            refresh_interval: parse_var("CACHE_REFRESH_INTERVAL", defaults.refresh_interval),
            probe_timeout_ms: parse_var("CACHE_PROBE_TIMEOUT_MS", defaults.probe_timeout_ms),
            invalidate_timeout_ms: parse_var(
                "CACHE_INVALIDATE_TIMEOUT_MS",
                defaults.invalidate_timeout_ms,
            ),
            directory_timeout_ms: parse_var(
                "CACHE_DIRECTORY_TIMEOUT_MS",
                defaults.directory_timeout_ms,
            ),
        }
    }

    /// Derives the process-lifetime cluster mode.
    ///
    /// A missing or blank group name is not an error, it means standalone.
    pub fn cluster_mode(&self) -> ClusterMode {
        match &self.cluster_group {
            Some(group) if !group.trim().is_empty() => ClusterMode::Clustered {
                group: group.clone(),
            },
            _ => ClusterMode::Standalone,
        }
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn invalidate_timeout(&self) -> Duration {
        Duration::from_millis(self.invalidate_timeout_ms)
    }

    pub fn directory_timeout(&self) -> Duration {
        Duration::from_millis(self.directory_timeout_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_enabled: false,
            capacity_bytes: DEFAULT_CAPACITY_BYTES,
            cluster_group: None,
            cluster_members: Vec::new(),
            cache_secret: String::new(),
            server_port: 3000,
            peer_port: 3000,
            refresh_interval: 60,
            probe_timeout_ms: 5000,
            invalidate_timeout_ms: 1000,
            directory_timeout_ms: 5000,
        }
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Parses `id=address` pairs; entries without `=` use the address as id.
fn parse_members(raw: &str) -> Vec<(String, String)> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| match item.split_once('=') {
            Some((id, addr)) => (id.trim().to_string(), addr.trim().to_string()),
            None => (item.to_string(), item.to_string()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(!config.cache_enabled);
        assert_eq!(config.capacity_bytes, DEFAULT_CAPACITY_BYTES);
        assert!(config.cluster_group.is_none());
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.refresh_interval, 60);
        assert_eq!(config.probe_timeout(), Duration::from_secs(5));
        assert_eq!(config.invalidate_timeout(), Duration::from_secs(1));
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        for name in [
            "CACHE_ENABLED",
            "CACHE_CAPACITY_BYTES",
            "CACHE_CLUSTER_GROUP",
            "CACHE_CLUSTER_MEMBERS",
            "CACHE_SECRET",
            "SERVER_PORT",
            "CACHE_REFRESH_INTERVAL",
        ] {
            env::remove_var(name);
        }

        let config = Config::from_env();
        assert!(!config.cache_enabled);
        assert_eq!(config.capacity_bytes, DEFAULT_CAPACITY_BYTES);
        assert_eq!(config.cluster_mode(), ClusterMode::Standalone);
        assert!(config.cluster_members.is_empty());
        assert_eq!(config.server_port, 3000);
    }

    #[test]
    fn test_cluster_mode_from_group() {
        let config = Config {
            cluster_group: Some("web-asg".to_string()),
            ..Config::default()
        };
        assert_eq!(
            config.cluster_mode(),
            ClusterMode::Clustered {
                group: "web-asg".to_string()
            }
        );
    }

    #[test]
    fn test_blank_group_is_standalone() {
        let config = Config {
            cluster_group: Some("  ".to_string()),
            ..Config::default()
        };
        assert_eq!(config.cluster_mode(), ClusterMode::Standalone);
    }

    #[test]
    fn test_parse_members() {
        let members = parse_members("i-1=10.0.0.1, i-2=10.0.0.2:8080,,10.0.0.3");
        assert_eq!(
            members,
            vec![
                ("i-1".to_string(), "10.0.0.1".to_string()),
                ("i-2".to_string(), "10.0.0.2:8080".to_string()),
                ("10.0.0.3".to_string(), "10.0.0.3".to_string()),
            ]
        );
    }
}
