//! `[serve]` section configuration.
//!
//! ```toml
//! [serve]
//! host = "127.0.0.1"      # 0.0.0.0 makes the server reachable from LAN
//! port = 3000             # HTTP port
//! reload_port = 35729     # live-reload WebSocket port
//! ```

use std::net::{IpAddr, Ipv4Addr};

use serde::{Deserialize, Serialize};

/// Development server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServeConfig {
    /// Network interface to bind.
    pub host: IpAddr,
    /// HTTP port; the next free port is used when taken.
    pub port: u16,
    /// WebSocket port for live reload; retried upward like `port`.
    pub reload_port: u16,
    /// Push reload notifications to connected browsers.
    pub live_reload: bool,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 3000,
            reload_port: 35729,
            live_reload: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

    use crate::config::test_parse_config;

    #[test]
    fn test_serve_config() {
        let config = test_parse_config("[serve]\nhost = \"0.0.0.0\"\nport = 8080\nlive_reload = false");

        assert_eq!(config.serve.host, IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));
        assert_eq!(config.serve.port, 8080);
        assert!(!config.serve.live_reload);
    }

    #[test]
    fn test_serve_config_defaults() {
        let config = test_parse_config("");

        assert_eq!(config.serve.host, IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)));
        assert_eq!(config.serve.port, 3000);
        assert_eq!(config.serve.reload_port, 35729);
        assert!(config.serve.live_reload);
    }

    #[test]
    fn test_serve_config_ipv6() {
        let config = test_parse_config("[serve]\nhost = \"::1\"");
        assert_eq!(
            config.serve.host,
            IpAddr::V6(Ipv6Addr::new(0, 0, 0, 0, 0, 0, 0, 1))
        );
    }

    #[test]
    fn test_serve_config_partial_override() {
        let config = test_parse_config("[serve]\nport = 4000");
        assert_eq!(config.serve.port, 4000);
        assert_eq!(config.serve.reload_port, 35729);
    }
}
