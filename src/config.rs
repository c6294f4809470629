use std::net::SocketAddr;

use url::Url;

use crate::directory::DEFAULT_DIRECTORY_URL;
use crate::error::Error;

/// Listen address used when `APP_ADDRESS` is not set.
pub const DEFAULT_ADDRESS: &str = ":8080";

/// Runtime configuration of the mock server.
///
/// Use [`from_env()`](ServerConfig::from_env) for convention-based setup,
/// or [`default()`](ServerConfig::default) with `with_*` methods for full control.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct ServerConfig {
    pub listen_addr: SocketAddr,
    pub directory_url: Url,
}

impl ServerConfig {
    /// Create config from environment variables.
    ///
    /// # Optional env vars
    /// - `APP_ADDRESS`: Listen address, `host:port` or `:port` (default `:8080`)
    /// - `BAKALARI_DIRECTORY_URL`: Override the municipality directory base URL
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, Error> {
        let mut config = Self::default();

        if let Some(address) = non_empty_var("APP_ADDRESS") {
            config = config.with_listen_addr(parse_listen_addr(&address)?);
        }
        if let Some(url_str) = non_empty_var("BAKALARI_DIRECTORY_URL") {
            let url: Url = url_str
                .parse()
                .map_err(|e| Error::Config(format!("BAKALARI_DIRECTORY_URL: {e}")))?;
            config = config.with_directory_url(url);
        }

        Ok(config)
    }

    #[must_use]
    pub fn with_listen_addr(mut self, addr: SocketAddr) -> Self {
        self.listen_addr = addr;
        self
    }

    #[must_use]
    pub fn with_directory_url(mut self, url: Url) -> Self {
        self.directory_url = url;
        self
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            directory_url: DEFAULT_DIRECTORY_URL.parse().expect("valid default URL"),
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Parses `host:port`, accepting a bare `:port` as all interfaces.
///
/// # Errors
///
/// Returns [`Error::Config`] if the address is not a socket address.
pub fn parse_listen_addr(address: &str) -> Result<SocketAddr, Error> {
    let address = address.trim();
    let full = if address.starts_with(':') {
        format!("0.0.0.0{address}")
    } else {
        address.to_string()
    };
    full.parse()
        .map_err(|e| Error::Config(format!("APP_ADDRESS {address:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.listen_addr, parse_listen_addr(DEFAULT_ADDRESS).unwrap());
        assert_eq!(config.directory_url.as_str(), "https://sluzby.bakalari.cz/");
    }

    #[test]
    fn bare_port_listens_everywhere() {
        assert_eq!(
            parse_listen_addr(":9000").unwrap(),
            SocketAddr::from(([0, 0, 0, 0], 9000))
        );
    }

    #[test]
    fn full_address() {
        assert_eq!(
            parse_listen_addr("127.0.0.1:3000").unwrap(),
            SocketAddr::from(([127, 0, 0, 1], 3000))
        );
        assert!(parse_listen_addr("[::1]:3000").is_ok());
    }

    #[test]
    fn invalid_address() {
        let err = parse_listen_addr("localhost").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(parse_listen_addr(":port").is_err());
    }

    #[test]
    fn config_builder() {
        let config = ServerConfig::default()
            .with_listen_addr("127.0.0.1:1234".parse().unwrap())
            .with_directory_url("http://localhost:9999".parse().unwrap());

        assert_eq!(config.listen_addr.port(), 1234);
        assert_eq!(config.directory_url.as_str(), "http://localhost:9999/");
    }
}
