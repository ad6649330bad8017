use std::time::Duration;

/// API base used when the page is served from a development host.
pub const LOCAL_API_BASE: &str = "http://localhost:5000/api";

/// Deadline applied to login and registration requests.
pub const AUTH_TIMEOUT: Duration = Duration::from_secs(10);

/// Pause between a success notice and navigation after login or logout.
pub const SHORT_REDIRECT_DELAY: Duration = Duration::from_millis(1000);
/// Pause after register, password change, profile update and publish.
pub const LONG_REDIRECT_DELAY: Duration = Duration::from_millis(1500);
/// Pause before leaving a detail page whose instrument is gone.
pub const NOT_FOUND_REDIRECT_DELAY: Duration = Duration::from_millis(2000);

/// Client-side configuration for the marketplace API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_base: String,
    pub auth_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(LOCAL_API_BASE)
    }
}

impl ClientConfig {
    pub fn new(api_base: impl Into<String>) -> Self {
        let api_base: String = api_base.into();
        Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            auth_timeout: AUTH_TIMEOUT,
        }
    }

    /// Derive the API base from the current page location.
    ///
    /// `localhost` and `127.0.0.1` talk to the development server on port
    /// 5000; every other host is served same-origin under `/api`.
    pub fn for_location(protocol: &str, hostname: &str, host: &str) -> Self {
        if hostname == "localhost" || hostname == "127.0.0.1" {
            return Self::new(LOCAL_API_BASE);
        }
        let protocol = if protocol.is_empty() { "http:" } else { protocol };
        Self::new(format!("{protocol}//{host}/api"))
    }

    /// Read `IM_API_BASE` from the environment (default: the local server).
    pub fn from_env() -> Self {
        std::env::var("IM_API_BASE")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(Self::new)
            .unwrap_or_default()
    }

    pub fn with_auth_timeout(mut self, timeout: Duration) -> Self {
        self.auth_timeout = timeout;
        self
    }

    pub fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.api_base, endpoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn development_hosts_use_local_server() {
        let cfg = ClientConfig::for_location("http:", "localhost", "localhost:8080");
        assert_eq!(cfg.api_base, LOCAL_API_BASE);
        let cfg = ClientConfig::for_location("http:", "127.0.0.1", "127.0.0.1:3000");
        assert_eq!(cfg.api_base, LOCAL_API_BASE);
    }

    #[test]
    fn deployed_hosts_are_same_origin() {
        let cfg = ClientConfig::for_location("https:", "yueqi.example.edu", "yueqi.example.edu:8443");
        assert_eq!(cfg.api_base, "https://yueqi.example.edu:8443/api");
        assert_eq!(cfg.url("/cart"), "https://yueqi.example.edu:8443/api/cart");
        assert_eq!(cfg.auth_timeout, AUTH_TIMEOUT);
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        assert_eq!(ClientConfig::new("http://h/api/").url("/x"), "http://h/api/x");
    }
}
