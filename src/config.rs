//! Backend endpoint configuration.

use std::time::Duration;

/// Base URL used when nothing else is configured.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";
/// Environment variable holding the backend base URL.
pub const BACKEND_URL_ENV: &str = "SITEMAP_BACKEND_URL";

const REQUEST_TIMEOUT_SECS: u64 = 180;
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Where the generation backend lives and how long to wait for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    /// Base URL without a trailing slash
    pub base_url: String,
    /// Upper bound for a whole request (generation can be slow)
    pub request_timeout: Duration,
    /// Upper bound for establishing the connection
    pub connect_timeout: Duration,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self::with_base_url(DEFAULT_BACKEND_URL)
    }
}

impl BackendConfig {
    /// Creates a configuration for the given base URL.
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(CONNECT_TIMEOUT_SECS),
        }
    }

    /// Reads the base URL from `SITEMAP_BACKEND_URL`.
    ///
    /// Native builds read the variable at runtime; web builds can only see it
    /// at compile time.
    pub fn from_env() -> Self {
        #[cfg(not(target_arch = "wasm32"))]
        let configured = std::env::var(BACKEND_URL_ENV).ok();
        #[cfg(target_arch = "wasm32")]
        let configured = option_env!("SITEMAP_BACKEND_URL").map(str::to_string);

        match configured.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => Self::with_base_url(url),
            _ => Self::default(),
        }
    }

    /// Endpoint that turns a business prompt into a sitemap.
    pub fn sitemap_generator_url(&self) -> String {
        format!("{}/sitemap_generator/sitemap-generator", self.base_url)
    }

    /// Endpoint that turns the homepage into HTML.
    pub fn website_generator_url(&self) -> String {
        format!("{}/website_generator/website-generator", self.base_url)
    }

    /// Endpoint that publishes a zipped website.
    pub fn deploy_url(&self) -> String {
        format!("{}/website_generator/deploy-website", self.base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_points_at_localhost() {
        let config = BackendConfig::default();

        assert_eq!(
            config.sitemap_generator_url(),
            "http://localhost:8000/sitemap_generator/sitemap-generator"
        );
        assert_eq!(
            config.website_generator_url(),
            "http://localhost:8000/website_generator/website-generator"
        );
        assert_eq!(
            config.deploy_url(),
            "http://localhost:8000/website_generator/deploy-website"
        );
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let config = BackendConfig::with_base_url(" https://api.example.com/ ");

        assert_eq!(config.base_url, "https://api.example.com");
        assert_eq!(
            config.deploy_url(),
            "https://api.example.com/website_generator/deploy-website"
        );
    }
}
