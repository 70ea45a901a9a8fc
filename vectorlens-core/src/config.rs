//! Configuration for reaching the vector store and tuning analytics defaults.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{LensError, Result};

/// The default vector-store REST root.
pub const DEFAULT_API_BASE: &str = "http://localhost:8000/api/v2";

/// The default analytics proxy root.
pub const DEFAULT_PROXY_BASE: &str = "http://localhost:3201";

/// Tenant path segment used when none is configured.
pub const DEFAULT_TENANT: &str = "default_tenant";

/// Database path segment used when none is configured.
pub const DEFAULT_DATABASE: &str = "default_database";

/// Connection and analytics settings shared by every backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LensConfig {
    /// Root of the vector-store REST API, e.g. `http://localhost:8000/api/v2`.
    pub api_base: String,
    /// Root of the analytics proxy service.
    pub proxy_base: String,
    /// Opaque tenant path segment.
    pub tenant: String,
    /// Opaque database path segment.
    pub database: String,
    /// Request timeout handed to the HTTP transport. `None` leaves the transport default.
    pub request_timeout_secs: Option<u64>,
    /// Default page size for raw chunk browsing.
    pub page_size: usize,
    /// Default distance threshold for duplicate detection.
    pub duplicate_threshold: f32,
    /// Default sample bound for duplicate detection.
    pub duplicate_sample_size: usize,
    /// Default sample bound for graph building.
    pub graph_sample_size: usize,
    /// Default distance threshold for graph links.
    pub graph_threshold: f32,
}

impl Default for LensConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            proxy_base: DEFAULT_PROXY_BASE.to_string(),
            tenant: DEFAULT_TENANT.to_string(),
            database: DEFAULT_DATABASE.to_string(),
            request_timeout_secs: None,
            page_size: 50,
            duplicate_threshold: 0.08,
            duplicate_sample_size: 300,
            graph_sample_size: 100,
            graph_threshold: 0.15,
        }
    }
}

impl LensConfig {
    /// Create a new builder for constructing a [`LensConfig`].
    pub fn builder() -> LensConfigBuilder {
        LensConfigBuilder::default()
    }

    /// Build a validated config from the `VECTORLENS_*` environment variables.
    ///
    /// Unset variables keep their defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a validated config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = Self::builder();
        if let Some(base) = lookup("VECTORLENS_API_BASE") {
            builder = builder.api_base(base);
        }
        if let Some(base) = lookup("VECTORLENS_PROXY_BASE") {
            builder = builder.proxy_base(base);
        }
        if let Some(tenant) = lookup("VECTORLENS_TENANT") {
            builder = builder.tenant(tenant);
        }
        if let Some(database) = lookup("VECTORLENS_DATABASE") {
            builder = builder.database(database);
        }
        if let Some(raw) = lookup("VECTORLENS_TIMEOUT_SECS") {
            let secs = raw.trim().parse::<u64>().map_err(|_| {
                LensError::Config(format!("VECTORLENS_TIMEOUT_SECS must be an integer, got '{raw}'"))
            })?;
            builder = builder.request_timeout_secs(secs);
        }
        builder.build()
    }

    /// The transport timeout, if one is configured.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Build a `reqwest` client honoring the configured timeout.
    pub fn http_client(&self) -> Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.request_timeout() {
            builder = builder.timeout(timeout);
        }
        builder.build().map_err(|e| LensError::Config(format!("failed to build HTTP client: {e}")))
    }
}

/// Builder for constructing a validated [`LensConfig`].
#[derive(Debug, Clone, Default)]
pub struct LensConfigBuilder {
    config: LensConfig,
}

impl LensConfigBuilder {
    /// Set the vector-store REST root.
    pub fn api_base(mut self, base: impl Into<String>) -> Self {
        self.config.api_base = base.into();
        self
    }

    /// Set the analytics proxy root.
    pub fn proxy_base(mut self, base: impl Into<String>) -> Self {
        self.config.proxy_base = base.into();
        self
    }

    /// Set the tenant path segment.
    pub fn tenant(mut self, tenant: impl Into<String>) -> Self {
        self.config.tenant = tenant.into();
        self
    }

    /// Set the database path segment.
    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.config.database = database.into();
        self
    }

    /// Set the transport timeout in seconds.
    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = Some(secs);
        self
    }

    /// Set the default page size.
    pub fn page_size(mut self, size: usize) -> Self {
        self.config.page_size = size;
        self
    }

    /// Set the default duplicate threshold.
    pub fn duplicate_threshold(mut self, threshold: f32) -> Self {
        self.config.duplicate_threshold = threshold;
        self
    }

    /// Set the default duplicate sample bound.
    pub fn duplicate_sample_size(mut self, size: usize) -> Self {
        self.config.duplicate_sample_size = size;
        self
    }

    /// Set the default graph sample bound.
    pub fn graph_sample_size(mut self, size: usize) -> Self {
        self.config.graph_sample_size = size;
        self
    }

    /// Set the default graph link threshold.
    pub fn graph_threshold(mut self, threshold: f32) -> Self {
        self.config.graph_threshold = threshold;
        self
    }

    /// Build the [`LensConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`LensError::Config`] if:
    /// - a base URL is empty or not `http://`/`https://`
    /// - a tenant or database segment is empty
    /// - a page or sample size is zero
    /// - a threshold is not finite and positive
    pub fn build(self) -> Result<LensConfig> {
        let c = self.config;
        for (field, value) in [("api_base", &c.api_base), ("proxy_base", &c.proxy_base)] {
            if !(value.starts_with("http://") || value.starts_with("https://")) {
                return Err(LensError::Config(format!(
                    "{field} must be an http(s) URL, got '{value}'"
                )));
            }
        }
        if c.tenant.trim().is_empty() || c.database.trim().is_empty() {
            return Err(LensError::Config("tenant and database must not be empty".to_string()));
        }
        for (field, value) in [
            ("page_size", c.page_size),
            ("duplicate_sample_size", c.duplicate_sample_size),
            ("graph_sample_size", c.graph_sample_size),
        ] {
            if value == 0 {
                return Err(LensError::Config(format!("{field} must be greater than zero")));
            }
        }
        for (field, value) in
            [("duplicate_threshold", c.duplicate_threshold), ("graph_threshold", c.graph_threshold)]
        {
            if !value.is_finite() || value <= 0.0 {
                return Err(LensError::Config(format!(
                    "{field} must be a positive number, got {value}"
                )));
            }
        }
        Ok(LensConfig {
            api_base: c.api_base.trim_end_matches('/').to_string(),
            proxy_base: c.proxy_base.trim_end_matches('/').to_string(),
            ..c
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn default_config_is_valid() {
        let built = LensConfig::builder().build().unwrap();
        assert_eq!(built, LensConfig::default());
        assert_eq!(built.tenant, "default_tenant");
        assert_eq!(built.database, "default_database");
    }

    #[test]
    fn trailing_slashes_are_trimmed() {
        let config = LensConfig::builder()
            .api_base("http://chroma:8000/api/v2/")
            .proxy_base("http://proxy:3201/")
            .build()
            .unwrap();
        assert_eq!(config.api_base, "http://chroma:8000/api/v2");
        assert_eq!(config.proxy_base, "http://proxy:3201");
    }

    #[test]
    fn rejects_bad_values() {
        assert!(LensConfig::builder().api_base("chroma:8000").build().is_err());
        assert!(LensConfig::builder().page_size(0).build().is_err());
        assert!(LensConfig::builder().graph_threshold(f32::NAN).build().is_err());
        assert!(LensConfig::builder().duplicate_threshold(-0.1).build().is_err());
        assert!(LensConfig::builder().tenant(" ").build().is_err());
    }

    #[test]
    fn env_lookup_overrides_defaults() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("VECTORLENS_API_BASE", "https://store.internal/api/v2"),
            ("VECTORLENS_TENANT", "acme"),
            ("VECTORLENS_TIMEOUT_SECS", "7"),
        ]);
        let config =
            LensConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap();
        assert_eq!(config.api_base, "https://store.internal/api/v2");
        assert_eq!(config.tenant, "acme");
        assert_eq!(config.database, DEFAULT_DATABASE);
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(7)));
    }

    #[test]
    fn env_lookup_rejects_non_numeric_timeout() {
        let err = LensConfig::from_lookup(|key| {
            (key == "VECTORLENS_TIMEOUT_SECS").then(|| "soon".to_string())
        })
        .unwrap_err();
        assert!(matches!(err, LensError::Config(_)));
    }
}
