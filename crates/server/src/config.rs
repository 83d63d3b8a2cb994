//! Gateway configuration

use std::time::Duration;

const DEFAULT_FHIR_BASE_URL: &str = "http://localhost:8080/fhir";
const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:5000";
const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 5;

/// Gateway configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub fhir_base_url: String,
    pub bind_address: String,
    pub upstream_timeout: Duration,
    pub cors_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let upstream_timeout_secs = lookup("UPSTREAM_TIMEOUT_SECS")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_UPSTREAM_TIMEOUT_SECS);

        Self {
            fhir_base_url: lookup("FHIR_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_FHIR_BASE_URL.into()),
            bind_address: lookup("BIND_ADDRESS").unwrap_or_else(|| DEFAULT_BIND_ADDRESS.into()),
            upstream_timeout: Duration::from_secs(upstream_timeout_secs),
            cors_origins: lookup("CORS_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(|o| o.trim().to_string())
                        .filter(|o| !o.is_empty())
                        .collect()
                })
                .unwrap_or_else(|| vec!["*".to_string()]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);
        assert_eq!(config.fhir_base_url, DEFAULT_FHIR_BASE_URL);
        assert_eq!(config.bind_address, DEFAULT_BIND_ADDRESS);
        assert_eq!(config.upstream_timeout, Duration::from_secs(5));
        assert_eq!(config.cors_origins, vec!["*"]);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("FHIR_BASE_URL", "https://server.fire.ly/"),
            ("UPSTREAM_TIMEOUT_SECS", "12"),
            ("CORS_ORIGINS", "http://a.example, http://b.example,"),
        ]);
        assert_eq!(config.fhir_base_url, "https://server.fire.ly");
        assert_eq!(config.upstream_timeout, Duration::from_secs(12));
        assert_eq!(config.cors_origins, vec!["http://a.example", "http://b.example"]);
    }

    #[test]
    fn test_bad_timeout_falls_back() {
        for bad in ["0", "soon", "-3"] {
            let config = config_from(&[("UPSTREAM_TIMEOUT_SECS", bad)]);
            assert_eq!(config.upstream_timeout, Duration::from_secs(5));
        }
    }
}
