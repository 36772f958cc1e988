/// Runtime configuration
///
/// Values come from the environment (optionally seeded from a `.env` file):
/// - `GEMINI_API_KEY` (or `API_KEY`) - credential for the image model
/// - `NANOEDIT_MODEL` - model id (default `gemini-2.5-flash-image`)
/// - `NANOEDIT_ENDPOINT` - API base URL
/// - `NANOEDIT_TIMEOUT_SECS` - per-request timeout in seconds
/// - `NANOEDIT_DOWNLOAD_DIR` - where downloads are written

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-image";
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone)]
pub struct Config {
    /// Missing keys are reported when an edit is attempted, not at start-up
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
    pub request_timeout: Duration,
    pub download_dir: PathBuf,
}

impl Config {
    /// Load from `.env` (if present) and the process environment
    pub fn load() -> Self {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!(path = %path.display(), "loaded .env"),
            Err(e) if e.not_found() => {}
            Err(e) => tracing::warn!(error = %e, "ignoring unreadable .env file"),
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = non_empty("GEMINI_API_KEY").or_else(|| non_empty("API_KEY"));

        let request_timeout = match non_empty("NANOEDIT_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    tracing::warn!(value = %raw, "invalid NANOEDIT_TIMEOUT_SECS, using default");
                    Duration::from_secs(DEFAULT_TIMEOUT_SECS)
                }
            },
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let download_dir = non_empty("NANOEDIT_DOWNLOAD_DIR")
            .map(PathBuf::from)
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        Self {
            api_key,
            model: non_empty("NANOEDIT_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            endpoint: non_empty("NANOEDIT_ENDPOINT")
                .map(|e| e.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            request_timeout,
            download_dir,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.api_key.is_none());
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.request_timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn test_api_key_fallback() {
        assert_eq!(config_from(&[("API_KEY", "k2")]).api_key.as_deref(), Some("k2"));
        assert_eq!(
            config_from(&[("GEMINI_API_KEY", "k1"), ("API_KEY", "k2")]).api_key.as_deref(),
            Some("k1")
        );
        assert!(config_from(&[("GEMINI_API_KEY", "  ")]).api_key.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("NANOEDIT_MODEL", "custom-model"),
            ("NANOEDIT_ENDPOINT", "http://localhost:8080/"),
            ("NANOEDIT_TIMEOUT_SECS", "5"),
            ("NANOEDIT_DOWNLOAD_DIR", "/tmp/out"),
        ]);
        assert_eq!(config.model, "custom-model");
        assert_eq!(config.endpoint, "http://localhost:8080");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.download_dir, PathBuf::from("/tmp/out"));
    }

    #[test]
    fn test_bad_timeout_falls_back() {
        let config = config_from(&[("NANOEDIT_TIMEOUT_SECS", "soon")]);
        assert_eq!(config.request_timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        let config = config_from(&[("NANOEDIT_TIMEOUT_SECS", "0")]);
        assert_eq!(config.request_timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }
}
