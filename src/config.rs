//! Configuration types for sbir-topics

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, str::FromStr, time::Duration};
use utoipa::ToSchema;

/// Placeholder substituted with the upstream topic id in URL templates
pub const TOPIC_ID_PLACEHOLDER: &str = "{topic_id}";

/// Upstream catalog settings (endpoints, identity headers, timeouts)
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct UpstreamConfig {
    /// Topic search endpoint
    #[serde(default = "default_search_url")]
    pub search_url: String,

    /// Per-topic PDF endpoint, containing `{topic_id}`
    #[serde(default = "default_document_url_template")]
    pub document_url_template: String,

    /// Per-topic questions endpoint, containing `{topic_id}`
    #[serde(default = "default_questions_url_template")]
    pub questions_url_template: String,

    /// Browser-like User-Agent sent on every call
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Referer sent on every call
    #[serde(default = "default_referer")]
    pub referer: String,

    /// Connect phase timeout (default: 5 seconds)
    #[serde(default = "default_connect_timeout", with = "duration_serde")]
    #[schema(value_type = u64)]
    pub connect_timeout: Duration,

    /// Whole-request timeout (default: 30 seconds)
    #[serde(default = "default_request_timeout", with = "duration_serde")]
    #[schema(value_type = u64)]
    pub request_timeout: Duration,

    /// Page size used when re-searching to resolve topic codes (default: 1000)
    #[serde(default = "default_lookup_page_size")]
    pub lookup_page_size: u32,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            search_url: default_search_url(),
            document_url_template: default_document_url_template(),
            questions_url_template: default_questions_url_template(),
            user_agent: default_user_agent(),
            referer: default_referer(),
            connect_timeout: default_connect_timeout(),
            request_timeout: default_request_timeout(),
            lookup_page_size: default_lookup_page_size(),
        }
    }
}

impl UpstreamConfig {
    /// PDF URL for a topic id
    pub fn document_url(&self, topic_id: &str) -> String {
        self.document_url_template
            .replace(TOPIC_ID_PLACEHOLDER, &urlencoding::encode(topic_id))
    }

    /// Questions URL for a topic id
    pub fn questions_url(&self, topic_id: &str) -> String {
        self.questions_url_template
            .replace(TOPIC_ID_PLACEHOLDER, &urlencoding::encode(topic_id))
    }
}

/// REST API configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiConfig {
    /// Address to bind to (default: 0.0.0.0:8000)
    #[serde(default = "default_bind_address")]
    #[schema(value_type = String)]
    pub bind_address: SocketAddr,

    /// Enable CORS for browser access (default: true)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins (default: local Vite/dev-server origins)
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Enable Swagger UI at /swagger-ui (default: true)
    #[serde(default = "default_true")]
    pub swagger_ui: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            cors_enabled: true,
            cors_origins: default_cors_origins(),
            swagger_ui: true,
        }
    }
}

/// Main configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct Config {
    /// Upstream catalog settings
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// REST API settings
    #[serde(default)]
    pub api: ApiConfig,
}

impl Config {
    /// Load configuration from process environment variables
    ///
    /// Unset variables keep their defaults. Call `dotenvy::dotenv()` first to
    /// pick up a `.env` file.
    ///
    /// | Variable | Field |
    /// |---|---|
    /// | `SBIR_BIND_ADDRESS` | `api.bind_address` |
    /// | `SBIR_CORS_ENABLED` | `api.cors_enabled` |
    /// | `SBIR_CORS_ORIGINS` | `api.cors_origins` (comma separated) |
    /// | `SBIR_SWAGGER_UI` | `api.swagger_ui` |
    /// | `SBIR_SEARCH_URL` | `upstream.search_url` |
    /// | `SBIR_DOCUMENT_URL_TEMPLATE` | `upstream.document_url_template` |
    /// | `SBIR_QUESTIONS_URL_TEMPLATE` | `upstream.questions_url_template` |
    /// | `SBIR_USER_AGENT` | `upstream.user_agent` |
    /// | `SBIR_REFERER` | `upstream.referer` |
    /// | `SBIR_CONNECT_TIMEOUT_SECS` | `upstream.connect_timeout` |
    /// | `SBIR_REQUEST_TIMEOUT_SECS` | `upstream.request_timeout` |
    /// | `SBIR_LOOKUP_PAGE_SIZE` | `upstream.lookup_page_size` |
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(addr) = parse_var(&lookup, "SBIR_BIND_ADDRESS")? {
            config.api.bind_address = addr;
        }
        if let Some(enabled) = parse_var(&lookup, "SBIR_CORS_ENABLED")? {
            config.api.cors_enabled = enabled;
        }
        if let Some(origins) = lookup("SBIR_CORS_ORIGINS") {
            config.api.cors_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(enabled) = parse_var(&lookup, "SBIR_SWAGGER_UI")? {
            config.api.swagger_ui = enabled;
        }

        let upstream = &mut config.upstream;
        if let Some(url) = lookup("SBIR_SEARCH_URL") {
            upstream.search_url = url;
        }
        if let Some(template) = lookup("SBIR_DOCUMENT_URL_TEMPLATE") {
            upstream.document_url_template = template;
        }
        if let Some(template) = lookup("SBIR_QUESTIONS_URL_TEMPLATE") {
            upstream.questions_url_template = template;
        }
        if let Some(ua) = lookup("SBIR_USER_AGENT") {
            upstream.user_agent = ua;
        }
        if let Some(referer) = lookup("SBIR_REFERER") {
            upstream.referer = referer;
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, "SBIR_CONNECT_TIMEOUT_SECS")? {
            upstream.connect_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, "SBIR_REQUEST_TIMEOUT_SECS")? {
            upstream.request_timeout = Duration::from_secs(secs);
        }
        if let Some(size) = parse_var(&lookup, "SBIR_LOOKUP_PAGE_SIZE")? {
            upstream.lookup_page_size = size;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<()> {
        let upstream = &self.upstream;

        url::Url::parse(&upstream.search_url).map_err(|e| Error::Config {
            message: format!("invalid search URL '{}': {}", upstream.search_url, e),
            key: Some("SBIR_SEARCH_URL".into()),
        })?;

        for (key, template) in [
            ("SBIR_DOCUMENT_URL_TEMPLATE", &upstream.document_url_template),
            ("SBIR_QUESTIONS_URL_TEMPLATE", &upstream.questions_url_template),
        ] {
            if !template.contains(TOPIC_ID_PLACEHOLDER) {
                return Err(Error::Config {
                    message: format!("URL template '{template}' must contain {TOPIC_ID_PLACEHOLDER}"),
                    key: Some(key.into()),
                });
            }
        }

        if upstream.connect_timeout.is_zero() || upstream.connect_timeout >= upstream.request_timeout
        {
            return Err(Error::Config {
                message: format!(
                    "connect timeout ({}s) must be non-zero and shorter than request timeout ({}s)",
                    upstream.connect_timeout.as_secs(),
                    upstream.request_timeout.as_secs()
                ),
                key: Some("SBIR_CONNECT_TIMEOUT_SECS".into()),
            });
        }

        if upstream.lookup_page_size == 0 {
            return Err(Error::Config {
                message: "lookup page size must be at least 1".into(),
                key: Some("SBIR_LOOKUP_PAGE_SIZE".into()),
            });
        }

        Ok(())
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| Error::Config {
                message: format!("invalid value '{raw}': {e}"),
                key: Some(key.to_string()),
            }),
        None => Ok(None),
    }
}

fn default_search_url() -> String {
    "https://www.dodsbirsttr.mil/topics/api/public/topics/search".into()
}

fn default_document_url_template() -> String {
    "https://www.dodsbirsttr.mil/topics/api/public/topics/{topic_id}/download/PDF".into()
}

fn default_questions_url_template() -> String {
    "https://www.dodsbirsttr.mil/topics/api/public/topics/{topic_id}/questions".into()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".into()
}

fn default_referer() -> String {
    "https://www.dodsbirsttr.mil/topics-app/".into()
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_lookup_page_size() -> u32 {
    1000
}

fn default_true() -> bool {
    true
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8000))
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:5173".into(), // Vite dev server
        "http://localhost:3000".into(),
        "http://127.0.0.1:5173".into(),
        "http://127.0.0.1:3000".into(),
    ]
}

// Duration serialization helper
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        config.validate().expect("default config must validate");
        assert_eq!(config.upstream.lookup_page_size, 1000);
        assert_eq!(config.upstream.connect_timeout, Duration::from_secs(5));
        assert_eq!(config.upstream.request_timeout, Duration::from_secs(30));
        assert_eq!(config.api.bind_address.port(), 8000);
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert_eq!(config.upstream.search_url, default_search_url());
        assert_eq!(config.api.cors_origins.len(), 4);
    }

    #[test]
    fn environment_overrides_are_applied() {
        let config = Config::from_lookup(lookup_from(&[
            ("SBIR_BIND_ADDRESS", "127.0.0.1:9100"),
            ("SBIR_SEARCH_URL", "http://localhost:1234/search"),
            (
                "SBIR_DOCUMENT_URL_TEMPLATE",
                "http://localhost:1234/topics/{topic_id}/pdf",
            ),
            ("SBIR_CONNECT_TIMEOUT_SECS", "2"),
            ("SBIR_REQUEST_TIMEOUT_SECS", "10"),
            ("SBIR_LOOKUP_PAGE_SIZE", "250"),
            ("SBIR_CORS_ORIGINS", "https://a.example, https://b.example,"),
            ("SBIR_SWAGGER_UI", "false"),
        ]))
        .unwrap();

        assert_eq!(config.api.bind_address.to_string(), "127.0.0.1:9100");
        assert_eq!(config.upstream.search_url, "http://localhost:1234/search");
        assert_eq!(config.upstream.connect_timeout, Duration::from_secs(2));
        assert_eq!(config.upstream.request_timeout, Duration::from_secs(10));
        assert_eq!(config.upstream.lookup_page_size, 250);
        assert_eq!(
            config.api.cors_origins,
            vec!["https://a.example", "https://b.example"]
        );
        assert!(!config.api.swagger_ui);
        assert_eq!(
            config.upstream.document_url("abc 1"),
            "http://localhost:1234/topics/abc%201/pdf"
        );
    }

    #[test]
    fn unparsable_value_reports_its_key() {
        let err = Config::from_lookup(lookup_from(&[("SBIR_LOOKUP_PAGE_SIZE", "lots")]))
            .unwrap_err();
        match err {
            Error::Config { key, .. } => assert_eq!(key.as_deref(), Some("SBIR_LOOKUP_PAGE_SIZE")),
            other => panic!("expected Config error, got {other:?}"),
        }
    }

    #[test]
    fn template_without_placeholder_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[(
            "SBIR_DOCUMENT_URL_TEMPLATE",
            "http://localhost/pdf",
        )]))
        .unwrap_err();
        assert!(err.to_string().contains("{topic_id}"));
    }

    #[test]
    fn connect_timeout_must_be_shorter_than_request_timeout() {
        let err = Config::from_lookup(lookup_from(&[
            ("SBIR_CONNECT_TIMEOUT_SECS", "30"),
            ("SBIR_REQUEST_TIMEOUT_SECS", "30"),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn zero_lookup_window_is_rejected() {
        let err =
            Config::from_lookup(lookup_from(&[("SBIR_LOOKUP_PAGE_SIZE", "0")])).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn config_default_survives_json_round_trip() {
        let original = Config::default();

        let json = serde_json::to_string(&original).expect("Config must serialize to JSON");
        let restored: Config =
            serde_json::from_str(&json).expect("Config must deserialize from its own JSON");

        assert_eq!(restored.upstream.search_url, original.upstream.search_url);
        assert_eq!(
            restored.upstream.request_timeout,
            original.upstream.request_timeout
        );
        assert_eq!(restored.api.bind_address, original.api.bind_address);
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"upstream": {"request_timeout": 60}}"#).unwrap();
        assert_eq!(config.upstream.request_timeout, Duration::from_secs(60));
        assert_eq!(config.upstream.connect_timeout, Duration::from_secs(5));
        assert!(config.api.cors_enabled);
    }
}
