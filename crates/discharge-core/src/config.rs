//! Process-wide configuration, assembled once at startup from the
//! environment (spec §6 "CLI / environment").

use std::env;

/// Immutable configuration threaded through `Engine::build`. Fields that
/// gate an external-collaborator feature are `Option`-typed: their absence
/// degrades that feature rather than failing startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub http_bind_addr: String,

    pub demo_mode: bool,
    pub demo_phone_number: Option<String>,

    pub voice_api_key: Option<String>,
    pub voice_phone_number_id: Option<String>,
    pub voice_assistant_id: Option<String>,

    pub routing_provider_token: Option<String>,
    pub proxy_url: Option<String>,
    pub document_extractor_api_key: Option<String>,
    pub llm_api_key: Option<String>,

    pub k_retry: u32,
    pub call_poll_interval_seconds: u64,
    pub call_max_wait_seconds: u64,
    pub cache_ttl_seconds: i64,
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

fn env_bool(key: &str, default: bool) -> bool {
    env::var(key)
        .ok()
        .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(default)
}

fn env_num<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

impl Config {
    /// Read configuration from the process environment. Never fails: a
    /// missing optional credential only disables the feature it gates.
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgresql:///discharge_coordinator".to_string()),
            http_bind_addr: env::var("HTTP_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),

            demo_mode: env_bool("DEMO_MODE", true),
            demo_phone_number: env_opt("DEMO_PHONE_NUMBER").or_else(|| env_opt("TEST_PHONE_NUMBER")),

            voice_api_key: env_opt("VOICE_API_KEY").or_else(|| env_opt("VAPI_API_KEY")),
            voice_phone_number_id: env_opt("VOICE_PHONE_NUMBER_ID"),
            voice_assistant_id: env_opt("VOICE_ASSISTANT_ID"),

            routing_provider_token: env_opt("ROUTING_PROVIDER_TOKEN").or_else(|| env_opt("MAPBOX_TOKEN")),
            proxy_url: env_opt("SCRAPE_PROXY_URL"),
            document_extractor_api_key: env_opt("DOCUMENT_EXTRACTOR_API_KEY"),
            llm_api_key: env_opt("LLM_API_KEY"),

            k_retry: env_num("SHELTER_K_RETRY", 3),
            call_poll_interval_seconds: env_num("CALL_POLL_INTERVAL_SECONDS", 3),
            call_max_wait_seconds: env_num("CALL_MAX_WAIT_SECONDS", 600),
            cache_ttl_seconds: env_num("CACHE_TTL_SECONDS", 86_400),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_usable_with_no_env_set() {
        let cfg = Config {
            database_url: "postgresql:///x".into(),
            http_bind_addr: "0.0.0.0:8080".into(),
            demo_mode: true,
            demo_phone_number: None,
            voice_api_key: None,
            voice_phone_number_id: None,
            voice_assistant_id: None,
            routing_provider_token: None,
            proxy_url: None,
            document_extractor_api_key: None,
            llm_api_key: None,
            k_retry: 3,
            call_poll_interval_seconds: 3,
            call_max_wait_seconds: 600,
            cache_ttl_seconds: 86_400,
        };
        assert_eq!(cfg.k_retry, 3);
        assert!(cfg.demo_mode);
    }
}
