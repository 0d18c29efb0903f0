use crate::types::Lang;

/// All sibyl runtime parameters. Loaded from the environment at startup;
/// every field has a default so a bare process still boots.
#[derive(Debug, Clone)]
pub struct SibylCfg {
    // session memory
    pub session_max_turns: usize,
    pub session_ttl_secs: u64,
    pub session_capacity: usize,

    // completion gateway
    pub request_timeout_secs: u64,

    // per-module generation parameters
    pub mirror_temperature: f32,
    pub mirror_max_tokens: u32,
    pub cities_temperature: f32,
    pub cities_max_tokens: u32,

    // language fallback
    pub default_lang: Lang,

    // server
    pub bind_addr: String,

    /// When set, sessions persist as JSON files under this directory.
    pub data_dir: Option<String>,
}

impl Default for SibylCfg {
    fn default() -> Self {
        Self {
            session_max_turns: 20,
            session_ttl_secs: 3600,
            session_capacity: 4096,
            request_timeout_secs: 45,
            mirror_temperature: 0.15,
            mirror_max_tokens: 180,
            cities_temperature: 0.4,
            cities_max_tokens: 700,
            default_lang: Lang::Tr,
            bind_addr: "0.0.0.0:8080".to_owned(),
            data_dir: None,
        }
    }
}

impl SibylCfg {
    /// Read config from `SIBYL_*` environment variables, falling back to
    /// defaults for anything unset or unparseable.
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            session_max_turns: env_or("SIBYL_SESSION_MAX_TURNS", d.session_max_turns),
            session_ttl_secs: env_or("SIBYL_SESSION_TTL_SECS", d.session_ttl_secs),
            session_capacity: env_or("SIBYL_SESSION_CAPACITY", d.session_capacity),
            request_timeout_secs: env_or("SIBYL_REQUEST_TIMEOUT_SECS", d.request_timeout_secs),
            mirror_temperature: env_or("SIBYL_TEMPERATURE", d.mirror_temperature),
            mirror_max_tokens: env_or("SIBYL_MAX_TOKENS", d.mirror_max_tokens),
            cities_temperature: env_or("SIBYL_CITIES_TEMPERATURE", d.cities_temperature),
            cities_max_tokens: env_or("SIBYL_CITIES_MAX_TOKENS", d.cities_max_tokens),
            default_lang: std::env::var("SIBYL_DEFAULT_LANG")
                .ok()
                .and_then(|v| Lang::parse(&v))
                .unwrap_or(d.default_lang),
            bind_addr: std::env::var("SIBYL_BIND_ADDR").unwrap_or(d.bind_addr),
            data_dir: std::env::var("SIBYL_DATA_DIR").ok().filter(|v| !v.trim().is_empty()),
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let cfg = SibylCfg::default();
        assert_eq!(cfg.session_max_turns, 20);
        assert_eq!(cfg.default_lang, Lang::Tr);
        assert!(cfg.request_timeout_secs >= 30 && cfg.request_timeout_secs <= 60);
        assert!(cfg.data_dir.is_none());
    }

    #[test]
    fn env_or_falls_back_on_garbage() {
        // Key that will not exist in the test environment.
        let v: usize = env_or("SIBYL_TEST_NO_SUCH_KEY", 7);
        assert_eq!(v, 7);
    }
}
