//! Environment configuration.

use std::env;
use std::path::PathBuf;

pub const PROVIDER_ENV_VAR: &str = "PROMPT_FORGE_PROVIDER";
pub const CHAT_API_CONFIG_ENV_VAR: &str = "PROMPT_FORGE_CHAT_API_CONFIG";
pub const STORAGE_DIR_ENV_VAR: &str = "PROMPT_FORGE_STORAGE_DIR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvConfig {
    /// Gateway backend id; `None` selects the default backend.
    pub gateway_id: Option<String>,
    /// Path to the JSON configuration of the chat API gateway.
    pub chat_api_config: Option<PathBuf>,
    pub storage_dir: Option<PathBuf>,
    pub log_filter: Option<String>,
}

impl EnvConfig {
    pub fn from_env() -> Self {
        Self {
            gateway_id: env_string_opt(PROVIDER_ENV_VAR).map(|value| value.trim().to_string()),
            chat_api_config: env_string_opt(CHAT_API_CONFIG_ENV_VAR).map(PathBuf::from),
            storage_dir: env_string_opt(STORAGE_DIR_ENV_VAR).map(PathBuf::from),
            log_filter: env_string_opt(crate::logging::LOG_ENV_VAR),
        }
    }

    /// Directory of the durable key-value store.
    pub fn storage_root(&self) -> PathBuf {
        self.storage_dir
            .clone()
            .unwrap_or_else(kv_store::default_storage_root)
    }
}

fn env_string_opt(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        if value.trim().is_empty() {
            None
        } else {
            Some(value)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, OnceLock};

    struct EnvGuard {
        key: &'static str,
        previous: Option<String>,
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            if let Some(value) = &self.previous {
                env::set_var(self.key, value);
            } else {
                env::remove_var(self.key);
            }
        }
    }

    fn env_lock() -> std::sync::MutexGuard<'static, ()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
            .lock()
            .expect("env lock poisoned")
    }

    fn set_env_guard(key: &'static str, value: Option<&str>) -> EnvGuard {
        let previous = env::var(key).ok();
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
        EnvGuard { key, previous }
    }

    #[test]
    fn env_defaults_are_unset() {
        let _lock = env_lock();
        let _g1 = set_env_guard(PROVIDER_ENV_VAR, None);
        let _g2 = set_env_guard(CHAT_API_CONFIG_ENV_VAR, None);
        let _g3 = set_env_guard(STORAGE_DIR_ENV_VAR, None);
        let _g4 = set_env_guard("PROMPT_FORGE_LOG", None);

        let config = EnvConfig::from_env();
        assert!(config.gateway_id.is_none());
        assert!(config.chat_api_config.is_none());
        assert!(config.storage_dir.is_none());
        assert!(config.log_filter.is_none());
        assert_eq!(config.storage_root(), kv_store::default_storage_root());
    }

    #[test]
    fn env_values_are_read() {
        let _lock = env_lock();
        let _g1 = set_env_guard(PROVIDER_ENV_VAR, Some(" chat-api "));
        let _g2 = set_env_guard(CHAT_API_CONFIG_ENV_VAR, Some("/etc/forge/chat.json"));
        let _g3 = set_env_guard(STORAGE_DIR_ENV_VAR, Some("/tmp/forge"));
        let _g4 = set_env_guard("PROMPT_FORGE_LOG", Some("debug"));

        let config = EnvConfig::from_env();
        assert_eq!(config.gateway_id.as_deref(), Some("chat-api"));
        assert_eq!(
            config.chat_api_config,
            Some(PathBuf::from("/etc/forge/chat.json"))
        );
        assert_eq!(config.storage_root(), PathBuf::from("/tmp/forge"));
        assert_eq!(config.log_filter.as_deref(), Some("debug"));
    }

    #[test]
    fn blank_values_are_ignored() {
        let _lock = env_lock();
        let _g1 = set_env_guard(PROVIDER_ENV_VAR, Some("   "));
        let _g2 = set_env_guard(STORAGE_DIR_ENV_VAR, Some(""));

        let config = EnvConfig::from_env();
        assert!(config.gateway_id.is_none());
        assert!(config.storage_dir.is_none());
    }
}
