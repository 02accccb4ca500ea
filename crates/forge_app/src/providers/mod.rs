use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use ai_gateway::ChatGateway;
use ai_gateway_chat_api::{ChatApiGateway, ChatApiGatewayConfig, CHAT_API_GATEWAY_ID};
use ai_gateway_mock::{MockGateway, MOCK_GATEWAY_ID};
use prompt_forge::config::{CHAT_API_CONFIG_ENV_VAR, PROVIDER_ENV_VAR};
use prompt_forge::EnvConfig;
use serde::Deserialize;

pub const DEFAULT_GATEWAY_ID: &str = MOCK_GATEWAY_ID;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ChatApiFileConfig {
    api_key: String,
    base_url: Option<String>,
    timeout_sec: Option<u64>,
}

pub fn gateway_from_env(config: &EnvConfig) -> Result<Arc<dyn ChatGateway>, String> {
    let gateway_id = config.gateway_id.as_deref().unwrap_or(DEFAULT_GATEWAY_ID);
    gateway_for_id(gateway_id, config.chat_api_config.as_deref())
}

pub fn gateway_for_id(
    gateway_id: &str,
    chat_api_config: Option<&Path>,
) -> Result<Arc<dyn ChatGateway>, String> {
    match gateway_id {
        MOCK_GATEWAY_ID => Ok(Arc::new(MockGateway::default())),
        CHAT_API_GATEWAY_ID => {
            let path = chat_api_config.ok_or_else(|| {
                format!(
                    "{PROVIDER_ENV_VAR}={CHAT_API_GATEWAY_ID} requires {CHAT_API_CONFIG_ENV_VAR} to point at a JSON config file"
                )
            })?;
            let gateway = ChatApiGateway::new(load_chat_api_config(path)?)
                .map_err(|error| error.to_string())?;
            Ok(Arc::new(gateway))
        }
        unknown => Err(format!(
            "Unsupported gateway '{unknown}'. Available gateways: {MOCK_GATEWAY_ID}, {CHAT_API_GATEWAY_ID}"
        )),
    }
}

/// Reads and validates the chat API gateway JSON config at `path`.
pub fn load_chat_api_config(path: &Path) -> Result<ChatApiGatewayConfig, String> {
    let raw = fs::read_to_string(path)
        .map_err(|error| format!("Failed to read {}: {error}", path.display()))?;
    let parsed: ChatApiFileConfig = serde_json::from_str(&raw)
        .map_err(|error| format!("Invalid chat API config {}: {error}", path.display()))?;

    let api_key = parsed.api_key.trim();
    if api_key.is_empty() {
        return Err(format!(
            "Invalid chat API config {}: api_key must not be empty",
            path.display()
        ));
    }

    let mut config = ChatApiGatewayConfig::new(api_key);
    if let Some(base_url) = parsed.base_url.filter(|value| !value.trim().is_empty()) {
        config = config.with_base_url(base_url.trim());
    }
    match parsed.timeout_sec {
        Some(0) => {
            return Err(format!(
                "Invalid chat API config {}: timeout_sec must be > 0",
                path.display()
            ))
        }
        Some(seconds) => config = config.with_timeout(Duration::from_secs(seconds)),
        None => {}
    }

    Ok(config)
}
