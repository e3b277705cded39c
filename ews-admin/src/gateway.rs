//! Hubtel SMS gateway client
//!
//! The gateway takes one GET request per send with the credentials, sender
//! id, comma-joined recipients and message text as query parameters. It
//! answers with a JSON body carrying `MessageId` on success or an error
//! payload otherwise. Nothing is retried here.

use ews_common::config::GatewayConfig;
use ews_common::db::GatewaySettings;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

const SEND_PATH: &str = "/v1/messages/send";
const USER_AGENT: &str = concat!("ews-admin/", env!("CARGO_PKG_VERSION"));

/// Environment variables consulted when the settings table lacks a value
pub const ENV_SENDER_ID: &str = "EWS_HUBTEL_SENDER_ID";
pub const ENV_CLIENT_ID: &str = "EWS_HUBTEL_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "EWS_HUBTEL_CLIENT_SECRET";

/// Gateway client errors
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Request never got an HTTP answer (DNS, connect, timeout)
    #[error("Network error: {0}")]
    Network(String),

    /// Gateway answered with a non-success status
    #[error("Gateway returned HTTP {status}")]
    Rejected { status: u16, body: Value },
}

/// Complete credential set for one send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayCredentials {
    pub sender_id: String,
    pub client_id: String,
    pub client_secret: String,
}

/// Resolve credentials field by field
///
/// **Priority:** settings table → environment → TOML `[gateway]`
///
/// Blank values are treated as absent. On failure returns the names of the
/// fields no tier could supply.
pub fn resolve_credentials(
    stored: &GatewaySettings,
    toml: &GatewayConfig,
) -> Result<GatewayCredentials, Vec<&'static str>> {
    fn non_blank(value: &str) -> bool {
        !value.trim().is_empty()
    }

    fn pick(stored: &Option<String>, env_var: &str, toml: &Option<String>) -> Option<String> {
        stored
            .as_deref()
            .filter(|v| non_blank(v))
            .map(str::to_string)
            .or_else(|| std::env::var(env_var).ok().filter(|v| non_blank(v)))
            .or_else(|| toml.as_deref().filter(|v| non_blank(v)).map(str::to_string))
            .map(|v| v.trim().to_string())
    }

    let sender_id = pick(&stored.sender_id, ENV_SENDER_ID, &toml.sender_id);
    let client_id = pick(&stored.client_id, ENV_CLIENT_ID, &toml.client_id);
    let client_secret = pick(&stored.client_secret, ENV_CLIENT_SECRET, &toml.client_secret);

    match (sender_id, client_id, client_secret) {
        (Some(sender_id), Some(client_id), Some(client_secret)) => Ok(GatewayCredentials {
            sender_id,
            client_id,
            client_secret,
        }),
        (sender_id, client_id, client_secret) => {
            let mut missing = Vec::new();
            if sender_id.is_none() {
                missing.push("sender_id");
            }
            if client_id.is_none() {
                missing.push("client_id");
            }
            if client_secret.is_none() {
                missing.push("client_secret");
            }
            Err(missing)
        }
    }
}

/// Accepted send as reported by the gateway
#[derive(Debug, Clone)]
pub struct GatewayAccepted {
    pub status: u16,
    pub message_id: Option<String>,
    pub body: Value,
}

/// Hubtel API client
#[derive(Clone)]
pub struct HubtelClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl HubtelClient {
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        Self::with_timeout(config.base_url(), config.timeout())
    }

    pub fn with_timeout(base_url: String, timeout: Duration) -> Result<Self, GatewayError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send one message to already-normalized recipients
    pub async fn send(
        &self,
        credentials: &GatewayCredentials,
        recipients: &[String],
        content: &str,
    ) -> Result<GatewayAccepted, GatewayError> {
        let to = recipients.join(",");
        let params = [
            ("clientsecret", credentials.client_secret.as_str()),
            ("clientid", credentials.client_id.as_str()),
            ("from", credentials.sender_id.as_str()),
            ("to", to.as_str()),
            ("content", content),
        ];

        tracing::debug!(recipients = recipients.len(), "Calling Hubtel send API");

        let response = self
            .http_client
            .get(format!("{}{}", self.base_url, SEND_PATH))
            .query(&params)
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        // Error pages are not always JSON; keep the raw text in that case
        let body = serde_json::from_str::<Value>(&text).unwrap_or(Value::String(text));

        tracing::info!(status = status.as_u16(), "Hubtel API responded");

        if !status.is_success() {
            return Err(GatewayError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(GatewayAccepted {
            status: status.as_u16(),
            message_id: extract_message_id(&body),
            body,
        })
    }
}

/// Pull the gateway message id out of a success body
///
/// Hubtel documents `MessageId`; some deployments answer with `message_id`.
pub fn extract_message_id(body: &Value) -> Option<String> {
    ["MessageId", "message_id", "messageId"]
        .iter()
        .find_map(|key| match body.get(*key)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use serial_test::serial;

    fn clear_credential_env() {
        std::env::remove_var(ENV_SENDER_ID);
        std::env::remove_var(ENV_CLIENT_ID);
        std::env::remove_var(ENV_CLIENT_SECRET);
    }

    fn stored(sender: &str, client: &str, secret: &str) -> GatewaySettings {
        GatewaySettings {
            sender_id: Some(sender.to_string()),
            client_id: Some(client.to_string()),
            client_secret: Some(secret.to_string()),
            updated_at: None,
        }
    }

    #[test]
    #[serial]
    fn test_stored_settings_win_over_toml() {
        let toml = GatewayConfig {
            sender_id: Some("TOML".to_string()),
            client_id: Some("toml-client".to_string()),
            client_secret: Some("toml-secret".to_string()),
            ..Default::default()
        };

        let creds = resolve_credentials(&stored("EWS", "abc", "xyz"), &toml).unwrap();
        assert_eq!(creds.sender_id, "EWS");
        assert_eq!(creds.client_id, "abc");
        assert_eq!(creds.client_secret, "xyz");
    }

    #[test]
    #[serial]
    fn test_blank_stored_value_falls_through_to_toml() {
        clear_credential_env();
        let toml = GatewayConfig {
            client_secret: Some("toml-secret".to_string()),
            ..Default::default()
        };

        let creds = resolve_credentials(&stored("EWS", "abc", "  "), &toml).unwrap();
        assert_eq!(creds.client_secret, "toml-secret");
    }

    #[test]
    #[serial]
    fn test_environment_beats_toml_and_missing_fields_are_named() {
        clear_credential_env();
        std::env::set_var(ENV_CLIENT_ID, "env-client");

        let toml = GatewayConfig {
            client_id: Some("toml-client".to_string()),
            ..Default::default()
        };
        let result = resolve_credentials(&GatewaySettings::default(), &toml);
        clear_credential_env();

        assert_eq!(result, Err(vec!["sender_id", "client_secret"]));

        std::env::set_var(ENV_CLIENT_ID, "env-client");
        let creds = resolve_credentials(&stored("EWS", "", "xyz"), &toml);
        clear_credential_env();
        assert_eq!(creds.unwrap().client_id, "env-client");
    }

    #[test]
    fn test_extract_message_id_variants() {
        assert_eq!(
            extract_message_id(&json!({"MessageId": "abc-123"})).as_deref(),
            Some("abc-123")
        );
        assert_eq!(
            extract_message_id(&json!({"message_id": 42})).as_deref(),
            Some("42")
        );
        assert_eq!(extract_message_id(&json!({"Status": 0})), None);
        assert_eq!(extract_message_id(&json!("plain text")), None);
    }
}
