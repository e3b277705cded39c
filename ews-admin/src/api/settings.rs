//! Gateway settings endpoints
//!
//! The stored client secret is never sent back in full.

use axum::{extract::State, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use ews_common::db::GatewaySettings;
use serde::Serialize;
use tracing::info;

use crate::db::settings::{self, SettingsInput};
use crate::extract::{ApiJson};
use crate::{ApiResult, AppState};

/// Settings as shown in the UI
#[derive(Debug, Serialize)]
pub struct SettingsView {
    pub sender_id: Option<String>,
    pub client_id: Option<String>,
    /// Last four characters only, e.g. `••••9f2c`
    pub client_secret_hint: Option<String>,
    pub client_secret_set: bool,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<GatewaySettings> for SettingsView {
    fn from(settings: GatewaySettings) -> Self {
        let client_secret_hint = settings.client_secret.as_deref().map(mask_secret);
        Self {
            sender_id: settings.sender_id,
            client_id: settings.client_id,
            client_secret_set: client_secret_hint.is_some(),
            client_secret_hint,
            updated_at: settings.updated_at,
        }
    }
}

fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 4 {
        return "••••".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("••••{}", tail)
}

/// GET /api/settings
pub async fn get_settings(State(state): State<AppState>) -> ApiResult<Json<SettingsView>> {
    Ok(Json(settings::get(&state.db).await?.into()))
}

/// PUT /api/settings
///
/// **Request:** `{"sender_id": "...", "client_id": "...", "client_secret": "..."}`
/// Omitted fields keep their stored value.
pub async fn save_settings(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<SettingsInput>,
) -> ApiResult<Json<SettingsView>> {
    let saved = settings::save(&state.db, &payload).await?;
    info!("Gateway settings updated via Web UI");
    Ok(Json(saved.into()))
}

pub fn settings_routes() -> Router<AppState> {
    Router::new().route("/api/settings", get(get_settings).put(save_settings))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_secret_keeps_last_four() {
        assert_eq!(mask_secret("abcdef123456"), "••••3456");
        assert_eq!(mask_secret("abc"), "••••");
    }

    #[test]
    fn test_view_never_contains_full_secret() {
        let view = SettingsView::from(GatewaySettings {
            sender_id: Some("EWS".to_string()),
            client_id: Some("client".to_string()),
            client_secret: Some("supersecretvalue".to_string()),
            updated_at: None,
        });
        let json = serde_json::to_string(&view).unwrap();
        assert!(!json.contains("supersecretvalue"));
        assert!(view.client_secret_set);
    }
}
