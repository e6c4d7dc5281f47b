// ─── Authentication ───
// Offline profiles and the yggdrasil `authenticate` exchange.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::http::Fetcher;

pub const DEFAULT_AUTH_SERVER: &str =
    "https://littleskin.cn/api/yggdrasil/authserver/authenticate";

const OFFLINE_UUID: &str = "00000000-0000-0000-0000-000000000000";
const OFFLINE_ACCESS_TOKEN: &str = "offline_access_token";
/// `${user_type}` reported for every account.
const USER_TYPE: &str = "mojang";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AccountMode {
    Offline,
    Yggdrasil,
}

/// Identity values substituted into the launch arguments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchAccountProfile {
    pub mode: AccountMode,
    pub username: String,
    pub uuid: String,
    pub access_token: String,
    pub client_token: String,
    pub user_type: String,
}

impl Default for LaunchAccountProfile {
    fn default() -> Self {
        Self::offline("Player")
    }
}

impl LaunchAccountProfile {
    pub fn offline(username: &str) -> Self {
        let username = match username.trim() {
            "" => "Player",
            name => name,
        };
        Self {
            mode: AccountMode::Offline,
            username: username.to_string(),
            uuid: OFFLINE_UUID.into(),
            access_token: OFFLINE_ACCESS_TOKEN.into(),
            client_token: String::new(),
            user_type: USER_TYPE.into(),
        }
    }
}

// ── Wire format ─────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AuthenticateRequest<'a> {
    agent: Agent<'a>,
    username: &'a str,
    password: &'a str,
    client_token: &'a str,
    request_user: bool,
}

#[derive(Debug, Serialize)]
struct Agent<'a> {
    name: &'a str,
    version: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthenticateResponse {
    #[serde(default)]
    client_token: Option<String>,
    access_token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GameProfile {
    pub id: String,
    pub name: String,
}

/// Log in against a yggdrasil `authenticate` endpoint and pick the profile
/// named `player_name`.
///
/// The server must echo the client token it was sent; anything else is an
/// `InvariantViolation`.
pub async fn authenticate(
    fetcher: &dyn Fetcher,
    server: &str,
    username: &str,
    password: &str,
    player_name: &str,
    agent_version: u32,
) -> LauncherResult<LaunchAccountProfile> {
    let client_token = Uuid::new_v4().simple().to_string();
    let request = AuthenticateRequest {
        agent: Agent {
            name: "Minecraft",
            version: agent_version,
        },
        username,
        password,
        client_token: &client_token,
        request_user: false,
    };

    let mut headers = BTreeMap::new();
    headers.insert("Content-Type".to_string(), "application/json".to_string());

    info!("Authenticating {} against {}", username, server);
    let raw = fetcher
        .post(server, &headers, &serde_json::to_value(&request)?)
        .await?;
    let value: serde_json::Value = serde_json::from_slice(&raw)?;

    let response: AuthenticateResponse = serde_json::from_value(value.clone())?;
    if response.client_token.as_deref() != Some(client_token.as_str()) {
        warn!("Auth server returned a different client token");
        return Err(LauncherError::InvariantViolation(format!(
            "client token mismatch: sent {}, got {}",
            client_token,
            response.client_token.as_deref().unwrap_or("<none>")
        )));
    }

    let profiles: Vec<GameProfile> = match value.get("availableProfiles") {
        Some(list) if list.is_array() => serde_json::from_value(list.clone())?,
        _ => {
            return Err(LauncherError::NotArray {
                path: "availableProfiles".into(),
            })
        }
    };

    let profile = profiles
        .into_iter()
        .find(|p| p.name == player_name)
        .ok_or_else(|| LauncherError::NoMatchingProfile(player_name.to_string()))?;

    info!("Authenticated as {} ({})", profile.name, profile.id);
    Ok(LaunchAccountProfile {
        mode: AccountMode::Yggdrasil,
        username: profile.name,
        uuid: profile.id,
        access_token: response.access_token,
        client_token,
        user_type: USER_TYPE.into(),
    })
}
