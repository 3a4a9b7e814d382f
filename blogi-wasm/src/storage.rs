use serde::{Deserialize, Serialize};

use blogi_core::TokenClaims;

const TOKEN_KEY: &str = "blogi_token";
const USER_KEY: &str = "blogi_user";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Личность пользователя, известная фронтенду.
///
/// Бэкенд не отдаёт объект пользователя при логине, поэтому здесь
/// только то, что лежит в claims токена.
pub(crate) struct StoredUser {
    pub(crate) id: i64,
    pub(crate) username: String,
}

impl From<TokenClaims> for StoredUser {
    fn from(claims: TokenClaims) -> Self {
        Self {
            id: claims.id,
            username: claims.username,
        }
    }
}

fn parse_token(raw: &str) -> Option<String> {
    let token = raw.trim().to_string();
    if token.is_empty() {
        return None;
    }
    Some(token)
}

fn parse_user(raw: &str) -> Option<StoredUser> {
    serde_json::from_str::<StoredUser>(raw).ok()
}

pub(crate) fn load_token() -> Option<String> {
    let window = web_sys::window()?;
    let storage = window.local_storage().ok()??;
    let raw = storage.get_item(TOKEN_KEY).ok()??;
    parse_token(&raw)
}

pub(crate) fn save_token(token: &str) -> Result<(), String> {
    let window = web_sys::window().ok_or_else(|| "window is not available".to_string())?;
    let storage = window
        .local_storage()
        .map_err(|_| "failed to access localStorage".to_string())?
        .ok_or_else(|| "localStorage is not available".to_string())?;

    storage
        .set_item(TOKEN_KEY, token)
        .map_err(|_| "failed to save token".to_string())
}

pub(crate) fn clear_token() -> Result<(), String> {
    let window = web_sys::window().ok_or_else(|| "window is not available".to_string())?;
    let storage = window
        .local_storage()
        .map_err(|_| "failed to access localStorage".to_string())?
        .ok_or_else(|| "localStorage is not available".to_string())?;

    storage
        .remove_item(TOKEN_KEY)
        .map_err(|_| "failed to clear token".to_string())
}

pub(crate) fn load_user() -> Option<StoredUser> {
    let window = web_sys::window()?;
    let storage = window.local_storage().ok()??;
    let raw = storage.get_item(USER_KEY).ok()??;
    parse_user(&raw)
}

pub(crate) fn save_user(user: &StoredUser) -> Result<(), String> {
    let window = web_sys::window().ok_or_else(|| "window is not available".to_string())?;
    let storage = window
        .local_storage()
        .map_err(|_| "failed to access localStorage".to_string())?
        .ok_or_else(|| "localStorage is not available".to_string())?;

    let raw = serde_json::to_string(user).map_err(|_| "failed to serialize user".to_string())?;
    storage
        .set_item(USER_KEY, &raw)
        .map_err(|_| "failed to save user".to_string())
}

pub(crate) fn clear_user() -> Result<(), String> {
    let window = web_sys::window().ok_or_else(|| "window is not available".to_string())?;
    let storage = window
        .local_storage()
        .map_err(|_| "failed to access localStorage".to_string())?
        .ok_or_else(|| "localStorage is not available".to_string())?;

    storage
        .remove_item(USER_KEY)
        .map_err(|_| "failed to clear user".to_string())
}
