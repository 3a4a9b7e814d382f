use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
/// Ошибки разбора access-токена.
pub enum ClaimsError {
    /// Токен не состоит из трёх частей, разделённых точками.
    #[error("invalid jwt format")]
    InvalidFormat,

    /// Payload-часть не декодируется из base64url.
    #[error("failed to decode jwt payload")]
    Decode,

    /// Payload не разбирается как JSON с ожидаемыми claims.
    #[error("failed to parse jwt claims")]
    Parse,
}

#[derive(Debug, Clone, Deserialize)]
/// Claims access-токена.
///
/// Ответ логина не содержит объекта пользователя: бэкенд кладёт имя
/// и идентификатор прямо в токен, поэтому клиент читает payload сам.
/// Подпись при этом не проверяется — ключа у клиента нет, токен
/// используется только как источник отображаемой личности.
pub struct TokenClaims {
    /// Имя пользователя (claim `sub`).
    #[serde(rename = "sub")]
    pub username: String,
    /// Идентификатор пользователя.
    pub id: i64,
    /// Срок действия токена (unix-секунды), если задан.
    #[serde(default)]
    pub exp: Option<i64>,
}

impl TokenClaims {
    /// Читает claims из payload-части токена без проверки подписи.
    pub fn parse(token: &str) -> Result<Self, ClaimsError> {
        let parts: Vec<&str> = token.split('.').collect();
        if parts.len() != 3 {
            return Err(ClaimsError::InvalidFormat);
        }

        let payload = URL_SAFE_NO_PAD
            .decode(parts[1])
            .map_err(|_| ClaimsError::Decode)?;

        serde_json::from_slice(&payload).map_err(|_| ClaimsError::Parse)
    }

    /// Истёк ли токен на момент `now` (unix-секунды).
    ///
    /// Токен без claim `exp` считается действующим.
    pub fn is_expired(&self, now: i64) -> bool {
        self.exp.is_some_and(|exp| exp <= now)
    }
}

#[derive(Debug, Clone)]
/// Сессия текущего пользователя, восстановленная из сохранённого токена.
pub struct Session {
    /// Bearer-токен для авторизованных запросов.
    pub token: String,
    /// Идентификатор пользователя из claims.
    pub user_id: i64,
    /// Имя пользователя из claims.
    pub username: String,
}

impl Session {
    /// Строит сессию из токена, разбирая его claims.
    pub fn from_token(token: impl Into<String>) -> Result<Self, ClaimsError> {
        let token = token.into();
        let claims = TokenClaims::parse(&token)?;
        Ok(Self {
            token,
            user_id: claims.id,
            username: claims.username,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_token(payload: &str) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(payload.as_bytes());
        format!("{header}.{body}.signature")
    }

    #[test]
    fn parse_extracts_username_and_id() {
        let token = make_token(r#"{"sub":"alice","id":7,"exp":1800000000}"#);
        let claims = TokenClaims::parse(&token).expect("claims should parse");
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.id, 7);
        assert_eq!(claims.exp, Some(1_800_000_000));
    }

    #[test]
    fn parse_rejects_token_without_three_parts() {
        let result = TokenClaims::parse("not-a-jwt");
        assert!(matches!(result, Err(ClaimsError::InvalidFormat)));
    }

    #[test]
    fn parse_rejects_broken_payload() {
        let result = TokenClaims::parse("aGVhZGVy.%%%.c2ln");
        assert!(matches!(result, Err(ClaimsError::Decode)));
    }

    #[test]
    fn parse_rejects_payload_without_expected_claims() {
        let token = make_token(r#"{"jti":"abc"}"#);
        let result = TokenClaims::parse(&token);
        assert!(matches!(result, Err(ClaimsError::Parse)));
    }

    #[test]
    fn is_expired_compares_against_now() {
        let token = make_token(r#"{"sub":"alice","id":7,"exp":1000}"#);
        let claims = TokenClaims::parse(&token).expect("claims should parse");
        assert!(!claims.is_expired(999));
        assert!(claims.is_expired(1000));
        assert!(claims.is_expired(1001));
    }

    #[test]
    fn token_without_exp_never_expires() {
        let token = make_token(r#"{"sub":"alice","id":7}"#);
        let claims = TokenClaims::parse(&token).expect("claims should parse");
        assert!(!claims.is_expired(i64::MAX));
    }

    #[test]
    fn session_carries_identity_from_claims() {
        let token = make_token(r#"{"sub":"bob","id":42}"#);
        let session = Session::from_token(token.clone()).expect("session should build");
        assert_eq!(session.token, token);
        assert_eq!(session.user_id, 42);
        assert_eq!(session.username, "bob");
    }
}
