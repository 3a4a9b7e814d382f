use thiserror::Error;

#[derive(Debug, Error)]
/// Ошибки клиентской библиотеки `blogi-client`.
pub enum ClientError {
    /// Ошибка HTTP-транспорта (`reqwest`): запрос не дошёл до сервера
    /// или ответ не удалось прочитать.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Требуется авторизация (отсутствует/некорректен токен).
    #[error("unauthorized")]
    Unauthorized,

    /// Запрошенный ресурс не найден.
    #[error("not found")]
    NotFound,

    /// Ошибка API: статус и сообщение из тела ответа передаются как есть.
    #[error("api error {status}: {message}")]
    Api {
        /// HTTP-статус ответа.
        status: u16,
        /// Сообщение об ошибке из тела ответа.
        message: String,
    },

    /// Ошибка последовательности presigned-загрузки файла.
    #[error("{0}")]
    Upload(String),

    /// Сохранённый токен не разбирается (claims недоступны).
    #[error("token error: {0}")]
    Token(#[from] blogi_core::ClaimsError),
}

/// Результат операций `blogi-client`.
pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    /// HTTP-статус, соответствующий ошибке.
    ///
    /// Когда ответа не было вовсе (транспортная ошибка), возвращается 500.
    pub fn status(&self) -> u16 {
        match self {
            Self::Http(err) => err.status().map(|status| status.as_u16()).unwrap_or(500),
            Self::Unauthorized => 401,
            Self::NotFound => 404,
            Self::Api { status, .. } => *status,
            Self::Upload(_) | Self::Token(_) => 500,
        }
    }

    pub(crate) fn from_http_status(status: reqwest::StatusCode, message: Option<String>) -> Self {
        match status {
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                Self::Unauthorized
            }
            reqwest::StatusCode::NOT_FOUND => Self::NotFound,
            _ => {
                let message = message.unwrap_or_else(|| format!("http status {status}"));
                Self::Api {
                    status: status.as_u16(),
                    message,
                }
            }
        }
    }

    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Self::from_http_status(status, None);
        }
        Self::Http(err)
    }
}
