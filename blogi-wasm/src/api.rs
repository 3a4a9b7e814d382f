use gloo_net::http::Request;
use serde::Serialize;
use serde::de::DeserializeOwned;
use wasm_bindgen::JsValue;

use blogi_core::{FeedQuery, Post, PostPage, PostPatch, PresignedUpload, Token, User};

const API_BASE_URL: &str = match option_env!("BLOGI_API_BASE_URL") {
    Some(value) => value,
    None => "http://127.0.0.1:8000",
};

#[derive(Debug, Clone)]
pub(crate) enum ApiError {
    Network(String),
    Http { status: u16, message: String },
    Decode(String),
}

impl core::fmt::Display for ApiError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Network(msg) => write!(f, "network error: {msg}"),
            Self::Http { status, message } => write!(f, "http error {status}: {message}"),
            Self::Decode(msg) => write!(f, "decode error: {msg}"),
        }
    }
}

fn endpoint(path: &str) -> String {
    format!(
        "{}/{}",
        API_BASE_URL.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

async fn parse_json<T: DeserializeOwned>(
    response: gloo_net::http::Response,
) -> Result<T, ApiError> {
    response
        .json::<T>()
        .await
        .map_err(|err| ApiError::Decode(err.to_string()))
}

async fn parse_error_body(response: gloo_net::http::Response) -> ApiError {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();

    let fallback = match status {
        400 => "Некорректный запрос".to_string(),
        401 => "Требуется авторизация".to_string(),
        403 => "Недостаточно прав для этой операции".to_string(),
        404 => "Ресурс не найден".to_string(),
        409 => "Конфликт данных (например, пользователь уже существует)".to_string(),
        500..=599 => "Ошибка сервера".to_string(),
        _ => format!("HTTP ошибка {status}"),
    };

    // Бэкенд отвечает FastAPI-формой {"detail": ...}.
    let message = serde_json::from_str::<serde_json::Value>(&text)
        .ok()
        .and_then(|body| match body.get("detail") {
            Some(serde_json::Value::String(detail)) => Some(detail.clone()),
            Some(detail) => Some(detail.to_string()),
            None => None,
        })
        .unwrap_or(fallback);

    ApiError::Http { status, message }
}

async fn post_json<TReq, TRes>(
    path: &str,
    payload: &TReq,
    token: Option<&str>,
) -> Result<TRes, ApiError>
where
    TReq: Serialize,
    TRes: DeserializeOwned,
{
    let mut builder = Request::post(&endpoint(path));
    if let Some(token) = token {
        builder = builder.header("Authorization", &format!("Bearer {token}"));
    }

    let response = builder
        .json(payload)
        .map_err(|err| ApiError::Network(err.to_string()))?
        .send()
        .await
        .map_err(|err| ApiError::Network(err.to_string()))?;

    if !response.ok() {
        return Err(parse_error_body(response).await);
    }

    parse_json(response).await
}

#[derive(Debug, Serialize)]
struct RegisterRequest<'a> {
    username: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct CreatePostRequest<'a> {
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_url: Option<&'a str>,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct PresignedUrlRequest<'a> {
    file_name: &'a str,
    file_type: &'a str,
}

pub(crate) async fn register(
    username: &str,
    email: &str,
    password: &str,
) -> Result<User, ApiError> {
    let payload = RegisterRequest {
        username,
        email,
        password,
    };
    post_json("/api/auth/register", &payload, None).await
}

pub(crate) async fn login(username: &str, password: &str) -> Result<Token, ApiError> {
    let payload = LoginRequest { username, password };
    post_json("/api/auth/login", &payload, None).await
}

pub(crate) async fn list_posts(query: &FeedQuery) -> Result<PostPage, ApiError> {
    let mut params = vec![
        ("page", query.page.to_string()),
        ("limit", query.limit.to_string()),
    ];
    if let Some(search) = &query.search {
        params.push(("search", search.clone()));
    }

    let response = Request::get(&endpoint("/api/blogs/"))
        .query(params)
        .send()
        .await
        .map_err(|err| ApiError::Network(err.to_string()))?;

    if !response.ok() {
        return Err(parse_error_body(response).await);
    }

    parse_json(response).await
}

pub(crate) async fn create_post(
    token: &str,
    title: &str,
    image_url: Option<&str>,
    content: &str,
) -> Result<Post, ApiError> {
    let payload = CreatePostRequest {
        title,
        image_url,
        content,
    };
    post_json("/api/blogs/", &payload, Some(token)).await
}

pub(crate) async fn update_post(
    token: &str,
    id: i64,
    patch: &PostPatch,
) -> Result<Post, ApiError> {
    let response = Request::put(&endpoint(&format!("/api/blogs/{id}")))
        .header("Authorization", &format!("Bearer {token}"))
        .json(patch)
        .map_err(|err| ApiError::Network(err.to_string()))?
        .send()
        .await
        .map_err(|err| ApiError::Network(err.to_string()))?;

    if !response.ok() {
        return Err(parse_error_body(response).await);
    }

    parse_json(response).await
}

pub(crate) async fn delete_post(token: &str, id: i64) -> Result<(), ApiError> {
    let response = Request::delete(&endpoint(&format!("/api/blogs/{id}")))
        .header("Authorization", &format!("Bearer {token}"))
        .send()
        .await
        .map_err(|err| ApiError::Network(err.to_string()))?;

    if !response.ok() {
        return Err(parse_error_body(response).await);
    }

    Ok(())
}

/// Запрашивает presigned URL. Неуспешный ответ сворачивается в одно
/// сообщение, как и в нативном клиенте.
pub(crate) async fn presigned_url(
    token: &str,
    file_name: &str,
    file_type: &str,
) -> Result<PresignedUpload, ApiError> {
    let payload = PresignedUrlRequest {
        file_name,
        file_type,
    };
    post_json::<_, PresignedUpload>("/api/uploads/presigned-url", &payload, Some(token))
        .await
        .map_err(|err| match err {
            ApiError::Network(msg) => ApiError::Network(msg),
            ApiError::Http { status, .. } => ApiError::Http {
                status,
                message: "Failed to get presigned URL".to_string(),
            },
            ApiError::Decode(msg) => ApiError::Decode(msg),
        })
}

/// Прямой PUT файла в хранилище по presigned URL.
pub(crate) async fn upload_to_presigned_url(
    upload_url: &str,
    file: &web_sys::File,
) -> Result<(), ApiError> {
    let response = Request::put(upload_url)
        .header("Content-Type", "image/jpg")
        .body(JsValue::from(file.clone()))
        .map_err(|err| ApiError::Network(err.to_string()))?
        .send()
        .await
        .map_err(|err| ApiError::Network(err.to_string()))?;

    if !response.ok() {
        let status = response.status();
        return Err(ApiError::Http {
            status,
            message: format!("Failed to upload file. Status: {status}"),
        });
    }

    Ok(())
}

/// Полная последовательность загрузки обложки: presigned URL, затем PUT.
/// Возвращает итоговый публичный URL файла.
pub(crate) async fn upload_image(token: &str, file: &web_sys::File) -> Result<String, ApiError> {
    let presigned = presigned_url(token, &file.name(), &file.type_()).await?;
    upload_to_presigned_url(&presigned.upload_url, file).await?;
    Ok(presigned.file_url)
}
