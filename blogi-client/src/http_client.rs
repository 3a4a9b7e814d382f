use reqwest::{Client, Method};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::time::Duration;

use blogi_core::{Post, PostPage, PostPatch, PresignedUpload, Token, User};

use crate::error::{ClientError, ClientResult};

#[derive(Debug, Serialize)]
struct RegisterRequestDto<'a> {
    username: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct LoginRequestDto<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct CreatePostRequestDto<'a> {
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_url: Option<&'a str>,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct PresignedUrlRequestDto<'a> {
    file_name: &'a str,
    file_type: &'a str,
}

#[derive(Debug, Deserialize)]
struct UserDto {
    id: i64,
    username: String,
    email: String,
    created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Deserialize)]
struct TokenDto {
    access_token: String,
    token_type: String,
}

#[derive(Debug, Deserialize)]
struct PostDto {
    id: i64,
    title: String,
    content: String,
    image_url: Option<String>,
    user_id: i64,
    author_username: String,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Deserialize)]
struct PostPageDto {
    items: Vec<PostDto>,
    total: i64,
    page: u32,
    #[serde(alias = "limit")]
    size: u32,
    pages: u32,
}

#[derive(Debug, Deserialize)]
struct PresignedUploadDto {
    upload_url: String,
    file_url: String,
}

#[derive(Serialize)]
struct ListPostsQuery<'a> {
    page: u32,
    limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    search: Option<&'a str>,
}

impl From<UserDto> for User {
    fn from(value: UserDto) -> Self {
        Self {
            id: value.id,
            username: value.username,
            email: value.email,
            created_at: value.created_at,
        }
    }
}

impl From<TokenDto> for Token {
    fn from(value: TokenDto) -> Self {
        Self {
            access_token: value.access_token,
            token_type: value.token_type,
        }
    }
}

impl From<PostDto> for Post {
    fn from(value: PostDto) -> Self {
        Self {
            id: value.id,
            title: value.title,
            content: value.content,
            image_url: value.image_url,
            user_id: value.user_id,
            author_username: value.author_username,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl From<PostPageDto> for PostPage {
    fn from(value: PostPageDto) -> Self {
        Self {
            items: value.items.into_iter().map(Post::from).collect(),
            total: value.total.max(0) as u64,
            page: value.page,
            size: value.size,
            pages: value.pages,
        }
    }
}

impl From<PresignedUploadDto> for PresignedUpload {
    fn from(value: PresignedUploadDto) -> Self {
        Self {
            upload_url: value.upload_url,
            file_url: value.file_url,
        }
    }
}

/// Вытаскивает сообщение из тела ошибки.
///
/// Бэкенд отвечает FastAPI-формой `{"detail": ...}`, где `detail` —
/// либо строка, либо структура ошибок валидации.
fn decode_detail(raw: &str, status: reqwest::StatusCode) -> String {
    let fallback = || format!("http status {status}");
    let Ok(body) = serde_json::from_str::<serde_json::Value>(raw) else {
        return if raw.trim().is_empty() {
            fallback()
        } else {
            raw.trim().to_string()
        };
    };

    match body.get("detail") {
        Some(serde_json::Value::String(message)) => message.clone(),
        Some(detail) => detail.to_string(),
        None => fallback(),
    }
}

#[derive(Debug, Clone)]
/// HTTP-клиент для работы с REST API Blogi.
pub struct HttpClient {
    base_url: String,
    client: Client,
}

impl HttpClient {
    /// Создаёт новый HTTP-клиент с базовым URL сервера.
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(15))
            .build()
            .expect("failed to build reqwest client");

        Self {
            base_url: base_url.into(),
            client,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn decode_error(response: reqwest::Response) -> ClientError {
        let status = response.status();
        let raw = response.text().await.unwrap_or_default();
        let message = decode_detail(&raw, status);
        ClientError::from_http_status(status, Some(message))
    }

    /// универсальный helper для отправки запросов с json-payload
    async fn send_json<TReq, TRes>(
        &self,
        method: Method,
        path: &str,
        body: &TReq,
        token: Option<&str>,
    ) -> ClientResult<TRes>
    where
        TReq: Serialize,
        TRes: DeserializeOwned,
    {
        let url = self.endpoint(path);
        tracing::debug!(%method, %url, "sending json request");

        let mut request = self.client.request(method, url).json(body);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(ClientError::from_reqwest)?;
        if !response.status().is_success() {
            return Err(Self::decode_error(response).await);
        }

        response
            .json::<TRes>()
            .await
            .map_err(ClientError::from_reqwest)
    }

    /// helper для GET-запросов с опциональным bearer-токеном
    async fn get_json<TRes>(&self, path: &str, token: Option<&str>) -> ClientResult<TRes>
    where
        TRes: DeserializeOwned,
    {
        let url = self.endpoint(path);
        tracing::debug!(%url, "sending get request");

        let mut request = self.client.request(Method::GET, url);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(ClientError::from_reqwest)?;
        if !response.status().is_success() {
            return Err(Self::decode_error(response).await);
        }

        response
            .json::<TRes>()
            .await
            .map_err(ClientError::from_reqwest)
    }

    /// Регистрирует пользователя и возвращает его публичные данные.
    ///
    /// Токен при регистрации не выдаётся — за ним следует отдельный
    /// вызов [`HttpClient::login`].
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> ClientResult<User> {
        let payload = RegisterRequestDto {
            username,
            email,
            password,
        };
        let dto: UserDto = self
            .send_json(Method::POST, "/api/auth/register", &payload, None)
            .await?;
        Ok(dto.into())
    }

    /// Выполняет вход пользователя и возвращает bearer-токен.
    pub async fn login(&self, username: &str, password: &str) -> ClientResult<Token> {
        let payload = LoginRequestDto { username, password };
        let dto: TokenDto = self
            .send_json(Method::POST, "/api/auth/login", &payload, None)
            .await?;
        Ok(dto.into())
    }

    /// Возвращает страницу постов с пагинацией и необязательным поиском.
    pub async fn list_posts(
        &self,
        page: u32,
        limit: u32,
        search: Option<&str>,
    ) -> ClientResult<PostPage> {
        let url = self.endpoint("/api/blogs/");
        tracing::debug!(%url, page, limit, search = search.unwrap_or(""), "listing posts");

        let query = ListPostsQuery {
            page,
            limit,
            search,
        };

        let request = self.client.request(Method::GET, url).query(&query);

        let response = request.send().await.map_err(ClientError::from_reqwest)?;
        if !response.status().is_success() {
            return Err(Self::decode_error(response).await);
        }

        let dto = response
            .json::<PostPageDto>()
            .await
            .map_err(ClientError::from_reqwest)?;
        Ok(dto.into())
    }

    /// Получает пост по идентификатору.
    ///
    /// Токен передаётся, если есть: на защищённых инсталляциях чтение
    /// поста тоже требует авторизации.
    pub async fn get_post(&self, token: Option<&str>, id: i64) -> ClientResult<Post> {
        let dto: PostDto = self.get_json(&format!("/api/blogs/{id}"), token).await?;
        Ok(dto.into())
    }

    /// Возвращает посты конкретного пользователя.
    pub async fn user_posts(&self, token: Option<&str>, user_id: i64) -> ClientResult<Vec<Post>> {
        let dtos: Vec<PostDto> = self
            .get_json(&format!("/api/blogs/user/{user_id}"), token)
            .await?;
        Ok(dtos.into_iter().map(Post::from).collect())
    }

    /// Создаёт пост от имени авторизованного пользователя.
    pub async fn create_post(
        &self,
        token: &str,
        title: &str,
        image_url: Option<&str>,
        content: &str,
    ) -> ClientResult<Post> {
        let payload = CreatePostRequestDto {
            title,
            image_url,
            content,
        };
        let dto: PostDto = self
            .send_json(Method::POST, "/api/blogs/", &payload, Some(token))
            .await?;
        Ok(dto.into())
    }

    /// Частично обновляет пост: поля `None` в patch не отправляются
    /// и остаются на сервере без изменений.
    pub async fn update_post(&self, token: &str, id: i64, patch: &PostPatch) -> ClientResult<Post> {
        let dto: PostDto = self
            .send_json(Method::PUT, &format!("/api/blogs/{id}"), patch, Some(token))
            .await?;
        Ok(dto.into())
    }

    /// Удаляет пост по идентификатору.
    pub async fn delete_post(&self, token: &str, id: i64) -> ClientResult<()> {
        let url = self.endpoint(&format!("/api/blogs/{id}"));
        tracing::debug!(%url, "deleting post");

        let request = self.client.request(Method::DELETE, url).bearer_auth(token);

        let response = request.send().await.map_err(ClientError::from_reqwest)?;
        if !response.status().is_success() {
            return Err(Self::decode_error(response).await);
        }

        Ok(())
    }

    /// Запрашивает presigned URL для прямой загрузки файла в хранилище.
    ///
    /// Любой неуспешный ответ сервера сворачивается в одно сообщение —
    /// детали presigned-выдачи клиенту не важны.
    pub async fn presigned_url(
        &self,
        token: &str,
        file_name: &str,
        file_type: &str,
    ) -> ClientResult<PresignedUpload> {
        let payload = PresignedUrlRequestDto {
            file_name,
            file_type,
        };
        let dto: PresignedUploadDto = self
            .send_json(
                Method::POST,
                "/api/uploads/presigned-url",
                &payload,
                Some(token),
            )
            .await
            .map_err(|err| match err {
                ClientError::Http(err) => ClientError::Http(err),
                _ => ClientError::Upload("Failed to get presigned URL".to_string()),
            })?;
        Ok(dto.into())
    }

    pub(crate) fn inner(&self) -> &Client {
        &self.client
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_normalizes_slashes() {
        let client = HttpClient::new("http://localhost:8000/");
        let full = client.endpoint("/api/blogs/");
        assert_eq!(full, "http://localhost:8000/api/blogs/");
    }

    #[test]
    fn post_page_dto_clamps_negative_total() {
        let dto = PostPageDto {
            items: vec![],
            total: -7,
            page: 1,
            size: 10,
            pages: 0,
        };
        let mapped = PostPage::from(dto);
        assert_eq!(mapped.total, 0);
    }

    #[test]
    fn decode_detail_prefers_string_detail() {
        let message = decode_detail(
            r#"{"detail":"Blog post not found"}"#,
            reqwest::StatusCode::NOT_FOUND,
        );
        assert_eq!(message, "Blog post not found");
    }

    #[test]
    fn decode_detail_renders_structured_detail() {
        let message = decode_detail(
            r#"{"detail":[{"field":"title","code":"empty_field"}]}"#,
            reqwest::StatusCode::UNPROCESSABLE_ENTITY,
        );
        assert!(message.contains("empty_field"));
    }

    #[test]
    fn decode_detail_falls_back_to_status() {
        let message = decode_detail("", reqwest::StatusCode::BAD_GATEWAY);
        assert_eq!(message, "http status 502 Bad Gateway");
    }

    #[test]
    fn decode_detail_passes_plain_text_through() {
        let message = decode_detail("gateway exploded", reqwest::StatusCode::BAD_GATEWAY);
        assert_eq!(message, "gateway exploded");
    }
}
