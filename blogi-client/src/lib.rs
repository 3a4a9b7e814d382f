//! Клиентская библиотека для работы с REST API Blogi.
//!
//! Предоставляет [`BlogiClient`] — фасад над HTTP-клиентом (`reqwest`)
//! с хранением bearer-токена и оркестрацией «presigned-загрузка файла,
//! затем сохранение поста». Общие модели и view-model-логика живут в
//! `blogi-core` и разделяются с wasm-фронтендом.
#![warn(missing_docs)]

mod error;
mod http_client;
mod upload;

pub use error::{ClientError, ClientResult};
pub use http_client::HttpClient;

pub use blogi_core::{
    Post, PostDraft, PostPage, PostPatch, PresignedUpload, Session, Token, User,
};

/// Файл обложки для загрузки через presigned URL.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    /// Имя файла (уходит в запрос presigned URL).
    pub file_name: String,
    /// MIME-тип файла.
    pub file_type: String,
    /// Содержимое файла.
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
/// Унифицированный клиент Blogi: авторизация, посты, загрузка обложек.
///
/// Клиент хранит bearer-токен после `login` и автоматически использует
/// его в защищённых операциях. Токен меняют только `login`, `logout`
/// и `set_token`.
pub struct BlogiClient {
    http: HttpClient,
    token: Option<String>,
}

impl BlogiClient {
    /// Создаёт клиент с базовым URL сервера, например `http://127.0.0.1:8000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: HttpClient::new(base_url),
            token: None,
        }
    }

    /// Устанавливает bearer-токен вручную (например, из сохранённой сессии).
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    /// Возвращает текущий bearer-токен, если он установлен.
    pub fn get_token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Очищает сохранённый bearer-токен.
    pub fn logout(&mut self) {
        self.token = None;
    }

    /// Сессия текущего пользователя, восстановленная из claims токена.
    pub fn session(&self) -> ClientResult<Session> {
        let token = self.require_token()?;
        Ok(Session::from_token(token)?)
    }

    /// Регистрирует пользователя.
    ///
    /// Бэкенд не выдаёт токен при регистрации — после успеха следует
    /// вызвать [`BlogiClient::login`].
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> ClientResult<User> {
        self.http.register(username, email, password).await
    }

    /// Выполняет вход пользователя и сохраняет полученный токен в клиенте.
    pub async fn login(&mut self, username: &str, password: &str) -> ClientResult<Token> {
        let token = self.http.login(username, password).await?;
        self.token = Some(token.access_token.clone());
        Ok(token)
    }

    /// Возвращает страницу постов с пагинацией и необязательным поиском.
    pub async fn list_posts(
        &self,
        page: u32,
        limit: u32,
        search: Option<&str>,
    ) -> ClientResult<PostPage> {
        self.http.list_posts(page, limit, search).await
    }

    /// Возвращает пост по идентификатору.
    pub async fn get_post(&self, id: i64) -> ClientResult<Post> {
        self.http.get_post(self.token.as_deref(), id).await
    }

    /// Возвращает посты конкретного пользователя.
    pub async fn user_posts(&self, user_id: i64) -> ClientResult<Vec<Post>> {
        self.http.user_posts(self.token.as_deref(), user_id).await
    }

    /// Возвращает посты текущего пользователя (id берётся из claims).
    pub async fn my_posts(&self) -> ClientResult<Vec<Post>> {
        let session = self.session()?;
        self.user_posts(session.user_id).await
    }

    /// Создаёт пост.
    ///
    /// Требует установленный bearer-токен.
    pub async fn create_post(&self, draft: &PostDraft) -> ClientResult<Post> {
        let token = self.require_token()?;
        self.http
            .create_post(
                token,
                &draft.title,
                draft.image_url.as_deref(),
                &draft.content,
            )
            .await
    }

    /// Частично обновляет пост.
    ///
    /// Требует установленный bearer-токен.
    pub async fn update_post(&self, id: i64, patch: &PostPatch) -> ClientResult<Post> {
        let token = self.require_token()?;
        self.http.update_post(token, id, patch).await
    }

    /// Удаляет пост по идентификатору.
    ///
    /// Требует установленный bearer-токен.
    pub async fn delete_post(&self, id: i64) -> ClientResult<()> {
        let token = self.require_token()?;
        self.http.delete_post(token, id).await
    }

    /// Загружает обложку через presigned URL и возвращает её публичный URL.
    pub async fn upload_image(&self, image: ImageUpload) -> ClientResult<String> {
        let token = self.require_token()?;
        self.http
            .upload_image(token, &image.file_name, &image.file_type, image.bytes)
            .await
    }

    /// Публикует пост, при необходимости предварительно загрузив обложку.
    ///
    /// Инвариант последовательности: если передан файл, запрос создания
    /// не отправляется, пока presigned-загрузка не завершилась успехом и
    /// не выдала итоговый URL. Если PUT в хранилище упал, создание поста
    /// не выполняется вовсе.
    pub async fn publish_post(
        &self,
        draft: &PostDraft,
        image: Option<ImageUpload>,
    ) -> ClientResult<Post> {
        let image_url = match image {
            Some(image) => Some(self.upload_image(image).await?),
            None => draft.image_url.clone(),
        };

        let token = self.require_token()?;
        self.http
            .create_post(token, &draft.title, image_url.as_deref(), &draft.content)
            .await
    }

    /// Обновляет пост, при необходимости предварительно загрузив новую
    /// обложку. Без нового файла URL обложки из patch уходит как есть —
    /// прежнее изображение сохраняется неизменным.
    pub async fn revise_post(
        &self,
        id: i64,
        mut patch: PostPatch,
        image: Option<ImageUpload>,
    ) -> ClientResult<Post> {
        if let Some(image) = image {
            patch.image_url = Some(self.upload_image(image).await?);
        }

        let token = self.require_token()?;
        self.http.update_post(token, id, &patch).await
    }

    fn require_token(&self) -> ClientResult<&str> {
        self.token.as_deref().ok_or(ClientError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protected_calls_fail_fast_without_token() {
        let client = BlogiClient::new("http://127.0.0.1:8000");
        let result = client.require_token();
        assert!(matches!(result, Err(ClientError::Unauthorized)));
    }

    #[test]
    fn login_token_lifecycle() {
        let mut client = BlogiClient::new("http://127.0.0.1:8000");
        assert!(client.get_token().is_none());

        client.set_token("abc.def.ghi");
        assert_eq!(client.get_token(), Some("abc.def.ghi"));

        client.logout();
        assert!(client.get_token().is_none());
    }
}
