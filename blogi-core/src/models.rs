use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Публичная модель пользователя.
pub struct User {
    /// Идентификатор пользователя.
    pub id: i64,
    /// Логин.
    pub username: String,
    /// Email.
    pub email: String,
    /// Дата и время создания пользователя (UTC).
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Публичная модель поста блога.
pub struct Post {
    /// Идентификатор поста.
    pub id: i64,
    /// Заголовок поста.
    pub title: String,
    /// Содержимое поста.
    pub content: String,
    /// URL обложки поста, если загружена.
    pub image_url: Option<String>,
    /// Идентификатор автора.
    pub user_id: i64,
    /// Имя автора, денормализованное на пост для отображения.
    pub author_username: String,
    /// Дата и время создания поста (UTC).
    pub created_at: DateTime<Utc>,
    /// Дата и время последнего обновления поста (UTC).
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Ответ после успешного входа.
///
/// Бэкенд не возвращает данные пользователя при логине: имя и id
/// лежат в claims токена (см. [`crate::TokenClaims`]).
pub struct Token {
    /// JWT access token.
    pub access_token: String,
    /// Тип токена, обычно `bearer`.
    pub token_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Страница постов с параметрами пагинации.
pub struct PostPage {
    /// Посты текущей страницы.
    pub items: Vec<Post>,
    /// Общее количество постов в выборке.
    pub total: u64,
    /// Номер текущей страницы (с 1).
    pub page: u32,
    /// Размер страницы. Бэкенд называет поле `size`,
    /// один из старых фронтендов — `limit`.
    #[serde(alias = "limit")]
    pub size: u32,
    /// Общее количество страниц.
    pub pages: u32,
}

impl PostPage {
    /// Количество страниц, которое должен вернуть сервер
    /// для `total` записей при размере страницы `size`.
    pub fn expected_pages(total: u64, size: u32) -> u32 {
        if size == 0 {
            return 0;
        }
        total.div_ceil(u64::from(size)) as u32
    }
}

#[derive(Debug, Clone, Default, Serialize)]
/// Частичное обновление поста: поля со значением `None` не сериализуются
/// и остаются на сервере без изменений.
pub struct PostPatch {
    /// Новый заголовок.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Новый URL обложки.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Новое содержимое.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl PostPatch {
    /// Пустой ли patch (нечего отправлять).
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.image_url.is_none() && self.content.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Описание presigned-загрузки: куда писать файл и где он будет доступен.
///
/// Запрашивается на каждую загрузку и используется сразу же, не хранится.
pub struct PresignedUpload {
    /// URL для прямого PUT файла в хранилище.
    pub upload_url: String,
    /// Итоговый публичный URL файла.
    pub file_url: String,
}
