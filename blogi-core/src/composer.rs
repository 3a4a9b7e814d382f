use thiserror::Error;
use validator::Validate;

use crate::models::{Post, PostPatch};

#[derive(Debug, Clone, Default, Validate)]
/// Черновик поста для формы создания/редактирования.
///
/// Правила повторяют серверную валидацию: непустой заголовок до 100
/// символов и непустое содержимое. Невалидный черновик не доходит до
/// сети — ошибки полей показываются прямо в форме.
pub struct PostDraft {
    /// Заголовок поста.
    #[validate(length(min = 1, max = 100))]
    pub title: String,
    /// Содержимое поста.
    #[validate(length(min = 1))]
    pub content: String,
    /// Ранее сохранённый URL обложки (для редактирования).
    pub image_url: Option<String>,
}

impl PostDraft {
    /// Убирает краевые пробелы перед валидацией, как делает сервер.
    fn normalize(&mut self) {
        self.title = self.title.trim().to_string();
        self.content = self.content.trim().to_string();
    }
}

#[derive(Debug, Error)]
/// Ошибки подготовки отправки поста.
pub enum ComposeError {
    /// Предыдущая отправка ещё выполняется.
    #[error("submission already in flight")]
    Busy,

    /// Черновик не прошёл валидацию полей.
    #[error("invalid draft: {0}")]
    Invalid(#[from] validator::ValidationErrors),
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// План отправки поста, выданный [`PostComposer::begin_submit`].
pub enum SubmitPlan {
    /// Выбран новый файл: сначала presigned-загрузка, и только после
    /// успешного PUT пост отправляется с полученным `file_url`.
    UploadThenSubmit {
        /// Имя выбранного файла.
        file_name: String,
        /// MIME-тип выбранного файла.
        file_type: String,
    },
    /// Файл не выбран: используется ранее сохранённый URL обложки
    /// (при редактировании он остаётся неизменным).
    SubmitOnly {
        /// URL обложки, который уйдёт в запрос как есть.
        image_url: Option<String>,
    },
}

#[derive(Debug, Clone, Default)]
/// Оркестрация формы поста: защита от повторной отправки и выбор
/// последовательности «загрузка файла → сохранение поста».
pub struct PostComposer {
    draft: PostDraft,
    selected_file: Option<(String, String)>,
    in_flight: bool,
}

impl PostComposer {
    /// Пустая форма создания поста.
    pub fn new() -> Self {
        Self::default()
    }

    /// Форма редактирования, заполненная полями существующего поста.
    pub fn for_edit(post: &Post) -> Self {
        Self {
            draft: PostDraft {
                title: post.title.clone(),
                content: post.content.clone(),
                image_url: post.image_url.clone(),
            },
            selected_file: None,
            in_flight: false,
        }
    }

    /// Текущий черновик.
    pub fn draft(&self) -> &PostDraft {
        &self.draft
    }

    /// Черновик для редактирования полей формы.
    pub fn draft_mut(&mut self) -> &mut PostDraft {
        &mut self.draft
    }

    /// Отмечает выбор нового файла обложки.
    pub fn select_file(&mut self, file_name: impl Into<String>, file_type: impl Into<String>) {
        self.selected_file = Some((file_name.into(), file_type.into()));
    }

    /// Снимает выбор файла; прежний URL обложки остаётся в черновике.
    pub fn clear_file(&mut self) {
        self.selected_file = None;
    }

    /// Выполняется ли сейчас отправка.
    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Начинает отправку: отклоняет повторный сабмит, валидирует
    /// черновик и выдаёт план — с предварительной загрузкой файла
    /// или сразу с сохранённым URL.
    pub fn begin_submit(&mut self) -> Result<SubmitPlan, ComposeError> {
        if self.in_flight {
            return Err(ComposeError::Busy);
        }

        self.draft.normalize();
        self.draft.validate()?;

        self.in_flight = true;
        Ok(match &self.selected_file {
            Some((file_name, file_type)) => SubmitPlan::UploadThenSubmit {
                file_name: file_name.clone(),
                file_type: file_type.clone(),
            },
            None => SubmitPlan::SubmitOnly {
                image_url: self.draft.image_url.clone(),
            },
        })
    }

    /// Завершает отправку (успешную или нет), снимая защиту от
    /// повторного сабмита. Поля формы не очищаются: при ошибке
    /// пользователь повторяет отправку с теми же данными.
    pub fn finish_submit(&mut self) {
        self.in_flight = false;
    }

    /// Patch для PUT-запроса редактирования с данным URL обложки.
    pub fn patch_with_image(&self, image_url: Option<String>) -> PostPatch {
        PostPatch {
            title: Some(self.draft.title.clone()),
            image_url,
            content: Some(self.draft.content.clone()),
        }
    }
}
