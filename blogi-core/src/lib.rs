//! Общие типы и view-model-логика клиентов Blogi.
//!
//! Крейт не зависит от UI-фреймворка и HTTP-транспорта: его используют
//! и нативный клиент (`blogi-client`), и wasm-фронтенд (`blogi-wasm`).
//! Здесь живут модели данных REST API, разбор claims access-токена,
//! пагинация списка постов и оркестрация формы создания/редактирования.
#![warn(missing_docs)]

mod claims;
mod composer;
mod feed;
mod models;
mod notify;

pub use claims::{ClaimsError, Session, TokenClaims};
pub use composer::{ComposeError, PostComposer, PostDraft, SubmitPlan};
pub use feed::{FeedQuery, PostFeed};
pub use models::{Post, PostPage, PostPatch, PresignedUpload, Token, User};
pub use notify::{NoticeKind, Notifier};
