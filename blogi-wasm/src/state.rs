use leptos::prelude::*;

use blogi_core::{NoticeKind, Notifier, Post, PostComposer, PostFeed};

use crate::storage::StoredUser;

/// Размер страницы списка постов.
pub(crate) const PAGE_LIMIT: u32 = 10;

#[derive(Debug, Clone, Copy)]
pub(crate) struct AppState {
    pub(crate) token: RwSignal<Option<String>>,
    pub(crate) user: RwSignal<Option<StoredUser>>,
    pub(crate) feed: RwSignal<PostFeed>,
    pub(crate) composer: RwSignal<PostComposer>,
    /// Пост, открытый на редактирование (None = форма создания).
    pub(crate) editing: RwSignal<Option<Post>>,
    pub(crate) notice: RwSignal<Option<(NoticeKind, String)>>,
    pub(crate) busy: RwSignal<bool>,
    /// Проверено ли сохранённое состояние авторизации. Пока false,
    /// закрытые панели не делают выводов об отсутствии пользователя.
    pub(crate) auth_checked: RwSignal<bool>,
}

impl AppState {
    pub(crate) fn new() -> Self {
        Self {
            token: RwSignal::new(None),
            user: RwSignal::new(None),
            feed: RwSignal::new(PostFeed::new(PAGE_LIMIT)),
            composer: RwSignal::new(PostComposer::new()),
            editing: RwSignal::new(None),
            notice: RwSignal::new(None),
            busy: RwSignal::new(false),
            auth_checked: RwSignal::new(false),
        }
    }

    pub(crate) fn notifier(&self) -> SignalNotifier {
        SignalNotifier {
            notice: self.notice,
        }
    }

    pub(crate) fn clear_notice(&self) {
        self.notice.set(None);
    }

    pub(crate) fn is_authenticated(&self) -> bool {
        self.token.get().is_some()
    }
}

#[derive(Debug, Clone, Copy)]
/// Notifier поверх реактивного сигнала: уведомление рендерится баннером.
pub(crate) struct SignalNotifier {
    notice: RwSignal<Option<(NoticeKind, String)>>,
}

impl Notifier for SignalNotifier {
    fn notify(&self, kind: NoticeKind, message: &str) {
        self.notice.set(Some((kind, message.to_string())));
    }
}
