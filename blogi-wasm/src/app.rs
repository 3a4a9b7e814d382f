use leptos::prelude::*;
use leptos::task::spawn_local;

use blogi_core::{FeedQuery, NoticeKind, TokenClaims};

use crate::api;
use crate::state::AppState;
use crate::storage::{self, StoredUser};

/// Выполняет запрос списка постов и применяет результат к feed.
///
/// Устаревший ответ (за время запроса выдано более новое поколение)
/// `PostFeed::apply` отбрасывает сам.
pub(crate) fn run_feed_query(state: AppState, query: FeedQuery) {
    spawn_local(async move {
        let result = api::list_posts(&query)
            .await
            .map_err(|err| err.to_string());
        state.feed.update(|feed| {
            if !feed.apply(&query, result) {
                leptos::logging::warn!(
                    "отброшен устаревший ответ списка постов (страница {})",
                    query.page
                );
            }
        });
    });
}

#[component]
pub fn App() -> impl IntoView {
    let state = AppState::new();

    // Восстанавливаем сессию из localStorage до первого рендера
    // закрытых панелей, чтобы не было ложного "вы не вошли".
    if let Some(token) = storage::load_token() {
        let user = storage::load_user().or_else(|| {
            TokenClaims::parse(&token).ok().map(StoredUser::from)
        });
        state.token.set(Some(token));
        state.user.set(user);
    }
    state.auth_checked.set(true);

    let initial = state.feed.try_update(|feed| feed.refresh());
    if let Some(query) = initial {
        run_feed_query(state, query);
    }

    let user_text = move || {
        state
            .user
            .get()
            .map(|user| format!("{} (id={})", user.username, user.id))
            .unwrap_or_else(|| "гость".to_string())
    };

    let notice_view = move || {
        state.notice.get().map(|(kind, message)| {
            let class = match kind {
                NoticeKind::Error => "notice notice-error",
                NoticeKind::Success => "notice notice-success",
                NoticeKind::Info => "notice notice-info",
            };
            view! {
                <div class=class>
                    {message}
                    <button on:click=move |_| state.clear_notice()>"x"</button>
                </div>
            }
        })
    };

    view! {
        <main class="page">
            <section class="container">
                <header class="navbar">
                    <h1>"Blogi"</h1>
                    <p>"Пользователь: " {user_text}</p>
                </header>

                {notice_view}

                <Show when=move || state.auth_checked.get()>
                    <crate::components::auth_panel::AuthPanel state=state />

                    <Show when=move || state.is_authenticated()>
                        <crate::components::editor_panel::EditorPanel state=state />
                    </Show>

                    <crate::components::feed_panel::FeedPanel state=state />
                </Show>
            </section>
        </main>
    }
}
