use leptos::ev::SubmitEvent;
use leptos::prelude::*;
use leptos::task::spawn_local;

use blogi_core::{NoticeKind, Notifier, Post, PostComposer};

use crate::api;
use crate::app::run_feed_query;
use crate::state::AppState;
use crate::storage::StoredUser;

fn page_label(page: u32, pages: u32, total: u64) -> String {
    format!("Страница {page} из {pages} (всего {total})")
}

fn can_manage(user: Option<&StoredUser>, post: &Post) -> bool {
    user.is_some_and(|user| user.id == post.user_id)
}

#[component]
pub(crate) fn FeedPanel(state: AppState) -> impl IntoView {
    let search_input = RwSignal::new(String::new());

    let notifier = state.notifier();

    let on_search = move |ev: SubmitEvent| {
        ev.prevent_default();
        let term = search_input.get();
        let query = state
            .feed
            .try_update(|feed| feed.set_search(Some(term)));
        if let Some(query) = query {
            run_feed_query(state, query);
        }
    };

    let on_prev = move |_| {
        let query = state.feed.try_update(|feed| feed.prev_page()).flatten();
        if let Some(query) = query {
            run_feed_query(state, query);
        }
    };

    let on_next = move |_| {
        let query = state.feed.try_update(|feed| feed.next_page()).flatten();
        if let Some(query) = query {
            run_feed_query(state, query);
        }
    };

    let on_retry = move |_| {
        let query = state.feed.try_update(|feed| feed.retry());
        if let Some(query) = query {
            run_feed_query(state, query);
        }
    };

    let on_delete = move |post_id: i64| {
        state.clear_notice();

        let Some(token) = state.token.get() else {
            notifier.notify(NoticeKind::Error, "Нужна авторизация для удаления поста");
            return;
        };

        state.busy.set(true);
        spawn_local(async move {
            match api::delete_post(&token, post_id).await {
                Ok(()) => {
                    notifier.notify(NoticeKind::Success, "Пост удалён");
                    let query = state.feed.try_update(|feed| feed.refresh());
                    if let Some(query) = query {
                        run_feed_query(state, query);
                    }
                }
                Err(err) => notifier.notify(NoticeKind::Error, &err.to_string()),
            }
            state.busy.set(false);
        });
    };

    let on_start_edit = move |post: Post| {
        state.composer.set(PostComposer::for_edit(&post));
        state.editing.set(Some(post));
    };

    view! {
        <h2>"Posts"</h2>

        <form on:submit=on_search>
            <input
                placeholder="поиск по заголовку и тексту"
                prop:value=move || search_input.get()
                on:input=move |ev| search_input.set(event_target_value(&ev))
            />
            <button type="submit" disabled=move || state.feed.with(|feed| feed.is_loading())>
                "Search"
            </button>
        </form>

        <Show when=move || state.feed.with(|feed| feed.error().is_some())>
            <div class="error-banner">
                <strong>"Ошибка загрузки: "</strong>
                {move || state.feed.with(|feed| feed.error().unwrap_or_default().to_string())}
                <button on:click=on_retry>"Попробовать ещё раз"</button>
            </div>
        </Show>

        <Show when=move || state.feed.with(|feed| feed.is_loading())>
            <p>"Загрузка..."</p>
        </Show>

        <p>{move || state.feed.with(|feed| page_label(feed.page(), feed.pages(), feed.total()))}</p>

        <div>
            <button
                on:click=on_prev
                disabled=move || {
                    state.feed.with(|feed| !feed.can_go_prev() || feed.is_loading())
                }
            >
                "Previous"
            </button>
            <button
                style="margin-left: 0.5rem;"
                on:click=on_next
                disabled=move || {
                    state.feed.with(|feed| !feed.can_go_next() || feed.is_loading())
                }
            >
                "Next"
            </button>
        </div>

        <ul>
            <For
                each=move || state.feed.with(|feed| feed.items().to_vec())
                key=|post| (post.id, post.updated_at)
                children=move |post| {
                    let post_id = post.id;
                    let post_for_edit = post.clone();
                    let manageable = {
                        let post = post.clone();
                        move || state.user.with(|user| can_manage(user.as_ref(), &post))
                    };

                    view! {
                        <li class="post-card" style="margin-bottom: 0.5rem;">
                            <strong>{post.title.clone()}</strong>
                            {post.image_url.clone().map(|image_url| view! {
                                <div>
                                    <img src=image_url alt="обложка" style="max-width: 16rem;" />
                                </div>
                            })}
                            <div>{post.content.clone()}</div>
                            <small>
                                {format!(
                                    "автор: {}, обновлён {}",
                                    post.author_username,
                                    post.updated_at.format("%Y-%m-%d %H:%M")
                                )}
                            </small>

                            <Show when=manageable.clone()>
                                <div style="margin-top: 0.25rem;">
                                    <button
                                        on:click={
                                            let post_for_edit = post_for_edit.clone();
                                            move |_| on_start_edit(post_for_edit.clone())
                                        }
                                        disabled=move || state.busy.get()
                                    >
                                        "Edit"
                                    </button>
                                    <button
                                        style="margin-left: 0.5rem;"
                                        on:click=move |_| on_delete(post_id)
                                        disabled=move || state.busy.get()
                                    >
                                        "Delete"
                                    </button>
                                </div>
                            </Show>
                        </li>
                    }
                }
            />
        </ul>
    }
}
