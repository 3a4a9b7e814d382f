use leptos::ev::SubmitEvent;
use leptos::prelude::*;
use leptos::task::spawn_local;
use wasm_bindgen::JsCast;

use blogi_core::{ComposeError, NoticeKind, Notifier, PostComposer, SubmitPlan};

use crate::api;
use crate::app::run_feed_query;
use crate::state::AppState;

/// Переводит ошибки валидации черновика в сообщение для баннера.
fn describe_validation(errors: &validator::ValidationErrors) -> String {
    let fields = errors.field_errors();
    if fields.contains_key("title") {
        "Заголовок обязателен и не длиннее 100 символов".to_string()
    } else if fields.contains_key("content") {
        "Содержимое поста не может быть пустым".to_string()
    } else {
        "Проверьте поля формы".to_string()
    }
}

#[component]
pub(crate) fn EditorPanel(state: AppState) -> impl IntoView {
    // web_sys::File не Send, поэтому сигнал локальный для потока.
    let selected_file = RwSignal::new_local(None::<web_sys::File>);

    let notifier = state.notifier();

    let on_file_change = move |ev: leptos::ev::Event| {
        let input = ev
            .target()
            .and_then(|target| target.dyn_into::<web_sys::HtmlInputElement>().ok());
        let file = input.and_then(|input| input.files()).and_then(|files| files.get(0));

        match file {
            Some(file) => {
                state
                    .composer
                    .update(|composer| composer.select_file(file.name(), file.type_()));
                selected_file.set(Some(file));
            }
            None => {
                state.composer.update(PostComposer::clear_file);
                selected_file.set(None);
            }
        }
    };

    let on_cancel_edit = move |_| {
        state.editing.set(None);
        state.composer.set(PostComposer::new());
        selected_file.set(None);
        state.clear_notice();
    };

    let on_submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        state.clear_notice();

        let Some(token) = state.token.get() else {
            notifier.notify(NoticeKind::Error, "Нужна авторизация для публикации");
            return;
        };

        let plan = match state.composer.try_update(|composer| composer.begin_submit()) {
            Some(Ok(plan)) => plan,
            Some(Err(ComposeError::Busy)) => {
                notifier.notify(NoticeKind::Info, "Отправка уже выполняется");
                return;
            }
            Some(Err(ComposeError::Invalid(errors))) => {
                notifier.notify(NoticeKind::Error, &describe_validation(&errors));
                return;
            }
            None => return,
        };

        let editing = state.editing.get_untracked();
        let file = selected_file.get_untracked();

        state.busy.set(true);
        spawn_local(async move {
            let image_url = match plan {
                SubmitPlan::UploadThenSubmit { .. } => match &file {
                    Some(file) => match api::upload_image(&token, file).await {
                        Ok(file_url) => Some(file_url),
                        Err(err) => {
                            state.composer.update(PostComposer::finish_submit);
                            state.busy.set(false);
                            notifier.notify(NoticeKind::Error, &err.to_string());
                            return;
                        }
                    },
                    // Файл пропал из input между выбором и сабмитом.
                    None => None,
                },
                SubmitPlan::SubmitOnly { image_url } => image_url,
            };

            let outcome = match &editing {
                Some(post) => {
                    let patch = state
                        .composer
                        .with_untracked(|composer| composer.patch_with_image(image_url));
                    api::update_post(&token, post.id, &patch).await
                }
                None => {
                    let (title, content) = state.composer.with_untracked(|composer| {
                        (
                            composer.draft().title.clone(),
                            composer.draft().content.clone(),
                        )
                    });
                    api::create_post(&token, &title, image_url.as_deref(), &content).await
                }
            };

            state.composer.update(PostComposer::finish_submit);

            match outcome {
                Ok(_) => {
                    let message = if editing.is_some() {
                        "Пост обновлён"
                    } else {
                        "Пост опубликован"
                    };
                    notifier.notify(NoticeKind::Success, message);

                    state.editing.set(None);
                    state.composer.set(PostComposer::new());
                    selected_file.set(None);

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

    let heading = move || {
        if state.editing.get().is_some() {
            "Edit post"
        } else {
            "Create post"
        }
    };

    let submitting = move || {
        state.busy.get() || state.composer.with(|composer| composer.is_in_flight())
    };

    view! {
        <h2>{heading}</h2>

        <form on:submit=on_submit>
            <input
                placeholder="заголовок"
                prop:value=move || state.composer.with(|composer| composer.draft().title.clone())
                on:input=move |ev| {
                    let value = event_target_value(&ev);
                    state.composer.update(|composer| composer.draft_mut().title = value);
                }
            />
            <textarea
                placeholder="текст поста"
                prop:value=move || state.composer.with(|composer| composer.draft().content.clone())
                on:input=move |ev| {
                    let value = event_target_value(&ev);
                    state.composer.update(|composer| composer.draft_mut().content = value);
                }
            ></textarea>
            <input type="file" accept="image/*" on:change=on_file_change />

            <Show when=move || {
                state.composer.with(|composer| composer.draft().image_url.is_some())
                    && selected_file.with(Option::is_none)
            }>
                <p><small>"Обложка останется прежней, если не выбрать новый файл"</small></p>
            </Show>

            <button type="submit" disabled=submitting>
                {move || if state.editing.get().is_some() { "Save" } else { "Publish" }}
            </button>

            <Show when=move || state.editing.get().is_some()>
                <button
                    type="button"
                    style="margin-left: 0.5rem;"
                    on:click=on_cancel_edit
                    disabled=submitting
                >
                    "Cancel"
                </button>
            </Show>
        </form>

        <hr style="margin: 1rem 0;" />
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    use blogi_core::PostDraft;

    fn errors_for(title: &str, content: &str) -> validator::ValidationErrors {
        let draft = PostDraft {
            title: title.to_string(),
            content: content.to_string(),
            image_url: None,
        };
        draft.validate().expect_err("draft should be invalid")
    }

    #[test]
    fn empty_title_is_reported_first() {
        let message = describe_validation(&errors_for("", "text"));
        assert!(message.contains("Заголовок"));
    }

    #[test]
    fn empty_content_is_reported_when_title_is_fine() {
        let message = describe_validation(&errors_for("Title", ""));
        assert!(message.contains("Содержимое"));
    }
}
