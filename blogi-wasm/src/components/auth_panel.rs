use leptos::ev::SubmitEvent;
use leptos::prelude::*;
use leptos::task::spawn_local;

use blogi_core::{NoticeKind, Notifier, TokenClaims};

use crate::api;
use crate::state::AppState;
use crate::storage::{self, StoredUser};

/// Сохраняет токен и личность пользователя после успешного входа.
fn store_session(state: &AppState, token: String) -> Result<(), String> {
    let claims =
        TokenClaims::parse(&token).map_err(|_| "сервер вернул нечитаемый токен".to_string())?;
    let user = StoredUser::from(claims);

    storage::save_token(&token)?;
    storage::save_user(&user)?;

    state.token.set(Some(token));
    state.user.set(Some(user));
    Ok(())
}

#[component]
pub(crate) fn AuthPanel(state: AppState) -> impl IntoView {
    let reg_username = RwSignal::new(String::new());
    let reg_email = RwSignal::new(String::new());
    let reg_password = RwSignal::new(String::new());

    let login_username = RwSignal::new(String::new());
    let login_password = RwSignal::new(String::new());

    let notifier = state.notifier();

    let on_register = move |ev: SubmitEvent| {
        ev.prevent_default();
        state.clear_notice();

        let username = reg_username.get().trim().to_string();
        let email = reg_email.get().trim().to_string();
        let password = reg_password.get().trim().to_string();

        if username.is_empty() || email.is_empty() || password.is_empty() {
            notifier.notify(NoticeKind::Error, "Заполните все поля регистрации");
            return;
        }

        state.busy.set(true);
        spawn_local(async move {
            // Токен при регистрации не выдаётся, поэтому сразу за ней
            // следует вход с теми же учётными данными.
            let outcome = async {
                api::register(&username, &email, &password)
                    .await
                    .map_err(|err| err.to_string())?;
                let token = api::login(&username, &password)
                    .await
                    .map_err(|err| err.to_string())?;
                store_session(&state, token.access_token)
            }
            .await;

            match outcome {
                Ok(()) => notifier.notify(NoticeKind::Success, "Регистрация успешна"),
                Err(err) => notifier.notify(NoticeKind::Error, &err),
            }
            state.busy.set(false);
        });
    };

    let on_login = move |ev: SubmitEvent| {
        ev.prevent_default();
        state.clear_notice();

        let username = login_username.get().trim().to_string();
        let password = login_password.get().trim().to_string();

        if username.is_empty() || password.is_empty() {
            notifier.notify(NoticeKind::Error, "Заполните все поля входа");
            return;
        }

        state.busy.set(true);
        spawn_local(async move {
            let outcome = match api::login(&username, &password).await {
                Ok(token) => store_session(&state, token.access_token),
                Err(err) => Err(err.to_string()),
            };

            match outcome {
                Ok(()) => notifier.notify(NoticeKind::Success, "Вход выполнен"),
                Err(err) => notifier.notify(NoticeKind::Error, &err),
            }
            state.busy.set(false);
        });
    };

    let on_logout = move |_| {
        if let Err(err) = storage::clear_token() {
            notifier.notify(NoticeKind::Error, &err);
            return;
        }
        if let Err(err) = storage::clear_user() {
            notifier.notify(NoticeKind::Error, &err);
            return;
        }
        state.token.set(None);
        state.user.set(None);
        state.editing.set(None);
        state.clear_notice();
    };

    view! {
        <Show when=move || state.is_authenticated()>
            <button on:click=on_logout disabled=move || state.busy.get()>
                "Logout"
            </button>
        </Show>

        <Show when=move || !state.is_authenticated()>
            <h2>"Register"</h2>
            <form on:submit=on_register>
                <input
                    placeholder="username"
                    on:input=move |ev| reg_username.set(event_target_value(&ev))
                />
                <input
                    placeholder="email"
                    on:input=move |ev| reg_email.set(event_target_value(&ev))
                />
                <input
                    placeholder="password"
                    type="password"
                    on:input=move |ev| reg_password.set(event_target_value(&ev))
                />
                <button type="submit" disabled=move || state.busy.get()>"Register"</button>
            </form>

            <h2 style="margin-top: 1rem;">"Login"</h2>
            <form on:submit=on_login>
                <input
                    placeholder="username"
                    on:input=move |ev| login_username.set(event_target_value(&ev))
                />
                <input
                    placeholder="password"
                    type="password"
                    on:input=move |ev| login_password.set(event_target_value(&ev))
                />
                <button type="submit" disabled=move || state.busy.get()>"Login"</button>
            </form>
        </Show>

        <hr style="margin: 1rem 0;" />
    }
}
