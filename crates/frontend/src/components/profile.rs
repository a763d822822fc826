//! Profile page: view, edit and log out

use crate::app::Route;
use crate::auth::{SessionAction, use_session};
use crate::components::{LoadingSpinner, TextField};
use crate::forms::{FormAction, FormFailure, FormState};
use gloo::timers::callback::Timeout;
use portal_http::{ClientError, ProfileChanges, UserProfile, UserSummary};
use yew::prelude::*;
use yew_router::prelude::*;

const FIELDS: &[&str] = &["username", "email", "first_name", "last_name"];

/// How long the "profile updated" banner stays up
const SUCCESS_BANNER_MS: u32 = 3000;

#[derive(Clone, Debug, PartialEq)]
enum ProfileState {
    Loading,
    Loaded(UserProfile),
    Error(String),
}

/// Form values for editing `profile`
fn form_values(profile: &UserProfile) -> Vec<(String, String)> {
    let field = |value: &Option<String>| value.clone().unwrap_or_default();
    vec![
        ("username".to_string(), profile.username.clone()),
        ("email".to_string(), field(&profile.email)),
        ("first_name".to_string(), field(&profile.first_name)),
        ("last_name".to_string(), field(&profile.last_name)),
    ]
}

/// Only the fields the form changed; a PATCH must not resend the rest
fn changes_between(profile: &UserProfile, form: &FormState) -> ProfileChanges {
    let changed = |current: Option<&str>, field: &str| {
        let edited = form.value(field);
        (edited != current.unwrap_or_default()).then(|| edited.to_string())
    };

    ProfileChanges {
        username: changed(Some(profile.username.as_str()), "username"),
        email: changed(profile.email.as_deref(), "email"),
        first_name: changed(profile.first_name.as_deref(), "first_name"),
        last_name: changed(profile.last_name.as_deref(), "last_name"),
    }
}

#[function_component(Profile)]
pub fn profile() -> Html {
    let session = use_session();
    let navigator = use_navigator();
    let state = use_state(|| ProfileState::Loading);
    let editing = use_state(|| false);
    let form = use_reducer(|| FormState::new(FIELDS));
    let banner = use_state(|| Option::<String>::None);
    let banner_timer = use_mut_ref(|| Option::<Timeout>::None);

    // Fetch on mount, or leave for the login page without a token
    {
        let session = session.clone();
        let state = state.clone();
        let navigator = navigator.clone();
        use_effect_with((), move |_| {
            if session.client.is_authenticated() {
                wasm_bindgen_futures::spawn_local(async move {
                    match session.client.get_profile().await {
                        Ok(profile) => {
                            session.dispatch(SessionAction::SignedIn(UserSummary {
                                id: profile.id,
                                username: profile.username.clone(),
                            }));
                            state.set(ProfileState::Loaded(profile));
                        }
                        Err(ClientError::Unauthorized(_)) => {
                            if let Some(navigator) = navigator {
                                navigator.replace(&Route::Login);
                            }
                        }
                        Err(e) => {
                            tracing::warn!("Failed to load profile: {e}");
                            state.set(ProfileState::Error(e.user_message()));
                        }
                    }
                });
            } else if let Some(navigator) = navigator {
                navigator.replace(&Route::Login);
            }
            || ()
        });
    }

    let on_edit = |field: &'static str| {
        let form = form.clone();
        Callback::from(move |value: String| {
            form.dispatch(FormAction::Edit {
                field: field.to_string(),
                value,
            });
        })
    };

    let on_start_edit = {
        let state = state.clone();
        let editing = editing.clone();
        let form = form.clone();
        Callback::from(move |_: MouseEvent| {
            if let ProfileState::Loaded(profile) = &*state {
                form.dispatch(FormAction::Reset(form_values(profile)));
                editing.set(true);
            }
        })
    };

    let on_cancel = {
        let editing = editing.clone();
        Callback::from(move |_: MouseEvent| editing.set(false))
    };

    // Save once the form has accepted a submission
    {
        let session = session.clone();
        let state = state.clone();
        let editing = editing.clone();
        let form = form.clone();
        let banner = banner.clone();
        let banner_timer = banner_timer.clone();
        let navigator = navigator.clone();
        use_effect_with(form.submission(), move |submission| {
            let accepted = *submission > 0 && form.is_submitting();
            if accepted && let ProfileState::Loaded(current) = &*state {
                let changes = changes_between(current, &form);
                let state = state.clone();

                wasm_bindgen_futures::spawn_local(async move {
                    match session.client.update_profile(&changes).await {
                        Ok(updated) => {
                            form.dispatch(FormAction::Succeeded);
                            session.dispatch(SessionAction::SignedIn(UserSummary {
                                id: updated.id,
                                username: updated.username.clone(),
                            }));
                            state.set(ProfileState::Loaded(updated));
                            editing.set(false);

                            banner.set(Some("Profile updated successfully.".to_string()));
                            let timeout = {
                                let banner = banner.clone();
                                Timeout::new(SUCCESS_BANNER_MS, move || banner.set(None))
                            };
                            // Replacing the handle cancels an earlier timer
                            *banner_timer.borrow_mut() = Some(timeout);
                        }
                        Err(ClientError::Unauthorized(_)) => {
                            if let Some(navigator) = navigator {
                                navigator.replace(&Route::Login);
                            }
                        }
                        Err(e) => {
                            tracing::debug!("Profile update failed: {e}");
                            form.dispatch(FormAction::Failed(FormFailure::from(&e)));
                        }
                    }
                });
            }
            || ()
        });
    }

    let onsubmit = {
        let form = form.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            form.dispatch(FormAction::Submit);
        })
    };

    let on_logout = {
        let session = session.clone();
        let navigator = navigator.clone();
        Callback::from(move |_: MouseEvent| {
            if let Err(e) = session.client.logout() {
                tracing::warn!("Failed to clear session token: {e}");
            }
            session.dispatch(SessionAction::SignedOut);
            if let Some(navigator) = &navigator {
                navigator.push(&Route::Login);
            }
        })
    };

    let profile = match &*state {
        ProfileState::Loading => {
            return html! { <LoadingSpinner text={Some("Loading profile...".to_string())} /> };
        }
        ProfileState::Error(message) => {
            return html! {
                <section class="profile">
                    <div class="banner banner-error" role="alert">{message}</div>
                    <button onclick={on_logout}>{"Log out"}</button>
                </section>
            };
        }
        ProfileState::Loaded(profile) => profile,
    };

    let busy = form.is_submitting();

    html! {
        <section class="profile">
            <h1>{"Your profile"}</h1>
            if let Some(message) = &*banner {
                <div class="banner banner-success" role="status">{message}</div>
            }
            if *editing {
                if let Some(error) = form.general_error() {
                    <div class="banner banner-error" role="alert">{error}</div>
                }
                <form {onsubmit} novalidate={true}>
                    <TextField
                        label="Username"
                        name="username"
                        value={form.value("username").to_string()}
                        errors={form.errors_for("username")}
                        disabled={busy}
                        oninput={on_edit("username")}
                    />
                    <TextField
                        label="Email"
                        name="email"
                        input_type="email"
                        value={form.value("email").to_string()}
                        errors={form.errors_for("email")}
                        disabled={busy}
                        oninput={on_edit("email")}
                    />
                    <TextField
                        label="First name"
                        name="first_name"
                        value={form.value("first_name").to_string()}
                        errors={form.errors_for("first_name")}
                        disabled={busy}
                        oninput={on_edit("first_name")}
                    />
                    <TextField
                        label="Last name"
                        name="last_name"
                        value={form.value("last_name").to_string()}
                        errors={form.errors_for("last_name")}
                        disabled={busy}
                        oninput={on_edit("last_name")}
                    />
                    <div class="form-actions">
                        <button type="submit" disabled={busy}>
                            { if busy { "Saving..." } else { "Save" } }
                        </button>
                        <button type="button" onclick={on_cancel} disabled={busy}>{"Cancel"}</button>
                    </div>
                </form>
            } else {
                <dl class="profile-details">
                    <dt>{"Username"}</dt>
                    <dd>{&profile.username}</dd>
                    <dt>{"Name"}</dt>
                    <dd>{profile.full_name().unwrap_or_else(|| "Not set".to_string())}</dd>
                    <dt>{"Email"}</dt>
                    <dd>{profile.email.clone().unwrap_or_else(|| "Not set".to_string())}</dd>
                    if let Some(created_at) = profile.created_at {
                        <dt>{"Member since"}</dt>
                        <dd>{created_at.format("%B %-d, %Y").to_string()}</dd>
                    }
                </dl>
                <div class="form-actions">
                    <button onclick={on_start_edit}>{"Edit profile"}</button>
                    <button onclick={on_logout}>{"Log out"}</button>
                </div>
            }
        </section>
    }
}
