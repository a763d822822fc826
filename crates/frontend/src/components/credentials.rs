//! Login and registration forms
//!
//! Both collect a username and password and differ only in the call they
//! make and their wording.

use crate::app::Route;
use crate::auth::{SessionAction, use_session};
use crate::components::{LoadingSpinner, TextField};
use crate::forms::{FormAction, FormFailure, FormState};
use yew::prelude::*;
use yew_router::prelude::*;

const FIELDS: &[&str] = &["username", "password"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CredentialsMode {
    Login,
    Register,
}

impl CredentialsMode {
    fn title(self) -> &'static str {
        match self {
            Self::Login => "Log in",
            Self::Register => "Create an account",
        }
    }

    fn submit_label(self, busy: bool) -> &'static str {
        match (self, busy) {
            (Self::Login, false) => "Log in",
            (Self::Login, true) => "Logging in...",
            (Self::Register, false) => "Register",
            (Self::Register, true) => "Creating account...",
        }
    }

    /// Prompt, target and label of the link to the other form
    fn switch(self) -> (&'static str, Route, &'static str) {
        match self {
            Self::Login => ("No account yet? ", Route::Register, "Register"),
            Self::Register => ("Already registered? ", Route::Login, "Log in"),
        }
    }
}

#[derive(Properties, Clone, PartialEq)]
pub struct CredentialsFormProps {
    pub mode: CredentialsMode,
}

#[function_component(CredentialsForm)]
pub fn credentials_form(props: &CredentialsFormProps) -> Html {
    let mode = props.mode;
    let session = use_session();
    let navigator = use_navigator();
    let form = use_reducer(|| FormState::new(FIELDS));

    // The request starts only once the form has accepted a submission
    {
        let form = form.clone();
        let session = session.clone();
        use_effect_with(form.submission(), move |submission| {
            if *submission > 0 && form.is_submitting() {
                let username = form.value("username").to_string();
                let password = form.value("password").to_string();

                wasm_bindgen_futures::spawn_local(async move {
                    let result = match mode {
                        CredentialsMode::Login => session.client.login(&username, &password).await,
                        CredentialsMode::Register => {
                            session.client.register(&username, &password).await
                        }
                    };

                    match result {
                        Ok(auth) => {
                            form.dispatch(FormAction::Succeeded);
                            session.dispatch(SessionAction::SignedIn(auth.user));
                            if let Some(navigator) = navigator {
                                navigator.push(&Route::Profile);
                            }
                        }
                        Err(e) => {
                            tracing::debug!(?mode, "Credentials rejected: {e}");
                            form.dispatch(FormAction::Failed(FormFailure::from(&e)));
                        }
                    }
                });
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

    let onsubmit = {
        let form = form.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            form.dispatch(FormAction::Submit);
        })
    };

    let busy = form.is_submitting();
    let (switch_prompt, switch_route, switch_label) = mode.switch();

    html! {
        <section class="auth-form">
            <h1>{mode.title()}</h1>
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
                    label="Password"
                    name="password"
                    input_type="password"
                    value={form.value("password").to_string()}
                    errors={form.errors_for("password")}
                    disabled={busy}
                    oninput={on_edit("password")}
                />
                <button type="submit" disabled={busy}>{mode.submit_label(busy)}</button>
            </form>
            if busy {
                <LoadingSpinner />
            }
            <p class="auth-switch">
                {switch_prompt}
                <Link<Route> to={switch_route}>{switch_label}</Link<Route>>
            </p>
        </section>
    }
}

#[function_component(Login)]
pub fn login() -> Html {
    html! { <CredentialsForm mode={CredentialsMode::Login} /> }
}

#[function_component(Register)]
pub fn register() -> Html {
    html! { <CredentialsForm mode={CredentialsMode::Register} /> }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_form_links_to_the_other() {
        assert_eq!(CredentialsMode::Login.switch().1, Route::Register);
        assert_eq!(CredentialsMode::Register.switch().1, Route::Login);
    }

    #[test]
    fn submit_label_reflects_busy_state() {
        assert_eq!(CredentialsMode::Register.submit_label(false), "Register");
        assert_eq!(CredentialsMode::Login.submit_label(true), "Logging in...");
    }
}
