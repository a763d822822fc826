//! Landing page

use crate::app::Route;
use crate::auth::{use_is_authenticated, use_session};
use portal_http::UserSummary;
use yew::prelude::*;
use yew_router::prelude::Link;

fn greeting(user: Option<&UserSummary>) -> String {
    match user {
        Some(user) => format!("Welcome back, {}!", user.username),
        None => "Welcome!".to_string(),
    }
}

#[function_component(Home)]
pub fn home() -> Html {
    let session = use_session();
    let authenticated = use_is_authenticated();

    html! {
        <section class="home">
            <h1>{"Member Portal"}</h1>
            if session.expired {
                <p class="banner banner-warning">
                    {"Your session has expired. Please log in again."}
                </p>
            }
            if authenticated {
                <p class="greeting">{greeting(session.user.as_ref())}</p>
                <nav class="home-links">
                    <Link<Route> to={Route::Profile}>{"Go to your profile"}</Link<Route>>
                </nav>
            } else {
                <nav class="home-links">
                    <Link<Route> to={Route::Register}>{"Create an account"}</Link<Route>>
                    <Link<Route> to={Route::Login}>{"Log in"}</Link<Route>>
                </nav>
            }
        </section>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greets_known_user_by_name() {
        let user = UserSummary {
            id: 7,
            username: "alice".to_string(),
        };
        assert_eq!(greeting(Some(&user)), "Welcome back, alice!");
        assert_eq!(greeting(None), "Welcome!");
    }
}
