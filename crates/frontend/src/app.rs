use crate::auth::SessionProvider;
use crate::components::{Home, Login, Profile, Register};
use yew::prelude::*;
use yew_router::prelude::*;

#[derive(Clone, Debug, PartialEq, Routable)]
pub enum Route {
    #[at("/")]
    Home,
    #[at("/login")]
    Login,
    #[at("/register")]
    Register,
    #[at("/profile")]
    Profile,
    #[not_found]
    #[at("/404")]
    NotFound,
}

fn switch(route: Route) -> Html {
    match route {
        Route::Home => html! { <Home /> },
        Route::Login => html! { <Login /> },
        Route::Register => html! { <Register /> },
        Route::Profile => html! { <Profile /> },
        Route::NotFound => html! {
            <section class="not-found">
                <h1>{"Page not found"}</h1>
                <Link<Route> to={Route::Home}>{"Back to the start page"}</Link<Route>>
            </section>
        },
    }
}

#[function_component(App)]
pub fn app() -> Html {
    html! {
        <BrowserRouter>
            <SessionProvider>
                <main class="portal">
                    <Switch<Route> render={switch} />
                </main>
            </SessionProvider>
        </BrowserRouter>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_resolve_from_paths() {
        assert_eq!(Route::recognize("/login"), Some(Route::Login));
        assert_eq!(Route::recognize("/profile"), Some(Route::Profile));
    }

    #[test]
    fn routes_render_their_paths() {
        assert_eq!(Route::Register.to_path(), "/register");
        assert_eq!(Route::Profile.to_path(), "/profile");
    }
}
