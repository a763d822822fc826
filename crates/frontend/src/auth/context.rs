//! Global session context and provider

use crate::session::{clear_unauthorized_callback, create_client, set_unauthorized_callback};
use portal_http::{PortalClient, UserSummary};
use std::ops::Deref;
use std::rc::Rc;
use yew::prelude::*;

/// API client shared through the context; equal when it is the same instance
#[derive(Clone, Debug)]
pub struct SharedClient(Rc<PortalClient>);

impl PartialEq for SharedClient {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Deref for SharedClient {
    type Target = PortalClient;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Session context data
#[derive(Clone, Debug, PartialEq)]
pub struct SessionData {
    pub client: SharedClient,
    pub user: Option<UserSummary>,
    pub authenticated: bool,
    /// Set when the API rejected the stored token
    pub expired: bool,
}

impl SessionData {
    fn new(client: SharedClient) -> Self {
        let authenticated = client.is_authenticated();
        Self {
            client,
            user: None,
            authenticated,
            expired: false,
        }
    }
}

/// Session context actions
pub enum SessionAction {
    SignedIn(UserSummary),
    SignedOut,
    Expired,
}

/// Session context
pub type SessionContext = UseReducerHandle<SessionData>;

impl Reducible for SessionData {
    type Action = SessionAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        match action {
            SessionAction::SignedIn(user) => Rc::new(Self {
                user: Some(user),
                authenticated: true,
                expired: false,
                ..(*self).clone()
            }),
            SessionAction::SignedOut => Rc::new(Self {
                user: None,
                authenticated: false,
                expired: false,
                ..(*self).clone()
            }),
            SessionAction::Expired => Rc::new(Self {
                user: None,
                authenticated: false,
                expired: true,
                ..(*self).clone()
            }),
        }
    }
}

/// Session provider props
#[derive(Properties, PartialEq)]
pub struct SessionProviderProps {
    pub children: Children,
}

/// Builds the API client once and exposes it with the session state
#[function_component(SessionProvider)]
pub fn session_provider(props: &SessionProviderProps) -> Html {
    let client = use_memo((), |_| {
        create_client()
            .map(|client| SharedClient(Rc::new(client)))
            .map_err(|e| e.to_string())
    });

    match &*client {
        Ok(client) => html! {
            <SessionScope client={client.clone()}>
                {props.children.clone()}
            </SessionScope>
        },
        Err(message) => html! {
            <div class="app-error">{format!("The application could not start: {message}")}</div>
        },
    }
}

#[derive(Properties, PartialEq)]
struct SessionScopeProps {
    client: SharedClient,
    children: Children,
}

#[function_component(SessionScope)]
fn session_scope(props: &SessionScopeProps) -> Html {
    let session = {
        let client = props.client.clone();
        use_reducer(move || SessionData::new(client))
    };

    // A 401 anywhere marks the session expired
    {
        let session = session.clone();
        use_effect_with((), move |_| {
            set_unauthorized_callback(Rc::new(move || {
                session.dispatch(SessionAction::Expired);
            }));

            // Cleanup on unmount
            move || {
                clear_unauthorized_callback();
            }
        });
    }

    html! {
        <ContextProvider<SessionContext> context={session}>
            {props.children.clone()}
        </ContextProvider<SessionContext>>
    }
}

/// Hook to use the session context
#[hook]
pub fn use_session() -> SessionContext {
    use_context::<SessionContext>()
        .expect("SessionContext not found. Make sure to wrap your component with SessionProvider")
}

/// Hook to check if a token is stored
#[hook]
pub fn use_is_authenticated() -> bool {
    let session = use_session();
    session.authenticated
}
