use crate::api::Api;
use crate::dto::Screen;
use crate::models::User;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::info;

/// Point-in-time copy of the session context.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub user: User,
    pub is_authenticated: bool,
    pub is_loading: bool,
}

/// Holder of the current user and the authenticated flag.
///
/// Owned by the application state and handed out by reference; nothing else
/// keeps a copy of who is signed in.
#[derive(Debug, Default)]
pub struct SessionContext {
    state: RwLock<SessionSnapshot>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.state.read().await.clone()
    }

    pub async fn user(&self) -> Option<User> {
        let state = self.state.read().await;
        state.is_authenticated.then(|| state.user.clone())
    }

    /// Re-fetch the current user. On success the context is populated and
    /// `true` returned; on failure the context is left as it was.
    pub async fn check_auth_user(&self, api: &Api) -> bool {
        self.state.write().await.is_loading = true;

        let current = api.get_current_user().await;

        let mut state = self.state.write().await;
        state.is_loading = false;
        match current {
            Some(user) => {
                info!("Authenticated as {}", user.email);
                state.user = user;
                state.is_authenticated = true;
                true
            }
            None => false,
        }
    }

    /// Startup check: where the client should land.
    pub async fn restore(&self, api: &Api) -> Screen {
        if self.check_auth_user(api).await {
            Screen::Home
        } else {
            Screen::SignIn
        }
    }

    /// End the remote session and clear the context. The context is reset
    /// even when the remote call fails.
    pub async fn sign_out(&self, api: &Api) -> Screen {
        if api.sign_out_account().await.is_none() {
            info!("Remote sign-out failed; clearing local session anyway");
        }
        self.reset().await;
        Screen::SignIn
    }

    pub async fn reset(&self) {
        let mut state = self.state.write().await;
        state.user = User::empty();
        state.is_authenticated = false;
    }
}
