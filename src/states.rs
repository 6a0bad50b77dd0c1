use crate::{api::Api, session::SessionContext};
use std::sync::Arc;

// ============================================================================
// APPLICATION STATE - Shared by every request handler
// ============================================================================
/// One process is one client: a single session context, shared by the
/// handlers through an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub api: Api,
    pub session: Arc<SessionContext>,
}

impl AppState {
    pub fn new(api: Api) -> Self {
        Self {
            api,
            session: Arc::new(SessionContext::new()),
        }
    }
}
