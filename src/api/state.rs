use std::sync::Arc;

use crate::overlay::OverlayPoller;
use crate::session::SessionService;

#[derive(Clone)]
pub struct AppState {
    pub session: Arc<SessionService>,
    pub poller: Arc<OverlayPoller>,
}
