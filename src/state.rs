use std::sync::Arc;

use crate::auth::profile::ProfileClient;
use crate::config::Config;
use crate::notify::Notifier;
use crate::scan::Scanner;
use crate::session::SessionStore;
use crate::ticket::TicketBackend;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub config: Config,
    pub sessions: SessionStore,
    pub scanner: Scanner,
    pub backend: Arc<dyn TicketBackend>,
    pub notifier: Notifier,
    pub profiles: ProfileClient,
    /// General-purpose client for the token exchange.
    pub http: reqwest::Client,
}
