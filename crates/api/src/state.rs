use std::sync::Arc;

use semadepth_session::Session;
use tokio::sync::Mutex;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable. The server hosts a single measurement session.
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<Mutex<Session>>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(session: Session, config: ServerConfig) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
            config: Arc::new(config),
        }
    }
}
