//! Session read models and display settings.
//!
//! ```text
//! GET  /session                     get_session
//! GET  /log                         get_log
//! PUT  /settings/unit               set_unit
//! PUT  /settings/accurate-mode      set_accurate_mode
//! ```

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::session;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/session", get(session::get_session))
        .route("/log", get(session::get_log))
        .route("/settings/unit", put(session::set_unit))
        .route("/settings/accurate-mode", put(session::set_accurate_mode))
}
