pub mod directory;
pub mod enrich;
pub mod health;
pub mod tables;

use axum::Router;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(enrich::router())
        .merge(tables::router())
        .merge(directory::router())
}
