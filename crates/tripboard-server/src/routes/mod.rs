pub mod segments;
pub mod trips;

use axum::Router;

use crate::state::AppState;

pub fn api_router() -> Router<AppState> {
    Router::new()
        .nest("/trips", trips::router())
        .nest("/segments", segments::router())
}
