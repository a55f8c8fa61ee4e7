use axum::Router;

use crate::state::SharedState;

pub mod docs;
pub mod form;
pub mod health;
pub mod settings;
pub mod settlement;
pub mod sse;

/// Compose all route trees and bind them to the shared state.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(sse::router())
        .merge(form::router())
        .merge(settings::router())
        .merge(settlement::router())
        .merge(docs::router());

    api_router.with_state(state)
}
