use axum::Router;

use crate::state::SharedState;

pub mod aggregate;
pub mod docs;
pub mod game;
pub mod health;
pub mod leaderboard;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(game::router())
        .merge(leaderboard::router())
        .merge(aggregate::router());

    let docs_router = docs::router(state.clone());

    api_router.merge(docs_router).with_state(state)
}
