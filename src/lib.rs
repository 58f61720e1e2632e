pub mod app;
pub mod seeds;
pub mod site;

use axum::{middleware, Router};

use app::AppState;

/// Build the full application router. Used by main and by integration tests.
/// The request gate wraps every route; public paths pass through it too so
/// tenant context is attached uniformly.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(site::home::routes())
        .merge(app::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            app::gate::middleware::enforce,
        ))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}
