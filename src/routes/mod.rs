use axum::{
    routing::get,
    Router,
};

use crate::config::AppState;
use crate::handlers::{
    call_next, enqueue, get_by_position, health_check, list_queue, remove_by_position,
    service_info,
};

/// Create API router
pub fn create_router(state: AppState) -> Router {
    // Health check route (outside the queue surface)
    let health_routes = Router::new()
        .route("/health", get(health_check));

    // Queue routes: the four operations and two queries
    let queue_routes = Router::new()
        .route("/queue", get(list_queue).post(enqueue).put(call_next))
        .route(
            "/queue/:position",
            get(get_by_position).delete(remove_by_position),
        );

    // Combine routes
    Router::new()
        .route("/", get(service_info))
        .merge(health_routes)
        .merge(queue_routes)
        .with_state(state)
}
