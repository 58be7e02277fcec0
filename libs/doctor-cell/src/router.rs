use std::sync::Arc;

use axum::{
    Router,
    routing::{get, put},
    middleware,
};

use shared_utils::AppState;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn doctor_routes(state: Arc<AppState>) -> Router {
    let public_routes = Router::new()
        .route("/{doctor_id}/available-slots", get(handlers::get_available_slots_public));

    let protected_routes = Router::new()
        .route(
            "/{doctor_id}/availability",
            get(handlers::get_doctor_availability).post(handlers::create_availability),
        )
        .route(
            "/{doctor_id}/availability/{availability_id}",
            put(handlers::update_availability).delete(handlers::delete_availability),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
