//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Json, Router,
    extract::FromRef,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};

use crate::{
    AppState, Error,
    auth::{AuthState, auth_guard},
    endpoints,
    export::export_transactions,
    log_in::post_log_in,
    log_out::get_log_out,
    register_user::register_user,
    stats::{get_spending_projection, get_transaction_stats},
    transaction::{create_transaction_endpoint, get_transactions_endpoint},
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::COFFEE, get(get_coffee))
        .route(endpoints::LOG_IN, post(post_log_in))
        .route(endpoints::LOG_OUT, get(get_log_out))
        .route(endpoints::USERS, post(register_user));

    let protected_routes = Router::new()
        .route(
            endpoints::TRANSACTIONS,
            get(get_transactions_endpoint).post(create_transaction_endpoint),
        )
        .route(endpoints::STATS, get(get_transaction_stats))
        .route(endpoints::PREDICT, get(get_spending_projection))
        .route(endpoints::EXPORT, get(export_transactions))
        .layer(middleware::from_fn_with_state(
            AuthState::from_ref(&state),
            auth_guard,
        ));

    protected_routes
        .merge(unprotected_routes)
        .fallback(get_unknown_route)
        .with_state(state)
}

/// Attempt to get a cup of coffee from the server.
async fn get_coffee() -> Response {
    (
        StatusCode::IM_A_TEAPOT,
        Json(serde_json::json!({ "error": "I'm a teapot" })),
    )
        .into_response()
}

/// Fallback handler for requests that match no route.
async fn get_unknown_route() -> Response {
    Error::NotFound.into_response()
}
