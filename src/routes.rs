use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{applications, auth, companies, jobs, system, users};
use crate::middleware::fallback::{method_not_allowed, route_not_found};
use crate::state::AppState;

/// Build the full application router
pub fn app(state: AppState) -> Router {
    let enable_cors = state.config.security.enable_cors;

    let router = Router::new()
        // Public
        .route("/", get(system::root))
        .route("/health", get(system::health))
        .merge(auth_routes())
        .merge(company_routes())
        .merge(user_routes())
        .merge(job_routes())
        .merge(application_routes())
        .fallback(route_not_found)
        .layer(middleware::from_fn(method_not_allowed))
        .layer(TraceLayer::new_for_http());

    let router = if enable_cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    };

    router.with_state(state)
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/user-auth", post(auth::user_login))
        .route("/company-auth", post(auth::company_login))
}

fn company_routes() -> Router<AppState> {
    Router::new()
        .route("/companies", get(companies::list).post(companies::create))
        .route(
            "/companies/:handle",
            get(companies::get)
                .patch(companies::update)
                .delete(companies::delete),
        )
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(users::list).post(users::create))
        .route(
            "/users/:username",
            get(users::get).patch(users::update).delete(users::delete),
        )
}

fn job_routes() -> Router<AppState> {
    Router::new()
        .route("/jobs", get(jobs::list).post(jobs::create))
        .route(
            "/jobs/:id",
            get(jobs::get).patch(jobs::update).delete(jobs::delete),
        )
}

fn application_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/jobs/:id/applications",
            get(applications::list).post(applications::apply),
        )
        .route(
            "/jobs/:id/applications/:application_id",
            get(applications::get).delete(applications::delete),
        )
}
