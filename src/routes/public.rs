use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints accessible to any client: the account gateway (register, login), the
/// course and job catalogs, partner companies and the static landing page content.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for monitoring and load balancers.
        .route("/health", get(|| async { "ok" }))
        // POST /register
        // Account creation at the auth provider plus the local profile (and company) rows.
        .route("/register", post(handlers::register))
        // POST /login
        .route("/login", post(handlers::login))
        // GET /courses?category=...&level=...
        .route("/courses", get(handlers::list_courses))
        // GET /courses/{id}
        .route("/courses/{id}", get(handlers::get_course))
        // GET /jobs
        // Only active jobs are listed.
        .route("/jobs", get(handlers::list_jobs))
        .route("/companies", get(handlers::list_companies))
        .route("/consulting/services", get(handlers::list_consulting_services))
        .route("/stats/impact", get(handlers::get_impact_stats))
}
