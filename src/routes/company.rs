use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, put},
};

/// Company Router Module
///
/// The hiring side of the platform: job management and candidate review.
///
/// Access Control:
/// Mounted under `/company` behind the authentication layer. Each handler resolves the
/// caller's `empresas` row, rejecting PCD accounts with 403, and every query is scoped
/// to that company so jobs and applications of other companies answer 404.
pub fn company_routes() -> Router<AppState> {
    Router::new()
        // GET/POST /company/jobs
        .route(
            "/jobs",
            get(handlers::list_company_jobs).post(handlers::create_job),
        )
        // PUT /company/jobs/{id}/status
        // Opens (`ativa`) or closes (`inativa`) a job.
        .route("/jobs/{id}/status", put(handlers::update_job_status))
        .route(
            "/jobs/{id}/applications",
            get(handlers::list_job_applications),
        )
        // PUT /company/applications/{id}/status
        .route(
            "/applications/{id}/status",
            put(handlers::update_application_status),
        )
}
