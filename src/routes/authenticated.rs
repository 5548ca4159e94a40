use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post, put},
};

/// Authenticated Router Module
///
/// Routes for any signed-in account. Every handler receives a validated `AuthUser`;
/// actions reserved to one account kind (applying to a job) check it in the handler.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // --- Session ---
        .route("/logout", post(handlers::logout))
        // GET /me
        // Identity, profile and company row of the caller.
        .route("/me", get(handlers::get_me))
        .route("/me/profile", put(handlers::update_profile))
        .route("/dashboard", get(handlers::get_dashboard))
        // --- Accessibility toolbar ---
        .route("/me/accessibility", get(handlers::get_accessibility))
        .route(
            "/me/accessibility/{action}",
            post(handlers::apply_accessibility_action),
        )
        // --- Learning ---
        // POST /courses/{id}/enroll
        // One enrollment per user and course; a duplicate answers 409.
        .route("/courses/{id}/enroll", post(handlers::enroll_in_course))
        .route("/courses/{id}/progress", put(handlers::update_course_progress))
        // --- Jobs ---
        // POST /jobs/{id}/apply
        // PCD accounts only. One application per user and job.
        .route("/jobs/{id}/apply", post(handlers::apply_to_job))
}
