use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod accessibility;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod error;
pub mod handlers;
pub mod identity;
pub mod models;
pub mod repository;

// Routing segregation (Public, Authenticated, Company).
pub mod routes;
use auth::AuthUser;
use routes::{authenticated, company, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use error::ApiError;
pub use identity::{IdentityState, MockIdentityProvider, SupabaseIdentityClient};
pub use repository::{PostgresRepository, RepositoryState};

/// ApiDoc
///
/// OpenAPI document aggregated from the `#[utoipa::path]` handlers and `ToSchema` models,
/// served at `/api-docs/openapi.json` and browsable at `/swagger-ui`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::register, handlers::login, handlers::logout, handlers::get_me,
        handlers::update_profile, handlers::list_courses, handlers::get_course,
        handlers::enroll_in_course, handlers::update_course_progress, handlers::list_jobs,
        handlers::apply_to_job, handlers::create_job, handlers::list_company_jobs,
        handlers::update_job_status, handlers::list_job_applications,
        handlers::update_application_status, handlers::list_companies,
        handlers::get_dashboard, handlers::get_accessibility,
        handlers::apply_accessibility_action, handlers::list_consulting_services,
        handlers::get_impact_stats
    ),
    components(
        schemas(
            models::UserKind, models::Profile, models::Company, models::CompanySummary,
            models::Job, models::JobStatus, models::JobListing, models::CompanyJob,
            models::Application, models::ApplicationStatus, models::ApplicationSummary,
            models::Applicant, models::Course, models::CourseListing, models::CourseDetail,
            models::Enrollment, models::EnrollmentSummary, models::RegisterRequest,
            models::RegistrationDetails, models::PcdRegistration, models::CompanyRegistration,
            models::RegisteredUser, models::LoginRequest, models::SessionResponse,
            models::UpdateProfileRequest, models::MeResponse, models::CreateJobRequest,
            models::UpdateJobStatusRequest, models::UpdateApplicationStatusRequest,
            models::UpdateProgressRequest, models::PcdStats, models::PcdDashboard,
            models::CompanyDashboard, models::DashboardResponse, models::ImpactStats,
            accessibility::AccessibilitySettings, catalog::ConsultingService,
            error::ErrorBody,
        )
    ),
    tags(
        (name = "inclusao-portal", description = "Inclusive employment and training portal API")
    )
)]
pub struct ApiDoc;

/// AppState
///
/// The single, immutable container of shared services, cloned into every request.
#[derive(Clone)]
pub struct AppState {
    /// Persistence layer (Postgres in production).
    pub repo: RepositoryState,
    /// Hosted authentication provider (Supabase Auth in production).
    pub identity: IdentityState,
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for IdentityState {
    fn from_ref(app_state: &AppState) -> IdentityState {
        app_state.identity.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Guards the authenticated and company routers: extracting `AuthUser` fails with 401
/// before the handler runs when the request carries no valid session.
async fn auth_middleware(_auth_user: AuthUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles the routing tree, applies the scoped auth layer and the global
/// observability layers, and registers the application state.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(
            authenticated::authenticated_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        // Company kind is checked inside the handlers, after authentication.
        .nest(
            "/company",
            company::company_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Opens the per-request span with method, URI and the `x-request-id` set by
/// `SetRequestIdLayer`, so every log line of a request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
