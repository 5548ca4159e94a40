use crate::{
    AppState,
    accessibility::{AccessibilitySettings, ToolbarAction},
    auth::{AuthUser, bearer_token},
    catalog::{self, ConsultingService},
    error::{ApiError, ErrorBody},
    identity::SignUpMetadata,
    models::{
        Applicant, Application, Company, CompanyDashboard, CompanyJob, CompanySummary,
        CourseDetail, CourseListing, CreateJobRequest, DashboardResponse, Enrollment,
        ImpactStats, Job, JobListing, JobStatus, LoginRequest, MeResponse, PcdDashboard,
        Profile, RegisterRequest, RegisteredUser, RegistrationDetails, SessionResponse,
        UpdateApplicationStatusRequest, UpdateJobStatusRequest, UpdateProfileRequest,
        UpdateProgressRequest, UserKind,
    },
    repository::RepoError,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
};
use serde::Deserialize;
use uuid::Uuid;

/// Number of enrollments and applications shown on the job seeker dashboard.
pub const RECENT_ITEMS: i64 = 5;

// --- Filter Structs ---

/// CourseFilter
///
/// Query parameters of GET /courses. Empty values are ignored.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
pub struct CourseFilter {
    /// "Soft Skills" or "Hard Skills".
    pub category: Option<String>,
    /// "Básico", "Intermediário" or "Avançado".
    pub level: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Rewrites repository conflicts and missing references into domain-specific messages.
fn repo_error<'a>(conflict: &'a str, missing: &'a str) -> impl FnOnce(RepoError) -> ApiError + 'a {
    move |err| match err {
        RepoError::Conflict => ApiError::Conflict(conflict.to_string()),
        RepoError::NotFound => ApiError::NotFound(missing.to_string()),
        other => other.into(),
    }
}

const CNPJ_TAKEN: &str = "a company with this CNPJ is already registered";

/// Resolves the company row of a company account.
async fn current_company(state: &AppState, user: &AuthUser) -> Result<Company, ApiError> {
    user.require_company()?;
    state
        .repo
        .get_company_by_user(user.id)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound("company not found, complete your registration".to_string())
        })
}

// --- Accounts ---

/// register
///
/// [Public Route] Creates the account in the hosted auth provider, then the local
/// `profiles` row keyed by the returned id and, for companies, the `empresas` row.
#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registered", body = RegisteredUser),
        (status = 400, description = "Invalid payload or rejected by the auth provider", body = ErrorBody),
        (status = 409, description = "CNPJ already registered", body = ErrorBody),
        (status = 502, description = "Auth provider unavailable", body = ErrorBody)
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisteredUser>), ApiError> {
    payload.validate()?;

    // A taken CNPJ must not leave an auth user behind.
    if let RegistrationDetails::Empresa(company) = &payload.details {
        if state.repo.cnpj_registered(&company.cnpj).await? {
            return Err(ApiError::Conflict(CNPJ_TAKEN.to_string()));
        }
    }

    let kind = payload.details.kind();
    let display_name = payload.details.display_name(payload.email.trim()).to_string();
    let metadata = SignUpMetadata {
        display_name: display_name.clone(),
        user_type: kind.as_str().to_string(),
    };

    let id = state
        .identity
        .sign_up(payload.email.trim(), &payload.password, &metadata)
        .await?;
    tracing::info!(user_id = %id, kind = kind.as_str(), "account created");

    match payload.details {
        RegistrationDetails::Pcd(pcd) => {
            state.repo.upsert_profile(id, display_name, Some(pcd)).await?;
        }
        RegistrationDetails::Empresa(company) => {
            state.repo.upsert_profile(id, display_name, None).await?;
            state
                .repo
                .create_company(id, company)
                .await
                .map_err(repo_error(CNPJ_TAKEN, "profile not found"))?;
        }
    }

    Ok((StatusCode::CREATED, Json(RegisteredUser { id, kind })))
}

/// login
///
/// [Public Route] Password sign-in through the auth provider. The account kind is
/// resolved from the local data so the client can pick the right dashboard.
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = SessionResponse),
        (status = 400, description = "Invalid credentials", body = ErrorBody)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(ApiError::Validation(
            "email and password are required".to_string(),
        ));
    }

    let session = state
        .identity
        .sign_in(payload.email.trim(), &payload.password)
        .await?;

    let kind = state
        .repo
        .get_user(session.user_id)
        .await?
        .map(|user| user.kind)
        .unwrap_or_default();

    Ok(Json(SessionResponse {
        access_token: session.access_token,
        refresh_token: session.refresh_token,
        expires_in: session.expires_in,
        user_id: session.user_id,
        kind,
    }))
}

/// logout
///
/// [Authenticated Route] Revokes the caller's sessions at the provider. Provider
/// failures are logged and do not fail the request.
#[utoipa::path(
    post,
    path = "/logout",
    responses((status = 204, description = "Signed out"))
)]
pub async fn logout(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> StatusCode {
    if let Some(token) = bearer_token(&headers) {
        if let Err(e) = state.identity.sign_out(token).await {
            tracing::warn!(user_id = %id, "sign-out at the auth provider failed: {}", e);
        }
    }
    StatusCode::NO_CONTENT
}

/// get_me
///
/// [Authenticated Route] The caller's identity, profile and, for companies, company row.
#[utoipa::path(
    get,
    path = "/me",
    responses((status = 200, description = "Session view", body = MeResponse))
)]
pub async fn get_me(
    AuthUser { id, kind }: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<MeResponse>, ApiError> {
    let profile = state.repo.get_profile(id).await?;
    let company = match kind {
        UserKind::Empresa => state.repo.get_company_by_user(id).await?,
        UserKind::Pcd => None,
    };

    Ok(Json(MeResponse {
        id,
        kind,
        profile,
        company,
    }))
}

/// update_profile
///
/// [Authenticated Route] Partial update; fields left out of the body are kept.
#[utoipa::path(
    put,
    path = "/me/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated", body = Profile),
        (status = 404, description = "No profile", body = ErrorBody)
    )
)]
pub async fn update_profile(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<Profile>, ApiError> {
    if payload
        .full_name
        .as_deref()
        .is_some_and(|name| name.trim().is_empty())
    {
        return Err(ApiError::Validation("full name cannot be empty".to_string()));
    }

    state
        .repo
        .update_profile(id, payload)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("profile not found".to_string()))
}

// --- Courses ---

/// list_courses
///
/// [Public Route] The course catalog ordered by title, optionally filtered.
/// Signed-in callers get the `enrolled` flag set on their courses.
#[utoipa::path(
    get,
    path = "/courses",
    params(CourseFilter),
    responses((status = 200, description = "Course catalog", body = [CourseListing]))
)]
pub async fn list_courses(
    viewer: Option<AuthUser>,
    State(state): State<AppState>,
    Query(filter): Query<CourseFilter>,
) -> Result<Json<Vec<CourseListing>>, ApiError> {
    let courses = state
        .repo
        .list_courses(
            non_empty(filter.category),
            non_empty(filter.level),
            viewer.map(|v| v.id),
        )
        .await?;
    Ok(Json(courses))
}

/// get_course
///
/// [Public Route] Course page, with the caller's enrollment when signed in.
#[utoipa::path(
    get,
    path = "/courses/{id}",
    params(("id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Found", body = CourseDetail),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn get_course(
    viewer: Option<AuthUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CourseDetail>, ApiError> {
    let course = state
        .repo
        .get_course(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("course not found".to_string()))?;

    let enrollment = match viewer {
        Some(user) => state.repo.get_enrollment(user.id, id).await?,
        None => None,
    };

    Ok(Json(CourseDetail { course, enrollment }))
}

/// enroll_in_course
///
/// [Authenticated Route] Starts a course. One enrollment per user and course.
#[utoipa::path(
    post,
    path = "/courses/{id}/enroll",
    params(("id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 201, description = "Enrolled", body = Enrollment),
        (status = 404, description = "Course not found", body = ErrorBody),
        (status = 409, description = "Already enrolled", body = ErrorBody)
    )
)]
pub async fn enroll_in_course(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
) -> Result<(StatusCode, Json<Enrollment>), ApiError> {
    if state.repo.get_course(course_id).await?.is_none() {
        return Err(ApiError::NotFound("course not found".to_string()));
    }

    let enrollment = state
        .repo
        .enroll(user_id, course_id)
        .await
        .map_err(repo_error("you are already enrolled in this course", "course not found"))?;

    tracing::info!(%user_id, %course_id, "enrolled in course");
    Ok((StatusCode::CREATED, Json(enrollment)))
}

/// update_course_progress
///
/// [Authenticated Route] Records progress in percent. Reaching 100 completes the
/// enrollment, after which it is frozen.
#[utoipa::path(
    put,
    path = "/courses/{id}/progress",
    params(("id" = Uuid, Path, description = "Course ID")),
    request_body = UpdateProgressRequest,
    responses(
        (status = 200, description = "Updated", body = Enrollment),
        (status = 400, description = "Progress out of range", body = ErrorBody),
        (status = 404, description = "Not enrolled", body = ErrorBody),
        (status = 409, description = "Course already completed", body = ErrorBody)
    )
)]
pub async fn update_course_progress(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
    Json(payload): Json<UpdateProgressRequest>,
) -> Result<Json<Enrollment>, ApiError> {
    if !(0..=100).contains(&payload.progress) {
        return Err(ApiError::Validation(
            "progress must be between 0 and 100".to_string(),
        ));
    }

    let current = state
        .repo
        .get_enrollment(user_id, course_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("you are not enrolled in this course".to_string()))?;

    let already_completed = || ApiError::Conflict("course already completed".to_string());
    if current.is_completed() {
        return Err(already_completed());
    }

    // No row back means the enrollment was completed concurrently.
    let updated = state
        .repo
        .update_progress(user_id, course_id, payload.progress)
        .await?
        .ok_or_else(already_completed)?;

    if updated.is_completed() {
        tracing::info!(%user_id, %course_id, "course completed");
    }
    Ok(Json(updated))
}

// --- Jobs ---

/// list_jobs
///
/// [Public Route] Active job openings, newest first. Signed-in callers get the
/// `applied` flag set on the jobs they applied to.
#[utoipa::path(
    get,
    path = "/jobs",
    responses((status = 200, description = "Active jobs", body = [JobListing]))
)]
pub async fn list_jobs(
    viewer: Option<AuthUser>,
    State(state): State<AppState>,
) -> Result<Json<Vec<JobListing>>, ApiError> {
    let jobs = state.repo.list_active_jobs(viewer.map(|v| v.id)).await?;
    Ok(Json(jobs))
}

/// apply_to_job
///
/// [Authenticated Route] PCD accounts apply to an active job, once.
#[utoipa::path(
    post,
    path = "/jobs/{id}/apply",
    params(("id" = Uuid, Path, description = "Job ID")),
    responses(
        (status = 201, description = "Applied", body = Application),
        (status = 403, description = "Not a PCD account", body = ErrorBody),
        (status = 404, description = "Job missing or inactive", body = ErrorBody),
        (status = 409, description = "Already applied", body = ErrorBody)
    )
)]
pub async fn apply_to_job(
    user: AuthUser,
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<(StatusCode, Json<Application>), ApiError> {
    user.require_pcd()?;

    const JOB_NOT_FOUND: &str = "job not found";
    let job = state
        .repo
        .get_job(job_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(JOB_NOT_FOUND.to_string()))?;
    if job.status != JobStatus::Active.as_str() {
        return Err(ApiError::NotFound(JOB_NOT_FOUND.to_string()));
    }

    let application = state
        .repo
        .apply(user.id, job_id)
        .await
        .map_err(repo_error("you already applied to this job", JOB_NOT_FOUND))?;

    tracing::info!(user_id = %user.id, %job_id, "application sent");
    Ok((StatusCode::CREATED, Json(application)))
}

// --- Company Area ---

/// create_job
///
/// [Company Route] Publishes a new, active job opening.
#[utoipa::path(
    post,
    path = "/company/jobs",
    request_body = CreateJobRequest,
    responses(
        (status = 201, description = "Created", body = Job),
        (status = 400, description = "Missing title or description", body = ErrorBody),
        (status = 403, description = "Not a company account", body = ErrorBody)
    )
)]
pub async fn create_job(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateJobRequest>,
) -> Result<(StatusCode, Json<Job>), ApiError> {
    let company = current_company(&state, &user).await?;
    payload.validate()?;

    let job = state.repo.create_job(company.id, payload).await?;
    tracing::info!(company_id = %company.id, job_id = %job.id, "job published");
    Ok((StatusCode::CREATED, Json(job)))
}

/// list_company_jobs
///
/// [Company Route] The company's own jobs, active or not, with application counts.
#[utoipa::path(
    get,
    path = "/company/jobs",
    responses((status = 200, description = "Company jobs", body = [CompanyJob]))
)]
pub async fn list_company_jobs(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<CompanyJob>>, ApiError> {
    let company = current_company(&state, &user).await?;
    Ok(Json(state.repo.company_jobs(company.id).await?))
}

/// update_job_status
///
/// [Company Route] Opens or closes one of the company's jobs.
///
/// *Authorization*: ownership is enforced in the repository query, so a job of another
/// company is reported as 404.
#[utoipa::path(
    put,
    path = "/company/jobs/{id}/status",
    params(("id" = Uuid, Path, description = "Job ID")),
    request_body = UpdateJobStatusRequest,
    responses(
        (status = 200, description = "Updated", body = Job),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn update_job_status(
    user: AuthUser,
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    Json(payload): Json<UpdateJobStatusRequest>,
) -> Result<Json<Job>, ApiError> {
    let company = current_company(&state, &user).await?;
    state
        .repo
        .set_job_status(job_id, company.id, payload.status)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("job not found".to_string()))
}

/// list_job_applications
///
/// [Company Route] Candidates of one of the company's jobs.
#[utoipa::path(
    get,
    path = "/company/jobs/{id}/applications",
    params(("id" = Uuid, Path, description = "Job ID")),
    responses(
        (status = 200, description = "Applicants", body = [Applicant]),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn list_job_applications(
    user: AuthUser,
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<Vec<Applicant>>, ApiError> {
    let company = current_company(&state, &user).await?;

    match state.repo.get_job(job_id).await? {
        Some(job) if job.company_id == company.id => {}
        _ => return Err(ApiError::NotFound("job not found".to_string())),
    }

    Ok(Json(state.repo.job_applicants(job_id).await?))
}

/// update_application_status
///
/// [Company Route] Moves a candidacy to review, accepted or rejected.
#[utoipa::path(
    put,
    path = "/company/applications/{id}/status",
    params(("id" = Uuid, Path, description = "Application ID")),
    request_body = UpdateApplicationStatusRequest,
    responses(
        (status = 200, description = "Updated", body = Application),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn update_application_status(
    user: AuthUser,
    State(state): State<AppState>,
    Path(application_id): Path<Uuid>,
    Json(payload): Json<UpdateApplicationStatusRequest>,
) -> Result<Json<Application>, ApiError> {
    let company = current_company(&state, &user).await?;
    let application = state
        .repo
        .set_application_status(application_id, company.id, payload.status)
        .await?
        .ok_or_else(|| ApiError::NotFound("application not found".to_string()))?;

    tracing::info!(
        company_id = %company.id,
        %application_id,
        status = payload.status.as_str(),
        "application status changed"
    );
    Ok(Json(application))
}

// --- Companies ---

/// list_companies
///
/// [Public Route] Partner companies ordered by legal name.
#[utoipa::path(
    get,
    path = "/companies",
    responses((status = 200, description = "Partner companies", body = [CompanySummary]))
)]
pub async fn list_companies(
    State(state): State<AppState>,
) -> Result<Json<Vec<CompanySummary>>, ApiError> {
    Ok(Json(state.repo.list_companies().await?))
}

// --- Dashboard ---

/// get_dashboard
///
/// [Authenticated Route] The caller's dashboard, shaped by the account kind.
#[utoipa::path(
    get,
    path = "/dashboard",
    responses(
        (status = 200, description = "Dashboard", body = DashboardResponse),
        (status = 404, description = "Company registration incomplete", body = ErrorBody)
    )
)]
pub async fn get_dashboard(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<DashboardResponse>, ApiError> {
    match user.kind {
        UserKind::Pcd => {
            let profile = state.repo.get_profile(user.id).await?;
            let recent_enrollments = state.repo.recent_enrollments(user.id, RECENT_ITEMS).await?;
            let recent_applications = state.repo.recent_applications(user.id, RECENT_ITEMS).await?;
            let stats = state.repo.pcd_stats(user.id).await?;

            Ok(Json(DashboardResponse::Pcd(PcdDashboard {
                profile,
                recent_enrollments,
                recent_applications,
                stats,
            })))
        }
        UserKind::Empresa => {
            let company = current_company(&state, &user).await?;
            let jobs = state.repo.company_jobs(company.id).await?;
            let hires = state.repo.company_hires(company.id).await?;

            Ok(Json(DashboardResponse::Empresa(CompanyDashboard::build(
                company, jobs, hires,
            ))))
        }
    }
}

// --- Accessibility ---

/// get_accessibility
///
/// [Authenticated Route] Stored toolbar preferences, or the defaults.
#[utoipa::path(
    get,
    path = "/me/accessibility",
    responses((status = 200, description = "Preferences", body = AccessibilitySettings))
)]
pub async fn get_accessibility(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<AccessibilitySettings>, ApiError> {
    let settings = state
        .repo
        .get_accessibility(id)
        .await?
        .map(AccessibilitySettings::normalized)
        .unwrap_or_default();
    Ok(Json(settings))
}

/// apply_accessibility_action
///
/// [Authenticated Route] Applies one toolbar action and persists the new state.
#[utoipa::path(
    post,
    path = "/me/accessibility/{action}",
    params(("action" = String, Path, description = "increase-font, decrease-font, reset-font, toggle-contrast, toggle-reader or toggle-libras")),
    responses(
        (status = 200, description = "New preferences", body = AccessibilitySettings),
        (status = 400, description = "Unknown action", body = ErrorBody)
    )
)]
pub async fn apply_accessibility_action(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(action): Path<String>,
) -> Result<Json<AccessibilitySettings>, ApiError> {
    let action: ToolbarAction = action.parse().map_err(ApiError::Validation)?;

    let current = state
        .repo
        .get_accessibility(id)
        .await?
        .map(AccessibilitySettings::normalized)
        .unwrap_or_default();

    let saved = state
        .repo
        .save_accessibility(id, current.apply(action))
        .await?;
    Ok(Json(saved))
}

// --- Catalog & Statistics ---

/// list_consulting_services
///
/// [Public Route] The consulting offerings for partner companies.
#[utoipa::path(
    get,
    path = "/consulting/services",
    responses((status = 200, description = "Consulting services", body = [ConsultingService]))
)]
pub async fn list_consulting_services() -> Json<Vec<ConsultingService>> {
    Json(catalog::consulting_services())
}

/// get_impact_stats
///
/// [Public Route] Live platform counters for the landing page.
#[utoipa::path(
    get,
    path = "/stats/impact",
    responses((status = 200, description = "Impact counters", body = ImpactStats))
)]
pub async fn get_impact_stats(
    State(state): State<AppState>,
) -> Result<Json<ImpactStats>, ApiError> {
    Ok(Json(state.repo.impact_stats().await?))
}
