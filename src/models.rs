use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ApiError;

pub const MIN_PASSWORD_LEN: usize = 8;

/// Accessibility resource attached to a job when the company does not list any.
pub const DEFAULT_JOB_RESOURCE: &str = "Ambiente Acessível";

// --- Identity ---

/// UserKind
///
/// The two account types of the platform. Never stored: a user owning a row in
/// `empresas` is a company, everybody else is a PCD job seeker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum UserKind {
    #[default]
    Pcd,
    Empresa,
}

impl UserKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserKind::Pcd => "pcd",
            UserKind::Empresa => "empresa",
        }
    }

    /// Maps the derived `kind` column back to the enum. Anything unknown is a PCD.
    pub fn from_db(value: &str) -> Self {
        match value {
            "empresa" => UserKind::Empresa,
            _ => UserKind::Pcd,
        }
    }
}

/// User
///
/// Minimal identity resolved during authentication.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct User {
    pub id: Uuid,
    pub kind: UserKind,
}

/// Profile
///
/// Row of `public.profiles`, keyed by the auth user id.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Profile {
    pub id: Uuid,
    pub full_name: Option<String>,
    pub cpf: Option<String>,
    pub phone: Option<String>,
    #[ts(type = "string | null")]
    pub birth_date: Option<NaiveDate>,
    pub disability_type: Option<String>,
    pub accessibility_resources: Vec<String>,
    #[ts(type = "string | null")]
    pub created_at: Option<DateTime<Utc>>,
    #[ts(type = "string | null")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Company
///
/// Row of `public.empresas`. One per company account.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Company {
    pub id: Uuid,
    pub user_id: Uuid,
    pub legal_name: String,
    pub cnpj: String,
    pub size: Option<String>,
    pub contact_name: String,
    pub contact_role: Option<String>,
    #[ts(type = "string | null")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Partner company card (GET /companies).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct CompanySummary {
    pub id: Uuid,
    pub legal_name: String,
    pub size: Option<String>,
    pub job_count: i64,
}

// --- Jobs & Applications ---

/// JobStatus
///
/// Only `ativa` jobs are listed publicly and accept applications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub enum JobStatus {
    #[default]
    #[serde(rename = "ativa")]
    Active,
    #[serde(rename = "inativa")]
    Inactive,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Active => "ativa",
            JobStatus::Inactive => "inativa",
        }
    }
}

/// Job
///
/// Row of `public.vagas`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Job {
    pub id: Uuid,
    pub company_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub requirements: Option<String>,
    pub salary: Option<String>,
    pub location: Option<String>,
    pub contract_type: Option<String>,
    pub accessibility_resources: Vec<String>,
    pub status: String,
    #[ts(type = "string | null")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Public job board entry: the job, its company's name, and whether the caller applied.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct JobListing {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub job: Job,
    pub company_name: String,
    pub applied: bool,
}

/// A company's own job with its application count (company dashboard).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct CompanyJob {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub job: Job,
    pub application_count: i64,
}

/// ApplicationStatus
///
/// Lifecycle of a candidacy as set by the hiring company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub enum ApplicationStatus {
    #[default]
    #[serde(rename = "em_analise")]
    UnderReview,
    #[serde(rename = "aceita")]
    Accepted,
    #[serde(rename = "rejeitada")]
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::UnderReview => "em_analise",
            ApplicationStatus::Accepted => "aceita",
            ApplicationStatus::Rejected => "rejeitada",
        }
    }
}

/// Application
///
/// Row of `public.candidaturas`. Unique per (user, job).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Application {
    pub id: Uuid,
    pub user_id: Uuid,
    pub job_id: Uuid,
    pub status: String,
    #[ts(type = "string | null")]
    pub created_at: Option<DateTime<Utc>>,
}

/// An application as seen by the job seeker, joined with job and company.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct ApplicationSummary {
    pub id: Uuid,
    pub status: String,
    #[ts(type = "string | null")]
    pub created_at: Option<DateTime<Utc>>,
    pub job_id: Uuid,
    pub job_title: String,
    pub company_name: String,
}

/// An application as seen by the hiring company, joined with the candidate profile.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Applicant {
    pub application_id: Uuid,
    pub user_id: Uuid,
    pub full_name: Option<String>,
    pub disability_type: Option<String>,
    pub accessibility_resources: Vec<String>,
    pub status: String,
    #[ts(type = "string | null")]
    pub created_at: Option<DateTime<Utc>>,
}

// --- Courses & Enrollments ---

/// Course
///
/// Row of `public.cursos`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub level: String,
    // Workload in hours.
    pub duration: Option<i32>,
    pub instructor: Option<String>,
    pub accessibility_resources: Vec<String>,
    pub status: Option<String>,
    #[ts(type = "string | null")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Catalog entry: the course plus whether the caller is enrolled.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct CourseListing {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub course: Course,
    pub enrolled: bool,
}

/// Course page: the course and, when signed in, the caller's enrollment.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CourseDetail {
    pub course: Course,
    pub enrollment: Option<Enrollment>,
}

pub const ENROLLMENT_IN_PROGRESS: &str = "em_andamento";
pub const ENROLLMENT_COMPLETED: &str = "concluido";

/// Enrollment
///
/// Row of `public.inscricoes_cursos`. Unique per (user, course).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Enrollment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub status: String,
    pub progress: i32,
    #[ts(type = "string | null")]
    pub completed_at: Option<DateTime<Utc>>,
    #[ts(type = "string | null")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Enrollment {
    pub fn is_completed(&self) -> bool {
        self.status == ENROLLMENT_COMPLETED
    }
}

/// An enrollment joined with its course, for the job seeker dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct EnrollmentSummary {
    pub id: Uuid,
    pub status: String,
    pub progress: i32,
    pub course_id: Uuid,
    pub course_title: String,
    pub course_category: String,
    pub course_level: String,
}

// --- Request Payloads (Input Schemas) ---

/// Job seeker specific sign-up fields.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct PcdRegistration {
    pub full_name: String,
    pub cpf: Option<String>,
    pub phone: Option<String>,
    #[ts(type = "string | null")]
    pub birth_date: Option<NaiveDate>,
    pub disability_type: Option<String>,
    #[serde(default)]
    pub accessibility_resources: Vec<String>,
}

/// Company specific sign-up fields.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CompanyRegistration {
    pub legal_name: String,
    pub cnpj: String,
    pub size: Option<String>,
    pub contact_name: String,
    pub contact_role: Option<String>,
}

/// Account type specific sign-up data, tagged by `kind`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RegistrationDetails {
    Pcd(PcdRegistration),
    Empresa(CompanyRegistration),
}

impl RegistrationDetails {
    pub fn kind(&self) -> UserKind {
        match self {
            RegistrationDetails::Pcd(_) => UserKind::Pcd,
            RegistrationDetails::Empresa(_) => UserKind::Empresa,
        }
    }

    /// Display name stored in the auth user metadata: the person's name, the company's
    /// legal name, or the e-mail when neither was given.
    pub fn display_name<'a>(&'a self, email: &'a str) -> &'a str {
        let name = match self {
            RegistrationDetails::Pcd(p) => p.full_name.trim(),
            RegistrationDetails::Empresa(c) => c.legal_name.trim(),
        };
        if name.is_empty() { email } else { name }
    }
}

/// RegisterRequest
///
/// Input payload for POST /register. The password is only forwarded to the hosted
/// auth provider and never persisted or logged here.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub accept_terms: bool,
    pub details: RegistrationDetails,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            return Err(ApiError::Validation(
                "email and password are required".to_string(),
            ));
        }
        if !self.email.contains('@') {
            return Err(ApiError::Validation("invalid email address".to_string()));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ApiError::Validation(format!(
                "password must have at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }
        if !self.accept_terms {
            return Err(ApiError::Validation(
                "the terms of use must be accepted".to_string(),
            ));
        }
        if let RegistrationDetails::Empresa(company) = &self.details {
            if company.legal_name.trim().is_empty()
                || company.cnpj.trim().is_empty()
                || company.contact_name.trim().is_empty()
            {
                return Err(ApiError::Validation(
                    "legal name, CNPJ and contact name are required".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Output of a successful registration.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct RegisteredUser {
    pub id: Uuid,
    pub kind: UserKind,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Tokens issued by the auth provider plus the resolved account type.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct SessionResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub user_id: Uuid,
    pub kind: UserKind,
}

/// UpdateProfileRequest
///
/// Partial update of the job seeker profile (PUT /me/profile). Absent fields are kept.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateProfileRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(type = "string | null")]
    pub birth_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disability_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accessibility_resources: Option<Vec<String>>,
}

/// Signed-in session view (GET /me).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct MeResponse {
    pub id: Uuid,
    pub kind: UserKind,
    pub profile: Option<Profile>,
    pub company: Option<Company>,
}

/// CreateJobRequest
///
/// Input payload for POST /company/jobs.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateJobRequest {
    pub title: String,
    pub description: String,
    pub requirements: Option<String>,
    pub salary: Option<String>,
    pub location: Option<String>,
    pub contract_type: Option<String>,
    #[serde(default)]
    pub accessibility_resources: Vec<String>,
}

impl CreateJobRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.title.trim().is_empty() || self.description.trim().is_empty() {
            return Err(ApiError::Validation(
                "fill in at least the job title and description".to_string(),
            ));
        }
        Ok(())
    }

    /// Resources to store: the given list, or the default one when empty.
    pub fn resources_or_default(&self) -> Vec<String> {
        if self.accessibility_resources.is_empty() {
            vec![DEFAULT_JOB_RESOURCE.to_string()]
        } else {
            self.accessibility_resources.clone()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateJobStatusRequest {
    pub status: JobStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateApplicationStatusRequest {
    pub status: ApplicationStatus,
}

/// Progress report for an enrolled course, in percent.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateProgressRequest {
    pub progress: i32,
}

// --- Dashboard & Statistics Schemas (Output) ---

/// Counters shown on the job seeker dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct PcdStats {
    pub enrolled_courses: i64,
    pub applications_sent: i64,
    pub completed_courses: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct PcdDashboard {
    pub profile: Option<Profile>,
    pub recent_enrollments: Vec<EnrollmentSummary>,
    pub recent_applications: Vec<ApplicationSummary>,
    pub stats: PcdStats,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CompanyDashboard {
    pub company: Company,
    pub jobs: Vec<CompanyJob>,
    pub active_jobs: i64,
    pub total_applications: i64,
    pub hires: i64,
}

impl CompanyDashboard {
    /// Aggregates the counters from the job list; `hires` comes from the repository.
    pub fn build(company: Company, jobs: Vec<CompanyJob>, hires: i64) -> Self {
        let active_jobs = jobs
            .iter()
            .filter(|j| j.job.status == JobStatus::Active.as_str())
            .count() as i64;
        let total_applications = jobs.iter().map(|j| j.application_count).sum();
        Self {
            company,
            jobs,
            active_jobs,
            total_applications,
            hires,
        }
    }
}

/// Dashboard payload, tagged by the account type.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DashboardResponse {
    Pcd(PcdDashboard),
    Empresa(CompanyDashboard),
}

/// ImpactStats
///
/// Live platform counters for the landing page (GET /stats/impact).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ImpactStats {
    /// Distinct users holding at least one completed course.
    pub people_trained: i64,
    pub courses_available: i64,
    pub partner_companies: i64,
    /// Accepted applications.
    pub hires: i64,
}
