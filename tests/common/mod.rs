#![allow(dead_code)]

use async_trait::async_trait;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use inclusao_portal::{
    AppState,
    accessibility::AccessibilitySettings,
    auth::AuthUser,
    config::AppConfig,
    identity::MockIdentityProvider,
    models::{
        Applicant, Application, ApplicationStatus, ApplicationSummary, Company, CompanyJob,
        CompanyRegistration, CompanySummary, Course, CourseListing, CreateJobRequest,
        ENROLLMENT_COMPLETED, ENROLLMENT_IN_PROGRESS, Enrollment, EnrollmentSummary,
        ImpactStats, Job, JobListing, JobStatus, PcdRegistration, PcdStats, Profile,
        UpdateProfileRequest, User, UserKind,
    },
    repository::{RepoError, RepoResult, Repository},
};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

// --- IN-MEMORY REPOSITORY ---

/// Tables of the in-memory store, public so tests can seed and inspect them.
#[derive(Default)]
pub struct MockData {
    pub profiles: HashMap<Uuid, Profile>,
    pub companies: Vec<Company>,
    pub courses: Vec<Course>,
    pub enrollments: Vec<Enrollment>,
    pub jobs: Vec<Job>,
    pub applications: Vec<Application>,
    pub accessibility: HashMap<Uuid, AccessibilitySettings>,
}

/// Repository double with the same uniqueness and ownership rules as the Postgres one.
/// `failing` makes every call return a database error.
#[derive(Default)]
pub struct MockRepo {
    pub data: Mutex<MockData>,
    pub failing: bool,
}

fn db_down() -> RepoError {
    RepoError::Database(sqlx::Error::PoolTimedOut)
}

impl MockRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    fn lock(&self) -> RepoResult<std::sync::MutexGuard<'_, MockData>> {
        if self.failing {
            return Err(db_down());
        }
        Ok(self.data.lock().unwrap())
    }

    // --- Seeding helpers ---

    pub fn seed_pcd(&self, full_name: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.data.lock().unwrap().profiles.insert(
            id,
            Profile {
                id,
                full_name: Some(full_name.to_string()),
                ..Default::default()
            },
        );
        id
    }

    /// Returns (user id, company id).
    pub fn seed_company(&self, legal_name: &str) -> (Uuid, Uuid) {
        let user_id = self.seed_pcd(legal_name);
        let company_id = Uuid::new_v4();
        self.data.lock().unwrap().companies.push(Company {
            id: company_id,
            user_id,
            legal_name: legal_name.to_string(),
            cnpj: format!("cnpj-{}", company_id.simple()),
            contact_name: "Responsável".to_string(),
            ..Default::default()
        });
        (user_id, company_id)
    }

    /// A company account whose registration stopped before the company row was written.
    pub fn seed_company_user_without_company(&self) -> Uuid {
        self.seed_pcd("Empresa Incompleta")
    }

    pub fn seed_course(&self, title: &str, category: &str, level: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.data.lock().unwrap().courses.push(Course {
            id,
            title: title.to_string(),
            category: category.to_string(),
            level: level.to_string(),
            created_at: Some(Utc::now()),
            ..Default::default()
        });
        id
    }

    pub fn seed_job(&self, company_id: Uuid, title: &str, status: JobStatus) -> Uuid {
        let id = Uuid::new_v4();
        let mut data = self.data.lock().unwrap();
        let order = data.jobs.len() as i64;
        data.jobs.push(Job {
            id,
            company_id,
            title: title.to_string(),
            status: status.as_str().to_string(),
            // Strictly increasing so "newest first" is deterministic.
            created_at: Some(Utc::now() + chrono::Duration::seconds(order)),
            ..Default::default()
        });
        id
    }

    pub fn seed_enrollment(&self, user_id: Uuid, course_id: Uuid, progress: i32) -> Uuid {
        let id = Uuid::new_v4();
        let status = if progress >= 100 {
            ENROLLMENT_COMPLETED
        } else {
            ENROLLMENT_IN_PROGRESS
        };
        self.data.lock().unwrap().enrollments.push(Enrollment {
            id,
            user_id,
            course_id,
            status: status.to_string(),
            progress,
            created_at: Some(Utc::now()),
            ..Default::default()
        });
        id
    }

    pub fn seed_application(&self, user_id: Uuid, job_id: Uuid, status: ApplicationStatus) -> Uuid {
        let id = Uuid::new_v4();
        self.data.lock().unwrap().applications.push(Application {
            id,
            user_id,
            job_id,
            status: status.as_str().to_string(),
            created_at: Some(Utc::now()),
        });
        id
    }

    fn kind_of(data: &MockData, user_id: Uuid) -> UserKind {
        if data.companies.iter().any(|c| c.user_id == user_id) {
            UserKind::Empresa
        } else {
            UserKind::Pcd
        }
    }

    fn company_name(data: &MockData, company_id: Uuid) -> String {
        data.companies
            .iter()
            .find(|c| c.id == company_id)
            .map(|c| c.legal_name.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Repository for MockRepo {
    async fn get_user(&self, id: Uuid) -> RepoResult<Option<User>> {
        let data = self.lock()?;
        Ok(data.profiles.get(&id).map(|_| User {
            id,
            kind: Self::kind_of(&data, id),
        }))
    }

    async fn get_profile(&self, id: Uuid) -> RepoResult<Option<Profile>> {
        Ok(self.lock()?.profiles.get(&id).cloned())
    }

    async fn upsert_profile(
        &self,
        id: Uuid,
        display_name: String,
        pcd: Option<PcdRegistration>,
    ) -> RepoResult<Profile> {
        let mut data = self.lock()?;
        let pcd = pcd.unwrap_or_default();
        let profile = data.profiles.entry(id).or_insert_with(|| Profile {
            id,
            ..Default::default()
        });
        profile.full_name = Some(display_name);
        profile.cpf = pcd.cpf.or(profile.cpf.take());
        profile.phone = pcd.phone.or(profile.phone.take());
        profile.birth_date = pcd.birth_date.or(profile.birth_date);
        profile.disability_type = pcd.disability_type.or(profile.disability_type.take());
        if !pcd.accessibility_resources.is_empty() {
            profile.accessibility_resources = pcd.accessibility_resources;
        }
        Ok(profile.clone())
    }

    async fn update_profile(&self, id: Uuid, req: UpdateProfileRequest) -> RepoResult<Option<Profile>> {
        let mut data = self.lock()?;
        Ok(data.profiles.get_mut(&id).map(|profile| {
            if let Some(name) = req.full_name {
                profile.full_name = Some(name);
            }
            if let Some(phone) = req.phone {
                profile.phone = Some(phone);
            }
            if let Some(date) = req.birth_date {
                profile.birth_date = Some(date);
            }
            if let Some(disability) = req.disability_type {
                profile.disability_type = Some(disability);
            }
            if let Some(resources) = req.accessibility_resources {
                profile.accessibility_resources = resources;
            }
            profile.clone()
        }))
    }

    async fn get_company_by_user(&self, user_id: Uuid) -> RepoResult<Option<Company>> {
        Ok(self
            .lock()?
            .companies
            .iter()
            .find(|c| c.user_id == user_id)
            .cloned())
    }

    async fn create_company(&self, user_id: Uuid, req: CompanyRegistration) -> RepoResult<Company> {
        let mut data = self.lock()?;
        if data
            .companies
            .iter()
            .any(|c| c.user_id == user_id || c.cnpj == req.cnpj)
        {
            return Err(RepoError::Conflict);
        }
        let company = Company {
            id: Uuid::new_v4(),
            user_id,
            legal_name: req.legal_name,
            cnpj: req.cnpj,
            size: req.size,
            contact_name: req.contact_name,
            contact_role: req.contact_role,
            created_at: Some(Utc::now()),
        };
        data.companies.push(company.clone());
        Ok(company)
    }

    async fn cnpj_registered(&self, cnpj: &str) -> RepoResult<bool> {
        let data = self.lock()?;
        Ok(data.companies.iter().any(|c| c.cnpj.trim() == cnpj.trim()))
    }

    async fn list_companies(&self) -> RepoResult<Vec<CompanySummary>> {
        let data = self.lock()?;
        let mut companies: Vec<CompanySummary> = data
            .companies
            .iter()
            .map(|c| CompanySummary {
                id: c.id,
                legal_name: c.legal_name.clone(),
                size: c.size.clone(),
                job_count: data.jobs.iter().filter(|j| j.company_id == c.id).count() as i64,
            })
            .collect();
        companies.sort_by(|a, b| a.legal_name.cmp(&b.legal_name));
        Ok(companies)
    }

    async fn list_courses(
        &self,
        category: Option<String>,
        level: Option<String>,
        viewer: Option<Uuid>,
    ) -> RepoResult<Vec<CourseListing>> {
        let data = self.lock()?;
        let matches = |value: &str, filter: &Option<String>| {
            filter
                .as_ref()
                .is_none_or(|f| f.to_lowercase() == value.to_lowercase())
        };
        let mut courses: Vec<CourseListing> = data
            .courses
            .iter()
            .filter(|c| matches(&c.category, &category) && matches(&c.level, &level))
            .map(|c| CourseListing {
                course: c.clone(),
                enrolled: viewer.is_some_and(|v| {
                    data.enrollments
                        .iter()
                        .any(|e| e.user_id == v && e.course_id == c.id)
                }),
            })
            .collect();
        courses.sort_by(|a, b| a.course.title.cmp(&b.course.title));
        Ok(courses)
    }

    async fn get_course(&self, id: Uuid) -> RepoResult<Option<Course>> {
        Ok(self.lock()?.courses.iter().find(|c| c.id == id).cloned())
    }

    async fn get_enrollment(&self, user_id: Uuid, course_id: Uuid) -> RepoResult<Option<Enrollment>> {
        Ok(self
            .lock()?
            .enrollments
            .iter()
            .find(|e| e.user_id == user_id && e.course_id == course_id)
            .cloned())
    }

    async fn enroll(&self, user_id: Uuid, course_id: Uuid) -> RepoResult<Enrollment> {
        let mut data = self.lock()?;
        if !data.courses.iter().any(|c| c.id == course_id) {
            return Err(RepoError::NotFound);
        }
        if data
            .enrollments
            .iter()
            .any(|e| e.user_id == user_id && e.course_id == course_id)
        {
            return Err(RepoError::Conflict);
        }
        let enrollment = Enrollment {
            id: Uuid::new_v4(),
            user_id,
            course_id,
            status: ENROLLMENT_IN_PROGRESS.to_string(),
            progress: 0,
            completed_at: None,
            created_at: Some(Utc::now()),
        };
        data.enrollments.push(enrollment.clone());
        Ok(enrollment)
    }

    async fn update_progress(
        &self,
        user_id: Uuid,
        course_id: Uuid,
        progress: i32,
    ) -> RepoResult<Option<Enrollment>> {
        let mut data = self.lock()?;
        Ok(data
            .enrollments
            .iter_mut()
            .find(|e| e.user_id == user_id && e.course_id == course_id && !e.is_completed())
            .map(|e| {
                e.progress = progress;
                if progress >= 100 {
                    e.status = ENROLLMENT_COMPLETED.to_string();
                    e.completed_at = Some(Utc::now());
                }
                e.clone()
            }))
    }

    async fn recent_enrollments(&self, user_id: Uuid, limit: i64) -> RepoResult<Vec<EnrollmentSummary>> {
        let data = self.lock()?;
        Ok(data
            .enrollments
            .iter()
            .rev()
            .filter(|e| e.user_id == user_id)
            .take(limit as usize)
            .filter_map(|e| {
                let course = data.courses.iter().find(|c| c.id == e.course_id)?;
                Some(EnrollmentSummary {
                    id: e.id,
                    status: e.status.clone(),
                    progress: e.progress,
                    course_id: course.id,
                    course_title: course.title.clone(),
                    course_category: course.category.clone(),
                    course_level: course.level.clone(),
                })
            })
            .collect())
    }

    async fn pcd_stats(&self, user_id: Uuid) -> RepoResult<PcdStats> {
        let data = self.lock()?;
        let mine = data.enrollments.iter().filter(|e| e.user_id == user_id);
        Ok(PcdStats {
            enrolled_courses: mine.clone().count() as i64,
            applications_sent: data
                .applications
                .iter()
                .filter(|a| a.user_id == user_id)
                .count() as i64,
            completed_courses: mine.filter(|e| e.is_completed()).count() as i64,
        })
    }

    async fn list_active_jobs(&self, viewer: Option<Uuid>) -> RepoResult<Vec<JobListing>> {
        let data = self.lock()?;
        let mut jobs: Vec<JobListing> = data
            .jobs
            .iter()
            .filter(|j| j.status == JobStatus::Active.as_str())
            .map(|j| JobListing {
                job: j.clone(),
                company_name: Self::company_name(&data, j.company_id),
                applied: viewer.is_some_and(|v| {
                    data.applications
                        .iter()
                        .any(|a| a.user_id == v && a.job_id == j.id)
                }),
            })
            .collect();
        jobs.sort_by(|a, b| b.job.created_at.cmp(&a.job.created_at));
        Ok(jobs)
    }

    async fn get_job(&self, id: Uuid) -> RepoResult<Option<Job>> {
        Ok(self.lock()?.jobs.iter().find(|j| j.id == id).cloned())
    }

    async fn apply(&self, user_id: Uuid, job_id: Uuid) -> RepoResult<Application> {
        let mut data = self.lock()?;
        if !data.jobs.iter().any(|j| j.id == job_id) {
            return Err(RepoError::NotFound);
        }
        if data
            .applications
            .iter()
            .any(|a| a.user_id == user_id && a.job_id == job_id)
        {
            return Err(RepoError::Conflict);
        }
        let application = Application {
            id: Uuid::new_v4(),
            user_id,
            job_id,
            status: ApplicationStatus::UnderReview.as_str().to_string(),
            created_at: Some(Utc::now()),
        };
        data.applications.push(application.clone());
        Ok(application)
    }

    async fn create_job(&self, company_id: Uuid, req: CreateJobRequest) -> RepoResult<Job> {
        let mut data = self.lock()?;
        let job = Job {
            id: Uuid::new_v4(),
            company_id,
            accessibility_resources: req.resources_or_default(),
            title: req.title,
            description: Some(req.description),
            requirements: req.requirements,
            salary: req.salary,
            location: req.location,
            contract_type: req.contract_type,
            status: JobStatus::Active.as_str().to_string(),
            created_at: Some(Utc::now()),
        };
        data.jobs.push(job.clone());
        Ok(job)
    }

    async fn company_jobs(&self, company_id: Uuid) -> RepoResult<Vec<CompanyJob>> {
        let data = self.lock()?;
        let mut jobs: Vec<CompanyJob> = data
            .jobs
            .iter()
            .filter(|j| j.company_id == company_id)
            .map(|j| CompanyJob {
                job: j.clone(),
                application_count: data.applications.iter().filter(|a| a.job_id == j.id).count()
                    as i64,
            })
            .collect();
        jobs.sort_by(|a, b| b.job.created_at.cmp(&a.job.created_at));
        Ok(jobs)
    }

    async fn set_job_status(
        &self,
        job_id: Uuid,
        company_id: Uuid,
        status: JobStatus,
    ) -> RepoResult<Option<Job>> {
        let mut data = self.lock()?;
        Ok(data
            .jobs
            .iter_mut()
            .find(|j| j.id == job_id && j.company_id == company_id)
            .map(|j| {
                j.status = status.as_str().to_string();
                j.clone()
            }))
    }

    async fn job_applicants(&self, job_id: Uuid) -> RepoResult<Vec<Applicant>> {
        let data = self.lock()?;
        Ok(data
            .applications
            .iter()
            .filter(|a| a.job_id == job_id)
            .map(|a| {
                let profile = data.profiles.get(&a.user_id);
                Applicant {
                    application_id: a.id,
                    user_id: a.user_id,
                    full_name: profile.and_then(|p| p.full_name.clone()),
                    disability_type: profile.and_then(|p| p.disability_type.clone()),
                    accessibility_resources: profile
                        .map(|p| p.accessibility_resources.clone())
                        .unwrap_or_default(),
                    status: a.status.clone(),
                    created_at: a.created_at,
                }
            })
            .collect())
    }

    async fn set_application_status(
        &self,
        application_id: Uuid,
        company_id: Uuid,
        status: ApplicationStatus,
    ) -> RepoResult<Option<Application>> {
        let mut data = self.lock()?;
        let owned_jobs: Vec<Uuid> = data
            .jobs
            .iter()
            .filter(|j| j.company_id == company_id)
            .map(|j| j.id)
            .collect();
        Ok(data
            .applications
            .iter_mut()
            .find(|a| a.id == application_id && owned_jobs.contains(&a.job_id))
            .map(|a| {
                a.status = status.as_str().to_string();
                a.clone()
            }))
    }

    async fn recent_applications(&self, user_id: Uuid, limit: i64) -> RepoResult<Vec<ApplicationSummary>> {
        let data = self.lock()?;
        Ok(data
            .applications
            .iter()
            .rev()
            .filter(|a| a.user_id == user_id)
            .take(limit as usize)
            .filter_map(|a| {
                let job = data.jobs.iter().find(|j| j.id == a.job_id)?;
                Some(ApplicationSummary {
                    id: a.id,
                    status: a.status.clone(),
                    created_at: a.created_at,
                    job_id: job.id,
                    job_title: job.title.clone(),
                    company_name: Self::company_name(&data, job.company_id),
                })
            })
            .collect())
    }

    async fn company_hires(&self, company_id: Uuid) -> RepoResult<i64> {
        let data = self.lock()?;
        Ok(data
            .applications
            .iter()
            .filter(|a| a.status == ApplicationStatus::Accepted.as_str())
            .filter(|a| {
                data.jobs
                    .iter()
                    .any(|j| j.id == a.job_id && j.company_id == company_id)
            })
            .count() as i64)
    }

    async fn get_accessibility(&self, user_id: Uuid) -> RepoResult<Option<AccessibilitySettings>> {
        Ok(self.lock()?.accessibility.get(&user_id).copied())
    }

    async fn save_accessibility(
        &self,
        user_id: Uuid,
        settings: AccessibilitySettings,
    ) -> RepoResult<AccessibilitySettings> {
        self.lock()?.accessibility.insert(user_id, settings);
        Ok(settings)
    }

    async fn impact_stats(&self) -> RepoResult<ImpactStats> {
        let data = self.lock()?;
        let mut trained: Vec<Uuid> = data
            .enrollments
            .iter()
            .filter(|e| e.is_completed())
            .map(|e| e.user_id)
            .collect();
        trained.sort();
        trained.dedup();
        Ok(ImpactStats {
            people_trained: trained.len() as i64,
            courses_available: data.courses.len() as i64,
            partner_companies: data.companies.len() as i64,
            hires: data
                .applications
                .iter()
                .filter(|a| a.status == ApplicationStatus::Accepted.as_str())
                .count() as i64,
        })
    }
}

// --- TEST UTILITIES ---

/// AppState over the given mocks with the default (local) configuration.
pub fn create_test_state(repo: Arc<MockRepo>, identity: MockIdentityProvider) -> AppState {
    AppState {
        repo,
        identity: Arc::new(identity),
        config: AppConfig::default(),
    }
}

pub fn pcd_user(id: Uuid) -> AuthUser {
    AuthUser {
        id,
        kind: UserKind::Pcd,
    }
}

pub fn company_user(id: Uuid) -> AuthUser {
    AuthUser {
        id,
        kind: UserKind::Empresa,
    }
}

/// Splits a handler result into its status and decoded JSON body.
pub async fn read_json<T: DeserializeOwned>(response: impl IntoResponse) -> (axum::http::StatusCode, T) {
    let response: Response = response.into_response();
    let (parts, body) = response.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).expect("response body is not the expected JSON");
    (parts.status, value)
}

/// Status and `error` message of an error response.
pub async fn read_error(response: impl IntoResponse) -> (axum::http::StatusCode, String) {
    let (status, body): (_, serde_json::Value) = read_json(response).await;
    (status, body["error"].as_str().unwrap_or_default().to_string())
}
