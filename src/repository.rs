use crate::accessibility::AccessibilitySettings;
use crate::models::{
    Applicant, Application, ApplicationStatus, ApplicationSummary, Company, CompanyJob,
    CompanyRegistration, CompanySummary, Course, CourseListing, CreateJobRequest, Enrollment,
    EnrollmentSummary, ImpactStats, Job, JobListing, JobStatus, PcdRegistration, PcdStats,
    Profile, UpdateProfileRequest, User, UserKind,
};
use async_trait::async_trait;
use sqlx::{PgPool, query_builder::QueryBuilder};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// RepoError
///
/// Persistence failures. Unique and foreign key violations reported by Postgres are
/// lifted into their own variants so handlers can answer 409 / 404.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("unique constraint violated")]
    Conflict,
    #[error("referenced record not found")]
    NotFound,
    #[error("database error: {0}")]
    Database(sqlx::Error),
}

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        let code = err
            .as_database_error()
            .and_then(|db| db.code().map(|c| c.into_owned()));
        match code.as_deref() {
            Some(UNIQUE_VIOLATION) => RepoError::Conflict,
            Some(FOREIGN_KEY_VIOLATION) => RepoError::NotFound,
            _ => RepoError::Database(err),
        }
    }
}

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository Trait
///
/// Abstract contract for every persistence operation, so handlers never see the
/// concrete backend (Postgres in production, mocks in tests).
///
/// **Send + Sync + async_trait** make `Arc<dyn Repository>` shareable across Axum tasks.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users & Profiles ---
    /// Resolves the identity and derived account kind of a profile.
    async fn get_user(&self, id: Uuid) -> RepoResult<Option<User>>;
    async fn get_profile(&self, id: Uuid) -> RepoResult<Option<Profile>>;
    /// Creates (or completes, when a signup trigger already created it) the profile row.
    async fn upsert_profile(
        &self,
        id: Uuid,
        display_name: String,
        pcd: Option<PcdRegistration>,
    ) -> RepoResult<Profile>;
    /// Partial update; absent fields keep their value.
    async fn update_profile(&self, id: Uuid, req: UpdateProfileRequest) -> RepoResult<Option<Profile>>;

    // --- Companies ---
    async fn get_company_by_user(&self, user_id: Uuid) -> RepoResult<Option<Company>>;
    async fn create_company(&self, user_id: Uuid, req: CompanyRegistration) -> RepoResult<Company>;
    async fn cnpj_registered(&self, cnpj: &str) -> RepoResult<bool>;
    async fn list_companies(&self) -> RepoResult<Vec<CompanySummary>>;

    // --- Courses & Enrollments ---
    /// Catalog ordered by title. `viewer` drives the `enrolled` flag.
    async fn list_courses(
        &self,
        category: Option<String>,
        level: Option<String>,
        viewer: Option<Uuid>,
    ) -> RepoResult<Vec<CourseListing>>;
    async fn get_course(&self, id: Uuid) -> RepoResult<Option<Course>>;
    async fn get_enrollment(&self, user_id: Uuid, course_id: Uuid) -> RepoResult<Option<Enrollment>>;
    /// Fails with `Conflict` when already enrolled and `NotFound` for an unknown course.
    async fn enroll(&self, user_id: Uuid, course_id: Uuid) -> RepoResult<Enrollment>;
    /// Updates an open enrollment. Reaching 100 completes it. `None` when there is no
    /// open enrollment to update.
    async fn update_progress(
        &self,
        user_id: Uuid,
        course_id: Uuid,
        progress: i32,
    ) -> RepoResult<Option<Enrollment>>;
    async fn recent_enrollments(&self, user_id: Uuid, limit: i64) -> RepoResult<Vec<EnrollmentSummary>>;
    async fn pcd_stats(&self, user_id: Uuid) -> RepoResult<PcdStats>;

    // --- Jobs & Applications ---
    /// Active jobs, newest first. `viewer` drives the `applied` flag.
    async fn list_active_jobs(&self, viewer: Option<Uuid>) -> RepoResult<Vec<JobListing>>;
    async fn get_job(&self, id: Uuid) -> RepoResult<Option<Job>>;
    /// Fails with `Conflict` when the user already applied.
    async fn apply(&self, user_id: Uuid, job_id: Uuid) -> RepoResult<Application>;
    async fn create_job(&self, company_id: Uuid, req: CreateJobRequest) -> RepoResult<Job>;
    async fn company_jobs(&self, company_id: Uuid) -> RepoResult<Vec<CompanyJob>>;
    /// Owner-only: `None` unless the job belongs to `company_id`.
    async fn set_job_status(
        &self,
        job_id: Uuid,
        company_id: Uuid,
        status: JobStatus,
    ) -> RepoResult<Option<Job>>;
    async fn job_applicants(&self, job_id: Uuid) -> RepoResult<Vec<Applicant>>;
    /// Owner-only: `None` unless the application targets a job of `company_id`.
    async fn set_application_status(
        &self,
        application_id: Uuid,
        company_id: Uuid,
        status: ApplicationStatus,
    ) -> RepoResult<Option<Application>>;
    async fn recent_applications(&self, user_id: Uuid, limit: i64) -> RepoResult<Vec<ApplicationSummary>>;
    /// Accepted applications across the company's jobs.
    async fn company_hires(&self, company_id: Uuid) -> RepoResult<i64>;

    // --- Accessibility ---
    async fn get_accessibility(&self, user_id: Uuid) -> RepoResult<Option<AccessibilitySettings>>;
    async fn save_accessibility(
        &self,
        user_id: Uuid,
        settings: AccessibilitySettings,
    ) -> RepoResult<AccessibilitySettings>;

    // --- Statistics ---
    async fn impact_stats(&self) -> RepoResult<ImpactStats>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

// Column lists. The hosted schema is in Portuguese; rows are aliased to the
// English field names of the models.

const PROFILE_COLUMNS: &str = "p.id, p.nome_completo AS full_name, p.cpf, p.telefone AS phone, \
     p.data_nascimento AS birth_date, p.tipo_deficiencia AS disability_type, \
     COALESCE(p.recursos_acessibilidade, '{}') AS accessibility_resources, \
     p.created_at, p.updated_at";

const COMPANY_COLUMNS: &str = "e.id, e.user_id, e.razao_social AS legal_name, e.cnpj, \
     e.porte AS size, e.responsavel AS contact_name, e.cargo_responsavel AS contact_role, \
     e.created_at";

// A job without a status counts as active everywhere: listing, detail and apply.
const JOB_COLUMNS: &str = "v.id, v.empresa_id AS company_id, v.titulo AS title, \
     v.descricao AS description, v.requisitos AS requirements, v.salario AS salary, \
     v.localidade AS location, v.tipo_contrato AS contract_type, \
     COALESCE(v.recursos_acessibilidade, '{}') AS accessibility_resources, \
     COALESCE(v.status, 'ativa') AS status, v.created_at";

const APPLICATION_COLUMNS: &str = "ca.id, ca.user_id, ca.vaga_id AS job_id, \
     COALESCE(ca.status, 'em_analise') AS status, ca.created_at";

const COURSE_COLUMNS: &str = "c.id, c.titulo AS title, c.descricao AS description, \
     c.categoria AS category, c.nivel AS level, c.duracao::int4 AS duration, \
     c.instrutor AS instructor, COALESCE(c.recursos_acessibilidade, '{}') AS accessibility_resources, \
     c.status, c.created_at";

const ENROLLMENT_COLUMNS: &str = "i.id, i.user_id, i.curso_id AS course_id, \
     COALESCE(i.status, 'em_andamento') AS status, COALESCE(i.progresso, 0)::int4 AS progress, \
     i.data_conclusao AS completed_at, i.created_at";

const ACCESSIBILITY_COLUMNS: &str = "a.font_scale, a.high_contrast, a.text_reader, a.libras";

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by the hosted Postgres.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    /// get_user
    ///
    /// The account kind is derived: owning an `empresas` row makes the user a company.
    async fn get_user(&self, id: Uuid) -> RepoResult<Option<User>> {
        let row = sqlx::query_as::<_, (Uuid, String)>(
            r#"
            SELECT p.id,
                   CASE WHEN EXISTS (SELECT 1 FROM empresas e WHERE e.user_id = p.id)
                        THEN 'empresa' ELSE 'pcd' END AS kind
            FROM profiles p
            WHERE p.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(id, kind)| User {
            id,
            kind: UserKind::from_db(&kind),
        }))
    }

    async fn get_profile(&self, id: Uuid) -> RepoResult<Option<Profile>> {
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM profiles p WHERE p.id = $1");
        Ok(sqlx::query_as::<_, Profile>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    /// upsert_profile
    ///
    /// The hosted project may already have created the row from a sign-up trigger,
    /// hence `ON CONFLICT (id) DO UPDATE`. PCD fields are only written when given.
    async fn upsert_profile(
        &self,
        id: Uuid,
        display_name: String,
        pcd: Option<PcdRegistration>,
    ) -> RepoResult<Profile> {
        let pcd = pcd.unwrap_or_default();
        let resources = if pcd.accessibility_resources.is_empty() {
            None
        } else {
            Some(pcd.accessibility_resources)
        };

        let sql = format!(
            r#"
            INSERT INTO profiles AS p
                (id, nome_completo, cpf, telefone, data_nascimento, tipo_deficiencia,
                 recursos_acessibilidade, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, NOW(), NOW())
            ON CONFLICT (id) DO UPDATE SET
                nome_completo = EXCLUDED.nome_completo,
                cpf = COALESCE(EXCLUDED.cpf, p.cpf),
                telefone = COALESCE(EXCLUDED.telefone, p.telefone),
                data_nascimento = COALESCE(EXCLUDED.data_nascimento, p.data_nascimento),
                tipo_deficiencia = COALESCE(EXCLUDED.tipo_deficiencia, p.tipo_deficiencia),
                recursos_acessibilidade = COALESCE(EXCLUDED.recursos_acessibilidade, p.recursos_acessibilidade),
                updated_at = NOW()
            RETURNING {PROFILE_COLUMNS}
            "#
        );

        Ok(sqlx::query_as::<_, Profile>(&sql)
            .bind(id)
            .bind(display_name)
            .bind(pcd.cpf)
            .bind(pcd.phone)
            .bind(pcd.birth_date)
            .bind(pcd.disability_type)
            .bind(resources)
            .fetch_one(&self.pool)
            .await?)
    }

    /// update_profile
    ///
    /// COALESCE keeps the stored value for every `None` field of the request.
    async fn update_profile(&self, id: Uuid, req: UpdateProfileRequest) -> RepoResult<Option<Profile>> {
        let sql = format!(
            r#"
            UPDATE profiles AS p
            SET nome_completo = COALESCE($2, p.nome_completo),
                telefone = COALESCE($3, p.telefone),
                data_nascimento = COALESCE($4, p.data_nascimento),
                tipo_deficiencia = COALESCE($5, p.tipo_deficiencia),
                recursos_acessibilidade = COALESCE($6, p.recursos_acessibilidade),
                updated_at = NOW()
            WHERE p.id = $1
            RETURNING {PROFILE_COLUMNS}
            "#
        );

        Ok(sqlx::query_as::<_, Profile>(&sql)
            .bind(id)
            .bind(req.full_name)
            .bind(req.phone)
            .bind(req.birth_date)
            .bind(req.disability_type)
            .bind(req.accessibility_resources)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn get_company_by_user(&self, user_id: Uuid) -> RepoResult<Option<Company>> {
        let sql = format!("SELECT {COMPANY_COLUMNS} FROM empresas e WHERE e.user_id = $1");
        Ok(sqlx::query_as::<_, Company>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_company(&self, user_id: Uuid, req: CompanyRegistration) -> RepoResult<Company> {
        let sql = format!(
            r#"
            INSERT INTO empresas AS e
                (user_id, razao_social, cnpj, porte, responsavel, cargo_responsavel, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, NOW(), NOW())
            RETURNING {COMPANY_COLUMNS}
            "#
        );

        Ok(sqlx::query_as::<_, Company>(&sql)
            .bind(user_id)
            .bind(req.legal_name.trim())
            .bind(req.cnpj.trim())
            .bind(req.size)
            .bind(req.contact_name.trim())
            .bind(req.contact_role)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn cnpj_registered(&self, cnpj: &str) -> RepoResult<bool> {
        Ok(sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM empresas WHERE cnpj = $1)",
        )
        .bind(cnpj.trim())
        .fetch_one(&self.pool)
        .await?)
    }

    async fn list_companies(&self) -> RepoResult<Vec<CompanySummary>> {
        Ok(sqlx::query_as::<_, CompanySummary>(
            r#"
            SELECT e.id, e.razao_social AS legal_name, e.porte AS size,
                   (SELECT COUNT(*) FROM vagas v WHERE v.empresa_id = e.id) AS job_count
            FROM empresas e
            ORDER BY e.razao_social ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?)
    }

    /// list_courses
    ///
    /// QueryBuilder keeps the optional filters parameterized.
    async fn list_courses(
        &self,
        category: Option<String>,
        level: Option<String>,
        viewer: Option<Uuid>,
    ) -> RepoResult<Vec<CourseListing>> {
        let mut builder: QueryBuilder<sqlx::Postgres> = QueryBuilder::new(format!(
            "SELECT {COURSE_COLUMNS}, EXISTS (SELECT 1 FROM inscricoes_cursos i \
             WHERE i.curso_id = c.id AND i.user_id = "
        ));
        builder.push_bind(viewer);
        builder.push(") AS enrolled FROM cursos c WHERE 1 = 1");

        // Exact match, ignoring case. No pattern matching on user input.
        if let Some(category) = category {
            builder.push(" AND LOWER(c.categoria) = LOWER(");
            builder.push_bind(category);
            builder.push(")");
        }
        if let Some(level) = level {
            builder.push(" AND LOWER(c.nivel) = LOWER(");
            builder.push_bind(level);
            builder.push(")");
        }

        builder.push(" ORDER BY c.titulo ASC");

        Ok(builder
            .build_query_as::<CourseListing>()
            .fetch_all(&self.pool)
            .await?)
    }

    async fn get_course(&self, id: Uuid) -> RepoResult<Option<Course>> {
        let sql = format!("SELECT {COURSE_COLUMNS} FROM cursos c WHERE c.id = $1");
        Ok(sqlx::query_as::<_, Course>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn get_enrollment(&self, user_id: Uuid, course_id: Uuid) -> RepoResult<Option<Enrollment>> {
        let sql = format!(
            "SELECT {ENROLLMENT_COLUMNS} FROM inscricoes_cursos i WHERE i.user_id = $1 AND i.curso_id = $2"
        );
        Ok(sqlx::query_as::<_, Enrollment>(&sql)
            .bind(user_id)
            .bind(course_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    /// enroll
    ///
    /// `ON CONFLICT DO NOTHING` makes a second enrollment return no row, reported as
    /// `Conflict`. A missing course trips the foreign key and becomes `NotFound`.
    async fn enroll(&self, user_id: Uuid, course_id: Uuid) -> RepoResult<Enrollment> {
        let sql = format!(
            r#"
            INSERT INTO inscricoes_cursos AS i (user_id, curso_id, status, progresso, created_at)
            VALUES ($1, $2, 'em_andamento', 0, NOW())
            ON CONFLICT DO NOTHING
            RETURNING {ENROLLMENT_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Enrollment>(&sql)
            .bind(user_id)
            .bind(course_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(RepoError::Conflict)
    }

    async fn update_progress(
        &self,
        user_id: Uuid,
        course_id: Uuid,
        progress: i32,
    ) -> RepoResult<Option<Enrollment>> {
        let sql = format!(
            r#"
            UPDATE inscricoes_cursos AS i
            SET progresso = $3,
                status = CASE WHEN $3 >= 100 THEN 'concluido' ELSE 'em_andamento' END,
                data_conclusao = CASE WHEN $3 >= 100 THEN NOW() ELSE NULL END
            WHERE i.user_id = $1 AND i.curso_id = $2
              AND COALESCE(i.status, 'em_andamento') <> 'concluido'
            RETURNING {ENROLLMENT_COLUMNS}
            "#
        );

        Ok(sqlx::query_as::<_, Enrollment>(&sql)
            .bind(user_id)
            .bind(course_id)
            .bind(progress)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn recent_enrollments(&self, user_id: Uuid, limit: i64) -> RepoResult<Vec<EnrollmentSummary>> {
        Ok(sqlx::query_as::<_, EnrollmentSummary>(
            r#"
            SELECT i.id,
                   COALESCE(i.status, 'em_andamento') AS status,
                   COALESCE(i.progresso, 0)::int4 AS progress,
                   c.id AS course_id, c.titulo AS course_title,
                   c.categoria AS course_category, c.nivel AS course_level
            FROM inscricoes_cursos i
            JOIN cursos c ON c.id = i.curso_id
            WHERE i.user_id = $1
            ORDER BY i.created_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn pcd_stats(&self, user_id: Uuid) -> RepoResult<PcdStats> {
        Ok(sqlx::query_as::<_, PcdStats>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM inscricoes_cursos WHERE user_id = $1) AS enrolled_courses,
                (SELECT COUNT(*) FROM candidaturas WHERE user_id = $1) AS applications_sent,
                (SELECT COUNT(*) FROM inscricoes_cursos WHERE user_id = $1 AND status = 'concluido') AS completed_courses
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn list_active_jobs(&self, viewer: Option<Uuid>) -> RepoResult<Vec<JobListing>> {
        let sql = format!(
            r#"
            SELECT {JOB_COLUMNS},
                   e.razao_social AS company_name,
                   EXISTS (SELECT 1 FROM candidaturas ca
                           WHERE ca.vaga_id = v.id AND ca.user_id = $1) AS applied
            FROM vagas v
            JOIN empresas e ON e.id = v.empresa_id
            WHERE COALESCE(v.status, 'ativa') = 'ativa'
            ORDER BY v.created_at DESC
            "#
        );

        Ok(sqlx::query_as::<_, JobListing>(&sql)
            .bind(viewer)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn get_job(&self, id: Uuid) -> RepoResult<Option<Job>> {
        let sql = format!("SELECT {JOB_COLUMNS} FROM vagas v WHERE v.id = $1");
        Ok(sqlx::query_as::<_, Job>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn apply(&self, user_id: Uuid, job_id: Uuid) -> RepoResult<Application> {
        let sql = format!(
            r#"
            INSERT INTO candidaturas AS ca (user_id, vaga_id, status, created_at)
            VALUES ($1, $2, 'em_analise', NOW())
            ON CONFLICT DO NOTHING
            RETURNING {APPLICATION_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Application>(&sql)
            .bind(user_id)
            .bind(job_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(RepoError::Conflict)
    }

    async fn create_job(&self, company_id: Uuid, req: CreateJobRequest) -> RepoResult<Job> {
        let resources = req.resources_or_default();
        let sql = format!(
            r#"
            INSERT INTO vagas AS v
                (empresa_id, titulo, descricao, requisitos, salario, localidade, tipo_contrato,
                 recursos_acessibilidade, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'ativa', NOW(), NOW())
            RETURNING {JOB_COLUMNS}
            "#
        );

        Ok(sqlx::query_as::<_, Job>(&sql)
            .bind(company_id)
            .bind(req.title.trim())
            .bind(req.description.trim())
            .bind(req.requirements)
            .bind(req.salary)
            .bind(req.location)
            .bind(req.contract_type)
            .bind(resources)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn company_jobs(&self, company_id: Uuid) -> RepoResult<Vec<CompanyJob>> {
        let sql = format!(
            r#"
            SELECT {JOB_COLUMNS},
                   (SELECT COUNT(*) FROM candidaturas ca WHERE ca.vaga_id = v.id) AS application_count
            FROM vagas v
            WHERE v.empresa_id = $1
            ORDER BY v.created_at DESC
            "#
        );

        Ok(sqlx::query_as::<_, CompanyJob>(&sql)
            .bind(company_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn set_job_status(
        &self,
        job_id: Uuid,
        company_id: Uuid,
        status: JobStatus,
    ) -> RepoResult<Option<Job>> {
        let sql = format!(
            r#"
            UPDATE vagas AS v
            SET status = $3, updated_at = NOW()
            WHERE v.id = $1 AND v.empresa_id = $2
            RETURNING {JOB_COLUMNS}
            "#
        );

        Ok(sqlx::query_as::<_, Job>(&sql)
            .bind(job_id)
            .bind(company_id)
            .bind(status.as_str())
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn job_applicants(&self, job_id: Uuid) -> RepoResult<Vec<Applicant>> {
        Ok(sqlx::query_as::<_, Applicant>(
            r#"
            SELECT ca.id AS application_id, ca.user_id,
                   p.nome_completo AS full_name, p.tipo_deficiencia AS disability_type,
                   COALESCE(p.recursos_acessibilidade, '{}') AS accessibility_resources,
                   COALESCE(ca.status, 'em_analise') AS status, ca.created_at
            FROM candidaturas ca
            LEFT JOIN profiles p ON p.id = ca.user_id
            WHERE ca.vaga_id = $1
            ORDER BY ca.created_at ASC
            "#,
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn set_application_status(
        &self,
        application_id: Uuid,
        company_id: Uuid,
        status: ApplicationStatus,
    ) -> RepoResult<Option<Application>> {
        let sql = format!(
            r#"
            UPDATE candidaturas AS ca
            SET status = $3
            FROM vagas v
            WHERE ca.id = $1 AND ca.vaga_id = v.id AND v.empresa_id = $2
            RETURNING {APPLICATION_COLUMNS}
            "#
        );

        Ok(sqlx::query_as::<_, Application>(&sql)
            .bind(application_id)
            .bind(company_id)
            .bind(status.as_str())
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn recent_applications(&self, user_id: Uuid, limit: i64) -> RepoResult<Vec<ApplicationSummary>> {
        Ok(sqlx::query_as::<_, ApplicationSummary>(
            r#"
            SELECT ca.id, COALESCE(ca.status, 'em_analise') AS status, ca.created_at,
                   v.id AS job_id, v.titulo AS job_title, e.razao_social AS company_name
            FROM candidaturas ca
            JOIN vagas v ON v.id = ca.vaga_id
            JOIN empresas e ON e.id = v.empresa_id
            WHERE ca.user_id = $1
            ORDER BY ca.created_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn company_hires(&self, company_id: Uuid) -> RepoResult<i64> {
        Ok(sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM candidaturas ca
            JOIN vagas v ON v.id = ca.vaga_id
            WHERE v.empresa_id = $1 AND ca.status = 'aceita'
            "#,
        )
        .bind(company_id)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn get_accessibility(&self, user_id: Uuid) -> RepoResult<Option<AccessibilitySettings>> {
        let sql = format!(
            "SELECT {ACCESSIBILITY_COLUMNS} FROM preferencias_acessibilidade a WHERE a.user_id = $1"
        );
        Ok(sqlx::query_as::<_, AccessibilitySettings>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn save_accessibility(
        &self,
        user_id: Uuid,
        settings: AccessibilitySettings,
    ) -> RepoResult<AccessibilitySettings> {
        let sql = format!(
            r#"
            INSERT INTO preferencias_acessibilidade AS a
                (user_id, font_scale, high_contrast, text_reader, libras, updated_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            ON CONFLICT (user_id) DO UPDATE SET
                font_scale = EXCLUDED.font_scale,
                high_contrast = EXCLUDED.high_contrast,
                text_reader = EXCLUDED.text_reader,
                libras = EXCLUDED.libras,
                updated_at = NOW()
            RETURNING {ACCESSIBILITY_COLUMNS}
            "#
        );

        Ok(sqlx::query_as::<_, AccessibilitySettings>(&sql)
            .bind(user_id)
            .bind(settings.font_scale)
            .bind(settings.high_contrast)
            .bind(settings.text_reader)
            .bind(settings.libras)
            .fetch_one(&self.pool)
            .await?)
    }

    /// impact_stats
    ///
    /// Compiles the landing page counters in a single round trip.
    async fn impact_stats(&self) -> RepoResult<ImpactStats> {
        let (people_trained, courses_available, partner_companies, hires) =
            sqlx::query_as::<_, (i64, i64, i64, i64)>(
                r#"
                SELECT
                    (SELECT COUNT(DISTINCT user_id) FROM inscricoes_cursos WHERE status = 'concluido'),
                    (SELECT COUNT(*) FROM cursos),
                    (SELECT COUNT(*) FROM empresas),
                    (SELECT COUNT(*) FROM candidaturas WHERE status = 'aceita')
                "#,
            )
            .fetch_one(&self.pool)
            .await?;

        Ok(ImpactStats {
            people_trained,
            courses_available,
            partner_companies,
            hires,
        })
    }
}
