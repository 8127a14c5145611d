use chrono::{DateTime, Utc};
use sqlx::{PgPool, Pool, Postgres, QueryBuilder};
use uuid::Uuid;

use auji_core::error::AppError;
use auji_core::models::{
    Category, EmploymentLabel, IdentityField, JobChanges, JobFilter, JobRecord, Posting,
};
use auji_core::traits::JobStore;

const JOB_COLUMNS: &str = "id, title, company, location, description, detail_url, apply_url, url, \
     source, category, employment_type, posted_at, created_at, updated_at";

/// PostgreSQL-backed store for scraped job postings.
#[derive(Clone)]
pub struct JobRepository {
    pool: Pool<Postgres>,
}

impl JobRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Look up a single job by primary key.
    pub async fn get(&self, id: Uuid) -> Result<Option<JobRecord>, AppError> {
        let row = sqlx::query_as::<_, JobRow>(&format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(row.map(Into::into))
    }
}

// -- Internal row type for sqlx deserialization --

#[derive(sqlx::FromRow)]
struct JobRow {
    id: Uuid,
    title: String,
    company: String,
    location: Option<String>,
    description: Option<String>,
    detail_url: Option<String>,
    apply_url: Option<String>,
    url: Option<String>,
    source: String,
    category: Option<String>,
    employment_type: Option<String>,
    posted_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<JobRow> for JobRecord {
    fn from(row: JobRow) -> Self {
        JobRecord {
            id: row.id,
            title: row.title,
            company: row.company,
            location: row.location,
            description: row.description,
            detail_url: row.detail_url,
            apply_url: row.apply_url,
            url: row.url,
            source: row.source,
            category: row.category.map(Category::from),
            employment_type: row.employment_type.map(EmploymentLabel::from),
            posted_at: row.posted_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Append the `WHERE` clause for a read-side filter.
fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &JobFilter) {
    qb.push(" WHERE TRUE");

    if !filter.categories.is_empty() {
        let names: Vec<String> = filter.categories.iter().map(|c| c.as_str().to_string()).collect();
        qb.push(" AND category = ANY(").push_bind(names).push(")");
    }
    if let Some(source) = &filter.source {
        qb.push(" AND source = ").push_bind(source.clone());
    }
    if let Some(kind) = filter.employment_type {
        qb.push(" AND employment_type = ").push_bind(kind.as_str());
    }
    if let Some(after) = filter.posted_after {
        qb.push(" AND posted_at >= ").push_bind(after);
    }
    if filter.missing_description {
        qb.push(" AND (description IS NULL OR btrim(description) = '')");
    }
}

// -- Trait implementation --

impl JobStore for JobRepository {
    async fn find_by(
        &self,
        field: IdentityField,
        value: &str,
        source: Option<&str>,
    ) -> Result<Option<JobRecord>, AppError> {
        // Column names come from a closed enum, never from input.
        let column = field.column();
        let sql = match source {
            Some(_) => format!(
                "SELECT {JOB_COLUMNS} FROM jobs WHERE {column} = $1 AND source = $2 ORDER BY created_at LIMIT 1"
            ),
            None => format!("SELECT {JOB_COLUMNS} FROM jobs WHERE {column} = $1 ORDER BY created_at LIMIT 1"),
        };

        let mut query = sqlx::query_as::<_, JobRow>(&sql).bind(value);
        if let Some(source) = source {
            query = query.bind(source);
        }

        let row = query
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(row.map(Into::into))
    }

    async fn insert(&self, posting: &Posting) -> Result<JobRecord, AppError> {
        let row = sqlx::query_as::<_, JobRow>(&format!(
            r#"
            INSERT INTO jobs (title, company, location, description, detail_url, apply_url, url,
                              source, category, employment_type, posted_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {JOB_COLUMNS}
            "#
        ))
        .bind(&posting.title)
        .bind(&posting.company)
        .bind(&posting.location)
        .bind(&posting.description)
        .bind(&posting.detail_url)
        .bind(&posting.apply_url)
        .bind(&posting.url)
        .bind(&posting.source)
        .bind(posting.category.as_ref().map(Category::as_str))
        .bind(posting.employment_type.as_ref().map(EmploymentLabel::as_str))
        .bind(posting.posted_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(row.into())
    }

    async fn update(&self, id: Uuid, changes: &JobChanges) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE jobs
            SET title = COALESCE($2, title),
                company = COALESCE($3, company),
                location = COALESCE($4, location),
                description = COALESCE($5, description),
                detail_url = COALESCE($6, detail_url),
                apply_url = COALESCE($7, apply_url),
                url = COALESCE($8, url),
                source = COALESCE($9, source),
                category = COALESCE($10, category),
                posted_at = COALESCE($11, posted_at),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&changes.title)
        .bind(&changes.company)
        .bind(&changes.location)
        .bind(&changes.description)
        .bind(&changes.detail_url)
        .bind(&changes.apply_url)
        .bind(&changes.url)
        .bind(&changes.source)
        .bind(changes.category.as_ref().map(Category::as_str))
        .bind(changes.posted_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(AppError::DatabaseError(format!("job {id} not found")));
        }
        Ok(())
    }

    async fn list(&self, filter: &JobFilter) -> Result<Vec<JobRecord>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {JOB_COLUMNS} FROM jobs"));
        push_filter(&mut qb, filter);
        qb.push(" ORDER BY posted_at DESC NULLS LAST, created_at DESC");
        if let Some(limit) = filter.limit {
            qb.push(" LIMIT ").push_bind(limit as i64);
        }
        if filter.offset > 0 {
            qb.push(" OFFSET ").push_bind(filter.offset as i64);
        }

        let rows = qb
            .build_query_as::<JobRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn count(&self) -> Result<i64, AppError> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM jobs")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;
        Ok(row.0)
    }
}
