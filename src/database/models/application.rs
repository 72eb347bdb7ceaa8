use serde::Serialize;
use sqlx::{FromRow, PgPool};

use crate::api::PaginationWindow;
use crate::database::manager::DatabaseError;
use crate::error::ApiError;

/// A user's application to a job posting (`jobs_users` row)
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Application {
    pub id: i32,
    pub username: String,
    pub job_id: i32,
}

pub fn parse_application_id(raw: &str) -> Result<i32, ApiError> {
    raw.parse::<i32>().map_err(|_| {
        ApiError::bad_request(format!(
            "Job Application IDs must consist only of valid integers. '{raw}' is not a valid integer."
        ))
    })
}

pub struct ApplicationRepository {
    pool: PgPool,
}

impl ApplicationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Every application to a job (the posting company's view)
    pub async fn list_for_job(
        &self,
        job_id: i32,
        window: PaginationWindow,
    ) -> Result<Vec<Application>, DatabaseError> {
        let rows = sqlx::query_as::<_, Application>(
            "SELECT * FROM jobs_users WHERE job_id=$1 ORDER BY id LIMIT $2 OFFSET $3",
        )
        .bind(job_id)
        .bind(window.limit)
        .bind(window.offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// One applicant's own applications to a job
    pub async fn list_for_job_and_user(
        &self,
        job_id: i32,
        username: &str,
        window: PaginationWindow,
    ) -> Result<Vec<Application>, DatabaseError> {
        let rows = sqlx::query_as::<_, Application>(
            "SELECT * FROM jobs_users WHERE job_id=$1 AND username=$2 ORDER BY id LIMIT $3 OFFSET $4",
        )
        .bind(job_id)
        .bind(username)
        .bind(window.limit)
        .bind(window.offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn find(&self, id: i32) -> Result<Option<Application>, DatabaseError> {
        let row = sqlx::query_as::<_, Application>("SELECT * FROM jobs_users WHERE id=$1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn exists(&self, job_id: i32, username: &str) -> Result<bool, DatabaseError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM jobs_users WHERE job_id=$1 AND username=$2)",
        )
        .bind(job_id)
        .bind(username)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Ids of the jobs a user has applied to
    pub async fn job_ids_for_user(&self, username: &str) -> Result<Vec<i32>, DatabaseError> {
        let ids = sqlx::query_scalar("SELECT job_id FROM jobs_users WHERE username=$1 ORDER BY job_id")
            .bind(username)
            .fetch_all(&self.pool)
            .await?;
        Ok(ids)
    }

    pub async fn create(&self, job_id: i32, username: &str) -> Result<Application, DatabaseError> {
        let row = sqlx::query_as::<_, Application>(
            "INSERT INTO jobs_users (job_id, username) VALUES ($1, $2) RETURNING *",
        )
        .bind(job_id)
        .bind(username)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn delete(&self, id: i32) -> Result<Option<Application>, DatabaseError> {
        let row = sqlx::query_as::<_, Application>("DELETE FROM jobs_users WHERE id=$1 RETURNING *")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }
}
