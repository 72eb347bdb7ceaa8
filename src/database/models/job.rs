use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use crate::api::payload::{optional_non_empty, require_non_empty, Payload};
use crate::api::PaginationWindow;
use crate::database::manager::DatabaseError;
use crate::database::partial_update::UpdateStatement;
use crate::error::ApiError;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Job {
    pub id: i32,
    pub title: String,
    pub salary: String,
    pub equity: Option<f64>,
    /// Handle of the owning company
    pub company: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewJob {
    pub title: String,
    pub salary: String,
    pub equity: Option<f64>,
    pub company: String,
}

impl Payload for NewJob {
    fn validate(&self) -> Result<(), ApiError> {
        require_non_empty("title", &self.title)?;
        require_non_empty("salary", &self.salary)?;
        require_non_empty("company", &self.company)?;
        validate_equity(self.equity)
    }
}

/// PATCH body. A posting cannot move to another company.
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equity: Option<f64>,
}

impl Payload for JobUpdate {
    fn validate(&self) -> Result<(), ApiError> {
        optional_non_empty("title", self.title.as_deref())?;
        optional_non_empty("salary", self.salary.as_deref())?;
        validate_equity(self.equity)
    }
}

fn validate_equity(equity: Option<f64>) -> Result<(), ApiError> {
    match equity {
        Some(e) if !(0.0..=1.0).contains(&e) => Err(ApiError::bad_request(format!(
            "equity must be between 0 and 1, got {e}."
        ))),
        _ => Ok(()),
    }
}

/// Parse a job id path segment
pub fn parse_job_id(raw: &str) -> Result<i32, ApiError> {
    raw.parse::<i32>().map_err(|_| {
        ApiError::bad_request(format!(
            "Job IDs must consist only of valid integers. '{raw}' is not a valid integer."
        ))
    })
}

pub struct JobRepository {
    pool: PgPool,
}

impl JobRepository {
    pub const TABLE: &'static str = "jobs";
    pub const KEY: &'static str = "id";

    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(
        &self,
        search: Option<&str>,
        window: PaginationWindow,
    ) -> Result<Vec<Job>, DatabaseError> {
        let rows = match search {
            Some(term) => {
                sqlx::query_as::<_, Job>(
                    "SELECT * FROM jobs WHERE title ILIKE $1 OR company ILIKE $1 ORDER BY id LIMIT $2 OFFSET $3",
                )
                .bind(format!("%{}%", term))
                .bind(window.limit)
                .bind(window.offset)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Job>("SELECT * FROM jobs ORDER BY id LIMIT $1 OFFSET $2")
                    .bind(window.limit)
                    .bind(window.offset)
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(rows)
    }

    pub async fn find(&self, id: i32) -> Result<Option<Job>, DatabaseError> {
        let row = sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE id=$1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn ids_for_company(&self, handle: &str) -> Result<Vec<i32>, DatabaseError> {
        let ids = sqlx::query_scalar("SELECT id FROM jobs WHERE company=$1 ORDER BY id")
            .bind(handle)
            .fetch_all(&self.pool)
            .await?;
        Ok(ids)
    }

    pub async fn create(&self, new: &NewJob) -> Result<Job, DatabaseError> {
        let row = sqlx::query_as::<_, Job>(
            "INSERT INTO jobs (title, salary, equity, company) VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(&new.title)
        .bind(&new.salary)
        .bind(new.equity)
        .bind(&new.company)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn update(&self, statement: &UpdateStatement) -> Result<Option<Job>, DatabaseError> {
        statement.fetch_optional(&self.pool).await
    }

    pub async fn delete(&self, id: i32) -> Result<Option<Job>, DatabaseError> {
        let row = sqlx::query_as::<_, Job>("DELETE FROM jobs WHERE id=$1 RETURNING *")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }
}
