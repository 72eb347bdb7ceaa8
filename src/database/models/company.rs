use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use crate::api::payload::{optional_non_empty, require_non_empty, Payload};
use crate::api::PaginationWindow;
use crate::database::manager::DatabaseError;
use crate::database::partial_update::UpdateStatement;
use crate::error::ApiError;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Company {
    pub handle: String,
    pub name: Option<String>,
    pub logo: Option<String>,
    pub email: Option<String>,
    #[serde(skip_serializing)]
    pub password: String,
}

/// Single-company view with its employees and job postings
#[derive(Debug, Serialize)]
pub struct CompanyDetail {
    #[serde(flatten)]
    pub company: Company,
    pub users: Vec<String>,
    pub jobs: Vec<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewCompany {
    pub handle: String,
    pub password: String,
    pub name: Option<String>,
    pub logo: Option<String>,
    pub email: Option<String>,
}

impl Payload for NewCompany {
    fn validate(&self) -> Result<(), ApiError> {
        require_non_empty("handle", &self.handle)?;
        require_non_empty("password", &self.password)?;
        optional_non_empty("name", self.name.as_deref())
    }
}

/// PATCH body. The handle is the company's identity and cannot change.
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompanyUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl Payload for CompanyUpdate {
    fn validate(&self) -> Result<(), ApiError> {
        optional_non_empty("name", self.name.as_deref())?;
        optional_non_empty("password", self.password.as_deref())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompanyLogin {
    pub handle: String,
    pub password: String,
}

impl Payload for CompanyLogin {
    fn validate(&self) -> Result<(), ApiError> {
        require_non_empty("handle", &self.handle)?;
        require_non_empty("password", &self.password)
    }
}

pub struct CompanyRepository {
    pool: PgPool,
}

impl CompanyRepository {
    pub const TABLE: &'static str = "companies";
    pub const KEY: &'static str = "handle";

    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(
        &self,
        search: Option<&str>,
        window: PaginationWindow,
    ) -> Result<Vec<Company>, DatabaseError> {
        let rows = match search {
            Some(term) => {
                sqlx::query_as::<_, Company>(
                    "SELECT * FROM companies WHERE name ILIKE $1 OR handle ILIKE $1 ORDER BY handle LIMIT $2 OFFSET $3",
                )
                .bind(format!("%{}%", term))
                .bind(window.limit)
                .bind(window.offset)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Company>("SELECT * FROM companies ORDER BY handle LIMIT $1 OFFSET $2")
                    .bind(window.limit)
                    .bind(window.offset)
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(rows)
    }

    pub async fn find(&self, handle: &str) -> Result<Option<Company>, DatabaseError> {
        let row = sqlx::query_as::<_, Company>("SELECT * FROM companies WHERE handle=$1")
            .bind(handle)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn exists(&self, handle: &str) -> Result<bool, DatabaseError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM companies WHERE handle=$1)")
            .bind(handle)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    /// Insert a company whose password has already been hashed
    pub async fn create(&self, new: &NewCompany, password_hash: &str) -> Result<Company, DatabaseError> {
        let row = sqlx::query_as::<_, Company>(
            "INSERT INTO companies (handle, password, name, logo, email) VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(&new.handle)
        .bind(password_hash)
        .bind(&new.name)
        .bind(&new.logo)
        .bind(&new.email)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn update(&self, statement: &UpdateStatement) -> Result<Option<Company>, DatabaseError> {
        statement.fetch_optional(&self.pool).await
    }

    pub async fn delete(&self, handle: &str) -> Result<Option<Company>, DatabaseError> {
        let row = sqlx::query_as::<_, Company>("DELETE FROM companies WHERE handle=$1 RETURNING *")
            .bind(handle)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }
}
