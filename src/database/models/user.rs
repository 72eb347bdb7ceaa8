use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use crate::api::payload::{optional_non_empty, require_non_empty, Payload};
use crate::api::PaginationWindow;
use crate::database::manager::DatabaseError;
use crate::database::partial_update::UpdateStatement;
use crate::error::ApiError;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub photo: Option<String>,
    pub current_company: Option<String>,
    #[serde(skip_serializing)]
    pub password: String,
}

/// Single-user view with the ids of jobs applied to
#[derive(Debug, Serialize)]
pub struct UserDetail {
    #[serde(flatten)]
    pub user: User,
    pub jobs: Vec<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub photo: Option<String>,
    pub current_company: Option<String>,
}

impl Payload for NewUser {
    fn validate(&self) -> Result<(), ApiError> {
        require_non_empty("username", &self.username)?;
        require_non_empty("password", &self.password)?;
        optional_non_empty("current_company", self.current_company.as_deref())
    }
}

/// PATCH body. The username is the user's identity and cannot change.
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl Payload for UserUpdate {
    fn validate(&self) -> Result<(), ApiError> {
        optional_non_empty("current_company", self.current_company.as_deref())?;
        optional_non_empty("password", self.password.as_deref())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserLogin {
    pub username: String,
    pub password: String,
}

impl Payload for UserLogin {
    fn validate(&self) -> Result<(), ApiError> {
        require_non_empty("username", &self.username)?;
        require_non_empty("password", &self.password)
    }
}

pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub const TABLE: &'static str = "users";
    pub const KEY: &'static str = "username";

    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(
        &self,
        search: Option<&str>,
        window: PaginationWindow,
    ) -> Result<Vec<User>, DatabaseError> {
        let rows = match search {
            Some(term) => {
                sqlx::query_as::<_, User>(
                    "SELECT * FROM users \
                     WHERE concat_ws(' ', first_name, last_name) ILIKE $1 OR username ILIKE $1 \
                     ORDER BY username LIMIT $2 OFFSET $3",
                )
                .bind(format!("%{}%", term))
                .bind(window.limit)
                .bind(window.offset)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY username LIMIT $1 OFFSET $2")
                    .bind(window.limit)
                    .bind(window.offset)
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(rows)
    }

    pub async fn find(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        let row = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username=$1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn exists(&self, username: &str) -> Result<bool, DatabaseError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username=$1)")
            .bind(username)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    /// Usernames of everyone currently employed by a company
    pub async fn usernames_for_company(&self, handle: &str) -> Result<Vec<String>, DatabaseError> {
        let names = sqlx::query_scalar("SELECT username FROM users WHERE current_company=$1 ORDER BY username")
            .bind(handle)
            .fetch_all(&self.pool)
            .await?;
        Ok(names)
    }

    /// Insert a user whose password has already been hashed
    pub async fn create(&self, new: &NewUser, password_hash: &str) -> Result<User, DatabaseError> {
        let row = sqlx::query_as::<_, User>(
            "INSERT INTO users (username, password, first_name, last_name, email, photo, current_company) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        )
        .bind(&new.username)
        .bind(password_hash)
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(&new.email)
        .bind(&new.photo)
        .bind(&new.current_company)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn update(&self, statement: &UpdateStatement) -> Result<Option<User>, DatabaseError> {
        statement.fetch_optional(&self.pool).await
    }

    pub async fn delete(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        let row = sqlx::query_as::<_, User>("DELETE FROM users WHERE username=$1 RETURNING *")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }
}
