use std::sync::Arc;

use crate::auth::{TokenCodec, TokenError};
use crate::config::AppConfig;
use crate::database::models::{ApplicationRepository, CompanyRepository, JobRepository, UserRepository};
use crate::database::DatabaseManager;

/// Shared, immutable per-process state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseManager,
    pub tokens: Arc<TokenCodec>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(db: DatabaseManager, config: AppConfig) -> Result<Self, TokenError> {
        let tokens = TokenCodec::new(&config.security.jwt_secret)?;
        Ok(Self {
            db,
            tokens: Arc::new(tokens),
            config: Arc::new(config),
        })
    }

    pub fn companies(&self) -> CompanyRepository {
        CompanyRepository::new(self.db.pool().clone())
    }

    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.db.pool().clone())
    }

    pub fn jobs(&self) -> JobRepository {
        JobRepository::new(self.db.pool().clone())
    }

    pub fn applications(&self) -> ApplicationRepository {
        ApplicationRepository::new(self.db.pool().clone())
    }
}
