pub mod application;
pub mod company;
pub mod job;
pub mod user;

pub use application::{Application, ApplicationRepository};
pub use company::{Company, CompanyDetail, CompanyRepository};
pub use job::{Job, JobRepository};
pub use user::{User, UserDetail, UserRepository};
