// Route handlers, one module per resource
pub mod applications;
pub mod auth;
pub mod companies;
pub mod jobs;
pub mod system;
pub mod users;
