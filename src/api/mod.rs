pub mod pagination;
pub mod payload;

pub use pagination::{ListQuery, PaginationPolicy, PaginationResult, PaginationWindow};
pub use payload::{parse_body, parse_update, update_fields, JsonBody, Payload};
