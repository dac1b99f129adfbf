pub mod auth;
pub mod headers;
pub mod json;
pub mod rate_limit;
