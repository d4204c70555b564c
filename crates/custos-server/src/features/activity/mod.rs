//! Activity feed feature slice

pub mod queries;
pub mod routes;

pub use routes::activity_routes;
