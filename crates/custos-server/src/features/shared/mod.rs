//! Types shared across feature slices

pub mod pagination;

pub use pagination::PaginationParams;
