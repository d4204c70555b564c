//! Read operations for the activity feed

pub mod recent;

pub use recent::RecentActivityQuery;
