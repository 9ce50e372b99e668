//! Application services: acquisition, resolution pipelines, list reads.

pub mod acquisition;
pub mod browse;
pub mod error;
pub mod insights;
pub mod page;
pub mod pagination;
pub mod repos;
pub mod serializer;
