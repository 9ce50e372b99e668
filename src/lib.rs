//! Company page insights: cache-aside page resolution over PostgreSQL with
//! on-demand acquisition and derived insights.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
