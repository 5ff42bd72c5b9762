//! # Kozendo Common Library
//!
//! Shared code for the Kozendo services including:
//! - Check-in and insight domain types
//! - Configuration loading and root folder resolution
//! - Database initialization
//! - Common error type

pub mod checkin;
pub mod config;
#[cfg(feature = "sqlx")]
pub mod db;
pub mod error;
pub mod insight;

pub use checkin::{CheckIn, Language, Vibe};
pub use error::{Error, Result};
pub use insight::{Insight, InsightSource, MicroAction, RecommendedActivity};
