//! Database access shared by Kozendo services

pub mod init;

pub use init::{create_tables, init_database, init_memory_database};
