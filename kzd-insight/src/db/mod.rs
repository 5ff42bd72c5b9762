//! Database access for kzd-insight

pub mod scans;
