//! Data transfer objects
//!
//! Serializable views used when job state leaves the process (JSON output).

pub mod job;
