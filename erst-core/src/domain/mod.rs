//! Core domain types
//!
//! These types describe a background simulation job independently of how it
//! is executed. The scheduler owns the records; callers only see ids and
//! status values.

pub mod job;
