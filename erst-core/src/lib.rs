//! Erst Core
//!
//! Core types shared by the Erst job scheduler and CLI.
//!
//! This crate contains:
//! - Domain types: job identity and lifecycle status
//! - DTOs: serializable job views for command output
//! - Simulation wire types exchanged with the simulator process

pub mod domain;
pub mod dto;
pub mod simulation;
