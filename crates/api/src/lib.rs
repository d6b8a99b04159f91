//! Tonggwan API - CLI orchestrator
//!
//! This crate provides the CLI binary, the wire DTOs consumed by the
//! presentation layer, and command orchestration over the engine and
//! notices crates.

pub mod commands;
pub mod context;
pub mod dto;

pub use context::AppContext;
