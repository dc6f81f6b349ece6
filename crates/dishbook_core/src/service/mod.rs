//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store calls into use-case level APIs.
//! - Keep the CLI decoupled from storage and provider details.

pub mod categorization_service;

pub use categorization_service::{
    CategorizationError, CategorizationResult, CategorizationService,
};
