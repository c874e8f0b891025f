// Sentinel Comments - generic commenting for any registered owner type

// Core types and primitives
pub mod core;

// Infrastructure - storage, viewer context and request middleware
pub mod infrastructure;

// Commenting capability shared by every owner type
pub mod comments;

// Domain-Driven Organization - owner entities organized by domain
pub mod domains;

// Application wiring
pub mod app;
pub mod app_state;
pub mod config;

// Common utilities
pub mod error;
pub mod data_seeder;

// Re-exports for convenience
pub use error::{AppError, AppResult};
