//! Shared types for the store backend
//!
//! Domain models, the unified error system, and small utilities used by
//! both the HTTP server and any future tooling (CLI importers, admin jobs).
//!
//! The `db` feature gates sqlx derives so that frontends can depend on the
//! models without pulling in the database stack.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use serde::{Deserialize, Serialize};
