use thiserror::Error;

/// Error types for the compute crate. Every operation returns one of these;
/// the HTTP layer maps them onto status codes.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Input failed a domain rule before touching the database
    #[error("Validation error: {0}")]
    Validation(String),

    /// The identity is not allowed to see or mutate the record
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// Lookup by id came up empty
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i32 },

    /// Deletion blocked by dependent records
    #[error("{entity} has {dependents} dependent record(s) and cannot be deleted")]
    Protected { entity: &'static str, dependents: u64 },

    /// Requested state change is not allowed from the current state
    #[error("Invalid transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    /// Error from the database operations
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

/// Result type alias for compute operations
pub type Result<T> = std::result::Result<T, CoreError>;
