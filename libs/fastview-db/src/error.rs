use fastview_security::ConfigurationError;

/// Errors from running permission-scoped queries.
#[derive(thiserror::Error, Debug)]
pub enum DbError {
    /// Database error occurred during query execution.
    #[error("database error: {0}")]
    Db(#[from] sea_orm::DbErr),

    /// The permission could not be expressed against the entity.
    #[error("invalid permission: {0}")]
    Configuration(#[from] ConfigurationError),
}
