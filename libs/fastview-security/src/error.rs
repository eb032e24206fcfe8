/// Errors raised when a permission references context that cannot exist.
///
/// These are configuration mistakes, not runtime conditions: they surface
/// when a restriction is built or a viewgroup is validated, never as a
/// silent denial. Insufficient context during `check` is plain `false`.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// An owner field is not part of the target schema.
    #[error("unknown field '{field}' on resource '{resource}'")]
    UnknownField { resource: String, field: String },

    /// A capability permission has no resource type to derive its name from.
    #[error("capability permission '{action}' requires a resource type")]
    MissingResourceType { action: String },

    /// Permissions were configured for actions that have no view.
    #[error("permissions defined without views: {}", .actions.join(", "))]
    UnknownActions { actions: Vec<String> },

    #[error(
        "action must contain only alphanumeric characters or underscores, got: '{0}'"
    )]
    InvalidAction(String),

    #[error("expected capability format 'app_label.codename', got: '{0}'")]
    InvalidCapability(String),

    #[error("expected resource type format 'app_label.model_name', got: '{0}'")]
    InvalidResourceType(String),
}

pub(crate) fn validate_action(action: &str) -> Result<(), ConfigurationError> {
    if action.is_empty()
        || !action
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(ConfigurationError::InvalidAction(action.to_owned()));
    }
    Ok(())
}
