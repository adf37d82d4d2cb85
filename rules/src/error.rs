use thiserror::Error;

/// Errors from loading or validating a rule table.
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("failed to parse rule table: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("rule table invalid: {0}")]
    Invalid(String),
}
