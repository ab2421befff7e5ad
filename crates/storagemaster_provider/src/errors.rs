//! Provider errors

use thiserror;

pub type Result<T> = std::result::Result<T, Error>;

/// General purpose [`super::Provider`] error handling.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("config error: {0}")]
    ConfigError(#[from] ConfigError),

    #[error("credentials error: {0}")]
    AuthError(#[from] aws_credential_types::provider::error::CredentialsError),

    #[error("object not found: {key}")]
    ObjectNotFound { key: String },

    #[error("extra not found: {0}")]
    ExtraNotFound(String),

    #[error("extra `{key}` must be a {expected}")]
    InvalidExtra { key: String, expected: &'static str },

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("{operation} failed for key `{key}`: {source}")]
    Backend {
        operation: &'static str,
        key: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
}

impl Error {
    pub(crate) fn backend<E>(operation: &'static str, key: &str, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Backend {
            operation,
            key: key.to_string(),
            source: Box::new(source),
        }
    }

    pub(crate) fn object_not_found(key: &str) -> Self {
        Error::ObjectNotFound {
            key: key.to_string(),
        }
    }

    /// True for both absent objects and absent [`super::Extras`] entries.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::ObjectNotFound { .. } | Error::ExtraNotFound(_))
    }
}

/// Error type used when validating provider configuration, including parsing
/// [`super::CredentialSource`] descriptors.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown credential mode: {0}")]
    UnknownCredentialMode(String),

    #[error("shared credentials need to be defined as 'shared:CREDENTIALS_FILE:PROFILE_NAME'")]
    MalformedSharedCredentials,

    #[error("missing required field: {0}")]
    MissingField(&'static str),
}
