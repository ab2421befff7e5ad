use std::path::PathBuf;
use std::str::FromStr;

use aws_config::environment::credentials::EnvironmentVariableCredentialsProvider;
use aws_config::profile::profile_file::{ProfileFileKind, ProfileFiles};
use aws_config::profile::ProfileFileCredentialsProvider;
use aws_credential_types::provider::{ProvideCredentials, SharedCredentialsProvider};

use super::errors::{ConfigError, Result};

/// Where an [`super::S3Provider`] gets its credentials from.
///
/// Parsed from descriptors of the form `<mode>:<fields>`:
///
/// * `env:` reads `AWS_ACCESS_KEY_ID` and friends from the process environment each time
///   credentials are needed
/// * `shared:<path>:<profile>` reads `profile` from the shared credentials file at `path`
/// * `iam:` leaves resolution to the SDK's default chain (instance/task roles and so on)
///
/// Anything else is rejected; there is no fallback mode.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CredentialSource {
    Environment,
    SharedFile { path: PathBuf, profile: String },
    Implicit,
}

impl FromStr for CredentialSource {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split(':').collect();
        if fields.len() < 2 {
            return Err(ConfigError::UnknownCredentialMode(s.to_string()));
        }
        match fields[0] {
            "env" => Ok(CredentialSource::Environment),
            "iam" => Ok(CredentialSource::Implicit),
            "shared" => match fields[..] {
                [_, path, profile] if !path.is_empty() && !profile.is_empty() => {
                    Ok(CredentialSource::SharedFile {
                        path: PathBuf::from(path),
                        profile: profile.to_string(),
                    })
                }
                _ => Err(ConfigError::MalformedSharedCredentials),
            },
            mode => Err(ConfigError::UnknownCredentialMode(mode.to_string())),
        }
    }
}

impl CredentialSource {
    /// Builds the SDK credentials provider for this source, or `None` when the SDK's default
    /// chain should be left in place.
    pub fn provider(&self) -> Option<SharedCredentialsProvider> {
        match self {
            CredentialSource::Environment => Some(SharedCredentialsProvider::new(
                EnvironmentVariableCredentialsProvider::new(),
            )),
            CredentialSource::SharedFile { path, profile } => {
                let files = ProfileFiles::builder()
                    .with_file(ProfileFileKind::Credentials, path)
                    .build();
                Some(SharedCredentialsProvider::new(
                    ProfileFileCredentialsProvider::builder()
                        .profile_files(files)
                        .profile_name(profile)
                        .build(),
                ))
            }
            CredentialSource::Implicit => None,
        }
    }

    /// Like [`CredentialSource::provider`], but also loads the credentials once so that missing
    /// or unreadable credentials surface here rather than on the first request.
    pub(crate) async fn resolve(&self) -> Result<Option<SharedCredentialsProvider>> {
        let provider = match self.provider() {
            Some(provider) => provider,
            None => return Ok(None),
        };
        let _credentials = provider.provide_credentials().await?;
        tracing::debug!(source = ?self, "credentials loaded");
        Ok(Some(provider))
    }
}
