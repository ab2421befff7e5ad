use async_trait::async_trait;
use bytes::Bytes;

mod config;
pub use config::{FilesystemConfig, MemoryConfig, ProviderConfig};
mod credentials;
pub use credentials::CredentialSource;
mod errors;
pub use errors::{ConfigError, Error, Result};
mod extras;
pub use extras::{
    ExtraValue, Extras, ACL, CACHE_CONTROL, CONTENT_DISPOSITION, CONTENT_ENCODING, CONTENT_TYPE,
};
mod fs;
pub use fs::FilesystemProvider;
mod key;
pub use key::KeyPrefix;
mod memory;
pub use memory::MemoryProvider;
pub mod s3;
pub use s3::S3Config;
pub use s3::S3Provider;

/// Provides a common interface for storing opaque blobs in different kinds of backend object
/// stores.
///
/// Keys are plain strings; each implementation scopes them under its own configured
/// [`KeyPrefix`] before talking to the backend. Bodies are whole in-memory [`bytes::Bytes`]
/// values, there is no streaming.
///
/// Backend-specific write options travel through the optional [`Extras`] bag passed to
/// [`Provider::put`] so that new options never widen this trait. Implementations ignore keys
/// they don't recognize.
#[async_trait]
pub trait Provider: Send + Sync + 'static {
    /// Returns `Ok(false)` when the backend reports the object as absent; any other failure is
    /// an error.
    async fn exists(&self, key: &str) -> Result<bool>;

    async fn get(&self, key: &str) -> Result<Bytes>;

    async fn put(&self, key: &str, body: Bytes, extras: Option<&Extras>) -> Result<()>;

    /// Deleting a key that was never written succeeds.
    async fn delete(&self, key: &str) -> Result<()>;
}
