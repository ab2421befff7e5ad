use std::path::PathBuf;
use std::sync::Arc;

use serde::Deserialize;

use super::FilesystemProvider;
use super::MemoryProvider;
use super::Provider;
use super::Result;

#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type")]
pub enum ProviderConfig {
    S3(super::s3::S3Config),
    Filesystem(FilesystemConfig),
    Memory(MemoryConfig),
}

#[derive(Clone, Debug, Deserialize)]
pub struct FilesystemConfig {
    pub root: PathBuf,
    #[serde(default)]
    pub prefix: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct MemoryConfig {
    #[serde(default)]
    pub prefix: String,
}

impl ProviderConfig {
    pub async fn new_provider(&self) -> Result<Arc<dyn Provider>> {
        match self {
            Self::S3(cfg) => Ok(Arc::new(cfg.new_provider().await?)),
            Self::Filesystem(cfg) => Ok(Arc::new(FilesystemProvider::new(
                cfg.root.clone(),
                cfg.prefix.as_str(),
            ))),
            Self::Memory(cfg) => Ok(Arc::new(MemoryProvider::new(cfg.prefix.as_str()))),
        }
    }
}

#[cfg(test)]
mod test {
    use bytes::Bytes;

    use super::*;
    use crate::{ConfigError, Error};

    #[test]
    fn deserialize_s3() {
        let config: ProviderConfig = serde_yaml::from_str(
            "
type: S3
bucket: test-bucket
region: us-east-1
credentials: shared:/home/meow/.aws/credentials:default
",
        )
        .unwrap();
        match config {
            ProviderConfig::S3(cfg) => {
                assert_eq!(cfg.bucket, "test-bucket");
                assert_eq!(cfg.prefix, "");
                assert_eq!(cfg.endpoint, None);
                assert!(!cfg.force_path_style);
            }
            _ => panic!("expected S3 config"),
        }
    }

    #[tokio::test]
    async fn bad_credentials_fail_before_construction() {
        let config: ProviderConfig = serde_yaml::from_str(
            "
type: S3
bucket: test-bucket
region: us-east-1
credentials: shared:/home/meow/.aws/credentials
",
        )
        .unwrap();
        assert!(matches!(
            config.new_provider().await,
            Err(Error::ConfigError(ConfigError::MalformedSharedCredentials))
        ));
    }

    #[tokio::test]
    async fn memory_provider_from_config() {
        let config: ProviderConfig = serde_yaml::from_str("type: Memory\nprefix: cache\n").unwrap();
        let provider = config.new_provider().await.unwrap();
        provider
            .put("a", Bytes::from_static(b"a"), None)
            .await
            .unwrap();
        assert!(provider.exists("a").await.unwrap());
    }

    #[tokio::test]
    async fn filesystem_provider_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = ProviderConfig::Filesystem(FilesystemConfig {
            root: dir.path().to_path_buf(),
            prefix: String::from("cache"),
        });
        let provider = config.new_provider().await.unwrap();
        provider
            .put("a", Bytes::from_static(b"a"), None)
            .await
            .unwrap();
        assert!(dir.path().join("cache/a").is_file());
    }
}
