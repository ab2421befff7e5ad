use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;

use super::errors::{Error, Result};
use super::extras::Extras;
use super::key::KeyPrefix;
use super::Provider;

/// A [`Provider`] that keeps each blob in its own file under a root directory.
///
/// No [`Extras`] keys are recognized. Keys whose effective form would leave the root directory
/// are rejected with [`Error::InvalidKey`].
#[derive(Clone, Debug)]
pub struct FilesystemProvider {
    root: PathBuf,
    prefix: KeyPrefix,
}

impl FilesystemProvider {
    pub fn new(root: impl Into<PathBuf>, prefix: impl Into<KeyPrefix>) -> Self {
        Self {
            root: root.into(),
            prefix: prefix.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn prepare_key(&self, key: &str) -> Result<(String, PathBuf)> {
        let key = self.prefix.apply(key);
        // an empty prefix leaves the key as given, so clean it up the same way a prefix would
        let relative = KeyPrefix::new(".").apply(&key);
        if relative == "."
            || relative == ".."
            || relative.starts_with("../")
            || key.starts_with('/')
        {
            return Err(Error::InvalidKey(key));
        }
        let path = self.root.join(relative);
        Ok((key, path))
    }
}

#[async_trait]
impl Provider for FilesystemProvider {
    async fn exists(&self, key: &str) -> Result<bool> {
        let (key, path) = self.prepare_key(key)?;
        match tokio::fs::metadata(&path).await {
            Ok(metadata) => Ok(metadata.is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Error::backend("stat file", &key, e)),
        }
    }

    async fn get(&self, key: &str) -> Result<Bytes> {
        let (key, path) = self.prepare_key(key)?;
        match tokio::fs::read(&path).await {
            Ok(body) => Ok(Bytes::from(body)),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(Error::object_not_found(&key)),
            Err(e) => Err(Error::backend("read file", &key, e)),
        }
    }

    async fn put(&self, key: &str, body: Bytes, _extras: Option<&Extras>) -> Result<()> {
        let (key, path) = self.prepare_key(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::backend("create directory", &key, e))?;
        }
        tokio::fs::write(&path, &body)
            .await
            .map_err(|e| Error::backend("write file", &key, e))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let (key, path) = self.prepare_key(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::backend("remove file", &key, e)),
        }
    }
}
