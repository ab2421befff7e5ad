use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use aws_sdk_s3::Client;
use bytes::Bytes;
use serde::Deserialize;

pub(crate) mod logging;
use super::credentials::CredentialSource;
use super::errors::{ConfigError, Error, Result};
use super::extras::{
    Extras, ACL, CACHE_CONTROL, CONTENT_DISPOSITION, CONTENT_ENCODING, CONTENT_TYPE,
};
use super::key::KeyPrefix;
use super::s3::logging::LoggingInterceptor;
use super::Provider;

#[derive(Clone, Debug, Deserialize)]
pub struct S3Config {
    pub bucket: String,
    #[serde(default)]
    pub prefix: String,
    pub region: String,
    /// A credentials descriptor, see [`CredentialSource`].
    pub credentials: String,
    /// Endpoint override for S3-compatible services.
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub force_path_style: bool,
}

impl S3Config {
    /// Validates the configuration, resolves credentials and builds an [`S3Provider`].
    ///
    /// Configuration errors are reported before anything touches the network. For `env:` and
    /// `shared:` credentials, the credentials are loaded once here so that missing ones fail
    /// construction instead of the first request.
    pub async fn new_provider(&self) -> Result<S3Provider> {
        if self.bucket.is_empty() {
            return Err(ConfigError::MissingField("bucket").into());
        }
        if self.region.is_empty() {
            return Err(ConfigError::MissingField("region").into());
        }
        let source: CredentialSource = self.credentials.parse()?;
        let credentials = source.resolve().await?;

        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).region(Region::new(self.region.clone()));
        if let Some(credentials) = credentials {
            loader = loader.credentials_provider(credentials);
        }
        let sdk_config = loader.load().await;

        let mut config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(self.force_path_style)
            .interceptor(LoggingInterceptor);
        if let Some(endpoint) = &self.endpoint {
            config = config.endpoint_url(endpoint);
        }

        tracing::debug!(
            bucket = %self.bucket,
            prefix = %self.prefix,
            region = %self.region,
            "s3 provider configured"
        );

        Ok(S3Provider::from_client(
            Client::from_conf(config.build()),
            self.bucket.clone(),
            self.prefix.as_str(),
        ))
    }
}

/// A [`Provider`] backed by an S3 bucket.
///
/// [`Provider::put`] recognizes the following [`Extras`] keys, all string-valued:
///
/// * `content-type`
/// * `acl` (a canned ACL such as `public-read`)
/// * `cache-control`
/// * `content-encoding`
/// * `content-disposition`
///
/// Some S3-compatible stores are only eventually consistent, in which case [`Provider::exists`]
/// and [`Provider::get`] may briefly miss a fresh write.
#[derive(Clone, Debug)]
pub struct S3Provider {
    bucket: String,
    prefix: KeyPrefix,
    client: Client,
}

impl S3Provider {
    /// Wraps an already configured client; no credential checks are performed.
    pub fn from_client(
        client: Client,
        bucket: impl Into<String>,
        prefix: impl Into<KeyPrefix>,
    ) -> Self {
        S3Provider {
            bucket: bucket.into(),
            prefix: prefix.into(),
            client,
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn prefix(&self) -> &KeyPrefix {
        &self.prefix
    }

    fn prepare_key(&self, key: &str) -> String {
        self.prefix.apply(key)
    }
}

/// Whether `err` means the object itself is absent.
///
/// S3-compatible services don't always send a body that decodes into a modeled not-found
/// error, so a bare 404 counts too. A 404 that does carry an error code only counts when the code
/// names the object; `NoSuchBucket` and friends are real failures. HEAD responses never have a
/// body, so [`Provider::exists`] cannot tell a missing bucket from a missing object.
fn is_absent<E: ProvideErrorMetadata>(err: &SdkError<E>) -> bool {
    let code = match err {
        SdkError::ServiceError(e) => e.err().code(),
        _ => None,
    };
    match code {
        Some(code) => matches!(code, "NoSuchKey" | "NotFound"),
        None => err
            .raw_response()
            .map(|response| response.status().as_u16() == 404)
            .unwrap_or(false),
    }
}

#[async_trait]
impl Provider for S3Provider {
    async fn exists(&self, key: &str) -> Result<bool> {
        let key = self.prepare_key(key);
        match self
            .client
            .head_object()
            .key(&key)
            .bucket(&self.bucket)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(SdkError::ServiceError(e)) if e.err().is_not_found() => Ok(false),
            Err(e) if is_absent(&e) => Ok(false),
            Err(e) => Err(Error::backend("head object", &key, e)),
        }
    }

    async fn get(&self, key: &str) -> Result<Bytes> {
        let key = self.prepare_key(key);
        let get_object_output = match self
            .client
            .get_object()
            .key(&key)
            .bucket(&self.bucket)
            .send()
            .await
        {
            Ok(output) => output,
            Err(SdkError::ServiceError(e)) if e.err().is_no_such_key() => {
                return Err(Error::object_not_found(&key))
            }
            Err(e) if is_absent(&e) => return Err(Error::object_not_found(&key)),
            Err(e) => return Err(Error::backend("get object", &key, e)),
        };

        let body = get_object_output
            .body
            .collect()
            .await
            .map_err(|e| Error::backend("read object body", &key, e))?;
        Ok(body.into_bytes())
    }

    async fn put(&self, key: &str, body: Bytes, extras: Option<&Extras>) -> Result<()> {
        let key = self.prepare_key(key);
        let mut request = self
            .client
            .put_object()
            .key(&key)
            .body(ByteStream::from(body))
            .bucket(&self.bucket);

        if let Some(extras) = extras {
            request = request
                .set_content_type(extras.get_str(CONTENT_TYPE)?.map(String::from))
                .set_acl(extras.get_str(ACL)?.map(ObjectCannedAcl::from))
                .set_cache_control(extras.get_str(CACHE_CONTROL)?.map(String::from))
                .set_content_encoding(extras.get_str(CONTENT_ENCODING)?.map(String::from))
                .set_content_disposition(extras.get_str(CONTENT_DISPOSITION)?.map(String::from));
        }

        let _put_object_output = request
            .send()
            .await
            .map_err(|e| Error::backend("put object", &key, e))?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let key = self.prepare_key(key);
        match self
            .client
            .delete_object()
            .key(&key)
            .bucket(&self.bucket)
            .send()
            .await
        {
            Ok(_) => Ok(()),
            // S3 itself answers 204 for absent keys, some compatible services don't
            Err(e) if is_absent(&e) => Ok(()),
            Err(e) => Err(Error::backend("delete object", &key, e)),
        }
    }
}
