use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use bytes::Bytes;
use clap::{Parser, Subcommand, ValueEnum};

use storagemaster_provider::{
    Extras, FilesystemConfig, MemoryConfig, Provider, ProviderConfig, S3Config,
};

mod config;
use crate::config::Config;

#[derive(Parser)]
#[command(about = "store, fetch, check and delete blobs in an object store")]
struct Cli {
    /// YAML provider configuration; takes precedence over the provider flags.
    #[arg(short, long)]
    config_file: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = ProviderKind::S3)]
    provider: ProviderKind,

    /// One of `env:`, `shared:CREDENTIALS_FILE:PROFILE_NAME` or `iam:`.
    #[arg(long, default_value = "")]
    s3_credentials: String,
    #[arg(long, default_value = "")]
    s3_bucket: String,
    /// Optional subdirectory (prefix) that every key is stored under.
    #[arg(long, default_value = "")]
    s3_prefix: String,
    #[arg(long, default_value = "")]
    s3_region: String,
    #[arg(long)]
    s3_endpoint: Option<String>,
    #[arg(long)]
    s3_force_path_style: bool,

    #[arg(long)]
    fs_root: Option<PathBuf>,
    /// Prefix for the filesystem and in-memory providers.
    #[arg(long, default_value = "")]
    fs_prefix: String,

    /// Zero or more `key=value` pairs passed along with PUT, eg `content-type=text/plain`.
    #[arg(long, value_parser = parse_custom)]
    custom: Vec<(String, String)>,

    #[command(subcommand)]
    verb: Verb,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ProviderKind {
    S3,
    Filesystem,
    /// Process-local and discarded on exit, mostly useful for trying out flags.
    Memory,
}

#[derive(Debug, PartialEq, Eq, Subcommand)]
enum Verb {
    /// Write the contents of each key to stdout, each followed by a newline.
    #[command(alias = "GET")]
    Get {
        #[arg(required = true)]
        keys: Vec<String>,
    },
    /// Report whether each key exists.
    #[command(alias = "EXISTS")]
    Exists {
        #[arg(required = true)]
        keys: Vec<String>,
    },
    /// Upload a local file.
    #[command(alias = "PUT")]
    Put { src: PathBuf, dest: String },
    /// Delete each key; absent keys are not an error.
    #[command(alias = "DELETE")]
    Delete {
        #[arg(required = true)]
        keys: Vec<String>,
    },
}

fn parse_custom(s: &str) -> std::result::Result<(String, String), String> {
    match s.split_once('=') {
        Some((k, v)) if !k.is_empty() => Ok((k.to_string(), v.to_string())),
        _ => Err(format!("expected key=value, got `{s}`")),
    }
}

impl Cli {
    fn provider_config(&self) -> Result<ProviderConfig> {
        if let Some(path) = &self.config_file {
            return Ok(Config::from_file(path)?.provider);
        }
        match self.provider {
            ProviderKind::S3 => Ok(ProviderConfig::S3(S3Config {
                bucket: self.s3_bucket.clone(),
                prefix: self.s3_prefix.clone(),
                region: self.s3_region.clone(),
                credentials: self.s3_credentials.clone(),
                endpoint: self.s3_endpoint.clone(),
                force_path_style: self.s3_force_path_style,
            })),
            ProviderKind::Filesystem => match &self.fs_root {
                Some(root) => Ok(ProviderConfig::Filesystem(FilesystemConfig {
                    root: root.clone(),
                    prefix: self.fs_prefix.clone(),
                })),
                None => bail!("--fs-root is required for the filesystem provider"),
            },
            ProviderKind::Memory => Ok(ProviderConfig::Memory(MemoryConfig {
                prefix: self.fs_prefix.clone(),
            })),
        }
    }

    fn extras(&self) -> Extras {
        self.custom
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }
}

/// Runs a single verb, stopping at the first error.
async fn run(
    provider: &dyn Provider,
    verb: Verb,
    extras: Extras,
    out: &mut impl Write,
) -> Result<()> {
    match verb {
        Verb::Get { keys } => {
            for key in keys {
                let body = provider.get(&key).await?;
                out.write_all(&body)?;
                writeln!(out)?;
            }
        }
        Verb::Exists { keys } => {
            for key in keys {
                let exists = provider.exists(&key).await?;
                writeln!(out, "Does {key} exist: {exists}")?;
            }
        }
        Verb::Put { src, dest } => {
            let body = tokio::fs::read(&src)
                .await
                .with_context(|| format!("reading {}", src.display()))?;
            provider.put(&dest, Bytes::from(body), Some(&extras)).await?;
            tracing::info!(src = %src.display(), dest = %dest, "stored");
        }
        Verb::Delete { keys } => {
            for key in keys {
                provider.delete(&key).await?;
                tracing::info!(key = %key, "deleted");
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(true)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let provider = cli.provider_config()?.new_provider().await?;
    let extras = cli.extras();

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run(provider.as_ref(), cli.verb, extras, &mut out).await?;
    out.flush()?;

    Ok(())
}

#[cfg(test)]
mod test {
    use rstest::*;
    use storagemaster_provider::{MemoryProvider, ACL, CONTENT_TYPE};

    use super::*;

    #[rstest]
    #[case::simple("content-type=text/plain", Ok((String::from("content-type"), String::from("text/plain"))))]
    #[case::empty_value("acl=", Ok((String::from("acl"), String::new())))]
    #[case::equals_in_value("a=b=c", Ok((String::from("a"), String::from("b=c"))))]
    #[case::missing_equals("acl", Err(String::from("expected key=value, got `acl`")))]
    #[case::missing_key("=x", Err(String::from("expected key=value, got `=x`")))]
    fn validate_parse_custom(
        #[case] input: &str,
        #[case] expected: std::result::Result<(String, String), String>,
    ) {
        assert_eq!(parse_custom(input), expected);
    }

    #[test]
    fn parses_upper_case_verbs_and_custom_flags() {
        let cli = Cli::try_parse_from([
            "storagemaster",
            "--s3-bucket",
            "test-bucket",
            "--custom",
            "content-type=text/plain",
            "--custom",
            "acl=public-read",
            "PUT",
            "index.html",
            "site/index.html",
        ])
        .unwrap();

        assert_eq!(
            cli.verb,
            Verb::Put {
                src: PathBuf::from("index.html"),
                dest: String::from("site/index.html"),
            }
        );
        let extras = cli.extras();
        assert_eq!(extras.get_str(CONTENT_TYPE).unwrap(), Some("text/plain"));
        assert_eq!(extras.get_str(ACL).unwrap(), Some("public-read"));
    }

    #[test]
    fn get_requires_a_key() {
        assert!(Cli::try_parse_from(["storagemaster", "get"]).is_err());
    }

    #[test]
    fn filesystem_provider_requires_root() {
        let cli =
            Cli::try_parse_from(["storagemaster", "--provider", "filesystem", "exists", "a"])
                .unwrap();
        assert!(cli.provider_config().is_err());
    }

    #[test]
    fn memory_provider_from_flags() {
        let cli = Cli::try_parse_from([
            "storagemaster",
            "--provider",
            "memory",
            "--fs-prefix",
            "cache",
            "exists",
            "a",
        ])
        .unwrap();
        match cli.provider_config().unwrap() {
            ProviderConfig::Memory(cfg) => assert_eq!(cfg.prefix, "cache"),
            _ => panic!("expected memory provider"),
        }
    }

    #[tokio::test]
    async fn get_separates_bodies() {
        let provider = MemoryProvider::new("");
        for key in ["a", "b"] {
            provider
                .put(key, Bytes::from(key.to_uppercase()), None)
                .await
                .unwrap();
        }

        let mut out = Vec::new();
        let get = Verb::Get {
            keys: vec![String::from("a"), String::from("b")],
        };
        run(&provider, get, Extras::new(), &mut out).await.unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "A\nB\n");
    }

    #[tokio::test]
    async fn put_get_exists_delete() {
        let provider = MemoryProvider::new("cache");
        let mut src = tempfile::NamedTempFile::new().unwrap();
        src.write_all(b"meow").unwrap();

        let mut extras = Extras::new();
        extras.set("content-type", "text/plain");
        let put = Verb::Put {
            src: src.path().to_path_buf(),
            dest: String::from("cat.txt"),
        };
        run(&provider, put, extras, &mut Vec::new()).await.unwrap();
        assert_eq!(
            provider.content_type("cat.txt").await.unwrap().as_deref(),
            Some("text/plain")
        );

        let mut out = Vec::new();
        let get = Verb::Get {
            keys: vec![String::from("cat.txt")],
        };
        run(&provider, get, Extras::new(), &mut out).await.unwrap();
        assert_eq!(out, b"meow\n");

        let mut out = Vec::new();
        let exists = Verb::Exists {
            keys: vec![String::from("cat.txt"), String::from("dog.txt")],
        };
        run(&provider, exists, Extras::new(), &mut out).await.unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Does cat.txt exist: true\nDoes dog.txt exist: false\n"
        );

        let delete = Verb::Delete {
            keys: vec![String::from("cat.txt"), String::from("dog.txt")],
        };
        run(&provider, delete, Extras::new(), &mut Vec::new())
            .await
            .unwrap();
        assert!(!provider.exists("cat.txt").await.unwrap());
    }

    #[tokio::test]
    async fn get_stops_at_first_missing_key() {
        let provider = MemoryProvider::new("");
        provider
            .put("b", Bytes::from_static(b"b"), None)
            .await
            .unwrap();

        let mut out = Vec::new();
        let get = Verb::Get {
            keys: vec![String::from("a"), String::from("b")],
        };
        let err = run(&provider, get, Extras::new(), &mut out)
            .await
            .unwrap_err();
        assert!(out.is_empty());
        assert_eq!(format!("{err}"), "object not found: a");
    }
}
