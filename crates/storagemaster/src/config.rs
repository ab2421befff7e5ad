use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use storagemaster_provider::ProviderConfig;

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    pub provider: ProviderConfig,
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Config> {
        let mut file =
            File::open(path).with_context(|| format!("opening {}", path.display()))?;
        let mut s = String::new();
        file.read_to_string(&mut s)?;
        let config: Config = serde_yaml::from_str(&s)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }
}

#[cfg(test)]
mod test {
    use std::io::Write;

    use super::*;

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "
provider:
  type: S3
  bucket: test-bucket
  prefix: cache
  region: us-east-1
  credentials: 'iam:'
  endpoint: http://localhost:9000
  force_path_style: true
"
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        match config.provider {
            ProviderConfig::S3(cfg) => {
                assert_eq!(cfg.prefix, "cache");
                assert_eq!(cfg.credentials, "iam:");
                assert_eq!(cfg.endpoint.as_deref(), Some("http://localhost:9000"));
                assert!(cfg.force_path_style);
            }
            _ => panic!("expected S3 provider"),
        }
    }

    #[test]
    fn missing_file() {
        let err = Config::from_file(Path::new("/nonexistent/storagemaster.yml")).unwrap_err();
        assert!(format!("{err}").starts_with("opening /nonexistent/storagemaster.yml"));
    }
}
