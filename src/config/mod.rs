use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::s3::ClientOptions;

/// Where the image comes from and where it goes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadConfig {
    /// AWS region for the client and the bucket (default: us-east-1)
    #[serde(default = "default_region")]
    pub region: String,

    /// Bucket to create and upload into
    #[serde(default = "default_bucket")]
    pub bucket: String,

    /// Local image file to upload
    #[serde(default = "default_image_path")]
    pub image_path: PathBuf,

    /// Destination object key
    #[serde(default = "default_upload_key")]
    pub upload_key: String,

    /// Custom S3 endpoint (MinIO, LocalStack); derived from region when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Disable TLS certificate verification
    #[serde(default)]
    pub insecure_tls: bool,
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_bucket() -> String {
    "beginner-devops-bucket".to_string()
}

fn default_image_path() -> PathBuf {
    PathBuf::from("file_storage_gateway_KMS_SMB_modified_lc.jpg")
}

fn default_upload_key() -> String {
    "uploaded-images/file_storage_gateway_KMS_SMB_modified_lc.jpg".to_string()
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            region: default_region(),
            bucket: default_bucket(),
            image_path: default_image_path(),
            upload_key: default_upload_key(),
            endpoint: None,
            insecure_tls: false,
        }
    }
}

impl UploadConfig {
    /// Connection options for the S3 client
    pub fn client_options(&self) -> ClientOptions {
        let options = ClientOptions::default().with_insecure_tls(self.insecure_tls);
        match &self.endpoint {
            Some(endpoint) => options.with_endpoint(endpoint.as_str()),
            None => options,
        }
    }

    /// Apply overrides from a variable lookup.
    ///
    /// Recognized variables:
    /// - AWS_REGION
    /// - S3_BUCKET
    /// - S3_ENDPOINT
    /// - S3_INSECURE_TLS ("true" or "1")
    /// - UPLOAD_IMAGE_PATH
    /// - UPLOAD_KEY
    ///
    /// Empty values are ignored.
    pub fn apply_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(region) = get("AWS_REGION") {
            self.region = region;
        }
        if let Some(bucket) = get("S3_BUCKET") {
            self.bucket = bucket;
        }
        if let Some(endpoint) = get("S3_ENDPOINT") {
            self.endpoint = Some(endpoint);
        }
        if let Some(insecure) = get("S3_INSECURE_TLS") {
            self.insecure_tls = insecure == "true" || insecure == "1";
        }
        if let Some(path) = get("UPLOAD_IMAGE_PATH") {
            self.image_path = PathBuf::from(path);
        }
        if let Some(key) = get("UPLOAD_KEY") {
            self.upload_key = key;
        }

        self
    }
}

/// Load configuration from a YAML file
pub fn load_from_yaml<P: AsRef<Path>>(path: P) -> Result<UploadConfig> {
    let content = std::fs::read_to_string(path.as_ref())
        .context(format!("Failed to read config file: {:?}", path.as_ref()))?;

    let config: UploadConfig =
        serde_yaml::from_str(&content).context("Failed to parse YAML configuration")?;

    Ok(config)
}

/// Apply environment overrides (and a `.env` file, if present) to `config`
pub fn apply_env(config: UploadConfig) -> UploadConfig {
    // Try to load .env file if it exists (don't fail if it doesn't)
    let _ = dotenvy::dotenv();

    config.apply_overrides(|name| std::env::var(name).ok())
}

/// Load configuration from file and environment
///
/// Defaults are overridden by the YAML file when one is given, and the
/// result is overridden by environment variables.
pub fn load_config(config_path: Option<&Path>) -> Result<UploadConfig> {
    let config = match config_path {
        Some(path) => load_from_yaml(path)?,
        None => UploadConfig::default(),
    };

    Ok(apply_env(config))
}
