use clap::Parser;
use std::path::PathBuf;

use crate::config::UploadConfig;

/// s3-image-upload - create an S3 bucket and upload an image to it
///
/// Credentials are always read interactively from standard input.
#[derive(Parser, Debug)]
#[command(name = "s3-image-upload")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// YAML configuration file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// AWS region for the client and the bucket
    #[arg(long)]
    pub region: Option<String>,

    /// Bucket to create
    #[arg(long)]
    pub bucket: Option<String>,

    /// Local image to upload
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Destination object key
    #[arg(long)]
    pub key: Option<String>,

    /// Custom S3 endpoint URL (MinIO, LocalStack)
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Disable SSL certificate verification
    #[arg(long)]
    pub insecure: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Override `config` with the flags that were given
    pub fn apply_to(&self, mut config: UploadConfig) -> UploadConfig {
        if let Some(region) = &self.region {
            config.region = region.clone();
        }
        if let Some(bucket) = &self.bucket {
            config.bucket = bucket.clone();
        }
        if let Some(file) = &self.file {
            config.image_path = file.clone();
        }
        if let Some(key) = &self.key {
            config.upload_key = key.clone();
        }
        if let Some(endpoint) = &self.endpoint {
            config.endpoint = Some(endpoint.clone());
        }
        if self.insecure {
            config.insecure_tls = true;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_flags_keep_config() {
        let cli = Cli::try_parse_from(["s3-image-upload"]).unwrap();
        let config = cli.apply_to(UploadConfig::default());
        assert_eq!(config, UploadConfig::default());
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::try_parse_from([
            "s3-image-upload",
            "--region",
            "eu-west-1",
            "--bucket",
            "my-bucket",
            "--file",
            "photo.jpg",
            "--key",
            "images/photo.jpg",
            "--endpoint",
            "http://localhost:9000",
            "--insecure",
            "-v",
        ])
        .unwrap();

        assert!(cli.verbose);
        assert!(!cli.debug);

        let config = cli.apply_to(UploadConfig::default());
        assert_eq!(config.region, "eu-west-1");
        assert_eq!(config.bucket, "my-bucket");
        assert_eq!(config.image_path, PathBuf::from("photo.jpg"));
        assert_eq!(config.upload_key, "images/photo.jpg");
        assert_eq!(config.endpoint.as_deref(), Some("http://localhost:9000"));
        assert!(config.insecure_tls);
    }

    #[test]
    fn test_verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
