//! S3 client module with AWS SigV4 signing
//!
//! This module provides:
//! - AWS Signature Version 4 signing for S3 requests
//! - Async S3 operations (create bucket, put object, upload file)
//! - Credential, ACL and bucket configuration types

pub mod client;
pub mod signer;
pub mod types;

pub use client::{default_endpoint, ClientOptions, Result, S3Client, S3Error};
pub use signer::S3SignerV4;
pub use types::{
    create_bucket_configuration, location_constraint, CannedAcl, CredentialStatus, Credentials,
    PutObjectOptions, PutObjectResponse, S3ErrorResponse, DEFAULT_REGION,
};
