//! s3-image-upload - create an S3 bucket and upload one image to it

pub mod cli;
pub mod config;
pub mod core;
pub mod s3;

pub use config::UploadConfig;
pub use core::{Stage, WorkflowError};
