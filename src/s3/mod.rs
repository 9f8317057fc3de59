//! Bucket browsing: key helpers, object store access, and download URLs.

pub mod paths;
pub mod signer;
pub mod store;

use std::fmt;

pub use signer::Signer;
pub use store::ObjectStore;

/// Location of an object (or prefix) in a bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct S3Handle {
    pub bucket: String,
    pub key: String,
}

impl S3Handle {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

impl fmt::Display for S3Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.key)
    }
}
