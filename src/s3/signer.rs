//! Download URLs for objects.

use super::store::{FsStore, StoreError};
use super::S3Handle;
use url::Url;

pub trait Signer: Send + Sync {
    fn signed_s3_url(&self, handle: &S3Handle) -> Result<String, StoreError>;
}

/// Local objects download straight from disk.
impl Signer for FsStore {
    fn signed_s3_url(&self, handle: &S3Handle) -> Result<String, StoreError> {
        let path = self.object_path(&handle.bucket, &handle.key)?;
        let path = std::path::absolute(&path)?;
        Url::from_file_path(&path)
            .map(String::from)
            .map_err(|()| StoreError::Url(handle.clone()))
    }
}

/// Unsigned path-style URLs for publicly readable buckets.
#[derive(Debug, Clone)]
pub struct PublicSigner {
    endpoint: Url,
}

impl PublicSigner {
    pub fn new(endpoint: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            endpoint: Url::parse(endpoint)?,
        })
    }
}

impl Signer for PublicSigner {
    fn signed_s3_url(&self, handle: &S3Handle) -> Result<String, StoreError> {
        let mut url = self.endpoint.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| StoreError::Url(handle.clone()))?;
            segments.pop_if_empty().push(&handle.bucket);
            segments.extend(handle.key.split('/'));
        }
        Ok(url.into())
    }
}
