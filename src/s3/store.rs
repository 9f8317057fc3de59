//! Object store access.
//!
//! [`FsStore`] serves buckets from a local directory tree: every
//! subdirectory of the root is a bucket and files below it are objects.
//! Listings follow S3's `/`-delimited semantics, so a prefix that does not
//! exist lists as empty rather than failing.
//!
//! Keys are validated before touching the filesystem: `..` and `.`
//! segments, absolute keys, backslashes and NUL bytes are rejected so a key
//! can never resolve outside its bucket.

use super::paths;
use super::S3Handle;
use async_trait::async_trait;
use chrono::{DateTime, Local};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("no such bucket: {0}")]
    NoSuchBucket(String),

    #[error("no such object: {0}")]
    NoSuchKey(S3Handle),

    #[error("invalid bucket name {0:?}")]
    InvalidBucket(String),

    #[error("invalid key {0:?}")]
    InvalidKey(String),

    #[error("cannot build a download URL for {0}")]
    Url(S3Handle),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectInfo {
    pub key: String,
    pub size: u64,
    pub modified: Option<DateTime<Local>>,
}

/// One level of a bucket below `prefix`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Listing {
    pub bucket: String,
    pub prefix: String,
    /// Common prefixes, each ending in `/`.
    pub dirs: Vec<String>,
    pub files: Vec<ObjectInfo>,
}

impl Listing {
    pub fn total_size(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }

    pub fn len(&self) -> usize {
        self.dirs.len() + self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Key of the `index`-th entry, directories first.
    pub fn key_at(&self, index: usize) -> Option<&str> {
        if index < self.dirs.len() {
            return self.dirs.get(index).map(String::as_str);
        }
        self.files
            .get(index - self.dirs.len())
            .map(|f| f.key.as_str())
    }

    /// Find a file in this level by basename, ignoring ASCII case.
    pub fn find_file(&self, name: &str) -> Option<&ObjectInfo> {
        self.files
            .iter()
            .find(|f| paths::basename(&f.key).eq_ignore_ascii_case(name))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Preview {
    Text {
        text: String,
        size: u64,
        truncated: bool,
    },
    Binary {
        size: u64,
    },
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn buckets(&self) -> Result<Vec<String>, StoreError>;
    async fn list(&self, bucket: &str, prefix: &str) -> Result<Listing, StoreError>;
    /// Read at most `max_bytes` of an object.
    async fn preview(&self, handle: &S3Handle, max_bytes: usize) -> Result<Preview, StoreError>;
}

#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn bucket_dir(&self, bucket: &str) -> Result<PathBuf, StoreError> {
        let valid = !bucket.is_empty()
            && bucket != "."
            && bucket != ".."
            && !bucket.contains(['/', '\\', '\0']);
        if !valid {
            return Err(StoreError::InvalidBucket(bucket.to_string()));
        }
        Ok(self.root.join(bucket))
    }

    /// Filesystem path of `key` inside `bucket`.
    pub(crate) fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf, StoreError> {
        let dir = self.bucket_dir(bucket)?;
        if key.starts_with('/') || key.contains(['\\', '\0']) {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        let segments: Vec<&str> = paths::ensure_no_slash(key).split('/').collect();
        if key.is_empty() {
            return Ok(dir);
        }
        if segments.iter().any(|s| s.is_empty() || *s == "." || *s == "..") {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(segments.iter().fold(dir, |path, segment| path.join(segment)))
    }
}

#[async_trait]
impl ObjectStore for FsStore {
    async fn buckets(&self) -> Result<Vec<String>, StoreError> {
        let mut entries = tokio::fs::read_dir(&self.root).await?;
        let mut buckets = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_dir() {
                if let Some(name) = entry.file_name().to_str() {
                    buckets.push(name.to_string());
                }
            }
        }
        buckets.sort();
        Ok(buckets)
    }

    async fn list(&self, bucket: &str, prefix: &str) -> Result<Listing, StoreError> {
        let bucket_dir = self.bucket_dir(bucket)?;
        if !tokio::fs::try_exists(&bucket_dir).await? {
            return Err(StoreError::NoSuchBucket(bucket.to_string()));
        }
        let prefix = if prefix.is_empty() {
            String::new()
        } else {
            paths::ensure_slash(prefix)
        };
        let dir = self.object_path(bucket, &prefix)?;
        let mut listing = Listing {
            bucket: bucket.to_string(),
            prefix: prefix.clone(),
            ..Default::default()
        };

        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory) => {
                return Ok(listing);
            }
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = entries.next_entry().await? {
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                tracing::warn!(path = %entry.path().display(), "skipping non UTF-8 entry");
                continue;
            };
            let metadata = entry.metadata().await?;
            if metadata.is_dir() {
                listing.dirs.push(format!("{}{}/", prefix, name));
            } else if metadata.is_file() {
                listing.files.push(ObjectInfo {
                    key: format!("{}{}", prefix, name),
                    size: metadata.len(),
                    modified: metadata.modified().ok().map(DateTime::<Local>::from),
                });
            }
        }
        listing.dirs.sort();
        listing.files.sort_by(|a, b| a.key.cmp(&b.key));
        tracing::debug!(bucket, prefix = %listing.prefix, entries = listing.len(), "listed prefix");
        Ok(listing)
    }

    async fn preview(&self, handle: &S3Handle, max_bytes: usize) -> Result<Preview, StoreError> {
        if paths::is_dir(&handle.key) {
            return Err(StoreError::InvalidKey(handle.key.clone()));
        }
        let path = self.object_path(&handle.bucket, &handle.key)?;
        let file = match tokio::fs::File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::NoSuchKey(handle.clone()));
            }
            Err(e) => return Err(e.into()),
        };
        let size = file.metadata().await?.len();
        let mut buf = Vec::with_capacity(max_bytes.min(size as usize));
        file.take(max_bytes as u64).read_to_end(&mut buf).await?;

        if buf.contains(&0) {
            return Ok(Preview::Binary { size });
        }
        Ok(Preview::Text {
            text: String::from_utf8_lossy(&buf).into_owned(),
            size,
            truncated: (buf.len() as u64) < size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn fixture() -> (tempfile::TempDir, FsStore) {
        let dir = tempfile::tempdir().unwrap();
        let bucket = dir.path().join("data");
        fs::create_dir_all(bucket.join("raw/2024")).unwrap();
        fs::write(bucket.join("README.md"), "# Data\nhello").unwrap();
        fs::write(bucket.join("raw/a.csv"), "x,y\n1,2\n").unwrap();
        fs::write(bucket.join("raw/blob.bin"), [1u8, 0, 2, 3]).unwrap();
        fs::create_dir_all(dir.path().join("other")).unwrap();
        let store = FsStore::new(dir.path());
        (dir, store)
    }

    #[tokio::test]
    async fn test_lists_buckets() {
        let (_dir, store) = fixture();
        assert_eq!(store.buckets().await.unwrap(), vec!["data", "other"]);
    }

    #[tokio::test]
    async fn test_list_root_and_prefix() {
        let (_dir, store) = fixture();
        let root = store.list("data", "").await.unwrap();
        assert_eq!(root.dirs, vec!["raw/"]);
        assert_eq!(root.files.len(), 1);
        assert_eq!(root.files[0].key, "README.md");

        let raw = store.list("data", "raw").await.unwrap();
        assert_eq!(raw.prefix, "raw/");
        assert_eq!(raw.dirs, vec!["raw/2024/"]);
        assert_eq!(raw.key_at(0), Some("raw/2024/"));
        assert_eq!(raw.key_at(1), Some("raw/a.csv"));
        assert_eq!(raw.total_size(), 8 + 4);
    }

    #[tokio::test]
    async fn test_missing_prefix_is_empty_missing_bucket_errors() {
        let (_dir, store) = fixture();
        assert!(store.list("data", "nope/").await.unwrap().is_empty());
        assert!(matches!(
            store.list("missing", "").await,
            Err(StoreError::NoSuchBucket(_))
        ));
    }

    #[tokio::test]
    async fn test_rejects_traversal() {
        let (_dir, store) = fixture();
        assert!(matches!(
            store.list("data", "../other/").await,
            Err(StoreError::InvalidKey(_))
        ));
        assert!(matches!(
            store.list("..", "").await,
            Err(StoreError::InvalidBucket(_))
        ));
        assert!(matches!(
            store.preview(&S3Handle::new("data", "/etc/passwd"), 10).await,
            Err(StoreError::InvalidKey(_))
        ));
    }

    #[tokio::test]
    async fn test_preview_text_binary_and_truncation() {
        let (_dir, store) = fixture();
        let readme = store
            .preview(&S3Handle::new("data", "README.md"), 1024)
            .await
            .unwrap();
        assert_eq!(
            readme,
            Preview::Text {
                text: "# Data\nhello".into(),
                size: 12,
                truncated: false
            }
        );

        let head = store
            .preview(&S3Handle::new("data", "README.md"), 6)
            .await
            .unwrap();
        assert!(matches!(head, Preview::Text { truncated: true, .. }));

        let blob = store
            .preview(&S3Handle::new("data", "raw/blob.bin"), 1024)
            .await
            .unwrap();
        assert_eq!(blob, Preview::Binary { size: 4 });

        assert!(matches!(
            store.preview(&S3Handle::new("data", "gone.txt"), 10).await,
            Err(StoreError::NoSuchKey(_))
        ));
    }
}
