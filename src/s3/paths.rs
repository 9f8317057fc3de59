//! S3 key and prefix helpers.
//!
//! Keys use `/` as the delimiter. A "directory" is the empty prefix (bucket
//! root) or any key ending in `/`.

use super::S3Handle;

pub fn is_dir(path: &str) -> bool {
    path.is_empty() || path.ends_with('/')
}

pub fn ensure_slash(path: &str) -> String {
    format!("{}/", ensure_no_slash(path))
}

pub fn ensure_no_slash(path: &str) -> &str {
    path.strip_suffix('/').unwrap_or(path)
}

/// Parent prefix of `path`. Top-level entries have the empty parent.
pub fn up(path: &str) -> String {
    let trimmed = ensure_no_slash(path);
    match trimmed.rfind('/') {
        Some(i) => trimmed[..=i].to_string(),
        None => String::new(),
    }
}

/// Directory part of `path`, including the trailing slash. A directory is
/// its own prefix.
pub fn get_prefix(path: &str) -> &str {
    match path.rfind('/') {
        Some(i) => &path[..=i],
        None => "",
    }
}

/// Last segment of `path`, without a trailing slash.
pub fn basename(path: &str) -> &str {
    let trimmed = ensure_no_slash(path);
    match trimmed.rfind('/') {
        Some(i) => &trimmed[i + 1..],
        None => trimmed,
    }
}

pub fn without_prefix<'a>(prefix: &str, path: &'a str) -> &'a str {
    path.strip_prefix(prefix).unwrap_or(path)
}

/// Every ancestor prefix of `path` from the top down, ending with `path`.
pub fn get_breadcrumbs(path: &str) -> Vec<String> {
    let mut crumbs = Vec::new();
    let mut current = path.to_string();
    while !current.is_empty() {
        let parent = up(&current);
        crumbs.push(current);
        current = parent;
    }
    crumbs.reverse();
    crumbs
}

/// Parse `s3://bucket/key`.
pub fn parse_s3_url(url: &str) -> Option<S3Handle> {
    let rest = url.strip_prefix("s3://")?;
    let (bucket, key) = rest.split_once('/').unwrap_or((rest, ""));
    if bucket.is_empty() {
        return None;
    }
    Some(S3Handle {
        bucket: bucket.to_string(),
        key: key.to_string(),
    })
}
