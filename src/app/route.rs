//! Screens and their URL-style paths.
//!
//! Routes render as paths such as `/b/<bucket>/tree/<key>` so they can be
//! typed into the go-to prompt and used as `next` targets after sign-in.
//! Path segments and the `next` value are percent-encoded.

use crate::s3::paths;
use std::borrow::Cow;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    SignIn { next: Option<String> },
    PassReset,
    PassChange { link: String },
    Buckets,
    Bucket { bucket: String, path: String },
}

impl Route {
    pub fn bucket(bucket: impl Into<String>, path: impl Into<String>) -> Self {
        Route::Bucket {
            bucket: bucket.into(),
            path: path.into(),
        }
    }

    /// Parse a route path, or an `s3://bucket/key` URL.
    pub fn parse(input: &str) -> Option<Route> {
        let input = input.trim();
        if let Some(handle) = paths::parse_s3_url(input) {
            return Some(Route::bucket(handle.bucket, handle.key));
        }
        let (path, query) = input.split_once('?').unwrap_or((input, ""));
        let rest = path.strip_prefix('/')?;
        let (head, tail) = rest.split_once('/').unwrap_or((rest, ""));
        match head {
            "signin" if tail.is_empty() => {
                let next = match query
                    .split('&')
                    .find_map(|kv| kv.strip_prefix("next="))
                    .filter(|n| !n.is_empty())
                {
                    Some(next) => Some(decode(next)?),
                    None => None,
                };
                Some(Route::SignIn { next })
            }
            "reset_password" if tail.is_empty() => Some(Route::PassReset),
            "reset_password" if !tail.contains('/') => Some(Route::PassChange {
                link: decode(tail)?,
            }),
            "b" => parse_bucket(tail),
            _ => None,
        }
    }

    /// Whether the screen shows bucket data and so needs a session.
    pub fn requires_auth(&self) -> bool {
        matches!(self, Route::Buckets | Route::Bucket { .. })
    }
}

fn decode(text: &str) -> Option<String> {
    urlencoding::decode(text).ok().map(Cow::into_owned)
}

fn decode_path(path: &str) -> Option<String> {
    let segments: Option<Vec<String>> = path.split('/').map(decode).collect();
    segments.map(|s| s.join("/"))
}

fn encode_path(path: &str) -> String {
    path.split('/')
        .map(urlencoding::encode)
        .collect::<Vec<_>>()
        .join("/")
}

fn parse_bucket(tail: &str) -> Option<Route> {
    if tail.is_empty() {
        return Some(Route::Buckets);
    }
    let (bucket, rest) = tail.split_once('/').unwrap_or((tail, ""));
    if bucket.is_empty() {
        return None;
    }
    let bucket = decode(bucket)?;
    if rest.is_empty() {
        return Some(Route::bucket(bucket, ""));
    }
    let path = rest.strip_prefix("tree")?;
    if path.is_empty() {
        return Some(Route::bucket(bucket, ""));
    }
    Some(Route::bucket(bucket, decode_path(path.strip_prefix('/')?)?))
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::SignIn { next: None } => write!(f, "/signin"),
            Route::SignIn { next: Some(next) } => {
                write!(f, "/signin?next={}", urlencoding::encode(next))
            }
            Route::PassReset => write!(f, "/reset_password"),
            Route::PassChange { link } => {
                write!(f, "/reset_password/{}", urlencoding::encode(link))
            }
            Route::Buckets => write!(f, "/b"),
            Route::Bucket { bucket, path } if path.is_empty() => {
                write!(f, "/b/{}", urlencoding::encode(bucket))
            }
            Route::Bucket { bucket, path } => write!(
                f,
                "/b/{}/tree/{}",
                urlencoding::encode(bucket),
                encode_path(path)
            ),
        }
    }
}

/// Apply navigation guards to `route`, in order:
///
/// 1. a signed-in user asking for sign-in goes to its `next` route, or to
///    `sign_in_redirect` when there is none or it does not parse;
/// 2. an anonymous user asking for a protected route goes to sign-in, with
///    the requested route as `next`.
pub fn guard(route: Route, authenticated: bool, sign_in_redirect: &str) -> Route {
    let route = match route {
        Route::SignIn { next } if authenticated => next
            .as_deref()
            .and_then(Route::parse)
            .or_else(|| Route::parse(sign_in_redirect))
            .filter(|r| !matches!(r, Route::SignIn { .. }))
            .unwrap_or(Route::Buckets),
        other => other,
    };
    if route.requires_auth() && !authenticated {
        return Route::SignIn {
            next: Some(route.to_string()),
        };
    }
    route
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_routes() {
        assert_eq!(Route::parse("/signin"), Some(Route::SignIn { next: None }));
        assert_eq!(
            Route::parse("/signin?next=/b/data"),
            Some(Route::SignIn {
                next: Some("/b/data".into())
            })
        );
        assert_eq!(Route::parse("/reset_password"), Some(Route::PassReset));
        assert_eq!(
            Route::parse("/reset_password/abc123"),
            Some(Route::PassChange {
                link: "abc123".into()
            })
        );
        assert_eq!(Route::parse("/b"), Some(Route::Buckets));
        assert_eq!(Route::parse("/b/data"), Some(Route::bucket("data", "")));
        assert_eq!(
            Route::parse("/b/data/tree/raw/a.csv"),
            Some(Route::bucket("data", "raw/a.csv"))
        );
        assert_eq!(
            Route::parse("s3://data/raw/"),
            Some(Route::bucket("data", "raw/"))
        );
        assert_eq!(Route::parse("/nope"), None);
        assert_eq!(Route::parse("/b/data/blob/x"), None);
        assert_eq!(Route::parse("b/data"), None);
    }

    #[test]
    fn test_display_parses_back() {
        for route in [
            Route::SignIn { next: None },
            Route::SignIn {
                next: Some("/b/data/tree/raw/".into()),
            },
            Route::PassReset,
            Route::PassChange { link: "xyz".into() },
            Route::Buckets,
            Route::bucket("data", ""),
            Route::bucket("data", "raw/2024/"),
            Route::bucket("data", "q?x.csv"),
            Route::bucket("data", "a&b/100%/c d#1.txt"),
            Route::SignIn {
                next: Some("/b/data/tree/q%3Fx.csv".into()),
            },
        ] {
            assert_eq!(Route::parse(&route.to_string()), Some(route));
        }
    }

    #[test]
    fn test_special_keys_survive_sign_in_redirect() {
        for key in ["q?x.csv", "a&next=/b/other", "100%/done", "dir/with space/"] {
            let route = Route::bucket("data", key);
            let sign_in = guard(route.clone(), false, "/b");
            assert!(matches!(sign_in, Route::SignIn { .. }));
            let reparsed = Route::parse(&sign_in.to_string()).unwrap();
            assert_eq!(guard(reparsed, true, "/b"), route);
        }
    }

    #[test]
    fn test_typed_paths_are_decoded() {
        assert_eq!(
            Route::parse("/b/data/tree/raw/a%20b.csv"),
            Some(Route::bucket("data", "raw/a b.csv"))
        );
        assert_eq!(Route::parse("/b/data/tree/%FF"), None);
    }

    #[test]
    fn test_signed_in_user_leaves_sign_in() {
        let route = Route::SignIn {
            next: Some("/b/data/tree/raw/".into()),
        };
        assert_eq!(guard(route, true, "/b"), Route::bucket("data", "raw/"));
        assert_eq!(guard(Route::SignIn { next: None }, true, "/b"), Route::Buckets);
        assert_eq!(
            guard(Route::SignIn { next: None }, true, "/signin"),
            Route::Buckets
        );
    }

    #[test]
    fn test_anonymous_user_is_sent_to_sign_in() {
        assert_eq!(
            guard(Route::bucket("data", "raw/"), false, "/b"),
            Route::SignIn {
                next: Some("/b/data/tree/raw/".into())
            }
        );
        assert_eq!(guard(Route::PassReset, false, "/b"), Route::PassReset);
        assert_eq!(
            guard(Route::SignIn { next: None }, false, "/b"),
            Route::SignIn { next: None }
        );
    }
}
