//! Path matching logic.
//!
//! # Responsibilities
//! - Match an exact page path
//! - Match a path prefix
//! - Match static asset paths (last segment carries a file extension)
//! - Canonicalize raw request paths the way the static file server reads them
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - No regex to guarantee O(n) matching

use percent_encoding::percent_decode_str;

/// Trait for matching request paths against conditions.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the path matches this condition.
    fn matches(&self, path: &str) -> bool;
}

/// Matches one path exactly, ignoring a trailing slash.
#[derive(Debug, Clone)]
pub struct ExactPathMatcher {
    path: String,
}

impl ExactPathMatcher {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl Matcher for ExactPathMatcher {
    fn matches(&self, path: &str) -> bool {
        normalize(path) == self.path
    }
}

/// Matches the request path prefix.
#[derive(Debug, Clone)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    /// Create a new path prefix matcher.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Matcher for PathPrefixMatcher {
    fn matches(&self, path: &str) -> bool {
        path.starts_with(&self.prefix)
    }
}

/// Extensions that name rendered pages rather than assets.
const PAGE_EXTENSIONS: [&str; 2] = ["html", "htm"];

/// Matches files such as `/logo.png` or `/fonts/cairo.woff2`.
///
/// Exported pages (`/users.html`) are not assets and never match.
#[derive(Debug, Clone, Default)]
pub struct StaticAssetMatcher;

impl Matcher for StaticAssetMatcher {
    fn matches(&self, path: &str) -> bool {
        path.rsplit('/')
            .next()
            .and_then(|segment| segment.rsplit_once('.'))
            .is_some_and(|(stem, ext)| {
                !stem.is_empty()
                    && !ext.is_empty()
                    && !PAGE_EXTENSIONS.iter().any(|p| ext.eq_ignore_ascii_case(p))
            })
    }
}

/// Combines multiple matchers with OR semantics.
#[derive(Debug, Default)]
pub struct AnyMatcher {
    matchers: Vec<Box<dyn Matcher>>,
}

impl AnyMatcher {
    pub fn push(&mut self, matcher: impl Matcher + 'static) {
        self.matchers.push(Box::new(matcher));
    }
}

impl Matcher for AnyMatcher {
    fn matches(&self, path: &str) -> bool {
        self.matchers.iter().any(|m| m.matches(path))
    }
}

/// Strip a trailing slash, keeping the root intact.
pub fn normalize(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/"
    } else {
        trimmed
    }
}

/// The path a raw request URI names once percent-decoded, with empty and
/// `.` segments dropped. `None` for `..` segments or invalid UTF-8.
///
/// `/./users%2Ehtml` and `//%75sers.html` both become `/users.html`.
pub fn canonical_path(raw: &str) -> Option<String> {
    let decoded = percent_decode_str(raw).decode_utf8().ok()?;
    let mut canonical = String::with_capacity(decoded.len() + 1);
    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => return None,
            segment => {
                canonical.push('/');
                canonical.push_str(segment);
            }
        }
    }
    if decoded.ends_with('/') || canonical.is_empty() {
        canonical.push('/');
    }
    Some(canonical)
}

/// The page a path renders: `/users.html`, `/users/index.html` and
/// `/users/` all name `/users`.
pub fn page_path(path: &str) -> &str {
    let path = normalize(path);
    let path = path
        .strip_suffix("/index.html")
        .or_else(|| path.strip_suffix("/index.htm"))
        .or_else(|| path.strip_suffix(".html"))
        .or_else(|| path.strip_suffix(".htm"))
        .unwrap_or(path);
    normalize(path)
}
