//! Browser-style path classification.
//!
//! # Responsibilities
//! - Recognize paths a registry client never requests (web UI, hub API)
//! - Keep the rules as an ordered, declarative table
//!
//! # Design Decisions
//! - Path matching is case-sensitive (except the UUID hex digits)
//! - Rules are OR'd: any match classifies the request
//! - No regex: every rule is a substring, equality or fixed-shape check

/// A single classification rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathRule {
    /// First path segment is a version 4 UUID.
    UuidFirstSegment,
    /// Path contains the substring anywhere.
    Contains(&'static str),
    /// Path equals the string exactly.
    Exact(&'static str),
}

impl PathRule {
    /// Returns true if the path matches this rule.
    pub fn matches(&self, path: &str) -> bool {
        match self {
            PathRule::UuidFirstSegment => is_uuid_v4(first_segment(path)),
            PathRule::Contains(needle) => path.contains(needle),
            PathRule::Exact(expected) => path == *expected,
        }
    }
}

/// Paths that mark a request as browser-style.
pub const BROWSER_PATH_RULES: &[PathRule] = &[
    PathRule::UuidFirstSegment,
    PathRule::Contains("/_"),
    PathRule::Contains("/r"),
    PathRule::Contains("/v2/user"),
    PathRule::Contains("/v2/orgs"),
    PathRule::Contains("/v2/_catalog"),
    PathRule::Contains("/v2/categories"),
    PathRule::Contains("/v2/feature-flags"),
    PathRule::Contains("search"),
    PathRule::Contains("source"),
    PathRule::Exact("/"),
    PathRule::Exact("/favicon.ico"),
    PathRule::Exact("/auth/profile"),
];

/// Evaluates a rule table against request paths.
#[derive(Debug, Clone)]
pub struct PathClassifier {
    rules: Vec<PathRule>,
}

impl PathClassifier {
    pub fn new(rules: Vec<PathRule>) -> Self {
        Self { rules }
    }

    /// Returns the first rule matching `path`, if any.
    pub fn matching_rule(&self, path: &str) -> Option<PathRule> {
        self.rules.iter().copied().find(|rule| rule.matches(path))
    }

    /// Returns true if the path is a browser-style (non-pull) request.
    pub fn is_browser_request(&self, path: &str) -> bool {
        self.matching_rule(path).is_some()
    }
}

impl Default for PathClassifier {
    fn default() -> Self {
        Self::new(BROWSER_PATH_RULES.to_vec())
    }
}

/// Segment between the first and second `/` of a path.
fn first_segment(path: &str) -> &str {
    path.split('/').nth(1).unwrap_or_default()
}

/// Checks the 8-4-4-4-12 hex layout with version nibble `4` and variant
/// nibble `8`, `9`, `a` or `b`, ignoring case.
pub fn is_uuid_v4(candidate: &str) -> bool {
    let bytes = candidate.as_bytes();
    if bytes.len() != 36 {
        return false;
    }

    bytes.iter().enumerate().all(|(i, &b)| match i {
        8 | 13 | 18 | 23 => b == b'-',
        14 => b == b'4',
        19 => matches!(b.to_ascii_lowercase(), b'8' | b'9' | b'a' | b'b'),
        _ => b.is_ascii_hexdigit(),
    })
}
