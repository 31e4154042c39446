use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const WILDCARD: &str = "*";
pub const SEPARATOR: char = '/';

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathSegment {
    Field(String),
    Index(usize),
    Wildcard,
}

impl PathSegment {
    pub fn field(name: impl Into<String>) -> Self {
        Self::Field(name.into())
    }

    pub fn parse(raw: &str) -> Result<Self> {
        if raw == WILDCARD {
            return Ok(Self::Wildcard);
        }
        if let Some(inner) = raw.strip_prefix('[') {
            let digits = inner
                .strip_suffix(']')
                .ok_or_else(|| Error::InvalidPath(format!("unterminated index segment '{raw}'")))?;
            let index = digits
                .parse::<usize>()
                .map_err(|_| Error::InvalidPath(format!("invalid index segment '{raw}'")))?;
            return Ok(Self::Index(index));
        }
        if raw.is_empty() {
            return Err(Error::InvalidPath("empty segment".to_string()));
        }
        if raw.contains(SEPARATOR) || raw.contains(['[', ']', '*']) {
            return Err(Error::InvalidPath(format!("invalid field segment '{raw}'")));
        }
        Ok(Self::Field(raw.to_string()))
    }

    fn matches(&self, concrete: &PathSegment) -> bool {
        match self {
            Self::Wildcard => true,
            other => other == concrete,
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(name) => f.write_str(name),
            Self::Index(index) => write!(f, "[{index}]"),
            Self::Wildcard => f.write_str(WILDCARD),
        }
    }
}

/// Concrete location of one field instance inside a generated graph.
///
/// The empty path denotes the root instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldPath {
    segments: Vec<PathSegment>,
}

impl FieldPath {
    pub fn root() -> Self {
        Self::default()
    }

    /// Parses a concrete path; wildcards are rejected.
    pub fn parse<I, S>(segments: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut parsed = Vec::new();
        for raw in segments {
            let segment = PathSegment::parse(raw.as_ref())?;
            if segment == PathSegment::Wildcard {
                return Err(Error::InvalidPath(
                    "wildcard is not allowed in a concrete path".to_string(),
                ));
            }
            parsed.push(segment);
        }
        Ok(Self { segments: parsed })
    }

    pub fn child(&self, field: &str) -> Self {
        self.with(PathSegment::Field(field.to_string()))
    }

    pub fn index(&self, index: usize) -> Self {
        self.with(PathSegment::Index(index))
    }

    fn with(&self, segment: PathSegment) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.extend(self.segments.iter().cloned());
        segments.push(segment);
        Self { segments }
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of nested objects entered to reach this path.
    pub fn depth(&self) -> usize {
        self.segments
            .iter()
            .filter(|segment| matches!(segment, PathSegment::Field(_)))
            .count()
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("<root>");
        }
        write_segments(f, &self.segments)
    }
}

/// Immutable template over path segments. The wildcard `*` matches exactly
/// one segment at its depth.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct PathPattern {
    segments: Vec<PathSegment>,
}

impl PathPattern {
    pub fn parse<I, S>(segments: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let segments = segments
            .into_iter()
            .map(|raw| PathSegment::parse(raw.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        if segments.is_empty() {
            return Err(Error::InvalidPath("path must not be empty".to_string()));
        }
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Equal arity, and every non-wildcard segment equal positionally.
    pub fn matches(&self, path: &FieldPath) -> bool {
        self.segments.len() == path.segments.len()
            && self
                .segments
                .iter()
                .zip(&path.segments)
                .all(|(pattern, concrete)| pattern.matches(concrete))
    }

    /// When this pattern is strictly longer than `path` and its leading
    /// segments match it, returns the segment addressing the next level.
    pub fn next_segment_below(&self, path: &FieldPath) -> Option<&PathSegment> {
        if self.segments.len() <= path.segments.len() {
            return None;
        }
        let prefix_matches = self
            .segments
            .iter()
            .zip(&path.segments)
            .all(|(pattern, concrete)| pattern.matches(concrete));
        if prefix_matches {
            self.segments.get(path.segments.len())
        } else {
            None
        }
    }

    pub fn appended(&self, segment: PathSegment) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment);
        Self { segments }
    }
}

impl From<&FieldPath> for PathPattern {
    fn from(path: &FieldPath) -> Self {
        Self {
            segments: path.segments.clone(),
        }
    }
}

impl FromStr for PathPattern {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        Self::parse(value.split(SEPARATOR))
    }
}

impl TryFrom<Vec<String>> for PathPattern {
    type Error = Error;

    fn try_from(value: Vec<String>) -> Result<Self> {
        Self::parse(value)
    }
}

impl From<PathPattern> for Vec<String> {
    fn from(pattern: PathPattern) -> Self {
        pattern
            .segments
            .iter()
            .map(ToString::to_string)
            .collect()
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_segments(f, &self.segments)
    }
}

fn write_segments(f: &mut fmt::Formatter<'_>, segments: &[PathSegment]) -> fmt::Result {
    for (idx, segment) in segments.iter().enumerate() {
        if idx > 0 {
            write!(f, "{SEPARATOR}")?;
        }
        write!(f, "{segment}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(segments: &[&str]) -> FieldPath {
        FieldPath::parse(segments).expect("concrete path")
    }

    fn pattern(segments: &[&str]) -> PathPattern {
        PathPattern::parse(segments).expect("pattern")
    }

    #[test]
    fn exact_pattern_matches_only_identical_path() {
        let p = pattern(&["addresses", "[1]", "city"]);
        assert!(p.matches(&path(&["addresses", "[1]", "city"])));
        assert!(!p.matches(&path(&["addresses", "[0]", "city"])));
        assert!(!p.matches(&path(&["addresses", "[1]", "street"])));
    }

    #[test]
    fn wildcard_matches_any_single_segment() {
        let p = pattern(&["addresses", "*", "street"]);
        assert!(p.matches(&path(&["addresses", "[0]", "street"])));
        assert!(p.matches(&path(&["addresses", "[7]", "street"])));
        assert!(p.matches(&path(&["addresses", "home", "street"])));
        assert!(!p.matches(&path(&["addresses", "[0]", "city"])));
    }

    #[test]
    fn unequal_lengths_never_match() {
        let p = pattern(&["addresses", "*"]);
        assert!(!p.matches(&path(&["addresses"])));
        assert!(!p.matches(&path(&["addresses", "[0]", "street"])));
        assert!(!pattern(&["*"]).matches(&FieldPath::root()));
    }

    #[test]
    fn wildcard_is_single_level() {
        let p = pattern(&["*", "street"]);
        assert!(!p.matches(&path(&["customer", "addresses", "[0]", "street"])));
        assert!(p.matches(&path(&["home", "street"])));
    }

    #[test]
    fn parses_slash_separated_strings() {
        let p: PathPattern = "addresses/[2]/city".parse().expect("parse");
        assert_eq!(
            p.segments(),
            &[
                PathSegment::field("addresses"),
                PathSegment::Index(2),
                PathSegment::field("city"),
            ]
        );
        assert_eq!(p.to_string(), "addresses/[2]/city");
    }

    #[test]
    fn rejects_malformed_segments() {
        assert!(PathPattern::parse(Vec::<String>::new()).is_err());
        assert!(PathPattern::parse(["addresses", "[x]"]).is_err());
        assert!(PathPattern::parse(["addresses", "[-1]"]).is_err());
        assert!(PathPattern::parse(["a/b"]).is_err());
        assert!(PathPattern::parse(["addresses", ""]).is_err());
        assert!(FieldPath::parse(["addresses", "*"]).is_err());
    }

    #[test]
    fn next_segment_below_reports_deeper_level() {
        let p = pattern(&["email", "[0]"]);
        assert_eq!(
            p.next_segment_below(&path(&["email"])),
            Some(&PathSegment::Index(0))
        );
        assert_eq!(p.next_segment_below(&path(&["name"])), None);
        assert_eq!(p.next_segment_below(&path(&["email", "[0]"])), None);
    }

    #[test]
    fn serde_uses_string_segments() {
        let p = pattern(&["addresses", "*", "street"]);
        let json = serde_json::to_string(&p).expect("serialize");
        assert_eq!(json, r#"["addresses","*","street"]"#);
        let back: PathPattern = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, p);
        assert!(serde_json::from_str::<PathPattern>(r#"["[oops"]"#).is_err());
    }
}
