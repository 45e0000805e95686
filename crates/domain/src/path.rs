//! Path segment normalization and joining.
//!
//! Chained endpoint names arrive as identifiers, so underscores stand in for
//! hyphens: `pet_food` becomes the segment `pet-food`. Numeric segments
//! (resource ids) pass through verbatim.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single normalized URL path segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PathSegment(String);

impl PathSegment {
    /// Creates a normalized segment: underscores become hyphens in
    /// non-numeric segments; numeric segments are preserved verbatim.
    #[must_use]
    pub fn new(raw: impl AsRef<str>) -> Self {
        let raw = raw.as_ref();
        if is_numeric(raw) {
            Self(raw.to_string())
        } else {
            Self(raw.replace('_', "-"))
        }
    }

    /// Creates a segment from a numeric resource id.
    #[must_use]
    pub fn numeric(id: u64) -> Self {
        Self(id.to_string())
    }

    /// Creates a segment using an explicit case convention instead of the
    /// default underscore-to-hyphen normalization.
    #[must_use]
    pub fn formatted(raw: &str, format: SegmentFormat) -> Self {
        Self(format.apply(raw))
    }

    /// Returns the segment text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true for a segment with no text.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // String::is_empty is not const
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PathSegment {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for PathSegment {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl From<u64> for PathSegment {
    fn from(id: u64) -> Self {
        Self::numeric(id)
    }
}

/// Joins segments with single `/` separators, dropping empty segments.
#[must_use]
pub fn join_segments(segments: &[PathSegment]) -> String {
    let mut path = String::new();
    for segment in segments.iter().filter(|s| !s.is_empty()) {
        if !path.is_empty() {
            path.push('/');
        }
        path.push_str(segment.as_str());
    }
    path
}

// Anything that parses as a number counts, fractional ids included.
fn is_numeric(s: &str) -> bool {
    !s.is_empty() && s.parse::<f64>().is_ok()
}

/// Case conventions for explicitly formatted path segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentFormat {
    /// `foo_bar` → `foo-bar`
    Kebab,
    /// `FOO_BAR` → `foo_bar`
    Snake,
    /// `foo_bar` → `fooBar`
    Camel,
    /// `foo_bar` → `FooBar`
    Pascal,
    /// `foo_bar` → `foo.bar`
    Dot,
    /// `foo_bar` → `Foo.Bar`
    CapitalDot,
    /// `foo_bar` → `FOO_BAR`
    Constant,
    /// `foo_bar` → `foobar`
    Flat,
    /// `foo_bar` → `FOOBAR`
    FlatUpper,
}

impl SegmentFormat {
    /// Applies this convention to an underscore-separated name.
    #[must_use]
    pub fn apply(self, raw: &str) -> String {
        match self {
            Self::Kebab => raw.replace('_', "-").to_lowercase(),
            Self::Snake => raw.to_lowercase(),
            Self::Camel => delimited_words(raw, false),
            Self::Pascal => delimited_words(raw, true),
            Self::Dot => raw.replace('_', "."),
            Self::CapitalDot => raw
                .split(['_', '-'])
                .map(capitalize)
                .collect::<Vec<_>>()
                .join("."),
            Self::Constant => raw.to_uppercase(),
            Self::Flat => raw.replace(['_', '-'], "").to_lowercase(),
            Self::FlatUpper => raw.replace(['_', '-'], "").to_uppercase(),
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

fn delimited_words(raw: &str, capitalize_first: bool) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut upper_next = capitalize_first;
    for ch in raw.chars() {
        if ch == '_' || ch == '-' {
            upper_next = true;
        } else if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_underscores_become_hyphens() {
        assert_eq!(PathSegment::new("users_name").as_str(), "users-name");
        assert_eq!(PathSegment::new("a_b_c").as_str(), "a-b-c");
    }

    #[test]
    fn test_numeric_segments_pass_through() {
        assert_eq!(PathSegment::new("42").as_str(), "42");
        assert_eq!(PathSegment::new("3.14").as_str(), "3.14");
        assert_eq!(PathSegment::numeric(7).as_str(), "7");
    }

    #[test]
    fn test_plain_segments_are_untouched() {
        assert_eq!(PathSegment::new("breeds").as_str(), "breeds");
        assert_eq!(PathSegment::new("CamelCase").as_str(), "CamelCase");
    }

    #[test]
    fn test_join_uses_single_separators() {
        let segments = [
            PathSegment::new("api"),
            PathSegment::new("v2"),
            PathSegment::new("pet_food"),
        ];
        assert_eq!(join_segments(&segments), "api/v2/pet-food");
    }

    #[test]
    fn test_join_drops_empty_segments() {
        let segments = [
            PathSegment::new("api"),
            PathSegment::new(""),
            PathSegment::new("v2"),
        ];
        assert_eq!(join_segments(&segments), "api/v2");
        assert_eq!(join_segments(&[]), "");
    }

    #[test]
    fn test_segment_formats() {
        assert_eq!(SegmentFormat::Kebab.apply("FOO_bar"), "foo-bar");
        assert_eq!(SegmentFormat::Snake.apply("FOO_BAR"), "foo_bar");
        assert_eq!(SegmentFormat::Camel.apply("foo_bar"), "fooBar");
        assert_eq!(SegmentFormat::Pascal.apply("foo_bar"), "FooBar");
        assert_eq!(SegmentFormat::Dot.apply("foo_bar"), "foo.bar");
        assert_eq!(SegmentFormat::CapitalDot.apply("foo_bar"), "Foo.Bar");
        assert_eq!(SegmentFormat::Constant.apply("foo_bar"), "FOO_BAR");
        assert_eq!(SegmentFormat::Flat.apply("foo_bar"), "foobar");
        assert_eq!(SegmentFormat::FlatUpper.apply("foo_bar"), "FOOBAR");
    }

    #[test]
    fn test_formatted_segment() {
        assert_eq!(
            PathSegment::formatted("pet_food", SegmentFormat::Pascal).as_str(),
            "PetFood"
        );
    }
}
