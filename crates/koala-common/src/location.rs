//! Source positions and spans.
//!
//! Lines and columns are 1-based, offsets are 0-based byte offsets into the
//! complete input (across all written chunks). Line endings are counted after
//! newline normalization, so `\r\n` advances the line once.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// A single point in the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Position {
    /// 1-based line number.
    pub line: usize,
    /// 1-based column number, counted in code points.
    pub col: usize,
    /// 0-based byte offset.
    pub offset: usize,
}

impl Position {
    /// The position before the first character of the input.
    pub const START: Self = Self {
        line: 1,
        col: 1,
        offset: 0,
    };
}

impl Default for Position {
    fn default() -> Self {
        Self::START
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// A half-open span of the input, `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Location {
    /// Line of the first character.
    pub start_line: usize,
    /// Column of the first character.
    pub start_col: usize,
    /// Byte offset of the first character.
    pub start_offset: usize,
    /// Line just past the last character.
    pub end_line: usize,
    /// Column just past the last character.
    pub end_col: usize,
    /// Byte offset just past the last character.
    pub end_offset: usize,
}

impl Location {
    /// Build a span from two positions.
    #[must_use]
    pub const fn new(start: Position, end: Position) -> Self {
        Self {
            start_line: start.line,
            start_col: start.col,
            start_offset: start.offset,
            end_line: end.line,
            end_col: end.col,
            end_offset: end.offset,
        }
    }

    /// An empty span at `at`.
    #[must_use]
    pub const fn empty(at: Position) -> Self {
        Self::new(at, at)
    }

    /// Where the span begins.
    #[must_use]
    pub const fn start(&self) -> Position {
        Position {
            line: self.start_line,
            col: self.start_col,
            offset: self.start_offset,
        }
    }

    /// Where the span ends.
    #[must_use]
    pub const fn end(&self) -> Position {
        Position {
            line: self.end_line,
            col: self.end_col,
            offset: self.end_offset,
        }
    }

    /// Move the end of the span to `end`.
    pub const fn set_end(&mut self, end: Position) {
        self.end_line = end.line;
        self.end_col = end.col;
        self.end_offset = end.offset;
    }

    /// Number of bytes covered by the span.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end_offset.saturating_sub(self.start_offset)
    }

    /// Whether the span covers no input.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start(), self.end())
    }
}

/// Location of a start tag, including one span per attribute.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct TagLocation {
    /// From `<` through `>`.
    pub span: Location,
    /// Attribute spans keyed by attribute name (from the name through the
    /// end of the value).
    pub attrs: BTreeMap<String, Location>,
}

impl TagLocation {
    /// A tag location without attribute spans.
    #[must_use]
    pub const fn new(span: Location) -> Self {
        Self {
            span,
            attrs: BTreeMap::new(),
        }
    }
}

/// Location information attached to a tree node.
///
/// For elements, `span` starts at the start tag and is extended when the
/// element is closed. `start_tag` is absent for elements the parser created
/// without a corresponding tag in the input, and `end_tag` is absent unless a
/// matching end tag closed the element.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct NodeLocation {
    /// The whole extent of the node.
    pub span: Location,
    /// The start tag (elements only).
    pub start_tag: Option<TagLocation>,
    /// The end tag (elements only).
    pub end_tag: Option<Location>,
}

impl NodeLocation {
    /// Location of a non-element node.
    #[must_use]
    pub const fn from_span(span: Location) -> Self {
        Self {
            span,
            start_tag: None,
            end_tag: None,
        }
    }

    /// Location of an element created from a start tag.
    #[must_use]
    pub const fn from_start_tag(tag: TagLocation) -> Self {
        Self {
            span: tag.span,
            start_tag: Some(tag),
            end_tag: None,
        }
    }

    /// Span of a named attribute in the start tag, if recorded.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&Location> {
        self.start_tag.as_ref().and_then(|tag| tag.attrs.get(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_len_and_bounds() {
        let start = Position {
            line: 1,
            col: 3,
            offset: 2,
        };
        let end = Position {
            line: 2,
            col: 1,
            offset: 9,
        };
        let loc = Location::new(start, end);
        assert_eq!(loc.start(), start);
        assert_eq!(loc.end(), end);
        assert_eq!(loc.len(), 7);
        assert!(!loc.is_empty());
        assert_eq!(loc.to_string(), "1:3-2:1");
    }

    #[test]
    fn test_node_location_attr_lookup() {
        let mut tag = TagLocation::new(Location::empty(Position::START));
        let _ = tag
            .attrs
            .insert("id".to_string(), Location::empty(Position::START));
        let loc = NodeLocation::from_start_tag(tag);
        assert!(loc.attr("id").is_some());
        assert!(loc.attr("class").is_none());
    }
}
