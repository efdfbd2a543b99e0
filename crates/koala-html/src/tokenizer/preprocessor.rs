//! Input stream preprocessing.
//!
//! [§ 13.2.3.5 Preprocessing the input stream](https://html.spec.whatwg.org/multipage/parsing.html#preprocessing-the-input-stream)
//!
//! "Before the tokenization stage, the input stream must be preprocessed by
//! normalizing newlines. Thus, newlines in HTML DOMs are represented by U+000A
//! LF characters, and there are never any U+000D CR characters in the input to
//! the tokenization stage."
//!
//! Input arrives in chunks. Reading past the buffered data of a chunk that was
//! not marked last raises `end_of_chunk_hit` instead of returning EOF, and the
//! tokenizer rewinds to its snapshot with [`Preprocessor::retreat`]. All
//! positions here are absolute code point indices into the whole input; the
//! buffer only holds the part after `dropped`.

use koala_common::location::Position;

use crate::error::ParseErrorCode;

/// Consumed code points kept in the buffer before it is compacted.
const DROP_WATERMARK: usize = 1 << 16;

pub(crate) struct Preprocessor {
    /// Unconsumed input plus the consumed tail since the last compaction.
    html: Vec<char>,
    /// Number of code points removed from the front of `html`.
    dropped: usize,
    /// Absolute index of the next code point to consume.
    pos: usize,
    /// Byte offset of `pos` in the whole input.
    offset: usize,
    /// Absolute indices of CRs skipped as the first half of a CRLF pair.
    gap_stack: Vec<usize>,
    /// Absolute indices where lines start, newest last. Never empty.
    line_starts: Vec<usize>,
    /// Line number of `line_starts[0]`.
    first_line: usize,
    last_chunk_written: bool,
    /// Set when a read or lookahead ran past the buffered input while more
    /// input may still arrive.
    pub(crate) end_of_chunk_hit: bool,
    /// Offset of the furthest problematic code point already reported, so
    /// re-reading after a retreat does not report it twice.
    last_error_offset: Option<usize>,
    /// Input stream errors found since the tokenizer last drained them.
    pub(crate) errors: Vec<(ParseErrorCode, Position)>,
    pub(crate) report_errors: bool,
}

impl Preprocessor {
    pub(crate) fn new() -> Self {
        Self {
            html: Vec::new(),
            dropped: 0,
            pos: 0,
            offset: 0,
            gap_stack: Vec::new(),
            line_starts: vec![0],
            first_line: 1,
            last_chunk_written: false,
            end_of_chunk_hit: false,
            last_error_offset: None,
            errors: Vec::new(),
            report_errors: false,
        }
    }

    /// Append a chunk. `is_last` marks the end of the input.
    pub(crate) fn write(&mut self, chunk: &str, is_last: bool) {
        self.html.extend(chunk.chars());
        self.last_chunk_written |= is_last;
        self.end_of_chunk_hit = false;
    }

    /// Insert markup immediately before the next unconsumed code point
    /// (the `document.write()` case).
    pub(crate) fn insert_html_at_current_pos(&mut self, chunk: &str) {
        let at = self.pos - self.dropped;
        let _ = self.html.splice(at..at, chunk.chars());
        self.end_of_chunk_hit = false;
    }

    pub(crate) const fn is_last_chunk_written(&self) -> bool {
        self.last_chunk_written
    }

    fn char_at(&self, abs: usize) -> Option<char> {
        abs.checked_sub(self.dropped)
            .and_then(|idx| self.html.get(idx))
            .copied()
    }

    /// Position of the next code point to be consumed.
    pub(crate) fn position(&self) -> Position {
        let line_start = self.line_starts.last().copied().unwrap_or_default();
        Position {
            line: self.first_line + self.line_starts.len() - 1,
            col: self.pos - line_start + 1,
            offset: self.offset,
        }
    }

    /// [§ 13.2.5](https://html.spec.whatwg.org/multipage/parsing.html#next-input-character)
    ///
    /// Consume the next input character. Returns `None` at EOF, or when the
    /// buffered input is exhausted (then `end_of_chunk_hit` is set).
    pub(crate) fn advance(&mut self) -> Option<char> {
        let mut c = self.char_at(self.pos);
        let Some(current) = c else {
            self.end_of_chunk_hit = !self.last_chunk_written;
            return None;
        };

        if current == '\r' {
            match self.char_at(self.pos + 1) {
                Some('\n') => {
                    self.gap_stack.push(self.pos);
                    self.pos += 1;
                    self.offset += 1;
                }
                // The LF half of the pair may be in the next chunk.
                None if !self.last_chunk_written => {
                    self.end_of_chunk_hit = true;
                    return None;
                }
                _ => {}
            }
            c = Some('\n');
        }

        self.pos += 1;
        self.offset += current.len_utf8();

        let c = c.unwrap_or(current);
        if c == '\n' {
            self.line_starts.push(self.pos);
        } else if self.report_errors {
            self.check_for_problematic_character(c);
        }
        Some(c)
    }

    /// Step back over `count` consumed code points, undoing CRLF collapsing.
    pub(crate) fn retreat(&mut self, count: usize) {
        for _ in 0..count {
            if self.pos <= self.dropped {
                break;
            }
            self.pos -= 1;
            self.offset -= self.char_at(self.pos).map_or(1, char::len_utf8);
            if self.gap_stack.last().is_some_and(|&gap| gap + 1 == self.pos) {
                let _ = self.gap_stack.pop();
                self.pos -= 1;
                self.offset -= 1;
            }
        }
        while self.line_starts.len() > 1
            && self.line_starts.last().is_some_and(|&start| start > self.pos)
        {
            let _ = self.line_starts.pop();
        }
        self.end_of_chunk_hit = false;
    }

    /// The code point `k` places after the next one, without consuming.
    /// CR reads as LF. Sets `end_of_chunk_hit` when the lookahead is not yet
    /// available.
    pub(crate) fn peek(&mut self, k: usize) -> Option<char> {
        match self.char_at(self.pos + k) {
            Some('\r') => Some('\n'),
            Some(c) => Some(c),
            None => {
                self.end_of_chunk_hit = !self.last_chunk_written;
                None
            }
        }
    }

    /// Whether the upcoming input starts with `pattern`, without consuming.
    /// A `false` answer with `end_of_chunk_hit` set means "not known yet".
    pub(crate) fn starts_with(&mut self, pattern: &str, case_sensitive: bool) -> bool {
        for (k, expected) in pattern.chars().enumerate() {
            let Some(actual) = self.peek(k) else {
                return false;
            };
            let matches = if case_sensitive {
                actual == expected
            } else {
                actual.eq_ignore_ascii_case(&expected)
            };
            if !matches {
                return false;
            }
        }
        true
    }

    /// Discard consumed input once enough of it has accumulated.
    pub(crate) fn drop_parsed_chunk(&mut self) {
        let consumed = self.pos - self.dropped;
        if consumed <= DROP_WATERMARK {
            return;
        }
        let _ = self.html.drain(..consumed);
        self.dropped = self.pos;
        self.gap_stack.clear();
        let removed = self.line_starts.len() - 1;
        if removed > 0 {
            let _ = self.line_starts.drain(..removed);
            self.first_line += removed;
        }
    }

    /// [§ 13.2.3.5](https://html.spec.whatwg.org/multipage/parsing.html#preprocessing-the-input-stream)
    ///
    /// "Any occurrences of noncharacters in the input stream are
    /// noncharacter-in-input-stream parse errors. Any occurrences of controls
    /// other than ASCII whitespace and U+0000 NULL characters are
    /// control-character-in-input-stream parse errors."
    fn check_for_problematic_character(&mut self, c: char) {
        let code = if is_noncharacter(c) {
            ParseErrorCode::NoncharacterInInputStream
        } else if is_control(c) && !c.is_ascii_whitespace() && c != '\0' {
            ParseErrorCode::ControlCharacterInInputStream
        } else {
            return;
        };
        let at = self.offset - c.len_utf8();
        if self.last_error_offset.is_some_and(|last| at <= last) {
            return;
        }
        self.last_error_offset = Some(at);
        let mut position = self.position();
        position.col -= 1;
        position.offset = at;
        self.errors.push((code, position));
    }
}

/// [Infra: noncharacter](https://infra.spec.whatwg.org/#noncharacter)
pub(crate) const fn is_noncharacter(c: char) -> bool {
    let cp = c as u32;
    matches!(cp, 0xFDD0..=0xFDEF) || (cp & 0xFFFE) == 0xFFFE
}

/// [Infra: control](https://infra.spec.whatwg.org/#control): a C0 control or
/// a code point in U+007F DELETE to U+009F APPLICATION PROGRAM COMMAND.
pub(crate) const fn is_control(c: char) -> bool {
    let cp = c as u32;
    cp <= 0x1F || matches!(cp, 0x7F..=0x9F)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn consume_all(pre: &mut Preprocessor) -> String {
        let mut out = String::new();
        while let Some(c) = pre.advance() {
            out.push(c);
        }
        out
    }

    #[test]
    fn test_newlines_are_normalized() {
        let mut pre = Preprocessor::new();
        pre.write("a\r\nb\rc\n", true);
        assert_eq!(consume_all(&mut pre), "a\nb\nc\n");
        assert_eq!(pre.position().line, 4);
        assert_eq!(pre.position().offset, 7);
    }

    #[test]
    fn test_cr_at_chunk_end_waits_for_more_input() {
        let mut pre = Preprocessor::new();
        pre.write("a\r", false);
        assert_eq!(pre.advance(), Some('a'));
        assert_eq!(pre.advance(), None);
        assert!(pre.end_of_chunk_hit);

        pre.write("\nb", true);
        assert_eq!(pre.advance(), Some('\n'));
        assert_eq!(pre.advance(), Some('b'));
        assert_eq!(pre.position().line, 2);
        assert_eq!(pre.position().col, 2);
    }

    #[test]
    fn test_retreat_undoes_crlf_and_lines() {
        let mut pre = Preprocessor::new();
        pre.write("x\r\ny", true);
        assert_eq!(consume_all(&mut pre), "x\ny");
        pre.retreat(2);
        assert_eq!(pre.position().line, 1);
        assert_eq!(pre.position().col, 2);
        assert_eq!(pre.position().offset, 1);
        assert_eq!(pre.advance(), Some('\n'));
        assert_eq!(pre.advance(), Some('y'));
    }

    #[test]
    fn test_lookahead_reports_end_of_chunk() {
        let mut pre = Preprocessor::new();
        pre.write("DOC", false);
        assert!(!pre.starts_with("DOCTYPE", true));
        assert!(pre.end_of_chunk_hit);

        pre.write("type", true);
        assert!(pre.starts_with("DOCTYPE", false));
        assert!(!pre.starts_with("DOCTYPE", true));
        assert!(!pre.end_of_chunk_hit);
    }

    #[test]
    fn test_drop_parsed_chunk_keeps_positions() {
        let mut pre = Preprocessor::new();
        let line = "x".repeat(DROP_WATERMARK);
        pre.write(&format!("{line}\n{line}\nabc"), true);
        for _ in 0..(2 * DROP_WATERMARK + 2) {
            let _ = pre.advance();
        }
        pre.drop_parsed_chunk();
        assert_eq!(pre.position().line, 3);
        assert_eq!(pre.position().col, 1);
        assert_eq!(consume_all(&mut pre), "abc");
    }

    #[test]
    fn test_problematic_characters_reported_once() {
        let mut pre = Preprocessor::new();
        pre.report_errors = true;
        pre.write("a\u{1}\u{FFFF}", true);
        let _ = consume_all(&mut pre);
        pre.retreat(2);
        let _ = consume_all(&mut pre);
        let codes: Vec<_> = pre.errors.iter().map(|(code, _)| *code).collect();
        assert_eq!(
            codes,
            vec![
                ParseErrorCode::ControlCharacterInInputStream,
                ParseErrorCode::NoncharacterInInputStream
            ]
        );
        assert_eq!(pre.errors[0].1.col, 2);
    }
}
