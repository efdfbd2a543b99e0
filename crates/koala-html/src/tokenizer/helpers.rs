//! Helper functions for the HTML tokenizer.
//!
//! [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
//!
//! This module contains utility functions used throughout the tokenizer:
//! - State transitions ("Switch to", "Reconsume in")
//! - Lookahead ("If the next few characters are")
//! - Token construction and emission ("Emit the current token")
//! - Attribute bookkeeping, including duplicate detection
//! - Parse error reporting

use koala_common::location::{Location, Position, TagLocation};

use super::core::{Emitted, HTMLTokenizer, PendingAttribute, TextKind, TokenizerState};
use super::token::{Attribute, CommentToken, DoctypeToken, TagToken, TextToken, Token};
use crate::error::{ParseError, ParseErrorCode};
use crate::tag::TagId;

// =============================================================================
// State Transition Helpers
// =============================================================================

impl HTMLTokenizer {
    /// "Switch to the X state"
    ///
    /// The next character will be consumed on the next iteration of the main
    /// loop.
    pub(super) const fn switch_to(&mut self, new_state: TokenizerState) {
        self.state = new_state;
    }

    /// "Reconsume in the X state"
    ///
    /// The same character will be processed again in the new state.
    pub(super) const fn reconsume_in(&mut self, new_state: TokenizerState) {
        self.reconsume = true;
        self.state = new_state;
    }

    /// "Reconsume in the return state."
    pub(super) const fn reconsume_in_return_state(&mut self) {
        self.reconsume_in(self.return_state);
    }
}

// =============================================================================
// Input/Character Helpers
// =============================================================================

impl HTMLTokenizer {
    /// [§ 13.2.5.42 Markup declaration open state](https://html.spec.whatwg.org/multipage/parsing.html#markup-declaration-open-state)
    ///
    /// "If the next few characters are..." counting the current input
    /// character as the first of them. On a match the remaining characters are
    /// consumed.
    ///
    /// A `false` result with `end_of_chunk_hit` set means the answer depends
    /// on input that has not arrived; the caller must return immediately.
    pub(super) fn consume_sequence_if_match(
        &mut self,
        pattern: &str,
        case_sensitive: bool,
    ) -> bool {
        let mut chars = pattern.chars();
        let (Some(first), Some(current)) = (chars.next(), self.current_input_character) else {
            return false;
        };
        let first_matches = if case_sensitive {
            current == first
        } else {
            current.eq_ignore_ascii_case(&first)
        };
        if !first_matches {
            return false;
        }
        let rest = chars.as_str();
        if !self.preprocessor.starts_with(rest, case_sensitive) {
            return false;
        }
        for _ in rest.chars() {
            let _ = self.preprocessor.advance();
        }
        true
    }

    /// [§ 12.1.4 ASCII whitespace](https://infra.spec.whatwg.org/#ascii-whitespace)
    ///
    /// NOTE: The tokenizer never sees U+000D CR, which is normalized earlier.
    pub(super) const fn is_whitespace_char(input_char: char) -> bool {
        // "U+0009 CHARACTER TABULATION (tab)"
        // "U+000A LINE FEED (LF)"
        // "U+000C FORM FEED (FF)"
        // "U+0020 SPACE"
        matches!(input_char, ' ' | '\t' | '\n' | '\x0C')
    }
}

// =============================================================================
// Token Emission Helpers
// =============================================================================

impl HTMLTokenizer {
    /// "Emit the current input character as a character token."
    pub(super) fn emit_character_token(&mut self, c: char) {
        let start = self.current_char_position;
        self.append_text(c, start);
    }

    /// Emit characters that were consumed by earlier steps, such as the `<`
    /// of something that turned out not to be a tag.
    pub(super) fn emit_deferred_characters(&mut self, chars: &str) {
        let start = self.token_start;
        for c in chars.chars() {
            self.append_text(c, start);
        }
    }

    fn append_text(&mut self, c: char, start: Position) {
        let kind = match c {
            '\0' => TextKind::Null,
            c if Self::is_whitespace_char(c) => TextKind::Whitespace,
            _ => TextKind::Character,
        };
        if self
            .pending_text
            .as_ref()
            .is_some_and(|(pending_kind, _)| *pending_kind != kind)
        {
            self.flush_pending_text();
        }

        let track = self.track_locations;
        let end = self.preprocessor.position();
        let (_, text) = self.pending_text.get_or_insert_with(|| {
            (
                kind,
                TextToken {
                    chars: String::new(),
                    location: track.then(|| Location::empty(start)),
                },
            )
        });
        text.chars.push(c);
        if let Some(location) = &mut text.location {
            location.set_end(end);
        }
    }

    /// Emit the coalesced character run, if any.
    pub(super) fn flush_pending_text(&mut self) {
        if let Some((kind, text)) = self.pending_text.take() {
            let token = match kind {
                TextKind::Character => Token::Character(text),
                TextKind::Whitespace => Token::WhitespaceCharacter(text),
                TextKind::Null => Token::NullCharacter(text),
            };
            self.queue.push_back(Emitted::Token(token));
        }
    }

    fn emit(&mut self, token: Token) {
        self.flush_pending_text();
        self.queue.push_back(Emitted::Token(token));
    }

    /// "Emit the current token" for a tag, comment or DOCTYPE token.
    pub(super) fn emit_current_token(&mut self) {
        self.flush_attribute();
        let Some(token) = self.current_token.take() else {
            return;
        };
        let end = self.preprocessor.position();
        let span = self
            .track_locations
            .then(|| Location::new(self.token_start, end));

        match token {
            Token::StartTag(mut tag) => {
                tag.tag_id = TagId::from_name(&tag.name);
                if let Some(location) = &mut tag.location {
                    location.span.set_end(end);
                }
                self.last_start_tag_name = Some(tag.name.to_ascii_lowercase());
                self.emit(Token::StartTag(tag));
            }
            Token::EndTag(mut tag) => {
                // [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
                // "When an end tag token is emitted with attributes, that is an
                // end-tag-with-attributes parse error. When an end tag token is
                // emitted with its self-closing flag set, that is an
                // end-tag-with-trailing-solidus parse error."
                if !tag.attrs.is_empty() {
                    self.error(ParseErrorCode::EndTagWithAttributes);
                }
                if tag.self_closing {
                    self.error(ParseErrorCode::EndTagWithTrailingSolidus);
                }
                tag.tag_id = TagId::from_name(&tag.name);
                if let Some(location) = &mut tag.location {
                    location.span.set_end(end);
                }
                self.emit(Token::EndTag(tag));
            }
            Token::Comment(mut comment) => {
                comment.location = span;
                self.emit(Token::Comment(comment));
            }
            Token::Doctype(mut doctype) => {
                doctype.location = span;
                self.emit(Token::Doctype(doctype));
            }
            other => self.emit(other),
        }
    }

    /// "Emit an end-of-file token."
    pub(super) fn emit_eof_token(&mut self) {
        let at = self.preprocessor.position();
        let location = self.track_locations.then(|| Location::empty(at));
        self.emit(Token::EndOfFile { location });
        self.eof_emitted = true;
    }
}

// =============================================================================
// Token Construction Helpers
// =============================================================================

impl HTMLTokenizer {
    /// "Create a new start tag token" or "Create a new end tag token", with
    /// an empty tag name.
    pub(super) fn create_tag_token(&mut self, start: bool) {
        let mut tag = TagToken::new(String::new());
        if self.track_locations {
            tag.location = Some(TagLocation::new(Location::empty(self.token_start)));
        }
        self.current_attribute = None;
        self.current_token = Some(if start {
            Token::StartTag(tag)
        } else {
            Token::EndTag(tag)
        });
    }

    /// "Create a comment token whose data is the empty string."
    pub(super) fn create_comment_token(&mut self) {
        self.current_token = Some(Token::Comment(CommentToken::default()));
    }

    /// "Create a new DOCTYPE token."
    pub(super) fn create_doctype_token(&mut self) {
        self.current_token = Some(Token::Doctype(DoctypeToken::default()));
    }

    pub(super) fn current_tag_mut(&mut self) -> Option<&mut TagToken> {
        match &mut self.current_token {
            Some(Token::StartTag(tag) | Token::EndTag(tag)) => Some(tag),
            _ => None,
        }
    }

    pub(super) fn current_doctype_mut(&mut self) -> Option<&mut DoctypeToken> {
        match &mut self.current_token {
            Some(Token::Doctype(doctype)) => Some(doctype),
            _ => None,
        }
    }

    /// "Append the current input character to the current tag token's tag
    /// name", lowercasing ASCII unless tag case is preserved.
    pub(super) fn append_to_tag_name(&mut self, c: char) {
        let c = if self.preserve_tag_case {
            c
        } else {
            c.to_ascii_lowercase()
        };
        if let Some(tag) = self.current_tag_mut() {
            tag.name.push(c);
        }
    }

    /// "Set the self-closing flag of the current tag token."
    pub(super) fn set_self_closing(&mut self) {
        if let Some(tag) = self.current_tag_mut() {
            tag.self_closing = true;
        }
    }

    /// "Append the current input character to the comment token's data."
    pub(super) fn append_to_comment(&mut self, data: &str) {
        if let Some(Token::Comment(comment)) = &mut self.current_token {
            comment.data.push_str(data);
        }
    }

    /// "Set the current DOCTYPE token's force-quirks flag to on."
    pub(super) fn set_force_quirks(&mut self) {
        if let Some(doctype) = self.current_doctype_mut() {
            doctype.force_quirks = true;
        }
    }

    /// Emit a fresh DOCTYPE token with its force-quirks flag on.
    pub(super) fn emit_force_quirks_doctype(&mut self) {
        self.create_doctype_token();
        self.set_force_quirks();
        self.emit_current_token();
    }
}

// =============================================================================
// RCDATA/RAWTEXT/Script Data Helpers
// =============================================================================

impl HTMLTokenizer {
    /// "An appropriate end tag token is an end tag token whose tag name matches
    /// the tag name of the last start tag to have been emitted from this
    /// tokenizer, if any."
    pub(super) fn is_appropriate_end_tag_token(&self) -> bool {
        match (&self.last_start_tag_name, &self.current_token) {
            (Some(last_start_tag), Some(Token::EndTag(tag))) => {
                tag.name.eq_ignore_ascii_case(last_start_tag)
            }
            _ => false,
        }
    }

    /// The "anything else" branch shared by the end tag name states:
    ///
    /// "Emit a U+003C LESS-THAN SIGN character token, a U+002F SOLIDUS
    /// character token, and a character token for each of the characters in
    /// the temporary buffer (in the order they were added to the buffer).
    /// Reconsume in the X state."
    pub(super) fn emit_end_tag_name_anything_else(&mut self, state: TokenizerState) {
        let chars = format!("</{}", self.temporary_buffer);
        self.emit_deferred_characters(&chars);
        self.current_token = None;
        self.current_attribute = None;
        self.reconsume_in(state);
    }

    /// The tag name characters of the RCDATA, RAWTEXT and script data end tag
    /// name states: "ASCII alpha - Append the lowercase version of the current
    /// input character to the current tag token's tag name. Append the current
    /// input character to the temporary buffer."
    pub(super) fn append_to_end_tag_name(&mut self, c: char) {
        self.append_to_tag_name(c);
        self.temporary_buffer.push(c);
    }

    /// The whitespace, `/` and `>` branches shared by the end tag name states,
    /// when the end tag is appropriate. Returns `false` for "treat it as per
    /// the anything else entry below".
    pub(super) fn try_finish_appropriate_end_tag(&mut self, c: char) -> bool {
        if !self.is_appropriate_end_tag_token() {
            return false;
        }
        match c {
            '/' => self.switch_to(TokenizerState::SelfClosingStartTag),
            '>' => {
                self.switch_to(TokenizerState::Data);
                self.emit_current_token();
            }
            _ => self.switch_to(TokenizerState::BeforeAttributeName),
        }
        true
    }
}

// =============================================================================
// Attribute Helpers
// =============================================================================

impl HTMLTokenizer {
    /// "Start a new attribute in the current tag token. Set that attribute
    /// name and value to the empty string."
    pub(super) fn start_new_attribute(&mut self) {
        self.flush_attribute();
        let at = self.current_char_position;
        self.current_attribute = Some(PendingAttribute {
            start: at,
            end: at,
            ..PendingAttribute::default()
        });
    }

    /// "Append the current input character to the current attribute's name",
    /// lowercasing ASCII unless attribute case is preserved.
    pub(super) fn append_to_attribute_name(&mut self, c: char) {
        let c = if self.preserve_attr_case {
            c
        } else {
            c.to_ascii_lowercase()
        };
        if let Some(attr) = &mut self.current_attribute {
            attr.name.push(c);
        }
    }

    /// "Append the current input character to the current attribute's value."
    pub(super) fn append_to_attribute_value(&mut self, data: &str) {
        if let Some(attr) = &mut self.current_attribute {
            attr.value.push_str(data);
        }
    }

    /// Record where the current attribute ends.
    pub(super) fn mark_attribute_end(&mut self, at: Position) {
        if let Some(attr) = &mut self.current_attribute {
            attr.end = at;
        }
    }

    /// [§ 13.2.5.33 Attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-name-state)
    ///
    /// "When the user agent leaves the attribute name state (and before
    /// emitting the tag token, if appropriate), the complete attribute's name
    /// must be compared to the other attributes on the same token; if there is
    /// already an attribute on the token with the exact same name, then this
    /// is a duplicate-attribute parse error and the new attribute must be
    /// removed from the token."
    pub(super) fn leave_attribute_name(&mut self) {
        let at = self.current_char_position;
        let is_duplicate = match (&self.current_attribute, &self.current_token) {
            (Some(attr), Some(Token::StartTag(tag) | Token::EndTag(tag))) => {
                tag.has_attribute(&attr.name)
            }
            _ => false,
        };
        if let Some(attr) = &mut self.current_attribute {
            attr.duplicate = is_duplicate;
            attr.end = at;
        }
        if is_duplicate {
            self.error(ParseErrorCode::DuplicateAttribute);
        }
    }

    /// Move the finished attribute onto the current tag, unless it was a
    /// duplicate.
    pub(super) fn flush_attribute(&mut self) {
        let Some(attr) = self.current_attribute.take() else {
            return;
        };
        if attr.duplicate {
            return;
        }
        let track = self.track_locations;
        if let Some(tag) = self.current_tag_mut() {
            if track && let Some(location) = &mut tag.location {
                let _ = location
                    .attrs
                    .insert(attr.name.clone(), Location::new(attr.start, attr.end));
            }
            tag.attrs.push(Attribute::new(attr.name, attr.value));
        }
    }
}

// =============================================================================
// Error Handling
// =============================================================================

impl HTMLTokenizer {
    /// [§ 13.2.2 Parse errors](https://html.spec.whatwg.org/multipage/parsing.html#parse-errors)
    ///
    /// Queue a parse error at the current input character. Parse errors in
    /// HTML are not fatal; the tokenizer recovers and continues.
    pub(super) fn error(&mut self, code: ParseErrorCode) {
        if !self.preprocessor.report_errors {
            return;
        }
        let location = Location::empty(self.current_char_position);
        self.queue
            .push_back(Emitted::Error(ParseError::new(code, Some(location))));
    }
}
