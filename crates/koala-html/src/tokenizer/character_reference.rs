//! Character reference states.
//!
//! [§ 13.2.5.72](https://html.spec.whatwg.org/multipage/parsing.html#character-reference-state) through
//! [§ 13.2.5.80](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-end-state).
//!
//! Named references are matched by peeking ahead instead of consuming, so a
//! reference split across two `write` calls is replayed from its first
//! character once more input arrives.

use super::core::{HTMLTokenizer, TokenizerState};
use super::named_character_references::{any_entity_has_prefix, lookup_entity};
use super::preprocessor::{is_control, is_noncharacter};
use crate::error::ParseErrorCode;

/// [§ 13.2.5.80](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-end-state)
/// replacements for code points in the C1 control range.
const C1_REPLACEMENTS: &[(u32, char)] = &[
    (0x80, '\u{20AC}'),
    (0x82, '\u{201A}'),
    (0x83, '\u{0192}'),
    (0x84, '\u{201E}'),
    (0x85, '\u{2026}'),
    (0x86, '\u{2020}'),
    (0x87, '\u{2021}'),
    (0x88, '\u{02C6}'),
    (0x89, '\u{2030}'),
    (0x8A, '\u{0160}'),
    (0x8B, '\u{2039}'),
    (0x8C, '\u{0152}'),
    (0x8E, '\u{017D}'),
    (0x91, '\u{2018}'),
    (0x92, '\u{2019}'),
    (0x93, '\u{201C}'),
    (0x94, '\u{201D}'),
    (0x95, '\u{2022}'),
    (0x96, '\u{2013}'),
    (0x97, '\u{2014}'),
    (0x98, '\u{02DC}'),
    (0x99, '\u{2122}'),
    (0x9A, '\u{0161}'),
    (0x9B, '\u{203A}'),
    (0x9C, '\u{0153}'),
    (0x9E, '\u{017E}'),
    (0x9F, '\u{0178}'),
];

impl HTMLTokenizer {
    /// "A character reference is said to be consumed as part of an attribute
    /// if the return state is either the attribute value (double-quoted)
    /// state, the attribute value (single-quoted) state, or the attribute
    /// value (unquoted) state."
    pub(super) const fn is_consumed_as_part_of_attribute(&self) -> bool {
        matches!(
            self.return_state,
            TokenizerState::AttributeValueDoubleQuoted
                | TokenizerState::AttributeValueSingleQuoted
                | TokenizerState::AttributeValueUnquoted
        )
    }

    /// "When a state says to flush code points consumed as a character
    /// reference, it means that for each code point in the temporary buffer
    /// (in the order they were added to the buffer) user agent must append
    /// the code point from the buffer to the current attribute's value if the
    /// character reference was consumed as part of an attribute, or emit the
    /// code point as a character token otherwise."
    pub(super) fn flush_code_points_consumed_as_character_reference(&mut self) {
        let buffer = std::mem::take(&mut self.temporary_buffer);
        if self.is_consumed_as_part_of_attribute() {
            self.append_to_attribute_value(&buffer);
        } else {
            self.emit_deferred_characters(&buffer);
        }
    }

    /// [§ 13.2.5.72 Character reference state](https://html.spec.whatwg.org/multipage/parsing.html#character-reference-state)
    pub(super) fn handle_character_reference_state(&mut self) {
        // "Set the temporary buffer to the empty string. Append a U+0026
        // AMPERSAND (&) character to the temporary buffer."
        self.temporary_buffer.clear();
        self.temporary_buffer.push('&');

        match self.current_input_character {
            // "ASCII alphanumeric - Reconsume in the named character reference state."
            Some(c) if c.is_ascii_alphanumeric() => {
                self.reconsume_in(TokenizerState::NamedCharacterReference);
            }
            // "U+0023 NUMBER SIGN (#) - Append the current input character to the
            // temporary buffer. Switch to the numeric character reference state."
            Some('#') => {
                self.temporary_buffer.push('#');
                self.switch_to(TokenizerState::NumericCharacterReference);
            }
            // "Anything else - Flush code points consumed as a character reference.
            // Reconsume in the return state."
            _ => {
                self.flush_code_points_consumed_as_character_reference();
                self.reconsume_in_return_state();
            }
        }
    }

    /// [§ 13.2.5.73 Named character reference state](https://html.spec.whatwg.org/multipage/parsing.html#named-character-reference-state)
    ///
    /// "Consume the maximum number of characters possible, where the consumed
    /// characters are one of the identifiers in the first column of the named
    /// character references table."
    ///
    /// The current input character is the first character of the name.
    pub(super) fn handle_named_character_reference_state(&mut self) {
        let Some(first) = self.current_input_character else {
            self.reconsume_in(TokenizerState::AmbiguousAmpersand);
            return;
        };

        let mut name = String::from(first);
        let mut longest_match = lookup_entity(&name).map(|replacement| (1, replacement));
        let mut k = 0;
        while !name.ends_with(';') && any_entity_has_prefix(&name) {
            match self.preprocessor.peek(k) {
                Some(c) if c.is_ascii_alphanumeric() || c == ';' => {
                    name.push(c);
                    k += 1;
                    if let Some(replacement) = lookup_entity(&name) {
                        longest_match = Some((name.len(), replacement));
                    }
                }
                None if self.preprocessor.end_of_chunk_hit => return,
                _ => break,
            }
        }

        // "Otherwise - Flush code points consumed as a character reference.
        // Switch to the ambiguous ampersand state."
        let Some((matched_len, replacement)) = longest_match else {
            self.flush_code_points_consumed_as_character_reference();
            self.reconsume_in(TokenizerState::AmbiguousAmpersand);
            return;
        };
        let matched = &name[..matched_len];
        let ends_with_semicolon = matched.ends_with(';');

        // "If the character reference was consumed as part of an attribute, and
        // the last character matched is not a U+003B SEMICOLON character (;), and
        // the next input character is either a U+003D EQUALS SIGN character (=)
        // or an ASCII alphanumeric, then, for historical reasons, flush code
        // points consumed as a character reference and switch to the return state."
        if self.is_consumed_as_part_of_attribute() && !ends_with_semicolon {
            let next = self.preprocessor.peek(matched_len - 1);
            if next.is_none() && self.preprocessor.end_of_chunk_hit {
                return;
            }
            if next.is_some_and(|c| c == '=' || c.is_ascii_alphanumeric()) {
                self.temporary_buffer.push_str(matched);
                self.consume_matched_name(matched_len);
                self.flush_code_points_consumed_as_character_reference();
                let return_state = self.return_state;
                self.switch_to(return_state);
                return;
            }
        }

        // "If the last character matched is not a U+003B SEMICOLON character (;),
        // then this is a missing-semicolon-after-character-reference parse error."
        if !ends_with_semicolon {
            self.error(ParseErrorCode::MissingSemicolonAfterCharacterReference);
        }

        // "Set the temporary buffer to the empty string. Append one or two
        // characters corresponding to the character reference name (as given by
        // the second column of the named character references table) to the
        // temporary buffer."
        self.temporary_buffer.clear();
        self.temporary_buffer.push_str(replacement);
        self.consume_matched_name(matched_len);
        self.flush_code_points_consumed_as_character_reference();
        let return_state = self.return_state;
        self.switch_to(return_state);
    }

    /// Consume the rest of a matched entity name. The current input character
    /// is already its first character.
    fn consume_matched_name(&mut self, matched_len: usize) {
        for _ in 1..matched_len {
            let _ = self.preprocessor.advance();
        }
    }

    /// [§ 13.2.5.74 Ambiguous ampersand state](https://html.spec.whatwg.org/multipage/parsing.html#ambiguous-ampersand-state)
    pub(super) fn handle_ambiguous_ampersand_state(&mut self) {
        match self.current_input_character {
            // "ASCII alphanumeric - If the character reference was consumed as part of
            // an attribute, then append the current input character to the current
            // attribute's value. Otherwise, emit the current input character as a
            // character token."
            Some(c) if c.is_ascii_alphanumeric() => {
                if self.is_consumed_as_part_of_attribute() {
                    self.append_to_attribute_value(c.encode_utf8(&mut [0; 4]));
                } else {
                    self.emit_character_token(c);
                }
            }
            // "U+003B SEMICOLON (;) - This is an unknown-named-character-reference
            // parse error. Reconsume in the return state."
            Some(';') => {
                self.error(ParseErrorCode::UnknownNamedCharacterReference);
                self.reconsume_in_return_state();
            }
            _ => self.reconsume_in_return_state(),
        }
    }

    /// [§ 13.2.5.75 Numeric character reference state](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-state)
    pub(super) fn handle_numeric_character_reference_state(&mut self) {
        // "Set the character reference code to zero (0)."
        self.character_reference_code = 0;

        match self.current_input_character {
            // "U+0078 LATIN SMALL LETTER X, U+0058 LATIN CAPITAL LETTER X - Append the
            // current input character to the temporary buffer. Switch to the
            // hexadecimal character reference start state."
            Some(c @ ('x' | 'X')) => {
                self.temporary_buffer.push(c);
                self.switch_to(TokenizerState::HexadecimalCharacterReferenceStart);
            }
            // "Anything else - Reconsume in the decimal character reference start state."
            _ => self.reconsume_in(TokenizerState::DecimalCharacterReferenceStart),
        }
    }

    /// [§ 13.2.5.76 Hexadecimal character reference start state](https://html.spec.whatwg.org/multipage/parsing.html#hexadecimal-character-reference-start-state)
    pub(super) fn handle_hexadecimal_character_reference_start_state(&mut self) {
        match self.current_input_character {
            Some(c) if c.is_ascii_hexdigit() => {
                self.reconsume_in(TokenizerState::HexadecimalCharacterReference);
            }
            _ => self.absence_of_digits(),
        }
    }

    /// [§ 13.2.5.77 Decimal character reference start state](https://html.spec.whatwg.org/multipage/parsing.html#decimal-character-reference-start-state)
    pub(super) fn handle_decimal_character_reference_start_state(&mut self) {
        match self.current_input_character {
            Some(c) if c.is_ascii_digit() => {
                self.reconsume_in(TokenizerState::DecimalCharacterReference);
            }
            _ => self.absence_of_digits(),
        }
    }

    /// "Anything else - This is an absence-of-digits-in-numeric-character-reference
    /// parse error. Flush code points consumed as a character reference.
    /// Reconsume in the return state."
    fn absence_of_digits(&mut self) {
        self.error(ParseErrorCode::AbsenceOfDigitsInNumericCharacterReference);
        self.flush_code_points_consumed_as_character_reference();
        self.reconsume_in_return_state();
    }

    /// [§ 13.2.5.78 Hexadecimal character reference state](https://html.spec.whatwg.org/multipage/parsing.html#hexadecimal-character-reference-state)
    pub(super) fn handle_hexadecimal_character_reference_state(&mut self) {
        self.handle_numeric_digits(16);
    }

    /// [§ 13.2.5.79 Decimal character reference state](https://html.spec.whatwg.org/multipage/parsing.html#decimal-character-reference-state)
    pub(super) fn handle_decimal_character_reference_state(&mut self) {
        self.handle_numeric_digits(10);
    }

    fn handle_numeric_digits(&mut self, radix: u32) {
        match self.current_input_character {
            // "Multiply the character reference code by 16. Add a numeric version of
            // the current input character to the character reference code."
            Some(c) if c.is_digit(radix) => {
                let digit = c.to_digit(radix).unwrap_or_default();
                self.character_reference_code = self
                    .character_reference_code
                    .saturating_mul(radix)
                    .saturating_add(digit);
            }
            // "U+003B SEMICOLON - Switch to the numeric character reference end state."
            Some(';') => {
                self.finish_numeric_character_reference();
                let return_state = self.return_state;
                self.switch_to(return_state);
            }
            // "Anything else - This is a missing-semicolon-after-character-reference
            // parse error. Reconsume in the numeric character reference end state."
            _ => {
                self.error(ParseErrorCode::MissingSemicolonAfterCharacterReference);
                self.finish_numeric_character_reference();
                self.reconsume_in_return_state();
            }
        }
    }

    /// [§ 13.2.5.80 Numeric character reference end state](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-end-state)
    ///
    /// Runs in place of a separate state: the checks below never consume
    /// input, so the caller decides whether to switch to or reconsume in the
    /// return state.
    fn finish_numeric_character_reference(&mut self) {
        let code = self.character_reference_code;

        let replacement = if code == 0 {
            // "If the number is 0x00, then this is a null-character-reference parse
            // error. Set the character reference code to 0xFFFD."
            self.error(ParseErrorCode::NullCharacterReference);
            '\u{FFFD}'
        } else if code > 0x10FFFF {
            // "If the number is greater than 0x10FFFF, then this is a
            // character-reference-outside-unicode-range parse error."
            self.error(ParseErrorCode::CharacterReferenceOutsideUnicodeRange);
            '\u{FFFD}'
        } else if matches!(code, 0xD800..=0xDFFF) {
            // "If the number is a surrogate, then this is a
            // surrogate-character-reference parse error."
            self.error(ParseErrorCode::SurrogateCharacterReference);
            '\u{FFFD}'
        } else {
            let c = char::from_u32(code).unwrap_or('\u{FFFD}');
            if is_noncharacter(c) {
                self.error(ParseErrorCode::NoncharacterCharacterReference);
            }
            // "If the number is 0x0D, or a control that's not ASCII whitespace, then
            // this is a control-character-reference parse error. If the number is one
            // of the numbers in the first column of the following table, then find
            // the row with that number in the first column, and set the character
            // reference code to the number in the second column of that row."
            if c == '\r' || (is_control(c) && !Self::is_whitespace_char(c)) {
                self.error(ParseErrorCode::ControlCharacterReference);
            }
            C1_REPLACEMENTS
                .iter()
                .find(|(from, _)| *from == code)
                .map_or(c, |(_, to)| *to)
        };

        // "Set the temporary buffer to the empty string. Append a code point equal
        // to the character reference code to the temporary buffer. Flush code
        // points consumed as a character reference."
        self.temporary_buffer.clear();
        self.temporary_buffer.push(replacement);
        self.flush_code_points_consumed_as_character_reference();
    }
}
