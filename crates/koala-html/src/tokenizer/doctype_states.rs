//! DOCTYPE states.
//!
//! [§ 13.2.5.53](https://html.spec.whatwg.org/multipage/parsing.html#doctype-state) through
//! [§ 13.2.5.68](https://html.spec.whatwg.org/multipage/parsing.html#bogus-doctype-state).

use super::core::{HTMLTokenizer, TokenizerState};
use crate::error::ParseErrorCode;

/// Which DOCTYPE identifier a state works on.
#[derive(Clone, Copy)]
enum Identifier {
    Public,
    System,
}

impl HTMLTokenizer {
    /// [§ 13.2.5.53 DOCTYPE state](https://html.spec.whatwg.org/multipage/parsing.html#doctype-state)
    pub(super) fn handle_doctype_state(&mut self) {
        match self.current_input_character {
            // "U+0009 CHARACTER TABULATION, U+000A LINE FEED, U+000C FORM FEED,
            // U+0020 SPACE - Switch to the before DOCTYPE name state."
            Some(c) if Self::is_whitespace_char(c) => {
                self.switch_to(TokenizerState::BeforeDOCTYPEName);
            }
            // "U+003E GREATER-THAN SIGN (>) - Reconsume in the before DOCTYPE name state."
            Some('>') => self.reconsume_in(TokenizerState::BeforeDOCTYPEName),
            // "EOF - This is an eof-in-doctype parse error. Create a new DOCTYPE token.
            // Set its force-quirks flag to on. Emit the current token. Emit an end-of-file token."
            None => {
                self.error(ParseErrorCode::EofInDoctype);
                self.emit_force_quirks_doctype();
                self.emit_eof_token();
            }
            // "Anything else - This is a missing-whitespace-before-doctype-name parse error.
            // Reconsume in the before DOCTYPE name state."
            Some(_) => {
                self.error(ParseErrorCode::MissingWhitespaceBeforeDoctypeName);
                self.reconsume_in(TokenizerState::BeforeDOCTYPEName);
            }
        }
    }

    /// [§ 13.2.5.54 Before DOCTYPE name state](https://html.spec.whatwg.org/multipage/parsing.html#before-doctype-name-state)
    pub(super) fn handle_before_doctype_name_state(&mut self) {
        match self.current_input_character {
            // "U+0009 CHARACTER TABULATION, U+000A LINE FEED, U+000C FORM FEED,
            // U+0020 SPACE - Ignore the character."
            Some(c) if Self::is_whitespace_char(c) => {}
            // "U+0000 NULL - This is an unexpected-null-character parse error. Create a new
            // DOCTYPE token. Set the token's name to a U+FFFD REPLACEMENT CHARACTER. Switch to
            // the DOCTYPE name state."
            Some('\0') => {
                self.error(ParseErrorCode::UnexpectedNullCharacter);
                self.create_doctype_token();
                self.append_to_doctype_name('\u{FFFD}');
                self.switch_to(TokenizerState::DOCTYPEName);
            }
            // "U+003E GREATER-THAN SIGN (>) - This is a missing-doctype-name parse error.
            // Create a new DOCTYPE token. Set its force-quirks flag to on. Switch to the data state.
            // Emit the current token."
            Some('>') => {
                self.error(ParseErrorCode::MissingDoctypeName);
                self.switch_to(TokenizerState::Data);
                self.emit_force_quirks_doctype();
            }
            None => {
                self.error(ParseErrorCode::EofInDoctype);
                self.emit_force_quirks_doctype();
                self.emit_eof_token();
            }
            // "ASCII upper alpha - Create a new DOCTYPE token. Set the token's name to
            // the lowercase version of the current input character. Switch to the DOCTYPE name state."
            // "Anything else - Create a new DOCTYPE token. Set the token's name to the
            // current input character. Switch to the DOCTYPE name state."
            Some(c) => {
                self.create_doctype_token();
                self.append_to_doctype_name(c.to_ascii_lowercase());
                self.switch_to(TokenizerState::DOCTYPEName);
            }
        }
    }

    /// [§ 13.2.5.55 DOCTYPE name state](https://html.spec.whatwg.org/multipage/parsing.html#doctype-name-state)
    pub(super) fn handle_doctype_name_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {
                self.switch_to(TokenizerState::AfterDOCTYPEName);
            }
            // "U+003E GREATER-THAN SIGN (>) - Switch to the data state. Emit the current token."
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_current_token();
            }
            Some('\0') => {
                self.error(ParseErrorCode::UnexpectedNullCharacter);
                self.append_to_doctype_name('\u{FFFD}');
            }
            None => self.eof_in_doctype(),
            Some(c) => self.append_to_doctype_name(c.to_ascii_lowercase()),
        }
    }

    /// [§ 13.2.5.56 After DOCTYPE name state](https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-name-state)
    pub(super) fn handle_after_doctype_name_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {}
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_current_token();
            }
            None => self.eof_in_doctype(),
            Some(_) => {
                // "If the six characters starting from the current input character are an
                // ASCII case-insensitive match for the word "PUBLIC", then consume those
                // characters and switch to the after DOCTYPE public keyword state."
                if self.consume_sequence_if_match("PUBLIC", false) {
                    self.switch_to(TokenizerState::AfterDOCTYPEPublicKeyword);
                    return;
                }
                if self.preprocessor.end_of_chunk_hit {
                    return;
                }
                // "Otherwise, if the six characters starting from the current input character
                // are an ASCII case-insensitive match for the word "SYSTEM", then consume
                // those characters and switch to the after DOCTYPE system keyword state."
                if self.consume_sequence_if_match("SYSTEM", false) {
                    self.switch_to(TokenizerState::AfterDOCTYPESystemKeyword);
                    return;
                }
                if self.preprocessor.end_of_chunk_hit {
                    return;
                }
                // "Otherwise, this is an invalid-character-sequence-after-doctype-name parse
                // error. Set the current DOCTYPE token's force-quirks flag to on. Reconsume in
                // the bogus DOCTYPE state."
                self.error(ParseErrorCode::InvalidCharacterSequenceAfterDoctypeName);
                self.set_force_quirks();
                self.reconsume_in(TokenizerState::BogusDOCTYPE);
            }
        }
    }

    /// [§ 13.2.5.57 After DOCTYPE public keyword state](https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-public-keyword-state)
    pub(super) fn handle_after_doctype_public_keyword_state(&mut self) {
        self.handle_after_doctype_keyword(
            Identifier::Public,
            TokenizerState::BeforeDOCTYPEPublicIdentifier,
        );
    }

    /// [§ 13.2.5.63 After DOCTYPE system keyword state](https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-system-keyword-state)
    pub(super) fn handle_after_doctype_system_keyword_state(&mut self) {
        self.handle_after_doctype_keyword(
            Identifier::System,
            TokenizerState::BeforeDOCTYPESystemIdentifier,
        );
    }

    fn handle_after_doctype_keyword(&mut self, which: Identifier, before_state: TokenizerState) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => self.switch_to(before_state),
            // "U+0022 QUOTATION MARK (") - This is a missing-whitespace-after-doctype-public-keyword
            // parse error. Set the current DOCTYPE token's public identifier to the empty string
            // (not missing), then switch to the DOCTYPE public identifier (double-quoted) state."
            Some(quote @ ('"' | '\'')) => {
                self.error(match which {
                    Identifier::Public => {
                        ParseErrorCode::MissingWhitespaceAfterDoctypePublicKeyword
                    }
                    Identifier::System => {
                        ParseErrorCode::MissingWhitespaceAfterDoctypeSystemKeyword
                    }
                });
                self.begin_identifier(which, quote);
            }
            Some('>') => self.missing_identifier(which),
            None => self.eof_in_doctype(),
            Some(_) => self.missing_quote_before_identifier(which),
        }
    }

    /// [§ 13.2.5.58 Before DOCTYPE public identifier state](https://html.spec.whatwg.org/multipage/parsing.html#before-doctype-public-identifier-state)
    pub(super) fn handle_before_doctype_public_identifier_state(&mut self) {
        self.handle_before_doctype_identifier(Identifier::Public);
    }

    /// [§ 13.2.5.64 Before DOCTYPE system identifier state](https://html.spec.whatwg.org/multipage/parsing.html#before-doctype-system-identifier-state)
    pub(super) fn handle_before_doctype_system_identifier_state(&mut self) {
        self.handle_before_doctype_identifier(Identifier::System);
    }

    fn handle_before_doctype_identifier(&mut self, which: Identifier) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {}
            Some(quote @ ('"' | '\'')) => self.begin_identifier(which, quote),
            Some('>') => self.missing_identifier(which),
            None => self.eof_in_doctype(),
            Some(_) => self.missing_quote_before_identifier(which),
        }
    }

    /// [§ 13.2.5.59 DOCTYPE public identifier (double-quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#doctype-public-identifier-(double-quoted)-state)
    /// [§ 13.2.5.60 DOCTYPE public identifier (single-quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#doctype-public-identifier-(single-quoted)-state)
    pub(super) fn handle_doctype_public_identifier_quoted_state(&mut self, quote: char) {
        self.handle_doctype_identifier_quoted(Identifier::Public, quote);
    }

    /// [§ 13.2.5.65 DOCTYPE system identifier (double-quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#doctype-system-identifier-(double-quoted)-state)
    /// [§ 13.2.5.66 DOCTYPE system identifier (single-quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#doctype-system-identifier-(single-quoted)-state)
    pub(super) fn handle_doctype_system_identifier_quoted_state(&mut self, quote: char) {
        self.handle_doctype_identifier_quoted(Identifier::System, quote);
    }

    fn handle_doctype_identifier_quoted(&mut self, which: Identifier, quote: char) {
        match self.current_input_character {
            // "U+0022 QUOTATION MARK (") - Switch to the after DOCTYPE public identifier state."
            Some(c) if c == quote => self.switch_to(match which {
                Identifier::Public => TokenizerState::AfterDOCTYPEPublicIdentifier,
                Identifier::System => TokenizerState::AfterDOCTYPESystemIdentifier,
            }),
            Some('\0') => {
                self.error(ParseErrorCode::UnexpectedNullCharacter);
                self.append_to_identifier(which, '\u{FFFD}');
            }
            // "U+003E GREATER-THAN SIGN (>) - This is an abrupt-doctype-public-identifier parse
            // error. Set the current DOCTYPE token's force-quirks flag to on. Switch to the data
            // state. Emit the current DOCTYPE token."
            Some('>') => {
                self.error(match which {
                    Identifier::Public => ParseErrorCode::AbruptDoctypePublicIdentifier,
                    Identifier::System => ParseErrorCode::AbruptDoctypeSystemIdentifier,
                });
                self.set_force_quirks();
                self.switch_to(TokenizerState::Data);
                self.emit_current_token();
            }
            None => self.eof_in_doctype(),
            Some(c) => self.append_to_identifier(which, c),
        }
    }

    /// [§ 13.2.5.61 After DOCTYPE public identifier state](https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-public-identifier-state)
    pub(super) fn handle_after_doctype_public_identifier_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {
                self.switch_to(TokenizerState::BetweenDOCTYPEPublicAndSystemIdentifiers);
            }
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_current_token();
            }
            // "U+0022 QUOTATION MARK (") - This is a
            // missing-whitespace-between-doctype-public-and-system-identifiers parse error. Set
            // the current DOCTYPE token's system identifier to the empty string (not missing),
            // then switch to the DOCTYPE system identifier (double-quoted) state."
            Some(quote @ ('"' | '\'')) => {
                self.error(
                    ParseErrorCode::MissingWhitespaceBetweenDoctypePublicAndSystemIdentifiers,
                );
                self.begin_identifier(Identifier::System, quote);
            }
            None => self.eof_in_doctype(),
            Some(_) => self.missing_quote_before_identifier(Identifier::System),
        }
    }

    /// [§ 13.2.5.62 Between DOCTYPE public and system identifiers state](https://html.spec.whatwg.org/multipage/parsing.html#between-doctype-public-and-system-identifiers-state)
    pub(super) fn handle_between_doctype_public_and_system_identifiers_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {}
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_current_token();
            }
            Some(quote @ ('"' | '\'')) => self.begin_identifier(Identifier::System, quote),
            None => self.eof_in_doctype(),
            Some(_) => self.missing_quote_before_identifier(Identifier::System),
        }
    }

    /// [§ 13.2.5.67 After DOCTYPE system identifier state](https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-system-identifier-state)
    pub(super) fn handle_after_doctype_system_identifier_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {}
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_current_token();
            }
            None => self.eof_in_doctype(),
            // "Anything else - This is an unexpected-character-after-doctype-system-identifier
            // parse error. Reconsume in the bogus DOCTYPE state. (This does not set the current
            // DOCTYPE token's force-quirks flag to on.)"
            Some(_) => {
                self.error(ParseErrorCode::UnexpectedCharacterAfterDoctypeSystemIdentifier);
                self.reconsume_in(TokenizerState::BogusDOCTYPE);
            }
        }
    }

    /// [§ 13.2.5.68 Bogus DOCTYPE state](https://html.spec.whatwg.org/multipage/parsing.html#bogus-doctype-state)
    pub(super) fn handle_bogus_doctype_state(&mut self) {
        match self.current_input_character {
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_current_token();
            }
            Some('\0') => self.error(ParseErrorCode::UnexpectedNullCharacter),
            // "EOF - Emit the DOCTYPE token. Emit an end-of-file token."
            None => {
                self.emit_current_token();
                self.emit_eof_token();
            }
            // "Anything else - Ignore the character."
            Some(_) => {}
        }
    }

    fn append_to_doctype_name(&mut self, c: char) {
        if let Some(doctype) = self.current_doctype_mut() {
            doctype.name.get_or_insert_with(String::new).push(c);
        }
    }

    fn append_to_identifier(&mut self, which: Identifier, c: char) {
        if let Some(doctype) = self.current_doctype_mut() {
            let id = match which {
                Identifier::Public => &mut doctype.public_id,
                Identifier::System => &mut doctype.system_id,
            };
            id.get_or_insert_with(String::new).push(c);
        }
    }

    /// "Set the current DOCTYPE token's X identifier to the empty string (not
    /// missing), then switch to the DOCTYPE X identifier (quoted) state."
    fn begin_identifier(&mut self, which: Identifier, quote: char) {
        if let Some(doctype) = self.current_doctype_mut() {
            let id = match which {
                Identifier::Public => &mut doctype.public_id,
                Identifier::System => &mut doctype.system_id,
            };
            *id = Some(String::new());
        }
        self.switch_to(match (which, quote) {
            (Identifier::Public, '"') => TokenizerState::DOCTYPEPublicIdentifierDoubleQuoted,
            (Identifier::Public, _) => TokenizerState::DOCTYPEPublicIdentifierSingleQuoted,
            (Identifier::System, '"') => TokenizerState::DOCTYPESystemIdentifierDoubleQuoted,
            (Identifier::System, _) => TokenizerState::DOCTYPESystemIdentifierSingleQuoted,
        });
    }

    /// "This is a missing-doctype-X-identifier parse error. Set the current
    /// DOCTYPE token's force-quirks flag to on. Switch to the data state. Emit
    /// the current DOCTYPE token."
    fn missing_identifier(&mut self, which: Identifier) {
        self.error(match which {
            Identifier::Public => ParseErrorCode::MissingDoctypePublicIdentifier,
            Identifier::System => ParseErrorCode::MissingDoctypeSystemIdentifier,
        });
        self.set_force_quirks();
        self.switch_to(TokenizerState::Data);
        self.emit_current_token();
    }

    /// "This is a missing-quote-before-doctype-X-identifier parse error. Set the
    /// current DOCTYPE token's force-quirks flag to on. Reconsume in the bogus
    /// DOCTYPE state."
    fn missing_quote_before_identifier(&mut self, which: Identifier) {
        self.error(match which {
            Identifier::Public => ParseErrorCode::MissingQuoteBeforeDoctypePublicIdentifier,
            Identifier::System => ParseErrorCode::MissingQuoteBeforeDoctypeSystemIdentifier,
        });
        self.set_force_quirks();
        self.reconsume_in(TokenizerState::BogusDOCTYPE);
    }

    /// "EOF - This is an eof-in-doctype parse error. Set the current DOCTYPE
    /// token's force-quirks flag to on. Emit the current DOCTYPE token. Emit an
    /// end-of-file token."
    fn eof_in_doctype(&mut self) {
        self.error(ParseErrorCode::EofInDoctype);
        self.set_force_quirks();
        self.emit_current_token();
        self.emit_eof_token();
    }
}
