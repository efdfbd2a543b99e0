//! Insertion modes after the body or frameset has been closed, and the
//! frameset modes.

use super::core::{InsertionMode, TreeBuilder};
use crate::adapter::TreeAdapter;
use crate::error::ParseErrorCode;
use crate::tag::TagId;
use crate::tokenizer::Token;

impl<A: TreeAdapter> TreeBuilder<A> {
    /// [§ 13.2.6.4.19 The "after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-afterbody)
    pub(super) fn handle_after_body_mode(&mut self, token: &Token) {
        match token {
            // "A character token that is one of U+0009 ..., or U+0020 SPACE"
            // "Process the token using the rules for the "in body" insertion
            // mode."
            Token::WhitespaceCharacter(_) => {
                self.process_using_rules_for(InsertionMode::InBody, token);
            }

            // "A comment token"
            // "Insert a comment as the last child of the first element in the
            // stack of open elements (the html element)."
            Token::Comment(comment) => {
                if let Some(html) = self.open_elements.get(0).map(|entry| entry.handle) {
                    self.append_comment_to(html, comment);
                }
            }

            // "A DOCTYPE token"
            Token::Doctype(_) => self.parse_error(ParseErrorCode::MisplacedDoctype),

            // "A start tag whose tag name is "html""
            Token::StartTag(tag) if tag.tag_id == TagId::Html => {
                self.process_using_rules_for(InsertionMode::InBody, token);
            }

            // "An end tag whose tag name is "html""
            Token::EndTag(tag) if tag.tag_id == TagId::Html => {
                // "If the parser was created as part of the HTML fragment
                // parsing algorithm, this is a parse error; ignore the token.
                // (fragment case)"
                if self.fragment_context.is_some() {
                    self.parse_error(ParseErrorCode::EndTagWithoutMatchingOpenElement);
                    return;
                }
                // "Otherwise, switch the insertion mode to "after after body"."
                if let Some(html) = self.open_elements.get(0).map(|entry| entry.handle) {
                    self.record_end_tag(html);
                }
                self.switch_to(InsertionMode::AfterAfterBody);
            }

            // "An end-of-file token"
            // "Stop parsing."
            Token::EndOfFile { .. } => self.stop_parsing(),

            // "Anything else"
            // "Parse error. Switch the insertion mode to "in body" and reprocess
            // the token."
            _ => {
                self.parse_error(ParseErrorCode::MisplacedStartTag);
                self.switch_to(InsertionMode::InBody);
                self.reprocess_token(token);
            }
        }
    }

    /// [§ 13.2.6.4.20 The "in frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inframeset)
    pub(super) fn handle_in_frameset_mode(&mut self, token: &Token) {
        match token {
            // "A character token that is one of U+0009 ..., or U+0020 SPACE"
            // "Insert the character."
            Token::WhitespaceCharacter(text) => self.insert_characters(text),

            // "A comment token"
            Token::Comment(comment) => self.insert_comment(comment),

            // "A DOCTYPE token"
            Token::Doctype(_) => self.parse_error(ParseErrorCode::MisplacedDoctype),

            Token::StartTag(tag) => match tag.tag_id {
                // "A start tag whose tag name is "html""
                TagId::Html => self.process_using_rules_for(InsertionMode::InBody, token),

                // "A start tag whose tag name is "frameset""
                // "Insert an HTML element for the token."
                TagId::Frameset => {
                    let _ = self.insert_html_element(tag);
                }

                // "A start tag whose tag name is "frame""
                // "Insert an HTML element for the token. Immediately pop the
                // current node off the stack of open elements. Acknowledge the
                // token's self-closing flag, if it is set."
                TagId::Frame => self.insert_void_element(tag),

                // "A start tag whose tag name is "noframes""
                TagId::Noframes => self.process_using_rules_for(InsertionMode::InHead, token),

                _ => self.parse_error(ParseErrorCode::MisplacedStartTag),
            },

            // "An end tag whose tag name is "frameset""
            Token::EndTag(tag) if tag.tag_id == TagId::Frameset => {
                // "If the current node is the root html element, then this is a
                // parse error; ignore the token. (fragment case)"
                if self.open_elements.len() <= 1 {
                    self.parse_error(ParseErrorCode::EndTagWithoutMatchingOpenElement);
                    return;
                }
                // "Otherwise, pop the current node from the stack of open
                // elements."
                let _ = self.open_elements.pop();
                // "If the parser was not created as part of the HTML fragment
                // parsing algorithm (fragment case), and the current node is no
                // longer a frameset element, then switch the insertion mode to
                // "after frameset"."
                if self.fragment_context.is_none()
                    && !self.open_elements.current_is(TagId::Frameset)
                {
                    self.switch_to(InsertionMode::AfterFrameset);
                }
            }

            // "An end-of-file token"
            Token::EndOfFile { .. } => {
                // "If the current node is not the root html element, then this is
                // a parse error. Note: The current node can only be the root
                // html element in the fragment case."
                if self.open_elements.len() > 1 {
                    self.parse_error(ParseErrorCode::OpenElementsLeftAfterEof);
                }
                // "Stop parsing."
                self.stop_parsing();
            }

            // "Anything else"
            // "Parse error. Ignore the token."
            Token::EndTag(_) => self.parse_error(ParseErrorCode::EndTagWithoutMatchingOpenElement),
            Token::Character(_) | Token::NullCharacter(_) => {
                self.parse_error(ParseErrorCode::MisplacedStartTag);
            }
        }
    }

    /// [§ 13.2.6.4.21 The "after frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-afterframeset)
    pub(super) fn handle_after_frameset_mode(&mut self, token: &Token) {
        match token {
            // "A character token that is one of U+0009 ..., or U+0020 SPACE"
            Token::WhitespaceCharacter(text) => self.insert_characters(text),

            // "A comment token"
            Token::Comment(comment) => self.insert_comment(comment),

            // "A DOCTYPE token"
            Token::Doctype(_) => self.parse_error(ParseErrorCode::MisplacedDoctype),

            // "A start tag whose tag name is "html""
            Token::StartTag(tag) if tag.tag_id == TagId::Html => {
                self.process_using_rules_for(InsertionMode::InBody, token);
            }

            // "An end tag whose tag name is "html""
            // "Switch the insertion mode to "after after frameset"."
            Token::EndTag(tag) if tag.tag_id == TagId::Html => {
                if let Some(html) = self.open_elements.get(0).map(|entry| entry.handle) {
                    self.record_end_tag(html);
                }
                self.switch_to(InsertionMode::AfterAfterFrameset);
            }

            // "A start tag whose tag name is "noframes""
            Token::StartTag(tag) if tag.tag_id == TagId::Noframes => {
                self.process_using_rules_for(InsertionMode::InHead, token);
            }

            // "An end-of-file token"
            Token::EndOfFile { .. } => self.stop_parsing(),

            // "Anything else"
            // "Parse error. Ignore the token."
            Token::EndTag(_) => self.parse_error(ParseErrorCode::EndTagWithoutMatchingOpenElement),
            _ => self.parse_error(ParseErrorCode::MisplacedStartTag),
        }
    }

    /// [§ 13.2.6.4.22 The "after after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-after-body-insertion-mode)
    pub(super) fn handle_after_after_body_mode(&mut self, token: &Token) {
        match token {
            // "A comment token"
            // "Insert a comment as the last child of the Document object."
            Token::Comment(comment) => self.append_comment_to(self.document, comment),

            // "A DOCTYPE token"
            // "A character token that is one of U+0009 ..., or U+0020 SPACE"
            // "A start tag whose tag name is "html""
            // "Process the token using the rules for the "in body" insertion
            // mode."
            Token::Doctype(_) | Token::WhitespaceCharacter(_) => {
                self.process_using_rules_for(InsertionMode::InBody, token);
            }
            Token::StartTag(tag) if tag.tag_id == TagId::Html => {
                self.process_using_rules_for(InsertionMode::InBody, token);
            }

            // "An end-of-file token"
            Token::EndOfFile { .. } => self.stop_parsing(),

            // "Anything else"
            // "Parse error. Switch the insertion mode to "in body" and reprocess
            // the token."
            _ => {
                self.parse_error(ParseErrorCode::MisplacedStartTag);
                self.switch_to(InsertionMode::InBody);
                self.reprocess_token(token);
            }
        }
    }

    /// [§ 13.2.6.4.23 The "after after frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-after-frameset-insertion-mode)
    pub(super) fn handle_after_after_frameset_mode(&mut self, token: &Token) {
        match token {
            // "A comment token"
            Token::Comment(comment) => self.append_comment_to(self.document, comment),

            // "A DOCTYPE token", whitespace, "A start tag whose tag name is
            // "html"": "Process the token using the rules for the "in body"
            // insertion mode."
            Token::Doctype(_) | Token::WhitespaceCharacter(_) => {
                self.process_using_rules_for(InsertionMode::InBody, token);
            }
            Token::StartTag(tag) if tag.tag_id == TagId::Html => {
                self.process_using_rules_for(InsertionMode::InBody, token);
            }

            // "An end-of-file token"
            Token::EndOfFile { .. } => self.stop_parsing(),

            // "A start tag whose tag name is "noframes""
            Token::StartTag(tag) if tag.tag_id == TagId::Noframes => {
                self.process_using_rules_for(InsertionMode::InHead, token);
            }

            // "Anything else"
            // "Parse error. Ignore the token."
            _ => self.parse_error(ParseErrorCode::MisplacedStartTag),
        }
    }
}
