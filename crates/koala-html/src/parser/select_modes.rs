//! [§ 13.2.6.4.16](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inselect)
//! and [§ 13.2.6.4.17](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inselectintable):
//! the `<select>` insertion modes.

use super::core::{InsertionMode, TreeBuilder};
use crate::adapter::TreeAdapter;
use crate::error::ParseErrorCode;
use crate::tag::TagId;
use crate::tokenizer::Token;

impl<A: TreeAdapter> TreeBuilder<A> {
    /// [§ 13.2.6.4.16 The "in select" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inselect)
    pub(super) fn handle_in_select_mode(&mut self, token: &Token) {
        match token {
            // "A character token that is U+0000 NULL"
            // "Parse error. Ignore the token."
            Token::NullCharacter(_) => self.parse_error(ParseErrorCode::UnexpectedNullCharacter),

            // "Any other character token"
            // "Insert the token's character."
            Token::Character(text) | Token::WhitespaceCharacter(text) => {
                self.insert_characters(text);
            }

            // "A comment token"
            Token::Comment(comment) => self.insert_comment(comment),

            // "A DOCTYPE token"
            Token::Doctype(_) => self.parse_error(ParseErrorCode::MisplacedDoctype),

            Token::StartTag(tag) => match tag.tag_id {
                // "A start tag whose tag name is "html""
                TagId::Html => self.process_using_rules_for(InsertionMode::InBody, token),

                // "A start tag whose tag name is "option""
                // "If the current node is an option element, pop that node from
                // the stack of open elements. Insert an HTML element for the
                // token."
                TagId::Option => {
                    self.pop_current_if(TagId::Option);
                    let _ = self.insert_html_element(tag);
                }

                // "A start tag whose tag name is "optgroup""
                // "If the current node is an option element, pop that node from
                // the stack of open elements. If the current node is an
                // optgroup element, pop that node from the stack of open
                // elements. Insert an HTML element for the token."
                TagId::Optgroup => {
                    self.pop_current_if(TagId::Option);
                    self.pop_current_if(TagId::Optgroup);
                    let _ = self.insert_html_element(tag);
                }

                // "A start tag whose tag name is "hr""
                // "If the current node is an option element, pop that node from
                // the stack of open elements. If the current node is an
                // optgroup element, pop that node from the stack of open
                // elements. Insert an HTML element for the token. Immediately
                // pop the current node off the stack of open elements.
                // Acknowledge the token's self-closing flag, if it is set."
                TagId::Hr => {
                    self.pop_current_if(TagId::Option);
                    self.pop_current_if(TagId::Optgroup);
                    self.insert_void_element(tag);
                }

                // "A start tag whose tag name is "select""
                // "Parse error. If the stack of open elements does not have a
                // select element in select scope, ignore the token. (fragment
                // case) Otherwise: Pop elements from the stack of open elements
                // until a select element has been popped from the stack. Reset
                // the insertion mode appropriately."
                TagId::Select => {
                    self.parse_error(ParseErrorCode::UnexpectedStartTagInContext);
                    let _ = self.close_select();
                }

                // "A start tag whose tag name is one of: "input", "keygen",
                // "textarea""
                // "Parse error. If the stack of open elements does not have a
                // select element in select scope, ignore the token. (fragment
                // case) Otherwise: Pop elements from the stack of open elements
                // until a select element has been popped from the stack. Reset
                // the insertion mode appropriately. Reprocess the token."
                TagId::Input | TagId::Keygen | TagId::Textarea => {
                    self.parse_error(ParseErrorCode::UnexpectedStartTagInContext);
                    if self.close_select() {
                        self.reprocess_token(token);
                    }
                }

                // "A start tag whose tag name is one of: "script", "template""
                TagId::Script | TagId::Template => {
                    self.process_using_rules_for(InsertionMode::InHead, token);
                }

                // "Any other start tag"
                // "Parse error. Ignore the token."
                _ => self.parse_error(ParseErrorCode::UnexpectedStartTagInContext),
            },

            Token::EndTag(tag) => match tag.tag_id {
                // "An end tag whose tag name is "optgroup""
                TagId::Optgroup => {
                    // "First, if the current node is an option element, and the
                    // node immediately before it in the stack of open elements
                    // is an optgroup element, then pop the current node from the
                    // stack of open elements."
                    let len = self.open_elements.len();
                    if self.open_elements.current_is(TagId::Option)
                        && len >= 2
                        && self
                            .open_elements
                            .get(len - 2)
                            .is_some_and(|entry| entry.is(TagId::Optgroup))
                    {
                        let _ = self.open_elements.pop();
                    }
                    // "If the current node is an optgroup element, then pop that
                    // node from the stack of open elements. Otherwise, this is a
                    // parse error; ignore the token."
                    if self.open_elements.current_is(TagId::Optgroup) {
                        let _ = self.open_elements.pop();
                    } else {
                        self.parse_error(ParseErrorCode::EndTagWithoutMatchingOpenElement);
                    }
                }

                // "An end tag whose tag name is "option""
                // "If the current node is an option element, then pop that node
                // from the stack of open elements. Otherwise, this is a parse
                // error; ignore the token."
                TagId::Option => {
                    if self.open_elements.current_is(TagId::Option) {
                        let _ = self.open_elements.pop();
                    } else {
                        self.parse_error(ParseErrorCode::EndTagWithoutMatchingOpenElement);
                    }
                }

                // "An end tag whose tag name is "select""
                TagId::Select => {
                    if !self.close_select() {
                        self.parse_error(ParseErrorCode::EndTagWithoutMatchingOpenElement);
                    }
                }

                // "An end tag whose tag name is "template""
                TagId::Template => self.process_using_rules_for(InsertionMode::InHead, token),

                // "Anything else"
                _ => self.parse_error(ParseErrorCode::EndTagWithoutMatchingOpenElement),
            },

            // "An end-of-file token"
            Token::EndOfFile { .. } => self.process_using_rules_for(InsertionMode::InBody, token),
        }
    }

    fn pop_current_if(&mut self, tag_id: TagId) {
        if self.open_elements.current_is(tag_id) {
            let _ = self.open_elements.pop();
        }
    }

    /// Pop through the open `select` and reset the insertion mode. Returns
    /// false if there is no `select` in select scope.
    fn close_select(&mut self) -> bool {
        if !self.open_elements.has_in_select_scope(TagId::Select) {
            return false;
        }
        self.open_elements.pop_until_tag_popped(TagId::Select);
        self.reset_insertion_mode_appropriately();
        true
    }

    /// [§ 13.2.6.4.17 The "in select in table" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inselectintable)
    pub(super) fn handle_in_select_in_table_mode(&mut self, token: &Token) {
        const TABLE_TAGS: &[TagId] = &[
            TagId::Caption,
            TagId::Table,
            TagId::Tbody,
            TagId::Tfoot,
            TagId::Thead,
            TagId::Tr,
            TagId::Td,
            TagId::Th,
        ];

        match token {
            // "A start tag whose tag name is one of: "caption", "table",
            // "tbody", "tfoot", "thead", "tr", "td", "th""
            // "Parse error. Pop elements from the stack of open elements until a
            // select element has been popped from the stack. Reset the insertion
            // mode appropriately. Reprocess the token."
            Token::StartTag(tag) if TABLE_TAGS.contains(&tag.tag_id) => {
                self.parse_error(ParseErrorCode::UnexpectedStartTagInContext);
                self.open_elements.pop_until_tag_popped(TagId::Select);
                self.reset_insertion_mode_appropriately();
                self.reprocess_token(token);
            }

            // "An end tag whose tag name is one of: "caption", "table", "tbody",
            // "tfoot", "thead", "tr", "td", "th""
            Token::EndTag(tag) if TABLE_TAGS.contains(&tag.tag_id) => {
                // "Parse error."
                self.parse_error(ParseErrorCode::EndTagWithoutMatchingOpenElement);
                // "If the stack of open elements does not have an element in
                // table scope that is an HTML element with the same tag name as
                // that of the token, then ignore the token."
                if !self.open_elements.has_in_table_scope(tag.tag_id) {
                    return;
                }
                // "Otherwise: Pop elements from the stack of open elements until
                // a select element has been popped from the stack. Reset the
                // insertion mode appropriately. Reprocess the token."
                self.open_elements.pop_until_tag_popped(TagId::Select);
                self.reset_insertion_mode_appropriately();
                self.reprocess_token(token);
            }

            // "Anything else"
            // "Process the token using the rules for the "in select" insertion
            // mode."
            _ => self.process_using_rules_for(InsertionMode::InSelect, token),
        }
    }
}
