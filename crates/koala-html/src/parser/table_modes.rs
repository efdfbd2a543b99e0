//! Table insertion modes: in table, in table text, in caption, in column
//! group, in table body, in row and in cell.

use std::mem;

use super::core::{InsertionMode, TreeBuilder};
use crate::adapter::TreeAdapter;
use crate::error::ParseErrorCode;
use crate::tag::TagId;
use crate::tokenizer::{TagToken, Token};

/// Start tags that end a caption or a cell and are then reprocessed.
const TABLE_STRUCTURE_START_TAGS: &[TagId] = &[
    TagId::Caption,
    TagId::Col,
    TagId::Colgroup,
    TagId::Tbody,
    TagId::Td,
    TagId::Tfoot,
    TagId::Th,
    TagId::Thead,
    TagId::Tr,
];

impl<A: TreeAdapter> TreeBuilder<A> {
    /// [§ 13.2.6.4.9 The "in table" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intable)
    pub(super) fn handle_in_table_mode(&mut self, token: &Token) {
        match token {
            // "A character token, if the current node is table, tbody,
            // template, tfoot, thead, or tr element"
            Token::Character(_) | Token::WhitespaceCharacter(_) | Token::NullCharacter(_)
                if self.open_elements.current().is_some_and(|entry| {
                    entry.is_one_of(&[
                        TagId::Table,
                        TagId::Tbody,
                        TagId::Template,
                        TagId::Tfoot,
                        TagId::Thead,
                        TagId::Tr,
                    ])
                }) =>
            {
                // "Let the pending table character tokens be an empty list of
                // tokens. Let the original insertion mode be the current
                // insertion mode. Switch the insertion mode to "in table text"
                // and reprocess the token."
                self.pending_table_text.clear();
                self.pending_table_text_has_non_whitespace = false;
                self.original_insertion_mode = self.insertion_mode;
                self.switch_to(InsertionMode::InTableText);
                self.reprocess_token(token);
            }

            // "A comment token"
            Token::Comment(comment) => self.insert_comment(comment),

            // "A DOCTYPE token"
            Token::Doctype(_) => self.parse_error(ParseErrorCode::MisplacedDoctype),

            Token::StartTag(tag) => self.in_table_start_tag(tag, token),

            // "An end tag whose tag name is "table""
            Token::EndTag(tag) if tag.tag_id == TagId::Table => {
                // "If the stack of open elements does not have a table element
                // in table scope, this is a parse error; ignore the token."
                if !self.open_elements.has_in_table_scope(TagId::Table) {
                    self.parse_error(ParseErrorCode::EndTagWithoutMatchingOpenElement);
                    return;
                }
                // "Otherwise: Pop elements from this stack until a table element
                // has been popped from the stack. Reset the insertion mode
                // appropriately."
                self.open_elements.pop_until_tag_popped(TagId::Table);
                self.reset_insertion_mode_appropriately();
            }

            // "An end tag whose tag name is one of: "body", "caption", "col",
            // "colgroup", "html", "tbody", "td", "tfoot", "th", "thead", "tr""
            // "Parse error. Ignore the token."
            Token::EndTag(tag)
                if matches!(
                    tag.tag_id,
                    TagId::Body
                        | TagId::Caption
                        | TagId::Col
                        | TagId::Colgroup
                        | TagId::Html
                        | TagId::Tbody
                        | TagId::Td
                        | TagId::Tfoot
                        | TagId::Th
                        | TagId::Thead
                        | TagId::Tr
                ) =>
            {
                self.parse_error(ParseErrorCode::EndTagWithoutMatchingOpenElement);
            }

            // "An end tag whose tag name is "template""
            Token::EndTag(tag) if tag.tag_id == TagId::Template => {
                self.process_using_rules_for(InsertionMode::InHead, token);
            }

            // "An end-of-file token"
            // "Process the token using the rules for the "in body" insertion
            // mode."
            Token::EndOfFile { .. } => self.process_using_rules_for(InsertionMode::InBody, token),

            // "Anything else"
            _ => self.foster_parent_token(token),
        }
    }

    fn in_table_start_tag(&mut self, tag: &TagToken, token: &Token) {
        match tag.tag_id {
            // "A start tag whose tag name is "caption""
            TagId::Caption => {
                // "Clear the stack back to a table context. Insert a marker at
                // the end of the list of active formatting elements. Insert an
                // HTML element for the token, then switch the insertion mode to
                // "in caption"."
                self.open_elements.clear_back_to_table_context();
                self.active_formatting_elements.insert_marker();
                let _ = self.insert_html_element(tag);
                self.switch_to(InsertionMode::InCaption);
            }

            // "A start tag whose tag name is "colgroup""
            TagId::Colgroup => {
                self.open_elements.clear_back_to_table_context();
                let _ = self.insert_html_element(tag);
                self.switch_to(InsertionMode::InColumnGroup);
            }

            // "A start tag whose tag name is "col""
            // "Clear the stack back to a table context. Insert an HTML element
            // for a "colgroup" start tag token with no attributes, then switch
            // the insertion mode to "in column group". Reprocess the current
            // token."
            TagId::Col => {
                self.open_elements.clear_back_to_table_context();
                let _ = self.insert_implied_element(TagId::Colgroup);
                self.switch_to(InsertionMode::InColumnGroup);
                self.reprocess_token(token);
            }

            // "A start tag whose tag name is one of: "tbody", "tfoot", "thead""
            TagId::Tbody | TagId::Tfoot | TagId::Thead => {
                self.open_elements.clear_back_to_table_context();
                let _ = self.insert_html_element(tag);
                self.switch_to(InsertionMode::InTableBody);
            }

            // "A start tag whose tag name is one of: "td", "th", "tr""
            // "Clear the stack back to a table context. Insert an HTML element
            // for a "tbody" start tag token with no attributes, then switch the
            // insertion mode to "in table body". Reprocess the current token."
            TagId::Td | TagId::Th | TagId::Tr => {
                self.open_elements.clear_back_to_table_context();
                let _ = self.insert_implied_element(TagId::Tbody);
                self.switch_to(InsertionMode::InTableBody);
                self.reprocess_token(token);
            }

            // "A start tag whose tag name is "table""
            TagId::Table => {
                // "Parse error."
                self.parse_error(ParseErrorCode::MisplacedStartTag);
                // "If the stack of open elements does not have a table element
                // in table scope, ignore the token."
                if !self.open_elements.has_in_table_scope(TagId::Table) {
                    return;
                }
                // "Otherwise: Pop elements from this stack until a table element
                // has been popped from the stack. Reset the insertion mode
                // appropriately. Reprocess the token."
                self.open_elements.pop_until_tag_popped(TagId::Table);
                self.reset_insertion_mode_appropriately();
                self.reprocess_token(token);
            }

            // "A start tag whose tag name is one of: "style", "script",
            // "template""
            TagId::Style | TagId::Script | TagId::Template => {
                self.process_using_rules_for(InsertionMode::InHead, token);
            }

            // "A start tag whose tag name is "input""
            // "If the token does not have an attribute with the name "type", or
            // if it does, but that attribute's value is not an ASCII
            // case-insensitive match for the string "hidden", then: act as
            // described in the "anything else" entry below."
            // "Otherwise: Parse error. Insert an HTML element for the token.
            // Pop that input element off the stack of open elements.
            // Acknowledge the token's self-closing flag, if it is set."
            TagId::Input
                if tag
                    .get_attribute("type")
                    .is_some_and(|value| value.eq_ignore_ascii_case("hidden")) =>
            {
                self.parse_error(ParseErrorCode::MisplacedStartTag);
                self.insert_void_element(tag);
            }

            // "A start tag whose tag name is "form""
            TagId::Form => {
                // "Parse error."
                self.parse_error(ParseErrorCode::MisplacedStartTag);
                // "If there is a template element on the stack of open elements,
                // or if the form element pointer is not null, ignore the
                // token."
                if self.open_elements.tmpl_count() > 0 || self.form_element.is_some() {
                    return;
                }
                // "Otherwise: Insert an HTML element for the token, and set the
                // form element pointer to point to the element created. Pop that
                // form element off the stack of open elements."
                let form = self.insert_html_element(tag);
                self.form_element = Some(form);
                let _ = self.open_elements.pop();
            }

            // "Anything else"
            _ => self.foster_parent_token(token),
        }
    }

    /// "Anything else" in the "in table" insertion mode: "Parse error. Enable
    /// foster parenting, process the token using the rules for the "in body"
    /// insertion mode, and then disable foster parenting."
    fn foster_parent_token(&mut self, token: &Token) {
        self.parse_error(ParseErrorCode::FosterParentedContent);
        self.foster_parenting = true;
        self.process_using_rules_for(InsertionMode::InBody, token);
        self.foster_parenting = false;
    }

    /// [§ 13.2.6.4.10 The "in table text" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intabletext)
    pub(super) fn handle_in_table_text_mode(&mut self, token: &Token) {
        match token {
            // "A character token that is U+0000 NULL"
            // "Parse error. Ignore the token."
            Token::NullCharacter(_) => self.parse_error(ParseErrorCode::UnexpectedNullCharacter),

            // "Any other character token"
            // "Append the character token to the pending table character tokens
            // list."
            Token::Character(_) => {
                self.pending_table_text_has_non_whitespace = true;
                self.pending_table_text.push(token.clone());
            }
            Token::WhitespaceCharacter(_) => self.pending_table_text.push(token.clone()),

            // "Anything else"
            _ => {
                let pending = mem::take(&mut self.pending_table_text);
                // "If any of the tokens in the pending table character tokens
                // list are character tokens that are not ASCII whitespace, then
                // this is a parse error: reprocess the character tokens in the
                // pending table character tokens list using the rules given in
                // the "anything else" entry in the "in table" insertion mode."
                if mem::take(&mut self.pending_table_text_has_non_whitespace) {
                    self.parse_error(ParseErrorCode::FosterParentedContent);
                    self.foster_parenting = true;
                    for pending_token in &pending {
                        self.process_using_rules_for(InsertionMode::InBody, pending_token);
                    }
                    self.foster_parenting = false;
                } else {
                    // "Otherwise, insert the characters given by the pending
                    // table character tokens list."
                    for pending_token in &pending {
                        if let Token::WhitespaceCharacter(text) = pending_token {
                            self.insert_characters(text);
                        }
                    }
                }
                // "Switch the insertion mode to the original insertion mode and
                // reprocess the token."
                self.switch_to(self.original_insertion_mode);
                self.reprocess_token(token);
            }
        }
    }

    /// [§ 13.2.6.4.11 The "in caption" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incaption)
    pub(super) fn handle_in_caption_mode(&mut self, token: &Token) {
        match token {
            // "An end tag whose tag name is "caption""
            Token::EndTag(tag) if tag.tag_id == TagId::Caption => {
                let _ = self.close_caption();
            }

            // "A start tag whose tag name is one of: "caption", "col",
            // "colgroup", "tbody", "td", "tfoot", "th", "thead", "tr""
            // "An end tag whose tag name is "table""
            Token::StartTag(tag) if TABLE_STRUCTURE_START_TAGS.contains(&tag.tag_id) => {
                if self.close_caption() {
                    self.reprocess_token(token);
                }
            }
            Token::EndTag(tag) if tag.tag_id == TagId::Table => {
                if self.close_caption() {
                    self.reprocess_token(token);
                }
            }

            // "An end tag whose tag name is one of: "body", "col", "colgroup",
            // "html", "tbody", "td", "tfoot", "th", "thead", "tr""
            // "Parse error. Ignore the token."
            Token::EndTag(tag)
                if matches!(
                    tag.tag_id,
                    TagId::Body
                        | TagId::Col
                        | TagId::Colgroup
                        | TagId::Html
                        | TagId::Tbody
                        | TagId::Td
                        | TagId::Tfoot
                        | TagId::Th
                        | TagId::Thead
                        | TagId::Tr
                ) =>
            {
                self.parse_error(ParseErrorCode::EndTagWithoutMatchingOpenElement);
            }

            // "Anything else"
            // "Process the token using the rules for the "in body" insertion
            // mode."
            _ => self.process_using_rules_for(InsertionMode::InBody, token),
        }
    }

    /// Close the open caption. Returns false (after reporting the error) when
    /// there is no caption in table scope.
    fn close_caption(&mut self) -> bool {
        // "If the stack of open elements does not have a caption element in
        // table scope, this is a parse error; ignore the token. (fragment
        // case)"
        if !self.open_elements.has_in_table_scope(TagId::Caption) {
            self.parse_error(ParseErrorCode::EndTagWithoutMatchingOpenElement);
            return false;
        }
        // "Generate implied end tags."
        self.open_elements.generate_implied_end_tags();
        // "Now, if the current node is not a caption element, then this is a
        // parse error."
        if !self.open_elements.current_is(TagId::Caption) {
            self.parse_error(ParseErrorCode::ClosingOfElementWithOpenChildElements);
        }
        // "Pop elements from this stack until a caption element has been popped
        // from the stack."
        self.open_elements.pop_until_tag_popped(TagId::Caption);
        // "Clear the list of active formatting elements up to the last marker."
        self.active_formatting_elements.clear_to_last_marker();
        // "Switch the insertion mode to "in table"."
        self.switch_to(InsertionMode::InTable);
        true
    }

    /// [§ 13.2.6.4.12 The "in column group" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incolumngroup)
    pub(super) fn handle_in_column_group_mode(&mut self, token: &Token) {
        match token {
            // "A character token that is one of U+0009 ..., or U+0020 SPACE"
            // "Insert the character."
            Token::WhitespaceCharacter(text) => self.insert_characters(text),

            // "A comment token"
            Token::Comment(comment) => self.insert_comment(comment),

            // "A DOCTYPE token"
            Token::Doctype(_) => self.parse_error(ParseErrorCode::MisplacedDoctype),

            // "A start tag whose tag name is "html""
            Token::StartTag(tag) if tag.tag_id == TagId::Html => {
                self.process_using_rules_for(InsertionMode::InBody, token);
            }

            // "A start tag whose tag name is "col""
            // "Insert an HTML element for the token. Immediately pop the
            // current node off the stack of open elements. Acknowledge the
            // token's self-closing flag, if it is set."
            Token::StartTag(tag) if tag.tag_id == TagId::Col => self.insert_void_element(tag),

            // "An end tag whose tag name is "colgroup""
            Token::EndTag(tag) if tag.tag_id == TagId::Colgroup => {
                // "If the current node is not a colgroup element, then this is a
                // parse error; ignore the token."
                if !self.open_elements.current_is(TagId::Colgroup) {
                    self.parse_error(ParseErrorCode::EndTagWithoutMatchingOpenElement);
                    return;
                }
                // "Otherwise, pop the current node from the stack of open
                // elements. Switch the insertion mode to "in table"."
                let _ = self.open_elements.pop();
                self.switch_to(InsertionMode::InTable);
            }

            // "An end tag whose tag name is "col""
            // "Parse error. Ignore the token."
            Token::EndTag(tag) if tag.tag_id == TagId::Col => {
                self.parse_error(ParseErrorCode::EndTagWithoutMatchingOpenElement);
            }

            // "A start tag whose tag name is "template""
            // "An end tag whose tag name is "template""
            Token::StartTag(tag) | Token::EndTag(tag) if tag.tag_id == TagId::Template => {
                self.process_using_rules_for(InsertionMode::InHead, token);
            }

            // "An end-of-file token"
            Token::EndOfFile { .. } => self.process_using_rules_for(InsertionMode::InBody, token),

            // "Anything else"
            _ => {
                // "If the current node is not a colgroup element, then this is a
                // parse error; ignore the token."
                if !self.open_elements.current_is(TagId::Colgroup) {
                    self.parse_error(ParseErrorCode::MisplacedStartTag);
                    return;
                }
                // "Otherwise, pop the current node from the stack of open
                // elements. Switch the insertion mode to "in table". Reprocess
                // the token."
                let _ = self.open_elements.pop();
                self.switch_to(InsertionMode::InTable);
                self.reprocess_token(token);
            }
        }
    }

    /// [§ 13.2.6.4.13 The "in table body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intablebody)
    pub(super) fn handle_in_table_body_mode(&mut self, token: &Token) {
        match token {
            // "A start tag whose tag name is "tr""
            // "Clear the stack back to a table body context. Insert an HTML
            // element for the token, then switch the insertion mode to "in
            // row"."
            Token::StartTag(tag) if tag.tag_id == TagId::Tr => {
                self.open_elements.clear_back_to_table_body_context();
                let _ = self.insert_html_element(tag);
                self.switch_to(InsertionMode::InRow);
            }

            // "A start tag whose tag name is one of: "th", "td""
            // "Parse error. Clear the stack back to a table body context.
            // Insert an HTML element for a "tr" start tag token with no
            // attributes, then switch the insertion mode to "in row". Reprocess
            // the current token."
            Token::StartTag(tag) if matches!(tag.tag_id, TagId::Th | TagId::Td) => {
                self.parse_error(ParseErrorCode::MisplacedStartTag);
                self.open_elements.clear_back_to_table_body_context();
                let _ = self.insert_implied_element(TagId::Tr);
                self.switch_to(InsertionMode::InRow);
                self.reprocess_token(token);
            }

            // "An end tag whose tag name is one of: "tbody", "tfoot", "thead""
            Token::EndTag(tag)
                if matches!(tag.tag_id, TagId::Tbody | TagId::Tfoot | TagId::Thead) =>
            {
                // "If the stack of open elements does not have an element in
                // table scope that is an HTML element with the same tag name as
                // the token, this is a parse error; ignore the token."
                if !self.open_elements.has_in_table_scope(tag.tag_id) {
                    self.parse_error(ParseErrorCode::EndTagWithoutMatchingOpenElement);
                    return;
                }
                // "Otherwise: Clear the stack back to a table body context. Pop
                // the current node from the stack of open elements. Switch the
                // insertion mode to "in table"."
                self.open_elements.clear_back_to_table_body_context();
                let _ = self.open_elements.pop();
                self.switch_to(InsertionMode::InTable);
            }

            // "A start tag whose tag name is one of: "caption", "col",
            // "colgroup", "tbody", "tfoot", "thead""
            // "An end tag whose tag name is "table""
            Token::StartTag(tag)
                if matches!(
                    tag.tag_id,
                    TagId::Caption
                        | TagId::Col
                        | TagId::Colgroup
                        | TagId::Tbody
                        | TagId::Tfoot
                        | TagId::Thead
                ) =>
            {
                self.leave_table_body(token);
            }
            Token::EndTag(tag) if tag.tag_id == TagId::Table => self.leave_table_body(token),

            // "An end tag whose tag name is one of: "body", "caption", "col",
            // "colgroup", "html", "td", "th", "tr""
            // "Parse error. Ignore the token."
            Token::EndTag(tag)
                if matches!(
                    tag.tag_id,
                    TagId::Body
                        | TagId::Caption
                        | TagId::Col
                        | TagId::Colgroup
                        | TagId::Html
                        | TagId::Td
                        | TagId::Th
                        | TagId::Tr
                ) =>
            {
                self.parse_error(ParseErrorCode::EndTagWithoutMatchingOpenElement);
            }

            // "Anything else"
            // "Process the token using the rules for the "in table" insertion
            // mode."
            _ => self.process_using_rules_for(InsertionMode::InTable, token),
        }
    }

    fn leave_table_body(&mut self, token: &Token) {
        // "If the stack of open elements does not have a tbody, thead, or tfoot
        // element in table scope, this is a parse error; ignore the token."
        if !self.open_elements.has_table_body_context_in_table_scope() {
            self.parse_error(ParseErrorCode::EndTagWithoutMatchingOpenElement);
            return;
        }
        // "Otherwise: Clear the stack back to a table body context. Pop the
        // current node from the stack of open elements. Switch the insertion
        // mode to "in table". Reprocess the token."
        self.open_elements.clear_back_to_table_body_context();
        let _ = self.open_elements.pop();
        self.switch_to(InsertionMode::InTable);
        self.reprocess_token(token);
    }

    /// [§ 13.2.6.4.14 The "in row" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inrow)
    pub(super) fn handle_in_row_mode(&mut self, token: &Token) {
        match token {
            // "A start tag whose tag name is one of: "th", "td""
            // "Clear the stack back to a table row context. Insert an HTML
            // element for the token, then switch the insertion mode to "in
            // cell". Insert a marker at the end of the list of active
            // formatting elements."
            Token::StartTag(tag) if matches!(tag.tag_id, TagId::Th | TagId::Td) => {
                self.open_elements.clear_back_to_table_row_context();
                let _ = self.insert_html_element(tag);
                self.switch_to(InsertionMode::InCell);
                self.active_formatting_elements.insert_marker();
            }

            // "An end tag whose tag name is "tr""
            Token::EndTag(tag) if tag.tag_id == TagId::Tr => {
                let _ = self.close_row();
            }

            // "A start tag whose tag name is one of: "caption", "col",
            // "colgroup", "tbody", "tfoot", "thead", "tr""
            // "An end tag whose tag name is "table""
            Token::StartTag(tag)
                if matches!(
                    tag.tag_id,
                    TagId::Caption
                        | TagId::Col
                        | TagId::Colgroup
                        | TagId::Tbody
                        | TagId::Tfoot
                        | TagId::Thead
                        | TagId::Tr
                ) =>
            {
                if self.close_row() {
                    self.reprocess_token(token);
                }
            }
            Token::EndTag(tag) if tag.tag_id == TagId::Table => {
                if self.close_row() {
                    self.reprocess_token(token);
                }
            }

            // "An end tag whose tag name is one of: "tbody", "tfoot", "thead""
            Token::EndTag(tag)
                if matches!(tag.tag_id, TagId::Tbody | TagId::Tfoot | TagId::Thead) =>
            {
                // "If the stack of open elements does not have an element in
                // table scope that is an HTML element with the same tag name as
                // the token, this is a parse error; ignore the token."
                if !self.open_elements.has_in_table_scope(tag.tag_id) {
                    self.parse_error(ParseErrorCode::EndTagWithoutMatchingOpenElement);
                    return;
                }
                // "If the stack of open elements does not have a tr element in
                // table scope, ignore the token."
                if !self.open_elements.has_in_table_scope(TagId::Tr) {
                    return;
                }
                // "Otherwise: Clear the stack back to a table row context. Pop
                // the current node (which will be a tr element) from the stack
                // of open elements. Switch the insertion mode to "in table
                // body". Reprocess the token."
                if self.close_row() {
                    self.reprocess_token(token);
                }
            }

            // "An end tag whose tag name is one of: "body", "caption", "col",
            // "colgroup", "html", "td", "th""
            // "Parse error. Ignore the token."
            Token::EndTag(tag)
                if matches!(
                    tag.tag_id,
                    TagId::Body
                        | TagId::Caption
                        | TagId::Col
                        | TagId::Colgroup
                        | TagId::Html
                        | TagId::Td
                        | TagId::Th
                ) =>
            {
                self.parse_error(ParseErrorCode::EndTagWithoutMatchingOpenElement);
            }

            // "Anything else"
            _ => self.process_using_rules_for(InsertionMode::InTable, token),
        }
    }

    /// Close the open row. Returns false (after reporting the error) when
    /// there is no `tr` in table scope.
    fn close_row(&mut self) -> bool {
        // "If the stack of open elements does not have a tr element in table
        // scope, this is a parse error; ignore the token."
        if !self.open_elements.has_in_table_scope(TagId::Tr) {
            self.parse_error(ParseErrorCode::EndTagWithoutMatchingOpenElement);
            return false;
        }
        // "Otherwise: Clear the stack back to a table row context. Pop the
        // current node (which will be a tr element) from the stack of open
        // elements. Switch the insertion mode to "in table body"."
        self.open_elements.clear_back_to_table_row_context();
        let _ = self.open_elements.pop();
        self.switch_to(InsertionMode::InTableBody);
        true
    }

    /// [§ 13.2.6.4.15 The "in cell" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intd)
    pub(super) fn handle_in_cell_mode(&mut self, token: &Token) {
        match token {
            // "An end tag whose tag name is one of: "td", "th""
            Token::EndTag(tag) if matches!(tag.tag_id, TagId::Td | TagId::Th) => {
                // "If the stack of open elements does not have an element in
                // table scope that is an HTML element with the same tag name as
                // that of the token, then this is a parse error; ignore the
                // token."
                if !self.open_elements.has_in_table_scope(tag.tag_id) {
                    self.parse_error(ParseErrorCode::EndTagWithoutMatchingOpenElement);
                    return;
                }
                // "Otherwise: Generate implied end tags. Now, if the current
                // node is not an HTML element with the same tag name as the
                // token, then this is a parse error. Pop elements from the stack
                // of open elements until an HTML element with the same tag name
                // as the token has been popped from the stack. Clear the list of
                // active formatting elements up to the last marker. Switch the
                // insertion mode to "in row"."
                self.open_elements.generate_implied_end_tags();
                if !self.open_elements.current_is(tag.tag_id) {
                    self.parse_error(ParseErrorCode::ClosingOfElementWithOpenChildElements);
                }
                self.open_elements.pop_until_tag_popped(tag.tag_id);
                self.active_formatting_elements.clear_to_last_marker();
                self.switch_to(InsertionMode::InRow);
            }

            // "A start tag whose tag name is one of: "caption", "col",
            // "colgroup", "tbody", "td", "tfoot", "th", "thead", "tr""
            Token::StartTag(tag) if TABLE_STRUCTURE_START_TAGS.contains(&tag.tag_id) => {
                // "Assert: The stack of open elements has a td or th element in
                // table scope." Fragment parsing can break the assertion.
                if !self.open_elements.has_table_cell_in_table_scope() {
                    self.parse_error(ParseErrorCode::MisplacedStartTag);
                    return;
                }
                // "Close the cell (see below) and reprocess the token."
                self.close_the_cell();
                self.reprocess_token(token);
            }

            // "An end tag whose tag name is one of: "body", "caption", "col",
            // "colgroup", "html""
            // "Parse error. Ignore the token."
            Token::EndTag(tag)
                if matches!(
                    tag.tag_id,
                    TagId::Body | TagId::Caption | TagId::Col | TagId::Colgroup | TagId::Html
                ) =>
            {
                self.parse_error(ParseErrorCode::EndTagWithoutMatchingOpenElement);
            }

            // "An end tag whose tag name is one of: "table", "tbody", "tfoot",
            // "thead", "tr""
            Token::EndTag(tag)
                if matches!(
                    tag.tag_id,
                    TagId::Table | TagId::Tbody | TagId::Tfoot | TagId::Thead | TagId::Tr
                ) =>
            {
                // "If the stack of open elements does not have an element in
                // table scope that is an HTML element with the same tag name as
                // that of the token, then this is a parse error; ignore the
                // token."
                if !self.open_elements.has_in_table_scope(tag.tag_id) {
                    self.parse_error(ParseErrorCode::EndTagWithoutMatchingOpenElement);
                    return;
                }
                // "Otherwise, close the cell (see below) and reprocess the
                // token."
                self.close_the_cell();
                self.reprocess_token(token);
            }

            // "Anything else"
            _ => self.process_using_rules_for(InsertionMode::InBody, token),
        }
    }

    /// [§ 13.2.6.4.15](https://html.spec.whatwg.org/multipage/parsing.html#close-the-cell)
    ///
    /// "Where the steps above say to close the cell, they mean to run the
    /// following algorithm:"
    fn close_the_cell(&mut self) {
        // STEP 1: "Generate implied end tags."
        self.open_elements.generate_implied_end_tags();
        // STEP 2: "If the current node is not now a td element or a th element,
        //          then this is a parse error."
        if !self.open_elements.current_is(TagId::Td) && !self.open_elements.current_is(TagId::Th)
        {
            self.parse_error(ParseErrorCode::ClosingOfElementWithOpenChildElements);
        }
        // STEP 3: "Pop elements from the stack of open elements until a td
        //          element or a th element has been popped from the stack."
        self.open_elements.pop_until_table_cell_popped();
        // STEP 4: "Clear the list of active formatting elements up to the last
        //          marker."
        self.active_formatting_elements.clear_to_last_marker();
        // STEP 5: "Switch the insertion mode to "in row"."
        self.switch_to(InsertionMode::InRow);
    }
}
