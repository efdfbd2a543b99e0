//! Insertion modes from the start of the document through `</head>`, plus
//! the "text" mode used by raw text elements.

use koala_dom::DocumentMode;

use super::core::{InsertionMode, TreeBuilder};
use super::open_elements::StackEntry;
use super::quirks::{document_mode_for, is_conforming};
use crate::adapter::TreeAdapter;
use crate::error::ParseErrorCode;
use crate::tag::TagId;
use crate::tokenizer::{TagToken, Token, TokenizerState};

impl<A: TreeAdapter> TreeBuilder<A> {
    /// [§ 13.2.6.4.1 The "initial" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-initial-insertion-mode)
    pub(super) fn handle_initial_mode(&mut self, token: &Token) {
        match token {
            // "A character token that is one of U+0009 CHARACTER TABULATION,
            // U+000A LINE FEED (LF), U+000C FORM FEED (FF), U+000D CARRIAGE
            // RETURN (CR), or U+0020 SPACE"
            // "Ignore the token."
            Token::WhitespaceCharacter(_) => {}

            // "A comment token"
            // "Insert a comment as the last child of the Document object."
            Token::Comment(comment) => {
                self.append_comment_to(self.document, comment);
            }

            // "A DOCTYPE token"
            Token::Doctype(doctype) => {
                if !is_conforming(doctype) {
                    self.parse_error(ParseErrorCode::NonConformingDoctype);
                }
                // "Append a DocumentType node to the Document node, with its
                // name set to the name given in the DOCTYPE token, or the empty
                // string if the name was missing; its public ID set to the
                // public identifier given in the DOCTYPE token, or the empty
                // string if the public identifier was missing; and its system
                // ID set to the system identifier given in the DOCTYPE token,
                // or the empty string if the system identifier was missing."
                self.insert_doctype(doctype);
                let mode = document_mode_for(doctype);
                self.set_document_mode(mode);
                // "Then, switch the insertion mode to "before html"."
                self.switch_to(InsertionMode::BeforeHtml);
            }

            // "Anything else"
            // "If the document is not an iframe srcdoc document, then this is a
            // parse error; if the parser cannot change the mode flag is false,
            // set the Document to quirks mode."
            // "In any case, switch the insertion mode to "before html", then
            // reprocess the token."
            _ => {
                self.parse_error(ParseErrorCode::MissingDoctype);
                self.set_document_mode(DocumentMode::Quirks);
                self.switch_to(InsertionMode::BeforeHtml);
                self.reprocess_token(token);
            }
        }
    }

    /// [§ 13.2.6.4.2 The "before html" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-html-insertion-mode)
    pub(super) fn handle_before_html_mode(&mut self, token: &Token) {
        match token {
            // "A DOCTYPE token"
            // "Parse error. Ignore the token."
            Token::Doctype(_) => self.parse_error(ParseErrorCode::MisplacedDoctype),

            // "A comment token"
            // "Insert a comment as the last child of the Document object."
            Token::Comment(comment) => self.append_comment_to(self.document, comment),

            // "A character token that is one of U+0009 ..., or U+0020 SPACE"
            // "Ignore the token."
            Token::WhitespaceCharacter(_) => {}

            // "A start tag whose tag name is "html""
            // "Create an element for the token in the HTML namespace, with the
            // Document as the intended parent. Append it to the Document
            // object. Put this element in the stack of open elements."
            Token::StartTag(tag) if tag.tag_id == TagId::Html => {
                let _ = self.insert_html_element(tag);
                self.switch_to(InsertionMode::BeforeHead);
            }

            // "An end tag whose tag name is one of: "head", "body", "html",
            // "br""
            // "Act as described in the "anything else" entry below."
            Token::EndTag(tag)
                if matches!(
                    tag.tag_id,
                    TagId::Head | TagId::Body | TagId::Html | TagId::Br
                ) =>
            {
                self.implied_html_element(token);
            }

            // "Any other end tag"
            // "Parse error. Ignore the token."
            Token::EndTag(_) => self.parse_error(ParseErrorCode::EndTagWithoutMatchingOpenElement),

            // "Anything else"
            _ => self.implied_html_element(token),
        }
    }

    /// "Create an html element whose node document is the Document object.
    /// Append it to the Document object. Put this element in the stack of open
    /// elements. Switch the insertion mode to "before head", then reprocess the
    /// token."
    fn implied_html_element(&mut self, token: &Token) {
        let _ = self.insert_implied_element(TagId::Html);
        self.switch_to(InsertionMode::BeforeHead);
        self.reprocess_token(token);
    }

    /// [§ 13.2.6.4.3 The "before head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-head-insertion-mode)
    pub(super) fn handle_before_head_mode(&mut self, token: &Token) {
        match token {
            // "A character token that is one of U+0009 ..., or U+0020 SPACE"
            // "Ignore the token."
            Token::WhitespaceCharacter(_) => {}

            // "A comment token"
            Token::Comment(comment) => self.insert_comment(comment),

            // "A DOCTYPE token"
            Token::Doctype(_) => self.parse_error(ParseErrorCode::MisplacedDoctype),

            // "A start tag whose tag name is "html""
            // "Process the token using the rules for the "in body" insertion
            // mode."
            Token::StartTag(tag) if tag.tag_id == TagId::Html => {
                self.process_using_rules_for(InsertionMode::InBody, token);
            }

            // "A start tag whose tag name is "head""
            // "Insert an HTML element for the token. Set the head element
            // pointer to the newly created head element. Switch the insertion
            // mode to "in head"."
            Token::StartTag(tag) if tag.tag_id == TagId::Head => {
                let head = self.insert_html_element(tag);
                self.head_element = Some(head);
                self.switch_to(InsertionMode::InHead);
            }

            // "An end tag whose tag name is one of: "head", "body", "html",
            // "br""
            Token::EndTag(tag)
                if matches!(
                    tag.tag_id,
                    TagId::Head | TagId::Body | TagId::Html | TagId::Br
                ) =>
            {
                self.implied_head_element(token);
            }

            // "Any other end tag"
            Token::EndTag(_) => self.parse_error(ParseErrorCode::EndTagWithoutMatchingOpenElement),

            // "Anything else"
            _ => self.implied_head_element(token),
        }
    }

    /// "Insert an HTML element for a "head" start tag token with no
    /// attributes. Set the head element pointer to the newly created head
    /// element. Switch the insertion mode to "in head". Reprocess the current
    /// token."
    fn implied_head_element(&mut self, token: &Token) {
        let head = self.insert_implied_element(TagId::Head);
        self.head_element = Some(head);
        self.switch_to(InsertionMode::InHead);
        self.reprocess_token(token);
    }

    /// [§ 13.2.6.4.4 The "in head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inhead)
    pub(super) fn handle_in_head_mode(&mut self, token: &Token) {
        match token {
            // "A character token that is one of U+0009 ..., or U+0020 SPACE"
            // "Insert the character."
            Token::WhitespaceCharacter(text) => self.insert_characters(text),

            // "A comment token"
            Token::Comment(comment) => self.insert_comment(comment),

            // "A DOCTYPE token"
            Token::Doctype(_) => self.parse_error(ParseErrorCode::MisplacedDoctype),

            Token::StartTag(tag) => self.handle_in_head_start_tag(tag, token),

            // "An end tag whose tag name is "head""
            // "Pop the current node (which will be the head element) off the
            // stack of open elements. Switch the insertion mode to "after
            // head"."
            Token::EndTag(tag) if tag.tag_id == TagId::Head => {
                let _ = self.open_elements.pop();
                self.switch_to(InsertionMode::AfterHead);
            }

            // "An end tag whose tag name is one of: "body", "html", "br""
            // "Act as described in the "anything else" entry below."
            Token::EndTag(tag)
                if matches!(tag.tag_id, TagId::Body | TagId::Html | TagId::Br) =>
            {
                self.leave_head(token);
            }

            // "An end tag whose tag name is "template""
            Token::EndTag(tag) if tag.tag_id == TagId::Template => {
                self.handle_template_end_tag();
            }

            // "Any other end tag"
            Token::EndTag(_) => self.parse_error(ParseErrorCode::EndTagWithoutMatchingOpenElement),

            // "Anything else"
            _ => self.leave_head(token),
        }
    }

    fn handle_in_head_start_tag(&mut self, tag: &TagToken, token: &Token) {
        match tag.tag_id {
            // "A start tag whose tag name is "html""
            TagId::Html => self.process_using_rules_for(InsertionMode::InBody, token),

            // "A start tag whose tag name is one of: "base", "basefont",
            // "bgsound", "link""
            // "Insert an HTML element for the token. Immediately pop the
            // current node off the stack of open elements. Acknowledge the
            // token's self-closing flag, if it is set."
            TagId::Base | TagId::Basefont | TagId::Bgsound | TagId::Link | TagId::Meta => {
                // "A start tag whose tag name is "meta"" runs the same steps;
                // encoding changes do not apply to string input.
                self.insert_void_element(tag);
            }

            // "A start tag whose tag name is "title""
            // "Follow the generic RCDATA element parsing algorithm."
            TagId::Title => self.parse_text_element(tag, TokenizerState::RCDATA),

            // "A start tag whose tag name is "noscript", if the scripting flag
            // is enabled"
            // "A start tag whose tag name is one of: "noframes", "style""
            // "Follow the generic raw text element parsing algorithm."
            TagId::Noscript if self.scripting_enabled => {
                self.parse_text_element(tag, TokenizerState::RAWTEXT);
            }
            TagId::Noframes | TagId::Style => {
                self.parse_text_element(tag, TokenizerState::RAWTEXT);
            }

            // "A start tag whose tag name is "noscript", if the scripting flag
            // is disabled"
            // "Insert an HTML element for the token. Switch the insertion mode
            // to "in head noscript"."
            TagId::Noscript => {
                let _ = self.insert_html_element(tag);
                self.switch_to(InsertionMode::InHeadNoscript);
            }

            // "A start tag whose tag name is "script""
            TagId::Script => {
                // STEP 1-5: "Let the adjusted insertion location be the
                //            appropriate place for inserting a node. Create an
                //            element for the token in the HTML namespace ...
                //            Insert the newly created element at the adjusted
                //            insertion location. Push the element onto the
                //            stack of open elements so that it is the new
                //            current node."
                let _ = self.insert_html_element(tag);
                // STEP 6: "Switch the tokenizer to the script data state."
                self.switch_tokenizer_to(TokenizerState::ScriptData);
                // STEP 7-8: "Let the original insertion mode be the current
                //            insertion mode. Switch the insertion mode to
                //            "text"."
                self.original_insertion_mode = self.insertion_mode;
                self.switch_to(InsertionMode::Text);
            }

            // "A start tag whose tag name is "template""
            TagId::Template => {
                // "Insert an HTML element for the token."
                let _ = self.insert_html_element(tag);
                // "Insert a marker at the end of the list of active formatting
                // elements."
                self.active_formatting_elements.insert_marker();
                // "Set the frameset-ok flag to "not ok"."
                self.frameset_ok = false;
                // "Switch the insertion mode to "in template"."
                self.switch_to(InsertionMode::InTemplate);
                // "Push "in template" onto the stack of template insertion
                // modes so that it is the new current template insertion mode."
                self.template_insertion_modes
                    .push(InsertionMode::InTemplate);
            }

            // "A start tag whose tag name is "head""
            // "Parse error. Ignore the token."
            TagId::Head => self.parse_error(ParseErrorCode::MisplacedStartTagForHeadElement),

            // "Anything else"
            _ => self.leave_head(token),
        }
    }

    /// "Pop the current node (which will be the head element) off the stack of
    /// open elements. Switch the insertion mode to "after head". Reprocess the
    /// token."
    fn leave_head(&mut self, token: &Token) {
        let _ = self.open_elements.pop();
        self.switch_to(InsertionMode::AfterHead);
        self.reprocess_token(token);
    }

    /// "An end tag whose tag name is "template"" in the "in head" insertion
    /// mode.
    pub(super) fn handle_template_end_tag(&mut self) {
        // "If there is no template element on the stack of open elements, then
        // this is a parse error; ignore the token."
        if self.open_elements.tmpl_count() == 0 {
            self.parse_error(ParseErrorCode::EndTagWithoutMatchingOpenElement);
            return;
        }
        // "Generate all implied end tags thoroughly."
        self.open_elements.generate_implied_end_tags_thoroughly();
        // "If the current node is not a template element, then this is a parse
        // error."
        if !self.open_elements.current_is(TagId::Template) {
            self.parse_error(ParseErrorCode::ClosingOfElementWithOpenChildElements);
        }
        // "Pop elements from the stack of open elements until a template
        // element has been popped from the stack."
        self.open_elements.pop_until_tag_popped(TagId::Template);
        // "Clear the list of active formatting elements up to the last marker."
        self.active_formatting_elements.clear_to_last_marker();
        // "Pop the current template insertion mode off the stack of template
        // insertion modes."
        let _ = self.template_insertion_modes.pop();
        // "Reset the insertion mode appropriately."
        self.reset_insertion_mode_appropriately();
    }

    /// [§ 13.2.6.4.5 The "in head noscript" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inheadnoscript)
    pub(super) fn handle_in_head_noscript_mode(&mut self, token: &Token) {
        match token {
            // "A DOCTYPE token"
            Token::Doctype(_) => self.parse_error(ParseErrorCode::MisplacedDoctype),

            // "A start tag whose tag name is "html""
            Token::StartTag(tag) if tag.tag_id == TagId::Html => {
                self.process_using_rules_for(InsertionMode::InBody, token);
            }

            // "An end tag whose tag name is "noscript""
            // "Pop the current node (which will be a noscript element) from the
            // stack of open elements; the new current node will be a head
            // element. Switch the insertion mode to "in head"."
            Token::EndTag(tag) if tag.tag_id == TagId::Noscript => {
                let _ = self.open_elements.pop();
                self.switch_to(InsertionMode::InHead);
            }

            // "A character token that is one of U+0009 ..., or U+0020 SPACE"
            // "A comment token"
            // "A start tag whose tag name is one of: "basefont", "bgsound",
            // "link", "meta", "noframes", "style""
            // "Process the token using the rules for the "in head" insertion
            // mode."
            Token::WhitespaceCharacter(_) | Token::Comment(_) => {
                self.process_using_rules_for(InsertionMode::InHead, token);
            }
            Token::StartTag(tag)
                if matches!(
                    tag.tag_id,
                    TagId::Basefont
                        | TagId::Bgsound
                        | TagId::Link
                        | TagId::Meta
                        | TagId::Noframes
                        | TagId::Style
                ) =>
            {
                self.process_using_rules_for(InsertionMode::InHead, token);
            }

            // "An end tag whose tag name is "br""
            // "Act as described in the "anything else" entry below."
            Token::EndTag(tag) if tag.tag_id == TagId::Br => self.leave_noscript(token),

            // "A start tag whose tag name is one of: "head", "noscript""
            // "Any other end tag"
            // "Parse error. Ignore the token."
            Token::StartTag(tag) if tag.tag_id == TagId::Noscript => {
                self.parse_error(ParseErrorCode::NestedNoscriptInHead);
            }
            Token::StartTag(tag) if tag.tag_id == TagId::Head => {
                self.parse_error(ParseErrorCode::MisplacedStartTagForHeadElement);
            }
            Token::EndTag(_) => self.parse_error(ParseErrorCode::EndTagWithoutMatchingOpenElement),

            // "Anything else"
            _ => self.leave_noscript(token),
        }
    }

    /// "Parse error. Pop the current node (which will be a noscript element)
    /// from the stack of open elements; the new current node will be a head
    /// element. Switch the insertion mode to "in head". Reprocess the token."
    fn leave_noscript(&mut self, token: &Token) {
        self.parse_error(ParseErrorCode::DisallowedContentInNoscriptInHead);
        let _ = self.open_elements.pop();
        self.switch_to(InsertionMode::InHead);
        self.reprocess_token(token);
    }

    /// [§ 13.2.6.4.6 The "after head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-head-insertion-mode)
    pub(super) fn handle_after_head_mode(&mut self, token: &Token) {
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

                // "A start tag whose tag name is "body""
                // "Insert an HTML element for the token. Set the frameset-ok
                // flag to "not ok". Switch the insertion mode to "in body"."
                TagId::Body => {
                    let _ = self.insert_html_element(tag);
                    self.frameset_ok = false;
                    self.switch_to(InsertionMode::InBody);
                }

                // "A start tag whose tag name is "frameset""
                // "Insert an HTML element for the token. Switch the insertion
                // mode to "in frameset"."
                TagId::Frameset => {
                    let _ = self.insert_html_element(tag);
                    self.switch_to(InsertionMode::InFrameset);
                }

                // "A start tag whose tag name is one of: "base", "basefont",
                // "bgsound", "link", "meta", "noframes", "script", "style",
                // "template", "title""
                TagId::Base
                | TagId::Basefont
                | TagId::Bgsound
                | TagId::Link
                | TagId::Meta
                | TagId::Noframes
                | TagId::Script
                | TagId::Style
                | TagId::Template
                | TagId::Title => {
                    // "Parse error."
                    self.parse_error(ParseErrorCode::AbandonedHeadElementChild);
                    // "Push the node pointed to by the head element pointer
                    // onto the stack of open elements."
                    let Some(head) = self.head_element else {
                        return;
                    };
                    self.push_open_element(StackEntry::html(head, TagId::Head, "head"));
                    // "Process the token using the rules for the "in head"
                    // insertion mode."
                    self.process_using_rules_for(InsertionMode::InHead, token);
                    // "Remove the node pointed to by the head element pointer
                    // from the stack of open elements. (It might not be the
                    // current node at this point.)"
                    self.open_elements.remove(head);
                }

                // "A start tag whose tag name is "head""
                TagId::Head => {
                    self.parse_error(ParseErrorCode::MisplacedStartTagForHeadElement);
                }

                // "Anything else"
                _ => self.implied_body_element(token),
            },

            // "An end tag whose tag name is "template""
            Token::EndTag(tag) if tag.tag_id == TagId::Template => {
                self.handle_template_end_tag();
            }

            // "An end tag whose tag name is one of: "body", "html", "br""
            Token::EndTag(tag)
                if matches!(tag.tag_id, TagId::Body | TagId::Html | TagId::Br) =>
            {
                self.implied_body_element(token);
            }

            // "Any other end tag"
            Token::EndTag(_) => self.parse_error(ParseErrorCode::EndTagWithoutMatchingOpenElement),

            // "Anything else"
            _ => self.implied_body_element(token),
        }
    }

    /// "Insert an HTML element for a "body" start tag token with no attributes.
    /// Switch the insertion mode to "in body". Reprocess the current token."
    fn implied_body_element(&mut self, token: &Token) {
        let _ = self.insert_implied_element(TagId::Body);
        self.switch_to(InsertionMode::InBody);
        self.reprocess_token(token);
    }

    /// [§ 13.2.6.4.8 The "text" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incdata)
    pub(super) fn handle_text_mode(&mut self, token: &Token) {
        match token {
            // "A character token"
            // "Insert the token's character."
            // NULLs reach this mode only from the tokenizer's replacement of
            // U+0000 with U+FFFD in RCDATA and RAWTEXT, so they are text here.
            Token::Character(text)
            | Token::WhitespaceCharacter(text)
            | Token::NullCharacter(text) => {
                self.insert_characters(text);
            }

            // "An end-of-file token"
            Token::EndOfFile { .. } => {
                // "Parse error."
                self.parse_error(ParseErrorCode::EofInElementThatCanContainOnlyText);
                // "Pop the current node off the stack of open elements."
                let _ = self.open_elements.pop();
                // "Switch the insertion mode to the original insertion mode and
                // reprocess the token."
                self.switch_to(self.original_insertion_mode);
                self.reprocess_token(token);
            }

            // "An end tag whose tag name is "script""
            Token::EndTag(tag) if tag.tag_id == TagId::Script => {
                let script = self.open_elements.current_handle();
                // "Pop the current node off the stack of open elements."
                let _ = self.open_elements.pop();
                // "Switch the insertion mode to the original insertion mode."
                self.switch_to(self.original_insertion_mode);
                // Scripts are not executed. With `pause_on_script` the embedder
                // gets control back at the point a script would have run.
                if self.pause_on_script {
                    self.paused_script = script;
                    self.request_pause();
                }
            }

            // "Any other end tag"
            // "Pop the current node off the stack of open elements. Switch the
            // insertion mode to the original insertion mode."
            Token::EndTag(_) => {
                let _ = self.open_elements.pop();
                self.switch_to(self.original_insertion_mode);
            }

            Token::StartTag(_) | Token::Comment(_) | Token::Doctype(_) => {}
        }
    }
}
