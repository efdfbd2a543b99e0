//! [§ 13.2.6.4.7 The "in body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)

use koala_dom::{DocumentMode, Namespace};

use super::core::{InsertionMode, TreeBuilder};
use super::foreign_content::{
    adjust_foreign_attributes, adjust_mathml_attributes, adjust_svg_attributes,
};
use crate::adapter::TreeAdapter;
use crate::error::ParseErrorCode;
use crate::tag::{TagId, is_special};
use crate::tokenizer::{TagToken, Token, TokenizerState};

/// "address, article, aside, blockquote, center, details, dialog, dir, div,
/// dl, fieldset, figcaption, figure, footer, header, hgroup, main, menu, nav,
/// ol, p, search, section, summary, ul"
const BLOCK_START_TAGS: &[TagId] = &[
    TagId::Address,
    TagId::Article,
    TagId::Aside,
    TagId::Blockquote,
    TagId::Center,
    TagId::Details,
    TagId::Dialog,
    TagId::Dir,
    TagId::Div,
    TagId::Dl,
    TagId::Fieldset,
    TagId::Figcaption,
    TagId::Figure,
    TagId::Footer,
    TagId::Header,
    TagId::Hgroup,
    TagId::Main,
    TagId::Menu,
    TagId::Nav,
    TagId::Ol,
    TagId::P,
    TagId::Search,
    TagId::Section,
    TagId::Summary,
    TagId::Ul,
];

/// End tags closed with "generate implied end tags" then "pop until popped":
/// the block start tags minus `p`, plus button, listing and pre.
const BLOCK_END_TAGS: &[TagId] = &[
    TagId::Address,
    TagId::Article,
    TagId::Aside,
    TagId::Blockquote,
    TagId::Button,
    TagId::Center,
    TagId::Details,
    TagId::Dialog,
    TagId::Dir,
    TagId::Div,
    TagId::Dl,
    TagId::Fieldset,
    TagId::Figcaption,
    TagId::Figure,
    TagId::Footer,
    TagId::Header,
    TagId::Hgroup,
    TagId::Listing,
    TagId::Main,
    TagId::Menu,
    TagId::Nav,
    TagId::Ol,
    TagId::Pre,
    TagId::Search,
    TagId::Section,
    TagId::Summary,
    TagId::Ul,
];

/// Elements that may legitimately still be open when the body ends.
const CLOSABLE_AT_END_OF_BODY: &[TagId] = &[
    TagId::Dd,
    TagId::Dt,
    TagId::Li,
    TagId::Optgroup,
    TagId::Option,
    TagId::P,
    TagId::Rb,
    TagId::Rp,
    TagId::Rt,
    TagId::Rtc,
    TagId::Tbody,
    TagId::Td,
    TagId::Tfoot,
    TagId::Th,
    TagId::Thead,
    TagId::Tr,
    TagId::Body,
    TagId::Html,
];

impl<A: TreeAdapter> TreeBuilder<A> {
    /// [§ 13.2.6.4.7 The "in body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
    pub(super) fn handle_in_body_mode(&mut self, token: &Token) {
        match token {
            // "A character token that is U+0000 NULL"
            // "Parse error. Ignore the token."
            Token::NullCharacter(_) => self.parse_error(ParseErrorCode::UnexpectedNullCharacter),

            // "A character token that is one of U+0009 ..., or U+0020 SPACE"
            // "Reconstruct the active formatting elements, if any. Insert the
            // token's character."
            Token::WhitespaceCharacter(text) => {
                self.reconstruct_active_formatting_elements();
                self.insert_characters(text);
            }

            // "Any other character token"
            // "Reconstruct the active formatting elements, if any. Insert the
            // token's character. Set the frameset-ok flag to "not ok"."
            Token::Character(text) => {
                self.reconstruct_active_formatting_elements();
                self.insert_characters(text);
                self.frameset_ok = false;
            }

            // "A comment token"
            Token::Comment(comment) => self.insert_comment(comment),

            // "A DOCTYPE token"
            Token::Doctype(_) => self.parse_error(ParseErrorCode::MisplacedDoctype),

            Token::StartTag(tag) => self.in_body_start_tag(tag, token),
            Token::EndTag(tag) => self.in_body_end_tag(tag, token),

            // "An end-of-file token"
            Token::EndOfFile { .. } => {
                // "If the stack of template insertion modes is not empty, then
                // process the token using the rules for the "in template"
                // insertion mode."
                if !self.template_insertion_modes.is_empty() {
                    self.process_using_rules_for(InsertionMode::InTemplate, token);
                    return;
                }
                // "Otherwise, follow these steps: If there is a node in the
                // stack of open elements that is not either a dd element, a dt
                // element, ... the body element, or the html element, then this
                // is a parse error."
                if self.has_unclosable_open_elements() {
                    self.parse_error(ParseErrorCode::OpenElementsLeftAfterEof);
                }
                // "Stop parsing."
                self.stop_parsing();
            }
        }
    }

    fn has_unclosable_open_elements(&self) -> bool {
        self.open_elements
            .entries()
            .iter()
            .any(|entry| !entry.is_one_of(CLOSABLE_AT_END_OF_BODY))
    }

    #[allow(clippy::too_many_lines)]
    fn in_body_start_tag(&mut self, tag: &TagToken, token: &Token) {
        match tag.tag_id {
            // "A start tag whose tag name is "html""
            TagId::Html => {
                // "Parse error."
                self.parse_error(ParseErrorCode::MisplacedStartTag);
                // "If there is a template element on the stack of open
                // elements, then ignore the token."
                // "Otherwise, for each attribute on the token, check to see if
                // the attribute is already present on the top element of the
                // stack of open elements. If it is not, add the attribute and
                // its corresponding value to that element."
                if self.open_elements.tmpl_count() == 0
                    && let Some(html) = self.open_elements.get(0).map(|entry| entry.handle)
                {
                    self.adapter.adopt_attributes(html, &tag.attrs);
                }
            }

            // "A start tag whose tag name is one of: "base", "basefont",
            // "bgsound", "link", "meta", "noframes", "script", "style",
            // "template", "title""
            // "Process the token using the rules for the "in head" insertion
            // mode."
            TagId::Base
            | TagId::Basefont
            | TagId::Bgsound
            | TagId::Link
            | TagId::Meta
            | TagId::Noframes
            | TagId::Script
            | TagId::Style
            | TagId::Template
            | TagId::Title => self.process_using_rules_for(InsertionMode::InHead, token),

            // "A start tag whose tag name is "body""
            TagId::Body => {
                // "Parse error."
                self.parse_error(ParseErrorCode::MisplacedStartTag);
                // "If the stack of open elements has only one node on it, if
                // the second element on the stack of open elements is not a
                // body element, or if there is a template element on the stack
                // of open elements, then ignore the token. (fragment case or
                // there is a template element on the stack)"
                let body = self
                    .open_elements
                    .get(1)
                    .filter(|entry| entry.is(TagId::Body))
                    .map(|entry| entry.handle);
                if let Some(body) = body
                    && self.open_elements.tmpl_count() == 0
                {
                    // "Otherwise, set the frameset-ok flag to "not ok"; then,
                    // for each attribute on the token, check to see if the
                    // attribute is already present on the body element (the
                    // second element) on the stack of open elements, and if it
                    // is not, add the attribute and its corresponding value to
                    // that element."
                    self.frameset_ok = false;
                    self.adapter.adopt_attributes(body, &tag.attrs);
                }
            }

            // "A start tag whose tag name is "frameset""
            TagId::Frameset => {
                // "Parse error."
                self.parse_error(ParseErrorCode::MisplacedStartTag);
                // "If the stack of open elements has only one node on it, or if
                // the second element on the stack of open elements is not a
                // body element, then ignore the token. (fragment case or there
                // is a template element on the stack)"
                // "If the frameset-ok flag is set to "not ok", ignore the
                // token."
                let Some(body) = self
                    .open_elements
                    .get(1)
                    .filter(|entry| entry.is(TagId::Body))
                    .map(|entry| entry.handle)
                else {
                    return;
                };
                if !self.frameset_ok {
                    return;
                }
                // "Otherwise, run the following steps:"
                // STEP 1: "Remove the second element on the stack of open
                //          elements from its parent node, if it has one."
                self.adapter.detach_node(body);
                // STEP 2: "Pop all the nodes from the bottom of the stack of
                //          open elements, from the current node up to, but not
                //          including, the root html element."
                self.open_elements.pop_all_up_to_html_element();
                // STEP 3: "Insert an HTML element for the token."
                let _ = self.insert_html_element(tag);
                // STEP 4: "Switch the insertion mode to "in frameset"."
                self.switch_to(InsertionMode::InFrameset);
            }

            // "A start tag whose tag name is one of: "address", "article", ...
            // "ul""
            // "If the stack of open elements has a p element in button scope,
            // then close a p element. Insert an HTML element for the token."
            id if BLOCK_START_TAGS.contains(&id) => {
                self.close_p_element_in_button_scope();
                let _ = self.insert_html_element(tag);
                self.close_if_self_closing(tag);
            }

            // "A start tag whose tag name is one of: "h1", "h2", "h3", "h4",
            // "h5", "h6""
            id if id.is_numbered_header() => {
                // "If the stack of open elements has a p element in button
                // scope, then close a p element."
                self.close_p_element_in_button_scope();
                // "If the current node is an HTML element whose tag name is one
                // of "h1", "h2", "h3", "h4", "h5", or "h6", then this is a parse
                // error; pop the current node off the stack of open elements."
                if self
                    .open_elements
                    .current_tag_id()
                    .is_some_and(TagId::is_numbered_header)
                {
                    self.parse_error(ParseErrorCode::ClosingOfElementWithOpenChildElements);
                    let _ = self.open_elements.pop();
                }
                // "Insert an HTML element for the token."
                let _ = self.insert_html_element(tag);
                self.close_if_self_closing(tag);
            }

            // "A start tag whose tag name is one of: "pre", "listing""
            TagId::Pre | TagId::Listing => {
                // "If the stack of open elements has a p element in button
                // scope, then close a p element."
                self.close_p_element_in_button_scope();
                // "Insert an HTML element for the token."
                let _ = self.insert_html_element(tag);
                // "If the next token is a U+000A LINE FEED (LF) character
                // token, then ignore that token and move on to the next one."
                self.skip_next_newline = true;
                // "Set the frameset-ok flag to "not ok"."
                self.frameset_ok = false;
            }

            // "A start tag whose tag name is "form""
            TagId::Form => {
                // "If the form element pointer is not null, and there is no
                // template element on the stack of open elements, then this is
                // a parse error; ignore the token."
                let in_template = self.open_elements.tmpl_count() > 0;
                if self.form_element.is_some() && !in_template {
                    self.parse_error(ParseErrorCode::MisplacedStartTag);
                    return;
                }
                // "Otherwise: If the stack of open elements has a p element in
                // button scope, then close a p element. Insert an HTML element
                // for the token, and, if there is no template element on the
                // stack of open elements, set the form element pointer to point
                // to the element created."
                self.close_p_element_in_button_scope();
                let form = self.insert_html_element(tag);
                if !in_template {
                    self.form_element = Some(form);
                }
            }

            // "A start tag whose tag name is "li""
            TagId::Li => self.start_list_item(tag, &[TagId::Li]),

            // "A start tag whose tag name is one of: "dd", "dt""
            TagId::Dd | TagId::Dt => self.start_list_item(tag, &[TagId::Dd, TagId::Dt]),

            // "A start tag whose tag name is "plaintext""
            TagId::Plaintext => {
                // "If the stack of open elements has a p element in button
                // scope, then close a p element. Insert an HTML element for the
                // token. Switch the tokenizer to the PLAINTEXT state."
                self.close_p_element_in_button_scope();
                let _ = self.insert_html_element(tag);
                self.switch_tokenizer_to(TokenizerState::PLAINTEXT);
            }

            // "A start tag whose tag name is "button""
            TagId::Button => {
                // "If the stack of open elements has a button element in scope,
                // then run these substeps: Parse error. Generate implied end
                // tags. Pop elements from the stack of open elements until a
                // button element has been popped from the stack."
                if self.open_elements.has_in_scope(TagId::Button) {
                    self.parse_error(ParseErrorCode::MisplacedStartTag);
                    self.open_elements.generate_implied_end_tags();
                    self.open_elements.pop_until_tag_popped(TagId::Button);
                }
                // "Reconstruct the active formatting elements, if any. Insert an
                // HTML element for the token. Set the frameset-ok flag to "not
                // ok"."
                self.reconstruct_active_formatting_elements();
                let _ = self.insert_html_element(tag);
                self.frameset_ok = false;
            }

            // "A start tag whose tag name is "a""
            TagId::A => {
                // "If the list of active formatting elements contains an a
                // element between the end of the list and the last marker on
                // the list (or the start of the list if there is no marker on
                // the list), then this is a parse error; run the adoption agency
                // algorithm for the token, then remove that element from the
                // list of active formatting elements and the stack of open
                // elements if the adoption agency algorithm didn't already
                // remove it (it might not have if the element is not in table
                // scope)."
                if let Some((existing, _)) = self
                    .active_formatting_elements
                    .element_entry_in_scope_with_tag_name(TagId::A, "a")
                {
                    self.parse_error(ParseErrorCode::MisnestedFormattingElement);
                    self.run_adoption_agency(tag);
                    self.active_formatting_elements.remove_entry(existing);
                    self.open_elements.remove(existing);
                }
                // "Reconstruct the active formatting elements, if any. Insert an
                // HTML element for the token. Push onto the list of active
                // formatting elements that element."
                self.insert_formatting_element(tag);
            }

            // "A start tag whose tag name is one of: "b", "big", "code", "em",
            // "font", "i", "s", "small", "strike", "strong", "tt", "u""
            TagId::B
            | TagId::Big
            | TagId::Code
            | TagId::Em
            | TagId::Font
            | TagId::I
            | TagId::S
            | TagId::Small
            | TagId::Strike
            | TagId::Strong
            | TagId::Tt
            | TagId::U => self.insert_formatting_element(tag),

            // "A start tag whose tag name is "nobr""
            TagId::Nobr => {
                // "Reconstruct the active formatting elements, if any."
                self.reconstruct_active_formatting_elements();
                // "If the stack of open elements has a nobr element in scope,
                // then this is a parse error; run the adoption agency algorithm
                // for the token, then once again reconstruct the active
                // formatting elements, if any."
                if self.open_elements.has_in_scope(TagId::Nobr) {
                    self.parse_error(ParseErrorCode::MisnestedFormattingElement);
                    self.run_adoption_agency(tag);
                }
                self.insert_formatting_element(tag);
            }

            // "A start tag whose tag name is one of: "applet", "marquee",
            // "object""
            TagId::Applet | TagId::Marquee | TagId::Object => {
                // "Reconstruct the active formatting elements, if any. Insert an
                // HTML element for the token. Insert a marker at the end of the
                // list of active formatting elements. Set the frameset-ok flag
                // to "not ok"."
                self.reconstruct_active_formatting_elements();
                let _ = self.insert_html_element(tag);
                self.active_formatting_elements.insert_marker();
                self.frameset_ok = false;
            }

            // "A start tag whose tag name is "table""
            TagId::Table => {
                // "If the Document is not set to quirks mode, and the stack of
                // open elements has a p element in button scope, then close a p
                // element."
                if self.document_mode() != DocumentMode::Quirks {
                    self.close_p_element_in_button_scope();
                }
                // "Insert an HTML element for the token. Set the frameset-ok
                // flag to "not ok". Switch the insertion mode to "in table"."
                let _ = self.insert_html_element(tag);
                self.frameset_ok = false;
                self.switch_to(InsertionMode::InTable);
            }

            // "A start tag whose tag name is one of: "area", "br", "embed",
            // "img", "keygen", "wbr""
            TagId::Area | TagId::Br | TagId::Embed | TagId::Img | TagId::Keygen | TagId::Wbr => {
                // "Reconstruct the active formatting elements, if any. Insert an
                // HTML element for the token. Immediately pop the current node
                // off the stack of open elements. Acknowledge the token's
                // self-closing flag, if it is set. Set the frameset-ok flag to
                // "not ok"."
                self.reconstruct_active_formatting_elements();
                self.insert_void_element(tag);
                self.frameset_ok = false;
            }

            // "A start tag whose tag name is "input""
            TagId::Input => {
                self.reconstruct_active_formatting_elements();
                self.insert_void_element(tag);
                // "If the token does not have an attribute with the name "type",
                // or if it does, but that attribute's value is not an ASCII
                // case-insensitive match for the string "hidden", then: set the
                // frameset-ok flag to "not ok"."
                if !tag
                    .get_attribute("type")
                    .is_some_and(|value| value.eq_ignore_ascii_case("hidden"))
                {
                    self.frameset_ok = false;
                }
            }

            // "A start tag whose tag name is one of: "param", "source",
            // "track""
            // "Insert an HTML element for the token. Immediately pop the
            // current node off the stack of open elements. Acknowledge the
            // token's self-closing flag, if it is set."
            TagId::Param | TagId::Source | TagId::Track => self.insert_void_element(tag),

            // "A start tag whose tag name is "hr""
            TagId::Hr => {
                self.close_p_element_in_button_scope();
                self.insert_void_element(tag);
                self.frameset_ok = false;
            }

            // "A start tag whose tag name is "image""
            // "Parse error. Change the token's tag name to "img" and reprocess
            // it. (Don't ask.)"
            TagId::Image => {
                self.parse_error(ParseErrorCode::MisplacedStartTag);
                let mut img = tag.clone();
                img.name = TagId::Img.name().to_string();
                img.tag_id = TagId::Img;
                self.reprocess_token(&Token::StartTag(img));
            }

            // "A start tag whose tag name is "textarea""
            TagId::Textarea => {
                // STEP 1: "Insert an HTML element for the token."
                let _ = self.insert_html_element(tag);
                // STEP 2: "If the next token is a U+000A LINE FEED (LF)
                //          character token, then ignore that token and move on
                //          to the next one."
                self.skip_next_newline = true;
                // STEP 3: "Switch the tokenizer to the RCDATA state."
                self.switch_tokenizer_to(TokenizerState::RCDATA);
                // STEP 4: "Let the original insertion mode be the current
                //          insertion mode."
                self.original_insertion_mode = self.insertion_mode;
                // STEP 5: "Set the frameset-ok flag to "not ok"."
                self.frameset_ok = false;
                // STEP 6: "Switch the insertion mode to "text"."
                self.switch_to(InsertionMode::Text);
            }

            // "A start tag whose tag name is "xmp""
            TagId::Xmp => {
                // "If the stack of open elements has a p element in button
                // scope, then close a p element. Reconstruct the active
                // formatting elements, if any. Set the frameset-ok flag to "not
                // ok". Follow the generic raw text element parsing algorithm."
                self.close_p_element_in_button_scope();
                self.reconstruct_active_formatting_elements();
                self.frameset_ok = false;
                self.parse_text_element(tag, TokenizerState::RAWTEXT);
            }

            // "A start tag whose tag name is "iframe""
            TagId::Iframe => {
                self.frameset_ok = false;
                self.parse_text_element(tag, TokenizerState::RAWTEXT);
            }

            // "A start tag whose tag name is "noembed""
            // "A start tag whose tag name is "noscript", if the scripting flag
            // is enabled"
            // "Follow the generic raw text element parsing algorithm."
            TagId::Noembed => self.parse_text_element(tag, TokenizerState::RAWTEXT),
            TagId::Noscript if self.scripting_enabled => {
                self.parse_text_element(tag, TokenizerState::RAWTEXT);
            }

            // "A start tag whose tag name is "select""
            TagId::Select => {
                // "Reconstruct the active formatting elements, if any. Insert an
                // HTML element for the token. Set the frameset-ok flag to "not
                // ok"."
                self.reconstruct_active_formatting_elements();
                let _ = self.insert_html_element(tag);
                self.frameset_ok = false;
                // "If the insertion mode is one of "in table", "in caption", "in
                // table body", "in row", or "in cell", then switch the insertion
                // mode to "in select in table". Otherwise, switch the insertion
                // mode to "in select"."
                let mode = if matches!(
                    self.insertion_mode,
                    InsertionMode::InTable
                        | InsertionMode::InCaption
                        | InsertionMode::InTableBody
                        | InsertionMode::InRow
                        | InsertionMode::InCell
                ) {
                    InsertionMode::InSelectInTable
                } else {
                    InsertionMode::InSelect
                };
                self.switch_to(mode);
            }

            // "A start tag whose tag name is one of: "optgroup", "option""
            TagId::Optgroup | TagId::Option => {
                // "If the current node is an option element, then pop the
                // current node off the stack of open elements."
                if self.open_elements.current_is(TagId::Option) {
                    let _ = self.open_elements.pop();
                }
                // "Reconstruct the active formatting elements, if any. Insert an
                // HTML element for the token."
                self.reconstruct_active_formatting_elements();
                let _ = self.insert_html_element(tag);
            }

            // "A start tag whose tag name is one of: "rb", "rtc""
            TagId::Rb | TagId::Rtc => {
                // "If the stack of open elements has a ruby element in scope,
                // then generate implied end tags. If the current node is not now
                // a ruby element, this is a parse error."
                if self.open_elements.has_in_scope(TagId::Ruby) {
                    self.open_elements.generate_implied_end_tags();
                    if !self.open_elements.current_is(TagId::Ruby) {
                        self.parse_error(ParseErrorCode::MisplacedStartTag);
                    }
                }
                // "Insert an HTML element for the token."
                let _ = self.insert_html_element(tag);
            }

            // "A start tag whose tag name is one of: "rp", "rt""
            TagId::Rp | TagId::Rt => {
                // "If the stack of open elements has a ruby element in scope,
                // then generate implied end tags, except for rtc elements. If
                // the current node is not now a rtc element or a ruby element,
                // this is a parse error."
                if self.open_elements.has_in_scope(TagId::Ruby) {
                    self.open_elements
                        .generate_implied_end_tags_with_exclusion(Some(TagId::Rtc));
                    if !self.open_elements.current_is(TagId::Rtc)
                        && !self.open_elements.current_is(TagId::Ruby)
                    {
                        self.parse_error(ParseErrorCode::MisplacedStartTag);
                    }
                }
                let _ = self.insert_html_element(tag);
            }

            // "A start tag whose tag name is "math""
            TagId::Math => self.insert_foreign_root(tag, Namespace::MathMl),

            // "A start tag whose tag name is "svg""
            TagId::Svg => self.insert_foreign_root(tag, Namespace::Svg),

            // "A start tag whose tag name is one of: "caption", "col",
            // "colgroup", "frame", "head", "tbody", "td", "tfoot", "th",
            // "thead", "tr""
            // "Parse error. Ignore the token."
            TagId::Caption
            | TagId::Col
            | TagId::Colgroup
            | TagId::Frame
            | TagId::Head
            | TagId::Tbody
            | TagId::Td
            | TagId::Tfoot
            | TagId::Th
            | TagId::Thead
            | TagId::Tr => self.parse_error(ParseErrorCode::MisplacedStartTag),

            // "Any other start tag"
            // "Reconstruct the active formatting elements, if any. Insert an
            // HTML element for the token."
            _ => {
                self.reconstruct_active_formatting_elements();
                let _ = self.insert_html_element(tag);
                self.close_if_self_closing(tag);
            }
        }
    }

    /// The shared steps for `li`, `dd` and `dt` start tags. `closes` lists the
    /// item elements the new item implicitly ends.
    fn start_list_item(&mut self, tag: &TagToken, closes: &[TagId]) {
        // STEP 1: "Set the frameset-ok flag to "not ok"."
        self.frameset_ok = false;

        // STEP 2-5: "Initialize node to be the current node (the bottommost
        //            node of the stack). Loop: ..."
        let mut close = None;
        for entry in self.open_elements.entries().iter().rev() {
            if entry.is_one_of(closes) {
                close = Some(entry.tag_id);
                break;
            }
            // "If node is in the special category, but is not an address, div,
            // or p element, then jump to the step labeled done below."
            if is_special(entry.tag_id, entry.namespace)
                && !entry.is_one_of(&[TagId::Address, TagId::Div, TagId::P])
            {
                break;
            }
        }
        if let Some(item) = close {
            // "Generate implied end tags, except for li elements. If the current
            // node is not an li element, then this is a parse error. Pop
            // elements from the stack of open elements until an li element has
            // been popped from the stack."
            self.open_elements
                .generate_implied_end_tags_with_exclusion(Some(item));
            if !self.open_elements.current_is(item) {
                self.parse_error(ParseErrorCode::ClosingOfElementWithOpenChildElements);
            }
            self.open_elements.pop_until_tag_popped(item);
        }

        // STEP 6: "Done: If the stack of open elements has a p element in
        //          button scope, then close a p element."
        self.close_p_element_in_button_scope();
        // STEP 7: "Finally, insert an HTML element for the token."
        let _ = self.insert_html_element(tag);
    }

    /// "Reconstruct the active formatting elements, if any. Insert an HTML
    /// element for the token. Push onto the list of active formatting elements
    /// that element."
    fn insert_formatting_element(&mut self, tag: &TagToken) {
        self.reconstruct_active_formatting_elements();
        let element = self.insert_html_element(tag);
        self.active_formatting_elements
            .push_element(element, tag.clone());
    }

    /// `<math>` and `<svg>` in HTML content.
    fn insert_foreign_root(&mut self, tag: &TagToken, namespace: Namespace) {
        // "Reconstruct the active formatting elements, if any."
        self.reconstruct_active_formatting_elements();
        // "Adjust MathML attributes for the token. (This fixes the case of
        // MathML attributes that are not all lowercase.)" / "Adjust SVG
        // attributes for the token. (This fixes the case of SVG attributes that
        // are not all lowercase.)"
        // "Adjust foreign attributes for the token. (This fixes the use of
        // namespaced attributes, in particular XLink.)"
        let mut adjusted = tag.clone();
        if namespace == Namespace::MathMl {
            adjust_mathml_attributes(&mut adjusted.attrs);
        } else {
            adjust_svg_attributes(&mut adjusted.attrs);
        }
        adjust_foreign_attributes(&mut adjusted.attrs);
        // "Insert a foreign element for the token, with MathML namespace / SVG
        // namespace."
        let _ = self.insert_foreign_element(&adjusted, namespace);
        // "If the token has its self-closing flag set, pop the current node off
        // the stack of open elements and acknowledge the token's self-closing
        // flag."
        if tag.self_closing {
            let _ = self.open_elements.pop();
            self.acknowledge_self_closing();
        }
    }

    #[allow(clippy::too_many_lines)]
    fn in_body_end_tag(&mut self, tag: &TagToken, token: &Token) {
        match tag.tag_id {
            // "An end tag whose tag name is "template""
            // "Process the token using the rules for the "in head" insertion
            // mode."
            TagId::Template => self.process_using_rules_for(InsertionMode::InHead, token),

            // "An end tag whose tag name is "body""
            TagId::Body => {
                if self.close_body() {
                    // "Switch the insertion mode to "after body"."
                    self.switch_to(InsertionMode::AfterBody);
                }
            }

            // "An end tag whose tag name is "html""
            TagId::Html => {
                if self.close_body() {
                    // "Switch the insertion mode to "after body". Reprocess the
                    // token."
                    self.switch_to(InsertionMode::AfterBody);
                    self.reprocess_token(token);
                }
            }

            // "An end tag whose tag name is one of: "address", "article", ...
            // "ul""
            id if BLOCK_END_TAGS.contains(&id) => {
                // "If the stack of open elements does not have an element in
                // scope that is an HTML element with the same tag name as that
                // of the token, then this is a parse error; ignore the token."
                if !self.open_elements.has_in_scope(id) {
                    self.parse_error(ParseErrorCode::EndTagWithoutMatchingOpenElement);
                    return;
                }
                // "Otherwise, run these steps: Generate implied end tags. If the
                // current node is not an HTML element with the same tag name as
                // that of the token, then this is a parse error. Pop elements
                // from the stack of open elements until an HTML element with the
                // same tag name as the token has been popped from the stack."
                self.open_elements.generate_implied_end_tags();
                if !self.open_elements.current_is(id) {
                    self.parse_error(ParseErrorCode::ClosingOfElementWithOpenChildElements);
                }
                self.open_elements.pop_until_tag_popped(id);
            }

            // "An end tag whose tag name is "form""
            TagId::Form => self.close_form(),

            // "An end tag whose tag name is "p""
            TagId::P => {
                // "If the stack of open elements does not have a p element in
                // button scope, then this is a parse error; insert an HTML
                // element for a "p" start tag token with no attributes."
                if !self.open_elements.has_in_button_scope(TagId::P) {
                    self.parse_error(ParseErrorCode::EndTagWithoutMatchingOpenElement);
                    let _ = self.insert_implied_element(TagId::P);
                }
                // "Close a p element."
                self.close_p_element();
            }

            // "An end tag whose tag name is "li""
            TagId::Li => {
                // "If the stack of open elements does not have an li element in
                // list item scope, then this is a parse error; ignore the
                // token."
                if !self.open_elements.has_in_list_item_scope(TagId::Li) {
                    self.parse_error(ParseErrorCode::EndTagWithoutMatchingOpenElement);
                    return;
                }
                self.close_implied_item(TagId::Li);
            }

            // "An end tag whose tag name is one of: "dd", "dt""
            TagId::Dd | TagId::Dt => {
                if !self.open_elements.has_in_scope(tag.tag_id) {
                    self.parse_error(ParseErrorCode::EndTagWithoutMatchingOpenElement);
                    return;
                }
                self.close_implied_item(tag.tag_id);
            }

            // "An end tag whose tag name is one of: "h1", "h2", "h3", "h4",
            // "h5", "h6""
            id if id.is_numbered_header() => {
                // "If the stack of open elements does not have an element in
                // scope that is an HTML element and whose tag name is one of
                // "h1", "h2", "h3", "h4", "h5", or "h6", then this is a parse
                // error; ignore the token."
                if !self.open_elements.has_numbered_header_in_scope() {
                    self.parse_error(ParseErrorCode::EndTagWithoutMatchingOpenElement);
                    return;
                }
                // "Generate implied end tags. If the current node is not an HTML
                // element with the same tag name as that of the token, then this
                // is a parse error. Pop elements from the stack of open elements
                // until an HTML element whose tag name is one of "h1", "h2",
                // "h3", "h4", "h5", or "h6" has been popped from the stack."
                self.open_elements.generate_implied_end_tags();
                if !self.open_elements.current_is(id) {
                    self.parse_error(ParseErrorCode::ClosingOfElementWithOpenChildElements);
                }
                self.open_elements.pop_until_numbered_header_popped();
            }

            // "An end tag whose tag name is one of: "a", "b", "big", "code",
            // "em", "font", "i", "nobr", "s", "small", "strike", "strong", "tt",
            // "u""
            // "Run the adoption agency algorithm for the token."
            id if id.is_formatting() => self.run_adoption_agency(tag),

            // "An end tag token whose tag name is one of: "applet", "marquee",
            // "object""
            TagId::Applet | TagId::Marquee | TagId::Object => {
                // "If the stack of open elements does not have an element in
                // scope that is an HTML element with the same tag name as that
                // of the token, then this is a parse error; ignore the token."
                if !self.open_elements.has_in_scope(tag.tag_id) {
                    self.parse_error(ParseErrorCode::EndTagWithoutMatchingOpenElement);
                    return;
                }
                // "Otherwise, run these steps: Generate implied end tags. If the
                // current node is not an HTML element with the same tag name as
                // that of the token, then this is a parse error. Pop elements
                // from the stack of open elements until an HTML element with the
                // same tag name as the token has been popped from the stack.
                // Clear the list of active formatting elements up to the last
                // marker."
                self.open_elements.generate_implied_end_tags();
                if !self.open_elements.current_is(tag.tag_id) {
                    self.parse_error(ParseErrorCode::ClosingOfElementWithOpenChildElements);
                }
                self.open_elements.pop_until_tag_popped(tag.tag_id);
                self.active_formatting_elements.clear_to_last_marker();
            }

            // "An end tag whose tag name is "br""
            // "Parse error. Drop the attributes from the token, and act as
            // described in the next entry; i.e. act as if this was a "br" start
            // tag token with no attributes, rather than the end tag token that
            // it actually is."
            TagId::Br => {
                self.parse_error(ParseErrorCode::EndTagWithoutMatchingOpenElement);
                let mut br = TagToken::for_tag(TagId::Br);
                br.location.clone_from(&tag.location);
                self.in_body_start_tag(&br, &Token::StartTag(br.clone()));
            }

            // "Any other end tag"
            _ => self.any_other_end_tag(tag),
        }
    }

    /// Shared checks of `</body>` and `</html>`. Returns whether the body
    /// may be closed.
    fn close_body(&mut self) -> bool {
        // "If the stack of open elements does not have a body element in
        // scope, this is a parse error; ignore the token."
        if !self.open_elements.has_in_scope(TagId::Body) {
            self.parse_error(ParseErrorCode::EndTagWithoutMatchingOpenElement);
            return false;
        }
        // "Otherwise, if there is a node in the stack of open elements that is
        // not either a dd element, a dt element, ... the body element, or the
        // html element, then this is a parse error."
        if self.has_unclosable_open_elements() {
            self.parse_error(ParseErrorCode::ClosingOfElementWithOpenChildElements);
        }
        // `</body>` closes nothing yet; record it for when body is popped.
        if let Some(body) = self.open_elements.get(1).map(|entry| entry.handle)
            && self.token_end_tag.as_deref().is_some_and(|name| name.eq_ignore_ascii_case("body"))
        {
            self.record_end_tag(body);
        }
        true
    }

    /// `</form>`.
    fn close_form(&mut self) {
        // "If there is no template element on the stack of open elements, then
        // run these substeps:"
        if self.open_elements.tmpl_count() == 0 {
            // "Let node be the element that the form element pointer is set to,
            // or null if it is not set to an element. Set the form element
            // pointer to null."
            let node = self.form_element.take();
            // "If node is null or if the stack of open elements does not have
            // node in scope, then this is a parse error; return and ignore the
            // token."
            let Some(node) = node.filter(|&node| self.open_elements.has_element_in_scope(node))
            else {
                self.parse_error(ParseErrorCode::EndTagWithoutMatchingOpenElement);
                return;
            };
            // "Generate implied end tags. If the current node is not node, then
            // this is a parse error. Remove node from the stack of open
            // elements."
            self.open_elements.generate_implied_end_tags();
            if self.open_elements.current_handle() != Some(node) {
                self.parse_error(ParseErrorCode::ClosingOfElementWithOpenChildElements);
            }
            self.open_elements.remove(node);
            return;
        }

        // "If there is a template element on the stack of open elements, then
        // run these substeps instead:"
        if !self.open_elements.has_in_scope(TagId::Form) {
            self.parse_error(ParseErrorCode::EndTagWithoutMatchingOpenElement);
            return;
        }
        self.open_elements.generate_implied_end_tags();
        if !self.open_elements.current_is(TagId::Form) {
            self.parse_error(ParseErrorCode::ClosingOfElementWithOpenChildElements);
        }
        self.open_elements.pop_until_tag_popped(TagId::Form);
    }

    /// "Generate implied end tags, except for X elements. If the current node
    /// is not an X element, then this is a parse error. Pop elements from the
    /// stack of open elements until an X element has been popped from the
    /// stack."
    fn close_implied_item(&mut self, item: TagId) {
        self.open_elements
            .generate_implied_end_tags_with_exclusion(Some(item));
        if !self.open_elements.current_is(item) {
            self.parse_error(ParseErrorCode::ClosingOfElementWithOpenChildElements);
        }
        self.open_elements.pop_until_tag_popped(item);
    }

    /// "Any other end tag" in the "in body" insertion mode.
    pub(super) fn any_other_end_tag(&mut self, tag: &TagToken) {
        // STEP 1: "Initialize node to be the current node (the bottommost node
        //          of the stack)."
        let mut target = None;
        for entry in self.open_elements.entries().iter().rev() {
            // STEP 2: "Loop: If node is an HTML element with the same tag name
            //          as the token, then:"
            if entry.has_html_name(tag.tag_id, &tag.name) {
                target = Some(entry.handle);
                break;
            }
            // STEP 3: "Otherwise, if node is in the special category, then this
            //          is a parse error; ignore the token, and return."
            if is_special(entry.tag_id, entry.namespace) {
                break;
            }
            // STEP 4: "Set node to the previous entry in the stack of open
            //          elements."
        }

        let Some(node) = target else {
            self.parse_error(ParseErrorCode::EndTagWithoutMatchingOpenElement);
            return;
        };

        // "Generate implied end tags, except for HTML elements with the same
        // tag name as the token."
        self.open_elements
            .generate_implied_end_tags_with_exclusion(Some(tag.tag_id));
        // "If node is not the current node, then this is a parse error."
        if self.open_elements.current_handle() != Some(node) {
            self.parse_error(ParseErrorCode::ClosingOfElementWithOpenChildElements);
        }
        // "Pop all the nodes from the current node up to node, including node,
        // then stop these steps."
        self.open_elements.pop_until_element_popped(node);
    }
}
