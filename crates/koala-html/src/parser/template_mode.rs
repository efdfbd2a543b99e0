//! [§ 13.2.6.4.18 The "in template" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intemplate)

use super::core::{InsertionMode, TreeBuilder};
use crate::adapter::TreeAdapter;
use crate::error::ParseErrorCode;
use crate::tag::TagId;
use crate::tokenizer::Token;

impl<A: TreeAdapter> TreeBuilder<A> {
    /// [§ 13.2.6.4.18 The "in template" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intemplate)
    pub(super) fn handle_in_template_mode(&mut self, token: &Token) {
        match token {
            // "A character token"
            // "A comment token"
            // "A DOCTYPE token"
            // "Process the token using the rules for the "in body" insertion
            // mode."
            Token::Character(_)
            | Token::WhitespaceCharacter(_)
            | Token::NullCharacter(_)
            | Token::Comment(_)
            | Token::Doctype(_) => self.process_using_rules_for(InsertionMode::InBody, token),

            Token::StartTag(tag) => match tag.tag_id {
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
                | TagId::Title => self.process_using_rules_for(InsertionMode::InHead, token),

                // "A start tag whose tag name is one of: "caption", "colgroup",
                // "tbody", "tfoot", "thead""
                TagId::Caption | TagId::Colgroup | TagId::Tbody | TagId::Tfoot | TagId::Thead => {
                    self.switch_template_mode(InsertionMode::InTable, token);
                }

                // "A start tag whose tag name is "col""
                TagId::Col => self.switch_template_mode(InsertionMode::InColumnGroup, token),

                // "A start tag whose tag name is "tr""
                TagId::Tr => self.switch_template_mode(InsertionMode::InTableBody, token),

                // "A start tag whose tag name is one of: "td", "th""
                TagId::Td | TagId::Th => self.switch_template_mode(InsertionMode::InRow, token),

                // "Any other start tag"
                _ => self.switch_template_mode(InsertionMode::InBody, token),
            },

            // "An end tag whose tag name is "template""
            Token::EndTag(tag) if tag.tag_id == TagId::Template => {
                self.process_using_rules_for(InsertionMode::InHead, token);
            }

            // "Any other end tag"
            // "Parse error. Ignore the token."
            Token::EndTag(_) => self.parse_error(ParseErrorCode::EndTagWithoutMatchingOpenElement),

            // "An end-of-file token"
            Token::EndOfFile { .. } => {
                // "If there is no template element on the stack of open
                // elements, then stop parsing. (fragment case)"
                if self.open_elements.tmpl_count() == 0 {
                    self.stop_parsing();
                    return;
                }
                // "Otherwise, this is a parse error."
                self.parse_error(ParseErrorCode::OpenElementsLeftAfterEof);
                // "Pop elements from the stack of open elements until a template
                // element has been popped from the stack. Clear the list of
                // active formatting elements up to the last marker. Pop the
                // current template insertion mode off the stack of template
                // insertion modes. Reset the insertion mode appropriately.
                // Reprocess the token."
                self.open_elements.pop_until_tag_popped(TagId::Template);
                self.active_formatting_elements.clear_to_last_marker();
                let _ = self.template_insertion_modes.pop();
                self.reset_insertion_mode_appropriately();
                self.reprocess_token(token);
            }
        }
    }

    /// "Pop the current template insertion mode off the stack of template
    /// insertion modes. Push `mode` onto the stack of template insertion modes
    /// so that it is the new current template insertion mode. Switch the
    /// insertion mode to `mode`, and reprocess the token."
    fn switch_template_mode(&mut self, mode: InsertionMode, token: &Token) {
        let _ = self.template_insertion_modes.pop();
        self.template_insertion_modes.push(mode);
        self.switch_to(mode);
        self.reprocess_token(token);
    }
}
