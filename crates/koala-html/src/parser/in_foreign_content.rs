//! [§ 13.2.6.5 The rules for parsing tokens in foreign content](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inforeign)

use koala_dom::Namespace;

use super::core::TreeBuilder;
use super::foreign_content::{
    adjust_foreign_attributes, adjust_mathml_attributes, adjust_svg_attributes,
    adjust_svg_tag_name, is_breakout_start_tag,
};
use crate::adapter::TreeAdapter;
use crate::error::ParseErrorCode;
use crate::tag::TagId;
use crate::tokenizer::{TagToken, Token};

impl<A: TreeAdapter> TreeBuilder<A> {
    /// "When the user agent is to apply the rules for parsing tokens in foreign
    /// content, the user agent must handle the token as follows:"
    pub(super) fn process_in_foreign_content(&mut self, token: &Token) {
        match token {
            // "A character token that is U+0000 NULL"
            // "Parse error. Insert a U+FFFD REPLACEMENT CHARACTER character."
            Token::NullCharacter(text) => {
                self.parse_error(ParseErrorCode::UnexpectedNullCharacter);
                let replaced = "\u{FFFD}".repeat(text.chars.chars().count());
                self.insert_text(&replaced, text.location);
            }

            // "A character token that is one of U+0009 ..., or U+0020 SPACE"
            // "Insert the token's character."
            Token::WhitespaceCharacter(text) => self.insert_characters(text),

            // "Any other character token"
            // "Insert the token's character. Set the frameset-ok flag to "not
            // ok"."
            Token::Character(text) => {
                self.insert_characters(text);
                self.frameset_ok = false;
            }

            // "A comment token"
            Token::Comment(comment) => self.insert_comment(comment),

            // "A DOCTYPE token"
            Token::Doctype(_) => self.parse_error(ParseErrorCode::MisplacedDoctype),

            Token::StartTag(tag) if is_breakout_start_tag(tag) => {
                // "Parse error."
                self.parse_error(ParseErrorCode::UnexpectedStartTagInContext);
                // "While the current node is not a MathML text integration
                // point, an HTML integration point, or an element in the HTML
                // namespace, pop elements from the stack of open elements."
                while self.open_elements.current().is_some_and(|entry| {
                    entry.namespace != Namespace::Html
                        && !entry.is_mathml_text_integration_point()
                        && !entry.html_integration_point
                }) {
                    let _ = self.open_elements.pop();
                }
                // "Reprocess the token according to the rules given in the
                // section corresponding to the current insertion mode in HTML
                // content."
                self.process_using_rules_for(self.insertion_mode, token);
            }

            Token::StartTag(tag) => self.foreign_start_tag(tag),

            // "An end tag whose tag name is "script", if the current node is an
            // SVG script element"
            // "Pop the current node off the stack of open elements." Scripts are
            // not executed.
            Token::EndTag(tag)
                if tag.tag_id == TagId::Script
                    && self.open_elements.current().is_some_and(|entry| {
                        entry.namespace == Namespace::Svg && entry.tag_id == TagId::Script
                    }) =>
            {
                let _ = self.open_elements.pop();
            }

            Token::EndTag(tag) => self.foreign_end_tag(tag, token),

            // The dispatcher sends end-of-file to the HTML rules.
            Token::EndOfFile { .. } => self.process_using_rules_for(self.insertion_mode, token),
        }
    }

    /// "Any other start tag"
    fn foreign_start_tag(&mut self, tag: &TagToken) {
        let namespace = self
            .adjusted_current_node()
            .map_or(Namespace::Html, |entry| entry.namespace);
        let mut adjusted = tag.clone();

        match namespace {
            // "If the adjusted current node is an element in the MathML
            // namespace, adjust MathML attributes for the token."
            Namespace::MathMl => adjust_mathml_attributes(&mut adjusted.attrs),
            // "If the adjusted current node is an element in the SVG namespace,
            // and the token's tag name is one of the ones in the first column of
            // the following table, change the tag name to the name given in the
            // corresponding cell in the second column."
            // "If the adjusted current node is an element in the SVG namespace,
            // adjust SVG attributes for the token."
            Namespace::Svg => {
                if let Some(name) = adjust_svg_tag_name(&adjusted.name) {
                    adjusted.name = name.to_string();
                }
                adjust_svg_attributes(&mut adjusted.attrs);
            }
            _ => {}
        }
        // "Adjust foreign attributes for the token."
        adjust_foreign_attributes(&mut adjusted.attrs);

        // "Insert a foreign element for the token, with adjusted current node's
        // namespace and false."
        let _ = self.insert_foreign_element(&adjusted, namespace);

        // "If the token has its self-closing flag set, then run the appropriate
        // steps from the following list:" both branches pop the current node
        // and acknowledge the flag, since scripts are never executed.
        if tag.self_closing {
            let _ = self.open_elements.pop();
            self.acknowledge_self_closing();
        }
    }

    /// "Any other end tag"
    fn foreign_end_tag(&mut self, tag: &TagToken, token: &Token) {
        let entries_len = self.open_elements.len();
        if entries_len == 0 {
            return;
        }

        // STEP 1: "Initialize node to be the current node (the bottommost node
        //          of the stack)."
        let mut index = entries_len - 1;

        // STEP 2: "If node's tag name, converted to ASCII lowercase, is not the
        //          same as the tag name of the token, then this is a parse
        //          error."
        if !self.open_elements.entries()[index]
            .name
            .eq_ignore_ascii_case(&tag.name)
        {
            self.parse_error(ParseErrorCode::EndTagWithoutMatchingOpenElement);
        }

        loop {
            // STEP 3: "Loop: If node is the topmost element in the stack of open
            //          elements, then return. (fragment case)"
            if index == 0 {
                return;
            }

            // STEP 4: "If node's tag name, converted to ASCII lowercase, is the
            //          same as the tag name of the token, pop elements from the
            //          stack of open elements until node has been popped from
            //          the stack, and then return."
            let entry = &self.open_elements.entries()[index];
            if entry.name.eq_ignore_ascii_case(&tag.name) {
                let node = entry.handle;
                self.open_elements.pop_until_element_popped(node);
                return;
            }

            // STEP 5: "Set node to the previous entry in the stack of open
            //          elements."
            index -= 1;

            // STEP 6: "If node is not an element in the HTML namespace, return to
            //          the step labeled loop."
            // STEP 7: "Otherwise, process the token according to the rules given
            //          in the section corresponding to the current insertion mode
            //          in HTML content."
            if self.open_elements.entries()[index].namespace == Namespace::Html {
                self.process_using_rules_for(self.insertion_mode, token);
                return;
            }
        }
    }
}
