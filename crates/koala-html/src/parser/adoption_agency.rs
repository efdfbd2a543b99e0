//! [§ 13.2.6.4.7 The adoption agency algorithm](https://html.spec.whatwg.org/multipage/parsing.html#adoption-agency-algorithm)
//!
//! Repairs misnested formatting elements such as `<b><i></b></i>` or
//! `<a><p></a>`, cloning formatting elements so every node ends up with a
//! single parent.

use koala_dom::Namespace;

use super::core::TreeBuilder;
use super::open_elements::StackEntry;
use crate::adapter::TreeAdapter;
use crate::error::ParseErrorCode;
use crate::tag::{TagId, is_special};
use crate::tokenizer::TagToken;

/// "Let outer loop counter be 0. ... If outer loop counter is greater than or
/// equal to 8, then return."
const OUTER_LOOP_LIMIT: usize = 8;

/// "If inner loop counter is greater than 3 and node is in the list of active
/// formatting elements, then remove node from the list of active formatting
/// elements."
const INNER_LOOP_LIMIT: usize = 3;

impl<A: TreeAdapter> TreeBuilder<A> {
    /// "Run the adoption agency algorithm for the token."
    pub(super) fn run_adoption_agency(&mut self, tag: &TagToken) {
        // STEP 1: "Let subject be token's tag name."
        let subject = tag.tag_id;

        // STEP 2: "If the current node is an HTML element whose tag name is
        //          subject, and the current node is not in the list of active
        //          formatting elements, then pop the current node off the stack
        //          of open elements and return."
        if let Some(current) = self.open_elements.current()
            && current.has_html_name(subject, &tag.name)
            && !self
                .active_formatting_elements
                .contains_element(current.handle)
        {
            let _ = self.open_elements.pop();
            return;
        }

        // STEP 3-4: "Let outer loop counter be 0. Outer loop: If outer loop
        //            counter is greater than or equal to 8, then return."
        for _ in 0..OUTER_LOOP_LIMIT {
            // STEP 4.3: "Let formatting element be the last element in the list
            //            of active formatting elements that is between the end
            //            of the list and the last marker in the list, if any, or
            //            the start of the list otherwise, and has the tag name
            //            subject. If there is no such element, then return and
            //            instead act as described in the "any other end tag"
            //            entry above."
            let Some((formatting_element, formatting_token)) = self
                .active_formatting_elements
                .element_entry_in_scope_with_tag_name(subject, &tag.name)
                .map(|(handle, token)| (handle, token.clone()))
            else {
                self.any_other_end_tag(tag);
                return;
            };

            // STEP 4.4: "If formatting element is not in the stack of open
            //            elements, then this is a parse error; remove the
            //            element from the list, and return."
            let Some(formatting_index) = self.open_elements.index_of(formatting_element) else {
                self.parse_error(ParseErrorCode::MisnestedFormattingElement);
                self.active_formatting_elements
                    .remove_entry(formatting_element);
                return;
            };

            // STEP 4.5: "If formatting element is in the stack of open
            //            elements, but the element is not in scope, then this is
            //            a parse error; return."
            if !self
                .open_elements
                .has_element_in_scope(formatting_element)
            {
                self.parse_error(ParseErrorCode::EndTagWithoutMatchingOpenElement);
                return;
            }

            // STEP 4.6: "If formatting element is not the current node, this is
            //            a parse error. (But do not return.)"
            if self.open_elements.current_handle() != Some(formatting_element) {
                self.parse_error(ParseErrorCode::MisnestedFormattingElement);
            }

            // STEP 4.7: "Let furthest block be the topmost node in the stack of
            //            open elements that is lower in the stack than
            //            formatting element, and is an element in the special
            //            category. There might not be one."
            let furthest_block = self.open_elements.entries()[formatting_index + 1..]
                .iter()
                .find(|entry| is_special(entry.tag_id, entry.namespace))
                .map(|entry| entry.handle);

            // STEP 4.8: "If there is no furthest block, then the UA must first
            //            pop all the nodes from the bottom of the stack of open
            //            elements, from the current node up to and including
            //            formatting element, then remove formatting element from
            //            the list of active formatting elements, and finally
            //            return."
            let Some(furthest_block) = furthest_block else {
                self.open_elements
                    .pop_until_element_popped(formatting_element);
                self.active_formatting_elements
                    .remove_entry(formatting_element);
                return;
            };

            // STEP 4.9: "Let common ancestor be the element immediately above
            //            formatting element in the stack of open elements."
            let Some(common_ancestor) = self.open_elements.common_ancestor(formatting_element)
            else {
                return;
            };

            // STEP 4.10: "Let a bookmark note the position of formatting element
            //             in the list of active formatting elements relative to
            //             the elements on either side of it in the list."
            // The bookmark is the entry the new element will follow.
            let mut bookmark = formatting_element;

            // STEP 4.11: "Let node and last node be furthest block."
            let mut node_index = self
                .open_elements
                .index_of(furthest_block)
                .unwrap_or(formatting_index);
            let mut last_node = furthest_block;

            // STEP 4.12-13: "Let inner loop counter be 0. Inner loop:"
            let mut inner_loop_counter = 0;
            loop {
                // STEP 4.13.1: "Increment inner loop counter by 1."
                inner_loop_counter += 1;

                // STEP 4.13.2: "Let node be the element immediately above node
                //               in the stack of open elements, or if node is no
                //               longer in the stack of open elements (e.g.
                //               because it got removed by this algorithm), the
                //               element that was immediately above node in the
                //               stack of open elements before node was removed."
                node_index -= 1;
                let node = self.open_elements.entries()[node_index].handle;

                // STEP 4.13.3: "If node is formatting element, then break."
                if node == formatting_element {
                    break;
                }

                // STEP 4.13.4: "If inner loop counter is greater than 3 and node
                //               is in the list of active formatting elements,
                //               then remove node from the list of active
                //               formatting elements."
                if inner_loop_counter > INNER_LOOP_LIMIT {
                    self.active_formatting_elements.remove_entry(node);
                }

                // STEP 4.13.5: "If node is not in the list of active formatting
                //               elements, then remove node from the stack of
                //               open elements and continue."
                let Some(node_token) = self.active_formatting_elements.element_entry(node).cloned()
                else {
                    self.open_elements.remove(node);
                    continue;
                };

                // STEP 4.13.6: "Create an element for the token for which the
                //               element node was created, in the HTML
                //               namespace, with common ancestor as the intended
                //               parent; replace the entry for node in the list
                //               of active formatting elements with an entry for
                //               the new element, replace the entry for node in
                //               the stack of open elements with an entry for the
                //               new element, and let node be the new element."
                let new_node = self.create_element_for_token(&node_token, Namespace::Html);
                self.active_formatting_elements
                    .replace_element(node, new_node);
                self.open_elements.replace(
                    node,
                    StackEntry::html(new_node, node_token.tag_id, node_token.name.clone()),
                );

                // STEP 4.13.7: "If last node is furthest block, then move the
                //               aforementioned bookmark to be immediately after
                //               the new node in the list of active formatting
                //               elements."
                if last_node == furthest_block {
                    bookmark = new_node;
                }

                // STEP 4.13.8: "Append last node to node."
                self.adapter.detach_node(last_node);
                self.adapter.append_child(new_node, last_node);

                // STEP 4.13.9: "Set last node to node."
                last_node = new_node;
            }

            // STEP 4.14: "Insert whatever last node ended up being in the
            //             previous step at the appropriate place for inserting a
            //             node, but using common ancestor as the override
            //             target."
            self.adapter.detach_node(last_node);
            let place = if self.is_html_element(
                common_ancestor,
                &[TagId::Table, TagId::Tbody, TagId::Tfoot, TagId::Thead, TagId::Tr],
            ) {
                self.foster_parent_location()
            } else {
                self.appropriate_place_for_inserting_node(Some(common_ancestor))
            };
            self.insert_at(place, last_node);

            // STEP 4.15: "Create an element for the token for which formatting
            //             element was created, in the HTML namespace, with
            //             furthest block as the intended parent."
            let new_element = self.create_element_for_token(&formatting_token, Namespace::Html);

            // STEP 4.16: "Take all of the child nodes of furthest block and
            //             append them to the element created in the last step."
            for child in self.adapter.child_nodes(furthest_block) {
                self.adapter.detach_node(child);
                self.adapter.append_child(new_element, child);
            }

            // STEP 4.17: "Append that new element to furthest block."
            self.adapter.append_child(furthest_block, new_element);

            // STEP 4.18: "Remove formatting element from the list of active
            //             formatting elements, and insert the new element into
            //             the list of active formatting elements at the position
            //             of the aforementioned bookmark."
            self.active_formatting_elements.insert_element_after_bookmark(
                bookmark,
                new_element,
                formatting_token.clone(),
            );
            self.active_formatting_elements
                .remove_entry(formatting_element);

            // STEP 4.19: "Remove formatting element from the stack of open
            //             elements, and insert the new element into the stack of
            //             open elements immediately below the position of
            //             furthest block in that stack."
            self.open_elements.remove(formatting_element);
            self.open_elements.insert_after(
                furthest_block,
                StackEntry::html(new_element, formatting_token.tag_id, formatting_token.name),
            );
            self.adapter.on_item_push(new_element);
        }
    }
}
