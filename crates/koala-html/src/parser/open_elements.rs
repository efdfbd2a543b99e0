//! [§ 13.2.4.3 The stack of open elements](https://html.spec.whatwg.org/multipage/parsing.html#the-stack-of-open-elements)
//!
//! "Initially, the stack of open elements is empty. The stack grows downwards;
//! the topmost node on the stack is the first one added to the stack, and the
//! bottommost node of the stack is the most recently added node in the stack."
//!
//! Entries cache the tag id, namespace and integration-point flags so scope
//! checks never go back to the tree. Every removal is logged; the tree builder
//! drains the log with [`OpenElementStack::take_popped`] to run its end-of-element
//! bookkeeping in removal order.

use koala_dom::Namespace;

use crate::tag::TagId;

/// One element on the stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackEntry<H> {
    /// The element.
    pub handle: H,
    /// Resolved tag, or [`TagId::Unknown`].
    pub tag_id: TagId,
    /// Local name as inserted.
    pub name: String,
    /// The element's namespace.
    pub namespace: Namespace,
    /// [§ 13.2.6.5](https://html.spec.whatwg.org/multipage/parsing.html#html-integration-point)
    pub html_integration_point: bool,
}

impl<H> StackEntry<H> {
    /// An HTML element entry.
    pub fn html(handle: H, tag_id: TagId, name: impl Into<String>) -> Self {
        Self {
            handle,
            tag_id,
            name: name.into(),
            namespace: Namespace::Html,
            html_integration_point: false,
        }
    }

    /// Whether this is an HTML element with the given tag.
    #[must_use]
    pub fn is(&self, tag_id: TagId) -> bool {
        self.namespace == Namespace::Html && self.tag_id == tag_id
    }

    /// Whether this is an HTML element with one of the given tags.
    #[must_use]
    pub fn is_one_of(&self, tags: &[TagId]) -> bool {
        self.namespace == Namespace::Html && tags.contains(&self.tag_id)
    }

    /// Whether this is an HTML element with the given name. Unknown tags are
    /// compared by name, ASCII case-insensitively.
    #[must_use]
    pub fn has_html_name(&self, tag_id: TagId, name: &str) -> bool {
        self.namespace == Namespace::Html
            && self.tag_id == tag_id
            && (tag_id != TagId::Unknown || self.name.eq_ignore_ascii_case(name))
    }

    /// [§ 13.2.6.5](https://html.spec.whatwg.org/multipage/parsing.html#mathml-text-integration-point)
    ///
    /// "A node is a MathML text integration point if it is one of the
    /// following elements: A MathML mi element, A MathML mo element, A MathML
    /// mn element, A MathML ms element, A MathML mtext element"
    #[must_use]
    pub fn is_mathml_text_integration_point(&self) -> bool {
        self.namespace == Namespace::MathMl
            && matches!(
                self.tag_id,
                TagId::Mi | TagId::Mo | TagId::Mn | TagId::Ms | TagId::Mtext
            )
    }
}

/// Which elements terminate a scope search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    /// "has an element in scope"
    Default,
    /// "has an element in list item scope"
    ListItem,
    /// "has an element in button scope"
    Button,
    /// "has an element in table scope"
    Table,
    /// "has an element in select scope"
    Select,
}

impl Scope {
    /// Whether `entry` is one of the scope's boundary elements.
    fn is_boundary<H>(self, entry: &StackEntry<H>) -> bool {
        let tag = entry.tag_id;
        match self {
            Self::Default => is_default_scope_boundary(entry),
            Self::ListItem => {
                is_default_scope_boundary(entry) || entry.is_one_of(&[TagId::Ol, TagId::Ul])
            }
            Self::Button => is_default_scope_boundary(entry) || entry.is(TagId::Button),
            // "html, table, template"
            Self::Table => entry.is_one_of(&[TagId::Html, TagId::Table, TagId::Template]),
            // "all element types except the following: optgroup in the HTML
            // namespace, option in the HTML namespace"
            Self::Select => {
                !(entry.namespace == Namespace::Html
                    && matches!(tag, TagId::Optgroup | TagId::Option))
            }
        }
    }
}

/// "The stack of open elements is said to have a particular element in scope
/// when it has that element in the specific scope consisting of the following
/// element types: applet, caption, html, table, td, th, marquee, object,
/// template, MathML mi, MathML mo, MathML mn, MathML ms, MathML mtext, MathML
/// annotation-xml, SVG foreignObject, SVG desc, SVG title"
fn is_default_scope_boundary<H>(entry: &StackEntry<H>) -> bool {
    match entry.namespace {
        Namespace::Html => matches!(
            entry.tag_id,
            TagId::Applet
                | TagId::Caption
                | TagId::Html
                | TagId::Table
                | TagId::Td
                | TagId::Th
                | TagId::Marquee
                | TagId::Object
                | TagId::Template
        ),
        Namespace::MathMl => matches!(
            entry.tag_id,
            TagId::Mi | TagId::Mo | TagId::Mn | TagId::Ms | TagId::Mtext | TagId::AnnotationXml
        ),
        Namespace::Svg => matches!(
            entry.tag_id,
            TagId::ForeignObject | TagId::Desc | TagId::Title
        ),
        Namespace::XLink | Namespace::Xml | Namespace::Xmlns => false,
    }
}

/// The stack of open elements. Index 0 is the topmost (`html`) element.
#[derive(Debug)]
pub struct OpenElementStack<H> {
    entries: Vec<StackEntry<H>>,
    /// Number of HTML `template` elements on the stack.
    tmpl_count: usize,
    /// Elements removed since the last [`Self::take_popped`], in order, with
    /// the element that was the current node right after each removal.
    popped: Vec<(H, Option<H>)>,
}

impl<H> Default for OpenElementStack<H> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            tmpl_count: 0,
            popped: Vec::new(),
        }
    }
}

impl<H: Copy + Eq> OpenElementStack<H> {
    /// An empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of open elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// All entries, topmost first.
    #[must_use]
    pub fn entries(&self) -> &[StackEntry<H>] {
        &self.entries
    }

    /// Entry at `index`, counting from the top.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&StackEntry<H>> {
        self.entries.get(index)
    }

    /// "The current node is the bottommost node in this stack of open elements."
    #[must_use]
    pub fn current(&self) -> Option<&StackEntry<H>> {
        self.entries.last()
    }

    /// Handle of the current node.
    #[must_use]
    pub fn current_handle(&self) -> Option<H> {
        self.current().map(|entry| entry.handle)
    }

    /// Tag of the current node, if it is an HTML element.
    #[must_use]
    pub fn current_tag_id(&self) -> Option<TagId> {
        self.current()
            .filter(|entry| entry.namespace == Namespace::Html)
            .map(|entry| entry.tag_id)
    }

    /// Whether the current node is an HTML element with this tag.
    #[must_use]
    pub fn current_is(&self, tag_id: TagId) -> bool {
        self.current().is_some_and(|entry| entry.is(tag_id))
    }

    /// Number of `template` elements on the stack.
    #[must_use]
    pub const fn tmpl_count(&self) -> usize {
        self.tmpl_count
    }

    /// Whether `handle` is on the stack.
    #[must_use]
    pub fn contains(&self, handle: H) -> bool {
        self.index_of(handle).is_some()
    }

    /// Position of `handle`, counting from the top.
    #[must_use]
    pub fn index_of(&self, handle: H) -> Option<usize> {
        self.entries.iter().rposition(|entry| entry.handle == handle)
    }

    /// Index of the bottommost HTML element with this tag.
    #[must_use]
    pub fn last_index_of_tag(&self, tag_id: TagId) -> Option<usize> {
        self.entries.iter().rposition(|entry| entry.is(tag_id))
    }

    /// Drain the removal log.
    pub fn take_popped(&mut self) -> Vec<(H, Option<H>)> {
        std::mem::take(&mut self.popped)
    }

    fn note_removed(&mut self, entry: &StackEntry<H>) {
        if entry.is(TagId::Template) {
            self.tmpl_count -= 1;
        }
        let new_current = self.current_handle();
        self.popped.push((entry.handle, new_current));
    }

    // Mutation

    /// Push an element; it becomes the current node.
    pub fn push(&mut self, entry: StackEntry<H>) {
        if entry.is(TagId::Template) {
            self.tmpl_count += 1;
        }
        self.entries.push(entry);
    }

    /// Pop the current node.
    pub fn pop(&mut self) -> Option<StackEntry<H>> {
        let entry = self.entries.pop()?;
        self.note_removed(&entry);
        Some(entry)
    }

    /// Replace the entry for `old` with `new`, in place.
    pub fn replace(&mut self, old: H, new: StackEntry<H>) {
        if let Some(index) = self.index_of(old) {
            if self.entries[index].is(TagId::Template) {
                self.tmpl_count -= 1;
            }
            if new.is(TagId::Template) {
                self.tmpl_count += 1;
            }
            self.entries[index] = new;
        }
    }

    /// Insert `new` immediately below `anchor`.
    pub fn insert_after(&mut self, anchor: H, new: StackEntry<H>) {
        if let Some(index) = self.index_of(anchor) {
            if new.is(TagId::Template) {
                self.tmpl_count += 1;
            }
            self.entries.insert(index + 1, new);
        }
    }

    /// Remove `handle` wherever it is.
    pub fn remove(&mut self, handle: H) {
        if let Some(index) = self.index_of(handle) {
            let entry = self.entries.remove(index);
            if entry.is(TagId::Template) {
                self.tmpl_count -= 1;
            }
            self.popped.push((entry.handle, self.current_handle()));
        }
    }

    /// Pop until exactly `len` elements remain.
    pub fn shorten_to_length(&mut self, len: usize) {
        while self.entries.len() > len {
            let _ = self.pop();
        }
    }

    /// "Pop elements from the stack of open elements until an HTML element
    /// with the tag name X has been popped from the stack."
    pub fn pop_until_tag_popped(&mut self, tag_id: TagId) {
        while let Some(entry) = self.pop() {
            if entry.is(tag_id) {
                break;
            }
        }
    }

    /// Pop until `handle` has been popped.
    pub fn pop_until_element_popped(&mut self, handle: H) {
        while let Some(entry) = self.pop() {
            if entry.handle == handle {
                break;
            }
        }
    }

    /// "Pop elements from the stack of open elements until an HTML element
    /// whose tag name is one of "h1", "h2", "h3", "h4", "h5", or "h6" has been
    /// popped from the stack."
    pub fn pop_until_numbered_header_popped(&mut self) {
        while let Some(entry) = self.pop() {
            if entry.namespace == Namespace::Html && entry.tag_id.is_numbered_header() {
                break;
            }
        }
    }

    /// Pop until a `td` or `th` element has been popped.
    pub fn pop_until_table_cell_popped(&mut self) {
        while let Some(entry) = self.pop() {
            if entry.is_one_of(&[TagId::Td, TagId::Th]) {
                break;
            }
        }
    }

    /// Pop everything above the `html` element.
    pub fn pop_all_up_to_html_element(&mut self) {
        self.shorten_to_length(1);
    }

    /// Pop until the current node is an HTML element with one of `tags`.
    fn clear_back_to(&mut self, tags: &[TagId]) {
        while self
            .current()
            .is_some_and(|entry| !entry.is_one_of(tags))
        {
            let _ = self.pop();
        }
    }

    /// "Clear the stack back to a table context": "pop elements from the stack
    /// of open elements until the current node is a table, template, or html
    /// element."
    pub fn clear_back_to_table_context(&mut self) {
        self.clear_back_to(&[TagId::Table, TagId::Template, TagId::Html]);
    }

    /// "Clear the stack back to a table body context": "tbody, tfoot, thead,
    /// template, or html element."
    pub fn clear_back_to_table_body_context(&mut self) {
        self.clear_back_to(&[
            TagId::Tbody,
            TagId::Tfoot,
            TagId::Thead,
            TagId::Template,
            TagId::Html,
        ]);
    }

    /// "Clear the stack back to a table row context": "tr, template, or html
    /// element."
    pub fn clear_back_to_table_row_context(&mut self) {
        self.clear_back_to(&[TagId::Tr, TagId::Template, TagId::Html]);
    }

    /// [§ 13.2.6.3 Closing elements that have implied end tags](https://html.spec.whatwg.org/multipage/parsing.html#generate-implied-end-tags)
    ///
    /// "While the current node is a dd element, a dt element, an li element, an
    /// optgroup element, an option element, a p element, an rb element, an rp
    /// element, an rt element, or an rtc element, the UA must pop the current
    /// node off the stack of open elements."
    pub fn generate_implied_end_tags(&mut self) {
        self.generate_implied_end_tags_with_exclusion(None);
    }

    /// "... generate implied end tags, except for X elements"
    pub fn generate_implied_end_tags_with_exclusion(&mut self, exclude: Option<TagId>) {
        while let Some(entry) = self.current() {
            if entry.namespace != Namespace::Html
                || !entry.tag_id.has_implied_end_tag()
                || Some(entry.tag_id) == exclude
            {
                break;
            }
            let _ = self.pop();
        }
    }

    /// "generate all implied end tags thoroughly"
    pub fn generate_implied_end_tags_thoroughly(&mut self) {
        while self.current().is_some_and(|entry| {
            entry.namespace == Namespace::Html && entry.tag_id.has_implied_end_tag_thoroughly()
        }) {
            let _ = self.pop();
        }
    }

    /// The element immediately above `handle` in the stack.
    #[must_use]
    pub fn common_ancestor(&self, handle: H) -> Option<H> {
        let index = self.index_of(handle)?;
        index
            .checked_sub(1)
            .and_then(|above| self.entries.get(above))
            .map(|entry| entry.handle)
    }

    // Scope queries

    fn has_in_specific_scope(&self, scope: Scope, target: impl Fn(&StackEntry<H>) -> bool) -> bool {
        for entry in self.entries.iter().rev() {
            if target(entry) {
                return true;
            }
            if scope.is_boundary(entry) {
                return false;
            }
        }
        false
    }

    /// "has an element in scope" for an HTML tag.
    #[must_use]
    pub fn has_in_scope(&self, tag_id: TagId) -> bool {
        self.has_in_specific_scope(Scope::Default, |entry| entry.is(tag_id))
    }

    /// "has that element in scope" for a specific node.
    #[must_use]
    pub fn has_element_in_scope(&self, handle: H) -> bool {
        self.has_in_specific_scope(Scope::Default, |entry| entry.handle == handle)
    }

    /// "has an element in scope that is an HTML element and whose tag name is
    /// one of "h1", "h2", "h3", "h4", "h5", or "h6""
    #[must_use]
    pub fn has_numbered_header_in_scope(&self) -> bool {
        self.has_in_specific_scope(Scope::Default, |entry| {
            entry.namespace == Namespace::Html && entry.tag_id.is_numbered_header()
        })
    }

    /// "has an element in list item scope"
    #[must_use]
    pub fn has_in_list_item_scope(&self, tag_id: TagId) -> bool {
        self.has_in_specific_scope(Scope::ListItem, |entry| entry.is(tag_id))
    }

    /// "has an element in button scope"
    #[must_use]
    pub fn has_in_button_scope(&self, tag_id: TagId) -> bool {
        self.has_in_specific_scope(Scope::Button, |entry| entry.is(tag_id))
    }

    /// "has an element in table scope"
    #[must_use]
    pub fn has_in_table_scope(&self, tag_id: TagId) -> bool {
        self.has_in_specific_scope(Scope::Table, |entry| entry.is(tag_id))
    }

    /// "has a tbody, thead, or tfoot element in table scope"
    #[must_use]
    pub fn has_table_body_context_in_table_scope(&self) -> bool {
        self.has_in_specific_scope(Scope::Table, |entry| {
            entry.is_one_of(&[TagId::Tbody, TagId::Thead, TagId::Tfoot])
        })
    }

    /// "has a td or th element in table scope"
    #[must_use]
    pub fn has_table_cell_in_table_scope(&self) -> bool {
        self.has_in_specific_scope(Scope::Table, |entry| {
            entry.is_one_of(&[TagId::Td, TagId::Th])
        })
    }

    /// "has an element in select scope"
    #[must_use]
    pub fn has_in_select_scope(&self, tag_id: TagId) -> bool {
        self.has_in_specific_scope(Scope::Select, |entry| entry.is(tag_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(handle: usize, tag_id: TagId) -> StackEntry<usize> {
        StackEntry::html(handle, tag_id, tag_id.name())
    }

    fn stack(tags: &[TagId]) -> OpenElementStack<usize> {
        let mut stack = OpenElementStack::new();
        for (i, &tag) in tags.iter().enumerate() {
            stack.push(entry(i, tag));
        }
        stack
    }

    #[test]
    fn test_scope_stops_at_boundaries() {
        let stack = stack(&[TagId::Html, TagId::Body, TagId::P, TagId::Table, TagId::Tr]);
        assert!(!stack.has_in_scope(TagId::P));
        assert!(stack.has_in_table_scope(TagId::Tr));
        assert!(stack.has_in_table_scope(TagId::Table));
        assert!(!stack.has_in_table_scope(TagId::Body));
    }

    #[test]
    fn test_button_and_list_item_scope() {
        let stack = stack(&[TagId::Html, TagId::Body, TagId::P, TagId::Button, TagId::Span]);
        assert!(stack.has_in_scope(TagId::P));
        assert!(!stack.has_in_button_scope(TagId::P));

        let stack = self::stack(&[TagId::Html, TagId::Body, TagId::Li, TagId::Ul, TagId::Span]);
        assert!(stack.has_in_scope(TagId::Li));
        assert!(!stack.has_in_list_item_scope(TagId::Li));
    }

    #[test]
    fn test_foreign_elements_bound_default_scope() {
        let mut stack = stack(&[TagId::Html, TagId::Body, TagId::P]);
        stack.push(StackEntry {
            handle: 3,
            tag_id: TagId::ForeignObject,
            name: "foreignObject".to_string(),
            namespace: Namespace::Svg,
            html_integration_point: true,
        });
        assert!(!stack.has_in_scope(TagId::P));
    }

    #[test]
    fn test_pops_are_logged_in_order() {
        let mut stack = stack(&[TagId::Html, TagId::Body, TagId::Div, TagId::P]);
        stack.pop_until_tag_popped(TagId::Div);
        assert_eq!(stack.take_popped(), vec![(3, Some(2)), (2, Some(1))]);
        assert!(stack.take_popped().is_empty());
        assert_eq!(stack.current_tag_id(), Some(TagId::Body));
    }

    #[test]
    fn test_implied_end_tags() {
        let mut stack = stack(&[TagId::Html, TagId::Body, TagId::Ul, TagId::Li, TagId::P]);
        stack.generate_implied_end_tags_with_exclusion(Some(TagId::Li));
        assert_eq!(stack.current_tag_id(), Some(TagId::Li));
        stack.generate_implied_end_tags();
        assert_eq!(stack.current_tag_id(), Some(TagId::Ul));
    }

    #[test]
    fn test_template_count_tracks_mutations() {
        let mut stack = stack(&[TagId::Html, TagId::Template, TagId::Div]);
        assert_eq!(stack.tmpl_count(), 1);
        stack.insert_after(2, entry(3, TagId::Template));
        assert_eq!(stack.tmpl_count(), 2);
        stack.replace(3, entry(4, TagId::Span));
        assert_eq!(stack.tmpl_count(), 1);
        stack.remove(1);
        assert_eq!(stack.tmpl_count(), 0);
        assert_eq!(stack.len(), 3);
    }

    #[test]
    fn test_clear_back_to_table_context() {
        let mut stack = stack(&[TagId::Html, TagId::Table, TagId::Tbody, TagId::Tr]);
        stack.clear_back_to_table_row_context();
        assert_eq!(stack.current_tag_id(), Some(TagId::Tr));
        stack.clear_back_to_table_context();
        assert_eq!(stack.current_tag_id(), Some(TagId::Table));
        assert_eq!(stack.common_ancestor(1), Some(0));
    }
}
