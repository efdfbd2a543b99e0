//! [§ 13.2.4.3 The list of active formatting elements](https://html.spec.whatwg.org/multipage/parsing.html#the-list-of-active-formatting-elements)
//!
//! "The list of active formatting elements ... is used to handle mis-nested
//! formatting element tags."
//!
//! Entries are stored oldest first. Every element entry keeps the start tag it
//! was created from so the element can be recreated during reconstruction and
//! the adoption agency algorithm.

use crate::tag::TagId;
use crate::tokenizer::TagToken;

/// An entry in the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormattingEntry<H> {
    /// "A marker is an entry in the list of active formatting elements that is
    /// distinct from any element."
    ///
    /// Markers are pushed when entering applet, object, marquee, template, td,
    /// th and caption, so formatting elements from outside them are not
    /// reopened inside.
    Marker,
    /// A formatting element.
    Element {
        /// The element.
        handle: H,
        /// The start tag the element was created for.
        token: TagToken,
    },
}

impl<H: Copy> FormattingEntry<H> {
    /// The element handle, unless this is a marker.
    #[must_use]
    pub const fn handle(&self) -> Option<H> {
        match self {
            Self::Marker => None,
            Self::Element { handle, .. } => Some(*handle),
        }
    }
}

/// The list of active formatting elements.
#[derive(Debug)]
pub struct FormattingElementList<H> {
    entries: Vec<FormattingEntry<H>>,
}

impl<H> Default for FormattingElementList<H> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

/// Two attribute lists are the same set when they have the same length and
/// every attribute of one appears, with the same value, in the other.
fn same_attributes(a: &TagToken, b: &TagToken) -> bool {
    a.attrs.len() == b.attrs.len()
        && a.attrs.iter().all(|attr| {
            b.attrs
                .iter()
                .any(|other| other.name == attr.name && other.value == attr.value)
        })
}

impl<H: Copy + Eq> FormattingElementList<H> {
    /// An empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All entries, oldest first.
    #[must_use]
    pub fn entries(&self) -> &[FormattingEntry<H>] {
        &self.entries
    }

    /// Number of entries, markers included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Entry at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&FormattingEntry<H>> {
        self.entries.get(index)
    }

    /// "insert a marker at the end of the list of active formatting elements"
    pub fn insert_marker(&mut self) {
        self.entries.push(FormattingEntry::Marker);
    }

    /// Index of the most recent marker.
    fn last_marker_index(&self) -> Option<usize> {
        self.entries
            .iter()
            .rposition(|entry| matches!(entry, FormattingEntry::Marker))
    }

    /// [§ 13.2.4.3](https://html.spec.whatwg.org/multipage/parsing.html#push-onto-the-list-of-active-formatting-elements)
    ///
    /// "1. If there are already three elements in the list of active formatting
    /// elements after the last marker, if any, or anywhere in the list if there
    /// are no markers, that have the same tag name, namespace, and attributes
    /// as element, then remove the earliest such element from the list of
    /// active formatting elements.
    ///
    /// 2. Add element to the list of active formatting elements."
    pub fn push_element(&mut self, handle: H, token: TagToken) {
        let start = self.last_marker_index().map_or(0, |index| index + 1);
        let matches: Vec<usize> = self.entries[start..]
            .iter()
            .enumerate()
            .filter_map(|(offset, entry)| match entry {
                FormattingEntry::Element { token: existing, .. }
                    if existing.name == token.name && same_attributes(existing, &token) =>
                {
                    Some(start + offset)
                }
                _ => None,
            })
            .collect();
        if matches.len() >= 3 {
            let _ = self.entries.remove(matches[0]);
        }
        self.entries.push(FormattingEntry::Element { handle, token });
    }

    /// Insert an element right after the entry for `bookmark`, the element the
    /// adoption agency bookmarked. Falls back to the end of the list.
    pub fn insert_element_after_bookmark(&mut self, bookmark: H, handle: H, token: TagToken) {
        let index = self
            .index_of(bookmark)
            .map_or(self.entries.len(), |index| index + 1);
        self.entries
            .insert(index, FormattingEntry::Element { handle, token });
    }

    /// Remove the entry for `handle`.
    pub fn remove_entry(&mut self, handle: H) {
        if let Some(index) = self.index_of(handle) {
            let _ = self.entries.remove(index);
        }
    }

    /// [§ 13.2.4.3](https://html.spec.whatwg.org/multipage/parsing.html#clear-the-list-of-active-formatting-elements-up-to-the-last-marker)
    ///
    /// "1. Let entry be the last (most recently added) entry in the list of
    /// active formatting elements.
    /// 2. Remove entry from the list of active formatting elements.
    /// 3. If entry was a marker, then stop the algorithm at this point.
    /// 4. Go to step 1."
    pub fn clear_to_last_marker(&mut self) {
        while let Some(entry) = self.entries.pop() {
            if matches!(entry, FormattingEntry::Marker) {
                break;
            }
        }
    }

    /// "the last element in the list of active formatting elements that: is
    /// between the end of the list and the last marker in the list, if any, or
    /// the start of the list otherwise, and has the tag name subject"
    #[must_use]
    pub fn element_entry_in_scope_with_tag_name(
        &self,
        tag_id: TagId,
        name: &str,
    ) -> Option<(H, &TagToken)> {
        for entry in self.entries.iter().rev() {
            match entry {
                FormattingEntry::Marker => return None,
                FormattingEntry::Element { handle, token } => {
                    if token.tag_id == tag_id
                        && (tag_id != TagId::Unknown || token.name.eq_ignore_ascii_case(name))
                    {
                        return Some((*handle, token));
                    }
                }
            }
        }
        None
    }

    /// The token the entry for `handle` was created from.
    #[must_use]
    pub fn element_entry(&self, handle: H) -> Option<&TagToken> {
        self.entries.iter().find_map(|entry| match entry {
            FormattingEntry::Element { handle: h, token } if *h == handle => Some(token),
            _ => None,
        })
    }

    /// Whether `handle` has an entry.
    #[must_use]
    pub fn contains_element(&self, handle: H) -> bool {
        self.index_of(handle).is_some()
    }

    /// Position of the entry for `handle`.
    #[must_use]
    pub fn index_of(&self, handle: H) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| entry.handle() == Some(handle))
    }

    /// Point the entry for `old` at `new`, keeping its token.
    pub fn replace_element(&mut self, old: H, new: H) {
        for entry in &mut self.entries {
            if let FormattingEntry::Element { handle, .. } = entry
                && *handle == old
            {
                *handle = new;
                return;
            }
        }
    }

    /// Point the entry at `index` at `new`.
    pub fn replace_at(&mut self, index: usize, new: H) {
        if let Some(FormattingEntry::Element { handle, .. }) = self.entries.get_mut(index) {
            *handle = new;
        }
    }
}

#[cfg(test)]
mod tests {
    use koala_dom::Attribute;

    use super::*;

    fn tag(name: &str, attrs: &[(&str, &str)]) -> TagToken {
        let mut token = TagToken::new(name);
        token.attrs = attrs
            .iter()
            .map(|(name, value)| Attribute::new(*name, *value))
            .collect();
        token
    }

    fn handles(list: &FormattingElementList<usize>) -> Vec<Option<usize>> {
        list.entries().iter().map(FormattingEntry::handle).collect()
    }

    #[test]
    fn test_noahs_ark_evicts_oldest_match() {
        let mut list = FormattingElementList::new();
        for handle in 0..4 {
            list.push_element(handle, tag("b", &[("class", "x")]));
        }
        assert_eq!(handles(&list), vec![Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn test_noahs_ark_compares_attribute_sets() {
        let mut list = FormattingElementList::new();
        list.push_element(0, tag("b", &[("a", "1"), ("b", "2")]));
        list.push_element(1, tag("b", &[("b", "2"), ("a", "1")]));
        list.push_element(2, tag("b", &[("a", "1"), ("b", "2")]));
        list.push_element(3, tag("b", &[("a", "1")]));
        list.push_element(4, tag("b", &[("b", "2"), ("a", "1")]));
        assert_eq!(handles(&list), vec![Some(1), Some(2), Some(3), Some(4)]);
    }

    #[test]
    fn test_noahs_ark_stops_at_marker() {
        let mut list = FormattingElementList::new();
        for handle in 0..3 {
            list.push_element(handle, tag("i", &[]));
        }
        list.insert_marker();
        list.push_element(3, tag("i", &[]));
        assert_eq!(handles(&list), vec![Some(0), Some(1), Some(2), None, Some(3)]);
    }

    #[test]
    fn test_clear_to_last_marker() {
        let mut list = FormattingElementList::new();
        list.push_element(0, tag("b", &[]));
        list.insert_marker();
        list.push_element(1, tag("i", &[]));
        list.push_element(2, tag("u", &[]));
        list.clear_to_last_marker();
        assert_eq!(handles(&list), vec![Some(0)]);
    }

    #[test]
    fn test_lookup_respects_marker() {
        let mut list = FormattingElementList::new();
        list.push_element(0, tag("a", &[]));
        list.insert_marker();
        list.push_element(1, tag("b", &[]));
        assert!(list
            .element_entry_in_scope_with_tag_name(TagId::A, "a")
            .is_none());
        let (handle, token) = list
            .element_entry_in_scope_with_tag_name(TagId::B, "b")
            .unwrap();
        assert_eq!(handle, 1);
        assert_eq!(token.name, "b");
    }

    #[test]
    fn test_bookmark_insertion_and_replace() {
        let mut list = FormattingElementList::new();
        list.push_element(0, tag("b", &[]));
        list.push_element(1, tag("i", &[]));
        list.insert_element_after_bookmark(0, 5, tag("b", &[]));
        list.remove_entry(0);
        assert_eq!(handles(&list), vec![Some(5), Some(1)]);
        list.replace_element(1, 7);
        assert!(list.contains_element(7));
        assert_eq!(list.element_entry(7).map(|t| t.name.as_str()), Some("i"));
    }
}
