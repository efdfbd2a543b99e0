//! [§ 13.3 Serializing HTML fragments](https://html.spec.whatwg.org/multipage/parsing.html#serialising-html-fragments)
//!
//! Works over any [`TreeAdapter`], so whatever tree the parser built can be
//! written back out.

use koala_dom::{Attribute, Namespace};

use crate::adapter::TreeAdapter;
use crate::tag::TagId;

/// Serializer settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerializerOptions {
    /// Write childless HTML elements that are not void as `<name/>`.
    pub self_close_enabled: bool,
    /// Whether `<noscript>` contents are raw text, as they are when the
    /// document was parsed with scripting enabled.
    pub scripting_enabled: bool,
}

impl Default for SerializerOptions {
    fn default() -> Self {
        Self {
            self_close_enabled: false,
            scripting_enabled: true,
        }
    }
}

/// Serialize the children of `node`.
///
/// For a `<template>` element the children of its contents fragment are
/// serialized instead.
///
/// ```
/// use koala_html::{ParserOptions, SerializerOptions, parse_fragment, serialize};
///
/// let (tree, fragment) = parse_fragment("<p class=a>x &amp; y", ParserOptions::default());
/// assert_eq!(
///     serialize(&tree, fragment, SerializerOptions::default()),
///     "<p class=\"a\">x &amp; y</p>"
/// );
/// ```
#[must_use]
pub fn serialize<A: TreeAdapter>(
    adapter: &A,
    node: A::Handle,
    options: SerializerOptions,
) -> String {
    let mut out = String::new();
    let parent = adapter
        .template_content(node)
        .filter(|_| is_html(adapter, node, TagId::Template))
        .unwrap_or(node);
    Serializer {
        adapter,
        options,
        out: &mut out,
    }
    .children(parent);
    out
}

/// Serialize `node` itself, including its start and end tags.
#[must_use]
pub fn serialize_outer<A: TreeAdapter>(
    adapter: &A,
    node: A::Handle,
    options: SerializerOptions,
) -> String {
    let mut out = String::new();
    Serializer {
        adapter,
        options,
        out: &mut out,
    }
    .node(node, None);
    out
}

fn is_html<A: TreeAdapter>(adapter: &A, node: A::Handle, tag: TagId) -> bool {
    adapter.namespace(node) == Some(Namespace::Html)
        && adapter
            .tag_name(node)
            .is_some_and(|name| TagId::from_name(name) == tag)
}

struct Serializer<'a, A: TreeAdapter> {
    adapter: &'a A,
    options: SerializerOptions,
    out: &'a mut String,
}

impl<A: TreeAdapter> Serializer<'_, A> {
    fn children(&mut self, parent: A::Handle) {
        for child in self.adapter.child_nodes(parent) {
            self.node(child, Some(parent));
        }
    }

    fn node(&mut self, node: A::Handle, parent: Option<A::Handle>) {
        let adapter = self.adapter;
        if adapter.is_element_node(node) {
            self.element(node);
        } else if let Some(text) = adapter.text_node_content(node) {
            // "If the parent of current node is a style, script, xmp, iframe,
            // noembed, noframes, or plaintext element, or if the parent of
            // current node is a noscript element and scripting is enabled for
            // the node, then append the value of current node's data literally."
            if parent.is_some_and(|parent| self.is_raw_text_parent(parent)) {
                self.out.push_str(text);
            } else {
                escape(self.out, text, false);
            }
        } else if let Some(comment) = adapter.comment_node_content(node) {
            self.out.push_str("<!--");
            self.out.push_str(comment);
            self.out.push_str("-->");
        } else if let Some(doctype) = adapter.document_type_info(node) {
            self.out.push_str("<!DOCTYPE ");
            self.out.push_str(doctype.name);
            self.out.push('>');
        } else {
            // Documents and fragments only contribute their children.
            self.children(node);
        }
    }

    fn element(&mut self, element: A::Handle) {
        let adapter = self.adapter;
        let name = adapter.tag_name(element).unwrap_or_default();
        let namespace = adapter.namespace(element).unwrap_or(Namespace::Html);

        self.out.push('<');
        self.out.push_str(name);
        for attr in adapter.attr_list(element) {
            self.out.push(' ');
            self.out.push_str(&serialized_attr_name(attr));
            self.out.push_str("=\"");
            escape(self.out, &attr.value, true);
            self.out.push('"');
        }

        let is_html = namespace == Namespace::Html;
        let tag = TagId::from_name(name);
        // "If current node serializes as void, then continue on to the next
        // child node at this point."
        if is_html && tag.is_void() {
            self.out.push('>');
            return;
        }

        let contents = if is_html && tag == TagId::Template {
            adapter.template_content(element).unwrap_or(element)
        } else {
            element
        };
        if self.options.self_close_enabled && is_html && adapter.child_nodes(contents).is_empty() {
            self.out.push_str("/>");
            return;
        }

        self.out.push('>');
        if contents == element {
            self.children(element);
        } else {
            for child in adapter.child_nodes(contents) {
                self.node(child, Some(contents));
            }
        }
        self.out.push_str("</");
        self.out.push_str(name);
        self.out.push('>');
    }

    fn is_raw_text_parent(&self, parent: A::Handle) -> bool {
        if self.adapter.namespace(parent) != Some(Namespace::Html) {
            return false;
        }
        match self.adapter.tag_name(parent).map(TagId::from_name) {
            Some(
                TagId::Style
                | TagId::Script
                | TagId::Xmp
                | TagId::Iframe
                | TagId::Noembed
                | TagId::Noframes
                | TagId::Plaintext,
            ) => true,
            Some(TagId::Noscript) => self.options.scripting_enabled,
            _ => false,
        }
    }
}

/// [§ 13.3 Attribute's serialized name](https://html.spec.whatwg.org/multipage/parsing.html#attribute's-serialised-name)
fn serialized_attr_name(attr: &Attribute) -> String {
    match attr.namespace {
        // "If the attribute is in the XML namespace: the attribute's
        // serialized name is the string "xml:" followed by the attribute's
        // local name."
        Some(Namespace::Xml) => format!("xml:{}", attr.name),
        // "If the attribute is in the XMLNS namespace and the attribute's
        // local name is xmlns: the attribute's serialized name is the string
        // "xmlns"." Otherwise "xmlns:" followed by the local name.
        Some(Namespace::Xmlns) if attr.name == "xmlns" => "xmlns".to_string(),
        Some(Namespace::Xmlns) => format!("xmlns:{}", attr.name),
        // "If the attribute is in the XLink namespace: the attribute's
        // serialized name is the string "xlink:" followed by the attribute's
        // local name."
        Some(Namespace::XLink) => format!("xlink:{}", attr.name),
        _ => attr.qualified_name(),
    }
}

/// [§ 13.3 Escaping a string](https://html.spec.whatwg.org/multipage/parsing.html#escapingString)
fn escape(out: &mut String, text: &str, attribute_mode: bool) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '\u{00A0}' => out.push_str("&nbsp;"),
            '"' if attribute_mode => out.push_str("&quot;"),
            '<' if !attribute_mode => out.push_str("&lt;"),
            '>' if !attribute_mode => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_text() {
        let mut out = String::new();
        escape(&mut out, "a < b & \"c\"\u{00A0}", false);
        assert_eq!(out, "a &lt; b &amp; \"c\"&nbsp;");
    }

    #[test]
    fn test_escape_attribute() {
        let mut out = String::new();
        escape(&mut out, "<\"&\">", true);
        assert_eq!(out, "<&quot;&amp;&quot;>");
    }

    #[test]
    fn test_serialized_attr_name() {
        let mut attr = Attribute::new("href", "#a");
        attr.namespace = Some(Namespace::XLink);
        attr.prefix = Some("xlink".to_string());
        assert_eq!(serialized_attr_name(&attr), "xlink:href");

        let mut attr = Attribute::new("xmlns", "http://www.w3.org/2000/svg");
        attr.namespace = Some(Namespace::Xmlns);
        assert_eq!(serialized_attr_name(&attr), "xmlns");
    }
}
