//! The tree adapter: how the tree builder creates and mutates nodes.
//!
//! [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction)
//!
//! The tree builder never touches nodes directly. It holds opaque
//! [`TreeAdapter::Handle`]s, compares them for equality, and asks the adapter
//! to build the tree. [`koala_dom::DomTree`] is the adapter shipped with this
//! crate; see [`crate::dom_adapter`].

use std::fmt;

use koala_common::location::{Location, NodeLocation, Position};
use koala_dom::{Attribute, DocumentMode, Namespace};

/// Name, public identifier and system identifier of a doctype node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentTypeInfo<'a> {
    /// The doctype name.
    pub name: &'a str,
    /// The public identifier, or the empty string.
    pub public_id: &'a str,
    /// The system identifier, or the empty string.
    pub system_id: &'a str,
}

/// Node creation, mutation and inspection used by the parser and the
/// serializer.
///
/// Handles must stay valid for the lifetime of the adapter, including after
/// the node has been detached.
pub trait TreeAdapter {
    /// A reference to a node. Compared by identity.
    type Handle: Copy + Eq + fmt::Debug;

    // Node creation

    /// Create a document node.
    fn create_document(&mut self) -> Self::Handle;
    /// Create a document fragment node.
    fn create_document_fragment(&mut self) -> Self::Handle;
    /// Create a detached element.
    fn create_element(
        &mut self,
        tag_name: &str,
        namespace: Namespace,
        attrs: Vec<Attribute>,
    ) -> Self::Handle;
    /// Create a detached comment.
    fn create_comment_node(&mut self, data: &str) -> Self::Handle;

    // Tree mutation

    /// Append `child` as the last child of `parent`.
    fn append_child(&mut self, parent: Self::Handle, child: Self::Handle);
    /// Insert `child` into `parent` right before `reference`.
    fn insert_before(&mut self, parent: Self::Handle, child: Self::Handle, reference: Self::Handle);
    /// Associate the contents fragment of a `<template>` element.
    fn set_template_content(&mut self, template: Self::Handle, content: Self::Handle);
    /// The contents fragment of a `<template>` element.
    fn template_content(&self, template: Self::Handle) -> Option<Self::Handle>;
    /// Append (or replace) the document's doctype node. Returns the doctype
    /// node.
    fn set_document_type(
        &mut self,
        document: Self::Handle,
        name: &str,
        public_id: &str,
        system_id: &str,
    ) -> Self::Handle;
    /// Set the document's quirks mode.
    fn set_document_mode(&mut self, document: Self::Handle, mode: DocumentMode);
    /// The document's quirks mode.
    fn document_mode(&self, document: Self::Handle) -> DocumentMode;
    /// Remove `node` from its parent, if any.
    fn detach_node(&mut self, node: Self::Handle);
    /// Append text to `parent`, merging with a trailing text node. Returns the
    /// text node that received the data.
    fn insert_text(&mut self, parent: Self::Handle, text: &str) -> Self::Handle;
    /// Insert text right before `reference`, merging with a text node
    /// immediately preceding it. Returns the text node that received the data.
    fn insert_text_before(
        &mut self,
        parent: Self::Handle,
        text: &str,
        reference: Self::Handle,
    ) -> Self::Handle;
    /// Add each attribute the element does not already have.
    fn adopt_attributes(&mut self, recipient: Self::Handle, attrs: &[Attribute]);

    // Inspection

    /// Children of `node`, in order.
    fn child_nodes(&self, node: Self::Handle) -> Vec<Self::Handle>;
    /// Parent of `node`, if attached.
    fn parent_node(&self, node: Self::Handle) -> Option<Self::Handle>;
    /// Attributes of an element, in source order. Empty for other nodes.
    fn attr_list(&self, element: Self::Handle) -> &[Attribute];
    /// Local name of an element.
    fn tag_name(&self, element: Self::Handle) -> Option<&str>;
    /// Namespace of an element.
    fn namespace(&self, element: Self::Handle) -> Option<Namespace>;
    /// Data of a text node.
    fn text_node_content(&self, node: Self::Handle) -> Option<&str>;
    /// Data of a comment node.
    fn comment_node_content(&self, node: Self::Handle) -> Option<&str>;
    /// Identifiers of a doctype node.
    fn document_type_info(&self, node: Self::Handle) -> Option<DocumentTypeInfo<'_>>;

    /// Whether `node` is an element.
    fn is_element_node(&self, node: Self::Handle) -> bool {
        self.tag_name(node).is_some()
    }

    /// Whether `node` is a text node.
    fn is_text_node(&self, node: Self::Handle) -> bool {
        self.text_node_content(node).is_some()
    }

    /// Whether `node` is a comment.
    fn is_comment_node(&self, node: Self::Handle) -> bool {
        self.comment_node_content(node).is_some()
    }

    /// Whether `node` is a doctype.
    fn is_document_type_node(&self, node: Self::Handle) -> bool {
        self.document_type_info(node).is_some()
    }

    // Source locations. Adapters that do not store locations can ignore these.

    /// Record where a node came from.
    fn set_node_source_code_location(
        &mut self,
        _node: Self::Handle,
        _location: Option<NodeLocation>,
    ) {
    }

    /// The recorded location of a node.
    fn node_source_code_location(&self, _node: Self::Handle) -> Option<NodeLocation> {
        None
    }

    /// Extend a node's span to `end`, recording the end tag if one closed it.
    fn update_node_source_code_location(
        &mut self,
        _node: Self::Handle,
        _end: Position,
        _end_tag: Option<Location>,
    ) {
    }

    // Stack notifications

    /// An element was pushed onto the stack of open elements.
    fn on_item_push(&mut self, _element: Self::Handle) {}

    /// An element was popped off the stack of open elements. `new_current`
    /// is the element that is now the current node, if any.
    fn on_item_pop(&mut self, _element: Self::Handle, _new_current: Option<Self::Handle>) {}
}
