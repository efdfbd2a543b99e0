//! [`TreeAdapter`] for the arena DOM in `koala-dom`.

use koala_common::location::{Location, NodeLocation, Position};
use koala_dom::{
    Attribute, DocumentMode, DocumentTypeData, DomTree, ElementData, Namespace, NodeId, NodeType,
};

use crate::adapter::{DocumentTypeInfo, TreeAdapter};

impl TreeAdapter for DomTree {
    type Handle = NodeId;

    /// The arena is created with its document at [`NodeId::ROOT`].
    fn create_document(&mut self) -> NodeId {
        self.root()
    }

    fn create_document_fragment(&mut self) -> NodeId {
        self.alloc(NodeType::DocumentFragment)
    }

    fn create_element(
        &mut self,
        tag_name: &str,
        namespace: Namespace,
        attrs: Vec<Attribute>,
    ) -> NodeId {
        self.alloc_element(ElementData::new(tag_name, namespace, attrs))
    }

    fn create_comment_node(&mut self, data: &str) -> NodeId {
        self.alloc(NodeType::Comment(data.to_string()))
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) {
        Self::append_child(self, parent, child);
    }

    fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: NodeId) {
        Self::insert_before(self, parent, child, reference);
    }

    fn set_template_content(&mut self, template: NodeId, content: NodeId) {
        if let Some(element) = self.as_element_mut(template) {
            element.template_contents = Some(content);
        }
    }

    fn template_content(&self, template: NodeId) -> Option<NodeId> {
        self.template_contents(template)
    }

    fn set_document_type(
        &mut self,
        document: NodeId,
        name: &str,
        public_id: &str,
        system_id: &str,
    ) -> NodeId {
        let data = DocumentTypeData {
            name: name.to_string(),
            public_id: public_id.to_string(),
            system_id: system_id.to_string(),
        };
        let existing = self
            .children(document)
            .iter()
            .copied()
            .find(|&id| self.as_doctype(id).is_some());
        if let Some(id) = existing
            && let Some(node) = self.get_mut(id)
        {
            node.node_type = NodeType::DocumentType(data);
            return id;
        }
        let id = self.alloc(NodeType::DocumentType(data));
        Self::append_child(self, document, id);
        id
    }

    fn set_document_mode(&mut self, _document: NodeId, mode: DocumentMode) {
        self.set_mode(mode);
    }

    fn document_mode(&self, _document: NodeId) -> DocumentMode {
        self.mode()
    }

    fn detach_node(&mut self, node: NodeId) {
        self.detach(node);
    }

    fn insert_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        self.append_text(parent, text)
    }

    fn insert_text_before(&mut self, parent: NodeId, text: &str, reference: NodeId) -> NodeId {
        Self::insert_text_before(self, parent, text, reference)
    }

    fn adopt_attributes(&mut self, recipient: NodeId, attrs: &[Attribute]) {
        if let Some(element) = self.as_element_mut(recipient) {
            for attr in attrs {
                if element.get_attribute(&attr.name).is_none() {
                    element.attrs.push(attr.clone());
                }
            }
        }
    }

    fn child_nodes(&self, node: NodeId) -> Vec<NodeId> {
        self.children(node).to_vec()
    }

    fn parent_node(&self, node: NodeId) -> Option<NodeId> {
        self.parent(node)
    }

    fn attr_list(&self, element: NodeId) -> &[Attribute] {
        self.as_element(element).map_or(&[], |e| e.attrs.as_slice())
    }

    fn tag_name(&self, element: NodeId) -> Option<&str> {
        self.as_element(element).map(|e| e.tag_name.as_str())
    }

    fn namespace(&self, element: NodeId) -> Option<Namespace> {
        self.as_element(element).map(|e| e.namespace)
    }

    fn text_node_content(&self, node: NodeId) -> Option<&str> {
        self.as_text(node)
    }

    fn comment_node_content(&self, node: NodeId) -> Option<&str> {
        self.as_comment(node)
    }

    fn document_type_info(&self, node: NodeId) -> Option<DocumentTypeInfo<'_>> {
        self.as_doctype(node).map(|data| DocumentTypeInfo {
            name: &data.name,
            public_id: &data.public_id,
            system_id: &data.system_id,
        })
    }

    fn set_node_source_code_location(&mut self, node: NodeId, location: Option<NodeLocation>) {
        self.set_location(node, location);
    }

    fn node_source_code_location(&self, node: NodeId) -> Option<NodeLocation> {
        self.location(node).cloned()
    }

    fn update_node_source_code_location(
        &mut self,
        node: NodeId,
        end: Position,
        end_tag: Option<Location>,
    ) {
        self.update_location_end(node, end, end_tag);
    }
}
