//! Streaming HTML5 tokenizer, tree builder and serializer.
//!
//! # Scope
//!
//! This crate implements:
//! - **HTML Tokenizer** ([WHATWG § 13.2.5](https://html.spec.whatwg.org/multipage/parsing.html#tokenization))
//!   - All tokenizer states, including script data and CDATA sections
//!   - Named and numeric character references
//!   - Chunked input with optional source locations
//!
//! - **HTML Parser / Tree Builder** ([WHATWG § 13.2.6](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction))
//!   - All 23 insertion modes
//!   - Adoption agency algorithm, foster parenting, Noah's Ark clause
//!   - SVG and MathML foreign content
//!   - Fragment parsing ([§ 13.4](https://html.spec.whatwg.org/multipage/parsing.html#parsing-html-fragments))
//!
//! - **Serializer** ([WHATWG § 13.3](https://html.spec.whatwg.org/multipage/parsing.html#serialising-html-fragments))
//!
//! Trees are built through the [`TreeAdapter`] trait; [`koala_dom::DomTree`]
//! implements it.
//!
//! # Not Implemented
//!
//! - Script execution. `</script>` can pause the parser, but the embedder
//!   decides what happens next.
//! - Encoding sniffing. Input is already a `&str`.
//!
//! ```
//! use koala_html::{ParserOptions, parse_document};
//!
//! let tree = parse_document("<title>Hi</title><p>One<p>Two", ParserOptions::default());
//! let body = tree.body().unwrap();
//! assert_eq!(tree.children(body).len(), 2);
//! ```

/// The tree adapter trait.
pub mod adapter;
/// [`TreeAdapter`] implementation for [`koala_dom::DomTree`].
pub mod dom_adapter;
/// Parse errors.
pub mod error;
/// Parser options.
pub mod options;
/// HTML parser and tree construction.
pub mod parser;
/// HTML serialization.
pub mod serializer;
/// Tag identifiers.
pub mod tag;
/// HTML tokenizer for converting input into tokens.
pub mod tokenizer;

use koala_dom::{DomTree, NodeId};

pub use adapter::{DocumentTypeInfo, TreeAdapter};
pub use error::{ParseError, ParseErrorCode};
pub use options::{ParseErrorCallback, ParserOptions};
pub use parser::{HTMLParser, InsertionMode, ParseStatus, print_tree};
pub use serializer::{SerializerOptions, serialize, serialize_outer};
pub use tag::TagId;
pub use tokenizer::{Attribute, HTMLTokenizer, Token};

/// Parse a complete document into a new [`DomTree`].
#[must_use]
pub fn parse_document(html: &str, options: ParserOptions) -> DomTree {
    let mut parser = HTMLParser::new(DomTree::new(), options);
    let _ = parser.write(html, true);
    drain(&mut parser);
    parser.into_adapter()
}

/// Parse a fragment as the contents of a `<template>` element.
///
/// Returns the tree and the document fragment holding the parsed nodes.
#[must_use]
pub fn parse_fragment(html: &str, options: ParserOptions) -> (DomTree, NodeId) {
    parse_fragment_with(html, None, options)
}

/// Parse a fragment as the contents of an element named `context_tag`.
#[must_use]
pub fn parse_fragment_in_context(
    html: &str,
    context_tag: &str,
    options: ParserOptions,
) -> (DomTree, NodeId) {
    parse_fragment_with(html, Some(context_tag), options)
}

fn parse_fragment_with(
    html: &str,
    context: Option<&str>,
    options: ParserOptions,
) -> (DomTree, NodeId) {
    let mut parser = HTMLParser::new_fragment(DomTree::new(), context, options);
    let _ = parser.write(html, true);
    drain(&mut parser);
    let fragment = parser.fragment();
    let mut tree = parser.into_adapter();
    // The builder always creates the fragment when it stops; an empty one
    // stands in if the parse never got that far.
    let fragment = fragment.unwrap_or_else(|| tree.create_document_fragment());
    (tree, fragment)
}

/// Run a parser whose input is complete, resuming through any script pauses.
fn drain(parser: &mut HTMLParser<DomTree>) {
    while parser.status() == ParseStatus::Paused {
        let _ = parser.resume();
    }
}
