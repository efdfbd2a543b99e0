//! The streaming parser: a tokenizer feeding a tree builder.

use koala_common::warning::warn_once;
use koala_dom::{DomTree, Namespace, NodeId, NodeType};

use super::core::{InsertionMode, TreeBuilder};
use crate::adapter::TreeAdapter;
use crate::options::ParserOptions;
use crate::tag::TagId;
use crate::tokenizer::{HTMLTokenizer, TokenizerResult, TokenizerState};

/// Where the parser stopped after [`HTMLParser::write`] or
/// [`HTMLParser::resume`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStatus {
    /// All written input was consumed; write more.
    NeedsInput,
    /// The parser paused after a `</script>`; call [`HTMLParser::resume`].
    Paused,
    /// The tree is complete.
    Finished,
}

/// [§ 13.2 Parsing HTML documents](https://html.spec.whatwg.org/multipage/parsing.html#parsing)
///
/// An HTML parser building a tree through a [`TreeAdapter`]. Input may be
/// written in any number of chunks; chunk boundaries never change the
/// resulting tree.
///
/// ```
/// use koala_dom::DomTree;
/// use koala_html::{HTMLParser, ParseStatus, ParserOptions};
///
/// let mut parser = HTMLParser::new(DomTree::new(), ParserOptions::default());
/// assert_eq!(parser.write("<p>Hello, ", false), ParseStatus::NeedsInput);
/// assert_eq!(parser.write("world</p>", true), ParseStatus::Finished);
/// let tree = parser.into_adapter();
/// assert_eq!(tree.text_content(tree.body().unwrap()), "Hello, world");
/// ```
pub struct HTMLParser<A: TreeAdapter> {
    tokenizer: HTMLTokenizer,
    tree_builder: TreeBuilder<A>,
    paused: bool,
    finished: bool,
}

impl<A: TreeAdapter> HTMLParser<A> {
    /// A parser for a complete document.
    #[must_use]
    pub fn new(adapter: A, mut options: ParserOptions) -> Self {
        let tokenizer = Self::tokenizer_for(&options);
        let tree_builder = TreeBuilder::new(adapter, &mut options);
        Self {
            tokenizer,
            tree_builder,
            paused: false,
            finished: false,
        }
    }

    /// [§ 13.4 Parsing HTML fragments](https://html.spec.whatwg.org/multipage/parsing.html#parsing-html-fragments)
    ///
    /// A parser for a fragment parsed as the contents of an element named
    /// `context`. Without a context the fragment is parsed as the contents of
    /// a `<template>`. `svg` and `math` contexts are foreign elements; every
    /// other name is an HTML element.
    #[must_use]
    pub fn new_fragment(adapter: A, context: Option<&str>, mut options: ParserOptions) -> Self {
        let context = context.unwrap_or("template").to_ascii_lowercase();
        let namespace = match context.as_str() {
            "svg" => Namespace::Svg,
            "math" => Namespace::MathMl,
            _ => Namespace::Html,
        };

        let mut tokenizer = Self::tokenizer_for(&options);
        // "Set the state of the HTML parser's tokenization stage as follows,
        // switching on the context element:"
        if namespace == Namespace::Html {
            let state = match TagId::from_name(&context) {
                TagId::Title | TagId::Textarea => Some(TokenizerState::RCDATA),
                TagId::Style | TagId::Xmp | TagId::Iframe | TagId::Noembed | TagId::Noframes => {
                    Some(TokenizerState::RAWTEXT)
                }
                TagId::Noscript if options.scripting_enabled => Some(TokenizerState::RAWTEXT),
                TagId::Script => Some(TokenizerState::ScriptData),
                TagId::Plaintext => Some(TokenizerState::PLAINTEXT),
                _ => None,
            };
            if let Some(state) = state {
                tokenizer.set_state(state);
                tokenizer.set_last_start_tag_name(&context);
            }
        }

        let tree_builder = TreeBuilder::new_fragment(adapter, &mut options, &context, namespace);
        Self {
            tokenizer,
            tree_builder,
            paused: false,
            finished: false,
        }
    }

    fn tokenizer_for(options: &ParserOptions) -> HTMLTokenizer {
        HTMLTokenizer::new()
            .with_locations(options.tracks_locations())
            .with_case_preservation(options.uppercase_tag_enabled, options.uppercase_attr_enabled)
    }

    /// Feed a chunk of input. `is_last` marks the end of the document.
    ///
    /// While paused, the chunk is buffered and parsing continues on
    /// [`Self::resume`].
    pub fn write(&mut self, chunk: &str, is_last: bool) -> ParseStatus {
        if self.finished {
            let _ = warn_once("HTML Parser", "write() called after parsing finished");
            return ParseStatus::Finished;
        }
        if self.tokenizer.is_last_chunk_written() {
            let _ = warn_once("HTML Parser", "write() called after the last chunk");
            return self.status();
        }
        self.tokenizer.write(chunk, is_last);
        if self.paused {
            return ParseStatus::Paused;
        }
        self.run()
    }

    /// Continue after a pause.
    pub fn resume(&mut self) -> ParseStatus {
        if !self.paused {
            let _ = warn_once("HTML Parser", "resume() called on a parser that is not paused");
            return self.status();
        }
        self.paused = false;
        self.run()
    }

    /// Insert markup right after the `</script>` that paused the parser, the
    /// way `document.write()` does. It is parsed before any input written
    /// later.
    pub fn insert_at_current_position(&mut self, html: &str) {
        if self.finished {
            let _ = warn_once("HTML Parser", "insert_at_current_position() after parsing finished");
            return;
        }
        self.tokenizer.insert_html_at_current_position(html);
    }

    /// Abort parsing. Input consumed so far reaches the tree, open elements
    /// are closed and no further input is processed.
    pub fn stop(&mut self) {
        if !self.finished {
            self.tokenizer.flush_and_stop(&mut self.tree_builder);
        }
        self.tree_builder.stop_parsing();
        self.paused = false;
        self.finished = true;
    }

    fn run(&mut self) -> ParseStatus {
        match self.tokenizer.run(&mut self.tree_builder) {
            TokenizerResult::NeedsInput => ParseStatus::NeedsInput,
            TokenizerResult::Paused => {
                self.paused = true;
                ParseStatus::Paused
            }
            TokenizerResult::Done => {
                self.tree_builder.stop_parsing();
                self.finished = true;
                ParseStatus::Finished
            }
        }
    }

    /// The current status.
    #[must_use]
    pub const fn status(&self) -> ParseStatus {
        if self.finished {
            ParseStatus::Finished
        } else if self.paused {
            ParseStatus::Paused
        } else {
            ParseStatus::NeedsInput
        }
    }

    /// The document node.
    #[must_use]
    pub const fn document(&self) -> A::Handle {
        self.tree_builder.document()
    }

    /// The fragment node holding the parsed nodes, once a fragment parse has
    /// finished.
    #[must_use]
    pub const fn fragment(&self) -> Option<A::Handle> {
        self.tree_builder.fragment()
    }

    /// The `<script>` element whose end tag caused the most recent pause.
    #[must_use]
    pub const fn paused_script(&self) -> Option<A::Handle> {
        self.tree_builder.paused_script()
    }

    /// The tree builder's current insertion mode.
    #[must_use]
    pub const fn insertion_mode(&self) -> InsertionMode {
        self.tree_builder.insertion_mode()
    }

    /// Whether the tree builder has stopped.
    #[must_use]
    pub const fn is_stopped(&self) -> bool {
        self.tree_builder.is_stopped()
    }

    /// The adapter, for inspecting the tree mid-parse.
    #[must_use]
    pub const fn adapter(&self) -> &A {
        self.tree_builder.adapter()
    }

    /// Finish with the parser and take the adapter back.
    #[must_use]
    pub fn into_adapter(self) -> A {
        self.tree_builder.into_adapter()
    }
}

/// Print a DOM tree for debugging.
pub fn print_tree(tree: &DomTree, id: NodeId, indent: usize) {
    let prefix = "  ".repeat(indent);
    let Some(node) = tree.get(id) else {
        return;
    };
    match &node.node_type {
        NodeType::Document => println!("{prefix}#document ({:?})", tree.mode()),
        NodeType::DocumentFragment => println!("{prefix}#document-fragment"),
        NodeType::DocumentType(doctype) => {
            if doctype.public_id.is_empty() && doctype.system_id.is_empty() {
                println!("{prefix}<!DOCTYPE {}>", doctype.name);
            } else {
                println!(
                    "{prefix}<!DOCTYPE {} \"{}\" \"{}\">",
                    doctype.name, doctype.public_id, doctype.system_id
                );
            }
        }
        NodeType::Element(data) => {
            let name = match data.namespace {
                Namespace::Html => data.tag_name.clone(),
                Namespace::Svg => format!("svg {}", data.tag_name),
                Namespace::MathMl => format!("math {}", data.tag_name),
                _ => data.tag_name.clone(),
            };
            if data.attrs.is_empty() {
                println!("{prefix}<{name}>");
            } else {
                let attrs: Vec<String> = data
                    .attrs
                    .iter()
                    .map(|attr| {
                        if attr.value.is_empty() {
                            attr.qualified_name()
                        } else {
                            format!("{}=\"{}\"", attr.qualified_name(), attr.value)
                        }
                    })
                    .collect();
                println!("{prefix}<{name} {}>", attrs.join(" "));
            }
            if let Some(content) = data.template_contents {
                println!("{prefix}  content");
                print_tree(tree, content, indent + 2);
            }
        }
        NodeType::Text(data) => {
            let display = data.replace('\n', "\\n").replace(' ', "\u{00B7}");
            println!("{prefix}\"{display}\"");
        }
        NodeType::Comment(data) => println!("{prefix}<!-- {data} -->"),
    }
    for &child_id in tree.children(id) {
        print_tree(tree, child_id, indent + 1);
    }
}
