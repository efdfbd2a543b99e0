//! [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction)
//!
//! The tree builder is split by insertion mode group. Each file adds an
//! `impl` block to the tree builder; [`HTMLParser`] drives it from the
//! tokenizer.

mod adoption_agency;
mod after_modes;
mod body_mode;
mod core;
mod foreign_content;
mod formatting_elements;
mod head_modes;
mod html_parser;
mod in_foreign_content;
mod open_elements;
mod quirks;
mod select_modes;
mod table_modes;
mod template_mode;

pub use self::core::InsertionMode;
pub use html_parser::{HTMLParser, ParseStatus, print_tree};
