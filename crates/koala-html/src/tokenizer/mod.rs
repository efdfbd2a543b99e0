//! HTML tokenizer module.
//!
//! Implements [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
//! of the WHATWG HTML Living Standard.
//!
//! Input arrives in chunks through [`HTMLTokenizer::write`]. Tokens are pushed
//! to a [`TokenSink`] as soon as they are complete; the sink can switch the
//! tokenizer state, pause it or stop it after any token.

mod character_reference;
mod comment_states;
mod doctype_states;
mod helpers;
mod preprocessor;
mod tag_states;
mod text_states;

/// HTML tokenizer state machine implementation.
pub mod core;
/// Named character reference lookup table per § 13.5.
pub mod named_character_references;
/// The tokenizer's consumer interface.
pub mod sink;
/// Token types produced by the tokenizer.
pub mod token;

pub use core::{HTMLTokenizer, TokenizerResult, TokenizerState};
pub use sink::{SinkResult, TokenCollector, TokenSink};
pub use token::{Attribute, CommentToken, DoctypeToken, TagToken, TextToken, Token};
