//! The contract between the tokenizer and its consumer.
//!
//! [§ 13.2.5](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
//! "When a token is emitted, it must immediately be handled by the tree
//! construction stage. The tree construction stage can affect the state of the
//! tokenization stage, and can insert additional characters into the stream."

use koala_common::location::Location;

use super::core::TokenizerState;
use super::token::{CommentToken, DoctypeToken, TagToken, TextToken, Token};
use crate::error::ParseError;

/// What the consumer wants the tokenizer to do after a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkResult {
    /// Keep tokenizing.
    Continue,
    /// Switch the tokenizer to a new state before the next character
    /// (RCDATA, RAWTEXT, script data or PLAINTEXT after a start tag).
    SwitchTo(TokenizerState),
    /// Stop emitting tokens until the parser is resumed.
    Pause,
    /// Parsing is over; no further tokens are wanted.
    Stop,
}

/// Receives tokens and parse errors from the tokenizer, one at a time, in
/// emission order.
pub trait TokenSink {
    /// A start tag.
    fn on_start_tag(&mut self, tag: TagToken) -> SinkResult;
    /// An end tag.
    fn on_end_tag(&mut self, tag: TagToken) -> SinkResult;
    /// A comment.
    fn on_comment(&mut self, comment: CommentToken) -> SinkResult;
    /// A DOCTYPE.
    fn on_doctype(&mut self, doctype: DoctypeToken) -> SinkResult;
    /// A run of regular characters.
    fn on_character(&mut self, text: TextToken) -> SinkResult;
    /// A run of U+0000 characters.
    fn on_null_character(&mut self, text: TextToken) -> SinkResult;
    /// A run of whitespace.
    fn on_whitespace_character(&mut self, text: TextToken) -> SinkResult;
    /// End of input. This is always the last token.
    fn on_eof(&mut self, location: Option<Location>) -> SinkResult;
    /// A parse error found by the tokenizer or preprocessor.
    fn on_parse_error(&mut self, error: ParseError);

    /// [§ 13.2.5.42 Markup declaration open state](https://html.spec.whatwg.org/multipage/parsing.html#markup-declaration-open-state)
    ///
    /// "If there is an adjusted current node and it is not an element in the
    /// HTML namespace" then `<![CDATA[` opens a CDATA section.
    fn in_foreign_content(&self) -> bool {
        false
    }

    /// Whether parse errors should be computed at all.
    fn wants_errors(&self) -> bool {
        true
    }
}

/// Route a token to the matching handler.
pub(super) fn dispatch<S: TokenSink + ?Sized>(sink: &mut S, token: Token) -> SinkResult {
    log::trace!(target: "koala_html::tokenizer", "emit {token}");
    match token {
        Token::StartTag(tag) => sink.on_start_tag(tag),
        Token::EndTag(tag) => sink.on_end_tag(tag),
        Token::Comment(comment) => sink.on_comment(comment),
        Token::Doctype(doctype) => sink.on_doctype(doctype),
        Token::Character(text) => sink.on_character(text),
        Token::NullCharacter(text) => sink.on_null_character(text),
        Token::WhitespaceCharacter(text) => sink.on_whitespace_character(text),
        Token::EndOfFile { location } => sink.on_eof(location),
    }
}

/// A sink that records everything it receives.
///
/// Useful for inspecting the raw token stream. Raw-text elements are
/// recognized by name, so `<script>` and friends switch the tokenizer the way
/// the tree builder would in HTML content.
#[derive(Debug, Default)]
pub struct TokenCollector {
    /// Tokens in emission order.
    pub tokens: Vec<Token>,
    /// Parse errors in emission order.
    pub errors: Vec<ParseError>,
    /// When false, start tags never switch the tokenizer state.
    pub switch_on_raw_text: bool,
}

impl TokenCollector {
    /// A collector that switches into raw-text states like a browser would.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tokens: Vec::new(),
            errors: Vec::new(),
            switch_on_raw_text: true,
        }
    }

    /// A collector that never switches tokenizer states.
    #[must_use]
    pub fn without_state_switching() -> Self {
        Self::default()
    }

    fn raw_text_state(name: &str) -> Option<TokenizerState> {
        use crate::tag::TagId;
        match TagId::from_name(name) {
            TagId::Title | TagId::Textarea => Some(TokenizerState::RCDATA),
            TagId::Style
            | TagId::Xmp
            | TagId::Iframe
            | TagId::Noembed
            | TagId::Noframes => Some(TokenizerState::RAWTEXT),
            TagId::Script => Some(TokenizerState::ScriptData),
            TagId::Plaintext => Some(TokenizerState::PLAINTEXT),
            _ => None,
        }
    }
}

impl TokenSink for TokenCollector {
    fn on_start_tag(&mut self, tag: TagToken) -> SinkResult {
        let switch = if self.switch_on_raw_text {
            Self::raw_text_state(&tag.name)
        } else {
            None
        };
        self.tokens.push(Token::StartTag(tag));
        switch.map_or(SinkResult::Continue, SinkResult::SwitchTo)
    }

    fn on_end_tag(&mut self, tag: TagToken) -> SinkResult {
        self.tokens.push(Token::EndTag(tag));
        SinkResult::Continue
    }

    fn on_comment(&mut self, comment: CommentToken) -> SinkResult {
        self.tokens.push(Token::Comment(comment));
        SinkResult::Continue
    }

    fn on_doctype(&mut self, doctype: DoctypeToken) -> SinkResult {
        self.tokens.push(Token::Doctype(doctype));
        SinkResult::Continue
    }

    fn on_character(&mut self, text: TextToken) -> SinkResult {
        self.tokens.push(Token::Character(text));
        SinkResult::Continue
    }

    fn on_null_character(&mut self, text: TextToken) -> SinkResult {
        self.tokens.push(Token::NullCharacter(text));
        SinkResult::Continue
    }

    fn on_whitespace_character(&mut self, text: TextToken) -> SinkResult {
        self.tokens.push(Token::WhitespaceCharacter(text));
        SinkResult::Continue
    }

    fn on_eof(&mut self, location: Option<Location>) -> SinkResult {
        self.tokens.push(Token::EndOfFile { location });
        SinkResult::Stop
    }

    fn on_parse_error(&mut self, error: ParseError) {
        self.errors.push(error);
    }
}
