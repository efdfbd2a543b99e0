use core::fmt;

use koala_common::location::{Location, TagLocation};

pub use koala_dom::Attribute;

use crate::tag::TagId;

/// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
///
/// "Start and end tag tokens have a tag name, a self-closing flag, and a
/// list of attributes, each of which has a name and a value. When a start
/// or end tag token is created, its self-closing flag must be unset (its
/// other state is that it be set), and its attributes list must be empty."
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagToken {
    /// "a tag name", lowercased unless tag case preservation is on.
    pub name: String,
    /// `name` resolved against the known tags.
    pub tag_id: TagId,
    /// "a list of attributes", without duplicates.
    pub attrs: Vec<Attribute>,
    /// "a self-closing flag"
    pub self_closing: bool,
    /// [§ 13.2.6](https://html.spec.whatwg.org/multipage/parsing.html#acknowledge-self-closing-flag)
    /// "When a start tag token is emitted with its self-closing flag set, if
    /// the flag is not acknowledged when it is processed by the tree
    /// construction stage, that is a parse error."
    pub ack_self_closing: bool,
    /// Source span of the whole tag.
    pub location: Option<TagLocation>,
}

impl TagToken {
    /// A tag token with no attributes.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            tag_id: TagId::from_name(&name),
            name,
            attrs: Vec::new(),
            self_closing: false,
            ack_self_closing: false,
            location: None,
        }
    }

    /// A synthesized token for a known tag, used when the tree builder
    /// inserts an element the input did not contain.
    #[must_use]
    pub fn for_tag(tag_id: TagId) -> Self {
        Self {
            name: tag_id.name().to_string(),
            tag_id,
            attrs: Vec::new(),
            self_closing: false,
            ack_self_closing: false,
            location: None,
        }
    }

    /// Value of the named attribute.
    #[must_use]
    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| attr.value.as_str())
    }

    /// Whether the token carries the named attribute.
    #[must_use]
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attrs.iter().any(|attr| attr.name == name)
    }

    /// Source span, if tracked.
    #[must_use]
    pub fn span(&self) -> Option<Location> {
        self.location.as_ref().map(|loc| loc.span)
    }
}

/// "Comment and character tokens have data."
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommentToken {
    /// "data"
    pub data: String,
    /// Source span from `<!` through `>`.
    pub location: Option<Location>,
}

/// "DOCTYPE tokens have a name, a public identifier, a system identifier,
/// and a force-quirks flag. When a DOCTYPE token is created, its name,
/// public identifier, and system identifier must be marked as missing
/// (which is a distinct state from the empty string), and the force-quirks
/// flag must be set to off (its other state is on)."
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DoctypeToken {
    /// "a name"
    pub name: Option<String>,
    /// "a public identifier"
    pub public_id: Option<String>,
    /// "a system identifier"
    pub system_id: Option<String>,
    /// "a force-quirks flag"
    pub force_quirks: bool,
    /// Source span from `<!` through `>`.
    pub location: Option<Location>,
}

/// A run of character data of one kind.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextToken {
    /// The characters, after newline normalization and reference decoding.
    pub chars: String,
    /// Source span of the run.
    pub location: Option<Location>,
}

/// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
///
/// "The output of the tokenization step is a series of zero or more of the
/// following tokens: DOCTYPE, start tag, end tag, comment, character,
/// end-of-file."
///
/// Character tokens are split by kind and coalesced: consecutive characters of
/// the same kind arrive as one token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Characters that are neither whitespace nor U+0000.
    Character(TextToken),
    /// One or more U+0000 characters.
    NullCharacter(TextToken),
    /// ASCII whitespace: tab, LF, FF, CR, space.
    WhitespaceCharacter(TextToken),
    /// A start tag.
    StartTag(TagToken),
    /// An end tag. Attributes and the self-closing flag are parse errors.
    EndTag(TagToken),
    /// A comment.
    Comment(CommentToken),
    /// A DOCTYPE.
    Doctype(DoctypeToken),
    /// End of input.
    EndOfFile {
        /// Where the input ended.
        location: Option<Location>,
    },
}

impl Token {
    /// Source span of the token, if tracked.
    #[must_use]
    pub fn location(&self) -> Option<Location> {
        match self {
            Self::Character(text) | Self::NullCharacter(text) | Self::WhitespaceCharacter(text) => {
                text.location
            }
            Self::StartTag(tag) | Self::EndTag(tag) => tag.span(),
            Self::Comment(comment) => comment.location,
            Self::Doctype(doctype) => doctype.location,
            Self::EndOfFile { location } => *location,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Doctype(doctype) => {
                write!(f, "DOCTYPE")?;
                if let Some(name) = &doctype.name {
                    write!(f, " {name}")?;
                }
                if let Some(public_id) = &doctype.public_id {
                    write!(f, " PUBLIC \"{public_id}\"")?;
                }
                if let Some(system_id) = &doctype.system_id {
                    write!(f, " SYSTEM \"{system_id}\"")?;
                }
                if doctype.force_quirks {
                    write!(f, " (force-quirks)")?;
                }
                Ok(())
            }
            Self::StartTag(tag) => {
                write!(f, "StartTag <{}", tag.name)?;
                for attr in &tag.attrs {
                    write!(f, " {}=\"{}\"", attr.name, attr.value)?;
                }
                if tag.self_closing {
                    write!(f, " /")?;
                }
                write!(f, ">")
            }
            Self::EndTag(tag) => write!(f, "EndTag </{}>", tag.name),
            Self::Comment(comment) => write!(f, "Comment <!--{}-->", comment.data),
            Self::Character(text) => write!(f, "Character {:?}", text.chars),
            Self::WhitespaceCharacter(text) => write!(f, "Whitespace {:?}", text.chars),
            Self::NullCharacter(text) => write!(f, "Null x{}", text.chars.chars().count()),
            Self::EndOfFile { .. } => write!(f, "EOF"),
        }
    }
}
