//! Parse errors.
//!
//! [§ 13.2.2 Parse errors](https://html.spec.whatwg.org/multipage/parsing.html#parse-errors)
//!
//! "This specification defines the parsing rules for HTML documents, whether
//! they are syntactically correct or not. Certain points in the parsing
//! algorithm are said to be parse errors. The error handling for parse errors
//! is well-defined."
//!
//! Errors never abort parsing. They are delivered to the `on_parse_error`
//! callback, if one was supplied, and otherwise not computed at all.

use koala_common::location::Location;
use strum_macros::{Display, IntoStaticStr};
use thiserror::Error;

/// Stable error codes. Tokenizer codes follow the WHATWG table; tree
/// construction codes name the recovery that was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
pub enum ParseErrorCode {
    // Input stream
    /// A control code point other than ASCII whitespace or NULL.
    ControlCharacterInInputStream,
    /// A noncharacter code point.
    NoncharacterInInputStream,
    /// A lone surrogate. Unreachable from `&str` input.
    SurrogateInInputStream,

    // Tokenizer
    /// `<!-->` or `<!--->`.
    AbruptClosingOfEmptyComment,
    /// `>` inside a DOCTYPE public identifier.
    AbruptDoctypePublicIdentifier,
    /// `>` inside a DOCTYPE system identifier.
    AbruptDoctypeSystemIdentifier,
    /// `&#;` or `&#x;`.
    AbsenceOfDigitsInNumericCharacterReference,
    /// `<![CDATA[` outside foreign content.
    CdataInHtmlContent,
    /// A numeric character reference above U+10FFFF.
    CharacterReferenceOutsideUnicodeRange,
    /// A numeric character reference to a control code point.
    ControlCharacterReference,
    /// An attribute name repeated on one tag.
    DuplicateAttribute,
    /// An end tag with attributes.
    EndTagWithAttributes,
    /// An end tag with `/>`.
    EndTagWithTrailingSolidus,
    /// EOF right after `<` or `</`.
    EofBeforeTagName,
    /// EOF inside a CDATA section.
    EofInCdata,
    /// EOF inside a comment.
    EofInComment,
    /// EOF inside a DOCTYPE.
    EofInDoctype,
    /// EOF inside `<!--` within script data.
    EofInScriptHtmlCommentLikeText,
    /// EOF inside a tag.
    EofInTag,
    /// `--!>` closing a comment.
    IncorrectlyClosedComment,
    /// `<!` not followed by `--`, `DOCTYPE` or `[CDATA[`.
    IncorrectlyOpenedComment,
    /// Garbage after the DOCTYPE name.
    InvalidCharacterSequenceAfterDoctypeName,
    /// `<` or `</` followed by a non-letter.
    InvalidFirstCharacterOfTagName,
    /// `name=` with no value.
    MissingAttributeValue,
    /// `<!DOCTYPE>`.
    MissingDoctypeName,
    /// `PUBLIC` with no identifier.
    MissingDoctypePublicIdentifier,
    /// `SYSTEM` with no identifier.
    MissingDoctypeSystemIdentifier,
    /// `</>`.
    MissingEndTagName,
    /// Unquoted DOCTYPE public identifier.
    MissingQuoteBeforeDoctypePublicIdentifier,
    /// Unquoted DOCTYPE system identifier.
    MissingQuoteBeforeDoctypeSystemIdentifier,
    /// A character reference without the closing `;`.
    MissingSemicolonAfterCharacterReference,
    /// `PUBLIC"...`.
    MissingWhitespaceAfterDoctypePublicKeyword,
    /// `SYSTEM"...`.
    MissingWhitespaceAfterDoctypeSystemKeyword,
    /// `<!DOCTYPEhtml>`.
    MissingWhitespaceBeforeDoctypeName,
    /// `a="1"b="2"`.
    MissingWhitespaceBetweenAttributes,
    /// Public and system identifiers not separated by whitespace.
    MissingWhitespaceBetweenDoctypePublicAndSystemIdentifiers,
    /// `<!--` inside a comment.
    NestedComment,
    /// A numeric character reference to a noncharacter.
    NoncharacterCharacterReference,
    /// `/>` on a non-void HTML element.
    NonVoidHtmlElementStartTagWithTrailingSolidus,
    /// `&#0;`.
    NullCharacterReference,
    /// A numeric character reference to a surrogate.
    SurrogateCharacterReference,
    /// Garbage after the DOCTYPE system identifier.
    UnexpectedCharacterAfterDoctypeSystemIdentifier,
    /// `"`, `'` or `<` in an attribute name.
    UnexpectedCharacterInAttributeName,
    /// `"`, `'`, `<`, `=` or `` ` `` in an unquoted attribute value.
    UnexpectedCharacterInUnquotedAttributeValue,
    /// `=` where an attribute name should start.
    UnexpectedEqualsSignBeforeAttributeName,
    /// U+0000 in the input.
    UnexpectedNullCharacter,
    /// `<?`.
    UnexpectedQuestionMarkInsteadOfTagName,
    /// `/` inside a tag not followed by `>`.
    UnexpectedSolidusInTag,
    /// An `&name;` that matches no entity.
    UnknownNamedCharacterReference,

    // Tree construction
    /// An end tag with no matching open element.
    EndTagWithoutMatchingOpenElement,
    /// An element closed while it still had open children.
    ClosingOfElementWithOpenChildElements,
    /// Content not allowed in `<noscript>` inside `<head>`.
    DisallowedContentInNoscriptInHead,
    /// Elements still open at end of input.
    OpenElementsLeftAfterEof,
    /// A head-only element found after `</head>`.
    AbandonedHeadElementChild,
    /// A second `<head>` start tag.
    MisplacedStartTagForHeadElement,
    /// `<noscript>` nested in `<noscript>` in `<head>`.
    NestedNoscriptInHead,
    /// EOF inside `<script>`, `<style>`, `<title>` or `<textarea>`.
    EofInElementThatCanContainOnlyText,
    /// The document has no DOCTYPE.
    MissingDoctype,
    /// A DOCTYPE after the start of the document.
    MisplacedDoctype,
    /// A DOCTYPE other than `<!DOCTYPE html>` or the legacy-compat form.
    NonConformingDoctype,
    /// A start tag that is ignored in the current insertion mode.
    MisplacedStartTag,
    /// Non-whitespace text moved out of a table.
    FosterParentedContent,
    /// A start tag that is ignored in foreign content or in a `<select>`.
    UnexpectedStartTagInContext,
    /// Formatting elements that were misnested and repaired.
    MisnestedFormattingElement,
}

/// A parse error with an optional source location.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}{}", .location.map(|loc| format!(" at {}", loc.start())).unwrap_or_default())]
pub struct ParseError {
    /// What went wrong.
    pub code: ParseErrorCode,
    /// Where it went wrong, when location tracking is active.
    pub location: Option<Location>,
}

impl ParseError {
    /// Create a parse error.
    #[must_use]
    pub const fn new(code: ParseErrorCode, location: Option<Location>) -> Self {
        Self { code, location }
    }
}
