//! Tag identifiers.
//!
//! Tree construction dispatches on a small closed enum rather than on tag name
//! strings. Names the parser has no special rules for map to
//! [`TagId::Unknown`] and are compared by name where it matters.

use std::str::FromStr;

use koala_dom::Namespace;
use strum_macros::{Display, EnumString, IntoStaticStr};

/// Every tag name the tree builder treats specially.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[allow(missing_docs)]
pub enum TagId {
    /// Any tag without special parsing rules.
    Unknown,
    A,
    Address,
    #[strum(serialize = "annotation-xml")]
    AnnotationXml,
    Applet,
    Area,
    Article,
    Aside,
    B,
    Base,
    Basefont,
    Bgsound,
    Big,
    Blockquote,
    Body,
    Br,
    Button,
    Caption,
    Center,
    Code,
    Col,
    Colgroup,
    Dd,
    Desc,
    Details,
    Dialog,
    Dir,
    Div,
    Dl,
    Dt,
    Em,
    Embed,
    Fieldset,
    Figcaption,
    Figure,
    Font,
    Footer,
    #[strum(serialize = "foreignObject")]
    ForeignObject,
    Form,
    Frame,
    Frameset,
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
    Head,
    Header,
    Hgroup,
    Hr,
    Html,
    I,
    Iframe,
    Image,
    Img,
    Input,
    Keygen,
    Label,
    Li,
    Link,
    Listing,
    Main,
    Malignmark,
    Marquee,
    Math,
    Menu,
    Meta,
    Mglyph,
    Mi,
    Mn,
    Mo,
    Ms,
    Mtext,
    Nav,
    Nobr,
    Noembed,
    Noframes,
    Noscript,
    Object,
    Ol,
    Optgroup,
    Option,
    P,
    Param,
    Plaintext,
    Pre,
    Rb,
    Rp,
    Rt,
    Rtc,
    Ruby,
    S,
    Script,
    Search,
    Section,
    Select,
    Small,
    Source,
    Span,
    Strike,
    Strong,
    Style,
    Sub,
    Summary,
    Sup,
    Svg,
    Table,
    Tbody,
    Td,
    Template,
    Textarea,
    Tfoot,
    Th,
    Thead,
    Title,
    Tr,
    Track,
    Tt,
    U,
    Ul,
    Var,
    Wbr,
    Xmp,
}

impl TagId {
    /// Resolve a tag name, ASCII case-insensitively.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        Self::from_str(name).unwrap_or(Self::Unknown)
    }

    /// Canonical lowercase name. Only meaningful for known tags.
    #[must_use]
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// `h1` through `h6`.
    #[must_use]
    pub const fn is_numbered_header(self) -> bool {
        matches!(
            self,
            Self::H1 | Self::H2 | Self::H3 | Self::H4 | Self::H5 | Self::H6
        )
    }

    /// [§ 13.1.2 Elements](https://html.spec.whatwg.org/multipage/syntax.html#void-elements)
    ///
    /// "Void elements: area, base, br, col, embed, hr, img, input, link, meta,
    /// source, track, wbr"
    ///
    /// The legacy void elements the serializer also never closes are included.
    #[must_use]
    pub const fn is_void(self) -> bool {
        matches!(
            self,
            Self::Area
                | Self::Base
                | Self::Basefont
                | Self::Bgsound
                | Self::Br
                | Self::Col
                | Self::Embed
                | Self::Frame
                | Self::Hr
                | Self::Img
                | Self::Input
                | Self::Keygen
                | Self::Link
                | Self::Meta
                | Self::Param
                | Self::Source
                | Self::Track
                | Self::Wbr
        )
    }

    /// [§ 13.2.6.3 Closing elements that have implied end tags](https://html.spec.whatwg.org/multipage/parsing.html#generate-implied-end-tags)
    ///
    /// "dd, dt, li, optgroup, option, p, rb, rp, rt, or rtc"
    #[must_use]
    pub const fn has_implied_end_tag(self) -> bool {
        matches!(
            self,
            Self::Dd
                | Self::Dt
                | Self::Li
                | Self::Optgroup
                | Self::Option
                | Self::P
                | Self::Rb
                | Self::Rp
                | Self::Rt
                | Self::Rtc
        )
    }

    /// The thorough variant adds "caption, colgroup, tbody, td, tfoot, th,
    /// thead, tr".
    #[must_use]
    pub const fn has_implied_end_tag_thoroughly(self) -> bool {
        self.has_implied_end_tag()
            || matches!(
                self,
                Self::Caption
                    | Self::Colgroup
                    | Self::Tbody
                    | Self::Td
                    | Self::Tfoot
                    | Self::Th
                    | Self::Thead
                    | Self::Tr
            )
    }

    /// [§ 13.2.4.3 The list of active formatting elements](https://html.spec.whatwg.org/multipage/parsing.html#formatting)
    ///
    /// "The following elements have varying levels of special parsing rules:
    /// ... a, b, big, code, em, font, i, nobr, s, small, strike, strong, tt,
    /// and u" are the formatting elements.
    #[must_use]
    pub const fn is_formatting(self) -> bool {
        matches!(
            self,
            Self::A
                | Self::B
                | Self::Big
                | Self::Code
                | Self::Em
                | Self::Font
                | Self::I
                | Self::Nobr
                | Self::S
                | Self::Small
                | Self::Strike
                | Self::Strong
                | Self::Tt
                | Self::U
        )
    }

    /// Tags the tokenizer keeps in RCDATA, RAWTEXT, script data or
    /// PLAINTEXT; their text children are serialized verbatim.
    #[must_use]
    pub const fn has_raw_text_content(self) -> bool {
        matches!(
            self,
            Self::Style
                | Self::Script
                | Self::Xmp
                | Self::Iframe
                | Self::Noembed
                | Self::Noframes
                | Self::Plaintext
        )
    }
}

/// [§ 13.2.4.2 The stack of open elements](https://html.spec.whatwg.org/multipage/parsing.html#special)
///
/// "The following elements have varying levels of special parsing rules".
/// Membership in the special category depends on the namespace.
#[must_use]
pub const fn is_special(tag: TagId, namespace: Namespace) -> bool {
    match namespace {
        Namespace::Html => matches!(
            tag,
            TagId::Address
                | TagId::Applet
                | TagId::Area
                | TagId::Article
                | TagId::Aside
                | TagId::Base
                | TagId::Basefont
                | TagId::Bgsound
                | TagId::Blockquote
                | TagId::Body
                | TagId::Br
                | TagId::Button
                | TagId::Caption
                | TagId::Center
                | TagId::Col
                | TagId::Colgroup
                | TagId::Dd
                | TagId::Details
                | TagId::Dir
                | TagId::Div
                | TagId::Dl
                | TagId::Dt
                | TagId::Embed
                | TagId::Fieldset
                | TagId::Figcaption
                | TagId::Figure
                | TagId::Footer
                | TagId::Form
                | TagId::Frame
                | TagId::Frameset
                | TagId::H1
                | TagId::H2
                | TagId::H3
                | TagId::H4
                | TagId::H5
                | TagId::H6
                | TagId::Head
                | TagId::Header
                | TagId::Hgroup
                | TagId::Hr
                | TagId::Html
                | TagId::Iframe
                | TagId::Img
                | TagId::Input
                | TagId::Keygen
                | TagId::Li
                | TagId::Link
                | TagId::Listing
                | TagId::Main
                | TagId::Marquee
                | TagId::Menu
                | TagId::Meta
                | TagId::Nav
                | TagId::Noembed
                | TagId::Noframes
                | TagId::Noscript
                | TagId::Object
                | TagId::Ol
                | TagId::P
                | TagId::Param
                | TagId::Plaintext
                | TagId::Pre
                | TagId::Script
                | TagId::Search
                | TagId::Section
                | TagId::Select
                | TagId::Source
                | TagId::Style
                | TagId::Summary
                | TagId::Table
                | TagId::Tbody
                | TagId::Td
                | TagId::Template
                | TagId::Textarea
                | TagId::Tfoot
                | TagId::Th
                | TagId::Thead
                | TagId::Title
                | TagId::Tr
                | TagId::Track
                | TagId::Ul
                | TagId::Wbr
                | TagId::Xmp
        ),
        Namespace::MathMl => matches!(
            tag,
            TagId::Mi
                | TagId::Mo
                | TagId::Mn
                | TagId::Ms
                | TagId::Mtext
                | TagId::AnnotationXml
        ),
        Namespace::Svg => matches!(tag, TagId::Title | TagId::ForeignObject | TagId::Desc),
        Namespace::XLink | Namespace::Xml | Namespace::Xmlns => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name_is_case_insensitive() {
        assert_eq!(TagId::from_name("DIV"), TagId::Div);
        assert_eq!(TagId::from_name("foreignobject"), TagId::ForeignObject);
        assert_eq!(TagId::from_name("annotation-xml"), TagId::AnnotationXml);
        assert_eq!(TagId::from_name("AutoMate"), TagId::Unknown);
        assert_eq!(TagId::from_name("unknown"), TagId::Unknown);
    }

    #[test]
    fn test_names_round_trip() {
        assert_eq!(TagId::Tbody.name(), "tbody");
        assert_eq!(TagId::H3.name(), "h3");
        assert_eq!(TagId::from_name(TagId::Colgroup.name()), TagId::Colgroup);
    }

    #[test]
    fn test_special_depends_on_namespace() {
        assert!(is_special(TagId::Title, Namespace::Html));
        assert!(is_special(TagId::Title, Namespace::Svg));
        assert!(!is_special(TagId::Title, Namespace::MathMl));
        assert!(!is_special(TagId::B, Namespace::Html));
    }
}
