//! Foreign content parsing support for SVG and MathML.
//!
//! [§ 13.2.6.3 Creating and inserting nodes](https://html.spec.whatwg.org/multipage/parsing.html#creating-and-inserting-nodes)
//! [§ 13.2.6.5 The rules for parsing tokens in foreign content](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inforeign)

pub mod mathml;
pub mod svg;

pub use mathml::{adjust_mathml_attributes, is_annotation_xml_integration_point};
pub use svg::{adjust_svg_attributes, adjust_svg_tag_name};

use koala_dom::{Attribute, Namespace};

use crate::tag::TagId;
use crate::tokenizer::TagToken;

/// [§ 13.2.6.3 Adjust foreign attributes](https://html.spec.whatwg.org/multipage/parsing.html#adjust-foreign-attributes)
///
/// "if any of the attributes on the token match the strings in the first
/// column of the following table, let the attribute be a namespaced
/// attribute, with the prefix being the string in the second column, the local
/// name being the string in the third column, and the namespace being the
/// namespace in the fourth column."
///
/// Format: (`attribute_name`, prefix, `local_name`, namespace)
const FOREIGN_ATTRIBUTE_ADJUSTMENTS: &[(&str, Option<&str>, &str, Namespace)] = &[
    ("xlink:actuate", Some("xlink"), "actuate", Namespace::XLink),
    ("xlink:arcrole", Some("xlink"), "arcrole", Namespace::XLink),
    ("xlink:href", Some("xlink"), "href", Namespace::XLink),
    ("xlink:role", Some("xlink"), "role", Namespace::XLink),
    ("xlink:show", Some("xlink"), "show", Namespace::XLink),
    ("xlink:title", Some("xlink"), "title", Namespace::XLink),
    ("xlink:type", Some("xlink"), "type", Namespace::XLink),
    ("xml:lang", Some("xml"), "lang", Namespace::Xml),
    ("xml:space", Some("xml"), "space", Namespace::Xml),
    ("xmlns", None, "xmlns", Namespace::Xmlns),
    ("xmlns:xlink", Some("xmlns"), "xlink", Namespace::Xmlns),
];

/// Give `xlink:`, `xml:` and `xmlns` attributes their namespace, prefix and
/// local name.
pub fn adjust_foreign_attributes(attributes: &mut [Attribute]) {
    for attr in &mut *attributes {
        if let Some(&(_, prefix, local_name, namespace)) = FOREIGN_ATTRIBUTE_ADJUSTMENTS
            .iter()
            .find(|(from, ..)| *from == attr.name)
        {
            attr.name = local_name.to_string();
            attr.prefix = prefix.map(str::to_string);
            attr.namespace = Some(namespace);
        }
    }
}

/// [§ 13.2.6.5](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inforeign)
///
/// "A start tag whose tag name is one of: "b", "big", "blockquote", "body",
/// "br", "center", "code", "dd", "div", "dl", "dt", "em", "embed", "h1", "h2",
/// "h3", "h4", "h5", "h6", "head", "hr", "i", "img", "li", "listing", "menu",
/// "meta", "nobr", "ol", "p", "pre", "ruby", "s", "small", "span", "strong",
/// "strike", "sub", "sup", "table", "tt", "u", "ul", "var"; A start tag whose
/// tag name is "font", if the token has any attributes named "color", "face",
/// or "size""
#[must_use]
pub fn is_breakout_start_tag(tag: &TagToken) -> bool {
    match tag.tag_id {
        TagId::B
        | TagId::Big
        | TagId::Blockquote
        | TagId::Body
        | TagId::Br
        | TagId::Center
        | TagId::Code
        | TagId::Dd
        | TagId::Div
        | TagId::Dl
        | TagId::Dt
        | TagId::Em
        | TagId::Embed
        | TagId::H1
        | TagId::H2
        | TagId::H3
        | TagId::H4
        | TagId::H5
        | TagId::H6
        | TagId::Head
        | TagId::Hr
        | TagId::I
        | TagId::Img
        | TagId::Li
        | TagId::Listing
        | TagId::Menu
        | TagId::Meta
        | TagId::Nobr
        | TagId::Ol
        | TagId::P
        | TagId::Pre
        | TagId::Ruby
        | TagId::S
        | TagId::Small
        | TagId::Span
        | TagId::Strong
        | TagId::Strike
        | TagId::Sub
        | TagId::Sup
        | TagId::Table
        | TagId::Tt
        | TagId::U
        | TagId::Ul
        | TagId::Var => true,
        TagId::Font => {
            tag.has_attribute("color") || tag.has_attribute("face") || tag.has_attribute("size")
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_foreign_attributes_get_namespaces() {
        let mut attrs = vec![
            Attribute::new("xlink:href", "#a"),
            Attribute::new("xmlns", "http://www.w3.org/2000/svg"),
            Attribute::new("width", "10"),
        ];
        adjust_foreign_attributes(&mut attrs);
        assert_eq!(attrs[0].name, "href");
        assert_eq!(attrs[0].prefix.as_deref(), Some("xlink"));
        assert_eq!(attrs[0].namespace, Some(Namespace::XLink));
        assert_eq!(attrs[1].qualified_name(), "xmlns");
        assert_eq!(attrs[1].namespace, Some(Namespace::Xmlns));
        assert_eq!(attrs[2].namespace, None);
    }

    #[test]
    fn test_font_breaks_out_only_with_presentational_attributes() {
        let mut font = TagToken::new("font");
        assert!(!is_breakout_start_tag(&font));
        font.attrs.push(Attribute::new("color", "red"));
        assert!(is_breakout_start_tag(&font));
        assert!(is_breakout_start_tag(&TagToken::new("div")));
        assert!(!is_breakout_start_tag(&TagToken::new("mi")));
    }
}
