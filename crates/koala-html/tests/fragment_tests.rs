//! Integration tests for fragment parsing and serialization.

use koala_dom::{DomTree, Namespace, NodeId, NodeType};
use koala_html::{
    HTMLParser, ParseStatus, ParserOptions, SerializerOptions, parse_document, parse_fragment,
    parse_fragment_in_context, serialize, serialize_outer,
};

fn fragment_html(html: &str, context: &str) -> String {
    let (tree, fragment) = parse_fragment_in_context(html, context, ParserOptions::default());
    serialize(&tree, fragment, SerializerOptions::default())
}

fn template_fragment_html(html: &str) -> String {
    let (tree, fragment) = parse_fragment(html, ParserOptions::default());
    serialize(&tree, fragment, SerializerOptions::default())
}

#[test]
fn test_fragment_node() {
    let (tree, fragment) = parse_fragment("<p>a</p>b", ParserOptions::default());
    assert!(matches!(
        tree.get(fragment).unwrap().node_type,
        NodeType::DocumentFragment
    ));
    assert_eq!(tree.children(fragment).len(), 2);
    assert_eq!(tree.parent(fragment), None);
}

#[test]
fn test_empty_fragment() {
    assert_eq!(template_fragment_html(""), "");
}

#[test]
fn test_template_context_accepts_table_parts() {
    assert_eq!(template_fragment_html("<td>x</td>"), "<td>x</td>");
    assert_eq!(
        template_fragment_html("<tr><td>x</td></tr><tr>"),
        "<tr><td>x</td></tr><tr></tr>"
    );
    assert_eq!(template_fragment_html("<col><col>"), "<col><col>");
}

#[test]
fn test_body_context_drops_table_parts() {
    assert_eq!(fragment_html("<td>x", "div"), "x");
    assert_eq!(fragment_html("<p>a<p>b", "div"), "<p>a</p><p>b</p>");
}

#[test]
fn test_html_and_body_tags_ignored_in_fragment() {
    assert_eq!(fragment_html("<html><body>x</body></html>", "div"), "x");
}

#[test]
fn test_table_contexts() {
    assert_eq!(fragment_html("<tr><td>x", "tbody"), "<tr><td>x</td></tr>");
    assert_eq!(fragment_html("<td>x", "tr"), "<td>x</td>");
    assert_eq!(fragment_html("x<tbody>", "table"), "x<tbody></tbody>");
}

#[test]
fn test_select_context() {
    assert_eq!(
        fragment_html("<option>a<option>b", "select"),
        "<option>a</option><option>b</option>"
    );
}

#[test]
fn test_rcdata_context() {
    assert_eq!(
        fragment_html("<b>&amp;</b>", "title"),
        "&lt;b&gt;&amp;&lt;/b&gt;"
    );
    assert_eq!(fragment_html("<b>&amp;</b>", "textarea"), "&lt;b&gt;&amp;&lt;/b&gt;");
}

#[test]
fn test_raw_text_contexts() {
    assert_eq!(fragment_html("<b>&amp;</b>", "style"), "&lt;b&gt;&amp;amp;&lt;/b&gt;");
    assert_eq!(fragment_html("a<b", "script"), "a&lt;b");
    assert_eq!(fragment_html("<p>", "plaintext"), "&lt;p&gt;");
}

#[test]
fn test_svg_context() {
    let (tree, fragment) =
        parse_fragment_in_context("<path d='x'/><foreignobject/>", "svg", ParserOptions::default());
    let children = tree.children(fragment);
    assert_eq!(children.len(), 2);
    let path = tree.as_element(children[0]).unwrap();
    assert_eq!(path.tag_name, "path");
    assert_eq!(path.namespace, Namespace::Svg);
    assert_eq!(tree.as_element(children[1]).unwrap().tag_name, "foreignObject");
}

#[test]
fn test_math_context() {
    let (tree, fragment) =
        parse_fragment_in_context("<mi>x</mi>", "math", ParserOptions::default());
    let mi = tree.first_child(fragment).unwrap();
    assert_eq!(tree.as_element(mi).unwrap().namespace, Namespace::MathMl);
}

#[test]
fn test_fragment_through_streaming_parser() {
    let mut parser = HTMLParser::new_fragment(DomTree::new(), Some("ul"), ParserOptions::default());
    assert_eq!(parser.write("<li>a", false), ParseStatus::NeedsInput);
    assert!(parser.fragment().is_none());
    assert_eq!(parser.write("<li>b", true), ParseStatus::Finished);
    let fragment = parser.fragment().unwrap();
    let tree = parser.into_adapter();
    assert_eq!(
        serialize(&tree, fragment, SerializerOptions::default()),
        "<li>a</li><li>b</li>"
    );
}

#[test]
fn test_form_context_sets_form_pointer() {
    assert_eq!(fragment_html("<form><input>", "form"), "<input>");
}

#[test]
fn test_serialize_outer() {
    let tree = parse_document("<p class=a>x<br></p>", ParserOptions::default());
    let body = tree.body().unwrap();
    let p = tree.first_child(body).unwrap();
    assert_eq!(
        serialize_outer(&tree, p, SerializerOptions::default()),
        "<p class=\"a\">x<br></p>"
    );
}

#[test]
fn test_serialize_escapes_attributes_and_text() {
    assert_eq!(
        template_fragment_html("<a title='&quot;x&quot; &amp; <y>'>1 &lt; 2&nbsp;</a>"),
        "<a title=\"&quot;x&quot; &amp; <y>\">1 &lt; 2&nbsp;</a>"
    );
}

#[test]
fn test_serialize_raw_text_unescaped() {
    let tree = parse_document("<style>a > b & c</style>", ParserOptions::default());
    assert_eq!(
        serialize(&tree, tree.head().unwrap(), SerializerOptions::default()),
        "<style>a > b & c</style>"
    );
}

#[test]
fn test_serialize_noscript_follows_scripting_flag() {
    let tree = parse_document("<body><noscript><b>&amp;</b></noscript>", ParserOptions::default());
    let body = tree.body().unwrap();
    assert_eq!(
        serialize(&tree, body, SerializerOptions::default()),
        "<noscript><b>&amp;</b></noscript>"
    );
}

#[test]
fn test_serialize_doctype_and_comments() {
    let tree = parse_document(
        "<!DOCTYPE html SYSTEM 'about:legacy-compat'><!--x-->",
        ParserOptions::default(),
    );
    let html = serialize(&tree, NodeId::ROOT, SerializerOptions::default());
    assert!(html.starts_with("<!DOCTYPE html><!--x--><html>"));
}

#[test]
fn test_serialize_foreign_attributes() {
    assert_eq!(
        template_fragment_html("<svg xmlns:xlink=a xlink:href=b xml:lang=c></svg>"),
        "<svg xmlns:xlink=\"a\" xlink:href=\"b\" xml:lang=\"c\"></svg>"
    );
}
