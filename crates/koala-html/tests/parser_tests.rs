//! Integration tests for the HTML parser.

use koala_dom::{DocumentMode, DomTree, Namespace, Node, NodeId, NodeType};
use koala_html::{ParserOptions, SerializerOptions, parse_document, serialize};

/// Helper to parse HTML and return the DOM tree
fn parse(html: &str) -> DomTree {
    parse_document(html, ParserOptions::default())
}

/// Helper to parse HTML and serialize the body's children
fn body_html(html: &str) -> String {
    let tree = parse(html);
    let body = tree.body().expect("document has a body");
    serialize(&tree, body, SerializerOptions::default())
}

/// Helper to parse HTML and serialize the whole document
fn document_html(html: &str) -> String {
    let tree = parse(html);
    serialize(&tree, tree.root(), SerializerOptions::default())
}

/// Helper to get element by tag name (first match, depth-first)
fn find_element(tree: &DomTree, from: NodeId, tag: &str) -> Option<NodeId> {
    if let Some(data) = tree.as_element(from)
        && data.tag_name == tag
    {
        return Some(from);
    }
    for &child_id in tree.children(from) {
        if let Some(found) = find_element(tree, child_id, tag) {
            return Some(found);
        }
    }
    None
}

/// Helper to find all elements with a given tag name under a subtree
fn find_all_elements(tree: &DomTree, from: NodeId, tag: &str) -> Vec<NodeId> {
    let mut result = Vec::new();
    if let Some(data) = tree.as_element(from)
        && data.tag_name == tag
    {
        result.push(from);
    }
    for &child_id in tree.children(from) {
        result.extend(find_all_elements(tree, child_id, tag));
    }
    result
}

/// Helper to read an attribute value
fn attr<'a>(tree: &'a DomTree, id: NodeId, name: &str) -> Option<&'a str> {
    tree.as_element(id)?
        .attrs
        .iter()
        .find(|attr| attr.name == name)
        .map(|attr| attr.value.as_str())
}

/// Helper to get a node reference
fn get_node(tree: &DomTree, id: NodeId) -> &Node {
    tree.get(id).expect("Node not found")
}

#[test]
fn test_document_structure() {
    let tree = parse("<!DOCTYPE html><html><head></head><body></body></html>");

    // Root should be Document
    let root = get_node(&tree, NodeId::ROOT);
    assert!(matches!(root.node_type, NodeType::Document));

    // Document should have a doctype and an html child
    let children = tree.children(NodeId::ROOT);
    assert_eq!(children.len(), 2);
    assert!(tree.as_doctype(children[0]).is_some());

    let html_id = find_element(&tree, NodeId::ROOT, "html").unwrap();
    assert!(find_element(&tree, html_id, "head").is_some());
    assert!(find_element(&tree, html_id, "body").is_some());
}

#[test]
fn test_root_element_is_child_of_document() {
    for html in ["<html><p>x", "<b><i><p>X</p></i></b>", "<!DOCTYPE html>text"] {
        let tree = parse(html);
        let root = tree.document_element().expect("document has a root element");
        assert_eq!(tree.parent(root), Some(NodeId::ROOT), "{html}");
        assert_eq!(tree.as_element(root).unwrap().tag_name, "html");
    }
    assert_eq!(
        body_html("<b><i><p>X</p></i></b>"),
        "<b><i><p>X</p></i></b>"
    );
}

#[test]
fn test_unknown_end_tag_matches_by_name() {
    assert_eq!(
        body_html("<x-card><x-title>a</x-card>b"),
        "<x-card><x-title>a</x-title></x-card>b"
    );
    assert_eq!(body_html("<x-card>a</x-other>b"), "<x-card>ab</x-card>");
    assert_eq!(body_html("<x-card><div>a</x-card>b"), "<x-card><div>ab</div></x-card>");
}

#[test]
fn test_empty_document_gets_implied_elements() {
    assert_eq!(document_html(""), "<html><head></head><body></body></html>");
}

#[test]
fn test_round_trip() {
    let html = "<!DOCTYPE html><html lang=\"en\"><head><title>T</title></head>\
                <body><p class=\"a\">x &amp; y</p><!--c--></body></html>";
    assert_eq!(document_html(html), html);
}

#[test]
fn test_text_node() {
    let tree = parse("<html><body>Hello World</body></html>");
    let body_id = tree.body().unwrap();
    assert_eq!(tree.text_content(body_id), "Hello World");
}

#[test]
fn test_comment_node() {
    let tree = parse("<html><body><!-- test comment --></body></html>");
    let body_id = tree.body().unwrap();

    let has_comment = tree
        .children(body_id)
        .iter()
        .any(|&child_id| tree.as_comment(child_id) == Some(" test comment "));
    assert!(has_comment);
}

#[test]
fn test_comments_outside_html() {
    assert_eq!(
        document_html("<!--a--><p>x</p><!--b--></body><!--c--></html><!--d-->"),
        "<!--a--><html><head></head><body><p>x</p><!--b--></body><!--c--></html><!--d-->"
    );
}

#[test]
fn test_element_attributes() {
    let tree = parse(r#"<div id="main" class="container"></div>"#);
    let div_id = find_element(&tree, NodeId::ROOT, "div").unwrap();
    assert_eq!(attr(&tree, div_id, "id"), Some("main"));
    assert_eq!(attr(&tree, div_id, "class"), Some("container"));
}

#[test]
fn test_attributes_merged_onto_html_and_body() {
    let tree = parse(r#"<html a="1"><body b="2"><html a="x" c="3"><body d="4">"#);
    let html_id = tree.document_element().unwrap();
    let body_id = tree.body().unwrap();
    assert_eq!(attr(&tree, html_id, "a"), Some("1"));
    assert_eq!(attr(&tree, html_id, "c"), Some("3"));
    assert_eq!(attr(&tree, body_id, "b"), Some("2"));
    assert_eq!(attr(&tree, body_id, "d"), Some("4"));
}

#[test]
fn test_void_elements() {
    assert_eq!(
        body_html(r#"<input type="text"><br>x<img src="a.png"></img>"#),
        "<input type=\"text\"><br>x<img src=\"a.png\">"
    );
}

#[test]
fn test_end_br_becomes_start_br() {
    assert_eq!(body_html("a</br>b"), "a<br>b");
}

#[test]
fn test_head_content() {
    let tree = parse(r#"<meta charset="UTF-8"><title>My Page</title><link rel=x>body"#);
    let head = tree.head().unwrap();
    assert!(find_element(&tree, head, "meta").is_some());
    assert!(find_element(&tree, head, "link").is_some());
    let title_id = find_element(&tree, head, "title").unwrap();
    assert_eq!(tree.text_content(title_id), "My Page");
    assert_eq!(tree.text_content(tree.body().unwrap()), "body");
}

#[test]
fn test_whitespace_between_head_and_body() {
    assert_eq!(
        document_html("<html><head></head> <body></body></html>"),
        "<html><head></head> <body></body></html>"
    );
}

#[test]
fn test_whitespace_preserved_in_text() {
    assert_eq!(body_html("  hello  world  "), "hello  world  ");
    assert_eq!(body_html("<body>  hello  world  </body>"), "  hello  world  ");
}

#[test]
fn test_multiple_text_nodes_merged() {
    let tree = parse("<body>a&amp;b<!---->c</body>");
    let body_id = tree.body().unwrap();
    let children = tree.children(body_id);
    assert_eq!(children.len(), 3);
    assert_eq!(tree.as_text(children[0]), Some("a&b"));
    assert_eq!(tree.as_text(children[2]), Some("c"));
}

#[test]
fn test_leading_newline_in_pre_is_dropped() {
    assert_eq!(body_html("<pre>\n\nx</pre>"), "<pre>\nx</pre>");
    assert_eq!(body_html("<textarea>\nx</textarea>"), "<textarea>x</textarea>");
}

// ========== Raw text element tests at parser level ==========

#[test]
fn test_style_with_html_like_content() {
    let tree = parse("<html><head><style><div>not a tag</div></style></head><body></body></html>");
    let style = find_element(&tree, tree.root(), "style").unwrap();
    assert_eq!(tree.text_content(style), "<div>not a tag</div>");

    let body = tree.body().unwrap();
    assert!(find_element(&tree, body, "div").is_none());
}

#[test]
fn test_title_content_preserved() {
    let tree = parse("<title>My <test> &amp; Title</title>");
    let title = find_element(&tree, tree.root(), "title").unwrap();
    assert_eq!(tree.text_content(title), "My <test> & Title");
}

#[test]
fn test_script_content_is_raw() {
    let tree = parse("<script>if (a<b) document.write('</p>')</script>");
    let script = find_element(&tree, tree.root(), "script").unwrap();
    assert_eq!(tree.text_content(script), "if (a<b) document.write('</p>')");
}

#[test]
fn test_plaintext_swallows_rest_of_input() {
    assert_eq!(
        body_html("<plaintext><b>x</b></plaintext>"),
        "<plaintext><b>x</b></plaintext></plaintext>"
    );
}

#[test]
fn test_noscript_depends_on_scripting_flag() {
    let html = "<body><noscript><p>x</p></noscript>";
    let scripted = parse_document(html, ParserOptions::default());
    let noscript = find_element(&scripted, scripted.root(), "noscript").unwrap();
    assert!(find_element(&scripted, noscript, "p").is_none());

    let unscripted = parse_document(html, ParserOptions::default().with_scripting_enabled(false));
    let noscript = find_element(&unscripted, unscripted.root(), "noscript").unwrap();
    assert!(find_element(&unscripted, noscript, "p").is_some());
}

// ========== Implied tags ==========

#[test]
fn test_implicit_p_close() {
    assert_eq!(body_html("<p>One<p>Two"), "<p>One</p><p>Two</p>");
    assert_eq!(body_html("<p>One<div>Two</div>"), "<p>One</p><div>Two</div>");
}

#[test]
fn test_stray_end_p_inserts_empty_p() {
    assert_eq!(body_html("a</p>b"), "a<p></p>b");
}

#[test]
fn test_li_implicit_close() {
    assert_eq!(
        body_html("<ul><li>One<li>Two<li>Three</ul>"),
        "<ul><li>One</li><li>Two</li><li>Three</li></ul>"
    );
}

#[test]
fn test_dd_dt_implicit_close() {
    assert_eq!(
        body_html("<dl><dt>A<dd>B<dt>C<dd>D</dl>"),
        "<dl><dt>A</dt><dd>B</dd><dt>C</dt><dd>D</dd></dl>"
    );
}

#[test]
fn test_nested_lists() {
    assert_eq!(
        body_html("<ul><li>A<ul><li>B</ul><li>C</ul>"),
        "<ul><li>A<ul><li>B</li></ul></li><li>C</li></ul>"
    );
}

#[test]
fn test_headings_do_not_nest() {
    assert_eq!(body_html("<h1>a<h2>b</h1>c"), "<h1>a</h1><h2>b</h2>c");
}

#[test]
fn test_nested_forms_ignored() {
    let tree = parse("<form id=a><form id=b><input></form>");
    assert_eq!(find_all_elements(&tree, tree.root(), "form").len(), 1);
}

// ========== Adoption Agency Algorithm Tests ==========

#[test]
fn test_adoption_agency_simple_misnesting() {
    assert_eq!(body_html("<b>1<p>2</b>3</p>"), "<b>1</b><p><b>2</b>3</p>");
}

#[test]
fn test_adoption_agency_no_furthest_block() {
    assert_eq!(body_html("<b>1<i>2</b>3</i>"), "<b>1<i>2</i></b><i>3</i>");
}

#[test]
fn test_adoption_agency_nested_formatting() {
    assert_eq!(
        body_html("<p><b>X<i>Y</b>Z</i></p>"),
        "<p><b>X<i>Y</i></b><i>Z</i></p>"
    );
}

#[test]
fn test_nested_anchor_tags() {
    assert_eq!(body_html("<a>1<a>2</a>3"), "<a>1</a><a>2</a>3");
    assert_eq!(body_html("<a><p>x</a>y"), "<a></a><p><a>x</a>y</p>");
}

#[test]
fn test_formatting_reconstruction_across_blocks() {
    assert_eq!(
        body_html("<b><p>one</p><p>two</p>"),
        "<b><p>one</p><p>two</p></b>"
    );
    assert_eq!(body_html("<i>a<div>b</i>c</div>"), "<i>a</i><div><i>b</i>c</div>");
}

#[test]
fn test_noahs_ark_limits_reconstruction() {
    assert_eq!(
        body_html("<p><b><b><b><b><p>x"),
        "<p><b><b><b><b></b></b></b></b></p><p><b><b><b>x</b></b></b></p>"
    );
}

#[test]
fn test_noahs_ark_compares_attributes() {
    assert_eq!(
        body_html("<p><b a=1><b a=2><b a=1><b a=1><b a=1><p>x"),
        "<p><b a=\"1\"><b a=\"2\"><b a=\"1\"><b a=\"1\"><b a=\"1\"></b></b></b></b></b></p>\
         <p><b a=\"2\"><b a=\"1\"><b a=\"1\"><b a=\"1\">x</b></b></b></b></p>"
    );
}

#[test]
fn test_any_other_end_tag_ignores_special() {
    assert_eq!(body_html("<span><div>x</span>y</div>"), "<span><div>xy</div></span>");
}

// ========== Tables ==========

#[test]
fn test_table_implied_tbody() {
    assert_eq!(
        body_html("<table><tr><td>1<td>2</table>"),
        "<table><tbody><tr><td>1</td><td>2</td></tr></tbody></table>"
    );
}

#[test]
fn test_foster_parenting() {
    assert_eq!(
        body_html("A<table>B<tr>C</table>D"),
        "ABC<table><tbody><tr></tr></tbody></table>D"
    );
}

#[test]
fn test_foster_parented_elements() {
    assert_eq!(
        body_html("<table><b>x<tr><td>y</table>"),
        "<b>x</b><table><tbody><tr><td>y</td></tr></tbody></table>"
    );
}

#[test]
fn test_table_whitespace_stays_in_table() {
    assert_eq!(
        body_html("<table> <tr> <td>x</td> </tr> </table>"),
        "<table> <tbody><tr> <td>x</td> </tr> </tbody></table>"
    );
}

#[test]
fn test_caption_and_colgroup() {
    assert_eq!(
        body_html("<table><caption>c<col><tr><td>x</table>"),
        "<table><caption>c</caption><colgroup><col></colgroup>\
         <tbody><tr><td>x</td></tr></tbody></table>"
    );
}

#[test]
fn test_hidden_input_in_table() {
    assert_eq!(
        body_html("<table><input type=hidden><input></table>"),
        "<input><table><input type=\"hidden\"></table>"
    );
}

#[test]
fn test_table_closes_p_unless_quirks() {
    assert_eq!(
        body_html("<!DOCTYPE html><p><table></table>"),
        "<p></p><table></table>"
    );
    assert_eq!(body_html("<p><table></table>"), "<p><table></table></p>");
}

// ========== Select ==========

#[test]
fn test_select_options() {
    assert_eq!(
        body_html("<select><option>a<option>b<optgroup><option>c</select>"),
        "<select><option>a</option><option>b</option><optgroup><option>c</option></optgroup></select>"
    );
}

#[test]
fn test_select_ignores_other_tags() {
    assert_eq!(
        body_html("<select><b>x</b><div>y</select>"),
        "<select>xy</select>"
    );
}

#[test]
fn test_select_in_table_closed_by_cell() {
    assert_eq!(
        body_html("<table><tr><td><select><option>a<td>b</table>"),
        "<table><tbody><tr><td><select><option>a</option></select></td><td>b</td></tr></tbody></table>"
    );
}

// ========== Template ==========

#[test]
fn test_template_contents() {
    let tree = parse("<template><tr><td>x</td></tr></template>");
    let head = tree.head().unwrap();
    let template = find_element(&tree, head, "template").unwrap();
    assert!(tree.children(template).is_empty());
    let contents = tree.template_contents(template).unwrap();
    assert!(matches!(
        get_node(&tree, contents).node_type,
        NodeType::DocumentFragment
    ));
    assert_eq!(
        serialize(&tree, template, SerializerOptions::default()),
        "<tr><td>x</td></tr>"
    );
}

#[test]
fn test_nested_templates() {
    assert_eq!(
        body_html("<body><template>a<template>b</template>c</template>"),
        "<template>a<template>b</template>c</template>"
    );
}

// ========== Frameset ==========

#[test]
fn test_frameset() {
    assert_eq!(
        document_html("<frameset><frame><noframes>x</noframes></frameset>"),
        "<html><head></head><frameset><frame><noframes>x</noframes></frameset></html>"
    );
}

#[test]
fn test_frameset_ignored_after_content() {
    let tree = parse("<p>x</p><frameset>");
    assert!(find_element(&tree, tree.root(), "frameset").is_none());
}

// ========== Foreign content ==========

#[test]
fn test_svg_case_adjustment() {
    let tree = parse("<svg viewbox='0 0 1 1'><foreignobject><p>x</p></foreignobject></svg>");
    let svg = find_element(&tree, tree.root(), "svg").unwrap();
    assert_eq!(tree.as_element(svg).unwrap().namespace, Namespace::Svg);
    assert_eq!(attr(&tree, svg, "viewBox"), Some("0 0 1 1"));

    let foreign_object = find_element(&tree, svg, "foreignObject").unwrap();
    let p = find_element(&tree, foreign_object, "p").unwrap();
    assert_eq!(tree.as_element(p).unwrap().namespace, Namespace::Html);
}

#[test]
fn test_mathml() {
    let tree = parse("<math definitionurl=x><mi>x</mi></math>");
    let math = find_element(&tree, tree.root(), "math").unwrap();
    assert_eq!(tree.as_element(math).unwrap().namespace, Namespace::MathMl);
    assert_eq!(attr(&tree, math, "definitionURL"), Some("x"));
    let mi = find_element(&tree, math, "mi").unwrap();
    assert_eq!(tree.as_element(mi).unwrap().namespace, Namespace::MathMl);
}

#[test]
fn test_foreign_breakout() {
    assert_eq!(body_html("<svg><g><p>x"), "<svg><g></g></svg><p>x</p>");
}

#[test]
fn test_foreign_self_closing_and_xlink() {
    let tree = parse("<svg><a xlink:href='#x'/><circle/></svg>");
    let a = find_element(&tree, tree.root(), "a").unwrap();
    let href = &tree.as_element(a).unwrap().attrs[0];
    assert_eq!(href.namespace, Some(Namespace::XLink));
    assert_eq!(
        body_html("<svg><a xlink:href='#x'/><circle/></svg>"),
        "<svg><a xlink:href=\"#x\"></a><circle></circle></svg>"
    );
}

#[test]
fn test_cdata_in_foreign_content() {
    let tree = parse("<svg><![CDATA[a<b]]></svg>");
    let svg = find_element(&tree, tree.root(), "svg").unwrap();
    assert_eq!(tree.text_content(svg), "a<b");
}

// ========== Document mode ==========

#[test]
fn test_document_modes() {
    assert_eq!(parse("<p>").mode(), DocumentMode::Quirks);
    assert_eq!(parse("<!DOCTYPE html><p>").mode(), DocumentMode::NoQuirks);
    assert_eq!(
        parse(r#"<!DOCTYPE html PUBLIC "-//W3C//DTD HTML 4.01 Transitional//EN">"#).mode(),
        DocumentMode::Quirks
    );
    assert_eq!(
        parse(
            r#"<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.0 Transitional//EN" "http://www.w3.org/TR/xhtml1/DTD/xhtml1-transitional.dtd">"#
        )
        .mode(),
        DocumentMode::LimitedQuirks
    );
}

// ========== Options ==========

#[test]
fn test_self_close_option() {
    let options = ParserOptions::default()
        .with_self_close_enabled(true)
        .with_uppercase_tag_enabled(true);
    let tree = parse_document("<AutoMate/>x<div/>y", options);
    let body = tree.body().unwrap();
    let serializer_options = SerializerOptions {
        self_close_enabled: true,
        ..SerializerOptions::default()
    };
    assert_eq!(
        serialize(&tree, body, serializer_options),
        "<AutoMate/>x<div/>y"
    );
}

#[test]
fn test_self_close_ignored_by_default() {
    assert_eq!(body_html("<div/>x"), "<div>x</div>");
}

#[test]
fn test_uppercase_attributes() {
    let options = ParserOptions::default().with_uppercase_attr_enabled(true);
    let tree = parse_document("<div DataId=1>", options);
    let div = find_element(&tree, tree.root(), "div").unwrap();
    assert_eq!(attr(&tree, div, "DataId"), Some("1"));
}

#[test]
fn test_entities() {
    assert_eq!(
        parse("&lt;&amp;&gt; &copy; &#x263A; &notin; &zzzz;")
            .text_content(NodeId::ROOT),
        "<&> \u{00A9} \u{263A} \u{2209} &zzzz;"
    );
}
