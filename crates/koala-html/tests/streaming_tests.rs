//! Integration tests for chunked input, script pauses, locations and error
//! reporting.

use std::cell::RefCell;
use std::rc::Rc;

use koala_dom::{DomTree, NodeId};
use koala_html::{
    HTMLParser, InsertionMode, ParseError, ParseErrorCode, ParseStatus, ParserOptions,
    SerializerOptions, parse_document, serialize,
};

const SAMPLE: &str = "<!DOCTYPE html>\r\n<html><head><title>A &amp; B</title>\
    <script>var x = '<p>';</script></head><body><table>x<tr><td>&notin; 1</td></tr></table>\
    <p>one<b>two<p>three</b></p><svg viewBox='0 0 1 1'><path/></svg><!-- done --></body></html>";

fn document_html(tree: &DomTree) -> String {
    serialize(tree, tree.root(), SerializerOptions::default())
}

fn find_element(tree: &DomTree, from: NodeId, tag: &str) -> Option<NodeId> {
    if let Some(data) = tree.as_element(from)
        && data.tag_name == tag
    {
        return Some(from);
    }
    tree.children(from)
        .iter()
        .find_map(|&child| find_element(tree, child, tag))
}

#[test]
fn test_every_chunking_builds_the_same_tree() {
    let expected = document_html(&parse_document(SAMPLE, ParserOptions::default()));

    for size in [1, 2, 3, 7, 16] {
        let mut parser = HTMLParser::new(DomTree::new(), ParserOptions::default());
        let chars: Vec<char> = SAMPLE.chars().collect();
        let chunks: Vec<String> = chars.chunks(size).map(|c| c.iter().collect()).collect();
        let mut status = ParseStatus::NeedsInput;
        for (i, chunk) in chunks.iter().enumerate() {
            status = parser.write(chunk, i == chunks.len() - 1);
        }
        assert_eq!(status, ParseStatus::Finished);
        assert_eq!(document_html(&parser.into_adapter()), expected, "chunk size {size}");
    }
}

#[test]
fn test_needs_input_between_chunks() {
    let mut parser = HTMLParser::new(DomTree::new(), ParserOptions::default());
    assert_eq!(parser.write("<table>", false), ParseStatus::NeedsInput);
    assert_eq!(parser.insertion_mode(), InsertionMode::InTable);
    assert_eq!(parser.write("<tr><td>x", false), ParseStatus::NeedsInput);
    assert_eq!(parser.insertion_mode(), InsertionMode::InCell);
    assert_eq!(parser.write("", true), ParseStatus::Finished);
    assert!(parser.is_stopped());
}

#[test]
fn test_write_after_finish_is_ignored() {
    let mut parser = HTMLParser::new(DomTree::new(), ParserOptions::default());
    assert_eq!(parser.write("<p>a", true), ParseStatus::Finished);
    assert_eq!(parser.write("<p>b", true), ParseStatus::Finished);
    let tree = parser.into_adapter();
    assert_eq!(tree.text_content(tree.root()), "a");
}

#[test]
fn test_stop_closes_open_elements() {
    let mut parser = HTMLParser::new(DomTree::new(), ParserOptions::default());
    assert_eq!(parser.write("<div><p>a", false), ParseStatus::NeedsInput);
    parser.stop();
    assert_eq!(parser.status(), ParseStatus::Finished);
    assert_eq!(parser.write("b", true), ParseStatus::Finished);
    let tree = parser.into_adapter();
    let body = tree.body().unwrap();
    assert_eq!(
        serialize(&tree, body, SerializerOptions::default()),
        "<div><p>a</p></div>"
    );
}

#[test]
fn test_pause_on_script_and_insert() {
    let options = ParserOptions::default().with_pause_on_script(true);
    let mut parser = HTMLParser::new(DomTree::new(), options);

    assert_eq!(parser.write("<script>a</script><p>b", true), ParseStatus::Paused);
    let script = parser.paused_script().unwrap();
    assert_eq!(parser.adapter().as_element(script).unwrap().tag_name, "script");
    assert_eq!(parser.adapter().text_content(script), "a");

    parser.insert_at_current_position("<i>w</i>");
    assert_eq!(parser.resume(), ParseStatus::Finished);

    let tree = parser.into_adapter();
    assert_eq!(
        document_html(&tree),
        "<html><head><script>a</script></head><body><i>w</i><p>b</p></body></html>"
    );
}

#[test]
fn test_pause_buffers_later_writes() {
    let options = ParserOptions::default().with_pause_on_script(true);
    let mut parser = HTMLParser::new(DomTree::new(), options);

    assert_eq!(parser.write("<body><script>1</script>", false), ParseStatus::Paused);
    assert_eq!(parser.write("<p>x", false), ParseStatus::Paused);
    assert_eq!(parser.resume(), ParseStatus::NeedsInput);
    assert_eq!(parser.write("<script>2</script>", true), ParseStatus::Paused);
    assert_eq!(parser.resume(), ParseStatus::Finished);

    let tree = parser.into_adapter();
    let body = tree.body().unwrap();
    assert_eq!(
        serialize(&tree, body, SerializerOptions::default()),
        "<script>1</script><p>x<script>2</script></p>"
    );
}

#[test]
fn test_convenience_entry_point_resumes_scripts() {
    let options = ParserOptions::default().with_pause_on_script(true);
    let tree = parse_document("<script>1</script><script>2</script>x", options);
    assert_eq!(tree.text_content(tree.body().unwrap()), "x");
}

#[test]
fn test_element_locations() {
    let options = ParserOptions::default().with_source_code_location_info(true);
    let tree = parse_document("<p id=x>ab</p><div>c", options);

    let p = find_element(&tree, tree.root(), "p").unwrap();
    let location = tree.location(p).unwrap();
    let start_tag = location.start_tag.as_ref().unwrap();
    assert_eq!((start_tag.span.start_offset, start_tag.span.end_offset), (0, 8));
    let id = location.attr("id").unwrap();
    assert_eq!((id.start_offset, id.end_offset), (3, 7));
    let end_tag = location.end_tag.unwrap();
    assert_eq!((end_tag.start_offset, end_tag.end_offset), (10, 14));
    assert_eq!((location.span.start_offset, location.span.end_offset), (0, 14));

    let text = tree.first_child(p).unwrap();
    let text_location = tree.location(text).unwrap();
    assert_eq!(
        (text_location.span.start_offset, text_location.span.end_offset),
        (8, 10)
    );

    // Closed by end of input: no end tag.
    let div = find_element(&tree, tree.root(), "div").unwrap();
    let div_location = tree.location(div).unwrap();
    assert!(div_location.end_tag.is_none());
    assert_eq!(div_location.span.start_offset, 14);
}

#[test]
fn test_implied_elements_have_no_start_tag() {
    let options = ParserOptions::default().with_source_code_location_info(true);
    let tree = parse_document("<p>a", options);
    let html = tree.document_element().unwrap();
    let location = tree.location(html).unwrap();
    assert!(location.start_tag.is_none());
    assert!(location.end_tag.is_none());
}

#[test]
fn test_implicitly_closed_element_ends_at_next_token() {
    let options = ParserOptions::default().with_source_code_location_info(true);
    let tree = parse_document("<p>a<div>b</div>", options);
    let p = find_element(&tree, tree.root(), "p").unwrap();
    let location = tree.location(p).unwrap();
    assert!(location.end_tag.is_none());
    assert_eq!(location.span.end_offset, 4);
}

#[test]
fn test_no_locations_by_default() {
    let tree = parse_document("<p>a</p>", ParserOptions::default());
    let p = find_element(&tree, tree.root(), "p").unwrap();
    assert!(tree.location(p).is_none());
}

#[test]
fn test_parse_error_callback() {
    let errors: Rc<RefCell<Vec<ParseError>>> = Rc::default();
    let sink = Rc::clone(&errors);
    let options = ParserOptions::default()
        .with_on_parse_error(move |error| sink.borrow_mut().push(error.clone()));
    let _ = parse_document("<p></b>&#0;", options);

    let errors = errors.borrow();
    assert_eq!(errors[0].code, ParseErrorCode::MissingDoctype);
    assert_eq!(errors[0].location.unwrap().start_offset, 0);
    assert!(
        errors
            .iter()
            .any(|e| e.location.is_some_and(|loc| loc.start_offset == 3))
    );
    assert!(
        errors
            .iter()
            .any(|e| e.code == ParseErrorCode::NullCharacterReference)
    );
}

#[test]
fn test_errors_in_order_of_input() {
    let errors: Rc<RefCell<Vec<ParseError>>> = Rc::default();
    let sink = Rc::clone(&errors);
    let options = ParserOptions::default()
        .with_on_parse_error(move |error| sink.borrow_mut().push(error.clone()));
    let _ = parse_document("<!DOCTYPE html><p id=a id=b></x></p>", options);

    let offsets: Vec<usize> = errors
        .borrow()
        .iter()
        .filter_map(|e| e.location.map(|loc| loc.start_offset))
        .collect();
    assert!(!offsets.is_empty());
    assert!(offsets.windows(2).all(|pair| pair[0] <= pair[1]));
}
