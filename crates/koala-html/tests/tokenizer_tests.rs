//! Integration tests for the HTML tokenizer.

use koala_html::tokenizer::{HTMLTokenizer, TokenCollector, TokenizerResult, TokenizerState};
use koala_html::{ParseErrorCode, Token};

/// Helper to tokenize a string in one chunk and return the tokens
fn tokenize(input: &str) -> Vec<Token> {
    collect(&[input]).tokens
}

/// Helper to tokenize a sequence of chunks
fn collect(chunks: &[&str]) -> TokenCollector {
    let mut tokenizer = HTMLTokenizer::new();
    let mut sink = TokenCollector::new();
    for (i, chunk) in chunks.iter().enumerate() {
        tokenizer.write(chunk, i == chunks.len() - 1);
        let _ = tokenizer.run(&mut sink);
    }
    sink
}

/// Helper to concatenate all character data in a token stream
fn text_of(tokens: &[Token]) -> String {
    tokens
        .iter()
        .filter_map(|token| match token {
            Token::Character(text)
            | Token::WhitespaceCharacter(text)
            | Token::NullCharacter(text) => Some(text.chars.as_str()),
            _ => None,
        })
        .collect()
}

fn error_codes(chunks: &[&str]) -> Vec<ParseErrorCode> {
    collect(chunks).errors.into_iter().map(|e| e.code).collect()
}

#[test]
fn test_plain_text() {
    let tokens = tokenize("Hello");
    assert_eq!(tokens.len(), 2);
    assert!(matches!(&tokens[0], Token::Character(text) if text.chars == "Hello"));
    assert!(matches!(tokens[1], Token::EndOfFile { .. }));
}

#[test]
fn test_character_runs_split_by_kind() {
    let tokens = tokenize("a b\0");
    assert_eq!(tokens.len(), 5);
    assert!(matches!(&tokens[0], Token::Character(text) if text.chars == "a"));
    assert!(matches!(&tokens[1], Token::WhitespaceCharacter(text) if text.chars == " "));
    assert!(matches!(&tokens[2], Token::Character(text) if text.chars == "b"));
    assert!(matches!(&tokens[3], Token::NullCharacter(text) if text.chars == "\0"));
}

#[test]
fn test_doctype() {
    let tokens = tokenize("<!DOCTYPE html>");
    assert_eq!(tokens.len(), 2);
    match &tokens[0] {
        Token::Doctype(doctype) => {
            assert_eq!(doctype.name.as_deref(), Some("html"));
            assert_eq!(doctype.public_id, None);
            assert!(!doctype.force_quirks);
        }
        _ => panic!("Expected DOCTYPE token"),
    }
}

#[test]
fn test_doctype_with_identifiers() {
    let tokens = tokenize(
        r#"<!DOCTYPE html PUBLIC "-//W3C//DTD HTML 4.01//EN" "http://www.w3.org/TR/html4/strict.dtd">"#,
    );
    match &tokens[0] {
        Token::Doctype(doctype) => {
            assert_eq!(doctype.public_id.as_deref(), Some("-//W3C//DTD HTML 4.01//EN"));
            assert_eq!(
                doctype.system_id.as_deref(),
                Some("http://www.w3.org/TR/html4/strict.dtd")
            );
        }
        _ => panic!("Expected DOCTYPE token"),
    }
}

#[test]
fn test_doctype_missing_name_forces_quirks() {
    let tokens = tokenize("<!DOCTYPE>");
    match &tokens[0] {
        Token::Doctype(doctype) => {
            assert_eq!(doctype.name, None);
            assert!(doctype.force_quirks);
        }
        _ => panic!("Expected DOCTYPE token"),
    }
}

#[test]
fn test_start_tag() {
    let tokens = tokenize("<DIV>");
    assert_eq!(tokens.len(), 2);
    match &tokens[0] {
        Token::StartTag(tag) => {
            assert_eq!(tag.name, "div");
            assert!(!tag.self_closing);
            assert!(tag.attrs.is_empty());
        }
        _ => panic!("Expected StartTag token"),
    }
}

#[test]
fn test_end_tag() {
    let tokens = tokenize("</div>");
    assert_eq!(tokens.len(), 2);
    assert!(matches!(&tokens[0], Token::EndTag(tag) if tag.name == "div"));
}

#[test]
fn test_self_closing_tag() {
    let tokens = tokenize("<br/>");
    match &tokens[0] {
        Token::StartTag(tag) => {
            assert_eq!(tag.name, "br");
            assert!(tag.self_closing);
        }
        _ => panic!("Expected self-closing StartTag token"),
    }
}

#[test]
fn test_attributes() {
    let tokens = tokenize(r#"<a href="x" title='y' data-z=w checked>"#);
    match &tokens[0] {
        Token::StartTag(tag) => {
            assert_eq!(tag.get_attribute("href"), Some("x"));
            assert_eq!(tag.get_attribute("title"), Some("y"));
            assert_eq!(tag.get_attribute("data-z"), Some("w"));
            assert_eq!(tag.get_attribute("checked"), Some(""));
            assert_eq!(tag.attrs.len(), 4);
        }
        _ => panic!("Expected StartTag token"),
    }
}

#[test]
fn test_duplicate_attribute_keeps_first() {
    let tokens = tokenize(r#"<p id="a" ID="b">"#);
    match &tokens[0] {
        Token::StartTag(tag) => {
            assert_eq!(tag.attrs.len(), 1);
            assert_eq!(tag.get_attribute("id"), Some("a"));
        }
        _ => panic!("Expected StartTag token"),
    }
    assert!(error_codes(&[r#"<p id="a" ID="b">"#]).contains(&ParseErrorCode::DuplicateAttribute));
}

#[test]
fn test_comment() {
    let tokens = tokenize("<!-- hi -->");
    assert!(matches!(&tokens[0], Token::Comment(comment) if comment.data == " hi "));
}

#[test]
fn test_bogus_comment() {
    let tokens = tokenize("<?xml version?>");
    assert!(matches!(&tokens[0], Token::Comment(comment) if comment.data == "?xml version?"));
    assert!(
        error_codes(&["<?xml version?>"])
            .contains(&ParseErrorCode::UnexpectedQuestionMarkInsteadOfTagName)
    );
}

#[test]
fn test_cdata_in_html_content_is_a_comment() {
    let tokens = tokenize("<![CDATA[x]]>");
    assert!(matches!(&tokens[0], Token::Comment(comment) if comment.data == "[CDATA[x]]"));
}

#[test]
fn test_named_character_references() {
    assert_eq!(text_of(&tokenize("&amp;&lt;&gt;&quot;")), "&<>\"");
    assert_eq!(text_of(&tokenize("&copy 2024")), "\u{00A9} 2024");
    assert_eq!(text_of(&tokenize("&notit;")), "\u{00AC}it;");
    assert_eq!(text_of(&tokenize("&unknown;")), "&unknown;");
}

#[test]
fn test_numeric_character_references() {
    assert_eq!(text_of(&tokenize("&#65;&#x42;&#X43;")), "ABC");
    assert_eq!(text_of(&tokenize("&#0;")), "\u{FFFD}");
    assert_eq!(text_of(&tokenize("&#x80;")), "\u{20AC}");
    assert_eq!(text_of(&tokenize("&#x110000;")), "\u{FFFD}");
    assert!(error_codes(&["&#0;"]).contains(&ParseErrorCode::NullCharacterReference));
}

#[test]
fn test_character_reference_in_attribute() {
    let tokens = tokenize(r#"<a href="?a=1&notit=2&amp;b">"#);
    match &tokens[0] {
        Token::StartTag(tag) => assert_eq!(tag.get_attribute("href"), Some("?a=1&notit=2&b")),
        _ => panic!("Expected StartTag token"),
    }
}

#[test]
fn test_newline_normalization() {
    assert_eq!(text_of(&tokenize("a\r\nb\rc")), "a\nb\nc");
}

#[test]
fn test_chunk_boundaries_do_not_change_tokens() {
    let whole = tokenize(r#"<div class="a">x &amp; y<!-- c --></div>"#);
    let chunks = ["<di", "v cla", "ss=\"a\">x &a", "mp; y<!-", "- c --></d", "iv>"];
    let chunked = collect(&chunks).tokens;
    assert_eq!(whole, chunked);
}

#[test]
fn test_cr_lf_split_across_chunks() {
    let tokens = collect(&["a\r", "\nb"]).tokens;
    assert_eq!(text_of(&tokens), "a\nb");
}

#[test]
fn test_needs_input_until_last_chunk() {
    let mut tokenizer = HTMLTokenizer::new();
    let mut sink = TokenCollector::new();
    tokenizer.write("<p>abc", false);
    assert_eq!(tokenizer.run(&mut sink), TokenizerResult::NeedsInput);
    tokenizer.write("", true);
    assert_eq!(tokenizer.run(&mut sink), TokenizerResult::Done);
    assert!(tokenizer.is_done());
    assert!(matches!(sink.tokens.last(), Some(Token::EndOfFile { .. })));
}

#[test]
fn test_flush_and_stop_delivers_held_text() {
    let mut tokenizer = HTMLTokenizer::new();
    let mut sink = TokenCollector::new();
    tokenizer.write("<p>ab", false);
    assert_eq!(tokenizer.run(&mut sink), TokenizerResult::NeedsInput);
    assert_eq!(text_of(&sink.tokens), "");

    tokenizer.flush_and_stop(&mut sink);
    assert!(tokenizer.is_done());
    assert_eq!(text_of(&sink.tokens), "ab");
    assert!(!matches!(sink.tokens.last(), Some(Token::EndOfFile { .. })));

    tokenizer.write("cd", true);
    assert_eq!(tokenizer.run(&mut sink), TokenizerResult::Done);
    assert_eq!(text_of(&sink.tokens), "ab");
}

#[test]
fn test_script_data_is_raw() {
    let tokens = tokenize("<script>if (a < b) { x = '</p>'; }</script>");
    assert!(matches!(&tokens[0], Token::StartTag(tag) if tag.name == "script"));
    assert_eq!(text_of(&tokens), "if (a < b) { x = '</p>'; }");
    assert!(matches!(&tokens[tokens.len() - 2], Token::EndTag(tag) if tag.name == "script"));
}

#[test]
fn test_rcdata_decodes_references() {
    let tokens = tokenize("<title>a &amp; <b></title>");
    assert_eq!(text_of(&tokens), "a & <b>");
}

#[test]
fn test_without_state_switching() {
    let mut tokenizer = HTMLTokenizer::new();
    let mut sink = TokenCollector::without_state_switching();
    tokenizer.write("<style><b></style>", true);
    let _ = tokenizer.run(&mut sink);
    assert!(sink
        .tokens
        .iter()
        .any(|token| matches!(token, Token::StartTag(tag) if tag.name == "b")));
}

#[test]
fn test_set_state_plaintext() {
    let mut tokenizer = HTMLTokenizer::new();
    tokenizer.set_state(TokenizerState::PLAINTEXT);
    let mut sink = TokenCollector::without_state_switching();
    tokenizer.write("<p>&amp;</p>", true);
    let _ = tokenizer.run(&mut sink);
    assert_eq!(text_of(&sink.tokens), "<p>&amp;</p>");
}

#[test]
fn test_case_preservation() {
    let mut tokenizer = HTMLTokenizer::new().with_case_preservation(true, true);
    let mut sink = TokenCollector::new();
    tokenizer.write("<AutoMate DataX=1>", true);
    let _ = tokenizer.run(&mut sink);
    match &sink.tokens[0] {
        Token::StartTag(tag) => {
            assert_eq!(tag.name, "AutoMate");
            assert_eq!(tag.attrs[0].name, "DataX");
        }
        _ => panic!("Expected StartTag token"),
    }
}

#[test]
fn test_token_locations() {
    let mut tokenizer = HTMLTokenizer::new().with_locations(true);
    let mut sink = TokenCollector::new();
    tokenizer.write("<p id=a>\nhi</p>", true);
    let _ = tokenizer.run(&mut sink);

    let start = sink.tokens[0].location().unwrap();
    assert_eq!((start.start_offset, start.end_offset), (0, 8));
    match &sink.tokens[0] {
        Token::StartTag(tag) => {
            let attr = tag.location.as_ref().unwrap().attrs["id"];
            assert_eq!((attr.start_offset, attr.end_offset), (3, 7));
        }
        _ => panic!("Expected StartTag token"),
    }

    let text = sink.tokens[2].location().unwrap();
    assert_eq!((text.start_line, text.start_col), (2, 1));
    assert_eq!(text.end_offset, 11);

    let end = sink.tokens[3].location().unwrap();
    assert_eq!((end.start_offset, end.end_offset), (11, 15));
}

#[test]
fn test_errors_carry_locations() {
    let mut tokenizer = HTMLTokenizer::new().with_locations(true);
    let mut sink = TokenCollector::new();
    tokenizer.write("ab</>", true);
    let _ = tokenizer.run(&mut sink);
    let error = sink
        .errors
        .iter()
        .find(|e| e.code == ParseErrorCode::MissingEndTagName)
        .unwrap();
    assert!(error.location.is_some());
}

#[test]
fn test_eof_in_tag() {
    let tokens = tokenize("<div class=");
    assert_eq!(tokens.len(), 1);
    assert!(error_codes(&["<div class="]).contains(&ParseErrorCode::EofInTag));
}
