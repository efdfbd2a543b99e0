//! Koala CLI - HTML parsing and debugging tool
//!
//! Usage:
//!   koala <file>              Parse and display the DOM tree
//!   koala <file> --serialize  Print the tree serialized back to HTML
//!   koala <file> --json       Output the DOM as JSON
//!   koala <file> --tokens     Show HTML tokens
//!   koala <file> --errors     Show parse errors
//!
//! Examples:
//!   koala index.html
//!   koala index.html --json --locations
//!   koala --html '<td>x' --context tr --serialize

use std::cell::RefCell;
use std::fs;
use std::rc::Rc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use koala_dom::{DomTree, NodeId, NodeType};
use koala_html::tokenizer::{HTMLTokenizer, TokenCollector, TokenizerState};
use koala_html::{
    HTMLParser, ParseError, ParserOptions, SerializerOptions, TagId, parse_document, print_tree,
    serialize,
};
use owo_colors::OwoColorize;
use serde_json::{Map, Value, json};

/// Koala: streaming HTML5 parser and serializer
#[derive(Parser, Debug)]
#[command(name = "koala")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Print the DOM tree of a file
    koala ./index.html

    # Parse inline HTML and serialize it back
    koala --html '<p>One<p>Two' --serialize

    # Parse a fragment in the context of a table row
    koala --html '<td>x' --context tr

    # JSON dump with source locations
    koala ./index.html --json --locations
"#)]
struct Cli {
    /// Path to an HTML file
    #[arg(value_name = "FILE")]
    path: Option<String>,

    /// Parse HTML string directly instead of a file
    #[arg(long, value_name = "HTML")]
    html: Option<String>,

    /// Parse as a fragment (in a <template> unless --context is given)
    #[arg(long)]
    fragment: bool,

    /// Context element for fragment parsing
    #[arg(long, value_name = "TAG")]
    context: Option<String>,

    /// Print the tree serialized back to HTML
    #[arg(long)]
    serialize: bool,

    /// Print the tree as JSON
    #[arg(short, long)]
    json: bool,

    /// Show the raw token stream
    #[arg(short, long)]
    tokens: bool,

    /// Show parse errors
    #[arg(short, long)]
    errors: bool,

    /// Record source locations (shown with --tokens, --json and --errors)
    #[arg(long)]
    locations: bool,

    /// Honor `/>` on non-void elements and serialize empty elements as `<x/>`
    #[arg(long)]
    self_close: bool,

    /// Keep tag names in their source case
    #[arg(long)]
    uppercase_tags: bool,

    /// Keep attribute names in their source case
    #[arg(long)]
    uppercase_attrs: bool,

    /// Parse with the scripting flag disabled (affects <noscript>)
    #[arg(long)]
    no_scripting: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let html = if let Some(src) = &cli.html {
        src.clone()
    } else if let Some(path) = &cli.path {
        fs::read_to_string(path).with_context(|| format!("reading '{path}'"))?
    } else {
        bail!("no input file or --html provided");
    };

    if cli.tokens {
        print_tokens(&html, &cli);
    }

    let errors: Rc<RefCell<Vec<ParseError>>> = Rc::default();
    let mut options = ParserOptions::default()
        .with_source_code_location_info(cli.locations)
        .with_scripting_enabled(!cli.no_scripting)
        .with_self_close_enabled(cli.self_close)
        .with_uppercase_tag_enabled(cli.uppercase_tags)
        .with_uppercase_attr_enabled(cli.uppercase_attrs);
    if cli.errors {
        let sink = Rc::clone(&errors);
        options = options.with_on_parse_error(move |error| sink.borrow_mut().push(error.clone()));
    }

    let (tree, root) = if cli.fragment || cli.context.is_some() {
        let mut parser = HTMLParser::new_fragment(DomTree::new(), cli.context.as_deref(), options);
        let _ = parser.write(&html, true);
        let fragment = parser.fragment();
        let tree = parser.into_adapter();
        let Some(fragment) = fragment else {
            bail!("fragment parse did not finish");
        };
        (tree, fragment)
    } else {
        let tree = parse_document(&html, options);
        let root = tree.root();
        (tree, root)
    };

    if cli.errors {
        let errors = errors.borrow();
        println!("{}", format!("=== Parse Errors ({}) ===", errors.len()).bold());
        for error in errors.iter() {
            println!("  {}", error.red());
        }
        println!();
    }

    if cli.json {
        let json = node_to_json(&tree, root, cli.locations);
        println!("{}", serde_json::to_string_pretty(&json)?);
    } else if cli.serialize {
        let serializer_options = SerializerOptions {
            self_close_enabled: cli.self_close,
            scripting_enabled: !cli.no_scripting,
        };
        println!("{}", serialize(&tree, root, serializer_options));
    } else {
        println!("{}", "=== DOM Tree ===".bold());
        println!("mode: {}", format!("{:?}", tree.mode()).dimmed());
        print_tree(&tree, root, 0);
    }

    Ok(())
}

fn print_tokens(html: &str, cli: &Cli) {
    let mut tokenizer = HTMLTokenizer::new()
        .with_locations(cli.locations)
        .with_case_preservation(cli.uppercase_tags, cli.uppercase_attrs);
    if let Some(context) = &cli.context {
        let state = match TagId::from_name(context) {
            TagId::Title | TagId::Textarea => Some(TokenizerState::RCDATA),
            TagId::Style | TagId::Xmp | TagId::Iframe | TagId::Noembed | TagId::Noframes => {
                Some(TokenizerState::RAWTEXT)
            }
            TagId::Script => Some(TokenizerState::ScriptData),
            TagId::Plaintext => Some(TokenizerState::PLAINTEXT),
            _ => None,
        };
        if let Some(state) = state {
            tokenizer.set_state(state);
            tokenizer.set_last_start_tag_name(context);
        }
    }

    let mut sink = TokenCollector::new();
    tokenizer.write(html, true);
    let _ = tokenizer.run(&mut sink);

    println!("{}", format!("=== HTML Tokens ({}) ===", sink.tokens.len()).bold());
    for (i, token) in sink.tokens.iter().enumerate() {
        match token.location() {
            Some(location) if cli.locations => {
                println!("  {i:3}: {token} {}", location.dimmed());
            }
            _ => println!("  {i:3}: {token}"),
        }
    }
    println!();
}

fn node_to_json(tree: &DomTree, id: NodeId, locations: bool) -> Value {
    let mut obj = Map::new();
    let Some(node) = tree.get(id) else {
        return Value::Object(obj);
    };

    match &node.node_type {
        NodeType::Document => {
            let _ = obj.insert("type".to_string(), json!("document"));
            let _ = obj.insert("mode".to_string(), json!(tree.mode()));
        }
        NodeType::DocumentFragment => {
            let _ = obj.insert("type".to_string(), json!("fragment"));
        }
        NodeType::DocumentType(doctype) => {
            let _ = obj.insert("type".to_string(), json!("doctype"));
            let _ = obj.insert("name".to_string(), json!(doctype.name));
            let _ = obj.insert("publicId".to_string(), json!(doctype.public_id));
            let _ = obj.insert("systemId".to_string(), json!(doctype.system_id));
        }
        NodeType::Element(data) => {
            let _ = obj.insert("type".to_string(), json!("element"));
            let _ = obj.insert("tagName".to_string(), json!(data.tag_name));
            let _ = obj.insert("namespace".to_string(), json!(data.namespace));

            let attrs: Map<String, Value> = data
                .attrs
                .iter()
                .map(|attr| (attr.qualified_name(), json!(attr.value)))
                .collect();
            let _ = obj.insert("attributes".to_string(), Value::Object(attrs));

            if let Some(content) = data.template_contents {
                let _ = obj.insert("content".to_string(), node_to_json(tree, content, locations));
            }
        }
        NodeType::Text(text) => {
            let _ = obj.insert("type".to_string(), json!("text"));
            let _ = obj.insert("content".to_string(), json!(text));
        }
        NodeType::Comment(text) => {
            let _ = obj.insert("type".to_string(), json!("comment"));
            let _ = obj.insert("content".to_string(), json!(text));
        }
    }

    if locations && let Some(location) = tree.location(id) {
        let _ = obj.insert("location".to_string(), json!(location));
    }

    let children = tree.children(id);
    if !children.is_empty() {
        let children: Vec<Value> = children
            .iter()
            .map(|&child| node_to_json(tree, child, locations))
            .collect();
        let _ = obj.insert("children".to_string(), Value::Array(children));
    }

    Value::Object(obj)
}
