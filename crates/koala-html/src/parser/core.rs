use std::mem;

use koala_common::location::{Location, NodeLocation, Position, TagLocation};
use koala_dom::{DocumentMode, Namespace};
use strum_macros::Display;

use super::foreign_content::is_annotation_xml_integration_point;
use super::formatting_elements::{FormattingElementList, FormattingEntry};
use super::open_elements::{OpenElementStack, StackEntry};
use crate::adapter::TreeAdapter;
use crate::error::{ParseError, ParseErrorCode};
use crate::options::{ParseErrorCallback, ParserOptions};
use crate::tag::TagId;
use crate::tokenizer::{
    CommentToken, DoctypeToken, SinkResult, TagToken, TextToken, Token, TokenSink,
    TokenizerState,
};

/// [§ 13.2.4.1 The insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-insertion-mode)
///
/// "The insertion mode is a state variable that controls the primary operation
/// of the tree construction stage."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum InsertionMode {
    /// [§ 13.2.6.4.1 The "initial" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-initial-insertion-mode)
    Initial,
    /// [§ 13.2.6.4.2 The "before html" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-html-insertion-mode)
    BeforeHtml,
    /// [§ 13.2.6.4.3 The "before head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-head-insertion-mode)
    BeforeHead,
    /// [§ 13.2.6.4.4 The "in head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inhead)
    InHead,
    /// [§ 13.2.6.4.5 The "in head noscript" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inheadnoscript)
    InHeadNoscript,
    /// [§ 13.2.6.4.6 The "after head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-head-insertion-mode)
    AfterHead,
    /// [§ 13.2.6.4.7 The "in body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
    InBody,
    /// [§ 13.2.6.4.8 The "text" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incdata)
    Text,
    /// [§ 13.2.6.4.9 The "in table" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intable)
    InTable,
    /// [§ 13.2.6.4.10 The "in table text" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intabletext)
    InTableText,
    /// [§ 13.2.6.4.11 The "in caption" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incaption)
    InCaption,
    /// [§ 13.2.6.4.12 The "in column group" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incolumngroup)
    InColumnGroup,
    /// [§ 13.2.6.4.13 The "in table body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intablebody)
    InTableBody,
    /// [§ 13.2.6.4.14 The "in row" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inrow)
    InRow,
    /// [§ 13.2.6.4.15 The "in cell" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incell)
    InCell,
    /// [§ 13.2.6.4.16 The "in select" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inselect)
    InSelect,
    /// [§ 13.2.6.4.17 The "in select in table" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inselectintable)
    InSelectInTable,
    /// [§ 13.2.6.4.18 The "in template" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intemplate)
    InTemplate,
    /// [§ 13.2.6.4.19 The "after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-afterbody)
    AfterBody,
    /// [§ 13.2.6.4.20 The "in frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inframeset)
    InFrameset,
    /// [§ 13.2.6.4.21 The "after frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-afterframeset)
    AfterFrameset,
    /// [§ 13.2.6.4.22 The "after after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-after-body-insertion-mode)
    AfterAfterBody,
    /// [§ 13.2.6.4.23 The "after after frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-after-frameset-insertion-mode)
    AfterAfterFrameset,
}

/// The context element of a fragment parse.
///
/// [§ 13.4 Parsing HTML fragments](https://html.spec.whatwg.org/multipage/parsing.html#parsing-html-fragments)
#[derive(Debug)]
pub(crate) struct FragmentContext<H> {
    /// The detached context element, as a stack entry so it can stand in as
    /// the adjusted current node.
    pub(crate) entry: StackEntry<H>,
}

/// [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction)
///
/// Consumes tokens from the tokenizer and builds a tree through a
/// [`TreeAdapter`]. The builder is the tokenizer's [`TokenSink`]; tokenizer
/// state changes and pauses are requested through the returned
/// [`SinkResult`].
pub struct TreeBuilder<A: TreeAdapter> {
    pub(super) adapter: A,
    pub(super) document: A::Handle,

    /// [§ 13.2.4.1 The insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-insertion-mode)
    pub(super) insertion_mode: InsertionMode,
    /// [§ 13.2.4.1](https://html.spec.whatwg.org/multipage/parsing.html#original-insertion-mode)
    pub(super) original_insertion_mode: InsertionMode,
    /// [§ 13.2.4.1](https://html.spec.whatwg.org/multipage/parsing.html#stack-of-template-insertion-modes)
    ///
    /// The last entry is the current template insertion mode.
    pub(super) template_insertion_modes: Vec<InsertionMode>,

    /// [§ 13.2.4.3 The stack of open elements](https://html.spec.whatwg.org/multipage/parsing.html#the-stack-of-open-elements)
    pub(super) open_elements: OpenElementStack<A::Handle>,
    /// [§ 13.2.4.3 The list of active formatting elements](https://html.spec.whatwg.org/multipage/parsing.html#the-list-of-active-formatting-elements)
    pub(super) active_formatting_elements: FormattingElementList<A::Handle>,

    /// [§ 13.2.4.4 The element pointers](https://html.spec.whatwg.org/multipage/parsing.html#the-element-pointers)
    pub(super) head_element: Option<A::Handle>,
    /// "The form element pointer points to the last form element that was
    /// opened and whose end tag has not yet been seen."
    pub(super) form_element: Option<A::Handle>,

    /// [§ 13.2.4.5 Other parsing state flags](https://html.spec.whatwg.org/multipage/parsing.html#frameset-ok-flag)
    pub(super) frameset_ok: bool,
    /// [§ 13.2.6.1](https://html.spec.whatwg.org/multipage/parsing.html#foster-parent)
    pub(super) foster_parenting: bool,
    /// "The pending table character tokens list"
    pub(super) pending_table_text: Vec<Token>,
    pub(super) pending_table_text_has_non_whitespace: bool,

    pub(super) fragment_context: Option<FragmentContext<A::Handle>>,
    pub(super) fragment: Option<A::Handle>,

    pub(super) scripting_enabled: bool,
    pub(super) self_close_enabled: bool,
    pub(super) pause_on_script: bool,
    pub(super) record_locations: bool,
    on_parse_error: Option<ParseErrorCallback>,

    /// Location of the token being processed.
    pub(super) token_location: Option<Location>,
    /// Name of the end tag being processed, used to attach end tag locations
    /// to the element it closes.
    pub(super) token_end_tag: Option<String>,
    pub(super) self_closing_acknowledged: bool,
    /// Drop a leading newline from the next token (`<pre>`, `<listing>`,
    /// `<textarea>`).
    pub(super) skip_next_newline: bool,

    pending_tokenizer_state: Option<TokenizerState>,
    pause_requested: bool,
    /// The `<script>` element whose end tag caused the last pause.
    pub(super) paused_script: Option<A::Handle>,
    pub(super) stopped: bool,
}

impl<A: TreeAdapter> TreeBuilder<A> {
    /// A builder for a full document.
    pub(crate) fn new(mut adapter: A, options: &mut ParserOptions) -> Self {
        let document = adapter.create_document();
        Self {
            adapter,
            document,
            insertion_mode: InsertionMode::Initial,
            original_insertion_mode: InsertionMode::Initial,
            template_insertion_modes: Vec::new(),
            open_elements: OpenElementStack::new(),
            active_formatting_elements: FormattingElementList::new(),
            head_element: None,
            form_element: None,
            frameset_ok: true,
            foster_parenting: false,
            pending_table_text: Vec::new(),
            pending_table_text_has_non_whitespace: false,
            fragment_context: None,
            fragment: None,
            scripting_enabled: options.scripting_enabled,
            self_close_enabled: options.self_close_enabled,
            pause_on_script: options.pause_on_script,
            record_locations: options.source_code_location_info,
            on_parse_error: options.on_parse_error.take(),
            token_location: None,
            token_end_tag: None,
            self_closing_acknowledged: false,
            skip_next_newline: false,
            pending_tokenizer_state: None,
            pause_requested: false,
            paused_script: None,
            stopped: false,
        }
    }

    /// [§ 13.4 Parsing HTML fragments](https://html.spec.whatwg.org/multipage/parsing.html#parsing-html-fragments)
    ///
    /// Sets up the builder for a fragment parsed in the context of an element
    /// named `context_name` in `namespace`.
    pub(crate) fn new_fragment(
        adapter: A,
        options: &mut ParserOptions,
        context_name: &str,
        namespace: Namespace,
    ) -> Self {
        let mut builder = Self::new(adapter, options);

        // "Let root be the result of creating an element given document,
        // "html", and the HTML namespace."
        // "Append the element root to the Document node created above."
        // "Set up the parser's stack of open elements so that it contains just
        // the single element root."
        let root = builder
            .adapter
            .create_element("html", Namespace::Html, Vec::new());
        builder.adapter.append_child(builder.document, root);
        builder
            .open_elements
            .push(StackEntry::html(root, TagId::Html, "html"));
        builder.adapter.on_item_push(root);

        let context = builder
            .adapter
            .create_element(context_name, namespace, Vec::new());
        let tag_id = TagId::from_name(context_name);
        builder.fragment_context = Some(FragmentContext {
            entry: StackEntry {
                handle: context,
                tag_id,
                name: context_name.to_string(),
                namespace,
                html_integration_point: namespace == Namespace::Svg
                    && matches!(tag_id, TagId::ForeignObject | TagId::Desc | TagId::Title),
            },
        });

        // "If the context element is a template element, then push "in
        // template" onto the stack of template insertion modes so that it is
        // the new current template insertion mode."
        if namespace == Namespace::Html && tag_id == TagId::Template {
            builder
                .template_insertion_modes
                .push(InsertionMode::InTemplate);
        }

        // "Reset the parser's insertion mode appropriately."
        builder.reset_insertion_mode_appropriately();

        // "Set the HTML parser's form element pointer to the nearest node to
        // the context element that is a form element (going straight up the
        // ancestor chain, and including the element itself, if it is a form
        // element), if any." The context element is detached, so only itself
        // qualifies.
        if namespace == Namespace::Html && tag_id == TagId::Form {
            builder.form_element = Some(context);
        }
        builder
    }

    /// The adapter.
    pub(crate) const fn adapter(&self) -> &A {
        &self.adapter
    }

    /// Give the adapter back.
    pub(crate) fn into_adapter(self) -> A {
        self.adapter
    }

    /// The document node.
    pub(crate) const fn document(&self) -> A::Handle {
        self.document
    }

    /// The fragment node, once a fragment parse has finished.
    pub(crate) const fn fragment(&self) -> Option<A::Handle> {
        self.fragment
    }

    /// The script element whose end tag paused the parser, if any.
    pub(crate) const fn paused_script(&self) -> Option<A::Handle> {
        self.paused_script
    }

    /// The current insertion mode.
    pub(crate) const fn insertion_mode(&self) -> InsertionMode {
        self.insertion_mode
    }

    /// Whether parsing has stopped.
    pub(crate) const fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub(super) fn switch_to(&mut self, mode: InsertionMode) {
        if mode != self.insertion_mode {
            log::debug!(
                target: "koala_html::parser",
                "insertion mode {} -> {mode}",
                self.insertion_mode
            );
        }
        self.insertion_mode = mode;
    }

    /// Ask the tokenizer to switch state once the current token is handled.
    pub(super) const fn switch_tokenizer_to(&mut self, state: TokenizerState) {
        self.pending_tokenizer_state = Some(state);
    }

    /// Report a tree construction parse error at the current token.
    pub(super) fn parse_error(&mut self, code: ParseErrorCode) {
        let error = ParseError::new(code, self.token_location);
        self.report(error);
    }

    fn report(&mut self, error: ParseError) {
        if let Some(callback) = self.on_parse_error.as_mut() {
            callback(&error);
        }
    }

    // ===== TOKEN DISPATCH =====

    /// Handle one token from the tokenizer and tell the tokenizer what to do
    /// next.
    fn settle(&mut self, token: Token) -> SinkResult {
        if self.stopped {
            return SinkResult::Stop;
        }

        self.token_location = token.location();
        self.token_end_tag = match &token {
            Token::EndTag(tag) => Some(tag.name.clone()),
            _ => None,
        };
        self.self_closing_acknowledged = false;

        // [§ 13.2.6.4.7](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
        // "If the next token is a U+000A LINE FEED (LF) character token, then
        // ignore that token and move on to the next one. (Newlines at the start
        // of pre blocks are ignored as an authoring convenience.)"
        let token = if mem::take(&mut self.skip_next_newline) {
            match token {
                Token::WhitespaceCharacter(mut text) if text.chars.starts_with('\n') => {
                    let _ = text.chars.remove(0);
                    if text.chars.is_empty() {
                        return self.sink_result();
                    }
                    if let Some(location) = text.location.as_mut() {
                        location.start_line += 1;
                        location.start_col = 1;
                        location.start_offset += 1;
                    }
                    self.token_location = text.location;
                    Token::WhitespaceCharacter(text)
                }
                other => other,
            }
        } else {
            token
        };

        self.process_token(&token);
        self.flush_popped();

        // "When a start tag token is emitted with its self-closing flag set, if
        // the flag is not acknowledged when it is processed by the tree
        // construction stage, that is a parse error."
        if let Token::StartTag(tag) = &token
            && tag.self_closing
            && !self.self_closing_acknowledged
            && !self.stopped
        {
            self.parse_error(ParseErrorCode::NonVoidHtmlElementStartTagWithTrailingSolidus);
        }

        self.sink_result()
    }

    fn sink_result(&mut self) -> SinkResult {
        if self.stopped {
            return SinkResult::Stop;
        }
        if let Some(state) = self.pending_tokenizer_state.take() {
            return SinkResult::SwitchTo(state);
        }
        if mem::take(&mut self.pause_requested) {
            return SinkResult::Pause;
        }
        SinkResult::Continue
    }

    /// Suspend the tokenizer after the current token.
    pub(super) const fn request_pause(&mut self) {
        self.pause_requested = true;
    }

    /// [§ 13.2.6 Tree construction dispatcher](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction-dispatcher)
    ///
    /// "As each token is emitted from the tokenizer, the user agent must follow
    /// the appropriate steps from the following list, known as the tree
    /// construction dispatcher:"
    pub(super) fn process_token(&mut self, token: &Token) {
        if self.uses_html_rules(token) {
            self.process_using_rules_for(self.insertion_mode, token);
        } else {
            self.process_in_foreign_content(token);
        }
    }

    /// "Reprocess the token"
    pub(super) fn reprocess_token(&mut self, token: &Token) {
        self.process_token(token);
    }

    fn uses_html_rules(&self, token: &Token) -> bool {
        // "If the stack of open elements is empty"
        let Some(node) = self.adjusted_current_node() else {
            return true;
        };
        // "If the adjusted current node is an element in the HTML namespace"
        if node.namespace == Namespace::Html {
            return true;
        }
        let is_text = matches!(
            token,
            Token::Character(_) | Token::NullCharacter(_) | Token::WhitespaceCharacter(_)
        );
        // "If the adjusted current node is a MathML text integration point and
        // the token is a start tag whose tag name is neither "mglyph" nor
        // "malignmark"" / "... and the token is a character token"
        if node.is_mathml_text_integration_point() {
            match token {
                Token::StartTag(tag)
                    if !matches!(tag.tag_id, TagId::Mglyph | TagId::Malignmark) =>
                {
                    return true;
                }
                _ if is_text => return true,
                _ => {}
            }
        }
        // "If the adjusted current node is a MathML annotation-xml element and
        // the token is a start tag whose tag name is "svg""
        if node.namespace == Namespace::MathMl
            && node.tag_id == TagId::AnnotationXml
            && matches!(token, Token::StartTag(tag) if tag.tag_id == TagId::Svg)
        {
            return true;
        }
        // "If the adjusted current node is an HTML integration point and the
        // token is a start tag" / "... and the token is a character token"
        if node.html_integration_point && (is_text || matches!(token, Token::StartTag(_))) {
            return true;
        }
        // "If the token is an end-of-file token"
        matches!(token, Token::EndOfFile { .. })
    }

    /// Process `token` using the rules for `mode`, whatever the current
    /// insertion mode is.
    pub(super) fn process_using_rules_for(&mut self, mode: InsertionMode, token: &Token) {
        match mode {
            InsertionMode::Initial => self.handle_initial_mode(token),
            InsertionMode::BeforeHtml => self.handle_before_html_mode(token),
            InsertionMode::BeforeHead => self.handle_before_head_mode(token),
            InsertionMode::InHead => self.handle_in_head_mode(token),
            InsertionMode::InHeadNoscript => self.handle_in_head_noscript_mode(token),
            InsertionMode::AfterHead => self.handle_after_head_mode(token),
            InsertionMode::InBody => self.handle_in_body_mode(token),
            InsertionMode::Text => self.handle_text_mode(token),

            // ===== TABLE PARSING MODES =====
            InsertionMode::InTable => self.handle_in_table_mode(token),
            InsertionMode::InTableText => self.handle_in_table_text_mode(token),
            InsertionMode::InCaption => self.handle_in_caption_mode(token),
            InsertionMode::InColumnGroup => self.handle_in_column_group_mode(token),
            InsertionMode::InTableBody => self.handle_in_table_body_mode(token),
            InsertionMode::InRow => self.handle_in_row_mode(token),
            InsertionMode::InCell => self.handle_in_cell_mode(token),

            // ===== FORM ELEMENT MODES =====
            InsertionMode::InSelect => self.handle_in_select_mode(token),
            InsertionMode::InSelectInTable => self.handle_in_select_in_table_mode(token),

            InsertionMode::InTemplate => self.handle_in_template_mode(token),
            InsertionMode::AfterBody => self.handle_after_body_mode(token),

            // ===== FRAMESET MODES =====
            InsertionMode::InFrameset => self.handle_in_frameset_mode(token),
            InsertionMode::AfterFrameset => self.handle_after_frameset_mode(token),
            InsertionMode::AfterAfterBody => self.handle_after_after_body_mode(token),
            InsertionMode::AfterAfterFrameset => self.handle_after_after_frameset_mode(token),
        }
    }

    // ===== NODES AND THE STACK =====

    /// [§ 13.2.4.3](https://html.spec.whatwg.org/multipage/parsing.html#adjusted-current-node)
    ///
    /// "The adjusted current node is the context element if the parser was
    /// created as part of the HTML fragment parsing algorithm and the stack of
    /// open elements has only one element in it (fragment case); otherwise, the
    /// adjusted current node is the current node."
    pub(super) fn adjusted_current_node(&self) -> Option<&StackEntry<A::Handle>> {
        match &self.fragment_context {
            Some(context) if self.open_elements.len() == 1 => Some(&context.entry),
            _ => self.open_elements.current(),
        }
    }

    /// Handle of the current node.
    ///
    /// # Panics
    ///
    /// Panics if the stack of open elements is empty, which tree construction
    /// never allows once the root element exists.
    pub(super) fn current_node(&self) -> A::Handle {
        match self.open_elements.current_handle() {
            Some(handle) => handle,
            None => unreachable!("stack of open elements is empty"),
        }
    }

    /// Whether `handle` is an HTML element with one of `tags`.
    pub(super) fn is_html_element(&self, handle: A::Handle, tags: &[TagId]) -> bool {
        self.adapter.namespace(handle) == Some(Namespace::Html)
            && self
                .adapter
                .tag_name(handle)
                .is_some_and(|name| tags.contains(&TagId::from_name(name)))
    }

    /// Push an element and tell the adapter.
    pub(super) fn push_open_element(&mut self, entry: StackEntry<A::Handle>) {
        self.flush_popped();
        let handle = entry.handle;
        self.open_elements.push(entry);
        self.adapter.on_item_push(handle);
    }

    /// Run end-of-element bookkeeping for everything popped since the last
    /// call: record where each element ended and notify the adapter.
    pub(super) fn flush_popped(&mut self) {
        for (element, new_current) in self.open_elements.take_popped() {
            if self.record_locations {
                self.set_end_location(element);
            }
            self.adapter.on_item_pop(element, new_current);
        }
    }

    fn set_end_location(&mut self, element: A::Handle) {
        let Some(token_location) = self.token_location else {
            return;
        };
        let closed_by_token = self.token_end_tag.as_deref().is_some_and(|name| {
            self.adapter
                .tag_name(element)
                .is_some_and(|tag_name| tag_name.eq_ignore_ascii_case(name))
        });
        if closed_by_token {
            self.adapter.update_node_source_code_location(
                element,
                token_location.end(),
                Some(token_location),
            );
            return;
        }
        // `</body>` and `</html>` already recorded where the element ended.
        let already_closed = self
            .adapter
            .node_source_code_location(element)
            .is_some_and(|location| location.end_tag.is_some());
        if !already_closed {
            self.adapter
                .update_node_source_code_location(element, token_location.start(), None);
        }
    }

    /// Record the end tag of an element that stays open (`</body>`,
    /// `</html>`).
    pub(super) fn record_end_tag(&mut self, element: A::Handle) {
        if self.record_locations
            && let Some(location) = self.token_location
        {
            self.adapter
                .update_node_source_code_location(element, location.end(), Some(location));
        }
    }

    /// Where the current token starts, for nodes the input does not contain.
    fn implied_position(&self) -> Position {
        self.token_location
            .map_or(Position::START, |location| location.start())
    }

    // ===== CREATING AND INSERTING NODES =====

    /// [§ 13.2.6.1 Creating and inserting nodes](https://html.spec.whatwg.org/multipage/parsing.html#appropriate-place-for-inserting-a-node)
    ///
    /// "The appropriate place for inserting a node, optionally using a
    /// particular override target, is the position in an element returned by
    /// running the following steps:"
    ///
    /// Returns the parent and, when the node goes before an existing child,
    /// that child.
    pub(super) fn appropriate_place_for_inserting_node(
        &self,
        override_target: Option<A::Handle>,
    ) -> (A::Handle, Option<A::Handle>) {
        // STEP 1: "If there was an override target specified, then let target
        //          be the override target. Otherwise, let target be the current
        //          node."
        // Before the root element exists the stack is empty and the node goes
        // into the Document itself.
        let target = override_target
            .or_else(|| self.open_elements.current_handle())
            .unwrap_or(self.document);

        // STEP 2: "Determine the adjusted insertion location using the first
        //          matching steps from the following list:"
        let (parent, reference) = if self.foster_parenting
            && self.is_html_element(
                target,
                &[TagId::Table, TagId::Tbody, TagId::Tfoot, TagId::Thead, TagId::Tr],
            ) {
            self.foster_parent_location()
        } else {
            // "Otherwise: Let adjusted insertion location be inside target,
            // after its last child (if any)."
            (target, None)
        };

        // STEP 3: "If the adjusted insertion location is inside a template
        //          element, let it instead be inside the template element's
        //          template contents, after its last child (if any)."
        if self.is_html_element(parent, &[TagId::Template])
            && let Some(content) = self.adapter.template_content(parent)
        {
            return (content, None);
        }
        (parent, reference)
    }

    /// [§ 13.2.6.1](https://html.spec.whatwg.org/multipage/parsing.html#foster-parent)
    ///
    /// The foster parenting branch of the appropriate place algorithm.
    pub(super) fn foster_parent_location(&self) -> (A::Handle, Option<A::Handle>) {
        // "Let last template be the last template element in the stack of open
        // elements, if any."
        let last_template = self.open_elements.last_index_of_tag(TagId::Template);
        // "Let last table be the last table element in the stack of open
        // elements, if any."
        let last_table = self.open_elements.last_index_of_tag(TagId::Table);

        // "If there is a last template and either there is no last table, or
        // there is one, but last template is lower (more recently added) than
        // last table in the stack of open elements, then: let adjusted
        // insertion location be inside last template's template contents,
        // after its last child (if any), and abort these steps."
        if let Some(template_index) = last_template
            && last_table.is_none_or(|table_index| template_index > table_index)
        {
            let template = self.open_elements.entries()[template_index].handle;
            return (template, None);
        }

        // "If there is no last table, then let adjusted insertion location be
        // inside the first element in the stack of open elements (the html
        // element), after its last child (if any), and abort these steps.
        // (fragment case)"
        let Some(table_index) = last_table else {
            let root = self.open_elements.entries()[0].handle;
            return (root, None);
        };

        // "If last table has a parent node, then let adjusted insertion
        // location be inside last table's parent node, immediately before last
        // table, and abort these steps."
        let table = self.open_elements.entries()[table_index].handle;
        if let Some(parent) = self.adapter.parent_node(table) {
            return (parent, Some(table));
        }

        // "Let previous element be the element immediately above last table in
        // the stack of open elements."
        // "Let adjusted insertion location be inside previous element, after
        // its last child (if any)."
        let previous = self.open_elements.entries()[table_index.saturating_sub(1)].handle;
        (previous, None)
    }

    /// Insert `node` at a previously computed location.
    pub(super) fn insert_at(
        &mut self,
        (parent, reference): (A::Handle, Option<A::Handle>),
        node: A::Handle,
    ) {
        match reference {
            Some(reference) => self.adapter.insert_before(parent, node, reference),
            None => self.adapter.append_child(parent, node),
        }
    }

    /// [§ 13.2.6.1](https://html.spec.whatwg.org/multipage/parsing.html#create-an-element-for-the-token)
    ///
    /// "create an element for a token in a particular given namespace and with
    /// a particular intended parent"
    pub(super) fn create_element_for_token(
        &mut self,
        tag: &TagToken,
        namespace: Namespace,
    ) -> A::Handle {
        let element = self
            .adapter
            .create_element(&tag.name, namespace, tag.attrs.clone());

        if namespace == Namespace::Html && tag.tag_id == TagId::Template {
            let content = self.adapter.create_document_fragment();
            self.adapter.set_template_content(element, content);
        }

        if self.record_locations {
            let location = tag.location.clone().unwrap_or_else(|| {
                TagLocation::new(Location::empty(self.implied_position()))
            });
            let mut node_location = NodeLocation::from_start_tag(location);
            if tag.location.is_none() {
                // The input has no start tag for this element.
                node_location.start_tag = None;
            }
            self.adapter
                .set_node_source_code_location(element, Some(node_location));
        }
        element
    }

    /// A stack entry describing `element` as created for `tag`.
    pub(super) fn stack_entry_for(
        element: A::Handle,
        tag: &TagToken,
        namespace: Namespace,
    ) -> StackEntry<A::Handle> {
        let html_integration_point = match namespace {
            Namespace::MathMl => {
                tag.tag_id == TagId::AnnotationXml && is_annotation_xml_integration_point(tag)
            }
            Namespace::Svg => {
                matches!(tag.tag_id, TagId::ForeignObject | TagId::Desc | TagId::Title)
            }
            _ => false,
        };
        StackEntry {
            handle: element,
            tag_id: tag.tag_id,
            name: tag.name.clone(),
            namespace,
            html_integration_point,
        }
    }

    /// [§ 13.2.6.1](https://html.spec.whatwg.org/multipage/parsing.html#insert-a-foreign-element)
    ///
    /// "insert a foreign element for a token in a given namespace"
    pub(super) fn insert_foreign_element(
        &mut self,
        tag: &TagToken,
        namespace: Namespace,
    ) -> A::Handle {
        // STEP 1: "Let the adjusted insertion location be the appropriate place
        //          for inserting a node."
        let location = self.appropriate_place_for_inserting_node(None);
        // STEP 2: "Let element be the result of creating an element for the
        //          token in the given namespace, with the intended parent
        //          being the element in which the adjusted insertion location
        //          finds itself."
        let element = self.create_element_for_token(tag, namespace);
        // STEP 3: "If it is possible to insert element at the adjusted
        //          insertion location, then insert element at the adjusted
        //          insertion location."
        self.insert_at(location, element);
        // STEP 4: "Push element onto the stack of open elements so that it is
        //          the new current node."
        self.push_open_element(Self::stack_entry_for(element, tag, namespace));
        element
    }

    /// [§ 13.2.6.1](https://html.spec.whatwg.org/multipage/parsing.html#insert-an-html-element)
    ///
    /// "When the steps below require the user agent to insert an HTML element
    /// for a token, the user agent must insert a foreign element for the token,
    /// in the HTML namespace."
    pub(super) fn insert_html_element(&mut self, tag: &TagToken) -> A::Handle {
        self.insert_foreign_element(tag, Namespace::Html)
    }

    /// Insert an element the input did not contain, such as an implied
    /// `<head>` or `<tbody>`.
    pub(super) fn insert_implied_element(&mut self, tag_id: TagId) -> A::Handle {
        self.insert_html_element(&TagToken::for_tag(tag_id))
    }

    /// [§ 13.2.6.1](https://html.spec.whatwg.org/multipage/parsing.html#insert-a-character)
    ///
    /// "When the steps below require the user agent to insert a character while
    /// processing a token, the user agent must run the following steps:"
    pub(super) fn insert_characters(&mut self, text: &TextToken) {
        self.insert_text(&text.chars, text.location);
    }

    pub(super) fn insert_text(&mut self, data: &str, location: Option<Location>) {
        if data.is_empty() {
            return;
        }
        // STEP 2: "Let the adjusted insertion location be the appropriate place
        //          for inserting a node."
        let (parent, reference) = self.appropriate_place_for_inserting_node(None);

        // STEP 3: "If the adjusted insertion location is inside a Document
        //          node, then ignore the token."
        if parent == self.document {
            return;
        }

        // STEP 4-5: "If there is a Text node immediately before the adjusted
        //            insertion location, then append data to that Text node's
        //            data. Otherwise, create a new Text node ... and insert
        //            the newly created node at the adjusted insertion location."
        let node = match reference {
            Some(reference) => self.adapter.insert_text_before(parent, data, reference),
            None => self.adapter.insert_text(parent, data),
        };

        if self.record_locations
            && let Some(location) = location
        {
            if self.adapter.node_source_code_location(node).is_some() {
                self.adapter
                    .update_node_source_code_location(node, location.end(), None);
            } else {
                self.adapter
                    .set_node_source_code_location(node, Some(NodeLocation::from_span(location)));
            }
        }
    }

    /// [§ 13.2.6.1](https://html.spec.whatwg.org/multipage/parsing.html#insert-a-comment)
    ///
    /// "When the steps below require the user agent to insert a comment while
    /// processing a comment token, optionally with an explicitly insertion
    /// position position, the user agent must run the following steps:"
    pub(super) fn insert_comment(&mut self, comment: &CommentToken) {
        let location = self.appropriate_place_for_inserting_node(None);
        let node = self.create_comment(comment);
        self.insert_at(location, node);
    }

    /// Insert a comment as the last child of `parent` (the document, or the
    /// `html` element after `</body>`).
    pub(super) fn append_comment_to(&mut self, parent: A::Handle, comment: &CommentToken) {
        let node = self.create_comment(comment);
        self.adapter.append_child(parent, node);
    }

    fn create_comment(&mut self, comment: &CommentToken) -> A::Handle {
        let node = self.adapter.create_comment_node(&comment.data);
        if self.record_locations
            && let Some(location) = comment.location
        {
            self.adapter
                .set_node_source_code_location(node, Some(NodeLocation::from_span(location)));
        }
        node
    }

    /// Record the DOCTYPE on the document.
    pub(super) fn insert_doctype(&mut self, doctype: &DoctypeToken) {
        let node = self.adapter.set_document_type(
            self.document,
            doctype.name.as_deref().unwrap_or_default(),
            doctype.public_id.as_deref().unwrap_or_default(),
            doctype.system_id.as_deref().unwrap_or_default(),
        );
        if self.record_locations
            && let Some(location) = doctype.location
        {
            self.adapter
                .set_node_source_code_location(node, Some(NodeLocation::from_span(location)));
        }
    }

    pub(super) fn set_document_mode(&mut self, mode: DocumentMode) {
        self.adapter.set_document_mode(self.document, mode);
    }

    pub(super) fn document_mode(&self) -> DocumentMode {
        self.adapter.document_mode(self.document)
    }

    /// "acknowledge the token's self-closing flag"
    pub(super) const fn acknowledge_self_closing(&mut self) {
        self.self_closing_acknowledged = true;
    }

    /// Insert an element that never has children and pop it right away.
    pub(super) fn insert_void_element(&mut self, tag: &TagToken) {
        let _ = self.insert_html_element(tag);
        let _ = self.open_elements.pop();
        self.acknowledge_self_closing();
    }

    /// With `self_close_enabled`, `<name/>` closes a non-void element
    /// immediately.
    pub(super) fn close_if_self_closing(&mut self, tag: &TagToken) {
        if self.self_close_enabled && tag.self_closing {
            let _ = self.open_elements.pop();
            self.acknowledge_self_closing();
        }
    }

    /// [§ 13.2.6.2 Parsing elements that contain only text](https://html.spec.whatwg.org/multipage/parsing.html#generic-raw-text-element-parsing-algorithm)
    ///
    /// "The generic raw text element parsing algorithm and the generic RCDATA
    /// element parsing algorithm consist of the following steps."
    pub(super) fn parse_text_element(&mut self, tag: &TagToken, state: TokenizerState) {
        // STEP 1: "Insert an HTML element for the token."
        let _ = self.insert_html_element(tag);
        // STEP 2: "If the algorithm that was invoked is the generic raw text
        //          element parsing algorithm, switch the tokenizer to the
        //          RAWTEXT state; otherwise the algorithm invoked was the
        //          generic RCDATA element parsing algorithm, switch the
        //          tokenizer to the RCDATA state."
        self.switch_tokenizer_to(state);
        // STEP 3: "Let the original insertion mode be the current insertion
        //          mode."
        self.original_insertion_mode = self.insertion_mode;
        // STEP 4: "Then, switch the insertion mode to "text"."
        self.switch_to(InsertionMode::Text);
    }

    // ===== ACTIVE FORMATTING ELEMENTS =====

    /// [§ 13.2.4.3 Reconstruct the active formatting elements](https://html.spec.whatwg.org/multipage/parsing.html#reconstruct-the-active-formatting-elements)
    pub(super) fn reconstruct_active_formatting_elements(&mut self) {
        // STEP 1: "If there are no entries in the list of active formatting
        //          elements, then there is nothing to reconstruct; stop this
        //          algorithm."
        // STEP 2: "If the last (most recently added) entry in the list of
        //          active formatting elements is a marker, or if it is an
        //          element that is in the stack of open elements, then there is
        //          nothing to reconstruct; stop this algorithm."
        let Some(last) = self.active_formatting_elements.entries().last() else {
            return;
        };
        match last.handle() {
            None => return,
            Some(handle) if self.open_elements.contains(handle) => return,
            Some(_) => {}
        }

        // STEP 3: "Let entry be the last (most recently added) element in the
        //          list of active formatting elements."
        let mut index = self.active_formatting_elements.len() - 1;

        // STEP 4-6: Rewind.
        while index > 0 {
            let previous = &self.active_formatting_elements.entries()[index - 1];
            match previous.handle() {
                None => break,
                Some(handle) if self.open_elements.contains(handle) => break,
                Some(_) => index -= 1,
            }
        }

        // STEP 7-10: Advance and create.
        while index < self.active_formatting_elements.len() {
            // STEP 8: "Create: Insert an HTML element for the token for which
            //          the element entry was created, to obtain new element."
            let Some(FormattingEntry::Element { token, .. }) =
                self.active_formatting_elements.get(index).cloned()
            else {
                index += 1;
                continue;
            };
            let element = self.insert_html_element(&token);
            // STEP 9: "Replace the entry for entry in the list with an entry
            //          for new element."
            self.active_formatting_elements.replace_at(index, element);
            // STEP 10: "If the entry for new element in the list of active
            //           formatting elements is not the last entry in the list,
            //           return to the step labeled advance."
            index += 1;
        }
    }

    // ===== CLOSING ELEMENTS =====

    /// [§ 13.2.6.4.7](https://html.spec.whatwg.org/multipage/parsing.html#close-a-p-element)
    ///
    /// "When the steps above say the user agent is to close a p element, it
    /// means that the user agent must run the following steps:"
    pub(super) fn close_p_element(&mut self) {
        // "Generate implied end tags, except for p elements."
        self.open_elements
            .generate_implied_end_tags_with_exclusion(Some(TagId::P));
        // "If the current node is not a p element, then this is a parse error."
        if !self.open_elements.current_is(TagId::P) {
            self.parse_error(ParseErrorCode::ClosingOfElementWithOpenChildElements);
        }
        // "Pop elements from the stack of open elements until a p element has
        // been popped from the stack."
        self.open_elements.pop_until_tag_popped(TagId::P);
    }

    /// "If the stack of open elements has a p element in button scope, then
    /// close a p element."
    pub(super) fn close_p_element_in_button_scope(&mut self) {
        if self.open_elements.has_in_button_scope(TagId::P) {
            self.close_p_element();
        }
    }

    /// [§ 13.2.4.1 Reset the insertion mode appropriately](https://html.spec.whatwg.org/multipage/parsing.html#reset-the-insertion-mode-appropriately)
    pub(super) fn reset_insertion_mode_appropriately(&mut self) {
        let mode = self.appropriate_insertion_mode();
        self.switch_to(mode);
    }

    fn appropriate_insertion_mode(&self) -> InsertionMode {
        let entries = self.open_elements.entries();

        // STEP 1-2: "Let last be false. Let node be the last node in the stack
        //            of open elements."
        for index in (0..entries.len()).rev() {
            // STEP 3: "Loop: If node is the first node in the stack of open
            //          elements, then set last to true, and, if the parser was
            //          created as part of the HTML fragment parsing algorithm
            //          (fragment case), set node to the context element passed
            //          to that algorithm."
            let last = index == 0;
            let node = match &self.fragment_context {
                Some(context) if last => &context.entry,
                _ => &entries[index],
            };

            if node.namespace == Namespace::Html {
                match node.tag_id {
                    // STEP 4: "If node is a select element, run these substeps:"
                    TagId::Select => {
                        if !last {
                            for ancestor in entries[..index].iter().rev() {
                                if ancestor.is(TagId::Template) {
                                    break;
                                }
                                if ancestor.is(TagId::Table) {
                                    return InsertionMode::InSelectInTable;
                                }
                            }
                        }
                        return InsertionMode::InSelect;
                    }
                    // STEP 5: "If node is a td or th element and last is false,
                    //          then switch the insertion mode to "in cell" and
                    //          return."
                    TagId::Td | TagId::Th if !last => return InsertionMode::InCell,
                    // STEP 6
                    TagId::Tr => return InsertionMode::InRow,
                    // STEP 7
                    TagId::Tbody | TagId::Thead | TagId::Tfoot => {
                        return InsertionMode::InTableBody;
                    }
                    // STEP 8
                    TagId::Caption => return InsertionMode::InCaption,
                    // STEP 9
                    TagId::Colgroup => return InsertionMode::InColumnGroup,
                    // STEP 10
                    TagId::Table => return InsertionMode::InTable,
                    // STEP 11: "If node is a template element, then switch the
                    //           insertion mode to the current template
                    //           insertion mode and return."
                    TagId::Template => {
                        return self
                            .template_insertion_modes
                            .last()
                            .copied()
                            .unwrap_or(InsertionMode::InTemplate);
                    }
                    // STEP 12
                    TagId::Head if !last => return InsertionMode::InHead,
                    // STEP 13
                    TagId::Body => return InsertionMode::InBody,
                    // STEP 14
                    TagId::Frameset => return InsertionMode::InFrameset,
                    // STEP 15: "If node is an html element, run these substeps:
                    //           If the head element pointer is null, switch the
                    //           insertion mode to "before head" and return.
                    //           Otherwise, switch the insertion mode to "after
                    //           head" and return."
                    TagId::Html => {
                        return if self.head_element.is_none() {
                            InsertionMode::BeforeHead
                        } else {
                            InsertionMode::AfterHead
                        };
                    }
                    _ => {}
                }
            }

            // STEP 16: "If last is true, then switch the insertion mode to "in
            //           body" and return."
            if last {
                return InsertionMode::InBody;
            }
        }
        InsertionMode::InBody
    }

    // ===== STOPPING =====

    /// [§ 13.2.7 The end](https://html.spec.whatwg.org/multipage/parsing.html#stop-parsing)
    ///
    /// "Pop all the nodes off the stack of open elements."
    ///
    /// In the fragment case the root's children are moved into a new
    /// document fragment.
    pub(crate) fn stop_parsing(&mut self) {
        if self.stopped {
            return;
        }
        self.token_end_tag = None;
        while self.open_elements.pop().is_some() {}
        self.flush_popped();
        self.stopped = true;
        log::debug!(target: "koala_html::parser", "parsing stopped");

        if self.fragment_context.is_some() {
            let fragment = self.adapter.create_document_fragment();
            if let Some(&root) = self.adapter.child_nodes(self.document).first() {
                for child in self.adapter.child_nodes(root) {
                    self.adapter.detach_node(child);
                    self.adapter.append_child(fragment, child);
                }
            }
            self.fragment = Some(fragment);
        }
    }
}

impl<A: TreeAdapter> TokenSink for TreeBuilder<A> {
    fn on_start_tag(&mut self, tag: TagToken) -> SinkResult {
        self.settle(Token::StartTag(tag))
    }

    fn on_end_tag(&mut self, tag: TagToken) -> SinkResult {
        self.settle(Token::EndTag(tag))
    }

    fn on_comment(&mut self, comment: CommentToken) -> SinkResult {
        self.settle(Token::Comment(comment))
    }

    fn on_doctype(&mut self, doctype: DoctypeToken) -> SinkResult {
        self.settle(Token::Doctype(doctype))
    }

    fn on_character(&mut self, text: TextToken) -> SinkResult {
        self.settle(Token::Character(text))
    }

    fn on_null_character(&mut self, text: TextToken) -> SinkResult {
        self.settle(Token::NullCharacter(text))
    }

    fn on_whitespace_character(&mut self, text: TextToken) -> SinkResult {
        self.settle(Token::WhitespaceCharacter(text))
    }

    fn on_eof(&mut self, location: Option<Location>) -> SinkResult {
        let result = self.settle(Token::EndOfFile { location });
        // Every insertion mode ends in "stop parsing" at end of file.
        self.stop_parsing();
        match result {
            SinkResult::Pause => SinkResult::Pause,
            _ => SinkResult::Stop,
        }
    }

    fn on_parse_error(&mut self, error: ParseError) {
        self.report(error);
    }

    fn in_foreign_content(&self) -> bool {
        self.adjusted_current_node()
            .is_some_and(|node| node.namespace != Namespace::Html)
    }

    fn wants_errors(&self) -> bool {
        self.on_parse_error.is_some()
    }
}
