//! Parser configuration.

use std::fmt;

use crate::error::ParseError;

/// Callback invoked for every parse error.
pub type ParseErrorCallback = Box<dyn FnMut(&ParseError)>;

/// Options accepted by [`crate::HTMLParser`] and the convenience entry points.
///
/// ```
/// use koala_html::ParserOptions;
///
/// let options = ParserOptions::default()
///     .with_source_code_location_info(true)
///     .with_scripting_enabled(false);
/// assert!(options.source_code_location_info);
/// ```
pub struct ParserOptions {
    /// [§ 13.2.6.4.7](https://html.spec.whatwg.org/multipage/parsing.html#scripting-flag)
    ///
    /// "The scripting flag is set to "enabled" if scripting was enabled for the
    /// Document with which the parser is associated when the parser was
    /// created, and "disabled" otherwise."
    ///
    /// Affects `<noscript>` handling only; scripts are never executed.
    pub scripting_enabled: bool,
    /// Record source locations on tokens and nodes.
    pub source_code_location_info: bool,
    /// Receives every parse error. Supplying a callback also turns on
    /// location tracking in the tokenizer so errors can carry positions.
    pub on_parse_error: Option<ParseErrorCallback>,
    /// Honor `/>` on non-void HTML elements (the element is closed
    /// immediately), and serialize childless elements as `<name/>`.
    pub self_close_enabled: bool,
    /// Keep tag names in their source case instead of lowercasing them.
    pub uppercase_tag_enabled: bool,
    /// Keep attribute names in their source case instead of lowercasing them.
    pub uppercase_attr_enabled: bool,
    /// Pause the parser after each `</script>` so the embedder can inspect
    /// the script element and optionally insert markup before resuming.
    pub pause_on_script: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            scripting_enabled: true,
            source_code_location_info: false,
            on_parse_error: None,
            self_close_enabled: false,
            uppercase_tag_enabled: false,
            uppercase_attr_enabled: false,
            pause_on_script: false,
        }
    }
}

impl ParserOptions {
    /// Set [`Self::scripting_enabled`].
    #[must_use]
    pub fn with_scripting_enabled(mut self, enabled: bool) -> Self {
        self.scripting_enabled = enabled;
        self
    }

    /// Set [`Self::source_code_location_info`].
    #[must_use]
    pub fn with_source_code_location_info(mut self, enabled: bool) -> Self {
        self.source_code_location_info = enabled;
        self
    }

    /// Install a parse error callback.
    #[must_use]
    pub fn with_on_parse_error(mut self, callback: impl FnMut(&ParseError) + 'static) -> Self {
        self.on_parse_error = Some(Box::new(callback));
        self
    }

    /// Set [`Self::self_close_enabled`].
    #[must_use]
    pub fn with_self_close_enabled(mut self, enabled: bool) -> Self {
        self.self_close_enabled = enabled;
        self
    }

    /// Set [`Self::uppercase_tag_enabled`].
    #[must_use]
    pub fn with_uppercase_tag_enabled(mut self, enabled: bool) -> Self {
        self.uppercase_tag_enabled = enabled;
        self
    }

    /// Set [`Self::uppercase_attr_enabled`].
    #[must_use]
    pub fn with_uppercase_attr_enabled(mut self, enabled: bool) -> Self {
        self.uppercase_attr_enabled = enabled;
        self
    }

    /// Set [`Self::pause_on_script`].
    #[must_use]
    pub fn with_pause_on_script(mut self, enabled: bool) -> Self {
        self.pause_on_script = enabled;
        self
    }

    /// Whether the tokenizer should compute token locations.
    pub(crate) const fn tracks_locations(&self) -> bool {
        self.source_code_location_info || self.on_parse_error.is_some()
    }
}

impl fmt::Debug for ParserOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParserOptions")
            .field("scripting_enabled", &self.scripting_enabled)
            .field("source_code_location_info", &self.source_code_location_info)
            .field("on_parse_error", &self.on_parse_error.is_some())
            .field("self_close_enabled", &self.self_close_enabled)
            .field("uppercase_tag_enabled", &self.uppercase_tag_enabled)
            .field("uppercase_attr_enabled", &self.uppercase_attr_enabled)
            .field("pause_on_script", &self.pause_on_script)
            .finish()
    }
}
