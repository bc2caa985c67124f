//! Parser dialect options

/// How `$` references inside values are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interpolation {
    /// Values are taken verbatim
    None,
    /// `${key}`, `${section:key}` and `$$`
    #[default]
    Extended,
}

/// Dialect accepted by [`ConfigDocument::parse`](super::ConfigDocument::parse)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserOptions {
    /// Characters separating a key from its value
    pub delimiters: Vec<char>,
    /// Prefixes marking a whole line as a comment
    pub comment_prefixes: Vec<char>,
    /// Prefixes starting a comment after whitespace inside a line
    pub inline_comment_prefixes: Vec<char>,
    /// Accept keys with no delimiter and no value
    pub allow_no_value: bool,
    /// Reject repeated sections and repeated keys within a section
    pub strict: bool,
    /// Name of the section whose entries every other section inherits
    pub default_section: String,
    pub interpolation: Interpolation,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            delimiters: vec!['=', ':'],
            comment_prefixes: vec!['#', ';'],
            inline_comment_prefixes: Vec::new(),
            allow_no_value: false,
            strict: true,
            default_section: "DEFAULT".to_string(),
            interpolation: Interpolation::Extended,
        }
    }
}

impl ParserOptions {
    /// The dialect used for master and local config files
    ///
    /// `=` is the only delimiter, `#` also starts inline comments, keys may
    /// stand alone, values use extended interpolation.
    pub fn prosper() -> Self {
        Self::default()
            .with_delimiters(['='])
            .with_inline_comment_prefixes(['#'])
            .with_allow_no_value(true)
            .with_interpolation(Interpolation::Extended)
    }

    pub fn with_delimiters(mut self, delimiters: impl IntoIterator<Item = char>) -> Self {
        self.delimiters = delimiters.into_iter().collect();
        self
    }

    pub fn with_comment_prefixes(mut self, prefixes: impl IntoIterator<Item = char>) -> Self {
        self.comment_prefixes = prefixes.into_iter().collect();
        self
    }

    pub fn with_inline_comment_prefixes(mut self, prefixes: impl IntoIterator<Item = char>) -> Self {
        self.inline_comment_prefixes = prefixes.into_iter().collect();
        self
    }

    pub fn with_allow_no_value(mut self, allow: bool) -> Self {
        self.allow_no_value = allow;
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_default_section(mut self, name: impl Into<String>) -> Self {
        self.default_section = name.into();
        self
    }

    pub fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = interpolation;
        self
    }
}
