//! Errors raised while parsing a config document

use thiserror::Error;

/// Parse and interpolation failures
///
/// Line numbers are 1-based and refer to the text handed to the parser.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("line {line}: file contains no section headers: {text:?}")]
    MissingSectionHeader { line: usize, text: String },

    #[error("line {line}: malformed section header: {text:?}")]
    MalformedSection { line: usize, text: String },

    #[error("line {line}: section {section:?} already exists")]
    DuplicateSection { line: usize, section: String },

    #[error("line {line}: option {key:?} in section {section:?} already exists")]
    DuplicateOption {
        line: usize,
        section: String,
        key: String,
    },

    #[error("line {line}: option without a value: {text:?}")]
    MissingValue { line: usize, text: String },

    #[error("bad interpolation in [{section}] {key}: {message}")]
    InterpolationSyntax {
        section: String,
        key: String,
        message: String,
    },

    #[error("bad interpolation in [{section}] {key}: no option {reference:?} to substitute")]
    InterpolationMissing {
        section: String,
        key: String,
        reference: String,
    },

    #[error("interpolation in [{section}] {key} exceeds the maximum depth of {max_depth}")]
    InterpolationDepth {
        section: String,
        key: String,
        max_depth: usize,
    },
}

impl ParseError {
    /// Whether the error came from resolving `${...}` references
    pub fn is_interpolation(&self) -> bool {
        matches!(
            self,
            ParseError::InterpolationSyntax { .. }
                | ParseError::InterpolationMissing { .. }
                | ParseError::InterpolationDepth { .. }
        )
    }
}

/// A typed read failed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// The value was present but did not convert
    #[error("[{section}] {key}: cannot read {value:?} as {expected}")]
    Conversion {
        section: String,
        key: String,
        value: String,
        expected: &'static str,
    },

    /// The value's `${...}` references did not expand
    #[error(transparent)]
    Interpolation(#[from] ParseError),
}
