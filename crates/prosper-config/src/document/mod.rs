//! Structured config documents
//!
//! A [`ConfigDocument`] is the parsed form of one sectioned `key = value`
//! file. Values are stored as written; `${...}` references are expanded when
//! a key is read, so a bad reference only affects the keys that use it.
//!
//! ```
//! use prosper_config::document::{ConfigDocument, ParserOptions};
//!
//! let text = "[paths]\nroot = /srv\nlogs = ${root}/logs  # comment\n[flags]\nverbose\n";
//! let doc = ConfigDocument::parse(text, &ParserOptions::prosper()).unwrap();
//!
//! assert_eq!(doc.get_str("paths", "logs").unwrap().as_deref(), Some("/srv/logs"));
//! assert_eq!(doc.get("flags", "verbose"), Ok(Some(None)));
//! assert_eq!(doc.get("flags", "quiet"), Ok(None));
//! ```

mod error;
mod interpolation;
mod options;
mod parser;

use std::borrow::Cow;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use once_cell::sync::Lazy;
use serde::Serialize;

use crate::error::{ConfigError, ConfigResult};

pub use error::{ParseError, ValueError};
pub use interpolation::MAX_INTERPOLATION_DEPTH;
pub use options::{Interpolation, ParserOptions};
pub use parser::RawSection as Section;

use interpolation::Interpolator;
use parser::{fold_key, RawDocument};

/// Accepted spellings for boolean values
static BOOLEAN_STATES: Lazy<HashMap<&'static str, bool>> = Lazy::new(|| {
    let mut m = HashMap::new();
    for word in ["1", "yes", "true", "on"] {
        m.insert(word, true);
    }
    for word in ["0", "no", "false", "off"] {
        m.insert(word, false);
    }
    m
});

/// Parsed config file
///
/// Lookups in a section fall back to the `DEFAULT` entries; references in
/// an inherited value resolve in the context of the section being read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigDocument {
    #[serde(skip)]
    default_section: String,
    #[serde(skip)]
    interpolation: Interpolation,
    #[serde(flatten)]
    raw: RawDocument,
}

impl ConfigDocument {
    /// Parse `text` in the given dialect
    ///
    /// Only the layout is checked here; see [`get`](Self::get) for references.
    pub fn parse(text: &str, options: &ParserOptions) -> Result<Self, ParseError> {
        Ok(Self {
            default_section: options.default_section.clone(),
            interpolation: options.interpolation,
            raw: parser::parse(text, options)?,
        })
    }

    /// Read and parse a file; the handle is closed before returning
    pub fn from_path(path: impl AsRef<Path>, options: &ParserOptions) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::from_io(path, source))?;
        Self::parse(&text, options).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Look up and expand `(section, key)`
    ///
    /// `Ok(None)` when the section or key is missing, `Ok(Some(None))` for a
    /// presence-only key. `Err` when the value's references don't expand.
    /// `section` may name the default section.
    pub fn get(&self, section: &str, key: &str) -> Result<Option<Option<Cow<'_, str>>>, ParseError> {
        let key = fold_key(key);
        let Some(value) = self.raw.get(&self.default_section, section, &key) else {
            return Ok(None);
        };
        let Some(value) = value.as_deref() else {
            return Ok(Some(None));
        };
        if self.interpolation == Interpolation::None || !value.contains('$') {
            return Ok(Some(Some(Cow::Borrowed(value))));
        }
        Interpolator::new(&self.raw, &self.default_section)
            .expand(section, &key, value)
            .map(|expanded| Some(Some(Cow::Owned(expanded))))
    }

    /// Look up `(section, key)` and keep only real text values
    pub fn get_str(&self, section: &str, key: &str) -> Result<Option<Cow<'_, str>>, ParseError> {
        self.get(section, key).map(Option::flatten)
    }

    /// Value as written in the file, without expansion
    pub fn get_raw(&self, section: &str, key: &str) -> Option<Option<&str>> {
        self.raw
            .get(&self.default_section, section, &fold_key(key))
            .map(Option::as_deref)
    }

    /// Read a boolean (`1/yes/true/on`, `0/no/false/off`)
    pub fn get_bool(&self, section: &str, key: &str) -> Result<Option<bool>, ValueError> {
        let Some(text) = self.get_str(section, key)? else {
            return Ok(None);
        };
        BOOLEAN_STATES
            .get(text.to_lowercase().as_str())
            .copied()
            .map(Some)
            .ok_or_else(|| conversion_error(section, key, &text, "a boolean"))
    }

    pub fn get_int(&self, section: &str, key: &str) -> Result<Option<i64>, ValueError> {
        self.get_parsed(section, key, "an integer")
    }

    pub fn get_float(&self, section: &str, key: &str) -> Result<Option<f64>, ValueError> {
        self.get_parsed(section, key, "a float")
    }

    fn get_parsed<T: FromStr>(&self, section: &str, key: &str, expected: &'static str) -> Result<Option<T>, ValueError> {
        match self.get_str(section, key)? {
            None => Ok(None),
            Some(text) => text
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| conversion_error(section, key, &text, expected)),
        }
    }

    /// Whether a non-default section exists
    pub fn has_section(&self, section: &str) -> bool {
        self.raw.sections.contains_key(section)
    }

    pub fn has_option(&self, section: &str, key: &str) -> bool {
        self.get_raw(section, key).is_some()
    }

    /// Section names in file order, without the default section
    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.raw.sections.keys().map(String::as_str)
    }

    /// Keys of a section: its own, then the inherited defaults it doesn't shadow
    pub fn options(&self, section: &str) -> Option<Vec<&str>> {
        if section == self.default_section {
            return Some(self.raw.defaults.keys().map(String::as_str).collect());
        }
        let own = self.raw.sections.get(section)?;
        let inherited = self.raw.defaults.keys().filter(|key| !own.contains_key(*key));
        Some(own.keys().chain(inherited).map(String::as_str).collect())
    }

    /// Entries written in the default section, unexpanded
    pub fn defaults(&self) -> &Section {
        &self.raw.defaults
    }

    pub fn default_section(&self) -> &str {
        &self.default_section
    }

    /// A document with no sections and no defaults
    pub fn is_empty(&self) -> bool {
        self.raw.sections.is_empty() && self.raw.defaults.is_empty()
    }

    /// Pretty JSON dump of the values as written, for diagnostics
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn conversion_error(section: &str, key: &str, text: &str, expected: &'static str) -> ValueError {
    ValueError::Conversion {
        section: section.to_string(),
        key: fold_key(key),
        value: text.to_string(),
        expected,
    }
}
