//! Line-oriented parser for the sectioned `key = value` format
//!
//! Produces raw (uninterpolated) values. Keys are folded to lower case,
//! section names are kept as written.

use indexmap::IndexMap;
use serde::Serialize;

use super::error::ParseError;
use super::options::ParserOptions;

/// Entries of one section, in file order; `None` marks a presence-only key
pub type RawSection = IndexMap<String, Option<String>>;

/// Parsed text before interpolation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RawDocument {
    pub defaults: RawSection,
    pub sections: IndexMap<String, RawSection>,
}

impl RawDocument {
    /// Raw lookup with `DEFAULT` inheritance
    pub fn get(&self, default_section: &str, section: &str, key: &str) -> Option<&Option<String>> {
        if section == default_section {
            return self.defaults.get(key);
        }
        self.sections
            .get(section)?
            .get(key)
            .or_else(|| self.defaults.get(key))
    }
}

/// Key normalisation applied on parse and on every lookup
pub fn fold_key(key: &str) -> String {
    key.to_lowercase()
}

/// Where the next key/value line goes
#[derive(Debug, Clone)]
enum Target {
    Defaults,
    Section(String),
}

/// The option currently accepting continuation lines
struct OpenOption {
    target: Target,
    key: String,
    indent: usize,
    lines: Option<Vec<String>>,
}

struct Parser<'a> {
    opts: &'a ParserOptions,
    doc: RawDocument,
    target: Option<Target>,
    open: Option<OpenOption>,
}

pub fn parse(text: &str, opts: &ParserOptions) -> Result<RawDocument, ParseError> {
    let mut parser = Parser {
        opts,
        doc: RawDocument::default(),
        target: None,
        open: None,
    };
    for (index, line) in text.lines().enumerate() {
        parser.line(index + 1, line)?;
    }
    parser.close_option();
    Ok(parser.doc)
}

impl<'a> Parser<'a> {
    fn line(&mut self, lineno: usize, raw: &str) -> Result<(), ParseError> {
        let is_comment = self.is_full_line_comment(raw);
        let content = if is_comment {
            ""
        } else {
            self.strip_inline_comment(raw).trim()
        };

        if content.is_empty() {
            // Blank lines stay inside a multi-line value; comments don't.
            if !is_comment {
                if let Some(OpenOption { lines: Some(lines), .. }) = self.open.as_mut() {
                    lines.push(String::new());
                }
            }
            return Ok(());
        }

        let indent = raw.len() - raw.trim_start().len();
        if let Some(open) = self.open.as_mut() {
            if indent > open.indent {
                return match open.lines.as_mut() {
                    Some(lines) => {
                        lines.push(content.to_string());
                        Ok(())
                    }
                    None => Err(ParseError::MissingValue {
                        line: lineno,
                        text: raw.to_string(),
                    }),
                };
            }
        }
        self.close_option();

        if content.starts_with('[') {
            return self.section_header(lineno, content);
        }

        let Some(target) = self.target.clone() else {
            return Err(ParseError::MissingSectionHeader {
                line: lineno,
                text: raw.to_string(),
            });
        };
        self.option(lineno, raw, content, indent, target)
    }

    fn is_full_line_comment(&self, raw: &str) -> bool {
        let trimmed = raw.trim_start();
        self.opts
            .comment_prefixes
            .iter()
            .any(|prefix| trimmed.starts_with(*prefix))
    }

    /// Cut at the first inline comment prefix that follows whitespace
    fn strip_inline_comment<'l>(&self, raw: &'l str) -> &'l str {
        if self.opts.inline_comment_prefixes.is_empty() {
            return raw;
        }
        let mut previous: Option<char> = None;
        for (index, ch) in raw.char_indices() {
            if self.opts.inline_comment_prefixes.contains(&ch)
                && previous.is_some_and(char::is_whitespace)
            {
                return &raw[..index];
            }
            previous = Some(ch);
        }
        raw
    }

    fn section_header(&mut self, lineno: usize, content: &str) -> Result<(), ParseError> {
        let name = content
            .rfind(']')
            .filter(|end| *end > 1)
            .map(|end| &content[1..end]);
        let Some(name) = name else {
            return Err(ParseError::MalformedSection {
                line: lineno,
                text: content.to_string(),
            });
        };

        if name == self.opts.default_section {
            self.target = Some(Target::Defaults);
            return Ok(());
        }

        if self.doc.sections.contains_key(name) {
            if self.opts.strict {
                return Err(ParseError::DuplicateSection {
                    line: lineno,
                    section: name.to_string(),
                });
            }
        } else {
            self.doc.sections.insert(name.to_string(), RawSection::new());
        }
        self.target = Some(Target::Section(name.to_string()));
        Ok(())
    }

    fn option(
        &mut self,
        lineno: usize,
        raw: &str,
        content: &str,
        indent: usize,
        target: Target,
    ) -> Result<(), ParseError> {
        let split = content
            .char_indices()
            .find(|(_, ch)| self.opts.delimiters.contains(ch));

        let (key, value) = match split {
            Some((at, delim)) => {
                let key = content[..at].trim_end();
                let value = content[at + delim.len_utf8()..].trim_start();
                (key, Some(value.to_string()))
            }
            None if self.opts.allow_no_value => (content, None),
            None => {
                return Err(ParseError::MissingValue {
                    line: lineno,
                    text: raw.to_string(),
                })
            }
        };
        if key.is_empty() {
            return Err(ParseError::MissingValue {
                line: lineno,
                text: raw.to_string(),
            });
        }

        let key = fold_key(key);
        let exists = match &target {
            Target::Defaults => self.doc.defaults.contains_key(&key),
            Target::Section(name) => self
                .doc
                .sections
                .get(name)
                .is_some_and(|section| section.contains_key(&key)),
        };
        if self.opts.strict && exists {
            let section = match &target {
                Target::Defaults => self.opts.default_section.clone(),
                Target::Section(name) => name.clone(),
            };
            return Err(ParseError::DuplicateOption {
                line: lineno,
                section,
                key,
            });
        }

        self.open = Some(OpenOption {
            target,
            key,
            indent,
            lines: value.map(|v| vec![v]),
        });
        Ok(())
    }

    fn section_mut(&mut self, target: &Target) -> &mut RawSection {
        match target {
            Target::Defaults => &mut self.doc.defaults,
            Target::Section(name) => self.doc.sections.entry(name.clone()).or_default(),
        }
    }

    /// Join the pending option's lines and store it
    fn close_option(&mut self) {
        let Some(open) = self.open.take() else {
            return;
        };
        let value = open.lines.map(|lines| lines.join("\n").trim_end().to_string());
        let section = self.section_mut(&open.target);
        section.insert(open.key, value);
    }
}
