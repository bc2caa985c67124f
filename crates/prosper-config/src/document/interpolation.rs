//! Extended interpolation: `${key}`, `${section:key}` and `$$`

use super::error::ParseError;
use super::parser::{fold_key, RawDocument};

/// Nesting limit for references that themselves contain references
pub const MAX_INTERPOLATION_DEPTH: usize = 10;

/// Expands references in values of one raw document
pub struct Interpolator<'a> {
    raw: &'a RawDocument,
    default_section: &'a str,
}

impl<'a> Interpolator<'a> {
    pub fn new(raw: &'a RawDocument, default_section: &'a str) -> Self {
        Self { raw, default_section }
    }

    /// Expand `value`, read as option `key` of `section`
    ///
    /// Single-name references resolve against `section` (and `DEFAULT`);
    /// errors name the option being expanded, not the inner reference.
    pub fn expand(&self, section: &str, key: &str, value: &str) -> Result<String, ParseError> {
        if !value.contains('$') {
            return Ok(value.to_string());
        }
        let mut out = String::with_capacity(value.len());
        self.expand_into(&mut out, (section, key), section, value, 1)?;
        Ok(out)
    }

    fn expand_into(
        &self,
        out: &mut String,
        origin: (&str, &str),
        section: &str,
        value: &str,
        depth: usize,
    ) -> Result<(), ParseError> {
        if depth > MAX_INTERPOLATION_DEPTH {
            return Err(ParseError::InterpolationDepth {
                section: origin.0.to_string(),
                key: origin.1.to_string(),
                max_depth: MAX_INTERPOLATION_DEPTH,
            });
        }

        let mut rest = value;
        while let Some(at) = rest.find('$') {
            out.push_str(&rest[..at]);
            rest = &rest[at..];

            if rest.starts_with("$$") {
                out.push('$');
                rest = &rest[2..];
                continue;
            }
            if !rest.starts_with("${") {
                return Err(syntax(origin, format!("'$' must be followed by '$' or '{{', found: {:?}", rest)));
            }

            let Some(close) = rest.find('}').filter(|close| *close > 2) else {
                return Err(syntax(origin, format!("bad interpolation variable reference {:?}", rest)));
            };
            let reference = &rest[2..close];
            rest = &rest[close + 1..];

            let parts: Vec<&str> = reference.split(':').collect();
            let (target_section, target_key) = match parts.as_slice() {
                [key] => (section, fold_key(key)),
                [section, key] => (*section, fold_key(key)),
                _ => {
                    return Err(syntax(origin, format!("more than one ':' found: {:?}", reference)));
                }
            };

            let found = self
                .raw
                .get(self.default_section, target_section, &target_key)
                .and_then(|v| v.as_deref());
            let Some(found) = found else {
                return Err(ParseError::InterpolationMissing {
                    section: origin.0.to_string(),
                    key: origin.1.to_string(),
                    reference: reference.to_string(),
                });
            };

            if found.contains('$') {
                self.expand_into(out, origin, target_section, found, depth + 1)?;
            } else {
                out.push_str(found);
            }
        }
        out.push_str(rest);
        Ok(())
    }
}

fn syntax(origin: (&str, &str), message: String) -> ParseError {
    ParseError::InterpolationSyntax {
        section: origin.0.to_string(),
        key: origin.1.to_string(),
        message,
    }
}
