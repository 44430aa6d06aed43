//! Recognition of include directive lines.
//!
//! A directive occupies a whole line: optional whitespace, the marker, optional
//! whitespace, a name in `"quotes"` or `<angle brackets>`, optional trailing
//! whitespace. Anything else on the line makes it plain text.

use crate::error::Result;
use regex::bytes::Regex;
use serde::Serialize;

/// Marker of the conventional C-style `#include` directive, with optional space after `#`
pub const DEFAULT_MARKER: &str = r"#\s*include";

// Markers may carry their own capture groups, so the name is looked up by group name
const NAME_GROUP: &str = "name";

/// Delimiter style of a directive, which selects how its name is resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectiveForm {
    /// `"name"`: local directory first, then the search path
    Quoted,
    /// `<name>`: search path only
    Angled,
}

/// An include directive extracted from a single line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub form: DirectiveForm,
    /// Text between the delimiters, verbatim
    pub name: String,
}

/// Result of classifying one line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    Directive(Directive),
    Text,
}

/// Compiled whole-line patterns for one directive marker.
#[derive(Debug, Clone)]
pub struct DirectiveSyntax {
    marker: String,
    quoted: Regex,
    angled: Regex,
}

impl DirectiveSyntax {
    /// Builds the syntax for a marker given as a regular expression fragment.
    ///
    /// # Errors
    ///
    /// Returns `TextincError::InvalidSyntax` if the marker does not compile.
    pub fn new(marker: &str) -> Result<Self> {
        let quoted = Regex::new(&format!(
            r#"^\s*(?:{marker})\s*"(?P<{NAME_GROUP}>[^"]*)"\s*$"#
        ))?;
        let angled = Regex::new(&format!(
            r"^\s*(?:{marker})\s*<(?P<{NAME_GROUP}>[^>]*)>\s*$"
        ))?;
        Ok(Self {
            marker: marker.to_string(),
            quoted,
            angled,
        })
    }

    /// Builds the syntax for a literal marker such as `@import` or `.include`.
    ///
    /// # Errors
    ///
    /// Returns `TextincError::InvalidSyntax` if the resulting pattern does not compile.
    pub fn literal(marker: &str) -> Result<Self> {
        Self::new(&regex::escape(marker))
    }

    #[must_use]
    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Classifies a line given without its terminator. Quoted form wins over angled.
    #[must_use]
    pub fn classify(&self, line: &[u8]) -> LineKind {
        if let Some(name) = capture_name(&self.quoted, line) {
            return LineKind::Directive(Directive {
                form: DirectiveForm::Quoted,
                name,
            });
        }
        if let Some(name) = capture_name(&self.angled, line) {
            return LineKind::Directive(Directive {
                form: DirectiveForm::Angled,
                name,
            });
        }
        LineKind::Text
    }
}

impl Default for DirectiveSyntax {
    fn default() -> Self {
        Self::new(DEFAULT_MARKER).expect("default marker is a valid pattern")
    }
}

fn capture_name(pattern: &Regex, line: &[u8]) -> Option<String> {
    let captures = pattern.captures(line)?;
    let name = captures.name(NAME_GROUP)?;
    Some(String::from_utf8_lossy(name.as_bytes()).into_owned())
}
