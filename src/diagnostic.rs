use std::fmt;
use std::io::{self, Write};
use std::path::PathBuf;

/// An include directive that could not be resolved.
///
/// `file` is the file that directly contains the directive, which for a nested failure
/// is the nested file and not the root being flattened. `line` is 1-based and local to
/// that file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Reference name exactly as written between the delimiters
    pub name: String,
    /// File containing the directive
    pub file: PathBuf,
    /// 1-based line of the directive within `file`
    pub line: usize,
}

impl Diagnostic {
    pub fn new(name: impl Into<String>, file: impl Into<PathBuf>, line: usize) -> Self {
        Self {
            name: name.into(),
            file: file.into(),
            line,
        }
    }

    /// Writes the diagnostic as a single line to `sink`.
    ///
    /// # Errors
    ///
    /// Returns any I/O error raised by the sink.
    pub fn emit<W: Write + ?Sized>(&self, sink: &mut W) -> io::Result<()> {
        writeln!(sink, "{self}")?;
        sink.flush()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown include file {} at file {} at line {}",
            self.name,
            self.file.display(),
            self.line
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_format() {
        let diag = Diagnostic::new("dummy.txt", "sources/a.cpp", 8);
        assert_eq!(
            diag.to_string(),
            "unknown include file dummy.txt at file sources/a.cpp at line 8"
        );
    }

    #[test]
    fn test_emit_writes_one_line() {
        let diag = Diagnostic::new("std1.h", "dir/c.h", 2);
        let mut buf = Vec::new();
        diag.emit(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "unknown include file std1.h at file dir/c.h at line 2\n"
        );
        assert_eq!(text.lines().count(), 1);
    }

    #[test]
    fn test_name_kept_verbatim() {
        // Names are not trimmed or unescaped
        let diag = Diagnostic::new(" spaced name ", "x", 1);
        assert!(diag.to_string().contains("file  spaced name  at"));
    }
}
