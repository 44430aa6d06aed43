use crate::diagnostic::Diagnostic;
use crate::directive::{DirectiveForm, DirectiveSyntax, LineKind};
use crate::error::{Result, TextincError};
use crate::resolver::{SearchPath, referencing_dir};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Configuration for flattening
#[derive(Debug, Clone)]
pub struct ExpandConfig {
    /// Ordered directories searched for include names
    pub search_path: SearchPath,
    /// Directive marker and patterns
    pub syntax: DirectiveSyntax,
    /// Whether re-entering a file that is still being expanded is an error
    pub detect_cycles: bool,
}

impl Default for ExpandConfig {
    fn default() -> Self {
        Self {
            search_path: SearchPath::default(),
            syntax: DirectiveSyntax::default(),
            detect_cycles: true,
        }
    }
}

impl ExpandConfig {
    #[must_use]
    pub fn with_search_path(mut self, search_path: SearchPath) -> Self {
        self.search_path = search_path;
        self
    }

    #[must_use]
    pub fn with_syntax(mut self, syntax: DirectiveSyntax) -> Self {
        self.syntax = syntax;
        self
    }

    #[must_use]
    pub fn with_cycle_detection(mut self, detect_cycles: bool) -> Self {
        self.detect_cycles = detect_cycles;
        self
    }
}

/// One directive met while scanning the include graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IncludeRecord {
    /// File containing the directive
    pub file: PathBuf,
    /// 1-based line within `file`
    pub line: usize,
    pub form: DirectiveForm,
    pub name: String,
    /// Where the name resolved to, if anywhere
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved: Option<PathBuf>,
    /// Nesting depth of `file`, the root being 0
    pub depth: usize,
}

/// Depth-first include expander.
///
/// Writes each plain line of a file to the output in order and replaces every
/// directive line with the full expansion of the file it names. Line numbers are
/// counted per file. The first unresolved directive stops the whole run; whatever
/// was already written stays in the output.
#[derive(Debug)]
pub struct Expander<'a> {
    config: &'a ExpandConfig,
    // Canonical paths of files currently being expanded, outermost first
    in_progress: Vec<PathBuf>,
    depth: usize,
}

impl<'a> Expander<'a> {
    #[must_use]
    pub fn new(config: &'a ExpandConfig) -> Self {
        Self {
            config,
            in_progress: Vec::new(),
            depth: 0,
        }
    }

    /// Expands `file` into `out`.
    ///
    /// A directory reads as an empty file, so `#include "some/dir"` and `#include ""`
    /// contribute no lines.
    ///
    /// # Errors
    ///
    /// - `TextincError::InputOpen` if `file` or any file it includes cannot be opened.
    /// - `TextincError::UnresolvedInclude` for the first directive that resolves nowhere.
    /// - `TextincError::CircularInclude` if cycle detection is on and a file includes itself.
    /// - `TextincError::Io` if reading or writing fails mid-stream.
    pub fn expand<W: Write + ?Sized>(&mut self, file: &Path, out: &mut W) -> Result<()> {
        if file.is_dir() {
            debug!(path = %file.display(), "Directory expands to nothing");
            return Ok(());
        }
        let reader = open_input(file)?;
        self.enter(file)?;
        let result = self.expand_lines(file, reader, out);
        self.leave();
        result
    }

    fn expand_lines<W: Write + ?Sized>(
        &mut self,
        file: &Path,
        mut reader: BufReader<File>,
        out: &mut W,
    ) -> Result<()> {
        debug!(path = %file.display(), depth = self.depth - 1, "Expanding file");
        let dir = referencing_dir(file);
        let mut buf = Vec::new();
        let mut line_number = 0;

        while read_line(&mut reader, &mut buf)? {
            line_number += 1;
            match self.config.syntax.classify(&buf) {
                LineKind::Text => {
                    out.write_all(&buf)?;
                    out.write_all(b"\n")?;
                }
                LineKind::Directive(directive) => {
                    let Some(target) =
                        self.config
                            .search_path
                            .resolve(&directive.name, directive.form, dir)
                    else {
                        debug!(
                            path = %file.display(),
                            line = line_number,
                            name = %directive.name,
                            "Unresolved include"
                        );
                        return Err(TextincError::UnresolvedInclude(Diagnostic::new(
                            directive.name,
                            file,
                            line_number,
                        )));
                    };
                    trace!(
                        path = %file.display(),
                        line = line_number,
                        target = %target.display(),
                        "Including"
                    );
                    self.expand(&target, out)?;
                }
            }
        }

        Ok(())
    }

    /// Walks the include graph from `root` without producing output.
    ///
    /// Returns every directive in the order `expand` would meet it. Unresolved names are
    /// recorded and skipped instead of stopping the walk.
    ///
    /// # Errors
    ///
    /// - `TextincError::InputOpen` if a file on the graph cannot be opened.
    /// - `TextincError::CircularInclude` if cycle detection is on and a file includes itself.
    /// - `TextincError::Io` if reading fails.
    pub fn scan(&mut self, root: &Path) -> Result<Vec<IncludeRecord>> {
        let mut records = Vec::new();
        self.scan_file(root, &mut records)?;
        Ok(records)
    }

    fn scan_file(&mut self, file: &Path, records: &mut Vec<IncludeRecord>) -> Result<()> {
        if file.is_dir() {
            return Ok(());
        }
        let reader = open_input(file)?;
        self.enter(file)?;
        let result = self.scan_lines(file, reader, records);
        self.leave();
        result
    }

    fn scan_lines(
        &mut self,
        file: &Path,
        mut reader: BufReader<File>,
        records: &mut Vec<IncludeRecord>,
    ) -> Result<()> {
        // enter() has already counted this file
        let depth = self.depth - 1;
        let dir = referencing_dir(file);
        let mut buf = Vec::new();
        let mut line_number = 0;

        while read_line(&mut reader, &mut buf)? {
            line_number += 1;
            let LineKind::Directive(directive) = self.config.syntax.classify(&buf) else {
                continue;
            };
            let resolved = self
                .config
                .search_path
                .resolve(&directive.name, directive.form, dir);
            records.push(IncludeRecord {
                file: file.to_path_buf(),
                line: line_number,
                form: directive.form,
                name: directive.name,
                resolved: resolved.clone(),
                depth,
            });
            if let Some(target) = resolved {
                self.scan_file(&target, records)?;
            }
        }

        Ok(())
    }

    fn enter(&mut self, file: &Path) -> Result<()> {
        if !self.config.detect_cycles {
            self.depth += 1;
            return Ok(());
        }
        let identity = fs::canonicalize(file).unwrap_or_else(|_| file.to_path_buf());
        if let Some(first) = self.in_progress.iter().position(|p| *p == identity) {
            let mut chain = self.in_progress[first..].to_vec();
            chain.push(identity.clone());
            return Err(TextincError::CircularInclude {
                path: identity,
                chain,
            });
        }
        self.in_progress.push(identity);
        self.depth += 1;
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
        if self.config.detect_cycles {
            self.in_progress.pop();
        }
    }
}

fn open_input(path: &Path) -> Result<BufReader<File>> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| TextincError::InputOpen {
            path: path.to_path_buf(),
            source,
        })
}

/// Reads the next line into `buf` without its `\n` or `\r\n` terminator.
/// Returns `false` at end of input.
fn read_line<R: BufRead>(reader: &mut R, buf: &mut Vec<u8>) -> Result<bool> {
    buf.clear();
    if reader.read_until(b'\n', buf)? == 0 {
        return Ok(false);
    }
    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }
    Ok(true)
}
