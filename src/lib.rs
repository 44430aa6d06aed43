//! # textinc
//!
//! Flattens a text file by recursively inlining the files it references through
//! whole-line include directives. Purely textual: no macros, no conditionals, no
//! tokenizing outside directive lines.
//!
//! ## Directives
//!
//! - `#include "name"` - resolved next to the including file, then on the search path
//! - `#include <name>` - resolved on the search path only
//!
//! The marker is configurable, so the same engine serves `@import "x"`, `.include <y>`
//! and similar line-oriented syntaxes.
//!
//! ## Usage
//!
//! ### As a Library
//!
//! ```no_run
//! use std::path::Path;
//!
//! let ok = textinc::preprocess(
//!     Path::new("src/main.c"),
//!     Path::new("main.flat.c"),
//!     ["include", "vendor/include"],
//! );
//! assert!(ok);
//! ```
//!
//! ### As a CLI Tool
//!
//! ```bash
//! # Flatten to stdout
//! textinc src/main.c -I include
//!
//! # Flatten to a file, two search directories
//! textinc src/main.c -I include -I vendor/include -o main.flat.c
//!
//! # List every include and where it resolves
//! textinc src/main.c -I include --list=json
//! ```

pub mod diagnostic;
pub mod directive;
pub mod error;
pub mod expander;
pub mod preprocess;
pub mod resolver;

// Re-export main types and functions for convenience
pub use diagnostic::Diagnostic;
pub use directive::{DEFAULT_MARKER, Directive, DirectiveForm, DirectiveSyntax, LineKind};
pub use error::{Result, TextincError};
pub use expander::{ExpandConfig, Expander, IncludeRecord};
pub use preprocess::{expand_into, preprocess, preprocess_to_string, report, try_preprocess};
pub use resolver::SearchPath;
