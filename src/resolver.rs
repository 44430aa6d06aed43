use crate::directive::DirectiveForm;
use std::path::{Path, PathBuf};
use tracing::trace;

/// Ordered list of directories consulted for include names.
///
/// Fixed for the whole run: it is built once and only ever read while expanding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPath {
    dirs: Vec<PathBuf>,
}

impl SearchPath {
    pub fn new<I, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            dirs: dirs.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }

    /// Resolves an include name to an existing location.
    ///
    /// Quoted names are tried next to the referencing file first and fall back to the
    /// search directories; angled names only ever use the search directories. Among
    /// search directories the first one containing the name wins. Returns `None` when
    /// nothing exists.
    #[must_use]
    pub fn resolve(
        &self,
        name: &str,
        form: DirectiveForm,
        referencing_dir: &Path,
    ) -> Option<PathBuf> {
        if form == DirectiveForm::Quoted {
            let local = referencing_dir.join(name);
            trace!(candidate = %local.display(), "Trying local include");
            if local.exists() {
                return Some(local);
            }
        }

        self.dirs.iter().map(|dir| dir.join(name)).find(|candidate| {
            trace!(candidate = %candidate.display(), "Trying search directory");
            candidate.exists()
        })
    }
}

impl<P: Into<PathBuf>> FromIterator<P> for SearchPath {
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// Directory that quoted names in `file` are resolved against.
///
/// A bare file name has an empty parent, which joins as the current directory.
#[must_use]
pub fn referencing_dir(file: &Path) -> &Path {
    file.parent().unwrap_or_else(|| Path::new(""))
}
