use crate::error::{Result, TextincError};
use crate::expander::{ExpandConfig, Expander};
use crate::resolver::SearchPath;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Flattens `input` into `output`, searching `search_dirs` in order.
///
/// Returns `true` on success. An unresolved include prints exactly one diagnostic
/// line to stdout and leaves the output holding everything expanded before it.
/// Failing to open the input or the output returns `false` without a diagnostic.
pub fn preprocess<I, P>(input: &Path, output: &Path, search_dirs: I) -> bool
where
    I: IntoIterator<Item = P>,
    P: Into<PathBuf>,
{
    let config = ExpandConfig::default().with_search_path(SearchPath::new(search_dirs));
    match try_preprocess(input, output, &config) {
        Ok(()) => true,
        Err(err) => {
            report(&err);
            false
        }
    }
}

/// Emits the user-facing part of a failed run: the diagnostic line for unresolved
/// includes, nothing but a debug log for everything else.
pub fn report(err: &TextincError) {
    match err.diagnostic() {
        Some(diag) => {
            if let Err(e) = diag.emit(&mut io::stdout().lock()) {
                debug!(error = %e, "Failed to write diagnostic");
            }
        }
        None => debug!(error = %err, "Preprocessing failed"),
    }
}

/// Flattens `input` into the file at `output` with a full configuration.
///
/// The input is checked before the output is created, so a missing input leaves no
/// output file behind. The output is flushed even when expansion fails part way.
///
/// # Errors
///
/// - `TextincError::InputOpen` if the input or a nested file cannot be opened.
/// - `TextincError::OutputOpen` if `output` cannot be created.
/// - Any error from `Expander::expand`.
pub fn try_preprocess(input: &Path, output: &Path, config: &ExpandConfig) -> Result<()> {
    File::open(input).map_err(|source| TextincError::InputOpen {
        path: input.to_path_buf(),
        source,
    })?;

    let file = File::create(output).map_err(|source| TextincError::OutputOpen {
        path: output.to_path_buf(),
        source,
    })?;
    let mut writer = BufWriter::new(file);

    info!(
        input = %input.display(),
        output = %output.display(),
        "Flattening"
    );
    let result = expand_into(input, &mut writer, config);
    let flushed = writer.flush();
    result?;
    flushed?;
    Ok(())
}

/// Flattens `input` into any writer.
///
/// # Errors
///
/// Returns any error from `Expander::expand`.
pub fn expand_into<W: Write + ?Sized>(
    input: &Path,
    out: &mut W,
    config: &ExpandConfig,
) -> Result<()> {
    Expander::new(config).expand(input, out)
}

/// Flattens `input` in memory.
///
/// # Errors
///
/// Returns any error from `Expander::expand`. Partial output is discarded.
pub fn preprocess_to_string(input: &Path, config: &ExpandConfig) -> Result<String> {
    let mut out = Vec::new();
    expand_into(input, &mut out, config)?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}
