use clap::{Parser, ValueEnum};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use textinc::{
    DEFAULT_MARKER, DirectiveForm, DirectiveSyntax, ExpandConfig, Expander, IncludeRecord,
    Result, SearchPath, TextincError,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Environment variable holding extra search directories, appended after `-I` flags
const INCLUDE_PATH_ENV: &str = "TEXTINC_INCLUDE_PATH";

const LONG_HELP: &str = r#"
Directives (whole line only, surrounding whitespace allowed):
  #include "name"   - look next to the including file, then in search directories
  #include <name>   - look in search directories only

A directive followed by anything else on its line is plain text.

Examples:
  # Flatten to stdout
  textinc src/main.c -I include
  # Flatten to a file using two search directories, first match wins
  textinc src/main.c -I include -I vendor/include -o main.flat.c
  # Search directories from the environment
  TEXTINC_INCLUDE_PATH=include:vendor/include textinc src/main.c
  # Validate every include without writing anything
  textinc src/main.c -I include --check
  # Show every include and where it resolves
  textinc src/main.c -I include --list
  # Same, as JSON for scripting
  textinc src/main.c -I include --list=json
  # Other line-oriented syntaxes
  textinc styles/main.css --marker '@import'
  TEXTINC_MARKER='@import' textinc styles/main.css
"#;

/// Flatten text files by inlining their include directives.
///
/// Copyright 2025 0x484558 @ aleph0 s.r.o.
/// Licensed under the EUPL v1.2.
#[derive(Parser, Debug)]
#[command(
    name = "textinc",
    version,
    author = "0x484558 @ aleph0 s.r.o.",
    about = "Flatten text files by inlining their include directives.",
    after_long_help = LONG_HELP
)]
struct Cli {
    /// File to flatten
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output file (defaults to stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Search directory, in priority order (repeatable)
    #[arg(short = 'I', long = "include-dir", value_name = "DIR", action = clap::ArgAction::Append)]
    include_dirs: Vec<PathBuf>,

    /// Directive marker as a regular expression
    #[arg(long, value_name = "REGEX", env = "TEXTINC_MARKER", default_value = DEFAULT_MARKER)]
    marker: String,

    /// Allow unbounded recursion on circular includes
    #[arg(long)]
    no_cycle_check: bool,

    /// Expand everything but discard the output
    #[arg(long, conflicts_with_all = ["list", "output"])]
    check: bool,

    /// List includes and their resolution (optionally with format: plain, json)
    #[arg(long, value_name = "FORMAT", num_args = 0..=1, default_missing_value = "plain", conflicts_with = "output")]
    list: Option<ListFormat>,

    /// Increase verbosity (can be used multiple times)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum, PartialEq)]
enum ListFormat {
    /// One include per line, indented by depth
    Plain,
    /// JSON output for scripting
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    let config = match build_config(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::from(2);
        }
    };
    debug!(
        search_path = ?config.search_path.dirs(),
        marker = config.syntax.marker(),
        "Configured"
    );

    let result = if let Some(format) = cli.list {
        list_includes(&cli.input, format, &config)
    } else if cli.check {
        check(&cli.input, &config)
    } else if let Some(output) = &cli.output {
        textinc::try_preprocess(&cli.input, output, &config)
    } else {
        flatten_to_stdout(&cli.input, &config)
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if e.diagnostic().is_some() {
                textinc::report(&e);
            } else {
                eprintln!("Error: {e}");
            }
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(cli: &Cli) {
    let filter = match (cli.quiet, cli.verbose) {
        (true, _) => EnvFilter::new("error"),
        (false, 0) => {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
        }
        (false, 1) => EnvFilter::new("textinc=info"),
        (false, 2) => EnvFilter::new("textinc=debug"),
        (false, _) => EnvFilter::new("textinc=trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn build_config(cli: &Cli) -> Result<ExpandConfig> {
    let mut dirs = cli.include_dirs.clone();
    if let Some(paths) = std::env::var_os(INCLUDE_PATH_ENV) {
        dirs.extend(std::env::split_paths(&paths).filter(|p| !p.as_os_str().is_empty()));
    }

    Ok(ExpandConfig::default()
        .with_search_path(SearchPath::new(dirs))
        .with_syntax(DirectiveSyntax::new(&cli.marker)?)
        .with_cycle_detection(!cli.no_cycle_check))
}

fn flatten_to_stdout(input: &Path, config: &ExpandConfig) -> Result<()> {
    // Input is checked up front so nothing is written for a missing root
    std::fs::File::open(input).map_err(|source| TextincError::InputOpen {
        path: input.to_path_buf(),
        source,
    })?;

    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());
    let result = textinc::expand_into(input, &mut writer, config);
    writer.flush()?;
    result
}

fn check(input: &Path, config: &ExpandConfig) -> Result<()> {
    info!(input = %input.display(), "Checking includes");
    textinc::expand_into(input, &mut io::sink(), config)?;
    info!("All includes resolved");
    Ok(())
}

fn list_includes(input: &Path, format: ListFormat, config: &ExpandConfig) -> Result<()> {
    let records = Expander::new(config).scan(input)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match format {
        ListFormat::Plain => {
            for record in &records {
                writeln!(out, "{}", format_record(record))?;
            }
        }
        ListFormat::Json => {
            let json = serde_json::to_string_pretty(&records)?;
            writeln!(out, "{json}")?;
        }
    }

    let unresolved = records.iter().filter(|r| r.resolved.is_none()).count();
    info!(total = records.len(), unresolved, "Listed includes");
    Ok(())
}

fn format_record(record: &IncludeRecord) -> String {
    let reference = match record.form {
        DirectiveForm::Quoted => format!("\"{}\"", record.name),
        DirectiveForm::Angled => format!("<{}>", record.name),
    };
    let target = record
        .resolved
        .as_ref()
        .map_or_else(|| "(unresolved)".to_string(), |p| p.display().to_string());
    format!(
        "{}{}:{}: {} -> {}",
        "  ".repeat(record.depth),
        record.file.display(),
        record.line,
        reference,
        target
    )
}
