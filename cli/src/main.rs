use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use serde::Deserialize;

use mdcheck::link::SchemeSet;

/// Process exit codes, Unix convention: 0 is clean, higher values indicate
/// increasingly severe problems.
mod exit_code {
    /// No findings.
    pub const CLEAN: i32 = 0;
    /// Validation findings were reported.
    pub const FINDINGS: i32 = 1;
    /// Configuration error (bad config file, invalid CLI args).
    pub const CONFIG_ERROR: i32 = 2;
    /// I/O error (file not found, permission denied, etc.).
    pub const IO_ERROR: i32 = 3;
}

const DEFAULT_CONFIG_PATH: &str = "mdcheck.toml";

#[derive(Parser)]
#[command(name = "mdcheck", version, about = "Markdown document integrity checker")]
struct Cli {
    /// Markdown file to check
    #[arg(default_value = "README.md")]
    file: String,

    /// Allowed link scheme (repeatable; overrides the config file)
    #[arg(short, long)]
    scheme: Vec<String>,

    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Disable colored diagnostic output
    #[arg(long)]
    no_color: bool,

    /// Suppress the summary report (diagnostics still go to stderr)
    #[arg(short, long)]
    quiet: bool,
}

/// TOML config file contents.
#[derive(Deserialize, Default)]
struct Config {
    /// Allowed link schemes, e.g. ["http", "https"]
    schemes: Option<Vec<String>>,
}

fn main() {
    let cli = Cli::parse();
    process::exit(run(cli));
}

fn run(cli: Cli) -> i32 {
    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(message) => {
            eprintln!("error: {}", message);
            return exit_code::CONFIG_ERROR;
        }
    };

    let schemes = if !cli.scheme.is_empty() {
        SchemeSet::new(&cli.scheme)
    } else if let Some(schemes) = config.schemes {
        SchemeSet::new(&schemes)
    } else {
        SchemeSet::default()
    };

    // Unreadable input is fatal: no partial report.
    let source = match std::fs::read_to_string(&cli.file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: cannot read '{}': {}", cli.file, e);
            return exit_code::IO_ERROR;
        }
    };

    let mut files = SimpleFiles::new();
    let file_id = files.add(cli.file.clone(), source.clone());

    let analysis = mdcheck::analyze(&source, file_id, &schemes);

    let color_choice = if cli.no_color {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };
    let writer = StandardStream::stderr(color_choice);
    let term_config = term::Config::default();
    for diagnostic in &analysis.diagnostics {
        let _ = term::emit_to_write_style(
            &mut writer.lock(),
            &term_config,
            &files,
            &diagnostic.to_diagnostic(),
        );
    }

    let report = analysis.report(&source);
    if !cli.quiet {
        print!("{}", report);
    }

    if report.pass {
        exit_code::CLEAN
    } else {
        exit_code::FINDINGS
    }
}

/// Load the TOML config from an explicit path, or from `mdcheck.toml` in the
/// working directory when present. An explicit path that cannot be read or
/// parsed is a configuration error.
fn load_config(path: Option<&Path>) -> Result<Config, String> {
    let path = match path {
        Some(path) => path,
        None => {
            let default = Path::new(DEFAULT_CONFIG_PATH);
            if !default.exists() {
                return Ok(Config::default());
            }
            default
        }
    };
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read config '{}': {}", path.display(), e))?;
    toml::from_str(&text).map_err(|e| format!("invalid config '{}': {}", path.display(), e))
}
