use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::{ArgAction, Parser};
use decomment::dialects::Dialect;
use decomment::{Config, run_with_config};

/// decomment - remove comments from source files.
///
/// Detects the comment dialect from each file's extension and then:
///
///   - removes multi-line (block) comments
///   - strips trailing single-line comments, leaving the code before them
///   - blanks out full-line comments
///   - collapses the blank lines left behind
///
/// Comment markers inside string literals (and `://` in URLs) are left alone.
#[derive(Parser, Debug)]
#[command(
    name = "decomment",
    author,
    version,
    about = "Remove comments from source files, auto-detecting the comment dialect",
    long_about = r#"Remove comments from source files.

The comment dialect (c_style, python, sql, ...) is detected from each file's
extension; unrecognized files fall back to C-style markers. Block comments are
removed, trailing single-line comments are stripped, full-line comments become
blank lines, and runs of blank lines are collapsed. Markers inside string
literals and the `//` of URLs are never treated as comments.

Directories are scanned recursively, honouring .gitignore / .ignore / git
exclude files, and only files with a recognized extension are processed.

Typical usage:
  decomment main.py
  decomment -i src tests
  decomment -t sql query.txt
  decomment --list-types
"#
)]
struct Args {
    /// Files or directories to process.
    #[arg(value_name = "PATH")]
    paths: Vec<PathBuf>,

    /// Write the cleaned text to a file instead of stdout.
    ///
    /// Only valid with a single input file.
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    output: Option<PathBuf>,

    /// Rewrite each input file directly (use with caution!).
    ///
    /// The original is kept next to the file as a timestamped .bak backup.
    #[arg(short = 'i', long = "in-place")]
    in_place: bool,

    /// Force a specific dialect (e.g. python, c_style, sql) instead of
    /// detecting it from the file extension.
    ///
    /// An unrecognized name falls back to auto-detection with a warning.
    #[arg(short = 't', long = "type", value_name = "TYPE")]
    forced_type: Option<String>,

    /// List all supported dialects and exit.
    #[arg(short = 'l', long = "list-types")]
    list_types: bool,

    /// Print dialect-detection details to stderr.
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    /// Follow symbolic links when scanning directories.
    #[arg(long = "follow-symlinks")]
    follow_symlinks: bool,

    /// Disable reading .gitignore / .ignore / git exclude files.
    ///
    /// By default, directory scans honour:
    ///   - .gitignore files in the tree
    ///   - .ignore files
    ///   - global Git exclude config
    #[arg(long = "no-gitignore")]
    no_gitignore: bool,

    /// Additional glob patterns to exclude from directory scans.
    ///
    /// Patterns are evaluated relative to each PATH root and use glob-style
    /// matching (via globset), e.g.:
    ///
    ///   decomment src --exclude 'migrations/**'
    ///   decomment . --exclude 'tests/**,*.gen.py'
    ///
    /// Multiple flags and comma-separated values are both allowed.
    #[arg(
        long = "exclude",
        short = 'E',
        value_name = "GLOB",
        action = ArgAction::Append,
        value_delimiter = ','
    )]
    excludes: Vec<String>,

    /// Maximum file size to process during directory scans, in bytes.
    #[arg(long = "max-bytes", value_name = "N")]
    max_bytes: Option<u64>,

    /// Output as a JSON array of objects { "path": ..., "dialect": ..., "content": ... }.
    #[arg(long = "json")]
    json: bool,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    if args.list_types {
        print_dialects();
        return Ok(());
    }

    if args.paths.is_empty() {
        bail!("At least one input path is required (or use --list-types).");
    }

    let cfg = Config {
        paths: args.paths,
        output: args.output,
        in_place: args.in_place,
        forced_type: args.forced_type,
        verbose: args.verbose,
        json: args.json,
        follow_symlinks: args.follow_symlinks,
        no_gitignore: args.no_gitignore,
        excludes: args.excludes,
        max_bytes: args.max_bytes,
    };

    run_with_config(cfg)
}

fn print_dialects() {
    println!("Supported file types:");
    for dialect in Dialect::ALL {
        let desc = dialect.descriptor();
        println!("  {}:", dialect.name());
        println!("    Extensions: {}", desc.extensions.join(", "));
        println!(
            "    Single-line comment: {}",
            desc.single_line.unwrap_or("None")
        );
        match desc.multi_line {
            Some((open, close)) => println!("    Multi-line comment: {open} ... {close}"),
            None => println!("    Multi-line comment: None"),
        }
        println!();
    }
}
