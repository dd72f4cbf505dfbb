use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result, bail};
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::{DirEntry, WalkBuilder};

pub mod dialects;
pub mod strip;

use crate::dialects::Dialect;
use crate::strip::strip;

/// Configuration passed from the CLI layer (main.rs) into the core logic.
#[derive(Debug)]
pub struct Config {
    pub paths: Vec<PathBuf>,
    pub output: Option<PathBuf>,
    pub in_place: bool,
    pub forced_type: Option<String>,
    pub verbose: bool,
    pub json: bool,
    pub follow_symlinks: bool,
    pub no_gitignore: bool,
    pub excludes: Vec<String>,
    pub max_bytes: Option<u64>,
}

#[derive(serde::Serialize)]
struct FileEntry {
    path: String,
    dialect: String,
    content: String,
}

pub fn run_with_config(cfg: Config) -> Result<()> {
    if cfg.in_place && cfg.output.is_some() {
        bail!("Cannot use --in-place (-i) and --output (-o) together.");
    }
    if cfg.json && (cfg.in_place || cfg.output.is_some()) {
        bail!("--json writes to stdout and cannot be combined with --in-place or --output.");
    }

    // Plain stdout for exactly one named file; everything else gets headers.
    let single_file = cfg.paths.len() == 1 && cfg.paths[0].is_file();
    if cfg.output.is_some() && !single_file {
        bail!("--output (-o) requires a single input file.");
    }

    let forced = forced_dialect(cfg.forced_type.as_deref());
    if cfg.verbose && let Some(dialect) = forced {
        eprintln!("Using forced file type: {}", dialect.name());
    }

    let exclude_globset = build_exclude_globset(&cfg.excludes)?;

    let mut had_error = false;
    let mut first_file = true;

    if cfg.json {
        println!("[");
    }

    for raw_root in &cfg.paths {
        if raw_root.is_file() {
            let display = normalize_for_matching(raw_root);
            if let Err(err) =
                process_file(raw_root, &display, forced, &cfg, !single_file, &mut first_file)
            {
                eprintln!("Error processing {}: {:#}", display, err);
                had_error = true;
            }
            continue;
        }

        // Canonicalise roots so running from arbitrary working dirs is reliable.
        let canon_root = match raw_root.canonicalize() {
            Ok(p) => p,
            Err(e) => {
                eprintln!("Skipping root {:?}: {}", raw_root, e);
                had_error = true;
                continue;
            }
        };

        let mut builder = WalkBuilder::new(&canon_root);
        builder.follow_links(cfg.follow_symlinks);

        // Helps avoid edge cases where process CWD is invalid and global ignores need a base.
        builder.current_dir(canon_root.clone());

        if cfg.no_gitignore {
            builder
                .git_ignore(false)
                .git_exclude(false)
                .git_global(false)
                .ignore(false);
        } else {
            builder
                .git_ignore(true)
                .git_exclude(true)
                .git_global(true)
                .ignore(true)
                .require_git(false);
        }

        // Values moved into the 'static filter closure must be owned separately.
        let root_for_filter = canon_root.clone();
        let exclude_globset = exclude_globset.clone();

        builder.filter_entry(move |entry: &DirEntry| {
            // Always keep the root.
            if entry.depth() == 0 {
                return true;
            }

            // Apply user exclude globs, relative to the current root.
            if let Some(ref gs) = exclude_globset {
                let path = entry.path();
                let rel = path.strip_prefix(&root_for_filter).unwrap_or(path);
                let rel_norm = normalize_for_matching(rel);

                if gs.is_match(&rel_norm) {
                    return false;
                }

                // If this is a directory, also try a trailing slash to make patterns
                // like `tests/**` able to prune the whole subtree early.
                if entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false)
                    && !rel_norm.ends_with('/')
                {
                    let rel_dir = format!("{rel_norm}/");
                    if gs.is_match(&rel_dir) {
                        return false;
                    }
                }
            }

            true
        });

        let walker = builder.build();

        for result in walker {
            let entry = match result {
                Ok(e) => e,
                Err(err) => {
                    eprintln!("Walk error: {err}");
                    had_error = true;
                    continue;
                }
            };

            if !entry.file_type().map(|ft| ft.is_file()).unwrap_or(false) {
                continue;
            }

            let path = entry.path();

            // The c_style fallback is for files the user names explicitly;
            // a directory scan only picks up recognized extensions.
            if Dialect::resolve(path) == Dialect::Unknown {
                continue;
            }

            let display = make_display_path(&canon_root, path);

            if let Some(limit) = cfg.max_bytes
                && let Ok(meta) = fs::metadata(path)
                && meta.len() > limit
            {
                eprintln!(
                    "Skipping {} (size {} bytes > max {} bytes)",
                    display,
                    meta.len(),
                    limit
                );
                continue;
            }

            if let Err(err) = process_file(path, &display, forced, &cfg, true, &mut first_file) {
                eprintln!("Error processing {}: {:#}", display, err);
                had_error = true;
            }
        }
    }

    if cfg.json {
        println!("\n]");
    }

    if had_error {
        anyhow::bail!("One or more files could not be processed. See stderr for details.");
    }

    Ok(())
}

/// Resolve a forced `--type` name. An unrecognized name falls back to
/// extension detection with a warning rather than an error.
fn forced_dialect(name: Option<&str>) -> Option<Dialect> {
    let name = name?;
    match Dialect::from_name(name) {
        Some(dialect) => Some(dialect),
        None => {
            eprintln!("Warning: file type '{name}' not recognized. Auto-detecting instead.");
            None
        }
    }
}

/// Strip one file and deliver the result per the configured output mode.
fn process_file(
    path: &Path,
    display: &str,
    forced: Option<Dialect>,
    cfg: &Config,
    with_header: bool,
    first_file: &mut bool,
) -> Result<()> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read {display}"))?;
    let text = String::from_utf8_lossy(&bytes);

    let dialect = forced.unwrap_or_else(|| Dialect::resolve(path));

    if cfg.verbose {
        let desc = dialect.descriptor();
        eprintln!(
            "{display}: {} (single-line: {}, multi-line: {})",
            dialect.name(),
            desc.single_line.unwrap_or("none"),
            desc.multi_line
                .map(|(open, close)| format!("{open} ... {close}"))
                .unwrap_or_else(|| "none".to_string()),
        );
    }

    let cleaned = strip(&text, dialect);

    if cfg.in_place {
        return write_in_place(path, display, &cleaned);
    }

    if let Some(out_path) = &cfg.output {
        fs::write(out_path, &cleaned)
            .with_context(|| format!("Failed to write {}", out_path.display()))?;
        eprintln!("Processed file written to: {}", out_path.display());
        return Ok(());
    }

    if cfg.json {
        if !*first_file {
            println!(",");
        }
        let entry = FileEntry {
            path: display.to_string(),
            dialect: dialect.name().to_string(),
            content: cleaned,
        };
        print!("{}", serde_json::to_string(&entry)?);
        *first_file = false;
        return Ok(());
    }

    if with_header {
        println!("========== FILE: {display} ==========");
        // `strip` always terminates its output with a newline.
        print!("{cleaned}");
        println!();
    } else {
        print!("{cleaned}");
    }

    Ok(())
}

/// Rewrite `path` with `cleaned`, keeping the original as a backup. If the
/// rewrite fails, the backup is moved back before the error is returned.
fn write_in_place(path: &Path, display: &str, cleaned: &str) -> Result<()> {
    let backup = backup_path(path);

    fs::rename(path, &backup).with_context(|| format!("Failed to back up {display}"))?;
    eprintln!("Backed up {display} to {}", backup.display());

    if let Err(err) = fs::write(path, cleaned) {
        let _ = fs::rename(&backup, path);
        return Err(err).with_context(|| format!("Failed to rewrite {display}"));
    }

    eprintln!("Comments processed in-place: {display}");
    Ok(())
}

/// Timestamped backup next to the original (`foo.1712345678.bak`), or a
/// plain `<name>.bak` suffix if that name is somehow taken.
fn backup_path(path: &Path) -> PathBuf {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let stamped = path.with_extension(format!("{secs}.bak"));
    if !stamped.exists() {
        return stamped;
    }

    let mut fallback = path.as_os_str().to_owned();
    fallback.push(".bak");
    PathBuf::from(fallback)
}

/// Build a GlobSet from the user–provided `--exclude` patterns.
/// Returns `Ok(None)` if there are no patterns.
fn build_exclude_globset(patterns: &[String]) -> Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }

    let mut builder = GlobSetBuilder::new();

    for pat in patterns {
        let pat = pat.trim();
        if pat.is_empty() {
            continue;
        }

        let glob =
            Glob::new(pat).with_context(|| format!("Invalid --exclude glob pattern: {pat}"))?;
        builder.add(glob);
    }

    let set = builder
        .build()
        .context("Failed to build exclude glob set")?;

    Ok(Some(set))
}

/// Produce a display path relative to `root` (stable regardless of current working directory).
fn make_display_path(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);

    // If root is a file and path == root, rel is empty.
    if rel.as_os_str().is_empty() {
        return path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
    }

    normalize_for_matching(rel)
}

/// Convert paths to a stable, slash-separated form for matching/printing.
fn normalize_for_matching(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn make_display_path_is_root_relative() {
        let root = Path::new("/tmp/project");
        assert_eq!(
            make_display_path(root, Path::new("/tmp/project/src/main.py")),
            "src/main.py"
        );
        assert_eq!(
            make_display_path(root, Path::new("/tmp/project")),
            "project"
        );
    }

    #[test]
    fn invalid_exclude_glob_is_an_error() {
        assert!(build_exclude_globset(&["src/[".to_string()]).is_err());
        assert!(build_exclude_globset(&[]).unwrap().is_none());
    }
}
