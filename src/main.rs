use anyhow::{bail, Result};
use astsed::batch::{rewrite_files, search_files, FileSet, RewriteOptions, SearchOptions};
use astsed::presets;
use astsed::query::{compile_str, QueryNode};
use astsed::rewrite::EditScope;
use astsed::search::OutputMode;
use clap::{Parser, Subcommand};
use colored::Colorize;
use similar::{ChangeTag, TextDiff};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "astsed")]
#[command(about = "Structural search and rewrite for Rust source", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search files for structural pattern matches
    Search {
        /// File or directory to search
        path: PathBuf,

        /// JSON query pattern (omit when using --preset)
        pattern: Option<String>,

        /// Use a named preset instead of an inline pattern
        #[arg(short, long)]
        preset: Option<String>,

        /// Stop after this many matches across all files
        #[arg(short, long)]
        limit: Option<usize>,

        /// How matched text is rendered
        #[arg(short, long, value_enum, default_value = "full")]
        mode: OutputMode,

        /// Emit the aggregate result as JSON
        #[arg(long)]
        json: bool,

        /// Skip paths containing this directory name (repeatable)
        #[arg(long)]
        exclude: Vec<String>,
    },

    /// Rewrite matches with a capture-interpolated template
    Rewrite {
        /// File or directory to rewrite
        path: PathBuf,

        /// JSON query pattern (omit when using --preset)
        pattern: Option<String>,

        /// Use a named preset instead of an inline pattern
        #[arg(short, long)]
        preset: Option<String>,

        /// Replacement template; ${name} interpolates captures
        #[arg(short, long)]
        template: String,

        /// Replace only this capture's span instead of the whole match
        #[arg(long)]
        capture: Option<String>,

        /// Compute and report changes without writing files
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show unified diff of applied changes
        #[arg(short, long)]
        diff: bool,

        /// Stop after this many matches across all files
        #[arg(long)]
        limit: Option<usize>,

        /// Insert this import line into every rewritten file (idempotent)
        #[arg(long)]
        ensure_import: Option<String>,

        /// Skip paths containing this directory name (repeatable)
        #[arg(long)]
        exclude: Vec<String>,
    },

    /// List available anti-pattern presets
    Presets,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Search {
            path,
            pattern,
            preset,
            limit,
            mode,
            json,
            exclude,
        } => cmd_search(&path, pattern, preset, limit, mode, json, exclude),

        Commands::Rewrite {
            path,
            pattern,
            preset,
            template,
            capture,
            dry_run,
            diff,
            limit,
            ensure_import,
            exclude,
        } => cmd_rewrite(
            &path,
            pattern,
            preset,
            RewriteOptions {
                template,
                scope: capture.map_or(EditScope::WholeMatch, EditScope::Capture),
                dry_run,
                limit,
                ensure_import,
            },
            diff,
            exclude,
        ),

        Commands::Presets => cmd_presets(),
    }
}

/// Resolve the query from an inline pattern or a preset name.
fn resolve_query(
    pattern: Option<String>,
    preset: Option<String>,
) -> Result<(QueryNode, Option<String>)> {
    match (pattern, preset) {
        (Some(_), Some(_)) => bail!("give either an inline pattern or --preset, not both"),
        (Some(pattern), None) => Ok((compile_str(&pattern)?, None)),
        (None, Some(name)) => match presets::compiled(&name) {
            Some(Ok(query)) => Ok((query, Some(name))),
            Some(Err(e)) => Err(e.into()),
            None => bail!(
                "unknown preset '{}'; run `astsed presets` to list them",
                name
            ),
        },
        (None, None) => bail!("a pattern or --preset is required"),
    }
}

fn file_set(exclude: Vec<String>) -> FileSet {
    let mut set = FileSet::default();
    set.exclude.extend(exclude);
    set
}

fn cmd_search(
    path: &Path,
    pattern: Option<String>,
    preset: Option<String>,
    limit: Option<usize>,
    mode: OutputMode,
    json: bool,
    exclude: Vec<String>,
) -> Result<()> {
    let (query, preset) = resolve_query(pattern, preset)?;
    let files = file_set(exclude).resolve(path)?;

    let result = search_files(
        &query,
        &files,
        &SearchOptions {
            limit,
            mode,
            preset,
        },
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    for m in &result.matches {
        println!(
            "{}:{}:{} {}",
            m.file.display().to_string().bold(),
            m.line,
            m.column,
            m.kind.cyan()
        );
        if !m.text.is_empty() {
            for line in m.text.lines() {
                println!("  {line}");
            }
        }
        if let Some(captures) = &m.captures {
            for (name, capture) in captures {
                println!("  {} {} = {}", "$".dimmed(), name.green(), capture.text);
            }
        }
    }

    for err in &result.errors {
        eprintln!(
            "{} {}: {}",
            "⊘".yellow(),
            err.file.display(),
            err.reason.dimmed()
        );
    }

    println!(
        "\n{} {} matches in {} of {} files{}",
        "Summary:".bold(),
        result.matches.len(),
        result.files_with_matches,
        result.total_files,
        if result.truncated {
            " (truncated at limit)".yellow().to_string()
        } else {
            String::new()
        }
    );

    Ok(())
}

fn cmd_rewrite(
    path: &Path,
    pattern: Option<String>,
    preset: Option<String>,
    options: RewriteOptions,
    show_diff: bool,
    exclude: Vec<String>,
) -> Result<()> {
    let (query, _) = resolve_query(pattern, preset)?;
    let files = file_set(exclude).resolve(path)?;

    if options.dry_run {
        println!("{}", "[DRY RUN - no files will be modified]".cyan());
    }

    // Snapshot contents up front so applied files can be diffed.
    let mut before_contents: HashMap<PathBuf, String> = HashMap::new();
    if show_diff && !options.dry_run {
        for file in &files {
            if let Ok(content) = fs::read_to_string(file) {
                before_contents.insert(file.clone(), content);
            }
        }
    }

    let reports = rewrite_files(&query, &files, &options);

    let mut total_changes = 0;
    let mut total_failed = 0;

    for report in &reports {
        if let Some(reason) = &report.error {
            eprintln!("{} {}: {}", "✗".red(), report.file.display(), reason);
            total_failed += 1;
            continue;
        }
        if report.changes.is_empty() {
            continue;
        }

        let verb = if report.applied { "rewrote" } else { "would rewrite" };
        println!(
            "{} {}: {} {} change(s)",
            "✓".green(),
            report.file.display(),
            verb,
            report.changes.len()
        );
        total_changes += report.changes.len();

        for change in &report.changes {
            println!(
                "  {}: {} {} {}",
                change.line,
                change.before.dimmed(),
                "→".bold(),
                change.after
            );
        }

        if show_diff && report.applied {
            if let (Some(before), Ok(after)) = (
                before_contents.get(&report.file),
                fs::read_to_string(&report.file),
            ) {
                display_diff(&report.file, before, &after);
            }
        }
    }

    println!(
        "\n{} {} change(s) in {} file(s), {} failed",
        "Summary:".bold(),
        total_changes,
        reports.iter().filter(|r| !r.changes.is_empty()).count(),
        total_failed
    );

    if total_failed > 0 {
        std::process::exit(1);
    }

    Ok(())
}

/// Show unified diff between original and rewritten content.
fn display_diff(file: &Path, original: &str, modified: &str) {
    println!(
        "\n{}",
        format!("--- {} (original)", file.display()).dimmed()
    );
    println!("{}", format!("+++ {} (rewritten)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, modified);
    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => format!("-{}", change).red(),
            ChangeTag::Insert => format!("+{}", change).green(),
            ChangeTag::Equal => format!(" {}", change).normal(),
        };
        print!("{}", sign);
    }
}

fn cmd_presets() -> Result<()> {
    println!("{}", "Available presets:".bold());
    for preset in presets::PRESETS {
        println!("  {}  {}", preset.name.green().bold(), preset.description);
        println!("    {}", preset.pattern.dimmed());
    }
    Ok(())
}
