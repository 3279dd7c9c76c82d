//! CLI module - Command-line interface definition and handler

use anyhow::{bail, Context, Result};
use clap::Parser;
use colored::Colorize;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use repodigest::backends::filter::ExcludeFilter;
use repodigest::core::config::{
    ScanLimits, DEFAULT_MAX_DEPTH, DEFAULT_MAX_FILES, DEFAULT_MAX_FILE_SIZE, DEFAULT_MAX_TOTAL_SIZE,
};
use repodigest::core::model::{Digest, SourceMeta};
use repodigest::core::render::{OutputFormat, RenderConfig, Renderer};
use repodigest::core::tokenizer::TokenModel;
use repodigest::flows::digest::{ingest, DigestOptions};

/// repodigest - turn a directory into a text digest for LLM prompts.
#[derive(Parser, Debug)]
#[command(name = "repodigest")]
#[command(
    author,
    version,
    about,
    long_about = r#"repodigest walks a directory and prints three sections:

- a summary (source, file count, estimated token count)
- an ASCII tree of the admitted entries
- the content of every file, each behind a File: banner

Binary files are listed with a placeholder, Jupyter notebooks are converted to
Python scripts, and files that are neither UTF-8 nor Windows-1252 are replaced
by a decode error line. Limits degrade the digest instead of failing it; every
skipped entry is reported as a warning on stderr.

Examples:
    repodigest
    repodigest path/to/project --format json --pretty
    repodigest . --exclude "*.md" --max-files 500 -o digest.txt
    repodigest src/main.rs
"#
)]
pub struct Cli {
    /// Directory (or single file) to digest.
    #[arg(value_name = "PATH", default_value = ".")]
    pub path: PathBuf,

    /// Output format (text/json).
    #[arg(
        long,
        default_value = "text",
        value_parser = ["text", "json"],
        value_name = "FORMAT",
        long_help = "Select the output format.\n\n\
Supported values:\n\
- text (default): summary, tree and content separated by blank lines\n\
- json: one object with summary, tree, content, estimated_tokens, warnings and limits"
    )]
    pub format: String,

    /// Pretty-print JSON output with indentation.
    #[arg(long)]
    pub pretty: bool,

    /// Write the digest to a file instead of stdout.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Maximum size of a single file in bytes.
    #[arg(
        long,
        env = "REPODIGEST_MAX_FILE_SIZE",
        default_value_t = DEFAULT_MAX_FILE_SIZE,
        value_name = "BYTES",
        long_help = "Files larger than this are left out of the digest and reported as a\n\
warning. Defaults to 10 MB."
    )]
    pub max_file_size: u64,

    /// Maximum accumulated size of all files in bytes.
    #[arg(
        long,
        env = "REPODIGEST_MAX_TOTAL_SIZE",
        default_value_t = DEFAULT_MAX_TOTAL_SIZE,
        value_name = "BYTES"
    )]
    pub max_total_size: u64,

    /// Maximum number of files in the digest.
    #[arg(
        long,
        env = "REPODIGEST_MAX_FILES",
        default_value_t = DEFAULT_MAX_FILES,
        value_name = "N"
    )]
    pub max_files: u64,

    /// Maximum directory depth below PATH.
    #[arg(
        long,
        env = "REPODIGEST_MAX_DEPTH",
        default_value_t = DEFAULT_MAX_DEPTH,
        value_name = "N",
        long_help = "Directories deeper than this are shown in the tree but not descended\n\
into. The root is depth 0."
    )]
    pub max_depth: usize,

    /// Extra gitignore-style pattern to exclude (repeatable).
    #[arg(short, long = "exclude", value_name = "PATTERN")]
    pub exclude: Vec<String>,

    /// Only digest files matching this pattern (repeatable).
    #[arg(
        short,
        long = "include",
        value_name = "PATTERN",
        long_help = "Only files matching at least one include pattern are digested.\n\
Directories are always walked."
    )]
    pub include: Vec<String>,

    /// Do not apply the built-in exclusion list.
    #[arg(
        long,
        long_help = "Disable the built-in exclusion list (VCS metadata, dependency and build\n\
directories, compiled artifacts, lock files, editor clutter)."
    )]
    pub no_default_excludes: bool,

    /// Skip hidden files and directories (dotfiles).
    #[arg(long)]
    pub no_hidden: bool,

    /// Report the digest as coming from a repository (USER/REPO).
    #[arg(long, value_name = "USER/REPO")]
    pub repo: Option<String>,

    /// Branch shown in the summary.
    #[arg(long, value_name = "BRANCH")]
    pub branch: Option<String>,

    /// Commit shown in the summary (takes precedence over --branch).
    #[arg(long, value_name = "SHA")]
    pub commit: Option<String>,

    /// Subpath shown in the summary.
    #[arg(long, value_name = "SUBPATH")]
    pub subpath: Option<String>,

    /// Token model for the estimate (cl100k/o200k/heuristic).
    #[arg(long, default_value = "cl100k", value_name = "MODEL")]
    pub token_model: String,

    /// Fail when the estimated token count exceeds this value.
    #[arg(long, value_name = "N")]
    pub max_tokens: Option<usize>,

    /// Disable colored output.
    #[arg(long)]
    pub no_color: bool,

    /// Quiet mode (no warnings on stderr).
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Verbose mode (debug logging on stderr).
    #[arg(short, long)]
    pub verbose: bool,
}

/// Run the CLI
pub fn run(cli: Cli) -> Result<()> {
    init_logging(cli.quiet, cli.verbose);
    if cli.no_color {
        colored::control::set_override(false);
    }

    let format: OutputFormat = cli.format.parse().map_err(anyhow::Error::msg)?;
    let token_model: TokenModel = cli.token_model.parse().map_err(anyhow::Error::msg)?;
    let render_config = RenderConfig::with_pretty(format, cli.pretty);

    let limits = ScanLimits {
        max_file_size: cli.max_file_size,
        max_total_size: cli.max_total_size,
        max_files: cli.max_files,
        max_depth: cli.max_depth,
    };

    let filter = if cli.no_default_excludes {
        ExcludeFilter::new(&cli.exclude, &cli.include, cli.no_hidden)?
    } else {
        ExcludeFilter::with_defaults(&cli.exclude, &cli.include, cli.no_hidden)?
    };

    let root = cli.path.canonicalize().unwrap_or_else(|_| cli.path.clone());
    let mut options = DigestOptions::new(&root);
    options.source = source_meta(&cli, &root)?;
    options.limits = limits;
    options.filter = filter;
    options.token_model = token_model;

    let digest = ingest(&options).with_context(|| format!("Failed to digest {}", cli.path.display()))?;

    if !cli.quiet {
        print_warnings(&digest);
    }

    if let (Some(max), Some(tokens)) = (cli.max_tokens, digest.estimated_tokens) {
        if tokens > max {
            bail!(
                "Estimated tokens ({}) exceed the maximum allowed ({})",
                tokens,
                max
            );
        }
    }

    let renderer = Renderer::with_config(render_config).with_limits(limits, cli.max_tokens);
    match &cli.output {
        Some(path) => {
            let file = fs::File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            renderer.render_to(&digest, io::BufWriter::new(file))?;
            if !cli.quiet {
                eprintln!("{} {}", "Digest written to".green(), path.display());
            }
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            renderer.render_to(&digest, &mut handle)?;
            handle.flush()?;
        }
    }

    Ok(())
}

fn init_logging(quiet: bool, verbose: bool) {
    let level = if quiet {
        "off"
    } else if verbose {
        "debug"
    } else {
        "error"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn source_meta(cli: &Cli, root: &Path) -> Result<SourceMeta> {
    let mut meta = match &cli.repo {
        Some(repo) => match repo.split_once('/') {
            Some((user, name)) if !user.is_empty() && !name.is_empty() => {
                SourceMeta::remote(user, name)
            }
            _ => bail!("Invalid --repo '{}': expected USER/REPO", repo),
        },
        None => SourceMeta::local(root),
    };

    if let Some(branch) = &cli.branch {
        meta = meta.with_branch(branch.as_str());
    }
    if let Some(commit) = &cli.commit {
        meta = meta.with_commit(commit.as_str());
    }
    if let Some(subpath) = &cli.subpath {
        meta = meta.with_subpath(subpath.as_str());
    }
    Ok(meta)
}

fn print_warnings(digest: &Digest) {
    for warning in &digest.warnings {
        eprintln!("{} {}", "warning:".yellow().bold(), warning);
    }
}
