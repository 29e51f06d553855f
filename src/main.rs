use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::{generate, Shell};
use glosstip::cli::output::{self, OutputFormat};
use glosstip::glossary::{loader, manager, Source};
use glosstip::parser::FileType;
use glosstip::{Annotator, Config, Glossary};
use rayon::prelude::*;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(name = "glosstip")]
#[command(version, about = "Annotate HTML pages with glossary tooltips", long_about = None)]
struct Cli {
    /// Files or directories to annotate
    #[arg(value_name = "FILES")]
    files: Vec<PathBuf>,

    /// Glossary source: an http(s) endpoint or a local JSON file
    #[arg(short, long, value_name = "URL|PATH")]
    terms: Option<String>,

    /// Use the cached copy of the configured endpoint
    #[arg(long, conflicts_with = "terms")]
    cached: bool,

    /// Write annotated output (HTML in place, other inputs to a sibling .html)
    #[arg(short, long, conflicts_with = "print")]
    write: bool,

    /// Print the annotated document to stdout instead of a report (one input file)
    #[arg(short, long)]
    print: bool,

    /// Maximum annotations per glossary term per document
    #[arg(long)]
    max_per_term: Option<usize>,

    /// Maximum annotations per document
    #[arg(long)]
    max_total: Option<usize>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Output format (text, json)
    #[arg(short = 'o', long, default_value = "text")]
    format: OutputFormat,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Generate shell completion script
    #[arg(long, value_name = "SHELL")]
    completion: Option<Shell>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Parser, Debug)]
enum Commands {
    /// Glossary management
    Terms {
        #[command(subcommand)]
        action: TermsCommands,
    },
}

#[derive(Parser, Debug)]
enum TermsCommands {
    /// List the terms of the configured glossary
    List,
    /// Download the configured endpoint into the cache
    Fetch,
    /// Show cache info for the configured endpoint
    Info,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Some(shell) = cli.completion {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "glosstip", &mut io::stdout());
        return Ok(());
    }

    let config = Config::load(cli.terms.clone(), cli.max_per_term, cli.max_total)?;
    let colored = !cli.no_color;

    if let Some(command) = cli.command {
        return handle_command(command, &config, cli.cached, colored);
    }

    if cli.files.is_empty() {
        anyhow::bail!("No files specified. Use --help for usage information.");
    }

    // A glossary that cannot be loaded annotates nothing.
    let glossary = load_glossary(&config, cli.cached)?.unwrap_or_default();
    let annotator = Annotator::new(&glossary, &config);

    let files = collect_files(&cli.files);
    if cli.print && files.len() != 1 {
        anyhow::bail!(
            "--print writes a single document to stdout; got {} input files.",
            files.len()
        );
    }
    let results: Vec<_> = files
        .par_iter()
        .map(|path| (path, annotator.annotate_file(path, cli.write)))
        .collect();

    let mut annotated = Vec::with_capacity(results.len());
    for (path, result) in results {
        annotated.push((path.clone(), result?));
    }

    if cli.print {
        for (_, result) in &annotated {
            print!("{}", result.html);
        }
        return Ok(());
    }

    match cli.format {
        OutputFormat::Json => output::print_json(&annotated)?,
        OutputFormat::Text => {
            for (path, result) in &annotated {
                output::print_annotations(path, result, colored);
            }
            let total = annotated.iter().map(|(_, r)| r.annotation_count).sum();
            let written = annotated.iter().filter(|(_, r)| r.written).count();
            output::print_summary(total, written, annotated.len(), colored);
        }
    }

    Ok(())
}

/// `Ok(None)` means the glossary could not be loaded; callers carry on with
/// nothing to annotate.
fn load_glossary(config: &Config, cached: bool) -> Result<Option<Glossary>> {
    if cached {
        return manager::load_cached(config);
    }

    let Some(endpoint) = config.endpoint.as_deref() else {
        anyhow::bail!(
            "No glossary source configured. Pass --terms or set `endpoint` in .glosstip.toml."
        );
    };

    Ok(loader::load_or_none(
        &Source::parse(endpoint),
        Duration::from_secs(config.request_timeout_secs),
    ))
}

fn collect_files(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for input in inputs {
        if input.is_dir() {
            files.extend(
                WalkDir::new(input)
                    .sort_by_file_name()
                    .into_iter()
                    .filter_map(|e| e.ok())
                    .filter(|e| e.file_type().is_file() && FileType::is_scannable(e.path()))
                    .map(|e| e.into_path()),
            );
        } else if input.exists() {
            files.push(input.clone());
        } else {
            eprintln!("Error: File not found: {}", input.display());
        }
    }

    debug!(count = files.len(), "input files collected");
    files
}

fn handle_command(command: Commands, config: &Config, cached: bool, colored: bool) -> Result<()> {
    match command {
        Commands::Terms { action } => match action {
            TermsCommands::List => match load_glossary(config, cached)? {
                Some(glossary) => manager::list_terms(&glossary, colored),
                None => println!("No glossary terms available."),
            },
            TermsCommands::Fetch => {
                manager::fetch_to_cache(config)?;
            }
            TermsCommands::Info => {
                manager::show_info(config)?;
            }
        },
    }
    Ok(())
}
