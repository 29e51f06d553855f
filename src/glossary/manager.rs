use crate::glossary::{loader, Glossary};
use crate::Config;
use anyhow::{Context, Result};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Cached copy of an endpoint, keyed by the SHA-256 of its URL.
pub fn cache_path(cache_dir: &Path, url: &str) -> PathBuf {
    let digest = Sha256::digest(url.as_bytes());
    let name: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
    cache_dir.join(format!("{}.json", name))
}

fn configured_endpoint(config: &Config) -> Result<&str> {
    config.endpoint.as_deref().context(
        "No glossary endpoint configured. Pass --terms or set `endpoint` in .glosstip.toml.",
    )
}

pub fn fetch_to_cache(config: &Config) -> Result<PathBuf> {
    let url = configured_endpoint(config)?;
    let cache_dir = Config::cache_dir().context("Failed to get cache directory")?;
    fs::create_dir_all(&cache_dir).context("Failed to create cache directory")?;

    println!("{} glossary from {}...", "Fetching".cyan().bold(), url.dimmed());

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .context("Invalid progress template")?,
    );
    pb.set_message("Downloading...");
    pb.enable_steady_tick(Duration::from_millis(100));

    let body = loader::fetch(url, Duration::from_secs(config.request_timeout_secs));
    pb.finish_and_clear();
    let body = body?;

    // Refuse to cache something the annotator would ignore.
    let glossary = loader::parse(&body)?;

    let path = cache_path(&cache_dir, url);
    fs::write(&path, &body)
        .with_context(|| format!("Failed to write cache file: {}", path.display()))?;

    println!(
        "{} {} terms cached: {}",
        "✓".green().bold(),
        glossary.len().to_string().yellow(),
        path.display().to_string().cyan()
    );

    Ok(path)
}

/// Load the cached copy of the configured endpoint.
pub fn load_cached(config: &Config) -> Result<Option<Glossary>> {
    let url = configured_endpoint(config)?;
    let cache_dir = Config::cache_dir().context("Failed to get cache directory")?;
    let path = cache_path(&cache_dir, url);
    Ok(loader::load_or_none(
        &loader::Source::File(path),
        Duration::from_secs(config.request_timeout_secs),
    ))
}

pub fn list_terms(glossary: &Glossary, colored_output: bool) {
    for term in &glossary.terms {
        let mut flags = Vec::new();
        if term.case_sensitive {
            flags.push("cs");
        }
        if term.whole_word {
            flags.push("ww");
        }
        let aliases = term.aliases.join(", ");
        let flags = if flags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", flags.join(","))
        };

        if colored_output {
            println!("{}{}", aliases.cyan().bold(), flags.dimmed());
        } else {
            println!("{}{}", aliases, flags);
        }
        println!("    {}", term.definition);
    }
}

pub fn show_info(config: &Config) -> Result<()> {
    let url = match config.endpoint.as_deref() {
        Some(url) => url,
        None => {
            println!("{}", "No glossary endpoint configured.".yellow());
            return Ok(());
        }
    };

    let cache_dir = Config::cache_dir().context("Failed to get cache directory")?;
    let path = cache_path(&cache_dir, url);

    println!("{}", format!("Glossary: {}", url).bold());
    println!("  Cache: {}", path.display());

    if !path.exists() {
        println!(
            "  {} not cached. Run {} to fetch it.",
            "✗".red().bold(),
            "glosstip terms fetch".cyan()
        );
        return Ok(());
    }

    let metadata = fs::metadata(&path)?;
    println!("  Size: {} KB", metadata.len() / 1024);

    match load_cached(config)? {
        Some(glossary) => {
            let aliases: usize = glossary.terms.iter().map(|t| t.aliases.len()).sum();
            println!("  Terms: {}", glossary.len());
            println!("  Aliases: {}", aliases);
        }
        None => println!("  {}", "Cached copy is unreadable".red()),
    }

    Ok(())
}
