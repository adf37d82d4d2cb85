//! # Ingest Command
//!
//! Populates the local knowledge index from regulatory documents.
//!
//! ## Usage
//!
//! ```bash
//! # Load the built-in seed corpus
//! exportready ingest --seed
//!
//! # Ingest a corpus file
//! exportready ingest eu-food-updates.toml
//! ```
//!
//! Corpus files use the same TOML shape as the built-in corpus: a
//! `version` key plus `[[documents]]` entries with `id`, `source`, and
//! `text`, and optional `regulation`, `country`, and
//! `certification_type` metadata.

use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::Colorize;
use exportready_rag::{ingest_chunks, seed_store, SeedCorpus};

use crate::config::Config;
use crate::exit_codes::*;
use crate::store;

/// Arguments for the ingest command
#[derive(Debug)]
pub struct IngestArgs {
    /// Corpus file to ingest
    pub path: Option<PathBuf>,
    /// Ingest the built-in seed corpus
    pub seed: bool,
    /// Verbose output
    pub verbose: bool,
}

/// Execute the ingest command
///
/// # Returns
///
/// * `Ok(EXIT_SUCCESS)` - Chunks embedded and stored
/// * `Ok(EXIT_INVALID_INPUT)` - Nothing to ingest, or a malformed corpus file
/// * `Ok(EXIT_CONFIG_ERROR)` - Embedding provider misconfigured
pub async fn execute(args: IngestArgs) -> Result<i32> {
    if args.path.is_none() && !args.seed {
        eprintln!(
            "{} Nothing to ingest. Pass a corpus file or --seed.",
            "Error:".red().bold()
        );
        return Ok(EXIT_INVALID_INPUT);
    }

    let config = Config::load()?;
    log::debug!("knowledge index at {}", config.store_path().display());

    let provider = match store::embedding_provider(&config) {
        Ok(provider) => provider,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            return Ok(EXIT_CONFIG_ERROR);
        }
    };
    let chunk_store = store::open_chunk_store(&config, provider.as_ref()).await?;

    let mut written = 0usize;

    if args.seed {
        eprintln!("{} Ingesting the built-in seed corpus...", "→".cyan());
        written += seed_store(&chunk_store, provider.as_ref())
            .await
            .context("Failed to ingest the seed corpus")?;
    }

    if let Some(path) = &args.path {
        eprintln!("{} Ingesting {}...", "→".cyan(), path.display());
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read corpus file: {}", path.display()))?;
        let corpus = match SeedCorpus::from_toml_str(&raw) {
            Ok(corpus) => corpus,
            Err(e) => {
                eprintln!("{} Invalid corpus file: {}", "Error:".red().bold(), e);
                return Ok(EXIT_INVALID_INPUT);
            }
        };
        if args.verbose {
            eprintln!(
                "  {} {} documents (corpus version {})",
                "→".dimmed(),
                corpus.documents.len(),
                corpus.version
            );
        }
        let chunks = corpus.to_chunks(chrono::Utc::now().timestamp());
        written += ingest_chunks(&chunk_store, provider.as_ref(), &chunks)
            .await
            .context("Failed to ingest corpus chunks")?;
    }

    let total = chunk_store.count().await?;
    println!();
    println!(
        "{} Ingested {} chunks ({} now in the index).",
        "✓".green().bold(),
        written,
        total
    );
    println!();

    Ok(EXIT_SUCCESS)
}
