use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::chunking::Document;
use crate::config::Config;
use crate::embeddings::ollama::OllamaClient;
use crate::pipeline::RagPipeline;
use crate::store::{VectorIndex, VectorStore};

/// Read text files and index them for retrieval
#[inline]
pub async fn ingest(paths: Vec<PathBuf>) -> Result<()> {
    let config = Config::load()?;
    let documents = load_documents(&paths)?;

    if documents.is_empty() {
        println!("No readable documents found.");
        return Ok(());
    }

    info!("Ingesting {} documents", documents.len());

    let mut pipeline = RagPipeline::with_ollama(config)
        .await
        .context("Failed to initialize pipeline")?;

    let progress = ProgressBar::new(documents.len() as u64);
    progress.set_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {msg}")
            .context("Invalid progress template")?,
    );

    let mut total_chunks = 0;
    for document in &documents {
        progress.set_message(document.source_label().to_string());
        let stats = pipeline
            .ingest(std::slice::from_ref(document))
            .await
            .with_context(|| format!("Failed to ingest {}", document.source_label()))?;
        total_chunks += stats.embeddings_stored;
        progress.inc(1);
    }
    progress.finish_and_clear();

    println!(
        "{} Indexed {} chunks from {} documents",
        style("✓").green(),
        total_chunks,
        documents.len()
    );

    Ok(())
}

/// Answer a question from the indexed documents
#[inline]
pub async fn ask(question: String, limit: usize) -> Result<()> {
    let config = Config::load()?;
    let pipeline = RagPipeline::with_ollama(config)
        .await
        .context("Failed to initialize pipeline")?;

    let result = pipeline
        .answer(&question, limit)
        .await
        .context("Failed to answer question")?;

    println!("{}", result.answer.trim());

    if !result.sources.is_empty() {
        println!();
        println!("{}", style("Sources:").bold());
        for source in &result.sources {
            println!(
                "  {} (score {:.3})",
                style(&source.record.source_label).cyan(),
                source.similarity_score
            );
        }
    }

    Ok(())
}

/// Show the chunks most similar to a query, without generation
#[inline]
pub async fn search(query: String, limit: usize) -> Result<()> {
    let config = Config::load()?;
    let pipeline = RagPipeline::with_ollama(config)
        .await
        .context("Failed to initialize pipeline")?;

    let results = pipeline
        .retrieve(&query, limit)
        .await
        .context("Search failed")?;

    if results.is_empty() {
        println!("No matching chunks found. Has anything been ingested?");
        return Ok(());
    }

    for (position, result) in results.iter().enumerate() {
        println!(
            "{} {} (score {:.3})",
            style(format!("{}.", position + 1)).bold(),
            style(&result.record.source_label).cyan(),
            result.similarity_score
        );
        println!("   {}", result.record.content.replace('\n', "\n   "));
        println!();
    }

    Ok(())
}

/// Show configuration, store, and server status
#[inline]
pub async fn show_status() -> Result<()> {
    let config = Config::load()?;

    println!("{}", style("Ragline Status").bold().cyan());
    println!();
    println!(
        "Ollama: {} (embedding: {}, generation: {})",
        config.ollama_url().map_or_else(
            |_| "invalid URL".to_string(),
            |url| url.to_string()
        ),
        config.ollama.embedding_model,
        config.ollama.generation_model
    );

    match OllamaClient::new(&config.ollama) {
        Ok(client) => match client.health_check() {
            Ok(()) => println!("Server: {}", style("reachable, models available").green()),
            Err(e) => println!("Server: {} ({})", style("unavailable").red(), e),
        },
        Err(e) => println!("Server: {} ({})", style("invalid config").red(), e),
    }

    let store = VectorStore::new(&config)
        .await
        .context("Failed to open vector store")?;
    let count = store.count().await.context("Failed to count chunks")?;
    println!("Indexed chunks: {}", style(count).cyan());
    println!(
        "Store path: {}",
        style(config.vector_database_path().display()).dim()
    );

    Ok(())
}

fn load_documents(paths: &[PathBuf]) -> Result<Vec<Document>> {
    let mut documents = Vec::new();

    for path in paths {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        documents.push(
            Document::new(document_id(path), content).with_source_label(path.display().to_string()),
        );
    }

    Ok(documents)
}

fn document_id(path: &Path) -> String {
    path.file_stem()
        .map_or_else(|| path.display().to_string(), |stem| {
            stem.to_string_lossy().into_owned()
        })
}
