//! Command-line interface for the HSWA 2015 assistant
//!
//! `hswa ingest` builds the index artifact from the Act's PDF, `hswa ask`
//! answers one question, `hswa chat` runs an interactive loop, and
//! `hswa info` prints the metadata of a persisted index.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hswa_rag::embedding::{EmbeddingProvider, OnnxEmbedder};
use hswa_rag::generation::AnthropicClient;
use hswa_rag::{Assistant, Ingestor, QueryResponse, RagConfig};

#[derive(Parser)]
#[command(name = "hswa", version, about = "Q&A over the NZ Health and Safety at Work Act 2015")]
struct Cli {
    /// Path to a TOML config file; defaults are used when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the vector index from the Act's PDF
    Ingest {
        /// Source PDF path (overrides the config)
        #[arg(long)]
        pdf: Option<PathBuf>,
        /// Output index path (overrides the config)
        #[arg(long)]
        index: Option<PathBuf>,
    },
    /// Ask a single question against the persisted index
    Ask {
        /// The question to answer
        question: String,
        /// Index path (overrides the config)
        #[arg(long)]
        index: Option<PathBuf>,
    },
    /// Interactive question loop
    Chat {
        /// Index path (overrides the config)
        #[arg(long)]
        index: Option<PathBuf>,
    },
    /// Show metadata of a persisted index
    Info {
        /// Index path (overrides the config)
        #[arg(long)]
        index: Option<PathBuf>,
    },
}

const EXAMPLE_QUESTIONS: &[&str] = &[
    "What is a PCBU's primary duty of care?",
    "What are the penalties for reckless conduct?",
    "Can a worker refuse to carry out unsafe work?",
    "What must officers do to exercise due diligence?",
];

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hswa_rag=info,hswa_index=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => RagConfig::from_file(path)?,
        None => RagConfig::default(),
    };
    config.validate()?;

    match cli.command {
        Command::Ingest { pdf, index } => {
            if let Some(pdf) = pdf {
                config.ingestion.pdf_path = pdf;
            }
            if let Some(index) = index {
                config.ingestion.index_path = index;
            }
            ingest(config).await
        }
        Command::Ask { question, index } => {
            if let Some(index) = index {
                config.ingestion.index_path = index;
            }
            let assistant = build_assistant(&config).await?;
            let response = ask_with_spinner(&assistant, &question).await?;
            print_response(&response);
            Ok(())
        }
        Command::Chat { index } => {
            if let Some(index) = index {
                config.ingestion.index_path = index;
            }
            let assistant = build_assistant(&config).await?;
            chat(assistant).await
        }
        Command::Info { index } => {
            if let Some(index) = index {
                config.ingestion.index_path = index;
            }
            info(&config)
        }
    }
}

async fn ingest(config: RagConfig) -> Result<()> {
    println!(
        "{} {}",
        style("Ingesting").green().bold(),
        config.ingestion.pdf_path.display()
    );

    let spinner = spinner("loading embedding model");
    let embedder = Arc::new(OnnxEmbedder::new(&config.embedding).await?);
    spinner.set_message("building index");

    let ingestor = Ingestor::new(config.clone(), embedder);
    let stats = ingestor.ingest().await?;
    spinner.finish_and_clear();

    println!(
        "{} {} pages, {} chunks ({} dims) in {:.1}s",
        style("Indexed").green().bold(),
        stats.pages,
        stats.chunks,
        stats.dimensions,
        stats.elapsed_ms as f64 / 1000.0
    );
    println!("  artifact: {}", config.ingestion.index_path.display());
    Ok(())
}

async fn build_assistant(config: &RagConfig) -> Result<Assistant> {
    let api_key = std::env::var("ANTHROPIC_API_KEY").unwrap_or_default();
    let llm = Arc::new(AnthropicClient::new(&config.llm, api_key)?);

    let spinner = spinner("loading embedding model");
    let embedder = Arc::new(OnnxEmbedder::new(&config.embedding).await?);
    embedder.health_check().await?;
    spinner.finish_and_clear();

    let assistant =
        Assistant::from_artifact(&config.ingestion.index_path, embedder, llm, config)
            .with_context(|| {
                format!(
                    "cannot open index '{}'; run `hswa ingest` first",
                    config.ingestion.index_path.display()
                )
            })?;
    Ok(assistant)
}

async fn ask_with_spinner(assistant: &Assistant, question: &str) -> Result<QueryResponse> {
    let spinner = spinner("thinking");
    let response = assistant.ask(question).await;
    spinner.finish_and_clear();
    Ok(response?)
}

async fn chat(assistant: Assistant) -> Result<()> {
    println!(
        "{}",
        style("HSWA 2015 Assistant — ask about the Health and Safety at Work Act").cyan()
    );
    println!("Type a question, or 'quit' to exit. Examples:");
    for question in EXAMPLE_QUESTIONS {
        println!("  {}", style(question).dim());
    }
    println!();

    let stdin = std::io::stdin();
    loop {
        print!("{} ", style("?").cyan().bold());
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if matches!(question, "quit" | "exit" | "q") {
            break;
        }

        match ask_with_spinner(&assistant, question).await {
            Ok(response) => print_response(&response),
            Err(e) => eprintln!("{} {e:#}", style("error:").red().bold()),
        }
        println!();
    }
    Ok(())
}

fn print_response(response: &QueryResponse) {
    println!("\n{}", response.answer);

    if !response.citations.is_empty() {
        println!("\n{}", style("Sources").bold());
        for citation in &response.citations {
            println!(
                "  {} {} (score {:.3})",
                style(citation.page_label()).yellow(),
                citation.preview,
                citation.score
            );
        }
    }
    println!(
        "{}",
        style(format!(
            "{} chunks, {} ms",
            response.chunks_retrieved, response.processing_time_ms
        ))
        .dim()
    );
}

fn info(config: &RagConfig) -> Result<()> {
    let index = hswa_index::VectorIndex::load(&config.ingestion.index_path)?;
    let meta = index.metadata();

    println!("{}", style("Index").bold());
    println!("  path:       {}", config.ingestion.index_path.display());
    println!("  source:     {}", meta.source);
    println!("  chunks:     {}", index.len());
    println!("  model:      {} ({} dims, {})", meta.embedding_model, meta.dimensions, meta.metric);
    println!("  chunking:   {} chars, {} overlap", meta.chunk_size, meta.chunk_overlap);
    println!("  built:      {}", meta.built_at.to_rfc3339());
    println!("  content:    {}", meta.content_hash);
    Ok(())
}

fn spinner(message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner} {msg}").expect("valid spinner template"),
    );
    bar.set_message(message.to_string());
    bar.enable_steady_tick(std::time::Duration::from_millis(100));
    bar
}
