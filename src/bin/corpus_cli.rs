use clap::{Parser, Subcommand};
use corpus_loader::logging::config::LogConfig;
use corpus_loader::logging::LoggingSystem;
use corpus_loader::{load_config, log_cli_info, CorpusService};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to the corpus configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Path to a TOML logging configuration
    #[arg(long)]
    log_config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Purge the store and reload it from a CSV source
    Refresh {
        /// CSV file to load (defaults to the configured source)
        #[arg(short, long)]
        source: Option<PathBuf>,
    },
    /// Load the configured source only if the store is empty
    Init {},
    /// List all documents
    List {},
    /// Show one document
    Show {
        /// Document identifier
        #[arg(required = true)]
        id: String,
    },
    /// Print the sentences of one document
    Sentences {
        /// Document identifier
        #[arg(required = true)]
        id: String,

        /// Maximum number of sentences to print
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Print entry counts per collection
    Stats {},
}

/// Main entry point for the corpus CLI.
///
/// Loads configuration, opens the store and runs the requested command.
/// Exits with an error if the configuration cannot be loaded, the store cannot
/// be opened, or the command fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match &cli.log_config {
        Some(path) => LoggingSystem::init_with_config(LogConfig::from_file(path)?)?,
        None => LoggingSystem::init_default()?,
    }

    let config = load_config(cli.config.as_deref())?;
    log_cli_info!("Opening store at {}", config.storage_path.display());
    let service = CorpusService::open(config)?;

    match cli.command {
        Commands::Refresh { source } => {
            let stats = match source {
                Some(path) => service.refresh_data(path).await?,
                None => service.refresh_from_default_source().await?,
            };
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        Commands::Init {} => match service.initialize_data().await? {
            Some(stats) => println!("{}", serde_json::to_string_pretty(&stats)?),
            None => println!("Store already holds data; nothing loaded"),
        },
        Commands::List {} => {
            let mut documents = service.get_all_documents()?;
            documents.sort_by(|a, b| (&a.author, &a.title).cmp(&(&b.author, &b.title)));
            for doc in documents {
                println!(
                    "{}  {} - {} ({}, {}) [{} sentences]",
                    doc.id,
                    doc.author,
                    doc.title,
                    doc.school,
                    doc.original_publication_year,
                    doc.sentence_count
                );
            }
        }
        Commands::Show { id } => match service.get_document_by_id(&id)? {
            Some(doc) => println!("{}", serde_json::to_string_pretty(&doc)?),
            None => println!("No document with id {}", id),
        },
        Commands::Sentences { id, limit } => {
            let sentences = service.get_sentences_by_document_id(&id)?;
            let limit = limit.unwrap_or(sentences.len());
            for sentence in sentences.iter().take(limit) {
                println!("{}", sentence.sentence);
            }
        }
        Commands::Stats {} => {
            let mut counts: Vec<_> = service.entry_counts()?.into_iter().collect();
            counts.sort();
            for (collection, count) in counts {
                println!("{}: {}", collection, count);
            }
        }
    }

    Ok(())
}
