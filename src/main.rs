use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use docrag::Result;
use docrag::backend::{OpenAiClient, PineconeClient};
use docrag::config::{
    Config, ENV_OPENAI_API_KEY, ENV_PINECONE_API_KEY, ENV_PINECONE_INDEX_HOST,
};
use docrag::ingest::Ingestor;
use docrag::query::QueryService;
use docrag::server;

#[derive(Parser)]
#[command(name = "docrag")]
#[command(about = "Ingest documents into Pinecone and answer questions over them with OpenAI")]
#[command(version)]
struct Cli {
    /// Path to an optional TOML config file with tunables
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest every file under a directory into a namespace
    Ingest {
        /// Directory to walk recursively
        directory: PathBuf,
        /// Vector store namespace to write into
        namespace: String,
        /// Override the configured chunk size (characters)
        #[arg(long)]
        chunk_size: Option<usize>,
        /// Override the configured chunk overlap (characters)
        #[arg(long)]
        overlap: Option<usize>,
    },
    /// Ask a single question against a namespace
    Ask {
        /// Vector store namespace to search
        namespace: String,
        /// The question to answer
        question: String,
    },
    /// Start the web front end bound to a fixed namespace
    Serve {
        /// Vector store namespace served by this process
        namespace: String,
        /// Port to listen on
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let mut config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("{}", config_load_failure_message(&error));
            std::process::exit(1);
        }
    };

    match cli.command {
        Commands::Ingest {
            directory,
            namespace,
            chunk_size,
            overlap,
        } => {
            if let Some(chunk_size) = chunk_size {
                config.chunking.chunk_size = chunk_size;
            }
            if let Some(overlap) = overlap {
                config.chunking.overlap = overlap;
            }

            let embedder = OpenAiClient::new(&config.openai)?;
            let index = PineconeClient::new(&config.pinecone)?;

            let stats = Ingestor::new(&embedder, &index, config.chunking)
                .ingest_directory(&directory, &namespace)?;

            println!("Ingestion complete:");
            println!("  Files processed: {}", stats.files_processed);
            println!("  Files skipped:   {}", stats.files_skipped);
            println!("  Chunks upserted: {}", stats.chunks_upserted);
            println!("  Chunks failed:   {}", stats.chunks_failed);
        }
        Commands::Ask {
            namespace,
            question,
        } => {
            let service = build_query_service(&config, namespace)?;
            let answer = service.answer(&question)?;
            println!("{answer}");
        }
        Commands::Serve { namespace, port } => {
            let service = Arc::new(build_query_service(&config, namespace)?);
            server::serve(service, port).await?;
        }
    }

    Ok(())
}

fn config_load_failure_message(error: &anyhow::Error) -> String {
    format!(
        "Error: {error:#}\n\nSet {ENV_OPENAI_API_KEY}, {ENV_PINECONE_API_KEY}, and \
         {ENV_PINECONE_INDEX_HOST} in the environment before running. \
         Run with --help for the full option list."
    )
}

fn build_query_service(config: &Config, namespace: String) -> Result<QueryService> {
    let openai = OpenAiClient::new(&config.openai)?;
    let pinecone = PineconeClient::new(&config.pinecone)?;

    Ok(QueryService::new(
        Box::new(openai.clone()),
        Box::new(pinecone),
        Box::new(openai),
        namespace,
        config.query.top_k,
    ))
}
