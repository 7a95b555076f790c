use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use mmrag_cli::{
    AppSettings, AppState, ChatCommand, ChatSession, TextEmbedderKind, display_banner,
    handle_input_with_history, print_help, print_report, print_sources, run_ingestion,
};

#[derive(Parser)]
#[command(name = "mmrag")]
#[command(about = "Multimodal retrieval-augmented chat over PDF and image documents", long_about = None)]
struct Cli {
    /// Text embedding provider (overrides MMRAG_TEXT_EMBEDDER)
    #[arg(long, global = true, value_enum)]
    text_embedder: Option<TextEmbedderKind>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rebuild the persisted text and image indexes from a document directory
    Ingest {
        /// Directory of PDFs and images
        #[arg(long)]
        docs: Option<PathBuf>,
        /// Output directory for the index files
        #[arg(long)]
        vectorstore: Option<PathBuf>,
    },
    /// Interactive chat over the persisted corpus
    Chat {
        #[arg(long)]
        vectorstore: Option<PathBuf>,
        /// Generation model
        #[arg(long)]
        model: Option<String>,
    },
    /// Answer a single question and exit
    Ask {
        /// Question text
        text: Option<String>,
        /// Image to ask about
        #[arg(long)]
        image: Option<PathBuf>,
        /// Extra documents to search for this question only
        #[arg(long)]
        upload: Vec<PathBuf>,
        #[arg(long)]
        vectorstore: Option<PathBuf>,
        #[arg(long)]
        model: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let mut settings = AppSettings::from_env().context("failed to load configuration")?;
    if let Some(kind) = cli.text_embedder {
        settings.text_embedder = kind;
    }

    match cli.command {
        Commands::Ingest { docs, vectorstore } => {
            if let Some(docs) = docs {
                settings.rag.docs_dir = docs;
            }
            if let Some(dir) = vectorstore {
                settings.rag.vectorstore_dir = dir;
            }
            let report = run_ingestion(&settings).await?;
            print_report(&report);
        }
        Commands::Chat { vectorstore, model } => {
            apply_overrides(&mut settings, vectorstore, model);
            let state = AppState::initialize(&settings)
                .context("cannot start without a persisted index; run `mmrag ingest` first")?;
            run_chat(&state).await?;
            state.shutdown();
        }
        Commands::Ask {
            text,
            image,
            upload,
            vectorstore,
            model,
        } => {
            apply_overrides(&mut settings, vectorstore, model);
            let state = AppState::initialize(&settings)
                .context("cannot start without a persisted index; run `mmrag ingest` first")?;

            let mut session = ChatSession::new();
            for path in &upload {
                session
                    .add_upload_path(path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
            }
            if let Some(path) = &image {
                session
                    .set_image_path(path)
                    .with_context(|| format!("failed to load image {}", path.display()))?;
            }

            let outcome = session
                .take_turn(&state, text.as_deref().unwrap_or_default(), print_fragment)
                .await?;
            println!();
            print_sources(&outcome.retrieval);
            state.shutdown();
        }
    }

    Ok(())
}

fn apply_overrides(settings: &mut AppSettings, vectorstore: Option<PathBuf>, model: Option<String>) {
    if let Some(dir) = vectorstore {
        settings.rag.vectorstore_dir = dir;
    }
    if let Some(model) = model {
        settings.ollama.model = model;
    }
}

fn print_fragment(fragment: &str) {
    print!("{}", fragment);
    let _ = io::stdout().flush();
}

async fn run_chat(state: &AppState) -> Result<()> {
    display_banner(state.backend().model_id());

    let mut session = ChatSession::new();
    let mut history = Vec::new();

    loop {
        let input = handle_input_with_history(&mut history).await?;

        match ChatCommand::parse(&input) {
            ChatCommand::Empty => continue,
            ChatCommand::Exit => {
                println!("{}", "👋 Goodbye!".green());
                break;
            }
            ChatCommand::Help => print_help(),
            ChatCommand::ClearChat => {
                session.clear_history();
                println!("{} Chat history cleared", "🧹".cyan());
            }
            ChatCommand::ClearUploads => {
                session.clear_uploads();
                println!("{} Session uploads removed", "🧹".cyan());
            }
            ChatCommand::ClearImage => {
                session.clear_image();
                println!("{} Image detached", "🧹".cyan());
            }
            ChatCommand::Upload(path) => match session.add_upload_path(&path) {
                Ok(()) => println!(
                    "{} Added {} ({} uploads this session)",
                    "📎".cyan(),
                    path.display(),
                    session.uploads().len()
                ),
                Err(e) => println!("{} Upload failed: {}", "❌".red(), e),
            },
            ChatCommand::Image(path) => match session.set_image_path(&path) {
                Ok(()) => println!("{} Image attached: {}", "🖼️".cyan(), path.display()),
                Err(e) => println!("{} Image failed: {}", "❌".red(), e),
            },
            ChatCommand::Invalid(line) => {
                println!("{} Unknown command: {} (type 'help')", "⚠️".yellow(), line);
            }
            ChatCommand::Ask(question) => {
                match session.take_turn(state, &question, print_fragment).await {
                    Ok(outcome) => {
                        println!();
                        print_sources(&outcome.retrieval);
                    }
                    Err(e) => println!("{} {}", "❌".red(), e),
                }
            }
        }
    }

    Ok(())
}
