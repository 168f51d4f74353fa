use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use comment_topics::config::{Config, Engine};
use comment_topics::pipeline::TopicPipeline;

/// Comment Topics: group spreadsheet comments into topics and show them.
///
/// Loads a spreadsheet with a `comment_text` column, normalizes each comment,
/// fits a topic model, and renders each comment's topic next to a ranked
/// topic summary.
#[derive(Parser)]
#[command(name = "comment-topics", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the topic page at GET /
    #[cfg(feature = "web")]
    Serve {
        /// Port to listen on (default: 5000)
        #[arg(long, default_value = "5000")]
        port: u16,

        /// Address to bind (default: 127.0.0.1)
        #[arg(long, default_value = "127.0.0.1")]
        bind: String,
    },

    /// Run the pipeline once and print the result
    Analyze {
        /// Spreadsheet to analyze (defaults to COMMENT_TOPICS_DATA_PATH)
        #[arg(long)]
        path: Option<PathBuf>,

        /// Print the report as JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Also write the HTML page to this file
        #[arg(long)]
        html: Option<PathBuf>,
    },

    /// Download the sentence embedding model (~90 MB)
    DownloadModel,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("comment_topics=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        #[cfg(feature = "web")]
        Commands::Serve { port, bind } => {
            let config = Config::load()?;
            config.require_engine()?;
            let pipeline = TopicPipeline::from_config(&config)?;

            info!(
                data_path = %config.data_path.display(),
                "Serving comment topics"
            );
            comment_topics::web::run_server(pipeline, port, &bind).await?;
        }

        Commands::Analyze { path, json, html } => {
            let mut config = Config::load()?;
            if let Some(path) = path {
                config.data_path = path;
            }
            config.require_engine()?;
            let pipeline = TopicPipeline::from_config(&config)?;

            // Same blocking fit as the web handler
            let report = tokio::task::spawn_blocking(move || pipeline.run()).await??;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                comment_topics::output::terminal::display_report(&report);
            }

            if let Some(out) = html {
                let page = comment_topics::output::html::render_page(&report);
                std::fs::write(&out, page)?;
                println!("Wrote HTML page to {}", out.display());
            }
        }

        Commands::DownloadModel => {
            let config = Config::load()?;
            let model_dir = &config.model_dir;

            println!("Downloading embedding model...");
            println!("  Destination: {}", model_dir.display());

            comment_topics::topics::download::download_model(model_dir).await?;

            println!("\n{}", "Model downloaded successfully.".bold());
            if config.engine != Engine::Embeddings {
                println!("Set COMMENT_TOPICS_ENGINE=embeddings to use it.");
            }
        }
    }

    Ok(())
}
