//! Ask one question about a local document from the command line
//!
//! Run with: cargo run -p docqa-rag --features cli --bin docqa-ask -- paper.pdf "What is the main result?"

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use docqa_rag::{
    config::RagConfig,
    ingestion::FileParser,
    providers::{build_embedder, build_llm},
    RagPipeline,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(
    name = "docqa-ask",
    version,
    about = "Answer a question from a single PDF, text, or markdown document"
)]
struct Cli {
    /// Document to read
    file: PathBuf,

    /// Question to answer
    question: String,

    /// TOML configuration file
    #[arg(long, env = "DOCQA_CONFIG")]
    config: Option<PathBuf>,

    /// Number of chunks handed to the model
    #[arg(long)]
    top_k: Option<usize>,

    /// Print the retrieved chunks after the answer
    #[arg(long, default_value_t = false)]
    show_context: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docqa_rag=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if !cli.file.is_file() {
        bail!("{} is not a readable file", cli.file.display());
    }

    let mut config = RagConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(top_k) = cli.top_k {
        config.retrieval.top_k = top_k;
    }
    config.validate()?;

    let embedder = build_embedder(&config.embeddings)?;
    let llm = build_llm(&config.llm)?;
    let pipeline = RagPipeline::from_config(&config, Arc::new(FileParser::new()), embedder, llm)?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg} [{elapsed}]")
            .context("invalid progress template")?,
    );
    spinner.set_message(format!("Reading {}", cli.file.display()));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = pipeline.run(&cli.file, &cli.question).await;
    spinner.finish_and_clear();
    let outcome = result?;

    println!("{}", style("Answer").bold().green());
    println!("{}\n", outcome.answer.trim());

    if cli.show_context {
        println!("{}", style("Retrieved context").bold().cyan());
        for (rank, hit) in outcome.retrieved.iter().enumerate() {
            println!(
                "{} {}",
                style(format!("[{}]", rank + 1)).bold(),
                style(format!(
                    "page {} · chunk {} · similarity {:.3}",
                    hit.chunk.page_number, hit.chunk.chunk_index, hit.similarity
                ))
                .dim()
            );
            println!("{}\n", hit.chunk.content.trim());
        }
    }

    Ok(())
}
