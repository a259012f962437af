//! Command-line interface parsing and handling
//!
//! This module parses arguments, assembles the summarize request from
//! flags, environment, and config, and drives it to a terminal outcome.

pub mod provider_list;

use std::error::Error;
use std::io::Write;

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::api::SummaryRequest;
use crate::cli::provider_list::list_providers;
use crate::core::client::SummarizerClient;
use crate::core::config::{Config, DEFAULT_API_URL};
use crate::core::error::SummarizeError;
use crate::core::providers::Provider;
use crate::core::summary_stream::{StreamEvent, Summary};
use crate::utils::logging::TranscriptLog;

#[derive(Parser)]
#[command(name = "websum")]
#[command(about = "Summarize websites through an LLM summarization API")]
#[command(args_conflicts_with_subcommands = true)]
#[command(
    long_about = "Websum submits a website URL to a remote summarization API and prints \
the generated summary, streaming it token by token for providers the backend \
streams (OpenAI, DeepSeek) and in one piece for the rest.\n\n\
Environment Variables:\n\
  WEBSUM_API_KEY    Provider API key (fallback for --api-key)\n\
  WEBSUM_API_URL    Summarizer backend URL (fallback for --api-url)"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Website URL to summarize
    pub url: Option<String>,

    /// Provider to summarize with (openai, ollama, anthropic, google, groq, deepseek)
    #[arg(short = 'p', long)]
    pub provider: Option<String>,

    /// Model to use (defaults to the provider's default model)
    #[arg(short = 'm', long)]
    pub model: Option<String>,

    /// Provider API key
    #[arg(short = 'k', long)]
    pub api_key: Option<String>,

    /// Provider base URL override (required for ollama)
    #[arg(long)]
    pub base_url: Option<String>,

    /// Summarizer backend URL
    #[arg(long)]
    pub api_url: Option<String>,

    /// Use the single-shot endpoint even for streaming providers
    #[arg(long)]
    pub no_stream: bool,

    /// Append finished summaries to this transcript file
    #[arg(short = 'l', long)]
    pub log: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List built-in providers and their defaults
    Providers,
}

pub fn main() -> Result<(), Box<dyn Error>> {
    tokio::runtime::Runtime::new()
        .unwrap()
        .block_on(async_main())
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match args.command {
        Some(Commands::Providers) => list_providers(),
        None => run_summarize(args).await,
    }
}

/// Assemble the wire request from flags, config, and catalog defaults.
fn build_request(
    args: &Args,
    config: &Config,
    api_key: String,
) -> Result<SummaryRequest, Box<dyn Error>> {
    let Some(url) = args.url.clone() else {
        return Err("no URL given (usage: websum <URL> [-p PROVIDER])".into());
    };

    let provider = match args
        .provider
        .as_deref()
        .or(config.default_provider.as_deref())
    {
        Some(id) => id.parse::<Provider>()?,
        None => Provider::Google,
    };

    let model = args
        .model
        .clone()
        .or_else(|| config.default_model_for(provider.id()).map(str::to_string));

    let request = SummaryRequest {
        url,
        llm_provider: provider,
        api_key,
        model_name: model,
        base_url: args.base_url.clone(),
    }
    .with_catalog_defaults();

    Ok(request)
}

async fn run_summarize(args: Args) -> Result<(), Box<dyn Error>> {
    let config = Config::load()?;

    let api_key = args
        .api_key
        .clone()
        .or_else(|| std::env::var("WEBSUM_API_KEY").ok())
        .unwrap_or_default();
    let api_url = args
        .api_url
        .clone()
        .or_else(|| std::env::var("WEBSUM_API_URL").ok())
        .or_else(|| config.api_url.clone())
        .unwrap_or_else(|| DEFAULT_API_URL.to_string());

    let request = build_request(&args, &config, api_key)?;
    let transcript = TranscriptLog::new(args.log.clone())?;
    let client = SummarizerClient::new(api_url);

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            interrupt.cancel();
        }
    });

    let streaming = request.llm_provider.streams() && !args.no_stream;
    debug!(
        provider = request.llm_provider.id(),
        model = request.model_name.as_deref(),
        streaming,
        "submitting summarize request"
    );

    let summary = if streaming {
        stream_to_stdout(&client, &request, &cancel).await?
    } else {
        let summary = tokio::select! {
            _ = cancel.cancelled() => return Err(SummarizeError::Cancelled.into()),
            outcome = client.summarize(&request) => outcome?,
        };
        println!("{}", summary.text.trim_end());
        summary
    };

    println!();
    println!(
        "{} | {} | {} | {}",
        summary.metadata.title,
        summary.metadata.provider,
        summary.metadata.model,
        summary.metadata.processing_time
    );

    transcript.record(&summary)?;
    Ok(())
}

async fn stream_to_stdout(
    client: &SummarizerClient,
    request: &SummaryRequest,
    cancel: &CancellationToken,
) -> Result<Summary, Box<dyn Error>> {
    let outcome = client
        .summarize_stream(
            request,
            |event| {
                if let StreamEvent::Fragment(text) = event {
                    print!("{text}");
                    let _ = std::io::stdout().flush();
                }
            },
            cancel,
        )
        .await;

    // Partial output may already be on screen; break the line before
    // reporting either way.
    println!();
    Ok(outcome?)
}
