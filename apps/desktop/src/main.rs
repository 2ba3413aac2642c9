use std::{
    path::{Path, PathBuf},
    process::ExitCode,
    sync::Arc,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    config::{self, ClientSettings},
    FormEvents, FormSubmissionController, HttpTranslationApi, Locale, SubmissionOutcome,
    SubmitEvent, SubmitOptions, TranslationApi,
};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod input;
mod terminal;

use input::ParagraphBuffer;

#[derive(Parser, Debug)]
#[command(name = "translator", about = "Translate English text to Chinese with a glossary")]
struct Args {
    /// Base URL of the translation service.
    #[arg(long, global = true)]
    server_url: Option<String>,
    #[arg(long, global = true)]
    locale: Option<Locale>,
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Translate text given as arguments, from a file, or from stdin.
    Translate {
        text: Vec<String>,
        #[arg(long, conflicts_with = "text")]
        file: Option<PathBuf>,
        /// Ask the service for a Word document as well.
        #[arg(long)]
        word: bool,
        #[arg(long)]
        no_vocabulary: bool,
        /// Directory to save the Word document into.
        #[arg(long, requires = "word")]
        save_dir: Option<PathBuf>,
        /// Print the raw response instead of the formatted result.
        #[arg(long)]
        json: bool,
    },
    /// Read paragraphs from stdin (separated by blank lines) and translate each.
    Interactive {
        #[arg(long)]
        word: bool,
        #[arg(long)]
        no_vocabulary: bool,
    },
    /// Check that the translation service is up.
    Health,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = config::load_settings().context("failed to load settings")?;
    apply_cli_overrides(&mut settings, &args);
    config::validate(&settings)?;
    info!(server_url = %settings.server_url, locale = %settings.locale, "settings loaded");

    let api = Arc::new(HttpTranslationApi::from_settings(&settings)?);

    match args.command {
        Command::Translate {
            text,
            file,
            word,
            no_vocabulary,
            save_dir,
            json,
        } => {
            let raw = read_input(text, file.as_deref()).await?;
            let options = SubmitOptions {
                as_word: word,
                include_vocabulary: !no_vocabulary,
            };
            translate_once(api, &settings, &raw, options, save_dir.as_deref(), json).await
        }
        Command::Interactive {
            word,
            no_vocabulary,
        } => {
            let options = SubmitOptions {
                as_word: word,
                include_vocabulary: !no_vocabulary,
            };
            run_interactive(api, &settings, options).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Health => check_health(api.as_ref()).await,
    }
}

fn apply_cli_overrides(settings: &mut ClientSettings, args: &Args) {
    if let Some(url) = &args.server_url {
        settings.server_url = url.clone();
    }
    if let Some(locale) = args.locale {
        settings.locale = locale;
    }
    if let Some(secs) = args.timeout_secs {
        settings.request_timeout_secs = Some(secs);
    }
}

async fn read_input(text: Vec<String>, file: Option<&Path>) -> Result<String> {
    if let Some(path) = file {
        return tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read input file '{}'", path.display()));
    }
    if !text.is_empty() {
        return Ok(text.join(" "));
    }
    let mut raw = String::new();
    tokio::io::stdin()
        .read_to_string(&mut raw)
        .await
        .context("failed to read stdin")?;
    Ok(raw)
}

async fn translate_once(
    api: Arc<HttpTranslationApi>,
    settings: &ClientSettings,
    raw: &str,
    options: SubmitOptions,
    save_dir: Option<&Path>,
    json: bool,
) -> Result<ExitCode> {
    let view = if json {
        client_core::view::memory::MemoryForm::new().view()
    } else {
        terminal::terminal_view()
    };
    let controller = FormSubmissionController::from_settings(api.clone(), view, settings)?;

    let response = match controller.submit(raw, options).await {
        SubmissionOutcome::Translated(response) => response,
        SubmissionOutcome::Failed(err) => {
            if json {
                eprintln!("error: {}", controller.locale().describe(&err));
            }
            return Ok(ExitCode::FAILURE);
        }
        SubmissionOutcome::Superseded { .. } => return Ok(ExitCode::FAILURE),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    }

    if let (Some(dir), Some(url)) = (save_dir, response.word_document_url.as_deref()) {
        let path = save_document(api.as_ref(), dir, url).await?;
        eprintln!("saved {}", path.display());
    }
    Ok(ExitCode::SUCCESS)
}

async fn save_document(api: &dyn TranslationApi, dir: &Path, url: &str) -> Result<PathBuf> {
    let bytes = api
        .download_document(url)
        .await
        .with_context(|| format!("failed to download document '{url}'"))?;
    let filename = input::document_filename(url);
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("failed to create '{}'", dir.display()))?;
    let path = dir.join(filename);
    tokio::fs::write(&path, bytes)
        .await
        .with_context(|| format!("failed to write '{}'", path.display()))?;
    Ok(path)
}

async fn run_interactive(
    api: Arc<HttpTranslationApi>,
    settings: &ClientSettings,
    options: SubmitOptions,
) -> Result<()> {
    let controller = Arc::new(FormSubmissionController::from_settings(
        api,
        terminal::terminal_view(),
        settings,
    )?);
    let events = FormEvents::new();
    let disposer = controller.attach(&events);

    eprintln!("Enter text to translate; a blank line submits, Ctrl-D exits.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut buffer = ParagraphBuffer::default();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        if let Some(paragraph) = buffer.push_line(&line) {
            events.emit_submit(SubmitEvent::new(paragraph, options)).await;
        }
    }
    if let Some(paragraph) = buffer.finish() {
        events.emit_submit(SubmitEvent::new(paragraph, options)).await;
    }

    if !disposer.dispose() {
        warn!("submit handler was already detached");
    }
    Ok(())
}

async fn check_health(api: &dyn TranslationApi) -> Result<ExitCode> {
    match api.health().await {
        Ok(status) => {
            println!("{} {} at {}", status.service, status.status, status.timestamp);
            Ok(if status.is_healthy() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Err(err) => {
            eprintln!("health check failed: {err}");
            Ok(ExitCode::FAILURE)
        }
    }
}
