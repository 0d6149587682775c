use std::{
    io::{self, IsTerminal},
    path::{Path, PathBuf},
    process::ExitCode,
    sync::Arc,
};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    BlobRegistry, HttpBackend, Outcome, PageController, PageSurface, SelectedFile, SubmitEvent,
};
use shared::domain::ElementId;
use tokio::io::AsyncReadExt;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod config;
mod system_clipboard;
mod terminal_page;

use config::load_settings;
use system_clipboard::SystemClipboard;
use terminal_page::TerminalPage;

#[derive(Parser, Debug)]
#[command(name = "summarizer", about = "Analyze text or summarize PDFs against a summarizer server")]
struct Args {
    /// Overrides the server url from settings.
    #[arg(long, global = true)]
    server_url: Option<String>,
    #[arg(long, global = true, default_value = "summarizer.toml")]
    config: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Summarize text, extract keywords, topics and sentiment.
    Analyze {
        #[arg(long, conflicts_with_all = ["text_file", "paste"])]
        text: Option<String>,
        #[arg(long, conflicts_with = "paste")]
        text_file: Option<PathBuf>,
        /// Take the input from the system clipboard.
        #[arg(long)]
        paste: bool,
    },
    /// Upload a PDF and save the summarized document.
    Upload {
        path: PathBuf,
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Print what the clipboard would paste into the input.
    Paste,
    /// Toggle the history panel twice and report its state.
    History,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let mut settings = load_settings(&args.config)?;
    if let Some(server_url) = args.server_url {
        settings.server_url = server_url;
    }

    let mut backend = HttpBackend::new(&settings.server_url)
        .with_context(|| format!("cannot use server url '{}'", settings.server_url))?;
    if let Some(cookie) = settings.session_cookie.clone() {
        backend = backend.with_session_cookie(cookie);
    }
    debug!(
        server_url = backend.server_url(),
        has_cookie = settings.session_cookie.is_some(),
        "using summarizer server"
    );

    let page = Arc::new(TerminalPage::stdio());
    let registry = Arc::new(BlobRegistry::new());
    let controller = PageController::bind_with_dependencies(
        page.clone(),
        Arc::new(backend),
        Arc::new(SystemClipboard),
        registry.clone(),
    )?;

    let outcome = match args.command {
        Command::Analyze {
            text,
            text_file,
            paste,
        } => {
            if paste {
                let pasted = controller.paste_from_clipboard().await;
                if pasted != Outcome::Applied {
                    return Ok(exit_code(pasted));
                }
            } else {
                let input = read_analyze_input(text, text_file.as_deref()).await?;
                page.set_value(ElementId::InputText, &input);
            }
            controller.analyze().await
        }
        Command::Upload { path, out_dir } => {
            page.set_files(vec![read_selected_file(&path).await?]);
            let mut event = SubmitEvent::new();
            let outcome = controller.upload(&mut event).await;
            if outcome == Outcome::Applied {
                let out_dir = out_dir.unwrap_or_else(|| settings.download_dir.clone());
                let saved = save_download(&page, &registry, &out_dir).await?;
                println!("Saved {}", saved.display());
            }
            controller.unload();
            outcome
        }
        Command::Paste => {
            let outcome = controller.paste_from_clipboard().await;
            if outcome == Outcome::Applied {
                println!("{}", page.value(ElementId::InputText));
            }
            outcome
        }
        Command::History => {
            for _ in 0..2 {
                let shown = controller.toggle_history();
                println!("history panel {}", if shown { "shown" } else { "hidden" });
            }
            debug!(shown = page.history_shown(), "history panel after double toggle");
            Outcome::Applied
        }
    };

    info!(?outcome, "command finished");
    Ok(exit_code(outcome))
}

fn exit_code(outcome: Outcome) -> ExitCode {
    match outcome {
        Outcome::Applied => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    }
}

async fn read_analyze_input(text: Option<String>, text_file: Option<&Path>) -> Result<String> {
    if let Some(text) = text {
        return Ok(text);
    }
    if let Some(path) = text_file {
        return tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read text file '{}'", path.display()));
    }
    if io::stdin().is_terminal() {
        return Ok(String::new());
    }

    let mut input = String::new();
    tokio::io::stdin()
        .read_to_string(&mut input)
        .await
        .context("failed to read text from stdin")?;
    Ok(input)
}

async fn read_selected_file(path: &Path) -> Result<SelectedFile> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read upload file '{}'", path.display()))?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| anyhow!("upload path '{}' has no file name", path.display()))?;

    let file = SelectedFile::new(file_name, bytes);
    Ok(match mime_guess::from_path(path).first() {
        Some(mime) => file.with_mime_type(mime.essence_str()),
        None => file,
    })
}

async fn save_download(
    page: &TerminalPage,
    registry: &BlobRegistry,
    out_dir: &Path,
) -> Result<PathBuf> {
    let link = page
        .download_link()
        .filter(|link| link.visible)
        .context("download link was not published")?;
    let blob = registry
        .resolve(&link.href)
        .with_context(|| format!("object url '{}' is no longer live", link.href))?;

    tokio::fs::create_dir_all(out_dir)
        .await
        .with_context(|| format!("failed to create download dir '{}'", out_dir.display()))?;
    let target = out_dir.join(&link.file_name);
    tokio::fs::write(&target, &blob.bytes)
        .await
        .with_context(|| format!("failed to write '{}'", target.display()))?;
    info!(path = %target.display(), size_bytes = blob.bytes.len(), "saved summarized document");
    Ok(target)
}
