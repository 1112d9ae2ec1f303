#![warn(missing_docs)]
//! # paper-analyzer binary
//!
//! Terminal front end: select paper page images, run one comparative
//! analysis, and read the rendered result.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::Parser;
use paper_analyzer_app::{ViewController, app_version, init_telemetry};
use paper_analyzer_client::{
    API_KEY_ENV, AnalysisClient, ApiCredential, DEFAULT_API_BASE, ReqwestTransport,
    validate_api_base,
};
use paper_analyzer_core::RawFile;
use paper_analyzer_files::{
    DEFAULT_MAX_FILE_BYTES, FileStore, InMemoryPreviewBackend, SelectionPolicy,
};
use paper_analyzer_render::{html_report, render};
use paper_analyzer_ui::{APP_TITLE, ViewModel, ViewState};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

const HELP: &str = "\
commands:
  add <path>...    add paper page images
  remove <index>   remove a file by its list index
  list             show the current view
  analyze          run the analysis
  html <path>      write the last analysis as an HTML report
  help             show this help
  quit             exit";

#[derive(Parser, Debug)]
#[command(
    name = "paper-analyzer",
    version = app_version(),
    about = "Comparative analysis of research paper page images"
)]
struct Args {
    /// Paper page images to analyze.
    paths: Vec<PathBuf>,

    /// Model API key.
    #[arg(long, env = API_KEY_ENV, hide_env_values = true)]
    api_key: Option<String>,

    /// Model API base URL.
    #[arg(long, env = "PAPER_ANALYZER_API_BASE", default_value = DEFAULT_API_BASE)]
    api_base: String,

    /// Largest accepted file, in bytes.
    #[arg(long, env = "PAPER_ANALYZER_MAX_FILE_BYTES", default_value_t = DEFAULT_MAX_FILE_BYTES)]
    max_file_bytes: u64,

    /// Write the analysis as a standalone HTML report.
    #[arg(long)]
    html: Option<PathBuf>,

    /// Keep a prompt open for add/remove/analyze commands.
    #[arg(short, long)]
    interactive: bool,

    /// Wrap width for the rendered analysis.
    #[arg(long, default_value_t = 100)]
    width: usize,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_telemetry();
    let args = Args::parse();

    let credential = ApiCredential::from_value(args.api_key.clone())?;
    let api_base = validate_api_base(&args.api_base)?;
    let transport = ReqwestTransport::new(api_base, credential)
        .context("failed to build the HTTP client")?;
    let service = Arc::new(AnalysisClient::new(Arc::new(transport)));

    let store = FileStore::new(
        Arc::new(InMemoryPreviewBackend::new()),
        SelectionPolicy {
            max_file_bytes: args.max_file_bytes,
            images_only: true,
        },
    );
    let mut controller = ViewController::new(store, service);
    info!(version = app_version(), "paper-analyzer started");

    add_paths(&mut controller, &args.paths);

    if args.interactive || args.paths.is_empty() {
        return interactive(&mut controller, &args).await;
    }

    controller.analyze().await;
    print!("{}", present(&controller.view(), args.width));
    match controller.state() {
        ViewState::Done(text) => {
            if let Some(path) = &args.html {
                write_report(path, text)?;
            }
            Ok(())
        }
        ViewState::Failed(message) => anyhow::bail!("{message}"),
        _ => Ok(()),
    }
}

async fn interactive(controller: &mut ViewController, args: &Args) -> Result<()> {
    print!("{}", present(&controller.view(), args.width));
    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        eprint!("> ");
        let Some(line) = lines.next_line().await.context("failed to read stdin")? else {
            return Ok(());
        };

        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            continue;
        };
        let rest: Vec<&str> = words.collect();

        match command {
            "add" => {
                let paths: Vec<PathBuf> = rest.iter().map(PathBuf::from).collect();
                add_paths(controller, &paths);
                print!("{}", present(&controller.view(), args.width));
            }
            "remove" | "rm" => match rest.first().map(|raw| raw.parse::<usize>()) {
                Some(Ok(index)) => match controller.remove_file(index) {
                    Ok(file) => {
                        println!("removed {}", file.name);
                        print!("{}", present(&controller.view(), args.width));
                    }
                    Err(error) => println!("{error}"),
                },
                _ => println!("usage: remove <index>"),
            },
            "list" | "ls" => print!("{}", present(&controller.view(), args.width)),
            "analyze" => {
                if let Some(pending) = controller.trigger_analyze() {
                    let view = controller.view();
                    if let Some(loading) = &view.loading_message {
                        println!("{} {loading}", view.submit_label);
                    }
                    let outcome = pending.run().await;
                    controller
                        .complete(outcome)
                        .context("analysis finished without a request in flight")?;
                }
                print!("{}", present(&controller.view(), args.width));
                if let (ViewState::Done(text), Some(path)) = (controller.state(), &args.html) {
                    write_report(path, text)?;
                }
            }
            "html" => match (rest.first(), controller.state()) {
                (Some(path), ViewState::Done(text)) => write_report(Path::new(path), text)?,
                (None, _) => println!("usage: html <path>"),
                _ => println!("no analysis to export yet"),
            },
            "help" | "?" => println!("{HELP}"),
            "quit" | "exit" | "q" => return Ok(()),
            other => println!("unknown command: {other}\n{HELP}"),
        }
    }
}

fn add_paths(controller: &mut ViewController, paths: &[PathBuf]) {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        match RawFile::from_path(path) {
            Ok(file) => files.push(file),
            Err(error) => {
                warn!(path = %path.display(), %error, "skipping path");
                println!("skipped {}: {error}", path.display());
            }
        }
    }
    if files.is_empty() {
        return;
    }

    match controller.select_files(files) {
        Ok(report) => {
            for rejected in report.rejected {
                println!("skipped {}: {}", rejected.name, rejected.reason);
            }
        }
        Err(error) => println!("{error}"),
    }
}

fn write_report(path: &Path, markup: &str) -> Result<()> {
    std::fs::write(path, html_report(APP_TITLE, markup))
        .with_context(|| format!("failed to write report to {}", path.display()))?;
    println!("report written to {}", path.display());
    Ok(())
}

fn present(view: &ViewModel, width: usize) -> String {
    let mut out = String::new();
    let rule = "=".repeat(view.title.chars().count());

    out.push_str(&format!("{}\n{}\n{rule}\n\n", view.title, view.subtitle));

    if view.files.is_empty() {
        out.push_str(&format!("No files selected ({}).\n", view.upload_hint));
    } else {
        out.push_str(&format!("Files ({}):\n", view.upload_hint));
        for tile in &view.files {
            out.push_str(&format!(
                "  [{}] {} ({}, {})  {}\n",
                tile.index, tile.name, tile.mime_type, tile.size_label, tile.preview_url
            ));
        }
    }

    let submit = if view.submit_enabled {
        format!("[{}] available: type `analyze`", view.submit_label)
    } else {
        format!("[{}] unavailable", view.submit_label)
    };
    out.push_str(&format!("\n{submit}\n"));

    if let Some(loading) = &view.loading_message {
        out.push_str(&format!("{loading}\n"));
    }
    if let Some(error) = &view.error_banner {
        out.push_str(&format!("\nError: {error}\n"));
    }
    if let Some(hint) = &view.ready_hint {
        out.push_str(&format!("{hint}\n"));
    }
    if let Some(analysis) = &view.analysis {
        out.push('\n');
        out.push_str(&render(analysis).to_terminal(width));
    }
    out
}
