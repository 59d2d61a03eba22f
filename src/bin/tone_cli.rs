//! tone-cli: rewrite text in a chosen tone and keep an undoable history
//!
//! Usage:
//!   tone-cli rewrite [--formality F] [--verbosity V] [TEXT]   One-shot rewrite (stdin if no TEXT)
//!   tone-cli edit <TEXT>                                     Replace the session document
//!   tone-cli apply <CELL> [--preview] [--remote]             Apply a grid cell to the session
//!   tone-cli apply-last [--preview] [--remote]               Repeat the last applied cell
//!   tone-cli undo | redo | reset | show                      History operations
//!   tone-cli grid                                            Print the grid descriptor

use anyhow::{anyhow, bail, Context};
use std::io::{BufRead, Read, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tone_grid::session::{
    ApplyMode, ApplyOutcome, HttpToneTransport, JsonFileStore, ToneSession, ToneTransport,
};
use tone_grid::types::{cell_by_id, RawAxes, ToneRequest, TonePick, GRID};
use tone_grid::{RequestCoordinator, ToneConfig};

const DEFAULT_STATE_PATH: &str = ".tone-grid/session.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    let config_path = std::env::var("TONE_CONFIG").ok().map(PathBuf::from);
    let config = ToneConfig::load(config_path.as_deref())?;
    let rest = &args[2..];

    match args[1].as_str() {
        "rewrite" => cmd_rewrite(&config, rest).await,
        "grid" => cmd_grid(),
        "edit" => {
            let session = open_session(&config, rest)?;
            session.edit(positional(rest).join(" "))?;
            session.flush().await;
            Ok(())
        }
        "apply" => {
            let id = positional(rest)
                .first()
                .copied()
                .ok_or_else(|| anyhow!("apply needs a cell id, e.g. formal-concise"))?;
            let cell = cell_by_id(id).ok_or_else(|| anyhow!("unknown cell: {id}"))?;
            let session = open_session(&config, rest)?;
            let outcome = session.apply(TonePick::from(cell)).await;
            session.flush().await;
            finish_apply(&session, outcome?).await
        }
        "apply-last" => {
            let session = open_session(&config, rest)?;
            let outcome = session.apply_last().await;
            session.flush().await;
            finish_apply(&session, outcome?).await
        }
        "undo" => show_after(&config, rest, |s| s.undo()).await,
        "redo" => show_after(&config, rest, |s| s.redo()).await,
        "reset" => show_after(&config, rest, |s| s.reset()).await,
        "show" => show_after(&config, rest, |_| Ok(())).await,
        "version" | "--version" | "-V" => {
            println!("tone-cli {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    println!(
        r#"tone-cli: tone grid rewriting tool

USAGE:
    tone-cli <COMMAND> [OPTIONS]

COMMANDS:
    rewrite [--formality F] [--verbosity V] [TEXT]   One-shot rewrite (reads stdin without TEXT)
    edit <TEXT>                                      Replace the session document
    apply <CELL> [--preview] [--remote]              Apply a grid cell, e.g. formal-concise
    apply-last [--preview] [--remote]                Repeat the last applied cell
    undo | redo | reset | show                       Session history operations
    grid                                             Print the active grid descriptor
    version                                          Show version information
    help                                             Show this help message

ENVIRONMENT:
    TONE_CONFIG            Optional YAML configuration file
    TONE_API_KEY           Rewrite service credential (also MISTRAL_API_KEY)
    TONE_STATE_PATH        Session file (default {DEFAULT_STATE_PATH})
    TONE_SERVER_URL        Tone endpoint used with --remote
    RUST_LOG               Log filter, e.g. tone_grid=debug"#
    );
}

fn flag_value<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn has_flag(args: &[String], name: &str) -> bool {
    args.iter().any(|a| a == name)
}

const SESSION_FLAGS: [&str; 2] = ["--preview", "--remote"];

/// Arguments that are not session flags.
fn positional(args: &[String]) -> Vec<&str> {
    args.iter()
        .map(String::as_str)
        .filter(|a| !SESSION_FLAGS.contains(a))
        .collect()
}

async fn cmd_rewrite(config: &ToneConfig, args: &[String]) -> anyhow::Result<()> {
    let mut positional = Vec::new();
    let mut i = 0;
    while i < args.len() {
        if args[i] == "--formality" || args[i] == "--verbosity" {
            i += 2;
            continue;
        }
        positional.push(args[i].clone());
        i += 1;
    }
    let text = if positional.is_empty() {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading text from stdin")?;
        buf
    } else {
        positional.join(" ")
    };

    let axes = RawAxes {
        formality: flag_value(args, "--formality").map(str::to_string),
        verbosity: flag_value(args, "--verbosity").map(str::to_string),
    };
    let coordinator = RequestCoordinator::from_config(config);
    let reply = coordinator
        .respond(&ToneRequest::new(text, Some(axes)))
        .await;
    let body = reply.to_json();
    if reply.status() != 200 {
        bail!(
            "{} (HTTP {})",
            body["error"].as_str().unwrap_or_default(),
            reply.status()
        );
    }
    println!("{}", body["text"].as_str().unwrap_or_default());
    Ok(())
}

fn cmd_grid() -> anyhow::Result<()> {
    let descriptor = tone_grid::types::GridDescriptor::current();
    println!("{}", serde_json::to_string_pretty(&descriptor)?);
    for cell in GRID.iter() {
        println!("  ({}, {}) {:<18} {}", cell.x, cell.y, cell.id, cell.label);
    }
    Ok(())
}

fn open_session(config: &ToneConfig, args: &[String]) -> anyhow::Result<ToneSession> {
    let transport: Arc<dyn ToneTransport> = if has_flag(args, "--remote") {
        Arc::new(HttpToneTransport::new(config)?)
    } else {
        Arc::new(RequestCoordinator::from_config(config))
    };
    let path = config
        .state_path
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_PATH));
    let mode = if config.enable_preview || has_flag(args, "--preview") {
        ApplyMode::Preview
    } else {
        ApplyMode::Direct
    };
    Ok(ToneSession::open(
        transport,
        Arc::new(JsonFileStore::new(path)),
        mode,
    ))
}

async fn finish_apply(session: &ToneSession, outcome: ApplyOutcome) -> anyhow::Result<()> {
    match outcome {
        ApplyOutcome::Applied { text } => {
            println!("{text}");
        }
        ApplyOutcome::PreviewReady(preview) => {
            println!(
                "--- Original\n{}\n--- Rewritten ({})\n{}",
                preview.original, preview.pick.id, preview.text
            );
            print!("Apply? [y/N] ");
            std::io::stdout().flush()?;
            let mut answer = String::new();
            std::io::stdin().lock().read_line(&mut answer)?;
            if matches!(answer.trim(), "y" | "Y" | "yes") {
                session.confirm_preview()?;
                session.flush().await;
                println!("applied");
            } else {
                session.decline_preview()?;
                println!("discarded");
            }
        }
        ApplyOutcome::Superseded => {
            eprintln!("request superseded");
        }
    }
    Ok(())
}

async fn show_after(
    config: &ToneConfig,
    args: &[String],
    op: impl FnOnce(&ToneSession) -> tone_grid::Result<()>,
) -> anyhow::Result<()> {
    let session = open_session(config, args)?;
    op(&session)?;
    session.flush().await;
    let history = session
        .history()
        .ok_or_else(|| anyhow!("session state unavailable"))?;
    println!("{}", history.current());
    eprintln!(
        "[undo: {}, redo: {}, last tone: {}]",
        history.past().len(),
        history.future().len(),
        session.active_id().unwrap_or_else(|| "-".to_string())
    );
    Ok(())
}
