//! IPC daemon for the vikey composition engine.
//!
//! Exposes the four boundary operations (process_key, reset, set_enabled,
//! get_preedit) as newline-delimited JSON over stdin/stdout and runs until
//! the input stream closes. One engine instance serves the endpoint; hosts
//! with several input contexts run one daemon (or one engine) per context.

use anyhow::{Context, Result};
use clap::Parser;
use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::thread;
use tracing::{debug, error, info};
use vikey_core::engine::{CompositionEngine, EngineConfig};
use vikey_core::method::InputMethod;
use vikey_core::types::{keysym_name, keysym_to_char, KeyEvent, ProcessResult};
use vikey_core::ToneRule;

const REQUEST_QUEUE_SIZE: usize = 1024;

lazy_static::lazy_static! {
    static ref ENGINE: Mutex<CompositionEngine> = Mutex::new(CompositionEngine::new());
}

#[derive(Parser)]
#[command(name = "vikey-daemon", about = "Vietnamese input method engine daemon")]
struct Args {
    /// JSON config file; missing fields fall back to defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Input method: telex or vni.
    #[arg(long)]
    method: Option<String>,

    /// Tone placement rule: old or new.
    #[arg(long)]
    tone_rule: Option<String>,

    /// Disable the Vietnamese syllable validation gate.
    #[arg(long)]
    no_validation: bool,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum Request {
    ProcessKey {
        keysym: u32,
        #[serde(default)]
        modifiers: u32,
    },
    Reset,
    SetEnabled {
        enabled: bool,
    },
    GetPreedit,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Reply {
    Key(ProcessResult),
    Preedit { preedit: String },
    Ok { ok: bool },
    Error { error: String },
}

fn load_config(args: &Args) -> Result<EngineConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => EngineConfig::default(),
    };

    if let Some(method) = &args.method {
        config.input_method = match method.as_str() {
            "telex" => InputMethod::Telex,
            "vni" => InputMethod::Vni,
            other => anyhow::bail!("unsupported method: {other} (use telex|vni)"),
        };
    }
    if let Some(rule) = &args.tone_rule {
        config.tone_rule = match rule.as_str() {
            "old" => ToneRule::Old,
            "new" => ToneRule::New,
            other => anyhow::bail!("unsupported tone rule: {other} (use old|new)"),
        };
    }
    if args.no_validation {
        config.enable_validation = false;
    }

    Ok(config)
}

fn key_display(keysym: u32) -> String {
    if let Some(name) = keysym_name(keysym) {
        return name.to_string();
    }
    match keysym_to_char(keysym) {
        Some(c) => format!("{c:?}"),
        None => format!("{keysym:#x}"),
    }
}

fn handle(request: Request) -> Reply {
    match request {
        Request::ProcessKey { keysym, modifiers } => {
            let result = ENGINE.lock().process_key(KeyEvent::new(keysym, modifiers));
            debug!(
                key = %key_display(keysym),
                modifiers,
                handled = result.handled,
                commit = %result.commit,
                preedit = %result.preedit,
                "key processed"
            );
            Reply::Key(result)
        }
        Request::Reset => {
            ENGINE.lock().reset();
            debug!("engine reset");
            Reply::Ok { ok: true }
        }
        Request::SetEnabled { enabled } => {
            ENGINE.lock().set_enabled(enabled);
            info!(enabled, "engine toggled");
            Reply::Ok { ok: true }
        }
        Request::GetPreedit => Reply::Preedit {
            preedit: ENGINE.lock().preedit(),
        },
    }
}

/// Drains the request queue, serving replies on stdout. Runs until the
/// reader side hangs up.
fn serve(rx: Receiver<String>) {
    let stdout = std::io::stdout();
    for line in rx.iter() {
        let reply = match serde_json::from_str::<Request>(&line) {
            Ok(request) => handle(request),
            Err(e) => {
                error!(error = %e, "malformed request");
                Reply::Error {
                    error: e.to_string(),
                }
            }
        };
        let mut out = stdout.lock();
        match serde_json::to_string(&reply) {
            Ok(text) => {
                let _ = writeln!(out, "{text}");
                let _ = out.flush();
            }
            Err(e) => error!(error = %e, "failed to encode reply"),
        }
    }
}

fn read_requests(tx: Sender<String>) {
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        if line.trim().is_empty() {
            continue;
        }
        if tx.send(line).is_err() {
            break;
        }
    }
    // Dropping the sender lets the worker drain and exit.
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;
    info!(
        method = config.input_method.name(),
        tone_rule = ?config.tone_rule,
        validation = config.enable_validation,
        "vikey daemon starting"
    );
    *ENGINE.lock() = CompositionEngine::with_config(config);

    let (tx, rx) = bounded::<String>(REQUEST_QUEUE_SIZE);
    let worker = thread::Builder::new()
        .name("vikey-serve".to_string())
        .spawn(move || serve(rx))
        .context("failed to spawn worker thread")?;

    read_requests(tx);
    if worker.join().is_err() {
        error!("worker thread panicked");
    }
    info!("vikey daemon shutting down");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_decode_from_json_lines() {
        let req: Request =
            serde_json::from_str(r#"{"op":"process_key","keysym":97,"modifiers":0}"#).unwrap();
        assert!(matches!(
            req,
            Request::ProcessKey {
                keysym: 97,
                modifiers: 0
            }
        ));
        // Modifiers default to none.
        let req: Request = serde_json::from_str(r#"{"op":"process_key","keysym":97}"#).unwrap();
        assert!(matches!(req, Request::ProcessKey { modifiers: 0, .. }));
        assert!(matches!(
            serde_json::from_str::<Request>(r#"{"op":"reset"}"#).unwrap(),
            Request::Reset
        ));
        assert!(serde_json::from_str::<Request>(r#"{"op":"bogus"}"#).is_err());
    }

    #[test]
    fn replies_encode_their_shape() {
        let text = serde_json::to_string(&Reply::Key(ProcessResult {
            handled: true,
            commit: String::new(),
            preedit: "việt".into(),
        }))
        .unwrap();
        assert_eq!(text, r#"{"handled":true,"commit":"","preedit":"việt"}"#);
        let text = serde_json::to_string(&Reply::Ok { ok: true }).unwrap();
        assert_eq!(text, r#"{"ok":true}"#);
    }

    #[test]
    fn partial_config_files_use_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{"input_method":"vni"}"#).unwrap();
        assert_eq!(config.input_method, InputMethod::Vni);
        assert!(config.enable_validation);
        assert!(config.enable_double_key_revert);
        let config: EngineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.input_method, InputMethod::Telex);
    }
}
