use anyhow::Result;
use clap::Parser;
use codebox_core::exec::{ExecutionConfig, ExecutionGateway};
use codebox_core::language::templates::TemplateProvider;
use codebox_core::{DiskStore, KvStore, SessionState, WorkspaceStore};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod commands;

use crate::commands::CommandResult;

#[derive(Parser, Debug)]
#[command(name = "codebox")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Codebox - in-memory code workspace with remote execution")]
struct Args {
    /// Directory for persisted workspace state (default: ~/.codebox/store)
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Base URL of the code execution service
    #[arg(long, value_name = "URL")]
    exec_url: Option<String>,

    /// Base URL of a starter-template catalog (optional)
    #[arg(long, value_name = "URL")]
    template_url: Option<String>,
}

fn main() -> Result<()> {
    setup_tracing();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(async_main())
}

async fn async_main() -> Result<()> {
    let args = Args::parse();
    info!(
        "CLI startup: data_dir={:?}, exec_url={}",
        args.data_dir,
        args.exec_url.as_deref().unwrap_or("default")
    );

    let kv: Arc<dyn KvStore> = match args.data_dir {
        Some(dir) => Arc::new(DiskStore::open(dir)?),
        None => Arc::new(DiskStore::open_default()?),
    };

    let mut store = WorkspaceStore::load(kv.clone());
    let mut session = SessionState::load(kv.clone(), &store);

    let config = match args.exec_url {
        Some(base_url) => ExecutionConfig {
            base_url,
            ..ExecutionConfig::default()
        },
        None => ExecutionConfig::default(),
    };
    let gateway = ExecutionGateway::with_config(config, kv);
    let templates = TemplateProvider::new(args.template_url);

    println!("Codebox - type /help for commands");

    let mut editor = DefaultEditor::new()?;
    loop {
        let prompt = match session.active_tab() {
            Some(tab) => format!("codebox [{}]> ", tab.file_path),
            None => "codebox> ".to_string(),
        };

        let line = match editor.readline(&prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };
        if line.trim().is_empty() {
            continue;
        }
        let _ = editor.add_history_entry(&line);

        match commands::handle(&mut store, &mut session, &gateway, &templates, &line).await {
            CommandResult::Handled { msg } => {
                if !msg.is_empty() {
                    println!("{msg}");
                }
            }
            CommandResult::Exit => {
                if store.has_unsaved_changes() {
                    let answer = editor
                        .readline("You have unsaved changes. Exit anyway? (y/N) ")
                        .unwrap_or_default();
                    if !answer.trim().eq_ignore_ascii_case("y") {
                        continue;
                    }
                }
                break;
            }
        }
    }

    Ok(())
}

fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}
