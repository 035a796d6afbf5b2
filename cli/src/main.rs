mod commands;
mod interrupt;

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use builder_session::{AppConfig, BuilderSession, ChannelEventSink, SessionEvent, SubmitOutcome};
use commands::{load_image, parse, Command, HELP};
use conversation::ImageAttachment;
use inference::GenerationGateway;
use interrupt::Interrupts;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Environment variables consulted when a backend has no stored key
const API_KEY_VARS: &[(&str, &str)] = &[
    ("gemini", "GEMINI_API_KEY"),
    ("openai-compat", "OPENAI_API_KEY"),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging - RUST_LOG overrides the default level
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    log::info!("SiteCraft starting...");

    let data_dir = AppConfig::default_dir().context("No data directory on this platform")?;
    let stored = AppConfig::load(&data_dir)
        .await
        .with_context(|| format!("Failed to load configuration from {:?}", data_dir))?;

    // Keys from the environment are never written back to disk
    let mut config = stored.clone();
    for (backend, var) in API_KEY_VARS {
        if let Ok(key) = std::env::var(var) {
            config.apply_api_key(backend, &key);
        }
    }

    let gateway = GenerationGateway::from_config(
        &config.active_backend,
        &config.backend_config(&config.active_backend),
    )?
    .with_timeout(config.request_timeout());

    if !gateway.is_configured().await {
        log::warn!(
            "Backend '{}' is not configured. Set GEMINI_API_KEY or OPENAI_API_KEY, or edit {:?}",
            config.active_backend,
            data_dir.join("config.json")
        );
    }

    let (sink, mut events) = ChannelEventSink::channel();
    let printer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            print_event(&event);
        }
    });

    let mut session =
        BuilderSession::from_config(&config, Arc::new(gateway)).with_event_sink(Arc::new(sink));

    let mut repl = Repl {
        session: &mut session,
        config,
        stored,
        data_dir,
        pending_image: None,
        interrupts: Interrupts::listen(),
    };
    let result = repl.run().await;

    drop(session);
    if let Err(e) = printer.await {
        log::warn!("Event printer failed: {}", e);
    }

    log::info!("SiteCraft exiting");
    result
}

struct Repl<'a> {
    session: &'a mut BuilderSession,
    /// Effective configuration (stored values plus environment keys)
    config: AppConfig,
    /// Configuration as loaded from disk
    stored: AppConfig,
    data_dir: PathBuf,
    pending_image: Option<(PathBuf, ImageAttachment)>,
    interrupts: Interrupts,
}

impl Repl<'_> {
    async fn run(&mut self) -> anyhow::Result<()> {
        println!("SiteCraft - describe the website you want. /help lists commands.");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            print!("> ");
            std::io::stdout().flush()?;

            let line = tokio::select! {
                line = lines.next_line() => line?,
                _ = self.interrupts.interrupted() => {
                    println!();
                    break;
                }
            };
            let Some(line) = line else {
                break;
            };
            let Some(command) = parse(&line, self.pending_image.is_some()) else {
                continue;
            };

            if command == Command::Quit {
                break;
            }
            if let Err(e) = self.execute(command).await {
                println!("Error: {:#}", e);
            }
        }
        Ok(())
    }

    async fn execute(&mut self, command: Command) -> anyhow::Result<()> {
        match command {
            Command::Prompt(text) => {
                let image = self.pending_image.take().map(|(_, image)| image);
                self.submit(text, image).await?;
            }
            Command::Database => {
                let cancel = self.interrupts.request_token();
                let outcome = self
                    .interrupts
                    .guard(
                        &cancel,
                        self.session.request_database_integration_with_cancel(&cancel),
                    )
                    .await;
                print_outcome(&outcome?);
            }
            Command::Image(path) => {
                let image = load_image(&path).await?;
                println!("Attached {} to the next prompt", path.display());
                self.pending_image = Some((path, image));
            }
            Command::Code => match self.session.current_code() {
                Some(code) => {
                    println!("--- html ---\n{}", code.html);
                    println!("--- css ---\n{}", code.css);
                    println!("--- javascript ---\n{}", code.javascript);
                }
                None => println!("No code generated yet"),
            },
            Command::Export(path) => {
                let target = if path.is_dir() {
                    path.join(self.session.archive_file_name())
                } else {
                    path
                };
                let archive = self.session.export_zip(Cursor::new(Vec::new()))?;
                write_file(&target, archive.into_inner()).await?;
                println!("Wrote {}", target.display());
            }
            Command::Preview(path) => {
                let Some(document) = self.session.export_document() else {
                    println!("No code generated yet");
                    return Ok(());
                };
                write_file(&path, document.into_bytes()).await?;
                println!("Wrote {}", path.display());
            }
            Command::Backend(name) => self.switch_backend(&name).await?,
            Command::Backends => {
                for info in self.session.gateway().available_backends().await {
                    let marker = if info.active { "*" } else { " " };
                    println!("{} {:<14} {}", marker, info.name, info.description);
                }
            }
            Command::Clear => {
                self.session.clear();
                self.pending_image = None;
                println!("Started a new conversation");
            }
            Command::Help => println!("{}", HELP),
            Command::Invalid(message) => println!("{}", message),
            Command::Quit => {}
        }
        Ok(())
    }

    async fn submit(&mut self, text: String, image: Option<ImageAttachment>) -> anyhow::Result<()> {
        let cancel = self.interrupts.request_token();
        let outcome = self
            .interrupts
            .guard(&cancel, self.session.submit_with_cancel(text, image, &cancel))
            .await;
        print_outcome(&outcome?);
        Ok(())
    }

    async fn switch_backend(&mut self, name: &str) -> anyhow::Result<()> {
        let backend_config = self.config.backend_config(name);
        self.session
            .gateway()
            .switch_backend(name, &backend_config)
            .await?;

        self.config.active_backend = name.to_string();
        self.stored.active_backend = name.to_string();
        if let Err(e) = self.stored.save(&self.data_dir).await {
            log::warn!("Failed to persist backend choice: {}", e);
        }

        let model = self.session.gateway().model().await;
        println!("Using {} ({})", name, model);
        if !self.session.gateway().is_configured().await {
            println!("Warning: {} has no API key configured", name);
        }
        Ok(())
    }
}

async fn write_file(path: &Path, contents: Vec<u8>) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, contents)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))
}

fn print_outcome(outcome: &SubmitOutcome) {
    match outcome {
        SubmitOutcome::Completed {
            display_text,
            code_updated,
        } => {
            println!("\n{}", display_text);
            if *code_updated {
                println!("\n[code updated - /code to view, /preview <file> to open]");
            }
        }
        SubmitOutcome::Failed { .. } => println!("\n{}", builder_session::APOLOGY_TEXT),
        SubmitOutcome::Cancelled => println!("\n[cancelled]"),
    }
}

fn print_event(event: &SessionEvent) {
    match event {
        SessionEvent::Progress { message } => println!("  {}", message),
        SessionEvent::GenerationFailed { error } => log::debug!("Generation failed: {}", error),
        _ => {}
    }
}
